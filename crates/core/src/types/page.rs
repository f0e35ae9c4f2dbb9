//! Generated page types.

use serde::{Deserialize, Serialize};

/// A planned page: title and target filename, collected by the multi-step
/// form before generation runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStub {
    /// Human-readable page title, e.g. "Our Menu".
    pub title: String,
    /// Target filename, e.g. "menu.html".
    pub filename: String,
}

/// A generated page: filename plus a full HTML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPage {
    /// Filename the page is written to on deploy, e.g. "index.html".
    pub filename: String,
    /// Complete HTML document text.
    pub html: String,
}

impl GeneratedPage {
    /// Create a page from a filename and document text.
    #[must_use]
    pub fn new(filename: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            html: html.into(),
        }
    }

    /// Whether the document looks like a complete HTML page.
    ///
    /// A page must start with an HTML root tag (`<!DOCTYPE` or `<html`) and
    /// contain a `<body` element. Pages failing this check are replaced with
    /// a placeholder rather than deployed broken.
    #[must_use]
    pub fn is_complete_document(&self) -> bool {
        let trimmed = self.html.trim_start();
        let lower = trimmed
            .get(..trimmed.len().min(16))
            .unwrap_or_default()
            .to_ascii_lowercase();
        let has_root = lower.starts_with("<!doctype") || lower.starts_with("<html");
        has_root && self.html.to_ascii_lowercase().contains("<body")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_document() {
        let page = GeneratedPage::new(
            "index.html",
            "<!DOCTYPE html><html><body><h1>Hi</h1></body></html>",
        );
        assert!(page.is_complete_document());
    }

    #[test]
    fn test_complete_document_html_root() {
        let page = GeneratedPage::new("index.html", "<html lang=\"en\"><body></body></html>");
        assert!(page.is_complete_document());
    }

    #[test]
    fn test_leading_whitespace_tolerated() {
        let page = GeneratedPage::new("index.html", "\n  <!doctype html><html><body></body></html>");
        assert!(page.is_complete_document());
    }

    #[test]
    fn test_missing_root_tag() {
        let page = GeneratedPage::new("index.html", "<div>fragment</div>");
        assert!(!page.is_complete_document());
    }

    #[test]
    fn test_missing_body() {
        let page = GeneratedPage::new("index.html", "<!DOCTYPE html><html><head></head></html>");
        assert!(!page.is_complete_document());
    }

    #[test]
    fn test_empty_document() {
        let page = GeneratedPage::new("index.html", "");
        assert!(!page.is_complete_document());
    }
}
