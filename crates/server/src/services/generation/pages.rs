//! Splitting a generated text blob into per-page HTML documents.
//!
//! The provider returns one reply for the whole site. Documents are
//! detected by their root-tag start markers and closed at `</html>`;
//! anything between documents (markdown fences, commentary) is discarded.
//! A requested page with no usable chunk gets a labeled placeholder, so
//! the caller always receives exactly one document per requested page.

use askama::Template;

use pagewright_core::{GeneratedPage, PageStub};

use super::error::GenerationError;

/// Placeholder document for pages the provider failed to produce.
#[derive(Template)]
#[template(path = "placeholder.html")]
struct PlaceholderTemplate<'a> {
    title: &'a str,
}

/// Split a reply blob into candidate HTML documents.
///
/// A document starts at `<!DOCTYPE` or `<html` (case-insensitive) and runs
/// through the next `</html>`; a final unterminated document runs to the end
/// of the blob.
#[must_use]
pub fn split_documents(blob: &str) -> Vec<String> {
    let lower = blob.to_ascii_lowercase();
    let mut documents = Vec::new();
    let mut pos = 0;

    while pos < lower.len() {
        let doctype = lower[pos..].find("<!doctype").map(|i| pos + i);
        let html = lower[pos..].find("<html").map(|i| pos + i);
        let start = match (doctype, html) {
            (Some(d), Some(h)) => d.min(h),
            (Some(d), None) => d,
            (None, Some(h)) => h,
            (None, None) => break,
        };

        let end = lower[start..]
            .find("</html>")
            .map_or(blob.len(), |i| start + i + "</html>".len());

        if let Some(doc) = blob.get(start..end) {
            documents.push(doc.trim().to_string());
        }
        pos = end;
    }

    documents
}

/// Compose the generation prompt for a site.
///
/// Asks for one complete HTML document per planned page, in order, with no
/// commentary between documents; the splitter depends on that shape.
#[must_use]
pub fn compose_prompt(description: &str, structure: &[PageStub]) -> String {
    let mut prompt = String::new();
    prompt.push_str("Create a static website for the following business:\n\n");
    prompt.push_str(description);
    prompt.push_str("\n\nProduce these pages, in this exact order:\n");
    for stub in structure {
        prompt.push_str(&format!("- {} ({})\n", stub.title, stub.filename));
    }
    prompt.push_str(
        "\nReturn one complete HTML document per page, each starting with \
         <!DOCTYPE html> and ending with </html>. Inline all CSS in a \
         <style> element. Do not include any text outside the documents.",
    );
    prompt
}

/// Assemble exactly one [`GeneratedPage`] per planned page.
///
/// Candidate documents are assigned to pages in order. A missing or
/// malformed candidate (no root tag, no body) is replaced with a visible
/// placeholder rather than failing the pipeline or leaving a gap.
///
/// # Errors
///
/// Returns an error only if the placeholder template fails to render.
pub fn build_pages(
    blob: &str,
    structure: &[PageStub],
) -> Result<Vec<GeneratedPage>, GenerationError> {
    let documents = split_documents(blob);
    let mut pages = Vec::with_capacity(structure.len());

    for (index, stub) in structure.iter().enumerate() {
        let candidate = documents
            .get(index)
            .map(|html| GeneratedPage::new(stub.filename.clone(), html.clone()));

        let page = match candidate {
            Some(page) if page.is_complete_document() => page,
            Some(_) => {
                tracing::warn!(
                    filename = %stub.filename,
                    "Generated chunk is not a complete document; substituting placeholder"
                );
                placeholder(stub)?
            }
            None => {
                tracing::warn!(
                    filename = %stub.filename,
                    "Provider produced no chunk for page; substituting placeholder"
                );
                placeholder(stub)?
            }
        };
        pages.push(page);
    }

    Ok(pages)
}

fn placeholder(stub: &PageStub) -> Result<GeneratedPage, GenerationError> {
    let html = PlaceholderTemplate { title: &stub.title }.render()?;
    Ok(GeneratedPage::new(stub.filename.clone(), html))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub(title: &str, filename: &str) -> PageStub {
        PageStub {
            title: title.to_string(),
            filename: filename.to_string(),
        }
    }

    const DOC: &str = "<!DOCTYPE html><html><body><h1>Home</h1></body></html>";
    const DOC2: &str = "<!DOCTYPE html><html><body><h1>Menu</h1></body></html>";

    #[test]
    fn test_split_two_documents() {
        let blob = format!("{DOC}\n\n{DOC2}");
        let docs = split_documents(&blob);
        assert_eq!(docs.len(), 2);
        assert!(docs[0].contains("Home"));
        assert!(docs[1].contains("Menu"));
    }

    #[test]
    fn test_split_skips_interstitial_noise() {
        let blob = format!("Here is your site:\n```html\n{DOC}\n```\nAnd the menu:\n{DOC2}");
        let docs = split_documents(&blob);
        assert_eq!(docs.len(), 2);
        assert!(docs[0].starts_with("<!DOCTYPE"));
    }

    #[test]
    fn test_split_html_root_without_doctype() {
        let blob = "<html><body>a</body></html><html><body>b</body></html>";
        let docs = split_documents(blob);
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_split_inner_html_tag_not_a_boundary() {
        // The <html> inside a doctype document must not start a new one.
        let docs = split_documents(DOC);
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_split_unterminated_final_document() {
        let blob = format!("{DOC}<!DOCTYPE html><html><body>cut off");
        let docs = split_documents(&blob);
        assert_eq!(docs.len(), 2);
        assert!(docs[1].ends_with("cut off"));
    }

    #[test]
    fn test_split_empty_blob() {
        assert!(split_documents("").is_empty());
        assert!(split_documents("no markup here").is_empty());
    }

    #[test]
    fn test_build_pages_exact_count() {
        let structure = vec![stub("Home", "index.html"), stub("Menu", "menu.html")];
        let pages = build_pages(DOC, &structure).expect("build");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].filename, "index.html");
        assert!(pages[0].html.contains("Home"));
        // Second page had no chunk: placeholder, still a complete document.
        assert_eq!(pages[1].filename, "menu.html");
        assert!(pages[1].is_complete_document());
        assert!(pages[1].html.contains("Menu"));
    }

    #[test]
    fn test_build_pages_replaces_malformed_chunk() {
        let blob = format!("{DOC}<html><p>no body tag</p></html>");
        let structure = vec![stub("Home", "index.html"), stub("About", "about.html")];
        let pages = build_pages(&blob, &structure).expect("build");
        assert_eq!(pages.len(), 2);
        assert!(pages[1].is_complete_document());
        assert!(pages[1].html.contains("About"));
    }

    #[test]
    fn test_build_pages_surplus_documents_dropped() {
        let blob = format!("{DOC}{DOC2}");
        let structure = vec![stub("Home", "index.html")];
        let pages = build_pages(&blob, &structure).expect("build");
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_compose_prompt_lists_pages_in_order() {
        let structure = vec![stub("Home", "index.html"), stub("Menu", "menu.html")];
        let prompt = compose_prompt("bakery in Leeds", &structure);
        let home = prompt.find("Home (index.html)").expect("home listed");
        let menu = prompt.find("Menu (menu.html)").expect("menu listed");
        assert!(home < menu);
        assert!(prompt.contains("bakery in Leeds"));
    }
}
