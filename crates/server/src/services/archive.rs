//! In-memory zip archives of generated sites.
//!
//! One writer serves two consumers: the ZIP download endpoint streams the
//! archive to the browser, and the Netlify target uploads the same bytes
//! as a zip deploy.

use std::io::{Cursor, Write};

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use pagewright_core::GeneratedPage;

/// Errors that can occur while building an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Zip structure error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Underlying buffer write failed.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build a zip archive containing each generated page at its filename.
///
/// # Errors
///
/// Returns an error if the archive cannot be assembled.
pub fn build_site_zip(pages: &[GeneratedPage]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for page in pages {
        writer.start_file(page.filename.as_str(), options)?;
        writer.write_all(page.html.as_bytes())?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_round_trips_page_contents() {
        let pages = vec![
            GeneratedPage::new("index.html", "<!DOCTYPE html><html><body>a</body></html>"),
            GeneratedPage::new("menu.html", "<!DOCTYPE html><html><body>b</body></html>"),
        ];
        let bytes = build_site_zip(&pages).expect("build");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open");
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        archive
            .by_name("menu.html")
            .expect("entry")
            .read_to_string(&mut contents)
            .expect("read");
        assert!(contents.contains("<body>b</body>"));
    }

    #[test]
    fn test_empty_site_yields_valid_archive() {
        let bytes = build_site_zip(&[]).expect("build");
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open");
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn test_archive_is_zip_magic() {
        let pages = vec![GeneratedPage::new("index.html", "<html></html>")];
        let bytes = build_site_zip(&pages).expect("build");
        assert_eq!(&bytes[..2], b"PK");
    }
}
