//! Native text-layer extraction.

use std::path::Path;

use crate::error::{Error, Result};

use super::source::PdfSource;

/// Extract the text of every page, each preceded by a `--- Page N ---` header.
///
/// Pages whose text cannot be decoded are logged and skipped; a document that
/// cannot be opened at all is an error. When no page carries any text the
/// result is empty, headers included.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let source = PdfSource::open(path)?;
    Ok(extract_text_from(&source))
}

/// Extract page text from an already opened PDF.
pub fn extract_text_from(source: &PdfSource) -> String {
    let mut output = String::new();
    let mut any_text = false;

    for page_num in source.pages().keys().copied() {
        match page_text(source, page_num) {
            Ok(text) => {
                any_text |= !text.trim().is_empty();
                output.push_str(&format!("\n--- Page {} ---\n", page_num));
                output.push_str(text.trim_end());
                output.push('\n');
            }
            Err(e) => {
                log::warn!("Failed to extract text from page {}: {}", page_num, e);
            }
        }
    }

    if !any_text {
        log::debug!("No page of the document has a text layer");
        output.clear();
    }
    output
}

fn page_text(source: &PdfSource, page_num: u32) -> Result<String> {
    source
        .raw_doc()
        .extract_text(&[page_num])
        .map_err(|e| Error::PdfParse(format!("Page {}: {}", page_num, e)))
}
