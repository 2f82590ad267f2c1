//! Input format detection.

use crate::error::{Error, Result};
use crate::model::DocumentKind;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Extensions accepted as raster image input.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "gif"];

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Infer the document kind from a path's extension (case-insensitive).
///
/// # Example
/// ```
/// use docsift::detect::detect_kind;
/// use docsift::DocumentKind;
///
/// assert_eq!(detect_kind("scan.JPG").unwrap(), DocumentKind::Image);
/// assert!(detect_kind("notes.docx").is_err());
/// ```
pub fn detect_kind<P: AsRef<Path>>(path: P) -> Result<DocumentKind> {
    let ext = path
        .as_ref()
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ext == "pdf" {
        Ok(DocumentKind::Pdf)
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Ok(DocumentKind::Image)
    } else if ext.is_empty() {
        Err(Error::UnsupportedFormat("(no extension)".to_string()))
    } else {
        Err(Error::UnsupportedFormat(format!(".{}", ext)))
    }
}

/// Check that a file starts with the PDF header.
pub fn check_pdf_header<P: AsRef<Path>>(path: P) -> Result<()> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    let read = reader.read(&mut header)?;
    if is_pdf_bytes(&header[..read]) {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}

/// Check if bytes begin with the PDF magic.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    data.starts_with(PDF_MAGIC)
}
