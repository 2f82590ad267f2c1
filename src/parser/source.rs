//! Thin wrapper over `lopdf::Document` shared by the PDF extractors.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::detect::check_pdf_header;
use crate::error::{Error, Result};

/// An opened PDF.
pub struct PdfSource {
    doc: LopdfDocument,
}

impl PdfSource {
    /// Open a PDF file. Encrypted documents are rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        check_pdf_header(path)?;

        let doc = LopdfDocument::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;

        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// All pages as (page number → object id), in page order.
    pub fn pages(&self) -> BTreeMap<u32, ObjectId> {
        self.doc.get_pages()
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Resolve an object that may be a reference to a dictionary.
    pub fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// The `/Resources /XObject` dictionary of a page, if any.
    pub fn page_xobjects(&self, page_id: ObjectId) -> Option<&Dictionary> {
        let page_dict = self.doc.get_dictionary(page_id).ok()?;
        let resources = self.resolve_dict(page_dict.get(b"Resources").ok()?)?;
        self.resolve_dict(resources.get(b"XObject").ok()?)
    }

    /// The raw (decompressed) content stream bytes of a page.
    pub fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = page_dict
            .get(b"Contents")
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => Ok(stream_bytes(s)),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in arr {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    content.extend_from_slice(&stream_bytes(s));
                    content.push(b' ');
                }
            }
        }
        content
    }
}

/// Stream payload, decompressed when a filter is present.
pub(crate) fn stream_bytes(stream: &lopdf::Stream) -> Vec<u8> {
    if stream.dict.get(b"Filter").is_err() {
        return stream.content.clone();
    }
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Simple text decoding fallback when no font encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter_map(|c| {
                if c.len() == 2 {
                    Some(u16::from_be_bytes([c[0], c[1]]))
                } else {
                    None
                }
            })
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = String::from_utf8(bytes.to_vec()) {
        return s;
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Extract a number from a PDF object.
pub fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_get_number() {
        assert_eq!(get_number(&Object::Integer(42)), Some(42.0));
        assert_eq!(get_number(&Object::Real(1.5)), Some(1.5));
        assert_eq!(get_number(&Object::Null), None);
    }

    #[test]
    fn test_open_rejects_non_pdf_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"<!DOCTYPE html>").unwrap();
        assert!(matches!(PdfSource::open(&path), Err(Error::UnknownFormat)));
    }
}
