//! Input document types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::detect::detect_kind;
use crate::error::{Error, Result};

/// Kind of input document, inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A PDF document
    Pdf,
    /// A raster image (PNG, JPEG, TIFF, BMP, GIF)
    Image,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "pdf"),
            DocumentKind::Image => write!(f, "image"),
        }
    }
}

/// A read-only input document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Path to the input file
    pub path: PathBuf,

    /// Document kind
    pub kind: DocumentKind,
}

impl Document {
    /// Open a document: the path must exist and have a supported extension.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::InputNotFound(path.to_path_buf()));
        }

        let kind = detect_kind(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    /// Check if this is a PDF document.
    pub fn is_pdf(&self) -> bool {
        self.kind == DocumentKind::Pdf
    }

    /// File name for display purposes.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
