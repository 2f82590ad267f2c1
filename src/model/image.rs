//! Images pulled out of PDF pages.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An embedded image written to disk as PNG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// Page number (1-indexed)
    pub page: u32,

    /// Image index on the page (1-indexed)
    pub index: u32,

    /// Path of the written PNG file
    pub path: PathBuf,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl ExtractedImage {
    /// File name used for an image: `page{P}_img{I}.png`.
    pub fn file_name_for(page: u32, index: u32) -> String {
        format!("page{}_img{}.png", page, index)
    }

    /// File name of the written image.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| Self::file_name_for(self.page, self.index))
    }
}
