//! Rendering of the aggregated sections to the output formats.

mod json;
mod text;

pub use json::{to_json, JsonFormat, JsonOutput};
pub use text::{banner, to_text, EMPTY_SECTION};

use serde::{Deserialize, Serialize};

/// Format of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Banner-delimited plain text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// File extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}
