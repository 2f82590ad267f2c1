//! JSON rendering of the section list.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{AggregateText, Section};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Shape of the JSON output file.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Input file name
    pub source: &'a str,

    /// Sections in output order
    pub sections: &'a [Section],

    /// Enhanced rendering of the text output, when enhancement ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_text: Option<&'a str>,
}

/// Convert sections to JSON.
pub fn to_json(
    source: &str,
    agg: &AggregateText,
    enhanced_text: Option<&str>,
    format: JsonFormat,
) -> Result<String> {
    let output = JsonOutput {
        source,
        sections: agg.sections(),
        enhanced_text,
    };

    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&output),
        JsonFormat::Compact => serde_json::to_string(&output),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
