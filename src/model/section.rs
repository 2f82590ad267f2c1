//! Output sections and the aggregate built from them.

use serde::{Deserialize, Serialize};

/// Section kinds. The derived order is the output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Native text layer of a PDF
    Text,
    /// Tables from one backend
    Tables,
    /// OCR output
    Ocr,
}

/// A titled block of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section kind
    pub kind: SectionKind,

    /// Banner title, e.g. `EXTRACTED TEXT FROM PDF`
    pub title: String,

    /// Section body
    pub body: String,
}

impl Section {
    /// Create a new section.
    pub fn new(kind: SectionKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Check if the body carries any non-whitespace text.
    pub fn has_content(&self) -> bool {
        !self.body.trim().is_empty()
    }
}

/// Ordered list of sections: text, then tables, then OCR.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateText {
    sections: Vec<Section>,
}

impl AggregateText {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a section after every section of the same or an earlier kind.
    pub fn push(&mut self, section: Section) {
        let pos = self
            .sections
            .iter()
            .position(|s| s.kind > section.kind)
            .unwrap_or(self.sections.len());
        self.sections.insert(pos, section);
    }

    /// Sections in output order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Check if there are no sections at all.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Check if at least one section has content.
    pub fn has_content(&self) -> bool {
        self.sections.iter().any(Section::has_content)
    }

    /// Count sections with the given title.
    pub fn count_titled(&self, title: &str) -> usize {
        self.sections.iter().filter(|s| s.title == title).count()
    }
}
