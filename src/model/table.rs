//! Table types.

use serde::{Deserialize, Serialize};

/// Table extraction backends, in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableBackendKind {
    /// In-process positional table finder
    Builtin,
    /// tabula-java (bordered/stream tables)
    Tabula,
    /// Camelot (lattice tables with accuracy scores)
    Camelot,
}

impl TableBackendKind {
    /// All backends in dispatch order.
    pub const ALL: [TableBackendKind; 3] = [
        TableBackendKind::Builtin,
        TableBackendKind::Tabula,
        TableBackendKind::Camelot,
    ];

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            TableBackendKind::Builtin => "builtin",
            TableBackendKind::Tabula => "tabula",
            TableBackendKind::Camelot => "camelot",
        }
    }

    /// Section title for this backend's tables.
    pub fn section_title(&self) -> String {
        let label = match self {
            TableBackendKind::Builtin => "BUILT-IN",
            TableBackendKind::Tabula => "TABULA",
            TableBackendKind::Camelot => "CAMELOT",
        };
        format!("TABLES EXTRACTED WITH {}", label)
    }
}

impl std::fmt::Display for TableBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A detected table, already rendered to text by its backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableText {
    /// Backend that produced the table
    pub backend: TableBackendKind,

    /// Page number, when the backend reports it (1-indexed)
    pub page: Option<u32>,

    /// Table number within the backend's output (1-indexed)
    pub index: usize,

    /// Backend accuracy score in percent (Camelot only)
    pub confidence: Option<f32>,

    /// Rendered table body
    pub body: String,
}

impl TableText {
    /// Create a table text block.
    pub fn new(backend: TableBackendKind, index: usize, body: impl Into<String>) -> Self {
        Self {
            backend,
            page: None,
            index,
            confidence: None,
            body: body.into(),
        }
    }

    /// Set the page number.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the accuracy score.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Header line for this table, e.g. `Table 2 (page 3):`.
    pub fn header(&self) -> String {
        let mut details = Vec::new();
        if let Some(page) = self.page {
            details.push(format!("page {}", page));
        }
        if let Some(confidence) = self.confidence {
            details.push(format!("accuracy: {:.2}%", confidence));
        }

        if details.is_empty() {
            format!("Table {}:", self.index)
        } else {
            format!("Table {} ({}):", self.index, details.join(", "))
        }
    }

    /// Header followed by the body.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.header(), self.body.trim_end())
    }
}

/// Join several tables into one section body.
pub fn render_tables(tables: &[TableText]) -> String {
    tables
        .iter()
        .map(TableText::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}
