//! In-process table finder built on positioned text spans.

use std::path::Path;

use crate::error::Result;
use crate::model::{TableBackendKind, TableText};
use crate::parser::{page_spans, PdfSource};

use super::detector::TableDetector;
use super::format::grid_or_pipes;
use super::TableBackend;

/// Per-page positional table finder.
#[derive(Debug, Default)]
pub struct BuiltinTables {
    detector: TableDetector,
}

impl BuiltinTables {
    /// Create a finder with the default detector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a finder with a custom detector.
    pub fn with_detector(detector: TableDetector) -> Self {
        Self { detector }
    }

    /// Find tables in an already opened PDF.
    pub fn extract_from(&self, source: &PdfSource) -> Vec<TableText> {
        let mut tables = Vec::new();

        for (page_num, page_id) in source.pages() {
            let spans = match page_spans(source, page_id) {
                Ok(spans) => spans,
                Err(e) => {
                    log::warn!("Skipping tables on page {}: {}", page_num, e);
                    continue;
                }
            };

            for detected in self.detector.detect(&spans) {
                let body = grid_or_pipes(&detected.to_grid());
                tables.push(
                    TableText::new(TableBackendKind::Builtin, tables.len() + 1, body)
                        .with_page(page_num),
                );
            }
        }

        tables
    }
}

impl TableBackend for BuiltinTables {
    fn kind(&self) -> TableBackendKind {
        TableBackendKind::Builtin
    }

    fn extract(&self, pdf: &Path) -> Result<Vec<TableText>> {
        let source = PdfSource::open(pdf)?;
        Ok(self.extract_from(&source))
    }
}
