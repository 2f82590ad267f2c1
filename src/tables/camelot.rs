//! Camelot backend.
//!
//! Camelot only exists as a Python package, so it is driven through a short
//! bridge script that prints every table as JSON, including Camelot's own
//! accuracy score.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{TableBackendKind, TableText};
use crate::tool::{find_program, probe, run_captured};

use super::format::{aligned, clean_cell, is_blank};
use super::TableBackend;

const BRIDGE_SCRIPT: &str = r#"
import json, sys
import camelot
tables = camelot.read_pdf(sys.argv[1], pages="all")
out = []
for t in tables:
    out.append({
        "page": int(t.page),
        "accuracy": float(t.parsing_report.get("accuracy", 0.0)),
        "rows": [[str(c) for c in row] for row in t.df.values.tolist()],
    })
json.dump(out, sys.stdout)
"#;

/// Camelot table extractor.
#[derive(Debug, Clone)]
pub struct CamelotBackend {
    python: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CamelotTable {
    page: Option<u32>,
    accuracy: Option<f32>,
    #[serde(default)]
    rows: Vec<Vec<String>>,
}

impl CamelotBackend {
    /// Create a backend using the given Python interpreter.
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Locate a Python interpreter that can import camelot.
    pub fn detect() -> Option<Self> {
        let python = find_program("python3").or_else(|| find_program("python"))?;
        if probe(Command::new(&python).args(["-c", "import camelot"])) {
            Some(Self::new(python))
        } else {
            log::debug!("camelot is not importable from {}", python.display());
            None
        }
    }
}

/// Parse the bridge script's JSON into rendered tables, skipping empty ones.
pub fn parse_camelot_json(json: &str) -> Result<Vec<TableText>> {
    let tables: Vec<CamelotTable> = serde_json::from_str(json)?;

    let mut out = Vec::new();
    for table in tables {
        let rows: Vec<Vec<String>> = table
            .rows
            .iter()
            .map(|row| row.iter().map(|c| clean_cell(c)).collect())
            .collect();
        if rows.is_empty() || is_blank(&rows) {
            continue;
        }

        let mut text = TableText::new(TableBackendKind::Camelot, out.len() + 1, aligned(&rows));
        text.page = table.page;
        text.confidence = table.accuracy;
        out.push(text);
    }
    Ok(out)
}

impl TableBackend for CamelotBackend {
    fn kind(&self) -> TableBackendKind {
        TableBackendKind::Camelot
    }

    fn extract(&self, pdf: &Path) -> Result<Vec<TableText>> {
        let mut cmd = Command::new(&self.python);
        cmd.arg("-c").arg(BRIDGE_SCRIPT).arg(pdf);

        let stdout = run_captured(&mut cmd).map_err(|e| Error::table_backend("camelot", e.to_string()))?;
        parse_camelot_json(&String::from_utf8_lossy(&stdout))
    }
}
