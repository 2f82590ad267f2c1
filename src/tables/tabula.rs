//! tabula-java backend.
//!
//! Runs either a `tabula` launcher on `PATH` or `java -jar $TABULA_JAR`, asks
//! for JSON output and renders each table as space-aligned text.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{TableBackendKind, TableText};
use crate::tool::{find_program, run_captured};

use super::format::{aligned, clean_cell, is_blank};
use super::TableBackend;

/// Environment variable naming the tabula-java jar.
pub const TABULA_JAR_ENV: &str = "TABULA_JAR";

/// How tabula is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabulaLauncher {
    /// A `tabula` executable
    Executable(PathBuf),
    /// `java -jar <jar>`
    Jar { java: PathBuf, jar: PathBuf },
}

/// tabula-java table extractor.
#[derive(Debug, Clone)]
pub struct TabulaBackend {
    launcher: TabulaLauncher,
}

#[derive(Debug, Deserialize)]
struct TabulaTable {
    #[serde(default)]
    data: Vec<Vec<TabulaCell>>,
}

#[derive(Debug, Deserialize)]
struct TabulaCell {
    #[serde(default)]
    text: String,
}

impl TabulaBackend {
    /// Create a backend with an explicit launcher.
    pub fn new(launcher: TabulaLauncher) -> Self {
        Self { launcher }
    }

    /// Locate tabula on this machine, if installed.
    pub fn detect() -> Option<Self> {
        if let Some(exe) = find_program("tabula") {
            return Some(Self::new(TabulaLauncher::Executable(exe)));
        }

        let jar = std::env::var_os(TABULA_JAR_ENV).map(PathBuf::from)?;
        if !jar.is_file() {
            log::debug!("{} points at a missing file: {}", TABULA_JAR_ENV, jar.display());
            return None;
        }
        let java = find_program("java")?;
        Some(Self::new(TabulaLauncher::Jar { java, jar }))
    }

    fn command(&self) -> Command {
        match &self.launcher {
            TabulaLauncher::Executable(exe) => Command::new(exe),
            TabulaLauncher::Jar { java, jar } => {
                let mut cmd = Command::new(java);
                cmd.arg("-jar").arg(jar);
                cmd
            }
        }
    }
}

/// Parse tabula's JSON output into rendered tables, skipping empty ones.
pub fn parse_tabula_json(json: &str) -> Result<Vec<TableText>> {
    let tables: Vec<TabulaTable> = serde_json::from_str(json)?;

    let mut out = Vec::new();
    for table in tables {
        let rows: Vec<Vec<String>> = table
            .data
            .iter()
            .map(|row| row.iter().map(|c| clean_cell(&c.text)).collect())
            .collect();
        if rows.is_empty() || is_blank(&rows) {
            continue;
        }
        out.push(TableText::new(
            TableBackendKind::Tabula,
            out.len() + 1,
            aligned(&rows),
        ));
    }
    Ok(out)
}

impl TableBackend for TabulaBackend {
    fn kind(&self) -> TableBackendKind {
        TableBackendKind::Tabula
    }

    fn extract(&self, pdf: &Path) -> Result<Vec<TableText>> {
        let mut cmd = self.command();
        cmd.args(["--pages", "all", "--format", "JSON", "--silent"])
            .arg(pdf);

        let stdout = run_captured(&mut cmd).map_err(|e| Error::table_backend("tabula", e.to_string()))?;
        let json = String::from_utf8_lossy(&stdout);
        if json.trim().is_empty() {
            return Ok(vec![]);
        }
        parse_tabula_json(&json)
    }
}
