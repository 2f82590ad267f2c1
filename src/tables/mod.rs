//! Table extraction backends and the registry that dispatches to them.
//!
//! Backends are resolved once, when the registry is built. A backend that is
//! not installed is simply absent from the registry and skipped during
//! dispatch; the caller never has to check for it.
//!
//! # Example
//!
//! ```no_run
//! use docsift::tables::{TableBackendRegistry, TableMethod};
//! use std::path::Path;
//!
//! let registry = TableBackendRegistry::detect();
//! for backend in registry.select(TableMethod::All) {
//!     let tables = backend.extract(Path::new("report.pdf"))?;
//!     println!("{}: {} tables", backend.kind(), tables.len());
//! }
//! # Ok::<(), docsift::Error>(())
//! ```

mod builtin;
mod camelot;
mod detector;
pub mod format;
mod tabula;

pub use builtin::BuiltinTables;
pub use camelot::{parse_camelot_json, CamelotBackend};
pub use detector::{DetectedTable, SpanRow, TableDetector, TableDetectorConfig};
pub use tabula::{parse_tabula_json, TabulaBackend, TabulaLauncher, TABULA_JAR_ENV};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{TableBackendKind, TableText};

/// A table extraction backend.
pub trait TableBackend {
    /// Which backend this is.
    fn kind(&self) -> TableBackendKind;

    /// Extract every table of a PDF as rendered text.
    fn extract(&self, pdf: &Path) -> Result<Vec<TableText>>;
}

/// Which backends to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMethod {
    /// Built-in positional finder only
    Builtin,
    /// tabula only
    Tabula,
    /// Camelot only
    Camelot,
    /// Every available backend
    #[default]
    All,
}

impl TableMethod {
    /// Backends this method asks for, in dispatch order.
    pub fn kinds(&self) -> Vec<TableBackendKind> {
        match self {
            TableMethod::Builtin => vec![TableBackendKind::Builtin],
            TableMethod::Tabula => vec![TableBackendKind::Tabula],
            TableMethod::Camelot => vec![TableBackendKind::Camelot],
            TableMethod::All => TableBackendKind::ALL.to_vec(),
        }
    }
}

/// Mapping from backend kind to an optional handle.
pub struct TableBackendRegistry {
    backends: BTreeMap<TableBackendKind, Option<Box<dyn TableBackend>>>,
}

impl TableBackendRegistry {
    /// A registry where every backend is absent.
    pub fn empty() -> Self {
        Self {
            backends: TableBackendKind::ALL.iter().map(|k| (*k, None)).collect(),
        }
    }

    /// Resolve every backend against the current machine.
    pub fn detect() -> Self {
        let registry = Self::empty()
            .with_backend(BuiltinTables::new())
            .with_optional(TabulaBackend::detect())
            .with_optional(CamelotBackend::detect());

        log::info!(
            "Table backends available: {}",
            registry
                .available()
                .iter()
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        registry
    }

    /// Install a backend under its own kind.
    pub fn with_backend<B: TableBackend + 'static>(mut self, backend: B) -> Self {
        self.backends.insert(backend.kind(), Some(Box::new(backend)));
        self
    }

    /// Install a backend if one was found.
    pub fn with_optional<B: TableBackend + 'static>(self, backend: Option<B>) -> Self {
        match backend {
            Some(b) => self.with_backend(b),
            None => self,
        }
    }

    /// Mark a backend as absent.
    pub fn without(mut self, kind: TableBackendKind) -> Self {
        self.backends.insert(kind, None);
        self
    }

    /// Check if a backend is present.
    pub fn is_available(&self, kind: TableBackendKind) -> bool {
        matches!(self.backends.get(&kind), Some(Some(_)))
    }

    /// Kinds of every present backend, in dispatch order.
    pub fn available(&self) -> Vec<TableBackendKind> {
        self.backends
            .iter()
            .filter(|(_, b)| b.is_some())
            .map(|(k, _)| *k)
            .collect()
    }

    /// Present backends for a method, in dispatch order. Absent ones are skipped.
    pub fn select(&self, method: TableMethod) -> Vec<&dyn TableBackend> {
        method
            .kinds()
            .into_iter()
            .filter_map(|kind| match self.backends.get(&kind) {
                Some(Some(backend)) => Some(backend.as_ref()),
                _ => {
                    log::debug!("Table backend {} not available, skipping", kind);
                    None
                }
            })
            .collect()
    }
}

impl Default for TableBackendRegistry {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(TableBackendKind);

    impl TableBackend for Fixed {
        fn kind(&self) -> TableBackendKind {
            self.0
        }

        fn extract(&self, _pdf: &Path) -> Result<Vec<TableText>> {
            Ok(vec![TableText::new(self.0, 1, "x")])
        }
    }

    #[test]
    fn test_method_kinds() {
        assert_eq!(TableMethod::Tabula.kinds(), vec![TableBackendKind::Tabula]);
        assert_eq!(TableMethod::All.kinds().len(), 3);
        assert_eq!(TableMethod::default(), TableMethod::All);
    }

    #[test]
    fn test_empty_registry_selects_nothing() {
        let registry = TableBackendRegistry::empty();
        assert!(registry.select(TableMethod::All).is_empty());
        assert!(registry.available().is_empty());
    }

    #[test]
    fn test_select_skips_absent_backends_in_order() {
        let registry = TableBackendRegistry::empty()
            .with_backend(Fixed(TableBackendKind::Camelot))
            .with_backend(Fixed(TableBackendKind::Builtin));

        let kinds: Vec<_> = registry
            .select(TableMethod::All)
            .iter()
            .map(|b| b.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![TableBackendKind::Builtin, TableBackendKind::Camelot]
        );
        assert!(registry.select(TableMethod::Tabula).is_empty());
    }

    #[test]
    fn test_without_removes_backend() {
        let registry = TableBackendRegistry::empty()
            .with_backend(Fixed(TableBackendKind::Tabula))
            .without(TableBackendKind::Tabula);
        assert!(!registry.is_available(TableBackendKind::Tabula));
    }

    #[test]
    fn test_detect_always_has_builtin() {
        let registry = TableBackendRegistry::detect();
        assert!(registry.is_available(TableBackendKind::Builtin));
    }
}
