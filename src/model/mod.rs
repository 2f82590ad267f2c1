//! Data model shared by the extractors, the pipeline and the renderers.
//!
//! Everything the extractors produce collapses to text early; the only
//! structure kept until the final write is the ordered section list.

mod document;
mod image;
mod section;
mod table;

pub use document::{Document, DocumentKind};
pub use image::ExtractedImage;
pub use section::{AggregateText, Section, SectionKind};
pub use table::{render_tables, TableBackendKind, TableText};
