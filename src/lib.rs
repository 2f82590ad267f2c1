//! # docsift
//!
//! Text, table and OCR extraction from PDFs and raster images.
//!
//! A conversion combines the native text layer of a PDF, the output of
//! every available table backend, OCR of embedded images and, optionally,
//! an LLM cleanup pass. The result is one text (or JSON) file with a
//! titled section per source.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsift::{Pipeline, PipelineOptions, TableMethod};
//! use std::path::Path;
//!
//! fn main() -> docsift::Result<()> {
//!     let options = PipelineOptions::new().with_table_method(TableMethod::Builtin);
//!     let pipeline = Pipeline::new(options)?;
//!
//!     let summary = pipeline.run(Path::new("report.pdf"), None)?;
//!     println!("{} sections written to {}", summary.sections, summary.output.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! - **tesseract** for OCR
//! - **tabula-java** (`tabula` on `PATH`, or `TABULA_JAR` plus `java`)
//! - **Camelot** (importable from `python3`)
//!
//! Missing tools are detected up front and skipped; only the built-in table
//! finder and the text layer are always available.

pub mod detect;
pub mod enhance;
pub mod error;
pub mod model;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod tables;
mod tool;

pub use detect::{detect_kind, is_pdf_bytes, IMAGE_EXTENSIONS};
pub use enhance::{chunk_text, CompletionClient, EnhanceOptions, GroqClient, TextEnhancer};
pub use error::{Error, Result};
pub use model::{
    AggregateText, Document, DocumentKind, ExtractedImage, Section, SectionKind,
    TableBackendKind, TableText,
};
pub use ocr::{OcrEngine, OcrOptions, OcrProcessor, TesseractEngine, WordBox};
pub use parser::{extract_images, extract_text, PdfSource};
pub use pipeline::{default_output_path, ConversionSummary, Pipeline, PipelineOptions};
pub use render::OutputFormat;
pub use tables::{TableBackend, TableBackendRegistry, TableMethod};

use std::path::Path;

/// Convert a file with default options.
///
/// The output goes to `<stem>_extracted.txt` next to the input unless
/// `output` is given.
///
/// # Example
///
/// ```no_run
/// use docsift::convert_file;
///
/// let summary = convert_file("scan.png", None).unwrap();
/// println!("{} characters", summary.characters);
/// ```
pub fn convert_file<P: AsRef<Path>>(input: P, output: Option<&Path>) -> Result<ConversionSummary> {
    Pipeline::new(PipelineOptions::default())?.run(input.as_ref(), output)
}

/// Extract the section list of a file with the given options, without writing anything.
pub fn extract_sections<P: AsRef<Path>>(
    input: P,
    options: PipelineOptions,
) -> Result<AggregateText> {
    Pipeline::new(options)?.extract(input.as_ref())
}
