//! Orchestration of a conversion run.
//!
//! A [`Pipeline`] resolves its capabilities once (table backends, OCR
//! engine, completion client), then runs every enabled extractor over an
//! input and collects the results into an [`AggregateText`]. Only input
//! errors, a missing credential and an empty result abort a run; every other
//! failure is logged and skipped.

mod options;

pub use options::PipelineOptions;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::enhance::{CompletionClient, GroqClient, TextEnhancer};
use crate::error::{Error, Result};
use crate::model::{render_tables, AggregateText, Document, DocumentKind, Section, SectionKind};
use crate::ocr::{OcrEngine, OcrProcessor, TesseractEngine};
use crate::parser::{extract_images_from, extract_text_from, PdfSource};
use crate::render::{to_json, to_text, JsonFormat, OutputFormat};
use crate::tables::TableBackendRegistry;

/// Title of the native text section.
pub const TEXT_SECTION_TITLE: &str = "EXTRACTED TEXT FROM PDF";

/// Title of the OCR section for images pulled out of a PDF.
pub const PDF_OCR_SECTION_TITLE: &str = "OCR TEXT FROM IMAGES";

/// Title of the OCR section for a raster image input.
pub const IMAGE_OCR_SECTION_TITLE: &str = "OCR TEXT FROM IMAGE";

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionSummary {
    /// Path of the written file
    pub output: PathBuf,

    /// Number of sections
    pub sections: usize,

    /// Characters written
    pub characters: usize,

    /// Images extracted from the PDF
    pub images: usize,

    /// Whether enhancement succeeded
    pub enhanced: bool,
}

struct Extraction {
    text: AggregateText,
    images: usize,
}

/// Default output path: `<stem>_extracted.<ext>` next to the input.
pub fn default_output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    input.with_file_name(format!("{}_extracted.{}", stem, format.extension()))
}

/// A configured conversion pipeline.
pub struct Pipeline {
    options: PipelineOptions,
    tables: TableBackendRegistry,
    ocr: Option<Box<dyn OcrEngine>>,
    completion: Option<Box<dyn CompletionClient>>,
}

impl Pipeline {
    /// Resolve capabilities for the given options.
    ///
    /// Fails with [`Error::MissingCredential`] when enhancement is requested
    /// without an API key.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        let completion = match &options.enhance {
            Some(enhance) => {
                Some(Box::new(GroqClient::new(enhance)?) as Box<dyn CompletionClient>)
            }
            None => None,
        };

        let ocr = if options.ocr.enabled {
            let engine = TesseractEngine::detect();
            if engine.is_none() {
                log::warn!("tesseract not found on PATH, OCR will be skipped");
            }
            engine.map(|e| Box::new(e) as Box<dyn OcrEngine>)
        } else {
            None
        };

        let tables = if options.extract_tables {
            TableBackendRegistry::detect()
        } else {
            TableBackendRegistry::empty()
        };

        Ok(Self {
            options,
            tables,
            ocr,
            completion,
        })
    }

    /// Replace the table backend registry.
    pub fn with_table_registry(mut self, registry: TableBackendRegistry) -> Self {
        self.tables = registry;
        self
    }

    /// Replace the OCR engine.
    pub fn with_ocr_engine<E: OcrEngine + 'static>(mut self, engine: E) -> Self {
        self.ocr = Some(Box::new(engine));
        self
    }

    /// Replace the completion client.
    pub fn with_completion_client<C: CompletionClient + 'static>(mut self, client: C) -> Self {
        self.completion = Some(Box::new(client));
        self
    }

    /// Options this pipeline runs with.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Resolved table backends.
    pub fn table_registry(&self) -> &TableBackendRegistry {
        &self.tables
    }

    /// Check if an OCR engine is available.
    pub fn has_ocr_engine(&self) -> bool {
        self.ocr.is_some()
    }

    /// Run every enabled extractor over an input.
    pub fn extract(&self, input: &Path) -> Result<AggregateText> {
        self.collect(input).map(|e| e.text)
    }

    /// Extract, render, optionally enhance and write the output file.
    ///
    /// `output` defaults to [`default_output_path`]. Nothing is written
    /// unless every step before the write succeeds.
    pub fn run(&self, input: &Path, output: Option<&Path>) -> Result<ConversionSummary> {
        let extraction = self.collect(input)?;
        let agg = &extraction.text;

        let text = to_text(agg);
        let enhanced = self.enhance(&text);

        let contents = match self.options.output_format {
            OutputFormat::Text => enhanced.clone().unwrap_or(text),
            OutputFormat::Json => {
                let source = input
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                to_json(&source, agg, enhanced.as_deref(), JsonFormat::Pretty)?
            }
        };

        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_output_path(input, self.options.output_format));
        write_atomic(&output, &contents)?;
        log::info!("Wrote {}", output.display());

        Ok(ConversionSummary {
            output,
            sections: agg.len(),
            characters: contents.chars().count(),
            images: extraction.images,
            enhanced: enhanced.is_some(),
        })
    }

    fn collect(&self, input: &Path) -> Result<Extraction> {
        let document = Document::open(input)?;
        log::info!("Processing {} ({})", document.file_name(), document.kind);

        let mut extraction = Extraction {
            text: AggregateText::new(),
            images: 0,
        };

        match document.kind {
            DocumentKind::Pdf => self.collect_pdf(&document, &mut extraction),
            DocumentKind::Image => self.collect_image(&document, &mut extraction),
        }

        if !extraction.text.has_content() {
            return Err(Error::EmptyExtraction);
        }
        Ok(extraction)
    }

    fn collect_pdf(&self, document: &Document, out: &mut Extraction) {
        let source = match PdfSource::open(&document.path) {
            Ok(source) => Some(source),
            Err(e) => {
                log::warn!("Text extraction failed for {}: {}", document.file_name(), e);
                None
            }
        };

        if let Some(source) = &source {
            log::info!("Extracting text from {} page(s)", source.page_count());
            out.text.push(Section::new(
                SectionKind::Text,
                TEXT_SECTION_TITLE,
                extract_text_from(source),
            ));
        }

        if self.options.extract_tables {
            self.collect_tables(&document.path, &mut out.text);
        }

        if self.options.extract_images {
            if let Some(source) = &source {
                self.collect_pdf_images(source, out);
            }
        }
    }

    fn collect_tables(&self, pdf: &Path, agg: &mut AggregateText) {
        for backend in self.tables.select(self.options.table_method) {
            log::info!("Extracting tables with {}", backend.kind());
            let body = match backend.extract(pdf) {
                Ok(tables) => {
                    log::debug!("{} found {} table(s)", backend.kind(), tables.len());
                    render_tables(&tables)
                }
                Err(e) => {
                    log::warn!("Table extraction with {} failed: {}", backend.kind(), e);
                    String::new()
                }
            };
            agg.push(Section::new(
                SectionKind::Tables,
                backend.kind().section_title(),
                body,
            ));
        }
    }

    fn collect_pdf_images(&self, source: &PdfSource, out: &mut Extraction) {
        let scratch;
        let dir = match &self.options.image_dir {
            Some(dir) => dir.as_path(),
            None => {
                scratch = match tempfile::Builder::new().prefix("docsift-images-").tempdir() {
                    Ok(scratch) => scratch,
                    Err(e) => {
                        log::warn!("Cannot create a scratch directory for images: {}", e);
                        return;
                    }
                };
                scratch.path()
            }
        };

        let images = match extract_images_from(source, dir) {
            Ok(images) => images,
            Err(e) => {
                log::warn!("Image extraction failed: {}", e);
                return;
            }
        };
        log::info!("Extracted {} image(s) to {}", images.len(), dir.display());
        out.images = images.len();

        if images.is_empty() || !self.options.ocr.enabled {
            return;
        }
        if let Some(engine) = &self.ocr {
            let processor = OcrProcessor::new(engine.as_ref(), &self.options.ocr);
            out.text.push(Section::new(
                SectionKind::Ocr,
                PDF_OCR_SECTION_TITLE,
                processor.process_batch(&images),
            ));
        }
    }

    fn collect_image(&self, document: &Document, out: &mut Extraction) {
        if !self.options.ocr.enabled {
            log::warn!("OCR is disabled, nothing to extract from an image");
            return;
        }
        let Some(engine) = &self.ocr else {
            log::warn!("No OCR engine available for {}", document.file_name());
            return;
        };

        let processor = OcrProcessor::new(engine.as_ref(), &self.options.ocr);
        out.text.push(Section::new(
            SectionKind::Ocr,
            IMAGE_OCR_SECTION_TITLE,
            processor.recognize(&document.path),
        ));
    }

    fn enhance(&self, text: &str) -> Option<String> {
        let (client, options) = match (&self.completion, &self.options.enhance) {
            (Some(client), Some(options)) => (client, options),
            _ => return None,
        };

        match TextEnhancer::new(client.as_ref(), options).try_enhance(text) {
            Ok(enhanced) => Some(enhanced),
            Err(e) => {
                log::warn!("Enhancement failed, keeping original text: {}", e);
                None
            }
        }
    }
}

/// Write through a temporary file in the target directory, then rename.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(contents.as_bytes())?;
    staged.flush()?;
    staged.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/report.pdf"), OutputFormat::Text),
            PathBuf::from("/data/report_extracted.txt")
        );
        assert_eq!(
            default_output_path(Path::new("scan.PNG"), OutputFormat::Json),
            PathBuf::from("scan_extracted.json")
        );
    }

    #[test]
    fn test_write_atomic_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.txt");

        write_atomic(&path, "first").unwrap();
        write_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_missing_credential() {
        let options = PipelineOptions::new()
            .with_enhancement(crate::enhance::EnhanceOptions::new("  "));
        assert!(matches!(
            Pipeline::new(options),
            Err(Error::MissingCredential)
        ));
    }
}
