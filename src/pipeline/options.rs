//! Pipeline options and configuration.

use std::path::PathBuf;

use crate::enhance::EnhanceOptions;
use crate::ocr::OcrOptions;
use crate::render::OutputFormat;
use crate::tables::TableMethod;

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Extract embedded images from PDFs
    pub extract_images: bool,

    /// Run table backends on PDFs
    pub extract_tables: bool,

    /// Which table backends to run
    pub table_method: TableMethod,

    /// OCR settings
    pub ocr: OcrOptions,

    /// LLM enhancement settings (disabled when `None`)
    pub enhance: Option<EnhanceOptions>,

    /// Keep extracted images here instead of a temporary directory
    pub image_dir: Option<PathBuf>,

    /// Output file format
    pub output_format: OutputFormat,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            extract_images: true,
            extract_tables: true,
            table_method: TableMethod::All,
            ocr: OcrOptions::default(),
            enhance: None,
            image_dir: None,
            output_format: OutputFormat::Text,
        }
    }
}

impl PipelineOptions {
    /// Create new pipeline options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Enable or disable table extraction.
    pub fn with_tables(mut self, extract: bool) -> Self {
        self.extract_tables = extract;
        self
    }

    /// Set the table method.
    pub fn with_table_method(mut self, method: TableMethod) -> Self {
        self.table_method = method;
        self
    }

    /// Set OCR options.
    pub fn with_ocr(mut self, ocr: OcrOptions) -> Self {
        self.ocr = ocr;
        self
    }

    /// Disable OCR.
    pub fn without_ocr(mut self) -> Self {
        self.ocr.enabled = false;
        self
    }

    /// Enable LLM enhancement.
    pub fn with_enhancement(mut self, enhance: EnhanceOptions) -> Self {
        self.enhance = Some(enhance);
        self
    }

    /// Keep extracted images in a directory.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Set the output format.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}
