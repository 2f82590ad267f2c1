//! OCR over raster images via tesseract.
//!
//! The engine sits behind [`OcrEngine`] so the pipeline can run without a
//! tesseract install in tests. [`OcrProcessor`] adds image normalization,
//! optional row reconstruction and per-image failure isolation.

mod layout;

pub use layout::{group_into_lines, parse_tsv, Line, WordBox, MIN_WORD_CONFIDENCE, ROW_BAND};

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::ExtractedImage;
use crate::tool::{find_program, run_captured};

/// Page segmentation mode for a single uniform block of text.
pub const PSM_SINGLE_BLOCK: u32 = 6;

/// An OCR engine.
pub trait OcrEngine {
    /// Recognize the text of an image.
    fn image_to_string(&self, image: &Path, lang: &str, psm: Option<u32>) -> Result<String>;

    /// Recognize individual words with their boxes and confidences.
    fn image_to_words(&self, image: &Path, lang: &str) -> Result<Vec<WordBox>>;
}

/// The `tesseract` command line program.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: PathBuf,
}

impl TesseractEngine {
    /// Use the given tesseract binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Locate tesseract on `PATH`.
    pub fn detect() -> Option<Self> {
        find_program("tesseract").map(Self::new)
    }

    fn command(&self, image: &Path, lang: &str, psm: Option<u32>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(image).arg("stdout").arg("-l").arg(lang);
        if let Some(psm) = psm {
            cmd.arg("--psm").arg(psm.to_string());
        }
        cmd
    }

    fn run(&self, mut cmd: Command) -> Result<String> {
        let stdout = run_captured(&mut cmd).map_err(|e| Error::Ocr(e.to_string()))?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

impl OcrEngine for TesseractEngine {
    fn image_to_string(&self, image: &Path, lang: &str, psm: Option<u32>) -> Result<String> {
        self.run(self.command(image, lang, psm))
    }

    fn image_to_words(&self, image: &Path, lang: &str) -> Result<Vec<WordBox>> {
        let mut cmd = self.command(image, lang, None);
        cmd.arg("tsv");
        parse_tsv(&self.run(cmd)?)
    }
}

/// OCR settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrOptions {
    /// Run OCR at all
    pub enabled: bool,

    /// Also rebuild table rows from word positions
    pub detect_tables: bool,

    /// Tesseract language code(s), e.g. `eng` or `eng+deu`
    pub language: String,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            detect_tables: true,
            language: "eng".to_string(),
        }
    }
}

impl OcrOptions {
    /// Create default OCR options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn OCR off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Set the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Enable or disable row reconstruction.
    pub fn with_table_detection(mut self, enabled: bool) -> Self {
        self.detect_tables = enabled;
        self
    }
}

/// Runs an engine over images.
pub struct OcrProcessor<'a> {
    engine: &'a dyn OcrEngine,
    options: &'a OcrOptions,
}

impl<'a> OcrProcessor<'a> {
    /// Create a processor.
    pub fn new(engine: &'a dyn OcrEngine, options: &'a OcrOptions) -> Self {
        Self { engine, options }
    }

    /// OCR one image file.
    pub fn process_image(&self, path: &Path) -> Result<String> {
        let rgb = image::open(path)?.to_rgb8();

        let staged = tempfile::Builder::new()
            .prefix("docsift-ocr-")
            .suffix(".png")
            .tempfile()?;
        rgb.save_with_format(staged.path(), image::ImageFormat::Png)?;

        let lang = self.options.language.as_str();
        let mut text = self
            .engine
            .image_to_string(staged.path(), lang, None)?
            .trim()
            .to_string();

        if self.options.detect_tables {
            let block = self
                .engine
                .image_to_string(staged.path(), lang, Some(PSM_SINGLE_BLOCK))?;
            let lines = group_into_lines(&self.engine.image_to_words(staged.path(), lang)?);

            if !lines.is_empty() {
                if !text.is_empty() {
                    text.push_str("\n\n");
                }
                text.push_str("DETECTED TABLE STRUCTURE:\n");
                let block = block.trim();
                if !block.is_empty() {
                    text.push_str(block);
                    text.push('\n');
                }
                let rows: Vec<String> = lines.iter().map(Line::render).collect();
                text.push_str(&rows.join("\n"));
            }
        }

        Ok(text)
    }

    /// OCR one image, turning any failure into empty text.
    pub fn recognize(&self, path: &Path) -> String {
        match self.process_image(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("OCR failed for {}: {}", path.display(), e);
                String::new()
            }
        }
    }

    /// OCR extracted images into one block per image that produced text.
    pub fn process_batch(&self, images: &[ExtractedImage]) -> String {
        let mut blocks = Vec::new();

        for image in images {
            let text = self.recognize(&image.path);
            if text.trim().is_empty() {
                log::debug!("No OCR text for {}", image.file_name());
                continue;
            }
            blocks.push(format!(
                "--- Image: {} (page {}) ---\n{}",
                image.file_name(),
                image.page,
                text
            ));
        }

        blocks.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::cell::RefCell;

    struct ScriptedEngine {
        words: Vec<WordBox>,
        calls: RefCell<Vec<Option<u32>>>,
    }

    impl ScriptedEngine {
        fn new(words: Vec<WordBox>) -> Self {
            Self {
                words,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn image_to_string(&self, image: &Path, _lang: &str, psm: Option<u32>) -> Result<String> {
            assert_eq!(image.extension().and_then(|e| e.to_str()), Some("png"));
            self.calls.borrow_mut().push(psm);
            Ok(match psm {
                Some(_) => "Item Qty\n".to_string(),
                None => "Invoice 42\n".to_string(),
            })
        }

        fn image_to_words(&self, _image: &Path, _lang: &str) -> Result<Vec<WordBox>> {
            Ok(self.words.clone())
        }
    }

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn image_to_string(&self, _: &Path, _: &str, _: Option<u32>) -> Result<String> {
            Err(Error::Ocr("engine down".into()))
        }

        fn image_to_words(&self, _: &Path, _: &str) -> Result<Vec<WordBox>> {
            Err(Error::Ocr("engine down".into()))
        }
    }

    fn write_image(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(64, 64, Rgb([255, 255, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn record(path: PathBuf, page: u32) -> ExtractedImage {
        ExtractedImage {
            page,
            index: 1,
            path,
            width: 64,
            height: 64,
        }
    }

    #[test]
    fn test_plain_ocr_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "scan.png");
        let engine = ScriptedEngine::new(vec![]);
        let options = OcrOptions::new().with_table_detection(false);

        let text = OcrProcessor::new(&engine, &options)
            .process_image(&path)
            .unwrap();
        assert_eq!(text, "Invoice 42");
        assert_eq!(*engine.calls.borrow(), vec![None]);
    }

    #[test]
    fn test_table_structure_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "scan.jpg");
        let engine = ScriptedEngine::new(vec![
            WordBox::new("Qty", 100, 12, 90.0),
            WordBox::new("Item", 10, 14, 95.0),
        ]);
        let options = OcrOptions::new();

        let text = OcrProcessor::new(&engine, &options)
            .process_image(&path)
            .unwrap();
        assert_eq!(
            text,
            "Invoice 42\n\nDETECTED TABLE STRUCTURE:\nItem Qty\nItem | Qty"
        );
        assert_eq!(*engine.calls.borrow(), vec![None, Some(PSM_SINGLE_BLOCK)]);
    }

    #[test]
    fn test_no_structure_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "scan.png");
        let engine = ScriptedEngine::new(vec![WordBox::new("noise", 0, 0, 5.0)]);
        let options = OcrOptions::new();

        let text = OcrProcessor::new(&engine, &options)
            .process_image(&path)
            .unwrap();
        assert_eq!(text, "Invoice 42");
    }

    #[test]
    fn test_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_image(dir.path(), "page1_img1.png");
        let missing = dir.path().join("page2_img1.png");
        let engine = ScriptedEngine::new(vec![]);
        let options = OcrOptions::new().with_table_detection(false);

        let out = OcrProcessor::new(&engine, &options)
            .process_batch(&[record(missing, 2), record(good, 1)]);
        assert_eq!(out, "--- Image: page1_img1.png (page 1) ---\nInvoice 42");
    }

    #[test]
    fn test_engine_failure_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "scan.png");
        let options = OcrOptions::new();

        let processor = OcrProcessor::new(&FailingEngine, &options);
        assert!(processor.process_image(&path).is_err());
        assert_eq!(processor.recognize(&path), "");
        assert_eq!(processor.process_batch(&[record(path, 1)]), "");
    }

    #[test]
    fn test_tesseract_command_line() {
        let engine = TesseractEngine::new("/usr/bin/tesseract");
        let cmd = engine.command(Path::new("in.png"), "eng", Some(6));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["in.png", "stdout", "-l", "eng", "--psm", "6"]);
    }
}
