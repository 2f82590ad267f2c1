//! docsift CLI - PDF and image text extraction tool

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docsift::enhance::{DEFAULT_MODEL, GROQ_API_BASE};
use docsift::parser::{image_dimensions, MIN_IMAGE_SIDE};
use docsift::{
    extract_images, Document, DocumentKind, EnhanceOptions, OcrOptions, OutputFormat, PdfSource,
    Pipeline, PipelineOptions, TableBackendRegistry, TableMethod, TesseractEngine,
};

#[derive(Parser)]
#[command(name = "docsift")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract text, tables and OCR text from PDFs and images", long_about = None)]
struct Cli {
    /// Input PDF or image file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF or image to text
    Convert(ConvertArgs),

    /// Show page and image counts and the available tools
    Info {
        /// Input PDF or image file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Extract embedded images from a PDF
    Images {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct ConvertArgs {
    /// Input PDF or image file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to <name>_extracted.txt next to the input)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Skip embedded image extraction
    #[arg(long)]
    no_images: bool,

    /// Skip table extraction
    #[arg(long)]
    no_tables: bool,

    /// Table extraction backend
    #[arg(long, value_enum, default_value = "all")]
    table_method: TableMethodArg,

    /// Skip OCR
    #[arg(long)]
    no_ocr: bool,

    /// Don't rebuild table rows from OCR word positions
    #[arg(long)]
    no_table_detection: bool,

    /// OCR language (tesseract code, e.g. eng or eng+deu)
    #[arg(long, default_value = "eng")]
    ocr_lang: String,

    /// Clean up the result with a Groq-hosted LLM
    #[arg(long)]
    use_groq: bool,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Groq model
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "GROQ_API_BASE", default_value = GROQ_API_BASE, hide = true)]
    api_base: String,

    /// Keep extracted images in this directory
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,
}

impl ConvertArgs {
    /// Defaults for the `docsift FILE [OUTPUT]` shorthand.
    fn defaults(input: PathBuf, output: Option<PathBuf>) -> Self {
        Self {
            input,
            output,
            no_images: false,
            no_tables: false,
            table_method: TableMethodArg::All,
            no_ocr: false,
            no_table_detection: false,
            ocr_lang: "eng".to_string(),
            use_groq: false,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: GROQ_API_BASE.to_string(),
            image_dir: None,
            format: FormatArg::Text,
        }
    }

    fn to_options(&self) -> PipelineOptions {
        let ocr = OcrOptions::new()
            .with_language(&self.ocr_lang)
            .with_table_detection(!self.no_table_detection);

        let mut options = PipelineOptions::new()
            .with_images(!self.no_images)
            .with_tables(!self.no_tables)
            .with_table_method(self.table_method.into())
            .with_ocr(ocr)
            .with_output_format(self.format.into());

        if self.no_ocr {
            options = options.without_ocr();
        }
        if let Some(dir) = &self.image_dir {
            options = options.with_image_dir(dir);
        }
        if self.use_groq {
            options = options.with_enhancement(
                EnhanceOptions::new(self.api_key.clone().unwrap_or_default())
                    .with_model(&self.model)
                    .with_api_base(&self.api_base),
            );
        }
        options
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TableMethodArg {
    /// Built-in positional table finder
    #[value(alias = "pymupdf")]
    Builtin,
    /// tabula-java
    Tabula,
    /// Camelot
    Camelot,
    /// Every available backend
    All,
}

impl From<TableMethodArg> for TableMethod {
    fn from(method: TableMethodArg) -> Self {
        match method {
            TableMethodArg::Builtin => TableMethod::Builtin,
            TableMethodArg::Tabula => TableMethod::Tabula,
            TableMethodArg::Camelot => TableMethod::Camelot,
            TableMethodArg::All => TableMethod::All,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Banner-delimited plain text
    Text,
    /// JSON with one entry per section
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert(args)) => cmd_convert(&args),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Images { input, output }) => cmd_images(&input, output.as_deref()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&ConvertArgs::defaults(input, cli.output))
            } else {
                println!("{}", "Usage: docsift <FILE> [OUTPUT]".yellow());
                println!("       docsift --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(args: &ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(args.to_options())?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Processing {}...", args.input.display()));

    let result = pipeline.run(&args.input, args.output.as_deref());
    pb.finish_and_clear();
    let summary = result?;

    println!(
        "{} {}",
        "Saved to".green(),
        summary.output.display().to_string().bold()
    );
    println!("  {} {} sections", "├─".dimmed(), summary.sections);
    println!("  {} {} characters", "├─".dimmed(), summary.characters);
    println!("  {} {} images", "├─".dimmed(), summary.images);
    println!(
        "  {} enhanced: {}",
        "└─".dimmed(),
        if summary.enhanced { "yes" } else { "no" }
    );

    if args.use_groq && !summary.enhanced {
        println!(
            "{}",
            "Enhancement failed; the original text was written.".yellow()
        );
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let document = Document::open(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Kind".bold(), document.kind);

    if document.kind == DocumentKind::Pdf {
        let source = PdfSource::open(input)?;
        let dims = image_dimensions(&source);
        let qualifying = dims
            .iter()
            .filter(|(_, w, h)| *w >= MIN_IMAGE_SIDE && *h >= MIN_IMAGE_SIDE)
            .count();

        println!("{}: {}", "Pages".bold(), source.page_count());
        println!(
            "{}: {} ({} at least {}px)",
            "Images".bold(),
            dims.len(),
            qualifying,
            MIN_IMAGE_SIDE
        );
    }

    println!();
    println!("{}", "Available Tools".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let registry = TableBackendRegistry::detect();
    for kind in docsift::TableBackendKind::ALL {
        println!(
            "{}: {}",
            kind.name().bold(),
            availability(registry.is_available(kind))
        );
    }
    println!(
        "{}: {}",
        "tesseract".bold(),
        availability(TesseractEngine::detect().is_some())
    );

    Ok(())
}

fn availability(available: bool) -> colored::ColoredString {
    if available {
        "available".green()
    } else {
        "not found".dimmed()
    }
}

fn cmd_images(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let document = Document::open(input)?;
    if !document.is_pdf() {
        return Err(format!("{} is not a PDF", input.display()).into());
    }

    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_images", stem))
    });

    let images = extract_images(input, &output_dir)?;
    for image in &images {
        println!(
            "{} {} ({}x{})",
            "Extracted".green(),
            image.file_name(),
            image.width,
            image.height
        );
    }

    println!(
        "\n{} {} images extracted to {}",
        "Done!".green().bold(),
        images.len(),
        output_dir.display()
    );

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docsift".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF and image text extraction tool");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorthand_parses_positionals() {
        let cli = Cli::try_parse_from(["docsift", "report.pdf", "out.txt"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.input, Some(PathBuf::from("report.pdf")));
        assert_eq!(cli.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_convert_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "docsift",
            "convert",
            "scan.pdf",
            "--no-images",
            "--table-method",
            "pymupdf",
            "--no-table-detection",
            "--ocr-lang",
            "deu",
            "--format",
            "json",
        ])
        .unwrap();

        let Some(Commands::Convert(args)) = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(args.table_method, TableMethodArg::Builtin);

        let options = args.to_options();
        assert!(!options.extract_images);
        assert!(options.extract_tables);
        assert_eq!(options.table_method, TableMethod::Builtin);
        assert!(options.ocr.enabled);
        assert!(!options.ocr.detect_tables);
        assert_eq!(options.ocr.language, "deu");
        assert_eq!(options.output_format, OutputFormat::Json);
        assert!(options.enhance.is_none());
    }

    #[test]
    fn test_use_groq_with_key() {
        let cli = Cli::try_parse_from([
            "docsift",
            "convert",
            "scan.pdf",
            "--use-groq",
            "--api-key",
            "gsk_test",
            "--model",
            "llama-3.3-70b-versatile",
        ])
        .unwrap();

        let Some(Commands::Convert(args)) = cli.command else {
            panic!("expected convert");
        };
        let enhance = args.to_options().enhance.unwrap();
        assert_eq!(enhance.api_key, "gsk_test");
        assert_eq!(enhance.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_invalid_table_method_rejected() {
        assert!(
            Cli::try_parse_from(["docsift", "convert", "a.pdf", "--table-method", "pdfplumber"])
                .is_err()
        );
    }

    #[test]
    fn test_missing_input_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.pdf");

        let args = ConvertArgs::defaults(input.clone(), None);
        assert!(cmd_convert(&args).is_err());
        assert!(!dir.path().join("missing_extracted.txt").exists());
    }
}
