//! Error types for the docsift library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docsift operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not exist.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The file extension is neither PDF nor a supported image type.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file does not start with a PDF header.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error decoding or writing an embedded image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error from the image codec.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The OCR engine failed or produced unreadable output.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// A table backend failed at runtime.
    #[error("Table backend '{backend}' failed: {message}")]
    TableBackend { backend: String, message: String },

    /// An external program could not be started or exited with an error.
    #[error("{program} failed: {message}")]
    Tool { program: String, message: String },

    /// The completion endpoint returned an unusable response.
    #[error("Enhancement error: {0}")]
    Enhance(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// AI enhancement was requested but no API key was supplied.
    #[error("AI enhancement requested but no API key was provided (use --api-key or set GROQ_API_KEY)")]
    MissingCredential,

    /// Nothing could be extracted from the input.
    #[error("No text could be extracted from the document")]
    EmptyExtraction,

    /// Error while rendering output.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Build a [`Error::TableBackend`] for the named backend.
    pub fn table_backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Error::TableBackend {
            backend: backend.into(),
            message: message.into(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::InputNotFound(PathBuf::from("missing.pdf"));
        assert_eq!(err.to_string(), "Input file not found: missing.pdf");

        let err = Error::Tool {
            program: "tesseract".to_string(),
            message: "exit status: 1 (read error)".to_string(),
        };
        assert_eq!(err.to_string(), "tesseract failed: exit status: 1 (read error)");

        let err = Error::table_backend("tabula", "exit status 1");
        assert_eq!(err.to_string(), "Table backend 'tabula' failed: exit status 1");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
