//! Optional LLM post-processing of the extracted text.
//!
//! Text is split into fixed-size character windows, each window is sent to
//! a chat-completion endpoint, and the answers are joined back in order. Any
//! failure returns the input untouched.

mod groq;

pub use groq::{GroqClient, DEFAULT_MODEL, GROQ_API_BASE};

use crate::error::Result;

/// Characters per request.
pub const CHUNK_SIZE: usize = 4000;

/// Instruction sent with every chunk.
pub const ENHANCE_SYSTEM_PROMPT: &str = "You are a document cleanup assistant. \
The user message is text extracted from a PDF by several tools, including OCR. \
Fix OCR errors, restore broken words and line wraps, and keep tables readable \
with aligned columns. Do not summarize, translate, or add commentary. \
Return only the cleaned text.";

/// One completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A chat-completion service.
pub trait CompletionClient {
    /// Return the assistant's answer to a single request.
    fn complete(&self, request: &CompletionRequest<'_>) -> Result<String>;
}

/// Enhancement settings.
#[derive(Clone, PartialEq)]
pub struct EnhanceOptions {
    /// API key
    pub api_key: String,

    /// Model name
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    pub api_base: String,

    /// Characters per request
    pub chunk_size: usize,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token limit per request
    pub max_tokens: u32,
}

impl std::fmt::Debug for EnhanceOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhanceOptions")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("chunk_size", &self.chunk_size)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl EnhanceOptions {
    /// Groq defaults with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            api_base: GROQ_API_BASE.to_string(),
            chunk_size: CHUNK_SIZE,
            temperature: 0.1,
            max_tokens: 4000,
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the chunk size. Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Split text into windows of `size` characters.
///
/// The last window may be shorter. Splits never fall inside a code point.
pub fn chunk_text(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (pos, _) in text.char_indices() {
        if count == size {
            chunks.push(&text[start..pos]);
            start = pos;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

/// Sends text through a completion client chunk by chunk.
pub struct TextEnhancer<'a> {
    client: &'a dyn CompletionClient,
    options: &'a EnhanceOptions,
}

impl<'a> TextEnhancer<'a> {
    /// Create an enhancer.
    pub fn new(client: &'a dyn CompletionClient, options: &'a EnhanceOptions) -> Self {
        Self { client, options }
    }

    /// Enhance every chunk, stopping at the first error.
    pub fn try_enhance(&self, text: &str) -> Result<String> {
        let chunks = chunk_text(text, self.options.chunk_size);
        log::info!("Enhancing {} chunk(s) with {}", chunks.len(), self.options.model);

        let mut out = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            log::debug!("Enhancing chunk {}/{}", i + 1, chunks.len());
            out.push(self.client.complete(&CompletionRequest {
                system: ENHANCE_SYSTEM_PROMPT,
                user: chunk,
                temperature: self.options.temperature,
                max_tokens: self.options.max_tokens,
            })?);
        }

        Ok(out.join("\n"))
    }

    /// Enhance text, returning it unchanged if any request fails.
    pub fn enhance(&self, text: &str) -> String {
        match self.try_enhance(text) {
            Ok(enhanced) => enhanced,
            Err(e) => {
                log::warn!("Enhancement failed, keeping original text: {}", e);
                text.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;

    struct Upper {
        seen: RefCell<Vec<(String, f32, u32)>>,
    }

    impl CompletionClient for Upper {
        fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
            assert_eq!(request.system, ENHANCE_SYSTEM_PROMPT);
            self.seen.borrow_mut().push((
                request.user.to_string(),
                request.temperature,
                request.max_tokens,
            ));
            Ok(request.user.to_uppercase())
        }
    }

    struct FailSecond {
        calls: RefCell<usize>,
    }

    impl CompletionClient for FailSecond {
        fn complete(&self, request: &CompletionRequest<'_>) -> Result<String> {
            *self.calls.borrow_mut() += 1;
            if *self.calls.borrow() == 2 {
                Err(Error::Enhance("rate limited".into()))
            } else {
                Ok(request.user.to_uppercase())
            }
        }
    }

    #[test]
    fn test_chunk_counts() {
        for len in [0usize, 1, 3999, 4000, 4001, 8000, 12345] {
            let text = "a".repeat(len);
            let chunks = chunk_text(&text, CHUNK_SIZE);
            assert_eq!(chunks.len(), len.div_ceil(CHUNK_SIZE), "len {}", len);
            assert_eq!(chunks.concat(), text);
        }
    }

    #[test]
    fn test_chunk_multibyte() {
        let text = "äöü€".repeat(3);
        let chunks = chunk_text(&text, 5);
        assert_eq!(chunks, vec!["äöü€ä", "öü€äö", "ü€"]);
        assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn test_enhance_joins_chunks_with_newline() {
        let client = Upper {
            seen: RefCell::new(Vec::new()),
        };
        let options = EnhanceOptions::new("key").with_chunk_size(3);

        let out = TextEnhancer::new(&client, &options).enhance("abcdefg");
        assert_eq!(out, "ABC\nDEF\nG");

        let seen = client.seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], ("abc".to_string(), 0.1, 4000));
    }

    #[test]
    fn test_enhance_fails_open() {
        let client = FailSecond {
            calls: RefCell::new(0),
        };
        let options = EnhanceOptions::new("key").with_chunk_size(2);
        let enhancer = TextEnhancer::new(&client, &options);

        assert!(enhancer.try_enhance("abcdef").is_err());
        *client.calls.borrow_mut() = 0;
        assert_eq!(enhancer.enhance("abcdef"), "abcdef");
        assert_eq!(*client.calls.borrow(), 2);
    }

    #[test]
    fn test_options_debug_redacts_key() {
        let options = EnhanceOptions::new("gsk_secret");
        assert!(!format!("{:?}", options).contains("gsk_secret"));
        assert_eq!(options.model, DEFAULT_MODEL);
    }
}
