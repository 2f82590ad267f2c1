//! Word boxes from tesseract's TSV output and the row heuristic built on them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Words at or below this confidence are dropped.
pub const MIN_WORD_CONFIDENCE: f32 = 30.0;

/// Height of a row band in pixels.
pub const ROW_BAND: i32 = 10;

/// A recognized word and its bounding box in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBox {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    /// Recognition confidence, 0-100 (-1 for non-word rows)
    pub confidence: f32,
}

impl WordBox {
    /// Create a word box with zero size.
    pub fn new(text: impl Into<String>, left: i32, top: i32, confidence: f32) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width: 0,
            height: 0,
            confidence,
        }
    }
}

/// A reconstructed row of words.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Band key, `(top / 10) * 10`
    pub band: i32,
    /// Words sorted by `left`
    pub words: Vec<WordBox>,
}

impl Line {
    /// Words joined with ` | `.
    pub fn render(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.trim())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Parse tesseract TSV output into word boxes.
///
/// Column positions are taken from the header row. Rows without text
/// (page, block, paragraph and line records) are skipped.
pub fn parse_tsv(tsv: &str) -> Result<Vec<WordBox>> {
    let mut lines = tsv.lines();
    let header = lines
        .next()
        .ok_or_else(|| Error::Ocr("empty TSV output".to_string()))?;

    let columns: Vec<&str> = header.split('\t').collect();
    let column = |name: &str| {
        columns
            .iter()
            .position(|c| c.trim() == name)
            .ok_or_else(|| Error::Ocr(format!("TSV output has no '{}' column", name)))
    };
    let left = column("left")?;
    let top = column("top")?;
    let width = column("width")?;
    let height = column("height")?;
    let conf = column("conf")?;
    let text = column("text")?;

    let mut words = Vec::new();
    for row in lines {
        let fields: Vec<&str> = row.split('\t').collect();
        let word = match fields.get(text) {
            Some(t) if !t.trim().is_empty() => t.trim(),
            _ => continue,
        };

        let int = |i: usize| {
            fields
                .get(i)
                .and_then(|v| v.trim().parse::<i32>().ok())
                .unwrap_or(0)
        };
        let confidence = fields
            .get(conf)
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(-1.0);

        words.push(WordBox {
            text: word.to_string(),
            left: int(left),
            top: int(top),
            width: int(width),
            height: int(height),
            confidence,
        });
    }

    Ok(words)
}

/// Rebuild rows from word boxes.
///
/// Confident, non-blank words are bucketed by `(top / 10) * 10`; each bucket
/// is sorted by `left` and buckets come out top to bottom.
pub fn group_into_lines(words: &[WordBox]) -> Vec<Line> {
    let mut bands: BTreeMap<i32, Vec<WordBox>> = BTreeMap::new();

    for word in words {
        if word.confidence <= MIN_WORD_CONFIDENCE || word.text.trim().is_empty() {
            continue;
        }
        let band = (word.top / ROW_BAND) * ROW_BAND;
        bands.entry(band).or_default().push(word.clone());
    }

    bands
        .into_iter()
        .map(|(band, mut words)| {
            words.sort_by_key(|w| w.left);
            Line { band, words }
        })
        .collect()
}
