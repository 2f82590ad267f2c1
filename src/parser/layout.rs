//! Positioned text spans read from page content streams.
//!
//! Only the text-positioning operators and the graphics-state matrix
//! (`q`, `Q`, `cm`) are interpreted; this is enough for the positional table
//! finder, which needs each string's origin and size in page space.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};

use super::source::{decode_text_simple, get_number, PdfSource};

/// Average glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// TJ adjustment (thousandths of text space) treated as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position information.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline, PDF coordinates grow upwards)
    pub y: f32,
    /// Estimated width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span, estimating its width from the character count.
    pub fn new(text: impl Into<String>, x: f32, y: f32, font_size: f32) -> Self {
        let text = text.into();
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }
}

/// Read positioned spans from a page.
pub fn page_spans(source: &PdfSource, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let doc = source.raw_doc();
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = source.page_content(page_id)?;
    parse_content(doc, &content, &fonts)
}

fn parse_content(
    doc: &LopdfDocument,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> Result<Vec<TextSpan>> {
    let content =
        lopdf::content::Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut font_name: Vec<u8> = Vec::new();
    let mut font_size: f32 = 12.0;
    let mut leading: f32 = 0.0;
    let mut matrix = Matrix::default();
    let mut ctm = Matrix::default();
    let mut saved: Vec<Matrix> = Vec::new();
    let mut in_text = false;

    let decode = |font: &[u8], bytes: &[u8]| -> String {
        fonts
            .get(font)
            .and_then(|f| f.get_font_encoding(doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    };

    for op in content.operations {
        match op.operator.as_str() {
            "q" => saved.push(ctm),
            "Q" => {
                if let Some(previous) = saved.pop() {
                    ctm = previous;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(&op.operands) {
                    ctm = m.multiply(&ctm);
                }
            }
            "BT" => {
                in_text = true;
                matrix = Matrix::default();
            }
            "ET" => in_text = false,
            "Tf" if op.operands.len() >= 2 => {
                if let Object::Name(name) = &op.operands[0] {
                    font_name = name.clone();
                }
                font_size = get_number(&op.operands[1]).unwrap_or(12.0);
            }
            "TL" => {
                leading = op.operands.first().and_then(get_number).unwrap_or(0.0);
            }
            "Td" | "TD" if op.operands.len() >= 2 => {
                let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                if op.operator == "TD" {
                    leading = -ty;
                }
                matrix.translate(tx, ty);
            }
            "Tm" => {
                if let Some(m) = matrix_operands(&op.operands) {
                    matrix = m;
                }
            }
            "T*" => matrix.next_line(leading),
            "Tj" | "'" | "\"" | "TJ" if in_text => {
                if op.operator == "'" || op.operator == "\"" {
                    matrix.next_line(leading);
                }

                let text = match op.operator.as_str() {
                    "TJ" => match op.operands.first() {
                        Some(Object::Array(items)) => {
                            let mut combined = String::new();
                            for item in items {
                                match item {
                                    Object::String(bytes, _) => {
                                        combined.push_str(&decode(&font_name, bytes))
                                    }
                                    other => {
                                        let adjustment = -get_number(other).unwrap_or(0.0);
                                        if adjustment > TJ_SPACE_THRESHOLD
                                            && !combined.is_empty()
                                            && !combined.ends_with(' ')
                                        {
                                            combined.push(' ');
                                        }
                                    }
                                }
                            }
                            combined
                        }
                        _ => String::new(),
                    },
                    op_name => {
                        let idx = if op_name == "\"" { 2 } else { 0 };
                        match op.operands.get(idx) {
                            Some(Object::String(bytes, _)) => decode(&font_name, bytes),
                            _ => String::new(),
                        }
                    }
                };

                if !text.trim().is_empty() {
                    let rendering = matrix.multiply(&ctm);
                    let (x, y) = rendering.position();
                    spans.push(TextSpan::new(text, x, y, font_size * rendering.scale()));
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Read the six operands of `cm` or `Tm`.
fn matrix_operands(operands: &[Object]) -> Option<Matrix> {
    let [a, b, c, d, e, f] = operands else {
        return None;
    };
    Some(Matrix {
        a: get_number(a)?,
        b: get_number(b)?,
        c: get_number(c)?,
        d: get_number(d)?,
        e: get_number(e)?,
        f: get_number(f)?,
    })
}

/// Affine matrix `[a b c d e f]`, used for both the text matrix and the CTM.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }
}

impl Matrix {
    /// `self × other`: apply `self` first, then `other`.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self, leading: f32) {
        let leading = if leading > 0.0 { leading } else { 12.0 };
        self.translate(0.0, -leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_width_estimate() {
        let span = TextSpan::new("abcd", 10.0, 20.0, 10.0);
        assert_eq!(span.width, 20.0);
    }

    #[test]
    fn test_text_matrix_translate_and_next_line() {
        let mut m = Matrix::default();
        m.translate(72.0, 700.0);
        assert_eq!(m.position(), (72.0, 700.0));

        m.next_line(14.0);
        assert_eq!(m.position(), (72.0, 686.0));

        m.next_line(0.0);
        assert_eq!(m.position(), (72.0, 674.0));
    }

    #[test]
    fn test_parse_content_positions() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let content = b"BT /F1 12 Tf 1 0 0 1 72 700 Tm (Name) Tj 100 0 Td (Age) Tj ET";

        let spans = parse_content(&doc, content, &fonts).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Name");
        assert_eq!((spans[0].x, spans[0].y), (72.0, 700.0));
        assert_eq!(spans[1].text, "Age");
        assert_eq!((spans[1].x, spans[1].y), (172.0, 700.0));
        assert_eq!(spans[1].font_size, 12.0);
    }

    #[test]
    fn test_parse_content_tj_array_spacing() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let content = b"BT /F1 10 Tf 50 50 Td [(Hello) -300 (World)] TJ ET";

        let spans = parse_content(&doc, content, &fonts).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello World");
    }

    #[test]
    fn test_flipped_ctm_reports_page_space() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let content = b"1 0 0 -1 0 792 cm \
            BT /F1 10 Tf 1 0 0 -1 72 92 Tm (Top) Tj ET \
            BT /F1 10 Tf 1 0 0 -1 72 132 Tm (Bottom) Tj ET";

        let spans = parse_content(&doc, content, &fonts).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].x, spans[0].y), (72.0, 700.0));
        assert_eq!((spans[1].x, spans[1].y), (72.0, 660.0));
        assert!(spans[0].y > spans[1].y);
        assert_eq!(spans[0].font_size, 10.0);
    }

    #[test]
    fn test_graphics_state_restores_ctm() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let content = b"q 2 0 0 2 10 10 cm BT 5 5 Td (Scaled) Tj ET Q BT 5 5 Td (Plain) Tj ET";

        let spans = parse_content(&doc, content, &fonts).unwrap();
        assert_eq!((spans[0].x, spans[0].y), (20.0, 20.0));
        assert_eq!(spans[0].font_size, 24.0);
        assert_eq!((spans[1].x, spans[1].y), (5.0, 5.0));
        assert_eq!(spans[1].font_size, 12.0);
    }

    #[test]
    fn test_text_outside_bt_ignored() {
        let doc = LopdfDocument::with_version("1.5");
        let fonts = BTreeMap::new();
        let spans = parse_content(&doc, b"(stray) Tj", &fonts).unwrap();
        assert!(spans.is_empty());
    }
}
