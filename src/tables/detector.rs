//! Positional table detection over text spans.
//!
//! Finds runs of rows whose spans start at the same X positions, the way
//! stream-mode table finders work on documents without ruling lines.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::parser::TextSpan;

use super::format::clean_cell;

/// Width of the X buckets used when counting column edges (points).
const EDGE_BUCKET: f32 = 5.0;

/// Tolerance when matching a span to a column edge (points).
const ALIGN_TOLERANCE: f32 = 5.0;

/// A detected table region.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Column start positions (X coordinates), left to right
    pub columns: Vec<f32>,
    /// Rows of spans, top to bottom
    pub rows: Vec<SpanRow>,
    /// Right edge of the widest span
    pub right_x: f32,
}

/// Spans sharing a baseline.
#[derive(Debug, Clone)]
pub struct SpanRow {
    /// Average baseline of the row
    pub y: f32,
    /// Spans sorted by X
    pub spans: Vec<TextSpan>,
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum share of a row's spans that must sit on a column edge
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 8,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a page's text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables in the given spans.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return vec![];
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < self.config.min_rows {
            return vec![];
        }

        let columns = self.detect_columns(&rows);
        log::debug!(
            "TableDetector: {} spans, {} rows, column edges {:?}",
            spans.len(),
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return vec![];
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let region = rows[start..=end].to_vec();

            // Columns are re-derived per region so unrelated rows don't skew them.
            let region_columns = self.detect_columns(&region);
            if region_columns.len() < self.config.min_columns
                || region_columns.len() > self.config.max_columns
            {
                log::debug!(
                    "TableDetector: skipping region with {} columns",
                    region_columns.len()
                );
                continue;
            }
            if is_list_pattern(&region, &region_columns) {
                log::debug!("TableDetector: skipping region that looks like a list");
                continue;
            }

            let right_x = region
                .iter()
                .flat_map(|r| r.spans.iter())
                .map(|s| s.x + s.width)
                .fold(0.0_f32, f32::max);

            tables.push(DetectedTable {
                columns: region_columns,
                rows: region,
                right_x,
            });
        }

        tables
    }

    /// Group spans into rows by baseline, top of page first.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<SpanRow> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| {
            b.y.partial_cmp(&a.y)
                .unwrap_or(Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal))
        });

        let mut rows: Vec<SpanRow> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut anchor_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            let same_row = anchor_y.is_some_and(|y| (span.y - y).abs() <= tolerance);
            if !same_row {
                if !current.is_empty() {
                    rows.push(finish_row(std::mem::take(&mut current)));
                }
                anchor_y = Some(span.y);
            }
            current.push(span);
        }
        if !current.is_empty() {
            rows.push(finish_row(current));
        }

        rows
    }

    /// Find X positions where spans start in a good share of rows.
    ///
    /// Rows with two or more spans are the likely table rows; if there are
    /// too few of them every row is counted instead.
    fn detect_columns(&self, rows: &[SpanRow]) -> Vec<f32> {
        let multi: Vec<&SpanRow> = rows.iter().filter(|r| r.spans.len() >= 2).collect();
        let candidates: Vec<&SpanRow> = if multi.len() >= self.config.min_rows {
            multi
        } else {
            rows.iter().collect()
        };
        if candidates.is_empty() {
            return vec![];
        }

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &candidates {
            // Each bucket counts once per row.
            let buckets: HashSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / EDGE_BUCKET).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences =
            ((candidates.len() as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * EDGE_BUCKET)
            .collect();
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Contiguous runs of aligned rows, as inclusive index ranges.
    fn find_table_regions(&self, rows: &[SpanRow], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }
}

impl DetectedTable {
    /// Lay the spans out as a cell grid, one cell per column.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Vec<String>> = vec![Vec::new(); self.columns.len()];
                for span in &row.spans {
                    let col = column_for(span.x, &self.columns, self.right_x);
                    if let Some(cell) = cells.get_mut(col) {
                        cell.push(clean_cell(&span.text));
                    }
                }
                cells.into_iter().map(|parts| parts.join(" ")).collect()
            })
            .collect()
    }
}

fn finish_row(mut spans: Vec<TextSpan>) -> SpanRow {
    spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    SpanRow { y, spans }
}

/// Share of a row's spans that start on a column edge.
fn alignment_score(row: &SpanRow, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|s| columns.iter().any(|c| (s.x - c).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// Index of the column a span starting at `x` belongs to.
fn column_for(x: f32, columns: &[f32], right_x: f32) -> usize {
    // 10pt slack for spans that start slightly left of their column
    for (i, &start) in columns.iter().enumerate() {
        let end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if x >= start - 10.0 && x < end - 10.0 {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            (x - **a)
                .abs()
                .partial_cmp(&(x - **b).abs())
                .unwrap_or(Ordering::Equal)
        })
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Numbered and bulleted lists look like two-column tables; reject them.
fn is_list_pattern(rows: &[SpanRow], columns: &[f32]) -> bool {
    if columns.len() < 2 || rows.is_empty() {
        return false;
    }

    let mut bullets = 0;
    let mut numbers = 0;
    for row in rows {
        let first = row
            .spans
            .iter()
            .min_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal));
        if let Some(span) = first {
            let text = span.text.trim();
            if is_bullet_marker(text) {
                bullets += 1;
            } else if is_number_marker(text) {
                numbers += 1;
            }
        }
    }

    let bullet_ratio = bullets as f32 / rows.len() as f32;
    let marker_ratio = (bullets + numbers) as f32 / rows.len() as f32;

    // Numbered first columns are common in real tables, so numbers only
    // disqualify two-column regions.
    bullet_ratio >= 0.5 || (columns.len() == 2 && marker_ratio >= 0.5)
}

fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text,
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "□" | "◆"
            | "▶" | "➤"
    )
}

fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }
    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    // "1." "12)" "a." "B)"
    let mut chars = cleaned.chars();
    if !matches!(chars.next_back(), Some('.') | Some(')')) {
        return false;
    }
    let head = chars.as_str();
    (!head.is_empty() && head.chars().all(|c| c.is_ascii_digit()))
        || (head.chars().count() == 1 && head.chars().all(char::is_alphabetic))
}
