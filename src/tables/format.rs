//! Plain-text rendering of cell grids.

use crate::error::{Error, Result};

/// Widest bordered grid, in characters, before falling back to pipe-joined rows.
pub const MAX_GRID_WIDTH: usize = 160;

/// Number of columns of the widest row.
fn column_count(rows: &[Vec<String>]) -> usize {
    rows.iter().map(Vec::len).max().unwrap_or(0)
}

/// Display width of each column (in characters).
fn column_widths(rows: &[Vec<String>], columns: usize) -> Vec<usize> {
    let mut widths = vec![0; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    widths
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

/// Normalise a cell: collapse internal newlines, trim.
pub fn clean_cell(cell: &str) -> String {
    cell.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if every cell of the grid is blank.
pub fn is_blank(rows: &[Vec<String>]) -> bool {
    rows.iter().flatten().all(|c| c.trim().is_empty())
}

/// Render a bordered grid; the first row is treated as the header.
///
/// Fails when the grid has no columns, or when a line would be wider than
/// [`MAX_GRID_WIDTH`].
pub fn grid(rows: &[Vec<String>]) -> Result<String> {
    let columns = column_count(rows);
    if columns == 0 {
        return Err(Error::Render("table has no columns".to_string()));
    }
    let widths = column_widths(rows, columns);
    let line_width = widths.iter().map(|w| w + 3).sum::<usize>() + 1;
    if line_width > MAX_GRID_WIDTH {
        return Err(Error::Render(format!(
            "grid would be {} characters wide",
            line_width
        )));
    }

    let rule = |fill: char| -> String {
        let parts: Vec<String> = widths
            .iter()
            .map(|w| fill.to_string().repeat(w + 2))
            .collect();
        format!("+{}+", parts.join("+"))
    };

    let mut lines = vec![rule('-')];
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = (0..columns)
            .map(|c| pad(row.get(c).map(String::as_str).unwrap_or(""), widths[c]))
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
        lines.push(rule(if i == 0 && rows.len() > 1 { '=' } else { '-' }));
    }

    Ok(lines.join("\n"))
}

/// Render cells joined with ` | `, one row per line.
pub fn pipe_joined(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| row.join(" | "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render columns left-aligned and separated by two spaces.
pub fn aligned(rows: &[Vec<String>]) -> String {
    let columns = column_count(rows);
    let widths = column_widths(rows, columns);

    rows.iter()
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| pad(cell, widths[i]))
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render with [`grid`], falling back to [`pipe_joined`].
pub fn grid_or_pipes(rows: &[Vec<String>]) -> String {
    grid(rows).unwrap_or_else(|e| {
        log::debug!("Grid formatting failed ({}), using pipe-joined cells", e);
        pipe_joined(rows)
    })
}
