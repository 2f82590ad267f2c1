//! Plain text rendering of the section list.

use crate::model::AggregateText;

/// Body written for a section that came back empty.
pub const EMPTY_SECTION: &str = "(no content)";

/// Banner line for a section title.
pub fn banner(title: &str) -> String {
    format!("=== {} ===", title)
}

/// Render sections as `=== TITLE ===`, body, blank line, in order.
pub fn to_text(agg: &AggregateText) -> String {
    let mut output = String::new();

    for section in agg.sections() {
        output.push_str(&banner(&section.title));
        output.push('\n');
        if section.has_content() {
            output.push_str(section.body.trim_end());
        } else {
            output.push_str(EMPTY_SECTION);
        }
        output.push_str("\n\n");
    }

    output
}
