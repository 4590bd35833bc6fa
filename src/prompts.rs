//! Prompts sent to the vision model.
//!
//! Kept in one place so the instruction can be inspected by tests without a
//! live model.

/// Instruction sent alongside every page image.
pub const EXTRACTION_PROMPT: &str =
    "Extract all text from this image. Preserve the formatting and structure as much as possible.";

/// Section header written before each page's text in the assembled output.
pub fn page_header(label: &str) -> String {
    format!("\n--- Page {label} ---\n")
}
