use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Dataset;

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));
static TRAILING_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]*$").expect("valid regex"));

/// Shortens a question as authored in the survey tool to the item label.
///
/// Exports use hierarchical text such as
/// `Rate the programs (select one) - Participation - Student clubs`: the
/// parenthesized parts and the trailing punctuation are removed, and only the
/// last ` - ` segment is kept.
pub fn normalize_question(full_question: &str) -> String {
    let without_context = PARENTHESIZED.replace_all(full_question, "");
    let trimmed = TRAILING_PUNCTUATION.replace(&without_context, "");
    trimmed
        .split(" - ")
        .last()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// The display text for a column, or `Not Found - <tag>` for unknown columns.
pub fn resolve_question(dataset: &Dataset, tag: &str) -> String {
    match dataset.question_text(tag) {
        Some(q) if !q.trim().is_empty() => normalize_question(q),
        // Columns without a question text are labelled by their identifier.
        Some(_) => tag.to_lowercase(),
        None => {
            warn!("resolve_question: no column {:?} in the dataset", tag);
            format!("Not Found - {}", tag)
        }
    }
}
