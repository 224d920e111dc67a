//! Text-level substitution pass.
//!
//! The record is rendered to pretty JSON, every rule is applied as a global
//! literal replacement in declared order, and the text is parsed back. Each
//! rule sees the output of the rules before it, so an earlier replacement can
//! create or destroy a match for a later one.

use crate::placeholder::placeholder_token;
use crate::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReplaceRule {
    /// Literal substring matched against the rendered JSON text.
    pub search: String,
    pub placeholder: String,
}

/// The substituted text no longer parses. Unrecoverable for the run.
#[derive(Debug, thiserror::Error)]
#[error("text substitution produced an unparsable record: {source}")]
pub struct TemplateCorruption {
    #[source]
    source: serde_json::Error,
}

pub fn apply_search_replace(
    record: Record,
    rules: &[SearchReplaceRule],
) -> Result<Record, TemplateCorruption> {
    if rules.is_empty() {
        return Ok(record);
    }

    let mut text = serde_json::to_string_pretty(&record)
        .map_err(|source| TemplateCorruption { source })?;
    for rule in rules {
        text = text.replace(&rule.search, &placeholder_token(&rule.placeholder));
    }
    serde_json::from_str(&text).map_err(|source| TemplateCorruption { source })
}
