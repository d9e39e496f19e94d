//! Tokenizer for partial-postback delta responses
//!
//! A delta response is a pipe-delimited stream of `length|type|id|content|`
//! records. Hidden-field and startup-script records all land on the last
//! line, so decoding runs in four stages:
//!
//! 1. [`last_line`] selects the line carrying the records
//! 2. [`unescape_delimiters`] collapses escaped `||` sequences
//! 3. [`tokenize`] splits on the delimiter
//! 4. [`scan_markers`] walks the tokens looking for a marker, taking the id
//!    one position ahead and the value two positions ahead

use crate::DecodeError;
use serde::Serialize;

/// Marker preceding every hidden-field record
pub const HIDDEN_FIELD_MARKER: &str = "hiddenField";

/// Marker preceding every inline startup-script record
pub const SCRIPT_MARKER: &str = "ScriptContentNoTags";

const DELIMITER: char = '|';
const ESCAPED_DELIMITER: &str = "||";

/// A `(id, value)` pair captured after a marker token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldUpdate {
    pub id: String,
    pub value: String,
}

/// Selects the last line of a response
pub fn last_line(text: &str) -> Option<&str> {
    text.lines().last()
}

/// Collapses escaped double delimiters into single ones
pub fn unescape_delimiters(line: &str) -> String {
    line.replace(ESCAPED_DELIMITER, "|")
}

/// Splits a line into delimiter-separated tokens
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(DELIMITER).collect()
}

/// Collects every `(id, value)` pair following `marker`, in source order
///
/// A marker without both following tokens means the response was cut short.
pub fn scan_markers(tokens: &[&str], marker: &str) -> Result<Vec<FieldUpdate>, DecodeError> {
    let mut updates = Vec::new();

    for (index, token) in tokens.iter().enumerate() {
        if *token != marker {
            continue;
        }

        match (tokens.get(index + 1), tokens.get(index + 2)) {
            (Some(id), Some(value)) => updates.push(FieldUpdate {
                id: id.to_string(),
                value: value.to_string(),
            }),
            _ => {
                return Err(DecodeError::TruncatedMarker {
                    marker: marker.to_string(),
                    index,
                })
            }
        }
    }

    Ok(updates)
}

/// Runs the line selection, unescape, and split stages
///
/// Fails when the response is empty or its last line carries no delimiter at
/// all, which means the server answered with something other than a delta.
pub fn delta_tokens(text: &str) -> Result<Vec<String>, DecodeError> {
    let line = last_line(text)
        .filter(|line| !line.trim().is_empty())
        .ok_or(DecodeError::EmptyResponse)?;

    if !line.contains(DELIMITER) {
        let snippet: String = line.chars().take(80).collect();
        return Err(DecodeError::NotDelta(snippet));
    }

    let unescaped = unescape_delimiters(line);
    Ok(tokenize(&unescaped).into_iter().map(str::to_string).collect())
}
