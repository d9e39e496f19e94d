//! Dropdown option parsing
//!
//! Options are read from whatever document the server returned, which for a
//! postback is the delta text with the refreshed panel markup embedded in it.

use crate::postback::option_value;
use crate::StatementError;
use scraper::{Html, Selector};
use serde::Serialize;

/// One entry of a dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionOption {
    pub value: String,
    pub label: String,
}

impl SelectionOption {
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    /// Returns true for the "no selection" entry (empty, zero or negative value)
    pub fn is_placeholder(&self) -> bool {
        let value = self.value.trim();
        value.is_empty() || value.parse::<i64>().map(|v| v <= 0).unwrap_or(false)
    }
}

/// Parses every option matched by `selector`, in document order
pub fn parse_options(html: &str, selector: &str) -> Result<Vec<SelectionOption>, StatementError> {
    let selector = Selector::parse(selector).map_err(|_| StatementError::MissingControl {
        selector: selector.to_string(),
    })?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .map(|option| SelectionOption {
            value: option_value(option),
            label: option.text().collect::<String>().trim().to_string(),
        })
        .collect())
}

/// Parses options matched by `selector`, dropping placeholder entries
pub fn selectable_options(
    html: &str,
    selector: &str,
) -> Result<Vec<SelectionOption>, StatementError> {
    Ok(parse_options(html, selector)?
        .into_iter()
        .filter(|option| !option.is_placeholder())
        .collect())
}
