//! Local mirror of the page's form state
//!
//! The server owns hidden fields; the only ways a field changes after the
//! page is loaded are an explicit selection by the crawler or a field update
//! decoded from a postback response.

use crate::postback::controls::ASYNC_POST;
use crate::postback::FieldUpdate;
use crate::StatementError;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Value the server sends when a field has no real update
pub const NO_UPDATE_SENTINEL: &str = "0";

static INPUT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("input[name]").expect("valid input selector"));
static SELECT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("select[name]").expect("valid select selector"));
static OPTION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("option").expect("valid option selector"));

/// Mapping from field name to current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: HashMap<String, String>,
}

impl FormState {
    /// Builds a fresh state from a fetched page
    ///
    /// Every named `input` and `select` becomes a field; the asynchronous
    /// postback marker is seeded to `true`.
    ///
    /// # Example
    ///
    /// ```
    /// use custody_statement::FormState;
    ///
    /// let html = r#"<form><input type="hidden" name="__VIEWSTATE" value="abc" /></form>"#;
    /// let state = FormState::load(html);
    /// assert_eq!(state.get("__VIEWSTATE"), Some("abc"));
    /// assert_eq!(state.get("__ASYNCPOST"), Some("true"));
    /// ```
    pub fn load(html: &str) -> Self {
        Self::from_document(&Html::parse_document(html))
    }

    pub fn from_document(document: &Html) -> Self {
        let mut fields = HashMap::new();

        for input in document.select(&INPUT_SELECTOR) {
            if let Some(name) = input.value().attr("name") {
                let value = input.value().attr("value").unwrap_or_default();
                fields.insert(name.to_string(), value.to_string());
            }
        }

        for select in document.select(&SELECT_SELECTOR) {
            if let Some(name) = select.value().attr("name") {
                fields.insert(name.to_string(), selected_value(select));
            }
        }

        fields.insert(ASYNC_POST.to_string(), "true".to_string());

        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overwrites a single known field
    ///
    /// Returns false without touching the state when `value` is the
    /// no-update sentinel or when the page never declared `name`.
    pub fn set_value(&mut self, name: &str, value: &str) -> bool {
        if value == NO_UPDATE_SENTINEL {
            return false;
        }

        match self.fields.get_mut(name) {
            Some(current) => {
                *current = value.to_string();
                true
            }
            None => {
                tracing::debug!("Ignoring value for undeclared field {}", name);
                false
            }
        }
    }

    /// Selects `value` in a field the next postback depends on
    ///
    /// Unlike `set_value`, a field the page never declared is an error: the
    /// postback would otherwise go out without the selection.
    pub fn select(&mut self, name: &str, value: &str) -> Result<(), StatementError> {
        if self.set_value(name, value) {
            Ok(())
        } else {
            Err(StatementError::MissingControl {
                selector: name.to_string(),
            })
        }
    }

    /// Applies decoded field updates in order; later entries win
    ///
    /// Returns the number of updates that changed the state.
    pub fn apply_updates(&mut self, updates: &[FieldUpdate]) -> usize {
        updates
            .iter()
            .filter(|update| self.set_value(&update.id, &update.value))
            .count()
    }
}

/// Value a browser would submit for a `select`: the selected option, or the
/// first option when none is marked
fn selected_value(select: ElementRef<'_>) -> String {
    let mut first = None;

    for option in select.select(&OPTION_SELECTOR) {
        let value = option_value(option);
        if option.value().attr("selected").is_some() {
            return value;
        }
        first.get_or_insert(value);
    }

    first.unwrap_or_default()
}

/// An option's `value` attribute, falling back to its text
pub(crate) fn option_value(option: ElementRef<'_>) -> String {
    match option.value().attr("value") {
        Some(value) => value.to_string(),
        None => option.text().collect::<String>().trim().to_string(),
    }
}
