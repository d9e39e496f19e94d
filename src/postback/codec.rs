//! Postback request encoding and delta response decoding

use crate::postback::delta::{self, FieldUpdate, HIDDEN_FIELD_MARKER, SCRIPT_MARKER};
use crate::postback::message::{extract_message, PostbackMessage};
use crate::postback::FormState;
use crate::{DecodeError, StatementError};
use url::form_urlencoded;

/// Decoded content of a partial-postback response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaResponse {
    /// Hidden-field values the server wants mirrored
    pub field_updates: Vec<FieldUpdate>,

    /// Inline scripts; `id` carries the script text
    pub script_directives: Vec<FieldUpdate>,

    /// Status message, if the server emitted one
    pub message: Option<PostbackMessage>,
}

impl DeltaResponse {
    /// Converts a fatal server message into a submission error
    pub fn check(self) -> Result<Self, StatementError> {
        match &self.message {
            Some(message) if message.is_fatal() => Err(StatementError::Submission {
                message: message.text.clone(),
            }),
            _ => Ok(self),
        }
    }

    /// First script directive whose text contains `marker`
    pub fn find_script(&self, marker: &str) -> Option<&FieldUpdate> {
        self.script_directives
            .iter()
            .find(|directive| directive.id.contains(marker))
    }
}

/// Builds a form-encoded postback body
///
/// Only `fields` are sent, in the given order. An override replaces the
/// mirrored value of the same field; a field that is neither mirrored nor
/// overridden is left out.
///
/// # Example
///
/// ```
/// use custody_statement::postback::{encode, FormState};
///
/// let state = FormState::load(r#"<input name="a" value="1"/><input name="b" value="2"/>"#);
/// let body = encode(&state, &["a", "__ASYNCPOST"], &[("a", "9")]);
/// assert_eq!(body, "a=9&__ASYNCPOST=true");
/// ```
pub fn encode(state: &FormState, fields: &[&str], overrides: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    for field in fields {
        let overridden = overrides
            .iter()
            .rev()
            .find(|(name, _)| name == field)
            .map(|(_, value)| *value);

        if let Some(value) = overridden.or_else(|| state.get(field)) {
            serializer.append_pair(field, value);
        }
    }

    serializer.finish()
}

/// Decodes a delta response
///
/// Hidden-field records are always collected; inline scripts only when
/// `extract_scripts` is set. The status message is best-effort and never
/// fails the decode.
pub fn decode(text: &str, extract_scripts: bool) -> Result<DeltaResponse, DecodeError> {
    let tokens = delta::delta_tokens(text)?;
    let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();

    let field_updates = delta::scan_markers(&tokens, HIDDEN_FIELD_MARKER)?;
    let script_directives = if extract_scripts {
        delta::scan_markers(&tokens, SCRIPT_MARKER)?
    } else {
        Vec::new()
    };

    let message = delta::last_line(text).and_then(extract_message);

    Ok(DeltaResponse {
        field_updates,
        script_directives,
        message,
    })
}
