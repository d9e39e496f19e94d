//! Postback state engine
//!
//! This module keeps a local mirror of the server's form state and speaks the
//! partial-postback protocol:
//! - `FormState`: hidden fields and select values of the current page
//! - `encode`: whitelisted, form-encoded request bodies
//! - `decode`: field updates, inline scripts, and status messages from deltas
//! - `controls`: control names and per-postback whitelists

pub mod controls;
mod codec;
mod delta;
mod form_state;
mod message;

pub use codec::{decode, encode, DeltaResponse};
pub use controls::PostbackKind;
pub use delta::{
    delta_tokens, last_line, scan_markers, tokenize, unescape_delimiters, FieldUpdate,
    HIDDEN_FIELD_MARKER, SCRIPT_MARKER,
};
pub use form_state::{FormState, NO_UPDATE_SENTINEL};
pub use message::{extract_message, MessageLevel, PostbackMessage, FATAL_SEVERITY};

pub(crate) use form_state::option_value;
