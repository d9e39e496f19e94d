//! Status messages embedded in postback responses
//!
//! The server reports validation failures by emitting a call to its
//! message-display function, e.g. `CEIWeb.IncluirMensagem(2,'Erro ao gerar');`.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Severity code the server uses for errors that abort the operation
pub const FATAL_SEVERITY: i32 = 2;

static MESSAGE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"CEIWeb\.IncluirMensagem\s*\(").expect("valid message call regex")
});

/// How serious a server message is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

/// A `{severity, text}` message extracted from a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostbackMessage {
    pub severity: i32,
    pub text: String,
}

impl PostbackMessage {
    /// Returns true if the message must abort the current operation
    pub fn is_fatal(&self) -> bool {
        self.severity == FATAL_SEVERITY
    }

    pub fn level(&self) -> MessageLevel {
        match self.severity {
            FATAL_SEVERITY => MessageLevel::Error,
            1 => MessageLevel::Warning,
            _ => MessageLevel::Info,
        }
    }
}

/// Finds and parses the message-display call in a response line
///
/// A missing or malformed call yields `None`; it is never an error.
pub fn extract_message(line: &str) -> Option<PostbackMessage> {
    let call = MESSAGE_CALL.find(line)?;
    let args = parse_argument_list(&line[call.end()..])?;

    let severity = args.first()?.trim().parse::<i32>().ok()?;
    let text = args.get(1)?.clone();

    Some(PostbackMessage { severity, text })
}

/// Parses a comma-separated argument list up to its closing parenthesis
///
/// Arguments may be bare tokens or strings quoted with `'` or `"`; a quoted
/// string may contain commas and parentheses. Returns `None` when the list
/// is never closed or a string is never terminated.
fn parse_argument_list(input: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars();

    loop {
        let c = chars.next()?;
        match c {
            '\'' | '"' => {
                let quote = c;
                loop {
                    let inner = chars.next()?;
                    match inner {
                        '\\' => current.push(chars.next()?),
                        _ if inner == quote => break,
                        _ => current.push(inner),
                    }
                }
            }
            ',' => args.push(std::mem::take(&mut current)),
            ')' => {
                if !current.trim().is_empty() || !args.is_empty() {
                    args.push(current);
                }
                return Some(args);
            }
            c if c.is_whitespace() => {}
            _ => current.push(c),
        }
    }
}
