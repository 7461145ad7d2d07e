//! Structured error types for the Folio rendering engine.
//!
//! Only fatal conditions live here. Degradable ones (a missing font file, a
//! meeting guide that matches no known shape, a block taller than its frame)
//! are logged where they happen and never reach the caller.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input failed to parse.
    #[error("Failed to parse content document: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A field the brief cannot be built without is absent.
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    /// The input document could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The finished PDF could not be published to its destination.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file was supplied but could not be used.
    #[error("Invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    /// A template id was referenced that was never registered.
    #[error("Unknown page template `{0}`")]
    UnknownTemplate(String),

    /// A registered font could not be parsed or embedded.
    #[error("Font error: {0}")]
    Font(String),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the content document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input — is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_syntax_hint() {
        let err: FolioError = serde_json::from_str::<serde_json::Value>("{,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse content document"));
        assert!(msg.contains("trailing commas"));
    }

    #[test]
    fn missing_field_names_the_field() {
        let err = FolioError::MissingField("donorName");
        assert_eq!(err.to_string(), "Missing required field `donorName`");
    }
}
