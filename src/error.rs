//! Error types and result aliases for ticket-talk.
//!
//! This module defines the core error type [`TicketTalkError`] and the [`Result`] type alias
//! used throughout the library. Recoverable input problems (bad commands, invalid numbers)
//! are not errors at this level; they are reported on the console by the session.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TicketTalkError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Input error: {0}")]
    ReadlineError(String),
}

impl From<rustyline::error::ReadlineError> for TicketTalkError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        TicketTalkError::ReadlineError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TicketTalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = TicketTalkError::GatewayError("connection failed".to_string());
        assert_eq!(err.to_string(), "LLM gateway error: connection failed");
    }

    #[test]
    fn test_tool_error_display() {
        let err = TicketTalkError::ToolError("missing jql".to_string());
        assert_eq!(err.to_string(), "Tool error: missing jql");
    }

    #[test]
    fn test_config_error_display() {
        let err = TicketTalkError::ConfigError("tracker base URL is blank".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: tracker base URL is blank");
    }

    #[test]
    fn test_serialization_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: TicketTalkError = json_err.into();

        assert!(matches!(err, TicketTalkError::SerializationError(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: TicketTalkError = io_err.into();

        match err {
            TicketTalkError::IoError(_) => {}
            _ => panic!("Expected IoError"),
        }
    }

    #[test]
    fn test_readline_error_conversion() {
        let err: TicketTalkError = rustyline::error::ReadlineError::Interrupted.into();
        assert!(matches!(err, TicketTalkError::ReadlineError(_)));
    }
}
