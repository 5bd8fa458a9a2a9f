use serde::{Deserialize, Serialize};

use crate::port::Code;

/// Errors surfaced by the client adapter.
///
/// Resolution failures are deliberately absent: a failed reverse host lookup
/// degrades to the literal address string and never becomes an error. No
/// variant is retried by this layer — the protocol does not guarantee
/// idempotent delivery, so retry policy belongs to the application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ZephyrError {
    /// Malformed caller input, rejected before any port call.
    #[error("invalid request: {message}")]
    Validation { message: String },

    /// The port library reported an error code during `op`.
    #[error("port error in {op}: {message} (code {code})")]
    Transport { op: String, code: Code, message: String },

    /// The port could not be opened at startup. Fatal to the adapter.
    #[error("port init failed in {op}: {message} (code {code})")]
    Init { op: String, code: Code, message: String },

    /// `listen` was called while a message stream is already armed.
    #[error("message stream already taken")]
    AlreadyListening,

    /// The port worker has exited; no further operations are possible.
    #[error("port worker is gone")]
    Closed,
}

impl ZephyrError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transport(op: impl Into<String>, code: Code, message: impl Into<String>) -> Self {
        Self::Transport {
            op: op.into(),
            code,
            message: message.into(),
        }
    }

    pub fn init(op: impl Into<String>, code: Code, message: impl Into<String>) -> Self {
        Self::Init {
            op: op.into(),
            code,
            message: message.into(),
        }
    }

    /// The numeric port code, for `Transport` and `Init` errors.
    pub fn code(&self) -> Option<Code> {
        match self {
            Self::Transport { code, .. } | Self::Init { code, .. } => Some(*code),
            _ => None,
        }
    }
}
