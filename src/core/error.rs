//! Error taxonomy for console commands
//!
//! Every variant is caught at the command boundary and rendered as a single
//! line; none of them ends the session.

use thiserror::Error;

/// Errors raised while running a console command
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Operator input could not be parsed into the requested type
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Method invoked through the wrong call path
    #[error("{method}: {reason}")]
    WrongMutability {
        method: String,
        reason: &'static str,
    },

    /// Operator cancelled a multi-step prompt
    #[error("aborted")]
    Aborted,

    /// A transaction was requested before a signer was configured
    #[error("signer not configured (use signer/key)")]
    SignerNotConfigured,

    /// The contract binding or gas oracle returned an error
    #[error("{0:#}")]
    ExternalCallFailure(anyhow::Error),

    /// A log query or subscription failed while delivering entries
    #[error("delivery error: {0}")]
    DeliveryError(String),

    /// A selected file path is missing or not a plain file
    #[error("invalid path: {0}")]
    PathError(String),

    /// Method or event name not present in the interface description
    #[error("unknown {kind}: {name}")]
    UnknownMember { kind: &'static str, name: String },

    /// The line-input capability failed
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

impl ConsoleError {
    pub fn not_constant(method: impl Into<String>) -> Self {
        Self::WrongMutability {
            method: method.into(),
            reason: "method is not constant",
        }
    }

    pub fn constant(method: impl Into<String>) -> Self {
        Self::WrongMutability {
            method: method.into(),
            reason: "method is constant",
        }
    }

    pub fn external(err: impl Into<anyhow::Error>) -> Self {
        Self::ExternalCallFailure(err.into())
    }

    /// Whether this error is an operator cancellation
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;
