//! Error taxonomy for the invocation bridge.
//!
//! An unintercepted call is not an error: it resolves to the default result
//! and never reaches this type. Everything here is a genuine failure that
//! propagates to the caller of the proxied method.

use crate::interop::{CallbackHandle, NativeType};

/// Result alias used across the crate
pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    /// An argument did not match its declared parameter type
    #[error("cannot marshal argument {index}: expected {expected}, found {found}")]
    Marshal {
        index: usize,
        expected: NativeType,
        found: &'static str,
    },

    /// A host value has no native representation for the requested target
    #[error("cannot unmarshal {found} into {target}")]
    Unmarshal {
        found: &'static str,
        target: String,
    },

    /// Declared parameter types and actual arguments differ in length
    #[error("expected {expected} arguments, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    /// The callback raised inside the host environment
    #[error("callback {callback} failed: {message}")]
    Callback {
        callback: CallbackHandle,
        message: String,
    },

    /// The environment has nothing registered under this handle
    #[error("no callback registered for {0}")]
    UnknownCallback(CallbackHandle),

    /// A final method carries an override and the policy rejects it
    #[error("method '{method}' is final and cannot be overridden")]
    FinalMethodOverridden { method: String },

    /// The override mapping of a proxy may only be assigned once
    #[error("override mapping already set for this proxy")]
    OverridesAlreadySet,

    #[error("configuration error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Build a callback failure, as raised by a host environment
    pub fn callback(callback: CallbackHandle, message: impl Into<String>) -> Self {
        Self::Callback {
            callback,
            message: message.into(),
        }
    }

    /// Stable short name, used as a structured logging field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Marshal { .. } => "marshal",
            Self::Unmarshal { .. } => "unmarshal",
            Self::ArityMismatch { .. } => "arity",
            Self::Callback { .. } => "callback",
            Self::UnknownCallback(_) => "unknown_callback",
            Self::FinalMethodOverridden { .. } => "final_method",
            Self::OverridesAlreadySet => "overrides_already_set",
            Self::Config(_) => "config",
        }
    }
}
