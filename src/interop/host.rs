//! Host-side values - what the callback environment sees
//!
//! The host is dynamically typed: numbers collapse to `f64` (with a `BigInt`
//! escape for longs that do not fit), native objects travel as opaque
//! `Wrapped` handles and come back unchanged.

use std::fmt;

use super::types::NativeObject;

/// Reference to a callback registered in the host environment.
///
/// The bridge never owns the callback; the handle is an identifier the
/// environment resolves on each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackHandle(u64);

impl CallbackHandle {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback#{}", self.0)
    }
}

/// Host-managed object identifier (the receiver passed to callbacks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostObjectId(u64);

impl HostObjectId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Value in the callback environment's representation
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Integer outside the range a `Number` represents exactly
    BigInt(i64),
    String(String),
    Array(Vec<HostValue>),
    Callback(CallbackHandle),
    Object(HostObjectId),
    /// Native object exposed to the host without conversion
    Wrapped(NativeObject),
}

impl HostValue {
    /// Type name for error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Callback(_) => "function",
            Self::Object(_) => "object",
            Self::Wrapped(_) => "wrapped",
        }
    }

    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    pub fn as_callback(&self) -> Option<CallbackHandle> {
        match self {
            Self::Callback(handle) => Some(*handle),
            _ => None,
        }
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        Self::Number(v as f64)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<CallbackHandle> for HostValue {
    fn from(v: CallbackHandle) -> Self {
        Self::Callback(v)
    }
}
