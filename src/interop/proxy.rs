//! Proxy instances and their override mappings
//!
//! A `ProxyInstance` is the host-visible half of a runtime-generated proxy:
//! it knows which host object the callbacks run against and which method
//! names the host overrides. The proxy generator owns it; bridges only read.

use std::collections::BTreeMap;

use once_cell::sync::OnceCell;

use super::host::{CallbackHandle, HostObjectId, HostValue};
use crate::config::FinalMethodPolicy;
use crate::errors::{BridgeError, BridgeResult};
use crate::logging::warn;

/// What the host registered under a method name.
///
/// Only `Callback` entries are ever dispatched. Anything else the host put
/// in the mapping is kept (so it can be inspected) but treated as no override.
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideEntry {
    Callback(CallbackHandle),
    Other(HostValue),
}

impl OverrideEntry {
    pub fn as_callback(&self) -> Option<CallbackHandle> {
        match self {
            Self::Callback(handle) => Some(*handle),
            Self::Other(_) => None,
        }
    }
}

impl From<HostValue> for OverrideEntry {
    fn from(value: HostValue) -> Self {
        match value {
            HostValue::Callback(handle) => Self::Callback(handle),
            other => Self::Other(other),
        }
    }
}

impl From<CallbackHandle> for OverrideEntry {
    fn from(handle: CallbackHandle) -> Self {
        Self::Callback(handle)
    }
}

/// Method name → override entry, ordered by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideMap {
    entries: BTreeMap<String, OverrideEntry>,
}

impl OverrideMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, returning the one it replaced
    pub fn insert(&mut self, method: impl Into<String>, entry: impl Into<OverrideEntry>) -> Option<OverrideEntry> {
        self.entries.insert(method.into(), entry.into())
    }

    pub fn with_callback(mut self, method: impl Into<String>, callback: CallbackHandle) -> Self {
        self.insert(method, callback);
        self
    }

    pub fn with_value(mut self, method: impl Into<String>, value: HostValue) -> Self {
        self.insert(method, value);
        self
    }

    pub fn get(&self, method: &str) -> Option<&OverrideEntry> {
        self.entries.get(method)
    }

    /// Callback registered for `method`, if the entry is a callback
    pub fn callback(&self, method: &str) -> Option<CallbackHandle> {
        self.get(method).and_then(OverrideEntry::as_callback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Method names in order
    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Check the mapping against the final methods of the proxied type.
    ///
    /// Only `Reject` can fail; `Ignore` reports the overrides that will never
    /// be dispatched.
    pub fn validate<'a, I>(&self, final_methods: I, policy: FinalMethodPolicy) -> BridgeResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if policy == FinalMethodPolicy::Dispatch {
            return Ok(());
        }

        for method in final_methods {
            if self.callback(method).is_none() {
                continue;
            }
            match policy {
                FinalMethodPolicy::Reject => {
                    return Err(BridgeError::FinalMethodOverridden {
                        method: method.to_string(),
                    });
                }
                FinalMethodPolicy::Ignore => {
                    warn!(method, "override for final method will be ignored");
                }
                FinalMethodPolicy::Dispatch => {}
            }
        }
        Ok(())
    }
}

impl<S: Into<String>, E: Into<OverrideEntry>> FromIterator<(S, E)> for OverrideMap {
    fn from_iter<T: IntoIterator<Item = (S, E)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(method, entry)| (method.into(), entry.into()))
                .collect(),
        }
    }
}

/// Runtime-generated object standing in for a native interface or subclass
#[derive(Debug)]
pub struct ProxyInstance {
    class_name: String,
    host_object: HostObjectId,
    overrides: OnceCell<OverrideMap>,
}

impl ProxyInstance {
    /// Create a proxy whose override mapping is assigned later
    pub fn new(class_name: impl Into<String>, host_object: HostObjectId) -> Self {
        Self {
            class_name: class_name.into(),
            host_object,
            overrides: OnceCell::new(),
        }
    }

    pub fn with_overrides(class_name: impl Into<String>, host_object: HostObjectId, overrides: OverrideMap) -> Self {
        Self {
            class_name: class_name.into(),
            host_object,
            overrides: OnceCell::with_value(overrides),
        }
    }

    /// Assign the override mapping. Succeeds at most once per proxy.
    pub fn set_overrides(&self, overrides: OverrideMap) -> BridgeResult<()> {
        self.overrides
            .set(overrides)
            .map_err(|_| BridgeError::OverridesAlreadySet)
    }

    pub fn overrides(&self) -> Option<&OverrideMap> {
        self.overrides.get()
    }

    /// Host object the callbacks receive as their context
    pub fn host_object(&self) -> HostObjectId {
        self.host_object
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}
