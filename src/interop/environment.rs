//! Callback environment - the outbound edge of the bridge
//!
//! The bridge only ever calls into the host through `CallbackEnvironment`.
//! `LocalEnvironment` hosts callbacks as Rust closures, which is enough for
//! embedding a host that lives in the same process and for tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::host::{CallbackHandle, HostObjectId, HostValue};
use crate::errors::{BridgeError, BridgeResult};
use crate::logging::trace;

/// Host runtime able to run a registered callback.
///
/// `context` is the host object the callback runs against (its receiver).
/// Errors raised by the callback are returned as-is; the bridge forwards
/// them to the native caller without wrapping.
pub trait CallbackEnvironment: Send + Sync {
    fn call(&self, callback: CallbackHandle, context: HostObjectId, args: &[HostValue]) -> BridgeResult<HostValue>;
}

/// Callback body hosted by `LocalEnvironment`
pub type HostFn = Arc<dyn Fn(HostObjectId, &[HostValue]) -> Result<HostValue, String> + Send + Sync>;

/// In-process callback registry
pub struct LocalEnvironment {
    callbacks: DashMap<CallbackHandle, HostFn>,
    next_id: AtomicU64,
    invocations: AtomicU64,
}

impl LocalEnvironment {
    pub fn new() -> Self {
        Self {
            callbacks: DashMap::new(),
            next_id: AtomicU64::new(1),
            invocations: AtomicU64::new(0),
        }
    }

    /// Register a callback and return the handle the host hands out for it
    pub fn register<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(HostObjectId, &[HostValue]) -> Result<HostValue, String> + Send + Sync + 'static,
    {
        let handle = CallbackHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.callbacks.insert(handle, Arc::new(callback));
        trace!(event = "callback_registered", callback = %handle);
        handle
    }

    /// Drop a callback; later calls through its handle fail
    pub fn unregister(&self, handle: CallbackHandle) -> bool {
        self.callbacks.remove(&handle).is_some()
    }

    pub fn contains(&self, handle: CallbackHandle) -> bool {
        self.callbacks.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Total number of callback invocations, successful or not
    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }
}

impl Default for LocalEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackEnvironment for LocalEnvironment {
    fn call(&self, callback: CallbackHandle, context: HostObjectId, args: &[HostValue]) -> BridgeResult<HostValue> {
        // Shard lock must be released before running user code
        let body = self
            .callbacks
            .get(&callback)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(BridgeError::UnknownCallback(callback))?;

        self.invocations.fetch_add(1, Ordering::Relaxed);
        body(context, args).map_err(|message| BridgeError::callback(callback, message))
    }
}
