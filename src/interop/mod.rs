//! Interoperability - forward proxied calls into a host environment
//!
//! Architecture:
//! - `types.rs` - native type system (NativeType, NativeValue, MethodCall)
//! - `host.rs` - host boundary values (HostValue, CallbackHandle)
//! - `marshal.rs` - native ↔ host conversions
//! - `environment.rs` - outbound calls into the host (CallbackEnvironment)
//! - `proxy.rs` - proxy instances and override mappings
//! - `bridge.rs` - the invocation handler tying it together

mod types;
mod host;
mod marshal;
mod environment;
mod proxy;
mod bridge;

pub use types::{NativeType, NativeValue, NativeObject, MethodSignature, MethodCall};
pub use host::{HostValue, CallbackHandle, HostObjectId};
pub use marshal::{
    Marshaler, DefaultMarshaler, HostArgs, MAX_SAFE_INTEGER,
    marshal_args, to_host, from_host, coerce,
};
pub use environment::{CallbackEnvironment, LocalEnvironment, HostFn};
pub use proxy::{ProxyInstance, OverrideMap, OverrideEntry};
pub use bridge::InvocationHandler;

#[cfg(test)]
mod tests;
