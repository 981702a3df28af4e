//! Proxy Bridge - forwards calls on runtime-generated proxies to host callbacks
//!
//! When native code calls a method on a proxy object (an interface
//! implementation or subclass created at runtime), the call lands in an
//! `InvocationHandler`. The handler looks the method up in the proxy's
//! override mapping, marshals the arguments, runs the host callback and
//! unmarshals its result back into the native return type.

pub mod config;
pub mod errors;
pub mod interop;
pub mod logging;

// Re-export commonly used items
pub use config::{BridgeConfig, DefaultResult, FinalMethodPolicy};
pub use errors::{BridgeError, BridgeResult};
pub use interop::{
    CallbackEnvironment, CallbackHandle, DefaultMarshaler, HostObjectId, HostValue,
    InvocationHandler, LocalEnvironment, Marshaler, MethodCall, MethodSignature,
    NativeObject, NativeType, NativeValue, OverrideEntry, OverrideMap, ProxyInstance,
};
