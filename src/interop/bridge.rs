//! Invocation bridge - forwards proxied method calls to host callbacks
//!
//! Every call on a proxy object lands in `InvocationHandler::invoke`. The
//! handler looks the method name up in the bound proxy's override mapping;
//! a callback entry is called through the environment with marshaled
//! arguments, anything else resolves to the default result.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug_span;

use super::environment::CallbackEnvironment;
use super::marshal::{DefaultMarshaler, Marshaler};
use super::proxy::{OverrideEntry, ProxyInstance};
use super::types::{MethodCall, NativeType, NativeValue};
use super::host::CallbackHandle;
use crate::config::{BridgeConfig, DefaultResult, FinalMethodPolicy};
use crate::errors::{BridgeError, BridgeResult};
use crate::logging::{log_bind, log_dispatch, log_failure, log_unintercepted, perf};

/// Call interception target for one proxy object.
///
/// # Two-phase initialization
///
/// The proxy object must be constructed with its handler, but the handler
/// wants the finished proxy. Construct the handler with `unbound`, build the
/// proxy around it, then attach the `ProxyInstance` with `bind_proxy`.
/// Calls arriving between the two steps are not intercepted and return the
/// default result. Binding is expected to happen once, before the proxy is
/// shared with other threads; the handler does not enforce that ordering.
pub struct InvocationHandler {
    proxy: RwLock<Option<Arc<ProxyInstance>>>,
    environment: Arc<dyn CallbackEnvironment>,
    marshaler: Arc<dyn Marshaler>,
    config: BridgeConfig,
}

impl InvocationHandler {
    /// Create a handler already bound to `proxy`
    pub fn new(proxy: Arc<ProxyInstance>, environment: Arc<dyn CallbackEnvironment>) -> Self {
        let handler = Self::unbound(environment);
        *handler.proxy.write() = Some(proxy);
        handler
    }

    /// Create a handler with no proxy; see `bind_proxy`
    pub fn unbound(environment: Arc<dyn CallbackEnvironment>) -> Self {
        Self {
            proxy: RwLock::new(None),
            environment,
            marshaler: Arc::new(DefaultMarshaler),
            config: BridgeConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_marshaler(mut self, marshaler: Arc<dyn Marshaler>) -> Self {
        self.marshaler = marshaler;
        self
    }

    /// Attach the proxy after construction, replacing any previous one
    pub fn bind_proxy(&self, proxy: Arc<ProxyInstance>) {
        let class_name = proxy.class_name().to_string();
        let previous = self.proxy.write().replace(proxy);
        log_bind(&class_name, previous.is_some());
    }

    /// Currently bound proxy, if any
    pub fn proxy(&self) -> Option<Arc<ProxyInstance>> {
        self.proxy.read().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.proxy.read().is_some()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Intercept a call by method name.
    ///
    /// Returns the default result when the call is not intercepted; any
    /// marshaling or callback failure is returned unchanged.
    pub fn intercept(
        &self,
        method: &str,
        parameter_types: &[NativeType],
        args: &[NativeValue],
    ) -> BridgeResult<NativeValue> {
        self.invoke(MethodCall::new(method, parameter_types, args))
    }

    /// Intercept a fully described call
    pub fn invoke(&self, call: MethodCall<'_>) -> BridgeResult<NativeValue> {
        let _span = debug_span!("intercept", method = call.name).entered();

        // Clone the Arc so no lock is held while host code runs
        let Some(proxy) = self.proxy() else {
            return Ok(self.unintercepted(&call, "unbound"));
        };
        let Some(overrides) = proxy.overrides() else {
            return Ok(self.unintercepted(&call, "no_overrides"));
        };
        let callback = match overrides.get(call.name) {
            None => return Ok(self.unintercepted(&call, "no_override")),
            Some(OverrideEntry::Other(_)) => return Ok(self.unintercepted(&call, "not_callback")),
            Some(OverrideEntry::Callback(callback)) => *callback,
        };

        if call.is_final {
            match self.config.final_methods {
                FinalMethodPolicy::Dispatch => {}
                FinalMethodPolicy::Ignore => return Ok(self.unintercepted(&call, "final_method")),
                FinalMethodPolicy::Reject => {
                    let err = BridgeError::FinalMethodOverridden {
                        method: call.name.to_string(),
                    };
                    log_failure(call.name, &err);
                    return Err(err);
                }
            }
        }

        self.dispatch(&proxy, callback, &call).map_err(|err| {
            log_failure(call.name, &err);
            err
        })
    }

    fn dispatch(&self, proxy: &ProxyInstance, callback: CallbackHandle, call: &MethodCall<'_>) -> BridgeResult<NativeValue> {
        let _perf = perf::track(call.name);

        let args = self.marshaler.wrap_arguments(call.parameter_types, call.args)?;
        log_dispatch(call.name, callback, args.len());

        let result = self.environment.call(callback, proxy.host_object(), &args)?;
        let value = self.marshaler.unwrap(result)?;

        match call.return_type {
            Some(return_type) if self.config.coerce_returns => self.marshaler.coerce(value, return_type),
            _ => Ok(value),
        }
    }

    fn unintercepted(&self, call: &MethodCall<'_>, reason: &'static str) -> NativeValue {
        log_unintercepted(call.name, reason);
        match (self.config.default_result, call.return_type) {
            (DefaultResult::TypeDefault, Some(return_type)) => return_type.default_value(),
            _ => NativeValue::Null,
        }
    }
}

impl fmt::Debug for InvocationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationHandler")
            .field("proxy", &*self.proxy.read())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
