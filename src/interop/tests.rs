//! Test suite for interop module

use std::sync::Arc;

use super::*;
use crate::config::{BridgeConfig, DefaultResult, FinalMethodPolicy};
use crate::errors::BridgeError;

// Test helpers
fn proxy_with(overrides: OverrideMap) -> Arc<ProxyInstance> {
    Arc::new(ProxyInstance::with_overrides(
        "java.lang.Runnable",
        HostObjectId::new(1),
        overrides,
    ))
}

#[derive(Debug, PartialEq)]
struct Widget {
    id: u32,
}

#[test]
fn test_native_type_defaults() {
    assert_eq!(NativeType::Int.default_value(), NativeValue::Int(0));
    assert_eq!(NativeType::Boolean.default_value(), NativeValue::Bool(false));
    assert_eq!(NativeType::Char.default_value(), NativeValue::Char('\0'));
    assert_eq!(NativeType::Double.default_value(), NativeValue::Double(0.0));
    assert!(NativeType::Void.default_value().is_null());
    assert!(NativeType::String.default_value().is_null());
    assert!(NativeType::object("java.util.List").default_value().is_null());
}

#[test]
fn test_native_type_display() {
    assert_eq!(NativeType::Long.to_string(), "long");
    assert_eq!(NativeType::array_of(NativeType::Int).to_string(), "int[]");
    assert_eq!(NativeType::object("android.view.View").to_string(), "android.view.View");
}

#[test]
fn test_native_type_accepts() {
    assert!(NativeType::Int.accepts(&NativeValue::Int(3)));
    assert!(!NativeType::Int.accepts(&NativeValue::Long(3)));
    assert!(!NativeType::Int.accepts(&NativeValue::Null));
    assert!(NativeType::String.accepts(&NativeValue::Null));
    assert!(NativeType::object("java.lang.Object").accepts(&NativeValue::Int(3)));
    assert!(NativeType::array_of(NativeType::Int)
        .accepts(&NativeValue::Array(vec![NativeValue::Int(1), NativeValue::Int(2)])));
    assert!(!NativeType::array_of(NativeType::Int)
        .accepts(&NativeValue::Array(vec![NativeValue::Bool(true)])));
}

#[test]
fn test_native_object_identity() {
    let a = NativeObject::new("com.example.Widget", Widget { id: 7 });
    let b = a.clone();
    let c = NativeObject::new("com.example.Widget", Widget { id: 7 });

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.class_name(), "com.example.Widget");
    assert_eq!(a.downcast_ref::<Widget>(), Some(&Widget { id: 7 }));
    assert!(a.downcast_ref::<String>().is_none());
}

#[test]
fn test_marshal_primitives() {
    let types = [
        NativeType::Boolean,
        NativeType::Int,
        NativeType::Double,
        NativeType::Char,
        NativeType::String,
    ];
    let args = [
        NativeValue::Bool(true),
        NativeValue::Int(-5),
        NativeValue::Double(2.5),
        NativeValue::Char('x'),
        NativeValue::from("hello"),
    ];

    let wrapped = marshal_args(&types, &args).unwrap();
    assert_eq!(
        wrapped.as_slice(),
        &[
            HostValue::Bool(true),
            HostValue::Number(-5.0),
            HostValue::Number(2.5),
            HostValue::from("x"),
            HostValue::from("hello"),
        ]
    );
}

#[test]
fn test_marshal_long_range() {
    let safe = to_host(&NativeValue::Long(MAX_SAFE_INTEGER), &NativeType::Long, 0).unwrap();
    assert_eq!(safe, HostValue::Number(MAX_SAFE_INTEGER as f64));

    let big = to_host(&NativeValue::Long(i64::MAX), &NativeType::Long, 0).unwrap();
    assert_eq!(big, HostValue::BigInt(i64::MAX));

    let min = to_host(&NativeValue::Long(i64::MIN), &NativeType::Long, 0).unwrap();
    assert_eq!(min, HostValue::BigInt(i64::MIN));
}

#[test]
fn test_marshal_objects_are_wrapped() {
    let widget = NativeObject::new("com.example.Widget", Widget { id: 1 });
    let value = to_host(
        &NativeValue::Object(widget.clone()),
        &NativeType::object("com.example.Widget"),
        0,
    )
    .unwrap();

    match value {
        HostValue::Wrapped(obj) => assert!(obj.ptr_eq(&widget)),
        other => panic!("expected wrapped object, got {:?}", other),
    }
}

#[test]
fn test_marshal_type_mismatch() {
    let err = marshal_args(
        &[NativeType::Int, NativeType::Int],
        &[NativeValue::Int(1), NativeValue::from("two")],
    )
    .unwrap_err();

    assert_eq!(
        err,
        BridgeError::Marshal {
            index: 1,
            expected: NativeType::Int,
            found: "string",
        }
    );
}

#[test]
fn test_marshal_arity_mismatch() {
    let err = marshal_args(&[NativeType::Int], &[]).unwrap_err();
    assert_eq!(err, BridgeError::ArityMismatch { expected: 1, found: 0 });
}

#[test]
fn test_unwrap_numbers() {
    assert_eq!(from_host(HostValue::Number(42.0)).unwrap(), NativeValue::Int(42));
    assert_eq!(from_host(HostValue::Number(-0.0)).unwrap(), NativeValue::Int(0));
    assert_eq!(
        from_host(HostValue::Number(4_294_967_296.0)).unwrap(),
        NativeValue::Long(4_294_967_296)
    );
    assert_eq!(from_host(HostValue::Number(1.5)).unwrap(), NativeValue::Double(1.5));
    assert_eq!(from_host(HostValue::BigInt(i64::MAX)).unwrap(), NativeValue::Long(i64::MAX));

    match from_host(HostValue::Number(f64::NAN)).unwrap() {
        NativeValue::Double(n) => assert!(n.is_nan()),
        other => panic!("expected NaN double, got {:?}", other),
    }
}

#[test]
fn test_unwrap_structures() {
    assert!(from_host(HostValue::Undefined).unwrap().is_null());
    assert!(from_host(HostValue::Null).unwrap().is_null());
    assert_eq!(
        from_host(HostValue::Array(vec![HostValue::Bool(false), HostValue::from("a")])).unwrap(),
        NativeValue::Array(vec![NativeValue::Bool(false), NativeValue::from("a")])
    );

    let widget = NativeObject::new("com.example.Widget", Widget { id: 2 });
    assert_eq!(
        from_host(HostValue::Wrapped(widget.clone())).unwrap(),
        NativeValue::Object(widget)
    );
}

#[test]
fn test_unwrap_host_only_values() {
    let err = from_host(HostValue::Callback(CallbackHandle::new(3))).unwrap_err();
    assert!(matches!(err, BridgeError::Unmarshal { found: "function", .. }));

    let err = from_host(HostValue::Object(HostObjectId::new(3))).unwrap_err();
    assert!(matches!(err, BridgeError::Unmarshal { found: "object", .. }));
}

#[test]
fn test_coerce_numeric() {
    assert_eq!(coerce(NativeValue::Int(7), &NativeType::Long).unwrap(), NativeValue::Long(7));
    assert_eq!(coerce(NativeValue::Int(7), &NativeType::Byte).unwrap(), NativeValue::Byte(7));
    assert_eq!(coerce(NativeValue::Int(7), &NativeType::Double).unwrap(), NativeValue::Double(7.0));
    assert_eq!(coerce(NativeValue::Double(3.9), &NativeType::Int).unwrap(), NativeValue::Int(3));
    assert_eq!(coerce(NativeValue::Int(2), &NativeType::Float).unwrap(), NativeValue::Float(2.0));

    let err = coerce(NativeValue::Int(300), &NativeType::Byte).unwrap_err();
    assert!(matches!(err, BridgeError::Unmarshal { found: "int", .. }));
}

#[test]
fn test_coerce_long_rejects_out_of_range_floats() {
    for value in [1e20, -1e20, 9_223_372_036_854_775_808.0, f64::INFINITY, f64::NAN] {
        let err = coerce(NativeValue::Double(value), &NativeType::Long).unwrap_err();
        assert!(matches!(err, BridgeError::Unmarshal { found: "double", .. }));
    }

    let err = coerce(NativeValue::Float(1e20), &NativeType::Long).unwrap_err();
    assert!(matches!(err, BridgeError::Unmarshal { found: "float", .. }));

    // -2^63 is exactly representable and in range
    assert_eq!(
        coerce(NativeValue::Double(-9_223_372_036_854_775_808.0), &NativeType::Long).unwrap(),
        NativeValue::Long(i64::MIN)
    );
    assert_eq!(coerce(NativeValue::Double(-7.9), &NativeType::Long).unwrap(), NativeValue::Long(-7));
}

#[test]
fn test_coerce_null_and_void() {
    assert_eq!(coerce(NativeValue::Null, &NativeType::Int).unwrap(), NativeValue::Int(0));
    assert_eq!(coerce(NativeValue::Null, &NativeType::Boolean).unwrap(), NativeValue::Bool(false));
    assert!(coerce(NativeValue::Null, &NativeType::String).unwrap().is_null());
    assert!(coerce(NativeValue::Int(5), &NativeType::Void).unwrap().is_null());
}

#[test]
fn test_coerce_chars_and_strings() {
    assert_eq!(coerce(NativeValue::from("q"), &NativeType::Char).unwrap(), NativeValue::Char('q'));
    assert_eq!(coerce(NativeValue::Int(65), &NativeType::Char).unwrap(), NativeValue::Char('A'));
    assert_eq!(coerce(NativeValue::Char('z'), &NativeType::String).unwrap(), NativeValue::from("z"));
    assert!(coerce(NativeValue::from("too long"), &NativeType::Char).is_err());
    assert!(coerce(NativeValue::Int(1), &NativeType::String).is_err());
    assert!(coerce(NativeValue::Int(1), &NativeType::Boolean).is_err());
}

#[test]
fn test_coerce_arrays() {
    let value = NativeValue::Array(vec![NativeValue::Int(1), NativeValue::Null]);
    assert_eq!(
        coerce(value, &NativeType::array_of(NativeType::Long)).unwrap(),
        NativeValue::Array(vec![NativeValue::Long(1), NativeValue::Long(0)])
    );
}

#[test]
fn test_override_entry_from_host_value() {
    let handle = CallbackHandle::new(9);
    assert_eq!(OverrideEntry::from(HostValue::Callback(handle)), OverrideEntry::Callback(handle));
    assert_eq!(
        OverrideEntry::from(HostValue::from("not-a-callback")),
        OverrideEntry::Other(HostValue::from("not-a-callback"))
    );
}

#[test]
fn test_override_map_ordering() {
    let map: OverrideMap = vec![
        ("run", HostValue::Callback(CallbackHandle::new(1))),
        ("close", HostValue::Null),
        ("apply", HostValue::Callback(CallbackHandle::new(2))),
    ]
    .into_iter()
    .collect();

    assert_eq!(map.methods().collect::<Vec<_>>(), vec!["apply", "close", "run"]);
    assert_eq!(map.callback("run"), Some(CallbackHandle::new(1)));
    assert_eq!(map.callback("close"), None);
    assert_eq!(map.len(), 3);
}

#[test]
fn test_override_map_validate() {
    let map = OverrideMap::new()
        .with_callback("toString", CallbackHandle::new(1))
        .with_value("hashCode", HostValue::Bool(true));

    assert!(map.validate(["toString"], FinalMethodPolicy::Dispatch).is_ok());
    assert!(map.validate(["toString"], FinalMethodPolicy::Ignore).is_ok());
    assert_eq!(
        map.validate(["getClass", "toString"], FinalMethodPolicy::Reject),
        Err(BridgeError::FinalMethodOverridden {
            method: "toString".to_string()
        })
    );
    // non-callback entries are never dispatched, so they cannot violate the policy
    assert!(map.validate(["hashCode"], FinalMethodPolicy::Reject).is_ok());
}

#[test]
fn test_proxy_overrides_set_once() {
    let proxy = ProxyInstance::new("java.lang.Runnable", HostObjectId::new(4));
    assert!(proxy.overrides().is_none());

    let first = OverrideMap::new().with_callback("run", CallbackHandle::new(1));
    proxy.set_overrides(first.clone()).unwrap();

    let second = OverrideMap::new().with_callback("run", CallbackHandle::new(2));
    assert_eq!(proxy.set_overrides(second), Err(BridgeError::OverridesAlreadySet));
    assert_eq!(proxy.overrides(), Some(&first));
    assert_eq!(proxy.host_object(), HostObjectId::new(4));
}

#[test]
fn test_local_environment_registry() {
    let env = LocalEnvironment::new();
    assert!(env.is_empty());

    let a = env.register(|_, _| Ok(HostValue::Null));
    let b = env.register(|_, _| Ok(HostValue::Null));
    assert_ne!(a, b);
    assert_eq!(env.len(), 2);

    assert!(env.unregister(a));
    assert!(!env.unregister(a));
    assert!(!env.contains(a));
    assert!(env.contains(b));
}

#[test]
fn test_local_environment_call() {
    let env = LocalEnvironment::new();
    let sum = env.register(|context, args| {
        assert_eq!(context, HostObjectId::new(5));
        let total: f64 = args
            .iter()
            .map(|arg| match arg {
                HostValue::Number(n) => *n,
                _ => 0.0,
            })
            .sum();
        Ok(HostValue::Number(total))
    });

    let result = env
        .call(sum, HostObjectId::new(5), &[HostValue::Number(1.0), HostValue::Number(2.0)])
        .unwrap();
    assert_eq!(result, HostValue::Number(3.0));
    assert_eq!(env.invocation_count(), 1);
}

#[test]
fn test_local_environment_errors() {
    let env = LocalEnvironment::new();
    let failing = env.register(|_, _| Err("TypeError: x is undefined".to_string()));

    assert_eq!(
        env.call(failing, HostObjectId::new(1), &[]),
        Err(BridgeError::callback(failing, "TypeError: x is undefined"))
    );

    let missing = CallbackHandle::new(999);
    assert_eq!(
        env.call(missing, HostObjectId::new(1), &[]),
        Err(BridgeError::UnknownCallback(missing))
    );
}

#[test]
fn test_callback_can_register_reentrantly() {
    let env = Arc::new(LocalEnvironment::new());
    let inner = Arc::clone(&env);
    let outer = env.register(move |_, _| {
        let handle = inner.register(|_, _| Ok(HostValue::Null));
        Ok(HostValue::Callback(handle))
    });

    let result = env.call(outer, HostObjectId::new(1), &[]).unwrap();
    assert!(result.as_callback().is_some());
    assert_eq!(env.len(), 2);
}

#[test]
fn test_bridge_unbound_returns_null() {
    let bridge = InvocationHandler::unbound(Arc::new(LocalEnvironment::new()));
    assert!(!bridge.is_bound());
    assert!(bridge.intercept("toString", &[], &[]).unwrap().is_null());
}

#[test]
fn test_bridge_proxy_without_overrides() {
    let env = Arc::new(LocalEnvironment::new());
    let proxy = Arc::new(ProxyInstance::new("java.lang.Runnable", HostObjectId::new(1)));
    let bridge = InvocationHandler::new(proxy, env.clone());

    assert!(bridge.intercept("run", &[], &[]).unwrap().is_null());
    assert_eq!(env.invocation_count(), 0);
}

#[test]
fn test_bridge_passes_context_object() {
    let env = Arc::new(LocalEnvironment::new());
    let echo = env.register(|context, _| Ok(HostValue::Number(context.raw() as f64)));
    let proxy = Arc::new(ProxyInstance::with_overrides(
        "java.util.function.Supplier",
        HostObjectId::new(77),
        OverrideMap::new().with_callback("get", echo),
    ));
    let bridge = InvocationHandler::new(proxy, env);

    assert_eq!(bridge.intercept("get", &[], &[]).unwrap(), NativeValue::Int(77));
}

#[test]
fn test_bridge_type_default_result() {
    let env = Arc::new(LocalEnvironment::new());
    let bridge = InvocationHandler::new(proxy_with(OverrideMap::new()), env)
        .with_config(BridgeConfig::default().with_default_result(DefaultResult::TypeDefault));

    let signature = MethodSignature::new("size", vec![], NativeType::Int);
    assert_eq!(bridge.invoke(signature.call(&[])).unwrap(), NativeValue::Int(0));

    // no declared return type: still null
    assert!(bridge.intercept("size", &[], &[]).unwrap().is_null());
}

#[test]
fn test_bridge_coerces_to_return_type() {
    let env = Arc::new(LocalEnvironment::new());
    let length = env.register(|_, _| Ok(HostValue::Number(12.0)));
    let bridge = InvocationHandler::new(proxy_with(OverrideMap::new().with_callback("length", length)), env);

    let signature = MethodSignature::new("length", vec![], NativeType::Long);
    assert_eq!(bridge.invoke(signature.call(&[])).unwrap(), NativeValue::Long(12));

    let signature = MethodSignature::new("length", vec![], NativeType::Double);
    assert_eq!(bridge.invoke(signature.call(&[])).unwrap(), NativeValue::Double(12.0));
}

#[test]
fn test_bridge_long_return_out_of_range_fails() {
    let env = Arc::new(LocalEnvironment::new());
    let huge = env.register(|_, _| Ok(HostValue::Number(1e20)));
    let bridge = InvocationHandler::new(proxy_with(OverrideMap::new().with_callback("size", huge)), env);

    let signature = MethodSignature::new("size", vec![], NativeType::Long);
    let err = bridge.invoke(signature.call(&[])).unwrap_err();
    assert!(matches!(err, BridgeError::Unmarshal { found: "double", .. }));
}

#[test]
fn test_bridge_coercion_disabled() {
    let env = Arc::new(LocalEnvironment::new());
    let length = env.register(|_, _| Ok(HostValue::Number(12.0)));
    let bridge = InvocationHandler::new(proxy_with(OverrideMap::new().with_callback("length", length)), env)
        .with_config(BridgeConfig::default().with_coerce_returns(false));

    let signature = MethodSignature::new("length", vec![], NativeType::Long);
    assert_eq!(bridge.invoke(signature.call(&[])).unwrap(), NativeValue::Int(12));
}

#[test]
fn test_bridge_void_return_discards_value() {
    let env = Arc::new(LocalEnvironment::new());
    let run = env.register(|_, _| Ok(HostValue::from("ignored")));
    let bridge = InvocationHandler::new(proxy_with(OverrideMap::new().with_callback("run", run)), env.clone());

    let signature = MethodSignature::new("run", vec![], NativeType::Void);
    assert!(bridge.invoke(signature.call(&[])).unwrap().is_null());
    assert_eq!(env.invocation_count(), 1);
}

#[test]
fn test_bridge_uses_custom_marshaler() {
    struct Uppercase;

    impl Marshaler for Uppercase {
        fn wrap_arguments(&self, parameter_types: &[NativeType], args: &[NativeValue]) -> crate::BridgeResult<HostArgs> {
            DefaultMarshaler.wrap_arguments(parameter_types, args)
        }

        fn unwrap(&self, value: HostValue) -> crate::BridgeResult<NativeValue> {
            match value {
                HostValue::String(s) => Ok(NativeValue::String(s.to_uppercase())),
                other => from_host(other),
            }
        }

        fn coerce(&self, value: NativeValue, target: &NativeType) -> crate::BridgeResult<NativeValue> {
            coerce(value, target)
        }
    }

    let env = Arc::new(LocalEnvironment::new());
    let name = env.register(|_, _| Ok(HostValue::from("widget")));
    let bridge = InvocationHandler::new(proxy_with(OverrideMap::new().with_callback("name", name)), env)
        .with_marshaler(Arc::new(Uppercase));

    assert_eq!(bridge.intercept("name", &[], &[]).unwrap(), NativeValue::from("WIDGET"));
}
