//! Type marshaling - native ↔ host conversions
//!
//! Design: primitives are copied, native objects cross as `Wrapped` handles
//! so the host can pass them back untouched.

use smallvec::SmallVec;

use super::host::HostValue;
use super::types::{NativeType, NativeValue};
use crate::errors::{BridgeError, BridgeResult};
use crate::logging::log_type_conversion;

/// Marshaled argument list; most proxied methods take few arguments
pub type HostArgs = SmallVec<[HostValue; 4]>;

/// Largest integer a host `Number` holds exactly (2^53 - 1)
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Conversion between the native call representation and the host's.
///
/// The bridge calls `wrap_arguments` before the callback and `unwrap` on its
/// result; `coerce` narrows an unwrapped value to a declared return type.
pub trait Marshaler: Send + Sync {
    fn wrap_arguments(&self, parameter_types: &[NativeType], args: &[NativeValue]) -> BridgeResult<HostArgs>;

    fn unwrap(&self, value: HostValue) -> BridgeResult<NativeValue>;

    fn coerce(&self, value: NativeValue, target: &NativeType) -> BridgeResult<NativeValue>;
}

/// Marshaler with the standard conversion rules
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMarshaler;

impl Marshaler for DefaultMarshaler {
    fn wrap_arguments(&self, parameter_types: &[NativeType], args: &[NativeValue]) -> BridgeResult<HostArgs> {
        marshal_args(parameter_types, args)
    }

    fn unwrap(&self, value: HostValue) -> BridgeResult<NativeValue> {
        from_host(value)
    }

    fn coerce(&self, value: NativeValue, target: &NativeType) -> BridgeResult<NativeValue> {
        coerce(value, target)
    }
}

/// Marshal an argument list against its declared parameter types
pub fn marshal_args(parameter_types: &[NativeType], args: &[NativeValue]) -> BridgeResult<HostArgs> {
    if parameter_types.len() != args.len() {
        return Err(BridgeError::ArityMismatch {
            expected: parameter_types.len(),
            found: args.len(),
        });
    }

    parameter_types
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (ty, arg))| to_host(arg, ty, index))
        .collect()
}

/// Marshal one native argument to its host representation.
///
/// `index` is only used to locate the argument in error reports.
pub fn to_host(value: &NativeValue, declared: &NativeType, index: usize) -> BridgeResult<HostValue> {
    if !declared.accepts(value) {
        return Err(BridgeError::Marshal {
            index,
            expected: declared.clone(),
            found: value.kind(),
        });
    }

    Ok(convert_to_host(value))
}

/// Nested arrays recurse one frame per level; nesting depth is not bounded.
fn convert_to_host(value: &NativeValue) -> HostValue {
    match value {
        NativeValue::Null => HostValue::Null,
        NativeValue::Bool(b) => HostValue::Bool(*b),
        NativeValue::Byte(v) => HostValue::Number(*v as f64),
        NativeValue::Short(v) => HostValue::Number(*v as f64),
        NativeValue::Int(v) => HostValue::Number(*v as f64),
        NativeValue::Long(v) if v.unsigned_abs() <= MAX_SAFE_INTEGER as u64 => HostValue::Number(*v as f64),
        NativeValue::Long(v) => HostValue::BigInt(*v),
        NativeValue::Float(v) => HostValue::Number(*v as f64),
        NativeValue::Double(v) => HostValue::Number(*v),
        NativeValue::Char(c) => HostValue::String(c.to_string()),
        NativeValue::String(s) => HostValue::String(s.clone()),
        NativeValue::Array(items) => HostValue::Array(items.iter().map(convert_to_host).collect()),
        NativeValue::Object(obj) => HostValue::Wrapped(obj.clone()),
    }
}

/// Unmarshal a host value into the native representation.
///
/// Integral numbers come back as the narrowest of `Int`/`Long` that holds
/// them; everything else numeric is a `Double`. Arrays are converted
/// recursively with no depth limit, so hosts must not hand over arbitrarily
/// deep nesting.
pub fn from_host(value: HostValue) -> BridgeResult<NativeValue> {
    let native = match value {
        HostValue::Undefined | HostValue::Null => NativeValue::Null,
        HostValue::Bool(b) => NativeValue::Bool(b),
        HostValue::Number(n) => number_to_native(n),
        HostValue::BigInt(v) => NativeValue::Long(v),
        HostValue::String(s) => NativeValue::String(s),
        HostValue::Array(items) => NativeValue::Array(
            items
                .into_iter()
                .map(from_host)
                .collect::<BridgeResult<Vec<_>>>()?,
        ),
        HostValue::Wrapped(obj) => NativeValue::Object(obj),
        other @ (HostValue::Callback(_) | HostValue::Object(_)) => {
            return Err(BridgeError::Unmarshal {
                found: other.kind(),
                target: "native value".to_string(),
            });
        }
    };
    Ok(native)
}

fn number_to_native(n: f64) -> NativeValue {
    if n.is_finite() && n.fract() == 0.0 {
        if n >= i32::MIN as f64 && n <= i32::MAX as f64 {
            return NativeValue::Int(n as i32);
        }
        if n.abs() <= MAX_SAFE_INTEGER as f64 {
            return NativeValue::Long(n as i64);
        }
    }
    NativeValue::Double(n)
}

/// Coerce an unmarshaled value to a declared native type
pub fn coerce(value: NativeValue, target: &NativeType) -> BridgeResult<NativeValue> {
    let mismatch = |value: &NativeValue| BridgeError::Unmarshal {
        found: value.kind(),
        target: target.to_string(),
    };

    if matches!(target, NativeType::Void) {
        return Ok(NativeValue::Null);
    }
    if value.is_null() {
        return Ok(target.default_value());
    }

    log_type_conversion(value.kind(), target);

    let coerced = match target {
        NativeType::Void => NativeValue::Null,
        NativeType::Object(_) => value,
        NativeType::Boolean => match value {
            NativeValue::Bool(b) => NativeValue::Bool(b),
            other => return Err(mismatch(&other)),
        },
        NativeType::Byte => NativeValue::Byte(
            integral(&value)
                .and_then(|v| i8::try_from(v).ok())
                .ok_or_else(|| mismatch(&value))?,
        ),
        NativeType::Short => NativeValue::Short(
            integral(&value)
                .and_then(|v| i16::try_from(v).ok())
                .ok_or_else(|| mismatch(&value))?,
        ),
        NativeType::Int => NativeValue::Int(
            integral(&value)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| mismatch(&value))?,
        ),
        NativeType::Long => NativeValue::Long(integral(&value).ok_or_else(|| mismatch(&value))?),
        NativeType::Float => NativeValue::Float(value.as_f64().ok_or_else(|| mismatch(&value))? as f32),
        NativeType::Double => NativeValue::Double(value.as_f64().ok_or_else(|| mismatch(&value))?),
        NativeType::Char => NativeValue::Char(to_char(&value).ok_or_else(|| mismatch(&value))?),
        NativeType::String => match value {
            NativeValue::String(s) => NativeValue::String(s),
            NativeValue::Char(c) => NativeValue::String(c.to_string()),
            other => return Err(mismatch(&other)),
        },
        NativeType::Array(element) => match value {
            NativeValue::Array(items) => NativeValue::Array(
                items
                    .into_iter()
                    .map(|item| coerce(item, element))
                    .collect::<BridgeResult<Vec<_>>>()?,
            ),
            other => return Err(mismatch(&other)),
        },
    };

    Ok(coerced)
}

/// Integral view of a value; floats truncate toward zero and must land in i64 range
fn integral(value: &NativeValue) -> Option<i64> {
    match *value {
        NativeValue::Float(f) => float_to_i64(f as f64),
        NativeValue::Double(f) => float_to_i64(f),
        _ => value.as_i64(),
    }
}

fn float_to_i64(f: f64) -> Option<i64> {
    // i64::MIN is exactly -2^63; 2^63 itself is one past i64::MAX
    const LOWER: f64 = -9_223_372_036_854_775_808.0;
    const UPPER: f64 = 9_223_372_036_854_775_808.0;

    let truncated = f.trunc();
    (truncated >= LOWER && truncated < UPPER).then_some(truncated as i64)
}

/// A char, a one-character string, or an integral code point
fn to_char(value: &NativeValue) -> Option<char> {
    match value {
        NativeValue::Char(c) => Some(*c),
        NativeValue::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
        other => other
            .as_i64()
            .and_then(|code| u32::try_from(code).ok())
            .and_then(char::from_u32),
    }
}
