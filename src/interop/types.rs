//! Native-side type system for intercepted calls
//!
//! Describes declared parameter/return types and the argument values that
//! arrive from the proxied object.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Declared type of a parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeType {
    Void,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    /// Reference type, identified by class name
    Object(String),
    Array(Box<NativeType>),
}

impl NativeType {
    /// Shorthand for an object type
    pub fn object(class_name: impl Into<String>) -> Self {
        Self::Object(class_name.into())
    }

    /// Shorthand for an array type
    pub fn array_of(element: NativeType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Check if values of this type cannot be null
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Boolean
                | Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::Char
        )
    }

    /// Check if type is integral
    #[inline]
    pub const fn is_integral(&self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    /// Check if type is floating point
    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Zero value of the type: `Null` for references and `Void`
    pub fn default_value(&self) -> NativeValue {
        match self {
            Self::Boolean => NativeValue::Bool(false),
            Self::Byte => NativeValue::Byte(0),
            Self::Short => NativeValue::Short(0),
            Self::Int => NativeValue::Int(0),
            Self::Long => NativeValue::Long(0),
            Self::Float => NativeValue::Float(0.0),
            Self::Double => NativeValue::Double(0.0),
            Self::Char => NativeValue::Char('\0'),
            Self::Void | Self::String | Self::Object(_) | Self::Array(_) => NativeValue::Null,
        }
    }

    /// Check whether `value` is a legal argument for a parameter of this type.
    ///
    /// `Object` parameters accept anything (boxed primitives included);
    /// other reference types accept `Null`. Array elements are checked
    /// recursively, without a depth limit.
    pub fn accepts(&self, value: &NativeValue) -> bool {
        match (self, value) {
            (Self::Object(_), _) => true,
            (Self::String | Self::Array(_), NativeValue::Null) => true,
            (Self::Void, NativeValue::Null) => true,
            (Self::Boolean, NativeValue::Bool(_))
            | (Self::Byte, NativeValue::Byte(_))
            | (Self::Short, NativeValue::Short(_))
            | (Self::Int, NativeValue::Int(_))
            | (Self::Long, NativeValue::Long(_))
            | (Self::Float, NativeValue::Float(_))
            | (Self::Double, NativeValue::Double(_))
            | (Self::Char, NativeValue::Char(_))
            | (Self::String, NativeValue::String(_)) => true,
            (Self::Array(element), NativeValue::Array(items)) => {
                items.iter().all(|item| element.accepts(item))
            }
            _ => false,
        }
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Boolean => write!(f, "boolean"),
            Self::Byte => write!(f, "byte"),
            Self::Short => write!(f, "short"),
            Self::Int => write!(f, "int"),
            Self::Long => write!(f, "long"),
            Self::Float => write!(f, "float"),
            Self::Double => write!(f, "double"),
            Self::Char => write!(f, "char"),
            Self::String => write!(f, "string"),
            Self::Object(class_name) => write!(f, "{}", class_name),
            Self::Array(element) => write!(f, "{}[]", element),
        }
    }
}

/// Opaque native instance passed by reference across the boundary.
///
/// Identity is pointer identity: two handles are equal only if they refer to
/// the same underlying instance.
#[derive(Clone)]
pub struct NativeObject {
    class_name: Arc<str>,
    inner: Arc<dyn Any + Send + Sync>,
}

impl NativeObject {
    pub fn new<T: Any + Send + Sync>(class_name: &str, value: T) -> Self {
        Self {
            class_name: Arc::from(class_name),
            inner: Arc::new(value),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Borrow the wrapped instance if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &NativeObject) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for NativeObject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeObject({}@{:p})", self.class_name, Arc::as_ptr(&self.inner))
    }
}

/// Argument or return value on the native side of the bridge
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NativeValue {
    #[default]
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Array(Vec<NativeValue>),
    Object(NativeObject),
}

impl NativeValue {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Type name for error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Byte(_) => "byte",
            Self::Short(_) => "short",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Byte(v) => Some(v as i64),
            Self::Short(v) => Some(v as i64),
            Self::Int(v) => Some(v as i64),
            Self::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Float(v) => Some(v as f64),
            Self::Double(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for NativeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for NativeValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<i64> for NativeValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<f64> for NativeValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for NativeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Declared shape of a proxied method, owned by the proxy generator
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub parameter_types: Vec<NativeType>,
    pub return_type: NativeType,
    pub is_final: bool,
}

impl MethodSignature {
    pub fn new(
        name: impl Into<String>,
        parameter_types: Vec<NativeType>,
        return_type: NativeType,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_types,
            return_type,
            is_final: false,
        }
    }

    pub fn final_method(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Build the per-call request for this method
    pub fn call<'a>(&'a self, args: &'a [NativeValue]) -> MethodCall<'a> {
        MethodCall {
            name: &self.name,
            parameter_types: &self.parameter_types,
            args,
            return_type: Some(&self.return_type),
            is_final: self.is_final,
        }
    }
}

/// One intercepted call, consumed synchronously by the bridge
#[derive(Debug, Clone, Copy)]
pub struct MethodCall<'a> {
    pub name: &'a str,
    pub parameter_types: &'a [NativeType],
    pub args: &'a [NativeValue],
    /// Declared return type, when the interception mechanism knows it
    pub return_type: Option<&'a NativeType>,
    pub is_final: bool,
}

impl<'a> MethodCall<'a> {
    #[inline]
    pub const fn new(name: &'a str, parameter_types: &'a [NativeType], args: &'a [NativeValue]) -> Self {
        Self {
            name,
            parameter_types,
            args,
            return_type: None,
            is_final: false,
        }
    }

    pub fn returning(mut self, return_type: &'a NativeType) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn final_method(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }
}
