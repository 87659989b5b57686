//! Dynamic Values
//!
//! [`Value`] is what crosses the adapter boundary in both directions: scalar
//! arguments for foreign constructors, return values of foreign getters, raw
//! handles and adapters waiting to be unwrapped.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::array::PixelArray;
use crate::extract::ExtractHandle;
use crate::handle::NativeHandle;
use crate::wrapper::WrappedObject;

/// Any value exchanged with the foreign library.
#[derive(Clone)]
pub enum Value {
    /// Absent value
    None,

    /// Boolean
    Bool(bool),

    /// Integer scalar
    Int(i64),

    /// Floating scalar
    Float(f64),

    /// String
    Str(SmolStr),

    /// Ordered sequence
    List(Vec<Value>),

    /// Insertion-ordered mapping
    Map(IndexMap<SmolStr, Value>),

    /// 2-D pixel buffer
    Array(PixelArray),

    /// Raw foreign handle
    Handle(NativeHandle),

    /// Adapter created by this crate
    Object(WrappedObject),

    /// Any other adapter that can hand out its handle
    Adapter(Rc<dyn ExtractHandle>),
}

impl Value {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Array(_) => "array",
            Value::Handle(h) => h.type_name(),
            Value::Object(obj) => obj.class_name(),
            Value::Adapter(_) => "adapter",
        }
    }

    /// Check if this value is None
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Whether this is an integer or floating scalar
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Try to extract as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            _ => None,
        }
    }

    /// Try to extract as i64; floats must be integral
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Try to extract as f64
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Try to extract as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to extract as list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Try to extract as pixel array
    pub fn as_array(&self) -> Option<&PixelArray> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Try to extract as raw handle
    pub fn as_handle(&self) -> Option<&NativeHandle> {
        match self {
            Value::Handle(h) => Some(h),
            _ => None,
        }
    }

    /// Try to extract as adapter
    pub fn as_object(&self) -> Option<&WrappedObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Consume into an adapter
    pub fn into_object(self) -> Option<WrappedObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "'{}'", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Array(arr) => write!(f, "<array {} {}x{}>", arr.dtype().name(), arr.rows(), arr.cols()),
            Value::Handle(h) => write!(f, "<{}>", h.type_name()),
            Value::Object(obj) => write!(f, "{}", obj),
            Value::Adapter(a) => write!(f, "<adapter {}>", a.extract_handle().type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Handle(h) => write!(f, "{:?}", h),
            other => write!(f, "{}", other),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::None
    }
}

/// Structural equality for plain data; handles and adapters compare by identity
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Handle(a), Value::Handle(b)) => a.same_object(b),
            (Value::Object(a), Value::Object(b)) => a.extract_handle().same_object(&b.extract_handle()),
            (Value::Adapter(a), Value::Adapter(b)) => a.extract_handle().same_object(&b.extract_handle()),
            _ => false,
        }
    }
}

// ============================================================================
// Conversions from Rust values
// ============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(SmolStr::new(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(SmolStr::new(v))
    }
}

impl From<PixelArray> for Value {
    fn from(v: PixelArray) -> Self {
        Value::Array(v)
    }
}

impl From<NativeHandle> for Value {
    fn from(v: NativeHandle) -> Self {
        Value::Handle(v)
    }
}

impl From<WrappedObject> for Value {
    fn from(v: WrappedObject) -> Self {
        Value::Object(v)
    }
}

impl From<&WrappedObject> for Value {
    fn from(v: &WrappedObject) -> Self {
        Value::Object(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::None,
        }
    }
}
