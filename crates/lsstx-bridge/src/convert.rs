//! Value Conversions
//!
//! Two kinds of conversion live here:
//!
//! - [`Conversion`] functions, attached to a property binding and applied to
//!   the value on its way out of a getter or into a setter.
//! - The [`FromValue`] trait, used by callers that want a typed Rust value
//!   out of a dynamic [`Value`].

use crate::array::PixelArray;
use crate::error::{AdapterError, AdapterResult};
use crate::handle::NativeHandle;
use crate::value::Value;
use crate::wrapper::WrappedObject;

/// Value conversion applied on property read or write
pub type Conversion = fn(Value) -> AdapterResult<Value>;

/// Coerce to a boolean; integers are truthy when non-zero
pub fn to_bool(value: Value) -> AdapterResult<Value> {
    match value.as_bool() {
        Some(b) => Ok(Value::Bool(b)),
        None => Err(AdapterError::conversion("bool", value.type_name())),
    }
}

/// Coerce to an integer; floats must be integral
pub fn to_int(value: Value) -> AdapterResult<Value> {
    match value {
        Value::Bool(_) => Err(AdapterError::conversion("int", "bool")),
        ref v => match v.as_int() {
            Some(n) => Ok(Value::Int(n)),
            None => Err(AdapterError::conversion("int", v.to_string())),
        },
    }
}

/// Coerce to a float
pub fn to_float(value: Value) -> AdapterResult<Value> {
    match value.as_float() {
        Some(f) => Ok(Value::Float(f)),
        None => Err(AdapterError::conversion("float", value.type_name())),
    }
}

// ============================================================================
// FromValue - typed extraction
// ============================================================================

/// Trait for extracting Rust values from a [`Value`].
pub trait FromValue: Sized {
    /// Try to convert from a dynamic value
    fn from_value(value: Value) -> AdapterResult<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> AdapterResult<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(AdapterError::conversion("bool", other.type_name())),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::Int(n) => Ok(n),
            other => Err(AdapterError::conversion("int", other.type_name())),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> AdapterResult<Self> {
        value
            .as_float()
            .ok_or_else(|| AdapterError::conversion("float", value.type_name()))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::Str(s) => Ok(s.to_string()),
            other => Err(AdapterError::conversion("str", other.type_name())),
        }
    }
}

impl FromValue for PixelArray {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::Array(arr) => Ok(arr),
            other => Err(AdapterError::conversion("array", other.type_name())),
        }
    }
}

impl FromValue for NativeHandle {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::Handle(h) => Ok(h),
            other => Err(AdapterError::conversion("native handle", other.type_name())),
        }
    }
}

impl FromValue for WrappedObject {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::Object(obj) => Ok(obj),
            other => Err(AdapterError::conversion("wrapped object", other.type_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> AdapterResult<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(AdapterError::conversion("list", other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_bool() {
        assert_eq!(to_bool(Value::Int(1)).unwrap(), Value::Bool(true));
        assert_eq!(to_bool(Value::Int(0)).unwrap(), Value::Bool(false));
        assert!(to_bool(Value::from("yes")).is_err());
    }

    #[test]
    fn test_to_int_rejects_fraction() {
        assert_eq!(to_int(Value::Float(4.0)).unwrap(), Value::Int(4));
        let err = to_int(Value::Float(4.5)).unwrap_err();
        assert!(err.is_type_error());
        assert!(to_int(Value::Bool(true)).is_err());
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float(Value::Int(3)).unwrap(), Value::Float(3.0));
        assert!(to_float(Value::None).is_err());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(i64::from_value(Value::Int(3)).unwrap(), 3);
        assert!(i64::from_value(Value::Float(3.0)).is_err());
        assert_eq!(f64::from_value(Value::Int(3)).unwrap(), 3.0);
        assert_eq!(Option::<i64>::from_value(Value::None).unwrap(), None);
        assert_eq!(
            Vec::<bool>::from_value(Value::List(vec![Value::Bool(true), Value::Bool(false)])).unwrap(),
            vec![true, false]
        );
    }
}
