//! Pixel and Scalar Data Types
//!
//! The dtype axis of type resolution. Each foreign concrete class is
//! specialised on one of these (e.g. `ImageF` on `Float32`, `Extent2I` on
//! `Int32`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Data type of a foreign object's scalars or pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// Boolean flags
    Bool,
    /// Unsigned 16-bit integer (mask planes)
    UInt16,
    /// Signed 32-bit integer
    Int32,
    /// Signed 64-bit integer
    Int64,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
}

impl DType {
    /// Get the size in bytes for this dtype
    pub fn size(&self) -> usize {
        match self {
            DType::Bool => 1,
            DType::UInt16 => 2,
            DType::Int32 | DType::Float32 => 4,
            DType::Int64 | DType::Float64 => 8,
        }
    }

    /// Get the dtype name (e.g., "float64")
    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::UInt16 => "uint16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::Float32 => "float32",
            DType::Float64 => "float64",
        }
    }

    /// Suffix used by the foreign library's concrete class names
    pub fn suffix(&self) -> &'static str {
        match self {
            DType::Bool => "B",
            DType::UInt16 => "U",
            DType::Int32 => "I",
            DType::Int64 => "L",
            DType::Float32 => "F",
            DType::Float64 => "D",
        }
    }

    /// Parse dtype from a name or short code
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "bool" | "B" => Some(DType::Bool),
            "uint16" | "u2" | "U" => Some(DType::UInt16),
            "int32" | "i4" | "I" | "int" => Some(DType::Int32),
            "int64" | "i8" | "L" => Some(DType::Int64),
            "float32" | "f4" | "F" => Some(DType::Float32),
            "float64" | "f8" | "D" | "float" | "double" => Some(DType::Float64),
            _ => None,
        }
    }

    /// Check if this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(self, DType::UInt16 | DType::Int32 | DType::Int64)
    }

    /// Check if this is a floating point type
    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// Round-trip a value through this dtype's representation
    pub fn coerce(&self, value: f64) -> f64 {
        match self {
            DType::Bool => {
                if value != 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            DType::UInt16 => value as u16 as f64,
            DType::Int32 => value as i32 as f64,
            DType::Int64 => value as i64 as f64,
            DType::Float32 => value as f32 as f64,
            DType::Float64 => value,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_properties() {
        assert_eq!(DType::Float64.size(), 8);
        assert_eq!(DType::UInt16.size(), 2);
        assert!(DType::Float32.is_float());
        assert!(DType::Int32.is_integer());
        assert!(!DType::Bool.is_integer());
        assert_eq!(DType::Float32.suffix(), "F");
    }

    #[test]
    fn test_dtype_parsing() {
        assert_eq!(DType::from_str("float64"), Some(DType::Float64));
        assert_eq!(DType::from_str("I"), Some(DType::Int32));
        assert_eq!(DType::from_str("double"), Some(DType::Float64));
        assert_eq!(DType::from_str("complex64"), None);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(DType::Int32.coerce(2.7), 2.0);
        assert_eq!(DType::UInt16.coerce(-3.0), 0.0);
        assert_eq!(DType::Float32.coerce(0.1), 0.1f32 as f64);
        assert_eq!(DType::Bool.coerce(5.0), 1.0);
    }
}
