//! Error Types for the Adapter Layer
//!
//! Every operation in this crate reports failures through [`AdapterError`].
//! Errors raised by the foreign library are never swallowed: they are
//! re-surfaced as [`AdapterError::ForeignCall`] with the class, the attribute or
//! method, and a summary of the arguments, while the original
//! [`ForeignError`] stays reachable through `source()`.
//!
//! ## Error Categories
//!
//! - Dispatch failures (no registered type, bad arguments)
//! - Attribute failures (unknown, read-only)
//! - Foreign call failures
//! - Registration and configuration mistakes

use std::fmt;
use thiserror::Error;

use crate::dtype::DType;

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type for calls into the foreign library
pub type ForeignResult<T> = Result<T, ForeignError>;

/// Adapter error types
#[derive(Error, Debug, Clone)]
pub enum AdapterError {
    /// Dispatch found no foreign type for the inferred key
    #[error("unsupported type for role '{role}': no foreign type registered for {}", describe_key(.dtype, .dims))]
    UnsupportedType {
        /// Role being constructed
        role: String,
        /// Inferred or requested dtype, if one could be determined
        dtype: Option<DType>,
        /// Inferred or requested dimensionality, if one could be determined
        dims: Option<usize>,
    },

    /// Neither a property binding nor delegation resolved the name
    #[error("attribute '{attribute}' not found on {class}")]
    AttributeNotFound {
        /// Requested attribute
        attribute: String,
        /// Adapter class name
        class: String,
    },

    /// Write attempted on a property without a setter
    #[error("attribute '{attribute}' of {class} is read-only")]
    ImmutableAttribute {
        /// Requested attribute
        attribute: String,
        /// Adapter class name
        class: String,
    },

    /// The foreign library raised during a delegated call
    #[error("{class}.{target}({args}) failed: {reason}")]
    ForeignCall {
        /// Adapter class, or role when no object exists yet
        class: String,
        /// Attribute, method or constructor name
        target: String,
        /// Short summary of the arguments
        args: String,
        /// Readable reason
        reason: String,
        /// The original foreign error
        #[source]
        source: ForeignError,
    },

    /// The foreign accessor behind a bound property raised
    #[error("{access} of attribute '{attribute}' on {class} (role '{role}') failed: {reason}")]
    PropertyAccess {
        /// `read` or `write`
        access: &'static str,
        /// Role of the object
        role: String,
        /// Adapter class name
        class: String,
        /// Bound attribute name
        attribute: String,
        /// Readable reason
        reason: String,
        /// The original foreign error
        #[source]
        source: ForeignError,
    },

    /// Construction arguments could not be interpreted
    #[error("invalid arguments for role '{role}': {reason}")]
    InvalidArguments {
        /// Role being constructed
        role: String,
        /// Description of the problem
        reason: String,
    },

    /// A value conversion failed
    #[error("cannot convert {actual} to {expected}")]
    Conversion {
        /// Expected type
        expected: String,
        /// Actual type received
        actual: String,
    },

    /// Two registrations claim the same key or foreign type
    #[error("ambiguous registration for role '{role}': {reason}")]
    AmbiguousRegistration {
        /// Role being registered
        role: String,
        /// Description of the conflict
        reason: String,
    },

    /// The same attribute was bound twice on one class
    #[error("property '{name}' is bound twice on {class}")]
    DuplicateProperty {
        /// Adapter class name
        class: String,
        /// Property name
        name: String,
    },

    /// Operation not supported by this class
    #[error("{class} does not support {operation}")]
    NotSupported {
        /// Adapter class name
        class: String,
        /// Description of the operation
        operation: String,
    },

    /// Index or region outside the object bounds
    #[error("index out of range: {context}")]
    IndexOutOfRange {
        /// Description of the failing access
        context: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },
}

fn describe_key(dtype: &Option<DType>, dims: &Option<usize>) -> String {
    let dtype = dtype.map(|d| d.name()).unwrap_or("<unknown dtype>");
    match dims {
        Some(n) => format!("dtype {} with {} dimension(s)", dtype, n),
        None => format!("dtype {} with unknown dimensionality", dtype),
    }
}

impl AdapterError {
    /// Create an unsupported type error
    pub fn unsupported_type(role: impl Into<String>, dtype: Option<DType>, dims: Option<usize>) -> Self {
        AdapterError::UnsupportedType {
            role: role.into(),
            dtype,
            dims,
        }
    }

    /// Create an attribute not found error
    pub fn attribute_not_found(attribute: impl Into<String>, class: impl Into<String>) -> Self {
        AdapterError::AttributeNotFound {
            attribute: attribute.into(),
            class: class.into(),
        }
    }

    /// Create an immutable attribute error
    pub fn immutable_attribute(attribute: impl Into<String>, class: impl Into<String>) -> Self {
        AdapterError::ImmutableAttribute {
            attribute: attribute.into(),
            class: class.into(),
        }
    }

    /// Wrap a foreign error with the call context
    pub fn foreign_call(
        class: impl Into<String>,
        target: impl Into<String>,
        args: impl Into<String>,
        source: ForeignError,
    ) -> Self {
        AdapterError::ForeignCall {
            class: class.into(),
            target: target.into(),
            args: args.into(),
            reason: source.summary(),
            source,
        }
    }

    /// Wrap a foreign error raised while reading (`write == false`) or
    /// writing a bound property
    pub fn property_access(
        write: bool,
        role: impl Into<String>,
        class: impl Into<String>,
        attribute: impl Into<String>,
        source: ForeignError,
    ) -> Self {
        AdapterError::PropertyAccess {
            access: if write { "write" } else { "read" },
            role: role.into(),
            class: class.into(),
            attribute: attribute.into(),
            reason: source.summary(),
            source,
        }
    }

    /// Create an invalid arguments error
    pub fn invalid_arguments(role: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::InvalidArguments {
            role: role.into(),
            reason: reason.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        AdapterError::Conversion {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an ambiguous registration error
    pub fn ambiguous(role: impl Into<String>, reason: impl Into<String>) -> Self {
        AdapterError::AmbiguousRegistration {
            role: role.into(),
            reason: reason.into(),
        }
    }

    /// Create a not supported error
    pub fn not_supported(class: impl Into<String>, operation: impl Into<String>) -> Self {
        AdapterError::NotSupported {
            class: class.into(),
            operation: operation.into(),
        }
    }

    /// Create an index out of range error
    pub fn out_of_range(context: impl Into<String>) -> Self {
        AdapterError::IndexOutOfRange {
            context: context.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        AdapterError::Config {
            message: message.into(),
        }
    }

    /// Check if this is a dispatch or conversion error
    pub fn is_type_error(&self) -> bool {
        matches!(
            self,
            AdapterError::UnsupportedType { .. }
                | AdapterError::InvalidArguments { .. }
                | AdapterError::Conversion { .. }
        )
    }

    /// Check if this is an attribute error
    pub fn is_attribute_error(&self) -> bool {
        matches!(
            self,
            AdapterError::AttributeNotFound { .. } | AdapterError::ImmutableAttribute { .. }
        )
    }

    /// Check if this error came from the foreign library
    pub fn is_foreign(&self) -> bool {
        matches!(
            self,
            AdapterError::ForeignCall { .. } | AdapterError::PropertyAccess { .. }
        )
    }
}

// ============================================================================
// ForeignError - raised by the foreign library
// ============================================================================

/// Category of a foreign failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignErrorKind {
    /// Argument of the wrong type or wrong overload
    Type,
    /// Argument of the right type but an invalid value
    Value,
    /// Index out of bounds
    Index,
    /// Operation not implemented for this concrete type
    NotImplemented,
    /// Anything else
    Runtime,
}

impl fmt::Display for ForeignErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForeignErrorKind::Type => "type error",
            ForeignErrorKind::Value => "invalid value",
            ForeignErrorKind::Index => "index out of range",
            ForeignErrorKind::NotImplemented => "not implemented",
            ForeignErrorKind::Runtime => "runtime error",
        };
        write!(f, "{}", name)
    }
}

/// Error raised by the foreign library.
///
/// `detail` carries the low-level diagnostic (mangled overload names, wrapper
/// internals). It is kept for debugging but never shown in adapter messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignError {
    /// Failure category
    pub kind: ForeignErrorKind,
    /// Short human-readable message
    pub message: String,
    /// Low-level diagnostic text
    pub detail: Option<String>,
}

impl ForeignError {
    /// Create a foreign error of the given kind
    pub fn new(kind: ForeignErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    /// Attach a low-level diagnostic
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ForeignErrorKind::Type, message)
    }

    /// Create a value error
    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ForeignErrorKind::Value, message)
    }

    /// Create an index error
    pub fn index_error(message: impl Into<String>) -> Self {
        Self::new(ForeignErrorKind::Index, message)
    }

    /// Create a not implemented error
    pub fn not_implemented(message: impl Into<String>) -> Self {
        Self::new(ForeignErrorKind::NotImplemented, message)
    }

    /// Readable one-line summary without the low-level detail
    pub fn summary(&self) -> String {
        let first_line = self.message.lines().next().unwrap_or("");
        if first_line.is_empty() {
            self.kind.to_string()
        } else {
            format!("{}: {}", self.kind, first_line)
        }
    }
}

impl fmt::Display for ForeignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl std::error::Error for ForeignError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unsupported_type_message() {
        let err = AdapterError::unsupported_type("extent", Some(DType::Int32), Some(4));
        assert!(err.is_type_error());
        let msg = err.to_string();
        assert!(msg.contains("extent"));
        assert!(msg.contains("int32"));
        assert!(msg.contains("4 dimension"));
    }

    #[test]
    fn test_unsupported_type_unknown_key() {
        let err = AdapterError::unsupported_type("point", None, None);
        let msg = err.to_string();
        assert!(msg.contains("<unknown dtype>"));
        assert!(msg.contains("unknown dimensionality"));
    }

    #[test]
    fn test_foreign_call_hides_detail() {
        let foreign = ForeignError::type_error("expected an integer")
            .with_detail("in method 'Extent2I_setX', argument 2 of type 'int'");
        let err = AdapterError::foreign_call("Extent2I", "x", "1.5", foreign);

        assert!(err.is_foreign());
        let msg = err.to_string();
        assert!(msg.contains("Extent2I.x(1.5)"));
        assert!(msg.contains("expected an integer"));
        assert!(!msg.contains("Extent2I_setX"));

        let source = err.source().expect("foreign source");
        assert!(source.to_string().contains("type error"));
    }

    #[test]
    fn test_property_access_names_attribute_and_role() {
        let foreign = ForeignError::type_error("argument 1 of setX must be int");
        let err = AdapterError::property_access(true, "extent", "Extent2I", "x", foreign);

        assert!(err.is_foreign());
        assert_eq!(
            err.to_string(),
            "write of attribute 'x' on Extent2I (role 'extent') failed: type error: argument 1 of setX must be int"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_attribute_errors() {
        assert!(AdapterError::attribute_not_found("w", "Point2I").is_attribute_error());
        assert!(AdapterError::immutable_attribute("area", "Box2I").is_attribute_error());
        assert!(!AdapterError::config("bad").is_attribute_error());
    }

    #[test]
    fn test_foreign_summary_first_line() {
        let err = ForeignError::value_error("negative size\nstack: ...");
        assert_eq!(err.summary(), "invalid value: negative size");
        let empty = ForeignError::new(ForeignErrorKind::Runtime, "");
        assert_eq!(empty.summary(), "runtime error");
    }
}
