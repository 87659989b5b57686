//! Argument checking shared by every native type.
//!
//! Errors mimic a generated wrapper layer: a short first line plus a
//! low-level detail listing the mangled prototypes that were tried.

use lsstx_bridge::{ForeignError, ForeignResult, NativeHandle, Value};

/// Overload mismatch for `function`, carrying the candidate prototypes
pub fn overload_error(function: &str, prototypes: &[&str]) -> ForeignError {
    let mut detail = format!(
        "Wrong number or type of arguments for overloaded function '{}'.\n  Possible C/C++ prototypes are:\n",
        function
    );
    for proto in prototypes {
        detail.push_str("    ");
        detail.push_str(proto);
        detail.push('\n');
    }
    ForeignError::type_error(format!("no overload of {} accepts these arguments", function)).with_detail(detail)
}

/// Wrong argument type at position `index` (0-based)
pub fn argument_error(method: &str, index: usize, expected: &str) -> ForeignError {
    ForeignError::type_error(format!(
        "argument {} of {} must be {}",
        index + 1,
        method,
        expected
    ))
    .with_detail(format!(
        "in method '{}', argument {} of type '{}'",
        method,
        index + 1,
        expected
    ))
}

/// Method not present on the type
pub fn no_method(type_name: &str, method: &str) -> ForeignError {
    ForeignError::type_error(format!("'{}' object has no attribute '{}'", type_name, method))
}

/// Check the argument count
pub fn expect_arity(method: &str, args: &[Value], expected: usize) -> ForeignResult<()> {
    if args.len() != expected {
        return Err(ForeignError::type_error(format!(
            "{}() takes exactly {} argument(s) ({} given)",
            method,
            expected,
            args.len()
        )));
    }
    Ok(())
}

/// Numeric argument as f64
pub fn number(method: &str, args: &[Value], index: usize) -> ForeignResult<f64> {
    match args.get(index) {
        Some(Value::Int(n)) => Ok(*n as f64),
        Some(Value::Float(f)) => Ok(*f),
        _ => Err(argument_error(method, index, "double")),
    }
}

/// Integer argument; integral floats are accepted
pub fn integer(method: &str, args: &[Value], index: usize) -> ForeignResult<i64> {
    match args.get(index) {
        Some(Value::Int(n)) => Ok(*n),
        Some(Value::Float(f)) if f.fract() == 0.0 => Ok(*f as i64),
        _ => Err(argument_error(method, index, "int")),
    }
}

/// Non-negative integer argument
pub fn index(method: &str, args: &[Value], index: usize) -> ForeignResult<usize> {
    let n = integer(method, args, index)?;
    usize::try_from(n).map_err(|_| argument_error(method, index, "size_t"))
}

/// Boolean argument
pub fn boolean(method: &str, args: &[Value], index: usize) -> ForeignResult<bool> {
    match args.get(index) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Int(n)) => Ok(*n != 0),
        _ => Err(argument_error(method, index, "bool")),
    }
}

/// Raw handle argument
pub fn handle<'a>(method: &str, args: &'a [Value], index: usize) -> ForeignResult<&'a NativeHandle> {
    match args.get(index) {
        Some(Value::Handle(h)) => Ok(h),
        _ => Err(argument_error(method, index, "object")),
    }
}

/// Handle argument downcast to a concrete native type
pub fn native<'a, T: 'static>(
    method: &str,
    args: &'a [Value],
    index: usize,
    expected: &str,
) -> ForeignResult<&'a T> {
    handle(method, args, index)?
        .downcast_ref::<T>()
        .ok_or_else(|| argument_error(method, index, expected))
}

/// Scalar in the representation of an integer or floating type
pub fn scalar(is_float: bool, value: f64) -> Value {
    if is_float {
        Value::Float(value)
    } else {
        Value::Int(value as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsstx_bridge::ForeignErrorKind;

    #[test]
    fn test_overload_error_hides_prototypes() {
        let err = overload_error("new_Point2I", &["lsst::geom::Point< int,2 >::Point()"]);
        assert_eq!(err.kind, ForeignErrorKind::Type);
        assert!(!err.summary().contains("lsst::geom"));
        assert!(err.detail.unwrap().contains("lsst::geom::Point< int,2 >"));
    }

    #[test]
    fn test_numeric_arguments() {
        let args = vec![Value::Int(3), Value::Float(2.0), Value::Float(2.5), Value::from("x")];
        assert_eq!(number("f", &args, 0).unwrap(), 3.0);
        assert_eq!(integer("f", &args, 1).unwrap(), 2);
        assert!(integer("f", &args, 2).is_err());
        assert!(number("f", &args, 3).is_err());
        assert!(number("f", &args, 9).is_err());
        assert!(index("f", &[Value::Int(-1)], 0).is_err());
    }

    #[test]
    fn test_arity() {
        assert!(expect_arity("clone", &[], 0).is_ok());
        let err = expect_arity("clone", &[Value::Int(1)], 0).unwrap_err();
        assert!(err.message.contains("(1 given)"));
    }
}
