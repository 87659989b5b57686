//! Handle Extraction
//!
//! Before anything is passed into the foreign library, adapters are stripped
//! back to raw [`NativeHandle`]s so the foreign code never sees, and never
//! pays for, the adapter layer.
//!
//! Participation is by capability, not inheritance: any type implementing
//! [`ExtractHandle`] can be put in a [`Value::Adapter`] and will be unwrapped
//! alongside the crate's own [`WrappedObject`](crate::WrappedObject)s.

use std::fmt;

use indexmap::IndexMap;

use crate::handle::{Keywords, NativeHandle};
use crate::value::Value;

/// Capability of handing out the raw foreign handle.
pub trait ExtractHandle: fmt::Debug {
    /// The held handle, unchanged
    fn extract_handle(&self) -> NativeHandle;
}

impl ExtractHandle for NativeHandle {
    fn extract_handle(&self) -> NativeHandle {
        self.clone()
    }
}

/// Reduce a value to something the foreign library accepts.
///
/// Adapters become handles, lists and maps are reduced element-wise, and
/// everything else passes through. Extracting an already reduced value is a
/// no-op.
pub fn extract(value: &Value) -> Value {
    match value {
        Value::Object(obj) => Value::Handle(obj.extract_handle()),
        Value::Adapter(adapter) => Value::Handle(adapter.extract_handle()),
        Value::List(items) => Value::List(items.iter().map(extract).collect()),
        Value::Map(map) => Value::Map(map.iter().map(|(k, v)| (k.clone(), extract(v))).collect()),
        other => other.clone(),
    }
}

/// Reduce a positional argument list
pub fn extract_all(args: &[Value]) -> Vec<Value> {
    args.iter().map(extract).collect()
}

/// Reduce keyword arguments
pub fn extract_keywords(keywords: &Keywords) -> Keywords {
    keywords.iter().map(|(k, v)| (k.clone(), extract(v))).collect::<IndexMap<_, _>>()
}

/// Whether a value still contains adapters
pub fn needs_extraction(value: &Value) -> bool {
    match value {
        Value::Object(_) | Value::Adapter(_) => true,
        Value::List(items) => items.iter().any(needs_extraction),
        Value::Map(map) => map.values().any(needs_extraction),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ForeignError, ForeignResult};
    use crate::handle::NativeObject;
    use smol_str::SmolStr;
    use std::any::Any;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Opaque;

    impl NativeObject for Opaque {
        fn type_name(&self) -> &str {
            "Opaque"
        }

        fn has_method(&self, _name: &str) -> bool {
            false
        }

        fn call(&self, _method: &str, _args: &[Value]) -> ForeignResult<Value> {
            Err(ForeignError::type_error("opaque"))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// An adapter that does not derive from the crate's wrapper
    #[derive(Debug)]
    struct ThirdParty {
        handle: NativeHandle,
    }

    impl ExtractHandle for ThirdParty {
        fn extract_handle(&self) -> NativeHandle {
            self.handle.clone()
        }
    }

    #[test]
    fn test_third_party_adapter_unwrapped() {
        let handle = NativeHandle::new(Opaque);
        let value = Value::Adapter(Rc::new(ThirdParty { handle: handle.clone() }));

        assert!(needs_extraction(&value));
        let raw = extract(&value);
        assert!(!needs_extraction(&raw));
        assert_eq!(raw.as_handle(), Some(&handle));
    }

    #[test]
    fn test_nested_containers() {
        let handle = NativeHandle::new(Opaque);
        let adapter = Value::Adapter(Rc::new(ThirdParty { handle: handle.clone() }));
        let mut map = IndexMap::new();
        map.insert(SmolStr::new("inner"), Value::List(vec![adapter.clone(), Value::Int(3)]));
        let value = Value::List(vec![Value::Map(map), adapter]);

        let raw = extract(&value);
        let items = raw.as_list().unwrap();
        match &items[0] {
            Value::Map(m) => {
                let inner = m["inner"].as_list().unwrap();
                assert_eq!(inner[0].as_handle(), Some(&handle));
                assert_eq!(inner[1], Value::Int(3));
            }
            other => panic!("expected map, got {:?}", other),
        }
        assert_eq!(items[1].as_handle(), Some(&handle));
    }

    #[test]
    fn test_idempotent() {
        let handle = NativeHandle::new(Opaque);
        let args = vec![Value::Handle(handle), Value::Float(1.5), Value::from("x")];
        let once = extract_all(&args);
        let twice = extract_all(&once);
        assert_eq!(once, args);
        assert_eq!(twice, once);
    }
}
