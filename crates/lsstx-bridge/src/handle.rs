//! Native Handles and the Foreign Library Seam
//!
//! A [`NativeHandle`] is an opaque reference to an object produced and owned
//! by the foreign library. The adapter never inspects its internals: it only
//! asks for the foreign type name, checks whether a method exists, and
//! forwards calls.
//!
//! ## Ownership
//!
//! Handles are reference counted. Cloning a handle shares the same foreign
//! object, it never copies it; dropping the last adapter releases the
//! reference without assuming exclusive ownership of the underlying resource.
//! Equality is identity.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::ForeignResult;
use crate::value::Value;

/// Keyword arguments forwarded to foreign constructors
pub type Keywords = IndexMap<SmolStr, Value>;

/// An object living inside the foreign library.
///
/// Implementations are supplied by the foreign side; mutation happens behind
/// `&self` because the foreign object owns its own state.
pub trait NativeObject: fmt::Debug {
    /// Concrete foreign type name (e.g. `Extent2I`, `ExposureF`)
    fn type_name(&self) -> &str;

    /// Whether the foreign type exposes a method with this name
    fn has_method(&self, name: &str) -> bool;

    /// Invoke a foreign method
    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value>;

    /// The foreign library's own default representation
    fn describe(&self) -> String {
        format!("<{} native object>", self.type_name())
    }

    /// Access for foreign-side downcasting
    fn as_any(&self) -> &dyn Any;
}

/// The foreign library's construction and free-function entry points.
pub trait ForeignLibrary {
    /// Invoke the concrete constructor named `class`
    fn construct(&self, class: &str, args: &[Value], keywords: &Keywords) -> ForeignResult<NativeHandle>;

    /// Invoke a free function (e.g. `makeExposure`)
    fn call_function(&self, name: &str, args: &[Value]) -> ForeignResult<Value>;

    /// Whether a constructor with this name exists
    fn has_constructor(&self, class: &str) -> bool;
}

/// Opaque, shared reference to a foreign object.
#[derive(Clone)]
pub struct NativeHandle {
    object: Rc<dyn NativeObject>,
}

impl NativeHandle {
    /// Take a reference to a freshly produced foreign object
    pub fn new<T: NativeObject + 'static>(object: T) -> Self {
        Self {
            object: Rc::new(object),
        }
    }

    /// Foreign type name
    pub fn type_name(&self) -> &str {
        self.object.type_name()
    }

    /// Whether the foreign object has the named method
    pub fn has_method(&self, name: &str) -> bool {
        self.object.has_method(name)
    }

    /// Forward a call to the foreign object
    pub fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        self.object.call(method, args)
    }

    /// Foreign default representation
    pub fn describe(&self) -> String {
        self.object.describe()
    }

    /// Borrow the foreign object
    pub fn object(&self) -> &dyn NativeObject {
        self.object.as_ref()
    }

    /// Downcast to a concrete foreign type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.object.as_any().downcast_ref::<T>()
    }

    /// Identity comparison
    pub fn same_object(&self, other: &NativeHandle) -> bool {
        Rc::ptr_eq(&self.object, &other.object)
    }

    /// Number of live references to the foreign object
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.object)
    }
}

impl PartialEq for NativeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_object(other)
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({})", self.type_name())
    }
}
