//! Property Specs and the Property Binder
//!
//! The foreign library only exposes paired getter/setter methods
//! (`getX`/`setX`). A [`PropertySpec`] declares how one such pair appears as
//! an attribute on an adapter class, and the [`PropertyBinder`] installs a list
//! of specs on a class once, when the class is defined. Instances share the
//! finished [`AdapterClass`] and never rebuild the table.
//!
//! Specs are `const`, so families of classes compose slices instead of
//! repeating bindings:
//!
//! ```
//! use lsstx_bridge::PropertySpec;
//!
//! const XY: &[PropertySpec] = &[
//!     PropertySpec::read_write("x", "getX", "setX"),
//!     PropertySpec::read_write("y", "getY", "setY"),
//! ];
//! const Z: &[PropertySpec] = &[PropertySpec::read_write("z", "getZ", "setZ")];
//! ```

use std::rc::Rc;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::class::{AdapterClass, BufferAccess, Equality, ReprStyle};
use crate::convert::Conversion;
use crate::error::{AdapterError, AdapterResult};

/// Declarative binding of an attribute to a foreign getter/setter pair.
#[derive(Debug, Clone, Copy)]
pub struct PropertySpec {
    /// Attribute name on the adapter
    pub name: &'static str,
    /// Foreign getter method
    pub getter: &'static str,
    /// Foreign setter method; `None` means read-only
    pub setter: Option<&'static str>,
    /// Applied to the getter's result
    pub on_read: Option<Conversion>,
    /// Applied to the value before calling the setter
    pub on_write: Option<Conversion>,
}

impl PropertySpec {
    /// Read-only attribute
    pub const fn read_only(name: &'static str, getter: &'static str) -> Self {
        Self {
            name,
            getter,
            setter: None,
            on_read: None,
            on_write: None,
        }
    }

    /// Read/write attribute
    pub const fn read_write(name: &'static str, getter: &'static str, setter: &'static str) -> Self {
        Self {
            name,
            getter,
            setter: Some(setter),
            on_read: None,
            on_write: None,
        }
    }

    /// Attach a read conversion
    pub const fn with_read(mut self, conversion: Conversion) -> Self {
        self.on_read = Some(conversion);
        self
    }

    /// Attach a write conversion
    pub const fn with_write(mut self, conversion: Conversion) -> Self {
        self.on_write = Some(conversion);
        self
    }

    /// Whether writes are allowed
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

/// Builds an [`AdapterClass`] from property specs and class-level policies.
///
/// Binding errors (the same name bound twice) are collected and reported by
/// [`PropertyBinder::build`].
pub struct PropertyBinder {
    name: SmolStr,
    role: SmolStr,
    properties: IndexMap<SmolStr, PropertySpec>,
    repr: ReprStyle,
    equality: Equality,
    buffer: Option<BufferAccess>,
    sequence: bool,
    error: Option<AdapterError>,
}

impl PropertyBinder {
    /// Start defining a class for a role
    pub fn new(name: impl Into<SmolStr>, role: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            properties: IndexMap::new(),
            repr: ReprStyle::Opaque,
            equality: Equality::Identity,
            buffer: None,
            sequence: false,
            error: None,
        }
    }

    /// Install a list of specs
    pub fn bind(mut self, specs: &[PropertySpec]) -> Self {
        for spec in specs {
            if self.error.is_some() {
                break;
            }
            if self.properties.contains_key(spec.name) {
                self.error = Some(AdapterError::DuplicateProperty {
                    class: self.name.to_string(),
                    name: spec.name.to_string(),
                });
                break;
            }
            self.properties.insert(SmolStr::new(spec.name), *spec);
        }
        self
    }

    /// Start from every binding and policy of an existing class
    pub fn inherit(mut self, base: &AdapterClass) -> Self {
        for spec in base.properties() {
            self.properties.insert(SmolStr::new(spec.name), *spec);
        }
        self.repr = base.repr_style().clone();
        self.equality = base.equality();
        self.buffer = base.buffer().cloned();
        self.sequence = base.is_sequence();
        self
    }

    /// Set the representation style
    pub fn repr(mut self, style: ReprStyle) -> Self {
        self.repr = style;
        self
    }

    /// Set the equality policy
    pub fn equality(mut self, equality: Equality) -> Self {
        self.equality = equality;
        self
    }

    /// Declare buffer indexing
    pub fn buffer(mut self, access: BufferAccess) -> Self {
        self.buffer = Some(access);
        self
    }

    /// Declare element indexing via the foreign `getitem`/`setitem`/`len`
    pub fn sequence(mut self) -> Self {
        self.sequence = true;
        self
    }

    /// Finish the class
    pub fn build(self) -> AdapterResult<Rc<AdapterClass>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Rc::new(AdapterClass::new(
            self.name,
            self.role,
            self.properties,
            self.repr,
            self.equality,
            self.buffer,
            self.sequence,
        )))
    }
}
