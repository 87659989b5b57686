//! Adapter Classes
//!
//! An [`AdapterClass`] is the shared, immutable description of one adapter
//! type: its name, the role it belongs to, the installed property table, and
//! the class-level policies (representation, equality, indexing). Classes are
//! produced by [`PropertyBinder`](crate::PropertyBinder) and shared by every
//! instance through an `Rc`.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::error::AdapterResult;
use crate::property::PropertySpec;
use crate::wrapper::WrappedObject;

/// How an instance renders itself.
///
/// Every style reads bound properties only; none forwards the foreign
/// library's default representation.
#[derive(Clone)]
pub enum ReprStyle {
    /// `Name(v0, v1, ...)` from the listed properties
    Coordinates(&'static [&'static str]),
    /// `Name(p0=v0, p1=v1, ...)` from the listed properties
    Fields(&'static [&'static str]),
    /// `Name(dtype, WxH)` from a width and a height property
    Summary {
        /// Width property
        width: &'static str,
        /// Height property
        height: &'static str,
    },
    /// Caller-supplied formatter
    Custom(fn(&WrappedObject) -> AdapterResult<String>),
    /// `Name(dtype)`
    Opaque,
}

impl fmt::Debug for ReprStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReprStyle::Coordinates(props) => write!(f, "Coordinates({:?})", props),
            ReprStyle::Fields(props) => write!(f, "Fields({:?})", props),
            ReprStyle::Summary { width, height } => write!(f, "Summary({}, {})", width, height),
            ReprStyle::Custom(_) => write!(f, "Custom"),
            ReprStyle::Opaque => write!(f, "Opaque"),
        }
    }
}

/// How two instances compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equality {
    /// Same foreign object
    Identity,
    /// Delegate to the named foreign method
    Foreign(&'static str),
}

/// Buffer indexing for image-like classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferAccess {
    /// One pixel plane on the object itself
    Single {
        /// Foreign method returning the whole array
        read: &'static str,
        /// Foreign in-place region assignment `(row0, col0, block)`
        write: &'static str,
    },
    /// Several planes, each a sub-object reached through a getter
    Planes {
        /// Getters returning the plane objects, in index order
        planes: &'static [&'static str],
        /// Array read method on each plane
        read: &'static str,
        /// Region assignment method on each plane
        write: &'static str,
    },
}

/// Shared description of an adapter type.
#[derive(Debug)]
pub struct AdapterClass {
    name: SmolStr,
    role: SmolStr,
    properties: IndexMap<SmolStr, PropertySpec>,
    repr: ReprStyle,
    equality: Equality,
    buffer: Option<BufferAccess>,
    sequence: bool,
}

impl AdapterClass {
    pub(crate) fn new(
        name: SmolStr,
        role: SmolStr,
        properties: IndexMap<SmolStr, PropertySpec>,
        repr: ReprStyle,
        equality: Equality,
        buffer: Option<BufferAccess>,
        sequence: bool,
    ) -> Self {
        Self {
            name,
            role,
            properties,
            repr,
            equality,
            buffer,
            sequence,
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role this class belongs to
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Look up an installed property
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    /// Installed properties in declaration order
    pub fn properties(&self) -> impl Iterator<Item = &PropertySpec> {
        self.properties.values()
    }

    /// Installed property names in declaration order
    pub fn property_names(&self) -> Vec<&str> {
        self.properties.keys().map(|k| k.as_str()).collect()
    }

    pub fn repr_style(&self) -> &ReprStyle {
        &self.repr
    }

    pub fn equality(&self) -> Equality {
        self.equality
    }

    pub fn buffer(&self) -> Option<&BufferAccess> {
        self.buffer.as_ref()
    }

    pub fn is_sequence(&self) -> bool {
        self.sequence
    }
}
