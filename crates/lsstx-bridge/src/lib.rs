//! # LSSTX Bridge
//!
//! Adapter and dispatch layer over handles owned by a foreign numerical
//! library.
//!
//! The foreign library exposes families of concrete classes, one per scalar
//! type and dimensionality (`Extent2I`, `Extent3D`, `ExposureF`, ...), each
//! with `getX`/`setX` style accessors. This crate puts a uniform surface over
//! them:
//!
//! - one construction entry point per role, resolving the concrete foreign
//!   type from the arguments ([`Dispatcher`])
//! - attribute-style access declared once per class ([`PropertySpec`],
//!   [`PropertyBinder`])
//! - transparent unwrapping of adapters before foreign calls
//!   ([`ExtractHandle`], [`extract`])
//! - readable representations built from bound properties ([`ReprStyle`])
//!
//! ## Example
//!
//! ```text
//! let extent = dispatcher.construct("extent", Args::new().arg(3).arg(5))?;
//! assert_eq!(extent.get("x")?, Value::Int(3));      // Extent2I
//! let p = dispatcher.construct("point", Args::new().arg(1.5).arg(2).arg(0))?;
//! assert_eq!(p.class_name(), "Point3D");
//! ```
//!
//! ## Module Structure
//!
//! - [`handle`]: foreign object and library traits
//! - [`value`]: dynamic values crossing the boundary
//! - [`array`]: pixel buffers and regions
//! - [`property`] and [`class`]: attribute binding and adapter classes
//! - [`registry`]: type descriptors and per-role tables
//! - [`dispatch`]: construction dispatch and the shared runtime
//! - [`wrapper`]: the adapter instance type
//! - [`extract`]: handle extraction
//! - [`config`]: runtime configuration
//! - [`error`]: error types

pub mod array;
pub mod class;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod dtype;
pub mod error;
pub mod extract;
pub mod handle;
pub mod property;
pub mod registry;
pub mod repr;
pub mod value;
pub mod wrapper;

// Re-export main types for convenience
pub use array::{PixelArray, Region};
pub use class::{AdapterClass, BufferAccess, Equality, ReprStyle};
pub use config::BridgeConfig;
pub use convert::{to_bool, to_float, to_int, Conversion, FromValue};
pub use dispatch::{Args, Dispatcher, Resolution, Runtime};
pub use dtype::DType;
pub use error::{AdapterError, AdapterResult, ForeignError, ForeignErrorKind, ForeignResult};
pub use extract::{extract, extract_all, extract_keywords, needs_extraction, ExtractHandle};
pub use handle::{ForeignLibrary, Keywords, NativeHandle, NativeObject};
pub use property::{PropertyBinder, PropertySpec};
pub use registry::{
    DTypeRule, DimsRule, DispatchPolicy, RegistryBuilder, RoleBuilder, RoleEntry, TypeDescriptor, TypeKey,
    TypeRegistry, TypeTag,
};
pub use repr::{summarize_args, truncate};
pub use value::Value;
pub use wrapper::WrappedObject;
