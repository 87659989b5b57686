//! # LSSTX
//!
//! Attribute-style geometry and image objects over the native library.
//!
//! Each role has a single construction function on [`Bridge`]; the concrete
//! foreign class is resolved from the arguments:
//!
//! | Role | Policy | Resolved from | Classes |
//! |------|--------|---------------|---------|
//! | extent, point | typed | int/float arguments, argument count | `Extent2I` ... `Point3D` |
//! | coordinate_expr | typed | argument count | `CoordinateExpr2`, `CoordinateExpr3` |
//! | box | typed | corner dtype | `Box2I`, `Box2D` |
//! | image | generic | dtype keyword or pixel array | `Image` over `Image{F,D,I,U}` |
//! | masked_image | generic | dtype keyword or seed image | `MaskedImage` over `MaskedImage{F,D,I}` |
//! | exposure | generic | dtype keyword or seed masked image | `Exposure` over `Exposure{F,D,I}` |
//! | exposure_info | typed | single registration | `ExposureInfo` |
//!
//! ## Module Structure
//!
//! - [`geom`]: geometry property tables and roles
//! - [`image`]: image property tables and roles
//! - [`bridge`]: the [`Bridge`] entry point and the full registry

pub mod bridge;
pub mod geom;
pub mod image;

pub use bridge::{registry, Bridge};
pub use image::ImageOrigin;

// Re-export the adapter surface
pub use lsstx_bridge::{
    AdapterError, AdapterResult, Args, BridgeConfig, DType, PixelArray, Region, TypeKey, Value, WrappedObject,
};
