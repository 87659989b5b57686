//! # LSSTX Native
//!
//! In-process reference implementation of the foreign geometry and image
//! library wrapped by `lsstx-bridge`.
//!
//! The library deliberately looks like a generated binding: one concrete
//! class per scalar type and dimensionality, `getX`/`setX` accessor pairs,
//! positional overloaded constructors, and error messages whose useful part
//! is buried under low-level prototype listings.
//!
//! ## Classes
//!
//! | Family | Classes |
//! |--------|---------|
//! | Extent | `Extent2I`, `Extent2D`, `Extent3I`, `Extent3D` |
//! | Point | `Point2I`, `Point2D`, `Point3I`, `Point3D` |
//! | CoordinateExpr | `CoordinateExpr2`, `CoordinateExpr3` |
//! | Box | `Box2I`, `Box2D` |
//! | Image | `ImageF`, `ImageD`, `ImageI`, `ImageU` |
//! | MaskedImage | `MaskedImageF`, `MaskedImageD`, `MaskedImageI` |
//! | Exposure | `ExposureF`, `ExposureD`, `ExposureI`, `ExposureInfo` |
//!
//! Free functions: `makeExposure`.

pub mod args;
pub mod bbox;
pub mod coord;
pub mod exposure;
pub mod image;
pub mod library;

pub use bbox::Box2;
pub use coord::{CoordKind, Coordinate, CoordinateExpr};
pub use exposure::{make_exposure, Exposure, ExposureInfo};
pub use image::{Image, MaskedImage};
pub use library::{NativeFn, NativeLibrary, CONSTRUCTORS};
