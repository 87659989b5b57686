//! Constructor and free-function entry points.

use indexmap::IndexMap;
use lsstx_bridge::{DType, ForeignError, ForeignLibrary, ForeignResult, Keywords, NativeHandle, Value};
use smol_str::SmolStr;

use crate::bbox::Box2;
use crate::coord::{CoordKind, Coordinate, CoordinateExpr};
use crate::exposure::{make_exposure, Exposure, ExposureInfo};
use crate::image::{Image, MaskedImage};

/// Signature of a free function
pub type NativeFn = fn(&[Value]) -> ForeignResult<Value>;

/// Every concrete class the library can construct
pub const CONSTRUCTORS: &[&str] = &[
    "Extent2I", "Extent2D", "Extent3I", "Extent3D", "Point2I", "Point2D", "Point3I", "Point3D", "CoordinateExpr2",
    "CoordinateExpr3", "Box2I", "Box2D", "ImageF", "ImageD", "ImageI", "ImageU", "MaskedImageF", "MaskedImageD",
    "MaskedImageI", "ExposureF", "ExposureD", "ExposureI", "ExposureInfo",
];

/// The in-process foreign library.
#[derive(Clone)]
pub struct NativeLibrary {
    functions: IndexMap<SmolStr, NativeFn>,
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for NativeLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeLibrary {
    /// Library with all free functions registered
    pub fn new() -> Self {
        let mut library = Self {
            functions: IndexMap::new(),
        };
        library.register("makeExposure", make_exposure);
        library
    }

    /// Register a free function
    pub fn register(&mut self, name: &str, func: NativeFn) {
        self.functions.insert(SmolStr::new(name), func);
    }

    /// Registered free function names
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|k| k.as_str())
    }
}

/// Split `Extent2I` into its family, dimensionality and dtype suffix
fn coordinate_parts(class: &str) -> Option<(CoordKind, usize, bool)> {
    let (kind, rest) = if let Some(rest) = class.strip_prefix("Extent") {
        (CoordKind::Extent, rest)
    } else {
        (CoordKind::Point, class.strip_prefix("Point")?)
    };
    let dims = match &rest[..rest.len().min(1)] {
        "2" => 2,
        "3" => 3,
        _ => return None,
    };
    match &rest[1..] {
        "I" => Some((kind, dims, false)),
        "D" => Some((kind, dims, true)),
        _ => None,
    }
}

fn pixel_dtype(suffix: &str) -> Option<DType> {
    match suffix {
        "F" => Some(DType::Float32),
        "D" => Some(DType::Float64),
        "I" => Some(DType::Int32),
        "U" => Some(DType::UInt16),
        _ => None,
    }
}

impl ForeignLibrary for NativeLibrary {
    fn construct(&self, class: &str, args: &[Value], keywords: &Keywords) -> ForeignResult<NativeHandle> {
        if !self.has_constructor(class) {
            return Err(ForeignError::type_error(format!("no constructor named {}", class)));
        }
        if !class.starts_with("Exposure") {
            if let Some(key) = keywords.keys().next() {
                return Err(ForeignError::type_error(format!(
                    "{}() got an unexpected keyword argument '{}'",
                    class, key
                )));
            }
        }

        if let Some((kind, dims, is_float)) = coordinate_parts(class) {
            return Ok(NativeHandle::new(Coordinate::construct(kind, dims, is_float, args)?));
        }
        let handle = match class {
            "CoordinateExpr2" => NativeHandle::new(CoordinateExpr::construct(2, args)?),
            "CoordinateExpr3" => NativeHandle::new(CoordinateExpr::construct(3, args)?),
            "Box2I" => NativeHandle::new(Box2::construct(false, args)?),
            "Box2D" => NativeHandle::new(Box2::construct(true, args)?),
            "ExposureInfo" => NativeHandle::new(ExposureInfo::construct(args, keywords)?),
            _ => {
                let (family, suffix) = class.split_at(class.len() - 1);
                let dtype = pixel_dtype(suffix)
                    .ok_or_else(|| ForeignError::type_error(format!("no constructor named {}", class)))?;
                match family {
                    "Image" => NativeHandle::new(Image::construct(dtype, args)?),
                    "MaskedImage" => NativeHandle::new(MaskedImage::construct(dtype, args)?),
                    _ => NativeHandle::new(Exposure::construct(dtype, args, keywords)?),
                }
            }
        };
        Ok(handle)
    }

    fn call_function(&self, name: &str, args: &[Value]) -> ForeignResult<Value> {
        let func = self
            .functions
            .get(name)
            .ok_or_else(|| ForeignError::type_error(format!("module has no function {}", name)))?;
        func(args)
    }

    fn has_constructor(&self, class: &str) -> bool {
        CONSTRUCTORS.contains(&class)
    }
}
