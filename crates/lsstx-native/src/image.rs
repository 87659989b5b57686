//! Pixel images and masked images.

use std::any::Any;
use std::cell::{Cell, RefCell};

use lsstx_bridge::{DType, ForeignError, ForeignResult, NativeHandle, NativeObject, PixelArray, Value};

use crate::args::{argument_error, expect_arity, index, integer, native, no_method, number, overload_error, scalar};
use crate::bbox::Box2;
use crate::coord::{CoordKind, Coordinate};

const IMAGE_METHODS: &[&str] = &[
    "getWidth", "getHeight", "getX0", "getY0", "getXY0", "setXY0", "getBBox", "getDimensions", "getArray",
    "assignArray", "set", "get", "clone",
];

const IMAGE_PROTOTYPES: &[&str] = &[
    "lsst::afw::image::Image< PixelT >::Image(unsigned int,unsigned int,PixelT)",
    "lsst::afw::image::Image< PixelT >::Image(lsst::geom::Extent2I const &,PixelT)",
    "lsst::afw::image::Image< PixelT >::Image(lsst::geom::Box2I const &,PixelT)",
    "lsst::afw::image::Image< PixelT >::Image(ndarray::Array< PixelT,2,1 > const &)",
];

/// Width and height requested by an image-family constructor, plus origin
pub(crate) struct Geometry {
    pub width: usize,
    pub height: usize,
    pub xy0: (i64, i64),
}

/// Parse the `(w, h)`, `(Extent2I)` and `(Box2I)` overloads shared by every
/// image-family constructor. Returns `None` when the arguments match none of
/// them.
pub(crate) fn parse_geometry(ctor: &str, args: &[Value]) -> ForeignResult<Option<Geometry>> {
    match args {
        [] => Ok(Some(Geometry {
            width: 0,
            height: 0,
            xy0: (0, 0),
        })),
        [Value::Int(_), Value::Int(_), ..] => Ok(Some(Geometry {
            width: index(ctor, args, 0)?,
            height: index(ctor, args, 1)?,
            xy0: (0, 0),
        })),
        [Value::Handle(h), ..] => {
            if let Some(extent) = h.downcast_ref::<Coordinate>() {
                if extent.kind() != CoordKind::Extent || extent.is_float() || extent.dims() != 2 {
                    return Err(argument_error(ctor, 0, "lsst::geom::Extent2I const &"));
                }
                let v = extent.values();
                return Ok(Some(Geometry {
                    width: v[0].max(0.0) as usize,
                    height: v[1].max(0.0) as usize,
                    xy0: (0, 0),
                }));
            }
            if let Some(bbox) = h.downcast_ref::<Box2>() {
                if bbox.is_float() {
                    return Err(argument_error(ctor, 0, "lsst::geom::Box2I const &"));
                }
                let [w, hgt] = bbox.dimensions();
                let min = bbox.min();
                return Ok(Some(Geometry {
                    width: w as usize,
                    height: hgt as usize,
                    xy0: (min[0] as i64, min[1] as i64),
                }));
            }
            Ok(None)
        }
        _ => Ok(None),
    }
}

fn point_handle(xy0: (i64, i64)) -> Value {
    Value::Handle(NativeHandle::new(Coordinate::new(
        CoordKind::Point,
        false,
        vec![xy0.0 as f64, xy0.1 as f64],
    )))
}

fn extent_handle(width: usize, height: usize) -> Value {
    Value::Handle(NativeHandle::new(Coordinate::new(
        CoordKind::Extent,
        false,
        vec![width as f64, height as f64],
    )))
}

fn bbox_handle(xy0: (i64, i64), width: usize, height: usize) -> Value {
    Value::Handle(NativeHandle::new(Box2::from_origin(
        xy0.0 as f64,
        xy0.1 as f64,
        width as f64,
        height as f64,
    )))
}

/// `PARENT` (0) places the box at xy0; `LOCAL` (1) places it at the origin
fn bbox_origin(method: &str, args: &[Value], xy0: (i64, i64)) -> ForeignResult<(i64, i64)> {
    match args {
        [] => Ok(xy0),
        [Value::Int(0)] => Ok(xy0),
        [Value::Int(1)] => Ok((0, 0)),
        [Value::Str(s)] if s == "PARENT" => Ok(xy0),
        [Value::Str(s)] if s == "LOCAL" => Ok((0, 0)),
        [_] => Err(argument_error(method, 0, "lsst::afw::image::ImageOrigin")),
        _ => Err(ForeignError::type_error(format!(
            "{}() takes at most 1 argument ({} given)",
            method,
            args.len()
        ))),
    }
}

/// `setXY0` accepts a `Point2I` or two integers
fn parse_xy0(method: &str, args: &[Value]) -> ForeignResult<(i64, i64)> {
    match args {
        [Value::Handle(_)] => {
            let p = native::<Coordinate>(method, args, 0, "lsst::geom::Point2I const &")?;
            if p.kind() != CoordKind::Point || p.is_float() || p.dims() != 2 {
                return Err(argument_error(method, 0, "lsst::geom::Point2I const &"));
            }
            let v = p.values();
            Ok((v[0] as i64, v[1] as i64))
        }
        [_, _] => Ok((integer(method, args, 0)?, integer(method, args, 1)?)),
        _ => Err(argument_error(method, 0, "lsst::geom::Point2I const &")),
    }
}

// ============================================================================
// Image
// ============================================================================

/// Single-plane pixel image (`ImageF`, `ImageD`, `ImageI`, `ImageU`).
#[derive(Debug)]
pub struct Image {
    name: String,
    pixels: RefCell<PixelArray>,
    xy0: Cell<(i64, i64)>,
}

impl Image {
    /// Zero-filled image
    pub fn new(dtype: DType, width: usize, height: usize) -> Self {
        Self::from_array(PixelArray::zeros(height, width, dtype), (0, 0))
    }

    pub fn from_array(pixels: PixelArray, xy0: (i64, i64)) -> Self {
        Self {
            name: format!("Image{}", pixels.dtype().suffix()),
            pixels: RefCell::new(pixels),
            xy0: Cell::new(xy0),
        }
    }

    /// Overloaded constructor of `Image{F,D,I,U}`
    pub fn construct(dtype: DType, args: &[Value]) -> ForeignResult<Self> {
        let ctor = format!("new_Image{}", dtype.suffix());
        if let [Value::Array(array)] = args {
            return Ok(Self::from_array(array.cast(dtype), (0, 0)));
        }
        if let [Value::Handle(h)] = args {
            if let Some(other) = h.downcast_ref::<Image>() {
                return Ok(Self::from_array(other.pixels().cast(dtype), other.xy0()));
            }
        }
        let geometry = parse_geometry(&ctor, args)?.ok_or_else(|| overload_error(&ctor, IMAGE_PROTOTYPES))?;
        let fill = match args {
            [Value::Int(_), Value::Int(_), _] | [Value::Handle(_), _] => number(&ctor, args, args.len() - 1)?,
            [Value::Int(_), Value::Int(_)] | [Value::Handle(_)] | [] => 0.0,
            _ => return Err(overload_error(&ctor, IMAGE_PROTOTYPES)),
        };
        let pixels = PixelArray::filled(geometry.height, geometry.width, dtype, fill);
        Ok(Self::from_array(pixels, geometry.xy0))
    }

    pub fn dtype(&self) -> DType {
        self.pixels.borrow().dtype()
    }

    pub fn width(&self) -> usize {
        self.pixels.borrow().cols()
    }

    pub fn height(&self) -> usize {
        self.pixels.borrow().rows()
    }

    pub fn xy0(&self) -> (i64, i64) {
        self.xy0.get()
    }

    pub fn set_xy0(&self, xy0: (i64, i64)) {
        self.xy0.set(xy0);
    }

    /// Copy of the pixel buffer
    pub fn pixels(&self) -> PixelArray {
        self.pixels.borrow().clone()
    }

    fn copy(&self) -> Self {
        Self::from_array(self.pixels(), self.xy0())
    }
}

impl NativeObject for Image {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn has_method(&self, name: &str) -> bool {
        IMAGE_METHODS.contains(&name)
    }

    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        match method {
            "getWidth" => Ok(Value::from(self.width())),
            "getHeight" => Ok(Value::from(self.height())),
            "getX0" => Ok(Value::Int(self.xy0().0)),
            "getY0" => Ok(Value::Int(self.xy0().1)),
            "getXY0" => Ok(point_handle(self.xy0())),
            "setXY0" => {
                self.set_xy0(parse_xy0(method, args)?);
                Ok(Value::None)
            }
            "getBBox" => Ok(bbox_handle(
                bbox_origin(method, args, self.xy0())?,
                self.width(),
                self.height(),
            )),
            "getDimensions" => Ok(extent_handle(self.width(), self.height())),
            "getArray" => Ok(Value::Array(self.pixels())),
            "assignArray" => {
                expect_arity(method, args, 3)?;
                let row0 = index(method, args, 0)?;
                let col0 = index(method, args, 1)?;
                let block = args[2].as_array().ok_or_else(|| argument_error(method, 2, "ndarray"))?;
                self.pixels
                    .borrow_mut()
                    .assign(row0, col0, block)
                    .map_err(|e| ForeignError::index_error(e.to_string()))?;
                Ok(Value::None)
            }
            "set" => {
                expect_arity(method, args, 1)?;
                let value = number(method, args, 0)?;
                let mut pixels = self.pixels.borrow_mut();
                let region = lsstx_bridge::Region::full(pixels.rows(), pixels.cols());
                pixels
                    .fill(&region, value)
                    .map_err(|e| ForeignError::index_error(e.to_string()))?;
                Ok(Value::None)
            }
            "get" => {
                expect_arity(method, args, 2)?;
                let x = index(method, args, 0)?;
                let y = index(method, args, 1)?;
                let pixels = self.pixels.borrow();
                pixels
                    .get(y, x)
                    .map(|v| scalar(pixels.dtype().is_float(), v))
                    .ok_or_else(|| ForeignError::index_error(format!("pixel ({}, {}) outside {}", x, y, self.name)))
            }
            "clone" => Ok(Value::Handle(NativeHandle::new(self.copy()))),
            _ => Err(no_method(&self.name, method)),
        }
    }

    fn describe(&self) -> String {
        format!(
            "<lsst.afw.image.{}; proxy of <Swig Object of type 'lsst::afw::image::Image< {} > *'>>",
            self.name,
            self.dtype()
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// MaskedImage
// ============================================================================

const MASKED_METHODS: &[&str] = &[
    "getImage", "getMask", "getVariance", "getArrays", "getWidth", "getHeight", "getX0", "getY0", "getXY0", "setXY0",
    "getBBox", "getDimensions", "clone",
];

/// Image, mask and variance planes sharing one geometry.
#[derive(Debug)]
pub struct MaskedImage {
    name: String,
    dtype: DType,
    image: NativeHandle,
    mask: NativeHandle,
    variance: NativeHandle,
}

impl MaskedImage {
    /// Mask plane pixel type
    pub const MASK_DTYPE: DType = DType::UInt16;
    /// Variance plane pixel type
    pub const VARIANCE_DTYPE: DType = DType::Float32;

    fn from_planes(dtype: DType, image: Image, mask: Image, variance: Image) -> Self {
        Self {
            name: format!("MaskedImage{}", dtype.suffix()),
            dtype,
            image: NativeHandle::new(image),
            mask: NativeHandle::new(mask),
            variance: NativeHandle::new(variance),
        }
    }

    /// Zero-filled planes
    pub fn new(dtype: DType, width: usize, height: usize, xy0: (i64, i64)) -> Self {
        let plane = |dtype| {
            let img = Image::new(dtype, width, height);
            img.set_xy0(xy0);
            img
        };
        Self::from_planes(dtype, plane(dtype), plane(Self::MASK_DTYPE), plane(Self::VARIANCE_DTYPE))
    }

    /// Overloaded constructor of `MaskedImage{F,D,I}`
    pub fn construct(dtype: DType, args: &[Value]) -> ForeignResult<Self> {
        let ctor = format!("new_MaskedImage{}", dtype.suffix());
        if let [Value::Handle(h), rest @ ..] = args {
            if let Some(image) = h.downcast_ref::<Image>() {
                if image.dtype() != dtype || rest.len() > 2 {
                    return Err(argument_error(&ctor, 0, &format!("lsst::afw::image::Image< {} > const &", dtype)));
                }
                let plane = |i: usize, plane_dtype: DType| -> ForeignResult<Image> {
                    match rest.get(i) {
                        Some(_) => {
                            let p = native::<Image>(&ctor, rest, i, "plane image")?;
                            if p.width() != image.width() || p.height() != image.height() {
                                return Err(ForeignError::value_error("plane dimensions do not match the image"));
                            }
                            Ok(Image::from_array(p.pixels().cast(plane_dtype), image.xy0()))
                        }
                        None => {
                            let p = Image::new(plane_dtype, image.width(), image.height());
                            p.set_xy0(image.xy0());
                            Ok(p)
                        }
                    }
                };
                let mask = plane(0, Self::MASK_DTYPE)?;
                let variance = plane(1, Self::VARIANCE_DTYPE)?;
                return Ok(Self::from_planes(dtype, image.copy(), mask, variance));
            }
        }
        if args.len() > 2 {
            return Err(overload_error(&ctor, IMAGE_PROTOTYPES));
        }
        let geometry = parse_geometry(&ctor, args)?.ok_or_else(|| overload_error(&ctor, IMAGE_PROTOTYPES))?;
        Ok(Self::new(dtype, geometry.width, geometry.height, geometry.xy0))
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    fn plane(handle: &NativeHandle) -> ForeignResult<&Image> {
        handle
            .downcast_ref::<Image>()
            .ok_or_else(|| ForeignError::new(lsstx_bridge::ForeignErrorKind::Runtime, "corrupt masked image plane"))
    }

    pub fn image(&self) -> ForeignResult<&Image> {
        Self::plane(&self.image)
    }

    fn copy(&self) -> ForeignResult<Self> {
        Ok(Self::from_planes(
            self.dtype,
            Self::plane(&self.image)?.copy(),
            Self::plane(&self.mask)?.copy(),
            Self::plane(&self.variance)?.copy(),
        ))
    }
}

impl NativeObject for MaskedImage {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn has_method(&self, name: &str) -> bool {
        MASKED_METHODS.contains(&name)
    }

    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        match method {
            "getImage" => Ok(Value::Handle(self.image.clone())),
            "getMask" => Ok(Value::Handle(self.mask.clone())),
            "getVariance" => Ok(Value::Handle(self.variance.clone())),
            "getArrays" => {
                let arrays = [&self.image, &self.mask, &self.variance]
                    .into_iter()
                    .map(|plane| Ok(Value::Array(Self::plane(plane)?.pixels())))
                    .collect::<ForeignResult<Vec<_>>>()?;
                Ok(Value::List(arrays))
            }
            "setXY0" => {
                let xy0 = parse_xy0(method, args)?;
                for plane in [&self.image, &self.mask, &self.variance] {
                    Self::plane(plane)?.set_xy0(xy0);
                }
                Ok(Value::None)
            }
            "clone" => Ok(Value::Handle(NativeHandle::new(self.copy()?))),
            "getWidth" | "getHeight" | "getX0" | "getY0" | "getXY0" | "getBBox" | "getDimensions" => {
                self.image()?.call(method, args)
            }
            _ => Err(no_method(&self.name, method)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_image_overloads() {
        let img = Image::construct(DType::Float32, &[Value::Int(5), Value::Int(4)]).unwrap();
        assert_eq!(img.type_name(), "ImageF");
        assert_eq!((img.width(), img.height()), (5, 4));

        let filled = Image::construct(DType::Int32, &[Value::Int(2), Value::Int(2), Value::Int(7)]).unwrap();
        assert_eq!(filled.call("get", &[Value::Int(1), Value::Int(1)]).unwrap(), Value::Int(7));

        let extent = Value::Handle(NativeHandle::new(Coordinate::new(CoordKind::Extent, false, vec![3.0, 2.0])));
        let from_extent = Image::construct(DType::Float64, &[extent]).unwrap();
        assert_eq!(from_extent.pixels().shape(), (2, 3));

        assert!(Image::construct(DType::Float32, &[Value::from("x")]).is_err());
    }

    #[test]
    fn test_image_from_box_keeps_origin() {
        let bbox = Box2::from_origin(10.0, 20.0, 3.0, 2.0);
        let img = Image::construct(DType::UInt16, &[Value::Handle(NativeHandle::new(bbox))]).unwrap();
        assert_eq!(img.xy0(), (10, 20));
        assert_eq!(img.call("getX0", &[]).unwrap(), Value::Int(10));
        assert_eq!(img.width(), 3);
    }

    #[test]
    fn test_assign_array_in_place() {
        let img = Image::new(DType::Float32, 3, 3);
        let block = PixelArray::filled(2, 2, DType::Float64, 1.5);
        img.call("assignArray", &[Value::Int(1), Value::Int(1), Value::Array(block.clone())])
            .unwrap();
        let pixels = img.pixels();
        assert_eq!(pixels.get(0, 0), Some(0.0));
        assert_eq!(pixels.get(2, 2), Some(1.5));

        let err = img
            .call("assignArray", &[Value::Int(2), Value::Int(2), Value::Array(block)])
            .unwrap_err();
        assert_eq!(err.kind, lsstx_bridge::ForeignErrorKind::Index);
    }

    #[test]
    fn test_masked_image_planes() {
        let mi = MaskedImage::construct(DType::Float64, &[Value::Int(4), Value::Int(3)]).unwrap();
        let mask = mi.call("getMask", &[]).unwrap();
        assert_eq!(mask.as_handle().unwrap().type_name(), "ImageU");
        let variance = mi.call("getVariance", &[]).unwrap();
        assert_eq!(variance.as_handle().unwrap().type_name(), "ImageF");
        assert_eq!(mi.call("getWidth", &[]).unwrap(), Value::Int(4));

        mi.call("setXY0", &[Value::Int(2), Value::Int(3)]).unwrap();
        let mask_plane = mask.as_handle().unwrap().downcast_ref::<Image>().unwrap();
        assert_eq!(mask_plane.xy0(), (2, 3));
    }

    #[test]
    fn test_bbox_with_origin() {
        let mi = MaskedImage::construct(DType::Float32, &[Value::Int(3), Value::Int(2)]).unwrap();
        mi.call("setXY0", &[Value::Int(5), Value::Int(7)]).unwrap();

        let min_of = |value: Value| value.as_handle().unwrap().downcast_ref::<Box2>().unwrap().min();
        assert_eq!(min_of(mi.call("getBBox", &[]).unwrap()), [5.0, 7.0]);
        assert_eq!(min_of(mi.call("getBBox", &[Value::Int(0)]).unwrap()), [5.0, 7.0]);
        assert_eq!(min_of(mi.call("getBBox", &[Value::from("LOCAL")]).unwrap()), [0.0, 0.0]);
        assert!(mi.call("getBBox", &[Value::Int(4)]).is_err());
    }

    #[test]
    fn test_masked_image_arrays() {
        let mi = MaskedImage::construct(DType::Int32, &[Value::Int(2), Value::Int(1)]).unwrap();
        let arrays = mi.call("getArrays", &[]).unwrap();
        let dtypes: Vec<DType> = arrays
            .as_list()
            .unwrap()
            .iter()
            .map(|a| a.as_array().unwrap().dtype())
            .collect();
        assert_eq!(dtypes, vec![DType::Int32, DType::UInt16, DType::Float32]);
    }

    #[test]
    fn test_masked_image_from_image() {
        let image = NativeHandle::new(Image::new(DType::Int32, 2, 2));
        let mi = MaskedImage::construct(DType::Int32, &[Value::Handle(image.clone())]).unwrap();
        assert_eq!(mi.type_name(), "MaskedImageI");
        assert!(MaskedImage::construct(DType::Float32, &[Value::Handle(image)]).is_err());
    }
}
