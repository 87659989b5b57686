//! Axis-aligned boxes: `Box2I` (inclusive integer pixels) and `Box2D`.

use std::any::Any;
use std::cell::Cell;

use lsstx_bridge::{ForeignError, ForeignResult, NativeHandle, NativeObject, Value};

use crate::args::{argument_error, expect_arity, integer, native, no_method, number, overload_error, scalar};
use crate::coord::{CoordKind, Coordinate};

const BOX_METHODS: &[&str] = &[
    "getMin", "getMax", "getMinX", "getMinY", "getMaxX", "getMaxY", "getWidth", "getHeight", "getDimensions",
    "getArea", "getCenter", "getCenterX", "getCenterY", "getCorners", "isEmpty", "contains", "overlaps", "clip",
    "include", "flipLR", "flipTB", "shift", "grow", "clone", "equals",
];

const BOX_PROTOTYPES: &[&str] = &[
    "lsst::geom::Box2I::Box2I()",
    "lsst::geom::Box2I::Box2I(lsst::geom::Point2I const &,lsst::geom::Point2I const &,bool)",
    "lsst::geom::Box2I::Box2I(lsst::geom::Point2I const &,lsst::geom::Extent2I const &,bool)",
    "lsst::geom::Box2I::Box2I(lsst::geom::Box2D const &,lsst::geom::Box2I::EdgeHandlingEnum)",
];

/// A 2-D box. Integer boxes store inclusive pixel bounds; floating boxes
/// store exact corners.
#[derive(Debug)]
pub struct Box2 {
    is_float: bool,
    min: Cell<[f64; 2]>,
    max: Cell<[f64; 2]>,
}

impl Box2 {
    /// Integer box covering `width x height` pixels starting at `(x0, y0)`
    pub fn from_origin(x0: f64, y0: f64, width: f64, height: f64) -> Self {
        Self {
            is_float: false,
            min: Cell::new([x0, y0]),
            max: Cell::new([x0 + width - 1.0, y0 + height - 1.0]),
        }
    }

    fn empty(is_float: bool) -> Self {
        let max = if is_float { [0.0, 0.0] } else { [-1.0, -1.0] };
        Self {
            is_float,
            min: Cell::new([0.0, 0.0]),
            max: Cell::new(max),
        }
    }

    /// Overloaded constructor of `Box2I` / `Box2D`
    pub fn construct(is_float: bool, args: &[Value]) -> ForeignResult<Self> {
        let ctor = if is_float { "new_Box2D" } else { "new_Box2I" };
        match args {
            [] => Ok(Self::empty(is_float)),
            [Value::Handle(h)] => {
                let other = h
                    .downcast_ref::<Box2>()
                    .ok_or_else(|| overload_error(ctor, BOX_PROTOTYPES))?;
                match (other.is_float, is_float) {
                    (false, true) => {
                        let (min, max) = (other.min.get(), other.max.get());
                        Ok(Self {
                            is_float,
                            min: Cell::new([min[0] - 0.5, min[1] - 0.5]),
                            max: Cell::new([max[0] + 0.5, max[1] + 0.5]),
                        })
                    }
                    (true, false) => Err(ForeignError::not_implemented(
                        "converting Box2D to Box2I requires an edge-handling mode",
                    )),
                    _ => Ok(other.copy()),
                }
            }
            [_, _] => {
                let corner = native::<Coordinate>(ctor, args, 0, "Point")?;
                let second = native::<Coordinate>(ctor, args, 1, "Point or Extent")?;
                if corner.kind() != CoordKind::Point || corner.dims() != 2 || second.dims() != 2 {
                    return Err(overload_error(ctor, BOX_PROTOTYPES));
                }
                if !is_float && (corner.is_float() || second.is_float()) {
                    return Err(argument_error(ctor, 0, "lsst::geom::Point2I const &"));
                }
                let a = corner.values();
                let b = second.values();
                match second.kind() {
                    CoordKind::Point => Ok(Self {
                        is_float,
                        min: Cell::new([a[0].min(b[0]), a[1].min(b[1])]),
                        max: Cell::new([a[0].max(b[0]), a[1].max(b[1])]),
                    }),
                    CoordKind::Extent if b[0] <= 0.0 || b[1] <= 0.0 => Ok(Self::empty(is_float)),
                    CoordKind::Extent => {
                        let pad = if is_float { 0.0 } else { 1.0 };
                        Ok(Self {
                            is_float,
                            min: Cell::new([a[0], a[1]]),
                            max: Cell::new([a[0] + b[0] - pad, a[1] + b[1] - pad]),
                        })
                    }
                }
            }
            _ => Err(overload_error(ctor, BOX_PROTOTYPES)),
        }
    }

    fn copy(&self) -> Self {
        Self {
            is_float: self.is_float,
            min: Cell::new(self.min.get()),
            max: Cell::new(self.max.get()),
        }
    }

    pub fn is_float(&self) -> bool {
        self.is_float
    }

    pub fn min(&self) -> [f64; 2] {
        self.min.get()
    }

    pub fn max(&self) -> [f64; 2] {
        self.max.get()
    }

    /// Width and height
    pub fn dimensions(&self) -> [f64; 2] {
        let (min, max) = (self.min.get(), self.max.get());
        let pad = self.pad();
        [(max[0] - min[0] + pad).max(0.0), (max[1] - min[1] + pad).max(0.0)]
    }

    pub fn is_empty(&self) -> bool {
        let [w, h] = self.dimensions();
        w <= 0.0 || h <= 0.0
    }

    fn center(&self) -> [f64; 2] {
        let (min, max) = (self.min.get(), self.max.get());
        [0.5 * (min[0] + max[0]), 0.5 * (min[1] + max[1])]
    }

    /// Pixel step between the last covered coordinate and the extent
    fn pad(&self) -> f64 {
        if self.is_float {
            0.0
        } else {
            1.0
        }
    }

    fn contains_point(&self, v: &[f64]) -> bool {
        let (min, max) = (self.min(), self.max());
        let inside = if self.is_float {
            v[0] >= min[0] && v[0] < max[0] && v[1] >= min[1] && v[1] < max[1]
        } else {
            v[0] >= min[0] && v[0] <= max[0] && v[1] >= min[1] && v[1] <= max[1]
        };
        inside && !self.is_empty()
    }

    fn contains_box(&self, other: &Box2) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        let (min, max) = (self.min(), self.max());
        let (omin, omax) = (other.min(), other.max());
        omin[0] >= min[0] && omin[1] >= min[1] && omax[0] <= max[0] && omax[1] <= max[1]
    }

    fn overlaps(&self, other: &Box2) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (min, max) = (self.min(), self.max());
        let (omin, omax) = (other.min(), other.max());
        if self.is_float {
            omin[0] < max[0] && omax[0] > min[0] && omin[1] < max[1] && omax[1] > min[1]
        } else {
            omin[0] <= max[0] && omax[0] >= min[0] && omin[1] <= max[1] && omax[1] >= min[1]
        }
    }

    /// Shrink to the intersection with `other`; no overlap leaves an empty box
    fn clip(&self, other: &Box2) {
        if !self.overlaps(other) {
            let empty = Self::empty(self.is_float);
            self.min.set(empty.min());
            self.max.set(empty.max());
            return;
        }
        let (min, max) = (self.min(), self.max());
        let (omin, omax) = (other.min(), other.max());
        self.min.set([min[0].max(omin[0]), min[1].max(omin[1])]);
        self.max.set([max[0].min(omax[0]), max[1].min(omax[1])]);
    }

    /// Grow to cover the corners `lo` and `hi`
    fn include(&self, lo: [f64; 2], hi: [f64; 2]) {
        if self.is_empty() {
            self.min.set(lo);
            self.max.set(hi);
            return;
        }
        let (min, max) = (self.min(), self.max());
        self.min.set([min[0].min(lo[0]), min[1].min(lo[1])]);
        self.max.set([max[0].max(hi[0]), max[1].max(hi[1])]);
    }

    /// Mirror along `axis` within `[0, extent)`
    fn flip(&self, axis: usize, extent: f64) {
        let (mut min, mut max) = (self.min(), self.max());
        let far = extent - self.pad();
        let (lo, hi) = (far - max[axis], far - min[axis]);
        min[axis] = lo;
        max[axis] = hi;
        self.min.set(min);
        self.max.set(max);
    }

    fn corners(&self) -> Value {
        let (min, max) = (self.min(), self.max());
        Value::List(vec![
            self.point([min[0], min[1]]),
            self.point([max[0], min[1]]),
            self.point([max[0], max[1]]),
            self.point([min[0], max[1]]),
        ])
    }

    fn point(&self, values: [f64; 2]) -> Value {
        Value::Handle(NativeHandle::new(Coordinate::new(CoordKind::Point, self.is_float, values.to_vec())))
    }
}

impl NativeObject for Box2 {
    fn type_name(&self) -> &str {
        if self.is_float {
            "Box2D"
        } else {
            "Box2I"
        }
    }

    fn has_method(&self, name: &str) -> bool {
        BOX_METHODS.contains(&name)
    }

    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        let f = self.is_float;
        match method {
            "getMin" => Ok(self.point(self.min())),
            "getMax" => Ok(self.point(self.max())),
            "getMinX" => Ok(scalar(f, self.min()[0])),
            "getMinY" => Ok(scalar(f, self.min()[1])),
            "getMaxX" => Ok(scalar(f, self.max()[0])),
            "getMaxY" => Ok(scalar(f, self.max()[1])),
            "getWidth" => Ok(scalar(f, self.dimensions()[0])),
            "getHeight" => Ok(scalar(f, self.dimensions()[1])),
            "getDimensions" => Ok(Value::Handle(NativeHandle::new(Coordinate::new(
                CoordKind::Extent,
                f,
                self.dimensions().to_vec(),
            )))),
            "getArea" => {
                let [w, h] = self.dimensions();
                Ok(scalar(f, w * h))
            }
            "getCenter" => Ok(Value::Handle(NativeHandle::new(Coordinate::new(
                CoordKind::Point,
                true,
                self.center().to_vec(),
            )))),
            "getCenterX" => Ok(Value::Float(self.center()[0])),
            "getCenterY" => Ok(Value::Float(self.center()[1])),
            "isEmpty" => Ok(Value::Bool(self.is_empty())),
            "getCorners" => Ok(self.corners()),
            "contains" => {
                expect_arity(method, args, 1)?;
                if let Some(other) = args[0].as_handle().and_then(|h| h.downcast_ref::<Box2>()) {
                    return Ok(Value::Bool(self.contains_box(other)));
                }
                let p = native::<Coordinate>(method, args, 0, "Point or Box")?;
                Ok(Value::Bool(self.contains_point(&p.values())))
            }
            "overlaps" => {
                expect_arity(method, args, 1)?;
                let other = native::<Box2>(method, args, 0, self.type_name())?;
                Ok(Value::Bool(self.overlaps(other)))
            }
            "clip" => {
                expect_arity(method, args, 1)?;
                let other = native::<Box2>(method, args, 0, self.type_name())?;
                self.clip(other);
                Ok(Value::None)
            }
            "include" => {
                expect_arity(method, args, 1)?;
                if let Some(other) = args[0].as_handle().and_then(|h| h.downcast_ref::<Box2>()) {
                    if !other.is_empty() {
                        self.include(other.min(), other.max());
                    }
                    return Ok(Value::None);
                }
                let p = native::<Coordinate>(method, args, 0, "Point or Box")?;
                if p.dims() != 2 || p.kind() != CoordKind::Point {
                    return Err(argument_error(method, 0, "lsst::geom::Point2 const &"));
                }
                let v = p.values();
                self.include([v[0], v[1]], [v[0], v[1]]);
                Ok(Value::None)
            }
            "flipLR" | "flipTB" => {
                expect_arity(method, args, 1)?;
                let extent = if f { number(method, args, 0)? } else { integer(method, args, 0)? as f64 };
                self.flip(if method == "flipLR" { 0 } else { 1 }, extent);
                Ok(Value::None)
            }
            "shift" => {
                expect_arity(method, args, 1)?;
                let offset = native::<Coordinate>(method, args, 0, "Extent")?.values();
                let (min, max) = (self.min(), self.max());
                self.min.set([min[0] + offset[0], min[1] + offset[1]]);
                self.max.set([max[0] + offset[0], max[1] + offset[1]]);
                Ok(Value::None)
            }
            "grow" => {
                expect_arity(method, args, 1)?;
                let amount = number(method, args, 0)?;
                let (min, max) = (self.min(), self.max());
                self.min.set([min[0] - amount, min[1] - amount]);
                self.max.set([max[0] + amount, max[1] + amount]);
                Ok(Value::None)
            }
            "clone" => Ok(Value::Handle(NativeHandle::new(self.copy()))),
            "equals" => {
                expect_arity(method, args, 1)?;
                let equal = args[0]
                    .as_handle()
                    .and_then(|h| h.downcast_ref::<Box2>())
                    .map(|o| {
                        o.is_float == self.is_float
                            && ((o.is_empty() && self.is_empty()) || (o.min() == self.min() && o.max() == self.max()))
                    })
                    .unwrap_or(false);
                Ok(Value::Bool(equal))
            }
            _ => Err(no_method(self.type_name(), method)),
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

    fn point(is_float: bool, x: f64, y: f64) -> Value {
        Value::Handle(NativeHandle::new(Coordinate::new(CoordKind::Point, is_float, vec![x, y])))
    }

    fn extent(is_float: bool, x: f64, y: f64) -> Value {
        Value::Handle(NativeHandle::new(Coordinate::new(CoordKind::Extent, is_float, vec![x, y])))
    }

    #[test]
    fn test_integer_box_from_point_and_extent() {
        let b = Box2::construct(false, &[point(false, 1.0, 2.0), extent(false, 4.0, 3.0)]).unwrap();
        assert_eq!(b.min(), [1.0, 2.0]);
        assert_eq!(b.max(), [4.0, 4.0]);
        assert_eq!(b.call("getWidth", &[]).unwrap(), Value::Int(4));
        assert_eq!(b.call("getArea", &[]).unwrap(), Value::Int(12));
        assert_eq!(b.call("getCenterX", &[]).unwrap(), Value::Float(2.5));
        assert_eq!(b.call("contains", &[point(false, 4.0, 4.0)]).unwrap(), Value::Bool(true));
        assert_eq!(b.call("contains", &[point(false, 5.0, 4.0)]).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_float_box_from_corners() {
        let b = Box2::construct(true, &[point(true, 3.0, 0.0), point(true, 1.0, 2.0)]).unwrap();
        assert_eq!(b.type_name(), "Box2D");
        assert_eq!(b.min(), [1.0, 0.0]);
        assert_eq!(b.max(), [3.0, 2.0]);
        assert_eq!(b.call("getArea", &[]).unwrap(), Value::Float(4.0));
    }

    #[test]
    fn test_empty_and_conversions() {
        let empty = Box2::construct(false, &[]).unwrap();
        assert!(empty.is_empty());
        let degenerate = Box2::construct(false, &[point(false, 0.0, 0.0), extent(false, 0.0, 5.0)]).unwrap();
        assert!(degenerate.is_empty());

        let i = NativeHandle::new(Box2::construct(false, &[point(false, 0.0, 0.0), extent(false, 2.0, 2.0)]).unwrap());
        let d = Box2::construct(true, &[Value::Handle(i.clone())]).unwrap();
        assert_eq!(d.min(), [-0.5, -0.5]);
        assert_eq!(d.max(), [1.5, 1.5]);

        let d = NativeHandle::new(d);
        assert!(Box2::construct(false, &[Value::Handle(d)]).is_err());
        assert!(Box2::construct(false, &[point(true, 0.5, 0.0), point(false, 1.0, 1.0)]).is_err());
    }

    fn integer_box(x0: f64, y0: f64, w: f64, h: f64) -> NativeHandle {
        NativeHandle::new(Box2::from_origin(x0, y0, w, h))
    }

    #[test]
    fn test_corners_in_order() {
        let b = Box2::from_origin(1.0, 2.0, 3.0, 2.0);
        let corners = b.call("getCorners", &[]).unwrap();
        let values: Vec<Vec<f64>> = corners
            .as_list()
            .unwrap()
            .iter()
            .map(|c| c.as_handle().unwrap().downcast_ref::<Coordinate>().unwrap().values().to_vec())
            .collect();
        assert_eq!(values, vec![vec![1.0, 2.0], vec![3.0, 2.0], vec![3.0, 3.0], vec![1.0, 3.0]]);
    }

    #[test]
    fn test_box_relations() {
        let outer = Box2::from_origin(0.0, 0.0, 4.0, 4.0);
        let inner = integer_box(1.0, 1.0, 2.0, 2.0);
        let apart = integer_box(10.0, 10.0, 2.0, 2.0);
        assert_eq!(outer.call("contains", &[Value::Handle(inner.clone())]).unwrap(), Value::Bool(true));
        assert_eq!(outer.call("overlaps", &[Value::Handle(inner)]).unwrap(), Value::Bool(true));
        assert_eq!(outer.call("overlaps", &[Value::Handle(apart.clone())]).unwrap(), Value::Bool(false));
        assert!(outer.call("overlaps", &[point(false, 1.0, 1.0)]).is_err());

        outer.call("clip", &[Value::Handle(integer_box(2.0, 3.0, 5.0, 5.0))]).unwrap();
        assert_eq!((outer.min(), outer.max()), ([2.0, 3.0], [3.0, 3.0]));
        outer.call("clip", &[Value::Handle(apart)]).unwrap();
        assert!(outer.is_empty());
    }

    #[test]
    fn test_include_point_and_box() {
        let b = Box2::construct(false, &[]).unwrap();
        b.call("include", &[point(false, 2.0, 3.0)]).unwrap();
        assert_eq!((b.min(), b.max()), ([2.0, 3.0], [2.0, 3.0]));
        b.call("include", &[Value::Handle(integer_box(-1.0, 0.0, 2.0, 2.0))]).unwrap();
        assert_eq!((b.min(), b.max()), ([-1.0, 0.0], [2.0, 3.0]));
    }

    #[test]
    fn test_flip() {
        let b = Box2::from_origin(1.0, 0.0, 2.0, 3.0);
        b.call("flipLR", &[Value::Int(10)]).unwrap();
        assert_eq!((b.min(), b.max()), ([7.0, 0.0], [8.0, 2.0]));
        b.call("flipTB", &[Value::Int(5)]).unwrap();
        assert_eq!((b.min(), b.max()), ([7.0, 2.0], [8.0, 4.0]));

        let d = Box2::construct(true, &[point(true, 0.5, 0.0), point(true, 1.5, 1.0)]).unwrap();
        d.call("flipLR", &[Value::Float(4.0)]).unwrap();
        assert_eq!((d.min(), d.max()), ([2.5, 0.0], [3.5, 1.0]));
    }

    #[test]
    fn test_shift_and_grow() {
        let b = Box2::construct(false, &[point(false, 0.0, 0.0), extent(false, 2.0, 2.0)]).unwrap();
        b.call("shift", &[extent(false, 1.0, 1.0)]).unwrap();
        b.call("grow", &[Value::Int(1)]).unwrap();
        assert_eq!(b.min(), [0.0, 0.0]);
        assert_eq!(b.max(), [3.0, 3.0]);
    }
}
