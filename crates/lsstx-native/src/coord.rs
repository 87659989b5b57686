//! Points, extents and coordinate expressions.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;

use lsstx_bridge::{ForeignError, ForeignResult, NativeHandle, NativeObject, Value};

use crate::args::{
    argument_error, boolean, expect_arity, index, native, no_method, number, overload_error, scalar,
};

/// Whether a coordinate is a position or a displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordKind {
    Point,
    Extent,
}

impl fmt::Display for CoordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordKind::Point => write!(f, "Point"),
            CoordKind::Extent => write!(f, "Extent"),
        }
    }
}

const COMMON_METHODS: &[&str] = &[
    "getX", "getY", "setX", "setY", "clone", "equals", "getitem", "setitem", "len", "add", "sub", "lt", "le",
    "gt", "ge",
];
const Z_METHODS: &[&str] = &["getZ", "setZ"];
const POINT_METHODS: &[&str] = &["distanceSquared", "scale", "shift", "asExtent"];
const EXTENT_METHODS: &[&str] = &["computeNorm", "computeSquaredNorm", "asPoint"];

// ============================================================================
// Coordinate - Point2I ... Extent3D
// ============================================================================

/// A 2-D or 3-D point or extent with integer or floating components.
#[derive(Debug)]
pub struct Coordinate {
    name: String,
    kind: CoordKind,
    is_float: bool,
    values: RefCell<Vec<f64>>,
}

impl Coordinate {
    /// Create from component values; integer coordinates truncate
    pub fn new(kind: CoordKind, is_float: bool, values: Vec<f64>) -> Self {
        let values = if is_float {
            values
        } else {
            values.into_iter().map(|v| v.trunc()).collect()
        };
        Self {
            name: format!("{}{}{}", kind, values.len(), if is_float { "D" } else { "I" }),
            kind,
            is_float,
            values: RefCell::new(values),
        }
    }

    /// Run the overloaded constructor of `Point{dims}{I,D}` / `Extent{dims}{I,D}`
    pub fn construct(kind: CoordKind, dims: usize, is_float: bool, args: &[Value]) -> ForeignResult<Self> {
        let class = format!("{}{}{}", kind, dims, if is_float { "D" } else { "I" });
        let ctor = format!("new_{}", class);
        let values = match args {
            [] => vec![0.0; dims],
            [Value::Handle(handle)] => {
                let other = handle
                    .downcast_ref::<Coordinate>()
                    .filter(|c| c.dims() == dims)
                    .ok_or_else(|| overload_error(&ctor, COORD_PROTOTYPES))?;
                if other.is_float && !is_float {
                    return Err(ForeignError::not_implemented(format!(
                        "conversion from {} to {} is not implemented",
                        other.name, class
                    )));
                }
                other.values()
            }
            [Value::List(items)] if items.len() == dims => components(&ctor, items, is_float)?,
            [_] => vec![components(&ctor, args, is_float)?[0]; dims],
            _ if args.len() == dims => components(&ctor, args, is_float)?,
            _ => return Err(overload_error(&ctor, COORD_PROTOTYPES)),
        };
        Ok(Self::new(kind, is_float, values))
    }

    pub fn kind(&self) -> CoordKind {
        self.kind
    }

    pub fn dims(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_float(&self) -> bool {
        self.is_float
    }

    /// Snapshot of the components
    pub fn values(&self) -> Vec<f64> {
        self.values.borrow().clone()
    }

    fn component(&self, i: usize) -> ForeignResult<Value> {
        self.values
            .borrow()
            .get(i)
            .map(|&v| scalar(self.is_float, v))
            .ok_or_else(|| ForeignError::index_error(format!("index {} out of range for {}", i, self.name)))
    }

    fn set_component(&self, method: &str, i: usize, args: &[Value], arg: usize) -> ForeignResult<Value> {
        let value = number(method, args, arg)?;
        if !self.is_float && value.fract() != 0.0 {
            return Err(argument_error(method, arg, "int"));
        }
        let mut values = self.values.borrow_mut();
        let slot = values
            .get_mut(i)
            .ok_or_else(|| ForeignError::index_error(format!("index {} out of range for {}", i, self.name)))?;
        *slot = value;
        Ok(Value::None)
    }

    fn other<'a>(&self, method: &str, args: &'a [Value]) -> ForeignResult<&'a Coordinate> {
        expect_arity(method, args, 1)?;
        let other = native::<Coordinate>(method, args, 0, "Point or Extent")?;
        if other.dims() != self.dims() {
            return Err(argument_error(method, 0, &format!("{}-D coordinate", self.dims())));
        }
        Ok(other)
    }

    fn arithmetic(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        let other = self.other(method, args)?;
        let adding = method == "add";
        let kind = match (self.kind, other.kind, adding) {
            (CoordKind::Point, CoordKind::Extent, _) => CoordKind::Point,
            (CoordKind::Extent, CoordKind::Extent, _) => CoordKind::Extent,
            (CoordKind::Extent, CoordKind::Point, true) => CoordKind::Point,
            (CoordKind::Point, CoordKind::Point, false) => CoordKind::Extent,
            _ => {
                return Err(ForeignError::type_error(format!(
                    "unsupported operand types for {}: {} and {}",
                    method, self.name, other.name
                )))
            }
        };
        let values = self
            .values()
            .iter()
            .zip(other.values())
            .map(|(a, b)| if adding { a + b } else { a - b })
            .collect();
        Ok(Value::Handle(NativeHandle::new(Coordinate::new(
            kind,
            self.is_float || other.is_float,
            values,
        ))))
    }

    fn compare(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        let other = self.other(method, args)?;
        let op: fn(f64, f64) -> bool = match method {
            "lt" => |a, b| a < b,
            "le" => |a, b| a <= b,
            "gt" => |a, b| a > b,
            _ => |a, b| a >= b,
        };
        let flags = self.values().iter().zip(other.values()).map(|(&a, b)| op(a, b)).collect();
        Ok(Value::Handle(NativeHandle::new(CoordinateExpr::new(flags))))
    }

    fn squared_norm(&self) -> f64 {
        self.values.borrow().iter().map(|v| v * v).sum()
    }
}

const COORD_PROTOTYPES: &[&str] = &[
    "lsst::geom::CoordinateBase::CoordinateBase()",
    "lsst::geom::CoordinateBase::CoordinateBase(T)",
    "lsst::geom::CoordinateBase::CoordinateBase(T,T)",
    "lsst::geom::CoordinateBase::CoordinateBase(T,T,T)",
    "lsst::geom::CoordinateBase::CoordinateBase(lsst::geom::CoordinateBase const &)",
];

/// Numeric components; integer coordinates reject fractional values
fn components(ctor: &str, args: &[Value], is_float: bool) -> ForeignResult<Vec<f64>> {
    (0..args.len())
        .map(|i| {
            let value = number(ctor, args, i)?;
            if !is_float && value.fract() != 0.0 {
                return Err(argument_error(ctor, i, "int"));
            }
            Ok(value)
        })
        .collect()
}

impl NativeObject for Coordinate {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn has_method(&self, name: &str) -> bool {
        COMMON_METHODS.contains(&name)
            || (self.dims() == 3 && Z_METHODS.contains(&name))
            || (self.dims() == 2 && name == "swap")
            || match self.kind {
                CoordKind::Point => POINT_METHODS.contains(&name),
                CoordKind::Extent => EXTENT_METHODS.contains(&name),
            }
    }

    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        if !self.has_method(method) {
            return Err(no_method(&self.name, method));
        }
        match method {
            "getX" => self.component(0),
            "getY" => self.component(1),
            "getZ" => self.component(2),
            "setX" => self.set_component(method, 0, args, 0),
            "setY" => self.set_component(method, 1, args, 0),
            "setZ" => self.set_component(method, 2, args, 0),
            "len" => Ok(Value::from(self.dims())),
            "getitem" => self.component(index(method, args, 0)?),
            "setitem" => self.set_component(method, index(method, args, 0)?, args, 1),
            "clone" => Ok(Value::Handle(NativeHandle::new(Coordinate::new(
                self.kind,
                self.is_float,
                self.values(),
            )))),
            "equals" => {
                expect_arity(method, args, 1)?;
                let equal = args[0]
                    .as_handle()
                    .and_then(|h| h.downcast_ref::<Coordinate>())
                    .map(|other| other.kind == self.kind && other.values() == self.values())
                    .unwrap_or(false);
                Ok(Value::Bool(equal))
            }
            "add" | "sub" => self.arithmetic(method, args),
            "lt" | "le" | "gt" | "ge" => self.compare(method, args),
            "swap" => {
                self.values.borrow_mut().swap(0, 1);
                Ok(Value::None)
            }
            "computeNorm" => {
                if !self.is_float {
                    return Err(ForeignError::type_error(format!(
                        "computeNorm is not defined for integer {}",
                        self.name
                    ))
                    .with_detail(format!("in method '{}_computeNorm', no integer specialisation", self.name)));
                }
                Ok(Value::Float(self.squared_norm().sqrt()))
            }
            "computeSquaredNorm" => Ok(scalar(self.is_float, self.squared_norm())),
            "distanceSquared" => {
                let other = self.other(method, args)?;
                let d = self
                    .values()
                    .iter()
                    .zip(other.values())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>();
                Ok(scalar(self.is_float || other.is_float, d))
            }
            "scale" => {
                expect_arity(method, args, 1)?;
                let factor = number(method, args, 0)?;
                let is_float = self.is_float;
                for v in self.values.borrow_mut().iter_mut() {
                    *v = if is_float { *v * factor } else { (*v * factor).trunc() };
                }
                Ok(Value::None)
            }
            "shift" => {
                let other = self.other(method, args)?;
                if other.kind != CoordKind::Extent {
                    return Err(argument_error(method, 0, "Extent"));
                }
                let offsets = other.values();
                for (v, d) in self.values.borrow_mut().iter_mut().zip(offsets) {
                    *v += d;
                }
                Ok(Value::None)
            }
            "asExtent" | "asPoint" => {
                let kind = if method == "asExtent" { CoordKind::Extent } else { CoordKind::Point };
                Ok(Value::Handle(NativeHandle::new(Coordinate::new(kind, self.is_float, self.values()))))
            }
            _ => Err(no_method(&self.name, method)),
        }
    }

    fn describe(&self) -> String {
        format!("<lsst.geom.{}; proxy of <Swig Object of type 'lsst::geom::{} *'>>", self.name, self.name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// CoordinateExpr - element-wise comparison results
// ============================================================================

/// Per-component boolean result of comparing two coordinates.
#[derive(Debug)]
pub struct CoordinateExpr {
    name: String,
    values: RefCell<Vec<bool>>,
}

const EXPR_METHODS: &[&str] = &[
    "getX", "getY", "setX", "setY", "getitem", "setitem", "len", "and_", "or_", "not_", "all", "any", "clone",
    "equals",
];

impl CoordinateExpr {
    pub fn new(values: Vec<bool>) -> Self {
        Self {
            name: format!("CoordinateExpr{}", values.len()),
            values: RefCell::new(values),
        }
    }

    /// Overloaded constructor of `CoordinateExpr{dims}`
    pub fn construct(dims: usize, args: &[Value]) -> ForeignResult<Self> {
        let ctor = format!("new_CoordinateExpr{}", dims);
        let values = match args {
            [] => vec![false; dims],
            [Value::List(items)] if items.len() == dims => {
                (0..dims).map(|i| boolean(&ctor, items, i)).collect::<ForeignResult<Vec<_>>>()?
            }
            [_] => vec![boolean(&ctor, args, 0)?; dims],
            _ if args.len() == dims => (0..dims).map(|i| boolean(&ctor, args, i)).collect::<ForeignResult<Vec<_>>>()?,
            _ => {
                return Err(overload_error(
                    &ctor,
                    &["lsst::geom::CoordinateExpr::CoordinateExpr(bool)", "lsst::geom::CoordinateExpr::CoordinateExpr(bool,bool)"],
                ))
            }
        };
        Ok(Self::new(values))
    }

    pub fn values(&self) -> Vec<bool> {
        self.values.borrow().clone()
    }

    fn flag(&self, i: usize) -> ForeignResult<Value> {
        self.values
            .borrow()
            .get(i)
            .map(|&b| Value::Bool(b))
            .ok_or_else(|| ForeignError::index_error(format!("index {} out of range for {}", i, self.name)))
    }

    fn set_flag(&self, method: &str, i: usize, args: &[Value], arg: usize) -> ForeignResult<Value> {
        let value = boolean(method, args, arg)?;
        let mut values = self.values.borrow_mut();
        let slot = values
            .get_mut(i)
            .ok_or_else(|| ForeignError::index_error(format!("index {} out of range for {}", i, self.name)))?;
        *slot = value;
        Ok(Value::None)
    }

    fn combine(&self, method: &str, args: &[Value], op: fn(bool, bool) -> bool) -> ForeignResult<Value> {
        expect_arity(method, args, 1)?;
        let other = native::<CoordinateExpr>(method, args, 0, "CoordinateExpr")?;
        let (a, b) = (self.values(), other.values());
        if a.len() != b.len() {
            return Err(argument_error(method, 0, &self.name));
        }
        let values = a.iter().zip(b).map(|(&x, y)| op(x, y)).collect();
        Ok(Value::Handle(NativeHandle::new(CoordinateExpr::new(values))))
    }
}

impl NativeObject for CoordinateExpr {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn has_method(&self, name: &str) -> bool {
        EXPR_METHODS.contains(&name) || (self.values.borrow().len() == 3 && Z_METHODS.contains(&name))
    }

    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        match method {
            "getX" => self.flag(0),
            "getY" => self.flag(1),
            "getZ" if self.has_method(method) => self.flag(2),
            "setX" => self.set_flag(method, 0, args, 0),
            "setY" => self.set_flag(method, 1, args, 0),
            "setZ" if self.has_method(method) => self.set_flag(method, 2, args, 0),
            "getitem" => self.flag(index(method, args, 0)?),
            "setitem" => self.set_flag(method, index(method, args, 0)?, args, 1),
            "len" => Ok(Value::from(self.values.borrow().len())),
            "and_" => self.combine(method, args, |a, b| a && b),
            "or_" => self.combine(method, args, |a, b| a || b),
            "not_" => Ok(Value::Handle(NativeHandle::new(CoordinateExpr::new(
                self.values().into_iter().map(|b| !b).collect(),
            )))),
            "all" => Ok(Value::Bool(self.values.borrow().iter().all(|&b| b))),
            "any" => Ok(Value::Bool(self.values.borrow().iter().any(|&b| b))),
            "clone" => Ok(Value::Handle(NativeHandle::new(CoordinateExpr::new(self.values())))),
            "equals" => {
                expect_arity(method, args, 1)?;
                let equal = args[0]
                    .as_handle()
                    .and_then(|h| h.downcast_ref::<CoordinateExpr>())
                    .map(|other| other.values() == self.values())
                    .unwrap_or(false);
                Ok(Value::Bool(equal))
            }
            _ => Err(no_method(&self.name, method)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
