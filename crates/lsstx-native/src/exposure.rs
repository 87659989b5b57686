//! Exposures: a masked image plus opaque calibration info.

use std::any::Any;
use std::cell::RefCell;

use indexmap::IndexMap;
use lsstx_bridge::{DType, ForeignError, ForeignErrorKind, ForeignResult, Keywords, NativeHandle, NativeObject, Value};
use smol_str::SmolStr;

use crate::args::{argument_error, expect_arity, native, no_method, overload_error};
use crate::image::{parse_geometry, MaskedImage};

/// Info slots with `get`/`set`/`has` accessors, and the constructor keyword
/// naming each one
const INFO_SLOTS: &[(&str, &str)] = &[
    ("Wcs", "wcs"),
    ("Psf", "psf"),
    ("Calib", "calib"),
    ("Filter", "filter"),
    ("Detector", "detector"),
    ("Metadata", "metadata"),
    ("CoaddInputs", "coadd_inputs"),
];

fn info_method(method: &str) -> Option<(&str, &str)> {
    ["get", "set", "has"].iter().find_map(|prefix| {
        let slot = method.strip_prefix(prefix)?;
        INFO_SLOTS.iter().any(|(name, _)| *name == slot).then_some((*prefix, slot))
    })
}

// ============================================================================
// ExposureInfo
// ============================================================================

/// Calibration and provenance attached to an exposure. Every slot holds an
/// opaque value; an unset slot reads as `None`.
#[derive(Debug, Default)]
pub struct ExposureInfo {
    slots: RefCell<IndexMap<SmolStr, Value>>,
}

impl ExposureInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ExposureInfo(info)` copies another info object; otherwise each slot
    /// comes from its keyword (`wcs`, `psf`, ..., `coadd_inputs`)
    pub fn construct(args: &[Value], keywords: &Keywords) -> ForeignResult<Self> {
        const CTOR: &str = "new_ExposureInfo";
        let info = match args {
            [] => Self::new(),
            [Value::Handle(_)] => native::<ExposureInfo>(CTOR, args, 0, "lsst::afw::image::ExposureInfo const &")?.copy(),
            _ => {
                return Err(overload_error(
                    CTOR,
                    &[
                        "lsst::afw::image::ExposureInfo::ExposureInfo(CONST_PTR(SkyWcs),CONST_PTR(Psf),CONST_PTR(Calib),CONST_PTR(Detector),Filter const &,PTR(PropertySet),PTR(CoaddInputs))",
                        "lsst::afw::image::ExposureInfo::ExposureInfo(ExposureInfo const &,bool)",
                    ],
                ))
            }
        };
        for (key, value) in keywords {
            let slot = INFO_SLOTS
                .iter()
                .find(|(_, keyword)| *keyword == key.as_str())
                .map(|(slot, _)| *slot)
                .ok_or_else(|| {
                    ForeignError::type_error(format!("{}() got an unexpected keyword argument '{}'", CTOR, key))
                })?;
            info.set(slot, value.clone());
        }
        Ok(info)
    }

    pub fn get(&self, slot: &str) -> Value {
        self.slots.borrow().get(slot).cloned().unwrap_or(Value::None)
    }

    pub fn set(&self, slot: &str, value: Value) {
        let mut slots = self.slots.borrow_mut();
        if value.is_none() {
            slots.shift_remove(slot);
        } else {
            slots.insert(SmolStr::new(slot), value);
        }
    }

    pub fn has(&self, slot: &str) -> bool {
        self.slots.borrow().contains_key(slot)
    }

    /// Copy whose cloneable slot values are cloned too
    fn copy(&self) -> Self {
        let slots = self
            .slots
            .borrow()
            .iter()
            .map(|(slot, value)| {
                let value = match value {
                    Value::Handle(h) if h.has_method("clone") => h.call("clone", &[]).unwrap_or_else(|_| value.clone()),
                    other => other.clone(),
                };
                (slot.clone(), value)
            })
            .collect();
        Self {
            slots: RefCell::new(slots),
        }
    }
}

impl NativeObject for ExposureInfo {
    fn type_name(&self) -> &str {
        "ExposureInfo"
    }

    fn has_method(&self, name: &str) -> bool {
        name == "clone" || info_method(name).is_some()
    }

    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        match info_method(method) {
            Some(("get", slot)) => Ok(self.get(slot)),
            Some(("has", slot)) => Ok(Value::Bool(self.has(slot))),
            Some((_, slot)) => {
                expect_arity(method, args, 1)?;
                self.set(slot, args[0].clone());
                Ok(Value::None)
            }
            None if method == "clone" => Ok(Value::Handle(NativeHandle::new(self.copy()))),
            None => Err(no_method(self.type_name(), method)),
        }
    }

    fn describe(&self) -> String {
        "<lsst.afw.image.ExposureInfo; proxy of <Swig Object of type 'boost::shared_ptr< lsst::afw::image::ExposureInfo > *'>>"
            .to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// ============================================================================
// Exposure
// ============================================================================

const EXPOSURE_METHODS: &[&str] = &[
    "getMaskedImage", "setMaskedImage", "getInfo", "getWidth", "getHeight", "getX0", "getY0", "getXY0", "setXY0", "getBBox",
    "getDimensions", "clone",
];

const EXPOSURE_PROTOTYPES: &[&str] = &[
    "lsst::afw::image::Exposure< ImageT,MaskT,VarianceT >::Exposure(unsigned int,unsigned int,CONST_PTR(lsst::afw::geom::SkyWcs))",
    "lsst::afw::image::Exposure< ImageT,MaskT,VarianceT >::Exposure(lsst::geom::Extent2I const &,CONST_PTR(lsst::afw::geom::SkyWcs))",
    "lsst::afw::image::Exposure< ImageT,MaskT,VarianceT >::Exposure(lsst::geom::Box2I const &,CONST_PTR(lsst::afw::geom::SkyWcs))",
    "lsst::afw::image::Exposure< ImageT,MaskT,VarianceT >::Exposure(MaskedImageT &,CONST_PTR(lsst::afw::geom::SkyWcs))",
];

/// A masked image plus a shared [`ExposureInfo`].
#[derive(Debug)]
pub struct Exposure {
    name: String,
    dtype: DType,
    masked_image: RefCell<NativeHandle>,
    info: NativeHandle,
}

impl Exposure {
    /// Wrap an existing masked image
    pub fn from_masked_image(masked_image: NativeHandle, dtype: DType) -> Self {
        Self::with_info(masked_image, dtype, ExposureInfo::new())
    }

    fn with_info(masked_image: NativeHandle, dtype: DType, info: ExposureInfo) -> Self {
        Self {
            name: format!("Exposure{}", dtype.suffix()),
            dtype,
            masked_image: RefCell::new(masked_image),
            info: NativeHandle::new(info),
        }
    }

    /// Overloaded constructor of `Exposure{F,D,I}`; accepts a `wcs` keyword
    pub fn construct(dtype: DType, args: &[Value], keywords: &Keywords) -> ForeignResult<Self> {
        let ctor = format!("new_Exposure{}", dtype.suffix());
        for key in keywords.keys() {
            if key != "wcs" {
                return Err(ForeignError::type_error(format!(
                    "{}() got an unexpected keyword argument '{}'",
                    ctor, key
                )));
            }
        }

        let (exposure, rest) = match args {
            [Value::Handle(h), rest @ ..] if h.downcast_ref::<MaskedImage>().is_some() => {
                let mi = native::<MaskedImage>(&ctor, args, 0, "MaskedImage")?;
                if mi.dtype() != dtype {
                    return Err(argument_error(&ctor, 0, &format!("MaskedImage< {} > &", dtype)));
                }
                (Self::from_masked_image(h.clone(), dtype), rest)
            }
            _ => {
                let split = match args {
                    [Value::Int(_), Value::Int(_), ..] => 2,
                    [_, ..] => 1,
                    [] => 0,
                };
                let (geometry_args, rest) = args.split_at(split);
                let geometry = parse_geometry(&ctor, geometry_args)?
                    .ok_or_else(|| overload_error(&ctor, EXPOSURE_PROTOTYPES))?;
                let mi = MaskedImage::new(dtype, geometry.width, geometry.height, geometry.xy0);
                (Self::from_masked_image(NativeHandle::new(mi), dtype), rest)
            }
        };

        let wcs = match (rest, keywords.get("wcs")) {
            ([], None) => None,
            ([wcs], None) | ([], Some(wcs)) => Some(wcs.clone()),
            _ => return Err(overload_error(&ctor, EXPOSURE_PROTOTYPES)),
        };
        if let Some(wcs) = wcs {
            exposure.info()?.set("Wcs", wcs);
        }
        Ok(exposure)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    fn masked(&self) -> NativeHandle {
        self.masked_image.borrow().clone()
    }

    fn info(&self) -> ForeignResult<&ExposureInfo> {
        self.info
            .downcast_ref::<ExposureInfo>()
            .ok_or_else(|| ForeignError::new(ForeignErrorKind::Runtime, "corrupt exposure info"))
    }

    fn copy(&self) -> ForeignResult<Self> {
        let copy = self.masked().call("clone", &[])?;
        let handle = copy
            .as_handle()
            .cloned()
            .ok_or_else(|| ForeignError::new(ForeignErrorKind::Runtime, "clone returned no object"))?;
        Ok(Self::with_info(handle, self.dtype, self.info()?.copy()))
    }
}

impl NativeObject for Exposure {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn has_method(&self, name: &str) -> bool {
        EXPOSURE_METHODS.contains(&name) || info_method(name).is_some()
    }

    fn call(&self, method: &str, args: &[Value]) -> ForeignResult<Value> {
        if info_method(method).is_some() {
            return self.info.call(method, args);
        }
        match method {
            "getMaskedImage" => Ok(Value::Handle(self.masked())),
            "getInfo" => Ok(Value::Handle(self.info.clone())),
            "setMaskedImage" => {
                expect_arity(method, args, 1)?;
                let mi = native::<MaskedImage>(method, args, 0, "MaskedImage")?;
                if mi.dtype() != self.dtype {
                    return Err(argument_error(method, 0, &format!("MaskedImage< {} > &", self.dtype)));
                }
                if let Value::Handle(h) = &args[0] {
                    *self.masked_image.borrow_mut() = h.clone();
                }
                Ok(Value::None)
            }
            "clone" => Ok(Value::Handle(NativeHandle::new(self.copy()?))),
            "getWidth" | "getHeight" | "getX0" | "getY0" | "getXY0" | "setXY0" | "getBBox" | "getDimensions" => {
                self.masked().call(method, args)
            }
            _ => Err(no_method(&self.name, method)),
        }
    }

    fn describe(&self) -> String {
        format!(
            "<lsst.afw.image.{}; proxy of <Swig Object of type 'boost::shared_ptr< lsst::afw::image::Exposure< {} > > *'>>",
            self.name, self.dtype
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Free function `makeExposure(maskedImage[, wcs])`
pub fn make_exposure(args: &[Value]) -> ForeignResult<Value> {
    let mi = native::<MaskedImage>("makeExposure", args, 0, "MaskedImage")?;
    let mut keywords = Keywords::new();
    match args.get(1) {
        Some(wcs) if args.len() == 2 => {
            keywords.insert(SmolStr::new("wcs"), wcs.clone());
        }
        None => {}
        _ => return Err(overload_error("makeExposure", &["makeExposure(MaskedImageT &,CONST_PTR(SkyWcs))"])),
    }
    let exposure = Exposure::construct(mi.dtype(), &args[..1], &keywords)?;
    Ok(Value::Handle(NativeHandle::new(exposure)))
}
