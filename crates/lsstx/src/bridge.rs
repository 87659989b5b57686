//! One construction entry point per role.

use std::rc::Rc;

use lsstx_bridge::{
    summarize_args, AdapterError, AdapterResult, Args, BridgeConfig, Dispatcher, ForeignLibrary, NativeHandle,
    TypeKey, TypeRegistry, Value, WrappedObject,
};
use lsstx_native::NativeLibrary;
use tracing::debug;

use crate::geom::{box_role, coordinate_expr_role, extent_role, point_role, BOX, COORDINATE_EXPR, EXTENT, POINT};
use crate::image::{
    exposure_info_role, exposure_role, image_role, masked_image_role, ImageOrigin, EXPOSURE, EXPOSURE_INFO, IMAGE,
    MASKED_IMAGE,
};

/// Registry with every geometry and image role
pub fn registry() -> AdapterResult<TypeRegistry> {
    Ok(TypeRegistry::builder()
        .role(extent_role()?)?
        .role(point_role()?)?
        .role(coordinate_expr_role()?)?
        .role(box_role()?)?
        .role(image_role()?)?
        .role(masked_image_role()?)?
        .role(exposure_role()?)?
        .role(exposure_info_role()?)?
        .build())
}

/// Entry point for constructing wrapped geometry and image objects.
///
/// ```
/// use lsstx::{Args, Bridge, Value};
///
/// let bridge = Bridge::new().unwrap();
/// let extent = bridge.extent(Args::new().arg(3).arg(5)).unwrap();
/// assert_eq!(extent.class_name(), "Extent2I");
/// assert_eq!(extent.get("y").unwrap(), Value::Int(5));
/// ```
#[derive(Clone)]
pub struct Bridge {
    dispatcher: Dispatcher,
}

impl Bridge {
    /// Bridge over the native library with the default configuration
    pub fn new() -> AdapterResult<Self> {
        Self::with_config(BridgeConfig::default())
    }

    /// Bridge over the native library
    pub fn with_config(config: BridgeConfig) -> AdapterResult<Self> {
        Self::with_library(Rc::new(NativeLibrary::new()), config)
    }

    /// Bridge over any library exposing the same class names
    pub fn with_library(library: Rc<dyn ForeignLibrary>, config: BridgeConfig) -> AdapterResult<Self> {
        let registry = registry()?;
        debug!(roles = registry.role_names().count(), "bridge registry built");
        Ok(Self {
            dispatcher: Dispatcher::with_config(library, registry, config)?,
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// `Extent2I(3, 5)`, `Extent3D(1.5, 2, 0)`, `Extent2I(point)`, ...
    pub fn extent(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(EXTENT, args)
    }

    /// `Point2I(1, 2)`, `Point3D([0.5, 1, 2])`, `Point2I(extent)`, ...
    pub fn point(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(POINT, args)
    }

    pub fn coordinate_expr(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(COORDINATE_EXPR, args)
    }

    /// `Box2I(min, max)` or `Box2I(corner, dimensions)`; floating corners give `Box2D`
    pub fn box2(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(BOX, args)
    }

    /// `Image{F,D,I,U}` from `(width, height)`, an extent, a box or a pixel array
    pub fn image(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(IMAGE, args)
    }

    pub fn masked_image(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(MASKED_IMAGE, args)
    }

    /// `Exposure{F,D,I}`; pass the WCS as a `wcs` keyword
    pub fn exposure(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(EXPOSURE, args)
    }

    /// `ExposureInfo` from `wcs`, `psf`, `calib`, `filter`, `detector`,
    /// `metadata` and `coadd_inputs` keywords; copy an existing one with
    /// `deep_copy`
    pub fn exposure_info(&self, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct(EXPOSURE_INFO, args)
    }

    /// Construct a specific concrete type of a role, e.g. `Extent2D(extent2i)`
    pub fn construct_exact(&self, role: &str, key: TypeKey, args: Args) -> AdapterResult<WrappedObject> {
        self.dispatcher.construct_exact(role, key, args)
    }

    /// Exposure around an existing masked image, sharing its pixels
    pub fn make_exposure(&self, masked_image: &WrappedObject, wcs: Option<Value>) -> AdapterResult<WrappedObject> {
        let mut args = vec![Value::from(masked_image)];
        args.extend(wcs);
        let result = self.dispatcher.call_function("makeExposure", &args)?;
        let type_name = result.type_name().to_string();
        result
            .into_object()
            .ok_or_else(|| AdapterError::conversion(EXPOSURE, type_name))
    }

    /// Bounding box of an image, masked image or exposure, placed at its
    /// `xy0` or at the origin
    pub fn bbox_with_origin(&self, obj: &WrappedObject, origin: ImageOrigin) -> AdapterResult<WrappedObject> {
        let args = [Value::Int(origin.code())];
        let result = obj.handle().call("getBBox", &args).map_err(|e| {
            AdapterError::foreign_call(obj.class_name(), "getBBox", summarize_args(&args), e)
        })?;
        match result {
            Value::Handle(handle) => self.wrap(handle),
            other => Err(AdapterError::conversion(BOX, other.type_name())),
        }
    }

    /// Adapter for a handle obtained outside the bridge
    pub fn wrap(&self, handle: NativeHandle) -> AdapterResult<WrappedObject> {
        self.dispatcher.wrap(handle)
    }
}
