//! Image roles: images, masked images, exposures and exposure info.
//!
//! The pixel-bearing roles are generic-return: one adapter class per role,
//! with the concrete pixel type recorded on each instance's tag. Without an
//! explicit dtype, the configured default (else the first registration) is
//! used. Exposure info is not templated on a pixel type and has a typed class
//! of its own.

use std::rc::Rc;

use lsstx_bridge::{
    AdapterClass, AdapterResult, BufferAccess, DType, DTypeRule, DimsRule, PropertyBinder, PropertySpec, ReprStyle,
    RoleBuilder, TypeKey, WrappedObject,
};

pub const IMAGE: &str = "image";
pub const MASKED_IMAGE: &str = "masked_image";
pub const EXPOSURE: &str = "exposure";
pub const EXPOSURE_INFO: &str = "exposure_info";

/// The single registration of `ExposureInfo`; the dtype is nominal
pub const EXPOSURE_INFO_KEY: TypeKey = TypeKey::new(DType::Float64, 0);

/// Geometry shared by every image-like class
pub const GEOMETRY: &[PropertySpec] = &[
    PropertySpec::read_only("width", "getWidth"),
    PropertySpec::read_only("height", "getHeight"),
    PropertySpec::read_only("dimensions", "getDimensions"),
    PropertySpec::read_only("bbox", "getBBox"),
    PropertySpec::read_write("xy0", "getXY0", "setXY0"),
    PropertySpec::read_only("x0", "getX0"),
    PropertySpec::read_only("y0", "getY0"),
];

pub const IMAGE_PROPERTIES: &[PropertySpec] = &[PropertySpec::read_only("array", "getArray")];

pub const MASKED_IMAGE_PROPERTIES: &[PropertySpec] = &[
    PropertySpec::read_only("image", "getImage"),
    PropertySpec::read_only("mask", "getMask"),
    PropertySpec::read_only("variance", "getVariance"),
    PropertySpec::read_only("arrays", "getArrays"),
];

pub const EXPOSURE_PROPERTIES: &[PropertySpec] = &[
    PropertySpec::read_write("masked_image", "getMaskedImage", "setMaskedImage"),
    PropertySpec::read_only("info", "getInfo"),
    PropertySpec::read_write("wcs", "getWcs", "setWcs"),
    PropertySpec::read_write("psf", "getPsf", "setPsf"),
    PropertySpec::read_write("calib", "getCalib", "setCalib"),
    PropertySpec::read_write("filter", "getFilter", "setFilter"),
    PropertySpec::read_write("detector", "getDetector", "setDetector"),
    PropertySpec::read_write("metadata", "getMetadata", "setMetadata"),
];

pub const EXPOSURE_INFO_PROPERTIES: &[PropertySpec] = &[
    PropertySpec::read_write("wcs", "getWcs", "setWcs"),
    PropertySpec::read_write("psf", "getPsf", "setPsf"),
    PropertySpec::read_write("calib", "getCalib", "setCalib"),
    PropertySpec::read_write("filter", "getFilter", "setFilter"),
    PropertySpec::read_write("detector", "getDetector", "setDetector"),
    PropertySpec::read_write("metadata", "getMetadata", "setMetadata"),
    PropertySpec::read_write("coadd_inputs", "getCoaddInputs", "setCoaddInputs"),
];

/// Masked image planes, in index order
pub const PLANES: &[&str] = &["getImage", "getMask", "getVariance"];

/// `Name(dtype, WxH, xy0=(x0, y0))`
fn summary_repr(obj: &WrappedObject) -> AdapterResult<String> {
    Ok(format!(
        "{}({}, {}x{}, xy0=({}, {}))",
        obj.class_name(),
        obj.dtype(),
        obj.get("width")?,
        obj.get("height")?,
        obj.get("x0")?,
        obj.get("y0")?
    ))
}

/// `ExposureInfo(wcs='TAN', calib=27.0)`, listing only the slots that are set
fn info_repr(obj: &WrappedObject) -> AdapterResult<String> {
    let mut parts = Vec::new();
    for spec in EXPOSURE_INFO_PROPERTIES {
        let value = obj.get(spec.name)?;
        if !value.is_none() {
            parts.push(format!("{}={}", spec.name, value));
        }
    }
    Ok(format!("{}({})", obj.class_name(), parts.join(", ")))
}

/// Where the box returned by [`Bridge::bbox_with_origin`](crate::Bridge::bbox_with_origin) is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// At the image's `xy0`, in the parent image's pixel frame
    Parent,
    /// At `(0, 0)`
    Local,
}

impl ImageOrigin {
    /// Enumerator value understood by the foreign `getBBox`
    pub fn code(self) -> i64 {
        match self {
            ImageOrigin::Parent => 0,
            ImageOrigin::Local => 1,
        }
    }
}

fn image_class() -> AdapterResult<Rc<AdapterClass>> {
    PropertyBinder::new("Image", IMAGE)
        .bind(GEOMETRY)
        .bind(IMAGE_PROPERTIES)
        .repr(ReprStyle::Custom(summary_repr))
        .buffer(BufferAccess::Single {
            read: "getArray",
            write: "assignArray",
        })
        .build()
}

fn masked_image_class() -> AdapterResult<Rc<AdapterClass>> {
    PropertyBinder::new("MaskedImage", MASKED_IMAGE)
        .bind(GEOMETRY)
        .bind(MASKED_IMAGE_PROPERTIES)
        .repr(ReprStyle::Custom(summary_repr))
        .buffer(BufferAccess::Planes {
            planes: PLANES,
            read: "getArray",
            write: "assignArray",
        })
        .build()
}

fn exposure_class() -> AdapterResult<Rc<AdapterClass>> {
    PropertyBinder::new("Exposure", EXPOSURE)
        .bind(GEOMETRY)
        .bind(EXPOSURE_PROPERTIES)
        .repr(ReprStyle::Custom(summary_repr))
        .build()
}

fn exposure_info_class() -> AdapterResult<Rc<AdapterClass>> {
    PropertyBinder::new("ExposureInfo", EXPOSURE_INFO)
        .bind(EXPOSURE_INFO_PROPERTIES)
        .repr(ReprStyle::Custom(info_repr))
        .build()
}

fn image_family(role: &str, class: Rc<AdapterClass>, family: &str, dtypes: &[DType]) -> RoleBuilder {
    let mut builder = RoleBuilder::generic(role, class)
        .dtype_rule(DTypeRule::Keyword)
        .dims_rule(DimsRule::Fixed(2));
    for &dtype in dtypes {
        let constructor = format!("{}{}", family, dtype.suffix());
        builder = builder.register(TypeKey::new(dtype, 2), &constructor);
    }
    builder
}

/// `Image{F,D,I,U}`
pub fn image_role() -> AdapterResult<RoleBuilder> {
    Ok(image_family(
        IMAGE,
        image_class()?,
        "Image",
        &[DType::Float32, DType::Float64, DType::Int32, DType::UInt16],
    ))
}

/// `MaskedImage{F,D,I}`; an image adapter seeds the pixel type
pub fn masked_image_role() -> AdapterResult<RoleBuilder> {
    Ok(image_family(
        MASKED_IMAGE,
        masked_image_class()?,
        "MaskedImage",
        &[DType::Float32, DType::Float64, DType::Int32],
    )
    .seeded_by(IMAGE))
}

/// `Exposure{F,D,I}`; a masked image adapter seeds the pixel type
pub fn exposure_role() -> AdapterResult<RoleBuilder> {
    Ok(image_family(
        EXPOSURE,
        exposure_class()?,
        "Exposure",
        &[DType::Float32, DType::Float64, DType::Int32],
    )
    .seeded_by(MASKED_IMAGE))
}

/// `ExposureInfo`, built from `wcs`, `psf`, ..., `coadd_inputs` keywords
pub fn exposure_info_role() -> AdapterResult<RoleBuilder> {
    Ok(RoleBuilder::typed(EXPOSURE_INFO)
        .dims_rule(DimsRule::Fixed(EXPOSURE_INFO_KEY.dims))
        .register_typed(EXPOSURE_INFO_KEY, "ExposureInfo", exposure_info_class()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsstx_bridge::{DispatchPolicy, TypeRegistry};

    #[test]
    fn test_generic_roles_share_one_class() {
        let registry = TypeRegistry::builder()
            .role(image_role().unwrap())
            .and_then(|b| b.role(exposure_role().unwrap()))
            .unwrap()
            .build();

        let role = registry.role(EXPOSURE).unwrap();
        assert_eq!(role.policy(), DispatchPolicy::Generic);
        assert_eq!(role.default_dtype(), Some(DType::Float32));

        let f = registry.descriptor_for_foreign("ImageF").unwrap();
        let u = registry.descriptor_for_foreign("ImageU").unwrap();
        assert!(Rc::ptr_eq(f.class(), u.class()));
        assert_eq!(u.key(), TypeKey::new(DType::UInt16, 2));
    }

    #[test]
    fn test_masked_image_has_three_planes() {
        let class = masked_image_class().unwrap();
        match class.buffer() {
            Some(BufferAccess::Planes { planes, .. }) => assert_eq!(planes.len(), 3),
            other => panic!("expected planes, got {:?}", other),
        }
        assert!(class.property("mask").is_some());
        assert!(!class.property("variance").unwrap().is_writable());
        assert!(!class.property("arrays").unwrap().is_writable());
    }

    #[test]
    fn test_exposure_info_role() {
        let registry = TypeRegistry::builder()
            .role(exposure_info_role().unwrap())
            .unwrap()
            .build();
        let role = registry.role(EXPOSURE_INFO).unwrap();
        assert_eq!(role.policy(), DispatchPolicy::Typed);
        assert_eq!(role.keys().collect::<Vec<_>>(), vec![EXPOSURE_INFO_KEY]);

        let info = registry.descriptor_for_foreign("ExposureInfo").unwrap();
        assert_eq!(info.class().property_names().len(), 7);
        assert!(info.class().properties().all(|p| p.is_writable()));
    }

    #[test]
    fn test_image_origin_codes() {
        assert_eq!(ImageOrigin::Parent.code(), 0);
        assert_eq!(ImageOrigin::Local.code(), 1);
    }
}
