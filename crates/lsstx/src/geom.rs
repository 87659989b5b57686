//! Geometry roles: extents, points, coordinate expressions and boxes.

use std::rc::Rc;

use lsstx_bridge::{
    to_bool, AdapterClass, AdapterResult, DType, DTypeRule, DimsRule, Equality, PropertyBinder, PropertySpec,
    ReprStyle, RoleBuilder, TypeKey,
};

pub const EXTENT: &str = "extent";
pub const POINT: &str = "point";
pub const COORDINATE_EXPR: &str = "coordinate_expr";
pub const BOX: &str = "box";

/// Components shared by every 2-D and 3-D coordinate
pub const XY: &[PropertySpec] = &[
    PropertySpec::read_write("x", "getX", "setX"),
    PropertySpec::read_write("y", "getY", "setY"),
];

/// Extra component of 3-D coordinates
pub const Z: &[PropertySpec] = &[PropertySpec::read_write("z", "getZ", "setZ")];

pub const BOOL_XY: &[PropertySpec] = &[
    PropertySpec::read_write("x", "getX", "setX").with_read(to_bool).with_write(to_bool),
    PropertySpec::read_write("y", "getY", "setY").with_read(to_bool).with_write(to_bool),
];

pub const BOOL_Z: &[PropertySpec] = &[PropertySpec::read_write("z", "getZ", "setZ")
    .with_read(to_bool)
    .with_write(to_bool)];

pub const BOX_PROPERTIES: &[PropertySpec] = &[
    PropertySpec::read_only("min", "getMin"),
    PropertySpec::read_only("max", "getMax"),
    PropertySpec::read_only("dimensions", "getDimensions"),
    PropertySpec::read_only("width", "getWidth"),
    PropertySpec::read_only("height", "getHeight"),
    PropertySpec::read_only("area", "getArea"),
    PropertySpec::read_only("center", "getCenter"),
    PropertySpec::read_only("center_x", "getCenterX"),
    PropertySpec::read_only("center_y", "getCenterY"),
    PropertySpec::read_only("min_x", "getMinX"),
    PropertySpec::read_only("min_y", "getMinY"),
    PropertySpec::read_only("max_x", "getMaxX"),
    PropertySpec::read_only("max_y", "getMaxY"),
    PropertySpec::read_only("empty", "isEmpty"),
    PropertySpec::read_only("corners", "getCorners"),
];

const COORDINATE_REPR: ReprStyle = ReprStyle::Coordinates(&["x", "y", "z"]);

const COORD_KEYS: [(DType, usize); 4] = [
    (DType::Int32, 2),
    (DType::Float64, 2),
    (DType::Int32, 3),
    (DType::Float64, 3),
];

fn coordinate_class(name: &str, role: &str, dims: usize, base: &[PropertySpec], z: &[PropertySpec]) -> AdapterResult<Rc<AdapterClass>> {
    let mut binder = PropertyBinder::new(name, role).bind(base);
    if dims == 3 {
        binder = binder.bind(z);
    }
    binder
        .repr(COORDINATE_REPR)
        .equality(Equality::Foreign("equals"))
        .sequence()
        .build()
}

/// `Extent{2,3}{I,D}`; integer literals select `I`, any float selects `D`
pub fn extent_role() -> AdapterResult<RoleBuilder> {
    coordinate_role(EXTENT, "Extent", POINT)
}

/// `Point{2,3}{I,D}`, inferred like extents
pub fn point_role() -> AdapterResult<RoleBuilder> {
    coordinate_role(POINT, "Point", EXTENT)
}

fn coordinate_role(role: &str, family: &str, seed: &str) -> AdapterResult<RoleBuilder> {
    let mut builder = RoleBuilder::typed(role)
        .dtype_rule(DTypeRule::Infer {
            integer: DType::Int32,
            float: DType::Float64,
        })
        .dims_rule(DimsRule::Coordinates)
        .seeded_by(seed);
    for (dtype, dims) in COORD_KEYS {
        let name = format!("{}{}{}", family, dims, dtype.suffix());
        let class = coordinate_class(&name, role, dims, XY, Z)?;
        builder = builder.register_typed(TypeKey::new(dtype, dims), &name, class);
    }
    Ok(builder)
}

/// `CoordinateExpr{2,3}`, the result of element-wise comparisons
pub fn coordinate_expr_role() -> AdapterResult<RoleBuilder> {
    let mut builder = RoleBuilder::typed(COORDINATE_EXPR).dims_rule(DimsRule::Coordinates);
    for dims in [2, 3] {
        let name = format!("CoordinateExpr{}", dims);
        let class = coordinate_class(&name, COORDINATE_EXPR, dims, BOOL_XY, BOOL_Z)?;
        builder = builder.register_typed(TypeKey::new(DType::Bool, dims), &name, class);
    }
    Ok(builder)
}

/// `Box2I` / `Box2D`, built from two points or a point and an extent
pub fn box_role() -> AdapterResult<RoleBuilder> {
    let mut builder = RoleBuilder::typed(BOX)
        .dtype_rule(DTypeRule::Infer {
            integer: DType::Int32,
            float: DType::Float64,
        })
        .dims_rule(DimsRule::Fixed(2));
    for dtype in [DType::Int32, DType::Float64] {
        let name = format!("Box2{}", dtype.suffix());
        let class = PropertyBinder::new(name.as_str(), BOX)
            .bind(BOX_PROPERTIES)
            .repr(ReprStyle::Fields(&["min", "max"]))
            .equality(Equality::Foreign("equals"))
            .build()?;
        builder = builder.register_typed(TypeKey::new(dtype, 2), &name, class);
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsstx_bridge::{DispatchPolicy, TypeRegistry};

    #[test]
    fn test_coordinate_roles_register_all_variants() {
        let registry = TypeRegistry::builder()
            .role(extent_role().unwrap())
            .and_then(|b| b.role(point_role().unwrap()))
            .unwrap()
            .build();

        let extent = registry.role(EXTENT).unwrap();
        assert_eq!(extent.policy(), DispatchPolicy::Typed);
        assert_eq!(extent.keys().count(), 4);
        assert!(extent.is_seeded_by(POINT));

        let p3 = registry.descriptor(POINT, TypeKey::new(DType::Float64, 3)).unwrap();
        assert_eq!(p3.constructor(), "Point3D");
        assert_eq!(p3.class().property_names(), vec!["x", "y", "z"]);

        let e2 = registry.descriptor_for_foreign("Extent2I").unwrap();
        assert_eq!(e2.class().property_names(), vec!["x", "y"]);
    }

    #[test]
    fn test_box_properties_are_read_only() {
        let role = box_role().unwrap();
        let registry = TypeRegistry::builder().role(role).unwrap().build();
        let class = registry.descriptor_for_foreign("Box2D").unwrap().class();
        assert!(class.properties().all(|p| !p.is_writable()));
    }
}
