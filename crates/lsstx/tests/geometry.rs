//! Integration tests for geometry construction and attribute access.

use lsstx::geom::{BOX, EXTENT, POINT};
use lsstx::{AdapterError, Args, Bridge, BridgeConfig, DType, TypeKey, Value, WrappedObject};
use lsstx_bridge::{ForeignLibrary, Keywords};
use lsstx_native::NativeLibrary;
use pretty_assertions::assert_eq;
use std::error::Error as _;

fn bridge() -> Bridge {
    Bridge::new().unwrap()
}

fn extent(bridge: &Bridge, x: impl Into<Value>, y: impl Into<Value>) -> WrappedObject {
    bridge.extent(Args::new().arg(x).arg(y)).unwrap()
}

fn point(bridge: &Bridge, x: impl Into<Value>, y: impl Into<Value>) -> WrappedObject {
    bridge.point(Args::new().arg(x).arg(y)).unwrap()
}

// ============================================================================
// Resolution
// ============================================================================

#[test]
fn test_extent_from_integers() {
    let bridge = bridge();
    let e = extent(&bridge, 3, 5);

    assert_eq!(e.class_name(), "Extent2I");
    assert_eq!(e.dtype(), DType::Int32);
    assert_eq!(e.dims(), 2);
    assert_eq!(e.get("x").unwrap(), Value::Int(3));
    assert_eq!(e.get("y").unwrap(), Value::Int(5));
    assert_eq!(e.handle().type_name(), "Extent2I");

    // Same state as a direct foreign construction
    let direct = NativeLibrary::new()
        .construct("Extent2I", &[Value::Int(3), Value::Int(5)], &Keywords::new())
        .unwrap();
    let equal = e.handle().call("equals", &[Value::Handle(direct)]).unwrap();
    assert_eq!(equal, Value::Bool(true));
}

#[test]
fn test_float_argument_selects_double() {
    let bridge = bridge();
    let e = extent(&bridge, 1.5, 2);
    assert_eq!(e.class_name(), "Extent2D");
    assert_eq!(e.get("y").unwrap(), Value::Float(2.0));

    let p = bridge.point(Args::new().args([1, 2, 3])).unwrap();
    assert_eq!(p.class_name(), "Point3I");
    assert_eq!(p.get_as::<i64>("z").unwrap(), 3);
}

#[test]
fn test_sequence_argument_is_flattened() {
    let bridge = bridge();
    let p = bridge.point(Args::new().arg(vec![0.5, 1.0, 2.0])).unwrap();
    assert_eq!(p.class_name(), "Point3D");
    assert_eq!(p.get("x").unwrap(), Value::Float(0.5));
}

#[test]
fn test_resolution_is_deterministic() {
    let bridge = bridge();
    let a = extent(&bridge, 3, 5);
    let b = extent(&bridge, 3, 5);
    assert_eq!(a.tag(), b.tag());
    assert!(std::rc::Rc::ptr_eq(a.class(), b.class()));
    assert!(!a.same_object(&b));
}

#[test]
fn test_every_registered_key_constructs() {
    let bridge = bridge();
    for role in [EXTENT, POINT] {
        let keys: Vec<TypeKey> = bridge.dispatcher().registry().role(role).unwrap().keys().collect();
        assert_eq!(keys.len(), 4);
        for key in keys {
            let obj = bridge.construct_exact(role, key, Args::new()).unwrap();
            assert_eq!(obj.dtype(), key.dtype);
            assert_eq!(obj.dims(), key.dims);
            assert_eq!(obj.role(), role);
        }
    }
}

#[test]
fn test_unsupported_dimensionality() {
    let bridge = bridge();
    let err = bridge.extent(Args::new().args([1, 2, 3, 4])).unwrap_err();
    match err {
        AdapterError::UnsupportedType { role, dtype, dims } => {
            assert_eq!(role, "extent");
            assert_eq!(dtype, Some(DType::Int32));
            assert_eq!(dims, Some(4));
        }
        other => panic!("expected UnsupportedType, got {:?}", other),
    }

    // A single scalar is one-dimensional unless dims are requested
    assert!(matches!(
        bridge.extent(Args::new().arg(42)),
        Err(AdapterError::UnsupportedType { dims: Some(1), .. })
    ));
    let square = bridge.extent(Args::new().arg(42).dims(2)).unwrap();
    assert_eq!(square.get("y").unwrap(), Value::Int(42));
}

#[test]
fn test_unsupported_explicit_dtype() {
    let bridge = bridge();
    let err = bridge
        .extent(Args::new().args([1, 2]).dtype(DType::Float32))
        .unwrap_err();
    assert!(err.is_type_error());
    assert!(err.to_string().contains("float32"));
}

#[test]
fn test_string_arguments_rejected() {
    let bridge = bridge();
    let err = bridge.point(Args::new().arg("a").arg("b")).unwrap_err();
    assert!(matches!(err, AdapterError::InvalidArguments { .. }));
}

#[test]
fn test_same_role_argument_needs_explicit_type() {
    let bridge = bridge();
    let e = extent(&bridge, 3, 5);
    let err = bridge.extent(Args::new().arg(&e)).unwrap_err();
    assert!(matches!(err, AdapterError::InvalidArguments { .. }));
    assert!(err.to_string().contains("deep_copy"));
}

#[test]
fn test_extent_seeded_from_point() {
    let bridge = bridge();
    let p = point(&bridge, 1.5, 4.0);
    let e = bridge.extent(Args::new().arg(&p)).unwrap();
    assert_eq!(e.class_name(), "Extent2D");
    assert_eq!(e.get("x").unwrap(), Value::Float(1.5));

    let back = bridge.point(Args::new().arg(&e)).unwrap();
    assert_eq!(back.class_name(), "Point2D");
}

#[test]
fn test_construct_exact_converts() {
    let bridge = bridge();
    let e = extent(&bridge, 3, 5);
    let d = bridge
        .construct_exact(EXTENT, TypeKey::new(DType::Float64, 2), Args::new().arg(&e))
        .unwrap();
    assert_eq!(d.class_name(), "Extent2D");
    assert_eq!(d.get("x").unwrap(), Value::Float(3.0));

    // Narrowing is refused by the foreign library
    let err = bridge
        .construct_exact(EXTENT, TypeKey::new(DType::Int32, 2), Args::new().arg(&d))
        .unwrap_err();
    assert!(err.is_foreign());
    assert!(err.to_string().contains("not implemented"));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_read_after_write() {
    let bridge = bridge();
    let e = extent(&bridge, 3, 5);
    e.set("x", 10).unwrap();
    assert_eq!(e.get("x").unwrap(), Value::Int(10));
    assert_eq!(e.get("y").unwrap(), Value::Int(5));
}

#[test]
fn test_read_only_property() {
    let bridge = bridge();
    let b = bridge
        .box2(Args::new().arg(point(&bridge, 1, 2)).arg(point(&bridge, 3, 4)))
        .unwrap();
    assert_eq!(b.class_name(), "Box2I");
    assert_eq!(b.get("area").unwrap(), Value::Int(9));

    let err = b.set("area", 4).unwrap_err();
    assert!(matches!(err, AdapterError::ImmutableAttribute { .. }));
    assert_eq!(b.get("area").unwrap(), Value::Int(9));
}

#[test]
fn test_unknown_attribute() {
    let bridge = bridge();
    let e = extent(&bridge, 3, 5);
    assert!(matches!(e.get("w"), Err(AdapterError::AttributeNotFound { .. })));
    assert!(matches!(e.set("w", 1), Err(AdapterError::AttributeNotFound { .. })));
    assert!(!e.has_attribute("w"));
    assert!(e.has_attribute("computeNorm"));
}

#[test]
fn test_foreign_rejection_keeps_state() {
    let bridge = bridge();
    let e = extent(&bridge, 3, 5);
    let err = e.set("x", 1.5).unwrap_err();
    assert!(err.is_foreign());
    assert!(matches!(
        &err,
        AdapterError::PropertyAccess { attribute, role, .. } if attribute == "x" && role == EXTENT
    ));
    assert!(err
        .to_string()
        .starts_with("write of attribute 'x' on Extent2I (role 'extent') failed"));
    assert_eq!(e.get("x").unwrap(), Value::Int(3));
}

#[test]
fn test_box_properties_are_adopted() {
    let bridge = bridge();
    let b = bridge
        .box2(Args::new().arg(point(&bridge, 0, 0)).arg(extent(&bridge, 4, 3)))
        .unwrap();
    let min = b.get_as::<WrappedObject>("min").unwrap();
    assert_eq!(min.class_name(), "Point2I");
    let dims = b.get_as::<WrappedObject>("dimensions").unwrap();
    assert_eq!(dims.get("x").unwrap(), Value::Int(4));
    assert_eq!(b.get("max_y").unwrap(), Value::Int(2));

    let d = bridge
        .box2(Args::new().arg(point(&bridge, 0.5, 0.5)).arg(point(&bridge, 2.5, 1.5)))
        .unwrap();
    assert_eq!(d.class_name(), "Box2D");
    assert_eq!(d.role(), BOX);
}

#[test]
fn test_box_corners_and_set_operations() {
    let bridge = bridge();
    let b = bridge
        .box2(Args::new().arg(point(&bridge, 0, 0)).arg(extent(&bridge, 4, 4)))
        .unwrap();
    let corners = b.get("corners").unwrap();
    let corners = corners.as_list().unwrap();
    assert_eq!(corners.len(), 4);
    let far = corners[2].as_object().unwrap();
    assert_eq!(far.class_name(), "Point2I");
    assert_eq!((far.get("x").unwrap(), far.get("y").unwrap()), (Value::Int(3), Value::Int(3)));

    let inner = bridge
        .box2(Args::new().arg(point(&bridge, 1, 1)).arg(extent(&bridge, 2, 2)))
        .unwrap();
    assert_eq!(b.call("contains", &[Value::from(&inner)]).unwrap(), Value::Bool(true));
    assert_eq!(inner.call("contains", &[Value::from(&b)]).unwrap(), Value::Bool(false));
    assert_eq!(b.call("overlaps", &[Value::from(&inner)]).unwrap(), Value::Bool(true));

    let shifted = bridge
        .box2(Args::new().arg(point(&bridge, 2, 3)).arg(extent(&bridge, 5, 5)))
        .unwrap();
    b.call("clip", &[Value::from(&shifted)]).unwrap();
    assert_eq!(b.get("min").unwrap().to_string(), "Point2I(2, 3)");
    assert_eq!(b.get("area").unwrap(), Value::Int(2));

    b.call("include", &[Value::from(&point(&bridge, -1, 0))]).unwrap();
    assert_eq!(b.get("min").unwrap().to_string(), "Point2I(-1, 0)");

    b.call("flipLR", &[Value::Int(10)]).unwrap();
    assert_eq!(b.get("min_x").unwrap(), Value::Int(6));
    assert_eq!(b.get("max_x").unwrap(), Value::Int(10));
    b.call("flipTB", &[Value::Int(4)]).unwrap();
    assert_eq!((b.get("min_y").unwrap(), b.get("max_y").unwrap()), (Value::Int(0), Value::Int(3)));
}

// ============================================================================
// Delegation
// ============================================================================

#[test]
fn test_delegated_method() {
    let bridge = bridge();
    let e = extent(&bridge, 3.0, 4.0);
    assert_eq!(e.call("computeNorm", &[]).unwrap(), Value::Float(5.0));
    assert_eq!(e.get("computeSquaredNorm").unwrap(), Value::Float(25.0));
}

#[test]
fn test_foreign_failure_hides_detail() {
    let bridge = bridge();
    let e = extent(&bridge, 3, 4);
    let err = e.call("computeNorm", &[]).unwrap_err();
    assert!(err.is_foreign());
    let message = err.to_string();
    assert!(message.contains("Extent2I.computeNorm"));
    assert!(!message.contains("in method"));

    let source = err.source().unwrap().to_string();
    assert!(source.contains("integer"));
}

#[test]
fn test_delegated_result_is_adopted() {
    let bridge = bridge();
    let p = point(&bridge, 1, 2);
    let sum = p.call("add", &[Value::from(&extent(&bridge, 3, 5))]).unwrap();
    let sum = sum.as_object().unwrap();
    assert_eq!(sum.class_name(), "Point2I");
    assert_eq!(sum.get("y").unwrap(), Value::Int(7));
}

#[test]
fn test_coordinate_expression() {
    let bridge = bridge();
    let small = point(&bridge, 1, 2);
    let large = point(&bridge, 3, 1);
    let lt = small.call("lt", &[Value::from(&large)]).unwrap().into_object().unwrap();
    assert_eq!(lt.class_name(), "CoordinateExpr2");
    assert_eq!(lt.get("x").unwrap(), Value::Bool(true));
    assert_eq!(lt.get("y").unwrap(), Value::Bool(false));
    assert_eq!(lt.call("all", &[]).unwrap(), Value::Bool(false));
    assert_eq!(lt.call("any", &[]).unwrap(), Value::Bool(true));

    lt.set("y", 1).unwrap();
    assert_eq!(lt.call("all", &[]).unwrap(), Value::Bool(true));
}

#[test]
fn test_strict_config_disables_delegation() {
    let bridge = Bridge::with_config(BridgeConfig::strict()).unwrap();
    let e = extent(&bridge, 3.0, 4.0);
    assert!(matches!(e.call("computeNorm", &[]), Err(AdapterError::AttributeNotFound { .. })));
    assert_eq!(e.get("x").unwrap(), Value::Float(3.0));
}

// ============================================================================
// Copy, equality, sequence and repr
// ============================================================================

#[test]
fn test_equality_and_copy() {
    let bridge = bridge();
    let a = extent(&bridge, 3, 5);
    let b = extent(&bridge, 3, 5);
    assert_eq!(a, b);
    assert_ne!(a, extent(&bridge, 5, 3));
    assert_ne!(a, point(&bridge, 3, 5));

    let copy = a.deep_copy().unwrap();
    assert!(!copy.same_object(&a));
    copy.set("x", 0).unwrap();
    assert_eq!(a.get("x").unwrap(), Value::Int(3));
}

#[test]
fn test_sequence_access() {
    let bridge = bridge();
    let p = bridge.point(Args::new().args([4, 5, 6])).unwrap();
    assert_eq!(p.len().unwrap(), 3);
    assert_eq!(p.get_index(2).unwrap(), Value::Int(6));
    p.set_index(0, 9).unwrap();
    assert_eq!(
        p.to_list().unwrap(),
        vec![Value::Int(9), Value::Int(5), Value::Int(6)]
    );
    assert!(p.get_index(3).unwrap_err().is_foreign());
}

#[test]
fn test_repr() {
    let bridge = bridge();
    insta::assert_snapshot!(extent(&bridge, 3, 5).repr().unwrap(), @"Extent2I(3, 5)");
    insta::assert_snapshot!(
        bridge.point(Args::new().args([0.5, 1.0, 2.0])).unwrap().to_string(),
        @"Point3D(0.5, 1.0, 2.0)"
    );

    let b = bridge
        .box2(Args::new().arg(point(&bridge, 1, 2)).arg(point(&bridge, 3, 4)))
        .unwrap();
    insta::assert_snapshot!(b.repr().unwrap(), @"Box2I(min=Point2I(1, 2), max=Point2I(3, 4))");
}

#[test]
fn test_repr_truncated() {
    let config = BridgeConfig {
        repr_max_len: 12,
        ..BridgeConfig::default()
    };
    let bridge = Bridge::with_config(config).unwrap();
    let p = bridge.point(Args::new().args([100.25, 200.5, 300.75])).unwrap();
    let text = p.repr().unwrap();
    assert_eq!(text.chars().count(), 12);
    assert!(text.ends_with("..."));
}
