//! Integration tests driving the native library through its constructor table.

use lsstx_bridge::{DType, ForeignErrorKind, ForeignLibrary, Keywords, NativeHandle, Value};
use lsstx_native::{NativeLibrary, CONSTRUCTORS};
use pretty_assertions::assert_eq;

fn construct(class: &str, args: &[Value]) -> NativeHandle {
    NativeLibrary::new().construct(class, args, &Keywords::new()).unwrap()
}

#[test]
fn test_constructor_table_is_unique() {
    let mut names = CONSTRUCTORS.to_vec();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), CONSTRUCTORS.len());
}

#[test]
fn test_point_plus_extent() {
    let p = construct("Point2I", &[Value::Int(1), Value::Int(2)]);
    let e = construct("Extent2I", &[Value::Int(3), Value::Int(5)]);
    let sum = p.call("add", &[Value::Handle(e.clone())]).unwrap();
    let sum = sum.as_handle().unwrap();
    assert_eq!(sum.type_name(), "Point2I");
    assert_eq!(sum.call("getY", &[]).unwrap(), Value::Int(7));

    // Point + Point has no meaning
    let err = p.call("add", &[Value::Handle(p.clone())]).unwrap_err();
    assert_eq!(err.kind, ForeignErrorKind::Type);
}

#[test]
fn test_overload_error_keeps_prototypes_in_detail() {
    let err = NativeLibrary::new()
        .construct("Extent2I", &[Value::from("x"), Value::Int(1), Value::Int(2)], &Keywords::new())
        .unwrap_err();
    assert_eq!(err.kind, ForeignErrorKind::Type);
    assert!(!err.message.contains("CoordinateBase"));
    assert!(err.detail.unwrap().contains("CoordinateBase"));
}

#[test]
fn test_box_from_corner_and_extent() {
    let corner = construct("Point2I", &[Value::Int(2), Value::Int(3)]);
    let size = construct("Extent2I", &[Value::Int(4), Value::Int(2)]);
    let bbox = construct("Box2I", &[Value::Handle(corner), Value::Handle(size)]);
    assert_eq!(bbox.call("getMaxX", &[]).unwrap(), Value::Int(5));
    assert_eq!(bbox.call("getMaxY", &[]).unwrap(), Value::Int(4));
    assert_eq!(bbox.call("getArea", &[]).unwrap(), Value::Int(8));

    let image = construct("ImageD", &[Value::Handle(bbox)]);
    assert_eq!(image.call("getX0", &[]).unwrap(), Value::Int(2));
    assert_eq!(image.call("getWidth", &[]).unwrap(), Value::Int(4));
}

#[test]
fn test_image_assign_block() {
    let image = construct("ImageI", &[Value::Int(3), Value::Int(2), Value::Int(1)]);
    let block = lsstx_bridge::PixelArray::filled(1, 2, DType::Int32, 8.0);
    image
        .call("assignArray", &[Value::Int(1), Value::Int(1), Value::Array(block.clone())])
        .unwrap();
    let array = image.call("getArray", &[]).unwrap();
    assert_eq!(
        array.as_array().unwrap().to_rows(),
        vec![vec![1.0, 1.0, 1.0], vec![1.0, 8.0, 8.0]]
    );

    let err = image
        .call("assignArray", &[Value::Int(1), Value::Int(2), Value::Array(block)])
        .unwrap_err();
    assert_eq!(err.kind, ForeignErrorKind::Index);
}

#[test]
fn test_make_exposure_function() {
    let library = NativeLibrary::new();
    let mi = construct("MaskedImageF", &[Value::Int(2), Value::Int(2)]);
    let exposure = library
        .call_function("makeExposure", &[Value::Handle(mi.clone())])
        .unwrap();
    let exposure = exposure.as_handle().unwrap();
    assert_eq!(exposure.type_name(), "ExposureF");
    assert_eq!(exposure.call("hasWcs", &[]).unwrap(), Value::Bool(false));
    let inner = exposure.call("getMaskedImage", &[]).unwrap();
    assert!(inner.as_handle().unwrap().same_object(&mi));
}
