//! Value type tests

use pretty_assertions::assert_eq;
use protovalue::*;

#[test]
fn test_scalar_values() {
    assert_eq!(Value::Bool(true), Value::Bool(true));
    assert_ne!(Value::I32(42), Value::I32(43));

    // Same number, different kind
    assert_ne!(Value::I32(42), Value::I64(42));
    assert_ne!(Value::U32(1), Value::I32(1));

    assert_eq!(Value::F64(2.5), Value::F64(2.5));
}

#[test]
fn test_managed_equality_is_structural() {
    let a = Value::string("hello");
    let b = Value::string("hello");
    assert_eq!(a, b);
    assert!(!a.ptr_eq(&b));
    assert!(a.ptr_eq(&a.clone()));
    assert_ne!(Value::string("hello"), Value::bytes(b"hello".to_vec()));
}

#[test]
fn test_scalar_ptr_eq_is_value_equality() {
    assert!(Value::U64(3).ptr_eq(&Value::U64(3)));
    assert!(!Value::U64(3).ptr_eq(&Value::U32(3)));
}

#[test]
fn test_kinds_and_management() {
    let cases = [
        (Value::Bool(false), ValueKind::Bool, false),
        (Value::I32(0), ValueKind::I32, false),
        (Value::F32(0.0), ValueKind::F32, false),
        (Value::string(""), ValueKind::String, true),
        (Value::bytes(Vec::new()), ValueKind::Bytes, true),
        (Value::array(Array::new()), ValueKind::Array, true),
    ];
    for (value, kind, managed) in cases {
        assert_eq!(value.kind(), kind);
        assert_eq!(value.is_managed(), managed);
        assert_eq!(value.ref_count().is_some(), managed);
    }
}

#[test]
fn test_from_conversions() {
    assert_eq!(Value::from(7i32), Value::I32(7));
    assert_eq!(Value::from(7u64), Value::U64(7));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from("s").as_str(), Some("s"));
    assert_eq!(Value::from(vec![1u8]).as_bytes(), Some(&[1u8][..]));
}

#[test]
fn test_extractors_reject_other_kinds() {
    let s = Value::string("x");
    assert_eq!(s.as_i32(), None);
    assert_eq!(s.as_bool(), None);
    assert!(s.as_array().is_none());
    assert!(s.as_message().is_none());
    assert_eq!(Value::I32(1).as_str(), None);
}

#[test]
fn test_debug_rendering() {
    assert_eq!(format!("{:?}", Value::U32(5)), "5u32");
    assert_eq!(format!("{:?}", Value::F64(1.5)), "1.5f64");
    assert_eq!(format!("{:?}", Value::bytes(vec![1u8, 2])), "b[1, 2]");
    assert_eq!(format!("{:?}", Value::array(Array::new())), "[]");
}

#[test]
fn test_value_mut_unwrap_mismatch_panics() {
    let mut v = Value::string("x");
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _ = v.as_value_mut().into_array();
    }));
    assert!(result.is_err());
}
