//! Unit tests: type enquiry and predicates across every value type.

use lite3::buffer::{
    arr_append_bool, arr_append_str, arr_get_type, get_type, get_type_size, is_arr, is_bool,
    is_bytes, is_f64, is_i64, is_null, is_obj, is_str, set_arr, set_bool, set_bytes, set_f64,
    set_i64, set_null, set_obj, set_str,
};
use lite3::{init_arr, init_obj, root_type, Error, TypeTag};

/// 4-byte-aligned scratch buffer for the buffer API.
fn aligned(words: &mut Vec<u32>) -> &mut [u8] {
    // SAFETY: a u32 is four initialized bytes; the slice borrows the Vec.
    unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4) }
}

/// Object populated with one value of every type.
fn populate(buf: &mut [u8], buflen: &mut usize) {
    init_obj(buf, buflen).unwrap();
    set_null(buf, buflen, 0, "null").unwrap();
    set_bool(buf, buflen, 0, "bool", true).unwrap();
    set_i64(buf, buflen, 0, "i64", -1).unwrap();
    set_f64(buf, buflen, 0, "f64", 1.5).unwrap();
    set_bytes(buf, buflen, 0, "bytes", &[1, 2, 3]).unwrap();
    set_str(buf, buflen, 0, "str", "hello").unwrap();
    set_obj(buf, buflen, 0, "obj").unwrap();
    set_arr(buf, buflen, 0, "arr").unwrap();
}

// ─────────────────────────────────────────────────────────────────────────────
// get_type
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_type_reports_every_tag() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    populate(buf, &mut buflen);

    let expected = [
        ("null", TypeTag::Null),
        ("bool", TypeTag::Bool),
        ("i64", TypeTag::I64),
        ("f64", TypeTag::F64),
        ("bytes", TypeTag::Bytes),
        ("str", TypeTag::Str),
        ("obj", TypeTag::Object),
        ("arr", TypeTag::Array),
    ];
    for (key, tag) in expected {
        assert_eq!(get_type(buf, buflen, 0, key).unwrap(), tag, "key {key}");
    }
}

#[test]
fn get_type_for_missing_key_is_not_found() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    populate(buf, &mut buflen);
    assert_eq!(get_type(buf, buflen, 0, "missing"), Err(Error::NotFound));
}

// ─────────────────────────────────────────────────────────────────────────────
// is_* matrix
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn predicates_match_only_their_own_type() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    populate(buf, &mut buflen);

    type Pred = fn(&[u8], usize, usize, &str) -> bool;
    let preds: [(&str, Pred); 8] = [
        ("null", is_null),
        ("bool", is_bool),
        ("i64", is_i64),
        ("f64", is_f64),
        ("bytes", is_bytes),
        ("str", is_str),
        ("obj", is_obj),
        ("arr", is_arr),
    ];
    for (own_key, _) in preds {
        for (key, pred) in preds {
            assert_eq!(
                pred(buf, buflen, 0, own_key),
                own_key == key,
                "is_{key}({own_key})"
            );
        }
    }
}

#[test]
fn predicates_are_false_for_missing_keys() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    populate(buf, &mut buflen);
    assert!(!is_null(buf, buflen, 0, "missing"));
    assert!(!is_str(buf, buflen, 0, "missing"));
}

// ─────────────────────────────────────────────────────────────────────────────
// get_type_size
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn type_sizes_match_the_wire_format() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    populate(buf, &mut buflen);

    assert_eq!(get_type_size(buf, buflen, 0, "null").unwrap(), 0);
    assert_eq!(get_type_size(buf, buflen, 0, "bool").unwrap(), 1);
    assert_eq!(get_type_size(buf, buflen, 0, "i64").unwrap(), 8);
    assert_eq!(get_type_size(buf, buflen, 0, "f64").unwrap(), 8);
    // Variable types report the stored byte count; strings include the NUL.
    assert_eq!(get_type_size(buf, buflen, 0, "bytes").unwrap(), 3);
    assert_eq!(get_type_size(buf, buflen, 0, "str").unwrap(), 6);
}

// ─────────────────────────────────────────────────────────────────────────────
// Root and array type enquiry
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn root_type_reflects_initialization() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    assert_eq!(root_type(buf, buflen).unwrap(), TypeTag::Object);
    init_arr(buf, &mut buflen).unwrap();
    assert_eq!(root_type(buf, buflen).unwrap(), TypeTag::Array);
}

#[test]
fn root_type_of_garbage_is_invalid_argument() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    buf[0] = 0x42;
    assert_eq!(root_type(buf, 4096), Err(Error::InvalidArgument));
}

#[test]
fn arr_get_type_per_element() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_arr(buf, &mut buflen).unwrap();
    arr_append_bool(buf, &mut buflen, 0, false).unwrap();
    arr_append_str(buf, &mut buflen, 0, "s").unwrap();
    assert_eq!(arr_get_type(buf, buflen, 0, 0).unwrap(), TypeTag::Bool);
    assert_eq!(arr_get_type(buf, buflen, 0, 1).unwrap(), TypeTag::Str);
    assert_eq!(arr_get_type(buf, buflen, 0, 2), Err(Error::InvalidArgument));
}
