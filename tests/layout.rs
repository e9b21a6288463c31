//! Unit tests: node geometry, wire layout, and error-code stability.

use lite3::{node, Error, TypeTag, NODE_ALIGNMENT, NODE_KEYS, NODE_SIZE, TREE_HEIGHT_MAX};

/// 4-byte-aligned scratch buffer for the buffer API.
fn aligned(words: &mut Vec<u32>) -> &mut [u8] {
    // SAFETY: a u32 is four initialized bytes; the slice borrows the Vec.
    unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry (default build: 96-byte nodes)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(not(any(
    feature = "node-48",
    feature = "node-192",
    feature = "node-384",
    feature = "node-768"
)))]
mod default_geometry {
    use super::*;

    #[test]
    fn node_constants() {
        assert_eq!(NODE_KEYS, 7);
        assert_eq!(NODE_SIZE, 96);
        assert_eq!(TREE_HEIGHT_MAX, 9);
        assert_eq!(NODE_ALIGNMENT, 4);
    }
}

#[test]
fn node_struct_matches_wire_size() {
    assert_eq!(std::mem::size_of::<node::Node>(), NODE_SIZE);
    assert_eq!(std::mem::align_of::<node::Node>(), NODE_ALIGNMENT);
}

#[test]
fn node_size_is_twelve_bytes_per_slot() {
    assert_eq!(NODE_SIZE, (NODE_KEYS + 1) * 12);
}

// ─────────────────────────────────────────────────────────────────────────────
// Root initialization
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn init_obj_writes_root_tag_and_length() {
    let mut backing = vec![0u32; NODE_SIZE / 4];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    lite3::init_obj(buf, &mut buflen).unwrap();
    assert_eq!(buflen, NODE_SIZE);
    assert_eq!(buf[0], TypeTag::Object as u8);
    assert_eq!(lite3::root_type(buf, buflen).unwrap(), TypeTag::Object);
}

#[test]
fn init_arr_writes_root_tag() {
    let mut backing = vec![0u32; NODE_SIZE / 4];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    lite3::init_arr(buf, &mut buflen).unwrap();
    assert_eq!(buf[0], TypeTag::Array as u8);
    assert_eq!(lite3::root_type(buf, buflen).unwrap(), TypeTag::Array);
}

#[test]
fn init_with_exactly_one_node_succeeds() {
    let mut backing = vec![0u32; NODE_SIZE / 4];
    let mut buflen = 0;
    assert!(lite3::init_obj(aligned(&mut backing), &mut buflen).is_ok());
}

#[test]
fn init_below_one_node_is_out_of_space() {
    let mut backing = vec![0u32; NODE_SIZE / 4 - 1];
    let mut buflen = 0;
    assert_eq!(
        lite3::init_obj(aligned(&mut backing), &mut buflen),
        Err(Error::OutOfSpace)
    );
}

#[test]
fn init_reset_replaces_existing_root() {
    let mut backing = vec![0u32; 1024];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    lite3::init_obj(buf, &mut buflen).unwrap();
    lite3::buffer::set_i64(buf, &mut buflen, 0, "k", 7).unwrap();
    lite3::init_arr(buf, &mut buflen).unwrap();
    assert_eq!(lite3::root_type(buf, buflen).unwrap(), TypeTag::Array);
    assert_eq!(lite3::count(buf, buflen, 0).unwrap(), 0);
}

#[test]
fn misaligned_buffer_is_rejected() {
    let mut backing = vec![0u32; 1024];
    let bytes = aligned(&mut backing);
    let misaligned = &mut bytes[1..];
    let mut buflen = 0;
    assert_eq!(
        lite3::init_obj(misaligned, &mut buflen),
        Err(Error::InvalidArgument)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Error codes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn error_discriminants_are_stable() {
    assert_eq!(Error::InvalidArgument.code(), 1);
    assert_eq!(Error::NotFound.code(), 2);
    assert_eq!(Error::AlreadyExists.code(), 3);
    assert_eq!(Error::OutOfSpace.code(), 4);
    assert_eq!(Error::MessageTooLarge.code(), 5);
    assert_eq!(Error::CorruptBuffer.code(), 6);
    assert_eq!(Error::Io.code(), 7);
    assert_eq!(Error::Overflow.code(), 8);
    assert_eq!(Error::IteratorInvalidated.code(), 9);
}

#[test]
fn error_code_roundtrip() {
    for code in 1..=9 {
        let err = Error::from_code(code).unwrap();
        assert_eq!(err.code(), code);
    }
    assert_eq!(Error::from_code(0), None);
    assert_eq!(Error::from_code(10), None);
}

#[test]
fn error_names_are_distinct() {
    let names: Vec<_> = (1..=9)
        .map(|c| Error::from_code(c).unwrap().error_name())
        .collect();
    let mut dedup = names.clone();
    dedup.sort_unstable();
    dedup.dedup();
    assert_eq!(dedup.len(), names.len());
}

#[test]
fn error_display_matches_name() {
    assert_eq!(
        Error::OutOfSpace.to_string(),
        Error::OutOfSpace.error_name()
    );
}
