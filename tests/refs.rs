//! Unit tests: generation-checked string/bytes reference handles.

use lite3::buffer::{get_bytes, get_str, set_bytes, set_i64, set_str};
use lite3::{init_obj, Lite3Ctx};

/// 4-byte-aligned scratch buffer for the buffer API.
fn aligned(words: &mut Vec<u32>) -> &mut [u8] {
    // SAFETY: a u32 is four initialized bytes; the slice borrows the Vec.
    unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Valid dereference
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn str_handle_resolves_until_mutation() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_str(buf, &mut buflen, 0, "name", "lite3").unwrap();

    let handle = get_str(buf, buflen, 0, "name").unwrap();
    assert_eq!(handle.resolve(buf), Some("lite3"));
    // Reads do not invalidate.
    assert!(lite3::exists(buf, buflen, 0, "name"));
    assert_eq!(handle.resolve(buf), Some("lite3"));
}

#[test]
fn bytes_handle_reports_length() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_bytes(buf, &mut buflen, 0, "blob", &[9, 8, 7]).unwrap();
    let handle = get_bytes(buf, buflen, 0, "blob").unwrap();
    assert_eq!(handle.len(), 3);
    assert_eq!(handle.resolve(buf), Some(&[9u8, 8, 7][..]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Invalidation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn any_mutation_invalidates_str_handle() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_str(buf, &mut buflen, 0, "name", "lite3").unwrap();

    let handle = get_str(buf, buflen, 0, "name").unwrap();
    set_i64(buf, &mut buflen, 0, "unrelated", 1).unwrap();
    assert_eq!(handle.resolve(buf), None);
}

#[test]
fn overwrite_of_the_same_key_invalidates() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_bytes(buf, &mut buflen, 0, "blob", &[1, 2, 3, 4]).unwrap();
    let handle = get_bytes(buf, buflen, 0, "blob").unwrap();
    set_bytes(buf, &mut buflen, 0, "blob", &[5]).unwrap();
    assert_eq!(handle.resolve(buf), None);

    // A fresh handle sees the new value.
    let fresh = get_bytes(buf, buflen, 0, "blob").unwrap();
    assert_eq!(fresh.resolve(buf), Some(&[5u8][..]));
}

#[test]
fn handle_survives_context_grow_only_via_generation() {
    // Growing the context copies the bytes; the handle still resolves
    // against the new allocation because only the generation matters.
    let mut ctx = Lite3Ctx::new();
    ctx.init_obj().unwrap();
    ctx.set_str(0, "k", "value").unwrap();
    let handle = ctx.get_str(0, "k").unwrap();

    // Force several reallocations without mutating the message.
    let snapshot = ctx.as_bytes().to_vec();
    let mut bigger = Lite3Ctx::with_size(64 * 1024).unwrap();
    bigger.import_from_bytes(&snapshot).unwrap();
    assert_eq!(handle.resolve(bigger.as_bytes()), Some("value"));

    // Mutation in the new home invalidates the old handle.
    bigger.set_i64(0, "other", 1).unwrap();
    assert_eq!(handle.resolve(bigger.as_bytes()), None);
}

#[test]
fn handle_does_not_resolve_against_short_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_str(buf, &mut buflen, 0, "k", "value").unwrap();
    let handle = get_str(buf, buflen, 0, "k").unwrap();
    // A truncated view cannot contain the payload.
    assert_eq!(handle.resolve(&buf[..8]), None);
}
