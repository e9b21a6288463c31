//! E2E Suite: hostile and malformed buffers.
//!
//! Every operation that traverses an untrusted buffer must fail cleanly —
//! bounded time, no panic, no stack overflow — when offsets form cycles,
//! point outside the buffer, or record lengths lie.

extern crate lite3;

use lite3::buffer::{get, get_i64, get_str, set_i64, set_str};
use lite3::{init_obj, iter_create, Error, TypeTag, NODE_KEYS, NODE_SIZE};

/// 4-byte-aligned scratch buffer for the buffer API.
fn aligned(words: &mut Vec<u32>) -> &mut [u8] {
    // SAFETY: a u32 is four initialized bytes; the slice borrows the Vec.
    unsafe { std::slice::from_raw_parts_mut(words.as_mut_ptr() as *mut u8, words.len() * 4) }
}

// Node field offsets for hand-crafted buffers, derived from the geometry.
const HASHES_OFS: usize = 4;
const SIZE_KC_OFS: usize = HASHES_OFS + 4 * NODE_KEYS;
const KV_OFS_OFS: usize = SIZE_KC_OFS + 4;
const CHILD_OFS_OFS: usize = KV_OFS_OFS + 4 * NODE_KEYS;

fn write_u32(buf: &mut [u8], ofs: usize, v: u32) {
    buf[ofs..ofs + 4].copy_from_slice(&v.to_le_bytes());
}

/// Internal root at 0 whose single child is the node at `child`, which in
/// turn points every child slot back at itself.
fn cyclic_buffer(buf: &mut [u8]) -> usize {
    let child = NODE_SIZE;
    // Root: object, one key, all child slots -> child node.
    buf[0] = TypeTag::Object as u8;
    write_u32(buf, HASHES_OFS, 1000);
    write_u32(buf, SIZE_KC_OFS, (1 << 6) | 1);
    write_u32(buf, KV_OFS_OFS, 2 * NODE_SIZE as u32);
    for i in 0..=1 {
        write_u32(buf, CHILD_OFS_OFS + 4 * i, child as u32);
    }
    // Child: points back at itself forever.
    buf[child] = TypeTag::Object as u8;
    write_u32(buf, child + HASHES_OFS, 1000);
    write_u32(buf, child + SIZE_KC_OFS, (1 << 6) | 1);
    write_u32(buf, child + KV_OFS_OFS, 2 * NODE_SIZE as u32);
    for i in 0..=1 {
        write_u32(buf, child + CHILD_OFS_OFS + 4 * i, child as u32);
    }
    3 * NODE_SIZE // buflen with room for the kv offsets to stay in bounds
}

// ─────────────────────────────────────────────────────────────────────────────
// Cycles and depth bounds
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn lookup_on_cyclic_tree_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let buflen = cyclic_buffer(buf);
    // Any absent key walks the cycle until the depth bound trips.
    assert_eq!(get(buf, buflen, 0, "anything"), Err(Error::CorruptBuffer));
}

#[test]
fn mutation_on_cyclic_tree_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = cyclic_buffer(buf);
    assert_eq!(
        set_i64(buf, &mut buflen, 0, "anything", 1),
        Err(Error::CorruptBuffer)
    );
}

#[test]
fn iterator_on_cyclic_tree_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let buflen = cyclic_buffer(buf);
    assert_eq!(
        iter_create(buf, buflen, 0).unwrap_err(),
        Error::CorruptBuffer
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Bad child offsets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn unaligned_child_offset_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let buflen = cyclic_buffer(buf);
    // Knock the root's child pointer off alignment.
    write_u32(buf, CHILD_OFS_OFS, NODE_SIZE as u32 + 2);
    write_u32(buf, CHILD_OFS_OFS + 4, NODE_SIZE as u32 + 2);
    assert_eq!(get(buf, buflen, 0, "anything"), Err(Error::CorruptBuffer));
}

#[test]
fn child_offset_past_buffer_end_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let buflen = cyclic_buffer(buf);
    write_u32(buf, CHILD_OFS_OFS, 1 << 20);
    write_u32(buf, CHILD_OFS_OFS + 4, 1 << 20);
    assert_eq!(get(buf, buflen, 0, "anything"), Err(Error::CorruptBuffer));
}

// ─────────────────────────────────────────────────────────────────────────────
// Lying records
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn out_of_range_value_tag_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_i64(buf, &mut buflen, 0, "n", 7).unwrap();

    let val_ofs = get(buf, buflen, 0, "n").unwrap();
    buf[val_ofs] = 0xFF;
    assert_eq!(get_i64(buf, buflen, 0, "n"), Err(Error::CorruptBuffer));
}

#[test]
fn oversized_string_length_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_str(buf, &mut buflen, 0, "s", "ok").unwrap();

    let val_ofs = get(buf, buflen, 0, "s").unwrap();
    // Claim a payload far beyond the buffer.
    write_u32(buf, val_ofs + 1, 1 << 24);
    assert_eq!(get_str(buf, buflen, 0, "s"), Err(Error::CorruptBuffer));
}

#[test]
fn oversized_key_length_is_corrupt_buffer() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    let mut buflen = 0;
    init_obj(buf, &mut buflen).unwrap();
    set_i64(buf, &mut buflen, 0, "kk", 1).unwrap();

    // The first key record sits immediately after the root node. Claim a
    // key length that runs past the end of the buffer.
    let key_record = NODE_SIZE;
    buf[key_record] = 63 << 2; // 1-byte tag, stored length 63
    assert_eq!(get(buf, buflen, 0, "kk"), Err(Error::CorruptBuffer));
}

// ─────────────────────────────────────────────────────────────────────────────
// Degenerate inputs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn truncated_buffer_is_invalid_argument() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    buf[0] = TypeTag::Object as u8;
    assert_eq!(get(buf, NODE_SIZE - 1, 0, "k"), Err(Error::InvalidArgument));
}

#[test]
fn count_on_scalar_node_is_invalid_argument() {
    let mut backing = vec![0u32; 4096];
    let buf = aligned(&mut backing);
    buf[0] = TypeTag::I64 as u8;
    assert_eq!(lite3::count(buf, 4096, 0), Err(Error::InvalidArgument));
}

#[test]
fn random_garbage_never_panics() {
    // A deterministic pseudo-random fill; every read path must fail or
    // succeed without panicking.
    let mut backing = vec![0u32; 4096];
    let mut state = 0x2545_F491u32;
    for w in backing.iter_mut() {
        state = state.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
        *w = state;
    }
    let buf = aligned(&mut backing);
    buf[0] = TypeTag::Object as u8;
    let buflen = buf.len();

    let _ = get(buf, buflen, 0, "probe");
    let _ = lite3::count(buf, buflen, 0);
    let _ = lite3::root_type(buf, buflen);
    if let Ok(mut it) = iter_create(buf, buflen, 0) {
        for _ in 0..64 {
            if lite3::iter_next(buf, buflen, &mut it).is_err() {
                break;
            }
        }
    }
}
