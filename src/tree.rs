//! Tree engine: lookup and insertion over a container's B-tree.
//!
//! Covers:
//! - Key-record encoding (`key_tag_size`, `verify_key`)
//! - `get_impl`: hash-probed lookup returning a value offset
//! - `set_impl`: hash-probed insertion with split-on-full, root promotion,
//!   and in-place-overwrite-or-append semantics
//!
//! Both walks resolve 32-bit hash collisions by quadratic probing: attempt
//! `i` retries with `base_hash + i²`, and object lookups verify the stored
//! key bytes before trusting a hash match. Arrays address elements by index
//! directly, so they never probe.
//!
//! Insertion is append-only. New records land at the buffer tail; replacing
//! a value with a larger one redirects the slot to a freshly appended record
//! and leaves the old bytes as dead space. Nothing is compacted.

use crate::error::{dbg_trace, fail, Error, Result};
use crate::hash::probe_hash;
use crate::node::{
    self, CHILD_OFS_OFS, HASHES_OFS, KEY_COUNT_MASK, KEY_COUNT_MAX, KEY_COUNT_MIN, KV_OFS_OFS,
    NODE_ALIGNMENT_MASK, NODE_KEYS, NODE_SIZE, SIZE_SHIFT, TREE_HEIGHT_MAX, TYPE_MASK,
};
use crate::node::GEN_SHIFT;
use crate::types::{
    fill, read_uint_n, type_size, write_uint_n, KeyData, TypeTag, HASH_PROBE_MAX, VAL_TAG_SIZE,
};
use crate::value::verify_val;

// ─────────────────────────────────────────────────────────────────────────────
// Key records
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) const KEY_TAG_SIZE_MAX: usize = 4;
const KEY_TAG_SIZE_MASK: u8 = 0x3;
pub(crate) const KEY_SIZE_SHIFT: u32 = 2;

/// Width of the length tag for a stored key size (bytes including NUL).
/// A zero size means no key record at all (array elements).
#[inline]
pub(crate) fn key_tag_size(key_size: u32) -> usize {
    match key_size {
        0 => 0,
        1..=63 => 1,
        64..=16_383 => 2,
        16_384..=4_194_303 => 3,
        _ => 4,
    }
}

/// Outcome of comparing a stored key record against a lookup key.
#[derive(PartialEq, Eq)]
pub(crate) enum KeyVerify {
    /// Key bytes match (or no comparison was requested).
    Ok,
    /// Hashes matched but the bytes differ; the caller retries with the
    /// next probe position.
    Collision,
}

/// Validates the key record at `*inout_ofs`, optionally comparing it to
/// `key`, and advances the cursor past it. `expect_tag_size` of zero skips
/// the tag-width consistency check; `out_tag_size` receives the decoded tag
/// width when requested.
pub(crate) fn verify_key(
    buf: &[u8],
    buflen: usize,
    key: Option<&str>,
    expect_tag_size: usize,
    inout_ofs: &mut usize,
    out_tag_size: Option<&mut usize>,
) -> Result<KeyVerify> {
    if KEY_TAG_SIZE_MAX > buflen || *inout_ofs > buflen - KEY_TAG_SIZE_MAX {
        fail!(Error::CorruptBuffer, "key record out of bounds");
    }
    let tag_size = ((buf[*inout_ofs] & KEY_TAG_SIZE_MASK) as usize) + 1;
    if expect_tag_size != 0 && expect_tag_size != tag_size {
        fail!(Error::InvalidArgument, "key tag size does not match");
    }
    let stored_size = (read_uint_n(buf, *inout_ofs, tag_size) >> KEY_SIZE_SHIFT) as usize;
    *inout_ofs += tag_size;

    if stored_size > buflen || *inout_ofs > buflen - stored_size {
        fail!(Error::CorruptBuffer, "key record out of bounds");
    }
    if let Some(k) = key {
        let kb = k.as_bytes();
        let n = (kb.len() + 1).min(stored_size);
        let stored = &buf[*inout_ofs..*inout_ofs + n];
        // The stored record carries a trailing NUL the lookup key does not.
        let matches = if n <= kb.len() {
            stored == &kb[..n]
        } else {
            &stored[..kb.len()] == kb && stored[kb.len()] == 0
        };
        if !matches {
            dbg_trace!("hash collision on key {k:?}");
            return Ok(KeyVerify::Collision);
        }
    }
    *inout_ofs += stored_size;
    if let Some(out) = out_tag_size {
        *out = tag_size;
    }
    Ok(KeyVerify::Ok)
}

// ─────────────────────────────────────────────────────────────────────────────
// Lookup
// ─────────────────────────────────────────────────────────────────────────────

/// Finds the value offset for `key` (objects) or for the index carried in
/// `key_data.hash` (arrays, `key == None`) inside the container at `ofs`.
///
/// The returned offset points at a verified value record.
pub(crate) fn get_impl(
    buf: &[u8],
    buflen: usize,
    ofs: usize,
    key: Option<&str>,
    key_data: KeyData,
) -> Result<usize> {
    let expect_tag_size = key_tag_size(key_data.size);
    let probe_attempts = if key.is_some() { HASH_PROBE_MAX } else { 1 };

    for attempt in 0..probe_attempts {
        let attempt_hash = probe_hash(key_data.hash, attempt);
        let mut n = node::node_at(buf, buflen, ofs)?;
        let mut node_walks = 0usize;

        'walk: loop {
            let key_count = n.key_count();
            let mut i = 0;
            while i < key_count && n.hashes[i] < attempt_hash {
                i += 1;
            }
            if i < key_count && n.hashes[i] == attempt_hash {
                let mut target = n.kv_ofs[i] as usize;
                if key.is_some() {
                    match verify_key(buf, buflen, key, expect_tag_size, &mut target, None)? {
                        KeyVerify::Collision => break 'walk,
                        KeyVerify::Ok => {}
                    }
                }
                let val_start = target;
                verify_val(buf, buflen, &mut target)?;
                return Ok(val_start);
            }
            if !n.is_leaf() {
                let next = n.child_ofs[i] as usize;
                n = node::node_at(buf, buflen, next)?;
                node_walks += 1;
                if node_walks > TREE_HEIGHT_MAX {
                    fail!(Error::CorruptBuffer, "tree height exceeds maximum");
                }
            } else {
                fail!(Error::NotFound, "key not found");
            }
        }
    }
    fail!(Error::InvalidArgument, "hash probe limit reached")
}

// ─────────────────────────────────────────────────────────────────────────────
// Insertion
// ─────────────────────────────────────────────────────────────────────────────

/// Padding needed so the value record lands correctly. Only container values
/// carry an alignment requirement: a full node lives at the value slot.
#[inline]
fn align_pad(unaligned_val_ofs: usize, val_len: usize) -> usize {
    let mask = if val_len == type_size(TypeTag::Object) {
        NODE_ALIGNMENT_MASK
    } else {
        0
    };
    ((unaligned_val_ofs + mask) & !mask) - unaligned_val_ofs
}

/// Appends the key record (when present) at the tail and reserves
/// tag + payload bytes for the value. Returns the value offset; the caller
/// writes the type tag and payload there. Space was checked by the caller.
fn append_entry(
    buf: &mut [u8],
    buflen: &mut usize,
    key: Option<&str>,
    key_data: KeyData,
    k_tag_size: usize,
    val_len: usize,
) -> usize {
    if let Some(k) = key {
        let tag = ((key_data.size as u64) << KEY_SIZE_SHIFT) | (k_tag_size as u64 - 1);
        write_uint_n(buf, *buflen, k_tag_size, tag as u32);
        *buflen += k_tag_size;
        buf[*buflen..*buflen + k.len()].copy_from_slice(k.as_bytes());
        buf[*buflen + k.len()] = 0x00;
        *buflen += key_data.size as usize;
    }
    let val_ofs = *buflen;
    *buflen += VAL_TAG_SIZE + val_len;
    val_ofs
}

/// Inserts or overwrites an entry in the container at `ofs` and returns the
/// offset where the caller must write the value tag and payload.
///
/// The document generation is incremented once per call, before any other
/// work, so outstanding references and iterators are invalidated even when
/// the call fails. A failed call may have advanced `*buflen` (alignment
/// padding, node splits); the tree invariants still hold and a retry after
/// growing the buffer completes normally.
pub(crate) fn set_impl(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    key: Option<&str>,
    key_data: KeyData,
    val_len: usize,
) -> Result<usize> {
    let bufsz = buf.len();
    let k_tag_size = key_tag_size(key_data.size);
    let base_entry_size = k_tag_size + key_data.size as usize + VAL_TAG_SIZE + val_len;

    node::check_node(buf, *buflen, ofs)?;

    // Every mutation attempt bumps the document generation, failures
    // included.
    let hdr = node::header(buf, 0);
    let gen = (hdr >> GEN_SHIFT).wrapping_add(1);
    node::set_header(buf, 0, (hdr & TYPE_MASK) | (gen << GEN_SHIFT));

    let probe_attempts = if key.is_some() { HASH_PROBE_MAX } else { 1 };

    'probe: for attempt in 0..probe_attempts {
        let attempt_hash = probe_hash(key_data.hash, attempt);
        let mut entry_size = base_entry_size;
        let mut parent: Option<usize> = None;
        let mut cur = ofs;
        let mut key_count = 0usize;
        let mut i = 0usize;
        let mut node_walks = 0usize;

        loop {
            let mut have_match = false;

            if node::key_count(buf, cur) == KEY_COUNT_MAX {
                // Node full: split before passing through it.
                let buflen_aligned = (*buflen + NODE_ALIGNMENT_MASK) & !NODE_ALIGNMENT_MASK;
                let new_node_size = if parent.is_some() { NODE_SIZE } else { 2 * NODE_SIZE };
                if new_node_size > bufsz || buflen_aligned > bufsz - new_node_size {
                    fail!(Error::OutOfSpace, "no buffer space for node split");
                }
                *buflen = buflen_aligned;

                let p = match parent {
                    Some(p) => p,
                    None => {
                        // A container always sits at its creation offset, so
                        // a splitting root moves its content to the tail and
                        // the in-place root is rewritten as the new parent.
                        dbg_trace!("new root for container at {ofs}");
                        node::relocate(buf, cur, *buflen);
                        cur = *buflen;
                        if cfg!(feature = "zero-extra") {
                            fill(buf, ofs + HASHES_OFS, 4 * NODE_KEYS);
                            fill(buf, ofs + KV_OFS_OFS, 4 * NODE_KEYS);
                            buf[ofs + CHILD_OFS_OFS..ofs + CHILD_OFS_OFS + 4 * (NODE_KEYS + 1)]
                                .fill(0);
                        }
                        let sk = node::size_kc(buf, ofs);
                        node::set_size_kc(buf, ofs, sk & !KEY_COUNT_MASK);
                        node::set_child(buf, ofs, 0, *buflen as u32);
                        *buflen += NODE_SIZE;
                        key_count = 0;
                        i = 0;
                        parent = Some(ofs);
                        ofs
                    }
                };

                dbg_trace!("split node at {cur}");
                // Open slot `i` in the parent for the promoted median.
                let mut j = key_count;
                while j > i {
                    let h = node::hash_at(buf, p, j - 1);
                    let kv = node::kv_at(buf, p, j - 1);
                    let c = node::child_at(buf, p, j);
                    node::set_hash(buf, p, j, h);
                    node::set_kv(buf, p, j, kv);
                    node::set_child(buf, p, j + 1, c);
                    j -= 1;
                }
                let median_hash = node::hash_at(buf, cur, KEY_COUNT_MIN);
                let median_kv = node::kv_at(buf, cur, KEY_COUNT_MIN);
                node::set_hash(buf, p, i, median_hash);
                node::set_kv(buf, p, i, median_kv);
                node::set_child(buf, p, i + 1, *buflen as u32); // sibling slot
                let psk = node::size_kc(buf, p);
                node::set_size_kc(buf, p, (psk & !KEY_COUNT_MASK) | ((psk + 1) & KEY_COUNT_MASK));
                if cfg!(feature = "zero-extra") {
                    fill(buf, cur + HASHES_OFS + 4 * KEY_COUNT_MIN, 4);
                    fill(buf, cur + KV_OFS_OFS + 4 * KEY_COUNT_MIN, 4);
                }

                let sibling = *buflen;
                if cfg!(feature = "zero-extra") {
                    fill(buf, sibling + HASHES_OFS, 4 * NODE_KEYS);
                    fill(buf, sibling + KV_OFS_OFS, 4 * NODE_KEYS);
                }
                let container_type = node::header(buf, ofs) & TYPE_MASK;
                node::set_header(buf, sibling, container_type);
                node::set_size_kc(buf, sibling, KEY_COUNT_MIN as u32 & KEY_COUNT_MASK);
                node::set_size_kc(buf, cur, KEY_COUNT_MIN as u32 & KEY_COUNT_MASK);
                buf[sibling + CHILD_OFS_OFS..sibling + CHILD_OFS_OFS + 4 * (NODE_KEYS + 1)]
                    .fill(0);
                let carried_child = node::child_at(buf, cur, KEY_COUNT_MIN + 1);
                node::set_child(buf, sibling, 0, carried_child);
                node::set_child(buf, cur, KEY_COUNT_MIN + 1, 0);
                for j in 0..KEY_COUNT_MIN {
                    // Upper half of the node moves into the sibling.
                    let h = node::hash_at(buf, cur, j + KEY_COUNT_MIN + 1);
                    let kv = node::kv_at(buf, cur, j + KEY_COUNT_MIN + 1);
                    let c = node::child_at(buf, cur, j + KEY_COUNT_MIN + 2);
                    node::set_hash(buf, sibling, j, h);
                    node::set_kv(buf, sibling, j, kv);
                    node::set_child(buf, sibling, j + 1, c);
                    if cfg!(feature = "zero-extra") {
                        fill(buf, cur + HASHES_OFS + 4 * (j + KEY_COUNT_MIN + 1), 4);
                        fill(buf, cur + KV_OFS_OFS + 4 * (j + KEY_COUNT_MIN + 1), 4);
                    }
                    node::set_child(buf, cur, j + KEY_COUNT_MIN + 2, 0);
                }
                *buflen += NODE_SIZE;

                if attempt_hash > median_hash {
                    cur = sibling; // the target key sorts into the new sibling
                } else if attempt_hash == median_hash {
                    cur = p; // the promoted median is the target slot
                    have_match = true;
                }
            }

            if !have_match {
                key_count = node::key_count(buf, cur);
                i = 0;
                while i < key_count && node::hash_at(buf, cur, i) < attempt_hash {
                    i += 1;
                }
                have_match = i < key_count && node::hash_at(buf, cur, i) == attempt_hash;
            }

            if have_match {
                // Key already present: overwrite in place when the existing
                // record is large enough, otherwise re-append.
                let kv = node::kv_at(buf, cur, i) as usize;
                let mut target = kv;
                if key.is_some() {
                    match verify_key(buf, *buflen, key, k_tag_size, &mut target, None)? {
                        KeyVerify::Collision => continue 'probe,
                        KeyVerify::Ok => {}
                    }
                }
                let val_start = target;
                verify_val(buf, *buflen, &mut target)?;
                if val_len >= target - val_start {
                    // New value does not fit: append a fresh key+value entry
                    // and redirect the slot. The vacated bytes stay dead.
                    let pad = align_pad(*buflen + k_tag_size + key_data.size as usize, val_len);
                    entry_size += pad;
                    if entry_size > bufsz || *buflen > bufsz - entry_size {
                        fail!(Error::OutOfSpace, "no buffer space for entry insertion");
                    }
                    if cfg!(feature = "zero-deleted") {
                        fill(buf, kv, target - kv);
                    }
                    if cfg!(feature = "zero-extra") {
                        fill(buf, *buflen, pad);
                    }
                    *buflen += pad;
                    node::set_kv(buf, cur, i, *buflen as u32);
                    return Ok(append_entry(buf, buflen, key, key_data, k_tag_size, val_len));
                }
                if cfg!(feature = "zero-deleted") {
                    fill(buf, val_start, target - val_start);
                }
                return Ok(val_start); // caller rewrites the value in place
            }

            if node::child_at(buf, cur, 0) != 0 {
                // Internal node: descend.
                let next = node::child_at(buf, cur, i) as usize;
                node::check_node(buf, *buflen, next)?;
                parent = Some(cur);
                cur = next;
                node_walks += 1;
                if node_walks > TREE_HEIGHT_MAX {
                    fail!(Error::CorruptBuffer, "tree height exceeds maximum");
                }
            } else {
                // Leaf: claim slot `i` and append the record at the tail.
                let pad = align_pad(*buflen + k_tag_size + key_data.size as usize, val_len);
                entry_size += pad;
                if entry_size > bufsz || *buflen > bufsz - entry_size {
                    fail!(Error::OutOfSpace, "no buffer space for entry insertion");
                }
                let mut j = key_count;
                while j > i {
                    let h = node::hash_at(buf, cur, j - 1);
                    let kv = node::kv_at(buf, cur, j - 1);
                    node::set_hash(buf, cur, j, h);
                    node::set_kv(buf, cur, j, kv);
                    j -= 1;
                }
                dbg_trace!("inserting hash {attempt_hash} at slot {i}");
                node::set_hash(buf, cur, i, attempt_hash);
                let sk = node::size_kc(buf, cur);
                node::set_size_kc(buf, cur, (sk & !KEY_COUNT_MASK) | ((sk + 1) & KEY_COUNT_MASK));
                if cfg!(feature = "zero-extra") {
                    fill(buf, *buflen, pad);
                }
                *buflen += pad;
                node::set_kv(buf, cur, i, *buflen as u32);

                // One more entry in this container: bump the subtree count
                // on its root node.
                let rsk = node::size_kc(buf, ofs);
                let size = (rsk >> SIZE_SHIFT).wrapping_add(1);
                node::set_size_kc(buf, ofs, (rsk & SIZE_KC_LOW_MASK) | (size << SIZE_SHIFT));
                return Ok(append_entry(buf, buflen, key, key_data, k_tag_size, val_len));
            }
        }
    }
    fail!(Error::InvalidArgument, "hash probe limit reached")
}

/// Low bits of `size_kc` preserved when rewriting the subtree count.
const SIZE_KC_LOW_MASK: u32 = (1 << SIZE_SHIFT) - 1;
