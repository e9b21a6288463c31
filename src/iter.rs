//! Depth-bounded inorder iteration over a container.
//!
//! An iterator captures the document generation at creation plus a stack of
//! `(node offset, slot index)` pairs seeded with the leftmost path of the
//! target container. Items come out in ascending hash order, which for
//! arrays is ascending index order because the hashes are the indices.
//!
//! Iterators are read-only. Any mutation bumps the document generation and
//! the next [`iter_next`] fails with [`Error::IteratorInvalidated`].

use crate::check::verify_get;
use crate::error::{dbg_trace, fail, Error, Result};
use crate::node::{self, KEY_COUNT_MASK, NODE_KEYS, TREE_HEIGHT_MAX};
use crate::tree::{verify_key, KEY_SIZE_SHIFT};
use crate::types::{read_u32, read_uint_n, Lite3Str, TypeTag};
use crate::value::verify_val;

// ─────────────────────────────────────────────────────────────────────────────
// Prefetch hints
// ─────────────────────────────────────────────────────────────────────────────
// Hints only; clamped to the buffer so they never touch foreign pages.

#[inline(always)]
fn prefetch_item(buf: &[u8], ofs: usize) {
    #[cfg(all(feature = "prefetch", target_arch = "x86_64"))]
    if ofs < buf.len() {
        // SAFETY: in-bounds pointer; prefetch reads nothing architecturally.
        unsafe {
            core::arch::x86_64::_mm_prefetch(
                buf.as_ptr().add(ofs) as *const i8,
                core::arch::x86_64::_MM_HINT_NTA,
            )
        }
    }
    #[cfg(not(all(feature = "prefetch", target_arch = "x86_64")))]
    {
        let _ = (buf, ofs);
    }
}

#[inline(always)]
fn prefetch_node(buf: &[u8], ofs: usize) {
    #[cfg(all(feature = "prefetch", target_arch = "x86_64"))]
    if ofs < buf.len() {
        // SAFETY: as above.
        unsafe {
            core::arch::x86_64::_mm_prefetch(
                buf.as_ptr().add(ofs) as *const i8,
                core::arch::x86_64::_MM_HINT_T1,
            )
        }
    }
    #[cfg(not(all(feature = "prefetch", target_arch = "x86_64")))]
    {
        let _ = (buf, ofs);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Iterator state
// ─────────────────────────────────────────────────────────────────────────────

/// Iterator over one container's entries.
///
/// Plain data; holds offsets rather than borrows, so it can outlive buffer
/// reallocations (the generation check catches any use after mutation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lite3Iter {
    gen: u32,
    node_ofs: [u32; TREE_HEIGHT_MAX + 1],
    node_i: [u8; TREE_HEIGHT_MAX + 1],
    depth: usize,
}

/// One entry produced by [`iter_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterItem {
    /// Entry key for object containers; `None` for arrays.
    pub key: Option<Lite3Str>,
    /// Absolute offset of the entry's value record.
    pub val_ofs: usize,
}

/// Creates an iterator over the container at `ofs`, positioned at its
/// smallest hash (leftmost leaf).
pub fn iter_create(buf: &[u8], buflen: usize, ofs: usize) -> Result<Lite3Iter> {
    verify_get(buf, buflen, ofs)?;
    dbg_trace!("create iterator at {ofs}");

    let mut n = node::node_at(buf, buflen, ofs)?;
    let tag = n.type_tag();
    if tag != TypeTag::Object as u8 && tag != TypeTag::Array as u8 {
        fail!(Error::InvalidArgument, "expecting array or object type");
    }

    let mut iter = Lite3Iter {
        gen: read_u32(buf, 0),
        node_ofs: [0; TREE_HEIGHT_MAX + 1],
        node_i: [0; TREE_HEIGHT_MAX + 1],
        depth: 0,
    };
    iter.node_ofs[0] = ofs as u32;

    while !n.is_leaf() {
        let next = n.child_ofs[0] as usize;
        iter.depth += 1;
        if iter.depth > TREE_HEIGHT_MAX {
            fail!(Error::CorruptBuffer, "tree height exceeds maximum");
        }
        n = node::node_at(buf, buflen, next)?;
        iter.node_ofs[iter.depth] = next as u32;
        iter.node_i[iter.depth] = 0;
    }
    // Warm the first few items.
    prefetch_item(buf, n.kv_ofs[0] as usize);
    prefetch_item(buf, n.kv_ofs[0] as usize + 64);
    prefetch_item(buf, n.kv_ofs[1] as usize);
    prefetch_item(buf, n.kv_ofs[1] as usize + 64);
    Ok(iter)
}

/// Advances the iterator and returns the next entry, or `None` once the
/// container is exhausted.
pub fn iter_next(buf: &[u8], buflen: usize, iter: &mut Lite3Iter) -> Result<Option<IterItem>> {
    let buflen = buflen.min(buf.len());
    if buflen < 4 || iter.gen != read_u32(buf, 0) {
        fail!(
            Error::IteratorInvalidated,
            "buffer mutation invalidated the iterator"
        );
    }

    let mut cur = iter.node_ofs[iter.depth] as usize;
    let mut n = node::node_at(buf, buflen, cur)?;
    let tag = n.type_tag();
    if tag != TypeTag::Object as u8 && tag != TypeTag::Array as u8 {
        fail!(Error::InvalidArgument, "expecting array or object type");
    }
    if iter.depth == 0 && iter.node_i[0] as usize == n.key_count() {
        return Ok(None); // exhausted
    }
    let slot = iter.node_i[iter.depth] as usize;
    if slot >= n.key_count() {
        fail!(Error::CorruptBuffer, "iterator slot out of range");
    }

    let mut target = n.kv_ofs[slot] as usize;
    let mut key = None;
    if tag == TypeTag::Object as u8 {
        let key_start = target;
        let mut tag_size = 0usize;
        verify_key(buf, buflen, None, 0, &mut target, Some(&mut tag_size))?;
        let stored_size = read_uint_n(buf, key_start, tag_size) >> KEY_SIZE_SHIFT;
        key = Some(Lite3Str {
            gen: iter.gen,
            ofs: (key_start + tag_size) as u32,
            // Stored size counts the NUL terminator; the handle does not.
            len: stored_size.saturating_sub(1),
        });
    }
    let val_ofs = target;
    verify_val(buf, buflen, &mut target)?;

    iter.node_i[iter.depth] += 1;

    // Descend into the right subtree of the consumed slot, down to its
    // leftmost leaf.
    while n.child_ofs[iter.node_i[iter.depth] as usize] != 0 {
        let next = n.child_ofs[iter.node_i[iter.depth] as usize] as usize;
        iter.depth += 1;
        if iter.depth > TREE_HEIGHT_MAX {
            fail!(Error::CorruptBuffer, "tree height exceeds maximum");
        }
        n = node::node_at(buf, buflen, next)?;
        iter.node_ofs[iter.depth] = next as u32;
        iter.node_i[iter.depth] = 0;
    }
    // Pop exhausted nodes.
    while iter.depth > 0 && iter.node_i[iter.depth] as usize == n.key_count() {
        iter.depth -= 1;
        cur = iter.node_ofs[iter.depth] as usize;
        n = node::node_at(buf, buflen, cur)?;
        let i = iter.node_i[iter.depth] as usize;
        prefetch_node(buf, n.child_ofs[(i + 1) & KEY_COUNT_MASK as usize] as usize);
        prefetch_node(buf, n.child_ofs[(i + 2) & KEY_COUNT_MASK as usize] as usize);
    }
    // Hint indices wrap within the node; a stale slot only prefetches noise.
    let i = iter.node_i[iter.depth] as usize;
    prefetch_item(buf, n.kv_ofs[i % NODE_KEYS] as usize);
    prefetch_item(buf, n.kv_ofs[(i + 1) % NODE_KEYS] as usize);

    Ok(Some(IterItem { key, val_ofs }))
}
