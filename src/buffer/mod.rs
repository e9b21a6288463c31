//! Public buffer API: operations over a caller-provided byte buffer.
//!
//! All functions work on a `(buf, buflen)` pair where `buf.len()` is the
//! capacity and `buflen` the used prefix. Mutating calls may fail with
//! [`Error::OutOfSpace`], in which case the caller grows the buffer, copies
//! the used prefix, and retries — or uses [`crate::Lite3Ctx`], which does
//! exactly that automatically.
//!
//! Getters are safe to run concurrently with other getters on the same
//! buffer. Mixing a getter with a mutator is a data race the engine does not
//! detect; writers must be serialized externally.
//!
//! To target the document root, pass `ofs == 0`. Nested containers are
//! addressed by the offsets `set_obj`/`set_arr`/`get_obj`/`get_arr` return.

pub mod arr;
pub mod obj;

use crate::check::verify_get;
use crate::error::{dbg_trace, fail, Error, Result};
use crate::node::{self, NODE_ALIGNMENT_MASK, NODE_SIZE};
use crate::types::TypeTag;

pub use arr::*;
pub use obj::*;

// ─────────────────────────────────────────────────────────────────────────────
// Initialization
// ─────────────────────────────────────────────────────────────────────────────

fn init_impl(buf: &mut [u8], buflen: &mut usize, tag: TypeTag) -> Result<()> {
    if (buf.as_ptr() as usize) & NODE_ALIGNMENT_MASK != 0 {
        fail!(Error::InvalidArgument, "buffer not aligned");
    }
    if buf.len() < NODE_SIZE {
        fail!(Error::OutOfSpace, "buffer smaller than one node");
    }
    dbg_trace!("initialize {tag:?} root");
    node::init_node(buf, 0, tag);
    *buflen = NODE_SIZE;
    Ok(())
}

/// Initializes (or resets) the buffer as an empty root object. Requires
/// capacity of at least one node.
pub fn init_obj(buf: &mut [u8], buflen: &mut usize) -> Result<()> {
    init_impl(buf, buflen, TypeTag::Object)
}

/// Initializes (or resets) the buffer as an empty root array. Requires
/// capacity of at least one node.
pub fn init_arr(buf: &mut [u8], buflen: &mut usize) -> Result<()> {
    init_impl(buf, buflen, TypeTag::Array)
}

// ─────────────────────────────────────────────────────────────────────────────
// Container-level queries
// ─────────────────────────────────────────────────────────────────────────────

/// Type of the document root (object or array).
pub fn root_type(buf: &[u8], buflen: usize) -> Result<TypeTag> {
    verify_get(buf, buflen, 0)?;
    match TypeTag::from_u8(buf[0]) {
        Some(t @ (TypeTag::Object | TypeTag::Array)) => Ok(t),
        _ => Err(Error::InvalidArgument),
    }
}

/// Number of entries in the object, or elements in the array, at `ofs`.
pub fn count(buf: &[u8], buflen: usize, ofs: usize) -> Result<u32> {
    verify_get(buf, buflen, ofs)?;
    let n = node::node_at(buf, buflen, ofs)?;
    let tag = n.type_tag();
    if tag != TypeTag::Object as u8 && tag != TypeTag::Array as u8 {
        fail!(Error::InvalidArgument, "expecting array or object type");
    }
    Ok(n.subtree_count())
}
