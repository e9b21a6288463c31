//! Entry-boundary validation.
//!
//! Every public operation funnels through one of these checks before the
//! engine touches an offset: the buffer must be 4-byte aligned, lengths must
//! be consistent and below the addressing ceiling, the target offset must
//! hold a full node, and the node's container type must match the requested
//! operation. Traversal-time checks (child offsets, tree depth, record
//! lengths) live with the tree engine and codec.

use crate::error::{fail, Error, Result};
use crate::node::{NODE_ALIGNMENT_MASK, NODE_SIZE};
use crate::types::{TypeTag, BUF_SIZE_MAX};

/// Read-side validation: alignment, length sanity, and a full node at `ofs`.
pub(crate) fn verify_get(buf: &[u8], buflen: usize, ofs: usize) -> Result<()> {
    if (buf.as_ptr() as usize) & NODE_ALIGNMENT_MASK != 0 {
        fail!(Error::InvalidArgument, "buffer not aligned");
    }
    if buflen > BUF_SIZE_MAX || buflen > buf.len() {
        fail!(Error::InvalidArgument, "buffer length exceeds capacity");
    }
    if NODE_SIZE > buflen || ofs > buflen - NODE_SIZE {
        fail!(Error::InvalidArgument, "start offset out of bounds");
    }
    Ok(())
}

/// Read-side validation for keyed operations: the node at `ofs` must be an
/// object and the key must be NUL-free (the wire format stores keys
/// NUL-terminated).
pub(crate) fn verify_obj_get(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<()> {
    verify_get(buf, buflen, ofs)?;
    if buf[ofs] != TypeTag::Object as u8 {
        fail!(Error::InvalidArgument, "expecting object type");
    }
    check_key(key)
}

/// Read-side validation for indexed operations: the node at `ofs` must be an
/// array.
pub(crate) fn verify_arr_get(buf: &[u8], buflen: usize, ofs: usize) -> Result<()> {
    verify_get(buf, buflen, ofs)?;
    if buf[ofs] != TypeTag::Array as u8 {
        fail!(Error::InvalidArgument, "expecting array type");
    }
    Ok(())
}

/// Write-side validation. Capacity is `buf.len()`; `buflen` is the used
/// prefix the caller tracks.
pub(crate) fn verify_set(buf: &[u8], buflen: usize, ofs: usize) -> Result<()> {
    if (buf.as_ptr() as usize) & NODE_ALIGNMENT_MASK != 0 {
        fail!(Error::InvalidArgument, "buffer not aligned");
    }
    if buf.len() > BUF_SIZE_MAX {
        fail!(Error::InvalidArgument, "buffer capacity exceeds maximum");
    }
    if buflen > buf.len() {
        fail!(Error::InvalidArgument, "buffer length exceeds capacity");
    }
    if NODE_SIZE > buflen || ofs > buflen - NODE_SIZE {
        fail!(Error::InvalidArgument, "start offset out of bounds");
    }
    Ok(())
}

/// Write-side validation for keyed operations.
pub(crate) fn verify_obj_set(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<()> {
    verify_set(buf, buflen, ofs)?;
    if buf[ofs] != TypeTag::Object as u8 {
        fail!(Error::InvalidArgument, "expecting object type");
    }
    check_key(key)
}

/// Write-side validation for indexed operations.
pub(crate) fn verify_arr_set(buf: &[u8], buflen: usize, ofs: usize) -> Result<()> {
    verify_set(buf, buflen, ofs)?;
    if buf[ofs] != TypeTag::Array as u8 {
        fail!(Error::InvalidArgument, "expecting array type");
    }
    Ok(())
}

/// Keys are stored NUL-terminated, so an interior NUL cannot round-trip.
pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.as_bytes().contains(&0) {
        fail!(Error::InvalidArgument, "key contains a NUL byte");
    }
    Ok(())
}
