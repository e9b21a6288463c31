//! Indexed operations on array containers.
//!
//! Arrays store the element index directly as the node hash; no key bytes
//! are emitted and hash probing is disabled (indices are unique by
//! construction).
//!
//! `arr_set_*` accepts `index <= count`, where `index == count` appends.
//! `arr_append_*` is the preferred convenience for that case. Any index
//! beyond `count` is rejected.

use crate::check::{verify_arr_get, verify_arr_set};
use crate::error::{fail, Error, Result};
use crate::node;
use crate::tree::{get_impl, set_impl};
use crate::types::{type_size, KeyData, Lite3Bytes, Lite3Str, TypeTag};
use crate::value;

// ─────────────────────────────────────────────────────────────────────────────
// Core dispatch
// ─────────────────────────────────────────────────────────────────────────────

fn set_by_index(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    index: u32,
    val_len: usize,
) -> Result<usize> {
    verify_arr_set(buf, *buflen, ofs)?;
    let size = node::node_at(buf, *buflen, ofs)?.subtree_count();
    if index > size {
        fail!(
            Error::InvalidArgument,
            "array index {index} out of bounds (size {size})"
        );
    }
    let kd = KeyData { hash: index, size: 0 };
    set_impl(buf, buflen, ofs, None, kd, val_len)
}

fn set_by_append(buf: &mut [u8], buflen: &mut usize, ofs: usize, val_len: usize) -> Result<usize> {
    verify_arr_set(buf, *buflen, ofs)?;
    let size = node::node_at(buf, *buflen, ofs)?.subtree_count();
    let kd = KeyData { hash: size, size: 0 };
    set_impl(buf, buflen, ofs, None, kd, val_len)
}

fn get_by_index(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<usize> {
    verify_arr_get(buf, buflen, ofs)?;
    let size = node::node_at(buf, buflen, ofs)?.subtree_count();
    if index >= size {
        fail!(
            Error::InvalidArgument,
            "array index {index} out of bounds (size {size})"
        );
    }
    let kd = KeyData { hash: index, size: 0 };
    get_impl(buf, buflen, ofs, None, kd)
}

// ─────────────────────────────────────────────────────────────────────────────
// Set by index
// ─────────────────────────────────────────────────────────────────────────────

/// Sets element `index` to null; `index == count` appends.
pub fn arr_set_null(buf: &mut [u8], buflen: &mut usize, ofs: usize, index: u32) -> Result<()> {
    let val_ofs = set_by_index(buf, buflen, ofs, index, type_size(TypeTag::Null))?;
    value::write_null(buf, val_ofs);
    Ok(())
}

/// Sets element `index` to a boolean; `index == count` appends.
pub fn arr_set_bool(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    index: u32,
    v: bool,
) -> Result<()> {
    let val_ofs = set_by_index(buf, buflen, ofs, index, type_size(TypeTag::Bool))?;
    value::write_bool(buf, val_ofs, v);
    Ok(())
}

/// Sets element `index` to an integer; `index == count` appends.
pub fn arr_set_i64(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    index: u32,
    v: i64,
) -> Result<()> {
    let val_ofs = set_by_index(buf, buflen, ofs, index, type_size(TypeTag::I64))?;
    value::write_i64(buf, val_ofs, v);
    Ok(())
}

/// Sets element `index` to a floating point number; `index == count`
/// appends.
pub fn arr_set_f64(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    index: u32,
    v: f64,
) -> Result<()> {
    let val_ofs = set_by_index(buf, buflen, ofs, index, type_size(TypeTag::F64))?;
    value::write_f64(buf, val_ofs, v);
    Ok(())
}

/// Sets element `index` to a bytes value; `index == count` appends.
pub fn arr_set_bytes(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    index: u32,
    bytes: &[u8],
) -> Result<()> {
    let val_len = type_size(TypeTag::Bytes) + bytes.len();
    let val_ofs = set_by_index(buf, buflen, ofs, index, val_len)?;
    value::write_bytes(buf, val_ofs, bytes);
    Ok(())
}

/// Sets element `index` to a string; `index == count` appends.
pub fn arr_set_str(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    index: u32,
    s: &str,
) -> Result<()> {
    let val_len = type_size(TypeTag::Str) + s.len() + 1;
    let val_ofs = set_by_index(buf, buflen, ofs, index, val_len)?;
    value::write_str(buf, val_ofs, s);
    Ok(())
}

/// Sets element `index` to the first `len` bytes of `s`.
pub fn arr_set_str_n(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    index: u32,
    s: &str,
    len: usize,
) -> Result<()> {
    let prefix = match s.get(..len) {
        Some(p) => p,
        None => fail!(Error::InvalidArgument, "length not on a char boundary"),
    };
    arr_set_str(buf, buflen, ofs, index, prefix)
}

/// Sets element `index` to an empty object and returns its offset.
pub fn arr_set_obj(buf: &mut [u8], buflen: &mut usize, ofs: usize, index: u32) -> Result<usize> {
    let val_ofs = set_by_index(buf, buflen, ofs, index, type_size(TypeTag::Object))?;
    node::init_node(buf, val_ofs, TypeTag::Object);
    Ok(val_ofs)
}

/// Sets element `index` to an empty array and returns its offset.
pub fn arr_set_arr(buf: &mut [u8], buflen: &mut usize, ofs: usize, index: u32) -> Result<usize> {
    let val_ofs = set_by_index(buf, buflen, ofs, index, type_size(TypeTag::Array))?;
    node::init_node(buf, val_ofs, TypeTag::Array);
    Ok(val_ofs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Append
// ─────────────────────────────────────────────────────────────────────────────

/// Appends a null element.
pub fn arr_append_null(buf: &mut [u8], buflen: &mut usize, ofs: usize) -> Result<()> {
    let val_ofs = set_by_append(buf, buflen, ofs, type_size(TypeTag::Null))?;
    value::write_null(buf, val_ofs);
    Ok(())
}

/// Appends a boolean element.
pub fn arr_append_bool(buf: &mut [u8], buflen: &mut usize, ofs: usize, v: bool) -> Result<()> {
    let val_ofs = set_by_append(buf, buflen, ofs, type_size(TypeTag::Bool))?;
    value::write_bool(buf, val_ofs, v);
    Ok(())
}

/// Appends an integer element.
pub fn arr_append_i64(buf: &mut [u8], buflen: &mut usize, ofs: usize, v: i64) -> Result<()> {
    let val_ofs = set_by_append(buf, buflen, ofs, type_size(TypeTag::I64))?;
    value::write_i64(buf, val_ofs, v);
    Ok(())
}

/// Appends a floating point element.
pub fn arr_append_f64(buf: &mut [u8], buflen: &mut usize, ofs: usize, v: f64) -> Result<()> {
    let val_ofs = set_by_append(buf, buflen, ofs, type_size(TypeTag::F64))?;
    value::write_f64(buf, val_ofs, v);
    Ok(())
}

/// Appends a bytes element.
pub fn arr_append_bytes(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    bytes: &[u8],
) -> Result<()> {
    let val_len = type_size(TypeTag::Bytes) + bytes.len();
    let val_ofs = set_by_append(buf, buflen, ofs, val_len)?;
    value::write_bytes(buf, val_ofs, bytes);
    Ok(())
}

/// Appends a string element.
pub fn arr_append_str(buf: &mut [u8], buflen: &mut usize, ofs: usize, s: &str) -> Result<()> {
    let val_len = type_size(TypeTag::Str) + s.len() + 1;
    let val_ofs = set_by_append(buf, buflen, ofs, val_len)?;
    value::write_str(buf, val_ofs, s);
    Ok(())
}

/// Appends the first `len` bytes of `s` as a string element.
pub fn arr_append_str_n(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    s: &str,
    len: usize,
) -> Result<()> {
    let prefix = match s.get(..len) {
        Some(p) => p,
        None => fail!(Error::InvalidArgument, "length not on a char boundary"),
    };
    arr_append_str(buf, buflen, ofs, prefix)
}

/// Appends an empty object element and returns its offset.
pub fn arr_append_obj(buf: &mut [u8], buflen: &mut usize, ofs: usize) -> Result<usize> {
    let val_ofs = set_by_append(buf, buflen, ofs, type_size(TypeTag::Object))?;
    node::init_node(buf, val_ofs, TypeTag::Object);
    Ok(val_ofs)
}

/// Appends an empty array element and returns its offset.
pub fn arr_append_arr(buf: &mut [u8], buflen: &mut usize, ofs: usize) -> Result<usize> {
    let val_ofs = set_by_append(buf, buflen, ofs, type_size(TypeTag::Array))?;
    node::init_node(buf, val_ofs, TypeTag::Array);
    Ok(val_ofs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Get by index
// ─────────────────────────────────────────────────────────────────────────────

/// Reads the boolean at `index`.
pub fn arr_get_bool(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<bool> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    value::val_bool(buf, buflen, val_ofs)
}

/// Reads the integer at `index`.
pub fn arr_get_i64(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<i64> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    value::val_i64(buf, buflen, val_ofs)
}

/// Reads the floating point number at `index`.
pub fn arr_get_f64(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<f64> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    value::val_f64(buf, buflen, val_ofs)
}

/// Returns a generation-checked reference to the bytes at `index`.
pub fn arr_get_bytes(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<Lite3Bytes> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    value::val_bytes(buf, buflen, val_ofs)
}

/// Returns a generation-checked reference to the string at `index`.
pub fn arr_get_str(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<Lite3Str> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    value::val_str(buf, buflen, val_ofs)
}

/// Returns the offset of the object at `index`.
pub fn arr_get_obj(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<usize> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    match value::val_type(buf, buflen, val_ofs)? {
        TypeTag::Object => Ok(val_ofs),
        _ => fail!(Error::InvalidArgument, "value type is not object"),
    }
}

/// Returns the offset of the array at `index`.
pub fn arr_get_arr(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<usize> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    match value::val_type(buf, buflen, val_ofs)? {
        TypeTag::Array => Ok(val_ofs),
        _ => fail!(Error::InvalidArgument, "value type is not array"),
    }
}

/// Type of the element at `index`.
pub fn arr_get_type(buf: &[u8], buflen: usize, ofs: usize, index: u32) -> Result<TypeTag> {
    let val_ofs = get_by_index(buf, buflen, ofs, index)?;
    value::val_type(buf, buflen, val_ofs)
}
