//! Keyed operations on object containers.
//!
//! Covers:
//! - `set_*`: nine typed insert/overwrite variants
//! - `get` and the typed `get_*` readers
//! - Predicates (`exists`, `is_*`) and type enquiry (`get_type`,
//!   `get_type_size`)
//!
//! Inserting under an existing key overwrites the current value. Overwriting
//! with a larger variable-length value re-appends the entry; the vacated
//! space is never reclaimed, so heavily mutated buffers grow until
//! re-encoded.

use crate::check::{verify_obj_get, verify_obj_set};
use crate::error::{fail, Error, Result};
use crate::hash::key_data;
use crate::tree::{get_impl, set_impl};
use crate::types::{type_size, Lite3Bytes, Lite3Str, TypeTag};
use crate::value;

// ─────────────────────────────────────────────────────────────────────────────
// Set
// ─────────────────────────────────────────────────────────────────────────────

/// Sets `key` to null in the object at `ofs`.
pub fn set_null(buf: &mut [u8], buflen: &mut usize, ofs: usize, key: &str) -> Result<()> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, type_size(TypeTag::Null))?;
    value::write_null(buf, val_ofs);
    Ok(())
}

/// Sets `key` to a boolean in the object at `ofs`.
pub fn set_bool(buf: &mut [u8], buflen: &mut usize, ofs: usize, key: &str, v: bool) -> Result<()> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, type_size(TypeTag::Bool))?;
    value::write_bool(buf, val_ofs, v);
    Ok(())
}

/// Sets `key` to an integer in the object at `ofs`.
pub fn set_i64(buf: &mut [u8], buflen: &mut usize, ofs: usize, key: &str, v: i64) -> Result<()> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, type_size(TypeTag::I64))?;
    value::write_i64(buf, val_ofs, v);
    Ok(())
}

/// Sets `key` to a floating point number in the object at `ofs`.
pub fn set_f64(buf: &mut [u8], buflen: &mut usize, ofs: usize, key: &str, v: f64) -> Result<()> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, type_size(TypeTag::F64))?;
    value::write_f64(buf, val_ofs, v);
    Ok(())
}

/// Sets `key` to a bytes value in the object at `ofs`.
pub fn set_bytes(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    key: &str,
    bytes: &[u8],
) -> Result<()> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_len = type_size(TypeTag::Bytes) + bytes.len();
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, val_len)?;
    value::write_bytes(buf, val_ofs, bytes);
    Ok(())
}

/// Sets `key` to a string in the object at `ofs`.
pub fn set_str(buf: &mut [u8], buflen: &mut usize, ofs: usize, key: &str, s: &str) -> Result<()> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_len = type_size(TypeTag::Str) + s.len() + 1;
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, val_len)?;
    value::write_str(buf, val_ofs, s);
    Ok(())
}

/// Sets `key` to the first `len` bytes of `s`. Fails when `len` does not
/// fall on a character boundary of `s`.
pub fn set_str_n(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    key: &str,
    s: &str,
    len: usize,
) -> Result<()> {
    let prefix = match s.get(..len) {
        Some(p) => p,
        None => fail!(Error::InvalidArgument, "length not on a char boundary"),
    };
    set_str(buf, buflen, ofs, key, prefix)
}

/// Inserts an empty object under `key` and returns its offset, which
/// subsequent calls can target directly.
pub fn set_obj(buf: &mut [u8], buflen: &mut usize, ofs: usize, key: &str) -> Result<usize> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, type_size(TypeTag::Object))?;
    crate::node::init_node(buf, val_ofs, TypeTag::Object);
    Ok(val_ofs)
}

/// Inserts an empty array under `key` and returns its offset.
pub fn set_arr(buf: &mut [u8], buflen: &mut usize, ofs: usize, key: &str) -> Result<usize> {
    verify_obj_set(buf, *buflen, ofs, key)?;
    let kd = key_data(key);
    let val_ofs = set_impl(buf, buflen, ofs, Some(key), kd, type_size(TypeTag::Array))?;
    crate::node::init_node(buf, val_ofs, TypeTag::Array);
    Ok(val_ofs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Get
// ─────────────────────────────────────────────────────────────────────────────

/// Finds `key` and returns the offset of its value record, for use with the
/// opaque accessors in [`crate::value`]. Useful when the type is not known
/// up front.
pub fn get(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<usize> {
    verify_obj_get(buf, buflen, ofs, key)?;
    get_impl(buf, buflen, ofs, Some(key), key_data(key))
}

/// Reads the boolean stored under `key`.
pub fn get_bool(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<bool> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    value::val_bool(buf, buflen, val_ofs)
}

/// Reads the integer stored under `key`.
pub fn get_i64(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<i64> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    value::val_i64(buf, buflen, val_ofs)
}

/// Reads the floating point number stored under `key`.
pub fn get_f64(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<f64> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    value::val_f64(buf, buflen, val_ofs)
}

/// Returns a generation-checked reference to the bytes stored under `key`.
pub fn get_bytes(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<Lite3Bytes> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    value::val_bytes(buf, buflen, val_ofs)
}

/// Returns a generation-checked reference to the string stored under `key`.
pub fn get_str(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<Lite3Str> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    value::val_str(buf, buflen, val_ofs)
}

/// Returns the offset of the object stored under `key`.
pub fn get_obj(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<usize> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    match value::val_type(buf, buflen, val_ofs)? {
        TypeTag::Object => Ok(val_ofs),
        _ => fail!(Error::InvalidArgument, "value type is not object"),
    }
}

/// Returns the offset of the array stored under `key`.
pub fn get_arr(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<usize> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    match value::val_type(buf, buflen, val_ofs)? {
        TypeTag::Array => Ok(val_ofs),
        _ => fail!(Error::InvalidArgument, "value type is not array"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Predicates and type enquiry
// ─────────────────────────────────────────────────────────────────────────────

/// Whether `key` exists in the object at `ofs`.
pub fn exists(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> bool {
    get(buf, buflen, ofs, key).is_ok()
}

/// Type of the value stored under `key`.
pub fn get_type(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<TypeTag> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    value::val_type(buf, buflen, val_ofs)
}

/// Payload size of the value stored under `key` (string sizes include the
/// NUL terminator).
pub fn get_type_size(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> Result<usize> {
    let val_ofs = get(buf, buflen, ofs, key)?;
    value::val_type_size(buf, buflen, val_ofs)
}

macro_rules! is_type {
    ($(#[$doc:meta])* $name:ident, $tag:ident) => {
        $(#[$doc])*
        pub fn $name(buf: &[u8], buflen: usize, ofs: usize, key: &str) -> bool {
            matches!(get_type(buf, buflen, ofs, key), Ok(TypeTag::$tag))
        }
    };
}

is_type!(/// Whether `key` holds a null value.
    is_null, Null);
is_type!(/// Whether `key` holds a boolean.
    is_bool, Bool);
is_type!(/// Whether `key` holds an integer.
    is_i64, I64);
is_type!(/// Whether `key` holds a floating point number.
    is_f64, F64);
is_type!(/// Whether `key` holds a bytes value.
    is_bytes, Bytes);
is_type!(/// Whether `key` holds a string.
    is_str, Str);
is_type!(/// Whether `key` holds an object.
    is_obj, Object);
is_type!(/// Whether `key` holds an array.
    is_arr, Array);
