//! Value record codec.
//!
//! A value record is a 1-byte type tag followed by a tag-dependent payload:
//! nothing (null), one byte (bool), eight little-endian bytes (i64/f64), a
//! 4-byte length plus raw payload (bytes), a 4-byte length plus
//! NUL-terminated characters (string), or a full container node
//! (object/array). Numeric payloads are written and read by byte copy, so
//! value offsets carry no alignment requirement of their own; only container
//! payloads must start 4-byte aligned because a node lives there.
//!
//! Covers:
//! - `verify_val`: bounds/tag validation that walks a cursor past a record
//! - Typed writers used by the set operations
//! - Public opaque-value accessors (`val_type`, `val_bool`, …)

use crate::error::{fail, Error, Result};
use crate::types::{
    read_u32, write_u32, Lite3Bytes, Lite3Str, TypeTag, LEN_FIELD_SIZE, VAL_TAG_SIZE,
};

// ─────────────────────────────────────────────────────────────────────────────
// Verification
// ─────────────────────────────────────────────────────────────────────────────

/// Validates the value record at `*inout_ofs` and advances the cursor past
/// it. Rejects out-of-range tags and any payload extending past `buflen`.
pub(crate) fn verify_val(buf: &[u8], buflen: usize, inout_ofs: &mut usize) -> Result<()> {
    if VAL_TAG_SIZE > buflen || *inout_ofs > buflen - VAL_TAG_SIZE {
        fail!(Error::CorruptBuffer, "value out of bounds");
    }
    let tag = match TypeTag::from_u8(buf[*inout_ofs]) {
        Some(t) => t,
        None => fail!(Error::CorruptBuffer, "value type invalid"),
    };
    let mut entry_size = VAL_TAG_SIZE + crate::types::type_size(tag);
    if entry_size > buflen || *inout_ofs > buflen - entry_size {
        fail!(Error::CorruptBuffer, "value out of bounds");
    }
    if matches!(tag, TypeTag::Str | TypeTag::Bytes) {
        let byte_count = read_u32(buf, *inout_ofs + VAL_TAG_SIZE) as usize;
        entry_size += byte_count;
        if entry_size > buflen || *inout_ofs > buflen - entry_size {
            fail!(Error::CorruptBuffer, "value out of bounds");
        }
    }
    *inout_ofs += entry_size;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Writers
// ─────────────────────────────────────────────────────────────────────────────
// The tree engine has already reserved tag + payload bytes at `val_ofs`.

pub(crate) fn write_null(buf: &mut [u8], val_ofs: usize) {
    buf[val_ofs] = TypeTag::Null as u8;
}

pub(crate) fn write_bool(buf: &mut [u8], val_ofs: usize, value: bool) {
    buf[val_ofs] = TypeTag::Bool as u8;
    buf[val_ofs + VAL_TAG_SIZE] = value as u8;
}

pub(crate) fn write_i64(buf: &mut [u8], val_ofs: usize, value: i64) {
    buf[val_ofs] = TypeTag::I64 as u8;
    buf[val_ofs + VAL_TAG_SIZE..val_ofs + VAL_TAG_SIZE + 8].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_f64(buf: &mut [u8], val_ofs: usize, value: f64) {
    buf[val_ofs] = TypeTag::F64 as u8;
    buf[val_ofs + VAL_TAG_SIZE..val_ofs + VAL_TAG_SIZE + 8].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_bytes(buf: &mut [u8], val_ofs: usize, data: &[u8]) {
    buf[val_ofs] = TypeTag::Bytes as u8;
    write_u32(buf, val_ofs + VAL_TAG_SIZE, data.len() as u32);
    let start = val_ofs + VAL_TAG_SIZE + LEN_FIELD_SIZE;
    buf[start..start + data.len()].copy_from_slice(data);
}

/// Writes a string payload: length including the NUL terminator, characters,
/// terminator.
pub(crate) fn write_str(buf: &mut [u8], val_ofs: usize, s: &str) {
    buf[val_ofs] = TypeTag::Str as u8;
    write_u32(buf, val_ofs + VAL_TAG_SIZE, s.len() as u32 + 1);
    let start = val_ofs + VAL_TAG_SIZE + LEN_FIELD_SIZE;
    buf[start..start + s.len()].copy_from_slice(s.as_bytes());
    buf[start + s.len()] = 0x00;
}

// ─────────────────────────────────────────────────────────────────────────────
// Opaque-value accessors
// ─────────────────────────────────────────────────────────────────────────────
// These operate on a raw value offset, as produced by `get` or an iterator.

/// Type tag of the value at `val_ofs`.
pub fn val_type(buf: &[u8], buflen: usize, val_ofs: usize) -> Result<TypeTag> {
    let buflen = buflen.min(buf.len());
    let mut cursor = val_ofs;
    verify_val(buf, buflen, &mut cursor)?;
    match TypeTag::from_u8(buf[val_ofs]) {
        Some(t) => Ok(t),
        None => Err(Error::CorruptBuffer),
    }
}

/// Payload size of the value at `val_ofs`. For bytes this is the payload
/// length; for strings it includes the NUL terminator; containers report the
/// node payload size.
pub fn val_type_size(buf: &[u8], buflen: usize, val_ofs: usize) -> Result<usize> {
    let tag = val_type(buf, buflen, val_ofs)?;
    if matches!(tag, TypeTag::Str | TypeTag::Bytes) {
        return Ok(read_u32(buf, val_ofs + VAL_TAG_SIZE) as usize);
    }
    Ok(crate::types::type_size(tag))
}

macro_rules! val_is {
    ($(#[$doc:meta])* $name:ident, $tag:ident) => {
        $(#[$doc])*
        pub fn $name(buf: &[u8], buflen: usize, val_ofs: usize) -> bool {
            matches!(val_type(buf, buflen, val_ofs), Ok(TypeTag::$tag))
        }
    };
}

val_is!(/// Whether the value at `val_ofs` is null.
    val_is_null, Null);
val_is!(/// Whether the value at `val_ofs` is a boolean.
    val_is_bool, Bool);
val_is!(/// Whether the value at `val_ofs` is an integer.
    val_is_i64, I64);
val_is!(/// Whether the value at `val_ofs` is a floating point number.
    val_is_f64, F64);
val_is!(/// Whether the value at `val_ofs` is a bytes value.
    val_is_bytes, Bytes);
val_is!(/// Whether the value at `val_ofs` is a string.
    val_is_str, Str);
val_is!(/// Whether the value at `val_ofs` is an object.
    val_is_obj, Object);
val_is!(/// Whether the value at `val_ofs` is an array.
    val_is_arr, Array);

fn expect_tag(buf: &[u8], buflen: usize, val_ofs: usize, want: TypeTag) -> Result<()> {
    let got = val_type(buf, buflen, val_ofs)?;
    if got != want {
        fail!(
            Error::InvalidArgument,
            "value type mismatch: expected {want:?}, found {got:?}"
        );
    }
    Ok(())
}

/// Boolean payload of the value at `val_ofs`; fails on a tag mismatch.
pub fn val_bool(buf: &[u8], buflen: usize, val_ofs: usize) -> Result<bool> {
    expect_tag(buf, buflen, val_ofs, TypeTag::Bool)?;
    Ok(buf[val_ofs + VAL_TAG_SIZE] != 0)
}

/// Integer payload of the value at `val_ofs`; fails on a tag mismatch.
pub fn val_i64(buf: &[u8], buflen: usize, val_ofs: usize) -> Result<i64> {
    expect_tag(buf, buflen, val_ofs, TypeTag::I64)?;
    let p = val_ofs + VAL_TAG_SIZE;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[p..p + 8]);
    Ok(i64::from_le_bytes(raw))
}

/// Floating point payload of the value at `val_ofs`; fails on a tag mismatch.
pub fn val_f64(buf: &[u8], buflen: usize, val_ofs: usize) -> Result<f64> {
    expect_tag(buf, buflen, val_ofs, TypeTag::F64)?;
    let p = val_ofs + VAL_TAG_SIZE;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&buf[p..p + 8]);
    Ok(f64::from_le_bytes(raw))
}

/// Generation-checked reference to the string at `val_ofs`.
pub fn val_str(buf: &[u8], buflen: usize, val_ofs: usize) -> Result<Lite3Str> {
    expect_tag(buf, buflen, val_ofs, TypeTag::Str)?;
    let stored = read_u32(buf, val_ofs + VAL_TAG_SIZE);
    Ok(Lite3Str {
        gen: read_u32(buf, 0),
        ofs: (val_ofs + VAL_TAG_SIZE + LEN_FIELD_SIZE) as u32,
        // The stored size counts the NUL terminator; the handle does not.
        len: stored.saturating_sub(1),
    })
}

/// Generation-checked reference to the bytes value at `val_ofs`.
pub fn val_bytes(buf: &[u8], buflen: usize, val_ofs: usize) -> Result<Lite3Bytes> {
    expect_tag(buf, buflen, val_ofs, TypeTag::Bytes)?;
    Ok(Lite3Bytes {
        gen: read_u32(buf, 0),
        ofs: (val_ofs + VAL_TAG_SIZE + LEN_FIELD_SIZE) as u32,
        len: read_u32(buf, val_ofs + VAL_TAG_SIZE),
    })
}
