//! JSON → Lite³ decoding.

use serde_json::{Map, Value};

use super::JSON_NESTING_DEPTH_MAX;
use crate::buffer;
use crate::error::{fail, Error, Result};

fn dec_number(n: &serde_json::Number) -> Result<NumberRepr> {
    if let Some(i) = n.as_i64() {
        return Ok(NumberRepr::I64(i));
    }
    if let Some(u) = n.as_u64() {
        // Too big for a signed integer: fall back to floating point.
        return Ok(NumberRepr::F64(u as f64));
    }
    match n.as_f64() {
        Some(f) => Ok(NumberRepr::F64(f)),
        None => fail!(Error::InvalidArgument, "unrepresentable JSON number"),
    }
}

enum NumberRepr {
    I64(i64),
    F64(f64),
}

fn dec_obj(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    map: &Map<String, Value>,
    depth: usize,
) -> Result<()> {
    let depth = depth + 1;
    if depth > JSON_NESTING_DEPTH_MAX {
        fail!(Error::InvalidArgument, "nesting depth exceeds maximum");
    }
    for (key, val) in map {
        match val {
            Value::Null => buffer::set_null(buf, buflen, ofs, key)?,
            Value::Bool(b) => buffer::set_bool(buf, buflen, ofs, key, *b)?,
            Value::Number(n) => match dec_number(n)? {
                NumberRepr::I64(i) => buffer::set_i64(buf, buflen, ofs, key, i)?,
                NumberRepr::F64(f) => buffer::set_f64(buf, buflen, ofs, key, f)?,
            },
            Value::String(s) => buffer::set_str(buf, buflen, ofs, key, s)?,
            Value::Object(m) => {
                let child = buffer::set_obj(buf, buflen, ofs, key)?;
                dec_obj(buf, buflen, child, m, depth)?;
            }
            Value::Array(a) => {
                let child = buffer::set_arr(buf, buflen, ofs, key)?;
                dec_arr(buf, buflen, child, a, depth)?;
            }
        }
    }
    Ok(())
}

fn dec_arr(
    buf: &mut [u8],
    buflen: &mut usize,
    ofs: usize,
    items: &[Value],
    depth: usize,
) -> Result<()> {
    let depth = depth + 1;
    if depth > JSON_NESTING_DEPTH_MAX {
        fail!(Error::InvalidArgument, "nesting depth exceeds maximum");
    }
    for val in items {
        match val {
            Value::Null => buffer::arr_append_null(buf, buflen, ofs)?,
            Value::Bool(b) => buffer::arr_append_bool(buf, buflen, ofs, *b)?,
            Value::Number(n) => match dec_number(n)? {
                NumberRepr::I64(i) => buffer::arr_append_i64(buf, buflen, ofs, i)?,
                NumberRepr::F64(f) => buffer::arr_append_f64(buf, buflen, ofs, f)?,
            },
            Value::String(s) => buffer::arr_append_str(buf, buflen, ofs, s)?,
            Value::Object(m) => {
                let child = buffer::arr_append_obj(buf, buflen, ofs)?;
                dec_obj(buf, buflen, child, m, depth)?;
            }
            Value::Array(a) => {
                let child = buffer::arr_append_arr(buf, buflen, ofs)?;
                dec_arr(buf, buflen, child, a, depth)?;
            }
        }
    }
    Ok(())
}

/// Parses `json` and rebuilds the buffer from it. The previous contents are
/// replaced; the root becomes whatever the JSON document's root is.
pub fn json_dec(buf: &mut [u8], buflen: &mut usize, json: &str) -> Result<()> {
    let doc: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(_) => fail!(Error::InvalidArgument, "failed to parse JSON"),
    };
    match &doc {
        Value::Object(map) => {
            buffer::init_obj(buf, buflen)?;
            dec_obj(buf, buflen, 0, map, 0)
        }
        Value::Array(items) => {
            buffer::init_arr(buf, buflen)?;
            dec_arr(buf, buflen, 0, items, 0)
        }
        _ => fail!(Error::InvalidArgument, "expecting array or object root"),
    }
}

/// Reads a JSON document from `path` and rebuilds the buffer from it.
/// Filesystem failures surface as [`Error::Io`].
pub fn json_dec_file(buf: &mut [u8], buflen: &mut usize, path: &std::path::Path) -> Result<()> {
    let text = std::fs::read_to_string(path).map_err(|_| Error::Io)?;
    json_dec(buf, buflen, &text)
}
