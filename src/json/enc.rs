//! Lite³ → JSON encoding.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{Map, Value};

use super::JSON_NESTING_DEPTH_MAX;
use crate::check::verify_get;
use crate::error::{fail, Error, Result};
use crate::iter::{iter_create, iter_next};
use crate::types::TypeTag;
use crate::value;

/// Builds the JSON value for the value record at `val_ofs`.
fn enc_value(buf: &[u8], buflen: usize, val_ofs: usize, depth: usize) -> Result<Value> {
    match value::val_type(buf, buflen, val_ofs)? {
        TypeTag::Null => Ok(Value::Null),
        TypeTag::Bool => Ok(Value::Bool(value::val_bool(buf, buflen, val_ofs)?)),
        TypeTag::I64 => Ok(Value::from(value::val_i64(buf, buflen, val_ofs)?)),
        TypeTag::F64 => {
            let v = value::val_f64(buf, buflen, val_ofs)?;
            match serde_json::Number::from_f64(v) {
                Some(n) => Ok(Value::Number(n)),
                // NaN and infinities have no JSON representation.
                None => fail!(Error::InvalidArgument, "non-finite number in document"),
            }
        }
        TypeTag::Bytes => {
            let handle = value::val_bytes(buf, buflen, val_ofs)?;
            let bytes = match handle.resolve(buf) {
                Some(b) => b,
                None => fail!(Error::CorruptBuffer, "bytes value unreadable"),
            };
            Ok(Value::String(BASE64.encode(bytes)))
        }
        TypeTag::Str => {
            let handle = value::val_str(buf, buflen, val_ofs)?;
            let s = match handle.resolve(buf) {
                Some(s) => s,
                None => fail!(Error::CorruptBuffer, "string value unreadable"),
            };
            Ok(Value::String(s.to_owned()))
        }
        TypeTag::Object | TypeTag::Array => enc_container(buf, buflen, val_ofs, depth),
    }
}

/// Recursively builds the JSON value for the container at `ofs`.
fn enc_container(buf: &[u8], buflen: usize, ofs: usize, depth: usize) -> Result<Value> {
    let depth = depth + 1;
    if depth > JSON_NESTING_DEPTH_MAX {
        fail!(Error::InvalidArgument, "nesting depth exceeds maximum");
    }
    let mut it = iter_create(buf, buflen, ofs)?;
    match buf[ofs] {
        t if t == TypeTag::Object as u8 => {
            let mut map = Map::new();
            while let Some(item) = iter_next(buf, buflen, &mut it)? {
                let key = match item.key.as_ref().and_then(|k| k.resolve(buf)) {
                    Some(k) => k.to_owned(),
                    None => fail!(Error::CorruptBuffer, "object key unreadable"),
                };
                map.insert(key, enc_value(buf, buflen, item.val_ofs, depth)?);
            }
            Ok(Value::Object(map))
        }
        t if t == TypeTag::Array as u8 => {
            let mut arr = Vec::new();
            while let Some(item) = iter_next(buf, buflen, &mut it)? {
                arr.push(enc_value(buf, buflen, item.val_ofs, depth)?);
            }
            Ok(Value::Array(arr))
        }
        _ => fail!(Error::InvalidArgument, "expecting array or object type"),
    }
}

/// Serializes the container at `ofs` to a compact JSON string.
pub fn json_enc(buf: &[u8], buflen: usize, ofs: usize) -> Result<String> {
    verify_get(buf, buflen, ofs)?;
    let doc = enc_container(buf, buflen, ofs, 0)?;
    serde_json::to_string(&doc).map_err(|_| Error::Io)
}

/// Serializes the container at `ofs` to an indented JSON string.
pub fn json_enc_pretty(buf: &[u8], buflen: usize, ofs: usize) -> Result<String> {
    verify_get(buf, buflen, ofs)?;
    let doc = enc_container(buf, buflen, ofs, 0)?;
    serde_json::to_string_pretty(&doc).map_err(|_| Error::Io)
}
