//! Owning, auto-growing context over the buffer API.
//!
//! [`Lite3Ctx`] hides buffer management: it owns a 4-byte-aligned
//! allocation and transparently retries any mutating operation that reports
//! [`Error::OutOfSpace`] after growing the capacity fourfold, up to the
//! addressing ceiling. Everything else behaves exactly like the buffer API.
//!
//! Dropping the context frees the allocation; there is no separate destroy
//! call.

use crate::buffer;
use crate::error::{fail, Error, Result};
use crate::iter::{self, IterItem, Lite3Iter};
use crate::node::NODE_ALIGNMENT_MASK;
use crate::types::{Lite3Bytes, Lite3Str, TypeTag, BUF_SIZE_MAX};
use crate::value;

/// Minimum context capacity. Smaller requests are clamped up to this.
pub const CONTEXT_BUF_SIZE_MIN: usize = 1024;
static_assertions::const_assert!(CONTEXT_BUF_SIZE_MIN > NODE_ALIGNMENT_MASK);
static_assertions::const_assert!(CONTEXT_BUF_SIZE_MIN % 4 == 0);

/// Owning buffer context.
///
/// The backing store is a `Vec<u32>`, which guarantees the 4-byte alignment
/// the node layout requires on every reallocation.
pub struct Lite3Ctx {
    words: Vec<u32>,
    buflen: usize,
}

impl Lite3Ctx {
    // ─────────────────────────────────────────────────────────────────────
    // Construction and buffer management
    // ─────────────────────────────────────────────────────────────────────

    /// Creates an empty context with the minimum capacity.
    pub fn new() -> Self {
        Lite3Ctx {
            words: vec![0; CONTEXT_BUF_SIZE_MIN / 4],
            buflen: 0,
        }
    }

    /// Creates an empty context with at least `bufsz` bytes of capacity
    /// (clamped between [`CONTEXT_BUF_SIZE_MIN`] and [`BUF_SIZE_MAX`]).
    pub fn with_size(bufsz: usize) -> Result<Self> {
        if bufsz > BUF_SIZE_MAX {
            fail!(Error::InvalidArgument, "requested capacity exceeds maximum");
        }
        let bufsz = bufsz.max(CONTEXT_BUF_SIZE_MIN);
        Ok(Lite3Ctx {
            words: vec![0; bufsz.div_ceil(4)],
            buflen: 0,
        })
    }

    /// Creates a context holding a copy of an existing message. The capacity
    /// is the next power of two at or above the message length plus
    /// alignment slack.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            fail!(Error::InvalidArgument, "buffer cannot be empty");
        }
        if bytes.len() > BUF_SIZE_MAX {
            fail!(Error::InvalidArgument, "buffer exceeds maximum size");
        }
        let new_size = match (bytes.len() + NODE_ALIGNMENT_MASK).checked_next_power_of_two() {
            Some(s) => s.clamp(CONTEXT_BUF_SIZE_MIN, BUF_SIZE_MAX),
            None => fail!(Error::Overflow, "new capacity overflows"),
        };
        if bytes.len() > new_size {
            fail!(Error::Overflow, "new capacity overflows");
        }
        let mut ctx = Lite3Ctx::with_size(new_size)?;
        ctx.bytes_mut()[..bytes.len()].copy_from_slice(bytes);
        ctx.buflen = bytes.len();
        Ok(ctx)
    }

    /// Replaces the context contents with `bytes`, reusing the current
    /// allocation when it is large enough.
    pub fn import_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            fail!(Error::InvalidArgument, "buffer cannot be empty");
        }
        if bytes.len() > BUF_SIZE_MAX {
            fail!(Error::InvalidArgument, "buffer exceeds maximum size");
        }
        if bytes.len() > self.capacity() {
            let new_size = match (bytes.len() + NODE_ALIGNMENT_MASK).checked_next_power_of_two() {
                Some(s) => s.clamp(CONTEXT_BUF_SIZE_MIN, BUF_SIZE_MAX),
                None => fail!(Error::Overflow, "new capacity overflows"),
            };
            self.words = vec![0; new_size.div_ceil(4)];
        }
        self.bytes_mut()[..bytes.len()].copy_from_slice(bytes);
        self.buflen = bytes.len();
        Ok(())
    }

    /// Message bytes written so far (the exportable wire image).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes()[..self.buflen]
    }

    /// Used length in bytes.
    pub fn len(&self) -> usize {
        self.buflen
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buflen == 0
    }

    /// Current capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.words.len() * 4
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        // SAFETY: the Vec's buffer is initialized and any u32 is a valid
        // set of four bytes; lifetime is tied to &self.
        unsafe { core::slice::from_raw_parts(self.words.as_ptr() as *const u8, self.capacity()) }
    }

    #[inline]
    fn bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as above, with exclusive access through &mut self.
        unsafe {
            core::slice::from_raw_parts_mut(self.words.as_mut_ptr() as *mut u8, self.words.len() * 4)
        }
    }

    /// Quadruples the capacity (ceiling [`BUF_SIZE_MAX`]) and preserves the
    /// used prefix.
    fn grow(&mut self) -> Result<()> {
        let bufsz = self.capacity();
        if bufsz >= BUF_SIZE_MAX {
            fail!(Error::MessageTooLarge, "context already at maximum size");
        }
        let new_size = if bufsz < BUF_SIZE_MAX / 4 {
            match bufsz.checked_mul(4) {
                Some(s) => s.max(CONTEXT_BUF_SIZE_MIN),
                None => fail!(Error::Overflow, "new capacity overflows"),
            }
        } else {
            BUF_SIZE_MAX
        };
        let mut new_words = vec![0u32; new_size.div_ceil(4)];
        // SAFETY: new_words is initialized; sizes are in bounds.
        let new_bytes = unsafe {
            core::slice::from_raw_parts_mut(new_words.as_mut_ptr() as *mut u8, new_words.len() * 4)
        };
        new_bytes[..self.buflen].copy_from_slice(&self.bytes()[..self.buflen]);
        self.words = new_words;
        Ok(())
    }

    /// Runs a mutating buffer operation, growing and retrying on
    /// [`Error::OutOfSpace`].
    fn mutate<T>(&mut self, mut op: impl FnMut(&mut [u8], &mut usize) -> Result<T>) -> Result<T> {
        loop {
            let mut len = self.buflen;
            let result = {
                let bytes = self.bytes_mut();
                op(bytes, &mut len)
            };
            self.buflen = len;
            match result {
                Err(Error::OutOfSpace) => self.grow()?,
                other => return other,
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Initialization
    // ─────────────────────────────────────────────────────────────────────

    /// Initializes (or resets) the context as an empty root object.
    pub fn init_obj(&mut self) -> Result<()> {
        self.mutate(|b, l| buffer::init_obj(b, l))
    }

    /// Initializes (or resets) the context as an empty root array.
    pub fn init_arr(&mut self) -> Result<()> {
        self.mutate(|b, l| buffer::init_arr(b, l))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Object set
    // ─────────────────────────────────────────────────────────────────────

    /// See [`buffer::set_null`].
    pub fn set_null(&mut self, ofs: usize, key: &str) -> Result<()> {
        self.mutate(|b, l| buffer::set_null(b, l, ofs, key))
    }

    /// See [`buffer::set_bool`].
    pub fn set_bool(&mut self, ofs: usize, key: &str, v: bool) -> Result<()> {
        self.mutate(|b, l| buffer::set_bool(b, l, ofs, key, v))
    }

    /// See [`buffer::set_i64`].
    pub fn set_i64(&mut self, ofs: usize, key: &str, v: i64) -> Result<()> {
        self.mutate(|b, l| buffer::set_i64(b, l, ofs, key, v))
    }

    /// See [`buffer::set_f64`].
    pub fn set_f64(&mut self, ofs: usize, key: &str, v: f64) -> Result<()> {
        self.mutate(|b, l| buffer::set_f64(b, l, ofs, key, v))
    }

    /// See [`buffer::set_bytes`].
    pub fn set_bytes(&mut self, ofs: usize, key: &str, bytes: &[u8]) -> Result<()> {
        self.mutate(|b, l| buffer::set_bytes(b, l, ofs, key, bytes))
    }

    /// See [`buffer::set_str`].
    pub fn set_str(&mut self, ofs: usize, key: &str, s: &str) -> Result<()> {
        self.mutate(|b, l| buffer::set_str(b, l, ofs, key, s))
    }

    /// See [`buffer::set_str_n`].
    pub fn set_str_n(&mut self, ofs: usize, key: &str, s: &str, len: usize) -> Result<()> {
        self.mutate(|b, l| buffer::set_str_n(b, l, ofs, key, s, len))
    }

    /// See [`buffer::set_obj`].
    pub fn set_obj(&mut self, ofs: usize, key: &str) -> Result<usize> {
        self.mutate(|b, l| buffer::set_obj(b, l, ofs, key))
    }

    /// See [`buffer::set_arr`].
    pub fn set_arr(&mut self, ofs: usize, key: &str) -> Result<usize> {
        self.mutate(|b, l| buffer::set_arr(b, l, ofs, key))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Array set / append
    // ─────────────────────────────────────────────────────────────────────

    /// See [`buffer::arr_set_null`].
    pub fn arr_set_null(&mut self, ofs: usize, index: u32) -> Result<()> {
        self.mutate(|b, l| buffer::arr_set_null(b, l, ofs, index))
    }

    /// See [`buffer::arr_set_bool`].
    pub fn arr_set_bool(&mut self, ofs: usize, index: u32, v: bool) -> Result<()> {
        self.mutate(|b, l| buffer::arr_set_bool(b, l, ofs, index, v))
    }

    /// See [`buffer::arr_set_i64`].
    pub fn arr_set_i64(&mut self, ofs: usize, index: u32, v: i64) -> Result<()> {
        self.mutate(|b, l| buffer::arr_set_i64(b, l, ofs, index, v))
    }

    /// See [`buffer::arr_set_f64`].
    pub fn arr_set_f64(&mut self, ofs: usize, index: u32, v: f64) -> Result<()> {
        self.mutate(|b, l| buffer::arr_set_f64(b, l, ofs, index, v))
    }

    /// See [`buffer::arr_set_bytes`].
    pub fn arr_set_bytes(&mut self, ofs: usize, index: u32, bytes: &[u8]) -> Result<()> {
        self.mutate(|b, l| buffer::arr_set_bytes(b, l, ofs, index, bytes))
    }

    /// See [`buffer::arr_set_str`].
    pub fn arr_set_str(&mut self, ofs: usize, index: u32, s: &str) -> Result<()> {
        self.mutate(|b, l| buffer::arr_set_str(b, l, ofs, index, s))
    }

    /// See [`buffer::arr_set_str_n`].
    pub fn arr_set_str_n(&mut self, ofs: usize, index: u32, s: &str, len: usize) -> Result<()> {
        self.mutate(|b, l| buffer::arr_set_str_n(b, l, ofs, index, s, len))
    }

    /// See [`buffer::arr_set_obj`].
    pub fn arr_set_obj(&mut self, ofs: usize, index: u32) -> Result<usize> {
        self.mutate(|b, l| buffer::arr_set_obj(b, l, ofs, index))
    }

    /// See [`buffer::arr_set_arr`].
    pub fn arr_set_arr(&mut self, ofs: usize, index: u32) -> Result<usize> {
        self.mutate(|b, l| buffer::arr_set_arr(b, l, ofs, index))
    }

    /// See [`buffer::arr_append_null`].
    pub fn arr_append_null(&mut self, ofs: usize) -> Result<()> {
        self.mutate(|b, l| buffer::arr_append_null(b, l, ofs))
    }

    /// See [`buffer::arr_append_bool`].
    pub fn arr_append_bool(&mut self, ofs: usize, v: bool) -> Result<()> {
        self.mutate(|b, l| buffer::arr_append_bool(b, l, ofs, v))
    }

    /// See [`buffer::arr_append_i64`].
    pub fn arr_append_i64(&mut self, ofs: usize, v: i64) -> Result<()> {
        self.mutate(|b, l| buffer::arr_append_i64(b, l, ofs, v))
    }

    /// See [`buffer::arr_append_f64`].
    pub fn arr_append_f64(&mut self, ofs: usize, v: f64) -> Result<()> {
        self.mutate(|b, l| buffer::arr_append_f64(b, l, ofs, v))
    }

    /// See [`buffer::arr_append_bytes`].
    pub fn arr_append_bytes(&mut self, ofs: usize, bytes: &[u8]) -> Result<()> {
        self.mutate(|b, l| buffer::arr_append_bytes(b, l, ofs, bytes))
    }

    /// See [`buffer::arr_append_str`].
    pub fn arr_append_str(&mut self, ofs: usize, s: &str) -> Result<()> {
        self.mutate(|b, l| buffer::arr_append_str(b, l, ofs, s))
    }

    /// See [`buffer::arr_append_str_n`].
    pub fn arr_append_str_n(&mut self, ofs: usize, s: &str, len: usize) -> Result<()> {
        self.mutate(|b, l| buffer::arr_append_str_n(b, l, ofs, s, len))
    }

    /// See [`buffer::arr_append_obj`].
    pub fn arr_append_obj(&mut self, ofs: usize) -> Result<usize> {
        self.mutate(|b, l| buffer::arr_append_obj(b, l, ofs))
    }

    /// See [`buffer::arr_append_arr`].
    pub fn arr_append_arr(&mut self, ofs: usize) -> Result<usize> {
        self.mutate(|b, l| buffer::arr_append_arr(b, l, ofs))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Get
    // ─────────────────────────────────────────────────────────────────────

    /// See [`buffer::get`].
    pub fn get(&self, ofs: usize, key: &str) -> Result<usize> {
        buffer::get(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_bool`].
    pub fn get_bool(&self, ofs: usize, key: &str) -> Result<bool> {
        buffer::get_bool(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_i64`].
    pub fn get_i64(&self, ofs: usize, key: &str) -> Result<i64> {
        buffer::get_i64(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_f64`].
    pub fn get_f64(&self, ofs: usize, key: &str) -> Result<f64> {
        buffer::get_f64(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_bytes`].
    pub fn get_bytes(&self, ofs: usize, key: &str) -> Result<Lite3Bytes> {
        buffer::get_bytes(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_str`].
    pub fn get_str(&self, ofs: usize, key: &str) -> Result<Lite3Str> {
        buffer::get_str(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_obj`].
    pub fn get_obj(&self, ofs: usize, key: &str) -> Result<usize> {
        buffer::get_obj(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_arr`].
    pub fn get_arr(&self, ofs: usize, key: &str) -> Result<usize> {
        buffer::get_arr(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::arr_get_bool`].
    pub fn arr_get_bool(&self, ofs: usize, index: u32) -> Result<bool> {
        buffer::arr_get_bool(self.bytes(), self.buflen, ofs, index)
    }

    /// See [`buffer::arr_get_i64`].
    pub fn arr_get_i64(&self, ofs: usize, index: u32) -> Result<i64> {
        buffer::arr_get_i64(self.bytes(), self.buflen, ofs, index)
    }

    /// See [`buffer::arr_get_f64`].
    pub fn arr_get_f64(&self, ofs: usize, index: u32) -> Result<f64> {
        buffer::arr_get_f64(self.bytes(), self.buflen, ofs, index)
    }

    /// See [`buffer::arr_get_bytes`].
    pub fn arr_get_bytes(&self, ofs: usize, index: u32) -> Result<Lite3Bytes> {
        buffer::arr_get_bytes(self.bytes(), self.buflen, ofs, index)
    }

    /// See [`buffer::arr_get_str`].
    pub fn arr_get_str(&self, ofs: usize, index: u32) -> Result<Lite3Str> {
        buffer::arr_get_str(self.bytes(), self.buflen, ofs, index)
    }

    /// See [`buffer::arr_get_obj`].
    pub fn arr_get_obj(&self, ofs: usize, index: u32) -> Result<usize> {
        buffer::arr_get_obj(self.bytes(), self.buflen, ofs, index)
    }

    /// See [`buffer::arr_get_arr`].
    pub fn arr_get_arr(&self, ofs: usize, index: u32) -> Result<usize> {
        buffer::arr_get_arr(self.bytes(), self.buflen, ofs, index)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Predicates and type enquiry
    // ─────────────────────────────────────────────────────────────────────

    /// See [`buffer::exists`].
    pub fn exists(&self, ofs: usize, key: &str) -> bool {
        buffer::exists(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::count`].
    pub fn count(&self, ofs: usize) -> Result<u32> {
        buffer::count(self.bytes(), self.buflen, ofs)
    }

    /// See [`buffer::root_type`].
    pub fn root_type(&self) -> Result<TypeTag> {
        buffer::root_type(self.bytes(), self.buflen)
    }

    /// See [`buffer::get_type`].
    pub fn get_type(&self, ofs: usize, key: &str) -> Result<TypeTag> {
        buffer::get_type(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::get_type_size`].
    pub fn get_type_size(&self, ofs: usize, key: &str) -> Result<usize> {
        buffer::get_type_size(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::arr_get_type`].
    pub fn arr_get_type(&self, ofs: usize, index: u32) -> Result<TypeTag> {
        buffer::arr_get_type(self.bytes(), self.buflen, ofs, index)
    }

    /// See [`buffer::is_null`].
    pub fn is_null(&self, ofs: usize, key: &str) -> bool {
        buffer::is_null(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::is_bool`].
    pub fn is_bool(&self, ofs: usize, key: &str) -> bool {
        buffer::is_bool(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::is_i64`].
    pub fn is_i64(&self, ofs: usize, key: &str) -> bool {
        buffer::is_i64(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::is_f64`].
    pub fn is_f64(&self, ofs: usize, key: &str) -> bool {
        buffer::is_f64(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::is_bytes`].
    pub fn is_bytes(&self, ofs: usize, key: &str) -> bool {
        buffer::is_bytes(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::is_str`].
    pub fn is_str(&self, ofs: usize, key: &str) -> bool {
        buffer::is_str(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::is_obj`].
    pub fn is_obj(&self, ofs: usize, key: &str) -> bool {
        buffer::is_obj(self.bytes(), self.buflen, ofs, key)
    }

    /// See [`buffer::is_arr`].
    pub fn is_arr(&self, ofs: usize, key: &str) -> bool {
        buffer::is_arr(self.bytes(), self.buflen, ofs, key)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Values and iteration
    // ─────────────────────────────────────────────────────────────────────

    /// See [`value::val_type`].
    pub fn val_type(&self, val_ofs: usize) -> Result<TypeTag> {
        value::val_type(self.bytes(), self.buflen, val_ofs)
    }

    /// See [`iter::iter_create`].
    pub fn iter_create(&self, ofs: usize) -> Result<Lite3Iter> {
        iter::iter_create(self.bytes(), self.buflen, ofs)
    }

    /// See [`iter::iter_next`].
    pub fn iter_next(&self, it: &mut Lite3Iter) -> Result<Option<IterItem>> {
        iter::iter_next(self.bytes(), self.buflen, it)
    }

    // ─────────────────────────────────────────────────────────────────────
    // JSON
    // ─────────────────────────────────────────────────────────────────────

    /// See [`crate::json::json_enc`].
    #[cfg(feature = "json-codec")]
    pub fn json_enc(&self, ofs: usize) -> Result<String> {
        crate::json::json_enc(self.bytes(), self.buflen, ofs)
    }

    /// See [`crate::json::json_enc_pretty`].
    #[cfg(feature = "json-codec")]
    pub fn json_enc_pretty(&self, ofs: usize) -> Result<String> {
        crate::json::json_enc_pretty(self.bytes(), self.buflen, ofs)
    }

    /// See [`crate::json::json_dec`]. Decoding restarts from scratch after
    /// each capacity growth, so the result is identical to a single pass
    /// into a large-enough buffer.
    #[cfg(feature = "json-codec")]
    pub fn json_dec(&mut self, json: &str) -> Result<()> {
        self.mutate(|b, l| crate::json::json_dec(b, l, json))
    }

    /// See [`crate::json::json_dec_file`].
    #[cfg(feature = "json-codec")]
    pub fn json_dec_file(&mut self, path: &std::path::Path) -> Result<()> {
        let text = std::fs::read_to_string(path).map_err(|_| Error::Io)?;
        self.mutate(|b, l| crate::json::json_dec(b, l, &text))
    }
}

impl Default for Lite3Ctx {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for Lite3Ctx {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Lite3Ctx")
            .field("len", &self.buflen)
            .field("capacity", &self.capacity())
            .finish()
    }
}
