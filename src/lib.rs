//! Lite³ — an in-place, zero-copy, JSON-compatible binary serialization
//! format.
//!
//! A single contiguous byte buffer holds a self-describing, mutable,
//! hierarchical document rooted in an object or array. Each container is a
//! B-tree over hashed keys (or array indices) whose nodes, key records, and
//! value records all live inside the same buffer, so lookups, mutations,
//! and iteration run directly on the serialized form — no parse tree, no
//! intermediate representation, no per-read allocation.
//!
//! Two API layers are provided:
//!
//! - the **buffer API** ([`buffer`]): free functions over a caller-provided
//!   `(buf, buflen)` pair. Mutations fail with [`Error::OutOfSpace`] when
//!   the capacity runs out and the caller retries after growing.
//! - the **context API** ([`Lite3Ctx`]): an owning wrapper that grows its
//!   allocation automatically and otherwise mirrors the buffer API.
//!
//! ```
//! use lite3::Lite3Ctx;
//!
//! let mut ctx = Lite3Ctx::new();
//! ctx.init_obj()?;
//! ctx.set_str(0, "title", "C Programming")?;
//! ctx.set_i64(0, "pages", 272)?;
//!
//! assert_eq!(ctx.get_i64(0, "pages")?, 272);
//! let title = ctx.get_str(0, "title")?;
//! assert_eq!(title.resolve(ctx.as_bytes()), Some("C Programming"));
//! # Ok::<(), lite3::Error>(())
//! ```
//!
//! # Caveats
//!
//! - The format is little-endian only and assumes 8-byte IEEE-754 doubles.
//! - Overwritten space is never reclaimed; a heavily mutated buffer grows
//!   until re-encoded.
//! - Writers are not synchronized. One writer at a time; readers may share
//!   a buffer freely in the absence of a writer.
//! - String/bytes getters return generation-checked handles
//!   ([`Lite3Str`], [`Lite3Bytes`]) whose `resolve` fails after any
//!   mutation instead of dangling.

#[cfg(target_endian = "big")]
compile_error!("byte order must be little-endian");

pub mod buffer;
mod check;
pub mod ctx;
#[cfg(feature = "debug-print")]
pub mod debug;
mod error;
pub mod hash;
pub mod iter;
pub mod node;
mod tree;
pub mod types;
pub mod value;

#[cfg(feature = "json-codec")]
pub mod json;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level re-exports for the common entry points
// ─────────────────────────────────────────────────────────────────────────────

/// Operation outcome; see [`Error`] for the failure taxonomy.
pub use error::{Error, Result};

/// Value type tags of the wire format.
pub use types::TypeTag;
/// Precomputed key hash + size, `const`-computable for literal keys.
pub use types::KeyData;
/// Generation-checked reference handles.
pub use types::{Lite3Bytes, Lite3Str};
/// Addressing ceiling and probe limit.
pub use types::{BUF_SIZE_MAX, HASH_PROBE_MAX};

/// DJB2 hashing, usable in `const` contexts.
pub use hash::{key_data, key_hash};

/// Buffer-API operations (also available through [`buffer`]).
pub use buffer::{count, exists, init_arr, init_obj, root_type};

/// Iteration over one container's entries.
pub use iter::{iter_create, iter_next, IterItem, Lite3Iter};

/// Owning auto-growing context.
pub use ctx::{Lite3Ctx, CONTEXT_BUF_SIZE_MIN};

/// Node geometry of this build.
pub use node::{NODE_ALIGNMENT, NODE_KEYS, NODE_SIZE, TREE_HEIGHT_MAX};

#[cfg(feature = "json-codec")]
pub use json::{json_dec, json_dec_file, json_enc, json_enc_pretty, JSON_NESTING_DEPTH_MAX};
