//! Compact binary encoding of ordered tuples of variable-length data.
//!
//! # Main Components
//!
//! - [`varint`]: base-128 continuation-bit integer codec, the primitive every
//!   other format is built on.
//! - [`ntuple`]: a rank-prefixed tuple of natural numbers packed as varints.
//! - [`polyid::Polyid`]: a decoded ntuple that keeps its backing bytes, so the
//!   same tuple can be read as integers or re-transmitted verbatim.
//! - [`polyad::Polyad`]: an immutable tuple of byte segments, an ntuple of
//!   segment sizes followed by the concatenated segments. Decoding is zero-copy.
//! - [`varyad::Varyad`]: a mutable, append-only tuple of byte segments in one
//!   growable buffer.
//!
//! # Ownership
//!
//! Structures decoded from a caller buffer either borrow it (`'a`) or hold an
//! owned copy; see [`polyadicts_bytes::ByteBuf`]. Structures built from items
//! always own a single freshly allocated buffer.
//!
//! # Errors
//!
//! All operations return [`Result`]; the error kinds are listed in
//! [`ErrorKind`]. Decoders validate every length against the input bound
//! before trusting it.

pub mod ntuple;
pub mod polyad;
pub mod polyid;
pub mod varint;
pub mod varyad;

pub use polyad::{Polyad, PolyadBuilder};
pub use polyadicts_bytes::{ByteBuf, Bytes};
pub use polyadicts_common::{
    Result,
    error::{Error, ErrorKind},
};
pub use polyid::{Polyid, PolyidBuilder};
pub use varyad::Varyad;

use polyadicts_bytes::BytesMut;

/// Allocates a zero-filled buffer of `len` bytes, reporting allocation failure
/// as `OutOfMemory`.
pub(crate) fn alloc_zeroed(len: usize) -> Result<BytesMut> {
    BytesMut::try_zeroed(len).map_err(|_| Error::out_of_memory(len))
}
