//! Byte buffers for use by the polyadicts infrastructure: mutable, shared immutable,
//! and the borrowed-or-owned backing store of decoded tuples.

use std::collections::TryReserveError;

use buffer::{Buffer, ByteVec};

pub mod align;
pub mod buffer;
pub mod byte_buf;

pub use byte_buf::ByteBuf;

/// A mutable buffer of bytes, conceptually similar to a `Vec<u8>`.
///
/// This struct is designed for building an immutable [`Bytes`] instance. Unlike
/// `Vec<u8>`, every allocating method is fallible.
#[derive(Debug, Default)]
pub struct BytesMut(ByteVec);

impl BytesMut {
    /// Creates a new empty `BytesMut`.
    pub fn new() -> BytesMut {
        BytesMut(ByteVec::new())
    }

    /// Creates a new `BytesMut` with the specified length, filled with zero bytes.
    pub fn try_zeroed(len: usize) -> Result<BytesMut, TryReserveError> {
        ByteVec::try_zeroed(len).map(BytesMut)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resizes the buffer to the specified length.
    ///
    /// If `new_len` is greater than the current length, the buffer is extended with the given `value`.
    /// If `new_len` is less than the current length, the buffer is simply truncated.
    #[inline]
    pub fn try_resize(&mut self, new_len: usize, value: u8) -> Result<(), TryReserveError> {
        self.0.try_resize(new_len, value)
    }

    /// Returns a slice of the buffer's contents.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self
    }

    /// Reads a plain-old-data value stored (unaligned) at `offset`.
    #[inline]
    pub fn read_typed<T: bytemuck::AnyBitPattern>(&self, offset: usize) -> T {
        self.0.read_typed(offset)
    }

    /// Stores a plain-old-data value (unaligned) at `offset`.
    #[inline]
    pub fn write_typed<T: bytemuck::NoUninit>(&mut self, offset: usize, value: T) {
        self.0.write_typed(offset, value)
    }

    /// Consumes the `BytesMut` and converts it into an immutable `Bytes`.
    pub fn into_bytes(self) -> Bytes {
        Bytes(Buffer::from_byte_vec(self.0))
    }

    /// Consumes the `BytesMut` and returns the underlying `ByteVec`.
    pub fn into_inner(self) -> ByteVec {
        self.0
    }
}

impl std::ops::Deref for BytesMut {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl std::ops::DerefMut for BytesMut {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut_slice()
    }
}

/// A contiguous, immutable memory region that can be shared with other buffers and across
/// thread boundaries.
///
/// Cloning `Bytes` does not copy the underlying data.
#[derive(Debug, Clone, Default)]
pub struct Bytes(Buffer);

impl Bytes {
    #[inline]
    pub fn new() -> Self {
        Bytes(Buffer::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Creates a new `Bytes` by copying data from a slice.
    pub fn try_copy_from_slice(data: &[u8]) -> Result<Bytes, TryReserveError> {
        Buffer::try_copy_from_slice(data).map(Bytes)
    }
}

impl std::ops::Deref for Bytes {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl PartialEq for Bytes {
    fn eq(&self, other: &Self) -> bool {
        self.as_ref() == other.as_ref()
    }
}

impl Eq for Bytes {}

impl From<Buffer> for Bytes {
    fn from(buf: Buffer) -> Self {
        Bytes(buf)
    }
}

impl From<BytesMut> for Bytes {
    fn from(bytes: BytesMut) -> Self {
        bytes.into_bytes()
    }
}

impl From<Vec<u8>> for Bytes {
    /// Takes ownership of the vector without copying.
    fn from(vec: Vec<u8>) -> Self {
        Bytes(Buffer::from_byte_vec(ByteVec::from(vec)))
    }
}
