//! `ByteBuf`: the backing store of a decoded tuple, either borrowed from the
//! caller or owned.

use std::collections::TryReserveError;

use crate::Bytes;

/// The backing buffer of a decoded structure.
///
/// A `Borrowed` buffer aliases memory owned by the caller for `'a`; nothing is
/// freed when it is dropped. An `Owned` buffer holds a reference-counted
/// allocation which is released together with the last clone.
#[derive(Debug, Clone)]
pub enum ByteBuf<'a> {
    Borrowed(&'a [u8]),
    Owned(Bytes),
}

impl<'a> ByteBuf<'a> {
    /// Creates an owned copy of `data`.
    pub fn try_copy_from_slice(data: &[u8]) -> Result<ByteBuf<'static>, TryReserveError> {
        Bytes::try_copy_from_slice(data).map(ByteBuf::Owned)
    }

    /// Borrows `data` when `borrow` is set, copies it otherwise.
    pub fn from_slice(data: &'a [u8], borrow: bool) -> Result<ByteBuf<'a>, TryReserveError> {
        if borrow {
            Ok(ByteBuf::Borrowed(data))
        } else {
            ByteBuf::try_copy_from_slice(data)
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            ByteBuf::Borrowed(data) => data,
            ByteBuf::Owned(bytes) => bytes,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, ByteBuf::Borrowed(_))
    }

    /// Detaches the buffer from the borrowed lifetime, copying if necessary.
    pub fn try_into_owned(self) -> Result<ByteBuf<'static>, TryReserveError> {
        match self {
            ByteBuf::Borrowed(data) => ByteBuf::try_copy_from_slice(data),
            ByteBuf::Owned(bytes) => Ok(ByteBuf::Owned(bytes)),
        }
    }
}

impl std::ops::Deref for ByteBuf<'_> {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl AsRef<[u8]> for ByteBuf<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl PartialEq for ByteBuf<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl Eq for ByteBuf<'_> {}

impl<'a> From<&'a [u8]> for ByteBuf<'a> {
    fn from(data: &'a [u8]) -> Self {
        ByteBuf::Borrowed(data)
    }
}

impl From<Bytes> for ByteBuf<'static> {
    fn from(bytes: Bytes) -> Self {
        ByteBuf::Owned(bytes)
    }
}
