//! Polyad: an immutable tuple of binary segments.
//!
//! Layout: an [`ntuple`](crate::ntuple) of segment sizes, immediately followed by
//! the concatenated segment bytes:
//!
//! ```text
//! varint(rank) || varint(size_0) || ... || varint(size_{rank-1})
//!     || bytes(item_0) || ... || bytes(item_{rank-1})
//! ```
//!
//! The buffer length must equal the header length plus the sum of sizes
//! exactly; this is the only integrity check of the format.

use std::ops::Range;

use log::debug;
use polyadicts_bytes::ByteBuf;
use polyadicts_common::{Result, error::Error, verify_arg};

use crate::{ntuple, varint};

/// An immutable tuple of byte segments backed by one contiguous buffer.
///
/// `offsets` holds `rank + 1` entries: `offsets[i]` is the position of item `i`
/// within the buffer, `offsets[0]` is the header length and `offsets[rank]` is
/// the total buffer length.
#[derive(Debug, Clone)]
pub struct Polyad<'a> {
    offsets: Vec<usize>,
    data: ByteBuf<'a>,
}

impl Polyad<'static> {
    /// Encodes `items` into a new polyad that owns a single buffer holding the
    /// header and all item bytes.
    ///
    /// # Errors
    ///
    /// `RangeExceeded` if the total size overflows `usize`, `OutOfMemory` if
    /// the buffer cannot be allocated.
    ///
    /// ```
    /// use polyadicts::Polyad;
    ///
    /// let polyad = Polyad::build(&["hello", "world"]).unwrap();
    /// assert_eq!(polyad.raw_bytes(), b"\x02\x05\x05helloworld");
    /// assert_eq!(polyad.item(1).unwrap(), b"world");
    /// ```
    pub fn build<T: AsRef<[u8]>>(items: &[T]) -> Result<Polyad<'static>> {
        let sizes = items.iter().map(|item| item.as_ref().len() as u64);
        let header_len = ntuple::size_of(sizes.clone())?;
        let total_len = items.iter().try_fold(header_len, |total, item| {
            total
                .checked_add(item.as_ref().len())
                .ok_or_else(|| Error::range_exceeded("polyad size"))
        })?;

        let mut offsets = Vec::new();
        offsets
            .try_reserve_exact(items.len() + 1)
            .map_err(|_| Error::out_of_memory(items.len() + 1))?;
        let mut buf = crate::alloc_zeroed(total_len)?;

        let mut off = ntuple::pack(sizes, &mut buf)?;
        debug_assert_eq!(off, header_len);
        for item in items {
            let item = item.as_ref();
            offsets.push(off);
            buf[off..off + item.len()].copy_from_slice(item);
            off += item.len();
        }
        offsets.push(off);

        Ok(Polyad {
            offsets,
            data: ByteBuf::Owned(buf.into_bytes()),
        })
    }
}

impl<'a> Polyad<'a> {
    /// Decodes a polyad from `buffer`.
    ///
    /// With `borrow` set the polyad aliases `buffer` and no bytes are copied;
    /// otherwise the buffer is copied into an owned allocation.
    ///
    /// # Errors
    ///
    /// - `Truncated` if the header ends early.
    /// - `RangeExceeded` for an over-long varint or a size sum overflowing `usize`.
    /// - `Malformed` if the header length plus the sum of sizes differs from
    ///   `buffer.len()`.
    pub fn load(buffer: &'a [u8], borrow: bool) -> Result<Polyad<'a>> {
        let offsets = Self::decode_offsets(buffer).inspect_err(|e| {
            debug!("rejecting polyad buffer of {} bytes: {e}", buffer.len());
        })?;
        let data = ByteBuf::from_slice(buffer, borrow)
            .map_err(|_| Error::out_of_memory(buffer.len()))?;
        Ok(Polyad { offsets, data })
    }

    /// Reads the size header and builds the offset table. Nothing is published
    /// until every size has been checked against the buffer bound.
    fn decode_offsets(buffer: &[u8]) -> Result<Vec<usize>> {
        let (rank, mut off) = ntuple::read_rank(buffer)?;
        if rank > buffer.len() - off {
            return Err(Error::truncated("polyad header"));
        }
        let mut offsets = Vec::new();
        offsets
            .try_reserve_exact(rank + 1)
            .map_err(|_| Error::out_of_memory(rank + 1))?;
        for _ in 0..rank {
            let (size, len) = varint::decode_usize(&buffer[off..])?;
            offsets.push(size);
            off += len;
        }

        let mut pos = off;
        for slot in offsets.iter_mut() {
            let size = *slot;
            *slot = pos;
            pos = pos
                .checked_add(size)
                .ok_or_else(|| Error::range_exceeded("polyad size"))?;
        }
        offsets.push(pos);

        if pos != buffer.len() {
            return Err(Error::malformed(
                "polyad",
                format!(
                    "header declares {pos} bytes, buffer holds {}",
                    buffer.len()
                ),
            ));
        }
        Ok(offsets)
    }

    /// Number of items.
    #[inline]
    pub fn rank(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rank()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rank() == 0
    }

    /// Length of the size header, in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        self.offsets[0]
    }

    /// Total encoded length, in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the polyad aliases a caller-owned buffer.
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        self.data.is_borrowed()
    }

    /// Byte range of item `i` within [`raw_bytes`](Self::raw_bytes).
    pub fn item_range(&self, i: usize) -> Result<Range<usize>> {
        if i < self.rank() {
            Ok(self.offsets[i]..self.offsets[i + 1])
        } else {
            Err(Error::index_out_of_range(i, self.rank()))
        }
    }

    /// Zero-copy view of item `i`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `i >= rank`.
    pub fn item(&self, i: usize) -> Result<&[u8]> {
        let range = self.item_range(i)?;
        Ok(&self.data[range])
    }

    /// The entire encoded buffer, header included.
    #[inline]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies the encoded polyad into `dst`, returning the number of bytes copied.
    ///
    /// # Errors
    ///
    /// `InsufficientSpace` if `dst` is shorter than [`size`](Self::size).
    pub fn copy_into(&self, dst: &mut [u8]) -> Result<usize> {
        let src = self.raw_bytes();
        if dst.len() < src.len() {
            return Err(Error::insufficient_space(src.len(), dst.len()));
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    /// Detaches the polyad from a borrowed buffer by copying it.
    pub fn into_owned(self) -> Result<Polyad<'static>> {
        let len = self.data.len();
        let data = self
            .data
            .try_into_owned()
            .map_err(|_| Error::out_of_memory(len))?;
        Ok(Polyad {
            offsets: self.offsets,
            data,
        })
    }

    pub fn iter(&self) -> PolyadIter<'_, 'a> {
        PolyadIter {
            polyad: self,
            index: 0,
        }
    }
}

impl AsRef<[u8]> for Polyad<'_> {
    fn as_ref(&self) -> &[u8] {
        self.raw_bytes()
    }
}

/// Compares the encoded bytes. Built polyads are minimal, so two of them are
/// equal exactly when their items are.
impl PartialEq for Polyad<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.raw_bytes() == other.raw_bytes()
    }
}

impl Eq for Polyad<'_> {}

impl<'p, 'a> IntoIterator for &'p Polyad<'a> {
    type Item = &'p [u8];
    type IntoIter = PolyadIter<'p, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the items of a [`Polyad`].
pub struct PolyadIter<'p, 'a> {
    polyad: &'p Polyad<'a>,
    index: usize,
}

impl<'p> Iterator for PolyadIter<'p, '_> {
    type Item = &'p [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let offsets = &self.polyad.offsets;
        if self.index + 1 < offsets.len() {
            let range = offsets[self.index]..offsets[self.index + 1];
            self.index += 1;
            Some(&self.polyad.data.as_slice()[range])
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.polyad.rank() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PolyadIter<'_, '_> {}

/// Three-phase polyad construction: declare the rank, set every slot, finish.
///
/// Slots may be set in any order and overwritten before `finish`.
#[derive(Debug)]
pub struct PolyadBuilder<'s> {
    slots: Vec<Option<&'s [u8]>>,
}

impl<'s> PolyadBuilder<'s> {
    pub fn new(rank: usize) -> Result<PolyadBuilder<'s>> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(rank)
            .map_err(|_| Error::out_of_memory(rank))?;
        slots.resize(rank, None);
        Ok(PolyadBuilder { slots })
    }

    pub fn rank(&self) -> usize {
        self.slots.len()
    }

    /// Sets item `i`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `i` is not below the declared rank.
    pub fn set(&mut self, i: usize, item: &'s [u8]) -> Result<()> {
        verify_arg!(i, i < self.rank());
        self.slots[i] = Some(item);
        Ok(())
    }

    /// Packs all items into a single owned buffer.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any slot was never set, otherwise as [`Polyad::build`].
    pub fn finish(self) -> Result<Polyad<'static>> {
        let items = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| Error::invalid_arg("slot", format!("item {i} was not set")))
            })
            .collect::<Result<Vec<_>>>()?;
        Polyad::build(&items)
    }
}
