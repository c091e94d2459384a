//! Varyad: a mutable, append-only tuple of byte segments in one growable buffer.
//!
//! The buffer is an arena with two cursors. Item bytes are packed forward from
//! the end of the header; the footer, one word per item holding the cumulative
//! end offset of that item, grows backward from the top of the buffer:
//!
//! ```text
//! [rank][capacity][item_0 item_1 ... ->      free      <- end_1 end_0]
//! ^ 0             ^ HEADER_SIZE                                   capacity ^
//! ```
//!
//! Header and footer words are native-endian `usize`. The layout is an
//! in-memory representation only; use [`Varyad::to_polyad`] to obtain the
//! interchange format.

use std::ops::Range;

use log::trace;
use polyadicts_bytes::{BytesMut, align};
use polyadicts_common::{Result, error::Error};

use crate::polyad::Polyad;

/// Size of a header or footer word.
pub const WORD: usize = size_of::<usize>();

/// The header holds the rank and the capacity.
pub const HEADER_SIZE: usize = 2 * WORD;

/// Capacity used when the caller has no size hint.
pub const DEFAULT_CAPACITY: usize = 512;

const RANK_OFFSET: usize = 0;
const CAPACITY_OFFSET: usize = WORD;

pub struct Varyad {
    buf: BytesMut,
    rank: usize,
    /// Length of the packed item region.
    data_len: usize,
}

impl Varyad {
    /// Creates an empty varyad with room for at least `capacity_hint` bytes,
    /// header included.
    ///
    /// The hint is clamped to [`HEADER_SIZE`] and rounded up to a multiple of
    /// [`WORD`].
    ///
    /// # Errors
    ///
    /// `OutOfMemory` if the buffer cannot be allocated.
    pub fn new(capacity_hint: usize) -> Result<Varyad> {
        let hint = capacity_hint.max(HEADER_SIZE);
        let capacity = align::checked_align_up(hint, WORD)
            .unwrap_or_else(|| align::align_down(usize::MAX, WORD));
        debug_assert!(align::is_aligned(capacity, WORD));
        let buf = crate::alloc_zeroed(capacity)?;
        let mut varyad = Varyad {
            buf,
            rank: 0,
            data_len: 0,
        };
        varyad.write_header();
        Ok(varyad)
    }

    pub fn with_default_capacity() -> Result<Varyad> {
        Varyad::new(DEFAULT_CAPACITY)
    }

    /// Creates a varyad holding `items`, growing as needed.
    pub fn try_from_items<I>(items: I) -> Result<Varyad>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut varyad = Varyad::with_default_capacity()?;
        varyad.try_extend(items)?;
        Ok(varyad)
    }

    /// The capacity that holds exactly the items with the given lengths.
    ///
    /// ```
    /// use polyadicts::Varyad;
    ///
    /// let capacity = Varyad::required_capacity([4, 8, 4]).unwrap();
    /// let mut varyad = Varyad::new(capacity).unwrap();
    /// for item in [&b"abcd"[..], b"efghijkl", b"mnop"] {
    ///     varyad.push(item, false).unwrap();
    /// }
    /// assert_eq!(varyad.available(), 0);
    /// ```
    pub fn required_capacity<I>(item_lens: I) -> Result<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        let total = item_lens.into_iter().try_fold(HEADER_SIZE, |total, len| {
            total
                .checked_add(len)
                .and_then(|t| t.checked_add(WORD))
                .ok_or_else(|| Error::range_exceeded("varyad capacity"))
        })?;
        align::checked_align_up(total, WORD).ok_or_else(|| Error::range_exceeded("varyad capacity"))
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rank
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rank == 0
    }

    /// Total size of the backing buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Combined length of all items.
    #[inline]
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Free bytes between the item region and the footer.
    #[inline]
    pub fn available(&self) -> usize {
        self.back_cursor() - self.front_cursor()
    }

    /// Appends `item`, returning the capacity after the push.
    ///
    /// The push needs `item.len() + WORD` free bytes. When they are missing and
    /// `allow_grow` is set, the capacity is doubled until the item fits; the
    /// footer moves to the new top of the buffer and the space in between is
    /// cleared. Previously pushed items never move.
    ///
    /// # Errors
    ///
    /// `OutOfMemory` if the item does not fit and growth is not allowed, or if
    /// the larger buffer cannot be allocated. The varyad is unchanged on error.
    pub fn push(&mut self, item: impl AsRef<[u8]>, allow_grow: bool) -> Result<usize> {
        let item = item.as_ref();
        let required = item
            .len()
            .checked_add(WORD)
            .ok_or_else(|| Error::out_of_memory(usize::MAX))?;
        if self.available() < required {
            if !allow_grow {
                return Err(Error::out_of_memory(required));
            }
            self.grow(required)?;
        }

        let front = self.front_cursor();
        self.buf[front..front + item.len()].copy_from_slice(item);
        self.data_len += item.len();
        let slot = self.footer_slot(self.rank);
        self.buf.write_typed::<usize>(slot, self.data_len);
        self.rank += 1;
        self.buf.write_typed::<usize>(RANK_OFFSET, self.rank);
        Ok(self.capacity())
    }

    /// Appends every item of `items`, growing as needed.
    pub fn try_extend<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        for item in items {
            self.push(item, true)?;
        }
        Ok(())
    }

    /// Item `i`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `i >= rank`.
    pub fn item(&self, i: usize) -> Result<&[u8]> {
        if i >= self.rank {
            return Err(Error::index_out_of_range(i, self.rank));
        }
        Ok(&self.buf[self.item_range(i)])
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        (0..self.rank).map(|i| &self.buf[self.item_range(i)])
    }

    /// The whole backing buffer: header, items, free space and footer.
    #[inline]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Compacts the items into an owned [`Polyad`].
    pub fn to_polyad(&self) -> Result<Polyad<'static>> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(self.rank)
            .map_err(|_| Error::out_of_memory(self.rank.saturating_mul(2 * WORD)))?;
        items.extend(self.iter());
        Polyad::build(&items)
    }

    fn grow(&mut self, required: usize) -> Result<()> {
        let old_capacity = self.capacity();
        let used = old_capacity - self.available();
        let mut new_capacity = old_capacity;
        while new_capacity - used < required {
            new_capacity = new_capacity
                .checked_mul(2)
                .ok_or_else(|| Error::out_of_memory(usize::MAX))?;
        }

        self.buf
            .try_resize(new_capacity, 0)
            .map_err(|_| Error::out_of_memory(new_capacity))?;

        let footer_len = self.rank * WORD;
        let old_back = old_capacity - footer_len;
        let new_back = new_capacity - footer_len;
        self.buf.copy_within(old_back..old_capacity, new_back);
        let front = self.front_cursor();
        self.buf[front..new_back].fill(0);
        self.buf.write_typed::<usize>(CAPACITY_OFFSET, new_capacity);

        trace!(
            "varyad grew from {old_capacity} to {new_capacity} bytes (rank {}, item bytes {})",
            self.rank, self.data_len
        );
        Ok(())
    }

    fn write_header(&mut self) {
        let capacity = self.capacity();
        self.buf.write_typed::<usize>(RANK_OFFSET, self.rank);
        self.buf.write_typed::<usize>(CAPACITY_OFFSET, capacity);
    }

    #[inline]
    fn front_cursor(&self) -> usize {
        HEADER_SIZE + self.data_len
    }

    #[inline]
    fn back_cursor(&self) -> usize {
        self.capacity() - self.rank * WORD
    }

    #[inline]
    fn footer_slot(&self, i: usize) -> usize {
        self.capacity() - (i + 1) * WORD
    }

    fn item_end(&self, i: usize) -> usize {
        self.buf.read_typed::<usize>(self.footer_slot(i))
    }

    fn item_range(&self, i: usize) -> Range<usize> {
        let start = if i == 0 { 0 } else { self.item_end(i - 1) };
        HEADER_SIZE + start..HEADER_SIZE + self.item_end(i)
    }
}

impl std::fmt::Debug for Varyad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Varyad")
            .field("rank", &self.rank)
            .field("capacity", &self.capacity())
            .field("data_len", &self.data_len)
            .finish()
    }
}
