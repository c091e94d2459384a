//! Polyid: a decoded ntuple of natural numbers that retains its backing bytes.

use log::debug;
use polyadicts_bytes::ByteBuf;
use polyadicts_common::{Result, error::Error, verify_arg};

use crate::ntuple;

/// A tuple of natural numbers together with its ntuple encoding.
///
/// The values are decoded once; [`raw_bytes`](Self::raw_bytes) returns the
/// encoding verbatim without re-packing.
#[derive(Debug, Clone)]
pub struct Polyid<'a> {
    values: Vec<u64>,
    data: ByteBuf<'a>,
}

impl Polyid<'static> {
    /// Packs `values` into a new, owned polyid.
    ///
    /// ```
    /// use polyadicts::Polyid;
    ///
    /// let polyid = Polyid::new(vec![0, 1, 2, 3]).unwrap();
    /// assert_eq!(polyid.raw_bytes(), b"\x04\x00\x01\x02\x03");
    /// ```
    pub fn new(values: impl Into<Vec<u64>>) -> Result<Polyid<'static>> {
        let values = values.into();
        let size = ntuple::size_of(values.iter().copied())?;
        let mut buf = crate::alloc_zeroed(size)?;
        ntuple::pack(values.iter().copied(), &mut buf)?;
        Ok(Polyid {
            values,
            data: ByteBuf::Owned(buf.into_bytes()),
        })
    }
}

impl<'a> Polyid<'a> {
    /// Decodes a polyid occupying the whole of `buffer`.
    ///
    /// With `borrow` set the polyid aliases `buffer`, otherwise the bytes are copied.
    ///
    /// # Errors
    ///
    /// `Truncated`, `RangeExceeded` or `Malformed` for corrupt input; trailing
    /// bytes after the tuple are `Malformed`.
    pub fn load(buffer: &'a [u8], borrow: bool) -> Result<Polyid<'a>> {
        let values = ntuple::unpack_exact(buffer).inspect_err(|e| {
            debug!("rejecting polyid buffer of {} bytes: {e}", buffer.len());
        })?;
        let data = ByteBuf::from_slice(buffer, borrow)
            .map_err(|_| Error::out_of_memory(buffer.len()))?;
        Ok(Polyid { values, data })
    }

    /// Decodes a polyid embedded at the start of `buffer`.
    ///
    /// The result borrows only the bytes the tuple occupies; anything after
    /// them is left to the caller.
    pub fn load_prefix(buffer: &'a [u8]) -> Result<Polyid<'a>> {
        let (rank, _) = ntuple::read_rank(buffer)?;
        let (values, len) = ntuple::unpack(buffer, rank)?;
        Ok(Polyid {
            values,
            data: ByteBuf::Borrowed(&buffer[..len]),
        })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value `i` of the tuple.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `i >= rank`.
    pub fn get(&self, i: usize) -> Result<u64> {
        self.values
            .get(i)
            .copied()
            .ok_or_else(|| Error::index_out_of_range(i, self.rank()))
    }

    #[inline]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u64>> {
        self.values.iter().copied()
    }

    /// The ntuple encoding of the values.
    #[inline]
    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn is_borrowed(&self) -> bool {
        self.data.is_borrowed()
    }

    /// Copies the encoding into `dst`, returning the number of bytes copied.
    pub fn copy_into(&self, dst: &mut [u8]) -> Result<usize> {
        let src = self.raw_bytes();
        if dst.len() < src.len() {
            return Err(Error::insufficient_space(src.len(), dst.len()));
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    pub fn into_owned(self) -> Result<Polyid<'static>> {
        let len = self.data.len();
        let data = self
            .data
            .try_into_owned()
            .map_err(|_| Error::out_of_memory(len))?;
        Ok(Polyid {
            values: self.values,
            data,
        })
    }

    pub fn into_values(self) -> Vec<u64> {
        self.values
    }
}

impl AsRef<[u8]> for Polyid<'_> {
    fn as_ref(&self) -> &[u8] {
        self.raw_bytes()
    }
}

impl PartialEq for Polyid<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Polyid<'_> {}

/// Three-phase polyid construction: declare the rank, set every value, finish.
#[derive(Debug)]
pub struct PolyidBuilder {
    slots: Vec<Option<u64>>,
}

impl PolyidBuilder {
    pub fn new(rank: usize) -> Result<PolyidBuilder> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(rank)
            .map_err(|_| Error::out_of_memory(rank.saturating_mul(16)))?;
        slots.resize(rank, None);
        Ok(PolyidBuilder { slots })
    }

    pub fn rank(&self) -> usize {
        self.slots.len()
    }

    /// Sets value `i`; a slot may be overwritten until `finish`.
    pub fn set(&mut self, i: usize, value: u64) -> Result<()> {
        verify_arg!(i, i < self.rank());
        self.slots[i] = Some(value);
        Ok(())
    }

    pub fn finish(self) -> Result<Polyid<'static>> {
        let values = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| Error::invalid_arg("slot", format!("value {i} was not set")))
            })
            .collect::<Result<Vec<_>>>()?;
        Polyid::new(values)
    }
}
