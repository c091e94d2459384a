use std::{collections::TryReserveError, sync::Arc};

/// A byte vector with fallible growth.
///
/// Every allocating operation reports allocation failure through
/// [`TryReserveError`] instead of aborting the process.
#[derive(Clone, Default)]
pub struct ByteVec {
    inner: Vec<u8>,
}

impl ByteVec {
    /// Creates a new empty vector with no capacity allocation.
    pub fn new() -> ByteVec {
        ByteVec { inner: Vec::new() }
    }

    /// Creates a new vector able to hold at least `capacity` bytes without
    /// reallocating.
    pub fn try_with_capacity(capacity: usize) -> Result<ByteVec, TryReserveError> {
        let mut inner = Vec::new();
        inner.try_reserve_exact(capacity)?;
        Ok(ByteVec { inner })
    }

    /// Creates a new vector of specified length, filled with zeros.
    pub fn try_zeroed(len: usize) -> Result<ByteVec, TryReserveError> {
        let mut vec = ByteVec::try_with_capacity(len)?;
        vec.inner.resize(len, 0);
        Ok(vec)
    }

    /// Creates a new vector containing a copy of the provided slice.
    pub fn try_copy_from_slice(data: &[u8]) -> Result<ByteVec, TryReserveError> {
        let mut vec = ByteVec::try_with_capacity(data.len())?;
        vec.inner.extend_from_slice(data);
        Ok(vec)
    }

    /// Returns the number of bytes in the vector.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the vector contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of bytes the vector can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.inner
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.inner
    }

    /// Resizes the vector to the specified length, filling any new space with
    /// the given value.
    ///
    /// Growth reserves exactly the requested length.
    pub fn try_resize(&mut self, new_len: usize, value: u8) -> Result<(), TryReserveError> {
        let len = self.len();
        if new_len > len {
            self.inner.try_reserve_exact(new_len - len)?;
        }
        self.inner.resize(new_len, value);
        Ok(())
    }

    /// Consumes the `ByteVec`, returning the inner vector.
    pub fn into_vec(self) -> Vec<u8> {
        self.inner
    }
}

impl ByteVec {
    /// Reads a plain-old-data value stored at `offset`, which does not need to
    /// be aligned for `T`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + size_of::<T>()` exceeds the vector length.
    #[inline]
    pub fn read_typed<T>(&self, offset: usize) -> T
    where
        T: bytemuck::AnyBitPattern,
    {
        let size = std::mem::size_of::<T>();
        bytemuck::pod_read_unaligned(&self.inner[offset..offset + size])
    }

    /// Overwrites the bytes at `offset` with the representation of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + size_of::<T>()` exceeds the vector length.
    #[inline]
    pub fn write_typed<T>(&mut self, offset: usize, value: T)
    where
        T: bytemuck::NoUninit,
    {
        let bytes = bytemuck::bytes_of(&value);
        self.inner[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
}

impl std::ops::Deref for ByteVec {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::ops::DerefMut for ByteVec {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

impl std::fmt::Debug for ByteVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteVec")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl From<Vec<u8>> for ByteVec {
    fn from(inner: Vec<u8>) -> Self {
        ByteVec { inner }
    }
}

/// `Buffer` represents a contiguous, immutable memory region with shared ownership
/// semantics.
///
/// Cloning a `Buffer` does not copy the underlying data.
#[derive(Clone, Default)]
pub struct Buffer {
    owner: Arc<ByteVec>,
}

impl Buffer {
    /// Creates a new empty buffer.
    pub fn new() -> Buffer {
        Self::from_byte_vec(ByteVec::new())
    }

    /// Creates a new buffer that takes ownership of the provided `ByteVec`.
    pub fn from_byte_vec(vec: ByteVec) -> Buffer {
        Buffer {
            owner: Arc::new(vec),
        }
    }

    /// Creates a new buffer containing a copy of the provided slice.
    pub fn try_copy_from_slice(data: &[u8]) -> Result<Buffer, TryReserveError> {
        ByteVec::try_copy_from_slice(data).map(Buffer::from_byte_vec)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.owner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty()
    }

    /// Returns a reference to the buffer contents as a byte slice.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.owner.as_slice()
    }
}

impl std::ops::Deref for Buffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_slice().fmt(f)
    }
}

impl From<ByteVec> for Buffer {
    fn from(vec: ByteVec) -> Buffer {
        Buffer::from_byte_vec(vec)
    }
}
