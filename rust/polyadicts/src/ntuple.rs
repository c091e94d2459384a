//! Ntuple: a rank-prefixed tuple of natural numbers packed as consecutive varints.
//!
//! Layout: `varint(rank) || varint(value_0) || ... || varint(value_{rank-1})`.
//!
//! The same layout is used standalone (see [`crate::polyid`]) and as the size
//! header of a [`crate::polyad`].

use polyadicts_common::{Result, error::Error, verify_data};

use crate::varint;

/// Computes the packed size of an ntuple holding `values`.
///
/// # Errors
///
/// `RangeExceeded` if the total size does not fit in `usize`.
pub fn size_of<I>(values: I) -> Result<usize>
where
    I: IntoIterator<Item = u64>,
    I::IntoIter: ExactSizeIterator,
{
    let mut values = values.into_iter();
    let rank_len = varint::encoded_len(values.len() as u64);
    values.try_fold(rank_len, |size, value| {
        size.checked_add(varint::encoded_len(value))
            .ok_or_else(|| Error::range_exceeded("ntuple size"))
    })
}

/// Packs `values` at the start of `dst`, returning the number of bytes written.
///
/// The required size is verified up front: on error nothing has been written.
///
/// # Errors
///
/// `RangeExceeded` if the packed size overflows, `InsufficientSpace` if `dst`
/// is too short.
pub fn pack<I>(values: I, dst: &mut [u8]) -> Result<usize>
where
    I: IntoIterator<Item = u64>,
    I::IntoIter: ExactSizeIterator + Clone,
{
    let values = values.into_iter();
    let size = size_of(values.clone())?;
    if dst.len() < size {
        return Err(Error::insufficient_space(size, dst.len()));
    }
    let mut off = varint::encode_into(values.len() as u64, dst)?;
    for value in values {
        off += varint::encode_into(value, &mut dst[off..])?;
    }
    debug_assert_eq!(off, size);
    Ok(off)
}

/// Packs `values` into a freshly allocated vector of exactly the packed size.
pub fn pack_to_vec(values: &[u64]) -> Result<Vec<u8>> {
    let size = size_of(values.iter().copied())?;
    let mut buf = crate::alloc_zeroed(size)?;
    pack(values.iter().copied(), &mut buf)?;
    Ok(buf.into_inner().into_vec())
}

/// Reads the rank of the ntuple at the start of `src`.
///
/// Returns the rank and the number of bytes it occupies.
pub fn read_rank(src: &[u8]) -> Result<(usize, usize)> {
    varint::decode_usize(src)
}

/// Reads an ntuple of known `rank` from the start of `src`.
///
/// Returns the values and the number of bytes consumed. Bytes after the tuple
/// are ignored, which allows the tuple to be embedded as a header.
///
/// # Errors
///
/// - `RankMismatch` if the stored rank differs from `rank`.
/// - `Truncated` if `src` ends before all values are read.
/// - `RangeExceeded` / `Malformed` for corrupt varints.
pub fn unpack(src: &[u8], rank: usize) -> Result<(Vec<u64>, usize)> {
    let (stored_rank, mut off) = read_rank(src)?;
    if stored_rank != rank {
        return Err(Error::rank_mismatch(rank, stored_rank));
    }
    // Each value needs at least one byte; reject before allocating.
    if rank > src.len() - off {
        return Err(Error::truncated("ntuple values"));
    }
    let mut values = Vec::new();
    values
        .try_reserve_exact(rank)
        .map_err(|_| Error::out_of_memory(rank.saturating_mul(8)))?;
    for _ in 0..rank {
        let (value, len) = varint::decode(&src[off..])?;
        values.push(value);
        off += len;
    }
    Ok((values, off))
}

/// Reads an ntuple that must occupy the whole of `src`.
///
/// # Errors
///
/// Same as [`unpack`], plus `Malformed` if bytes remain after the tuple.
pub fn unpack_exact(src: &[u8]) -> Result<Vec<u64>> {
    let (rank, _) = read_rank(src)?;
    let (values, len) = unpack(src, rank)?;
    verify_data!(ntuple, len == src.len());
    Ok(values)
}

#[cfg(test)]
mod tests {
    use polyadicts_common::error::ErrorKind;

    use super::*;

    #[test]
    fn test_size_of() {
        assert_eq!(size_of([]).unwrap(), 1);
        assert_eq!(size_of([0, 1, 2, 3]).unwrap(), 5);
        assert_eq!(size_of([300, u64::MAX]).unwrap(), 1 + 2 + 10);
    }

    #[test]
    fn test_pack() {
        let mut buf = [0u8; 16];
        let n = pack([2, 0, 3], &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x03, 0x02, 0x00, 0x03]);

        let n = pack([], &mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x00]);
    }

    #[test]
    fn test_pack_insufficient_space_writes_nothing() {
        let mut buf = [0xEEu8; 3];
        let err = pack([1, 300], &mut buf).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InsufficientSpace {
                required: 4,
                available: 3
            }
        ));
        assert_eq!(buf, [0xEE; 3]);
    }

    #[test]
    fn test_pack_to_vec() {
        let values = [1, 1, 2, 3, 5, 8, 300];
        let packed = pack_to_vec(&values).unwrap();
        assert_eq!(packed.len(), size_of(values).unwrap());
        assert_eq!(unpack_exact(&packed).unwrap(), values);
    }

    #[test]
    fn test_read_rank() {
        assert_eq!(read_rank(&[0x04, 0, 1, 2, 3]).unwrap(), (4, 1));
        let err = read_rank(&[]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
    }

    #[test]
    fn test_unpack_embedded() {
        let src = [0x02, 0xAC, 0x02, 0x07, b'x', b'y'];
        let (values, len) = unpack(&src, 2).unwrap();
        assert_eq!(values, [300, 7]);
        assert_eq!(len, 4);
    }

    #[test]
    fn test_unpack_rank_mismatch() {
        let err = unpack(&[0x02, 0x01, 0x02], 3).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::RankMismatch {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn test_unpack_truncated() {
        let err = unpack(&[0x03, 0x01, 0x02], 3).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));

        let err = unpack(&[0x02, 0x01, 0x82], 2).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
    }

    #[test]
    fn test_unpack_huge_rank_does_not_allocate() {
        let mut src = [0u8; 12];
        let n = varint::encode_into(u32::MAX as u64, &mut src).unwrap();
        let err = unpack(&src, u32::MAX as usize).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
        assert_eq!(n, 5);
    }

    #[test]
    fn test_unpack_exact_trailing() {
        assert_eq!(unpack_exact(&[0x01, 0x00]).unwrap(), [0]);
        let err = unpack_exact(&[0x01, 0x00, 0x00]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed { .. }));
    }
}
