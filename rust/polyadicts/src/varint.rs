//! Varint encoding of unsigned integers.
//!
//! Format:
//! - The value is split into 7-bit groups, least-significant group first.
//! - Every byte except the last has its high bit (`0x80`) set.
//! - The encoder always emits the minimal length. The decoder also accepts
//!   redundant high zero groups, as long as the bound is respected.
//!
//! At most [`MAX_LEN`] bytes are used, which covers the full `u64` range.

use polyadicts_common::{Result, error::Error};

/// Maximum encoded length of a varint, in bytes.
pub const MAX_LEN: usize = 10;

/// Largest value that can be encoded.
pub const MAX_VALUE: u64 = u64::MAX;

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u8 = 0x7F;

/// Number of significant bits in `value` (`bit_length(0) == 0`).
#[inline]
pub const fn bit_length(value: u64) -> u32 {
    u64::BITS - value.leading_zeros()
}

/// Returns the number of bytes needed to encode `value`.
///
/// Equals `floor(log2(value)) / 7 + 1`, taking `log2(0)` as zero.
///
/// ```
/// use polyadicts::varint::encoded_len;
///
/// assert_eq!(encoded_len(0), 1);
/// assert_eq!(encoded_len(127), 1);
/// assert_eq!(encoded_len(128), 2);
/// assert_eq!(encoded_len(u64::MAX), 10);
/// ```
#[inline]
pub const fn encoded_len(value: u64) -> usize {
    let log2 = bit_length(value).saturating_sub(1);
    (log2 / 7 + 1) as usize
}

/// Encodes `value` into `dst`.
///
/// When `dst` is `None` nothing is written and only the would-be length is
/// returned.
///
/// # Errors
///
/// - `RangeExceeded` if `value` is not representable as `u64`.
/// - `InsufficientSpace` if `dst` is shorter than the encoded length. Nothing
///   is written in that case.
///
/// ```
/// use polyadicts::varint;
///
/// let mut buf = [0u8; 4];
/// assert_eq!(varint::encode(300u32, Some(&mut buf[..])).unwrap(), 2);
/// assert_eq!(&buf[..2], &[0xAC, 0x02]);
/// assert_eq!(varint::encode(300u32, None).unwrap(), 2);
/// ```
pub fn encode<V>(value: V, dst: Option<&mut [u8]>) -> Result<usize>
where
    V: TryInto<u64>,
{
    let value: u64 = value
        .try_into()
        .map_err(|_| Error::range_exceeded("varint"))?;
    match dst {
        Some(dst) => encode_into(value, dst),
        None => Ok(encoded_len(value)),
    }
}

/// Encodes `value` at the start of `dst`, returning the number of bytes written.
///
/// # Errors
///
/// `InsufficientSpace` if `dst` is shorter than [`encoded_len(value)`](encoded_len).
#[inline]
pub fn encode_into(mut value: u64, dst: &mut [u8]) -> Result<usize> {
    let len = encoded_len(value);
    if dst.len() < len {
        return Err(Error::insufficient_space(len, dst.len()));
    }
    for byte in &mut dst[..len - 1] {
        *byte = (value as u8 & GROUP_MASK) | CONTINUATION;
        value >>= 7;
    }
    dst[len - 1] = value as u8;
    Ok(len)
}

/// Decodes one varint from the start of `src`.
///
/// Returns the value and the number of bytes consumed. Never reads more than
/// `min(src.len(), MAX_LEN)` bytes.
///
/// # Errors
///
/// - `Truncated` if `src` ends before the terminating byte.
/// - `RangeExceeded` if no terminating byte is found within [`MAX_LEN`]
///   bytes, or the value exceeds [`MAX_VALUE`].
#[inline]
pub fn decode(src: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &byte) in src.iter().take(MAX_LEN).enumerate() {
        let group = (byte & GROUP_MASK) as u64;
        if i == MAX_LEN - 1 && group > 1 {
            // Only one value bit is left for the tenth group.
            return Err(Error::range_exceeded("varint"));
        }
        value |= group << (7 * i);
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
    }
    if src.len() >= MAX_LEN {
        Err(Error::range_exceeded("varint"))
    } else {
        Err(Error::truncated("varint"))
    }
}

/// Decodes one varint from the start of `src` as a `usize`.
///
/// # Errors
///
/// Same as [`decode`], plus `Malformed` if the value does not fit in `usize`
/// on this platform.
#[inline]
pub fn decode_usize(src: &[u8]) -> Result<(usize, usize)> {
    let (value, len) = decode(src)?;
    let value = usize::try_from(value)
        .map_err(|_| Error::malformed("varint", "value exceeds platform usize"))?;
    Ok((value, len))
}

/// Returns the length of the varint at the start of `src` by scanning
/// continuation bits, without decoding it.
///
/// # Errors
///
/// `Truncated` if `src` ends first, `RangeExceeded` if no terminating byte
/// appears within [`MAX_LEN`] bytes.
pub fn peek_len(src: &[u8]) -> Result<usize> {
    match src
        .iter()
        .take(MAX_LEN)
        .position(|&byte| byte & CONTINUATION == 0)
    {
        Some(pos) => Ok(pos + 1),
        None if src.len() >= MAX_LEN => Err(Error::range_exceeded("varint")),
        None => Err(Error::truncated("varint")),
    }
}

/// Copies one varint verbatim from the start of `src` to the start of `dst`.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Same as [`peek_len`], plus `InsufficientSpace` if `dst` is too short.
pub fn copy(src: &[u8], dst: &mut [u8]) -> Result<usize> {
    let len = peek_len(src)?;
    if dst.len() < len {
        return Err(Error::insufficient_space(len, dst.len()));
    }
    dst[..len].copy_from_slice(&src[..len]);
    Ok(len)
}

#[cfg(test)]
mod tests {
    use polyadicts_common::error::ErrorKind;

    use super::*;

    /// Lookup-table floor(log2(x)) for a byte, `log2(0) == 0`.
    const LOG_TABLE_256: [u8; 256] = {
        let mut table = [0u8; 256];
        let mut i = 2;
        while i < 256 {
            table[i] = table[i / 2] + 1;
            i += 1;
        }
        table
    };

    /// Table-driven binary search log2, used as the reference bit scan.
    fn table_log2(x: u64) -> u32 {
        let log2_32 = |x: u32| -> u32 {
            if x < 0x10000 {
                if x < 0x100 {
                    LOG_TABLE_256[x as usize] as u32
                } else {
                    LOG_TABLE_256[(x >> 8) as usize] as u32 + 8
                }
            } else if x < 0x1000000 {
                LOG_TABLE_256[(x >> 16) as usize] as u32 + 16
            } else {
                LOG_TABLE_256[(x >> 24) as usize] as u32 + 24
            }
        };
        if x < 0x1_0000_0000 {
            log2_32(x as u32)
        } else {
            log2_32((x >> 32) as u32) + 32
        }
    }

    fn boundary_values() -> Vec<u64> {
        let mut values = vec![0, 1, u64::MAX, u64::MAX - 1];
        for bits in (7..64).step_by(7) {
            let b = 1u64 << bits;
            values.extend([b - 1, b, b + 1]);
        }
        values.push(1 << 63);
        values.push((1 << 63) - 1);
        values
    }

    fn encode_vec(value: u64) -> Vec<u8> {
        let mut buf = [0u8; MAX_LEN];
        let len = encode_into(value, &mut buf).unwrap();
        buf[..len].to_vec()
    }

    #[test]
    fn test_encoded_len_matches_table_log2() {
        for v in boundary_values() {
            assert_eq!(
                encoded_len(v),
                table_log2(v) as usize / 7 + 1,
                "value {v:#x}"
            );
        }
    }

    #[test]
    fn test_encoded_len_at_group_boundaries() {
        for n in 1..=9 {
            let b = 1u64 << (7 * n);
            assert_eq!(encoded_len(b - 1), n as usize);
            assert_eq!(encoded_len(b), n as usize + 1);
        }
        assert_eq!(encoded_len(u64::MAX), MAX_LEN);
    }

    #[test]
    fn test_encoding_shape_examples() {
        assert_eq!(encode_vec(0), &[0x00]);
        assert_eq!(encode_vec(1), &[0x01]);
        assert_eq!(encode_vec(127), &[0x7F]);
        assert_eq!(encode_vec(128), &[0x80, 0x01]);
        assert_eq!(encode_vec(300), &[0xAC, 0x02]);
        assert_eq!(encode_vec(16383), &[0xFF, 0x7F]);
        assert_eq!(encode_vec(16384), &[0x80, 0x80, 0x01]);
        assert_eq!(
            encode_vec(u64::MAX),
            &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
        );
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for v in boundary_values() {
            let encoded = encode_vec(v);
            assert_eq!(decode(&encoded).unwrap(), (v, encoded.len()), "{v:#x}");
        }
    }

    #[test]
    fn test_encode_measure_only() {
        assert_eq!(encode(300u64, None).unwrap(), 2);
        assert_eq!(encode(u64::MAX, None).unwrap(), 10);
    }

    #[test]
    fn test_encode_range_exceeded() {
        let err = encode(u64::MAX as u128 + 1, None).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::RangeExceeded { .. }));
        let err = encode(-1i64, None).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::RangeExceeded { .. }));
        assert_eq!(encode(u64::MAX as u128, None).unwrap(), MAX_LEN);
    }

    #[test]
    fn test_encode_insufficient_space() {
        let mut buf = [0xEEu8; 1];
        let err = encode(300u64, Some(&mut buf[..])).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InsufficientSpace {
                required: 2,
                available: 1
            }
        ));
        assert_eq!(buf, [0xEE]);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode(&[0xAC, 0x02, 0xFF, 0xFF]).unwrap(), (300, 2));
    }

    #[test]
    fn test_decode_truncated() {
        for v in boundary_values() {
            let encoded = encode_vec(v);
            for cut in 0..encoded.len() {
                let err = decode(&encoded[..cut]).unwrap_err();
                assert!(matches!(err.kind(), ErrorKind::Truncated { .. }), "{v} {cut}");
            }
        }
    }

    #[test]
    fn test_decode_does_not_read_past_bound() {
        // The bytes beyond the bound would terminate the varint.
        let data = [0x80, 0x80, 0x01];
        let err = decode(&data[..2]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
    }

    #[test]
    fn test_decode_too_long() {
        let data = [0xFFu8; 11];
        let err = decode(&data).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::RangeExceeded { .. }));

        let mut data = [0x80u8; MAX_LEN];
        data[MAX_LEN - 1] = 0x02;
        let err = decode(&data).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::RangeExceeded { .. }));
    }

    #[test]
    fn test_decode_non_minimal() {
        assert_eq!(decode(&[0x00]).unwrap(), (0, 1));
        assert_eq!(decode(&[0x80, 0x00]).unwrap(), (0, 2));
        assert_eq!(decode(&[0x81, 0x80, 0x00]).unwrap(), (1, 3));

        let mut padded = [0x80u8; MAX_LEN];
        padded[0] = 0xAC;
        padded[1] = 0x82;
        padded[MAX_LEN - 1] = 0x00;
        assert_eq!(decode(&padded).unwrap(), (300, MAX_LEN));

        // Re-encoding yields the minimal form.
        assert_eq!(encode_vec(300), &[0xAC, 0x02]);
    }

    #[test]
    fn test_decode_usize() {
        assert_eq!(decode_usize(&[0xAC, 0x02]).unwrap(), (300, 2));
        if usize::BITS < 64 {
            let encoded = encode_vec(u64::MAX);
            let err = decode_usize(&encoded).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::Malformed { .. }));
        }
    }

    #[test]
    fn test_copy() {
        let src = [0xAC, 0x02, 0x7F];
        let mut dst = [0u8; 4];
        assert_eq!(copy(&src, &mut dst).unwrap(), 2);
        assert_eq!(&dst[..2], &[0xAC, 0x02]);

        let err = copy(&src, &mut dst[..1]).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InsufficientSpace { .. }));
        let err = copy(&src[..1], &mut dst).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Truncated { .. }));
        let err = copy(&[0x80; 12], &mut dst).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::RangeExceeded { .. }));
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(300), 9);
        assert_eq!(bit_length(u64::MAX), 64);
    }
}
