//! Cryptographic functionality.
//!
//! Integers are unsigned and serialized in big-endian byte order. Elliptic-curve points are
//! serialized in uncompressed form:
//! 1. the byte `0x04` to signify uncompressed coordinates
//! 2. the x coordinate as an unsigned integer in big-endian byte order
//! 3. the y coordinate as an unsigned integer in big-endian byte order
//!
//! Both coordinates are encoded in the same number of bytes as the prime of the curve.


pub mod cipher_mac;
pub mod elliptic;


use crypto_bigint::BoxedUint;
use zeroize::Zeroizing;


/// Decodes a big-endian unsigned integer with the given precision.
///
/// Returns `None` if the value does not fit.
pub fn boxed_uint_from_be_slice(slice: &[u8], bits_precision: u32) -> Option<BoxedUint> {
    BoxedUint::from_be_slice(slice, bits_precision).ok()
}

/// Decodes a big-endian unsigned integer, choosing the precision from the length of the slice.
pub fn boxed_uint_from_be_slice_auto(slice: &[u8]) -> Option<BoxedUint> {
    let bits: u32 = (8 * slice.len()).try_into().ok()?;
    boxed_uint_from_be_slice(slice, bits.max(8))
}

/// Encodes an unsigned integer in exactly `length` big-endian bytes.
///
/// Returns `None` if the value needs more bytes than that.
pub fn to_fixed_be_bytes(value: &BoxedUint, length: usize) -> Option<Zeroizing<Vec<u8>>> {
    let minimal = to_minimal_be_bytes(value);
    if minimal.len() > length {
        return None;
    }
    let mut ret = Zeroizing::new(vec![0u8; length]);
    ret[length-minimal.len()..].copy_from_slice(&minimal);
    Some(ret)
}

/// Encodes an unsigned integer in the shortest big-endian representation.
///
/// Zero is encoded as a single `0x00` byte.
pub fn to_minimal_be_bytes(value: &BoxedUint) -> Zeroizing<Vec<u8>> {
    let bytes = Zeroizing::new(value.to_be_bytes());
    let first_nonzero = bytes.iter()
        .position(|b| *b != 0x00)
        .unwrap_or(bytes.len().saturating_sub(1));
    Zeroizing::new(bytes[first_nonzero..].to_vec())
}
