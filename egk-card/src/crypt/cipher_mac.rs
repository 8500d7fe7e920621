//! AES-128 in CBC mode and AES-CMAC, the cipher and MAC combination used by PACE and Secure
//! Messaging on the eGK.


use std::fmt;

use aes::Aes128;
use block_padding::NoPadding;
use cipher::{BlockDecryptMut, BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit};
use cmac::{Cmac, Mac};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;


/// Block size of AES in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Length of the truncated MACs exchanged with the card.
pub const MAC_LENGTH: usize = 8;

/// First byte of ISO/IEC 7816-4 padding.
const PADDING_MARKER: u8 = 0x80;


/// The data to encrypt or decrypt is not a whole number of blocks.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BlockLengthError {
    pub length: usize,
}
impl fmt::Display for BlockLengthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data length {} is not a multiple of the block size {}", self.length, BLOCK_SIZE)
    }
}
impl std::error::Error for BlockLengthError {
}


/// Appends ISO/IEC 7816-4 padding (`80 00 ...`) up to the next block boundary.
///
/// Padding is always added, even if the data already ends on a block boundary.
pub fn pad(data: &mut Vec<u8>) {
    data.push(PADDING_MARKER);
    while data.len() % BLOCK_SIZE != 0 {
        data.push(0x00);
    }
}

/// Returns a padded copy of the data.
pub fn padded(data: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut ret = Zeroizing::new(Vec::with_capacity(data.len() + BLOCK_SIZE));
    ret.extend_from_slice(data);
    pad(&mut ret);
    ret
}

/// Strips ISO/IEC 7816-4 padding, returning `None` if the data is not correctly padded.
pub fn unpad(data: &[u8]) -> Option<&[u8]> {
    let marker_index = data.iter().rposition(|b| *b != 0x00)?;
    if data[marker_index] != PADDING_MARKER {
        return None;
    }
    if data.len() - marker_index > BLOCK_SIZE {
        // more than one block of padding
        return None;
    }
    Some(&data[..marker_index])
}


/// Encrypts pre-padded data in-place.
pub fn encrypt_padded_data(data: &mut [u8], key: &[u8; 16], iv: &[u8; 16]) -> Result<(), BlockLengthError> {
    let length = data.len();
    if length % BLOCK_SIZE != 0 {
        return Err(BlockLengthError { length });
    }
    let encryptor = cbc::Encryptor::<Aes128>::new(&(*key).into(), &(*iv).into());
    encryptor.encrypt_padded_mut::<NoPadding>(data, length)
        .map_err(|_| BlockLengthError { length })?;
    Ok(())
}

/// Decrypts data in-place without stripping padding.
pub fn decrypt_padded_data(data: &mut [u8], key: &[u8; 16], iv: &[u8; 16]) -> Result<(), BlockLengthError> {
    let length = data.len();
    if length % BLOCK_SIZE != 0 {
        return Err(BlockLengthError { length });
    }
    let decryptor = cbc::Decryptor::<Aes128>::new(&(*key).into(), &(*iv).into());
    decryptor.decrypt_padded_mut::<NoPadding>(data)
        .map_err(|_| BlockLengthError { length })?;
    Ok(())
}

/// Encrypts a single block with the raw block cipher.
pub fn encrypt_block(block: &[u8; 16], key: &[u8; 16]) -> Zeroizing<[u8; 16]> {
    let cipher = Aes128::new(&(*key).into());
    let mut block = aes::Block::from(*block);
    cipher.encrypt_block(&mut block);
    let mut ret = Zeroizing::new([0u8; 16]);
    ret.copy_from_slice(&block);
    ret
}


/// Computes the AES-CMAC over the concatenation of the given pieces, truncated to
/// [`MAC_LENGTH`] bytes.
pub fn mac_data(pieces: &[&[u8]], key: &[u8; 16]) -> [u8; MAC_LENGTH] {
    let mut mac = <Cmac<Aes128> as KeyInit>::new(&(*key).into());
    for piece in pieces {
        mac.update(piece);
    }
    let full_mac = mac.finalize().into_bytes();

    let mut ret = [0u8; MAC_LENGTH];
    ret.copy_from_slice(&full_mac[..MAC_LENGTH]);
    ret
}

/// Verifies a truncated AES-CMAC in constant time.
pub fn verify_mac_data(pieces: &[&[u8]], key: &[u8; 16], expected_mac: &[u8]) -> bool {
    let computed_mac = mac_data(pieces, key);
    computed_mac[..].ct_eq(expected_mac).into()
}


#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_padding() {
        let mut data = hex!("01 02 03").to_vec();
        pad(&mut data);
        assert_eq!(data, hex!("01 02 03 80 00000000 00000000 00000000"));
        assert_eq!(unpad(&data), Some(&hex!("01 02 03")[..]));

        let mut block = vec![0xAA; 16];
        pad(&mut block);
        assert_eq!(block.len(), 32);
        assert_eq!(unpad(&block), Some(&[0xAA; 16][..]));

        let mut empty = Vec::new();
        pad(&mut empty);
        assert_eq!(empty, hex!("80 00000000 00000000 00000000 000000"));
        assert_eq!(unpad(&empty), Some(&[][..]));

        assert_eq!(unpad(&hex!("01 02 03 00")), None);
        assert_eq!(unpad(&[0x00; 16]), None);
        assert_eq!(unpad(&[]), None);
    }

    #[test]
    fn test_cbc() {
        // NIST SP 800-38A F.2.1 (CBC-AES128.Encrypt), first two blocks
        let key = hex!("2b7e151628aed2a6abf7158809cf4f3c");
        let iv = hex!("000102030405060708090a0b0c0d0e0f");
        let plaintext = hex!("
            6bc1bee22e409f96e93d7e117393172a
            ae2d8a571e03ac9c9eb76fac45af8e51
        ");
        let ciphertext = hex!("
            7649abac8119b246cee98e9b12e9197d
            5086cb9b507219ee95db113a917678b2
        ");

        let mut data = plaintext;
        encrypt_padded_data(&mut data, &key, &iv).unwrap();
        assert_eq!(data, ciphertext);
        decrypt_padded_data(&mut data, &key, &iv).unwrap();
        assert_eq!(data, plaintext);

        let mut short = [0u8; 15];
        assert_eq!(encrypt_padded_data(&mut short, &key, &iv), Err(BlockLengthError { length: 15 }));
        assert_eq!(decrypt_padded_data(&mut short, &key, &iv), Err(BlockLengthError { length: 15 }));
    }

    #[test]
    fn test_block() {
        // FIPS 197 Appendix C.1
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let block = hex!("00112233445566778899aabbccddeeff");
        assert_eq!(*encrypt_block(&block, &key), hex!("69c4e0d86a7b0430d8cdb78070b4c55a"));
    }

    #[test]
    fn test_cmac() {
        // NIST SP 800-38B D.1, example 2 (16-byte message)
        let key = hex!("2b7e151628aed2a6abf7158809cf4f3c");
        let message = hex!("6bc1bee22e409f96e93d7e117393172a");
        let mac = mac_data(&[&message[..8], &message[8..]], &key);
        assert_eq!(mac, hex!("070a16b46b4d4144"));
        assert!(verify_mac_data(&[&message[..]], &key, &hex!("070a16b46b4d4144")));
        assert!(!verify_mac_data(&[&message[..]], &key, &hex!("070a16b46b4d4145")));
        assert!(!verify_mac_data(&[&message[..]], &key, &hex!("070a16b46b4d41")));
    }
}
