//! Key derivation function for PACE with AES-128.
//!
//! The KDF is equivalent to:
//! ```plain
//! keydata = sha1(key_seed || 00 00 00 mode)[0..16]
//! ```


use digest::Digest;
use sha1::Sha1;
use zeroize::Zeroizing;


/// What the derived key is used for.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u8)]
pub enum KeyDerivationMode {
    /// The session encryption key.
    Enc = 1,

    /// The session message authentication key.
    Mac = 2,

    /// The key protecting the PACE nonce, derived from the password.
    Password = 3,
}
impl KeyDerivationMode {
    pub const fn counter(&self) -> u32 {
        *self as u32
    }
}


/// Derives an AES-128 key from the given key seed.
pub fn derive_key(key_seed: &[u8], mode: KeyDerivationMode) -> Zeroizing<[u8; 16]> {
    let mut hasher = Sha1::new();
    hasher.update(key_seed);
    hasher.update(mode.counter().to_be_bytes());
    let result = hasher.finalize();

    let mut keydata = Zeroizing::new([0u8; 16]);
    keydata.copy_from_slice(&result[0..16]);
    keydata
}


#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_deterministic() {
        let secret = hex!("28768D20701247DAE81804C9E780EDE582A9996DB4A315020B2733197DB84925");
        for mode in [KeyDerivationMode::Enc, KeyDerivationMode::Mac, KeyDerivationMode::Password] {
            assert_eq!(*derive_key(&secret, mode), *derive_key(&secret, mode));
        }

        let enc = derive_key(&secret, KeyDerivationMode::Enc);
        let mac = derive_key(&secret, KeyDerivationMode::Mac);
        let password = derive_key(&secret, KeyDerivationMode::Password);
        assert_ne!(*enc, *mac);
        assert_ne!(*enc, *password);
        assert_ne!(*mac, *password);
    }

    #[test]
    fn test_icao_vectors() {
        // Doc 9303 Part 11 Appendix G.1 (ECDH generic mapping)
        let shared_secret = hex!("28768D20701247DAE81804C9E780EDE582A9996DB4A315020B2733197DB84925");
        assert_eq!(*derive_key(&shared_secret, KeyDerivationMode::Enc), hex!("F5F0E35C0D7161EE6724EE513A0D9A7F"));
        assert_eq!(*derive_key(&shared_secret, KeyDerivationMode::Mac), hex!("FE251C7858B356B24514B3BD5F4297D1"));

        let password = hex!("7E2D2A41C74EA0B38CD36F863939BFA8E9032AAD");
        assert_eq!(*derive_key(&password, KeyDerivationMode::Password), hex!("89DED1B26624EC1E634C1989302849DD"));
    }
}
