//! Keys, passwords and other secrets living on the card.


pub mod file_system;
pub mod version;


use std::fmt;
use std::hash::{Hash, Hasher};

use subtle::ConstantTimeEq;
use zeroize::Zeroize;
use zeroize_derive::ZeroizeOnDrop;

use crate::identifier::IdentifierError;


/// Marker added to a key or password identifier if it refers to an object in the current DF.
pub const DF_SPECIFIC_MARKER: u8 = 0x80;


/// An object that can be referenced in a key or password reference field of a command.
pub trait KeyReference {
    /// The identifier of the object.
    fn id(&self) -> u8;

    /// The reference as it is sent to the card; `df_specific` marks it as local to the current DF.
    fn calculate_key_reference(&self, df_specific: bool) -> u8 {
        if df_specific {
            self.id() | DF_SPECIFIC_MARKER
        } else {
            self.id()
        }
    }
}


/// A reference to a symmetric or private key, 2 to 28.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CardKey(u8);
impl CardKey {
    pub const MIN_ID: u8 = 2;
    pub const MAX_ID: u8 = 28;

    pub const fn new(id: u8) -> Result<Self, IdentifierError> {
        if id < Self::MIN_ID || id > Self::MAX_ID {
            Err(IdentifierError::CardKey { value: id })
        } else {
            Ok(Self(id))
        }
    }
}
impl KeyReference for CardKey {
    fn id(&self) -> u8 { self.0 }
}


/// A reference to a password object (PIN, PUK, CAN), 0 to 31.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PasswordReference(u8);
impl PasswordReference {
    pub const MAX_ID: u8 = 31;

    pub const fn new(id: u8) -> Result<Self, IdentifierError> {
        if id > Self::MAX_ID {
            Err(IdentifierError::PasswordReference { value: id })
        } else {
            Ok(Self(id))
        }
    }
}
impl KeyReference for PasswordReference {
    fn id(&self) -> u8 { self.0 }
}


/// The session keys negotiated using PACE.
#[derive(Clone, ZeroizeOnDrop)]
pub struct PaceKey {
    enc: [u8; 16],
    mac: [u8; 16],
}
impl PaceKey {
    pub fn new(enc: [u8; 16], mac: [u8; 16]) -> Self {
        Self { enc, mac }
    }

    pub fn enc(&self) -> &[u8; 16] {
        &self.enc
    }

    pub fn mac(&self) -> &[u8; 16] {
        &self.mac
    }
}
impl PartialEq for PaceKey {
    fn eq(&self, other: &Self) -> bool {
        (self.enc[..].ct_eq(&other.enc[..]) & self.mac[..].ct_eq(&other.mac[..])).into()
    }
}
impl Eq for PaceKey {
}
impl Hash for PaceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.enc.hash(state);
        self.mac.hash(state);
    }
}
impl fmt::Debug for PaceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaceKey")
            .field("enc", &"<redacted>")
            .field("mac", &"<redacted>")
            .finish()
    }
}


#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum PinFormatError {
    Length { length: usize },
    NotADigit,
}
impl fmt::Display for PinFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { length }
                => write!(f, "PIN has {} digits, expected between {} and {}", length, EncryptedPinFormat2::MIN_DIGITS, EncryptedPinFormat2::MAX_DIGITS),
            Self::NotADigit
                => write!(f, "PIN contains a character that is not a decimal digit"),
        }
    }
}
impl std::error::Error for PinFormatError {
}


/// A PIN encoded as an ISO 9564-1 format 2 PIN block.
///
/// The first byte is `0x2L` with `L` the number of digits, followed by the digits in BCD, followed
/// by `F` nibbles up to a total of eight bytes.
#[derive(Clone, ZeroizeOnDrop)]
pub struct EncryptedPinFormat2 {
    bytes: [u8; 8],
}
impl EncryptedPinFormat2 {
    pub const MIN_DIGITS: usize = 4;
    pub const MAX_DIGITS: usize = 12;

    pub fn new(pin: &str) -> Result<Self, PinFormatError> {
        let length = pin.len();
        if length < Self::MIN_DIGITS || length > Self::MAX_DIGITS {
            return Err(PinFormatError::Length { length });
        }

        let mut nibbles = [0xFu8; 14];
        for (nibble, c) in nibbles.iter_mut().zip(pin.bytes()) {
            if !c.is_ascii_digit() {
                nibbles.zeroize();
                return Err(PinFormatError::NotADigit);
            }
            *nibble = c - b'0';
        }

        let mut bytes = [0u8; 8];
        bytes[0] = 0x20 | (length as u8);
        for (byte, pair) in bytes[1..].iter_mut().zip(nibbles.chunks_exact(2)) {
            *byte = (pair[0] << 4) | pair[1];
        }
        nibbles.zeroize();

        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
impl fmt::Debug for EncryptedPinFormat2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedPinFormat2").finish_non_exhaustive()
    }
}
