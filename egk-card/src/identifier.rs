//! Addressing values of the card's object system.


use std::fmt;


#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum IdentifierError {
    ShortFileIdentifier { value: u8 },
    FileIdentifier { value: u16 },
    ApplicationIdentifierLength { length: usize },
    ApplicationIdentifierHex,
    CardKey { value: u8 },
    PasswordReference { value: u8 },
}
impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortFileIdentifier { value }
                => write!(f, "short file identifier {} out of range [{}, {}]", value, ShortFileIdentifier::MIN, ShortFileIdentifier::MAX),
            Self::FileIdentifier { value }
                => write!(f, "file identifier 0x{:04X} is reserved", value),
            Self::ApplicationIdentifierLength { length }
                => write!(f, "application identifier has {} bytes, expected between {} and {}", length, ApplicationIdentifier::MIN_LENGTH, ApplicationIdentifier::MAX_LENGTH),
            Self::ApplicationIdentifierHex
                => write!(f, "application identifier is not a valid hex string"),
            Self::CardKey { value }
                => write!(f, "key identifier {} out of range [2, 28]", value),
            Self::PasswordReference { value }
                => write!(f, "password identifier {} out of range [0, 31]", value),
        }
    }
}
impl std::error::Error for IdentifierError {
}


/// A short file identifier (SFID), 1 to 30.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShortFileIdentifier(u8);
impl ShortFileIdentifier {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 30;

    pub const fn new(value: u8) -> Result<Self, IdentifierError> {
        if value < Self::MIN || value > Self::MAX {
            Err(IdentifierError::ShortFileIdentifier { value })
        } else {
            Ok(Self(value))
        }
    }

    pub const fn value(&self) -> u8 {
        self.0
    }
}


/// A two-byte file identifier (FID).
///
/// Values below 0x1000 and above 0xFEFF are reserved, except for 0x011C (EF.CardAccess). 0x3FFF
/// is always reserved.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FileIdentifier(u16);
impl FileIdentifier {
    pub const fn new(value: u16) -> Result<Self, IdentifierError> {
        let outside_range = (value < 0x1000 || value > 0xFEFF) && value != 0x011C;
        if outside_range || value == 0x3FFF {
            Err(IdentifierError::FileIdentifier { value })
        } else {
            Ok(Self(value))
        }
    }

    pub const fn value(&self) -> u16 {
        self.0
    }

    pub const fn to_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}


/// An application identifier (AID) of 5 to 16 bytes.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ApplicationIdentifier {
    bytes: [u8; Self::MAX_LENGTH],
    length: u8,
}
impl ApplicationIdentifier {
    pub const MIN_LENGTH: usize = 5;
    pub const MAX_LENGTH: usize = 16;

    pub const fn new(value: &[u8]) -> Result<Self, IdentifierError> {
        if value.len() < Self::MIN_LENGTH || value.len() > Self::MAX_LENGTH {
            return Err(IdentifierError::ApplicationIdentifierLength { length: value.len() });
        }
        let mut bytes = [0u8; Self::MAX_LENGTH];
        let mut i = 0;
        while i < value.len() {
            bytes[i] = value[i];
            i += 1;
        }
        Ok(Self { bytes, length: value.len() as u8 })
    }

    pub fn from_hex(hex_string: &str) -> Result<Self, IdentifierError> {
        let bytes = hex::decode(hex_string)
            .map_err(|_| IdentifierError::ApplicationIdentifierHex)?;
        Self::new(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.length)]
    }
}
impl fmt::Debug for ApplicationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApplicationIdentifier({})", self)
    }
}
impl fmt::Display for ApplicationIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.as_bytes()))
    }
}
