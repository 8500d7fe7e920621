//! Structures related to application protocol data units (APDUs).
//!
//! Command APDUs are encoded according to ISO/IEC 7816-4 § 5.1. The encoding case is determined
//! by the presence and magnitude of the command data and the expected response length:
//!
//! | case | command data | expected length | body                                  |
//! |------|--------------|-----------------|---------------------------------------|
//! | 1    | -            | -               | (empty)                               |
//! | 2S   | -            | 1..=256         | `Le`                                  |
//! | 2E   | -            | 257..=65536     | `00 Le Le`                            |
//! | 3S   | 1..=255      | -               | `Lc data`                             |
//! | 3E   | 256..=65535  | -               | `00 Lc Lc data`                       |
//! | 4S   | 1..=255      | 1..=256         | `Lc data Le`                          |
//! | 4E   | otherwise    | otherwise       | `00 Lc Lc data Le Le`                 |
//!
//! A length field of zero denotes the maximum (256 in short, 65536 in extended form).


use std::fmt;


/// The expected length denoting "as much as possible" with short length fields.
pub const EXPECTED_LENGTH_WILDCARD_SHORT: usize = 256;

/// The expected length denoting "as much as possible" with extended length fields.
pub const EXPECTED_LENGTH_WILDCARD_EXTENDED: usize = 65536;

/// The maximum length of command data.
pub const MAX_DATA_LENGTH: usize = 65535;

const MAX_SHORT_DATA_LENGTH: usize = 255;
const DATA_OFFSET_SHORT: usize = 5;
const DATA_OFFSET_EXTENDED: usize = 7;


#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub enum ApduError {
    DataTooLong { maximum: usize, obtained: usize },
    ExpectedLengthOutOfRange { obtained: usize },
    ResponseTooShort { obtained: usize },
}
impl fmt::Display for ApduError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataTooLong { maximum, obtained }
                => write!(f, "too much data: obtained {} bytes, expected maximum {} bytes", obtained, maximum),
            Self::ExpectedLengthOutOfRange { obtained }
                => write!(f, "expected response length {} is out of range [1, {}]", obtained, EXPECTED_LENGTH_WILDCARD_EXTENDED),
            Self::ResponseTooShort { obtained }
                => write!(f, "response APDU has {} bytes, at least 2 (SW1, SW2) are required", obtained),
        }
    }
}
impl std::error::Error for ApduError {
}


#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CommandHeader {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
}
impl CommandHeader {
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self { cla, ins, p1, p2 }
    }

    pub const fn to_bytes(&self) -> [u8; 4] {
        [self.cla, self.ins, self.p1, self.p2]
    }

    pub const fn to_be_u32(&self) -> u32 {
        ((self.cla as u32) << 24)
        | ((self.ins as u32) << 16)
        | ((self.p1 as u32) <<  8)
        | ((self.p2 as u32) <<  0)
    }
}
impl fmt::Debug for CommandHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CommandHeader {} cla: 0x{:02X}, ins: 0x{:02X}, p1: 0x{:02X}, p2: 0x{:02X} {}",
            '{', self.cla, self.ins, self.p1, self.p2, '}',
        )
    }
}


#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ResponseTrailer {
    pub sw1: u8,
    pub sw2: u8,
}
impl ResponseTrailer {
    pub const fn new(sw1: u8, sw2: u8) -> Self {
        Self {
            sw1,
            sw2,
        }
    }

    pub const fn from_word(sw: u16) -> Self {
        Self::new((sw >> 8) as u8, sw as u8)
    }

    pub const fn to_bytes(&self) -> [u8; 2] {
        [self.sw1, self.sw2]
    }

    pub const fn to_word(&self) -> u16 {
        u16::from_be_bytes([self.sw1, self.sw2])
    }
}
impl fmt::Debug for ResponseTrailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResponseTrailer {} sw1: 0x{:02X}, sw2: 0x{:02X} {}", '{', self.sw1, self.sw2, '}')
    }
}


/// An encoded command APDU.
///
/// Once constructed, the encoding never changes; [`CommandApdu::to_bytes`] hands out independent
/// copies.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct CommandApdu {
    bytes: Vec<u8>,
    raw_nc: usize,
    raw_ne: Option<usize>,
    data_offset: usize,
    extended: bool,
}
impl CommandApdu {
    /// Encodes a command APDU.
    ///
    /// `data` of `Some(&[])` is treated like `None`. `ne` must be in `1..=65536`.
    pub fn new(header: CommandHeader, data: Option<&[u8]>, ne: Option<usize>) -> Result<Self, ApduError> {
        if let Some(ne) = ne {
            if ne == 0 || ne > EXPECTED_LENGTH_WILDCARD_EXTENDED {
                return Err(ApduError::ExpectedLengthOutOfRange { obtained: ne });
            }
        }

        let mut bytes = Vec::with_capacity(4 + 3 + data.map(|d| d.len()).unwrap_or(0) + 2);
        bytes.extend(header.to_bytes());

        let data = data.filter(|d| d.len() > 0);
        let (data_offset, extended) = match (data, ne) {
            (None, None) => {
                // case 1
                (0, false)
            },
            (None, Some(ne)) => {
                if ne <= EXPECTED_LENGTH_WILDCARD_SHORT {
                    // case 2S
                    encode_expected_length_short(&mut bytes, ne);
                    (0, false)
                } else {
                    // case 2E
                    bytes.push(0x00);
                    encode_expected_length_extended(&mut bytes, ne);
                    (0, true)
                }
            },
            (Some(data), ne) => {
                if data.len() > MAX_DATA_LENGTH {
                    return Err(ApduError::DataTooLong { maximum: MAX_DATA_LENGTH, obtained: data.len() });
                }
                let short_form = data.len() <= MAX_SHORT_DATA_LENGTH
                    && ne.map(|ne| ne <= EXPECTED_LENGTH_WILDCARD_SHORT).unwrap_or(true);
                if short_form {
                    // case 3S or 4S
                    bytes.push(data.len() as u8);
                    bytes.extend(data);
                    if let Some(ne) = ne {
                        encode_expected_length_short(&mut bytes, ne);
                    }
                    (DATA_OFFSET_SHORT, false)
                } else {
                    // case 3E or 4E
                    bytes.push(0x00);
                    bytes.extend((data.len() as u16).to_be_bytes());
                    bytes.extend(data);
                    if let Some(ne) = ne {
                        encode_expected_length_extended(&mut bytes, ne);
                    }
                    (DATA_OFFSET_EXTENDED, true)
                }
            },
        };

        Ok(Self {
            bytes,
            raw_nc: data.map(|d| d.len()).unwrap_or(0),
            raw_ne: ne,
            data_offset,
            extended,
        })
    }

    /// The encoded APDU.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// An independent copy of the encoded APDU.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn header(&self) -> CommandHeader {
        CommandHeader::new(self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3])
    }

    /// The length of the command data (Nc).
    pub fn raw_nc(&self) -> usize {
        self.raw_nc
    }

    /// The maximum expected length of the response data (Ne), if any.
    pub fn raw_ne(&self) -> Option<usize> {
        self.raw_ne
    }

    /// The index at which the command data starts, or 0 if there is no command data.
    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    /// Whether extended length fields are used.
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// The command data, if any.
    pub fn data(&self) -> Option<&[u8]> {
        if self.raw_nc == 0 {
            None
        } else {
            Some(&self.bytes[self.data_offset..self.data_offset+self.raw_nc])
        }
    }
}
impl fmt::Debug for CommandApdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandApdu")
            .field("header", &self.header())
            .field("nc", &self.raw_nc)
            .field("ne", &self.raw_ne)
            .field("extended", &self.extended)
            .finish()
    }
}

fn encode_expected_length_short(bytes: &mut Vec<u8>, ne: usize) {
    // 256 wraps to 0x00
    bytes.push(ne as u8);
}

fn encode_expected_length_extended(bytes: &mut Vec<u8>, ne: usize) {
    // 65536 wraps to 0x00 0x00
    bytes.extend((ne as u16).to_be_bytes());
}


/// A response APDU: response data followed by the status word.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct ResponseApdu {
    bytes: Vec<u8>,
}
impl ResponseApdu {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ApduError> {
        Self::from_vec(bytes.to_vec())
    }

    pub fn from_vec(bytes: Vec<u8>) -> Result<Self, ApduError> {
        if bytes.len() < 2 {
            return Err(ApduError::ResponseTooShort { obtained: bytes.len() });
        }
        Ok(Self { bytes })
    }

    pub fn from_parts(data: &[u8], trailer: ResponseTrailer) -> Self {
        let mut bytes = Vec::with_capacity(data.len() + 2);
        bytes.extend(data);
        bytes.extend(trailer.to_bytes());
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// The response data (everything before the status word).
    pub fn data(&self) -> &[u8] {
        &self.bytes[..self.bytes.len() - 2]
    }

    /// The length of the response data (Nr).
    pub fn nr(&self) -> usize {
        self.bytes.len() - 2
    }

    pub fn trailer(&self) -> ResponseTrailer {
        ResponseTrailer::new(self.sw1(), self.sw2())
    }

    pub fn sw1(&self) -> u8 {
        self.bytes[self.bytes.len() - 2]
    }

    pub fn sw2(&self) -> u8 {
        self.bytes[self.bytes.len() - 1]
    }

    /// The status word `SW1 << 8 | SW2`.
    pub fn sw(&self) -> u16 {
        self.trailer().to_word()
    }
}
impl fmt::Debug for ResponseApdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseApdu")
            .field("nr", &self.nr())
            .field("trailer", &self.trailer())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const HEADER: CommandHeader = CommandHeader::new(0x00, 0xB0, 0x91, 0x00);

    #[test]
    fn test_case_1() {
        let apdu = CommandApdu::new(HEADER, None, None).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00"));
        assert_eq!(apdu.data_offset(), 0);
        assert_eq!(apdu.data(), None);

        // empty data is no data
        let apdu = CommandApdu::new(HEADER, Some(&[]), None).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00"));
    }

    #[test]
    fn test_case_2() {
        let apdu = CommandApdu::new(HEADER, None, Some(0x20)).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00 20"));

        let apdu = CommandApdu::new(HEADER, None, Some(256)).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00 00"));
        assert!(!apdu.is_extended());

        let apdu = CommandApdu::new(HEADER, None, Some(257)).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00 00 01 01"));
        assert!(apdu.is_extended());

        let apdu = CommandApdu::new(HEADER, None, Some(65536)).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00 00 00 00"));
        assert_eq!(apdu.raw_ne(), Some(65536));
    }

    #[test]
    fn test_case_3() {
        let data = vec![0xAB; 255];
        let apdu = CommandApdu::new(HEADER, Some(&data), None).unwrap();
        assert_eq!(apdu.bytes().len(), 4 + 1 + 255);
        assert_eq!(apdu.bytes()[4], 0xFF);
        assert_eq!(apdu.data_offset(), 5);
        assert_eq!(apdu.data(), Some(&data[..]));

        let data = vec![0xAB; 256];
        let apdu = CommandApdu::new(HEADER, Some(&data), None).unwrap();
        assert_eq!(apdu.bytes().len(), 4 + 3 + 256);
        assert_eq!(&apdu.bytes()[4..7], &hex!("00 01 00"));
        assert_eq!(apdu.data_offset(), 7);
        assert_eq!(apdu.raw_nc(), 256);
    }

    #[test]
    fn test_case_4() {
        let apdu = CommandApdu::new(HEADER, Some(&hex!("01 02 03")), Some(256)).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00 03 01 02 03 00"));
        assert_eq!(apdu.data_offset(), 5);

        // Ne forces the extended form for the whole APDU
        let apdu = CommandApdu::new(HEADER, Some(&hex!("01 02 03")), Some(65536)).unwrap();
        assert_eq!(apdu.bytes(), &hex!("00 B0 91 00 00 00 03 01 02 03 00 00"));
        assert_eq!(apdu.data_offset(), 7);

        // ... and so does Nc
        let data = vec![0x55; 300];
        let apdu = CommandApdu::new(HEADER, Some(&data), Some(16)).unwrap();
        assert_eq!(&apdu.bytes()[4..7], &hex!("00 01 2C"));
        assert_eq!(&apdu.bytes()[apdu.bytes().len()-2..], &hex!("00 10"));
    }

    #[test]
    fn test_rejections() {
        let data = vec![0x00; 65536];
        assert_eq!(
            CommandApdu::new(HEADER, Some(&data), None),
            Err(ApduError::DataTooLong { maximum: 65535, obtained: 65536 }),
        );
        assert_eq!(
            CommandApdu::new(HEADER, None, Some(65537)),
            Err(ApduError::ExpectedLengthOutOfRange { obtained: 65537 }),
        );
        assert_eq!(
            CommandApdu::new(HEADER, None, Some(0)),
            Err(ApduError::ExpectedLengthOutOfRange { obtained: 0 }),
        );
    }

    #[test]
    fn test_owned_copies() {
        let apdu = CommandApdu::new(HEADER, Some(&hex!("01 02")), None).unwrap();
        let mut first = apdu.to_bytes();
        let second = apdu.to_bytes();
        assert_eq!(first, second);
        first[0] = 0xFF;
        assert_ne!(first, second);
        assert_eq!(apdu.bytes(), &second[..]);
    }

    #[test]
    fn test_response() {
        let response = ResponseApdu::from_slice(&hex!("DE AD BE EF 62 82")).unwrap();
        assert_eq!(response.data(), &hex!("DE AD BE EF"));
        assert_eq!(response.nr(), 4);
        assert_eq!(response.sw(), 0x6282);
        assert_eq!(response.trailer(), ResponseTrailer::new(0x62, 0x82));

        let response = ResponseApdu::from_slice(&hex!("90 00")).unwrap();
        assert!(response.data().is_empty());
        assert_eq!(response.sw(), 0x9000);

        assert_eq!(ResponseApdu::from_slice(&[0x90]), Err(ApduError::ResponseTooShort { obtained: 1 }));
    }
}
