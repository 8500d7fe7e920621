//! Secure Messaging with AES-128 after PACE.
//!
//! Every command is wrapped into data objects carrying the encrypted payload (`87` or `85`), the
//! expected response length (`97`) and a MAC (`8E`); responses are unwrapped correspondingly
//! (`87`/`85`, status `99`, MAC `8E`). Both directions increment the send sequence counter.


use std::fmt;

use tracing::debug;
use zeroize::Zeroizing;
use zeroize_derive::ZeroizeOnDrop;

use crate::card::PaceKey;
use crate::crypt::cipher_mac::{
    self, decrypt_padded_data, encrypt_block, encrypt_padded_data, mac_data, padded, unpad,
    verify_mac_data, BlockLengthError, MAC_LENGTH,
};
use crate::der_util::{encode_tlv, parse_tlvs};
use crate::iso7816::apdu::{
    ApduError, CommandApdu, CommandHeader, ResponseApdu, ResponseTrailer,
    EXPECTED_LENGTH_WILDCARD_EXTENDED, EXPECTED_LENGTH_WILDCARD_SHORT,
};


/// Bits of CLA announcing Secure Messaging with an authenticated header.
const CLA_SECURE_MESSAGING: u8 = 0b0000_1100;

const TAG_ENCRYPTED_DATA_ODD_INS: u8 = 0x85;
const TAG_PADDED_ENCRYPTED_DATA: u8 = 0x87;
const TAG_EXPECTED_LENGTH: u8 = 0x97;
const TAG_STATUS: u8 = 0x99;
const TAG_MAC: u8 = 0x8E;

/// Padding indicator of data object 87: ISO/IEC 7816-4 padding.
const PADDING_INDICATOR_ISO: u8 = 0x01;


#[derive(Debug)]
pub enum Error {
    Apdu(ApduError),
    BlockLength(BlockLengthError),
    ResponseTlvFormat,
    MissingResponseMac,
    ResponseMac,
    UnknownPadding { padding_mode: u8 },
    InvalidPadding,
    StatusLength { length: usize },
    UnprotectedResponse { sw: u16 },
    ChannelPoisoned,
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::Apdu(e)
                => write!(f, "failed to assemble protected APDU: {}", e),
            Self::BlockLength(e)
                => write!(f, "{}", e),
            Self::ResponseTlvFormat
                => write!(f, "response has an invalid TLV format"),
            Self::MissingResponseMac
                => write!(f, "response does not contain a MAC"),
            Self::ResponseMac
                => write!(f, "response MAC incorrect"),
            Self::UnknownPadding { padding_mode }
                => write!(f, "response payload has unknown padding mode {}", padding_mode),
            Self::InvalidPadding
                => write!(f, "response payload has invalid padding"),
            Self::StatusLength { length }
                => write!(f, "status has unexpected length {}", length),
            Self::UnprotectedResponse { sw }
                => write!(f, "card sent an unprotected response with status 0x{:04X}", sw),
            Self::ChannelPoisoned
                => write!(f, "secure channel is unusable after an earlier Secure Messaging error"),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apdu(e) => Some(e),
            Self::BlockLength(e) => Some(e),
            Self::ResponseTlvFormat => None,
            Self::MissingResponseMac => None,
            Self::ResponseMac => None,
            Self::UnknownPadding { .. } => None,
            Self::InvalidPadding => None,
            Self::StatusLength { .. } => None,
            Self::UnprotectedResponse { .. } => None,
            Self::ChannelPoisoned => None,
        }
    }
}
impl From<ApduError> for Error {
    fn from(value: ApduError) -> Self { Self::Apdu(value) }
}
impl From<BlockLengthError> for Error {
    fn from(value: BlockLengthError) -> Self { Self::BlockLength(value) }
}


/// Session state of Secure Messaging: the session keys and the send sequence counter.
#[derive(ZeroizeOnDrop)]
pub struct SecureMessaging {
    k_session_enc: [u8; 16],
    k_session_mac: [u8; 16],
    send_sequence_counter: [u8; 16],
}
impl SecureMessaging {
    /// Starts Secure Messaging with the keys negotiated by PACE.
    ///
    /// The initial send sequence counter is all-zeroes for PACE.
    pub fn new(key: &PaceKey) -> Self {
        Self {
            k_session_enc: *key.enc(),
            k_session_mac: *key.mac(),
            send_sequence_counter: [0u8; 16],
        }
    }

    pub fn send_sequence_counter(&self) -> &[u8; 16] {
        &self.send_sequence_counter
    }

    fn increment_send_sequence_counter(&mut self) {
        for b in self.send_sequence_counter.iter_mut().rev() {
            if *b == 0xFF {
                *b = 0x00;
                // carry; keep going
            } else {
                *b += 1;
                break;
            }
        }
    }

    /// The CBC IV for the current counter value: the counter encrypted with the session key.
    fn derive_iv(&self) -> Zeroizing<[u8; 16]> {
        encrypt_block(&self.send_sequence_counter, &self.k_session_enc)
    }

    /// Protects a plain command APDU.
    pub fn encrypt(&mut self, command: &CommandApdu) -> Result<CommandApdu, Error> {
        debug!("encrypt");
        self.increment_send_sequence_counter();

        let plain_header = command.header();
        let header = CommandHeader::new(
            plain_header.cla | CLA_SECURE_MESSAGING,
            plain_header.ins,
            plain_header.p1,
            plain_header.p2,
        );

        let mut body = Vec::new();
        if let Some(data) = command.data() {
            let mut encrypted = padded(data);
            let iv = self.derive_iv();
            encrypt_padded_data(&mut encrypted, &self.k_session_enc, &iv)?;

            if header.ins & 0x01 != 0 {
                // odd INS: the data is BER-TLV encoded already; no padding indicator
                encode_tlv(&mut body, &[TAG_ENCRYPTED_DATA_ODD_INS], &encrypted);
            } else {
                let mut value = Zeroizing::new(Vec::with_capacity(1 + encrypted.len()));
                value.push(PADDING_INDICATOR_ISO);
                value.extend_from_slice(&encrypted);
                encode_tlv(&mut body, &[TAG_PADDED_ENCRYPTED_DATA], &value);
            }
        }

        if let Some(ne) = command.raw_ne() {
            // 256 and 65536 are encoded as zeroes, as in the length fields of a plain APDU
            if command.is_extended() {
                let ne_bytes = ((ne % EXPECTED_LENGTH_WILDCARD_EXTENDED) as u16).to_be_bytes();
                encode_tlv(&mut body, &[TAG_EXPECTED_LENGTH], &ne_bytes);
            } else {
                let ne_byte = (ne % EXPECTED_LENGTH_WILDCARD_SHORT) as u8;
                encode_tlv(&mut body, &[TAG_EXPECTED_LENGTH], &[ne_byte]);
            }
        }

        let padded_header = padded(&header.to_bytes());
        let mac = if body.is_empty() {
            mac_data(&[&self.send_sequence_counter[..], &padded_header[..]], &self.k_session_mac)
        } else {
            let padded_body = padded(&body);
            mac_data(
                &[&self.send_sequence_counter[..], &padded_header[..], &padded_body[..]],
                &self.k_session_mac,
            )
        };
        encode_tlv(&mut body, &[TAG_MAC], &mac);

        let ne = if command.is_extended() {
            EXPECTED_LENGTH_WILDCARD_EXTENDED
        } else {
            EXPECTED_LENGTH_WILDCARD_SHORT
        };
        let protected = CommandApdu::new(header, Some(&body), Some(ne))?;
        Ok(protected)
    }

    /// Verifies and unwraps a protected response APDU.
    ///
    /// The MAC is verified before any part of the response is decrypted.
    pub fn decrypt(&mut self, response: &ResponseApdu) -> Result<ResponseApdu, Error> {
        debug!("decrypt");
        self.increment_send_sequence_counter();

        if response.data().is_empty() {
            return Err(Error::UnprotectedResponse { sw: response.sw() });
        }
        let fields = parse_tlvs(response.data())
            .ok_or(Error::ResponseTlvFormat)?;

        // all data objects with odd tags (except the MAC itself) are authenticated
        let mut mac_input = Vec::new();
        let mut received_mac_opt = None;
        for field in &fields {
            if field.has_tag(TAG_MAC) {
                received_mac_opt = Some(field.data);
            } else if field.first_tag_byte() & 0x01 != 0 {
                mac_input.extend_from_slice(field.tag_and_length);
                mac_input.extend_from_slice(field.data);
            }
        }
        let received_mac = received_mac_opt
            .ok_or(Error::MissingResponseMac)?;
        if received_mac.len() != MAC_LENGTH {
            return Err(Error::ResponseMac);
        }
        cipher_mac::pad(&mut mac_input);
        if !verify_mac_data(&[&self.send_sequence_counter[..], &mac_input[..]], &self.k_session_mac, received_mac) {
            return Err(Error::ResponseMac);
        }

        let mut plain_data = Zeroizing::new(Vec::new());
        let mut trailer = response.trailer();
        for field in &fields {
            if field.has_tag(TAG_PADDED_ENCRYPTED_DATA) {
                let Some((&padding_mode, encrypted)) = field.data.split_first() else {
                    return Err(Error::InvalidPadding);
                };
                if padding_mode != PADDING_INDICATOR_ISO {
                    return Err(Error::UnknownPadding { padding_mode });
                }
                plain_data = self.decrypt_payload(encrypted)?;
            } else if field.has_tag(TAG_ENCRYPTED_DATA_ODD_INS) {
                plain_data = self.decrypt_payload(field.data)?;
            } else if field.has_tag(TAG_STATUS) {
                let [sw1, sw2] = field.data else {
                    return Err(Error::StatusLength { length: field.data.len() });
                };
                trailer = ResponseTrailer::new(*sw1, *sw2);
            }
        }

        Ok(ResponseApdu::from_parts(&plain_data, trailer))
    }

    fn decrypt_payload(&self, encrypted: &[u8]) -> Result<Zeroizing<Vec<u8>>, Error> {
        let mut data = Zeroizing::new(encrypted.to_vec());
        let iv = self.derive_iv();
        decrypt_padded_data(&mut data, &self.k_session_enc, &iv)?;
        let unpadded_length = unpad(&data)
            .ok_or(Error::InvalidPadding)?
            .len();
        data.truncate(unpadded_length);
        Ok(data)
    }
}
