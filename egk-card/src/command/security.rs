//! Commands dealing with keys and authentication.


use crate::card::KeyReference;
use crate::command::{status, ExpectedLength, HealthCardCommand};
use crate::der_util::encode_tlv;
use crate::iso7816::apdu::EXPECTED_LENGTH_WILDCARD_SHORT;


const MSE_INS: u8 = 0x22;
const GENERAL_AUTHENTICATE_INS: u8 = 0x86;
const INTERNAL_AUTHENTICATE_INS: u8 = 0x88;
const PSO_INS: u8 = 0x2A;
const GET_RANDOM_INS: u8 = 0x84;

/// MSE: set for mutual authentication and key agreement, authentication template.
const MSE_SET_AT_MUTUAL_AUTHENTICATION: [u8; 2] = [0xC1, 0xA4];

/// MSE: set for internal authentication, authentication template.
const MSE_SET_AT_INTERNAL_AUTHENTICATION: [u8; 2] = [0x41, 0xA4];

/// MSE: set for computation, digital signature template.
const MSE_SET_DST: [u8; 2] = [0x41, 0xB6];

/// PSO COMPUTE DIGITAL SIGNATURE: return the signature, input is the data to be signed.
const PSO_COMPUTE_DIGITAL_SIGNATURE: [u8; 2] = [0x9E, 0x9A];

/// Bit 5 of CLA: more commands of the chain follow.
const CLA_COMMAND_CHAINING: u8 = 0x10;

const TAG_DYNAMIC_AUTHENTICATION_DATA: u8 = 0x7C;
const TAG_CRYPTOGRAPHIC_MECHANISM: u8 = 0x80;
const TAG_PASSWORD_REFERENCE: u8 = 0x83;
const TAG_PRIVATE_KEY_REFERENCE: u8 = 0x84;


impl HealthCardCommand {
    /// MANAGE SECURITY ENVIRONMENT selecting the PACE protocol and password for the following
    /// GENERAL AUTHENTICATE commands.
    ///
    /// `protocol_oid` is the encoded value of the protocol's object identifier (without tag and
    /// length).
    pub fn manage_security_environment_pace<K: KeyReference>(key: &K, df_specific: bool, protocol_oid: &[u8]) -> Self {
        let mut data = Vec::with_capacity(protocol_oid.len() + 5);
        encode_tlv(&mut data, &[TAG_CRYPTOGRAPHIC_MECHANISM], protocol_oid);
        encode_tlv(&mut data, &[TAG_PASSWORD_REFERENCE], &[key.calculate_key_reference(df_specific)]);

        let [p1, p2] = MSE_SET_AT_MUTUAL_AUTHENTICATION;
        Self {
            expected_status: status::MANAGE_SECURITY_ENVIRONMENT,
            cla: 0x00,
            ins: MSE_INS,
            p1,
            p2,
            data: Some(data),
            ne: None,
        }
    }

    /// MANAGE SECURITY ENVIRONMENT selecting the private key used by INTERNAL AUTHENTICATE.
    pub fn select_internal_key<K: KeyReference>(key: &K, df_specific: bool, algorithm_id: u8) -> Self {
        Self::select_private_key(MSE_SET_AT_INTERNAL_AUTHENTICATION, key, df_specific, algorithm_id)
    }

    /// MANAGE SECURITY ENVIRONMENT selecting the private key used by PSO COMPUTE DIGITAL
    /// SIGNATURE.
    pub fn select_signing_key<K: KeyReference>(key: &K, df_specific: bool, algorithm_id: u8) -> Self {
        Self::select_private_key(MSE_SET_DST, key, df_specific, algorithm_id)
    }

    fn select_private_key<K: KeyReference>(p1_p2: [u8; 2], key: &K, df_specific: bool, algorithm_id: u8) -> Self {
        let mut data = Vec::with_capacity(6);
        encode_tlv(&mut data, &[TAG_PRIVATE_KEY_REFERENCE], &[key.calculate_key_reference(df_specific)]);
        encode_tlv(&mut data, &[TAG_CRYPTOGRAPHIC_MECHANISM], &[algorithm_id]);

        let [p1, p2] = p1_p2;
        Self {
            expected_status: status::MANAGE_SECURITY_ENVIRONMENT,
            cla: 0x00,
            ins: MSE_INS,
            p1,
            p2,
            data: Some(data),
            ne: None,
        }
    }

    /// GENERAL AUTHENTICATE with empty dynamic authentication data (`7C 00`).
    pub fn general_authenticate(command_chaining: bool) -> Self {
        Self::general_authenticate_raw(command_chaining, vec![TAG_DYNAMIC_AUTHENTICATION_DATA, 0x00])
    }

    /// GENERAL AUTHENTICATE carrying one context-specific data object `0x80 | tag_number`
    /// within the dynamic authentication data.
    pub fn general_authenticate_with_data(command_chaining: bool, tag_number: u8, data: &[u8]) -> Self {
        let mut inner = Vec::with_capacity(data.len() + 4);
        encode_tlv(&mut inner, &[0x80 | tag_number], data);
        let mut outer = Vec::with_capacity(inner.len() + 4);
        encode_tlv(&mut outer, &[TAG_DYNAMIC_AUTHENTICATION_DATA], &inner);
        Self::general_authenticate_raw(command_chaining, outer)
    }

    fn general_authenticate_raw(command_chaining: bool, data: Vec<u8>) -> Self {
        Self {
            expected_status: status::GENERAL_AUTHENTICATE,
            cla: if command_chaining { CLA_COMMAND_CHAINING } else { 0x00 },
            ins: GENERAL_AUTHENTICATE_INS,
            p1: 0x00,
            p2: 0x00,
            data: Some(data),
            ne: Some(ExpectedLength::Exact(EXPECTED_LENGTH_WILDCARD_SHORT)),
        }
    }

    /// INTERNAL AUTHENTICATE: have the card sign `token` with the selected key.
    pub fn internal_authenticate(token: &[u8]) -> Self {
        Self {
            expected_status: status::INTERNAL_AUTHENTICATE,
            cla: 0x00,
            ins: INTERNAL_AUTHENTICATE_INS,
            p1: 0x00,
            p2: 0x00,
            data: Some(token.to_vec()),
            ne: Some(ExpectedLength::All),
        }
    }

    /// PSO COMPUTE DIGITAL SIGNATURE over `data_to_be_signed` with the selected key.
    pub fn pso_compute_digital_signature(data_to_be_signed: &[u8]) -> Self {
        let [p1, p2] = PSO_COMPUTE_DIGITAL_SIGNATURE;
        Self {
            expected_status: status::PSO_COMPUTE_DIGITAL_SIGNATURE,
            cla: 0x00,
            ins: PSO_INS,
            p1,
            p2,
            data: Some(data_to_be_signed.to_vec()),
            ne: Some(ExpectedLength::All),
        }
    }

    /// GET RANDOM, requesting `length` random bytes from the card.
    pub fn get_random(length: usize) -> Self {
        Self {
            expected_status: status::GET_RANDOM,
            cla: 0x80,
            ins: GET_RANDOM_INS,
            p1: 0x00,
            p2: 0x00,
            data: None,
            ne: Some(ExpectedLength::Exact(length)),
        }
    }
}
