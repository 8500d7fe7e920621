//! Implementation of Password Authenticated Connection Establishment.
//!
//! The eGK uses PACE with elliptic-curve Diffie-Hellman, generic mapping and AES-128 with the
//! card access number (CAN) as the password. The result is a pair of session keys for
//! [`SecureMessaging`](crate::secure_messaging::SecureMessaging).


pub mod info;
pub mod kdf;
pub mod oids;


use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use rasn::types::ObjectIdentifier;
use subtle::ConstantTimeEq;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use crate::card::{PaceKey, PasswordReference};
use crate::card::file_system::ef;
use crate::card::version::HealthCardVersion2;
use crate::channel::CardChannel;
use crate::command::{ExpectedLength, HealthCardCommand};
use crate::crypt::{boxed_uint_from_be_slice_auto, to_minimal_be_bytes};
use crate::crypt::cipher_mac::{decrypt_padded_data, mac_data, MAC_LENGTH};
use crate::crypt::elliptic::{AffinePoint, PrimeWeierstrassCurve};
use crate::der_util::{encode_tlv, take_tlv};
use crate::iso7816::apdu::ResponseApdu;
use crate::iso7816::card::CommunicationError;
use crate::pace::info::PaceInfo;
use crate::pace::kdf::{derive_key, KeyDerivationMode};


/// The CAN, referenced by MANAGE SECURITY ENVIRONMENT.
pub const CAN_PASSWORD_REFERENCE: PasswordReference = match PasswordReference::new(0x02) {
    Ok(p) => p,
    Err(_) => panic!("password identifier out of range"),
};

const TAG_DYNAMIC_AUTHENTICATION_DATA: u8 = 0x7C;
const TAG_ENCRYPTED_NONCE: u8 = 0x80;
const TAG_CARD_MAPPING_DATA: u8 = 0x82;
const TAG_CARD_EPHEMERAL_PUBLIC_KEY: u8 = 0x84;
const TAG_CARD_AUTHENTICATION_TOKEN: u8 = 0x86;

/// Tag numbers of the data objects sent within the dynamic authentication data.
const TAG_NUMBER_MAPPING_DATA: u8 = 0x01;
const TAG_NUMBER_EPHEMERAL_PUBLIC_KEY: u8 = 0x03;
const TAG_NUMBER_AUTHENTICATION_TOKEN: u8 = 0x05;

const TAG_PUBLIC_KEY: [u8; 2] = [0x7F, 0x49];
const TAG_OBJECT_IDENTIFIER: u8 = 0x06;
const TAG_EC_PUBLIC_POINT: u8 = 0x86;


#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Operation {
    ObtainNonce,
    ExchangeMappingPublicKeys,
    ExchangeEphemeralPublicKeys,
    MutualAuthentication,
}


#[derive(Debug)]
pub enum Error {
    InvalidCardVersion,
    CardAccessStructure,
    CardAccessDecoding {
        entry_index: usize,
        error: rasn::error::DecodeError,
    },
    NotSupported,
    UnsupportedParameters {
        protocol: ObjectIdentifier,
        parameter: Option<i32>,
    },
    UnexpectedResponse { operation: Operation },
    NonceLength { length: usize },
    PublicKey { operation: Operation },
    DiffieHellmanKeysEqual,
    DiffieHellmanResult,
    MutualAuthentication,
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::InvalidCardVersion
                => write!(f, "card is not an eGK of generation 2.1 or later"),
            Self::CardAccessStructure
                => write!(f, "EF.CardAccess is not a SET of security infos"),
            Self::CardAccessDecoding { entry_index, error }
                => write!(f, "failed to decode EF.CardAccess entry {} as PaceInfo: {}", entry_index, error),
            Self::NotSupported
                => write!(f, "PACE is not supported"),
            Self::UnsupportedParameters { protocol, parameter: Some(parameter) }
                => write!(f, "PACE protocol {} with parameter {} is not supported", protocol, parameter),
            Self::UnsupportedParameters { protocol, parameter: None }
                => write!(f, "PACE protocol {} without standardized parameters is not supported", protocol),
            Self::UnexpectedResponse { operation }
                => write!(f, "operation {:?} received an unexpected response", operation),
            Self::NonceLength { length }
                => write!(f, "encrypted nonce has invalid length {}", length),
            Self::PublicKey { operation }
                => write!(f, "operation {:?} received an invalid public key", operation),
            Self::DiffieHellmanKeysEqual
                => write!(f, "terminal and chip Diffie-Hellman keys are equal"),
            Self::DiffieHellmanResult
                => write!(f, "invalid Diffie-Hellman result"),
            Self::MutualAuthentication
                => write!(f, "mutual authentication failed"),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidCardVersion => None,
            Self::CardAccessStructure => None,
            Self::CardAccessDecoding { .. } => None,
            Self::NotSupported => None,
            Self::UnsupportedParameters { .. } => None,
            Self::UnexpectedResponse { .. } => None,
            Self::NonceLength { .. } => None,
            Self::PublicKey { .. } => None,
            Self::DiffieHellmanKeysEqual => None,
            Self::DiffieHellmanResult => None,
            Self::MutualAuthentication => None,
        }
    }
}


/// Extracts the value of the data object `inner_tag` from the dynamic authentication data (`7C`)
/// of a GENERAL AUTHENTICATE response.
fn extract_authentication_data(operation: Operation, response: &ResponseApdu, inner_tag: u8) -> Result<Zeroizing<Vec<u8>>, Error> {
    let (outer, _rest) = take_tlv(response.data())
        .ok_or(Error::UnexpectedResponse { operation })?;
    if !outer.has_tag(TAG_DYNAMIC_AUTHENTICATION_DATA) {
        return Err(Error::UnexpectedResponse { operation });
    }
    let (inner, _rest) = take_tlv(outer.data)
        .ok_or(Error::UnexpectedResponse { operation })?;
    if !inner.has_tag(inner_tag) {
        return Err(Error::UnexpectedResponse { operation });
    }
    Ok(Zeroizing::new(inner.data.to_vec()))
}


/// Calculates the token used for mutual authentication: the MAC over the public key data object
/// of the other party's ephemeral key.
fn calculate_mutual_token(protocol_bytes: &[u8], public_key: &[u8], k_session_mac: &[u8; 16]) -> [u8; MAC_LENGTH] {
    // 7F49 LL { 06 LL protocol_oid, 86 LL public_point }
    let mut inner_data = Zeroizing::new(Vec::new());
    encode_tlv(&mut inner_data, &[TAG_OBJECT_IDENTIFIER], protocol_bytes);
    encode_tlv(&mut inner_data, &[TAG_EC_PUBLIC_POINT], public_key);

    let mut outer_data = Zeroizing::new(Vec::new());
    encode_tlv(&mut outer_data, &TAG_PUBLIC_KEY, &inner_data);

    mac_data(&[outer_data.as_slice()], k_session_mac)
}


/// Reads the card's version and verifies that it is a generation 2.1 eGK or later.
fn check_card_version<C: CardChannel + ?Sized>(channel: &mut C) -> Result<(), CommunicationError> {
    HealthCardCommand::select_root_or_parent(false, true)
        .execute_successful_on(channel)?;
    let response = HealthCardCommand::read_sfid(ef::VERSION2.sfid, 0, ExpectedLength::All)
        .execute_successful_on(channel)?;
    let version = HealthCardVersion2::parse(response.apdu.data())
        .ok_or(Error::InvalidCardVersion)?;
    if !version.is_egk21() {
        return Err(Error::InvalidCardVersion.into());
    }
    Ok(())
}

/// Reads EF.CardAccess and picks the PACE parameters from it.
fn read_pace_info<C: CardChannel + ?Sized>(channel: &mut C) -> Result<PaceInfo, CommunicationError> {
    HealthCardCommand::select_fid(ef::CARD_ACCESS.fid, false, None)
        .execute_successful_on(channel)?;
    let response = HealthCardCommand::read()
        .execute_successful_on(channel)?;
    let info = PaceInfo::from_card_access(response.apdu.data())?;
    Ok(info)
}

fn decode_card_point(curve: &PrimeWeierstrassCurve, operation: Operation, bytes: &[u8]) -> Result<AffinePoint, Error> {
    curve.decode_point(bytes)
        .ok_or(Error::PublicKey { operation })
}

fn encode_own_point(curve: &PrimeWeierstrassCurve, point: &AffinePoint) -> Result<Zeroizing<Vec<u8>>, Error> {
    curve.encode_point(point)
        .ok_or(Error::DiffieHellmanResult)
}


/// Establishes PACE session keys with the card using the given CAN.
#[instrument(skip_all)]
pub fn establish<C: CardChannel + ?Sized>(channel: &mut C, can: &str) -> Result<PaceKey, CommunicationError> {
    check_card_version(channel)?;
    let info = read_pace_info(channel)?;
    let curve = info.curve().curve()
        .ok_or(Error::NotSupported)?;

    let mut derivation_private_key = Zeroizing::new(vec![0u8; curve.field_size_bytes()]);
    OsRng.fill_bytes(derivation_private_key.as_mut_slice());
    let mut session_private_key = Zeroizing::new(vec![0u8; curve.field_size_bytes()]);
    OsRng.fill_bytes(session_private_key.as_mut_slice());

    perform_key_agreement(
        channel,
        &info,
        &curve,
        can.as_bytes(),
        &derivation_private_key,
        &session_private_key,
    )
}


/// Establishes PACE session keys with the card using specific private keys.
///
/// `password` is the raw password (for an eGK, the ASCII digits of the CAN).
#[instrument(skip_all)]
pub fn establish_with_values<C: CardChannel + ?Sized>(
    channel: &mut C,
    password: &[u8],
    derivation_private_key: &[u8],
    session_private_key: &[u8],
) -> Result<PaceKey, CommunicationError> {
    check_card_version(channel)?;
    let info = read_pace_info(channel)?;
    let curve = info.curve().curve()
        .ok_or(Error::NotSupported)?;
    perform_key_agreement(
        channel,
        &info,
        &curve,
        password,
        derivation_private_key,
        session_private_key,
    )
}


#[instrument(skip_all)]
fn perform_key_agreement<C: CardChannel + ?Sized>(
    channel: &mut C,
    info: &PaceInfo,
    curve: &PrimeWeierstrassCurve,
    password: &[u8],
    derivation_private_key: &[u8],
    session_private_key: &[u8],
) -> Result<PaceKey, CommunicationError> {
    let derivation_private_key = curve.scalar_from_be_slice(derivation_private_key)
        .ok_or(Error::DiffieHellmanResult)?;
    let session_private_key = curve.scalar_from_be_slice(session_private_key)
        .ok_or(Error::DiffieHellmanResult)?;

    debug!("setting authentication template for {}", info.protocol());
    HealthCardCommand::manage_security_environment_pace(&CAN_PASSWORD_REFERENCE, false, info.protocol_bytes())
        .execute_successful_on(channel)?;

    // obtain and decrypt the nonce
    debug!("obtaining nonce");
    let response = HealthCardCommand::general_authenticate(true)
        .execute_successful_on(channel)?;
    let mut nonce_bytes = extract_authentication_data(Operation::ObtainNonce, &response.apdu, TAG_ENCRYPTED_NONCE)?;
    let nonce_key = derive_key(password, KeyDerivationMode::Password);
    let nonce_length = nonce_bytes.len();
    if nonce_length == 0 {
        return Err(Error::NonceLength { length: nonce_length }.into());
    }
    decrypt_padded_data(&mut nonce_bytes, &nonce_key, &[0u8; 16])
        .map_err(|_| Error::NonceLength { length: nonce_length })?;
    let nonce = Zeroizing::new(
        boxed_uint_from_be_slice_auto(&nonce_bytes)
            .ok_or(Error::NonceLength { length: nonce_length })?
    );

    // first key agreement yields the generator of the session curve
    debug!("exchanging mapping public keys");
    let session_curve = {
        let public_key = curve.calculate_public_key(&derivation_private_key)
            .ok_or(Error::DiffieHellmanResult)?;
        let public_key_bytes = encode_own_point(curve, &public_key)?;
        let response = HealthCardCommand::general_authenticate_with_data(true, TAG_NUMBER_MAPPING_DATA, &public_key_bytes)
            .execute_successful_on(channel)?;
        let card_public_key_bytes = extract_authentication_data(Operation::ExchangeMappingPublicKeys, &response.apdu, TAG_CARD_MAPPING_DATA)?;
        let card_public_key = decode_card_point(curve, Operation::ExchangeMappingPublicKeys, &card_public_key_bytes)?;
        if public_key_bytes.ct_eq(card_public_key_bytes.as_slice()).into() {
            return Err(Error::DiffieHellmanKeysEqual.into());
        }
        let shared_point = curve.diffie_hellman(&derivation_private_key, &card_public_key)
            .ok_or(Error::DiffieHellmanResult)?;
        curve.derive_generic_mapping_session_curve(&nonce, &shared_point)
            .ok_or(Error::DiffieHellmanResult)?
    };

    // second key agreement on the session curve
    debug!("exchanging ephemeral public keys");
    let (shared_secret, public_key_bytes, card_public_key_bytes) = {
        let public_key = session_curve.calculate_public_key(&session_private_key)
            .ok_or(Error::DiffieHellmanResult)?;
        let public_key_bytes = encode_own_point(&session_curve, &public_key)?;
        let response = HealthCardCommand::general_authenticate_with_data(true, TAG_NUMBER_EPHEMERAL_PUBLIC_KEY, &public_key_bytes)
            .execute_successful_on(channel)?;
        let card_public_key_bytes = extract_authentication_data(Operation::ExchangeEphemeralPublicKeys, &response.apdu, TAG_CARD_EPHEMERAL_PUBLIC_KEY)?;
        let card_public_key = decode_card_point(&session_curve, Operation::ExchangeEphemeralPublicKeys, &card_public_key_bytes)?;
        if public_key_bytes.ct_eq(card_public_key_bytes.as_slice()).into() {
            return Err(Error::DiffieHellmanKeysEqual.into());
        }
        let shared_point = session_curve.diffie_hellman(&session_private_key, &card_public_key)
            .ok_or(Error::DiffieHellmanResult)?;
        let shared_secret = to_minimal_be_bytes(shared_point.x());
        (shared_secret, public_key_bytes, card_public_key_bytes)
    };

    // derive keys
    let k_session_enc = derive_key(&shared_secret, KeyDerivationMode::Enc);
    let k_session_mac = derive_key(&shared_secret, KeyDerivationMode::Mac);

    // mutual authentication
    debug!("performing mutual authentication");
    let outgoing_token = calculate_mutual_token(info.protocol_bytes(), &card_public_key_bytes, &k_session_mac);
    let expected_token = calculate_mutual_token(info.protocol_bytes(), &public_key_bytes, &k_session_mac);
    let response = HealthCardCommand::general_authenticate_with_data(false, TAG_NUMBER_AUTHENTICATION_TOKEN, &outgoing_token)
        .execute_successful_on(channel)?;
    let incoming_token = extract_authentication_data(Operation::MutualAuthentication, &response.apdu, TAG_CARD_AUTHENTICATION_TOKEN)?;
    if !bool::from(incoming_token.as_slice().ct_eq(&expected_token)) {
        return Err(Error::MutualAuthentication.into());
    }

    Ok(PaceKey::new(*k_session_enc, *k_session_mac))
}


#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_extract_authentication_data() {
        let response = ResponseApdu::from_slice(&hex!("7C 06 80 04 01020304 9000")).unwrap();
        let data = extract_authentication_data(Operation::ObtainNonce, &response, 0x80).unwrap();
        assert_eq!(data.as_slice(), &hex!("01020304"));

        assert!(matches!(
            extract_authentication_data(Operation::ObtainNonce, &response, 0x82),
            Err(Error::UnexpectedResponse { operation: Operation::ObtainNonce }),
        ));

        let wrong_outer = ResponseApdu::from_slice(&hex!("7D 06 80 04 01020304 9000")).unwrap();
        assert!(extract_authentication_data(Operation::ObtainNonce, &wrong_outer, 0x80).is_err());

        let empty = ResponseApdu::from_slice(&hex!("9000")).unwrap();
        assert!(extract_authentication_data(Operation::ObtainNonce, &empty, 0x80).is_err());
    }

    #[test]
    fn test_mutual_token() {
        // ICAO Doc 9303 Part 11 Appendix G.1
        let k_session_mac = hex!("FE251C7858B356B24514B3BD5F4297D1");
        let protocol_bytes = hex!("04007F00070202040202");
        let card_public_key = hex!("
            04
            9E880F842905B8B3181F7AF7CAA9F0EFB743847F44A306D2D28C1D9EC65DF6DB
            7764B22277A2EDDC3C265A9F018F9CB852E111B768B326904B59A0193776F094
        ");
        let terminal_public_key = hex!("
            04
            2DB7A64C0355044EC9DF190514C625CBA2CEA48754887122F3A5EF0D5EDD301C
            3556F3B3B186DF10B857B58F6A7EB80F20BA5DC7BE1D43D9BF850149FBB36462
        ");
        assert_eq!(
            calculate_mutual_token(&protocol_bytes, &card_public_key, &k_session_mac),
            hex!("C2B0BD78D94BA866"),
        );
        assert_eq!(
            calculate_mutual_token(&protocol_bytes, &terminal_public_key, &k_session_mac),
            hex!("3ABB9674BCE93C08"),
        );
    }

    /// Remembers the names of all spans created while it is the default subscriber.
    #[derive(Default)]
    struct SpanNames {
        names: std::sync::Mutex<Vec<&'static str>>,
    }
    impl tracing::Subscriber for SpanNames {
        fn register_callsite(&self, _metadata: &'static tracing::Metadata<'static>) -> tracing::subscriber::Interest {
            tracing::subscriber::Interest::sometimes()
        }
        fn enabled(&self, _metadata: &tracing::Metadata<'_>) -> bool { true }
        fn new_span(&self, span: &tracing::span::Attributes<'_>) -> tracing::span::Id {
            let mut names = self.names.lock().unwrap();
            names.push(span.metadata().name());
            tracing::span::Id::from_u64(names.len() as u64)
        }
        fn record(&self, _span: &tracing::span::Id, _values: &tracing::span::Record<'_>) {}
        fn record_follows_from(&self, _span: &tracing::span::Id, _follows: &tracing::span::Id) {}
        fn event(&self, _event: &tracing::Event<'_>) {}
        fn enter(&self, _span: &tracing::span::Id) {}
        fn exit(&self, _span: &tracing::span::Id) {}
    }

    struct NoFileTransport;
    impl crate::iso7816::card::Transport for NoFileTransport {
        fn transceive(&mut self, _command: &[u8]) -> Result<Vec<u8>, CommunicationError> {
            Ok(hex!("6A82").to_vec())
        }
        fn max_transceive_length(&self) -> usize { 261 }
        fn is_extended_length_supported(&self) -> bool { false }
    }

    #[test]
    fn test_establish_span() {
        let subscriber = std::sync::Arc::new(SpanNames::default());
        let result = tracing::subscriber::with_default(subscriber.clone(), || {
            let mut channel = crate::channel::PlainChannel::new(NoFileTransport);
            establish(&mut channel, "123456")
        });
        assert!(matches!(result, Err(CommunicationError::Response(_))));
        assert_eq!(subscriber.names.lock().unwrap().first(), Some(&"establish"));
    }
}
