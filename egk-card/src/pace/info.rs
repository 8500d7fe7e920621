//! PACE parameters announced by the card in `EF.CardAccess`.


use rasn::{AsnType, Decode, Encode};
use rasn::types::ObjectIdentifier;

use crate::crypt::elliptic::curves::NamedCurve;
use crate::der_util::{parse_tlvs, take_tlv};
use crate::pace::Error;
use crate::pace::oids::{is_pace, PACE_ECDH_GM_AES_CBC_CMAC_128};


const TAG_SET: u8 = 0x31;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_OBJECT_IDENTIFIER: u8 = 0x06;


/// A `PaceInfo` structure as encoded in `EF.CardAccess` (BSI TR-03110-3 § A.1.1).
///
/// `EF.CardAccess` is a SET OF security infos; only those whose first member is a PACE protocol
/// identifier have this structure.
#[derive(AsnType, Clone, Debug, Decode, Encode, Eq, Hash, PartialEq)]
struct PaceInfoAsn1 {
    protocol: ObjectIdentifier,
    version: i32,
    parameter_id: Option<i32>,
}


/// The PACE protocol and domain parameters to use with a card.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct PaceInfo {
    protocol: ObjectIdentifier,
    protocol_bytes: Vec<u8>,
    version: i32,
    parameter_id: i32,
    curve: NamedCurve,
}
impl PaceInfo {
    /// Picks the first supported PACE entry from the contents of `EF.CardAccess`.
    pub fn from_card_access(card_access: &[u8]) -> Result<Self, Error> {
        let (set, _trailer) = take_tlv(card_access)
            .ok_or(Error::CardAccessStructure)?;
        if !set.has_tag(TAG_SET) {
            return Err(Error::CardAccessStructure);
        }
        let security_infos = parse_tlvs(set.data)
            .ok_or(Error::CardAccessStructure)?;

        let mut unsupported = None;
        for (entry_index, security_info) in security_infos.iter().enumerate() {
            if !security_info.has_tag(TAG_SEQUENCE) {
                return Err(Error::CardAccessStructure);
            }
            let Some((oid_tlv, _rest)) = take_tlv(security_info.data) else {
                // empty or broken entry
                continue;
            };
            if !oid_tlv.has_tag(TAG_OBJECT_IDENTIFIER) {
                continue;
            }
            let oid_encoded = oid_tlv.encoded();
            let Ok(protocol): Result<ObjectIdentifier, _> = rasn::der::decode(&oid_encoded) else {
                continue;
            };
            if !is_pace(&protocol) {
                // not relevant
                continue;
            }

            let encoded = security_info.encoded();
            let pace_info: PaceInfoAsn1 = rasn::der::decode(&encoded)
                .map_err(|error| Error::CardAccessDecoding { entry_index, error })?;

            if &*pace_info.protocol != PACE_ECDH_GM_AES_CBC_CMAC_128 {
                unsupported.get_or_insert((pace_info.protocol, pace_info.parameter_id));
                continue;
            }
            let Some(curve) = pace_info.parameter_id.and_then(NamedCurve::from_parameter_id) else {
                unsupported.get_or_insert((pace_info.protocol, pace_info.parameter_id));
                continue;
            };

            return Ok(Self {
                protocol: pace_info.protocol,
                protocol_bytes: oid_tlv.data.to_vec(),
                version: pace_info.version,
                parameter_id: curve.parameter_id(),
                curve,
            });
        }

        Err(match unsupported {
            Some((protocol, parameter)) => Error::UnsupportedParameters { protocol, parameter },
            None => Error::NotSupported,
        })
    }

    pub fn protocol(&self) -> &ObjectIdentifier { &self.protocol }

    /// The value bytes of the DER encoding of the protocol identifier.
    pub fn protocol_bytes(&self) -> &[u8] { &self.protocol_bytes }

    pub fn version(&self) -> i32 { self.version }
    pub fn parameter_id(&self) -> i32 { self.parameter_id }
    pub fn curve(&self) -> NamedCurve { self.curve }
}
