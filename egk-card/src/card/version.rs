//! Contents of EF.Version2.


use crate::der_util::{parse_tlvs, take_tlv};


/// Tag of the constructed object wrapping all version entries.
const VERSION2_TAG: u8 = 0xEF;

/// Tag of the object system version.
const OBJECT_SYSTEM_VERSION_TAG: u8 = 0xC1;

/// Tag of the product identification, which is not a version triplet.
const PRODUCT_IDENTIFICATION_TAG: u8 = 0xC2;

/// Lowest object system version of a generation 2.1 eGK (4.4.0).
const EGK21_MIN_VERSION: u32 = 0x04_04_00;


/// The version information stored in EF.Version2.
///
/// Most entries are three-byte version numbers (major, minor, revision) identified by a tag from
/// `C0` to `C7`; `C2` holds the product identification instead.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct HealthCardVersion2 {
    entries: Vec<(u8, Vec<u8>)>,
}
impl HealthCardVersion2 {
    /// Parses the contents of EF.Version2.
    ///
    /// Trailing bytes after the outer object (usually `00` or `FF` filler) are ignored.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (outer, _rest) = take_tlv(data)?;
        if !outer.has_tag(VERSION2_TAG) {
            return None;
        }

        let entries = parse_tlvs(outer.data)?
            .into_iter()
            .map(|tlv| (tlv.first_tag_byte(), tlv.data.to_vec()))
            .collect();
        Some(Self { entries })
    }

    /// The raw contents of the entry with the given tag, if any.
    pub fn get_raw(&self, tag: u8) -> Option<&[u8]> {
        self.entries.iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_slice())
    }

    /// The version stored under the given tag, if there is one and it is a version triplet.
    pub fn get(&self, tag: u8) -> Option<[u8; 3]> {
        self.get_raw(tag)?.try_into().ok()
    }

    pub fn object_system_version(&self) -> Option<[u8; 3]> {
        self.get(OBJECT_SYSTEM_VERSION_TAG)
    }

    pub fn product_identification(&self) -> Option<&[u8]> {
        self.get_raw(PRODUCT_IDENTIFICATION_TAG)
    }

    /// Whether this is a generation 2.1 card (object system version 4.4.0 or later).
    pub fn is_egk21(&self) -> bool {
        let Some(v) = self.object_system_version() else {
            return false
        };
        let version =
            (u32::from(v[0]) << 16)
            | (u32::from(v[1]) << 8)
            | (u32::from(v[2]) << 0);
        version >= EGK21_MIN_VERSION
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn test_egk21() {
        let data = hex!("
            EF 2B
                C0 03 020000
                C1 03 040400
                C2 10 00000000000000000000000000000000
                C4 03 010000
                C5 03 020000
                C7 03 010000
            9000
        ");
        let version = HealthCardVersion2::parse(&data).unwrap();
        assert_eq!(version.object_system_version(), Some([4, 4, 0]));
        assert_eq!(version.product_identification(), Some(&[0u8; 16][..]));
        assert_eq!(version.get(0xC2), None);
        assert_eq!(version.get(0xC4), Some([1, 0, 0]));
        assert!(version.is_egk21());

        let data = hex!("
            EF 1E
                C0 03 020000
                C1 03 040502
                C3 03 010000
                C4 03 010000
                C5 03 020000
                C7 03 010000
        ");
        let version = HealthCardVersion2::parse(&data).unwrap();
        assert_eq!(version.object_system_version(), Some([4, 5, 2]));
        assert_eq!(version.get(0xC0), Some([2, 0, 0]));
        assert_eq!(version.get(0xC6), None);
        assert!(version.is_egk21());
    }

    #[test]
    fn test_egk2() {
        let data = hex!("EF 0A C0 03 010000 C1 03 040300 0000");
        let version = HealthCardVersion2::parse(&data).unwrap();
        assert!(!version.is_egk21());

        // the revision counts too
        let data = hex!("EF 05 C1 03 0403FF");
        assert!(!HealthCardVersion2::parse(&data).unwrap().is_egk21());

        // a high filling instructions version does not make a card 2.1
        let data = hex!("EF 0A C1 03 030000 C4 03 040400");
        assert!(!HealthCardVersion2::parse(&data).unwrap().is_egk21());

        // a malformed object system version is no version at all
        let data = hex!("EF 04 C1 02 0404");
        assert!(!HealthCardVersion2::parse(&data).unwrap().is_egk21());

        assert!(!HealthCardVersion2::default().is_egk21());
        assert_eq!(HealthCardVersion2::parse(&hex!("30 05 C1 03 040400")), None);
    }
}
