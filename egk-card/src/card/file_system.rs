//! Objects of the eGK object system (gemSpec_ObjSys).


use hex_literal::hex;

use crate::card::{CardKey, PasswordReference};
use crate::identifier::{ApplicationIdentifier, FileIdentifier, ShortFileIdentifier};


/// An elementary file, addressable by file identifier or short file identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ElementaryFile {
    pub fid: FileIdentifier,
    pub sfid: ShortFileIdentifier,
}
impl ElementaryFile {
    const fn new(fid: u16, sfid: u8) -> Self {
        let fid = match FileIdentifier::new(fid) {
            Ok(f) => f,
            Err(_) => panic!("reserved file identifier"),
        };
        let sfid = match ShortFileIdentifier::new(sfid) {
            Ok(s) => s,
            Err(_) => panic!("short file identifier out of range"),
        };
        Self { fid, sfid }
    }
}

const fn aid(bytes: &[u8]) -> ApplicationIdentifier {
    match ApplicationIdentifier::new(bytes) {
        Ok(a) => a,
        Err(_) => panic!("invalid application identifier length"),
    }
}

const fn card_key(id: u8) -> CardKey {
    match CardKey::new(id) {
        Ok(k) => k,
        Err(_) => panic!("key identifier out of range"),
    }
}

const fn password(id: u8) -> PasswordReference {
    match PasswordReference::new(id) {
        Ok(p) => p,
        Err(_) => panic!("password identifier out of range"),
    }
}


/// Elementary files in the master file or reachable from it.
pub mod ef {
    use super::ElementaryFile;

    pub const CARD_ACCESS: ElementaryFile = ElementaryFile::new(0x011C, 0x1C);
    pub const VERSION: ElementaryFile = ElementaryFile::new(0x2F10, 0x10);
    pub const VERSION2: ElementaryFile = ElementaryFile::new(0x2F11, 0x11);
    pub const ATR: ElementaryFile = ElementaryFile::new(0x2F01, 0x1D);
    pub const C_CA_EGK_CS_E256: ElementaryFile = ElementaryFile::new(0x2F07, 0x07);
    pub const C_EGK_AUT_CVC_E256: ElementaryFile = ElementaryFile::new(0x2F06, 0x06);
    pub const DIR: ElementaryFile = ElementaryFile::new(0x2F00, 0x1E);
    pub const GDO: ElementaryFile = ElementaryFile::new(0x2F02, 0x02);

    pub const NFD: ElementaryFile = ElementaryFile::new(0xD010, 0x10);
    pub const HCA_EINWILLIGUNG: ElementaryFile = ElementaryFile::new(0xD005, 0x05);
    pub const HCA_GVD: ElementaryFile = ElementaryFile::new(0xD003, 0x03);
    pub const HCA_LOGGING: ElementaryFile = ElementaryFile::new(0xD006, 0x06);
    pub const HCA_PD: ElementaryFile = ElementaryFile::new(0xD001, 0x01);
    pub const HCA_PRUEFUNGSNACHWEIS: ElementaryFile = ElementaryFile::new(0xD01C, 0x1C);
    pub const HCA_STANDALONE: ElementaryFile = ElementaryFile::new(0xDA0A, 0x0A);
    pub const HCA_STATUS_VD: ElementaryFile = ElementaryFile::new(0xD00C, 0x0C);
    pub const HCA_TTN: ElementaryFile = ElementaryFile::new(0xD00F, 0x0F);
    pub const HCA_VD: ElementaryFile = ElementaryFile::new(0xD002, 0x02);
    pub const HCA_VERWEIS: ElementaryFile = ElementaryFile::new(0xD009, 0x09);

    pub const ESIGN_C_CH_AUT_R2048: ElementaryFile = ElementaryFile::new(0xC500, 0x01);
    pub const ESIGN_C_CH_AUT_E256: ElementaryFile = ElementaryFile::new(0xC504, 0x04);
    pub const ESIGN_C_CH_AUTN_R2048: ElementaryFile = ElementaryFile::new(0xC509, 0x09);
    pub const ESIGN_C_CH_ENC_R2048: ElementaryFile = ElementaryFile::new(0xC200, 0x02);
    pub const ESIGN_C_CH_ENCV_R2048: ElementaryFile = ElementaryFile::new(0xC50A, 0x0A);
}


/// Dedicated files (applications).
pub mod df {
    use super::{aid, hex, ApplicationIdentifier};

    /// DF.ESIGN, holding the authentication and encryption keys and certificates.
    pub const ESIGN: ApplicationIdentifier = aid(&hex!("A000000167455349474E"));

    /// DF.HCA, the health care application.
    pub const HCA: ApplicationIdentifier = aid(&hex!("D27600000102"));

    pub mod hca {
        use crate::card::file_system::ElementaryFile;

        pub const PD: ElementaryFile = ElementaryFile::new(0xD001, 0x01);
        pub const VD: ElementaryFile = ElementaryFile::new(0xD002, 0x02);
    }
}


/// Objects of the master file.
pub mod mf {
    use super::{password, PasswordReference};

    /// MRPIN.home
    pub const MR_PIN_HOME: PasswordReference = password(0x02);

    pub mod esign {
        use crate::card::CardKey;
        use crate::card::file_system::{card_key, ElementaryFile};

        pub const C_CH_AUT_E256: ElementaryFile = ElementaryFile::new(0xC504, 0x04);

        /// PrK.CH.AUT.E256
        pub const PRK_CH_AUT_E256: CardKey = card_key(0x04);
    }
}


/// The key used by INTERNAL AUTHENTICATE in the default configuration (PrK.eGK.AUT_CVC.E256).
pub const INTERNAL_AUTHENTICATION_KEY: CardKey = card_key(0x09);


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(ef::CARD_ACCESS.fid.to_bytes(), [0x01, 0x1C]);
        assert_eq!(ef::VERSION2.sfid.value(), 0x11);
        assert_eq!(df::ESIGN.as_bytes(), &hex!("A000000167455349474E"));
        assert_eq!(df::HCA.as_bytes().len(), 6);
        assert_eq!(mf::esign::C_CH_AUT_E256, ef::ESIGN_C_CH_AUT_E256);
    }
}
