//! Shortcuts for commands frequently sent to an eGK.


use crate::card::CardKey;
use crate::card::file_system::{ef, ElementaryFile};
use crate::command::{ExpectedLength, HealthCardCommand};


/// The symmetric key used for INTERNAL AUTHENTICATE without elliptic curves.
pub const INTERNAL_AUTHENTICATION_KEY: CardKey = match CardKey::new(0x09) {
    Ok(k) => k,
    Err(_) => panic!("key identifier out of range"),
};


impl HealthCardCommand {
    /// Selects the root of the object system without requesting its FCP.
    pub fn select_root() -> Self {
        Self::select_root_or_parent(false, false)
    }

    /// Selects the key for internal authentication.
    pub fn select_internal() -> Self {
        Self::select_internal_key(&INTERNAL_AUTHENTICATION_KEY, false, 0x00)
    }

    fn read_whole_sfid(file: ElementaryFile, ne: ExpectedLength) -> Self {
        Self::read_sfid(file.sfid, 0, ne)
    }

    pub fn read_atr(ne: ExpectedLength) -> Self {
        Self::read_whole_sfid(ef::ATR, ne)
    }

    pub fn read_version2(ne: ExpectedLength) -> Self {
        Self::read_whole_sfid(ef::VERSION2, ne)
    }

    /// Reads EF.GDO, holding the card's ICCSN.
    pub fn read_gdo(ne: ExpectedLength) -> Self {
        Self::read_whole_sfid(ef::GDO, ne)
    }

    /// Reads the CV certificate of the CA that issued the card's authentication CVC.
    pub fn read_cvc_ca(ne: ExpectedLength) -> Self {
        Self::read_whole_sfid(ef::C_CA_EGK_CS_E256, ne)
    }

    pub fn read_cvc_auth(ne: ExpectedLength) -> Self {
        Self::read_whole_sfid(ef::C_EGK_AUT_CVC_E256, ne)
    }

    /// Reads the RSA authentication certificate; DF.ESIGN must be selected.
    pub fn read_x509_auth_rsa(ne: ExpectedLength) -> Self {
        Self::read_whole_sfid(ef::ESIGN_C_CH_AUT_R2048, ne)
    }

    /// Reads the ECC authentication certificate; DF.ESIGN must be selected.
    pub fn read_x509_auth_ecc(ne: ExpectedLength) -> Self {
        Self::read_whole_sfid(ef::ESIGN_C_CH_AUT_E256, ne)
    }
}
