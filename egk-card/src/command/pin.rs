//! Commands dealing with passwords: VERIFY, GET PIN STATUS, CHANGE REFERENCE DATA and
//! RESET RETRY COUNTER.


use crate::card::{EncryptedPinFormat2, KeyReference, PasswordReference};
use crate::command::{status, HealthCardCommand};


const VERIFY_INS: u8 = 0x20;
const CHANGE_REFERENCE_DATA_INS: u8 = 0x24;
const RESET_RETRY_COUNTER_INS: u8 = 0x2C;

/// The next bytes are the verification data (and perhaps the new secret).
const MODE_VERIFICATION_DATA: u8 = 0x00;

/// CHANGE REFERENCE DATA: only the new secret follows.
const MODE_NEW_SECRET_ONLY: u8 = 0x01;

/// RESET RETRY COUNTER: only the PUK follows, the PIN stays.
const MODE_VERIFICATION_DATA_ONLY: u8 = 0x01;


impl HealthCardCommand {
    /// VERIFY the given PIN.
    pub fn verify_pin(password: PasswordReference, df_specific: bool, pin: &EncryptedPinFormat2) -> Self {
        Self {
            expected_status: status::VERIFY_SECRET,
            cla: 0x00,
            ins: VERIFY_INS,
            p1: MODE_VERIFICATION_DATA,
            p2: password.calculate_key_reference(df_specific),
            data: Some(pin.as_bytes().to_vec()),
            ne: None,
        }
    }

    /// GET PIN STATUS, reporting the retry counter or transport state of a password.
    pub fn get_pin_status(password: PasswordReference, df_specific: bool) -> Self {
        Self {
            expected_status: status::PIN_STATUS,
            cla: 0x80,
            ins: VERIFY_INS,
            p1: 0x00,
            p2: password.calculate_key_reference(df_specific),
            data: None,
            ne: None,
        }
    }

    /// CHANGE REFERENCE DATA.
    ///
    /// Without `old_secret`, only the new secret is transmitted; the card decides whether that is
    /// acceptable (e.g. for transport PINs).
    pub fn change_reference_data(
        password: PasswordReference,
        df_specific: bool,
        old_secret: Option<&EncryptedPinFormat2>,
        new_secret: &EncryptedPinFormat2,
    ) -> Self {
        let mut data = Vec::with_capacity(16);
        let p1 = match old_secret {
            Some(old) => {
                data.extend(old.as_bytes());
                MODE_VERIFICATION_DATA
            },
            None => MODE_NEW_SECRET_ONLY,
        };
        data.extend(new_secret.as_bytes());

        Self {
            expected_status: status::CHANGE_REFERENCE_DATA,
            cla: 0x00,
            ins: CHANGE_REFERENCE_DATA_INS,
            p1,
            p2: password.calculate_key_reference(df_specific),
            data: Some(data),
            ne: None,
        }
    }

    /// RESET RETRY COUNTER using the PUK, optionally setting a new PIN at the same time.
    pub fn unlock_egk(
        password: PasswordReference,
        df_specific: bool,
        puk: &EncryptedPinFormat2,
        new_secret: Option<&EncryptedPinFormat2>,
    ) -> Self {
        let mut data = Vec::with_capacity(16);
        data.extend(puk.as_bytes());
        let p1 = match new_secret {
            Some(new) => {
                data.extend(new.as_bytes());
                MODE_VERIFICATION_DATA
            },
            None => MODE_VERIFICATION_DATA_ONLY,
        };

        Self {
            expected_status: status::UNLOCK_EGK,
            cla: 0x00,
            ins: RESET_RETRY_COUNTER_INS,
            p1,
            p2: password.calculate_key_reference(df_specific),
            data: Some(data),
            ne: None,
        }
    }
}
