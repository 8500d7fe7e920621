//! Retrieval of the card holder's authentication certificate.


use std::fmt;

use tracing::debug;

use crate::card::file_system::{df, mf};
use crate::channel::CardChannel;
use crate::command::{ExpectedLength, HealthCardCommand, ResponseStatus};
use crate::command::read::OffsetError;
use crate::iso7816::apdu::EXPECTED_LENGTH_WILDCARD_EXTENDED;
use crate::iso7816::card::CommunicationError;


#[derive(Debug)]
pub enum Error {
    Communication(CommunicationError),
    Read { status: ResponseStatus },
    Offset(OffsetError),
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Communication(e)
                => write!(f, "communication error: {}", e),
            Self::Read { status }
                => write!(f, "failed to read certificate: {}", status),
            Self::Offset(e)
                => write!(f, "certificate is too long: {}", e),
        }
    }
}
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Communication(e) => Some(e),
            Self::Read { .. } => None,
            Self::Offset(e) => Some(e),
        }
    }
}
impl From<CommunicationError> for Error {
    fn from(value: CommunicationError) -> Self { Self::Communication(value) }
}
impl From<OffsetError> for Error {
    fn from(value: OffsetError) -> Self { Self::Offset(value) }
}


/// Reads the X.509 certificate C.CH.AUT.E256 from DF.ESIGN.
///
/// The file is read in as many chunks as the channel requires until the card reports the end of
/// the file.
pub fn retrieve_certificate<C: CardChannel + ?Sized>(channel: &mut C) -> Result<Vec<u8>, Error> {
    HealthCardCommand::select_aid(&df::ESIGN, false, None)
        .execute_successful_on(channel)?;
    HealthCardCommand::select_fid(
        mf::esign::C_CH_AUT_E256.fid,
        false,
        Some(ExpectedLength::Exact(EXPECTED_LENGTH_WILDCARD_EXTENDED)),
    )
        .execute_successful_on(channel)?;

    let mut certificate = Vec::new();
    loop {
        let response = HealthCardCommand::read_at(certificate.len(), ExpectedLength::All)?
            .execute_on(channel)?;
        let data = response.apdu.data();
        certificate.extend_from_slice(data);
        debug!("read {} bytes of certificate, status {}", data.len(), response.status);

        match response.status {
            ResponseStatus::Success => {
                if data.is_empty() {
                    // no progress
                    break;
                }
            },
            ResponseStatus::EndOfFileWarning|ResponseStatus::OffsetTooBig => break,
            other => return Err(Error::Read { status: other }),
        }
    }
    Ok(certificate)
}
