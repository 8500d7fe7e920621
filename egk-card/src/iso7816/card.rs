use std::fmt;

use tracing::trace;

use crate::command::ResponseException;
use crate::iso7816::apdu::ApduError;
use crate::pace;
use crate::secure_messaging;


/// Maximum length of a short-form command APDU (header, Lc, 255 data bytes, Le).
pub const MAX_SHORT_COMMAND_LENGTH: usize = 4 + 1 + 255 + 1;

/// Maximum length of an extended-form command APDU (header, 3-byte Lc, 65535 data bytes, 2-byte Le).
pub const MAX_EXTENDED_COMMAND_LENGTH: usize = 4 + 3 + 65535 + 2;


#[derive(Debug)]
pub enum CommunicationError {
    Apdu(ApduError),
    Pcsc(pcsc::Error),
    CommandTooLong { length: usize, maximum: usize },
    Response(ResponseException),
    SecureMessaging(secure_messaging::Error),
    Pace(pace::Error),
    Transport(String),
}
impl fmt::Display for CommunicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apdu(e) => write!(f, "APDU error: {}", e),
            Self::Pcsc(e) => write!(f, "PCSC error: {}", e),
            Self::CommandTooLong { length, maximum }
                => write!(f, "command APDU has {} bytes, the channel transmits at most {}", length, maximum),
            Self::Response(e) => write!(f, "{}", e),
            Self::SecureMessaging(e) => write!(f, "Secure Messaging error: {}", e),
            Self::Pace(e) => write!(f, "PACE error: {}", e),
            Self::Transport(message) => write!(f, "transport error: {}", message),
        }
    }
}
impl std::error::Error for CommunicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Apdu(e) => Some(e),
            Self::Pcsc(e) => Some(e),
            Self::CommandTooLong { .. } => None,
            Self::Response(e) => Some(e),
            Self::SecureMessaging(e) => Some(e),
            Self::Pace(e) => Some(e),
            Self::Transport(_) => None,
        }
    }
}
impl From<ApduError> for CommunicationError {
    fn from(value: ApduError) -> Self { Self::Apdu(value) }
}
impl From<pcsc::Error> for CommunicationError {
    fn from(value: pcsc::Error) -> Self { Self::Pcsc(value) }
}
impl From<ResponseException> for CommunicationError {
    fn from(value: ResponseException) -> Self { Self::Response(value) }
}
impl From<secure_messaging::Error> for CommunicationError {
    fn from(value: secure_messaging::Error) -> Self { Self::SecureMessaging(value) }
}
impl From<pace::Error> for CommunicationError {
    fn from(value: pace::Error) -> Self { Self::Pace(value) }
}


/// Moves raw bytes to and from a card.
///
/// Implementations do not interpret the bytes. Timeouts are the implementation's business.
pub trait Transport {
    /// Send a raw command APDU and receive the raw response APDU.
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>, CommunicationError>;

    /// The maximum number of bytes a single command may have.
    fn max_transceive_length(&self) -> usize;

    fn is_extended_length_supported(&self) -> bool;
}
impl<T: Transport + ?Sized> Transport for &mut T {
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>, CommunicationError> {
        (**self).transceive(command)
    }

    fn max_transceive_length(&self) -> usize {
        (**self).max_transceive_length()
    }

    fn is_extended_length_supported(&self) -> bool {
        (**self).is_extended_length_supported()
    }
}


/// A card connected through PC/SC.
pub struct PcscTransport {
    card: pcsc::Card,
    extended_length: bool,
}
impl PcscTransport {
    /// Wraps a connected card.
    ///
    /// `extended_length` declares whether the reader and the card both handle extended length
    /// APDUs; PC/SC offers no reliable way to find out.
    pub fn new(card: pcsc::Card, extended_length: bool) -> Self {
        Self {
            card,
            extended_length,
        }
    }

    pub fn into_inner(self) -> pcsc::Card {
        self.card
    }
}
impl Transport for PcscTransport {
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>, CommunicationError> {
        trace!("sending to card: {}", hex::encode_upper(command));
        let buffer_size = if self.extended_length {
            pcsc::MAX_BUFFER_SIZE_EXTENDED
        } else {
            pcsc::MAX_BUFFER_SIZE
        };
        let mut in_buf = vec![0u8; buffer_size];
        let in_slice = self.card.transmit(command, &mut in_buf)?;
        trace!("received from card: {}", hex::encode_upper(in_slice));
        Ok(in_slice.to_vec())
    }

    fn max_transceive_length(&self) -> usize {
        if self.extended_length {
            MAX_EXTENDED_COMMAND_LENGTH
        } else {
            MAX_SHORT_COMMAND_LENGTH
        }
    }

    fn is_extended_length_supported(&self) -> bool {
        self.extended_length
    }
}
