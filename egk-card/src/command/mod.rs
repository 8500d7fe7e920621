//! Commands of the eGK operating system and their expected responses.
//!
//! A [`HealthCardCommand`] is a description of a command independent of the channel it is sent
//! over; it only turns into a [`CommandApdu`] once the channel's length capabilities are known.


pub mod egk;
pub mod pin;
pub mod read;
pub mod security;
pub mod select;
pub mod status;


use std::fmt;

use tracing::debug;

use crate::channel::CardChannel;
use crate::iso7816::apdu::{
    CommandApdu, CommandHeader, ResponseApdu, EXPECTED_LENGTH_WILDCARD_EXTENDED,
    EXPECTED_LENGTH_WILDCARD_SHORT,
};
use crate::iso7816::card::CommunicationError;
pub use crate::command::status::ResponseStatus;


/// How many bytes of response data a command expects.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ExpectedLength {
    /// Exactly this many bytes (1 to 65536).
    Exact(usize),

    /// As many as the channel can carry in one response.
    All,
}
impl ExpectedLength {
    /// The value of Ne for a channel with or without extended length support.
    pub fn resolve(&self, extended_length_supported: bool) -> usize {
        match self {
            Self::Exact(ne) => *ne,
            Self::All => if extended_length_supported {
                EXPECTED_LENGTH_WILDCARD_EXTENDED
            } else {
                EXPECTED_LENGTH_WILDCARD_SHORT
            },
        }
    }
}


/// The card answered with a status other than [`ResponseStatus::Success`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ResponseException {
    pub status: ResponseStatus,
}
impl fmt::Display for ResponseException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card responded with status {}", self.status)
    }
}
impl std::error::Error for ResponseException {
}


/// A response together with the meaning of its status word.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct HealthCardResponse {
    pub status: ResponseStatus,
    pub apdu: ResponseApdu,
}
impl HealthCardResponse {
    /// Fails with a [`ResponseException`] unless the status is [`ResponseStatus::Success`].
    pub fn require_success(self) -> Result<Self, ResponseException> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ResponseException { status: self.status })
        }
    }
}


/// A command to be sent to a health card.
///
/// The command data may contain PIN blocks, so the `Debug` output only shows its length.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct HealthCardCommand {
    /// Maps status words of the response to their meaning for this command.
    pub expected_status: &'static [(u16, ResponseStatus)],
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
    pub data: Option<Vec<u8>>,
    pub ne: Option<ExpectedLength>,
}
impl fmt::Debug for HealthCardCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthCardCommand")
            .field("cla", &self.cla)
            .field("ins", &self.ins)
            .field("p1", &self.p1)
            .field("p2", &self.p2)
            .field("data_length", &self.data.as_ref().map(|d| d.len()))
            .field("ne", &self.ne)
            .finish()
    }
}
impl HealthCardCommand {
    pub fn header(&self) -> CommandHeader {
        CommandHeader::new(self.cla, self.ins, self.p1, self.p2)
    }

    /// Encodes the command for the given channel.
    ///
    /// Fails if the encoded APDU exceeds what the channel can transmit.
    pub fn to_apdu<C: CardChannel + ?Sized>(&self, channel: &C) -> Result<CommandApdu, CommunicationError> {
        let ne = self.ne
            .map(|ne| ne.resolve(channel.is_extended_length_supported()));
        let apdu = CommandApdu::new(self.header(), self.data.as_deref(), ne)?;

        let length = apdu.bytes().len();
        let maximum = channel.max_transceive_length();
        if length > maximum {
            return Err(CommunicationError::CommandTooLong { length, maximum });
        }
        Ok(apdu)
    }

    /// Sends the command and interprets the status word of the response.
    pub fn execute_on<C: CardChannel + ?Sized>(&self, channel: &mut C) -> Result<HealthCardResponse, CommunicationError> {
        let apdu = self.to_apdu(channel)?;
        let response = channel.transmit(&apdu)?;
        let status = ResponseStatus::from_table(self.expected_status, response.sw());
        debug!("{:?} -> 0x{:04X} ({})", self.header(), response.sw(), status);
        Ok(HealthCardResponse {
            status,
            apdu: response,
        })
    }

    /// Sends the command and fails unless the card reports success.
    pub fn execute_successful_on<C: CardChannel + ?Sized>(&self, channel: &mut C) -> Result<HealthCardResponse, CommunicationError> {
        let response = self.execute_on(channel)?
            .require_success()?;
        Ok(response)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::PlainChannel;
    use crate::iso7816::card::Transport;
    use hex_literal::hex;

    struct FixedTransport {
        extended_length: bool,
        sent: Vec<Vec<u8>>,
        response: Vec<u8>,
    }
    impl Transport for FixedTransport {
        fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>, CommunicationError> {
            self.sent.push(command.to_vec());
            Ok(self.response.clone())
        }

        fn max_transceive_length(&self) -> usize {
            if self.extended_length { 65544 } else { 261 }
        }

        fn is_extended_length_supported(&self) -> bool {
            self.extended_length
        }
    }

    fn read_all() -> HealthCardCommand {
        HealthCardCommand {
            expected_status: status::READ,
            cla: 0x00,
            ins: 0xB0,
            p1: 0x00,
            p2: 0x00,
            data: None,
            ne: Some(ExpectedLength::All),
        }
    }

    #[test]
    fn test_expect_all() {
        let mut channel = PlainChannel::new(FixedTransport {
            extended_length: false,
            sent: Vec::new(),
            response: hex!("0102 9000").to_vec(),
        });
        let response = read_all().execute_on(&mut channel).unwrap();
        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.apdu.data(), &hex!("0102"));

        let mut extended_channel = PlainChannel::new(FixedTransport {
            extended_length: true,
            sent: Vec::new(),
            response: hex!("9000").to_vec(),
        });
        read_all().execute_on(&mut extended_channel).unwrap();

        assert_eq!(channel.transport().sent, vec![hex!("00B00000 00").to_vec()]);
        assert_eq!(extended_channel.transport().sent, vec![hex!("00B00000 000000").to_vec()]);
    }

    #[test]
    fn test_unsuccessful() {
        let mut channel = PlainChannel::new(FixedTransport {
            extended_length: false,
            sent: Vec::new(),
            response: hex!("6A82").to_vec(),
        });
        let response = read_all().execute_on(&mut channel).unwrap();
        assert_eq!(response.status, ResponseStatus::FileNotFound);

        match read_all().execute_successful_on(&mut channel) {
            Err(CommunicationError::Response(ResponseException { status })) => assert_eq!(status, ResponseStatus::FileNotFound),
            other => panic!("unexpected result {:?}", other),
        }

        // not in the table
        channel.transport_mut().response = hex!("6F00").to_vec();
        let response = read_all().execute_on(&mut channel).unwrap();
        assert_eq!(response.status, ResponseStatus::UnknownStatus);
    }

    #[test]
    fn test_too_long() {
        let mut channel = PlainChannel::new(FixedTransport {
            extended_length: false,
            sent: Vec::new(),
            response: hex!("9000").to_vec(),
        });
        let mut command = read_all();
        command.data = Some(vec![0x00; 256]);
        match command.execute_on(&mut channel) {
            Err(CommunicationError::CommandTooLong { length, maximum }) => {
                assert_eq!(length, 4 + 3 + 256 + 2);
                assert_eq!(maximum, 261);
            },
            other => panic!("unexpected result {:?}", other),
        }
        assert!(channel.transport().sent.is_empty());
    }

    #[test]
    fn test_debug_hides_data() {
        let mut command = read_all();
        command.data = Some(hex!("26 12 34 56 FF FF FF FF").to_vec());
        let debug = format!("{:?}", command);
        assert!(debug.contains("data_length: Some(8)"));
        assert!(!debug.contains("18"));
        assert!(!debug.contains("52"));
        assert!(!debug.contains("86"));
    }
}
