//! Channels carrying command APDUs to a card, with or without Secure Messaging.


use tracing::{debug, trace};

use crate::card::PaceKey;
use crate::crypt::cipher_mac::BLOCK_SIZE;
use crate::iso7816::apdu::{CommandApdu, ResponseApdu};
use crate::iso7816::card::{CommunicationError, Transport};
use crate::pace;
use crate::secure_messaging::{self, SecureMessaging};


/// The most bytes Secure Messaging adds to a command APDU.
///
/// Padding and indicator (17), the tag and length of DO87 (4), DO97 (4), DO8E (10) and the
/// longer length fields of an extended APDU (5).
const SECURE_MESSAGING_OVERHEAD: usize = BLOCK_SIZE + 1 + 4 + 4 + 10 + 5;


/// A channel to a card over which command APDUs can be sent.
pub trait CardChannel {
    /// Sends a command APDU and returns the card's response.
    fn transmit(&mut self, command: &CommandApdu) -> Result<ResponseApdu, CommunicationError>;

    /// The maximum length of a command APDU passed to [`CardChannel::transmit`].
    fn max_transceive_length(&self) -> usize;

    fn is_extended_length_supported(&self) -> bool;
}
impl<C: CardChannel + ?Sized> CardChannel for &mut C {
    fn transmit(&mut self, command: &CommandApdu) -> Result<ResponseApdu, CommunicationError> {
        (**self).transmit(command)
    }

    fn max_transceive_length(&self) -> usize {
        (**self).max_transceive_length()
    }

    fn is_extended_length_supported(&self) -> bool {
        (**self).is_extended_length_supported()
    }
}


/// A channel passing APDUs to the transport unchanged.
pub struct PlainChannel<T: Transport> {
    transport: T,
}
impl<T: Transport> PlainChannel<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
impl<T: Transport> CardChannel for PlainChannel<T> {
    fn transmit(&mut self, command: &CommandApdu) -> Result<ResponseApdu, CommunicationError> {
        let response_bytes = self.transport.transceive(command.bytes())?;
        let response = ResponseApdu::from_vec(response_bytes)?;
        Ok(response)
    }

    fn max_transceive_length(&self) -> usize {
        self.transport.max_transceive_length()
    }

    fn is_extended_length_supported(&self) -> bool {
        self.transport.is_extended_length_supported()
    }
}


/// A channel protecting every APDU with Secure Messaging.
///
/// After the first failure of a transmission, the send sequence counters of card and terminal may
/// have diverged; the channel then refuses to transmit anything else.
pub struct SecureChannel<T: Transport> {
    plain: PlainChannel<T>,
    secure_messaging: SecureMessaging,
    poisoned: bool,
}
impl<T: Transport> SecureChannel<T> {
    /// Performs PACE with the given CAN and wraps the transport in the resulting secure channel.
    pub fn establish(transport: T, can: &str) -> Result<Self, CommunicationError> {
        let mut plain = PlainChannel::new(transport);
        let key = pace::establish(&mut plain, can)?;
        debug!("PACE established");
        Ok(Self::from_key(plain, &key))
    }

    /// Starts Secure Messaging over a channel with keys negotiated earlier.
    pub fn from_key(plain: PlainChannel<T>, key: &PaceKey) -> Self {
        Self {
            plain,
            secure_messaging: SecureMessaging::new(key),
            poisoned: false,
        }
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn transport(&self) -> &T {
        self.plain.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.plain.transport_mut()
    }

    fn transmit_protected(&mut self, command: &CommandApdu) -> Result<ResponseApdu, CommunicationError> {
        let protected_command = self.secure_messaging.encrypt(command)?;
        trace!("protected command has {} bytes", protected_command.bytes().len());
        let protected_response = self.plain.transmit(&protected_command)?;
        let response = self.secure_messaging.decrypt(&protected_response)?;
        Ok(response)
    }
}
impl<T: Transport> CardChannel for SecureChannel<T> {
    fn transmit(&mut self, command: &CommandApdu) -> Result<ResponseApdu, CommunicationError> {
        if self.poisoned {
            return Err(secure_messaging::Error::ChannelPoisoned.into());
        }
        let result = self.transmit_protected(command);
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn max_transceive_length(&self) -> usize {
        self.plain.max_transceive_length()
            .saturating_sub(SECURE_MESSAGING_OVERHEAD)
    }

    fn is_extended_length_supported(&self) -> bool {
        self.plain.is_extended_length_supported()
    }
}
