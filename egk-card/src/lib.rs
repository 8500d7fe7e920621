//! Contactless communication with the German electronic health card (eGK).
//!
//! Commands are described by [`command::HealthCardCommand`] and sent over a
//! [`channel::CardChannel`]. A [`channel::SecureChannel`] is obtained by running PACE with the
//! card access number printed on the card; it protects every command with Secure Messaging.


pub mod card;
pub mod certificate;
pub mod channel;
pub mod command;
pub mod crypt;
pub mod der_util;
pub mod identifier;
pub mod iso7816;
pub mod pace;
pub mod secure_messaging;
