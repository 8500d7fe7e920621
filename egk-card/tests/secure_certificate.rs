use egk_card::card::PaceKey;
use egk_card::certificate::retrieve_certificate;
use egk_card::channel::{CardChannel, PlainChannel, SecureChannel};
use egk_card::crypt::cipher_mac::{
    decrypt_padded_data, encrypt_block, encrypt_padded_data, mac_data, padded, unpad,
    verify_mac_data,
};
use egk_card::der_util::{encode_tlv, parse_tlvs};
use egk_card::iso7816::card::{CommunicationError, Transport};
use egk_card::secure_messaging;
use hex_literal::hex;


const K_SESSION_ENC: [u8; 16] = hex!("F5F0E35C0D7161EE6724EE513A0D9A7F");
const K_SESSION_MAC: [u8; 16] = hex!("FE251C7858B356B24514B3BD5F4297D1");


/// A fake eGK behind a secure channel, serving C.CH.AUT.E256 in chunks of at most 0xE0 bytes.
///
/// Unprotected or wrongly protected commands are answered with a plain 0x69 0x88.
struct SecureCertificateCard {
    send_sequence_counter: u128,
    certificate: Vec<u8>,
    commands: Vec<Vec<u8>>,
    esign_selected: bool,
    certificate_selected: bool,
}
impl SecureCertificateCard {
    const CHUNK_LENGTH: usize = 0xE0;

    fn new(certificate: Vec<u8>) -> Self {
        Self {
            send_sequence_counter: 0,
            certificate,
            commands: Vec::new(),
            esign_selected: false,
            certificate_selected: false,
        }
    }

    fn ssc(&self) -> [u8; 16] {
        self.send_sequence_counter.to_be_bytes()
    }

    /// Verifies and decrypts a protected command; returns the plain header and data.
    fn unwrap(&mut self, command: &[u8]) -> Option<([u8; 4], Vec<u8>)> {
        self.send_sequence_counter += 1;

        let header: [u8; 4] = command.get(0..4)?.try_into().ok()?;
        if header[0] & 0x0C != 0x0C {
            return None;
        }
        let (body, _le) = match command.get(4)? {
            0x00 => {
                let length = usize::from(u16::from_be_bytes([command[5], command[6]]));
                (command.get(7..7+length)?, &command[7+length..])
            },
            short_length => {
                let length = usize::from(*short_length);
                (command.get(5..5+length)?, &command[5+length..])
            },
        };
        let fields = parse_tlvs(body)?;
        let (mac, authenticated) = fields.split_last()?;
        if !mac.has_tag(0x8E) {
            return None;
        }
        let authenticated_bytes: Vec<u8> = authenticated.iter()
            .flat_map(|field| field.encoded())
            .collect();
        let ssc = self.ssc();
        let padded_header = padded(&header);
        let padded_body = padded(&authenticated_bytes);
        let mut pieces: Vec<&[u8]> = vec![&ssc[..], &padded_header[..]];
        if !authenticated_bytes.is_empty() {
            pieces.push(&padded_body[..]);
        }
        if !verify_mac_data(&pieces, &K_SESSION_MAC, mac.data) {
            return None;
        }

        let mut data = Vec::new();
        for field in authenticated {
            if field.has_tag(0x87) {
                let iv = encrypt_block(&ssc, &K_SESSION_ENC);
                let mut decrypted = field.data[1..].to_vec();
                decrypt_padded_data(&mut decrypted, &K_SESSION_ENC, &iv).ok()?;
                data = unpad(&decrypted)?.to_vec();
            }
        }
        Some(([header[0] & !0x0C, header[1], header[2], header[3]], data))
    }

    fn wrap(&mut self, data: &[u8], sw: [u8; 2]) -> Vec<u8> {
        self.send_sequence_counter += 1;
        let ssc = self.ssc();

        let mut body = Vec::new();
        if !data.is_empty() {
            let iv = encrypt_block(&ssc, &K_SESSION_ENC);
            let mut encrypted = padded(data).to_vec();
            encrypt_padded_data(&mut encrypted, &K_SESSION_ENC, &iv).unwrap();
            let mut value = vec![0x01];
            value.extend(encrypted);
            encode_tlv(&mut body, &[0x87], &value);
        }
        encode_tlv(&mut body, &[0x99], &sw);
        let padded_body = padded(&body);
        let mac = mac_data(&[&ssc[..], &padded_body[..]], &K_SESSION_MAC);
        encode_tlv(&mut body, &[0x8E], &mac);
        body.extend(hex!("90 00"));
        body
    }

    fn process(&mut self, header: [u8; 4], data: &[u8]) -> (Vec<u8>, [u8; 2]) {
        match header {
            [0x00, 0xA4, 0x04, 0x0C] if data == hex!("A000000167455349474E") => {
                self.esign_selected = true;
                (Vec::new(), hex!("9000"))
            },
            [0x00, 0xA4, 0x02, 0x04] if self.esign_selected && data == hex!("C504") => {
                self.certificate_selected = true;
                (hex!("62 03 80 01 00").to_vec(), hex!("9000"))
            },
            [0x00, 0xB0, p1, p2] if self.certificate_selected => {
                let offset = usize::from(u16::from_be_bytes([p1, p2]));
                if offset >= self.certificate.len() {
                    return (Vec::new(), hex!("6B00"));
                }
                let end = (offset + Self::CHUNK_LENGTH).min(self.certificate.len());
                let chunk = self.certificate[offset..end].to_vec();
                if end == self.certificate.len() {
                    (chunk, hex!("6282"))
                } else {
                    (chunk, hex!("9000"))
                }
            },
            _ => (Vec::new(), hex!("6A82")),
        }
    }
}
impl Transport for SecureCertificateCard {
    fn transceive(&mut self, command: &[u8]) -> Result<Vec<u8>, CommunicationError> {
        self.commands.push(command.to_vec());
        let Some((header, data)) = self.unwrap(command) else {
            return Ok(hex!("69 88").to_vec());
        };
        let (response_data, sw) = self.process(header, &data);
        Ok(self.wrap(&response_data, sw))
    }

    fn max_transceive_length(&self) -> usize { 65544 }
    fn is_extended_length_supported(&self) -> bool { true }
}


fn certificate() -> Vec<u8> {
    // a DER SEQUENCE header followed by filler
    let mut certificate = hex!("30 82 02 FC").to_vec();
    certificate.extend((0..0x2FCu16).map(|i| (i % 251) as u8));
    certificate
}


#[test]
fn test_retrieve_certificate() {
    let key = PaceKey::new(K_SESSION_ENC, K_SESSION_MAC);
    let card = SecureCertificateCard::new(certificate());
    let mut channel = SecureChannel::from_key(PlainChannel::new(card), &key);

    let retrieved = retrieve_certificate(&mut channel)
        .expect("failed to retrieve certificate");
    assert_eq!(retrieved, certificate());
    assert!(!channel.is_poisoned());

    // SELECT AID, SELECT FID, and ceil(0x300 / 0xE0) = 4 reads
    let commands = &channel.transport().commands;
    assert_eq!(commands.len(), 6);
    for command in commands {
        assert_eq!(command[0], 0x0C);
    }
    // SELECT AID has neither Le nor extended data; the other commands are extended
    assert_ne!(commands[0][4], 0x00);
    for command in &commands[1..] {
        assert_eq!(command[4], 0x00);
    }
}


#[test]
fn test_card_rejects_tampered_channel() {
    let wrong_key = PaceKey::new(K_SESSION_MAC, K_SESSION_ENC);
    let card = SecureCertificateCard::new(certificate());
    let mut channel = SecureChannel::from_key(PlainChannel::new(card), &wrong_key);

    // the card answers with a plain error, which is not acceptable within secure messaging
    match retrieve_certificate(&mut channel) {
        Err(egk_card::certificate::Error::Communication(CommunicationError::SecureMessaging(e))) => {
            assert!(matches!(e, secure_messaging::Error::UnprotectedResponse { sw: 0x6988 }));
        },
        other => panic!("unexpected result {:?}", other),
    }
    assert!(channel.is_poisoned());
    assert!(channel.max_transceive_length() < 65544);
}
