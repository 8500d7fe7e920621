//! Utility functions for BER-TLV and Distinguished Encoding Rules.


/// A borrowed tag-length-value structure.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BorrowedTlv<'d> {
    /// The encoded tag and length, exactly as they appeared in the input.
    pub tag_and_length: &'d [u8],

    /// The encoded tag.
    pub tag: &'d [u8],

    /// The value.
    pub data: &'d [u8],
}
impl<'d> BorrowedTlv<'d> {
    /// The first byte of the tag.
    pub fn first_tag_byte(&self) -> u8 {
        self.tag[0]
    }

    /// Whether the tag is a single byte equal to `tag`.
    pub fn has_tag(&self, tag: u8) -> bool {
        self.tag.len() == 1 && self.tag[0] == tag
    }

    /// The whole TLV as it was encoded.
    pub fn encoded(&self) -> Vec<u8> {
        let mut ret = Vec::with_capacity(self.tag_and_length.len() + self.data.len());
        ret.extend(self.tag_and_length);
        ret.extend(self.data);
        ret
    }
}


/// Encode an ASN.1 DER primitive value length.
pub fn encode_primitive_length(output: &mut Vec<u8>, length: usize) {
    if length < 128 {
        // single-byte encoding
        output.push(length as u8);
    } else {
        // 0b1nnn_nnnn and then n additional bytes that actually specify the length
        // (big-endian)
        let length_bytes = length.to_be_bytes();
        let mut trimmed_length_slice = &length_bytes[..];
        while trimmed_length_slice[0] == 0x00 {
            trimmed_length_slice = &trimmed_length_slice[1..];
        }
        output.push(0b1000_0000 | (trimmed_length_slice.len() as u8));
        output.extend(trimmed_length_slice);
    }
}


/// Decode an ASN.1 DER primitive value length.
///
/// The length must be at the beginning of the input slice.
///
/// Returns a tuple `(length, rest)` where `rest` is the rest of the input slice once the length has
/// been removed.
pub fn try_decode_primitive_length(input: &[u8]) -> Option<(usize, &[u8])> {
    if input.len() == 0 {
        return None;
    }
    let start_byte = input[0];
    let start_lower_bits = start_byte & 0b0111_1111;
    if start_byte & 0b1000_0000 != 0 {
        // multiple bytes
        let length_byte_count: usize = start_lower_bits.into();
        if length_byte_count == 0 {
            // indefinite length is not valid in DER
            return None;
        }
        if length_byte_count > input.len() - 1 {
            // that will never fit
            return None;
        }
        let mut length: usize = 0;
        for length_byte in &input[1..1+length_byte_count] {
            length = length.checked_mul(256)?;
            length = length.checked_add(usize::from(*length_byte))?;
        }
        Some((length, &input[1+length_byte_count..]))
    } else {
        let length = start_lower_bits.into();
        Some((length, &input[1..]))
    }
}


/// Append a TLV with the given tag bytes and value to `output`.
pub fn encode_tlv(output: &mut Vec<u8>, tag: &[u8], value: &[u8]) {
    output.extend(tag);
    encode_primitive_length(output, value.len());
    output.extend(value);
}


/// Take one TLV off the front of the input.
///
/// Returns the TLV and the rest of the input, or `None` if the input is truncated or malformed.
pub fn take_tlv(input: &[u8]) -> Option<(BorrowedTlv<'_>, &[u8])> {
    if input.len() < 2 {
        return None;
    }

    // tag: one byte, or more if the lower five bits are all set
    let mut tag_length = 1;
    if input[0] & 0b0001_1111 == 0b0001_1111 {
        loop {
            let tag_byte = *input.get(tag_length)?;
            tag_length += 1;
            if tag_byte & 0b1000_0000 == 0 {
                break;
            }
        }
    }

    let (value_length, rest) = try_decode_primitive_length(input.get(tag_length..)?)?;
    if value_length > rest.len() {
        return None;
    }
    let header_length = input.len() - rest.len();

    let tlv = BorrowedTlv {
        tag_and_length: &input[..header_length],
        tag: &input[..tag_length],
        data: &rest[..value_length],
    };
    Some((tlv, &rest[value_length..]))
}


/// Split the input into consecutive TLVs.
///
/// Returns `None` if any TLV is malformed or the input contains trailing garbage.
pub fn parse_tlvs(mut input: &[u8]) -> Option<Vec<BorrowedTlv<'_>>> {
    let mut ret = Vec::new();
    while input.len() > 0 {
        let (tlv, rest) = take_tlv(input)?;
        ret.push(tlv);
        input = rest;
    }
    Some(ret)
}
