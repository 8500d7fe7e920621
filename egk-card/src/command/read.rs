//! READ BINARY (gemSpec_COS § 14.3.2).


use std::fmt;

use crate::command::{status, ExpectedLength, HealthCardCommand};
use crate::identifier::ShortFileIdentifier;


const CLA: u8 = 0x00;
const INS: u8 = 0xB0;

/// Highest offset that fits into P1 and P2 without the SFID marker bit.
pub const MAX_OFFSET: u16 = 0x7FFF;

const SFID_MARKER: u8 = 0x80;


#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OffsetError {
    pub offset: usize,
}
impl fmt::Display for OffsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "read offset {} exceeds maximum {}", self.offset, MAX_OFFSET)
    }
}
impl std::error::Error for OffsetError {
}


impl HealthCardCommand {
    /// Reads the whole currently selected EF.
    pub fn read() -> Self {
        Self::read_offset(0, ExpectedLength::All)
    }

    /// Reads the currently selected EF from the given offset on.
    pub fn read_at(offset: usize, ne: ExpectedLength) -> Result<Self, OffsetError> {
        if offset > usize::from(MAX_OFFSET) {
            return Err(OffsetError { offset });
        }
        Ok(Self::read_offset(offset as u16, ne))
    }

    fn read_offset(offset: u16, ne: ExpectedLength) -> Self {
        let [p1, p2] = offset.to_be_bytes();
        Self {
            expected_status: status::READ,
            cla: CLA,
            ins: INS,
            p1,
            p2,
            data: None,
            ne: Some(ne),
        }
    }

    /// Selects the EF with the given short file identifier and reads it from the given offset on.
    pub fn read_sfid(sfid: ShortFileIdentifier, offset: u8, ne: ExpectedLength) -> Self {
        Self {
            expected_status: status::READ,
            cla: CLA,
            ins: INS,
            p1: SFID_MARKER | sfid.value(),
            p2: offset,
            data: None,
            ne: Some(ne),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::file_system::ef;

    #[test]
    fn test_read_offset() {
        let command = HealthCardCommand::read_at(0x1234, ExpectedLength::Exact(0xE0)).unwrap();
        assert_eq!([command.cla, command.ins, command.p1, command.p2], [0x00, 0xB0, 0x12, 0x34]);
        assert_eq!(command.ne, Some(ExpectedLength::Exact(0xE0)));

        assert!(HealthCardCommand::read_at(0x7FFF, ExpectedLength::All).is_ok());
        assert_eq!(
            HealthCardCommand::read_at(0x8000, ExpectedLength::All),
            Err(OffsetError { offset: 0x8000 }),
        );
    }

    #[test]
    fn test_read_sfid() {
        let command = HealthCardCommand::read_sfid(ef::VERSION2.sfid, 0, ExpectedLength::All);
        assert_eq!([command.p1, command.p2], [0x91, 0x00]);
        assert_eq!(command.data, None);
    }
}
