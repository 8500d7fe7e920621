//! SELECT (gemSpec_COS § 14.2.6).


use crate::command::{status, ExpectedLength, HealthCardCommand};
use crate::identifier::{ApplicationIdentifier, FileIdentifier};


const CLA: u8 = 0x00;
const INS: u8 = 0xA4;

const SELECTION_MODE_DF_BY_FID: u8 = 0x01;
const SELECTION_MODE_EF_BY_FID: u8 = 0x02;
const SELECTION_MODE_PARENT: u8 = 0x03;
const SELECTION_MODE_AID: u8 = 0x04;

const RESPONSE_TYPE_FCP: u8 = 0x04;
const RESPONSE_TYPE_NO_RESPONSE: u8 = 0x0C;
const FILE_OCCURRENCE_NEXT: u8 = 0x02;


fn p2(request_fcp: bool, next_occurrence: bool) -> u8 {
    let response_type = if request_fcp { RESPONSE_TYPE_FCP } else { RESPONSE_TYPE_NO_RESPONSE };
    if next_occurrence {
        response_type | FILE_OCCURRENCE_NEXT
    } else {
        response_type
    }
}


impl HealthCardCommand {
    /// Selects the root of the object system, or the parent of the current DF.
    ///
    /// With `read_first`, the file control parameters are requested as well.
    pub fn select_root_or_parent(select_parent_else_root: bool, read_first: bool) -> Self {
        Self {
            expected_status: status::SELECT,
            cla: CLA,
            ins: INS,
            p1: if select_parent_else_root { SELECTION_MODE_PARENT } else { SELECTION_MODE_AID },
            p2: p2(read_first, false),
            data: None,
            ne: if read_first { Some(ExpectedLength::All) } else { None },
        }
    }

    /// Selects a DF by its application identifier.
    ///
    /// `fcp` requests the file control parameters with the given expected length.
    pub fn select_aid(aid: &ApplicationIdentifier, select_next_else_first: bool, fcp: Option<ExpectedLength>) -> Self {
        Self {
            expected_status: status::SELECT,
            cla: CLA,
            ins: INS,
            p1: SELECTION_MODE_AID,
            p2: p2(fcp.is_some(), select_next_else_first),
            data: Some(aid.as_bytes().to_vec()),
            ne: fcp,
        }
    }

    /// Selects a DF or an EF below the current DF by its file identifier.
    pub fn select_fid(fid: FileIdentifier, select_df_else_ef: bool, fcp: Option<ExpectedLength>) -> Self {
        Self {
            expected_status: status::SELECT,
            cla: CLA,
            ins: INS,
            p1: if select_df_else_ef { SELECTION_MODE_DF_BY_FID } else { SELECTION_MODE_EF_BY_FID },
            p2: p2(fcp.is_some(), false),
            data: Some(fid.to_bytes().to_vec()),
            ne: fcp,
        }
    }
}
