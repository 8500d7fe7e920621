//! Response status words and their meaning per command (gemSpec_COS).


use std::fmt;


/// The outcome of a command, as reported by the status word of the response.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ResponseStatus {
    Success,
    UnknownException,
    UnknownStatus,
    DataTruncated,
    CorruptDataWarning,
    EndOfFileWarning,
    EndOfRecordWarning,
    UnsuccessfulSearch,
    FileDeactivated,
    FileTerminated,
    RecordDeactivated,
    TransportStatusTransportPin,
    TransportStatusEmptyPin,
    PasswordDisabled,
    AuthenticationFailure,
    NoAuthentication,
    RetryCounter { count: u8 },
    UpdateRetryWarning { count: u8 },
    WrongSecretWarning { count: u8 },
    EncipherError,
    KeyInvalid,
    ObjectTerminated,
    ParameterMismatch,
    MemoryFailure,
    WrongRecordLength,
    ChannelClosed,
    NoMoreChannelsAvailable,
    VolatileKeyWithoutLcs,
    WrongFileType,
    SecurityStatusNotSatisfied,
    CommandBlocked,
    KeyExpired,
    PasswordBlocked,
    KeyAlreadyPresent,
    NoKeyReference,
    NoPrkReference,
    NoPukReference,
    NoRandom,
    NoRecordLifeCycleStatus,
    PasswordNotUsable,
    WrongRandomLength,
    WrongRandomOrNoKeyReference,
    WrongPasswordLength,
    NoCurrentEf,
    IncorrectSmDo,
    NewFileSizeWrong,
    NumberPreconditionWrong,
    NumberScenarioWrong,
    VerificationError,
    WrongCipherText,
    WrongToken,
    UnsupportedFunction,
    FileNotFound,
    RecordNotFound,
    DataTooBig,
    FullRecordList,
    MessageTooLong,
    OutOfMemory,
    InconsistentKeyReference,
    WrongKeyReference,
    KeyNotFound,
    KeyOrPrkNotFound,
    PasswordNotFound,
    PrkNotFound,
    PukNotFound,
    DuplicatedObjects,
    DfNameExists,
    OffsetTooBig,
    InstructionNotSupported,
    PukBlocked,
}
impl ResponseStatus {
    /// Looks up a status word in a command's table.
    ///
    /// Status words missing from the table map to [`ResponseStatus::UnknownStatus`].
    pub fn from_table(table: &[(u16, ResponseStatus)], sw: u16) -> Self {
        table.iter()
            .find(|(word, _)| *word == sw)
            .map(|(_, status)| *status)
            .unwrap_or(Self::UnknownStatus)
    }

    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}
impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryCounter { count } => write!(f, "RetryCounter({})", count),
            Self::UpdateRetryWarning { count } => write!(f, "UpdateRetryWarning({})", count),
            Self::WrongSecretWarning { count } => write!(f, "WrongSecretWarning({})", count),
            other => write!(f, "{:?}", other),
        }
    }
}


use ResponseStatus as S;


pub static GENERAL_AUTHENTICATE: &[(u16, ResponseStatus)] = &[
    (0x0000, S::UnknownStatus),
    (0x9000, S::Success),
    (0x6300, S::AuthenticationFailure),
    (0x6400, S::ParameterMismatch),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6983, S::KeyExpired),
    (0x6985, S::NoKeyReference),
    (0x6A80, S::NumberPreconditionWrong),
    (0x6A81, S::UnsupportedFunction),
    (0x6A88, S::KeyNotFound),
];

pub static PIN_STATUS: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x62C1, S::TransportStatusTransportPin),
    (0x62C7, S::TransportStatusEmptyPin),
    (0x62D0, S::PasswordDisabled),
    (0x63C0, S::RetryCounter { count: 0 }),
    (0x63C1, S::RetryCounter { count: 1 }),
    (0x63C2, S::RetryCounter { count: 2 }),
    (0x63C3, S::RetryCounter { count: 3 }),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6988, S::PasswordNotFound),
];

pub static MANAGE_SECURITY_ENVIRONMENT: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x6A81, S::UnsupportedFunction),
    (0x6A88, S::KeyNotFound),
];

pub static PSO_COMPUTE_DIGITAL_SIGNATURE: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x6400, S::KeyInvalid),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6985, S::NoKeyReference),
    (0x6A81, S::UnsupportedFunction),
    (0x6A88, S::KeyNotFound),
];

pub static INTERNAL_AUTHENTICATE: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x6400, S::KeyInvalid),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6985, S::NoKeyReference),
    (0x6A81, S::UnsupportedFunction),
    (0x6A80, S::WrongToken),
    (0x6A88, S::KeyNotFound),
];

pub static READ: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x6281, S::CorruptDataWarning),
    (0x6282, S::EndOfFileWarning),
    (0x6981, S::WrongFileType),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6986, S::NoCurrentEf),
    (0x6A82, S::FileNotFound),
    (0x6B00, S::OffsetTooBig),
];

pub static SELECT: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x6283, S::FileDeactivated),
    (0x6285, S::FileTerminated),
    (0x6A82, S::FileNotFound),
    (0x6D00, S::InstructionNotSupported),
];

pub static VERIFY_SECRET: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x63C0, S::WrongSecretWarning { count: 0 }),
    (0x63C1, S::WrongSecretWarning { count: 1 }),
    (0x63C2, S::WrongSecretWarning { count: 2 }),
    (0x63C3, S::WrongSecretWarning { count: 3 }),
    (0x6581, S::MemoryFailure),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6983, S::PasswordBlocked),
    (0x6985, S::PasswordNotUsable),
    (0x6988, S::PasswordNotFound),
];

pub static UNLOCK_EGK: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x6983, S::PukBlocked),
    (0x63C0, S::WrongSecretWarning { count: 0 }),
    (0x63C1, S::WrongSecretWarning { count: 1 }),
    (0x63C2, S::WrongSecretWarning { count: 2 }),
    (0x63C3, S::WrongSecretWarning { count: 3 }),
    (0x63C4, S::WrongSecretWarning { count: 4 }),
    (0x63C5, S::WrongSecretWarning { count: 5 }),
    (0x63C6, S::WrongSecretWarning { count: 6 }),
    (0x63C7, S::WrongSecretWarning { count: 7 }),
    (0x63C8, S::WrongSecretWarning { count: 8 }),
    (0x63C9, S::WrongSecretWarning { count: 9 }),
    (0x6581, S::MemoryFailure),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6985, S::WrongPasswordLength),
    (0x6A88, S::PasswordNotFound),
];

pub static CHANGE_REFERENCE_DATA: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x63C0, S::WrongSecretWarning { count: 0 }),
    (0x63C1, S::WrongSecretWarning { count: 1 }),
    (0x63C2, S::WrongSecretWarning { count: 2 }),
    // old secret wrong
    (0x63C3, S::WrongSecretWarning { count: 3 }),
    (0x6581, S::MemoryFailure),
    (0x6982, S::SecurityStatusNotSatisfied),
    (0x6983, S::PasswordBlocked),
    (0x6985, S::WrongPasswordLength),
    (0x6A88, S::PasswordNotFound),
];

pub static GET_RANDOM: &[(u16, ResponseStatus)] = &[
    (0x9000, S::Success),
    (0x6982, S::SecurityStatusNotSatisfied),
];
