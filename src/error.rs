use thiserror::Error;

use crate::types::ProtocolVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Invalid key length, expected {expected} but got: {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Already initialized")]
    AlreadyInitialized,

    #[error("Not initialized")]
    NotInitialized,

    #[error("Cipher mode {0} does not support engine {1}")]
    IncompatibleEngine(&'static str, &'static str),

    #[error("Bad record mac")]
    BadRecordMac,

    #[error("Bad padding")]
    BadPadding,

    #[error("Unsupported protocol version {0}")]
    UnsupportedVersion(ProtocolVersion),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("Master secret has not been derived")]
    MissingMasterSecret,

    #[error("Transcript digest is not available")]
    MissingTranscriptDigest,

    #[error("Secret {0} was read after destroy")]
    AccessAfterDestroy(&'static str),

    #[error("Sequence number overflow")]
    SequenceOverflow,

    #[error("Record too short {0}")]
    RecordTooShort(usize),

    #[error("Record too big (> {max}) {len}")]
    RecordOverflow { len: usize, max: usize },

    #[error("Replayed or stale record {0}")]
    ReplayedRecord(u64),

    #[error("Record from epoch {actual}, reading epoch {expected}")]
    UnexpectedEpoch { expected: u16, actual: u16 },

    #[error("Invalid content type {0}")]
    InvalidContentType(u8),

    #[error("Unknown cipher suite {0:#06x}")]
    UnknownCipherSuite(u16),
}

/// Alert sent to the peer when a connection is torn down on an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertDescription {
    BadRecordMac,
    RecordOverflow,
    DecodeError,
    IllegalParameter,
    InternalError,
}

impl Error {
    /// The alert to report for this error.
    ///
    /// Padding and MAC failures collapse into the same alert so a peer can't
    /// tell them apart.
    pub fn alert(&self) -> AlertDescription {
        use Error::*;
        match self {
            BadRecordMac | BadPadding | ReplayedRecord(_) => AlertDescription::BadRecordMac,
            RecordOverflow { .. } => AlertDescription::RecordOverflow,
            RecordTooShort(_) | InvalidContentType(_) | UnexpectedEpoch { .. } => {
                AlertDescription::DecodeError
            }
            UnsupportedVersion(_) | UnknownCipherSuite(_) => AlertDescription::IllegalParameter,
            InvalidKeyLength { .. }
            | AlreadyInitialized
            | NotInitialized
            | IncompatibleEngine(..)
            | UnsupportedOperation(_)
            | MissingMasterSecret
            | MissingTranscriptDigest
            | AccessAfterDestroy(_)
            | SequenceOverflow => AlertDescription::InternalError,
        }
    }

    /// Whether this error comes from using the API wrongly rather than from
    /// what the peer sent.
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Error::InvalidKeyLength { .. }
                | Error::AlreadyInitialized
                | Error::NotInitialized
                | Error::IncompatibleEngine(..)
                | Error::MissingMasterSecret
                | Error::MissingTranscriptDigest
                | Error::AccessAfterDestroy(_)
        )
    }
}
