//! Protocol types shared by the key schedule and the record layer.

use std::fmt;

mod ctype;
pub use ctype::ContentType;

mod version;
pub use version::{PrfFamily, ProtocolVersion};

use crate::suite::CipherSuiteSpec;

/// Hash functions used by the PRF, HKDF, record MACs and the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    MD5,
    SHA1,
    SHA256,
    SHA384,
    /// GB/T 32905, used by the SM4 suites.
    SM3,
    /// GOST R 34.11-2012 with 256-bit output, used by the GOST suites.
    STREEBOG256,
}

impl HashAlgorithm {
    /// Digest length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::MD5 => 16,
            HashAlgorithm::SHA1 => 20,
            HashAlgorithm::SHA256 => 32,
            HashAlgorithm::SHA384 => 48,
            HashAlgorithm::SM3 => 32,
            HashAlgorithm::STREEBOG256 => 32,
        }
    }
}

/// Which end of the connection we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub fn peer(&self) -> Role {
        match self {
            Role::Client => Role::Server,
            Role::Server => Role::Client,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Client => write!(f, "client"),
            Role::Server => write!(f, "server"),
        }
    }
}

/// Epoch and record sequence number as carried by DTLS records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sequence {
    /// The epoch (incremented on key change).
    pub epoch: u16,
    /// The sequence number within the epoch (technically u48).
    pub sequence_number: u64,
}

impl Sequence {
    /// Create a new sequence with the given epoch and sequence number 0.
    pub fn new(epoch: u16) -> Self {
        Self {
            epoch,
            sequence_number: 0,
        }
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[epoch: {}, sequence_number: {}]",
            self.epoch, self.sequence_number,
        )
    }
}

/// What the handshake settled on. Immutable once negotiated.
#[derive(Debug, Clone, Copy)]
pub struct NegotiatedParameters {
    pub version: ProtocolVersion,
    pub role: Role,
    pub suite: &'static CipherSuiteSpec,
}

impl NegotiatedParameters {
    pub fn new(version: ProtocolVersion, role: Role, suite: &'static CipherSuiteSpec) -> Self {
        Self {
            version,
            role,
            suite,
        }
    }
}
