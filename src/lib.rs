//! Record protection and key schedule for TLS 1.0 to 1.3 and DTLS 1.0 to 1.3.
//!
//! The crate turns a negotiated cipher suite into a working record transform,
//! derives every secret a connection needs from the pre-master secret and the
//! handshake transcript, and protects or unprotects record fragments.
//!
//! It does not parse handshake messages, run key exchanges or frame records.
//! Those are left to the surrounding protocol engine, which feeds handshake
//! bytes to a [`TranscriptHash`], the shared secret to a key schedule, and
//! record fragments to a [`RecordProtector`].
//!
//! ```no_run
//! # use rekord::*;
//! # fn main() -> Result<(), Error> {
//! let suite = CipherSuiteSpec::lookup(0xC02F)?;
//! let params = NegotiatedParameters::new(ProtocolVersion::Tls1_2, Role::Client, suite);
//! let config = Config::default();
//!
//! let mut schedule = Tls12KeySchedule::new(&params, &config)?;
//! # let (pre_master, client_random, server_random) = ([0u8; 32], [0u8; 32], [0u8; 32]);
//! schedule.derive_master_secret(&pre_master, &client_random, &server_random, None)?;
//!
//! let mut protector = RecordProtector::new(params, &config)?;
//! protector.install_key_block(&schedule.derive_key_block()?)?;
//! let record = protector.protect_record(ContentType::ApplicationData, b"hello")?;
//! # let _ = record;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]
// #![deny(missing_docs)]

#[macro_use]
extern crate log;

mod auth;
pub use auth::ExchangeAuthenticator;

mod config;
pub use config::{Config, ConfigBuilder, MAX_PLAINTEXT_LEN};

mod connection;
pub use connection::{ProtectedRecord, RecordProtector};

pub mod crypto;
pub use crypto::ConnectionSecret;

pub mod engine;
pub use engine::{CipherEngine, EngineKind};

mod error;
pub use error::{AlertDescription, Error};

pub mod key_schedule;
pub use key_schedule::{
    KeyBlock, KeySchedule, Tls12KeySchedule, Tls13KeySchedule, TrafficEpoch, TrafficKeys,
};

pub mod mode;
pub use mode::{CipherMode, ModeKind};

mod suite;
pub use suite::{CipherSuiteSpec, ALL_CIPHER_SUITES, TLS_NULL_WITH_NULL_NULL};

mod transcript;
pub use transcript::TranscriptHash;

pub mod types;
pub use types::{ContentType, HashAlgorithm, NegotiatedParameters, ProtocolVersion, Role, Sequence};

mod window;
pub use window::ReplayWindow;
