//! Running hash over the handshake messages.
//!
//! Messages arrive before the cipher suite (and so the hash) is known. Until
//! [`TranscriptHash::init`] they are buffered, then replayed into the real
//! digest and the buffer is dropped.

use std::fmt;

use crate::config::Config;
use crate::crypto::Hash;
use crate::types::{HashAlgorithm, PrfFamily, ProtocolVersion};
use crate::Error;

/// Handshake type of the synthetic message that replaces ClientHello1
/// after a HelloRetryRequest (RFC 8446 Section 4.4.1).
const MESSAGE_HASH: u8 = 254;

enum State {
    Buffering(Vec<u8>),
    /// TLS 1.0/1.1: MD5 and SHA-1 side by side.
    Legacy { md5: Hash, sha1: Hash },
    Single(Hash),
}

pub struct TranscriptHash {
    state: State,
    committed: Option<Vec<u8>>,
}

impl TranscriptHash {
    pub fn new(config: &Config) -> Self {
        TranscriptHash {
            state: State::Buffering(Vec::with_capacity(config.transcript_buffer_capacity())),
            committed: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(self.state, State::Buffering(_))
    }

    /// The digest algorithm, once initialized. `None` for the MD5/SHA-1
    /// pair.
    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        match &self.state {
            State::Single(hash) => Some(hash.algorithm()),
            _ => None,
        }
    }

    /// Pick the digest for the negotiated version and suite hash and replay
    /// the buffered bytes into it.
    pub fn init(&mut self, version: ProtocolVersion, hash: HashAlgorithm) -> Result<(), Error> {
        let State::Buffering(buffer) = &mut self.state else {
            return Err(Error::AlreadyInitialized);
        };
        let buffer = std::mem::take(buffer);

        let mut state = match version.prf_family() {
            PrfFamily::Tls10 => State::Legacy {
                md5: Hash::new(HashAlgorithm::MD5),
                sha1: Hash::new(HashAlgorithm::SHA1),
            },
            PrfFamily::Tls12 | PrfFamily::Hkdf => State::Single(Hash::new(hash)),
        };
        feed(&mut state, &buffer);
        debug!(
            "Transcript initialized for {} after {} buffered bytes",
            version,
            buffer.len()
        );
        self.state = state;
        Ok(())
    }

    pub fn update(&mut self, data: &[u8]) {
        feed(&mut self.state, data);
    }

    /// The digest over everything so far. Accumulation continues.
    pub fn digest(&self) -> Result<Vec<u8>, Error> {
        match &self.state {
            State::Buffering(_) => Err(Error::NotInitialized),
            State::Legacy { md5, sha1 } => {
                let mut out = md5.clone_and_finalize();
                out.extend_from_slice(&sha1.clone_and_finalize());
                Ok(out)
            }
            State::Single(hash) => Ok(hash.clone_and_finalize()),
        }
    }

    /// Snapshot the current digest, e.g. at the point the Finished or
    /// session hash is computed.
    pub fn commit(&mut self) -> Result<(), Error> {
        self.committed = Some(self.digest()?);
        Ok(())
    }

    pub fn committed(&self) -> Result<&[u8], Error> {
        self.committed
            .as_deref()
            .ok_or(Error::MissingTranscriptDigest)
    }

    /// Replace the transcript so far by a message_hash message carrying its
    /// digest. Used when the server sends a HelloRetryRequest.
    pub fn replace_with_message_hash(&mut self) -> Result<(), Error> {
        let State::Single(hash) = &mut self.state else {
            return Err(Error::NotInitialized);
        };
        let digest = hash.clone_and_finalize();
        let mut fresh = Hash::new(hash.algorithm());
        fresh.update(&[MESSAGE_HASH, 0, 0, digest.len() as u8]);
        fresh.update(&digest);
        *hash = fresh;
        Ok(())
    }
}

fn feed(state: &mut State, data: &[u8]) {
    match state {
        State::Buffering(buffer) => buffer.extend_from_slice(data),
        State::Legacy { md5, sha1 } => {
            md5.update(data);
            sha1.update(data);
        }
        State::Single(hash) => hash.update(data),
    }
}

impl Default for TranscriptHash {
    fn default() -> Self {
        TranscriptHash::new(&Config::default())
    }
}

impl fmt::Debug for TranscriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Buffering(b) => format!("buffering({})", b.len()),
            State::Legacy { .. } => "md5+sha1".to_string(),
            State::Single(hash) => format!("{:?}", hash.algorithm()),
        };
        f.debug_struct("TranscriptHash")
            .field("state", &state)
            .field("committed", &self.committed.is_some())
            .finish()
    }
}
