//! ChaCha20-Poly1305 (RFC 8439), as a phase machine and as a record mode.
//!
//! Records use nonce = iv XOR seq in every protocol version (RFC 7905).

use std::fmt;

use poly1305::universal_hash::{KeyInit, UniversalHash};
use poly1305::{Block, Key, Poly1305};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::RecordTransform;
use crate::auth::ExchangeAuthenticator;
use crate::crypto::Nonce;
use crate::engine::{CipherEngine, EngineKind, StreamEngine};
use crate::types::ContentType;
use crate::Error;

pub const TAG_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Poly1305 input where each section is zero padded to 16 bytes.
struct PaddedMac {
    mac: Poly1305,
    partial: [u8; 16],
    partial_len: usize,
}

impl PaddedMac {
    fn new(key: &[u8]) -> Self {
        PaddedMac {
            mac: Poly1305::new(Key::from_slice(key)),
            partial: [0; 16],
            partial_len: 0,
        }
    }

    fn absorb(&mut self, mut data: &[u8]) {
        if self.partial_len > 0 {
            let take = (16 - self.partial_len).min(data.len());
            self.partial[self.partial_len..self.partial_len + take].copy_from_slice(&data[..take]);
            self.partial_len += take;
            data = &data[take..];
            if self.partial_len < 16 {
                return;
            }
            self.mac.update(&[Block::clone_from_slice(&self.partial)]);
            self.partial_len = 0;
        }

        let mut chunks = data.chunks_exact(16);
        for chunk in &mut chunks {
            self.mac.update(&[Block::clone_from_slice(chunk)]);
        }
        let rest = chunks.remainder();
        self.partial[..rest.len()].copy_from_slice(rest);
        self.partial_len = rest.len();
    }

    /// Close the current section.
    fn pad(&mut self) {
        if self.partial_len > 0 {
            self.mac.update_padded(&self.partial[..self.partial_len]);
            self.partial_len = 0;
        }
    }
}

enum Phase {
    Ready,
    Aad { mac: PaddedMac, aad_len: u64 },
    Data { mac: PaddedMac, aad_len: u64, data_len: u64 },
    Finished,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Aad { .. } => "aad",
            Phase::Data { .. } => "data",
            Phase::Finished => "finished",
        }
    }
}

/// ChaCha20-Poly1305 in phases: `start`, any number of `update_aad`, any
/// number of `process`, then `finalize` (sealing) or `verify` (opening).
///
/// A finished machine must be `reset()` before the next `start`.
pub struct ChaCha20Poly1305 {
    engine: StreamEngine,
    for_encryption: bool,
    encrypting: bool,
    phase: Phase,
}

impl ChaCha20Poly1305 {
    pub fn new(engine: CipherEngine) -> Result<Self, Error> {
        if engine.kind() != EngineKind::ChaCha20 {
            return Err(Error::IncompatibleEngine(
                "CHACHA20_POLY1305",
                engine.kind().name(),
            ));
        }
        let for_encryption = engine.for_encryption();
        Ok(Self::with_stream(engine.into_stream()?, for_encryption))
    }

    pub(super) fn with_stream(engine: StreamEngine, for_encryption: bool) -> Self {
        ChaCha20Poly1305 {
            engine,
            for_encryption,
            encrypting: for_encryption,
            phase: Phase::Ready,
        }
    }

    /// Key the one-time Poly1305 key from keystream block 0 and position
    /// the cipher at block 1.
    pub fn start(&mut self, nonce: &[u8; NONCE_LEN]) -> Result<(), Error> {
        self.begin(nonce, self.for_encryption)
    }

    fn begin(&mut self, nonce: &[u8; NONCE_LEN], encrypting: bool) -> Result<(), Error> {
        match self.phase {
            Phase::Ready => {}
            Phase::Finished => return Err(Error::NotInitialized),
            Phase::Aad { .. } | Phase::Data { .. } => return Err(Error::AlreadyInitialized),
        }

        self.engine.start(nonce)?;
        let mut mac_key = Zeroizing::new([0u8; 32]);
        self.engine.apply_keystream(&mut mac_key[..]);
        self.engine.seek_block(1)?;

        self.encrypting = encrypting;
        self.phase = Phase::Aad {
            mac: PaddedMac::new(&mac_key[..]),
            aad_len: 0,
        };
        Ok(())
    }

    pub fn update_aad(&mut self, aad: &[u8]) -> Result<(), Error> {
        match &mut self.phase {
            Phase::Aad { mac, aad_len } => {
                mac.absorb(aad);
                *aad_len += aad.len() as u64;
                Ok(())
            }
            Phase::Data { .. } => Err(Error::UnsupportedOperation("AAD after payload")),
            Phase::Ready | Phase::Finished => Err(Error::NotInitialized),
        }
    }

    /// Encrypt or decrypt `input` into `output`, which must be at least as
    /// long. Returns the number of bytes written.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        if output.len() < input.len() {
            return Err(Error::RecordOverflow {
                len: input.len(),
                max: output.len(),
            });
        }

        if matches!(self.phase, Phase::Aad { .. }) {
            if let Phase::Aad { mut mac, aad_len } =
                std::mem::replace(&mut self.phase, Phase::Finished)
            {
                mac.pad();
                self.phase = Phase::Data {
                    mac,
                    aad_len,
                    data_len: 0,
                };
            }
        }

        let Phase::Data { mac, data_len, .. } = &mut self.phase else {
            return Err(Error::NotInitialized);
        };

        let out = &mut output[..input.len()];
        out.copy_from_slice(input);
        if self.encrypting {
            self.engine.apply_keystream(out);
            mac.absorb(out);
        } else {
            mac.absorb(input);
            self.engine.apply_keystream(out);
        }
        *data_len += input.len() as u64;
        Ok(input.len())
    }

    /// Finish and return the tag.
    pub fn finalize(&mut self) -> Result<[u8; TAG_LEN], Error> {
        let (mut mac, aad_len, data_len) =
            match std::mem::replace(&mut self.phase, Phase::Finished) {
                Phase::Aad { mac, aad_len } => (mac, aad_len, 0),
                Phase::Data {
                    mac,
                    aad_len,
                    data_len,
                } => (mac, aad_len, data_len),
                other => {
                    self.phase = other;
                    return Err(Error::NotInitialized);
                }
            };

        mac.pad();
        let mut lengths = [0u8; 16];
        lengths[..8].copy_from_slice(&aad_len.to_le_bytes());
        lengths[8..].copy_from_slice(&data_len.to_le_bytes());
        mac.absorb(&lengths);

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&mac.mac.finalize());
        Ok(tag)
    }

    /// Finish and compare against the received tag in constant time.
    pub fn verify(&mut self, tag: &[u8]) -> Result<(), Error> {
        let expected = self.finalize()?;
        if bool::from(expected.ct_eq(tag)) {
            Ok(())
        } else {
            Err(Error::BadRecordMac)
        }
    }

    pub fn reset(&mut self) {
        self.engine.reset();
        self.encrypting = self.for_encryption;
        self.phase = Phase::Ready;
    }
}

impl fmt::Debug for ChaCha20Poly1305 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaCha20Poly1305")
            .field("for_encryption", &self.for_encryption)
            .field("phase", &self.phase.name())
            .finish()
    }
}

pub(super) struct ChaChaPolyMode {
    aead: ChaCha20Poly1305,
    iv: Zeroizing<Vec<u8>>,
}

impl ChaChaPolyMode {
    pub fn new(engine: StreamEngine, encrypting: bool, iv: &[u8]) -> Result<Self, Error> {
        if iv.len() != NONCE_LEN {
            return Err(Error::InvalidKeyLength {
                expected: NONCE_LEN,
                actual: iv.len(),
            });
        }
        Ok(ChaChaPolyMode {
            aead: ChaCha20Poly1305::with_stream(engine, encrypting),
            iv: Zeroizing::new(iv.to_vec()),
        })
    }

    fn nonce(&self, auth: &ExchangeAuthenticator) -> [u8; NONCE_LEN] {
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(Nonce::xor(&self.iv, &auth.sequence_block()).as_slice());
        nonce
    }
}

impl RecordTransform for ChaChaPolyMode {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let nonce = self.nonce(auth);
        let aad = auth.aead_aad(content_type, plaintext.len(), plaintext.len() + TAG_LEN);

        self.aead.reset();
        self.aead.begin(&nonce, true)?;
        self.aead.update_aad(aad.as_slice())?;

        let mut out = vec![0u8; plaintext.len()];
        self.aead.process(plaintext, &mut out)?;
        out.extend_from_slice(&self.aead.finalize()?);
        Ok(out)
    }

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let Some(ciphertext_len) = record.len().checked_sub(TAG_LEN) else {
            return Err(Error::RecordTooShort(record.len()));
        };
        let (ciphertext, tag) = record.split_at(ciphertext_len);
        let nonce = self.nonce(auth);
        let aad = auth.aead_aad(content_type, ciphertext_len, record.len());

        self.aead.reset();
        self.aead.begin(&nonce, false)?;
        self.aead.update_aad(aad.as_slice())?;

        let mut out = vec![0u8; ciphertext_len];
        self.aead.process(ciphertext, &mut out)?;
        self.aead.verify(tag)?;
        Ok(out)
    }

    fn reset(&mut self) {
        self.aead.reset();
    }
}
