//! Record transforms: one keyed engine combined with a mode algorithm.
//!
//! A [`CipherMode`] protects or unprotects the fragment of one record at a
//! time and advances the sequence number of its [`ExchangeAuthenticator`]
//! once per record.

use std::fmt;

use zeroize::Zeroizing;

use crate::auth::ExchangeAuthenticator;
use crate::crypto::{Nonce, EXPLICIT_NONCE_LEN, MAX_NONCE_LEN};
use crate::engine::{BlockEngine, CipherEngine, EngineKind, StreamEngine};
use crate::types::ContentType;
use crate::Error;

mod aead;
mod cbc;
mod chacha20_poly1305;
mod ctr;
mod mgm;
mod null;

pub use cbc::{add_padding, check_padding};
pub use chacha20_poly1305::ChaCha20Poly1305;
pub use mgm::Mgm;

/// The mode algorithms a cipher suite can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    /// No encryption, MAC only (or nothing for NULL_WITH_NULL).
    Null,
    /// Stream cipher, MAC-then-encrypt.
    Stream,
    Cbc,
    Ctr,
    Gcm,
    Ccm,
    /// CCM with an 8 byte tag.
    Ccm8,
    ChaCha20Poly1305,
    /// MGM with a full block tag.
    MgmStrong,
    /// MGM with a half block tag.
    MgmLight,
    /// GOST counter mode with OMAC (the CTR_OMAC suites).
    CntImit,
}

impl ModeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ModeKind::Null => "NULL",
            ModeKind::Stream => "STREAM",
            ModeKind::Cbc => "CBC",
            ModeKind::Ctr => "CTR",
            ModeKind::Gcm => "GCM",
            ModeKind::Ccm => "CCM",
            ModeKind::Ccm8 => "CCM_8",
            ModeKind::ChaCha20Poly1305 => "CHACHA20_POLY1305",
            ModeKind::MgmStrong => "MGM_S",
            ModeKind::MgmLight => "MGM_L",
            ModeKind::CntImit => "CNT_IMIT",
        }
    }

    /// Whether the mode authenticates on its own (no record HMAC).
    pub fn is_aead(&self) -> bool {
        matches!(
            self,
            ModeKind::Gcm
                | ModeKind::Ccm
                | ModeKind::Ccm8
                | ModeKind::ChaCha20Poly1305
                | ModeKind::MgmStrong
                | ModeKind::MgmLight
        )
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One mode algorithm bound to its keyed engine.
///
/// The authenticator is lent for each record; sequencing is left to
/// [`CipherMode`].
pub(crate) trait RecordTransform: Send {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error>;

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error>;

    /// Back to the post-init state.
    fn reset(&mut self) {}
}

/// How the per-record nonce is derived and what of it goes on the wire.
pub(crate) enum NonceLayout {
    /// fixed IV || explicit nonce. The explicit part is the low bytes of
    /// the sequence block and is sent in front of the ciphertext.
    Explicit {
        fixed: Zeroizing<Vec<u8>>,
        explicit_len: usize,
    },
    /// IV XOR left-padded sequence block. Nothing is sent.
    Xor { iv: Zeroizing<Vec<u8>> },
}

impl NonceLayout {
    /// Fails with `InvalidKeyLength` unless the explicit part fits in the
    /// sequence block and the whole nonce fits in [`MAX_NONCE_LEN`]. An XOR
    /// nonce must also cover the full sequence block.
    pub fn new(iv: &[u8], explicit_len: usize) -> Result<Self, Error> {
        if explicit_len > EXPLICIT_NONCE_LEN {
            return Err(Error::InvalidKeyLength {
                expected: EXPLICIT_NONCE_LEN,
                actual: explicit_len,
            });
        }
        let nonce_len = iv.len() + explicit_len;
        if nonce_len > MAX_NONCE_LEN {
            return Err(Error::InvalidKeyLength {
                expected: MAX_NONCE_LEN,
                actual: nonce_len,
            });
        }

        if explicit_len > 0 {
            Ok(NonceLayout::Explicit {
                fixed: Zeroizing::new(iv.to_vec()),
                explicit_len,
            })
        } else if iv.len() < EXPLICIT_NONCE_LEN {
            Err(Error::InvalidKeyLength {
                expected: EXPLICIT_NONCE_LEN,
                actual: iv.len(),
            })
        } else {
            Ok(NonceLayout::Xor {
                iv: Zeroizing::new(iv.to_vec()),
            })
        }
    }

    pub fn nonce_len(&self) -> usize {
        match self {
            NonceLayout::Explicit {
                fixed,
                explicit_len,
            } => fixed.len() + explicit_len,
            NonceLayout::Xor { iv } => iv.len(),
        }
    }

    pub fn explicit_len(&self) -> usize {
        match self {
            NonceLayout::Explicit { explicit_len, .. } => *explicit_len,
            NonceLayout::Xor { .. } => 0,
        }
    }

    /// The nonce for an outgoing record and the bytes to send with it.
    pub fn sending<'a>(&self, seq: &'a [u8; 8]) -> (Nonce, &'a [u8]) {
        match self {
            NonceLayout::Explicit {
                fixed,
                explicit_len,
            } => {
                let explicit = &seq[8 - explicit_len..];
                (Nonce::new(fixed, explicit), explicit)
            }
            NonceLayout::Xor { iv } => (Nonce::xor(iv, seq), &seq[..0]),
        }
    }

    /// The nonce of an incoming record and the rest of the record.
    pub fn receiving<'a>(&self, seq: &[u8; 8], record: &'a [u8]) -> Result<(Nonce, &'a [u8]), Error> {
        match self {
            NonceLayout::Explicit {
                fixed,
                explicit_len,
            } => {
                if record.len() < *explicit_len {
                    return Err(Error::RecordTooShort(record.len()));
                }
                let (explicit, rest) = record.split_at(*explicit_len);
                Ok((Nonce::new(fixed, explicit), rest))
            }
            NonceLayout::Xor { iv } => Ok((Nonce::xor(iv, seq), record)),
        }
    }
}

/// Record protection for one direction of a connection.
pub struct CipherMode {
    kind: ModeKind,
    transform: Box<dyn RecordTransform>,
    auth: ExchangeAuthenticator,
}

impl CipherMode {
    /// Combine `engine` with the mode algorithm.
    ///
    /// `iv` is the IV material from the key block (fixed part for explicit
    /// nonce modes). `explicit_nonce_len` is the number of nonce bytes sent
    /// with each record.
    pub fn new(
        kind: ModeKind,
        engine: CipherEngine,
        auth: ExchangeAuthenticator,
        iv: &[u8],
        explicit_nonce_len: usize,
    ) -> Result<Self, Error> {
        let transform: Box<dyn RecordTransform> = match kind {
            ModeKind::Null => {
                if engine.kind() != EngineKind::None {
                    return Err(Error::IncompatibleEngine(kind.name(), engine.kind().name()));
                }
                Box::new(null::NullMode)
            }
            ModeKind::Stream => {
                if engine.kind() != EngineKind::Rc4 {
                    return Err(Error::IncompatibleEngine(kind.name(), engine.kind().name()));
                }
                Box::new(null::StreamMode::new(stream_engine(kind, engine)?))
            }
            ModeKind::Cbc => {
                let explicit_iv = auth.version().uses_explicit_iv();
                Box::new(cbc::CbcMode::new(
                    block_engine(kind, engine)?,
                    iv,
                    explicit_iv,
                )?)
            }
            ModeKind::Ctr => Box::new(ctr::CtrMode::new(
                block_engine(kind, engine)?,
                NonceLayout::new(iv, explicit_nonce_len)?,
            )?),
            ModeKind::Gcm => aead::gcm(
                block_engine(kind, engine)?,
                NonceLayout::new(iv, explicit_nonce_len)?,
            )?,
            ModeKind::Ccm => aead::ccm(
                block_engine(kind, engine)?,
                NonceLayout::new(iv, explicit_nonce_len)?,
                16,
            )?,
            ModeKind::Ccm8 => aead::ccm(
                block_engine(kind, engine)?,
                NonceLayout::new(iv, explicit_nonce_len)?,
                8,
            )?,
            ModeKind::ChaCha20Poly1305 => {
                if engine.kind() != EngineKind::ChaCha20 {
                    return Err(Error::IncompatibleEngine(kind.name(), engine.kind().name()));
                }
                let encrypting = engine.for_encryption();
                Box::new(chacha20_poly1305::ChaChaPolyMode::new(
                    stream_engine(kind, engine)?,
                    encrypting,
                    iv,
                )?)
            }
            ModeKind::MgmStrong | ModeKind::MgmLight => Box::new(mgm::MgmMode::new(
                gost_engine(kind, engine)?,
                iv,
                kind == ModeKind::MgmStrong,
            )?),
            ModeKind::CntImit => {
                gost_engine(kind, engine)?;
                Box::new(CntImit)
            }
        };

        Ok(CipherMode {
            kind,
            transform,
            auth,
        })
    }

    pub fn kind(&self) -> ModeKind {
        self.kind
    }

    pub fn authenticator(&self) -> &ExchangeAuthenticator {
        &self.auth
    }

    pub(crate) fn authenticator_mut(&mut self) -> &mut ExchangeAuthenticator {
        &mut self.auth
    }

    /// Protect one record fragment.
    pub fn encrypt(
        &mut self,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let record = self.transform.encrypt(&self.auth, content_type, plaintext)?;
        trace!(
            "Protected {} record {} ({} -> {} bytes)",
            content_type,
            self.auth.sequence(),
            plaintext.len(),
            record.len()
        );
        self.auth.increase_sequence_number()?;
        Ok(record)
    }

    /// Unprotect one record fragment.
    ///
    /// Fails with `BadRecordMac` or `BadPadding`. Both map to the same alert.
    pub fn decrypt(&mut self, content_type: ContentType, record: &[u8]) -> Result<Vec<u8>, Error> {
        let plaintext = match self.transform.decrypt(&self.auth, content_type, record) {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    "Failed to unprotect {} record {}: {}",
                    content_type,
                    self.auth.sequence(),
                    e
                );
                return Err(e);
            }
        };
        trace!(
            "Unprotected {} record {} ({} bytes)",
            content_type,
            self.auth.sequence(),
            plaintext.len()
        );
        self.auth.increase_sequence_number()?;
        Ok(plaintext)
    }

    /// Return to the post-init state. The sequence number restarts at 0 in
    /// the current epoch.
    pub fn reset(&mut self) {
        self.transform.reset();
        let epoch = self.auth.epoch();
        self.auth.set_epoch(epoch);
    }
}

impl fmt::Debug for CipherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherMode")
            .field("kind", &self.kind)
            .field("auth", &self.auth)
            .finish()
    }
}

fn block_engine(kind: ModeKind, engine: CipherEngine) -> Result<BlockEngine, Error> {
    let name = engine.kind().name();
    engine
        .into_block()
        .map_err(|_| Error::IncompatibleEngine(kind.name(), name))
}

fn stream_engine(kind: ModeKind, engine: CipherEngine) -> Result<StreamEngine, Error> {
    let name = engine.kind().name();
    engine
        .into_stream()
        .map_err(|_| Error::IncompatibleEngine(kind.name(), name))
}

/// MGM and CNT-IMIT run on the GOST block ciphers only.
fn gost_engine(kind: ModeKind, engine: CipherEngine) -> Result<BlockEngine, Error> {
    match engine.kind() {
        EngineKind::Magma | EngineKind::Kuznyechik => block_engine(kind, engine),
        other => Err(Error::IncompatibleEngine(kind.name(), other.name())),
    }
}

/// GOST CTR_OMAC records are protected under TLSTREE re-keyed keys, which
/// this crate does not derive.
struct CntImit;

impl RecordTransform for CntImit {
    fn encrypt(
        &mut self,
        _auth: &ExchangeAuthenticator,
        _content_type: ContentType,
        _plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        Err(Error::UnsupportedOperation("CNT-IMIT record protection"))
    }

    fn decrypt(
        &mut self,
        _auth: &ExchangeAuthenticator,
        _content_type: ContentType,
        _record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        Err(Error::UnsupportedOperation("CNT-IMIT record protection"))
    }
}
