use chacha20::ChaCha20;
use cipher::consts::U16;
use cipher::generic_array::GenericArray;
use cipher::{KeyInit, KeyIvInit, StreamCipher, StreamCipherSeek};
use rc4::Rc4;
use zeroize::Zeroizing;

use super::EngineKind;
use crate::Error;

/// ChaCha20 keystream block size.
pub const CHACHA_BLOCK_LEN: u64 = 64;

/// Keystream generators.
///
/// Each variant keeps its key so `reset()` can restart the keystream.
pub enum StreamEngine {
    Rc4 {
        key: Zeroizing<[u8; 16]>,
        cipher: Box<Rc4<U16>>,
    },
    ChaCha20 {
        key: Zeroizing<[u8; 32]>,
        nonce: [u8; 12],
        cipher: Box<ChaCha20>,
    },
}

impl StreamEngine {
    pub(crate) fn new(kind: EngineKind, key: &[u8]) -> Result<Self, Error> {
        let invalid = |expected| Error::InvalidKeyLength {
            expected,
            actual: key.len(),
        };

        match kind {
            EngineKind::Rc4 => {
                let key: [u8; 16] = key.try_into().map_err(|_| invalid(16))?;
                let cipher = Rc4::<U16>::new_from_slice(&key).map_err(|_| invalid(16))?;
                Ok(StreamEngine::Rc4 {
                    key: Zeroizing::new(key),
                    cipher: Box::new(cipher),
                })
            }
            EngineKind::ChaCha20 => {
                let key: [u8; 32] = key.try_into().map_err(|_| invalid(32))?;
                let nonce = [0u8; 12];
                let cipher = chacha(&key, &nonce);
                Ok(StreamEngine::ChaCha20 {
                    key: Zeroizing::new(key),
                    nonce,
                    cipher,
                })
            }
            _ => Err(Error::IncompatibleEngine("stream", kind.name())),
        }
    }

    /// XOR the next keystream bytes into `buf`.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        match self {
            StreamEngine::Rc4 { cipher, .. } => cipher.apply_keystream(buf),
            StreamEngine::ChaCha20 { cipher, .. } => cipher.apply_keystream(buf),
        }
    }

    /// Restart ChaCha20 with a new nonce at block counter 0.
    ///
    /// RC4 has no nonce and fails with `UnsupportedOperation`.
    pub fn start(&mut self, new_nonce: &[u8; 12]) -> Result<(), Error> {
        match self {
            StreamEngine::Rc4 { .. } => Err(Error::UnsupportedOperation("RC4 takes no nonce")),
            StreamEngine::ChaCha20 { key, nonce, cipher } => {
                *nonce = *new_nonce;
                *cipher = chacha(key, nonce);
                Ok(())
            }
        }
    }

    /// Move the ChaCha20 keystream to the given block counter.
    pub fn seek_block(&mut self, block: u32) -> Result<(), Error> {
        match self {
            StreamEngine::Rc4 { .. } => Err(Error::UnsupportedOperation("RC4 is not seekable")),
            StreamEngine::ChaCha20 { cipher, .. } => {
                cipher.seek(block as u64 * CHACHA_BLOCK_LEN);
                Ok(())
            }
        }
    }

    /// Back to the start of the keystream.
    pub fn reset(&mut self) {
        match self {
            StreamEngine::Rc4 { key, cipher } => {
                // The key length was checked on construction.
                if let Ok(fresh) = Rc4::<U16>::new_from_slice(&key[..]) {
                    **cipher = fresh;
                }
            }
            StreamEngine::ChaCha20 { key, nonce, cipher } => {
                *cipher = chacha(key, nonce);
            }
        }
    }
}

fn chacha(key: &[u8; 32], nonce: &[u8; 12]) -> Box<ChaCha20> {
    Box::new(ChaCha20::new(
        GenericArray::from_slice(key),
        GenericArray::from_slice(nonce),
    ))
}

impl std::fmt::Debug for StreamEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamEngine::Rc4 { .. } => f.write_str("StreamEngine::Rc4"),
            StreamEngine::ChaCha20 { .. } => f.write_str("StreamEngine::ChaCha20"),
        }
    }
}
