use aes::{Aes128, Aes192, Aes256};
use aria::{Aria128, Aria192, Aria256};
use camellia::{Camellia128, Camellia192, Camellia256};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde3};
use idea::Idea;
use kuznyechik::Kuznyechik;
use magma::Magma;
use rc2::Rc2;
use sm4::Sm4;

use super::seed::Seed;
use super::EngineKind;
use crate::Error;

/// Keyed block permutation, both directions.
///
/// Callers pass slices of exactly [`BlockEngine::block_len`] bytes.
pub enum BlockEngine {
    Aes128(Box<Aes128>),
    Aes192(Box<Aes192>),
    Aes256(Box<Aes256>),
    Des(Box<Des>),
    TripleDes(Box<TdesEde3>),
    Idea(Box<Idea>),
    Rc2(Box<Rc2>),
    Camellia128(Box<Camellia128>),
    Camellia192(Box<Camellia192>),
    Camellia256(Box<Camellia256>),
    Aria128(Box<Aria128>),
    Aria192(Box<Aria192>),
    Aria256(Box<Aria256>),
    Seed(Box<Seed>),
    Sm4(Box<Sm4>),
    Magma(Box<Magma>),
    Kuznyechik(Box<Kuznyechik>),
}

macro_rules! with_block_cipher {
    ($engine:expr, $c:ident => $body:expr, $s:ident => $seed:expr) => {
        match $engine {
            BlockEngine::Aes128($c) => $body,
            BlockEngine::Aes192($c) => $body,
            BlockEngine::Aes256($c) => $body,
            BlockEngine::Des($c) => $body,
            BlockEngine::TripleDes($c) => $body,
            BlockEngine::Idea($c) => $body,
            BlockEngine::Rc2($c) => $body,
            BlockEngine::Camellia128($c) => $body,
            BlockEngine::Camellia192($c) => $body,
            BlockEngine::Camellia256($c) => $body,
            BlockEngine::Aria128($c) => $body,
            BlockEngine::Aria192($c) => $body,
            BlockEngine::Aria256($c) => $body,
            BlockEngine::Sm4($c) => $body,
            BlockEngine::Magma($c) => $body,
            BlockEngine::Kuznyechik($c) => $body,
            BlockEngine::Seed($s) => $seed,
        }
    };
}

fn keyed<C: KeyInit>(key: &[u8], expected: usize) -> Result<Box<C>, Error> {
    C::new_from_slice(key)
        .map(Box::new)
        .map_err(|_| Error::InvalidKeyLength {
            expected,
            actual: key.len(),
        })
}

impl BlockEngine {
    pub(crate) fn new(kind: EngineKind, key: &[u8]) -> Result<Self, Error> {
        let len = key.len();
        let engine = match (kind, len) {
            (EngineKind::Aes, 16) => BlockEngine::Aes128(keyed(key, 16)?),
            (EngineKind::Aes, 24) => BlockEngine::Aes192(keyed(key, 24)?),
            (EngineKind::Aes, 32) => BlockEngine::Aes256(keyed(key, 32)?),
            (EngineKind::Des, _) => BlockEngine::Des(keyed(key, 8)?),
            (EngineKind::TripleDes, _) => BlockEngine::TripleDes(keyed(key, 24)?),
            (EngineKind::Idea, _) => BlockEngine::Idea(keyed(key, 16)?),
            // Effective key bits follow the key length.
            (EngineKind::Rc2, _) => BlockEngine::Rc2(keyed(key, 16)?),
            (EngineKind::Camellia, 16) => BlockEngine::Camellia128(keyed(key, 16)?),
            (EngineKind::Camellia, 24) => BlockEngine::Camellia192(keyed(key, 24)?),
            (EngineKind::Camellia, 32) => BlockEngine::Camellia256(keyed(key, 32)?),
            (EngineKind::Aria, 16) => BlockEngine::Aria128(keyed(key, 16)?),
            (EngineKind::Aria, 24) => BlockEngine::Aria192(keyed(key, 24)?),
            (EngineKind::Aria, 32) => BlockEngine::Aria256(keyed(key, 32)?),
            (EngineKind::Seed, 16) => {
                let mut k = [0u8; 16];
                k.copy_from_slice(key);
                let seed = Seed::new(&k);
                zeroize::Zeroize::zeroize(&mut k);
                BlockEngine::Seed(Box::new(seed))
            }
            (EngineKind::Sm4, _) => BlockEngine::Sm4(keyed(key, 16)?),
            (EngineKind::Magma, _) => BlockEngine::Magma(keyed(key, 32)?),
            (EngineKind::Kuznyechik, _) => BlockEngine::Kuznyechik(keyed(key, 32)?),
            (EngineKind::Aes | EngineKind::Camellia | EngineKind::Aria, _) => {
                return Err(Error::InvalidKeyLength {
                    expected: 16,
                    actual: len,
                })
            }
            (EngineKind::Seed, _) => {
                return Err(Error::InvalidKeyLength {
                    expected: 16,
                    actual: len,
                })
            }
            (EngineKind::None | EngineKind::Rc4 | EngineKind::ChaCha20, _) => {
                return Err(Error::IncompatibleEngine("block", kind.name()))
            }
        };
        Ok(engine)
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            BlockEngine::Aes128(_) | BlockEngine::Aes192(_) | BlockEngine::Aes256(_) => {
                EngineKind::Aes
            }
            BlockEngine::Des(_) => EngineKind::Des,
            BlockEngine::TripleDes(_) => EngineKind::TripleDes,
            BlockEngine::Idea(_) => EngineKind::Idea,
            BlockEngine::Rc2(_) => EngineKind::Rc2,
            BlockEngine::Camellia128(_)
            | BlockEngine::Camellia192(_)
            | BlockEngine::Camellia256(_) => EngineKind::Camellia,
            BlockEngine::Aria128(_) | BlockEngine::Aria192(_) | BlockEngine::Aria256(_) => {
                EngineKind::Aria
            }
            BlockEngine::Seed(_) => EngineKind::Seed,
            BlockEngine::Sm4(_) => EngineKind::Sm4,
            BlockEngine::Magma(_) => EngineKind::Magma,
            BlockEngine::Kuznyechik(_) => EngineKind::Kuznyechik,
        }
    }

    /// Block size in bytes, 8 or 16.
    pub fn block_len(&self) -> usize {
        match self {
            BlockEngine::Des(_)
            | BlockEngine::TripleDes(_)
            | BlockEngine::Idea(_)
            | BlockEngine::Rc2(_)
            | BlockEngine::Magma(_) => 8,
            _ => 16,
        }
    }

    pub fn encrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_len());
        with_block_cipher!(self,
            c => c.encrypt_block(GenericArray::from_mut_slice(block)),
            s => s.encrypt_block(block)
        )
    }

    pub fn decrypt_block(&self, block: &mut [u8]) {
        debug_assert_eq!(block.len(), self.block_len());
        with_block_cipher!(self,
            c => c.decrypt_block(GenericArray::from_mut_slice(block)),
            s => s.decrypt_block(block)
        )
    }
}

impl std::fmt::Debug for BlockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlockEngine({}, {} bytes)", self.kind(), self.block_len())
    }
}
