//! Keyed symmetric primitives with no protocol awareness.
//!
//! A [`CipherEngine`] is built fully keyed by [`CipherEngine::new`]; there
//! is no way to hold one that has not been initialized.

use std::fmt;

use zeroize::Zeroizing;

use crate::Error;

mod block;
mod seed;
mod stream;

pub use block::BlockEngine;
pub use seed::Seed;
pub use stream::{StreamEngine, CHACHA_BLOCK_LEN};

/// The primitives a cipher suite can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineKind {
    None,
    Aes,
    Des,
    TripleDes,
    Idea,
    Rc2,
    Rc4,
    ChaCha20,
    Camellia,
    Aria,
    Seed,
    Sm4,
    Magma,
    Kuznyechik,
}

impl EngineKind {
    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::None => "NULL",
            EngineKind::Aes => "AES",
            EngineKind::Des => "DES",
            EngineKind::TripleDes => "3DES",
            EngineKind::Idea => "IDEA",
            EngineKind::Rc2 => "RC2",
            EngineKind::Rc4 => "RC4",
            EngineKind::ChaCha20 => "ChaCha20",
            EngineKind::Camellia => "Camellia",
            EngineKind::Aria => "ARIA",
            EngineKind::Seed => "SEED",
            EngineKind::Sm4 => "SM4",
            EngineKind::Magma => "Magma",
            EngineKind::Kuznyechik => "Kuznyechik",
        }
    }

    /// Key lengths in bytes accepted by [`CipherEngine::new`].
    pub fn key_lengths(&self) -> &'static [usize] {
        match self {
            EngineKind::None => &[0],
            EngineKind::Aes | EngineKind::Camellia | EngineKind::Aria => &[16, 24, 32],
            EngineKind::Des => &[8],
            EngineKind::TripleDes => &[24],
            EngineKind::Idea | EngineKind::Rc2 | EngineKind::Rc4 => &[16],
            EngineKind::Seed | EngineKind::Sm4 => &[16],
            EngineKind::ChaCha20 | EngineKind::Magma | EngineKind::Kuznyechik => &[32],
        }
    }

    /// Block size for block ciphers, `None` for stream ciphers and NULL.
    pub fn block_len(&self) -> Option<usize> {
        match self {
            EngineKind::None | EngineKind::Rc4 | EngineKind::ChaCha20 => None,
            EngineKind::Des
            | EngineKind::TripleDes
            | EngineKind::Idea
            | EngineKind::Rc2
            | EngineKind::Magma => Some(8),
            EngineKind::Aes
            | EngineKind::Camellia
            | EngineKind::Aria
            | EngineKind::Seed
            | EngineKind::Sm4
            | EngineKind::Kuznyechik => Some(16),
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, EngineKind::Rc4 | EngineKind::ChaCha20)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

enum Primitive {
    None,
    Block(BlockEngine),
    Stream(StreamEngine),
}

/// A keyed primitive for one direction.
pub struct CipherEngine {
    kind: EngineKind,
    for_encryption: bool,
    key: Zeroizing<Vec<u8>>,
    primitive: Primitive,
}

impl CipherEngine {
    /// Key the primitive.
    ///
    /// Fails with `InvalidKeyLength` unless `key.len()` is one of
    /// [`EngineKind::key_lengths`].
    pub fn new(kind: EngineKind, for_encryption: bool, key: &[u8]) -> Result<Self, Error> {
        let lengths = kind.key_lengths();
        if !lengths.contains(&key.len()) {
            return Err(Error::InvalidKeyLength {
                expected: lengths[0],
                actual: key.len(),
            });
        }

        let primitive = match kind {
            EngineKind::None => Primitive::None,
            EngineKind::Rc4 | EngineKind::ChaCha20 => {
                Primitive::Stream(StreamEngine::new(kind, key)?)
            }
            _ => Primitive::Block(BlockEngine::new(kind, key)?),
        };

        Ok(CipherEngine {
            kind,
            for_encryption,
            key: Zeroizing::new(key.to_vec()),
            primitive,
        })
    }

    pub fn kind(&self) -> EngineKind {
        self.kind
    }

    pub fn for_encryption(&self) -> bool {
        self.for_encryption
    }

    pub fn key_len(&self) -> usize {
        self.key.len()
    }

    pub fn block_len(&self) -> Option<usize> {
        match &self.primitive {
            Primitive::Block(b) => Some(b.block_len()),
            _ => None,
        }
    }

    /// Transform `input` into `output`, returning the number of bytes written.
    ///
    /// Block engines take exactly one block; stream engines and NULL take
    /// any length.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
        let len = input.len();
        if output.len() < len {
            return Err(Error::RecordTooShort(output.len()));
        }
        let out = &mut output[..len];
        out.copy_from_slice(input);

        match &mut self.primitive {
            Primitive::None => {}
            Primitive::Stream(s) => s.apply_keystream(out),
            Primitive::Block(b) => {
                if len != b.block_len() {
                    return Err(Error::UnsupportedOperation("input is not one block"));
                }
                if self.for_encryption {
                    b.encrypt_block(out);
                } else {
                    b.decrypt_block(out);
                }
            }
        }

        Ok(len)
    }

    /// Restore the post-init state. Stream engines restart their keystream.
    pub fn reset(&mut self) {
        if let Primitive::Stream(s) = &mut self.primitive {
            s.reset();
        }
    }

    pub fn as_block(&self) -> Option<&BlockEngine> {
        match &self.primitive {
            Primitive::Block(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_stream(&mut self) -> Option<&mut StreamEngine> {
        match &mut self.primitive {
            Primitive::Stream(s) => Some(s),
            _ => None,
        }
    }

    pub(crate) fn into_block(self) -> Result<BlockEngine, Error> {
        match self.primitive {
            Primitive::Block(b) => Ok(b),
            _ => Err(Error::IncompatibleEngine("block", self.kind.name())),
        }
    }

    pub(crate) fn into_stream(self) -> Result<StreamEngine, Error> {
        match self.primitive {
            Primitive::Stream(s) => Ok(s),
            _ => Err(Error::IncompatibleEngine("stream", self.kind.name())),
        }
    }
}

impl fmt::Debug for CipherEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherEngine")
            .field("kind", &self.kind)
            .field("for_encryption", &self.for_encryption)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn kat(kind: EngineKind, key: &str, pt: &str, ct: &str) {
        let (key, pt, ct) = (hex(key), hex(pt), hex(ct));
        let mut out = vec![0u8; pt.len()];

        let mut enc = CipherEngine::new(kind, true, &key).unwrap();
        assert_eq!(enc.process(&pt, &mut out).unwrap(), pt.len());
        assert_eq!(out, ct, "{} encrypt", kind);

        let mut dec = CipherEngine::new(kind, false, &key).unwrap();
        dec.process(&ct, &mut out).unwrap();
        assert_eq!(out, pt, "{} decrypt", kind);
    }

    #[test]
    fn aes_fips197() {
        kat(
            EngineKind::Aes,
            "000102030405060708090a0b0c0d0e0f",
            "00112233445566778899aabbccddeeff",
            "69c4e0d86a7b0430d8cdb78070b4c55a",
        );
        kat(
            EngineKind::Aes,
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "00112233445566778899aabbccddeeff",
            "8ea2b7ca516745bfeafc49904b496089",
        );
    }

    #[test]
    fn aria_rfc5794() {
        kat(
            EngineKind::Aria,
            "000102030405060708090a0b0c0d0e0f",
            "00112233445566778899aabbccddeeff",
            "d718fbd6ab644c739da95f3be6451778",
        );
        kat(
            EngineKind::Aria,
            "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "00112233445566778899aabbccddeeff",
            "f92bd7c79fb72e2f2b8f80c1972d24fc",
        );
    }

    #[test]
    fn camellia_rfc3713() {
        kat(
            EngineKind::Camellia,
            "0123456789abcdeffedcba9876543210",
            "0123456789abcdeffedcba9876543210",
            "67673138549669730857065648eabe43",
        );
    }

    #[test]
    fn sm4_gbt32907() {
        kat(
            EngineKind::Sm4,
            "0123456789abcdeffedcba9876543210",
            "0123456789abcdeffedcba9876543210",
            "681edf34d206965e86b3e94f536e4246",
        );
    }

    #[test]
    fn des_and_triple_des() {
        kat(
            EngineKind::Des,
            "133457799bbcdff1",
            "0123456789abcdef",
            "85e813540f0ab405",
        );
        kat(
            EngineKind::TripleDes,
            "0123456789abcdef23456789abcdef01456789abcdef0123",
            "5468652071756663",
            "a826fd8ce53b855f",
        );
    }

    #[test]
    fn idea() {
        kat(
            EngineKind::Idea,
            "000102030405060708090a0b0c0d0e0f",
            "0000000100020003",
            "05df0879f2df190d",
        );
    }

    #[test]
    fn rc2_full_effective_key() {
        kat(
            EngineKind::Rc2,
            "000102030405060708090a0b0c0d0e0f",
            "0000000000000000",
            "9c4bfe6dfe739c2b",
        );
    }

    #[test]
    fn seed_rfc4269() {
        kat(
            EngineKind::Seed,
            "00000000000000000000000000000000",
            "000102030405060708090a0b0c0d0e0f",
            "5ebac6e0054e166819aff1cc6d346cdb",
        );
    }

    #[test]
    fn gost_34_12() {
        kat(
            EngineKind::Kuznyechik,
            "8899aabbccddeeff0011223344556677fedcba98765432100123456789abcdef",
            "1122334455667700ffeeddccbbaa9988",
            "7f679d90bebc24305a468d42b9d4edcd",
        );
        kat(
            EngineKind::Magma,
            "ffeeddccbbaa99887766554433221100f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff",
            "fedcba9876543210",
            "4ee901e5c2d8ca3d",
        );
    }

    #[test]
    fn rc4_keystream_and_reset() {
        let key = hex("0102030405060708090a0b0c0d0e0f10");
        let expected = hex("9ac7cc9a609d1ef7b2932899cde41b97");

        let mut engine = CipherEngine::new(EngineKind::Rc4, true, &key).unwrap();
        let mut out = [0u8; 16];
        engine.process(&[0u8; 16], &mut out).unwrap();
        assert_eq!(&out[..], &expected[..]);

        engine.process(&[0u8; 16], &mut out).unwrap();
        assert_ne!(&out[..], &expected[..]);

        engine.reset();
        engine.process(&[0u8; 16], &mut out).unwrap();
        assert_eq!(&out[..], &expected[..]);
    }

    #[test]
    fn chacha20_rfc8439_block() {
        let key = hex("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f");
        let nonce: [u8; 12] = hex("000000090000004a00000000").try_into().unwrap();
        let expected = hex(
            "10f1e7e4d13b5915500fdd1fa32071c4c7d1f4c733c068030422aa9ac3d46c4e\
             d2826446079faa0914c2d705d98b02a2b5129cd1de164eb9cbd083e8a2503c4e",
        );

        let mut engine = CipherEngine::new(EngineKind::ChaCha20, true, &key).unwrap();
        let stream = engine.as_stream().unwrap();
        stream.start(&nonce).unwrap();
        stream.seek_block(1).unwrap();
        let mut block = [0u8; 64];
        stream.apply_keystream(&mut block);
        assert_eq!(&block[..], &expected[..]);
    }

    #[test]
    fn none_passes_through() {
        let mut engine = CipherEngine::new(EngineKind::None, true, &[]).unwrap();
        let mut out = [0u8; 5];
        engine.process(b"hello", &mut out).unwrap();
        assert_eq!(&out, b"hello");
        assert!(engine.as_block().is_none());
    }

    #[test]
    fn wrong_key_length() {
        let err = CipherEngine::new(EngineKind::Aes, true, &[0u8; 20]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidKeyLength {
                expected: 16,
                actual: 20
            }
        );
        assert!(err.is_misuse());
        assert!(CipherEngine::new(EngineKind::Magma, true, &[0u8; 16]).is_err());
        assert!(CipherEngine::new(EngineKind::None, true, &[1]).is_err());
    }

    #[test]
    fn block_engine_rejects_partial_blocks() {
        let mut engine = CipherEngine::new(EngineKind::Des, true, &[1u8; 8]).unwrap();
        let mut out = [0u8; 16];
        assert!(engine.process(&[0u8; 7], &mut out).is_err());
        assert_eq!(engine.block_len(), Some(8));
    }

    #[test]
    fn key_lengths_match_block_lengths() {
        for kind in [
            EngineKind::Aes,
            EngineKind::Des,
            EngineKind::TripleDes,
            EngineKind::Idea,
            EngineKind::Rc2,
            EngineKind::Camellia,
            EngineKind::Aria,
            EngineKind::Seed,
            EngineKind::Sm4,
            EngineKind::Magma,
            EngineKind::Kuznyechik,
        ] {
            for &len in kind.key_lengths() {
                let engine = CipherEngine::new(kind, true, &vec![3u8; len]).unwrap();
                assert_eq!(engine.block_len(), kind.block_len());
            }
        }
    }
}
