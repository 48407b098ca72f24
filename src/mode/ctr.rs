//! Counter mode, MAC-then-encrypt.
//!
//! Record fragment = explicit_nonce || (content || MAC) XOR keystream
//!
//! The initial counter block is fixed IV || explicit nonce and is
//! incremented as one big-endian integer.

use super::{NonceLayout, RecordTransform};
use crate::auth::ExchangeAuthenticator;
use crate::engine::BlockEngine;
use crate::types::ContentType;
use crate::Error;

pub(super) struct CtrMode {
    engine: BlockEngine,
    nonce: NonceLayout,
}

impl CtrMode {
    pub fn new(engine: BlockEngine, nonce: NonceLayout) -> Result<Self, Error> {
        let block_len = engine.block_len();
        if nonce.nonce_len() != block_len {
            return Err(Error::InvalidKeyLength {
                expected: block_len,
                actual: nonce.nonce_len(),
            });
        }
        Ok(CtrMode { engine, nonce })
    }

    fn apply_keystream(&self, counter: &[u8], data: &mut [u8]) {
        let block_len = self.engine.block_len();
        let mut counter = counter.to_vec();
        let mut keystream = vec![0u8; block_len];
        for chunk in data.chunks_mut(block_len) {
            keystream.copy_from_slice(&counter);
            self.engine.encrypt_block(&mut keystream);
            for (c, k) in chunk.iter_mut().zip(keystream.iter()) {
                *c ^= k;
            }
            increment_be(&mut counter);
        }
    }
}

/// Add one to the block read as a big-endian integer, wrapping.
pub(super) fn increment_be(block: &mut [u8]) {
    for b in block.iter_mut().rev() {
        let (v, carry) = b.overflowing_add(1);
        *b = v;
        if !carry {
            break;
        }
    }
}

impl RecordTransform for CtrMode {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let seq = auth.sequence_block();
        let (counter, explicit) = self.nonce.sending(&seq);
        let mac = auth.compute_mac(content_type, plaintext)?;

        let mut out = Vec::with_capacity(explicit.len() + plaintext.len() + mac.len());
        out.extend_from_slice(explicit);
        out.extend_from_slice(plaintext);
        out.extend_from_slice(&mac);

        self.apply_keystream(counter.as_slice(), &mut out[explicit.len()..]);
        Ok(out)
    }

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let seq = auth.sequence_block();
        let (counter, body) = self.nonce.receiving(&seq, record)?;

        let mut decrypted = body.to_vec();
        self.apply_keystream(counter.as_slice(), &mut decrypted);

        let content_len = auth.check_stream_mac(content_type, &decrypted)?;
        decrypted.truncate(content_len);
        Ok(decrypted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CipherEngine, EngineKind};
    use crate::types::{HashAlgorithm, ProtocolVersion};

    fn engine(kind: EngineKind, key_len: usize) -> BlockEngine {
        CipherEngine::new(kind, true, &vec![0x24; key_len])
            .unwrap()
            .into_block()
            .unwrap()
    }

    #[test]
    fn counter_wraps_big_endian() {
        let mut block = [0u8, 0, 0xff, 0xff];
        increment_be(&mut block);
        assert_eq!(block, [0, 1, 0, 0]);

        let mut block = [0xffu8; 4];
        increment_be(&mut block);
        assert_eq!(block, [0; 4]);
    }

    #[test]
    fn keystream_is_block_encrypted_counter() {
        let aes = engine(EngineKind::Aes, 16);
        let mode = CtrMode::new(engine(EngineKind::Aes, 16), NonceLayout::new(&[1; 8], 8).unwrap()).unwrap();

        let counter = [7u8; 16];
        let mut data = [0u8; 20];
        mode.apply_keystream(&counter, &mut data);

        let mut first = counter;
        aes.encrypt_block(&mut first);
        assert_eq!(&data[..16], &first[..]);

        let mut second = counter;
        increment_be(&mut second);
        aes.encrypt_block(&mut second);
        assert_eq!(&data[16..], &second[..4]);
    }

    #[test]
    fn roundtrip_with_mac() {
        let auth =
            ExchangeAuthenticator::with_mac(ProtocolVersion::Tls1_2, HashAlgorithm::SHA256, &[9; 32])
                .unwrap();
        for (kind, key_len, fixed_len, explicit_len) in [
            (EngineKind::Aes, 16, 8, 8),
            (EngineKind::Kuznyechik, 32, 8, 8),
            (EngineKind::Magma, 32, 4, 4),
        ] {
            let layout = || NonceLayout::new(&vec![3; fixed_len], explicit_len).unwrap();
            let mut enc = CtrMode::new(engine(kind, key_len), layout()).unwrap();
            let mut dec = CtrMode::new(engine(kind, key_len), layout()).unwrap();

            let record = enc
                .encrypt(&auth, ContentType::ApplicationData, b"counter mode")
                .unwrap();
            assert_eq!(record.len(), explicit_len + 12 + 32);
            assert_eq!(
                dec.decrypt(&auth, ContentType::ApplicationData, &record).unwrap(),
                b"counter mode"
            );

            let mut tampered = record.clone();
            let last = tampered.len() - 1;
            tampered[last] ^= 1;
            assert_eq!(
                dec.decrypt(&auth, ContentType::ApplicationData, &tampered),
                Err(Error::BadRecordMac)
            );
        }
    }

    #[test]
    fn nonce_must_fill_a_block() {
        assert!(CtrMode::new(engine(EngineKind::Aes, 16), NonceLayout::new(&[0; 4], 8).unwrap()).is_err());
    }
}
