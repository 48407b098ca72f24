//! GCM and CCM records over any 128-bit block engine.
//!
//! TLS 1.2: fragment = explicit_nonce(8) || ciphertext || tag
//! TLS 1.3: fragment = ciphertext || tag, nonce = iv XOR seq

use aes_gcm::aead::generic_array::typenum::Unsigned;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadCore, AeadInPlace};
use aes_gcm::AesGcm;
use ccm::consts::{U12, U16, U8};
use ccm::Ccm;

use super::{NonceLayout, RecordTransform};
use crate::auth::ExchangeAuthenticator;
use crate::engine::BlockEngine;
use crate::types::ContentType;
use crate::Error;

/// Dispatch over the engines with a 16 byte block that the AEAD crates
/// accept as their inner cipher.
macro_rules! wide_block_cipher {
    ($engine:expr, $mode:expr, $c:ident => $body:expr) => {
        match $engine {
            BlockEngine::Aes128($c) => $body,
            BlockEngine::Aes192($c) => $body,
            BlockEngine::Aes256($c) => $body,
            BlockEngine::Camellia128($c) => $body,
            BlockEngine::Camellia192($c) => $body,
            BlockEngine::Camellia256($c) => $body,
            BlockEngine::Aria128($c) => $body,
            BlockEngine::Aria192($c) => $body,
            BlockEngine::Aria256($c) => $body,
            BlockEngine::Sm4($c) => $body,
            BlockEngine::Kuznyechik($c) => $body,
            other => return Err(Error::IncompatibleEngine($mode, other.kind().name())),
        }
    };
}

pub(super) fn gcm(
    engine: BlockEngine,
    nonce: NonceLayout,
) -> Result<Box<dyn RecordTransform>, Error> {
    wide_block_cipher!(engine, "GCM", c => AeadMode::boxed(AesGcm::<_, U12>::from(*c), nonce, "GCM"))
}

pub(super) fn ccm(
    engine: BlockEngine,
    nonce: NonceLayout,
    tag_len: usize,
) -> Result<Box<dyn RecordTransform>, Error> {
    let mode = if tag_len == 8 { "CCM_8" } else { "CCM" };
    if tag_len == 8 {
        wide_block_cipher!(engine, mode, c => AeadMode::boxed(Ccm::<_, U8, U12>::from(*c), nonce, mode))
    } else {
        wide_block_cipher!(engine, mode, c => AeadMode::boxed(Ccm::<_, U16, U12>::from(*c), nonce, mode))
    }
}

struct AeadMode<A> {
    cipher: A,
    nonce: NonceLayout,
}

impl<A: AeadInPlace + Send + 'static> AeadMode<A> {
    fn boxed(
        cipher: A,
        nonce: NonceLayout,
        mode: &'static str,
    ) -> Result<Box<dyn RecordTransform>, Error> {
        let expected = A::NonceSize::USIZE;
        if nonce.nonce_len() != expected {
            debug!("{} needs a {} byte nonce, got {}", mode, expected, nonce.nonce_len());
            return Err(Error::InvalidKeyLength {
                expected,
                actual: nonce.nonce_len(),
            });
        }
        Ok(Box::new(AeadMode { cipher, nonce }))
    }
}

impl<A: AeadInPlace + Send> RecordTransform for AeadMode<A> {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let seq = auth.sequence_block();
        let (nonce, explicit) = self.nonce.sending(&seq);
        let tag_len = <A as AeadCore>::TagSize::USIZE;

        let record_len = explicit.len() + plaintext.len() + tag_len;
        let aad = auth.aead_aad(content_type, plaintext.len(), record_len);

        let mut out = Vec::with_capacity(record_len);
        out.extend_from_slice(explicit);
        out.extend_from_slice(plaintext);

        let tag = self
            .cipher
            .encrypt_in_place_detached(
                GenericArray::from_slice(nonce.as_slice()),
                aad.as_slice(),
                &mut out[explicit.len()..],
            )
            .map_err(|_| Error::UnsupportedOperation("AEAD seal"))?;
        out.extend_from_slice(&tag);
        Ok(out)
    }

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let seq = auth.sequence_block();
        let (nonce, body) = self.nonce.receiving(&seq, record)?;
        let tag_len = <A as AeadCore>::TagSize::USIZE;

        let Some(ciphertext_len) = body.len().checked_sub(tag_len) else {
            return Err(Error::RecordTooShort(record.len()));
        };
        let (ciphertext, tag) = body.split_at(ciphertext_len);
        let aad = auth.aead_aad(content_type, ciphertext_len, body.len());

        let mut plaintext = ciphertext.to_vec();
        self.cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(nonce.as_slice()),
                aad.as_slice(),
                &mut plaintext,
                GenericArray::from_slice(tag),
            )
            .map_err(|_| Error::BadRecordMac)?;
        Ok(plaintext)
    }
}
