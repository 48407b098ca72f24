//! CBC MAC-then-encrypt records (RFC 5246 Section 6.2.3.2).
//!
//! Record fragment = [explicit_IV] || encrypted(content || MAC || padding)
//!
//! TLS 1.0 has no explicit IV; the last ciphertext block of the previous
//! record chains into the next.

use rand::rngs::OsRng;
use rand::RngCore;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};
use zeroize::Zeroizing;

use super::RecordTransform;
use crate::auth::ExchangeAuthenticator;
use crate::engine::BlockEngine;
use crate::types::ContentType;
use crate::Error;

/// Append TLS padding: `n + 1` bytes of value `n` up to the block boundary.
pub fn add_padding(buf: &mut Vec<u8>, block_len: usize) {
    let padding_length = (block_len - ((buf.len() + 1) % block_len)) % block_len;
    buf.resize(buf.len() + padding_length + 1, padding_length as u8);
}

/// Check TLS padding and return the unpadded length.
///
/// All of the last 256 bytes (or the whole buffer) are inspected whatever
/// the claimed padding length is. The returned length is only valid when
/// the choice is set.
pub fn check_padding(buf: &[u8]) -> (Choice, usize) {
    let Some(&last) = buf.last() else {
        return (Choice::from(0), 0);
    };
    let padding_length = last as usize;

    let fits = Choice::from((padding_length < buf.len()) as u8);
    let mut ok = fits;

    let window = buf.len().min(256);
    for i in 0..window {
        let b = buf[buf.len() - 1 - i];
        let in_padding = !(i as u8).ct_gt(&last);
        ok &= !in_padding | b.ct_eq(&last);
    }

    let candidate = buf.len().saturating_sub(padding_length + 1) as u64;
    let fallback = buf.len().saturating_sub(1) as u64;
    let len = u64::conditional_select(&fallback, &candidate, ok);
    (ok, len as usize)
}

pub(super) struct CbcMode {
    engine: BlockEngine,
    explicit_iv: bool,
    initial_iv: Zeroizing<Vec<u8>>,
    chain: Vec<u8>,
}

impl CbcMode {
    pub fn new(engine: BlockEngine, iv: &[u8], explicit_iv: bool) -> Result<Self, Error> {
        let block_len = engine.block_len();
        // The key block IV only seeds TLS 1.0 chaining.
        let initial_iv = if explicit_iv && iv.is_empty() {
            vec![0u8; block_len]
        } else {
            iv.to_vec()
        };
        if initial_iv.len() != block_len {
            return Err(Error::InvalidKeyLength {
                expected: block_len,
                actual: iv.len(),
            });
        }
        Ok(CbcMode {
            engine,
            explicit_iv,
            chain: initial_iv.clone(),
            initial_iv: Zeroizing::new(initial_iv),
        })
    }

    fn encrypt_blocks(&self, iv: &[u8], data: &mut [u8]) {
        let block_len = self.engine.block_len();
        let mut prev = iv.to_vec();
        for chunk in data.chunks_mut(block_len) {
            for (c, p) in chunk.iter_mut().zip(prev.iter()) {
                *c ^= p;
            }
            self.engine.encrypt_block(chunk);
            prev.copy_from_slice(chunk);
        }
    }

    fn decrypt_blocks(&self, iv: &[u8], data: &mut [u8]) {
        let block_len = self.engine.block_len();
        let mut prev = iv.to_vec();
        let mut saved = vec![0u8; block_len];
        for chunk in data.chunks_mut(block_len) {
            saved.copy_from_slice(chunk);
            self.engine.decrypt_block(chunk);
            for (c, p) in chunk.iter_mut().zip(prev.iter()) {
                *c ^= p;
            }
            std::mem::swap(&mut prev, &mut saved);
        }
    }
}

impl RecordTransform for CbcMode {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let block_len = self.engine.block_len();
        let mac = auth.compute_mac(content_type, plaintext)?;

        let iv_len = if self.explicit_iv { block_len } else { 0 };
        let mut out = vec![0u8; iv_len];
        out.extend_from_slice(plaintext);
        out.extend_from_slice(&mac);

        let mut body = out.split_off(iv_len);
        add_padding(&mut body, block_len);

        if self.explicit_iv {
            OsRng.fill_bytes(&mut out);
            self.encrypt_blocks(&out, &mut body);
        } else {
            let iv = std::mem::take(&mut self.chain);
            self.encrypt_blocks(&iv, &mut body);
            self.chain = body[body.len() - block_len..].to_vec();
        }

        out.extend_from_slice(&body);
        Ok(out)
    }

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let block_len = self.engine.block_len();
        let mac_len = auth.mac_len();

        let (iv, body) = if self.explicit_iv {
            if record.len() < block_len {
                return Err(Error::RecordTooShort(record.len()));
            }
            let (iv, body) = record.split_at(block_len);
            (iv.to_vec(), body)
        } else {
            (self.chain.clone(), record)
        };

        let min_len = (mac_len + 1).div_ceil(block_len) * block_len;
        if body.len() < min_len {
            return Err(Error::RecordTooShort(record.len()));
        }
        if body.len() % block_len != 0 {
            return Err(Error::BadRecordMac);
        }

        if !self.explicit_iv {
            self.chain = body[body.len() - block_len..].to_vec();
        }

        let mut decrypted = body.to_vec();
        self.decrypt_blocks(&iv, &mut decrypted);

        let (padding_ok, unpadded_len) = check_padding(&decrypted);
        let content_len = unpadded_len.saturating_sub(mac_len);

        auth.check_cbc_mac(content_type, &decrypted, content_len, padding_ok)?;

        decrypted.truncate(content_len);
        Ok(decrypted)
    }

    fn reset(&mut self) {
        self.chain = self.initial_iv.to_vec();
    }
}
