//! Multilinear Galois Mode (RFC 9058) over Magma and Kuznyechik.
//!
//! Y_1 = E(0 || ICN) drives the counter (incremented in its right half),
//! Z_1 = E(1 || ICN) the MAC keys H_i = E(Z_i) (incremented in the left
//! half). The tag is E(sum H_i * block_i) truncated from the left.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::ctr::increment_be;
use super::RecordTransform;
use crate::auth::ExchangeAuthenticator;
use crate::crypto::Nonce;
use crate::engine::{BlockEngine, CipherEngine, EngineKind};
use crate::types::ContentType;
use crate::Error;

/// Multiply in GF(2^n) for n = 64 or 128, blocks read big-endian.
fn gf_mul(x: u128, y: u128, bits: u32) -> u128 {
    let (poly, mask) = if bits == 128 {
        (0x87u128, u128::MAX)
    } else {
        (0x1bu128, u64::MAX as u128)
    };
    let mut x = x;
    let mut z = 0u128;
    for i in 0..bits {
        z ^= x & ((y >> i) & 1).wrapping_neg();
        let carry = (x >> (bits - 1)) & 1;
        x = ((x << 1) & mask) ^ (poly & carry.wrapping_neg());
    }
    z
}

fn to_int(block: &[u8]) -> u128 {
    block.iter().fold(0u128, |acc, b| (acc << 8) | *b as u128)
}

fn from_int(value: u128, out: &mut [u8]) {
    let n = out.len();
    for (i, b) in out.iter_mut().enumerate() {
        *b = (value >> (8 * (n - 1 - i))) as u8;
    }
}

/// MGM authenticated encryption with a block sized nonce.
pub struct Mgm {
    engine: BlockEngine,
    tag_len: usize,
}

impl Mgm {
    /// `strong` selects a full block tag, otherwise half a block.
    pub fn new(engine: CipherEngine, strong: bool) -> Result<Self, Error> {
        let mode = if strong { "MGM_S" } else { "MGM_L" };
        match engine.kind() {
            EngineKind::Magma | EngineKind::Kuznyechik => {}
            other => return Err(Error::IncompatibleEngine(mode, other.name())),
        }
        Ok(Self::with_block(engine.into_block()?, strong))
    }

    pub(super) fn with_block(engine: BlockEngine, strong: bool) -> Self {
        let block_len = engine.block_len();
        let tag_len = if strong { block_len } else { block_len / 2 };
        Mgm { engine, tag_len }
    }

    pub fn block_len(&self) -> usize {
        self.engine.block_len()
    }

    pub fn tag_len(&self) -> usize {
        self.tag_len
    }

    /// Encrypt `data` in place and return the tag.
    pub fn seal(&self, nonce: &[u8], aad: &[u8], data: &mut [u8]) -> Result<Vec<u8>, Error> {
        let (y, z) = self.initial_blocks(nonce)?;
        self.apply_keystream(y, data);
        let mut tag = self.tag(z, aad, data);
        tag.truncate(self.tag_len);
        Ok(tag)
    }

    /// Check the tag over `aad` and the ciphertext, then decrypt in place.
    ///
    /// `data` is left untouched when the tag does not match.
    pub fn open(&self, nonce: &[u8], aad: &[u8], data: &mut [u8], tag: &[u8]) -> Result<(), Error> {
        let (y, z) = self.initial_blocks(nonce)?;
        let expected = self.tag(z, aad, data);
        if tag.len() != self.tag_len || !bool::from(expected[..self.tag_len].ct_eq(tag)) {
            return Err(Error::BadRecordMac);
        }
        self.apply_keystream(y, data);
        Ok(())
    }

    fn initial_blocks(&self, nonce: &[u8]) -> Result<(Vec<u8>, Vec<u8>), Error> {
        let block_len = self.block_len();
        if nonce.len() != block_len {
            return Err(Error::InvalidKeyLength {
                expected: block_len,
                actual: nonce.len(),
            });
        }
        let mut y = nonce.to_vec();
        y[0] &= 0x7f;
        self.engine.encrypt_block(&mut y);

        let mut z = nonce.to_vec();
        z[0] |= 0x80;
        self.engine.encrypt_block(&mut z);
        Ok((y, z))
    }

    fn apply_keystream(&self, mut y: Vec<u8>, data: &mut [u8]) {
        let block_len = self.block_len();
        let half = block_len / 2;
        let mut keystream = vec![0u8; block_len];
        for chunk in data.chunks_mut(block_len) {
            keystream.copy_from_slice(&y);
            self.engine.encrypt_block(&mut keystream);
            for (c, k) in chunk.iter_mut().zip(keystream.iter()) {
                *c ^= k;
            }
            increment_be(&mut y[half..]);
        }
    }

    /// Full block tag over the zero padded AAD and ciphertext blocks and
    /// the length block.
    fn tag(&self, mut z: Vec<u8>, aad: &[u8], ciphertext: &[u8]) -> Vec<u8> {
        let block_len = self.block_len();
        let half = block_len / 2;
        let bits = (block_len * 8) as u32;

        let mut h = Zeroizing::new(vec![0u8; block_len]);
        let mut block = vec![0u8; block_len];
        let mut acc = 0u128;

        let mut absorb = |z: &mut Vec<u8>, block: &[u8]| {
            h.copy_from_slice(z);
            self.engine.encrypt_block(&mut h);
            acc ^= gf_mul(to_int(&h), to_int(block), bits);
            increment_be(&mut z[..half]);
        };

        for chunk in aad.chunks(block_len).chain(ciphertext.chunks(block_len)) {
            block.fill(0);
            block[..chunk.len()].copy_from_slice(chunk);
            absorb(&mut z, &block);
        }

        from_int(aad.len() as u128 * 8, &mut block[..half]);
        from_int(ciphertext.len() as u128 * 8, &mut block[half..]);
        absorb(&mut z, &block);

        let mut tag = vec![0u8; block_len];
        from_int(acc, &mut tag);
        self.engine.encrypt_block(&mut tag);
        tag
    }
}

impl std::fmt::Debug for Mgm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mgm")
            .field("engine", &self.engine.kind())
            .field("tag_len", &self.tag_len)
            .finish()
    }
}

/// MGM records: ciphertext || tag, nonce = iv XOR seq.
pub(super) struct MgmMode {
    mgm: Mgm,
    iv: Zeroizing<Vec<u8>>,
}

impl MgmMode {
    pub fn new(engine: BlockEngine, iv: &[u8], strong: bool) -> Result<Self, Error> {
        let block_len = engine.block_len();
        if iv.len() != block_len {
            return Err(Error::InvalidKeyLength {
                expected: block_len,
                actual: iv.len(),
            });
        }
        Ok(MgmMode {
            mgm: Mgm::with_block(engine, strong),
            iv: Zeroizing::new(iv.to_vec()),
        })
    }
}

impl RecordTransform for MgmMode {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let nonce = Nonce::xor(&self.iv, &auth.sequence_block());
        let tag_len = self.mgm.tag_len();
        let aad = auth.aead_aad(content_type, plaintext.len(), plaintext.len() + tag_len);

        let mut out = plaintext.to_vec();
        let tag = self.mgm.seal(nonce.as_slice(), aad.as_slice(), &mut out)?;
        out.extend_from_slice(&tag);
        Ok(out)
    }

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let tag_len = self.mgm.tag_len();
        let Some(ciphertext_len) = record.len().checked_sub(tag_len) else {
            return Err(Error::RecordTooShort(record.len()));
        };
        let (ciphertext, tag) = record.split_at(ciphertext_len);
        let nonce = Nonce::xor(&self.iv, &auth.sequence_block());
        let aad = auth.aead_aad(content_type, ciphertext_len, record.len());

        let mut out = ciphertext.to_vec();
        self.mgm.open(nonce.as_slice(), aad.as_slice(), &mut out, tag)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProtocolVersion;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    const AAD: &str = "0202020202020202010101010101010104040404040404040303030303030303ea0505050505050505";
    const PLAINTEXT: &str = "1122334455667700ffeeddccbbaa998800112233445566778899aabbcceeff0a\
                             112233445566778899aabbcceeff0a002233445566778899aabbcceeff0a0011aabbcc";

    fn check(kind: EngineKind, key: &str, nonce: &str, ciphertext: &str, tag: &str) {
        let mgm = Mgm::new(CipherEngine::new(kind, true, &hex(key)).unwrap(), true).unwrap();
        let (nonce, aad) = (hex(nonce), hex(AAD));

        let mut data = hex(PLAINTEXT);
        let got = mgm.seal(&nonce, &aad, &mut data).unwrap();
        assert_eq!(data, hex(ciphertext), "{} ciphertext", kind);
        assert_eq!(got, hex(tag), "{} tag", kind);

        mgm.open(&nonce, &aad, &mut data, &got).unwrap();
        assert_eq!(data, hex(PLAINTEXT));

        let mut bad = got.clone();
        bad[0] ^= 1;
        let before = hex(ciphertext);
        let mut data = before.clone();
        assert_eq!(mgm.open(&nonce, &aad, &mut data, &bad), Err(Error::BadRecordMac));
        assert_eq!(data, before);
    }

    #[test]
    fn rfc9058_kuznyechik() {
        check(
            EngineKind::Kuznyechik,
            "8899aabbccddeeff0011223344556677fedcba98765432100123456789abcdef",
            "1122334455667700ffeeddccbbaa9988",
            "a9757b8147956e9055b8a33de89f42fc8075d2212bf9fd5bd3f7069aadc16b39\
             497ab15915a6ba85936b5d0ea9f6851cc60c14d4d3f883d0ab94420695c76deb2c7552",
            "cf5d656f40c34f5c46e8bb0e29fcdb4c",
        );
    }

    #[test]
    fn rfc9058_magma() {
        check(
            EngineKind::Magma,
            "ffeeddccbbaa99887766554433221100f0f1f2f3f4f5f6f7f8f9fafbfcfdfeff",
            "12def06b3c130a59",
            "2959e8e4b1524eb36bddddcaab5d6b2697a6885e3790e1201c8cf8303327170012d55bfba4e4a1f864af438275f6d8fef87ed4dff3c6fd5dcf22bf7825c84bc603bb9c",
            "684ca3cc05cf177c",
        );
    }

    #[test]
    fn gf_identity_and_reduction() {
        let x = 0x0123_4567_89ab_cdef_0011_2233_4455_6677u128;
        assert_eq!(gf_mul(x, 1, 128), x);
        assert_eq!(gf_mul(x, 0x55, 128), gf_mul(0x55, x, 128));
        // x^127 * x = x^128 = x^7 + x^2 + x + 1
        assert_eq!(gf_mul(1 << 127, 2, 128), 0x87);
        assert_eq!(gf_mul(1 << 63, 2, 64), 0x1b);
    }

    #[test]
    fn light_tag_is_half_a_block() {
        let key = [0x77u8; 32];
        let strong = Mgm::new(CipherEngine::new(EngineKind::Kuznyechik, true, &key).unwrap(), true)
            .unwrap();
        let light = Mgm::new(CipherEngine::new(EngineKind::Kuznyechik, true, &key).unwrap(), false)
            .unwrap();
        let nonce = [0x10u8; 16];

        let mut a = b"short".to_vec();
        let mut b = b"short".to_vec();
        let full = strong.seal(&nonce, b"aad", &mut a).unwrap();
        let half = light.seal(&nonce, b"aad", &mut b).unwrap();
        assert_eq!(a, b);
        assert_eq!(half.len(), 8);
        assert_eq!(&full[..8], &half[..]);
    }

    #[test]
    fn record_roundtrip() {
        let auth = ExchangeAuthenticator::new(ProtocolVersion::Tls1_3);
        let block = || {
            CipherEngine::new(EngineKind::Magma, true, &[0x31; 32])
                .unwrap()
                .into_block()
                .unwrap()
        };
        let mut enc = MgmMode::new(block(), &[0x42; 8], false).unwrap();
        let mut dec = MgmMode::new(block(), &[0x42; 8], false).unwrap();

        let record = enc
            .encrypt(&auth, ContentType::ApplicationData, b"gost record\x17")
            .unwrap();
        assert_eq!(record.len(), 12 + 4);
        assert_eq!(
            dec.decrypt(&auth, ContentType::ApplicationData, &record).unwrap(),
            b"gost record\x17"
        );
        assert_eq!(
            dec.decrypt(&auth, ContentType::ApplicationData, &record[..3]),
            Err(Error::RecordTooShort(3))
        );
        assert!(MgmMode::new(block(), &[0; 16], true).is_err());
    }
}
