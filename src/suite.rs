//! The cipher suite catalog.
//!
//! Each entry says which engine and mode protect records, how much keying
//! material each direction needs, and which hash drives the PRF or HKDF.
//! Ids follow the IANA TLS registry.

use std::fmt;

use crate::auth::ExchangeAuthenticator;
use crate::engine::{CipherEngine, EngineKind};
use crate::mode::{CipherMode, ModeKind};
use crate::types::{HashAlgorithm, ProtocolVersion};
use crate::Error;

/// Static description of one cipher suite.
#[derive(Debug, PartialEq, Eq)]
pub struct CipherSuiteSpec {
    pub id: u16,
    pub name: &'static str,
    pub engine: EngineKind,
    /// Key bytes taken from the key block per direction.
    pub key_len: usize,
    /// Engine key length. Differs from `key_len` only for export suites.
    pub expanded_key_len: usize,
    pub mode: ModeKind,
    /// IV bytes taken from the key block (or HKDF) per direction.
    pub fixed_iv_len: usize,
    /// Nonce bytes sent in front of each record.
    pub explicit_nonce_len: usize,
    /// AEAD tag length, 0 for MAC-then-encrypt and NULL.
    pub tag_len: usize,
    /// Record HMAC hash for non-AEAD suites.
    pub mac: Option<HashAlgorithm>,
    /// PRF hash for TLS 1.2, HKDF hash for TLS 1.3.
    pub prf_hash: HashAlgorithm,
    pub tls13: bool,
    pub export: bool,
}

impl CipherSuiteSpec {
    /// Look a suite up by its IANA id.
    pub fn lookup(id: u16) -> Result<&'static CipherSuiteSpec, Error> {
        ALL_CIPHER_SUITES
            .iter()
            .find(|s| s.id == id)
            .ok_or(Error::UnknownCipherSuite(id))
    }

    pub fn by_name(name: &str) -> Option<&'static CipherSuiteSpec> {
        ALL_CIPHER_SUITES.iter().find(|s| s.name == name)
    }

    /// Total nonce/IV length: fixed part plus explicit part.
    pub fn iv_len(&self) -> usize {
        self.fixed_iv_len + self.explicit_nonce_len
    }

    pub fn mac_len(&self) -> usize {
        self.mac.map(|h| h.output_len()).unwrap_or(0)
    }

    pub fn is_aead(&self) -> bool {
        self.mode.is_aead()
    }

    /// Key block length for TLS 1.2 and below: MAC keys, keys, IVs for
    /// both directions.
    pub fn key_block_len(&self) -> usize {
        let iv_len = if self.export { 0 } else { self.fixed_iv_len };
        2 * (self.mac_len() + self.key_len + iv_len)
    }

    /// Whether the suite may be negotiated under `version`.
    pub fn supports(&self, version: ProtocolVersion) -> bool {
        if self.tls13 {
            return version.is_tls13();
        }
        if version.is_tls13() {
            return false;
        }
        if self.export {
            return version == ProtocolVersion::Tls1_0;
        }
        // Stream ciphers can't be used over datagrams.
        if self.mode == ModeKind::Stream && version.is_dtls() {
            return false;
        }
        let needs_tls12 = self.is_aead()
            || self.mode == ModeKind::CntImit
            || self.prf_hash != HashAlgorithm::SHA256
            || matches!(self.mac, Some(HashAlgorithm::SHA256 | HashAlgorithm::SHA384));
        !needs_tls12 || version.prf_family() == crate::types::PrfFamily::Tls12
    }

    /// Build the record transform for one direction from its keys.
    ///
    /// `key` must already be the final engine key (export keys expanded).
    pub fn cipher_mode(
        &self,
        version: ProtocolVersion,
        for_encryption: bool,
        key: &[u8],
        mac_key: &[u8],
        iv: &[u8],
    ) -> Result<CipherMode, Error> {
        if !self.supports(version) {
            return Err(Error::UnsupportedVersion(version));
        }
        let engine = CipherEngine::new(self.engine, for_encryption, key)?;
        let auth = match self.mac {
            Some(hash) => ExchangeAuthenticator::with_mac(version, hash, mac_key)?,
            None => ExchangeAuthenticator::new(version),
        };
        CipherMode::new(self.mode, engine, auth, iv, self.explicit_nonce_len)
    }
}

impl fmt::Display for CipherSuiteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06x})", self.name, self.id)
    }
}

const fn base(id: u16, name: &'static str, engine: EngineKind, key_len: usize, mode: ModeKind) -> CipherSuiteSpec {
    CipherSuiteSpec {
        id,
        name,
        engine,
        key_len,
        expanded_key_len: key_len,
        mode,
        fixed_iv_len: 0,
        explicit_nonce_len: 0,
        tag_len: 0,
        mac: None,
        prf_hash: HashAlgorithm::SHA256,
        tls13: false,
        export: false,
    }
}

const fn null(id: u16, name: &'static str, mac: Option<HashAlgorithm>) -> CipherSuiteSpec {
    CipherSuiteSpec {
        mac,
        ..base(id, name, EngineKind::None, 0, ModeKind::Null)
    }
}

const fn rc4(id: u16, name: &'static str, mac: HashAlgorithm, export: bool) -> CipherSuiteSpec {
    CipherSuiteSpec {
        key_len: if export { 5 } else { 16 },
        expanded_key_len: 16,
        mac: Some(mac),
        export,
        ..base(id, name, EngineKind::Rc4, 16, ModeKind::Stream)
    }
}

const fn cbc(
    id: u16,
    name: &'static str,
    engine: EngineKind,
    key_len: usize,
    block_len: usize,
    mac: HashAlgorithm,
) -> CipherSuiteSpec {
    CipherSuiteSpec {
        fixed_iv_len: block_len,
        mac: Some(mac),
        prf_hash: if matches!(mac, HashAlgorithm::SHA384) {
            HashAlgorithm::SHA384
        } else {
            HashAlgorithm::SHA256
        },
        ..base(id, name, engine, key_len, ModeKind::Cbc)
    }
}

const fn export_cbc(id: u16, name: &'static str, engine: EngineKind, expanded_key_len: usize, mac: HashAlgorithm) -> CipherSuiteSpec {
    CipherSuiteSpec {
        key_len: 5,
        expanded_key_len,
        export: true,
        ..cbc(id, name, engine, 5, 8, mac)
    }
}

/// TLS 1.2 GCM/CCM: 4 byte salt from the key block, 8 byte explicit nonce.
const fn aead12(
    id: u16,
    name: &'static str,
    engine: EngineKind,
    key_len: usize,
    mode: ModeKind,
    prf_hash: HashAlgorithm,
) -> CipherSuiteSpec {
    CipherSuiteSpec {
        fixed_iv_len: 4,
        explicit_nonce_len: 8,
        tag_len: if matches!(mode, ModeKind::Ccm8) { 8 } else { 16 },
        prf_hash,
        ..base(id, name, engine, key_len, mode)
    }
}

const fn chacha12(id: u16, name: &'static str) -> CipherSuiteSpec {
    CipherSuiteSpec {
        fixed_iv_len: 12,
        tag_len: 16,
        ..base(id, name, EngineKind::ChaCha20, 32, ModeKind::ChaCha20Poly1305)
    }
}

const fn tls13(
    id: u16,
    name: &'static str,
    engine: EngineKind,
    key_len: usize,
    mode: ModeKind,
    iv_len: usize,
    tag_len: usize,
    prf_hash: HashAlgorithm,
) -> CipherSuiteSpec {
    CipherSuiteSpec {
        fixed_iv_len: iv_len,
        tag_len,
        prf_hash,
        tls13: true,
        ..base(id, name, engine, key_len, mode)
    }
}

/// GOST R 34.12 counter mode with OMAC (RFC 9189). The IV is half a block.
const fn gost_ctr_omac(id: u16, name: &'static str, engine: EngineKind, block_len: usize) -> CipherSuiteSpec {
    CipherSuiteSpec {
        fixed_iv_len: block_len / 2,
        prf_hash: HashAlgorithm::STREEBOG256,
        ..base(id, name, engine, 32, ModeKind::CntImit)
    }
}

const fn gost_mgm(id: u16, name: &'static str, engine: EngineKind, block_len: usize, strong: bool) -> CipherSuiteSpec {
    let (mode, tag_len) = if strong {
        (ModeKind::MgmStrong, block_len)
    } else {
        (ModeKind::MgmLight, block_len / 2)
    };
    tls13(id, name, engine, 32, mode, block_len, tag_len, HashAlgorithm::STREEBOG256)
}

use EngineKind::{Aes, Aria, Camellia, Des, Idea, Kuznyechik, Magma, Rc2, Seed, Sm4, TripleDes};
use HashAlgorithm::{MD5, SHA1, SHA256, SHA384, SM3};

pub static TLS_NULL_WITH_NULL_NULL: CipherSuiteSpec = null(0x0000, "TLS_NULL_WITH_NULL_NULL", None);

/// Every suite this crate can protect records for, in IANA id order
/// within each family.
pub static ALL_CIPHER_SUITES: &[CipherSuiteSpec] = &[
    null(0x0000, "TLS_NULL_WITH_NULL_NULL", None),
    null(0x0001, "TLS_RSA_WITH_NULL_MD5", Some(MD5)),
    null(0x0002, "TLS_RSA_WITH_NULL_SHA", Some(SHA1)),
    null(0x003B, "TLS_RSA_WITH_NULL_SHA256", Some(SHA256)),
    // RC4
    rc4(0x0003, "TLS_RSA_EXPORT_WITH_RC4_40_MD5", MD5, true),
    rc4(0x0004, "TLS_RSA_WITH_RC4_128_MD5", MD5, false),
    rc4(0x0005, "TLS_RSA_WITH_RC4_128_SHA", SHA1, false),
    // Legacy block ciphers
    export_cbc(0x0006, "TLS_RSA_EXPORT_WITH_RC2_CBC_40_MD5", Rc2, 16, MD5),
    cbc(0x0007, "TLS_RSA_WITH_IDEA_CBC_SHA", Idea, 16, 8, SHA1),
    export_cbc(0x0008, "TLS_RSA_EXPORT_WITH_DES40_CBC_SHA", Des, 8, SHA1),
    cbc(0x0009, "TLS_RSA_WITH_DES_CBC_SHA", Des, 8, 8, SHA1),
    cbc(0x000A, "TLS_RSA_WITH_3DES_EDE_CBC_SHA", TripleDes, 24, 8, SHA1),
    cbc(0x0096, "TLS_RSA_WITH_SEED_CBC_SHA", Seed, 16, 16, SHA1),
    // AES-CBC
    cbc(0x002F, "TLS_RSA_WITH_AES_128_CBC_SHA", Aes, 16, 16, SHA1),
    cbc(0x0035, "TLS_RSA_WITH_AES_256_CBC_SHA", Aes, 32, 16, SHA1),
    cbc(0x003C, "TLS_RSA_WITH_AES_128_CBC_SHA256", Aes, 16, 16, SHA256),
    cbc(0x003D, "TLS_RSA_WITH_AES_256_CBC_SHA256", Aes, 32, 16, SHA256),
    cbc(0xC009, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA", Aes, 16, 16, SHA1),
    cbc(0xC00A, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA", Aes, 32, 16, SHA1),
    cbc(0xC013, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA", Aes, 16, 16, SHA1),
    cbc(0xC014, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA", Aes, 32, 16, SHA1),
    cbc(0xC023, "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256", Aes, 16, 16, SHA256),
    cbc(0xC024, "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384", Aes, 32, 16, SHA384),
    cbc(0xC027, "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256", Aes, 16, 16, SHA256),
    cbc(0xC028, "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384", Aes, 32, 16, SHA384),
    // AES-GCM
    aead12(0x009C, "TLS_RSA_WITH_AES_128_GCM_SHA256", Aes, 16, ModeKind::Gcm, SHA256),
    aead12(0x009D, "TLS_RSA_WITH_AES_256_GCM_SHA384", Aes, 32, ModeKind::Gcm, SHA384),
    aead12(0xC02B, "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256", Aes, 16, ModeKind::Gcm, SHA256),
    aead12(0xC02C, "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384", Aes, 32, ModeKind::Gcm, SHA384),
    aead12(0xC02F, "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256", Aes, 16, ModeKind::Gcm, SHA256),
    aead12(0xC030, "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384", Aes, 32, ModeKind::Gcm, SHA384),
    // AES-CCM
    aead12(0xC09C, "TLS_RSA_WITH_AES_128_CCM", Aes, 16, ModeKind::Ccm, SHA256),
    aead12(0xC09D, "TLS_RSA_WITH_AES_256_CCM", Aes, 32, ModeKind::Ccm, SHA256),
    aead12(0xC0A0, "TLS_RSA_WITH_AES_128_CCM_8", Aes, 16, ModeKind::Ccm8, SHA256),
    aead12(0xC0A1, "TLS_RSA_WITH_AES_256_CCM_8", Aes, 32, ModeKind::Ccm8, SHA256),
    aead12(0xC0AC, "TLS_ECDHE_ECDSA_WITH_AES_128_CCM", Aes, 16, ModeKind::Ccm, SHA256),
    aead12(0xC0AE, "TLS_ECDHE_ECDSA_WITH_AES_128_CCM_8", Aes, 16, ModeKind::Ccm8, SHA256),
    // Camellia
    cbc(0x0041, "TLS_RSA_WITH_CAMELLIA_128_CBC_SHA", Camellia, 16, 16, SHA1),
    cbc(0x0084, "TLS_RSA_WITH_CAMELLIA_256_CBC_SHA", Camellia, 32, 16, SHA1),
    cbc(0x00BA, "TLS_RSA_WITH_CAMELLIA_128_CBC_SHA256", Camellia, 16, 16, SHA256),
    cbc(0x00C0, "TLS_RSA_WITH_CAMELLIA_256_CBC_SHA256", Camellia, 32, 16, SHA256),
    aead12(0xC07A, "TLS_RSA_WITH_CAMELLIA_128_GCM_SHA256", Camellia, 16, ModeKind::Gcm, SHA256),
    aead12(0xC07B, "TLS_RSA_WITH_CAMELLIA_256_GCM_SHA384", Camellia, 32, ModeKind::Gcm, SHA384),
    // ARIA
    cbc(0xC03C, "TLS_RSA_WITH_ARIA_128_CBC_SHA256", Aria, 16, 16, SHA256),
    cbc(0xC03D, "TLS_RSA_WITH_ARIA_256_CBC_SHA384", Aria, 32, 16, SHA384),
    aead12(0xC050, "TLS_RSA_WITH_ARIA_128_GCM_SHA256", Aria, 16, ModeKind::Gcm, SHA256),
    aead12(0xC051, "TLS_RSA_WITH_ARIA_256_GCM_SHA384", Aria, 32, ModeKind::Gcm, SHA384),
    // ChaCha20-Poly1305 (RFC 7905)
    chacha12(0xCCA8, "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256"),
    chacha12(0xCCA9, "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256"),
    // GOST, TLS 1.2 (RFC 9189)
    gost_ctr_omac(0xC100, "TLS_GOSTR341112_256_WITH_KUZNYECHIK_CTR_OMAC", Kuznyechik, 16),
    gost_ctr_omac(0xC101, "TLS_GOSTR341112_256_WITH_MAGMA_CTR_OMAC", Magma, 8),
    // TLS 1.3
    tls13(0x1301, "TLS_AES_128_GCM_SHA256", Aes, 16, ModeKind::Gcm, 12, 16, SHA256),
    tls13(0x1302, "TLS_AES_256_GCM_SHA384", Aes, 32, ModeKind::Gcm, 12, 16, SHA384),
    tls13(0x1303, "TLS_CHACHA20_POLY1305_SHA256", EngineKind::ChaCha20, 32, ModeKind::ChaCha20Poly1305, 12, 16, SHA256),
    tls13(0x1304, "TLS_AES_128_CCM_SHA256", Aes, 16, ModeKind::Ccm, 12, 16, SHA256),
    tls13(0x1305, "TLS_AES_128_CCM_8_SHA256", Aes, 16, ModeKind::Ccm8, 12, 8, SHA256),
    tls13(0x00C6, "TLS_SM4_GCM_SM3", Sm4, 16, ModeKind::Gcm, 12, 16, SM3),
    tls13(0x00C7, "TLS_SM4_CCM_SM3", Sm4, 16, ModeKind::Ccm, 12, 16, SM3),
    // GOST, TLS 1.3 (RFC 9367)
    gost_mgm(0xC103, "TLS_GOSTR341112_256_WITH_KUZNYECHIK_MGM_L", Kuznyechik, 16, false),
    gost_mgm(0xC104, "TLS_GOSTR341112_256_WITH_MAGMA_MGM_L", Magma, 8, false),
    gost_mgm(0xC105, "TLS_GOSTR341112_256_WITH_KUZNYECHIK_MGM_S", Kuznyechik, 16, true),
    gost_mgm(0xC106, "TLS_GOSTR341112_256_WITH_MAGMA_MGM_S", Magma, 8, true),
];
