use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384};
use sm3::Sm3;
use streebog::Streebog256;

use crate::types::HashAlgorithm;

/// A running hash context over one of the supported algorithms.
#[derive(Clone)]
pub enum Hash {
    Md5(Md5),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha384(Sha384),
    Sm3(Sm3),
    Streebog256(Streebog256),
}

impl Hash {
    /// Create a new hash context with the specified algorithm
    pub fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::MD5 => Hash::Md5(Md5::new()),
            HashAlgorithm::SHA1 => Hash::Sha1(Sha1::new()),
            HashAlgorithm::SHA256 => Hash::Sha256(Sha256::new()),
            HashAlgorithm::SHA384 => Hash::Sha384(Sha384::new()),
            HashAlgorithm::SM3 => Hash::Sm3(Sm3::new()),
            HashAlgorithm::STREEBOG256 => Hash::Streebog256(Streebog256::new()),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        match self {
            Hash::Md5(_) => HashAlgorithm::MD5,
            Hash::Sha1(_) => HashAlgorithm::SHA1,
            Hash::Sha256(_) => HashAlgorithm::SHA256,
            Hash::Sha384(_) => HashAlgorithm::SHA384,
            Hash::Sm3(_) => HashAlgorithm::SM3,
            Hash::Streebog256(_) => HashAlgorithm::STREEBOG256,
        }
    }

    /// Update the hash with new data
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hash::Md5(hasher) => hasher.update(data),
            Hash::Sha1(hasher) => hasher.update(data),
            Hash::Sha256(hasher) => hasher.update(data),
            Hash::Sha384(hasher) => hasher.update(data),
            Hash::Sm3(hasher) => hasher.update(data),
            Hash::Streebog256(hasher) => hasher.update(data),
        }
    }

    /// Finalize the hash and return the result. This clones the state, so
    /// it is possible to continue the hashing.
    pub fn clone_and_finalize(&self) -> Vec<u8> {
        match self {
            Hash::Md5(hasher) => hasher.clone().finalize().to_vec(),
            Hash::Sha1(hasher) => hasher.clone().finalize().to_vec(),
            Hash::Sha256(hasher) => hasher.clone().finalize().to_vec(),
            Hash::Sha384(hasher) => hasher.clone().finalize().to_vec(),
            Hash::Sm3(hasher) => hasher.clone().finalize().to_vec(),
            Hash::Streebog256(hasher) => hasher.clone().finalize().to_vec(),
        }
    }
}

/// One-shot digest.
pub fn digest(algorithm: HashAlgorithm, data: &[u8]) -> Vec<u8> {
    let mut hash = Hash::new(algorithm);
    hash.update(data);
    hash.clone_and_finalize()
}

/// Digest of the empty string, the context of every "derived" step in the
/// TLS 1.3 key schedule.
pub fn empty_digest(algorithm: HashAlgorithm) -> Vec<u8> {
    digest(algorithm, &[])
}
