//! HMAC over the supported hash functions.

use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384};
use sm3::Sm3;
use streebog::Streebog256;
use subtle::ConstantTimeEq;

use crate::types::HashAlgorithm;
use crate::Error;

fn compute<M: Mac + hmac::digest::KeyInit>(key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>, Error> {
    let mut mac = <M as hmac::digest::KeyInit>::new_from_slice(key).map_err(|_| {
        Error::InvalidKeyLength {
            expected: 0,
            actual: key.len(),
        }
    })?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC_hash(key, parts[0] || parts[1] || ...).
pub fn hmac(hash: HashAlgorithm, key: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>, Error> {
    match hash {
        HashAlgorithm::MD5 => compute::<Hmac<Md5>>(key, parts),
        HashAlgorithm::SHA1 => compute::<Hmac<Sha1>>(key, parts),
        HashAlgorithm::SHA256 => compute::<Hmac<Sha256>>(key, parts),
        HashAlgorithm::SHA384 => compute::<Hmac<Sha384>>(key, parts),
        HashAlgorithm::SM3 => compute::<Hmac<Sm3>>(key, parts),
        HashAlgorithm::STREEBOG256 => compute::<Hmac<Streebog256>>(key, parts),
    }
}

/// Recompute the HMAC and compare it against `tag` in constant time.
pub fn verify(
    hash: HashAlgorithm,
    key: &[u8],
    parts: &[&[u8]],
    tag: &[u8],
) -> Result<(), Error> {
    let expected = hmac(hash, key, parts)?;
    if bool::from(expected.as_slice().ct_eq(tag)) {
        Ok(())
    } else {
        Err(Error::BadRecordMac)
    }
}
