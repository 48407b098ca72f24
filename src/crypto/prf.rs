use zeroize::Zeroizing;

use super::hmac::hmac;
use crate::types::HashAlgorithm;
use crate::Error;

/// PRF for TLS 1.2
/// as specified in RFC 5246 Section 5.
///
/// PRF(secret, label, seed) = P_<hash>(secret, label + seed)
///
/// NOTE: The seed parameter here is the actual seed data WITHOUT the label.
/// The label will be prepended to form the full seed used in the PRF calculation.
pub fn prf_tls12(
    secret: &[u8],
    label: &str,
    seed: &[u8],
    output_len: usize,
    hash: HashAlgorithm,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let full_seed = compute_full_seed(label, seed);
    p_hash(hash, secret, &full_seed, output_len)
}

/// PRF for TLS 1.0 and 1.1
/// as specified in RFC 2246 Section 5.
///
/// PRF(secret, label, seed) = P_MD5(S1, label + seed) XOR P_SHA-1(S2, label + seed)
///
/// S1 and S2 are the two halves of the secret. With an odd length the middle
/// byte belongs to both.
pub fn prf_tls10(
    secret: &[u8],
    label: &str,
    seed: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let full_seed = compute_full_seed(label, seed);

    let half = secret.len().div_ceil(2);
    let s1 = &secret[..half];
    let s2 = &secret[secret.len() - half..];

    let mut out = p_hash(HashAlgorithm::MD5, s1, &full_seed, output_len)?;
    let sha = p_hash(HashAlgorithm::SHA1, s2, &full_seed, output_len)?;
    for (o, s) in out.iter_mut().zip(sha.iter()) {
        *o ^= s;
    }

    Ok(out)
}

fn compute_full_seed(label: &str, seed: &[u8]) -> Vec<u8> {
    debug_assert!(label.is_ascii());
    let mut full_seed = Vec::with_capacity(label.len() + seed.len());
    full_seed.extend_from_slice(label.as_bytes());
    full_seed.extend_from_slice(seed);
    full_seed
}

fn p_hash(
    hash: HashAlgorithm,
    secret: &[u8],
    full_seed: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let mut result = Zeroizing::new(Vec::with_capacity(output_len));

    // A(1) = HMAC_hash(secret, A(0)) where A(0) = seed
    let mut a = Zeroizing::new(hmac(hash, secret, &[full_seed])?);

    while result.len() < output_len {
        // HMAC_hash(secret, A(i) + seed)
        let output = Zeroizing::new(hmac(hash, secret, &[&a[..], full_seed])?);

        let remaining = output_len - result.len();
        let to_copy = std::cmp::min(remaining, output.len());
        result.extend_from_slice(&output[..to_copy]);

        if result.len() < output_len {
            // A(i+1) = HMAC_hash(secret, A(i))
            a = Zeroizing::new(hmac(hash, secret, &[&a[..]])?);
        }
    }

    Ok(result)
}
