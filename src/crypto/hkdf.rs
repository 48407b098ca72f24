//! HKDF for the TLS 1.3 key schedule (RFC 5869, RFC 8446 Section 7.1).

use hkdf::Hkdf;
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha256, Sha384};
use sm3::Sm3;
use streebog::Streebog256;
use zeroize::Zeroizing;

use crate::types::HashAlgorithm;
use crate::Error;

macro_rules! with_hkdf {
    ($hash:expr, $d:ident => $body:expr) => {
        match $hash {
            HashAlgorithm::MD5 => {
                type $d = Md5;
                $body
            }
            HashAlgorithm::SHA1 => {
                type $d = Sha1;
                $body
            }
            HashAlgorithm::SHA256 => {
                type $d = Sha256;
                $body
            }
            HashAlgorithm::SHA384 => {
                type $d = Sha384;
                $body
            }
            HashAlgorithm::SM3 => {
                type $d = Sm3;
                $body
            }
            HashAlgorithm::STREEBOG256 => {
                type $d = Streebog256;
                $body
            }
        }
    };
}

/// HKDF-Extract(salt, IKM). An empty salt means a string of zeros.
pub fn hkdf_extract(hash: HashAlgorithm, salt: &[u8], ikm: &[u8]) -> Zeroizing<Vec<u8>> {
    let salt = if salt.is_empty() { None } else { Some(salt) };
    with_hkdf!(hash, D => {
        let (prk, _) = Hkdf::<D>::extract(salt, ikm);
        Zeroizing::new(prk.to_vec())
    })
}

/// HKDF-Expand(PRK, info, L).
pub fn hkdf_expand(
    hash: HashAlgorithm,
    prk: &[u8],
    info: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    let mut output = Zeroizing::new(vec![0u8; output_len]);
    with_hkdf!(hash, D => {
        let hk = Hkdf::<D>::from_prk(prk).map_err(|_| Error::InvalidKeyLength {
            expected: hash.output_len(),
            actual: prk.len(),
        })?;
        hk.expand(info, &mut output)
            .map_err(|_| Error::UnsupportedOperation("HKDF output too long"))?;
    });
    Ok(output)
}

/// HKDF-Expand-Label(Secret, Label, Context, Length).
///
/// `prefix` is "tls13 " for TLS and "dtls13" for DTLS (RFC 9147).
pub fn hkdf_expand_label(
    hash: HashAlgorithm,
    prefix: &[u8],
    secret: &[u8],
    label: &[u8],
    context: &[u8],
    output_len: usize,
) -> Result<Zeroizing<Vec<u8>>, Error> {
    // Build the HkdfLabel structure per RFC 8446 Section 7.1
    let full_label_len = prefix.len() + label.len();

    if full_label_len > 255 {
        return Err(Error::UnsupportedOperation(
            "Label too long for HKDF-Expand-Label",
        ));
    }
    if context.len() > 255 {
        return Err(Error::UnsupportedOperation(
            "Context too long for HKDF-Expand-Label",
        ));
    }
    if output_len > 65535 {
        return Err(Error::UnsupportedOperation(
            "Output length too large for HKDF-Expand-Label",
        ));
    }

    let mut info = Vec::with_capacity(2 + 1 + full_label_len + 1 + context.len());

    // uint16 length
    info.extend_from_slice(&(output_len as u16).to_be_bytes());

    // opaque label<7..255> = "tls13 " + Label
    info.push(full_label_len as u8);
    info.extend_from_slice(prefix);
    info.extend_from_slice(label);

    // opaque context<0..255>
    info.push(context.len() as u8);
    info.extend_from_slice(context);

    hkdf_expand(hash, secret, &info, output_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 5869 test case 1.
    #[test]
    fn rfc5869_case_1() {
        let ikm = [0x0bu8; 22];
        let salt = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
        ];
        let info = [0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9];

        let prk = hkdf_extract(HashAlgorithm::SHA256, &salt, &ikm);
        let expected_prk = [
            0x07, 0x77, 0x09, 0x36, 0x2c, 0x2e, 0x32, 0xdf, 0x0d, 0xdc, 0x3f, 0x0d, 0xc4, 0x7b,
            0xba, 0x63, 0x90, 0xb6, 0xc7, 0x3b, 0xb5, 0x0f, 0x9c, 0x31, 0x22, 0xec, 0x84, 0x4a,
            0xd7, 0xc2, 0xb3, 0xe5,
        ];
        assert_eq!(&prk[..], &expected_prk[..]);

        let okm = hkdf_expand(HashAlgorithm::SHA256, &prk, &info, 42).unwrap();
        let expected_okm = [
            0x3c, 0xb2, 0x5f, 0x25, 0xfa, 0xac, 0xd5, 0x7a, 0x90, 0x43, 0x4f, 0x64, 0xd0, 0x36,
            0x2f, 0x2a, 0x2d, 0x2d, 0x0a, 0x90, 0xcf, 0x1a, 0x5a, 0x4c, 0x5d, 0xb0, 0x2d, 0x56,
            0xec, 0xc4, 0xc5, 0xbf, 0x34, 0x00, 0x72, 0x08, 0xd5, 0xb8, 0x87, 0x18, 0x58, 0x65,
        ];
        assert_eq!(&okm[..], &expected_okm[..]);
    }

    #[test]
    fn expand_label_rejects_long_context() {
        let secret = [0u8; 32];
        let context = [0u8; 256];
        let err = hkdf_expand_label(
            HashAlgorithm::SHA256,
            b"tls13 ",
            &secret,
            b"key",
            &context,
            16,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation(_)));
    }

    #[test]
    fn label_prefix_changes_output() {
        let secret = [7u8; 32];
        let tls = hkdf_expand_label(HashAlgorithm::SHA256, b"tls13 ", &secret, b"key", &[], 16)
            .unwrap();
        let dtls = hkdf_expand_label(HashAlgorithm::SHA256, b"dtls13", &secret, b"key", &[], 16)
            .unwrap();
        assert_ne!(tls, dtls);
    }
}
