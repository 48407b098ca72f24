//! Per-direction sequencing and record authentication.
//!
//! MAC = HMAC(mac_key, seq(8) || type(1) || version(2) || length(2) || fragment)
//!
//! For DTLS the 8 sequence bytes are epoch(2) || sequence_number(6).

use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroizing;

use crate::crypto::{hmac, verify_hmac};
use crate::types::{ContentType, HashAlgorithm, ProtocolVersion, Sequence};
use crate::Error;

/// Largest DTLS sequence number within one epoch.
pub const DTLS_MAX_SEQUENCE: u64 = (1 << 48) - 1;

/// Length of the MAC pseudo-header and of the TLS 1.2 AEAD AAD.
pub const PSEUDO_HEADER_LEN: usize = 13;

/// Length of the TLS 1.3 AAD (the opaque record header).
pub const TLS13_AAD_LEN: usize = 5;

/// Additional authenticated data for one AEAD record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aad {
    bytes: [u8; PSEUDO_HEADER_LEN],
    len: usize,
}

impl Aad {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Sequence state and MAC key for one direction.
pub struct ExchangeAuthenticator {
    version: ProtocolVersion,
    mac: Option<(HashAlgorithm, Zeroizing<Vec<u8>>)>,
    epoch: u16,
    sequence_number: u64,
}

impl ExchangeAuthenticator {
    /// Authenticator without a MAC key. AEAD modes and NULL_WITH_NULL use
    /// this; it still advances the sequence number.
    pub fn new(version: ProtocolVersion) -> Self {
        ExchangeAuthenticator {
            version,
            mac: None,
            epoch: 0,
            sequence_number: 0,
        }
    }

    /// Authenticator that computes a record HMAC.
    ///
    /// The key must be as long as the hash output.
    pub fn with_mac(
        version: ProtocolVersion,
        hash: HashAlgorithm,
        mac_key: &[u8],
    ) -> Result<Self, Error> {
        if mac_key.len() != hash.output_len() {
            return Err(Error::InvalidKeyLength {
                expected: hash.output_len(),
                actual: mac_key.len(),
            });
        }
        Ok(ExchangeAuthenticator {
            version,
            mac: Some((hash, Zeroizing::new(mac_key.to_vec()))),
            epoch: 0,
            sequence_number: 0,
        })
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Length of the record MAC, 0 without a MAC key.
    pub fn mac_len(&self) -> usize {
        self.mac.as_ref().map(|(h, _)| h.output_len()).unwrap_or(0)
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn epoch(&self) -> u16 {
        self.epoch
    }

    pub fn sequence(&self) -> Sequence {
        Sequence {
            epoch: self.epoch,
            sequence_number: self.sequence_number,
        }
    }

    /// The 8 sequence bytes fed to MACs and nonces.
    ///
    /// Every DTLS version, 1.3 included, carries the epoch in the top two
    /// bytes. RFC 9147 nonces use the bare 64-bit sequence number instead,
    /// so DTLS 1.3 records from this crate only interoperate with peers that
    /// build the block the same way.
    pub fn sequence_block(&self) -> [u8; 8] {
        let mut block = self.sequence_number.to_be_bytes();
        if self.version.is_dtls() {
            block[..2].copy_from_slice(&self.epoch.to_be_bytes());
        }
        block
    }

    /// Advance by one record.
    pub fn increase_sequence_number(&mut self) -> Result<(), Error> {
        let max = if self.version.is_dtls() {
            DTLS_MAX_SEQUENCE
        } else {
            u64::MAX
        };
        if self.sequence_number >= max {
            return Err(Error::SequenceOverflow);
        }
        self.sequence_number += 1;
        Ok(())
    }

    /// Enter a new DTLS epoch. The sequence number restarts at 0.
    pub fn set_epoch(&mut self, epoch: u16) {
        self.epoch = epoch;
        self.sequence_number = 0;
    }

    /// Position at the sequence carried by a received DTLS record.
    pub(crate) fn set_sequence(&mut self, sequence: Sequence) -> Result<(), Error> {
        if sequence.sequence_number > DTLS_MAX_SEQUENCE {
            return Err(Error::SequenceOverflow);
        }
        self.epoch = sequence.epoch;
        self.sequence_number = sequence.sequence_number;
        Ok(())
    }

    /// seq(8) || type(1) || version(2) || length(2)
    pub fn pseudo_header(&self, content_type: ContentType, length: usize) -> [u8; 13] {
        let mut header = [0u8; PSEUDO_HEADER_LEN];
        header[..8].copy_from_slice(&self.sequence_block());
        header[8] = content_type.as_u8();
        header[9..11].copy_from_slice(&self.version.record_version());
        header[11..].copy_from_slice(&(length as u16).to_be_bytes());
        header
    }

    /// AAD for an AEAD record.
    ///
    /// TLS 1.2 and below authenticate the pseudo-header over the plaintext
    /// length. TLS 1.3 authenticates the outer record header, which always
    /// claims application data and covers the ciphertext with its tag.
    pub fn aead_aad(
        &self,
        content_type: ContentType,
        plaintext_len: usize,
        ciphertext_len: usize,
    ) -> Aad {
        let mut bytes = [0u8; PSEUDO_HEADER_LEN];
        if self.version.is_tls13() {
            bytes[0] = ContentType::ApplicationData.as_u8();
            bytes[1..3].copy_from_slice(&self.version.record_version());
            bytes[3..5].copy_from_slice(&(ciphertext_len as u16).to_be_bytes());
            Aad {
                bytes,
                len: TLS13_AAD_LEN,
            }
        } else {
            bytes = self.pseudo_header(content_type, plaintext_len);
            Aad {
                bytes,
                len: PSEUDO_HEADER_LEN,
            }
        }
    }

    /// HMAC over the pseudo-header and `fragment`. Empty without a MAC key.
    pub fn compute_mac(&self, content_type: ContentType, fragment: &[u8]) -> Result<Vec<u8>, Error> {
        let Some((hash, key)) = &self.mac else {
            return Ok(Vec::new());
        };
        let header = self.pseudo_header(content_type, fragment.len());
        hmac(*hash, key, &[&header[..], fragment])
    }

    /// Verify `content || mac` and return the content length.
    pub fn check_stream_mac(&self, content_type: ContentType, record: &[u8]) -> Result<usize, Error> {
        let mac_len = self.mac_len();
        let Some(content_len) = record.len().checked_sub(mac_len) else {
            return Err(Error::BadRecordMac);
        };
        let Some((hash, key)) = &self.mac else {
            return Ok(content_len);
        };
        let (content, mac) = record.split_at(content_len);
        let header = self.pseudo_header(content_type, content.len());
        verify_hmac(*hash, key, &[&header[..], content], mac)?;
        Ok(content_len)
    }

    /// Verify the MAC of a decrypted CBC record.
    ///
    /// `content_len` is only meaningful when `padding_ok` is set. On bad
    /// padding a MAC is still computed over a pseudo payload of the same
    /// length so both failures cost the same.
    pub fn check_cbc_mac(
        &self,
        content_type: ContentType,
        decrypted: &[u8],
        content_len: usize,
        padding_ok: Choice,
    ) -> Result<(), Error> {
        let mac_len = self.mac_len();
        let fits = content_len + mac_len <= decrypted.len();

        let (content, received) = if fits {
            (
                &decrypted[..content_len],
                &decrypted[content_len..content_len + mac_len],
            )
        } else {
            (&decrypted[..0], &decrypted[..mac_len.min(decrypted.len())])
        };

        let expected = self.compute_mac(content_type, content)?;
        let mac_ok = if expected.len() == received.len() {
            expected.ct_eq(received)
        } else {
            Choice::from(0)
        };

        if bool::from(padding_ok & mac_ok & Choice::from(fits as u8)) {
            Ok(())
        } else if !bool::from(padding_ok) {
            Err(Error::BadPadding)
        } else {
            Err(Error::BadRecordMac)
        }
    }
}

impl std::fmt::Debug for ExchangeAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeAuthenticator")
            .field("version", &self.version)
            .field("mac", &self.mac.as_ref().map(|(h, _)| h))
            .field("epoch", &self.epoch)
            .field("sequence_number", &self.sequence_number)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_header_layout() {
        let mut auth = ExchangeAuthenticator::new(ProtocolVersion::Tls1_2);
        auth.increase_sequence_number().unwrap();
        let header = auth.pseudo_header(ContentType::ApplicationData, 5);
        assert_eq!(header, [0, 0, 0, 0, 0, 0, 0, 1, 23, 3, 3, 0, 5]);
    }

    #[test]
    fn dtls_sequence_block_carries_epoch() {
        let mut auth = ExchangeAuthenticator::new(ProtocolVersion::Dtls1_2);
        auth.set_epoch(1);
        auth.increase_sequence_number().unwrap();
        assert_eq!(auth.sequence_block(), [0, 1, 0, 0, 0, 0, 0, 1]);
        let header = auth.pseudo_header(ContentType::Handshake, 0x0102);
        assert_eq!(&header[8..], &[22, 0xfe, 0xfd, 1, 2]);
    }

    #[test]
    fn dtls13_sequence_block_carries_epoch() {
        let mut auth = ExchangeAuthenticator::new(ProtocolVersion::Dtls1_3);
        auth.set_epoch(3);
        auth.increase_sequence_number().unwrap();
        assert_eq!(auth.sequence_block(), [0, 3, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn tls13_aad_is_outer_header() {
        let auth = ExchangeAuthenticator::new(ProtocolVersion::Tls1_3);
        let aad = auth.aead_aad(ContentType::Handshake, 10, 27);
        assert_eq!(aad.as_slice(), &[23, 3, 3, 0, 27]);

        let auth = ExchangeAuthenticator::new(ProtocolVersion::Dtls1_3);
        let aad = auth.aead_aad(ContentType::Handshake, 10, 27);
        assert_eq!(aad.as_slice(), &[23, 0xfe, 0xfd, 0, 27]);
    }

    #[test]
    fn sequence_overflow() {
        let mut auth = ExchangeAuthenticator::new(ProtocolVersion::Dtls1_2);
        auth.set_sequence(Sequence {
            epoch: 2,
            sequence_number: DTLS_MAX_SEQUENCE,
        })
        .unwrap();
        assert_eq!(auth.increase_sequence_number(), Err(Error::SequenceOverflow));

        let mut auth = ExchangeAuthenticator::new(ProtocolVersion::Tls1_2);
        auth.sequence_number = u64::MAX;
        assert_eq!(auth.increase_sequence_number(), Err(Error::SequenceOverflow));
    }

    #[test]
    fn stream_mac_roundtrip_and_tamper() {
        let auth =
            ExchangeAuthenticator::with_mac(ProtocolVersion::Tls1_0, HashAlgorithm::SHA1, &[7; 20])
                .unwrap();
        let mut record = b"payload".to_vec();
        let mac = auth.compute_mac(ContentType::ApplicationData, &record).unwrap();
        assert_eq!(mac.len(), 20);
        record.extend_from_slice(&mac);

        assert_eq!(
            auth.check_stream_mac(ContentType::ApplicationData, &record),
            Ok(7)
        );
        // Different type, different MAC.
        assert_eq!(
            auth.check_stream_mac(ContentType::Handshake, &record),
            Err(Error::BadRecordMac)
        );
        assert_eq!(
            auth.check_stream_mac(ContentType::ApplicationData, &record[..10]),
            Err(Error::BadRecordMac)
        );
    }

    #[test]
    fn mac_key_length_is_checked() {
        let err =
            ExchangeAuthenticator::with_mac(ProtocolVersion::Tls1_2, HashAlgorithm::SHA256, &[0; 20])
                .unwrap_err();
        assert!(matches!(err, Error::InvalidKeyLength { expected: 32, .. }));
    }

    #[test]
    fn cbc_mac_reports_padding_first() {
        let auth =
            ExchangeAuthenticator::with_mac(ProtocolVersion::Tls1_2, HashAlgorithm::SHA1, &[1; 20])
                .unwrap();
        let decrypted = [0u8; 32];
        assert_eq!(
            auth.check_cbc_mac(ContentType::ApplicationData, &decrypted, 0, Choice::from(0)),
            Err(Error::BadPadding)
        );
        assert_eq!(
            auth.check_cbc_mac(ContentType::ApplicationData, &decrypted, 0, Choice::from(1)),
            Err(Error::BadRecordMac)
        );
    }
}
