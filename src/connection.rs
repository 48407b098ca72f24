//! Directional record protection for the record layer.
//!
//! A [`RecordProtector`] owns one [`CipherMode`] per direction. It starts
//! out in the NULL state where fragments pass through untouched, and is
//! keyed from the key schedule once the handshake has produced secrets.

use crate::auth::ExchangeAuthenticator;
use crate::config::{Config, MAX_PLAINTEXT_LEN};
use crate::engine::{CipherEngine, EngineKind};
use crate::key_schedule::{KeyBlock, Tls13KeySchedule, TrafficEpoch, TrafficKeys};
use crate::mode::{CipherMode, ModeKind};
use crate::types::{ContentType, NegotiatedParameters, ProtocolVersion, Sequence};
use crate::window::ReplayWindow;
use crate::Error;

/// Ciphertext may exceed the plaintext limit by this much before TLS 1.3.
pub const MAX_CIPHERTEXT_EXPANSION: usize = 2048;

/// Ciphertext expansion allowed by TLS 1.3 (RFC 8446 Section 5.2).
pub const MAX_TLS13_EXPANSION: usize = 256;

/// DTLS 1.3 epoch of the handshake traffic keys (RFC 9147 Section 6.1).
const DTLS13_HANDSHAKE_EPOCH: u16 = 2;
const DTLS13_APPLICATION_EPOCH: u16 = 3;

/// A protected fragment ready to be framed by the record layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRecord {
    /// The content type to put on the wire. Always application_data for
    /// TLS 1.3 protected records.
    pub content_type: ContentType,
    pub version: ProtocolVersion,
    pub sequence: Sequence,
    pub fragment: Vec<u8>,
}

impl ProtectedRecord {
    /// type(1) || version(2) || length(2), with epoch(2) || seq(6) before
    /// the length for DTLS.
    pub fn header(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(13);
        header.push(self.content_type.as_u8());
        header.extend_from_slice(&self.version.record_version());
        if self.version.is_dtls() {
            header.extend_from_slice(&self.sequence.epoch.to_be_bytes());
            header.extend_from_slice(&self.sequence.sequence_number.to_be_bytes()[2..]);
        }
        header.extend_from_slice(&(self.fragment.len() as u16).to_be_bytes());
        header
    }

    /// Header followed by the fragment.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.header();
        bytes.extend_from_slice(&self.fragment);
        bytes
    }
}

#[derive(Debug)]
struct Direction {
    mode: CipherMode,
    /// Keys installed. TLS 1.3 inner plaintext only applies then.
    protected: bool,
    replay: ReplayWindow,
}

impl Direction {
    fn plain(version: ProtocolVersion) -> Result<Self, Error> {
        let engine = CipherEngine::new(EngineKind::None, true, &[])?;
        let mode = CipherMode::new(
            ModeKind::Null,
            engine,
            ExchangeAuthenticator::new(version),
            &[],
            0,
        )?;
        Ok(Direction {
            mode,
            protected: false,
            replay: ReplayWindow::new(),
        })
    }

    fn epoch(&self) -> u16 {
        self.mode.authenticator().epoch()
    }

    fn next_epoch(&self) -> Result<u16, Error> {
        self.epoch().checked_add(1).ok_or(Error::SequenceOverflow)
    }

    fn install(&mut self, mut mode: CipherMode, epoch: u16) {
        mode.authenticator_mut().set_epoch(epoch);
        self.mode = mode;
        self.protected = true;
        self.replay.reset();
    }
}

/// Record protection for one connection, both directions.
#[derive(Debug)]
pub struct RecordProtector {
    params: NegotiatedParameters,
    config: Config,
    write: Direction,
    read: Direction,
}

impl RecordProtector {
    /// A protector in the NULL state, epoch 0.
    pub fn new(params: NegotiatedParameters, config: &Config) -> Result<Self, Error> {
        Ok(RecordProtector {
            params,
            config: config.clone(),
            write: Direction::plain(params.version)?,
            read: Direction::plain(params.version)?,
        })
    }

    pub fn params(&self) -> &NegotiatedParameters {
        &self.params
    }

    /// Sequence the next protected record will carry.
    pub fn write_sequence(&self) -> Sequence {
        self.write.mode.authenticator().sequence()
    }

    /// Sequence the next record read in order is expected to carry.
    pub fn read_sequence(&self) -> Sequence {
        self.read.mode.authenticator().sequence()
    }

    pub fn write_mode(&self) -> ModeKind {
        self.write.mode.kind()
    }

    pub fn read_mode(&self) -> ModeKind {
        self.read.mode.kind()
    }

    /// Key the write direction. Moves to the next epoch with sequence 0.
    pub fn install_write_keys(&mut self, keys: &TrafficKeys) -> Result<(), Error> {
        let mode = keys.cipher_mode(self.params.suite, self.params.version, true)?;
        let epoch = self.write.next_epoch()?;
        self.write.install(mode, epoch);
        debug!(
            "Installed {} write keys for {} in epoch {}",
            self.params.role, self.params.suite, epoch
        );
        Ok(())
    }

    /// Key the read direction. Moves to the next epoch with sequence 0.
    pub fn install_read_keys(&mut self, keys: &TrafficKeys) -> Result<(), Error> {
        let mode = keys.cipher_mode(self.params.suite, self.params.version, false)?;
        let epoch = self.read.next_epoch()?;
        self.read.install(mode, epoch);
        debug!(
            "Installed {} read keys for {} in epoch {}",
            self.params.role, self.params.suite, epoch
        );
        Ok(())
    }

    /// Key both directions from a TLS 1.2 (or older) key block.
    pub fn install_key_block(&mut self, block: &KeyBlock) -> Result<(), Error> {
        if self.params.version.is_tls13() {
            return Err(Error::UnsupportedVersion(self.params.version));
        }
        let (write, read) = block.for_role(self.params.role);
        self.install_write_keys(write)?;
        self.install_read_keys(read)
    }

    /// Key both directions from the TLS 1.3 traffic secrets of `epoch`.
    pub fn install_traffic_secrets(
        &mut self,
        schedule: &Tls13KeySchedule,
        epoch: TrafficEpoch,
    ) -> Result<(), Error> {
        let role = self.params.role;
        let version = self.params.version;
        let suite = self.params.suite;

        let write = schedule.traffic_keys(schedule.traffic_secret(role, epoch)?)?;
        let read = schedule.traffic_keys(schedule.traffic_secret(role.peer(), epoch)?)?;
        let write_mode = write.cipher_mode(suite, version, true)?;
        let read_mode = read.cipher_mode(suite, version, false)?;

        let record_epoch = match epoch {
            TrafficEpoch::Handshake => DTLS13_HANDSHAKE_EPOCH,
            TrafficEpoch::Application => DTLS13_APPLICATION_EPOCH,
        };
        self.write.install(write_mode, record_epoch);
        self.read.install(read_mode, record_epoch);
        debug!(
            "Installed {:?} traffic keys for {} ({})",
            epoch, role, suite
        );
        Ok(())
    }

    /// Roll our own application traffic secret forward and rekey the write
    /// direction (sending KeyUpdate).
    pub fn update_write_keys(&mut self, schedule: &mut Tls13KeySchedule) -> Result<(), Error> {
        let role = self.params.role;
        schedule.update_traffic_secret(role)?;
        let keys =
            schedule.traffic_keys(schedule.traffic_secret(role, TrafficEpoch::Application)?)?;
        self.install_write_keys(&keys)
    }

    /// Roll the peer's application traffic secret forward and rekey the
    /// read direction (receiving KeyUpdate).
    pub fn update_read_keys(&mut self, schedule: &mut Tls13KeySchedule) -> Result<(), Error> {
        let peer = self.params.role.peer();
        schedule.update_traffic_secret(peer)?;
        let keys =
            schedule.traffic_keys(schedule.traffic_secret(peer, TrafficEpoch::Application)?)?;
        self.install_read_keys(&keys)
    }

    /// Protect one plaintext fragment with the write direction.
    ///
    /// Under TLS 1.3 keys the fragment is wrapped as
    /// content || type || zero padding and sent as application_data.
    pub fn protect_record(
        &mut self,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<ProtectedRecord, Error> {
        let max = self.config.max_record_size();
        if plaintext.len() > max {
            return Err(Error::RecordOverflow {
                len: plaintext.len(),
                max,
            });
        }

        let version = self.params.version;
        let sequence = self.write.mode.authenticator().sequence();

        let (content_type, fragment) = if self.write.protected && version.is_tls13() {
            let inner_len = plaintext.len() + 1;
            // TLSInnerPlaintext is capped at 2^14 + 1 bytes.
            let padding = self
                .config
                .tls13_padding()
                .min(MAX_PLAINTEXT_LEN + 1 - inner_len);
            let mut inner = Vec::with_capacity(inner_len + padding);
            inner.extend_from_slice(plaintext);
            inner.push(content_type.as_u8());
            inner.resize(inner_len + padding, 0);

            let outer = ContentType::ApplicationData;
            (outer, self.write.mode.encrypt(outer, &inner)?)
        } else {
            (content_type, self.write.mode.encrypt(content_type, plaintext)?)
        };

        Ok(ProtectedRecord {
            content_type,
            version,
            sequence,
            fragment,
        })
    }

    /// Unprotect the next record in order with the read direction.
    ///
    /// Returns the real content type (the inner one under TLS 1.3) and the
    /// plaintext.
    pub fn unprotect_record(
        &mut self,
        content_type: ContentType,
        fragment: &[u8],
    ) -> Result<(ContentType, Vec<u8>), Error> {
        self.unprotect(content_type, fragment)
    }

    /// Unprotect a DTLS record carrying its own epoch and sequence number.
    ///
    /// Records may arrive out of order. With the replay window enabled,
    /// duplicates and records older than the window fail with
    /// `ReplayedRecord`. A record only counts as seen once it authenticated.
    pub fn unprotect_dtls_record(
        &mut self,
        content_type: ContentType,
        sequence: Sequence,
        fragment: &[u8],
    ) -> Result<(ContentType, Vec<u8>), Error> {
        let version = self.params.version;
        if !version.is_dtls() {
            return Err(Error::UnsupportedVersion(version));
        }
        let expected = self.read.epoch();
        if sequence.epoch != expected {
            return Err(Error::UnexpectedEpoch {
                expected,
                actual: sequence.epoch,
            });
        }

        let replay = self.config.dtls_replay_window();
        if replay {
            if let Err(e) = self.read.replay.check(sequence.sequence_number) {
                debug!("Dropping record {}: {}", sequence, e);
                return Err(e);
            }
        }
        // A record that fails to authenticate must not move the read state.
        let previous = self.read.mode.authenticator().sequence();
        self.read.mode.authenticator_mut().set_sequence(sequence)?;

        let result = match self.unprotect(content_type, fragment) {
            Ok(result) => result,
            Err(e) => {
                self.read.mode.authenticator_mut().set_sequence(previous)?;
                return Err(e);
            }
        };
        if replay {
            self.read.replay.update(sequence.sequence_number);
        }
        Ok(result)
    }

    fn unprotect(
        &mut self,
        content_type: ContentType,
        fragment: &[u8],
    ) -> Result<(ContentType, Vec<u8>), Error> {
        let max = self.config.max_record_size();
        let tls13 = self.read.protected && self.params.version.is_tls13();
        let expansion = if tls13 {
            MAX_TLS13_EXPANSION
        } else {
            MAX_CIPHERTEXT_EXPANSION
        };
        if fragment.len() > max + expansion {
            return Err(Error::RecordOverflow {
                len: fragment.len(),
                max: max + expansion,
            });
        }

        if !tls13 {
            let plaintext = self.read.mode.decrypt(content_type, fragment)?;
            if plaintext.len() > max {
                return Err(Error::RecordOverflow {
                    len: plaintext.len(),
                    max,
                });
            }
            return Ok((content_type, plaintext));
        }

        match content_type {
            // Middlebox compatibility records are never protected.
            ContentType::ChangeCipherSpec => return Ok((content_type, fragment.to_vec())),
            ContentType::ApplicationData => {}
            other => return Err(Error::InvalidContentType(other.as_u8())),
        }

        let mut inner = self
            .read
            .mode
            .decrypt(ContentType::ApplicationData, fragment)?;
        let Some(end) = inner.iter().rposition(|b| *b != 0) else {
            warn!("TLS 1.3 record without content type");
            return Err(Error::InvalidContentType(0));
        };
        let inner_type = ContentType::try_from(inner[end])?;
        inner.truncate(end);
        if inner.len() > max {
            return Err(Error::RecordOverflow {
                len: inner.len(),
                max,
            });
        }
        Ok((inner_type, inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_schedule::{KeySchedule, Tls12KeySchedule};
    use crate::suite::CipherSuiteSpec;
    use crate::types::Role;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    fn params(version: ProtocolVersion, role: Role, suite: u16) -> NegotiatedParameters {
        NegotiatedParameters::new(version, role, CipherSuiteSpec::lookup(suite).unwrap())
    }

    /// Client and server protectors keyed from the same key block.
    fn tls12_pair(
        version: ProtocolVersion,
        suite: u16,
        config: &Config,
    ) -> (RecordProtector, RecordProtector) {
        let client_params = params(version, Role::Client, suite);
        let mut schedule = Tls12KeySchedule::new(&client_params, config).unwrap();
        schedule
            .derive_master_secret(&[0; 32], &[0x11; 32], &[0x22; 32], None)
            .unwrap();
        let block = schedule.derive_key_block().unwrap();

        let mut client = RecordProtector::new(client_params, config).unwrap();
        let mut server =
            RecordProtector::new(params(version, Role::Server, suite), config).unwrap();
        client.install_key_block(&block).unwrap();
        server.install_key_block(&block).unwrap();
        (client, server)
    }

    fn tls13_schedule(version: ProtocolVersion) -> Tls13KeySchedule {
        let mut schedule =
            Tls13KeySchedule::new(&params(version, Role::Client, 0x1301), None).unwrap();
        schedule
            .derive_master_secret(&[5; 32], &[0; 32], &[0; 32], Some(&[1; 32]))
            .unwrap();
        schedule.derive_application_secrets(&[2; 32]).unwrap();
        schedule
    }

    fn tls13_pair(
        version: ProtocolVersion,
        config: &Config,
    ) -> (RecordProtector, RecordProtector, Tls13KeySchedule) {
        let schedule = tls13_schedule(version);
        let mut client =
            RecordProtector::new(params(version, Role::Client, 0x1301), config).unwrap();
        let mut server =
            RecordProtector::new(params(version, Role::Server, 0x1301), config).unwrap();
        client
            .install_traffic_secrets(&schedule, TrafficEpoch::Application)
            .unwrap();
        server
            .install_traffic_secrets(&schedule, TrafficEpoch::Application)
            .unwrap();
        (client, server, schedule)
    }

    #[test]
    fn null_state_passes_through() {
        let mut p = RecordProtector::new(
            params(ProtocolVersion::Tls1_2, Role::Client, 0x009C),
            &Config::default(),
        )
        .unwrap();
        let record = p.protect_record(ContentType::Handshake, b"hello").unwrap();
        assert_eq!(record.fragment, b"hello");
        assert_eq!(record.header(), vec![22, 3, 3, 0, 5]);
        assert_eq!(p.write_sequence().sequence_number, 1);
        assert_eq!(p.write_mode(), ModeKind::Null);

        let (ct, plain) = p
            .unprotect_record(ContentType::Handshake, b"world")
            .unwrap();
        assert_eq!((ct, plain.as_slice()), (ContentType::Handshake, &b"world"[..]));
    }

    #[test]
    fn tls12_gcm_record() {
        let (mut client, mut server) =
            tls12_pair(ProtocolVersion::Tls1_2, 0x009C, &Config::default());
        let record = client
            .protect_record(ContentType::ApplicationData, b"hello")
            .unwrap();
        assert_eq!(
            record.fragment,
            hex("00000000000000007f9a6d6ebdffafaa9eca69f4704398bd1161a102ce")
        );
        assert_eq!(record.sequence.sequence_number, 0);

        let (ct, plain) = server
            .unprotect_record(record.content_type, &record.fragment)
            .unwrap();
        assert_eq!(ct, ContentType::ApplicationData);
        assert_eq!(plain, b"hello");
    }

    #[test]
    fn directions_count_independently() {
        let (mut client, mut server) =
            tls12_pair(ProtocolVersion::Tls1_2, 0x002F, &Config::default());
        for i in 0..3u8 {
            let record = client.protect_record(ContentType::ApplicationData, &[i; 40]).unwrap();
            server.unprotect_record(record.content_type, &record.fragment).unwrap();
        }
        let reply = server.protect_record(ContentType::Alert, &[1, 0]).unwrap();
        assert_eq!(reply.sequence.sequence_number, 0);
        assert_eq!(client.write_sequence().sequence_number, 3);
        assert_eq!(server.read_sequence().sequence_number, 3);
        assert_eq!(
            client.unprotect_record(reply.content_type, &reply.fragment).unwrap().1,
            vec![1, 0]
        );
    }

    #[test]
    fn oversized_records() {
        let config = Config::builder().max_record_size(100).build().unwrap();
        let (mut client, mut server) = tls12_pair(ProtocolVersion::Tls1_2, 0x009C, &config);
        assert_eq!(
            client.protect_record(ContentType::ApplicationData, &[0; 101]),
            Err(Error::RecordOverflow { len: 101, max: 100 })
        );
        assert!(matches!(
            server.unprotect_record(ContentType::ApplicationData, &vec![0; 100 + 2049]),
            Err(Error::RecordOverflow { .. })
        ));
    }

    #[test]
    fn tls13_inner_plaintext() {
        let config = Config::builder().tls13_padding(10).build().unwrap();
        let (mut client, mut server, _) = tls13_pair(ProtocolVersion::Tls1_3, &config);

        let record = client.protect_record(ContentType::Handshake, b"finished").unwrap();
        assert_eq!(record.content_type, ContentType::ApplicationData);
        assert_eq!(record.fragment.len(), 8 + 1 + 10 + 16);

        let (ct, plain) = server
            .unprotect_record(record.content_type, &record.fragment)
            .unwrap();
        assert_eq!(ct, ContentType::Handshake);
        assert_eq!(plain, b"finished");

        // Change cipher spec is let through untouched.
        assert_eq!(
            server.unprotect_record(ContentType::ChangeCipherSpec, &[1]).unwrap(),
            (ContentType::ChangeCipherSpec, vec![1])
        );
        assert_eq!(
            server.unprotect_record(ContentType::Handshake, &record.fragment),
            Err(Error::InvalidContentType(22))
        );
    }

    #[test]
    fn tls13_record_without_type() {
        let schedule = tls13_schedule(ProtocolVersion::Tls1_3);
        let keys = schedule
            .traffic_keys(
                schedule
                    .traffic_secret(Role::Client, TrafficEpoch::Application)
                    .unwrap(),
            )
            .unwrap();
        let mut raw = keys
            .cipher_mode(schedule.suite(), ProtocolVersion::Tls1_3, true)
            .unwrap();
        let fragment = raw.encrypt(ContentType::ApplicationData, &[0, 0, 0]).unwrap();

        let mut server = RecordProtector::new(
            params(ProtocolVersion::Tls1_3, Role::Server, 0x1301),
            &Config::default(),
        )
        .unwrap();
        server
            .install_traffic_secrets(&schedule, TrafficEpoch::Application)
            .unwrap();
        assert_eq!(
            server.unprotect_record(ContentType::ApplicationData, &fragment),
            Err(Error::InvalidContentType(0))
        );
    }

    #[test]
    fn tls13_key_update() {
        let (mut client, mut server, schedule) = tls13_pair(ProtocolVersion::Tls1_3, &Config::default());
        let mut client_schedule = schedule;
        let mut server_schedule = tls13_schedule(ProtocolVersion::Tls1_3);

        client.update_write_keys(&mut client_schedule).unwrap();
        server.update_read_keys(&mut server_schedule).unwrap();

        let record = client.protect_record(ContentType::ApplicationData, b"after").unwrap();
        assert_eq!(record.sequence.sequence_number, 0);
        let (_, plain) = server
            .unprotect_record(record.content_type, &record.fragment)
            .unwrap();
        assert_eq!(plain, b"after");
    }

    #[test]
    fn dtls_out_of_order_and_replay() {
        let (mut client, mut server) =
            tls12_pair(ProtocolVersion::Dtls1_2, 0x002F, &Config::default());
        let records: Vec<_> = (0..3u8)
            .map(|i| {
                client
                    .protect_record(ContentType::ApplicationData, &[i; 20])
                    .unwrap()
            })
            .collect();
        assert_eq!(records[2].sequence, Sequence { epoch: 1, sequence_number: 2 });
        assert_eq!(records[0].header()[3..5], [0, 1]);

        for i in [2usize, 0, 1] {
            let r = &records[i];
            let (_, plain) = server
                .unprotect_dtls_record(r.content_type, r.sequence, &r.fragment)
                .unwrap();
            assert_eq!(plain, vec![i as u8; 20]);
        }

        let r = &records[1];
        assert_eq!(
            server.unprotect_dtls_record(r.content_type, r.sequence, &r.fragment),
            Err(Error::ReplayedRecord(1))
        );
        let stale = Sequence { epoch: 0, sequence_number: 7 };
        assert_eq!(
            server.unprotect_dtls_record(r.content_type, stale, &r.fragment),
            Err(Error::UnexpectedEpoch { expected: 1, actual: 0 })
        );
    }

    #[test]
    fn dtls_forgery_is_not_marked_seen() {
        let (mut client, mut server) =
            tls12_pair(ProtocolVersion::Dtls1_2, 0x009C, &Config::default());
        let record = client.protect_record(ContentType::ApplicationData, b"data").unwrap();

        let mut forged = record.fragment.clone();
        let last = forged.len() - 1;
        forged[last] ^= 1;
        assert_eq!(
            server.unprotect_dtls_record(record.content_type, record.sequence, &forged),
            Err(Error::BadRecordMac)
        );
        assert!(server
            .unprotect_dtls_record(record.content_type, record.sequence, &record.fragment)
            .is_ok());
    }

    #[test]
    fn dtls_forgery_keeps_read_sequence() {
        let (_, mut server) = tls12_pair(ProtocolVersion::Dtls1_2, 0xC02F, &Config::default());
        let before = server.read_sequence();
        assert_eq!(before, Sequence { epoch: 1, sequence_number: 0 });

        let far = Sequence { epoch: 1, sequence_number: 5000 };
        assert_eq!(
            server.unprotect_dtls_record(ContentType::ApplicationData, far, &[0; 40]),
            Err(Error::BadRecordMac)
        );
        assert_eq!(server.read_sequence(), before);

        // Too short to even hold the explicit nonce and tag.
        assert!(server
            .unprotect_dtls_record(ContentType::ApplicationData, far, &[0; 3])
            .is_err());
        assert_eq!(server.read_sequence(), before);
    }

    #[test]
    fn dtls_replay_window_can_be_disabled() {
        let config = Config::builder().dtls_replay_window(false).build().unwrap();
        let (mut client, mut server) = tls12_pair(ProtocolVersion::Dtls1_2, 0x009C, &config);
        let record = client.protect_record(ContentType::ApplicationData, b"again").unwrap();
        for _ in 0..2 {
            server
                .unprotect_dtls_record(record.content_type, record.sequence, &record.fragment)
                .unwrap();
        }
    }

    #[test]
    fn dtls13_epochs() {
        let (mut client, mut server, _) = tls13_pair(ProtocolVersion::Dtls1_3, &Config::default());
        let record = client.protect_record(ContentType::ApplicationData, b"dtls13").unwrap();
        assert_eq!(record.sequence.epoch, 3);
        let (ct, plain) = server
            .unprotect_dtls_record(record.content_type, record.sequence, &record.fragment)
            .unwrap();
        assert_eq!((ct, plain), (ContentType::ApplicationData, b"dtls13".to_vec()));
    }

    #[test]
    fn tls_rejects_dtls_reads() {
        let (_, mut server) = tls12_pair(ProtocolVersion::Tls1_2, 0x009C, &Config::default());
        assert_eq!(
            server.unprotect_dtls_record(ContentType::ApplicationData, Sequence::new(1), &[]),
            Err(Error::UnsupportedVersion(ProtocolVersion::Tls1_2))
        );
    }

    #[test]
    fn key_block_needs_legacy_version() {
        let (client, _) = tls12_pair(ProtocolVersion::Tls1_2, 0x009C, &Config::default());
        let mut p = RecordProtector::new(
            params(ProtocolVersion::Tls1_3, Role::Client, 0x1301),
            &Config::default(),
        )
        .unwrap();
        let mut schedule =
            Tls12KeySchedule::new(client.params(), &Config::default()).unwrap();
        schedule
            .derive_master_secret(&[0; 32], &[0; 32], &[0; 32], None)
            .unwrap();
        let block = schedule.derive_key_block().unwrap();
        assert_eq!(
            p.install_key_block(&block),
            Err(Error::UnsupportedVersion(ProtocolVersion::Tls1_3))
        );
    }
}
