#![no_main]

//! Fuzz target for record unprotection.
//!
//! The first byte picks a cipher suite from the catalog, the second the
//! protocol version and the content type. The rest is fed as a protected
//! fragment to a protector keyed from fixed secrets. Every input must be
//! rejected or accepted without panicking.

use libfuzzer_sys::fuzz_target;

use rekord::{
    Config, ContentType, KeySchedule, NegotiatedParameters, ProtocolVersion, RecordProtector,
    Role, Sequence, Tls12KeySchedule, Tls13KeySchedule, TrafficEpoch, ALL_CIPHER_SUITES,
};

const VERSIONS: [ProtocolVersion; 7] = [
    ProtocolVersion::Tls1_0,
    ProtocolVersion::Tls1_1,
    ProtocolVersion::Tls1_2,
    ProtocolVersion::Tls1_3,
    ProtocolVersion::Dtls1_0,
    ProtocolVersion::Dtls1_2,
    ProtocolVersion::Dtls1_3,
];

const CONTENT_TYPES: [ContentType; 5] = [
    ContentType::ChangeCipherSpec,
    ContentType::Alert,
    ContentType::Handshake,
    ContentType::ApplicationData,
    ContentType::Heartbeat,
];

fn protector(version: ProtocolVersion, suite: usize) -> Option<RecordProtector> {
    let suite = &ALL_CIPHER_SUITES[suite % ALL_CIPHER_SUITES.len()];
    if !suite.supports(version) {
        return None;
    }
    let config = Config::default();
    let params = NegotiatedParameters::new(version, Role::Server, suite);
    let mut protector = RecordProtector::new(params, &config).ok()?;

    if version.is_tls13() {
        let mut schedule = Tls13KeySchedule::new(&params, None).ok()?;
        schedule
            .derive_master_secret(&[1; 32], &[0; 32], &[0; 32], Some(&[2; 32]))
            .ok()?;
        schedule.derive_application_secrets(&[3; 32]).ok()?;
        protector
            .install_traffic_secrets(&schedule, TrafficEpoch::Application)
            .ok()?;
    } else {
        let mut schedule = Tls12KeySchedule::new(&params, &config).ok()?;
        schedule
            .derive_master_secret(&[1; 48], &[0; 32], &[0; 32], None)
            .ok()?;
        protector
            .install_key_block(&schedule.derive_key_block().ok()?)
            .ok()?;
    }
    Some(protector)
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let version = VERSIONS[data[1] as usize % VERSIONS.len()];
    let content_type = CONTENT_TYPES[(data[1] as usize / VERSIONS.len()) % CONTENT_TYPES.len()];
    let Some(mut protector) = protector(version, data[0] as usize) else {
        return;
    };
    let fragment = &data[2..];

    if version.is_dtls() {
        let sequence = Sequence {
            epoch: protector.read_sequence().epoch,
            sequence_number: fragment.len() as u64,
        };
        let _ = protector.unprotect_dtls_record(content_type, sequence, fragment);
    }
    let _ = protector.unprotect_record(content_type, fragment);
});
