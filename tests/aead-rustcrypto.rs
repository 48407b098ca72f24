//! AEAD records checked against the RustCrypto AEAD crates.

use aes::Aes128;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::Aes128Gcm;
use ccm::consts::{U12, U16, U8};
use ccm::Ccm;
use chacha20poly1305::ChaCha20Poly1305;

use rekord::{
    CipherSuiteSpec, Config, ContentType, KeySchedule, NegotiatedParameters, ProtocolVersion,
    RecordProtector, Role, Tls12KeySchedule, Tls13KeySchedule, TrafficEpoch, TrafficKeys,
};

const DATA: &[u8] = b"attack at dawn";

fn tls12(suite: u16) -> (TrafficKeys, RecordProtector) {
    let suite = CipherSuiteSpec::lookup(suite).unwrap();
    let config = Config::default();
    let params = NegotiatedParameters::new(ProtocolVersion::Tls1_2, Role::Client, suite);
    let mut schedule = Tls12KeySchedule::new(&params, &config).unwrap();
    schedule
        .derive_master_secret(&[7; 48], &[1; 32], &[2; 32], None)
        .unwrap();
    let block = schedule.derive_key_block().unwrap();
    let mut protector = RecordProtector::new(params, &config).unwrap();
    protector.install_key_block(&block).unwrap();
    (block.client, protector)
}

/// seq || type || version || length
fn tls12_aad(seq: u64, len: usize) -> Vec<u8> {
    let mut aad = seq.to_be_bytes().to_vec();
    aad.extend_from_slice(&[23, 3, 3]);
    aad.extend_from_slice(&(len as u16).to_be_bytes());
    aad
}

fn check_tls12<A: Aead + KeyInit>(suite: u16) {
    let (keys, mut protector) = tls12(suite);
    let cipher = A::new_from_slice(keys.key.data().unwrap()).unwrap();

    for seq in 0..2u64 {
        let record = protector
            .protect_record(ContentType::ApplicationData, DATA)
            .unwrap();

        let mut nonce = keys.iv.data().unwrap().to_vec();
        nonce.extend_from_slice(&seq.to_be_bytes());
        let expected = cipher
            .encrypt(
                GenericArray::from_slice(&nonce),
                Payload {
                    msg: DATA,
                    aad: &tls12_aad(seq, DATA.len()),
                },
            )
            .unwrap();

        assert_eq!(&record.fragment[..8], &seq.to_be_bytes());
        assert_eq!(&record.fragment[8..], &expected[..], "suite {:#06x}", suite);
    }
}

#[test]
fn gcm_matches_aes_gcm() {
    let _ = env_logger::try_init();
    check_tls12::<Aes128Gcm>(0xC02F);
}

#[test]
fn ccm_matches_ccm() {
    let _ = env_logger::try_init();
    check_tls12::<Ccm<Aes128, U16, U12>>(0xC09C);
    check_tls12::<Ccm<Aes128, U8, U12>>(0xC0A0);
}

#[test]
fn tls13_chacha_matches_chacha20poly1305() {
    let _ = env_logger::try_init();

    let suite = CipherSuiteSpec::lookup(0x1303).unwrap();
    let params = NegotiatedParameters::new(ProtocolVersion::Tls1_3, Role::Server, suite);
    let mut schedule = Tls13KeySchedule::new(&params, None).unwrap();
    schedule
        .derive_master_secret(&[3; 32], &[0; 32], &[0; 32], Some(&[4; 32]))
        .unwrap();
    schedule.derive_application_secrets(&[5; 32]).unwrap();
    let keys = schedule
        .traffic_keys(
            schedule
                .traffic_secret(Role::Server, TrafficEpoch::Application)
                .unwrap(),
        )
        .unwrap();

    let mut protector = RecordProtector::new(params, &Config::default()).unwrap();
    protector
        .install_traffic_secrets(&schedule, TrafficEpoch::Application)
        .unwrap();

    let cipher = ChaCha20Poly1305::new_from_slice(keys.key.data().unwrap()).unwrap();
    let mut inner = DATA.to_vec();
    inner.push(22);

    for seq in 0..2u64 {
        let record = protector.protect_record(ContentType::Handshake, DATA).unwrap();
        assert_eq!(record.content_type, ContentType::ApplicationData);

        let mut nonce = keys.iv.data().unwrap().to_vec();
        for (n, s) in nonce[4..].iter_mut().zip(seq.to_be_bytes()) {
            *n ^= s;
        }
        let mut aad = vec![23, 3, 3];
        aad.extend_from_slice(&((inner.len() + 16) as u16).to_be_bytes());

        let expected = cipher
            .encrypt(
                GenericArray::from_slice(&nonce),
                Payload {
                    msg: &inner,
                    aad: &aad,
                },
            )
            .unwrap();
        assert_eq!(record.fragment, expected);
    }
}
