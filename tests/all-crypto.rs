use rekord::{
    AlertDescription, CipherSuiteSpec, Config, ContentType, Error, KeySchedule, ModeKind,
    NegotiatedParameters, ProtocolVersion, RecordProtector, Role, Tls12KeySchedule,
    Tls13KeySchedule, TrafficEpoch, ALL_CIPHER_SUITES,
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

const LENGTHS: [usize; 8] = [0, 1, 7, 15, 16, 17, 100, 1500];

/// Client and server protectors keyed from the same secrets.
fn pair(
    version: ProtocolVersion,
    suite: &'static CipherSuiteSpec,
) -> (RecordProtector, RecordProtector) {
    let config = Config::default();
    let client_params = NegotiatedParameters::new(version, Role::Client, suite);
    let server_params = NegotiatedParameters::new(version, Role::Server, suite);
    let mut client = RecordProtector::new(client_params, &config).unwrap();
    let mut server = RecordProtector::new(server_params, &config).unwrap();

    if version.is_tls13() {
        let mut schedule = Tls13KeySchedule::new(&client_params, None).unwrap();
        schedule
            .derive_master_secret(&[9; 32], &[1; 32], &[2; 32], Some(&[3; 48]))
            .unwrap();
        schedule.derive_application_secrets(&[4; 48]).unwrap();
        client
            .install_traffic_secrets(&schedule, TrafficEpoch::Application)
            .unwrap();
        server
            .install_traffic_secrets(&schedule, TrafficEpoch::Application)
            .unwrap();
    } else {
        let mut schedule = Tls12KeySchedule::new(&client_params, &config).unwrap();
        schedule
            .derive_master_secret(&[9; 48], &[1; 32], &[2; 32], None)
            .unwrap();
        let block = schedule.derive_key_block().unwrap();
        client.install_key_block(&block).unwrap();
        server.install_key_block(&block).unwrap();
    }
    (client, server)
}

fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}

#[test]
fn all_suites_roundtrip() {
    let _ = env_logger::try_init();

    let mut tested = 0;
    for suite in ALL_CIPHER_SUITES {
        for version in VERSIONS.iter().copied().filter(|v| suite.supports(*v)) {
            let (mut client, mut server) = pair(version, suite);

            if suite.mode == ModeKind::CntImit {
                assert!(
                    matches!(
                        client.protect_record(ContentType::ApplicationData, b"x"),
                        Err(Error::UnsupportedOperation(_))
                    ),
                    "{} {}",
                    suite,
                    version
                );
                continue;
            }

            for (i, len) in LENGTHS.iter().enumerate() {
                let data = payload(*len, i as u8);

                let record = client
                    .protect_record(ContentType::ApplicationData, &data)
                    .unwrap();
                let (ct, plain) = server
                    .unprotect_record(record.content_type, &record.fragment)
                    .unwrap_or_else(|e| panic!("{} {} len {}: {}", suite, version, len, e));
                assert_eq!(ct, ContentType::ApplicationData);
                assert_eq!(plain, data, "{} {}", suite, version);

                let reply = server.protect_record(ContentType::Handshake, &data).unwrap();
                let (ct, plain) = client
                    .unprotect_record(reply.content_type, &reply.fragment)
                    .unwrap();
                assert_eq!(ct, ContentType::Handshake);
                assert_eq!(plain, data);
            }

            assert_eq!(
                client.write_sequence().sequence_number,
                LENGTHS.len() as u64
            );
            assert_eq!(server.read_sequence().sequence_number, LENGTHS.len() as u64);
            tested += 1;
        }
    }
    assert!(tested > ALL_CIPHER_SUITES.len());
}

#[test]
fn all_suites_detect_tampering() {
    let _ = env_logger::try_init();

    for suite in ALL_CIPHER_SUITES {
        if suite.mode == ModeKind::CntImit || (suite.mac.is_none() && !suite.is_aead()) {
            continue;
        }
        for version in VERSIONS.iter().copied().filter(|v| suite.supports(*v)) {
            let (mut client, mut server) = pair(version, suite);
            let record = client
                .protect_record(ContentType::ApplicationData, &payload(40, 7))
                .unwrap();

            let mut forged = record.fragment.clone();
            let last = forged.len() - 1;
            forged[last] ^= 0x80;

            let err = server
                .unprotect_record(record.content_type, &forged)
                .unwrap_err();
            assert_eq!(
                err.alert(),
                AlertDescription::BadRecordMac,
                "{} {}: {}",
                suite,
                version,
                err
            );
        }
    }
}

#[test]
fn null_suite_still_counts() {
    let suite = CipherSuiteSpec::lookup(0x0000).unwrap();
    let (mut client, _) = pair(ProtocolVersion::Tls1_2, suite);
    for n in 1..=3 {
        let record = client
            .protect_record(ContentType::ApplicationData, b"clear")
            .unwrap();
        assert_eq!(record.fragment, b"clear");
        assert_eq!(client.write_sequence().sequence_number, n);
    }
}
