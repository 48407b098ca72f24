//! TLS 1.3 and DTLS 1.3 key schedule (RFC 8446 Section 7.1).
//!
//! ```text
//!              0
//!              |
//!              v
//!    PSK ->  HKDF-Extract = Early Secret
//!              |
//!              +-----> Derive-Secret(., "ext binder" | "res binder", "")
//!              |                     = binder_key
//!              |
//!              +-----> Derive-Secret(., "c e traffic", ClientHello)
//!              |                     = client_early_traffic_secret
//!              v
//!        Derive-Secret(., "derived", "")
//!              |
//!              v
//!    (EC)DHE -> HKDF-Extract = Handshake Secret
//!              |
//!              +-----> Derive-Secret(., "c hs traffic",
//!              |                     ClientHello...ServerHello)
//!              |                     = client_handshake_traffic_secret
//!              |
//!              +-----> Derive-Secret(., "s hs traffic",
//!              |                     ClientHello...ServerHello)
//!              |                     = server_handshake_traffic_secret
//!              v
//!        Derive-Secret(., "derived", "")
//!              |
//!              v
//!    0 -> HKDF-Extract = Master Secret
//!              |
//!              +-----> Derive-Secret(., "c ap traffic",
//!              |                     ClientHello...server Finished)
//!              |                     = client_application_traffic_secret_0
//!              |
//!              +-----> Derive-Secret(., "s ap traffic",
//!              |                     ClientHello...server Finished)
//!              |                     = server_application_traffic_secret_0
//!              |
//!              +-----> Derive-Secret(., "exp master",
//!              |                     ClientHello...server Finished)
//!              |                     = exporter_master_secret
//!              |
//!              +-----> Derive-Secret(., "res master",
//!                                    ClientHello...client Finished)
//!                                    = resumption_master_secret
//! ```
//!
//! DTLS 1.3 runs the same tree with the "dtls13" label prefix (RFC 9147).

use zeroize::Zeroizing;

use super::{KeySchedule, Random, TrafficKeys};
use crate::crypto::{
    digest, empty_digest, hkdf_expand_label, hkdf_extract, hmac, ConnectionSecret,
};
use crate::suite::CipherSuiteSpec;
use crate::types::{HashAlgorithm, NegotiatedParameters, ProtocolVersion, Role};
use crate::Error;

/// Which traffic secrets to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficEpoch {
    Handshake,
    Application,
}

/// Secrets of one side, per epoch.
#[derive(Debug, Default)]
struct SideSecrets {
    client: Option<ConnectionSecret>,
    server: Option<ConnectionSecret>,
}

impl SideSecrets {
    fn get(&self, role: Role) -> Result<&ConnectionSecret, Error> {
        match role {
            Role::Client => self.client.as_ref(),
            Role::Server => self.server.as_ref(),
        }
        .ok_or(Error::MissingMasterSecret)
    }

    fn slot(&mut self, role: Role) -> &mut Option<ConnectionSecret> {
        match role {
            Role::Client => &mut self.client,
            Role::Server => &mut self.server,
        }
    }

    fn destroy(&mut self) {
        for secret in [&mut self.client, &mut self.server].into_iter().flatten() {
            secret.destroy();
        }
    }
}

/// HKDF based key schedule.
///
/// Keeps every secret it derives so traffic keys, Finished values and
/// exported material can be read at any later point until [`destroy`].
///
/// [`destroy`]: KeySchedule::destroy
#[derive(Debug)]
pub struct Tls13KeySchedule {
    version: ProtocolVersion,
    suite: &'static CipherSuiteSpec,
    hash: HashAlgorithm,
    early: ConnectionSecret,
    handshake: Option<ConnectionSecret>,
    master: Option<ConnectionSecret>,
    handshake_traffic: SideSecrets,
    application_traffic: SideSecrets,
    exporter: Option<ConnectionSecret>,
    resumption: Option<ConnectionSecret>,
}

impl Tls13KeySchedule {
    /// Start the schedule at the early secret. Without a PSK a string of
    /// zeros is used.
    pub fn new(params: &NegotiatedParameters, psk: Option<&[u8]>) -> Result<Self, Error> {
        if !params.version.is_tls13() || !params.suite.tls13 {
            return Err(Error::UnsupportedVersion(params.version));
        }
        let hash = params.suite.prf_hash;
        let zeros = vec![0u8; hash.output_len()];
        let early = hkdf_extract(hash, &[], psk.unwrap_or(&zeros[..]));

        Ok(Tls13KeySchedule {
            version: params.version,
            suite: params.suite,
            hash,
            early: ConnectionSecret::from_zeroizing("early secret", early),
            handshake: None,
            master: None,
            handshake_traffic: SideSecrets::default(),
            application_traffic: SideSecrets::default(),
            exporter: None,
            resumption: None,
        })
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    pub fn suite(&self) -> &'static CipherSuiteSpec {
        self.suite
    }

    fn expand_label(
        &self,
        secret: &[u8],
        label: &[u8],
        context: &[u8],
        len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        hkdf_expand_label(
            self.hash,
            self.version.hkdf_label_prefix(),
            secret,
            label,
            context,
            len,
        )
    }

    /// Derive-Secret(Secret, Label, Messages) with the digest already taken.
    fn derive_secret(
        &self,
        secret: &ConnectionSecret,
        label: &[u8],
        transcript_digest: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        self.expand_label(
            secret.data()?,
            label,
            transcript_digest,
            self.hash.output_len(),
        )
    }

    /// Binder key for PSK binders, external or resumption.
    pub fn binder_key(&self, resumption: bool) -> Result<ConnectionSecret, Error> {
        let label: &[u8] = if resumption { b"res binder" } else { b"ext binder" };
        let key = self.derive_secret(&self.early, label, &empty_digest(self.hash))?;
        Ok(ConnectionSecret::from_zeroizing("binder key", key))
    }

    pub fn client_early_traffic_secret(
        &self,
        client_hello_digest: &[u8],
    ) -> Result<ConnectionSecret, Error> {
        let secret = self.derive_secret(&self.early, b"c e traffic", client_hello_digest)?;
        Ok(ConnectionSecret::from_zeroizing(
            "client early traffic secret",
            secret,
        ))
    }

    /// Inject the (EC)DHE shared secret. `transcript_digest` covers
    /// ClientHello..ServerHello.
    pub fn derive_handshake_secrets(
        &mut self,
        shared_secret: &[u8],
        transcript_digest: &[u8],
    ) -> Result<(), Error> {
        let derived = self.derive_secret(&self.early, b"derived", &empty_digest(self.hash))?;
        let handshake = ConnectionSecret::from_zeroizing(
            "handshake secret",
            hkdf_extract(self.hash, &derived, shared_secret),
        );

        let client = self.derive_secret(&handshake, b"c hs traffic", transcript_digest)?;
        let server = self.derive_secret(&handshake, b"s hs traffic", transcript_digest)?;
        self.handshake_traffic.destroy();
        self.handshake_traffic = SideSecrets {
            client: Some(ConnectionSecret::from_zeroizing(
                "client handshake traffic secret",
                client,
            )),
            server: Some(ConnectionSecret::from_zeroizing(
                "server handshake traffic secret",
                server,
            )),
        };
        self.handshake = Some(handshake);
        debug!("Derived {} handshake traffic secrets", self.version);
        Ok(())
    }

    fn derive_master(&mut self) -> Result<&ConnectionSecret, Error> {
        let handshake = self.handshake.as_ref().ok_or(Error::MissingMasterSecret)?;
        let derived = self.derive_secret(handshake, b"derived", &empty_digest(self.hash))?;
        let zeros = vec![0u8; self.hash.output_len()];
        let master = hkdf_extract(self.hash, &derived, &zeros);
        Ok(self
            .master
            .insert(ConnectionSecret::from_zeroizing("master secret", master)))
    }

    /// Application traffic secrets and the exporter master secret.
    /// `transcript_digest` covers ClientHello..server Finished.
    pub fn derive_application_secrets(&mut self, transcript_digest: &[u8]) -> Result<(), Error> {
        let master = self.master_secret()?;
        let client = self.derive_secret(master, b"c ap traffic", transcript_digest)?;
        let server = self.derive_secret(master, b"s ap traffic", transcript_digest)?;
        let exporter = self.derive_secret(master, b"exp master", transcript_digest)?;

        self.application_traffic.destroy();
        self.application_traffic = SideSecrets {
            client: Some(ConnectionSecret::from_zeroizing(
                "client application traffic secret",
                client,
            )),
            server: Some(ConnectionSecret::from_zeroizing(
                "server application traffic secret",
                server,
            )),
        };
        self.exporter = Some(ConnectionSecret::from_zeroizing(
            "exporter master secret",
            exporter,
        ));
        debug!("Derived {} application traffic secrets", self.version);
        Ok(())
    }

    /// `transcript_digest` covers ClientHello..client Finished.
    pub fn derive_resumption_master_secret(
        &mut self,
        transcript_digest: &[u8],
    ) -> Result<&ConnectionSecret, Error> {
        let secret = self.derive_secret(self.master_secret()?, b"res master", transcript_digest)?;
        Ok(self.resumption.insert(ConnectionSecret::from_zeroizing(
            "resumption master secret",
            secret,
        )))
    }

    /// PSK for a NewSessionTicket with the given nonce.
    pub fn resumption_psk(&self, ticket_nonce: &[u8]) -> Result<ConnectionSecret, Error> {
        let resumption = self.resumption.as_ref().ok_or(Error::MissingMasterSecret)?;
        let psk = self.expand_label(
            resumption.data()?,
            b"resumption",
            ticket_nonce,
            self.hash.output_len(),
        )?;
        Ok(ConnectionSecret::from_zeroizing("resumption psk", psk))
    }

    pub fn traffic_secret(&self, role: Role, epoch: TrafficEpoch) -> Result<&ConnectionSecret, Error> {
        match epoch {
            TrafficEpoch::Handshake => self.handshake_traffic.get(role),
            TrafficEpoch::Application => self.application_traffic.get(role),
        }
    }

    pub fn exporter_master_secret(&self) -> Result<&ConnectionSecret, Error> {
        self.exporter.as_ref().ok_or(Error::MissingMasterSecret)
    }

    /// Write key and IV for a traffic secret. There is no MAC key.
    pub fn traffic_keys(&self, secret: &ConnectionSecret) -> Result<TrafficKeys, Error> {
        let secret = secret.data()?;
        let key = self.expand_label(secret, b"key", &[], self.suite.key_len)?;
        let iv = self.expand_label(secret, b"iv", &[], self.suite.iv_len())?;
        Ok(TrafficKeys {
            mac_key: ConnectionSecret::new("mac key", Vec::new()),
            key: ConnectionSecret::from_zeroizing("traffic key", key),
            iv: ConnectionSecret::from_zeroizing("traffic iv", iv),
        })
    }

    /// Roll the application traffic secret of `role` forward (KeyUpdate).
    /// The previous secret is destroyed.
    pub fn update_traffic_secret(&mut self, role: Role) -> Result<&ConnectionSecret, Error> {
        let current = self.application_traffic.get(role)?;
        let next = self.expand_label(
            current.data()?,
            b"traffic upd",
            &[],
            self.hash.output_len(),
        )?;
        let label = current.label();

        let slot = self.application_traffic.slot(role);
        if let Some(old) = slot.as_mut() {
            old.destroy();
        }
        trace!("Updated {} application traffic secret", role);
        Ok(slot.insert(ConnectionSecret::from_zeroizing(label, next)))
    }

    /// TLS-Exporter(label, context, length) (RFC 8446 Section 7.5).
    pub fn export_keying_material(
        &self,
        label: &[u8],
        context: &[u8],
        len: usize,
    ) -> Result<Vec<u8>, Error> {
        let exporter = self.exporter_master_secret()?;
        let secret = self.derive_secret(exporter, label, &empty_digest(self.hash))?;
        let out = self.expand_label(&secret, b"exporter", &digest(self.hash, context), len)?;
        Ok(out.to_vec())
    }
}

impl KeySchedule for Tls13KeySchedule {
    /// Runs the handshake stage with the shared secret and continues to the
    /// master secret. The randoms are not used.
    fn derive_master_secret(
        &mut self,
        pre_master: &[u8],
        _client_random: &Random,
        _server_random: &Random,
        transcript_digest: Option<&[u8]>,
    ) -> Result<&ConnectionSecret, Error> {
        let digest = transcript_digest.ok_or(Error::MissingTranscriptDigest)?;
        self.derive_handshake_secrets(pre_master, digest)?;
        self.derive_master()
    }

    fn master_secret(&self) -> Result<&ConnectionSecret, Error> {
        self.master.as_ref().ok_or(Error::MissingMasterSecret)
    }

    fn derive_finished_verify_data(
        &self,
        role: Role,
        transcript_digest: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let base = self.handshake_traffic.get(role)?;
        let mut finished_key = ConnectionSecret::from_zeroizing(
            "finished key",
            self.expand_label(base.data()?, b"finished", &[], self.hash.output_len())?,
        );
        let verify_data = hmac(self.hash, finished_key.data()?, &[transcript_digest]);
        finished_key.destroy();
        verify_data
    }

    fn destroy(&mut self) {
        self.early.destroy();
        for secret in [
            &mut self.handshake,
            &mut self.master,
            &mut self.exporter,
            &mut self.resumption,
        ]
        .into_iter()
        .flatten()
        {
            secret.destroy();
        }
        self.handshake_traffic.destroy();
        self.application_traffic.destroy();
        debug!("Destroyed {} key schedule", self.version);
    }
}
