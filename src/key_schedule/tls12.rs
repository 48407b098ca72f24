use zeroize::Zeroizing;

use super::{KeyBlock, KeySchedule, Random, TrafficKeys, VERIFY_DATA_LEN};
use crate::config::Config;
use crate::crypto::{prf_tls10, prf_tls12, ConnectionSecret};
use crate::suite::CipherSuiteSpec;
use crate::types::{NegotiatedParameters, PrfFamily, ProtocolVersion, Role};
use crate::Error;

const MASTER_SECRET_LEN: usize = 48;

/// PRF based key schedule of TLS 1.0 to 1.2 and DTLS 1.0/1.2.
///
/// ```text
/// master_secret = PRF(pre_master_secret, "master secret",
///                     ClientHello.random + ServerHello.random)[0..47]
///
/// key_block = PRF(master_secret, "key expansion",
///                 server_random + client_random)
/// ```
///
/// With extended master secret (RFC 7627) the randoms are replaced by the
/// session hash under the label "extended master secret".
pub struct Tls12KeySchedule {
    version: ProtocolVersion,
    suite: &'static CipherSuiteSpec,
    extended_master_secret: bool,
    randoms: Option<(Random, Random)>,
    master: Option<ConnectionSecret>,
}

impl Tls12KeySchedule {
    pub fn new(params: &NegotiatedParameters, config: &Config) -> Result<Self, Error> {
        if params.version.is_tls13() || params.suite.tls13 {
            return Err(Error::UnsupportedVersion(params.version));
        }
        Ok(Tls12KeySchedule {
            version: params.version,
            suite: params.suite,
            extended_master_secret: config.with_extended_master_secret(),
            randoms: None,
            master: None,
        })
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn suite(&self) -> &'static CipherSuiteSpec {
        self.suite
    }

    fn prf(
        &self,
        secret: &[u8],
        label: &str,
        seed: &[u8],
        len: usize,
    ) -> Result<Zeroizing<Vec<u8>>, Error> {
        match self.version.prf_family() {
            PrfFamily::Tls10 => prf_tls10(secret, label, seed, len),
            PrfFamily::Tls12 => prf_tls12(secret, label, seed, len, self.suite.prf_hash),
            PrfFamily::Hkdf => Err(Error::UnsupportedVersion(self.version)),
        }
    }

    /// Install a master secret from a resumed session.
    pub fn resume(
        &mut self,
        master: &[u8],
        client_random: &Random,
        server_random: &Random,
    ) -> Result<(), Error> {
        if master.len() != MASTER_SECRET_LEN {
            return Err(Error::InvalidKeyLength {
                expected: MASTER_SECRET_LEN,
                actual: master.len(),
            });
        }
        self.randoms = Some((*client_random, *server_random));
        self.master = Some(ConnectionSecret::new("master secret", master.to_vec()));
        debug!("Resumed {} session with {}", self.version, self.suite);
        Ok(())
    }

    fn randoms(&self) -> Result<&(Random, Random), Error> {
        self.randoms.as_ref().ok_or(Error::MissingMasterSecret)
    }

    /// Cut the key block into MAC keys, write keys and IVs for both sides.
    ///
    /// Export suites stretch their short keys with the "client write key" and
    /// "server write key" PRF and take their IVs from the "IV block".
    pub fn derive_key_block(&self) -> Result<KeyBlock, Error> {
        let suite = self.suite;
        if suite.export && self.version != ProtocolVersion::Tls1_0 {
            return Err(Error::UnsupportedOperation(
                "export key derivation after TLS 1.0",
            ));
        }
        let master = self.master_secret()?.data()?;
        let (client_random, server_random) = self.randoms()?;

        let mut seed = Vec::with_capacity(64);
        seed.extend_from_slice(server_random);
        seed.extend_from_slice(client_random);
        let block = self.prf(master, "key expansion", &seed, suite.key_block_len())?;

        let mut offset = 0;
        let mut take = |n: usize| {
            let part = block[offset..offset + n].to_vec();
            offset += n;
            part
        };
        let mac_len = suite.mac_len();
        let client_mac = take(mac_len);
        let server_mac = take(mac_len);
        let client_key = take(suite.key_len);
        let server_key = take(suite.key_len);

        let (client_key, server_key, client_iv, server_iv) = if suite.export {
            let mut randoms = Vec::with_capacity(64);
            randoms.extend_from_slice(client_random);
            randoms.extend_from_slice(server_random);
            let expanded = suite.expanded_key_len;
            let ck = self.prf(&client_key, "client write key", &randoms, expanded)?;
            let sk = self.prf(&server_key, "server write key", &randoms, expanded)?;
            let ivs = self.prf(&[], "IV block", &randoms, 2 * suite.fixed_iv_len)?;
            let (civ, siv) = ivs.split_at(suite.fixed_iv_len);
            (ck.to_vec(), sk.to_vec(), civ.to_vec(), siv.to_vec())
        } else {
            let client_iv = take(suite.fixed_iv_len);
            let server_iv = take(suite.fixed_iv_len);
            (client_key, server_key, client_iv, server_iv)
        };

        trace!(
            "Key block of {} bytes for {} under {}",
            block.len(),
            suite,
            self.version
        );

        Ok(KeyBlock {
            client: TrafficKeys {
                mac_key: ConnectionSecret::new("client write MAC key", client_mac),
                key: ConnectionSecret::new("client write key", client_key),
                iv: ConnectionSecret::new("client write IV", client_iv),
            },
            server: TrafficKeys {
                mac_key: ConnectionSecret::new("server write MAC key", server_mac),
                key: ConnectionSecret::new("server write key", server_key),
                iv: ConnectionSecret::new("server write IV", server_iv),
            },
        })
    }

    /// Keying material exporter (RFC 5705).
    pub fn export_keying_material(
        &self,
        label: &str,
        context: Option<&[u8]>,
        len: usize,
    ) -> Result<Vec<u8>, Error> {
        let master = self.master_secret()?.data()?;
        let (client_random, server_random) = self.randoms()?;

        let mut seed = Vec::with_capacity(64 + context.map(|c| c.len() + 2).unwrap_or(0));
        seed.extend_from_slice(client_random);
        seed.extend_from_slice(server_random);
        if let Some(context) = context {
            let context_len = u16::try_from(context.len())
                .map_err(|_| Error::UnsupportedOperation("exporter context too long"))?;
            seed.extend_from_slice(&context_len.to_be_bytes());
            seed.extend_from_slice(context);
        }
        Ok(self.prf(master, label, &seed, len)?.to_vec())
    }
}

impl KeySchedule for Tls12KeySchedule {
    fn derive_master_secret(
        &mut self,
        pre_master: &[u8],
        client_random: &Random,
        server_random: &Random,
        transcript_digest: Option<&[u8]>,
    ) -> Result<&ConnectionSecret, Error> {
        let master = match transcript_digest {
            Some(session_hash) if self.extended_master_secret => {
                self.prf(pre_master, "extended master secret", session_hash, MASTER_SECRET_LEN)?
            }
            _ => {
                let mut seed = Vec::with_capacity(64);
                seed.extend_from_slice(client_random);
                seed.extend_from_slice(server_random);
                self.prf(pre_master, "master secret", &seed, MASTER_SECRET_LEN)?
            }
        };
        debug!(
            "Derived {} master secret for {}",
            self.version, self.suite
        );

        if let Some(old) = &mut self.master {
            old.destroy();
        }
        self.randoms = Some((*client_random, *server_random));
        Ok(self
            .master
            .insert(ConnectionSecret::from_zeroizing("master secret", master)))
    }

    fn master_secret(&self) -> Result<&ConnectionSecret, Error> {
        self.master.as_ref().ok_or(Error::MissingMasterSecret)
    }

    fn derive_finished_verify_data(
        &self,
        role: Role,
        transcript_digest: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let label = match role {
            Role::Client => "client finished",
            Role::Server => "server finished",
        };
        let master = self.master_secret()?.data()?;
        Ok(self
            .prf(master, label, transcript_digest, VERIFY_DATA_LEN)?
            .to_vec())
    }

    fn destroy(&mut self) {
        if let Some(master) = &mut self.master {
            master.destroy();
        }
    }
}

impl std::fmt::Debug for Tls12KeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tls12KeySchedule")
            .field("version", &self.version)
            .field("suite", &self.suite.name)
            .field("master", &self.master)
            .finish()
    }
}
