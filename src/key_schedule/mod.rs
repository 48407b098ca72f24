//! Key derivation for every protocol version.
//!
//! TLS 1.0 through 1.2 (and DTLS 1.0/1.2) derive a master secret with the
//! PRF and cut a key block from it, see [`Tls12KeySchedule`]. TLS 1.3 and
//! DTLS 1.3 walk the HKDF tree, see [`Tls13KeySchedule`]. Both answer the
//! common [`KeySchedule`] contract.

use crate::config::Config;
use crate::crypto::ConnectionSecret;
use crate::mode::CipherMode;
use crate::suite::CipherSuiteSpec;
use crate::types::{NegotiatedParameters, ProtocolVersion, Role};
use crate::Error;

mod tls12;
mod tls13;

pub use tls12::Tls12KeySchedule;
pub use tls13::{Tls13KeySchedule, TrafficEpoch};

/// Client or server hello random.
pub type Random = [u8; 32];

/// Length of the Finished verify_data before TLS 1.3.
pub const VERIFY_DATA_LEN: usize = 12;

/// What every version's key schedule can do.
pub trait KeySchedule: Send {
    /// Derive and keep the master secret.
    ///
    /// Before TLS 1.3 `transcript_digest` is the session hash; when given
    /// (and extended master secret is enabled) the RFC 7627 derivation is
    /// used. For TLS 1.3 `pre_master` is the (EC)DHE shared secret and the
    /// digest over ClientHello..ServerHello is required.
    fn derive_master_secret(
        &mut self,
        pre_master: &[u8],
        client_random: &Random,
        server_random: &Random,
        transcript_digest: Option<&[u8]>,
    ) -> Result<&ConnectionSecret, Error>;

    fn master_secret(&self) -> Result<&ConnectionSecret, Error>;

    /// verify_data of the Finished message sent by `role`.
    fn derive_finished_verify_data(
        &self,
        role: Role,
        transcript_digest: &[u8],
    ) -> Result<Vec<u8>, Error>;

    /// Destroy every secret held by the schedule.
    fn destroy(&mut self);
}

/// Pick the key schedule for the negotiated version.
pub fn new_key_schedule(
    params: &NegotiatedParameters,
    config: &Config,
) -> Result<Box<dyn KeySchedule>, Error> {
    if params.version.is_tls13() {
        Ok(Box::new(Tls13KeySchedule::new(params, None)?))
    } else {
        Ok(Box::new(Tls12KeySchedule::new(params, config)?))
    }
}

/// Keying material for one direction.
#[derive(Debug)]
pub struct TrafficKeys {
    pub mac_key: ConnectionSecret,
    pub key: ConnectionSecret,
    pub iv: ConnectionSecret,
}

impl TrafficKeys {
    /// Key a record transform with this material.
    pub fn cipher_mode(
        &self,
        suite: &CipherSuiteSpec,
        version: ProtocolVersion,
        for_encryption: bool,
    ) -> Result<CipherMode, Error> {
        suite.cipher_mode(
            version,
            for_encryption,
            self.key.data()?,
            self.mac_key.data()?,
            self.iv.data()?,
        )
    }

    pub fn destroy(&mut self) {
        self.mac_key.destroy();
        self.key.destroy();
        self.iv.destroy();
    }
}

/// Both directions' keys cut from the key block.
#[derive(Debug)]
pub struct KeyBlock {
    pub client: TrafficKeys,
    pub server: TrafficKeys,
}

impl KeyBlock {
    /// (write, read) keys as seen by `role`.
    pub fn for_role(&self, role: Role) -> (&TrafficKeys, &TrafficKeys) {
        match role {
            Role::Client => (&self.client, &self.server),
            Role::Server => (&self.server, &self.client),
        }
    }

    pub fn destroy(&mut self) {
        self.client.destroy();
        self.server.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_follows_version() {
        let tls13 = CipherSuiteSpec::lookup(0x1301).unwrap();
        let params = NegotiatedParameters::new(ProtocolVersion::Tls1_3, Role::Client, tls13);
        let schedule = new_key_schedule(&params, &Config::default()).unwrap();
        assert_eq!(
            schedule.master_secret().unwrap_err(),
            Error::MissingMasterSecret
        );

        let params = NegotiatedParameters::new(ProtocolVersion::Tls1_2, Role::Client, tls13);
        assert_eq!(
            new_key_schedule(&params, &Config::default()).err(),
            Some(Error::UnsupportedVersion(ProtocolVersion::Tls1_2))
        );
    }

    #[test]
    fn key_block_sides() {
        let keys = |b: u8| TrafficKeys {
            mac_key: ConnectionSecret::new("mac key", vec![b]),
            key: ConnectionSecret::new("key", vec![b]),
            iv: ConnectionSecret::new("iv", vec![b]),
        };
        let mut block = KeyBlock {
            client: keys(1),
            server: keys(2),
        };
        let (write, read) = block.for_role(Role::Server);
        assert_eq!(write.key.data().unwrap(), &[2]);
        assert_eq!(read.key.data().unwrap(), &[1]);

        block.destroy();
        assert!(block.client.iv.is_destroyed());
    }
}
