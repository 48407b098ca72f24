use core::fmt;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProtocolVersion {
    Tls1_0,
    Tls1_1,
    Tls1_2,
    Tls1_3,
    Dtls1_0,
    Dtls1_2,
    Dtls1_3,
}

/// The pseudo-random function family a version derives its secrets with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrfFamily {
    /// MD5 ⊕ SHA-1 PRF of TLS 1.0/1.1 and DTLS 1.0.
    Tls10,
    /// Single-hash PRF of TLS 1.2 and DTLS 1.2.
    Tls12,
    /// HKDF secret tree of TLS 1.3 and DTLS 1.3.
    Hkdf,
}

impl ProtocolVersion {
    /// The version as it is negotiated (supported_versions for 1.3).
    pub fn wire(&self) -> [u8; 2] {
        use ProtocolVersion::*;
        // DTLS versions are using 1-complement.
        match self {
            Tls1_0 => [3, 1],
            Tls1_1 => [3, 2],
            Tls1_2 => [3, 3],
            Tls1_3 => [3, 4],
            Dtls1_0 => [!1, !0],
            Dtls1_2 => [!1, !2],
            Dtls1_3 => [!1, !3],
        }
    }

    /// The version written in record headers and MAC/AAD pseudo-headers.
    ///
    /// TLS 1.3 and DTLS 1.3 freeze this at the 1.2 value.
    pub fn record_version(&self) -> [u8; 2] {
        match self {
            ProtocolVersion::Tls1_3 => ProtocolVersion::Tls1_2.wire(),
            ProtocolVersion::Dtls1_3 => ProtocolVersion::Dtls1_2.wire(),
            v => v.wire(),
        }
    }

    pub fn from_wire(bytes: [u8; 2]) -> Result<Self, Error> {
        use ProtocolVersion::*;
        let v = match bytes {
            [3, 1] => Tls1_0,
            [3, 2] => Tls1_1,
            [3, 3] => Tls1_2,
            [3, 4] => Tls1_3,
            [0xfe, 0xff] => Dtls1_0,
            [0xfe, 0xfd] => Dtls1_2,
            [0xfe, 0xfc] => Dtls1_3,
            _ => return Err(Error::UnsupportedOperation("unknown protocol version")),
        };
        Ok(v)
    }

    pub fn is_dtls(&self) -> bool {
        matches!(
            self,
            ProtocolVersion::Dtls1_0 | ProtocolVersion::Dtls1_2 | ProtocolVersion::Dtls1_3
        )
    }

    pub fn is_tls13(&self) -> bool {
        matches!(self, ProtocolVersion::Tls1_3 | ProtocolVersion::Dtls1_3)
    }

    /// Whether CBC records carry an explicit per-record IV.
    ///
    /// Only TLS 1.0 chains the IV implicitly across records.
    pub fn uses_explicit_iv(&self) -> bool {
        !matches!(self, ProtocolVersion::Tls1_0)
    }

    pub fn prf_family(&self) -> PrfFamily {
        use ProtocolVersion::*;
        match self {
            Tls1_0 | Tls1_1 | Dtls1_0 => PrfFamily::Tls10,
            Tls1_2 | Dtls1_2 => PrfFamily::Tls12,
            Tls1_3 | Dtls1_3 => PrfFamily::Hkdf,
        }
    }

    /// Label prefix for HKDF-Expand-Label.
    pub fn hkdf_label_prefix(&self) -> &'static [u8] {
        if self.is_dtls() {
            b"dtls13"
        } else {
            b"tls13 "
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ProtocolVersion::*;
        write!(
            f,
            "{}",
            match self {
                Tls1_0 => "TLS 1.0",
                Tls1_1 => "TLS 1.1",
                Tls1_2 => "TLS 1.2",
                Tls1_3 => "TLS 1.3",
                Dtls1_0 => "DTLS 1.0",
                Dtls1_2 => "DTLS 1.2",
                Dtls1_3 => "DTLS 1.3",
            }
        )
    }
}
