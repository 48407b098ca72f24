use crate::Error;

/// Largest TLS plaintext fragment (RFC 8446 Section 5.1).
pub const MAX_PLAINTEXT_LEN: usize = 16384;

/// Record protection configuration
#[derive(Debug, Clone)]
pub struct Config {
    max_record_size: usize,
    with_extended_master_secret: bool,
    transcript_buffer_capacity: usize,
    dtls_replay_window: bool,
    tls13_padding: usize,
}

impl Config {
    /// Create a new configuration builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder {
            max_record_size: MAX_PLAINTEXT_LEN,
            with_extended_master_secret: true,
            transcript_buffer_capacity: 4096,
            dtls_replay_window: true,
            tls13_padding: 0,
        }
    }

    /// Max plaintext length of one record.
    ///
    /// Larger plaintexts are refused when protecting, and larger decrypted
    /// fragments fail with `RecordOverflow`.
    #[inline(always)]
    pub fn max_record_size(&self) -> usize {
        self.max_record_size
    }

    /// Whether to derive the master secret per the Extended Master Secret
    /// extension (rfc7627).
    #[inline(always)]
    pub fn with_extended_master_secret(&self) -> bool {
        self.with_extended_master_secret
    }

    /// Initial capacity of the transcript buffer used before the
    /// cipher suite is known.
    #[inline(always)]
    pub fn transcript_buffer_capacity(&self) -> usize {
        self.transcript_buffer_capacity
    }

    /// Whether DTLS reads reject duplicated and stale records.
    #[inline(always)]
    pub fn dtls_replay_window(&self) -> bool {
        self.dtls_replay_window
    }

    /// Zero bytes appended to every TLS 1.3 inner plaintext.
    #[inline(always)]
    pub fn tls13_padding(&self) -> usize {
        self.tls13_padding
    }
}

/// Builder for the record protection configuration.
pub struct ConfigBuilder {
    max_record_size: usize,
    with_extended_master_secret: bool,
    transcript_buffer_capacity: usize,
    dtls_replay_window: bool,
    tls13_padding: usize,
}

impl ConfigBuilder {
    /// Set the max plaintext length of one record.
    ///
    /// Defaults to 16384, which is also the upper bound.
    pub fn max_record_size(mut self, max_record_size: usize) -> Self {
        self.max_record_size = max_record_size;
        self
    }

    /// Set whether to use the Extended Master Secret derivation (rfc7627).
    ///
    /// Defaults to true.
    pub fn with_extended_master_secret(mut self, enabled: bool) -> Self {
        self.with_extended_master_secret = enabled;
        self
    }

    /// Set the initial capacity of the transcript buffer.
    ///
    /// Defaults to 4096.
    pub fn transcript_buffer_capacity(mut self, capacity: usize) -> Self {
        self.transcript_buffer_capacity = capacity;
        self
    }

    /// Set whether DTLS reads go through a replay window.
    ///
    /// Defaults to true.
    pub fn dtls_replay_window(mut self, enabled: bool) -> Self {
        self.dtls_replay_window = enabled;
        self
    }

    /// Set the number of zero bytes padding each TLS 1.3 record.
    ///
    /// Defaults to 0.
    pub fn tls13_padding(mut self, padding: usize) -> Self {
        self.tls13_padding = padding;
        self
    }

    /// Build the configuration.
    ///
    /// Returns `Error::RecordOverflow` if the record size is zero or above
    /// 16384, or if the TLS 1.3 padding leaves no room for content.
    pub fn build(self) -> Result<Config, Error> {
        if self.max_record_size == 0 || self.max_record_size > MAX_PLAINTEXT_LEN {
            return Err(Error::RecordOverflow {
                len: self.max_record_size,
                max: MAX_PLAINTEXT_LEN,
            });
        }
        if self.tls13_padding >= self.max_record_size {
            return Err(Error::RecordOverflow {
                len: self.tls13_padding,
                max: self.max_record_size,
            });
        }

        Ok(Config {
            max_record_size: self.max_record_size,
            with_extended_master_secret: self.with_extended_master_secret,
            transcript_buffer_capacity: self.transcript_buffer_capacity,
            dtls_replay_window: self.dtls_replay_window,
            tls13_padding: self.tls13_padding,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_record_size: MAX_PLAINTEXT_LEN,
            with_extended_master_secret: true,
            transcript_buffer_capacity: 4096,
            dtls_replay_window: true,
            tls13_padding: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.max_record_size(), 16384);
        assert!(config.with_extended_master_secret());
        assert_eq!(config.transcript_buffer_capacity(), 4096);
        assert!(config.dtls_replay_window());
        assert_eq!(config.tls13_padding(), 0);

        let default = Config::default();
        assert_eq!(default.max_record_size(), config.max_record_size());
    }

    #[test]
    fn rejects_oversized_records() {
        let err = Config::builder().max_record_size(16385).build().unwrap_err();
        assert_eq!(
            err,
            Error::RecordOverflow {
                len: 16385,
                max: 16384
            }
        );
        assert!(Config::builder().max_record_size(0).build().is_err());
    }

    #[test]
    fn padding_must_leave_room() {
        assert!(Config::builder()
            .max_record_size(512)
            .tls13_padding(512)
            .build()
            .is_err());
        let config = Config::builder().tls13_padding(32).build().unwrap();
        assert_eq!(config.tls13_padding(), 32);
    }
}
