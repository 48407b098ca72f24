//! NULL and stream cipher records: content || MAC, the latter encrypted
//! with the keystream.

use super::RecordTransform;
use crate::auth::ExchangeAuthenticator;
use crate::engine::StreamEngine;
use crate::types::ContentType;
use crate::Error;

pub(super) struct NullMode;

impl RecordTransform for NullMode {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mac = auth.compute_mac(content_type, plaintext)?;
        let mut out = Vec::with_capacity(plaintext.len() + mac.len());
        out.extend_from_slice(plaintext);
        out.extend_from_slice(&mac);
        Ok(out)
    }

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let content_len = auth.check_stream_mac(content_type, record)?;
        Ok(record[..content_len].to_vec())
    }
}

pub(super) struct StreamMode {
    engine: StreamEngine,
}

impl StreamMode {
    pub fn new(engine: StreamEngine) -> Self {
        StreamMode { engine }
    }
}

impl RecordTransform for StreamMode {
    fn encrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let mut out = NullMode.encrypt(auth, content_type, plaintext)?;
        self.engine.apply_keystream(&mut out);
        Ok(out)
    }

    fn decrypt(
        &mut self,
        auth: &ExchangeAuthenticator,
        content_type: ContentType,
        record: &[u8],
    ) -> Result<Vec<u8>, Error> {
        // The keystream advances even if the MAC turns out bad.
        let mut decrypted = record.to_vec();
        self.engine.apply_keystream(&mut decrypted);
        let content_len = auth.check_stream_mac(content_type, &decrypted)?;
        decrypted.truncate(content_len);
        Ok(decrypted)
    }

    fn reset(&mut self) {
        self.engine.reset();
    }
}
