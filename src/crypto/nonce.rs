//! Per-record nonce construction for AEAD record protection.

/// Explicit nonce length for TLS 1.2 GCM/CCM records.
///
/// The explicit nonce is transmitted with each record.
pub const EXPLICIT_NONCE_LEN: usize = 8;

/// Largest nonce any mode uses (a Kuznyechik block).
pub const MAX_NONCE_LEN: usize = 16;

/// AEAD nonce, 8 to 16 bytes depending on the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce {
    bytes: [u8; MAX_NONCE_LEN],
    len: usize,
}

impl Nonce {
    /// Combine the fixed IV from the key block with the explicit nonce sent
    /// on the wire (TLS 1.2 GCM/CCM).
    pub fn new(fixed_iv: &[u8], explicit_nonce: &[u8]) -> Self {
        let len = fixed_iv.len() + explicit_nonce.len();
        debug_assert!(len <= MAX_NONCE_LEN);
        let mut bytes = [0u8; MAX_NONCE_LEN];
        bytes[..fixed_iv.len()].copy_from_slice(fixed_iv);
        bytes[fixed_iv.len()..len].copy_from_slice(explicit_nonce);
        Self { bytes, len }
    }

    /// XOR the IV with the left-padded sequence number.
    ///
    /// Per RFC 8446 Section 5.3: nonce = iv XOR pad_left(seq, iv_len)
    pub fn xor(iv: &[u8], seq: &[u8; 8]) -> Self {
        let len = iv.len();
        debug_assert!((8..=MAX_NONCE_LEN).contains(&len));
        let mut bytes = [0u8; MAX_NONCE_LEN];
        bytes[..len].copy_from_slice(iv);
        for (i, s) in seq.iter().enumerate() {
            bytes[len - 8 + i] ^= s;
        }
        Self { bytes, len }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}
