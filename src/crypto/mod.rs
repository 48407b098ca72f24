//! Hashing, MAC, PRF and HKDF primitives the key schedule and the record
//! layer are built on, plus the zeroizing secret container.

mod hash;
mod hkdf;
mod hmac;
mod nonce;
mod prf;
mod secret;

pub use hash::{digest, empty_digest, Hash};
pub use hkdf::{hkdf_expand, hkdf_expand_label, hkdf_extract};
pub use hmac::{hmac, verify as verify_hmac};
pub(crate) use nonce::{Nonce, EXPLICIT_NONCE_LEN, MAX_NONCE_LEN};
pub use prf::{prf_tls10, prf_tls12};
pub use secret::ConnectionSecret;
