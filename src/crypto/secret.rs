use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use crate::Error;

/// A derived secret, tagged with the label it was derived under.
///
/// Not `Clone`: the bytes are only ever copied on purpose through
/// [`ConnectionSecret::data`]. Zeroized on drop and on [`destroy`].
///
/// [`destroy`]: ConnectionSecret::destroy
pub struct ConnectionSecret {
    label: &'static str,
    data: Option<Zeroizing<Vec<u8>>>,
}

impl ConnectionSecret {
    pub fn new(label: &'static str, data: Vec<u8>) -> Self {
        ConnectionSecret {
            label,
            data: Some(Zeroizing::new(data)),
        }
    }

    pub(crate) fn from_zeroizing(label: &'static str, data: Zeroizing<Vec<u8>>) -> Self {
        ConnectionSecret {
            label,
            data: Some(data),
        }
    }

    /// The derivation label, e.g. "master secret".
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The secret bytes. Fails once the secret has been destroyed.
    pub fn data(&self) -> Result<&[u8], Error> {
        self.data
            .as_deref()
            .map(|d| d.as_slice())
            .ok_or(Error::AccessAfterDestroy(self.label))
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_destroyed(&self) -> bool {
        self.data.is_none()
    }

    /// Overwrite the bytes with zeros and make every later read fail.
    pub fn destroy(&mut self) {
        if let Some(mut data) = self.data.take() {
            data.zeroize();
        }
    }
}

impl fmt::Debug for ConnectionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSecret")
            .field("label", &self.label)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_after_destroy_fails() {
        let mut secret = ConnectionSecret::new("master secret", vec![0xaa; 48]);
        assert_eq!(secret.data().unwrap(), &[0xaa; 48][..]);

        secret.destroy();
        assert!(secret.is_destroyed());
        assert_eq!(secret.data(), Err(Error::AccessAfterDestroy("master secret")));

        // Destroying twice is harmless.
        secret.destroy();
        assert!(secret.data().is_err());
    }

    #[test]
    fn debug_hides_bytes() {
        let secret = ConnectionSecret::new("finished", vec![0x42; 4]);
        let s = format!("{:?}", secret);
        assert!(s.contains("finished"));
        assert!(!s.contains("66"));
        assert!(!s.contains("42"));
    }
}
