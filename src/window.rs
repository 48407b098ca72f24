use crate::Error;

const WINDOW_SIZE: u64 = 64;

/// Sliding replay window for DTLS record sequence numbers.
///
/// Keeps the latest accepted sequence number and a 64-bit bitmap of the
/// last 64 seen sequence numbers to reject duplicates and old records.
///
/// Checking and marking are separate steps: a record is only marked once it
/// authenticated (RFC 6347 Section 4.1.2.6).
#[derive(Debug, Default)]
pub struct ReplayWindow {
    max_seq: u64,
    window: u64,
}

impl ReplayWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with `ReplayedRecord` if the sequence number was already seen or
    /// is older than the window.
    pub fn check(&self, seqno: u64) -> Result<(), Error> {
        if seqno > self.max_seq {
            return Ok(());
        }
        let offset = self.max_seq - seqno;
        if offset >= WINDOW_SIZE || self.window & (1 << offset) != 0 {
            return Err(Error::ReplayedRecord(seqno));
        }
        Ok(())
    }

    /// Mark an authenticated record as seen.
    pub fn update(&mut self, seqno: u64) {
        if seqno > self.max_seq {
            let delta = seqno - self.max_seq;
            self.window = if delta >= WINDOW_SIZE {
                0
            } else {
                self.window << delta
            };
            self.window |= 1; // mark newest as seen
            self.max_seq = seqno;
        } else {
            let offset = self.max_seq - seqno;
            if offset < WINDOW_SIZE {
                self.window |= 1 << offset;
            }
        }
    }

    /// Check and mark in one go.
    pub fn check_and_update(&mut self, seqno: u64) -> Result<(), Error> {
        self.check(seqno)?;
        self.update(seqno);
        Ok(())
    }

    /// Forget everything, e.g. on an epoch change.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_fresh_and_rejects_duplicate() {
        let mut w = ReplayWindow::new();
        assert!(w.check_and_update(0).is_ok());
        assert_eq!(w.check_and_update(0), Err(Error::ReplayedRecord(0)));
        assert!(w.check_and_update(1).is_ok());
        assert!(w.check_and_update(2).is_ok());
    }

    #[test]
    fn accepts_out_of_order_within_window() {
        let mut w = ReplayWindow::new();
        assert!(w.check_and_update(10).is_ok());
        assert!(w.check_and_update(8).is_ok());
        assert!(w.check_and_update(8).is_err());
        assert!(w.check_and_update(9).is_ok());
    }

    #[test]
    fn rejects_too_old() {
        let mut w = ReplayWindow::new();
        w.update(100);
        // offset 64
        assert_eq!(w.check(36), Err(Error::ReplayedRecord(36)));
        // offset 63
        assert!(w.check_and_update(37).is_ok());
        assert!(w.check(37).is_err());
    }

    #[test]
    fn large_jump_clears_window() {
        let mut w = ReplayWindow::new();
        w.update(1);
        w.update(80);
        assert!(w.check(79).is_ok());
        assert!(w.check(17).is_ok());
        assert!(w.check(16).is_err());
        assert!(w.check(80).is_err());
    }

    #[test]
    fn check_does_not_mark() {
        let mut w = ReplayWindow::new();
        assert!(w.check(5).is_ok());
        assert!(w.check(5).is_ok());
        w.update(5);
        assert!(w.check(5).is_err());

        w.reset();
        assert!(w.check(5).is_ok());
    }
}
