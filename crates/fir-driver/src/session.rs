//! Device session
//!
//! One `FirSession` is exactly one open handle on one register window: the
//! cursor, the handshake phase, and the bus live here instead of in global
//! driver state, so multiple simulated devices coexist in one process and
//! every operation names the session it acts on.
//!
//! The `&mut self` API serializes operations at compile time. To share one
//! session across threads, wrap it in a `std::sync::Mutex` and hold the lock
//! for one read or write call only — never across a poll loop.

use crate::bus::RegisterBus;
use crate::cursor::{Cursor, ReadOutcome, WriteOutcome};
use crate::error::{FirError, Result};
use crate::handshake::{Handshake, Phase};
use fir_chip::regs;

/// Open session against a FIR register window.
#[derive(Debug)]
pub struct FirSession<B: RegisterBus> {
    bus: B,
    cursor: Cursor,
    handshake: Handshake,
}

impl<B: RegisterBus> FirSession<B> {
    /// Open a session over an attached bus.
    ///
    /// # Errors
    ///
    /// `ResourceUnavailable` if the bus does not span the full 257-word
    /// window.
    pub fn open(bus: B) -> Result<Self> {
        let words = bus.len_words();
        if words < regs::WINDOW_WORDS {
            return Err(FirError::resource_unavailable(
                "register bus",
                format!("window too small: {words} words, need {}", regs::WINDOW_WORDS),
            ));
        }
        tracing::debug!("session opened over {words}-word window");
        Ok(Self {
            bus,
            cursor: Cursor::new(regs::WINDOW_WORDS),
            handshake: Handshake::new(),
        })
    }

    /// Write one decimal integer to the window.
    ///
    /// Input beyond `BUF_SIZE - 1` (63) bytes is truncated before parsing —
    /// documented lossy behavior of the wire contract, logged as a warning.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` for malformed text (cursor unchanged); bus errors pass
    /// through.
    pub fn write(&mut self, text: &str) -> Result<WriteOutcome> {
        let text = truncate_input(text);
        let at_control_slot = self.cursor.offset() == regs::CONTROL_SLOT;
        let outcome = self.cursor.write_next(&mut self.bus, text)?;
        self.handshake.note_write(at_control_slot);
        Ok(outcome)
    }

    /// Read one decimal integer from the window.
    ///
    /// Returns the tagged outcome: wire text, decoded value, and whether this
    /// read was the wraparound trigger (ready seen at the status slot).
    ///
    /// # Errors
    ///
    /// Bus and formatting errors pass through; the cursor is unchanged on
    /// failure.
    pub fn read(&mut self) -> Result<ReadOutcome> {
        let outcome = self.cursor.read_next(&mut self.bus)?;
        self.handshake.note_read(outcome.wrapped);
        Ok(outcome)
    }

    /// Read one decimal integer into a caller-supplied byte buffer,
    /// NUL-terminated. Returns the outcome; `outcome.text.len()` bytes were
    /// written plus the NUL.
    ///
    /// # Errors
    ///
    /// `CopyFailed` if `buf` cannot hold the text plus NUL; the cursor is
    /// unchanged and the call may be retried with a larger buffer.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<ReadOutcome> {
        let outcome = self.cursor.read_next_into(&mut self.bus, buf)?;
        self.handshake.note_read(outcome.wrapped);
        Ok(outcome)
    }

    /// Current handshake phase.
    pub fn phase(&self) -> Phase {
        self.handshake.phase()
    }

    /// Current cursor offset into the window.
    pub fn cursor_offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Borrow the underlying bus (inspection; does not move the cursor).
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Close the session, detaching the bus. The session is consumed; there
    /// is no way to operate on it afterwards.
    ///
    /// # Errors
    ///
    /// `Detached` if the bus was already released out-of-band.
    pub fn close(mut self) -> Result<()> {
        tracing::debug!("session closed at offset {}", self.cursor.offset());
        self.bus.detach()
    }
}

/// Clamp input to `BUF_SIZE - 1` bytes (on a char boundary), as the wire
/// contract specifies for overlong writes.
fn truncate_input(text: &str) -> &str {
    let max = regs::BUF_SIZE - 1;
    if text.len() <= max {
        return text;
    }
    tracing::warn!(len = text.len(), max, "user data too long, truncating");
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimFir;

    #[test]
    fn open_requires_full_window() {
        // A detached bus reports a zero-length window.
        let mut sim = SimFir::new();
        sim.detach().unwrap();
        assert!(matches!(
            FirSession::open(sim),
            Err(FirError::ResourceUnavailable { .. })
        ));
    }

    #[test]
    fn overlong_write_is_truncated_not_rejected() {
        let mut session = FirSession::open(SimFir::new()).unwrap();

        // 70 zeros and a trailing 7: the first 63 bytes are all zeros, so the
        // stored value is 0 — the 7 is silently dropped.
        let input = format!("{}7", "0".repeat(70));
        session.write(&input).unwrap();
        assert_eq!(session.bus().word(0), 0);
        assert_eq!(session.cursor_offset(), 1);
    }

    #[test]
    fn truncated_garbage_still_invalid() {
        let mut session = FirSession::open(SimFir::new()).unwrap();
        let input = "9".repeat(100); // 63 nines overflow i32
        assert!(matches!(
            session.write(&input),
            Err(FirError::InvalidFormat { .. })
        ));
        assert_eq!(session.cursor_offset(), 0);
    }

    #[test]
    fn phase_follows_protocol() {
        let mut session = FirSession::open(SimFir::with_taps(vec![1])).unwrap();
        assert_eq!(session.phase(), Phase::Idle);

        for i in 0..regs::NUM_SAMPLES {
            session.write(&i.to_string()).unwrap();
        }
        assert_eq!(session.phase(), Phase::Loading);

        let outcome = session.write("1").unwrap();
        assert_eq!(outcome, WriteOutcome::Saturated);
        assert_eq!(session.phase(), Phase::Started);

        let poll = session.read().unwrap();
        assert!(poll.wrapped);
        assert_eq!(session.phase(), Phase::Draining);

        for i in 0..regs::NUM_SAMPLES {
            let out = session.read().unwrap();
            assert_eq!(out.value, i as i32, "passthrough output {i}");
        }
        assert_eq!(session.phase(), Phase::Idle);

        session.close().unwrap();
    }

    #[test]
    fn close_detaches_bus() {
        let session = FirSession::open(SimFir::new()).unwrap();
        session.close().unwrap();
    }

    #[test]
    fn read_into_nul_terminates() {
        let mut session = FirSession::open(SimFir::new()).unwrap();
        session.write("1234").unwrap();

        let mut fresh = FirSession::open(session_bus_clone(&session)).unwrap();
        let mut buf = [0xffu8; regs::BUF_SIZE];
        let out = fresh.read_into(&mut buf).unwrap();
        assert_eq!(out.text, "1234");
        assert_eq!(&buf[..5], b"1234\0");
    }

    fn session_bus_clone(session: &FirSession<SimFir>) -> SimFir {
        session.bus().clone()
    }
}
