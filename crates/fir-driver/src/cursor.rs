//! Cursor protocol engine
//!
//! Owns the monotonic offset into the register window and the translation
//! between decimal text and register-words. The cursor only moves forward,
//! clamping at the final slot when the producer overruns the window, and
//! resets to zero in exactly one situation: the ready sentinel observed at
//! the final slot, which re-arms the window for the drain.

use crate::bus::RegisterBus;
use crate::error::{FirError, Result};
use fir_chip::regs;
use std::fmt::Write as _;

/// Result of one cursor write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Value stored, cursor advanced.
    Stored,
    /// Value stored at the final slot; the cursor clamped there. Non-fatal:
    /// further writes keep overwriting that slot.
    Saturated,
}

/// Result of one cursor read: the wire text plus the decoded value, and
/// whether this read was the wraparound trigger. The wire format stays a
/// single integer; the tag keeps the handshake logic out of text parsing.
#[derive(Debug, Clone)]
pub struct ReadOutcome {
    /// Decimal rendering of the register value.
    pub text: String,
    /// The register value, as a signed sample.
    pub value: i32,
    /// True when this read hit the ready sentinel at the final slot and the
    /// cursor reset to zero.
    pub wrapped: bool,
}

/// Read/write cursor over a register window of `len` words.
#[derive(Debug)]
pub struct Cursor {
    offset: usize,
    len: usize,
}

impl Cursor {
    /// Cursor at offset zero over a window of `len` register-words.
    pub fn new(len: usize) -> Self {
        Self { offset: 0, len }
    }

    /// Current offset.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Parse `text` as a decimal integer and store it at the current offset.
    ///
    /// A trailing newline is tolerated, as line-oriented clients produce one.
    /// The cursor is untouched on parse failure — no partial update is ever
    /// visible. After a successful store the cursor advances, clamping at the
    /// final slot with a [`WriteOutcome::Saturated`] advisory once the window
    /// is full.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` if `text` is not a decimal `i32`; bus errors pass
    /// through.
    pub fn write_next<B: RegisterBus>(&mut self, bus: &mut B, text: &str) -> Result<WriteOutcome> {
        let trimmed = text.trim_end_matches(['\n', '\r']);
        let value: i32 = trimmed
            .parse()
            .map_err(|_| FirError::invalid_format(trimmed))?;

        bus.store(self.offset, value as u32)?;

        if self.offset + 1 >= self.len {
            tracing::warn!(
                offset = self.offset,
                "too many writes, clamping at the final slot"
            );
            self.offset = self.len - 1;
            Ok(WriteOutcome::Saturated)
        } else {
            self.offset += 1;
            Ok(WriteOutcome::Stored)
        }
    }

    /// Load the word at the current offset and render it as decimal text.
    ///
    /// At the final slot the cursor either resets to zero (value equals the
    /// ready sentinel — the wraparound trigger) or stays put, so repeated
    /// status polls keep re-reading that slot instead of running off the
    /// window. Everywhere else it advances by one.
    ///
    /// # Errors
    ///
    /// `FormatError` if the value cannot be rendered (defensive); bus errors
    /// pass through. The cursor is untouched on failure.
    pub fn read_next<B: RegisterBus>(&mut self, bus: &mut B) -> Result<ReadOutcome> {
        let (word, text) = self.load_and_format(bus)?;
        let wrapped = self.commit(word);
        Ok(ReadOutcome {
            text,
            value: word as i32,
            wrapped,
        })
    }

    /// Like [`Cursor::read_next`], but copies the text (NUL-terminated) into
    /// `buf` before the cursor moves.
    ///
    /// # Errors
    ///
    /// `CopyFailed` if `buf` cannot hold the text plus NUL — the cursor is
    /// untouched, so the caller may retry with a bigger buffer.
    pub fn read_next_into<B: RegisterBus>(
        &mut self,
        bus: &mut B,
        buf: &mut [u8],
    ) -> Result<ReadOutcome> {
        let (word, text) = self.load_and_format(bus)?;

        let needed = text.len() + 1;
        if needed > buf.len() {
            return Err(FirError::CopyFailed {
                needed,
                capacity: buf.len(),
            });
        }
        buf[..text.len()].copy_from_slice(text.as_bytes());
        buf[text.len()] = 0;

        let wrapped = self.commit(word);
        Ok(ReadOutcome {
            text,
            value: word as i32,
            wrapped,
        })
    }

    fn load_and_format<B: RegisterBus>(&self, bus: &mut B) -> Result<(u32, String)> {
        let word = bus.load(self.offset)?;
        let mut text = String::with_capacity(12);
        write!(text, "{}", word as i32).map_err(|_| FirError::FormatError)?;
        Ok((word, text))
    }

    /// Advance past a successfully read word; returns true on wraparound.
    fn commit(&mut self, word: u32) -> bool {
        if self.offset == self.len - 1 {
            if word == regs::READY {
                self.offset = 0;
                return true;
            }
            // Hold position: the status slot is re-polled until ready.
        } else {
            self.offset += 1;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimFir;

    fn cursor() -> Cursor {
        Cursor::new(regs::WINDOW_WORDS)
    }

    #[test]
    fn writes_advance_then_saturate() {
        let mut sim = SimFir::with_taps(vec![1]);
        let mut cur = cursor();

        for i in 0..regs::DATA_SLOTS {
            assert_eq!(
                cur.write_next(&mut sim, &i.to_string()).unwrap(),
                WriteOutcome::Stored
            );
        }
        assert_eq!(cur.offset(), 256);

        // Writes at the final slot clamp there and advise saturation.
        assert_eq!(
            cur.write_next(&mut sim, "500").unwrap(),
            WriteOutcome::Saturated
        );
        assert_eq!(cur.offset(), 256);
        assert_eq!(
            cur.write_next(&mut sim, "501").unwrap(),
            WriteOutcome::Saturated
        );
        assert_eq!(cur.offset(), 256);
    }

    #[test]
    fn invalid_input_leaves_cursor_unchanged() {
        let mut sim = SimFir::new();
        let mut cur = cursor();
        cur.write_next(&mut sim, "5").unwrap();

        let err = cur.write_next(&mut sim, "not a number").unwrap_err();
        assert!(matches!(err, FirError::InvalidFormat { .. }));
        assert_eq!(cur.offset(), 1);

        // Empty input is malformed too.
        assert!(cur.write_next(&mut sim, "").is_err());
        assert_eq!(cur.offset(), 1);
    }

    #[test]
    fn trailing_newline_tolerated() {
        let mut sim = SimFir::new();
        let mut cur = cursor();
        cur.write_next(&mut sim, "-42\n").unwrap();
        assert_eq!(sim.word(0) as i32, -42);
    }

    #[test]
    fn ready_at_final_slot_wraps() {
        let mut sim = SimFir::new();
        sim.store(regs::STATUS_SLOT, regs::READY).unwrap();
        let mut cur = Cursor {
            offset: regs::STATUS_SLOT,
            len: regs::WINDOW_WORDS,
        };

        let out = cur.read_next(&mut sim).unwrap();
        assert!(out.wrapped);
        assert_eq!(out.value, 1);
        assert_eq!(cur.offset(), 0);
    }

    #[test]
    fn not_ready_at_final_slot_holds_position() {
        let mut sim = SimFir::new();
        sim.store(regs::STATUS_SLOT, 0).unwrap();
        let mut cur = Cursor {
            offset: regs::STATUS_SLOT,
            len: regs::WINDOW_WORDS,
        };

        for _ in 0..4 {
            let out = cur.read_next(&mut sim).unwrap();
            assert!(!out.wrapped);
            assert_eq!(out.value, 0);
            assert_eq!(cur.offset(), regs::STATUS_SLOT);
        }
    }

    #[test]
    fn reads_advance_through_data_slots() {
        let mut sim = SimFir::new();
        // A data slot holding 1 must not trigger wraparound.
        sim.store(0, 1).unwrap();
        let mut cur = cursor();

        let out = cur.read_next(&mut sim).unwrap();
        assert_eq!(out.value, 1);
        assert!(!out.wrapped);
        assert_eq!(cur.offset(), 1);
    }

    #[test]
    fn negative_values_roundtrip_as_text() {
        let mut sim = SimFir::new();
        let mut cur = cursor();
        cur.write_next(&mut sim, "-2147483648").unwrap();

        let mut rd = cursor();
        let out = rd.read_next(&mut sim).unwrap();
        assert_eq!(out.text, "-2147483648");
        assert_eq!(out.value, i32::MIN);
    }

    #[test]
    fn copy_failure_leaves_cursor_unchanged() {
        let mut sim = SimFir::new();
        sim.store(0, 0x8000_0000).unwrap(); // formats as "-2147483648", 11 bytes
        let mut cur = cursor();

        let mut tiny = [0u8; 4];
        let err = cur.read_next_into(&mut sim, &mut tiny).unwrap_err();
        assert!(matches!(
            err,
            FirError::CopyFailed {
                needed: 12,
                capacity: 4
            }
        ));
        assert_eq!(cur.offset(), 0);

        let mut buf = [0u8; regs::BUF_SIZE];
        let out = cur.read_next_into(&mut sim, &mut buf).unwrap();
        assert_eq!(out.text.len(), 11);
        assert_eq!(&buf[..11], b"-2147483648");
        assert_eq!(buf[11], 0);
        assert_eq!(cur.offset(), 1);
    }
}
