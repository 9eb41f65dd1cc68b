//! Start/ready handshake coordinator
//!
//! Tracks which phase of the batch protocol the client is in. The driver
//! never interprets payload values — the `Loading -> Started` edge keys on a
//! write landing at the control slot, and `Started -> Draining` keys on the
//! cursor's wraparound tag, so data and control stay separated even though
//! they share one wire channel.
//!
//! There is no timeout and no internal blocking: an unready device is an
//! incomplete poll, not an error, and pacing between polls belongs to the
//! client.

use fir_chip::regs;

/// Phase of the batch protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No batch in flight.
    Idle,
    /// Client is writing input samples.
    Loading,
    /// Start signal written; client polls the status slot.
    Started,
    /// Ready observed; client is reading the output batch.
    Draining,
}

/// Handshake state machine, advanced by the session on every call.
#[derive(Debug)]
pub struct Handshake {
    phase: Phase,
    /// Output reads completed since the wraparound.
    drained: usize,
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

impl Handshake {
    /// Coordinator in the idle phase.
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            drained: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Account for a completed write. `at_control_slot` is whether the value
    /// landed at the window's final slot — by protocol convention that write
    /// is the client's start signal.
    pub fn note_write(&mut self, at_control_slot: bool) {
        match self.phase {
            Phase::Idle | Phase::Loading => {
                if at_control_slot {
                    tracing::debug!("start signal written, computation triggered");
                    self.phase = Phase::Started;
                } else {
                    self.phase = Phase::Loading;
                }
            }
            Phase::Started | Phase::Draining => {
                // Legal but almost certainly a client bug.
                tracing::warn!(phase = ?self.phase, "write while a batch is in flight");
            }
        }
    }

    /// Account for a completed read. `wrapped` is the cursor's wraparound tag
    /// (ready observed at the status slot).
    pub fn note_read(&mut self, wrapped: bool) {
        match self.phase {
            Phase::Started if wrapped => {
                tracing::debug!("device ready, draining {} outputs", regs::NUM_SAMPLES);
                self.phase = Phase::Draining;
                self.drained = 0;
            }
            Phase::Draining => {
                self.drained += 1;
                if self.drained >= regs::NUM_SAMPLES {
                    tracing::debug!("output batch drained");
                    self.phase = Phase::Idle;
                }
            }
            _ => {}
        }
    }
}
