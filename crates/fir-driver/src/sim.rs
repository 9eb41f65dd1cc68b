//! Simulated FIR register window
//!
//! Implements [`RegisterBus`] over a plain array of words plus a software
//! model of the IP's behavior: writing the start sentinel to the control slot
//! runs an integer FIR kernel over the sample buffer in place, and the status
//! slot reports not-ready for a configurable number of polls before flipping
//! to ready. Fully deterministic — this is what CI and the protocol tests run
//! against instead of hardware.

use crate::bus::RegisterBus;
use crate::error::{FirError, Result};
use fir_chip::regs;

/// Default kernel: 5-tap smoothing filter, unity DC gain (tap sum 8).
pub const DEFAULT_TAPS: [i32; 5] = [1, 2, 2, 2, 1];

/// Software register file emulating the FIR IP.
#[derive(Debug, Clone)]
pub struct SimFir {
    words: Vec<u32>,
    taps: Vec<i32>,
    /// Status polls that report not-ready before the batch completes.
    ready_after: u32,
    /// Countdown while a computation is "in flight"; `None` when idle.
    polls_left: Option<u32>,
    detached: bool,
}

impl Default for SimFir {
    fn default() -> Self {
        Self::new()
    }
}

impl SimFir {
    /// Simulated window with the default smoothing kernel and instant ready.
    pub fn new() -> Self {
        Self::with_taps(DEFAULT_TAPS.to_vec())
    }

    /// Simulated window with an explicit causal FIR kernel.
    ///
    /// Outputs are `y[i] = sum(taps[k] * x[i-k]) / sum(taps)` in `i64`
    /// arithmetic, truncated back to `i32`. A single tap `[1]` makes the
    /// device a passthrough, which is handy for golden-trace tests.
    ///
    /// # Panics
    ///
    /// Panics if `taps` is empty or sums to zero (no meaningful gain).
    pub fn with_taps(taps: Vec<i32>) -> Self {
        assert!(!taps.is_empty(), "FIR kernel needs at least one tap");
        assert!(taps.iter().sum::<i32>() != 0, "FIR kernel tap sum must be nonzero");
        Self {
            words: vec![0; regs::WINDOW_WORDS],
            taps,
            ready_after: 0,
            polls_left: None,
            detached: false,
        }
    }

    /// Report not-ready for `polls` status reads after each start trigger.
    pub fn with_ready_after(mut self, polls: u32) -> Self {
        self.ready_after = polls;
        self
    }

    /// Direct view of one word, bypassing the bus protocol (test inspection).
    pub fn word(&self, offset: usize) -> u32 {
        self.words[offset]
    }

    /// Run the kernel over the sample buffer in place and arm the status slot.
    fn trigger(&mut self) {
        let sum: i64 = self.taps.iter().map(|&t| i64::from(t)).sum();
        let input: Vec<i64> = self.words[..regs::DATA_SLOTS]
            .iter()
            .map(|&w| i64::from(w as i32))
            .collect();

        for (i, out) in self.words[..regs::DATA_SLOTS].iter_mut().enumerate() {
            let mut acc = 0i64;
            for (k, &tap) in self.taps.iter().enumerate() {
                if k <= i {
                    acc += i64::from(tap) * input[i - k];
                }
            }
            #[allow(clippy::cast_possible_truncation)]
            let y = (acc / sum) as i32;
            *out = y as u32;
        }

        self.words[regs::STATUS_SLOT] = 0;
        self.polls_left = Some(self.ready_after);
        tracing::debug!(
            taps = self.taps.len(),
            ready_after = self.ready_after,
            "simulated FIR batch computed"
        );
    }

    fn check(&self, offset: usize) -> Result<()> {
        if self.detached {
            return Err(FirError::Detached);
        }
        if offset >= self.words.len() {
            return Err(FirError::OutOfRange {
                offset,
                limit: self.words.len(),
            });
        }
        Ok(())
    }
}

impl RegisterBus for SimFir {
    fn load(&mut self, offset: usize) -> Result<u32> {
        self.check(offset)?;
        if offset == regs::STATUS_SLOT {
            if let Some(n) = self.polls_left {
                if n == 0 {
                    self.polls_left = None;
                    self.words[regs::STATUS_SLOT] = regs::READY;
                } else {
                    self.polls_left = Some(n - 1);
                }
            }
        }
        Ok(self.words[offset])
    }

    fn store(&mut self, offset: usize, word: u32) -> Result<()> {
        self.check(offset)?;
        if offset == regs::CONTROL_SLOT && word == regs::START {
            self.trigger();
        } else {
            self.words[offset] = word;
        }
        Ok(())
    }

    fn len_words(&self) -> usize {
        if self.detached {
            0
        } else {
            self.words.len()
        }
    }

    fn detach(&mut self) -> Result<()> {
        if self.detached {
            return Err(FirError::Detached);
        }
        self.detached = true;
        Ok(())
    }
}
