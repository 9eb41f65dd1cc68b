//! Register-word layout of the FIR filter window.
//!
//! The IP exposes one contiguous window of 257 register-words. Words 0..=255
//! are the sample buffer; word 256 doubles as the control register (writing
//! the start sentinel triggers computation) and the status register (reading
//! the ready sentinel means the output batch is complete). There is no
//! structurally distinct control storage — the sentinels travel in the same
//! channel as ordinary samples, by protocol convention.

/// Number of data slots in the sample buffer (words 0..=255).
pub const DATA_SLOTS: usize = 256;

/// Control slot: writing [`START`] here triggers computation.
pub const CONTROL_SLOT: usize = DATA_SLOTS;

/// Status slot: reads [`READY`] once the output batch is available.
/// Same word as [`CONTROL_SLOT`].
pub const STATUS_SLOT: usize = DATA_SLOTS;

/// Total addressable span of the window, in register-words (slots 0..=256).
pub const WINDOW_WORDS: usize = DATA_SLOTS + 1;

/// Size of one register-word in bytes.
pub const WORD_BYTES: usize = 4;

/// Sentinel written to [`CONTROL_SLOT`] to start computation.
pub const START: u32 = 1;

/// Sentinel read from [`STATUS_SLOT`] when the output batch is ready.
pub const READY: u32 = 1;

/// Capacity of the textual exchange buffer at the user boundary, including
/// the trailing NUL. Writes longer than `BUF_SIZE - 1` bytes are truncated.
pub const BUF_SIZE: usize = 64;

/// Number of samples in one input/output batch. Must match the hardware's
/// actual buffer depth; the reference client uses exactly this many.
pub const NUM_SAMPLES: usize = 256;
