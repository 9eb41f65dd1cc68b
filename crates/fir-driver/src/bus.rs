//! Register bus abstraction
//!
//! The cursor engine and the session never touch mapped memory directly; they
//! go through this trait. That keeps the protocol logic testable against a
//! software register file ([`crate::SimFir`]) and keeps the single `unsafe`
//! surface confined to the MMIO backend.

use crate::error::Result;
use std::fmt::Debug;

/// Single-word access to the FIR register window.
///
/// Offsets are register-word indices, `0..len_words()`. Loads and stores are
/// single-word and take `&mut self`: MMIO accesses have hardware side effects,
/// and the simulated backend advances internal state on status reads.
pub trait RegisterBus: Debug + Send {
    /// Load one register-word.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `offset >= len_words()`, `Detached` after detach.
    fn load(&mut self, offset: usize) -> Result<u32>;

    /// Store one register-word.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `offset >= len_words()`, `Detached` after detach.
    fn store(&mut self, offset: usize, word: u32) -> Result<()>;

    /// Window length in register-words.
    fn len_words(&self) -> usize;

    /// Release the window. Exactly one detach per attach; any later access
    /// (including a second detach) fails fast with `Detached`.
    ///
    /// # Errors
    ///
    /// `Detached` if the window was already released.
    fn detach(&mut self) -> Result<()>;
}
