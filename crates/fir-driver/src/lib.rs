//! User-space driver for the memory-mapped FIR filter IP.
//!
//! The IP exposes a 257-word register window: 256 sample slots plus one
//! combined control/status slot. A batch flows through a strict handshake —
//! write 256 inputs, write the start sentinel, poll the status slot until it
//! reads nonzero, then drain 256 outputs. This crate owns everything between
//! the textual user boundary and the volatile register access:
//!
//! - [`RegisterBus`] — the injected register-access capability; implemented
//!   by [`MmioBus`] (mapped hardware resource) and [`SimFir`] (deterministic
//!   software register file for tests and CI).
//! - [`Cursor`] — the monotonic read/write offset with the saturation and
//!   wraparound rules of the wire protocol.
//! - [`Handshake`] — the Idle/Loading/Started/Draining phase machine.
//! - [`FirSession`] — one open handle tying the three together, with the
//!   fixed-capacity text encoding at the user boundary.
//!
//! # Quick start
//!
//! ```
//! use fir_driver::{FirSession, SimFir};
//! use fir_chip::{regs, signal};
//!
//! # fn main() -> fir_driver::Result<()> {
//! let mut dev = FirSession::open(SimFir::new())?;
//!
//! for i in 0..regs::NUM_SAMPLES {
//!     dev.write(&signal::sawtooth_sample(i).to_string())?;
//! }
//! dev.write("1")?; // start
//!
//! while !dev.read()?.wrapped {} // poll until ready
//!
//! for _ in 0..regs::NUM_SAMPLES {
//!     let out = dev.read()?;
//!     println!("{}", out.text);
//! }
//! dev.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! All transfer is synchronous, polled, one register-word at a time; there is
//! no DMA and no interrupt path.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Samples cross the wire as i32 bit patterns in u32 registers.
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod bus;
mod cursor;
mod error;
mod handshake;
mod mmio;
mod session;
mod sim;

pub use bus::RegisterBus;
pub use cursor::{Cursor, ReadOutcome, WriteOutcome};
pub use error::{FirError, Result};
pub use handshake::{Handshake, Phase};
pub use mmio::MmioBus;
pub use session::FirSession;
pub use sim::{SimFir, DEFAULT_TAPS};
