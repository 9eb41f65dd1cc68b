//! Hardware description for the FIR filter IP core.
//!
//! This crate holds everything that is fixed by the hardware and the
//! client/device protocol rather than by driver policy: the register-word
//! layout of the mapped window, the start/ready sentinels, the text buffer
//! sizing at the user boundary, and the reference test signal the client
//! application feeds through the filter.
//!
//! No dependencies — these are constants of the IP, usable from the driver,
//! the CLI, and tests alike.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod regs;
pub mod signal;
