//! `fir` — command-line client for the FIR filter IP.
//!
//! ```text
//! USAGE:
//!   fir run --resource <path>     Push the reference batch through hardware
//!   fir run --sim                 Same batch against the simulated device
//!   fir probe <path>              Attach and report the register window
//! ```
//!
//! `run` is the reference producer/consumer loop: write 256 sawtooth samples,
//! write the start sentinel, poll the status slot with a client-chosen delay
//! until it reads nonzero, then drain and print 256 outputs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use fir_chip::{regs, signal};
use fir_driver::{FirSession, MmioBus, RegisterBus, SimFir};

#[derive(Parser)]
#[command(name = "fir", about = "FIR filter IP client", version)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run one full batch through the device and print inputs and outputs.
    Run {
        /// Resource file exposing the register window
        /// (e.g. /sys/bus/platform/devices/.../resource0).
        #[arg(long, conflicts_with = "sim")]
        resource: Option<PathBuf>,

        /// Use the simulated device instead of hardware.
        #[arg(long)]
        sim: bool,

        /// Delay between status polls, in microseconds. Zero busy-polls.
        #[arg(long, default_value_t = 1000)]
        poll_us: u64,
    },
    /// Attach to a resource file and report the window it exposes.
    Probe {
        /// Resource file exposing the register window.
        resource: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Cmd::Run {
            resource,
            sim,
            poll_us,
        } => {
            let poll_delay = Duration::from_micros(poll_us);
            if sim {
                let session = FirSession::open(SimFir::new().with_ready_after(3))?;
                cmd_run(session, poll_delay)
            } else {
                let Some(path) = resource else {
                    bail!("pass --resource <path> or --sim");
                };
                let session = FirSession::open(MmioBus::attach(path)?)?;
                cmd_run(session, poll_delay)
            }
        }
        Cmd::Probe { resource } => cmd_probe(&resource),
    }
}

fn cmd_run<B: RegisterBus>(mut session: FirSession<B>, poll_delay: Duration) -> Result<()> {
    println!("Inputs:");
    for i in 0..regs::NUM_SAMPLES {
        let v = signal::sawtooth_sample(i);
        println!("{v}");
        session.write(&v.to_string())?;
    }

    session.write(&regs::START.to_string())?;
    tracing::info!("start signal written, polling for ready");

    let mut polls = 0u64;
    loop {
        let out = session.read()?;
        if out.wrapped {
            break;
        }
        polls += 1;
        if !poll_delay.is_zero() {
            std::thread::sleep(poll_delay);
        }
    }
    tracing::info!(polls, "device ready");

    println!("Outputs:");
    for _ in 0..regs::NUM_SAMPLES {
        println!("{}", session.read()?.text);
    }

    session.close()?;
    Ok(())
}

fn cmd_probe(resource: &Path) -> Result<()> {
    let mut bus = MmioBus::attach(resource)?;

    println!("Resource : {}", bus.path().display());
    println!("Window   : {} register-words", bus.len_words());
    println!("Status   : {:#x}", bus.load(regs::STATUS_SLOT)?);

    bus.detach()?;
    Ok(())
}
