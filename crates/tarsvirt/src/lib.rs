//! Lifecycle operations on libvirt domains, reported as single-line JSON.
//!
//! The binary parses one action flag ([`cli::Cli`]), connects to the local
//! system daemon, runs the matching [`commands::Command`] against the
//! [`hypervisor::Hypervisor`] capability and prints the outcome through a
//! [`report::Reporter`].

pub mod cli;
pub mod commands;
pub mod enumerate;
pub mod error;
pub mod hypervisor;
pub mod report;
pub mod state;

use std::io::Write;

pub use cli::{Cli, LIBVIRT_URI};
pub use commands::{Command, Lifecycle};
pub use error::CommandError;
pub use hypervisor::Hypervisor;
pub use report::{Outcome, Output, OutputFormat, Reporter};
pub use state::{VirtualMachineStateInfo, VirtualMachineStatus};

/// Run `command` and report its result to `out`.
pub async fn dispatch<W: Write>(
    command: &Command,
    hypervisor: &dyn Hypervisor,
    format: OutputFormat,
    out: W,
) -> Outcome {
    let result = command.execute(hypervisor, format).await;
    Reporter::new(out).report(result)
}
