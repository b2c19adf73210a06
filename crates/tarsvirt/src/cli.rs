//! Command-line flags.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::{Command, Lifecycle};
use crate::error::CommandError;
use crate::report::OutputFormat;

/// libvirt URI the binary connects to.
pub const LIBVIRT_URI: &str = "qemu:///system";

/// Manage libvirt virtual machines and report the result as JSON.
///
/// Set exactly one action flag. When several are set, the first in the
/// order listed here wins.
#[derive(Debug, Default, Parser)]
#[command(name = "tarsvirt", version, about)]
pub struct Cli {
    /// Print the current state of --vm
    #[arg(long)]
    pub state: bool,

    /// Reboot --vm gracefully, in the way the hypervisor chooses
    #[arg(long)]
    pub soft_reboot: bool,

    /// Hard-reset --vm. Damages in-flight file operations in the guest
    #[arg(long)]
    pub hard_reboot: bool,

    /// Gracefully shut down --vm
    #[arg(long)]
    pub shutdown: bool,

    /// Kill --vm immediately, like pulling the power plug
    #[arg(long)]
    pub shutoff: bool,

    /// Start --vm
    #[arg(long)]
    pub start: bool,

    /// Stop executing --vm. CPU is released, memory stays allocated
    #[arg(long)]
    pub pause: bool,

    /// Resume --vm after --pause
    #[arg(long)]
    pub resume: bool,

    /// Define a new VM from --xml-template
    #[arg(long)]
    pub create: bool,

    /// Undefine --vm, keeping its NVRAM
    #[arg(long)]
    pub delete: bool,

    /// Show guest-agent IP addresses of running VMs
    #[arg(long)]
    pub ips: bool,

    /// Show the state of every VM on the host
    #[arg(long)]
    pub show_all: bool,

    /// Name of the VM to work with
    #[arg(long, value_name = "NAME")]
    pub vm: Option<String>,

    /// Path to a libvirt domain XML file
    #[arg(long, value_name = "PATH")]
    pub xml_template: Option<PathBuf>,

    /// Print --ips and --show-all as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// The selected command, or `None` when no action flag is set.
    pub fn command(&self) -> Result<Option<Command>, CommandError> {
        if self.state {
            return Ok(Some(Command::State {
                vm: self.require_vm("state")?,
            }));
        }

        let lifecycle = [
            (self.soft_reboot, Lifecycle::SoftReboot),
            (self.hard_reboot, Lifecycle::HardReboot),
            (self.shutdown, Lifecycle::Shutdown),
            (self.shutoff, Lifecycle::Shutoff),
            (self.start, Lifecycle::Start),
            (self.pause, Lifecycle::Pause),
            (self.resume, Lifecycle::Resume),
        ];
        if let Some((_, action)) = lifecycle.into_iter().find(|(set, _)| *set) {
            return Ok(Some(Command::Lifecycle {
                action,
                vm: self.require_vm(action.flag())?,
            }));
        }

        if self.create {
            let template = self
                .xml_template
                .clone()
                .filter(|p| !p.as_os_str().is_empty())
                .ok_or(CommandError::MissingArgument {
                    flag: "create",
                    companion: "xml-template",
                })?;
            return Ok(Some(Command::Create { template }));
        }

        if self.delete {
            return Ok(Some(Command::Lifecycle {
                action: Lifecycle::Delete,
                vm: self.require_vm("delete")?,
            }));
        }

        if self.ips {
            return Ok(Some(Command::ListAddresses));
        }

        if self.show_all {
            return Ok(Some(Command::ShowAll));
        }

        Ok(None)
    }

    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    fn require_vm(&self, flag: &'static str) -> Result<String, CommandError> {
        self.vm
            .clone()
            .filter(|vm| !vm.is_empty())
            .ok_or(CommandError::MissingArgument {
                flag,
                companion: "vm",
            })
    }
}
