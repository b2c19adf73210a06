//! Command handlers: one daemon call per lifecycle flag.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tarsvirt_rpc::{VIR_DOMAIN_REBOOT_DEFAULT, VIR_DOMAIN_UNDEFINE_KEEP_NVRAM};

use crate::enumerate;
use crate::error::CommandError;
use crate::hypervisor::{Domain, Hypervisor};
use crate::report::{confirmation, Output, OutputFormat};
use crate::state;

/// State changes applied to an existing domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Start,
    Shutoff,
    Shutdown,
    SoftReboot,
    HardReboot,
    Pause,
    Resume,
    Delete,
}

impl Lifecycle {
    /// Flag that selects this action.
    pub fn flag(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Shutoff => "shutoff",
            Self::Shutdown => "shutdown",
            Self::SoftReboot => "soft-reboot",
            Self::HardReboot => "hard-reboot",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Delete => "delete",
        }
    }

    fn confirmation(self, vm: &str) -> String {
        match self {
            Self::Start => format!("{vm} was started"),
            Self::Shutoff => format!("{vm} was shutoff successfully"),
            Self::Shutdown => format!("{vm} was shutdown successfully"),
            Self::SoftReboot => format!("{vm} was soft-rebooted successfully"),
            Self::HardReboot => format!("{vm} was hard-rebooted successfully"),
            Self::Pause => format!("{vm} is paused"),
            Self::Resume => format!("{vm} was resumed"),
            Self::Delete => format!("{vm} was deleted"),
        }
    }

    async fn apply(self, hypervisor: &dyn Hypervisor, dom: &Domain) -> tarsvirt_rpc::Result<()> {
        match self {
            Self::Start => hypervisor.start(dom).await,
            Self::Shutoff => hypervisor.destroy(dom).await,
            Self::Shutdown => hypervisor.shutdown(dom).await,
            Self::SoftReboot => hypervisor.reboot(dom, VIR_DOMAIN_REBOOT_DEFAULT).await,
            Self::HardReboot => hypervisor.reset(dom).await,
            Self::Pause => hypervisor.suspend(dom).await,
            Self::Resume => hypervisor.resume(dom).await,
            Self::Delete => hypervisor.undefine(dom, VIR_DOMAIN_UNDEFINE_KEEP_NVRAM).await,
        }
    }
}

/// Verb used in error messages.
impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Shutoff => "shut off",
            Self::Shutdown => "shut down",
            Self::SoftReboot => "soft-reboot",
            Self::HardReboot => "hard-reboot",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Delete => "delete",
        })
    }
}

/// The one operation a process invocation performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    State { vm: String },
    Lifecycle { action: Lifecycle, vm: String },
    Create { template: PathBuf },
    ListAddresses,
    ShowAll,
}

impl Command {
    pub async fn execute(
        &self,
        hypervisor: &dyn Hypervisor,
        format: OutputFormat,
    ) -> Result<Output, CommandError> {
        match self {
            Command::State { vm } => vm_state(hypervisor, vm).await,
            Command::Lifecycle { action, vm } => lifecycle(hypervisor, *action, vm).await,
            Command::Create { template } => create(hypervisor, template).await,
            Command::ListAddresses => enumerate::list_addresses(hypervisor, format).await,
            Command::ShowAll => enumerate::show_all(hypervisor, format).await,
        }
    }
}

async fn lookup(hypervisor: &dyn Hypervisor, vm: &str) -> Result<Domain, CommandError> {
    hypervisor
        .lookup_domain(vm)
        .await
        .map_err(|source| CommandError::Lookup {
            name: vm.to_string(),
            source,
        })
}

/// Current state and accounting of `vm`.
pub async fn vm_state(hypervisor: &dyn Hypervisor, vm: &str) -> Result<Output, CommandError> {
    let dom = lookup(hypervisor, vm).await?;
    let info = hypervisor
        .domain_info(&dom)
        .await
        .map_err(|source| CommandError::Info {
            name: vm.to_string(),
            source,
        })?;
    Ok(Output::json(&state::translate(&info))?)
}

pub async fn lifecycle(
    hypervisor: &dyn Hypervisor,
    action: Lifecycle,
    vm: &str,
) -> Result<Output, CommandError> {
    let dom = lookup(hypervisor, vm).await?;
    action
        .apply(hypervisor, &dom)
        .await
        .map_err(|source| CommandError::Operation {
            action,
            name: vm.to_string(),
            source,
        })?;
    tracing::info!(vm, action = action.flag(), "domain operation done");
    confirmation(&action.confirmation(vm))
}

/// JSON view of a freshly defined domain.
#[derive(Debug, Serialize)]
struct DefinedDomain<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "UUID")]
    uuid: String,
    #[serde(rename = "ID")]
    id: i32,
}

/// Define a new domain from the XML at `template`. The domain is not started.
pub async fn create(hypervisor: &dyn Hypervisor, template: &Path) -> Result<Output, CommandError> {
    let xml = tokio::fs::read_to_string(template)
        .await
        .map_err(|source| CommandError::ReadTemplate {
            path: template.to_path_buf(),
            source,
        })?;

    let dom = hypervisor
        .define_domain(&xml)
        .await
        .map_err(CommandError::Define)?;
    tracing::info!(vm = %dom.name, uuid = %dom.uuid, "domain defined");

    Ok(Output::json(&DefinedDomain {
        name: &dom.name,
        uuid: dom.uuid.to_string(),
        id: dom.id,
    })?)
}
