//! Translation of libvirt domain info into the reported VM state.

use std::fmt;

use serde::Serialize;
use tarsvirt_rpc::{
    VIR_DOMAIN_BLOCKED, VIR_DOMAIN_CRASHED, VIR_DOMAIN_NOSTATE, VIR_DOMAIN_PAUSED,
    VIR_DOMAIN_PMSUSPENDED, VIR_DOMAIN_RUNNING, VIR_DOMAIN_SHUTDOWN, VIR_DOMAIN_SHUTOFF,
};

use crate::hypervisor::DomainInfo;

/// Observed state of a virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualMachineStatus {
    /// Just created, no state yet.
    Pending,
    Running,
    /// Blocked on a resource.
    Blocked,
    /// Suspended; memory still allocated.
    Paused,
    /// Being shut down.
    Shutdown,
    Shutoff,
    /// Usually died on startup because something it needs is missing.
    Crashed,
    /// Suspended to disk or memory at the guest's request.
    Hibernating,
    /// Code this build does not know.
    Unknown,
}

impl VirtualMachineStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Blocked => "blocked",
            Self::Paused => "paused",
            Self::Shutdown => "shutdown",
            Self::Shutoff => "shutoff",
            Self::Crashed => "crashed",
            Self::Hibernating => "hibernating",
            Self::Unknown => "unknown",
        }
    }
}

impl From<u8> for VirtualMachineStatus {
    fn from(code: u8) -> Self {
        match code {
            VIR_DOMAIN_NOSTATE => Self::Pending,
            VIR_DOMAIN_RUNNING => Self::Running,
            VIR_DOMAIN_BLOCKED => Self::Blocked,
            VIR_DOMAIN_PAUSED => Self::Paused,
            VIR_DOMAIN_SHUTDOWN => Self::Shutdown,
            VIR_DOMAIN_SHUTOFF => Self::Shutoff,
            VIR_DOMAIN_CRASHED => Self::Crashed,
            VIR_DOMAIN_PMSUSPENDED => Self::Hibernating,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for VirtualMachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers work in tables
        f.pad(self.as_str())
    }
}

/// Snapshot of a VM's state and resource accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VirtualMachineStateInfo {
    pub state: VirtualMachineStatus,
    pub max_memory_bytes: u64,
    pub memory_bytes: u64,
    /// Nanoseconds of CPU time consumed.
    pub cpu_time: u64,
    pub cpu_count: u32,
}

/// libvirt reports memory in KiB.
pub fn kib_to_bytes(kib: u64) -> u64 {
    kib.saturating_mul(1024)
}

pub fn translate(info: &DomainInfo) -> VirtualMachineStateInfo {
    VirtualMachineStateInfo {
        state: VirtualMachineStatus::from(info.state),
        max_memory_bytes: kib_to_bytes(info.max_mem),
        memory_bytes: kib_to_bytes(info.memory),
        cpu_time: info.cpu_time,
        cpu_count: u32::from(info.nr_virt_cpu),
    }
}
