//! The slice of `remote_protocol.x` that domain lifecycle management needs.
//!
//! Struct layouts and procedure numbers follow libvirt's
//! `src/remote/remote_protocol.x`; field order is wire order.

use serde::{Deserialize, Serialize};
use tarsvirt_xdr::Uuid;

/// `REMOTE_PROGRAM`.
pub const REMOTE_PROGRAM: u32 = 0x2000_8086;
/// `REMOTE_PROTOCOL_VERSION`.
pub const REMOTE_PROTOCOL_VERSION: u32 = 1;

// virConnectListAllDomainsFlags
pub const VIR_CONNECT_LIST_DOMAINS_ACTIVE: u32 = 1 << 0;
pub const VIR_CONNECT_LIST_DOMAINS_INACTIVE: u32 = 1 << 1;
pub const VIR_CONNECT_LIST_DOMAINS_RUNNING: u32 = 1 << 4;

// virDomainRebootFlagValues
pub const VIR_DOMAIN_REBOOT_DEFAULT: u32 = 0;

// virDomainUndefineFlagsValues
pub const VIR_DOMAIN_UNDEFINE_KEEP_NVRAM: u32 = 1 << 3;

// virDomainInterfaceAddressesSource
pub const VIR_DOMAIN_INTERFACE_ADDRESSES_SRC_AGENT: u32 = 1;

// virIPAddrType
pub const VIR_IP_ADDR_TYPE_IPV4: i32 = 0;
pub const VIR_IP_ADDR_TYPE_IPV6: i32 = 1;

// virDomainState
pub const VIR_DOMAIN_NOSTATE: u8 = 0;
pub const VIR_DOMAIN_RUNNING: u8 = 1;
pub const VIR_DOMAIN_BLOCKED: u8 = 2;
pub const VIR_DOMAIN_PAUSED: u8 = 3;
pub const VIR_DOMAIN_SHUTDOWN: u8 = 4;
pub const VIR_DOMAIN_SHUTOFF: u8 = 5;
pub const VIR_DOMAIN_CRASHED: u8 = 6;
pub const VIR_DOMAIN_PMSUSPENDED: u8 = 7;

// remote_auth_type
pub const REMOTE_AUTH_NONE: i32 = 0;
pub const REMOTE_AUTH_SASL: i32 = 1;
pub const REMOTE_AUTH_POLKIT: i32 = 2;

// virErrorNumber values callers care about.
pub const VIR_ERR_OPERATION_INVALID: i32 = 55;
pub const VIR_ERR_NO_DOMAIN: i32 = 42;

/// Remote procedure numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Procedure {
    ConnectOpen = 1,
    ConnectClose = 2,
    DomainCreate = 9,
    DomainDefineXml = 11,
    DomainDestroy = 12,
    DomainGetInfo = 16,
    DomainLookupByName = 23,
    DomainReboot = 27,
    DomainResume = 28,
    DomainShutdown = 33,
    DomainSuspend = 34,
    AuthList = 66,
    AuthPolkit = 70,
    DomainUndefineFlags = 231,
    DomainReset = 245,
    ConnectListAllDomains = 273,
    DomainInterfaceAddresses = 353,
}

/// `remote_nonnull_domain`: the handle every domain procedure takes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonnullDomain {
    pub name: String,
    pub uuid: Uuid,
    /// Hypervisor id, `-1` while the domain is inactive.
    pub id: i32,
}

impl NonnullDomain {
    pub fn is_active(&self) -> bool {
        self.id != -1
    }
}

/// `remote_nonnull_network`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonnullNetwork {
    pub name: String,
    pub uuid: Uuid,
}

/// `remote_error`, the payload of every reply with status ERROR.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteError {
    pub code: i32,
    pub domain: i32,
    pub message: Option<String>,
    pub level: i32,
    pub dom: Option<NonnullDomain>,
    pub str1: Option<String>,
    pub str2: Option<String>,
    pub str3: Option<String>,
    pub int1: i32,
    pub int2: i32,
    pub net: Option<NonnullNetwork>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthListRet {
    pub types: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthPolkitRet {
    pub complete: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConnectOpenArgs<'a> {
    pub name: Option<&'a str>,
    pub flags: u32,
}

/// Arguments of the procedures that take nothing but the domain.
#[derive(Debug, Serialize)]
pub(crate) struct DomainArgs<'a> {
    pub dom: &'a NonnullDomain,
}

/// Arguments of the procedures that take a domain and a flags word.
#[derive(Debug, Serialize)]
pub(crate) struct DomainFlagsArgs<'a> {
    pub dom: &'a NonnullDomain,
    pub flags: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct DomainLookupByNameArgs<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct DomainDefineXmlArgs<'a> {
    pub xml: &'a str,
}

/// Reply of lookup and define procedures.
#[derive(Debug, Deserialize)]
pub(crate) struct DomainRet {
    pub dom: NonnullDomain,
}

/// `remote_domain_get_info_ret`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DomainGetInfoRet {
    pub state: u8,
    /// KiB.
    pub max_mem: u64,
    /// KiB.
    pub memory: u64,
    pub nr_virt_cpu: u16,
    /// Nanoseconds.
    pub cpu_time: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConnectListAllDomainsArgs {
    pub need_results: i32,
    pub flags: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConnectListAllDomainsRet {
    pub domains: Vec<NonnullDomain>,
    #[allow(dead_code)]
    pub ret: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct DomainInterfaceAddressesArgs<'a> {
    pub dom: &'a NonnullDomain,
    pub source: u32,
    pub flags: u32,
}

/// `remote_domain_ip_addr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainIpAddr {
    /// `VIR_IP_ADDR_TYPE_*`.
    pub kind: i32,
    pub addr: String,
    pub prefix: u32,
}

/// `remote_domain_interface`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInterface {
    pub name: String,
    pub hwaddr: Option<String>,
    pub addrs: Vec<DomainIpAddr>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DomainInterfaceAddressesRet {
    pub ifaces: Vec<DomainInterface>,
}
