//! Host-wide listings: guest addresses of running domains, and the state of
//! every defined domain.

use serde::Serialize;
use tarsvirt_rpc::{
    VIR_CONNECT_LIST_DOMAINS_ACTIVE, VIR_CONNECT_LIST_DOMAINS_INACTIVE,
    VIR_CONNECT_LIST_DOMAINS_RUNNING, VIR_DOMAIN_INTERFACE_ADDRESSES_SRC_AGENT,
    VIR_IP_ADDR_TYPE_IPV4, VIR_IP_ADDR_TYPE_IPV6,
};

use crate::error::CommandError;
use crate::hypervisor::{Domain, DomainInterface, Hypervisor};
use crate::report::{Output, OutputFormat};
use crate::state::VirtualMachineStatus;

/// Listing order is whatever the daemon returns; sort for stable output.
async fn list_sorted(hypervisor: &dyn Hypervisor, flags: u32) -> Result<Vec<Domain>, CommandError> {
    let mut domains = hypervisor
        .list_domains(flags)
        .await
        .map_err(CommandError::List)?;
    domains.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(domains)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AddressView<'a> {
    #[serde(rename = "Type")]
    kind: &'static str,
    addr: &'a str,
    prefix: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct InterfaceView<'a> {
    name: &'a str,
    hwaddr: Option<&'a str>,
    addrs: Vec<AddressView<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DomainAddresses<'a> {
    name: &'a str,
    interfaces: Vec<InterfaceView<'a>>,
}

fn address_kind(kind: i32) -> &'static str {
    match kind {
        VIR_IP_ADDR_TYPE_IPV4 => "ipv4",
        VIR_IP_ADDR_TYPE_IPV6 => "ipv6",
        _ => "unknown",
    }
}

/// Addresses the guest agent reports for every running domain.
pub async fn list_addresses(
    hypervisor: &dyn Hypervisor,
    format: OutputFormat,
) -> Result<Output, CommandError> {
    let domains = list_sorted(hypervisor, VIR_CONNECT_LIST_DOMAINS_RUNNING).await?;

    let mut found: Vec<(&Domain, Vec<DomainInterface>)> = Vec::with_capacity(domains.len());
    for dom in &domains {
        let ifaces = hypervisor
            .interface_addresses(dom, VIR_DOMAIN_INTERFACE_ADDRESSES_SRC_AGENT)
            .await
            .map_err(|source| CommandError::Interfaces {
                name: dom.name.clone(),
                source,
            })?;
        found.push((dom, ifaces));
    }

    match format {
        OutputFormat::Json => {
            let view: Vec<DomainAddresses> = found
                .iter()
                .map(|(dom, ifaces)| DomainAddresses {
                    name: &dom.name,
                    interfaces: ifaces
                        .iter()
                        .map(|iface| InterfaceView {
                            name: &iface.name,
                            hwaddr: iface.hwaddr.as_deref(),
                            addrs: iface
                                .addrs
                                .iter()
                                .map(|a| AddressView {
                                    kind: address_kind(a.kind),
                                    addr: &a.addr,
                                    prefix: a.prefix,
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect();
            Ok(Output::json(&view)?)
        }
        OutputFormat::Text => {
            let mut out = format!("There are {} running domains:\n", found.len());
            for (dom, ifaces) in &found {
                out.push_str(&format!("Domain - {}:\n", dom.name));
                for iface in ifaces {
                    let addrs: String = iface.addrs.iter().map(|a| format!("{} ", a.addr)).collect();
                    out.push_str(&format!("interface - {}, address - {}\n", iface.name, addrs));
                }
            }
            Ok(Output::Text(out))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DomainRow<'a> {
    name: &'a str,
    state: VirtualMachineStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Inventory<'a> {
    total: usize,
    active: usize,
    inactive: usize,
    domains: Vec<DomainRow<'a>>,
}

/// Every defined domain with its state, active ones first.
pub async fn show_all(hypervisor: &dyn Hypervisor, format: OutputFormat) -> Result<Output, CommandError> {
    let active = list_sorted(hypervisor, VIR_CONNECT_LIST_DOMAINS_ACTIVE).await?;
    let inactive = list_sorted(hypervisor, VIR_CONNECT_LIST_DOMAINS_INACTIVE).await?;

    let mut rows = Vec::with_capacity(active.len() + inactive.len());
    for dom in active.iter().chain(&inactive) {
        let info = hypervisor
            .domain_info(dom)
            .await
            .map_err(|source| CommandError::Info {
                name: dom.name.clone(),
                source,
            })?;
        rows.push(DomainRow {
            name: &dom.name,
            state: VirtualMachineStatus::from(info.state),
        });
    }

    let inventory = Inventory {
        total: active.len() + inactive.len(),
        active: active.len(),
        inactive: inactive.len(),
        domains: rows,
    };

    match format {
        OutputFormat::Json => Ok(Output::json(&inventory)?),
        OutputFormat::Text => {
            let mut out = format!(
                "There are {} domains: {} active and {} inactive\n",
                inventory.total, inventory.active, inventory.inactive
            );
            for row in &inventory.domains {
                out.push_str(&format!("{:<30} {:<15}\n", row.name, row.state));
            }
            Ok(Output::Text(out))
        }
    }
}
