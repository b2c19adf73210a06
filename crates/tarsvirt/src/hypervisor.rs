//! The virtualization capability the commands run against.
//!
//! Commands only see [`Hypervisor`]; the binary hands them a live
//! [`tarsvirt_rpc::Client`], tests hand them a double.

use async_trait::async_trait;
use tarsvirt_rpc::{Client, Result};

pub use tarsvirt_rpc::{
    DomainGetInfoRet as DomainInfo, DomainInterface, DomainIpAddr, NonnullDomain as Domain,
};

/// Domain operations, one daemon call each.
///
/// Flag arguments take libvirt's `VIR_*` values as re-exported by
/// `tarsvirt_rpc`.
#[async_trait]
pub trait Hypervisor: Send + Sync {
    async fn lookup_domain(&self, name: &str) -> Result<Domain>;

    /// Define a persistent domain from XML without starting it.
    async fn define_domain(&self, xml: &str) -> Result<Domain>;

    /// Domains selected by `VIR_CONNECT_LIST_DOMAINS_*` flags.
    async fn list_domains(&self, flags: u32) -> Result<Vec<Domain>>;

    async fn domain_info(&self, dom: &Domain) -> Result<DomainInfo>;

    async fn start(&self, dom: &Domain) -> Result<()>;

    /// Hard power-off.
    async fn destroy(&self, dom: &Domain) -> Result<()>;

    /// Graceful, guest-cooperative power-off.
    async fn shutdown(&self, dom: &Domain) -> Result<()>;

    async fn reboot(&self, dom: &Domain, flags: u32) -> Result<()>;

    /// Hardware reset; the guest gets no chance to flush.
    async fn reset(&self, dom: &Domain) -> Result<()>;

    async fn suspend(&self, dom: &Domain) -> Result<()>;

    async fn resume(&self, dom: &Domain) -> Result<()>;

    async fn undefine(&self, dom: &Domain, flags: u32) -> Result<()>;

    async fn interface_addresses(&self, dom: &Domain, source: u32) -> Result<Vec<DomainInterface>>;
}

#[async_trait]
impl Hypervisor for Client {
    async fn lookup_domain(&self, name: &str) -> Result<Domain> {
        self.domain_lookup_by_name(name).await
    }

    async fn define_domain(&self, xml: &str) -> Result<Domain> {
        self.domain_define_xml(xml).await
    }

    async fn list_domains(&self, flags: u32) -> Result<Vec<Domain>> {
        self.connect_list_all_domains(flags).await
    }

    async fn domain_info(&self, dom: &Domain) -> Result<DomainInfo> {
        self.domain_get_info(dom).await
    }

    async fn start(&self, dom: &Domain) -> Result<()> {
        self.domain_create(dom).await
    }

    async fn destroy(&self, dom: &Domain) -> Result<()> {
        self.domain_destroy(dom).await
    }

    async fn shutdown(&self, dom: &Domain) -> Result<()> {
        self.domain_shutdown(dom).await
    }

    async fn reboot(&self, dom: &Domain, flags: u32) -> Result<()> {
        self.domain_reboot(dom, flags).await
    }

    async fn reset(&self, dom: &Domain) -> Result<()> {
        self.domain_reset(dom, 0).await
    }

    async fn suspend(&self, dom: &Domain) -> Result<()> {
        self.domain_suspend(dom).await
    }

    async fn resume(&self, dom: &Domain) -> Result<()> {
        self.domain_resume(dom).await
    }

    async fn undefine(&self, dom: &Domain, flags: u32) -> Result<()> {
        self.domain_undefine_flags(dom, flags).await
    }

    async fn interface_addresses(&self, dom: &Domain, source: u32) -> Result<Vec<DomainInterface>> {
        self.domain_interface_addresses(dom, source).await
    }
}
