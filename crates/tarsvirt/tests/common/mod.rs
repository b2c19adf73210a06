//! In-memory hypervisor that records every call.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tarsvirt::hypervisor::{Domain, DomainInfo, DomainInterface, Hypervisor};
use tarsvirt::{dispatch, Cli, Outcome, Reporter};
use tarsvirt_rpc::{Error, Result, Uuid, VIR_DOMAIN_RUNNING, VIR_DOMAIN_SHUTOFF};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup(String),
    Define(String),
    List(u32),
    Info(String),
    Start(String),
    Destroy(String),
    Shutdown(String),
    Reboot(String, u32),
    Reset(String),
    Suspend(String),
    Resume(String),
    Undefine(String, u32),
    Interfaces(String, u32),
}

#[derive(Debug, Clone)]
pub struct FakeDomain {
    pub dom: Domain,
    pub info: DomainInfo,
    pub ifaces: Vec<DomainInterface>,
}

#[derive(Default)]
pub struct FakeHypervisor {
    domains: Mutex<Vec<FakeDomain>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, String>>,
}

pub fn info(state: u8, memory: u64, max_mem: u64, vcpus: u16, cpu_time: u64) -> DomainInfo {
    DomainInfo {
        state,
        max_mem,
        memory,
        nr_virt_cpu: vcpus,
        cpu_time,
    }
}

fn no_domain(name: &str) -> Error {
    Error::Rpc {
        code: tarsvirt_rpc::VIR_ERR_NO_DOMAIN,
        domain: 10,
        message: format!("Domain not found: no domain with matching name '{name}'"),
    }
}

impl FakeHypervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(self, name: &str, info: DomainInfo) -> Self {
        let id = if info.state == VIR_DOMAIN_SHUTOFF {
            -1
        } else {
            self.domains.lock().unwrap().len() as i32 + 1
        };
        self.domains.lock().unwrap().push(FakeDomain {
            dom: Domain {
                name: name.to_string(),
                uuid: Uuid([id as u8; 16]),
                id,
            },
            info,
            ifaces: Vec::new(),
        });
        self
    }

    pub fn with_interfaces(self, name: &str, ifaces: Vec<DomainInterface>) -> Self {
        for d in self.domains.lock().unwrap().iter_mut() {
            if d.dom.name == name {
                d.ifaces = ifaces.clone();
            }
        }
        self
    }

    /// Make every call of kind `op` fail with `message`.
    pub fn failing(self, op: &'static str, message: &str) -> Self {
        self.failures.lock().unwrap().insert(op, message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than lookups.
    pub fn operations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Lookup(_)))
            .collect()
    }

    fn record(&self, op: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(op) {
            Some(message) => Err(Error::Rpc {
                code: tarsvirt_rpc::VIR_ERR_OPERATION_INVALID,
                domain: 10,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn find(&self, name: &str) -> Result<FakeDomain> {
        self.domains
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.dom.name == name)
            .cloned()
            .ok_or_else(|| no_domain(name))
    }

    fn set_state(&self, dom: &Domain, state: u8) {
        for d in self.domains.lock().unwrap().iter_mut() {
            if d.dom.name == dom.name {
                d.info.state = state;
            }
        }
    }
}

#[async_trait]
impl Hypervisor for FakeHypervisor {
    async fn lookup_domain(&self, name: &str) -> Result<Domain> {
        self.record("lookup", Call::Lookup(name.to_string()))?;
        Ok(self.find(name)?.dom)
    }

    async fn define_domain(&self, xml: &str) -> Result<Domain> {
        self.record("define", Call::Define(xml.to_string()))?;
        Ok(Domain {
            name: "defined".to_string(),
            uuid: Uuid([0x11; 16]),
            id: -1,
        })
    }

    async fn list_domains(&self, flags: u32) -> Result<Vec<Domain>> {
        self.record("list", Call::List(flags))?;
        let running = flags & tarsvirt_rpc::VIR_CONNECT_LIST_DOMAINS_RUNNING != 0;
        let active = flags & tarsvirt_rpc::VIR_CONNECT_LIST_DOMAINS_ACTIVE != 0;
        let inactive = flags & tarsvirt_rpc::VIR_CONNECT_LIST_DOMAINS_INACTIVE != 0;
        Ok(self
            .domains
            .lock()
            .unwrap()
            .iter()
            .filter(|d| {
                (running && d.info.state == VIR_DOMAIN_RUNNING)
                    || (active && d.dom.is_active())
                    || (inactive && !d.dom.is_active())
            })
            .map(|d| d.dom.clone())
            .collect())
    }

    async fn domain_info(&self, dom: &Domain) -> Result<DomainInfo> {
        self.record("info", Call::Info(dom.name.clone()))?;
        Ok(self.find(&dom.name)?.info)
    }

    async fn start(&self, dom: &Domain) -> Result<()> {
        self.record("start", Call::Start(dom.name.clone()))?;
        self.set_state(dom, VIR_DOMAIN_RUNNING);
        Ok(())
    }

    async fn destroy(&self, dom: &Domain) -> Result<()> {
        self.record("destroy", Call::Destroy(dom.name.clone()))?;
        self.set_state(dom, VIR_DOMAIN_SHUTOFF);
        Ok(())
    }

    async fn shutdown(&self, dom: &Domain) -> Result<()> {
        self.record("shutdown", Call::Shutdown(dom.name.clone()))
    }

    async fn reboot(&self, dom: &Domain, flags: u32) -> Result<()> {
        self.record("reboot", Call::Reboot(dom.name.clone(), flags))
    }

    async fn reset(&self, dom: &Domain) -> Result<()> {
        self.record("reset", Call::Reset(dom.name.clone()))
    }

    async fn suspend(&self, dom: &Domain) -> Result<()> {
        self.record("suspend", Call::Suspend(dom.name.clone()))?;
        self.set_state(dom, tarsvirt_rpc::VIR_DOMAIN_PAUSED);
        Ok(())
    }

    async fn resume(&self, dom: &Domain) -> Result<()> {
        self.record("resume", Call::Resume(dom.name.clone()))?;
        self.set_state(dom, VIR_DOMAIN_RUNNING);
        Ok(())
    }

    async fn undefine(&self, dom: &Domain, flags: u32) -> Result<()> {
        self.record("undefine", Call::Undefine(dom.name.clone(), flags))?;
        self.domains.lock().unwrap().retain(|d| d.dom.name != dom.name);
        Ok(())
    }

    async fn interface_addresses(&self, dom: &Domain, source: u32) -> Result<Vec<DomainInterface>> {
        self.record("interfaces", Call::Interfaces(dom.name.clone(), source))?;
        Ok(self.find(&dom.name)?.ifaces)
    }
}

/// Parse `args` like the binary does, run the command and capture stdout.
pub async fn run(hypervisor: &FakeHypervisor, args: &[&str]) -> (Outcome, String) {
    use clap::Parser;

    let cli = Cli::try_parse_from(std::iter::once("tarsvirt").chain(args.iter().copied()))
        .expect("valid flags");
    let mut out = Vec::new();
    let outcome = match cli.command() {
        Ok(Some(command)) => dispatch(&command, hypervisor, cli.format(), &mut out).await,
        Ok(None) => Outcome::Success,
        Err(err) => Reporter::new(&mut out).report(Err(err)),
    };
    (outcome, String::from_utf8(out).expect("utf-8 output"))
}
