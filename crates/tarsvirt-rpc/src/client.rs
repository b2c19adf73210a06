//! Typed client over the remote procedures in [`crate::remote`].

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::remote::*;

/// High-level libvirt client.
///
/// # Example
///
/// ```ignore
/// use tarsvirt_rpc::Client;
///
/// #[tokio::main]
/// async fn main() -> tarsvirt_rpc::Result<()> {
///     let client = Client::connect("qemu:///system").await?;
///     let dom = client.domain_lookup_by_name("testbox").await?;
///     let info = client.domain_get_info(&dom).await?;
///     println!("{} is in state {}", dom.name, info.state);
///     client.close().await
/// }
/// ```
pub struct Client {
    conn: Connection,
}

impl Client {
    /// Connect to a libvirt daemon.
    ///
    /// # Supported URIs
    ///
    /// - `qemu:///system` - the system QEMU/KVM daemon
    /// - an absolute Unix socket path, opened with the daemon's default driver
    pub async fn connect(uri: &str) -> Result<Self> {
        let (conn, name) = if uri == "qemu:///system" {
            (Connection::connect_system().await?, Some(uri))
        } else if uri.starts_with('/') {
            (Connection::connect_unix(uri).await?, None)
        } else {
            return Err(Error::UnsupportedUri(uri.to_string()));
        };

        let client = Self::open(conn, name).await?;
        tracing::debug!(uri, "libvirt connection open");
        Ok(client)
    }

    /// Authenticate over `conn` and open the driver `name` selects.
    pub async fn open(conn: Connection, name: Option<&str>) -> Result<Self> {
        let client = Self { conn };
        client.authenticate().await?;
        client
            .conn
            .call_unit(Procedure::ConnectOpen, &ConnectOpenArgs { name, flags: 0 })
            .await?;
        Ok(client)
    }

    /// Wrap an existing connection without running the open handshake.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Local sockets offer AUTH_NONE, or POLKIT when libvirtd checks the peer
    /// credentials itself.
    async fn authenticate(&self) -> Result<()> {
        let ret: AuthListRet = self.conn.call_xdr(Procedure::AuthList, &()).await?;

        if ret.types.is_empty() || ret.types.contains(&REMOTE_AUTH_NONE) {
            return Ok(());
        }

        if ret.types.contains(&REMOTE_AUTH_POLKIT) {
            let polkit: AuthPolkitRet = self.conn.call_xdr(Procedure::AuthPolkit, &()).await?;
            if polkit.complete == 0 {
                return Err(Error::AuthFailed("polkit authorization incomplete".into()));
            }
            return Ok(());
        }

        Err(Error::AuthFailed(format!(
            "no supported auth type offered: {:?}",
            ret.types
        )))
    }

    /// Close the connection.
    pub async fn close(&self) -> Result<()> {
        self.conn.call_unit(Procedure::ConnectClose, &()).await
    }

    pub async fn domain_lookup_by_name(&self, name: &str) -> Result<NonnullDomain> {
        let ret: DomainRet = self
            .conn
            .call_xdr(Procedure::DomainLookupByName, &DomainLookupByNameArgs { name })
            .await?;
        Ok(ret.dom)
    }

    /// Define (but do not start) a persistent domain from its XML description.
    pub async fn domain_define_xml(&self, xml: &str) -> Result<NonnullDomain> {
        let ret: DomainRet = self
            .conn
            .call_xdr(Procedure::DomainDefineXml, &DomainDefineXmlArgs { xml })
            .await?;
        Ok(ret.dom)
    }

    /// List domains matching `VIR_CONNECT_LIST_DOMAINS_*` `flags`.
    pub async fn connect_list_all_domains(&self, flags: u32) -> Result<Vec<NonnullDomain>> {
        let args = ConnectListAllDomainsArgs {
            need_results: 1,
            flags,
        };
        let ret: ConnectListAllDomainsRet = self
            .conn
            .call_xdr(Procedure::ConnectListAllDomains, &args)
            .await?;
        Ok(ret.domains)
    }

    pub async fn domain_get_info(&self, dom: &NonnullDomain) -> Result<DomainGetInfoRet> {
        self.conn
            .call_xdr(Procedure::DomainGetInfo, &DomainArgs { dom })
            .await
    }

    /// Boot a defined domain.
    pub async fn domain_create(&self, dom: &NonnullDomain) -> Result<()> {
        self.conn.call_unit(Procedure::DomainCreate, &DomainArgs { dom }).await
    }

    /// Stop a domain immediately.
    pub async fn domain_destroy(&self, dom: &NonnullDomain) -> Result<()> {
        self.conn.call_unit(Procedure::DomainDestroy, &DomainArgs { dom }).await
    }

    /// Ask the guest to power off.
    pub async fn domain_shutdown(&self, dom: &NonnullDomain) -> Result<()> {
        self.conn.call_unit(Procedure::DomainShutdown, &DomainArgs { dom }).await
    }

    pub async fn domain_reboot(&self, dom: &NonnullDomain, flags: u32) -> Result<()> {
        self.conn
            .call_unit(Procedure::DomainReboot, &DomainFlagsArgs { dom, flags })
            .await
    }

    /// Reset the virtual hardware without a guest shutdown.
    pub async fn domain_reset(&self, dom: &NonnullDomain, flags: u32) -> Result<()> {
        self.conn
            .call_unit(Procedure::DomainReset, &DomainFlagsArgs { dom, flags })
            .await
    }

    pub async fn domain_suspend(&self, dom: &NonnullDomain) -> Result<()> {
        self.conn.call_unit(Procedure::DomainSuspend, &DomainArgs { dom }).await
    }

    pub async fn domain_resume(&self, dom: &NonnullDomain) -> Result<()> {
        self.conn.call_unit(Procedure::DomainResume, &DomainArgs { dom }).await
    }

    pub async fn domain_undefine_flags(&self, dom: &NonnullDomain, flags: u32) -> Result<()> {
        self.conn
            .call_unit(Procedure::DomainUndefineFlags, &DomainFlagsArgs { dom, flags })
            .await
    }

    /// Interface addresses of a running domain, from `source`
    /// (`VIR_DOMAIN_INTERFACE_ADDRESSES_SRC_*`).
    pub async fn domain_interface_addresses(
        &self,
        dom: &NonnullDomain,
        source: u32,
    ) -> Result<Vec<DomainInterface>> {
        let args = DomainInterfaceAddressesArgs {
            dom,
            source,
            flags: 0,
        };
        let ret: DomainInterfaceAddressesRet = self
            .conn
            .call_xdr(Procedure::DomainInterfaceAddresses, &args)
            .await?;
        Ok(ret.ifaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{MessageType, Packet, Status, HEADER_SIZE};
    use crate::transport::UnixTransport;
    use bytes::{BufMut, Bytes, BytesMut};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::UnixStream;

    /// Answers each call with the next canned payload and records the calls.
    async fn fake_daemon(mut stream: UnixStream, replies: Vec<Vec<u8>>) -> Vec<Packet> {
        let mut calls = Vec::new();
        for payload in replies {
            let len = stream.read_u32().await.unwrap() as usize;
            let mut body = vec![0u8; len - 4];
            stream.read_exact(&mut body).await.unwrap();
            let call = Packet::decode(Bytes::from(body)).unwrap();

            let mut buf = BytesMut::new();
            buf.put_u32((4 + HEADER_SIZE + payload.len()) as u32);
            buf.put_u32(REMOTE_PROGRAM);
            buf.put_u32(REMOTE_PROTOCOL_VERSION);
            buf.put_u32(call.procedure);
            buf.put_u32(MessageType::Reply as u32);
            buf.put_i32(call.serial);
            buf.put_u32(Status::Ok as u32);
            buf.extend_from_slice(&payload);
            stream.write_all(&buf).await.unwrap();
            calls.push(call);
        }
        calls
    }

    fn client(stream: UnixStream) -> Client {
        Client::from_connection(Connection::from_transport(UnixTransport::from_stream(stream)))
    }

    fn domain_bytes(name: &str, id: i32) -> Vec<u8> {
        let mut buf = tarsvirt_xdr::to_bytes(name).unwrap();
        buf.extend_from_slice(&[0x42; 16]);
        buf.extend_from_slice(&id.to_be_bytes());
        buf
    }

    fn auth_list(types: &[i32]) -> Vec<u8> {
        tarsvirt_xdr::to_bytes(&types.to_vec()).unwrap()
    }

    fn procedures(calls: &[Packet]) -> Vec<u32> {
        calls.iter().map(|c| c.procedure).collect()
    }

    async fn handshake(replies: Vec<Vec<u8>>, name: Option<&str>) -> (Result<Client>, Vec<Packet>) {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let daemon = tokio::spawn(fake_daemon(theirs, replies));
        let conn = Connection::from_transport(UnixTransport::from_stream(ours));
        let result = Client::open(conn, name).await;
        (result, daemon.await.unwrap())
    }

    #[tokio::test]
    async fn test_connect_socket_path_without_auth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libvirt-sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();
        let daemon = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            fake_daemon(stream, vec![auth_list(&[REMOTE_AUTH_NONE]), Vec::new()]).await
        });

        Client::connect(path.to_str().unwrap()).await.unwrap();

        let calls = daemon.await.unwrap();
        assert_eq!(procedures(&calls), vec![66, 1]);
        // no driver name, no flags
        assert_eq!(&calls[1].payload[..], &[0; 8]);
    }

    #[tokio::test]
    async fn test_open_names_the_driver() {
        let (result, calls) = handshake(vec![auth_list(&[]), Vec::new()], Some("qemu:///system")).await;
        result.unwrap();

        assert_eq!(procedures(&calls), vec![66, 1]);
        let mut expected = vec![0, 0, 0, 1];
        expected.extend(tarsvirt_xdr::to_bytes("qemu:///system").unwrap());
        expected.extend_from_slice(&[0; 4]);
        assert_eq!(&calls[1].payload[..], &expected[..]);
    }

    #[tokio::test]
    async fn test_open_with_polkit() {
        let replies = vec![auth_list(&[REMOTE_AUTH_POLKIT]), vec![0, 0, 0, 1], Vec::new()];
        let (result, calls) = handshake(replies, Some("qemu:///system")).await;
        result.unwrap();

        assert_eq!(procedures(&calls), vec![66, 70, 1]);
        assert!(calls[1].payload.is_empty());
    }

    #[tokio::test]
    async fn test_open_polkit_incomplete() {
        let replies = vec![auth_list(&[REMOTE_AUTH_POLKIT]), vec![0, 0, 0, 0]];
        let (result, calls) = handshake(replies, Some("qemu:///system")).await;

        let err = result.err().expect("incomplete polkit auth must fail");
        assert!(matches!(err, Error::AuthFailed(_)), "{err}");
        assert_eq!(procedures(&calls), vec![66, 70]);
    }

    #[tokio::test]
    async fn test_open_rejects_unsupported_auth() {
        let (result, calls) = handshake(vec![auth_list(&[REMOTE_AUTH_SASL])], None).await;

        let err = result.err().expect("SASL-only daemon must be refused");
        assert!(matches!(err, Error::AuthFailed(_)), "{err}");
        assert_eq!(procedures(&calls), vec![66]);
    }

    #[tokio::test]
    async fn test_connect_rejects_remote_uri() {
        for uri in ["qemu:///session", "qemu+tcp://host/system", "relative/sock"] {
            let err = Client::connect(uri).await.err().expect("unsupported URI");
            assert!(matches!(err, Error::UnsupportedUri(_)), "{uri}: {err}");
        }
    }

    #[tokio::test]
    async fn test_get_info_and_reboot() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let mut info = Vec::new();
        info.extend_from_slice(&[0, 0, 0, 3]);
        info.extend_from_slice(&4096u64.to_be_bytes());
        info.extend_from_slice(&2048u64.to_be_bytes());
        info.extend_from_slice(&[0, 0, 0, 2]);
        info.extend_from_slice(&500u64.to_be_bytes());
        let daemon = tokio::spawn(fake_daemon(theirs, vec![info, Vec::new()]));

        let client = client(ours);
        let dom = NonnullDomain {
            name: "testbox".into(),
            uuid: tarsvirt_xdr::Uuid([0x42; 16]),
            id: 4,
        };

        let ret = client.domain_get_info(&dom).await.unwrap();
        assert_eq!(ret.state, VIR_DOMAIN_PAUSED);
        assert_eq!(ret.max_mem, 4096);
        assert_eq!(ret.memory, 2048);
        assert_eq!(ret.nr_virt_cpu, 2);
        assert_eq!(ret.cpu_time, 500);

        client.domain_reboot(&dom, VIR_DOMAIN_REBOOT_DEFAULT).await.unwrap();

        let calls = daemon.await.unwrap();
        assert_eq!(calls[0].procedure, Procedure::DomainGetInfo as u32);
        assert_eq!(calls[1].procedure, Procedure::DomainReboot as u32);
        assert!(calls[1].serial > calls[0].serial);
    }

    #[tokio::test]
    async fn test_list_all_domains() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let mut reply = vec![0, 0, 0, 2];
        reply.extend(domain_bytes("web", 1));
        reply.extend(domain_bytes("archived", -1));
        reply.extend_from_slice(&[0, 0, 0, 2]);
        let daemon = tokio::spawn(fake_daemon(theirs, vec![reply]));

        let domains = client(ours)
            .connect_list_all_domains(VIR_CONNECT_LIST_DOMAINS_ACTIVE | VIR_CONNECT_LIST_DOMAINS_INACTIVE)
            .await
            .unwrap();
        assert_eq!(domains.len(), 2);
        assert_eq!(domains[1].name, "archived");
        assert!(!domains[1].is_active());

        let calls = daemon.await.unwrap();
        assert_eq!(&calls[0].payload[..], &[0, 0, 0, 1, 0, 0, 0, 3]);
    }

    #[tokio::test]
    async fn test_interface_addresses() {
        let (ours, theirs) = UnixStream::pair().unwrap();
        let iface = DomainInterface {
            name: "eth0".into(),
            hwaddr: Some("52:54:00:aa:bb:cc".into()),
            addrs: vec![DomainIpAddr {
                kind: VIR_IP_ADDR_TYPE_IPV4,
                addr: "192.168.122.10".into(),
                prefix: 24,
            }],
        };
        let reply = tarsvirt_xdr::to_bytes(&vec![iface.clone()]).unwrap();
        let daemon = tokio::spawn(fake_daemon(theirs, vec![reply]));

        let dom = NonnullDomain {
            name: "web".into(),
            uuid: tarsvirt_xdr::Uuid::default(),
            id: 1,
        };
        let ifaces = client(ours)
            .domain_interface_addresses(&dom, VIR_DOMAIN_INTERFACE_ADDRESSES_SRC_AGENT)
            .await
            .unwrap();
        assert_eq!(ifaces, vec![iface]);

        let calls = daemon.await.unwrap();
        assert_eq!(calls[0].procedure, Procedure::DomainInterfaceAddresses as u32);
    }
}
