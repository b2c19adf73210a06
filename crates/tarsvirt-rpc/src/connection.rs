//! Connection management for libvirt RPC.
//!
//! A background task owns the transport. Callers hand it encoded calls over
//! a channel and wait on a oneshot registered under the call's serial; the
//! task routes each reply to the matching waiter.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::error::{Error, Result};
use crate::packet::{MessageType, Packet, Status};
use crate::remote::{Procedure, RemoteError};
use crate::transport::{Transport, UnixTransport};

/// Default Unix socket path for system connections.
pub const SYSTEM_SOCKET_PATH: &str = "/var/run/libvirt/libvirt-sock";

type Waiters = Mutex<HashMap<i32, oneshot::Sender<Result<Bytes>>>>;

/// A connection to a libvirt daemon.
///
/// Dropping it closes the call channel, which ends the I/O task and shuts
/// the socket down.
pub struct Connection {
    tx: mpsc::Sender<Packet>,
    inner: Arc<ConnectionInner>,
}

struct ConnectionInner {
    serial: AtomicU32,
    pending: Waiters,
}

impl Connection {
    pub async fn connect_unix(path: impl AsRef<Path>) -> Result<Self> {
        let transport = UnixTransport::connect(path).await?;
        Ok(Self::from_transport(transport))
    }

    /// Connect to the system libvirt daemon.
    pub async fn connect_system() -> Result<Self> {
        Self::connect_unix(SYSTEM_SOCKET_PATH).await
    }

    /// Start the I/O task over `transport`.
    pub fn from_transport<T: Transport + 'static>(transport: T) -> Self {
        let (tx, rx) = mpsc::channel::<Packet>(32);

        let inner = Arc::new(ConnectionInner {
            serial: AtomicU32::new(1),
            pending: Mutex::new(HashMap::new()),
        });

        let task_inner = inner.clone();
        tokio::spawn(async move {
            if let Err(e) = io_task(transport, rx, &task_inner).await {
                tracing::warn!(error = %e, "libvirt connection I/O failed");
            }
            fail_pending(&task_inner.pending).await;
        });

        Self { tx, inner }
    }

    /// Make a raw RPC call and return the reply payload.
    pub async fn call(&self, procedure: Procedure, payload: Bytes) -> Result<Bytes> {
        let serial = self.inner.serial.fetch_add(1, Ordering::SeqCst) as i32;
        let packet = Packet::call(procedure, serial, payload);

        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().await.insert(serial, tx);

        tracing::trace!(?procedure, serial, "rpc call");
        if self.tx.send(packet).await.is_err() {
            self.inner.pending.lock().await.remove(&serial);
            return Err(Error::ConnectionClosed);
        }

        rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Make a typed RPC call with XDR serialization.
    pub async fn call_xdr<Req, Resp>(&self, procedure: Procedure, args: &Req) -> Result<Resp>
    where
        Req: serde::Serialize + ?Sized,
        Resp: serde::de::DeserializeOwned,
    {
        let payload = tarsvirt_xdr::to_bytes(args)?;
        let response = self.call(procedure, Bytes::from(payload)).await?;
        Ok(tarsvirt_xdr::from_bytes(&response)?)
    }

    /// Call a procedure whose reply carries no data.
    pub async fn call_unit<Req>(&self, procedure: Procedure, args: &Req) -> Result<()>
    where
        Req: serde::Serialize + ?Sized,
    {
        let payload = tarsvirt_xdr::to_bytes(args)?;
        self.call(procedure, Bytes::from(payload)).await?;
        Ok(())
    }
}

/// Sends queued calls and reads replies until the channel or socket closes.
///
/// Calls are written one at a time and the task reads until the reply to
/// that call arrives, so at most one call is on the wire.
async fn io_task<T: Transport>(
    mut transport: T,
    mut rx: mpsc::Receiver<Packet>,
    inner: &ConnectionInner,
) -> Result<()> {
    while let Some(packet) = rx.recv().await {
        let serial = packet.serial;
        let sent = match packet.encode() {
            Ok(encoded) => transport.send(&encoded).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = sent {
            if let Some(waiter) = inner.pending.lock().await.remove(&serial) {
                let _ = waiter.send(Err(e));
            }
            continue;
        }

        loop {
            let reply = Packet::decode(transport.recv().await?)?;
            if reply.msg_type != MessageType::Reply {
                tracing::debug!(procedure = reply.procedure, "ignoring unsolicited message");
                continue;
            }

            let answered = reply.serial == serial;
            match inner.pending.lock().await.remove(&reply.serial) {
                Some(waiter) => {
                    let _ = waiter.send(reply_result(reply));
                }
                None => tracing::warn!(serial = reply.serial, "reply for unknown serial"),
            }
            if answered {
                break;
            }
        }
    }

    transport.close().await
}

/// Turn a reply packet into the caller's result.
fn reply_result(reply: Packet) -> Result<Bytes> {
    match reply.status {
        Status::Ok => Ok(reply.payload),
        Status::Error => Err(decode_remote_error(&reply.payload)),
        Status::Continue => Err(Error::Protocol("unexpected stream continuation".into())),
    }
}

fn decode_remote_error(payload: &[u8]) -> Error {
    match tarsvirt_xdr::from_bytes_prefix::<RemoteError>(payload) {
        Ok(err) => err.into(),
        Err(e) => Error::Protocol(format!("undecodable error reply: {}", e)),
    }
}

async fn fail_pending(pending: &Waiters) {
    for (_, waiter) in pending.lock().await.drain() {
        let _ = waiter.send(Err(Error::ConnectionClosed));
    }
}
