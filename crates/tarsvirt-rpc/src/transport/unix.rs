//! Local daemon socket.

use std::path::Path;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;

use super::{read_framed, write_framed, Transport};
use crate::error::Result;

/// Initial receive buffer; most replies in this client are far smaller.
const READ_BUF_CAPACITY: usize = 4096;

pub struct UnixTransport {
    stream: UnixStream,
    read_buf: BytesMut,
}

impl UnixTransport {
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(socket = %path.display(), "connecting to libvirt daemon");
        Ok(Self::from_stream(UnixStream::connect(path).await?))
    }

    /// Wrap a stream that is already connected, e.g. one end of a socket pair.
    pub fn from_stream(stream: UnixStream) -> Self {
        Self {
            stream,
            read_buf: BytesMut::with_capacity(READ_BUF_CAPACITY),
        }
    }
}

#[async_trait]
impl Transport for UnixTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        write_framed(&mut self.stream, data).await
    }

    async fn recv(&mut self) -> Result<Bytes> {
        read_framed(&mut self.stream, &mut self.read_buf).await
    }

    async fn close(&mut self) -> Result<()> {
        Ok(self.stream.shutdown().await?)
    }
}
