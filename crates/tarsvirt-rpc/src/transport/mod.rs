//! Byte transports that carry framed libvirt RPC messages.
//!
//! Only the local Unix socket is implemented; remote transports (TCP, TLS,
//! SSH) plug in behind the same trait.

mod unix;

pub use unix::UnixTransport;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::Result;
use crate::packet::{PacketError, HEADER_SIZE, MAX_PACKET_SIZE};

/// A bidirectional message pipe to the daemon.
#[async_trait]
pub trait Transport: Send {
    /// Send one encoded message, length word included.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive one message body, length word stripped.
    async fn recv(&mut self) -> Result<Bytes>;

    /// Shut down the write side.
    async fn close(&mut self) -> Result<()>;
}

/// Read one length-prefixed message.
async fn read_framed<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut BytesMut) -> Result<Bytes> {
    let total_len = reader.read_u32().await? as usize;
    if total_len > MAX_PACKET_SIZE {
        return Err(PacketError::TooLarge(total_len).into());
    }

    let body_len = total_len.saturating_sub(4);
    if body_len < HEADER_SIZE {
        return Err(PacketError::TooShort(body_len).into());
    }

    buf.clear();
    buf.resize(body_len, 0);
    reader.read_exact(&mut buf[..]).await?;

    Ok(buf.split().freeze())
}

/// Write one already-framed message.
async fn write_framed<W: AsyncWrite + Unpin>(writer: &mut W, data: &[u8]) -> Result<()> {
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_framed() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&(4 + HEADER_SIZE as u32 + 2).to_be_bytes());
        wire.extend_from_slice(&[1; HEADER_SIZE]);
        wire.extend_from_slice(b"ok");

        let mut reader = &wire[..];
        let mut buf = BytesMut::new();
        let body = read_framed(&mut reader, &mut buf).await.unwrap();
        assert_eq!(body.len(), HEADER_SIZE + 2);
        assert_eq!(&body[HEADER_SIZE..], b"ok");
    }

    #[tokio::test]
    async fn test_read_framed_rejects_oversized() {
        let wire = (MAX_PACKET_SIZE as u32 + 1).to_be_bytes();
        let mut reader = &wire[..];
        let err = read_framed(&mut reader, &mut BytesMut::new()).await.unwrap_err();
        assert!(matches!(err, crate::Error::Packet(PacketError::TooLarge(_))));
    }
}
