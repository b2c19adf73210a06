//! Client errors.

use crate::remote::{RemoteError, VIR_ERR_NO_DOMAIN};

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a remote call can fail with, from socket to daemon.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("XDR error: {0}")]
    Xdr(#[from] tarsvirt_xdr::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Only `qemu:///system` and absolute socket paths are reachable.
    #[error("unsupported URI: {0}")]
    UnsupportedUri(String),

    /// The I/O task is gone; no more calls can be made.
    #[error("connection closed")]
    ConnectionClosed,

    /// Error reported by the daemon.
    #[error("{message}")]
    Rpc {
        code: i32,
        domain: i32,
        message: String,
    },

    /// The daemon offered no auth scheme this client speaks, or refused it.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A reply that does not fit the call it answers.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("packet error: {0}")]
    Packet(#[from] crate::packet::PacketError),
}

impl Error {
    /// The daemon has no domain by the requested name or UUID.
    pub fn is_no_domain(&self) -> bool {
        matches!(self, Error::Rpc { code, .. } if *code == VIR_ERR_NO_DOMAIN)
    }
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        Error::Rpc {
            code: err.code,
            domain: err.domain,
            message: err
                .message
                .unwrap_or_else(|| format!("unknown libvirt error {}", err.code)),
        }
    }
}
