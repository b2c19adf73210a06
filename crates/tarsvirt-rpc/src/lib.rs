//! Minimal pure-Rust libvirt client.
//!
//! Speaks the libvirt RPC protocol over the daemon's Unix socket and covers
//! the procedures needed to manage domain lifecycles: lookup, define,
//! undefine, start, stop, reboot, suspend, resume, info, listing and guest
//! interface addresses.
//!
//! # Example
//!
//! ```ignore
//! use tarsvirt_rpc::{Client, VIR_CONNECT_LIST_DOMAINS_ACTIVE};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::connect("qemu:///system").await?;
//!     for dom in client.connect_list_all_domains(VIR_CONNECT_LIST_DOMAINS_ACTIVE).await? {
//!         println!("Domain: {}", dom.name);
//!     }
//!     client.close().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod connection;
mod error;
mod packet;
pub mod remote;
mod transport;

pub use client::Client;
pub use connection::{Connection, SYSTEM_SOCKET_PATH};
pub use error::{Error, Result};
pub use packet::PacketError;
pub use remote::*;
pub use tarsvirt_xdr::Uuid;
pub use transport::{Transport, UnixTransport};
