//! Command failures.

use std::path::PathBuf;

use crate::commands::Lifecycle;

/// Why a command failed. The message names the failing step and carries
/// the daemon's own explanation.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("--{flag} requires --{companion}")]
    MissingArgument {
        flag: &'static str,
        companion: &'static str,
    },

    #[error("failed to look up domain {name}: {source}")]
    Lookup {
        name: String,
        source: tarsvirt_rpc::Error,
    },

    #[error("failed to {action} domain {name}: {source}")]
    Operation {
        action: Lifecycle,
        name: String,
        source: tarsvirt_rpc::Error,
    },

    #[error("failed to get info for domain {name}: {source}")]
    Info {
        name: String,
        source: tarsvirt_rpc::Error,
    },

    #[error("failed to read XML template {}: {source}", path.display())]
    ReadTemplate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to define domain: {0}")]
    Define(#[source] tarsvirt_rpc::Error),

    #[error("failed to list domains: {0}")]
    List(#[source] tarsvirt_rpc::Error),

    #[error("failed to get interface addresses for domain {name}: {source}")]
    Interfaces {
        name: String,
        source: tarsvirt_rpc::Error,
    },

    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}
