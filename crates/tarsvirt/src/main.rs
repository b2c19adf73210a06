use std::io;
use std::process::ExitCode;

use clap::Parser;
use tarsvirt::{dispatch, Cli, Outcome, Reporter, LIBVIRT_URI};
use tarsvirt_rpc::Client;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let command = match cli.command() {
        Ok(Some(command)) => command,
        Ok(None) => return ExitCode::SUCCESS,
        Err(err) => return Reporter::new(io::stdout()).report(Err(err)).into(),
    };

    // Nothing is acquired before this point, so a failed connect has nothing
    // to release.
    let client = match Client::connect(LIBVIRT_URI).await {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("failed to connect: {}", e);
            return Outcome::Failure.into();
        }
    };

    let outcome = dispatch(&command, &client, cli.format(), io::stdout()).await;

    if let Err(e) = client.close().await {
        tracing::warn!(error = %e, "failed to close libvirt connection");
    }

    outcome.into()
}
