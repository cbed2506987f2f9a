//! Serve command - run the HTTP upload server.

use std::sync::Arc;

use clap::Args;
use tracing::info;

use invoscan_core::Pipeline;

use super::load_config;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (default from config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (default from config)
    #[arg(short, long)]
    port: Option<u16>,
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let host = config.server.host.clone();
    let port = config.server.port;

    let pipeline = Arc::new(Pipeline::from_config(config)?);
    info!("Starting invoscan server on {}:{}", host, port);

    invoscan_core::api::serve(pipeline, &host, port).await?;
    Ok(())
}
