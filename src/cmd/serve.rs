//! Serve command
//!
//! Runs the config server over a resource directory.

use anyhow::{Context, Result};
use clap::Args;
use netboot_server::sign::{ArmoredSigner, Ed25519Signer, Signer};
use netboot_server::store::{create_store, StoreConfig};
use netboot_server::Config;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "NETBOOT_ADDRESS", default_value = "127.0.0.1:8080")]
    pub address: SocketAddr,

    /// Directory holding groups, profiles and templates
    #[arg(long, env = "NETBOOT_DATA_PATH", default_value = "/var/lib/netboot")]
    pub data_path: PathBuf,

    /// Directory served at /assets
    #[arg(long, env = "NETBOOT_ASSETS_PATH")]
    pub assets_path: Option<PathBuf>,

    /// Hex encoded Ed25519 seed; enables the .sig and .asc endpoints
    #[arg(long, env = "NETBOOT_SIGN_KEY")]
    pub sign_key: Option<PathBuf>,
}

/// Build the server configuration from command line arguments
pub async fn build_config(args: &ServeArgs) -> Result<Config> {
    if !args.data_path.is_dir() {
        warn!(
            data_path = %args.data_path.display(),
            "Data directory does not exist; no machine will match until it is created"
        );
    }

    let store = create_store(&StoreConfig::File {
        path: args.data_path.clone(),
    });
    let mut config = Config::new(store);

    if let Some(assets) = &args.assets_path {
        config = config.with_assets(assets);
    }

    if let Some(key) = &args.sign_key {
        let signer: Arc<dyn Signer> = Arc::new(
            Ed25519Signer::from_file(key)
                .await
                .with_context(|| format!("Failed to load signing key {}", key.display()))?,
        );
        config = config
            .with_signer(signer.clone())
            .with_armored_signer(Arc::new(ArmoredSigner::new(signer)));
        info!(key = %key.display(), "Signed endpoints enabled");
    }

    Ok(config)
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = build_config(&args).await?;
    info!(data_path = %args.data_path.display(), "Serving resources");
    netboot_server::run(config, args.address).await
}
