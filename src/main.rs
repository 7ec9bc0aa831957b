// Main binary that starts the config server
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use std::io::stderr;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

mod cmd;

use cmd::serve::ServeArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Network boot and provisioning config server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output - shows more detailed logs
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve boot scripts and provisioning configs over HTTP
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Respect RUST_LOG, fall back to info (debug with --verbose) for our crates
    let level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "netboot={level},netboot_server={level},tower_http=warn,minijinja=warn",
        level = level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));
    registry().with(filter).with(fmt::layer().with_writer(stderr)).init();
    debug!("Logger initialized");

    match cli.command {
        Commands::Serve(args) => {
            if let Err(e) = cmd::serve::run_serve(args).await {
                error!("Server failed to run: {:#}", e);
                eprintln!("Error running netboot server: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
