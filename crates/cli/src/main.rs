//! # Fathom
//!
//! Streaming code-search server: point it at directories of
//! repositories and search them over a long-lived event stream.

mod bootstrap;
mod di;
mod server;

use clap::Parser;
use fathom_domain::CliOverrides;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fathom")]
#[command(version)]
#[command(about = "Streaming code search over your local repositories")]
struct Cli {
    /// Path to the configuration file
    #[arg(short = 'c', long, default_value = "fathom.toml")]
    config: PathBuf,

    /// Bind address (overrides the config file)
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// HTTP port (overrides the config file)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Repository root; may be given multiple times (overrides the
    /// config file)
    #[arg(short = 'r', long = "root")]
    roots: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let overrides = CliOverrides {
        bind: cli.bind,
        port: cli.port,
        roots: cli.roots,
    };

    let config = bootstrap::config::load_config(&cli.config, &overrides)?;
    bootstrap::logging::init_logging(&config);

    let state = di::build_state(&config)?;
    let router = server::build_router(state);

    let addr: SocketAddr = format!(
        "{}:{}",
        config.server.bind_address, config.server.web_port
    )
    .parse()?;
    server::serve(router, addr).await
}
