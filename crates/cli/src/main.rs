//! # Ferrous Fanmerge
//!
//! Sends every DNS query to all configured upstreams at once and answers with
//! the merged result.

mod bootstrap;
mod di;
mod server;

use clap::{Parser, Subcommand};
use ferrous_fanmerge_domain::{CliOverrides, NetworkKind};
use tracing::info;

#[derive(Parser)]
#[command(name = "ferrous-fanmerge")]
#[command(version)]
#[command(about = "Fan-out DNS forwarder that merges upstream answers")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Upstream server (repeatable), e.g. 8.8.8.8, tcp://1.1.1.1:53 or tls://9.9.9.9
    #[arg(short = 'u', long = "upstream")]
    upstreams: Vec<String>,

    /// Transport for upstreams without a scheme
    #[arg(long)]
    net: Option<NetworkKind>,

    /// Certificate name expected from TLS upstreams
    #[arg(long)]
    tls_server_name: Option<String>,

    /// Attempts per upstream (0 retries until the deadline)
    #[arg(long)]
    attempts: Option<u32>,

    /// Overall fan-out deadline in milliseconds
    #[arg(long)]
    deadline_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a single name and print the merged reply
    Query {
        name: String,

        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: String,
    },
    /// Serve DNS over UDP and TCP
    Serve {
        /// DNS server port
        #[arg(short = 'd', long)]
        dns_port: Option<u16>,

        /// Bind address
        #[arg(short = 'b', long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (dns_port, bind_address) = match &cli.command {
        Command::Serve { dns_port, bind } => (*dns_port, bind.clone()),
        Command::Query { .. } => (None, None),
    };
    let overrides = CliOverrides {
        dns_port,
        bind_address,
        log_level: cli.log_level,
        upstreams: cli.upstreams,
        net: cli.net,
        tls_server_name: cli.tls_server_name,
        attempts: cli.attempts,
        deadline_ms: cli.deadline_ms,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config);
    bootstrap::config::log_config(cli.config.as_deref(), &config);

    let handler = di::build_chain(&config)?;

    match cli.command {
        Command::Query { name, record_type } => {
            server::run_query(handler, &name, &record_type).await
        }
        Command::Serve { .. } => {
            server::start_dns_server(&config.server, handler).await?;
            info!("DNS server stopped");
            Ok(())
        }
    }
}
