use anyhow::Context;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use udp_dns_server::{DnsServer, ServerConfig, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "dns-server")]
struct Args {
    /// Upstream DNS resolver address (e.g., 8.8.8.8:53); answers locally when empty
    #[arg(long, default_value = "")]
    resolver: String,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:2053")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting DNS server");

    let shutdown = Shutdown::new();
    shutdown
        .register_signals()
        .context("Failed to install signal handlers")?;

    let config = ServerConfig::new(args.resolver);
    let server = DnsServer::bind(&args.bind, &config)
        .with_context(|| format!("Failed to bind to {}", args.bind))?;

    info!(addr = %server.local_addr()?, forwarding = server.is_forwarding(), "Listening");

    server.run(&shutdown)?;

    info!("Server stopped");
    Ok(())
}
