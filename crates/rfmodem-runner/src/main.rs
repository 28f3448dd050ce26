//! rfmodem - run one simulated radio modem node.
//!
//! The node's serial port is served over TCP; connect with any raw TCP
//! client (`nc 127.0.0.1 9000`), wait a second, type `+++`, wait again,
//! and the modem answers `[<node>] OK`.

use std::path::PathBuf;

use clap::Parser;
use rfmodem_runner::{HaltReason, NodeConfig, NodeSession, RunnerResult, UartServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "rfmodem", version, about = "Simulated radio modem with an AT command console")]
struct Cli {
    /// Node configuration file (YAML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TCP port for the serial console.
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind the serial console to.
    #[arg(long)]
    bind: Option<String>,

    /// Node id, overriding the configuration file.
    #[arg(short, long)]
    node_id: Option<u16>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> RunnerResult<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();

    rfmodem_metrics::describe_metrics();

    let mut config = match &cli.config {
        Some(path) => NodeConfig::load(path)?,
        None => NodeConfig::default(),
    };
    if let Some(port) = cli.port {
        config.uart.port = port;
    }
    if let Some(bind) = cli.bind {
        config.uart.bind = bind;
    }
    if let Some(node_id) = cli.node_id {
        config.identity.node_id = node_id;
    }

    let session = NodeSession::from_config(&config)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let reason = runtime.block_on(async {
        let server = UartServer::bind(&config.uart, session).await?;
        tracing::info!(
            "node {} serial console on {}",
            config.identity.node_id,
            server.local_addr()?
        );
        server.run().await
    })?;

    match reason {
        HaltReason::Reset => {
            tracing::info!("board reset, exiting");
            Ok(())
        }
        HaltReason::FlashFault => {
            // A faulted board hangs until power is cycled.
            tracing::error!("flash fault, node halted");
            loop {
                std::thread::park();
            }
        }
    }
}
