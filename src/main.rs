use std::env;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use priolink::channel::{InProcessChannel, UdpChannel};
use priolink::config::NodeConfig;
use priolink::node;
use priolink::policy::ThresholdPolicy;
use priolink::reader::Reader;
use priolink::responder::Responder;
use priolink::scanner::ScriptedScanner;
use priolink::telemetry::SyntheticTelemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let role = args.get(1).map(String::as_str).unwrap_or("demo");
    let config = NodeConfig::load(args.get(2).map(String::as_str))?;

    match role {
        "reader" => run_reader_node(config).await,
        "responder" => run_responder_node(config).await,
        "demo" => run_demo(config).await,
        other => anyhow::bail!("unknown role {:?}, expected reader | responder | demo", other),
    }
}

/// Roadside reader node over UDP.
async fn run_reader_node(config: NodeConfig) -> anyhow::Result<()> {
    let channel = UdpChannel::bind(config.bind, config.peer)
        .await
        .with_context(|| format!("binding reader socket on {}", config.bind))?;
    let scanner = ScriptedScanner::new(config.parse_tags()?);
    let reader = Reader::new(ThresholdPolicy::default(), config.reader.clone());

    info!(bind = %config.bind, peer = %config.peer, "reader node up");
    node::run_reader(channel, scanner, reader, &config).await
}

/// Remote telemetry node over UDP.
async fn run_responder_node(config: NodeConfig) -> anyhow::Result<()> {
    let channel = UdpChannel::bind(config.bind, config.peer)
        .await
        .with_context(|| format!("binding responder socket on {}", config.bind))?;
    let responder = Responder::new(SyntheticTelemetry::new());

    info!(bind = %config.bind, peer = %config.peer, "responder node up");
    node::run_responder(channel, responder, &config).await
}

/// Both roles in one process over a loopback pair.
async fn run_demo(config: NodeConfig) -> anyhow::Result<()> {
    let (reader_end, responder_end) = InProcessChannel::pair();
    let scanner = ScriptedScanner::new(config.parse_tags()?);
    let reader = Reader::new(ThresholdPolicy::default(), config.reader.clone());
    let responder = Responder::new(SyntheticTelemetry::new());

    info!(tags = config.tags.len(), "demo: reader and responder sharing a loopback channel");
    tokio::try_join!(
        node::run_reader(reader_end, scanner, reader, &config),
        node::run_responder(responder_end, responder, &config),
    )?;
    Ok(())
}
