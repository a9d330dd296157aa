//! Node configuration.
//!
//! Everything defaults to a working two-node loopback setup; a JSON file can
//! override any subset of fields.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::protocol::TagId;

/// Reader-side timing knobs for the response wait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// How long a query waits for its response before the deadline fires,
    /// in milliseconds.
    #[serde(default = "ReaderConfig::default_response_timeout_ms")]
    pub response_timeout_ms: u64,
    /// How many times a timed-out query is re-issued before the reader
    /// gives up on the tag.
    #[serde(default = "ReaderConfig::default_max_retries")]
    pub max_retries: u8,
}

impl ReaderConfig {
    const fn default_response_timeout_ms() -> u64 {
        500
    }

    const fn default_max_retries() -> u8 {
        2
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            response_timeout_ms: Self::default_response_timeout_ms(),
            max_retries: Self::default_max_retries(),
        }
    }
}

/// Configuration for one node process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Local UDP bind address.
    #[serde(default = "NodeConfig::default_bind")]
    pub bind: SocketAddr,
    /// Peer node's UDP address.
    #[serde(default = "NodeConfig::default_peer")]
    pub peer: SocketAddr,
    /// The peer's mesh address.
    #[serde(default = "NodeConfig::default_peer_addr")]
    pub peer_addr: u16,
    /// Scheduler tick interval in milliseconds.
    #[serde(default = "NodeConfig::default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub reader: ReaderConfig,
    /// Tags the scripted scanner reports, as 8-hex-digit strings.
    #[serde(default = "NodeConfig::default_tags")]
    pub tags: Vec<String>,
}

impl NodeConfig {
    fn default_bind() -> SocketAddr {
        "127.0.0.1:8000".parse().expect("static addr")
    }

    fn default_peer() -> SocketAddr {
        "127.0.0.1:8001".parse().expect("static addr")
    }

    const fn default_peer_addr() -> u16 {
        1
    }

    const fn default_tick_ms() -> u64 {
        20
    }

    fn default_tags() -> Vec<String> {
        vec!["01020304".to_string()]
    }

    /// Load a config file, or the defaults when no path is given.
    pub fn load(path: Option<&str>) -> anyhow::Result<NodeConfig> {
        match path {
            None => Ok(NodeConfig::default()),
            Some(path) => {
                let raw = fs::read_to_string(Path::new(path))
                    .with_context(|| format!("reading config file {}", path))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path))
            }
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Decode the configured tag strings.
    pub fn parse_tags(&self) -> anyhow::Result<Vec<TagId>> {
        self.tags
            .iter()
            .map(|s| {
                let bytes = hex::decode(s).with_context(|| format!("tag {:?} is not hex", s))?;
                let id: [u8; 4] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("tag {:?} is not 4 bytes", s))?;
                Ok(TagId(id))
            })
            .collect()
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind: Self::default_bind(),
            peer: Self::default_peer(),
            peer_addr: Self::default_peer_addr(),
            tick_ms: Self::default_tick_ms(),
            reader: ReaderConfig::default(),
            tags: Self::default_tags(),
        }
    }
}
