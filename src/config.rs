//! Configuration for DualKV
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::KvError;

/// Largest request or response carried by a single datagram
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 1024;

/// Transport a server listens on or a client talks over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Connection-oriented, newline-delimited sessions
    Tcp,

    /// One request per packet, no session
    Udp,
}

impl Transport {
    /// Upper-case name as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Tcp => "TCP",
            Transport::Udp => "UDP",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = KvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TCP" => Ok(Transport::Tcp),
            "UDP" => Ok(Transport::Udp),
            _ => Err(KvError::Config(format!(
                "invalid protocol '{}', expected TCP or UDP",
                s
            ))),
        }
    }
}

/// Main configuration for a DualKV server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Listen address (host:port)
    pub listen_addr: String,

    /// Which transport loop to run
    pub transport: Transport,

    /// Maximum datagram payload, both directions (UDP only)
    pub max_datagram_size: usize,

    /// Per-connection read timeout in milliseconds, 0 disables (TCP only)
    pub read_timeout_ms: u64,

    /// Per-connection write timeout in milliseconds, 0 disables (TCP only)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Append-mode log file; `None` logs to the console only
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            transport: Transport::Tcp,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            log_file: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Log file name used when none is given: `TCPServerLog.log` or `UDPServerLog.log`
    pub fn default_log_file(transport: Transport) -> PathBuf {
        PathBuf::from(format!("{}ServerLog.log", transport))
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the listen address (host:port)
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the transport
    pub fn transport(mut self, transport: Transport) -> Self {
        self.config.transport = transport;
        self
    }

    /// Set the maximum datagram size (in bytes)
    pub fn max_datagram_size(mut self, size: usize) -> Self {
        self.config.max_datagram_size = size;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the log file path
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
