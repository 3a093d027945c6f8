use std::{fs::read_to_string, net::IpAddr, str::FromStr};

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Server {
    ///
    /// listening address
    ///
    /// The address every peer port is bound to. Accepting just any address
    /// is fine, the relay runs on a controlled LAN.
    ///
    #[serde(default = "Server::bind")]
    pub bind: IpAddr,
    ///
    /// base listening port
    ///
    /// Each peer slot listens on `port-base + 10 * slot`; with the default
    /// base, CLIENT is 54200, ROOFUHF 54210, ROOFXBAND 54220, HAYSTACK
    /// 54230 and TRACK 54240.
    ///
    #[serde(default = "Server::port_base")]
    pub port_base: u16,
    ///
    /// listen backlog
    ///
    /// Only one active peer is expected per slot; the backlog just
    /// tolerates reconnect races.
    ///
    #[serde(default = "Server::backlog")]
    pub backlog: u32,
    ///
    /// receive timeout
    ///
    /// Seconds an accept or read may sit idle before the slot resets. The
    /// timeout is also what lets the loops notice a shutdown request and
    /// poorly disconnected peers.
    ///
    #[serde(default = "Server::recv_timeout")]
    pub recv_timeout: u64,
    ///
    /// bind retry interval
    ///
    /// Seconds between bind attempts while a port is still occupied, for
    /// example right after a crash while the old sockets sit in TIME_WAIT.
    ///
    #[serde(default = "Server::bind_retry")]
    pub bind_retry: u64,
}

impl Server {
    fn bind() -> IpAddr {
        IpAddr::from([0, 0, 0, 0])
    }

    fn port_base() -> u16 {
        codec::PORT_BASE
    }

    fn backlog() -> u32 {
        3
    }

    fn recv_timeout() -> u64 {
        20
    }

    fn bind_retry() -> u64 {
        5
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: Self::bind(),
            port_base: Self::port_base(),
            backlog: Self::backlog(),
            recv_timeout: Self::recv_timeout(),
            bind_retry: Self::bind_retry(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" => Self::Warn,
            "error" => Self::Error,
            _ => return Err(format!("unknown log level: {value}")),
        })
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl LogLevel {
    pub fn as_level(&self) -> log::Level {
        match *self {
            Self::Error => log::Level::Error,
            Self::Debug => log::Level::Debug,
            Self::Trace => log::Level::Trace,
            Self::Warn => log::Level::Warn,
            Self::Info => log::Level::Info,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Log {
    ///
    /// log verbosity
    ///
    /// How chatty the relay is. `info` covers connection lifecycle and
    /// startup; `debug` adds poll answers and per-frame forwarding lines;
    /// `trace` also reports silently discarded frames.
    ///
    #[serde(default)]
    pub level: LogLevel,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub log: Log,
}

#[derive(Parser, Debug)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    ///
    /// Specify the configuration file path
    ///
    /// Example: gss-server --config /etc/gss/config.toml
    ///
    /// The relay normally runs under a supervisor with no arguments, so
    /// the file is optional and defaults are used when it is absent.
    ///
    #[arg(long, short)]
    config: Option<String>,
}

impl Config {
    ///
    /// Build the configuration the relay starts with.
    ///
    /// Parses the command line first; when `--config` names a file, that
    /// file is read as TOML, and when the flag is absent the built-in
    /// defaults apply (the usual case under a supervisor).
    ///
    pub fn load() -> Result<Self> {
        Ok(match Cli::parse().config {
            Some(path) => toml::from_str(&read_to_string(&path)?)?,
            None => Self::default(),
        })
    }
}
