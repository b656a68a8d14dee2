//! Command-line configuration.
//!
//! # Usage
//!
//! ```bash
//! # Local server, join a room straight away
//! pipechat --user alice --room lobby
//!
//! # Remote server with a separate upload host
//! pipechat --user alice --server wss://chat.example.com/chat \
//!     --upload-url https://files.example.com/api/files/upload
//! ```

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use url::Url;

/// WebSocket endpoint used when `--server` is not given.
pub const DEFAULT_SERVER: &str = "ws://localhost:8081/chat";

/// The upload service listens on its own port on the chat host.
const UPLOAD_PORT: u16 = 8080;
const UPLOAD_PATH: &str = "/api/files/upload";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--server` is not a URL.
    #[error("invalid server url {url}: {source}")]
    InvalidServer {
        /// URL as given.
        url: String,
        /// Parse failure.
        #[source]
        source: url::ParseError,
    },

    /// `--server` is not a WebSocket URL.
    #[error("server url {0} must use ws:// or wss://")]
    UnsupportedScheme(String),
}

/// Pipechat terminal client
#[derive(Parser, Debug, Clone)]
#[command(name = "pipechat")]
#[command(about = "Terminal client for Pipechat rooms and private messages")]
#[command(version)]
pub struct Args {
    /// WebSocket URL of the chat server
    #[arg(short, long, default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Upload endpoint (defaults to port 8080 on the chat host)
    #[arg(long)]
    pub upload_url: Option<String>,

    /// Username to chat as
    #[arg(short, long)]
    pub user: String,

    /// Room to join once connected
    #[arg(short, long)]
    pub room: Option<String>,

    /// Never show notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// File that receives log output
    #[arg(long, default_value = "pipechat.log")]
    pub log_file: PathBuf,
}

impl Args {
    /// Upload endpoint: `--upload-url` if given, else derived from
    /// `--server`.
    pub fn upload_endpoint(&self) -> Result<String, ConfigError> {
        match &self.upload_url {
            Some(url) => Ok(url.clone()),
            None => derive_upload_url(&self.server),
        }
    }
}

/// Upload endpoint on the same host as the chat server.
///
/// `ws` maps to `http` and `wss` to `https`; the port is always
/// [`UPLOAD_PORT`].
pub fn derive_upload_url(server: &str) -> Result<String, ConfigError> {
    let unsupported = || ConfigError::UnsupportedScheme(server.to_string());

    let mut url = Url::parse(server)
        .map_err(|source| ConfigError::InvalidServer { url: server.to_string(), source })?;
    let scheme = match url.scheme() {
        "ws" => "http",
        "wss" => "https",
        _ => return Err(unsupported()),
    };

    url.set_scheme(scheme).map_err(|()| unsupported())?;
    url.set_port(Some(UPLOAD_PORT)).map_err(|()| unsupported())?;
    url.set_path(UPLOAD_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}
