use std::path::PathBuf;

use clap::Parser;
use tierproxy_common::GlobalConfig;

/// CLI flags that overlay `GlobalConfig::from_env()`. Every flag also reads
/// its matching environment variable directly via clap, so `--host` and
/// `PROXY_HOST` behave identically; an explicit flag wins over either.
#[derive(Parser, Debug)]
#[command(name = "tierproxy", about = "Tiered reverse proxy for the Anthropic Messages API")]
pub struct Cli {
    #[arg(long, env = "PROXY_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "PROXY_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "TIERPROXY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, env = "CLAUDE_PROXY_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Passed straight through to `tracing_subscriber::EnvFilter`.
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn apply(&self, global: &mut GlobalConfig) {
        if let Some(host) = &self.host {
            global.host = host.clone();
        }
        if let Some(port) = self.port {
            global.port = port;
        }
        if let Some(data_dir) = &self.data_dir {
            global.data_dir = data_dir.clone();
        }
        if let Some(log_file) = &self.log_file {
            global.log_file = Some(log_file.clone());
        }
    }
}
