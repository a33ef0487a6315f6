use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use clipq_engine::{ClientSettings, EngineConfig};

/// Watch and drive a clip-extraction queue from the terminal.
#[derive(Parser, Clone, Debug, PartialEq)]
#[command(name = "clipq", author, version)]
pub struct Cli {
    #[arg(long, env = "CLIPQ_API_URL", default_value = "http://localhost:8000")]
    pub api_url: String,

    #[arg(long, env = "CLIPQ_WS_URL", default_value = "ws://localhost:8000/ws/queue")]
    pub ws_url: String,

    #[arg(long, env = "CLIPQ_POLL_INTERVAL_MS", default_value_t = 2000)]
    pub poll_interval_ms: u64,

    #[arg(long, env = "CLIPQ_DOWNLOAD_DIR", default_value = "./downloads")]
    pub download_dir: PathBuf,

    /// Run on polling alone, without the push channel.
    #[arg(long)]
    pub no_push: bool,

    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    #[arg(long, env = "CLIPQ_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Mode>,
}

#[derive(Subcommand, Clone, Debug, PartialEq)]
pub enum Mode {
    /// Show the queue and accept console commands (default).
    Watch,
    /// Submit a video with the given minute offsets, then keep watching.
    Submit {
        file: PathBuf,
        /// Minutes to cut as default clips, e.g. `--default 1,3`.
        #[arg(long = "default", value_delimiter = ',')]
        default_minutes: Vec<u32>,
        /// Minutes to cut as vertical clips.
        #[arg(long = "vertical", value_delimiter = ',')]
        vertical_minutes: Vec<u32>,
    },
}

/// Destination for log output.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to ./clipq.log in the current directory.
    File,
    /// Write to the terminal.
    Terminal,
    Both,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        self.command.clone().unwrap_or(Mode::Watch)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            client: ClientSettings {
                base_url: self.api_url.clone(),
                ..ClientSettings::default()
            },
            push_url: (!self.no_push).then(|| self.ws_url.clone()),
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            download_dir: self.download_dir.clone(),
        }
    }
}
