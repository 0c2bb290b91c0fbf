// File: amabot-server/src/main.rs

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use amabot_core::config::{BotConfig, ConfigOverrides, HistoryBackend};

mod context;
mod server;

#[derive(Parser, Debug, Clone)]
#[command(name = "amabot")]
#[command(author, version, about = "amabot - relays Discord channels to an OpenAI chat model")]
pub struct Args {
    /// Path of the configuration file for this tool
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Value of Discord API token
    #[arg(short = 't', long, env = "AMABOT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Value of OpenAI API token
    #[arg(long, env = "AMABOT_OPENAI_TOKEN", hide_env_values = true)]
    openai_token: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "AMABOT_OPENAI_API_BASE")]
    openai_api_base: Option<String>,

    /// ChannelID to listen
    #[arg(long, env = "AMABOT_OPENAI_CHANNELS", value_delimiter = ',')]
    openai_channels: Vec<String>,

    /// System message processed by ChatGPT
    #[arg(long, env = "AMABOT_OPENAI_SYSTEMS")]
    openai_systems: Vec<String>,

    /// Chat model identifier
    #[arg(long, env = "AMABOT_MODEL")]
    model: Option<String>,

    /// Where history comes from: platform, sqlite or memory
    #[arg(long, env = "AMABOT_HISTORY", value_parser = parse_backend)]
    history: Option<HistoryBackend>,

    /// SQLite database path (sqlite history only)
    #[arg(long, env = "AMABOT_DATABASE")]
    database: Option<String>,

    /// History window: prior messages (platform) or rows kept per channel (sqlite, memory)
    #[arg(long, env = "AMABOT_WINDOW_SIZE")]
    window_size: Option<usize>,

    /// Seconds before a completion call is abandoned
    #[arg(long, env = "AMABOT_COMPLETION_TIMEOUT_SECS")]
    completion_timeout_secs: Option<u64>,

    /// Ignore history older than this many seconds
    #[arg(long, env = "AMABOT_MAX_MESSAGE_AGE_SECS")]
    max_message_age_secs: Option<u64>,
}

fn parse_backend(raw: &str) -> Result<HistoryBackend, String> {
    raw.parse::<HistoryBackend>().map_err(|e| e.to_string())
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            token: self.token.clone(),
            openai_token: self.openai_token.clone(),
            openai_api_base: self.openai_api_base.clone(),
            openai_channels: self.openai_channels.clone(),
            openai_systems: self.openai_systems.clone(),
            model: self.model.clone(),
            history: self.history,
            database: self.database.clone(),
            window_size: self.window_size,
            completion_timeout_secs: self.completion_timeout_secs,
            max_message_age_secs: self.max_message_age_secs,
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_log::LogTracer::init()?;
    let filter = EnvFilter::from_default_env()
        .add_directive("amabot=info".parse()?);
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing()?;
    let args = Args::parse();

    let config = BotConfig::load(args.config_path.as_deref(), args.overrides())?;
    info!(
        "amabot starting. history={}, window={}, channels={}, model={}",
        config.history.backend,
        config.relay.window_size,
        config.relay.allowed_channels.len(),
        config.completion.model
    );
    if config.relay.allowed_channels.is_empty() {
        warn!("No channels configured (openai-channels); every message will be ignored");
    }

    if let Err(e) = server::run_server(config).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
