// File: amabot-core/src/config.rs
//
// Startup configuration. Values come from (highest precedence first) CLI
// flags / AMABOT_* environment variables, a YAML file, then defaults. The
// result is an immutable BotConfig handed to constructors; nothing reads
// configuration after startup.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::Error;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_DATABASE_PATH: &str = "amabot.db";
pub const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 60;

/// Prior messages fetched from the platform per turn, trigger not included.
pub const PLATFORM_WINDOW_SIZE: usize = 6;
/// Stored rows kept per channel, trigger included.
pub const STORED_WINDOW_SIZE: usize = 5;

/// File names searched for when no explicit config path is given.
const CONFIG_FILE_NAMES: [&str; 2] = ["amabot.yaml", "amabot.yml"];

/// Where conversation history comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    /// Read recent messages back from the chat platform on every turn.
    #[default]
    Platform,
    /// Persist messages in SQLite and prune per channel.
    Sqlite,
    /// Keep messages in process memory.
    Memory,
}

impl HistoryBackend {
    pub fn default_window_size(&self) -> usize {
        match self {
            HistoryBackend::Platform => PLATFORM_WINDOW_SIZE,
            HistoryBackend::Sqlite | HistoryBackend::Memory => STORED_WINDOW_SIZE,
        }
    }
}

impl FromStr for HistoryBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "platform" => Ok(HistoryBackend::Platform),
            "sqlite" => Ok(HistoryBackend::Sqlite),
            "memory" => Ok(HistoryBackend::Memory),
            other => Err(Error::Config(format!(
                "unknown history backend '{other}' (expected platform, sqlite or memory)"
            ))),
        }
    }
}

impl fmt::Display for HistoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryBackend::Platform => "platform",
            HistoryBackend::Sqlite => "sqlite",
            HistoryBackend::Memory => "memory",
        };
        f.write_str(s)
    }
}

/// Channels the bot may act in. Read-only after startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelAllowList {
    channels: HashSet<String>,
}

impl ChannelAllowList {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: channels
                .into_iter()
                .map(Into::into)
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Settings the relay needs on every turn.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub allowed_channels: ChannelAllowList,
    /// Prepended to every prompt as system entries, in this order.
    pub system_instructions: Vec<String>,
    /// Platform history: prior messages read before the trigger.
    /// Stored history: rows kept per channel, the trigger among them.
    pub window_size: usize,
    /// Drop window messages older than this, measured from now. `None` keeps everything.
    pub max_message_age: Option<chrono::Duration>,
}

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub backend: HistoryBackend,
    pub database_path: String,
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub api_base: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

/// The fully resolved, immutable configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub completion: CompletionConfig,
    pub history: HistoryConfig,
    pub relay: RelayConfig,
}

/// Shape of the YAML config file. Keys match the CLI flag names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FileConfig {
    pub token: Option<String>,
    pub openai_token: Option<String>,
    pub openai_api_base: Option<String>,
    pub openai_channels: Vec<String>,
    pub openai_systems: Vec<String>,
    pub model: Option<String>,
    pub history: Option<HistoryBackend>,
    pub database: Option<String>,
    pub window_size: Option<usize>,
    pub completion_timeout_secs: Option<u64>,
    pub max_message_age_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

/// Values given on the command line or through the environment.
/// Anything set here wins over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub token: Option<String>,
    pub openai_token: Option<String>,
    pub openai_api_base: Option<String>,
    pub openai_channels: Vec<String>,
    pub openai_systems: Vec<String>,
    pub model: Option<String>,
    pub history: Option<HistoryBackend>,
    pub database: Option<String>,
    pub window_size: Option<usize>,
    pub completion_timeout_secs: Option<u64>,
    pub max_message_age_secs: Option<u64>,
}

/// Find the config file to read.
///
/// An explicit path must exist. Otherwise `amabot.yaml` is looked up in the
/// working directory and then the home directory; finding none is fine.
pub fn discover_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, Error> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let mut dirs_to_search = vec![PathBuf::from(".")];
    if let Some(home) = dirs::home_dir() {
        dirs_to_search.push(home);
    }

    Ok(find_config_in(&dirs_to_search))
}

fn find_config_in(dirs_to_search: &[PathBuf]) -> Option<PathBuf> {
    dirs_to_search
        .iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn prefer<T>(over: Vec<T>, file: Vec<T>) -> Vec<T> {
    if over.is_empty() { file } else { over }
}

impl BotConfig {
    /// Merge overrides on top of the file and validate the result.
    pub fn resolve(file: FileConfig, over: ConfigOverrides) -> Result<Self, Error> {
        let discord_token = non_empty(over.token)
            .or_else(|| non_empty(file.token))
            .ok_or_else(|| Error::Config("Discord token is not set (--token / AMABOT_TOKEN)".into()))?;

        let api_key = non_empty(over.openai_token)
            .or_else(|| non_empty(file.openai_token))
            .ok_or_else(|| {
                Error::Config("OpenAI token is not set (--openai-token / AMABOT_OPENAI_TOKEN)".into())
            })?;

        let backend = over.history.or(file.history).unwrap_or_default();

        let window_size = over
            .window_size
            .or(file.window_size)
            .unwrap_or_else(|| backend.default_window_size());
        if window_size == 0 {
            return Err(Error::Config("window size must be at least 1".into()));
        }

        let timeout_secs = over
            .completion_timeout_secs
            .or(file.completion_timeout_secs)
            .unwrap_or(DEFAULT_COMPLETION_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(Error::Config("completion timeout must be at least 1 second".into()));
        }

        let max_message_age = match over
            .max_message_age_secs
            .or(file.max_message_age_secs)
            .filter(|secs| *secs > 0)
        {
            None => None,
            Some(secs) => Some(
                i64::try_from(secs)
                    .ok()
                    .and_then(chrono::Duration::try_seconds)
                    .ok_or_else(|| {
                        Error::Config(format!("max message age of {secs} seconds is out of range"))
                    })?,
            ),
        };

        let allowed_channels = ChannelAllowList::new(prefer(over.openai_channels, file.openai_channels));

        Ok(Self {
            discord_token,
            completion: CompletionConfig {
                api_key,
                api_base: non_empty(over.openai_api_base).or_else(|| non_empty(file.openai_api_base)),
                model: non_empty(over.model)
                    .or_else(|| non_empty(file.model))
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            history: HistoryConfig {
                backend,
                database_path: non_empty(over.database)
                    .or_else(|| non_empty(file.database))
                    .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            },
            relay: RelayConfig {
                allowed_channels,
                system_instructions: prefer(over.openai_systems, file.openai_systems),
                window_size,
                max_message_age,
            },
        })
    }

    /// Discover and read the config file, then merge `over` on top of it.
    pub fn load(explicit: Option<&Path>, over: ConfigOverrides) -> Result<Self, Error> {
        let file = match discover_config_file(explicit)? {
            Some(path) => {
                info!("Using config file: {}", path.display());
                FileConfig::load(&path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(file, over)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> ConfigOverrides {
        ConfigOverrides {
            token: Some("discord".into()),
            openai_token: Some("sk".into()),
            ..Default::default()
        }
    }

    #[test]
    fn yaml_keys_match_flag_names() -> Result<(), Error> {
        let file = FileConfig::from_yaml_str(
            r#"
token: from-file
openai-token: sk-file
openai-channels: ["C1", "C2"]
openai-systems:
  - You are helpful.
  - Answer briefly.
history: sqlite
database: data/history.db
"#,
        )?;
        let config = BotConfig::resolve(file, ConfigOverrides::default())?;

        assert_eq!(config.discord_token, "from-file");
        assert_eq!(config.completion.api_key, "sk-file");
        assert!(config.relay.allowed_channels.contains("C2"));
        assert_eq!(config.relay.system_instructions, vec!["You are helpful.", "Answer briefly."]);
        assert_eq!(config.history.backend, HistoryBackend::Sqlite);
        assert_eq!(config.history.database_path, "data/history.db");
        assert_eq!(config.relay.window_size, STORED_WINDOW_SIZE);
        Ok(())
    }

    #[test]
    fn overrides_win_over_file() -> Result<(), Error> {
        let file = FileConfig {
            token: Some("file".into()),
            openai_channels: vec!["C1".into()],
            model: Some("gpt-4".into()),
            ..Default::default()
        };
        let over = ConfigOverrides {
            openai_channels: vec!["C9".into()],
            ..tokens()
        };
        let config = BotConfig::resolve(file, over)?;

        assert_eq!(config.discord_token, "discord");
        assert!(config.relay.allowed_channels.contains("C9"));
        assert!(!config.relay.allowed_channels.contains("C1"));
        assert_eq!(config.completion.model, "gpt-4");
        Ok(())
    }

    #[test]
    fn defaults_follow_backend() -> Result<(), Error> {
        let config = BotConfig::resolve(FileConfig::default(), tokens())?;
        assert_eq!(config.history.backend, HistoryBackend::Platform);
        assert_eq!(config.relay.window_size, PLATFORM_WINDOW_SIZE);
        assert_eq!(config.completion.model, DEFAULT_MODEL);
        assert_eq!(config.completion.timeout, Duration::from_secs(DEFAULT_COMPLETION_TIMEOUT_SECS));
        assert!(config.relay.max_message_age.is_none());
        assert!(config.relay.allowed_channels.is_empty());
        Ok(())
    }

    #[test]
    fn missing_tokens_are_fatal() {
        let err = BotConfig::resolve(FileConfig::default(), ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let blank = ConfigOverrides {
            token: Some("discord".into()),
            openai_token: Some("   ".into()),
            ..Default::default()
        };
        assert!(BotConfig::resolve(FileConfig::default(), blank).is_err());
    }

    #[test]
    fn zero_window_is_rejected() {
        let over = ConfigOverrides { window_size: Some(0), ..tokens() };
        assert!(BotConfig::resolve(FileConfig::default(), over).is_err());
    }

    #[test]
    fn max_message_age_out_of_range_is_rejected() {
        let over = ConfigOverrides { max_message_age_secs: Some(u64::MAX), ..tokens() };
        let err = BotConfig::resolve(FileConfig::default(), over).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let over = ConfigOverrides { max_message_age_secs: Some(3600), ..tokens() };
        let config = BotConfig::resolve(FileConfig::default(), over).unwrap();
        assert_eq!(config.relay.max_message_age, Some(chrono::Duration::hours(1)));

        let over = ConfigOverrides { max_message_age_secs: Some(0), ..tokens() };
        let config = BotConfig::resolve(FileConfig::default(), over).unwrap();
        assert!(config.relay.max_message_age.is_none());
    }

    #[test]
    fn allow_list_ignores_blank_entries() {
        let list = ChannelAllowList::new(vec![" C1 ", "", "C2"]);
        assert_eq!(list.len(), 2);
        assert!(list.contains("C1"));
    }

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("SQLite".parse::<HistoryBackend>().unwrap(), HistoryBackend::Sqlite);
        assert!("redis".parse::<HistoryBackend>().is_err());
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let err = discover_config_file(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn search_prefers_earlier_directories() -> Result<(), Error> {
        let first = tempfile::tempdir()?;
        let second = tempfile::tempdir()?;
        std::fs::write(second.path().join("amabot.yaml"), "token: x")?;

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(find_config_in(&dirs), Some(second.path().join("amabot.yaml")));

        std::fs::write(first.path().join("amabot.yml"), "token: y")?;
        assert_eq!(find_config_in(&dirs), Some(first.path().join("amabot.yml")));
        Ok(())
    }
}
