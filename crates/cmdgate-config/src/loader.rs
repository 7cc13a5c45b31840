//! Configuration loading from TOML or YAML files with environment overrides.

use crate::schema::Config;
use cmdgate_common::{CmdGateError, GuildId, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding `discord.token`.
pub const ENV_DISCORD_TOKEN: &str = "DISCORD_TOKEN";

/// Environment variable overriding `discord.dev_guild_id`.
pub const ENV_DEV_GUILD_ID: &str = "CMDGATE_DEV_GUILD_ID";

/// Configuration file formats understood by [`ConfigLoader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`).
    Toml,
    /// YAML (`.yaml` / `.yml`).
    Yaml,
}

impl ConfigFormat {
    /// Picks a format from a file extension. Unknown extensions fall back to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Toml,
        }
    }

    /// Parses `contents` in this format.
    pub fn parse(self, contents: &str) -> Result<Config> {
        match self {
            Self::Toml => toml::from_str(contents)
                .map_err(|e| CmdGateError::Serialization(format!("invalid TOML: {e}"))),
            Self::Yaml => serde_yaml::from_str(contents)
                .map_err(|e| CmdGateError::Serialization(format!("invalid YAML: {e}"))),
        }
    }
}

/// Configuration loader.
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path this loader reads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads configuration from file and applies environment overrides.
    pub async fn load(&self) -> Result<Config> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let mut config = ConfigFormat::from_path(&self.path).parse(&contents)?;
        debug!(path = %self.path.display(), "Loaded configuration file");

        apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Loads configuration from file, falling back to defaults plus
    /// environment overrides when the file does not exist.
    pub async fn load_or_default(&self) -> Result<Config> {
        match self.load().await {
            Err(CmdGateError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    path = %self.path.display(),
                    "Configuration file not found, using defaults"
                );
                let mut config = Config::default();
                apply_overrides(&mut config, |key| std::env::var(key).ok())?;
                Ok(config)
            }
            other => other,
        }
    }
}

/// Applies environment overrides to `config`, reading variables through `lookup`.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(ENV_DISCORD_TOKEN).filter(|t| !t.is_empty()) {
        config.discord.token = token;
    }

    if let Some(raw) = lookup(ENV_DEV_GUILD_ID) {
        let raw = raw.trim();
        if raw.is_empty() {
            config.discord.dev_guild_id = None;
        } else {
            let id = raw.parse::<u64>().map_err(|e| {
                warn!(value = raw, "Ignoring malformed development guild id");
                CmdGateError::Config(format!("{ENV_DEV_GUILD_ID} is not a valid id: {e}"))
            })?;
            config.discord.dev_guild_id = Some(GuildId(id));
        }
    }

    Ok(())
}
