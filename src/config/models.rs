use eyre::Result;
use serde::{Deserialize, Serialize};

#[cfg(not(test))]
use super::CONFIG;

use super::defaults::*;

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Configuration {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub completion: CompletionConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub crisis: CrisisConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct GeneralConfig {
    /// Print startup progress to stderr
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "bind_address")]
    pub bind_address: String,

    /// Empty means any origin is allowed
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogConfig {
    #[serde(default = "log_level")]
    pub level: Option<String>,

    #[serde(default)]
    pub filters: Option<Vec<LogFilter>>,

    /// Logs go to stderr when unset
    #[serde(default)]
    pub file: Option<LogFile>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogFilter {
    #[serde(default)]
    pub module: Option<String>,

    #[serde(default)]
    pub level: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct LogFile {
    #[serde(default = "log_file_path")]
    pub path: String,

    #[serde(default)]
    pub append: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum StorageConfig {
    #[serde(rename = "sqlite")]
    Sqlite(SqliteStorage),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SqliteStorage {
    /// In-memory database when unset
    pub path: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CompletionConfig {
    #[serde(default = "completion_endpoint")]
    pub endpoint: String,

    /// Supports `$VAR` / `${VAR}` expansion
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "completion_model")]
    pub model: String,

    #[serde(default)]
    pub timeout_secs: Option<u16>,

    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct IdentityConfig {
    #[serde(default = "identity_endpoint")]
    pub endpoint: String,

    /// Project key sent as the `apikey` header. Supports `$VAR` expansion.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u16>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct CrisisConfig {
    /// Ordered trigger list. The built-in list is used when empty.
    #[serde(default)]
    pub patterns: Vec<CrisisPatternConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CrisisPatternConfig {
    pub intent: String,
    pub pattern: String,
}

impl Configuration {
    #[cfg(not(test))]
    pub fn instance() -> &'static Configuration {
        CONFIG.get_or_init(Configuration::default)
    }

    #[cfg(not(test))]
    pub fn init(config: Configuration) -> Result<()> {
        CONFIG
            .set(config)
            .map_err(|_| eyre::eyre!("Config already initialized"))?;
        Ok(())
    }

    #[cfg(test)]
    pub fn instance() -> &'static Configuration {
        use super::TEST_CONFIG;
        TEST_CONFIG.with(|config| *config.borrow())
    }

    #[cfg(test)]
    pub fn init(config: Configuration) -> Result<()> {
        use super::TEST_CONFIG;
        TEST_CONFIG.with(|test_config| {
            *test_config.borrow_mut() = Box::leak(Box::new(config));
        });
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: bind_address(),
            cors_allowed_origins: vec![],
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: log_level(),
            filters: None,
            file: None,
        }
    }
}

impl Default for LogFile {
    fn default() -> Self {
        Self {
            path: log_file_path(),
            append: false,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Sqlite(SqliteStorage::default())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: completion_endpoint(),
            api_key: None,
            model: completion_model(),
            timeout_secs: None,
            system_prompt: None,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: identity_endpoint(),
            api_key: None,
            timeout_secs: None,
        }
    }
}
