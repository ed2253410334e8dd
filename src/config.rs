use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::Parser;
use std::fs;
use thiserror::Error;
use tracing::{info, warn};

/// Sessions never outlive ten years, whatever the configuration says
pub const MAX_SESSION_TTL_MINUTES: u64 = 60 * 24 * 365 * 10;

/// Configuration for the remindr server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server listens on
    pub bind_address: String,
    /// Public base URL used to build resource links; derived from the `Host`
    /// header when unset
    pub base_url: Option<String>,
    /// How long a login session stays valid, in minutes
    pub session_ttl_minutes: u64,
    /// Directory for rolling log files; logs go to stdout only when unset
    pub log_dir: Option<String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub session_ttl_minutes: Option<u64>,
    #[serde(default)]
    pub log_dir: Option<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "remindr", about = "Administrative REST backend for reminders")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:3000
    #[clap(long, env = "REMINDR_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Public base URL used in resource links
    #[clap(long, env = "REMINDR_BASE_URL")]
    pub base_url: Option<String>,

    /// Session lifetime in minutes
    #[clap(long, env = "REMINDR_SESSION_TTL_MINUTES")]
    pub session_ttl_minutes: Option<u64>,

    /// Directory for rolling log files
    #[clap(long, env = "REMINDR_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Debug mode
    #[clap(long, env = "REMINDR_DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Emit logs as JSON
    #[clap(long, env = "REMINDR_JSON_LOGS", default_value_t = false)]
    pub json_logs: bool,

    /// Insert default categories and timeframes (and the admin account, when
    /// credentials are given) before serving
    #[clap(long, default_value_t = false)]
    pub seed: bool,

    /// Username of the admin account created by --seed
    #[clap(long, env = "REMINDR_ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    /// Password of the admin account created by --seed
    #[clap(long, env = "REMINDR_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            base_url: update.base_url.or(self.base_url),
            session_ttl_minutes: update.session_ttl_minutes.unwrap_or(self.session_ttl_minutes),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }

    /// Returns the session lifetime, capped at [`MAX_SESSION_TTL_MINUTES`]
    pub fn session_ttl(&self) -> chrono::Duration {
        let minutes = self.session_ttl_minutes.min(MAX_SESSION_TTL_MINUTES);
        chrono::Duration::minutes(minutes as i64)
    }
}

/// Returns the base (default) configuration
///
/// With a config directory, the database file lives inside it; otherwise it
/// is created in the working directory.
pub fn base_config(config_dir: Option<&Path>) -> Config {
    let database_url = config_dir.map_or("remindr.db".to_string(), |path| {
        path.join("remindr.db").to_string_lossy().to_string()
    });

    Config {
        database_url,
        bind_address: "127.0.0.1:3000".to_string(),
        base_url: None,
        session_ttl_minutes: 60 * 24,
        log_dir: None,
    }
}

/// Returns the platform config directory for remindr, if one can be determined
pub fn get_config_dir_path() -> Option<PathBuf> {
    match ProjectDirs::from("com", "remindr", "remindr") {
        Some(proj_dirs) => Some(proj_dirs.config_dir().to_path_buf()),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            None
        }
    }
}

/// Loads configuration from a TOML file
///
/// A missing file is not an error; it yields an empty update.
pub fn config_from_file(config_path: Option<&Path>) -> Result<ConfigUpdate, ConfigError> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;

    let update = toml::from_str::<ConfigUpdate>(&content).map_err(|source| ConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })?;

    info!("Loaded configuration from {:?}", config_path);
    Ok(update)
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: &CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url.clone(),
        bind_address: args.bind_address.clone(),
        base_url: args.base_url.clone(),
        session_ttl_minutes: args.session_ttl_minutes,
        log_dir: args.log_dir.clone(),
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
///
/// An unreadable or malformed config file is logged and skipped.
pub fn get_config(args: &CliArgs) -> Config {
    let config_dir = get_config_dir_path().and_then(|path| {
        if !path.exists() {
            info!("Config path not found at {:?}, using defaults", path);
            None
        } else {
            Some(path)
        }
    });

    let config_file = config_dir.as_ref().map(|dir| dir.join("config.toml"));
    let file_update = config_from_file(config_file.as_deref()).unwrap_or_else(|e| {
        warn!("{}", e);
        ConfigUpdate::default()
    });

    let config = base_config(config_dir.as_deref())
        .apply_update(file_update)
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: database_url={}, bind_address={}, base_url={:?}, session_ttl={}min",
        config.database_url, config.bind_address, config.base_url, config.session_ttl_minutes
    );

    config
}
