//! TOML-based configuration for olapxml.
//!
//! Supports a config file (olapxml.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [server]
//! url = "http://localhost:8080/mondrian/xmla"
//! user = "${XMLA_USER}"
//! password = "${XMLA_PASSWORD}"
//! timeout_seconds = 60
//!
//! [session]
//! catalog = "FoodMart"
//! data_source_info = "Provider=Mondrian;DataSource=MondrianFoodMart;"
//! cookies = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid connect string: {0}")]
    InvalidConnectString(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// XML/A endpoint.
    pub server: ServerSettings,

    /// Per-connection session properties.
    pub session: SessionSettings,
}

/// XML/A endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Endpoint URL (supports ${ENV_VAR} expansion).
    pub url: String,

    /// Basic-auth user name.
    pub user: Option<String>,

    /// Basic-auth password.
    pub password: Option<String>,

    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/xmla".to_string(),
            user: None,
            password: None,
            timeout_seconds: 30,
        }
    }
}

/// Session properties sent with every request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Catalog sent as the `Catalog` property.
    pub catalog: Option<String>,

    /// Value of the `DataSourceInfo` property.
    pub data_source_info: Option<String>,

    /// Keep HTTP cookies between requests.
    pub cookies: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            catalog: None,
            data_source_info: None,
            cookies: true,
        }
    }
}

impl ServerSettings {
    /// Get the endpoint URL with environment variables expanded.
    pub fn resolved_url(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.url)
    }

    /// Get the user name with environment variables expanded.
    pub fn resolved_user(&self) -> Result<Option<String>, SettingsError> {
        self.user.as_deref().map(expand_env_vars).transpose()
    }

    /// Get the password with environment variables expanded.
    pub fn resolved_password(&self) -> Result<Option<String>, SettingsError> {
        self.password.as_deref().map(expand_env_vars).transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `OLAPXML_CONFIG`
    /// 2. `./olapxml.toml`
    /// 3. `~/.config/olapxml/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("OLAPXML_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("olapxml.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("olapxml").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Settings pointing at `url` with everything else defaulted.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            server: ServerSettings {
                url: url.into(),
                ..ServerSettings::default()
            },
            session: SessionSettings::default(),
        }
    }

    /// Set the session catalog.
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.session.catalog = Some(catalog.into());
        self
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        if chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
            let value =
                env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
            result.push_str(&value);
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            let mut var_name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    var_name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if var_name.is_empty() {
                result.push('$');
            } else {
                let value = env::var(&var_name)
                    .map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}
