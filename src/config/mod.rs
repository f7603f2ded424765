//! Configuration module for olapxml.
//!
//! Handles the TOML settings file, environment variables and driver connect strings.

mod connect_string;
mod settings;

pub use connect_string::{ConnectString, Property, CONNECT_STRING_PREFIX};
pub use settings::{expand_env_vars, ServerSettings, SessionSettings, Settings, SettingsError};
