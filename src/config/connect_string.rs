//! Driver connect strings.
//!
//! An XML/A connect string looks like:
//!
//! ```text
//! jdbc:xmla:Server=http://localhost:8080/mondrian/xmla;Catalog=FoodMart;Cookies=true
//! ```
//!
//! Keys are case-insensitive. A value containing `;` can be quoted with `'` or
//! `"`; a doubled quote inside a quoted value stands for one quote character.

use indexmap::IndexMap;

use super::settings::{ServerSettings, SessionSettings, Settings, SettingsError};

/// Prefix every XML/A connect string starts with.
pub const CONNECT_STRING_PREFIX: &str = "jdbc:xmla:";

/// Known connect-string properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Server,
    Catalog,
    DataSource,
    User,
    Password,
    Cookies,
    Timeout,
}

impl Property {
    /// Parse a property name (case-insensitive).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "server" => Some(Property::Server),
            "catalog" => Some(Property::Catalog),
            "datasource" | "datasourceinfo" => Some(Property::DataSource),
            "user" => Some(Property::User),
            "password" => Some(Property::Password),
            "cookies" => Some(Property::Cookies),
            "timeout" => Some(Property::Timeout),
            _ => None,
        }
    }

    /// Canonical key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Server => "Server",
            Property::Catalog => "Catalog",
            Property::DataSource => "DataSource",
            Property::User => "User",
            Property::Password => "Password",
            Property::Cookies => "Cookies",
            Property::Timeout => "Timeout",
        }
    }
}

/// A parsed connect string.
///
/// Properties keep the order they were written in; unknown keys are kept so
/// they can be forwarded to the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectString {
    properties: IndexMap<String, String>,
}

impl ConnectString {
    /// Parse a connect string. The `jdbc:xmla:` prefix is required.
    pub fn parse(s: &str) -> Result<Self, SettingsError> {
        let body = s.strip_prefix(CONNECT_STRING_PREFIX).ok_or_else(|| {
            SettingsError::InvalidConnectString(format!(
                "expected prefix '{CONNECT_STRING_PREFIX}'"
            ))
        })?;

        let mut properties = IndexMap::new();
        let mut chars = body.chars().peekable();

        loop {
            // Key runs up to '='.
            let mut key = String::new();
            for ch in chars.by_ref() {
                if ch == '=' {
                    break;
                }
                key.push(ch);
            }
            let key = key.trim().to_string();

            let mut value = String::new();
            match chars.peek().copied() {
                Some(quote @ ('\'' | '"')) => {
                    chars.next();
                    loop {
                        match chars.next() {
                            Some(ch) if ch == quote => {
                                if chars.peek() == Some(&quote) {
                                    chars.next();
                                    value.push(quote);
                                } else {
                                    break;
                                }
                            }
                            Some(ch) => value.push(ch),
                            None => {
                                return Err(SettingsError::InvalidConnectString(format!(
                                    "unterminated quote in value of '{key}'"
                                )))
                            }
                        }
                    }
                    // Skip anything up to the next separator.
                    for ch in chars.by_ref() {
                        if ch == ';' {
                            break;
                        }
                    }
                }
                _ => {
                    for ch in chars.by_ref() {
                        if ch == ';' {
                            break;
                        }
                        value.push(ch);
                    }
                    value = value.trim().to_string();
                }
            }

            if !key.is_empty() {
                let key = Property::from_key(&key)
                    .map(|p| p.as_str().to_string())
                    .unwrap_or(key);
                properties.insert(key, value);
            }

            if chars.peek().is_none() {
                break;
            }
        }

        Ok(Self { properties })
    }

    /// Get a known property.
    pub fn get(&self, property: Property) -> Option<&str> {
        self.properties.get(property.as_str()).map(String::as_str)
    }

    /// Get any property by its raw key (case-sensitive for unknown keys).
    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Iterate properties in the order they were written.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert into driver settings. `Server` is required.
    pub fn to_settings(&self) -> Result<Settings, SettingsError> {
        let url = self
            .get(Property::Server)
            .ok_or_else(|| SettingsError::InvalidConnectString("missing 'Server'".to_string()))?;

        let mut server = ServerSettings {
            url: url.to_string(),
            user: self.get(Property::User).map(str::to_string),
            password: self.get(Property::Password).map(str::to_string),
            ..ServerSettings::default()
        };
        if let Some(timeout) = self.get(Property::Timeout) {
            server.timeout_seconds = timeout.parse().map_err(|_| {
                SettingsError::InvalidConfig(format!("Timeout must be whole seconds: {timeout}"))
            })?;
        }

        let mut session = SessionSettings {
            catalog: self.get(Property::Catalog).map(str::to_string),
            data_source_info: self.get(Property::DataSource).map(str::to_string),
            ..SessionSettings::default()
        };
        if let Some(cookies) = self.get(Property::Cookies) {
            session.cookies = !cookies.eq_ignore_ascii_case("false");
        }

        Ok(Settings { server, session })
    }
}
