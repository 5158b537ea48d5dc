use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SqlMiddlewareDbError;

pub const DEFAULT_URL: &str = "http://localhost:8123";

/// Options for reaching a ClickHouse server over HTTP.
///
/// Deserializable so it can sit in an application's own config file; missing fields take
/// their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseOptions {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    /// Server settings sent with every request; per-request settings take precedence.
    pub settings: BTreeMap<String, String>,
    pub request_timeout: Option<Duration>,
}

impl Default for ClickhouseOptions {
    fn default() -> Self {
        Self::new(DEFAULT_URL.to_string())
    }
}

impl ClickhouseOptions {
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            url,
            username: None,
            password: None,
            database: None,
            settings: BTreeMap::new(),
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn builder(url: impl Into<String>) -> ClickhouseOptionsBuilder {
        ClickhouseOptionsBuilder::new(url.into())
    }

    #[must_use]
    pub fn with_credentials(mut self, username: String, password: String) -> Self {
        self.username = Some(username);
        self.password = Some(password);
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Check that the options describe a reachable endpoint.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` if the URL is empty or not http(s), or if a
    /// password is given without a username.
    pub fn validate(&self) -> Result<(), SqlMiddlewareDbError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(SqlMiddlewareDbError::ConfigError(
                "url is required".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SqlMiddlewareDbError::ConfigError(format!(
                "url must use http or https: {url}"
            )));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(SqlMiddlewareDbError::ConfigError(
                "password given without a username".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for ClickHouse options.
#[derive(Debug, Clone)]
pub struct ClickhouseOptionsBuilder {
    opts: ClickhouseOptions,
}

impl ClickhouseOptionsBuilder {
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            opts: ClickhouseOptions::new(url),
        }
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.opts.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.opts.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.settings.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.opts.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn finish(self) -> ClickhouseOptions {
        self.opts
    }
}
