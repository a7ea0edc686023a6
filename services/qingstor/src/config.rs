// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Formatter};

use log::debug;
use qingstor_core::{utils::Redact, Context, Error, Result};
use serde::Deserialize;

use crate::constants::*;

/// Config carries all the configuration for QingStor services.
///
/// Fields set explicitly win over env values, which win over the YAML config
/// file:
///
/// ```no_run
/// use qingstor_core::{Context, OsEnv};
/// use qingstor_file_read_tokio::TokioFileRead;
/// use qingstor_sdk::Config;
///
/// # async fn example() -> qingstor_core::Result<()> {
/// let ctx = Context::new().with_file_read(TokioFileRead).with_env(OsEnv);
/// let config = Config::new()
///     .with_connection_retries(5)
///     .from_env(&ctx)
///     .from_default_file(&ctx)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`QINGSTOR_ACCESS_KEY_ID`]
    /// - the config file
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`QINGSTOR_SECRET_ACCESS_KEY`]
    /// - the config file
    pub secret_access_key: Option<String>,
    /// Service host, `qingstor.com` by default.
    pub host: Option<String>,
    /// Service port, `443` by default.
    pub port: Option<u16>,
    /// Service protocol, `https` by default.
    pub protocol: Option<String>,
    /// Full endpoint like `https://qingstor.com:443`, overrides host, port and protocol.
    pub endpoint: Option<String>,
    /// How many times a request is retried on transport failures, `3` by default.
    pub connection_retries: Option<usize>,
    /// Appended to the user agent of every request.
    pub additional_user_agent: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set access_key_id
    pub fn with_access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    /// Set secret_access_key
    pub fn with_secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set protocol
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set connection_retries
    pub fn with_connection_retries(mut self, retries: usize) -> Self {
        self.connection_retries = Some(retries);
        self
    }

    /// Set additional_user_agent
    pub fn with_additional_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.additional_user_agent = Some(user_agent.into());
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(QINGSTOR_ACCESS_KEY_ID) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(QINGSTOR_SECRET_ACCESS_KEY) {
            self.secret_access_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(QINGSTOR_HOST) {
            self.host.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(QINGSTOR_PORT) {
            match v.parse() {
                Ok(port) => {
                    self.port.get_or_insert(port);
                }
                Err(_) => debug!("ignore invalid {QINGSTOR_PORT}: {v}"),
            }
        }
        if let Some(v) = ctx.env_var(QINGSTOR_PROTOCOL) {
            self.protocol.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(QINGSTOR_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(QINGSTOR_CONNECTION_RETRIES) {
            match v.parse() {
                Ok(retries) => {
                    self.connection_retries.get_or_insert(retries);
                }
                Err(_) => debug!("ignore invalid {QINGSTOR_CONNECTION_RETRIES}: {v}"),
            }
        }

        self
    }

    /// Parse config from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| Error::config_invalid("failed to parse yaml config").with_source(e))
    }

    /// Load config from the YAML file at `path`.
    ///
    /// Fields already set are kept. A missing file is an error, an invalid
    /// file is a config error.
    pub async fn from_file(self, ctx: &Context, path: &str) -> Result<Self> {
        let path = ctx
            .expand_home_dir(path)
            .ok_or_else(|| Error::config_invalid(format!("cannot expand home dir in {path}")))?;
        let content = ctx.file_read_as_string(&path).await?;
        debug!("loaded config file from {path}");

        Ok(self.merge(Self::from_yaml(&content)?))
    }

    /// Load config from the default YAML file if it exists.
    ///
    /// The path is taken from [`QINGSTOR_CONFIG_FILE`] and falls back to
    /// `~/.qingstor/config.yaml`. An unreadable file is skipped.
    pub async fn from_default_file(self, ctx: &Context) -> Result<Self> {
        let path = ctx
            .env_var(QINGSTOR_CONFIG_FILE)
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        let Some(path) = ctx.expand_home_dir(&path) else {
            debug!("home dir not found, skip loading config file {path}");
            return Ok(self);
        };

        match ctx.file_read_as_string(&path).await {
            Ok(content) => Ok(self.merge(Self::from_yaml(&content)?)),
            Err(err) => {
                debug!("skip loading config file {path}: {err}");
                Ok(self)
            }
        }
    }

    /// Fill every unset field from `other`.
    fn merge(mut self, other: Self) -> Self {
        fn fill<T>(field: &mut Option<T>, other: Option<T>) {
            if field.is_none() {
                *field = other;
            }
        }

        fill(&mut self.access_key_id, other.access_key_id);
        fill(&mut self.secret_access_key, other.secret_access_key);
        fill(&mut self.host, other.host);
        fill(&mut self.port, other.port);
        fill(&mut self.protocol, other.protocol);
        fill(&mut self.endpoint, other.endpoint);
        fill(&mut self.connection_retries, other.connection_retries);
        fill(&mut self.additional_user_agent, other.additional_user_agent);
        self
    }

    /// Service host.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Service port.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Service protocol.
    pub fn protocol(&self) -> &str {
        self.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL)
    }

    /// Retries on transport failures.
    pub fn connection_retries(&self) -> usize {
        self.connection_retries
            .unwrap_or(DEFAULT_CONNECTION_RETRIES)
    }

    /// User agent sent with every request.
    pub fn user_agent(&self) -> String {
        let mut ua = format!(
            "{SDK_NAME}/{SDK_VERSION} (Rust; {})",
            std::env::consts::OS
        );
        if let Some(extra) = self
            .additional_user_agent
            .as_deref()
            .filter(|v| !v.is_empty())
        {
            // Keep the header value printable.
            let extra: String = extra
                .chars()
                .filter(|c| c.is_ascii_graphic() || *c == ' ')
                .collect();
            ua.push(' ');
            ua.push_str(&extra);
        }
        ua
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("protocol", &self.protocol)
            .field("endpoint", &self.endpoint)
            .field("connection_retries", &self.connection_retries)
            .field("additional_user_agent", &self.additional_user_agent)
            .finish()
    }
}
