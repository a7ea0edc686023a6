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

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::{Error, Result};

/// Context bundles the side effects a QingStor client depends on: reading
/// the YAML config file, sending signed requests and looking up environment
/// variables.
///
/// Nothing is wired by default. A component left unset fails (file reads and
/// http sends) or reports nothing (env lookups) when it is used, so a client
/// that only signs requests needs no runtime at all.
///
/// ```
/// use std::collections::HashMap;
/// use qingstor_core::{Context, StaticEnv};
///
/// let ctx = Context::new().with_env(StaticEnv {
///     home_dir: None,
///     envs: HashMap::from([("QINGSTOR_ACCESS_KEY_ID".to_string(), "ak".to_string())]),
/// });
/// assert_eq!(Some("ak".to_string()), ctx.env_var("QINGSTOR_ACCESS_KEY_ID"));
/// ```
#[derive(Clone, Debug)]
pub struct Context {
    fs: Arc<dyn FileRead>,
    http: Arc<dyn HttpSend>,
    env: Arc<dyn Env>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a context with nothing configured.
    pub fn new() -> Self {
        Self {
            fs: Arc::new(Unconfigured),
            http: Arc::new(Unconfigured),
            env: Arc::new(Unconfigured),
        }
    }

    /// Use `fs` to read config files.
    pub fn with_file_read(mut self, fs: impl FileRead) -> Self {
        self.fs = Arc::new(fs);
        self
    }

    /// Use `http` to send requests.
    pub fn with_http_send(mut self, http: impl HttpSend) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Use `env` for environment variables and the home dir.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Read the whole file at `path`.
    #[inline]
    pub async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        self.fs.file_read(path).await
    }

    /// Read the whole file at `path`, which must be valid utf-8.
    pub async fn file_read_as_string(&self, path: &str) -> Result<String> {
        let bytes = self.file_read(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| Error::config_invalid(format!("{path} is not valid utf-8")).with_source(e))
    }

    /// Send a signed request.
    #[inline]
    pub async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.http.http_send(req).await
    }

    /// Replace a leading `~/` (or `~\`) with the home dir.
    ///
    /// Other paths are returned unchanged. `None` means the path needs a
    /// home dir and the env has none.
    pub fn expand_home_dir(&self, path: &str) -> Option<String> {
        if !path.starts_with("~/") && !path.starts_with("~\\") {
            return Some(path.to_string());
        }

        let home = self.env.home_dir()?;
        Some(path.replacen('~', &home.to_string_lossy(), 1))
    }

    /// Look up an environment variable, `None` when unset or not utf-8.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }
}

/// FileRead loads files for the client, in practice the YAML config at
/// `~/.qingstor/config.yaml` or the path in `QINGSTOR_CONFIG_FILE`.
#[async_trait]
pub trait FileRead: Debug + Send + Sync + 'static {
    /// Read the whole file at `path`.
    async fn file_read(&self, path: &str) -> Result<Vec<u8>>;
}

/// HttpSend is the transport every QingStor request goes through.
///
/// The request arrives signed. Implementations must send it as given, any
/// change to its uri or `x-qs-*` headers breaks the signature.
///
/// Transport failures should be returned as [`crate::ErrorKind::Unexpected`],
/// the client retries those. A response of any status is a success here.
#[async_trait]
pub trait HttpSend: Debug + Send + Sync + 'static {
    /// Send the request and collect the whole response.
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;
}

/// Env is where `QINGSTOR_*` variables and the home dir come from.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable, `None` when unset or not utf-8.
    fn var(&self, key: &str) -> Option<String>;

    /// The home dir of the current user, used to expand `~` in config paths.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// OsEnv reads the variables of the current process.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn home_dir(&self) -> Option<PathBuf> {
        #[allow(deprecated)]
        std::env::home_dir()
    }

    #[cfg(target_arch = "wasm32")]
    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// StaticEnv is a fixed set of variables, independent of the process env.
///
/// Use it to pin `QINGSTOR_ACCESS_KEY_ID` and friends in tests, or to feed
/// keys from another source without touching the process env.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// Home dir used to expand `~/.qingstor/config.yaml`.
    pub home_dir: Option<PathBuf>,
    /// Variables visible through [`Context::env_var`].
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir.clone()
    }
}

/// Stand-in for every component a [`Context`] was not given.
#[derive(Debug, Clone, Copy)]
struct Unconfigured;

#[async_trait]
impl FileRead for Unconfigured {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        Err(Error::unexpected(format!(
            "cannot read {path}: no file reader configured"
        )))
    }
}

#[async_trait]
impl HttpSend for Unconfigured {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        Err(Error::unexpected(format!(
            "cannot send {} {}: no http client configured",
            req.method(),
            req.uri()
        )))
    }
}

impl Env for Unconfigured {
    fn var(&self, _: &str) -> Option<String> {
        None
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home_dir() {
        let ctx = Context::new().with_env(StaticEnv {
            home_dir: Some(PathBuf::from("/home/qingstor")),
            envs: HashMap::new(),
        });

        assert_eq!(
            Some("/home/qingstor/.qingstor/config.yaml".to_string()),
            ctx.expand_home_dir("~/.qingstor/config.yaml")
        );
        assert_eq!(
            Some("/etc/qingstor.yaml".to_string()),
            ctx.expand_home_dir("/etc/qingstor.yaml")
        );
        assert_eq!(None, Context::new().expand_home_dir("~/.qingstor/config.yaml"));
    }

    #[tokio::test]
    async fn test_unconfigured_components() {
        let ctx = Context::new();
        assert!(ctx.file_read("/tmp/any").await.is_err());
        assert!(ctx.env_var("HOME").is_none());

        let req = http::Request::new(Bytes::new());
        let err = ctx.http_send(req).await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Unexpected);
    }

    #[derive(Debug)]
    struct InvalidUtf8;

    #[async_trait]
    impl FileRead for InvalidUtf8 {
        async fn file_read(&self, _: &str) -> Result<Vec<u8>> {
            Ok(vec![0xff, 0xfe])
        }
    }

    #[tokio::test]
    async fn test_file_read_as_string_rejects_invalid_utf8() {
        let ctx = Context::new().with_file_read(InvalidUtf8);
        let err = ctx.file_read_as_string("config.yaml").await.unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::ConfigInvalid);
    }
}
