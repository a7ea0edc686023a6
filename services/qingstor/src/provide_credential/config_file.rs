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

use async_trait::async_trait;
use qingstor_core::{Context, ProvideCredential, Result};

use crate::{Config, Credential};

/// ConfigFileCredentialProvider loads credentials from the YAML config file.
///
/// Without an explicit path the file is located the same way as
/// [`Config::from_default_file`]: `QINGSTOR_CONFIG_FILE` or
/// `~/.qingstor/config.yaml`.
#[derive(Debug, Default, Clone)]
pub struct ConfigFileCredentialProvider {
    path: Option<String>,
}

impl ConfigFileCredentialProvider {
    /// Create a provider reading the default config file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read credentials from the given path instead.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ConfigFileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let config = match &self.path {
            Some(path) => Config::new().from_file(ctx, path).await?,
            None => Config::new().from_default_file(ctx).await?,
        };

        match (config.access_key_id, config.secret_access_key) {
            (Some(ak), Some(sk)) if !ak.is_empty() && !sk.is_empty() => {
                Ok(Some(Credential::new(ak, sk)))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::QINGSTOR_CONFIG_FILE;
    use qingstor_core::StaticEnv;
    use qingstor_file_read_tokio::TokioFileRead;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("tempfile must be created");
        f.write_all(content.as_bytes()).expect("write must succeed");
        f
    }

    #[tokio::test]
    async fn test_config_file_provider_with_path() -> Result<()> {
        let f = write_config("access_key_id: 'file_ak'\nsecret_access_key: 'file_sk'\n");
        let ctx = Context::new().with_file_read(TokioFileRead);

        let cred = ConfigFileCredentialProvider::new()
            .with_path(f.path().to_string_lossy())
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!("file_ak", cred.access_key_id);
        assert_eq!("file_sk", cred.secret_access_key);
        Ok(())
    }

    #[tokio::test]
    async fn test_config_file_provider_from_env_path() -> Result<()> {
        let f = write_config("access_key_id: 'env_file_ak'\nsecret_access_key: 'env_file_sk'\n");
        let ctx = Context::new()
            .with_file_read(TokioFileRead)
            .with_env(StaticEnv {
                home_dir: None,
                envs: HashMap::from([(
                    QINGSTOR_CONFIG_FILE.to_string(),
                    f.path().to_string_lossy().to_string(),
                )]),
            });

        let cred = ConfigFileCredentialProvider::new()
            .provide_credential(&ctx)
            .await?
            .expect("credential must be loaded");
        assert_eq!("env_file_ak", cred.access_key_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_config_file_provider_without_keys() -> Result<()> {
        let f = write_config("host: 'qingstor.dev'\n");
        let ctx = Context::new().with_file_read(TokioFileRead);

        let cred = ConfigFileCredentialProvider::new()
            .with_path(f.path().to_string_lossy())
            .provide_credential(&ctx)
            .await?;
        assert!(cred.is_none());
        Ok(())
    }
}
