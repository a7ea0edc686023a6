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

use std::sync::Arc;
use std::time::Duration;

use http::Method;
use log::{debug, warn};
use qingstor_core::time::now;
use qingstor_core::{Context, Error, ProvideCredential, Result, Signer};

use crate::bucket::Bucket;
use crate::operation::Operation;
use crate::output::{parse_response, Output};
use crate::{Config, Credential, RequestSigner, StaticCredentialProvider};

/// QingStor is the entry of the service: it resolves, signs and sends
/// operations.
#[derive(Debug, Clone)]
pub struct QingStor {
    config: Arc<Config>,
    signer: Signer<Credential>,
}

impl QingStor {
    /// Create a client signing with the keys of `config`.
    ///
    /// Both `access_key_id` and `secret_access_key` must be present.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let access_key_id = config
            .access_key_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("access_key_id is required"))?;
        let secret_access_key = config
            .secret_access_key
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("secret_access_key is required"))?;

        let provider = StaticCredentialProvider::new(access_key_id, secret_access_key);
        Ok(Self::with_credential_provider(ctx, config, provider))
    }

    /// Create a client loading its credential from `provider`.
    pub fn with_credential_provider(
        ctx: Context,
        config: Config,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            signer: Signer::new(ctx, provider, RequestSigner::new()),
        }
    }

    /// Get the config of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a handle of the bucket `name` located in `zone`.
    pub fn bucket(&self, name: impl Into<String>, zone: impl Into<String>) -> Bucket {
        Bucket::new(self.clone(), name.into(), zone.into())
    }

    /// Sign the operation with the `Authorization` header and send it.
    ///
    /// Transport failures are retried `connection_retries` times with the
    /// same signed request.
    pub async fn send(&self, op: Operation) -> Result<Output> {
        let (mut parts, body) = op.build(&self.config, now())?.into_parts();
        self.signer.sign(&mut parts, None).await?;
        debug!("send {}: {} {}", op.api_name, parts.method, parts.uri);

        let retries = self.config.connection_retries();
        let mut attempt = 0;
        loop {
            let mut req = http::Request::new(body.clone());
            *req.method_mut() = parts.method.clone();
            *req.uri_mut() = parts.uri.clone();
            *req.version_mut() = parts.version;
            *req.headers_mut() = parts.headers.clone();

            match self.signer.context().http_send(req).await {
                Ok(resp) => {
                    debug!("{} responded with {}", op.api_name, resp.status());
                    return parse_response(resp);
                }
                Err(err) if err.is_temporary() && attempt < retries => {
                    attempt += 1;
                    warn!(
                        "{} failed, retrying ({attempt}/{retries}): {err}",
                        op.api_name
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Turn the operation into a presigned url valid for `expires_in`.
    pub async fn presign(&self, op: Operation, expires_in: Duration) -> Result<String> {
        let (mut parts, _) = op.build(&self.config, now())?.into_parts();
        self.signer.sign(&mut parts, Some(expires_in)).await?;
        Ok(parts.uri.to_string())
    }

    /// Build the List Buckets operation.
    ///
    /// `location` limits the result to buckets of one zone.
    pub fn list_buckets_operation(&self, location: Option<&str>) -> Operation {
        Operation::new("List Buckets", Method::GET, "/").with_header_opt("Location", location)
    }

    /// List all buckets of the current user.
    pub async fn list_buckets(&self, location: Option<&str>) -> Result<Output> {
        self.send(self.list_buckets_operation(location)).await
    }
}
