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

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method};
use qingstor_core::time::{format_http_date, DateTime};
use qingstor_core::Result;

use crate::constants::*;
use crate::uri::build_uri;
use crate::Config;

/// Values filling the placeholders of an uri template.
///
/// They never reach the wire on their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    pub zone: Option<String>,
    pub bucket_name: Option<String>,
    pub object_key: Option<String>,
}

/// Operation describes a single API call before it is resolved and signed.
///
/// ```
/// use http::Method;
/// use qingstor_sdk::Operation;
///
/// let op = Operation::new("List Objects", Method::GET, "/<bucket-name>")
///     .with_param("prefix", "photos/")
///     .with_header("x-qs-meta-empty", "");
/// assert_eq!(1, op.params.len());
/// assert!(op.headers.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Operation {
    /// Human readable name used in logs.
    pub api_name: &'static str,
    pub method: Method,
    /// Path with `<bucket-name>` / `<object-key>` placeholders and an
    /// optional literal query like `?acl`.
    pub uri_template: String,
    pub properties: Properties,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub body: Option<Bytes>,
    pub elements: Option<serde_json::Value>,
}

impl Operation {
    /// Create a new operation.
    pub fn new(api_name: &'static str, method: Method, uri_template: impl Into<String>) -> Self {
        Self {
            api_name,
            method,
            uri_template: uri_template.into(),
            properties: Properties::default(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            elements: None,
        }
    }

    /// Set properties.
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Add a header, headers with empty value are dropped.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.headers.push((name.into(), value));
        }
        self
    }

    /// Add a header if the value is present.
    pub fn with_header_opt(self, name: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with_header(name, v.to_string()),
            None => self,
        }
    }

    /// Add a query param, params with empty value are kept.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Add a query param if the value is present.
    pub fn with_param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.with_param(key, v.to_string()),
            None => self,
        }
    }

    /// Set the raw body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the JSON document sent when no raw body is set.
    pub fn with_elements(mut self, elements: serde_json::Value) -> Self {
        self.elements = Some(elements);
        self
    }

    /// Build an unsigned http request.
    ///
    /// `x-qs-date` is set to `now` unless the caller provided it, so the
    /// same request can be signed once and retried.
    pub fn build(&self, config: &Config, now: DateTime) -> Result<http::Request<Bytes>> {
        let uri = build_uri(config, self)?;

        let mut headers = HeaderMap::with_capacity(self.headers.len() + 4);
        for (k, v) in &self.headers {
            headers.append(HeaderName::from_bytes(k.as_bytes())?, HeaderValue::from_str(v)?);
        }

        let body = match (&self.body, &self.elements) {
            (Some(body), _) => body.clone(),
            (None, Some(elements)) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                Bytes::from(serde_json::to_vec(elements)?)
            }
            (None, None) => Bytes::new(),
        };

        if !headers.contains_key(X_QS_DATE) {
            headers.insert(X_QS_DATE, format_http_date(now).parse()?);
        }
        if !headers.contains_key(USER_AGENT) {
            headers.insert(USER_AGENT, config.user_agent().parse()?);
        }
        if !body.is_empty() || self.method == Method::PUT || self.method == Method::POST {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        }

        let mut req = http::Request::new(body);
        *req.method_mut() = self.method.clone();
        *req.uri_mut() = uri;
        *req.headers_mut() = headers;
        Ok(req)
    }
}
