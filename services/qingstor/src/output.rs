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
use http::HeaderMap;
use qingstor_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::X_QS_REQUEST_ID;

/// Output is the flat result of a successful call.
#[derive(Debug, Clone)]
pub struct Output {
    pub status_code: u16,
    pub request_id: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Response headers keyed by lowercased name, overlaid with the top
    /// level fields of a JSON body.
    pub fields: Map<String, Value>,
}

impl Output {
    /// Deserialize the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            Error::unexpected("failed to deserialize response body").with_source(e)
        })
    }

    /// Get a header value as str.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The error document returned by QingStor with a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{status_code} {code}: {message} (request_id: {request_id})")]
pub struct ServiceError {
    pub status_code: u16,
    pub code: String,
    pub message: String,
    pub request_id: String,
    pub url: String,
}

#[derive(Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: String,
    #[serde(default)]
    url: String,
}

/// Unpack a response, a non-2xx status becomes a service error.
pub(crate) fn parse_response(resp: http::Response<Bytes>) -> Result<Output> {
    let (parts, body) = resp.into_parts();
    let status = parts.status;
    let request_id = parts
        .headers
        .get(X_QS_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    if !status.is_success() {
        let doc = serde_json::from_slice::<ErrorDocument>(&body).ok();
        let err = ServiceError {
            status_code: status.as_u16(),
            code: doc
                .as_ref()
                .map(|d| d.code.clone())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
            message: doc
                .as_ref()
                .map(|d| d.message.clone())
                .unwrap_or_else(|| String::from_utf8_lossy(&body).to_string()),
            request_id: doc
                .as_ref()
                .map(|d| d.request_id.clone())
                .filter(|v| !v.is_empty())
                .or(request_id)
                .unwrap_or_default(),
            url: doc.map(|d| d.url).unwrap_or_default(),
        };
        return Err(Error::service_error(err.to_string()).with_source(err));
    }

    let mut fields = Map::new();
    for (k, v) in parts.headers.iter() {
        if let Ok(v) = v.to_str() {
            fields.insert(k.as_str().to_string(), Value::String(v.to_string()));
        }
    }
    if let Ok(Value::Object(doc)) = serde_json::from_slice::<Value>(&body) {
        fields.extend(doc);
    }

    Ok(Output {
        status_code: status.as_u16(),
        request_id,
        headers: parts.headers,
        body,
        fields,
    })
}
