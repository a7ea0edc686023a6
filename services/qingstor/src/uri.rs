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

use http::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use qingstor_core::{Error, Result};

use crate::operation::Operation;
use crate::Config;

/// RFC 3986 unreserved characters stay as-is in query params.
pub(crate) const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Object keys keep their `/` separators.
const KEY_ENCODE_SET: &AsciiSet = &QUERY_ENCODE_SET.remove(b'/');

/// Resolve the uri of an operation.
///
/// The endpoint is `config.endpoint` when set, otherwise
/// `protocol://[zone.]host[:port]` with default ports left out. Params are
/// appended after the literal query of the template, empty values as `key=`.
pub fn build_uri(config: &Config, op: &Operation) -> Result<Uri> {
    let endpoint = endpoint(config, op.properties.zone.as_deref());

    let (template, literal_query) = match op.uri_template.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (op.uri_template.as_str(), None),
    };
    let path = fill_template(op, template)?;

    let mut uri = format!("{endpoint}{path}");
    let mut sep = '?';
    if let Some(query) = literal_query.filter(|v| !v.is_empty()) {
        uri.push(sep);
        uri.push_str(query);
        sep = '&';
    }
    for (k, v) in &op.params {
        uri.push(sep);
        uri.extend(utf8_percent_encode(k, QUERY_ENCODE_SET));
        uri.push('=');
        uri.extend(utf8_percent_encode(v, QUERY_ENCODE_SET));
        sep = '&';
    }

    uri.parse::<Uri>().map_err(|e| {
        Error::request_invalid(format!("invalid uri for {}: {uri}", op.api_name)).with_source(e)
    })
}

fn endpoint(config: &Config, zone: Option<&str>) -> String {
    if let Some(endpoint) = config.endpoint.as_deref().filter(|v| !v.is_empty()) {
        return endpoint.trim_end_matches('/').to_string();
    }

    let protocol = config.protocol();
    let port = config.port();
    let mut s = format!("{protocol}://");
    if let Some(zone) = zone.filter(|v| !v.is_empty()) {
        s.push_str(zone);
        s.push('.');
    }
    s.push_str(config.host());
    if !matches!((protocol, port), ("https", 443) | ("http", 80)) {
        s.push_str(&format!(":{port}"));
    }
    s
}

fn fill_template(op: &Operation, template: &str) -> Result<String> {
    let mut path = template.to_string();

    if path.contains("<bucket-name>") {
        let bucket = required(op, "bucket-name", op.properties.bucket_name.as_deref())?;
        path = path.replace("<bucket-name>", bucket);
    }
    if path.contains("<object-key>") {
        let key = required(op, "object-key", op.properties.object_key.as_deref())?;
        let key = utf8_percent_encode(key.trim_start_matches('/'), KEY_ENCODE_SET).to_string();
        path = path.replace("<object-key>", &key);
    }

    if path.is_empty() {
        path.push('/');
    }
    Ok(path)
}

fn required<'a>(op: &Operation, name: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        Error::request_invalid(format!("{name} is required for {}", op.api_name))
    })
}
