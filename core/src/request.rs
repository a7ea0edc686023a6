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

use std::mem;
use std::str::FromStr;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::PathAndQuery;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;
use http::Uri;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::{Error, Result};

/// Characters kept as-is in query keys and values: RFC 3986 unreserved.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Signing context for request.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, as found in the uri.
    pub path: String,
    /// HTTP query parameters, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = mem::take(&mut parts.uri).into_parts();
        let paq = uri
            .path_and_query
            .unwrap_or_else(|| PathAndQuery::from_static("/"));

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme.unwrap_or(Scheme::HTTP),
            authority: uri.authority.ok_or_else(|| {
                Error::request_invalid("request without authority is invalid for signing")
            })?,
            path: paq.path().to_string(),
            query: paq
                .query()
                .map(|v| {
                    form_urlencoded::parse(v.as_bytes())
                        .map(|(k, v)| (k.into_owned(), v.into_owned()))
                        .collect()
                })
                .unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    ///
    /// Query keys and values are percent encoded again, empty values are
    /// written as bare keys.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        let query_size = self.query_size();

        // Return headers back.
        mem::swap(&mut parts.headers, &mut self.headers);
        parts.method = self.method;
        parts.uri = {
            let mut uri_parts = mem::take(&mut parts.uri).into_parts();
            uri_parts.scheme = Some(self.scheme);
            uri_parts.authority = Some(self.authority);
            uri_parts.path_and_query = {
                let paq = if self.query.is_empty() {
                    self.path
                } else {
                    let mut s = self.path;
                    s.reserve(query_size + self.query.len() * 2);

                    s.push('?');
                    for (i, (k, v)) in self.query.iter().enumerate() {
                        if i > 0 {
                            s.push('&');
                        }

                        s.extend(utf8_percent_encode(k, QUERY_ENCODE_SET));
                        if !v.is_empty() {
                            s.push('=');
                            s.extend(utf8_percent_encode(v, QUERY_ENCODE_SET));
                        }
                    }

                    s
                };

                Some(PathAndQuery::from_str(&paq)?)
            };
            Uri::from_parts(uri_parts)?
        };

        Ok(())
    }

    /// Get query size.
    #[inline]
    pub fn query_size(&self) -> usize {
        self.query
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
    }

    /// Push a new query pair into query list.
    #[inline]
    pub fn query_push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Get query value by filter.
    pub fn query_to_vec_with_filter(&self, filter: impl Fn(&str) -> bool) -> Vec<(String, String)> {
        self.query
            .iter()
            // Filter all queries
            .filter(|(k, _)| filter(k))
            // Clone all queries
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Convert sorted query to string.
    ///
    /// Pairs with empty value are written as bare keys.
    ///
    /// ```shell
    /// [(c, d), (a, "")] => "a&c=d"
    /// ```
    pub fn query_to_string(query: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut tokens = query
            .into_iter()
            .map(|(k, v)| {
                if v.is_empty() {
                    k
                } else {
                    format!("{k}{sep}{v}")
                }
            })
            .collect::<Vec<_>>();

        // Sort via the emitted token, not the key alone.
        tokens.sort();
        tokens.join(join)
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get every header instance whose name matches the filter.
    ///
    /// Names are lowercased, names and values are trimmed. A header with
    /// multiple values yields one pair per value.
    pub fn header_to_vec_with_filter(
        &self,
        filter: impl Fn(&str) -> bool,
    ) -> Result<Vec<(String, String)>> {
        let mut headers = Vec::new();
        for (k, v) in self.headers.iter() {
            let name = k.as_str().trim().to_lowercase();
            if !filter(&name) {
                continue;
            }
            headers.push((name, v.to_str()?.trim().to_string()));
        }
        Ok(headers)
    }

    /// Convert headers to sorted lines.
    ///
    /// Each pair becomes `name{sep}value` followed by `term`. Pairs are sorted
    /// by name first and value second, so `x-qs-a` stays ahead of `x-qs-a-b`.
    ///
    /// ```shell
    /// [(c, d), (a-b, c), (a, b)] => "a:b\na-b:c\nc:d\n"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, term: &str) -> String {
        headers.sort();

        let mut s = String::with_capacity(
            headers
                .iter()
                .map(|(k, v)| k.len() + sep.len() + v.len() + term.len())
                .sum(),
        );
        for (k, v) in headers {
            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
            s.push_str(term);
        }
        s
    }
}

/// SigningMethod is the method that used in signing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SigningMethod {
    /// Signing with header.
    Header,
    /// Signing with query, carrying the unix timestamp (seconds) the signature expires at.
    Query(i64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parts(uri: &str) -> http::request::Parts {
        http::Request::get(uri)
            .header("X-QS-Meta-Name", "  value  ")
            .body(())
            .expect("request must be valid")
            .into_parts()
            .0
    }

    #[test]
    fn test_build_and_apply() -> Result<()> {
        let mut parts = parts("https://pek3b.qingstor.com/bucket/a%20b?acl&prefix=x%2Fy");
        let mut req = SigningRequest::build(&mut parts)?;

        assert_eq!("/bucket/a%20b", req.path);
        assert_eq!(
            vec![
                ("acl".to_string(), "".to_string()),
                ("prefix".to_string(), "x/y".to_string())
            ],
            req.query
        );
        assert!(parts.headers.is_empty());

        req.query_push("signature", "ab+c/d=");
        req.apply(&mut parts)?;

        assert_eq!(
            "https://pek3b.qingstor.com/bucket/a%20b?acl&prefix=x%2Fy&signature=ab%2Bc%2Fd%3D",
            parts.uri.to_string()
        );
        assert_eq!("  value  ", parts.headers["x-qs-meta-name"]);
        Ok(())
    }

    #[test]
    fn test_build_without_authority() {
        let mut parts = parts("/bucket");
        let err = SigningRequest::build(&mut parts).unwrap_err();
        assert_eq!(crate::ErrorKind::RequestInvalid, err.kind());
    }

    #[test]
    fn test_query_to_string() {
        let query = vec![
            ("upload_id".to_string(), "test_upload_id".to_string()),
            ("acl".to_string(), "".to_string()),
        ];
        assert_eq!(
            "acl&upload_id=test_upload_id",
            SigningRequest::query_to_string(query, "=", "&")
        );
        assert_eq!("", SigningRequest::query_to_string(vec![], "=", "&"));
    }

    #[test]
    fn test_header_to_string() -> Result<()> {
        let mut parts = parts("https://qingstor.com/");
        parts.headers.append("x-qs-z", "test-z".parse()?);
        parts.headers.append("x-qs-a", "b".parse()?);
        parts.headers.append("x-qs-a", "a".parse()?);
        let req = SigningRequest::build(&mut parts)?;

        let headers = req.header_to_vec_with_filter(|k| k.starts_with("x-qs-a"))?;
        assert_eq!(
            "x-qs-a:a\nx-qs-a:b\n",
            SigningRequest::header_to_string(headers, ":", "\n")
        );
        assert_eq!("", SigningRequest::header_to_string(vec![], ":", "\n"));
        Ok(())
    }

    #[test]
    fn test_header_to_string_sorts_by_name() {
        let headers = vec![
            ("x-qs-meta-a-b".to_string(), "1".to_string()),
            ("x-qs-meta-a".to_string(), "2".to_string()),
        ];
        assert_eq!(
            "x-qs-meta-a:2\nx-qs-meta-a-b:1\n",
            SigningRequest::header_to_string(headers, ":", "\n")
        );
    }
}
