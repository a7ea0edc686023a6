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

//! QingStor request signing.
use std::collections::HashSet;
use std::fmt::Write;
use std::time::Duration;

use async_trait::async_trait;
use http::header::{
    HeaderName, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HOST, USER_AGENT,
};
use http::{HeaderValue, Uri};
use log::debug;
use once_cell::sync::Lazy;
use percent_encoding::utf8_percent_encode;
use qingstor_core::hash::base64_hmac_sha256;
use qingstor_core::time::{expires_at, format_http_date, now, DateTime};
use qingstor_core::{Context, Error, Result, SignRequest, SigningMethod, SigningRequest};

use crate::constants::*;
use crate::credential::Credential;
use crate::uri::QUERY_ENCODE_SET;

/// RequestSigner that implements QingStor signature authentication.
///
/// Without `expires_in` the request is signed with the `Authorization`
/// header, otherwise it becomes a presigned request carrying `signature`,
/// `access_key_id` and `expires` in its query.
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new RequestSigner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let k = credential.ok_or_else(|| Error::config_invalid("missing credential"))?;
        let now = self.time.unwrap_or_else(now);

        if !parts.headers.contains_key(X_QS_DATE) {
            parts
                .headers
                .insert(X_QS_DATE, format_http_date(now).parse()?);
        }

        match expires_in {
            Some(d) => sign_query(parts, k, expires_at(now, d)?),
            None => sign_header(parts, k),
        }
    }
}

/// Sign the request with the `Authorization` header.
///
/// The date header must already be set, no other part of the request is
/// touched.
pub fn sign_header(parts: &mut http::request::Parts, cred: &Credential) -> Result<()> {
    let secret = secret_access_key(cred)?;

    let uri = parts.uri.clone();
    let mut ctx = SigningRequest::build(parts)?;

    let string_to_sign = string_to_sign(&ctx, SigningMethod::Header)?;
    let signature = base64_hmac_sha256(secret.as_bytes(), string_to_sign.as_bytes());

    ctx.headers.insert(AUTHORIZATION, {
        let mut value: HeaderValue = format!("QS {}:{}", cred.access_key_id, signature).parse()?;
        value.set_sensitive(true);

        value
    });

    ctx.apply(parts)?;
    parts.uri = uri;
    Ok(())
}

/// Turn the request into a presigned request valid until `expires`, unix
/// timestamp in seconds.
pub fn sign_query(
    parts: &mut http::request::Parts,
    cred: &Credential,
    expires: i64,
) -> Result<()> {
    let secret = secret_access_key(cred)?;

    let uri = parts.uri.clone();
    let mut ctx = SigningRequest::build(parts)?;

    // Presigned requests are sent by other clients, drop everything they
    // will set on their own.
    for name in [DATE, HOST, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT] {
        ctx.headers.remove(name);
    }
    ctx.headers.remove(X_QS_DATE);

    let string_to_sign = string_to_sign(&ctx, SigningMethod::Query(expires))?;
    let signature = base64_hmac_sha256(secret.as_bytes(), string_to_sign.as_bytes());

    ctx.apply(parts)?;
    parts.uri = append_query(
        &uri,
        &[
            (QUERY_SIGNATURE, signature.as_str()),
            (QUERY_ACCESS_KEY_ID, cred.access_key_id.as_str()),
            (QUERY_EXPIRES, expires.to_string().as_str()),
        ],
    )?;
    Ok(())
}

/// Append percent encoded pairs to the query of `uri`, the existing query
/// text is kept as is.
fn append_query(uri: &Uri, pairs: &[(&str, &str)]) -> Result<Uri> {
    let mut s = uri.to_string();
    let mut sep = if uri.query().is_some() { '&' } else { '?' };
    for (k, v) in pairs {
        s.push(sep);
        s.extend(utf8_percent_encode(k, QUERY_ENCODE_SET));
        s.push('=');
        s.extend(utf8_percent_encode(v, QUERY_ENCODE_SET));
        sep = '&';
    }

    Ok(s.parse()?)
}

fn secret_access_key(cred: &Credential) -> Result<&str> {
    if cred.secret_access_key.is_empty() {
        return Err(Error::config_invalid(
            "secret access key is required for signing",
        ));
    }
    Ok(&cred.secret_access_key)
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Expires + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// `Expires` is empty with header signing, the date travels in `x-qs-date`
/// as part of the canonicalized headers instead.
pub fn string_to_sign(ctx: &SigningRequest, method: SigningMethod) -> Result<String> {
    let mut s = String::new();
    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(
        &mut s,
        "{}",
        ctx.header_get_or_default(&HeaderName::from_static(CONTENT_MD5))?
    )?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&CONTENT_TYPE)?)?;
    match method {
        SigningMethod::Header => {
            s.write_str("\n")?;
            s.write_str(&canonicalize_header(ctx, true)?)?;
        }
        SigningMethod::Query(expires) => {
            writeln!(&mut s, "{expires}")?;
            s.write_str(&canonicalize_header(ctx, false)?)?;
        }
    }
    s.write_str(&canonicalize_resource(ctx))?;

    debug!("string to sign: {}", &s);
    Ok(s)
}

/// Every header containing `x-qs-` as one sorted `name:value\n` line.
///
/// `x-qs-date` is only kept when `include_date` is set.
pub fn canonicalize_header(ctx: &SigningRequest, include_date: bool) -> Result<String> {
    let headers = ctx.header_to_vec_with_filter(|k| {
        k.contains(X_QS_MARKER) && (include_date || k != X_QS_DATE)
    })?;

    Ok(SigningRequest::header_to_string(headers, ":", "\n"))
}

/// The request path followed by its sorted sub-resources.
pub fn canonicalize_resource(ctx: &SigningRequest) -> String {
    let params = ctx.query_to_vec_with_filter(is_sub_resource);
    let params_str = SigningRequest::query_to_string(params, "=", "&");

    if params_str.is_empty() {
        ctx.path.clone()
    } else {
        format!("{}?{params_str}", ctx.path)
    }
}

fn is_sub_resource(param: &str) -> bool {
    SUBRESOURCES.contains(param)
}

// Sub-resources are case sensitive.
static SUBRESOURCES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "cors",
        "delete",
        "mirror",
        "part_number",
        "policy",
        "stats",
        "upload_id",
        "uploads",
        "response-expires",
        "response-cache-control",
        "response-content-type",
        "response-content-language",
        "response-content-encoding",
        "response-content-disposition",
    ])
});
