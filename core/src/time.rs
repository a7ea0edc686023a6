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

//! Time related utils.

use std::time::Duration;

use chrono::Utc;

use crate::{Error, Result};

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse http date like `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn parse_http_date(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc2822(s)
        .map_err(|e| Error::unexpected(format!("invalid http date: {s}")).with_source(e))?;
    Ok(t.with_timezone(&Utc))
}

/// Unix timestamp in seconds of `t + d`.
///
/// Used to turn a relative validity window into the absolute `expires` of a
/// presigned request.
pub fn expires_at(t: DateTime, d: Duration) -> Result<i64> {
    let delta = chrono::TimeDelta::from_std(d).map_err(|e| {
        Error::request_invalid(format!("invalid expiration duration: {d:?}")).with_source(e)
    })?;
    let expires = t
        .checked_add_signed(delta)
        .ok_or_else(|| Error::request_invalid(format!("expiration out of range: {d:?}")))?;
    Ok(expires.timestamp())
}
