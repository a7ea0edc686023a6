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

// Env values used in qingstor services.
pub const QINGSTOR_ACCESS_KEY_ID: &str = "QINGSTOR_ACCESS_KEY_ID";
pub const QINGSTOR_SECRET_ACCESS_KEY: &str = "QINGSTOR_SECRET_ACCESS_KEY";
pub const QINGSTOR_HOST: &str = "QINGSTOR_HOST";
pub const QINGSTOR_PORT: &str = "QINGSTOR_PORT";
pub const QINGSTOR_PROTOCOL: &str = "QINGSTOR_PROTOCOL";
pub const QINGSTOR_ENDPOINT: &str = "QINGSTOR_ENDPOINT";
pub const QINGSTOR_CONNECTION_RETRIES: &str = "QINGSTOR_CONNECTION_RETRIES";
pub const QINGSTOR_CONFIG_FILE: &str = "QINGSTOR_CONFIG_FILE";

// Config defaults.
pub const DEFAULT_HOST: &str = "qingstor.com";
pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_CONNECTION_RETRIES: usize = 3;
pub const DEFAULT_CONFIG_FILE: &str = "~/.qingstor/config.yaml";

// Headers used in qingstor services.
pub const CONTENT_MD5: &str = "content-md5";
pub const X_QS_DATE: &str = "x-qs-date";
pub const X_QS_REQUEST_ID: &str = "x-qs-request-id";
pub const X_QS_COPY_SOURCE: &str = "x-qs-copy-source";
pub const X_QS_FETCH_SOURCE: &str = "x-qs-fetch-source";
pub const X_QS_STORAGE_CLASS: &str = "x-qs-storage-class";
pub const X_QS_META_PREFIX: &str = "x-qs-meta-";

/// Every header whose name contains this marker takes part in the signature.
pub const X_QS_MARKER: &str = "x-qs-";

// Query params injected by query signing.
pub const QUERY_ACCESS_KEY_ID: &str = "access_key_id";
pub const QUERY_EXPIRES: &str = "expires";
pub const QUERY_SIGNATURE: &str = "signature";

pub const SDK_NAME: &str = "qingstor-sdk-rust";
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
