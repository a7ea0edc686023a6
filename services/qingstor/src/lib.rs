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

//! QingStor object storage SDK.
//!
//! Requests are described as [`Operation`]s, resolved into http requests,
//! signed with the QingStor HMAC-SHA256 scheme and sent through the
//! [`qingstor_core::HttpSend`] of the context.
//!
//! ## Quick Start
//!
//! ```no_run
//! use qingstor_core::{Context, OsEnv};
//! use qingstor_file_read_tokio::TokioFileRead;
//! use qingstor_http_send_reqwest::ReqwestHttpSend;
//! use qingstor_sdk::{Config, ListObjectsInput, QingStor};
//!
//! #[tokio::main]
//! async fn main() -> qingstor_core::Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::new().from_env(&ctx).from_default_file(&ctx).await?;
//!     let client = QingStor::new(ctx, config)?;
//!
//!     let bucket = client.bucket("my-bucket", "pek3b");
//!     let out = bucket.list_objects(ListObjectsInput::default()).await?;
//!     println!("{}", String::from_utf8_lossy(&out.body));
//!     Ok(())
//! }
//! ```
//!
//! ## Signing only
//!
//! The signer works on any `http::request::Parts`:
//!
//! ```no_run
//! use qingstor_core::{Context, Signer};
//! use qingstor_sdk::{DefaultCredentialProvider, RequestSigner};
//!
//! # async fn example() -> qingstor_core::Result<()> {
//! let signer = Signer::new(
//!     Context::new(),
//!     DefaultCredentialProvider::new(),
//!     RequestSigner::new(),
//! );
//!
//! let mut parts = http::Request::get("https://pek3b.qingstor.com/my-bucket/a.txt")
//!     .header("x-qs-date", "Mon, 15 Aug 2022 16:50:12 GMT")
//!     .body(())
//!     .unwrap()
//!     .into_parts()
//!     .0;
//! signer.sign(&mut parts, None).await?;
//! # Ok(())
//! # }
//! ```

mod constants;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod sign_request;
pub use sign_request::{
    canonicalize_header, canonicalize_resource, sign_header, sign_query, string_to_sign,
    RequestSigner,
};

mod operation;
pub use operation::{Operation, Properties};

mod uri;
pub use uri::build_uri;

mod output;
pub use output::{Output, ServiceError};

pub mod types;

mod client;
pub use client::QingStor;

mod bucket;
pub use bucket::{
    Bucket, DeleteMultipleObjectsInput, ListMultipartUploadsInput, ListObjectsInput,
};

mod object;
pub use object::{
    CompleteMultipartUploadInput, GetObjectInput, HeadObjectInput, ImageProcessInput,
    InitiateMultipartUploadInput, ListMultipartInput, OptionsObjectInput, PutObjectInput,
    UploadMultipartInput,
};
