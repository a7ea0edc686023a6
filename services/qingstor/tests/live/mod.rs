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

//! Tests against a real QingStor service.
//!
//! Enabled with `QINGSTOR_TEST=on`, a `.env` file is loaded if present.

use std::env;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use log::{debug, warn};
use qingstor_core::{Context, ErrorKind, OsEnv, Result};
use qingstor_file_read_tokio::TokioFileRead;
use qingstor_http_send_reqwest::ReqwestHttpSend;
use qingstor_sdk::{Bucket, Config, GetObjectInput, HeadObjectInput, PutObjectInput, QingStor};

async fn init_bucket() -> Option<(Context, Bucket)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("QINGSTOR_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::new()
        .from_env(&ctx)
        .from_default_file(&ctx)
        .await
        .expect("config must be loaded");

    let bucket = env::var("QINGSTOR_BUCKET").expect("env QINGSTOR_BUCKET must set");
    let zone = env::var("QINGSTOR_ZONE").expect("env QINGSTOR_ZONE must set");

    let client = QingStor::new(ctx.clone(), config).expect("client must be created");
    Some((ctx, client.bucket(bucket, zone)))
}

#[tokio::test]
async fn test_live_head_bucket() -> Result<()> {
    let Some((_, bucket)) = init_bucket().await else {
        warn!("QINGSTOR_TEST is not set, skipped");
        return Ok(());
    };

    let out = bucket.head().await?;
    assert_eq!(200, out.status_code);
    Ok(())
}

#[tokio::test]
async fn test_live_get_not_exist_object() -> Result<()> {
    let Some((_, bucket)) = init_bucket().await else {
        warn!("QINGSTOR_TEST is not set, skipped");
        return Ok(());
    };

    let err = bucket
        .get_object("not_exist_file", GetObjectInput::default())
        .await
        .unwrap_err();
    debug!("got error: {err:?}");
    assert_eq!(ErrorKind::ServiceError, err.kind());
    Ok(())
}

#[tokio::test]
async fn test_live_object_round_trip() -> Result<()> {
    let Some((ctx, bucket)) = init_bucket().await else {
        warn!("QINGSTOR_TEST is not set, skipped");
        return Ok(());
    };

    let key = "qingstor-sdk-rust/live test.txt";
    bucket
        .put_object(
            key,
            PutObjectInput {
                body: Bytes::from_static(b"Hello, QingStor!"),
                content_type: Some("text/plain".to_string()),
                ..Default::default()
            },
        )
        .await?;

    let out = bucket.head_object(key, HeadObjectInput::default()).await?;
    assert_eq!(Some("16"), out.header("content-length"));

    let url = bucket
        .presign(
            bucket.get_object_operation(key, GetObjectInput::default()),
            Duration::from_secs(300),
        )
        .await?;
    let resp = ctx
        .http_send(http::Request::get(url).body(Bytes::new())?)
        .await?;
    assert_eq!(StatusCode::OK, resp.status());
    assert_eq!(b"Hello, QingStor!".as_slice(), resp.body().as_ref());

    bucket.delete_object(key).await?;
    Ok(())
}
