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

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use http::StatusCode;
use pretty_assertions::assert_eq;
use qingstor_core::hash::base64_hmac_sha256;
use qingstor_core::{
    Context, Error, ErrorKind, HttpSend, Result, SigningMethod, SigningRequest, StaticEnv,
};
use qingstor_sdk::types::{Acl, Grantee, ListObjectsOutput};
use qingstor_sdk::{
    string_to_sign, Config, DefaultCredentialProvider, GetObjectInput, ListObjectsInput,
    PutObjectInput, QingStor, ServiceError,
};

mod live;

/// A request seen by [`MockHttpSend`].
#[derive(Debug, Clone)]
struct Recorded {
    method: http::Method,
    uri: http::Uri,
    headers: http::HeaderMap,
    body: Bytes,
}

/// HttpSend replaying canned responses and recording every request.
#[derive(Debug, Clone, Default)]
struct MockHttpSend {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<VecDeque<Result<http::Response<Bytes>>>>>,
}

impl MockHttpSend {
    fn respond(self, resp: Result<http::Response<Bytes>>) -> Self {
        self.responses.lock().unwrap().push_back(resp);
        self
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let (parts, body) = req.into_parts();
        self.requests.lock().unwrap().push(Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::unexpected("no response prepared")))
    }
}

fn json_response(status: StatusCode, body: &'static str) -> Result<http::Response<Bytes>> {
    Ok(http::Response::builder()
        .status(status)
        .header("x-qs-request-id", "aa08cf7a43f611e5886952542e6ce14b")
        .header(CONTENT_TYPE, "application/json")
        .body(Bytes::from_static(body.as_bytes()))
        .unwrap())
}

fn config() -> Config {
    Config::new()
        .with_access_key_id("test_access_key")
        .with_secret_access_key("test_secret")
}

fn client(http: MockHttpSend, config: Config) -> QingStor {
    let _ = env_logger::builder().is_test(true).try_init();
    QingStor::new(Context::new().with_http_send(http), config).unwrap()
}

/// Recompute the signature of a sent request.
fn expected_authorization(req: &Recorded) -> String {
    let mut parts = http::Request::builder()
        .method(req.method.clone())
        .uri(req.uri.clone())
        .body(())
        .unwrap()
        .into_parts()
        .0;
    parts.headers = req.headers.clone();
    parts.headers.remove(AUTHORIZATION);

    let ctx = SigningRequest::build(&mut parts).unwrap();
    let s = string_to_sign(&ctx, SigningMethod::Header).unwrap();
    format!(
        "QS test_access_key:{}",
        base64_hmac_sha256(b"test_secret", s.as_bytes())
    )
}

#[tokio::test]
async fn test_list_objects() -> Result<()> {
    let http = MockHttpSend::default().respond(json_response(
        StatusCode::OK,
        r#"{"name":"test","keys":[{"key":"a.txt","size":3}],"limit":10,"has_more":false}"#,
    ));
    let bucket = client(http.clone(), config()).bucket("test", "pek3b");

    let out = bucket
        .list_objects(ListObjectsInput {
            prefix: Some("a".to_string()),
            limit: Some(10),
            ..Default::default()
        })
        .await?;

    assert_eq!(200, out.status_code);
    assert_eq!(
        Some("aa08cf7a43f611e5886952542e6ce14b"),
        out.request_id.as_deref()
    );
    let list: ListObjectsOutput = out.json()?;
    assert_eq!("a.txt", list.keys[0].key);

    let requests = http.requests();
    assert_eq!(1, requests.len());
    let req = &requests[0];
    assert_eq!(http::Method::GET, req.method);
    assert_eq!(
        "https://pek3b.qingstor.com/test?prefix=a&limit=10",
        req.uri.to_string()
    );
    assert!(req.headers.contains_key("x-qs-date"));
    assert!(req.headers[USER_AGENT]
        .to_str()
        .unwrap()
        .starts_with("qingstor-sdk-rust/"));
    assert_eq!(
        expected_authorization(req),
        req.headers[AUTHORIZATION].to_str().unwrap()
    );
    Ok(())
}

#[tokio::test]
async fn test_put_object() -> Result<()> {
    let http = MockHttpSend::default().respond(json_response(StatusCode::CREATED, ""));
    let bucket = client(http.clone(), config()).bucket("test", "pek3b");

    bucket
        .put_object(
            "dir/a b.txt",
            PutObjectInput {
                body: Bytes::from_static(b"hello"),
                content_type: Some("text/plain".to_string()),
                ..Default::default()
            },
        )
        .await?;

    let requests = http.requests();
    let req = &requests[0];
    assert_eq!(
        "https://pek3b.qingstor.com/test/dir/a%20b.txt",
        req.uri.to_string()
    );
    assert_eq!("5", req.headers[CONTENT_LENGTH]);
    assert_eq!("text/plain", req.headers[CONTENT_TYPE]);
    assert_eq!(b"hello".as_slice(), req.body.as_ref());
    assert_eq!(
        expected_authorization(req),
        req.headers[AUTHORIZATION].to_str().unwrap()
    );
    Ok(())
}

#[tokio::test]
async fn test_put_acl_sends_json() -> Result<()> {
    let http = MockHttpSend::default().respond(json_response(StatusCode::OK, ""));
    let bucket = client(http.clone(), config()).bucket("test", "pek3b");

    bucket
        .put_acl(vec![Acl {
            grantee: Grantee {
                grantee_type: "group".to_string(),
                id: None,
                name: Some("QS_ALL_USERS".to_string()),
            },
            permission: "READ".to_string(),
        }])
        .await?;

    let requests = http.requests();
    let req = &requests[0];
    assert_eq!("https://pek3b.qingstor.com/test?acl", req.uri.to_string());
    assert_eq!("application/json", req.headers[CONTENT_TYPE]);
    let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
    assert_eq!(
        serde_json::json!({"acl": [{"grantee": {"type": "group", "name": "QS_ALL_USERS"}, "permission": "READ"}]}),
        body
    );
    Ok(())
}

#[tokio::test]
async fn test_retry_keeps_signature() -> Result<()> {
    let http = MockHttpSend::default()
        .respond(Err(Error::unexpected("connection reset")))
        .respond(Err(Error::unexpected("connection reset")))
        .respond(json_response(StatusCode::OK, "{}"));
    let bucket = client(http.clone(), config()).bucket("test", "pek3b");

    bucket.head().await?;

    let requests = http.requests();
    assert_eq!(3, requests.len());
    for req in &requests[1..] {
        assert_eq!(
            requests[0].headers[AUTHORIZATION],
            req.headers[AUTHORIZATION]
        );
        assert_eq!(requests[0].headers["x-qs-date"], req.headers["x-qs-date"]);
    }
    Ok(())
}

#[tokio::test]
async fn test_retry_exhausted() {
    let http = MockHttpSend::default()
        .respond(Err(Error::unexpected("connection reset")))
        .respond(Err(Error::unexpected("connection reset")));
    let bucket = client(http.clone(), config().with_connection_retries(1)).bucket("test", "pek3b");

    let err = bucket.head().await.unwrap_err();
    assert_eq!(ErrorKind::Unexpected, err.kind());
    assert_eq!(2, http.requests().len());
}

#[tokio::test]
async fn test_service_error_not_retried() {
    let http = MockHttpSend::default().respond(json_response(
        StatusCode::NOT_FOUND,
        r#"{"code":"object_not_exists","message":"The object you are accessing does not exist.","request_id":"aa08cf7a43f611e5886952542e6ce14b","url":"https://docs.qingcloud.com/object_storage/api/object/get.html"}"#,
    ));
    let bucket = client(http.clone(), config()).bucket("test", "pek3b");

    let err = bucket
        .get_object("not_exist", GetObjectInput::default())
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::ServiceError, err.kind());
    let se = err.source_as::<ServiceError>().unwrap();
    assert_eq!(404, se.status_code);
    assert_eq!("object_not_exists", se.code);
    assert_eq!(1, http.requests().len());
}

#[tokio::test]
async fn test_invalid_input_is_not_sent() {
    let http = MockHttpSend::default();
    let bucket = client(http.clone(), config()).bucket("test", "pek3b");

    let err = bucket
        .put_acl(vec![Acl {
            grantee: Grantee {
                grantee_type: "robot".to_string(),
                id: Some("usr-id".to_string()),
                name: None,
            },
            permission: "READ".to_string(),
        }])
        .await
        .unwrap_err();
    assert_eq!(ErrorKind::RequestInvalid, err.kind());
    assert!(http.requests().is_empty());
}

#[tokio::test]
async fn test_presign() -> Result<()> {
    let http = MockHttpSend::default();
    let bucket = client(http.clone(), config()).bucket("test", "pek3b");

    let url = bucket
        .presign(
            bucket.get_object_operation("a.txt", GetObjectInput::default()),
            Duration::from_secs(3600),
        )
        .await?;

    let uri: http::Uri = url.parse().unwrap();
    assert_eq!(Some("pek3b.qingstor.com"), uri.host());
    assert_eq!("/test/a.txt", uri.path());
    let query: HashMap<String, String> = form_urlencoded::parse(uri.query().unwrap().as_bytes())
        .into_owned()
        .collect();
    assert_eq!("test_access_key", query["access_key_id"]);
    assert!(query["expires"].parse::<i64>().unwrap() > 0);
    assert!(!query["signature"].is_empty());
    assert!(http.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_new_requires_keys() {
    let err = QingStor::new(
        Context::new(),
        Config::new().with_access_key_id("test_access_key"),
    )
    .unwrap_err();
    assert_eq!(ErrorKind::ConfigInvalid, err.kind());
}

#[tokio::test]
async fn test_with_credential_provider() -> Result<()> {
    let http = MockHttpSend::default().respond(json_response(
        StatusCode::OK,
        r#"{"count":0,"buckets":[]}"#,
    ));
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_env(StaticEnv {
            home_dir: None,
            envs: HashMap::from([
                (
                    "QINGSTOR_ACCESS_KEY_ID".to_string(),
                    "test_access_key".to_string(),
                ),
                (
                    "QINGSTOR_SECRET_ACCESS_KEY".to_string(),
                    "test_secret".to_string(),
                ),
            ]),
        });
    let client =
        QingStor::with_credential_provider(ctx, Config::new(), DefaultCredentialProvider::new());

    let out = client.list_buckets(Some("pek3b")).await?;
    assert_eq!(Some(&serde_json::json!(0)), out.fields.get("count"));

    let requests = http.requests();
    let req = &requests[0];
    assert_eq!("https://qingstor.com/", req.uri.to_string());
    assert_eq!("pek3b", req.headers["location"]);
    assert_eq!(
        expected_authorization(req),
        req.headers[AUTHORIZATION].to_str().unwrap()
    );
    Ok(())
}

#[test]
fn test_config_from_os_env() {
    temp_env::with_vars(
        [
            ("QINGSTOR_HOST", Some("qingstor.dev")),
            ("QINGSTOR_PORT", Some("8080")),
            ("QINGSTOR_PROTOCOL", Some("http")),
        ],
        || {
            let ctx = Context::new().with_env(qingstor_core::OsEnv);
            let config = Config::new().from_env(&ctx);
            assert_eq!("qingstor.dev", config.host());
            assert_eq!(8080, config.port());
            assert_eq!("http", config.protocol());
        },
    );
}
