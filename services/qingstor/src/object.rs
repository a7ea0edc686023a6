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

//! Object operations of a [`Bucket`].

use bytes::Bytes;
use http::Method;
use qingstor_core::Result;
use serde_json::json;

use crate::bucket::Bucket;
use crate::constants::*;
use crate::operation::Operation;
use crate::output::Output;
use crate::types::*;

const OBJECT: &str = "/<bucket-name>/<object-key>";

const STORAGE_CLASSES: &[&str] = &["STANDARD", "STANDARD_IA"];

/// Input of Put Object.
#[derive(Debug, Clone, Default)]
pub struct PutObjectInput {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub content_md5: Option<String>,
    /// `STANDARD` or `STANDARD_IA`.
    pub storage_class: Option<String>,
    /// Copy from `/<bucket-name>/<object-key>` instead of uploading a body.
    pub copy_source: Option<String>,
    /// Fetch from an url instead of uploading a body.
    pub fetch_source: Option<String>,
    /// User metadata, sent as `x-qs-meta-<name>`.
    pub metadata: Vec<(String, String)>,
}

/// Conditions and response overrides of Get Object.
#[derive(Debug, Clone, Default)]
pub struct GetObjectInput {
    pub range: Option<String>,
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
    pub response_cache_control: Option<String>,
    pub response_content_disposition: Option<String>,
    pub response_content_encoding: Option<String>,
    pub response_content_language: Option<String>,
    pub response_content_type: Option<String>,
    pub response_expires: Option<String>,
}

/// Conditions of Head Object.
#[derive(Debug, Clone, Default)]
pub struct HeadObjectInput {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
}

/// Input of the CORS preflight Options Object.
#[derive(Debug, Clone, Default)]
pub struct OptionsObjectInput {
    pub origin: Option<String>,
    pub access_control_request_method: Option<String>,
    pub access_control_request_headers: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct InitiateMultipartUploadInput {
    pub content_type: Option<String>,
    pub storage_class: Option<String>,
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadMultipartInput {
    pub upload_id: Option<String>,
    pub part_number: Option<i64>,
    pub content_md5: Option<String>,
    pub body: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct ListMultipartInput {
    pub upload_id: Option<String>,
    pub limit: Option<i64>,
    pub part_number_marker: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartUploadInput {
    pub upload_id: Option<String>,
    /// MD5 of the whole object.
    pub etag: Option<String>,
    pub object_parts: Vec<ObjectPart>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageProcessInput {
    /// Processing pipeline like `resize:w_100|rotate:a_90`.
    pub action: Option<String>,
    pub response_cache_control: Option<String>,
    pub response_content_disposition: Option<String>,
    pub response_content_encoding: Option<String>,
    pub response_content_language: Option<String>,
    pub response_content_type: Option<String>,
    pub response_expires: Option<String>,
}

fn check_storage_class(storage_class: &Option<String>) -> Result<()> {
    match storage_class {
        Some(v) => check_enum("storage class", v, STORAGE_CLASSES),
        None => Ok(()),
    }
}

fn with_metadata(op: Operation, metadata: Vec<(String, String)>) -> Operation {
    metadata.into_iter().fold(op, |op, (k, v)| {
        op.with_header(format!("{X_QS_META_PREFIX}{k}"), v)
    })
}

impl Bucket {
    fn object_operation(&self, api_name: &'static str, method: Method, key: &str) -> Operation {
        self.operation(api_name, method, OBJECT)
            .with_properties(self.properties(Some(key)))
    }

    pub fn put_object_operation(&self, key: &str, input: PutObjectInput) -> Result<Operation> {
        check_storage_class(&input.storage_class)?;

        let op = self
            .object_operation("Put Object", Method::PUT, key)
            .with_header_opt("Content-Type", input.content_type)
            .with_header_opt(CONTENT_MD5, input.content_md5)
            .with_header_opt(X_QS_STORAGE_CLASS, input.storage_class)
            .with_header_opt(X_QS_COPY_SOURCE, input.copy_source)
            .with_header_opt(X_QS_FETCH_SOURCE, input.fetch_source)
            .with_body(input.body);
        Ok(with_metadata(op, input.metadata))
    }

    /// Upload an object in one request.
    pub async fn put_object(&self, key: &str, input: PutObjectInput) -> Result<Output> {
        self.send(self.put_object_operation(key, input)?).await
    }

    pub fn get_object_operation(&self, key: &str, input: GetObjectInput) -> Operation {
        self.object_operation("Get Object", Method::GET, key)
            .with_header_opt("Range", input.range)
            .with_header_opt("If-Match", input.if_match)
            .with_header_opt("If-None-Match", input.if_none_match)
            .with_header_opt("If-Modified-Since", input.if_modified_since)
            .with_header_opt("If-Unmodified-Since", input.if_unmodified_since)
            .with_param_opt("response-cache-control", input.response_cache_control)
            .with_param_opt(
                "response-content-disposition",
                input.response_content_disposition,
            )
            .with_param_opt("response-content-encoding", input.response_content_encoding)
            .with_param_opt("response-content-language", input.response_content_language)
            .with_param_opt("response-content-type", input.response_content_type)
            .with_param_opt("response-expires", input.response_expires)
    }

    /// Download an object, the content is in [`Output::body`].
    pub async fn get_object(&self, key: &str, input: GetObjectInput) -> Result<Output> {
        self.send(self.get_object_operation(key, input)).await
    }

    pub fn head_object_operation(&self, key: &str, input: HeadObjectInput) -> Operation {
        self.object_operation("Head Object", Method::HEAD, key)
            .with_header_opt("If-Match", input.if_match)
            .with_header_opt("If-None-Match", input.if_none_match)
            .with_header_opt("If-Modified-Since", input.if_modified_since)
            .with_header_opt("If-Unmodified-Since", input.if_unmodified_since)
    }

    pub async fn head_object(&self, key: &str, input: HeadObjectInput) -> Result<Output> {
        self.send(self.head_object_operation(key, input)).await
    }

    pub fn delete_object_operation(&self, key: &str) -> Operation {
        self.object_operation("Delete Object", Method::DELETE, key)
    }

    pub async fn delete_object(&self, key: &str) -> Result<Output> {
        self.send(self.delete_object_operation(key)).await
    }

    pub fn options_object_operation(
        &self,
        key: &str,
        input: OptionsObjectInput,
    ) -> Result<Operation> {
        let origin = check_required("Origin", input.origin)?;
        let method = check_required(
            "Access-Control-Request-Method",
            input.access_control_request_method,
        )?;

        Ok(self
            .object_operation("OPTIONS Object", Method::OPTIONS, key)
            .with_header("Origin", origin)
            .with_header("Access-Control-Request-Method", method)
            .with_header_opt(
                "Access-Control-Request-Headers",
                input.access_control_request_headers,
            ))
    }

    /// Check whether a CORS request would be allowed.
    pub async fn options_object(&self, key: &str, input: OptionsObjectInput) -> Result<Output> {
        self.send(self.options_object_operation(key, input)?).await
    }

    pub fn initiate_multipart_upload_operation(
        &self,
        key: &str,
        input: InitiateMultipartUploadInput,
    ) -> Result<Operation> {
        check_storage_class(&input.storage_class)?;

        let op = self
            .operation(
                "Initiate Multipart Upload",
                Method::POST,
                "/<bucket-name>/<object-key>?uploads",
            )
            .with_properties(self.properties(Some(key)))
            .with_header_opt("Content-Type", input.content_type)
            .with_header_opt(X_QS_STORAGE_CLASS, input.storage_class);
        Ok(with_metadata(op, input.metadata))
    }

    /// Start a multipart upload, the upload id is in the JSON body.
    pub async fn initiate_multipart_upload(
        &self,
        key: &str,
        input: InitiateMultipartUploadInput,
    ) -> Result<Output> {
        self.send(self.initiate_multipart_upload_operation(key, input)?).await
    }

    pub fn upload_multipart_operation(
        &self,
        key: &str,
        input: UploadMultipartInput,
    ) -> Result<Operation> {
        let upload_id = check_required("upload_id", input.upload_id)?;
        let part_number = check_required("part_number", input.part_number)?;

        Ok(self
            .object_operation("Upload Multipart", Method::PUT, key)
            .with_param("part_number", part_number.to_string())
            .with_param("upload_id", upload_id)
            .with_header_opt(CONTENT_MD5, input.content_md5)
            .with_body(input.body))
    }

    pub async fn upload_multipart(&self, key: &str, input: UploadMultipartInput) -> Result<Output> {
        self.send(self.upload_multipart_operation(key, input)?).await
    }

    pub fn list_multipart_operation(
        &self,
        key: &str,
        input: ListMultipartInput,
    ) -> Result<Operation> {
        let upload_id = check_required("upload_id", input.upload_id)?;

        Ok(self
            .object_operation("List Multipart", Method::GET, key)
            .with_param("upload_id", upload_id)
            .with_param_opt("limit", input.limit)
            .with_param_opt("part_number_marker", input.part_number_marker))
    }

    /// List uploaded parts of a multipart upload.
    pub async fn list_multipart(&self, key: &str, input: ListMultipartInput) -> Result<Output> {
        self.send(self.list_multipart_operation(key, input)?).await
    }

    pub fn complete_multipart_upload_operation(
        &self,
        key: &str,
        input: CompleteMultipartUploadInput,
    ) -> Result<Operation> {
        let upload_id = check_required("upload_id", input.upload_id)?;
        check_not_empty("object_parts", &input.object_parts)?;

        Ok(self
            .object_operation("Complete multipart upload", Method::POST, key)
            .with_param("upload_id", upload_id)
            .with_header_opt("ETag", input.etag)
            .with_elements(json!({ "object_parts": input.object_parts })))
    }

    pub async fn complete_multipart_upload(
        &self,
        key: &str,
        input: CompleteMultipartUploadInput,
    ) -> Result<Output> {
        self.send(self.complete_multipart_upload_operation(key, input)?).await
    }

    pub fn abort_multipart_upload_operation(
        &self,
        key: &str,
        upload_id: &str,
    ) -> Result<Operation> {
        let upload_id = check_required("upload_id", Some(upload_id).filter(|v| !v.is_empty()))?;

        Ok(self
            .object_operation("Abort Multipart Upload", Method::DELETE, key)
            .with_param("upload_id", upload_id))
    }

    pub async fn abort_multipart_upload(&self, key: &str, upload_id: &str) -> Result<Output> {
        self.send(self.abort_multipart_upload_operation(key, upload_id)?).await
    }

    pub fn image_process_operation(
        &self,
        key: &str,
        input: ImageProcessInput,
    ) -> Result<Operation> {
        let action = check_required("action", input.action)?;

        Ok(self
            .operation(
                "Image Process",
                Method::GET,
                "/<bucket-name>/<object-key>?image",
            )
            .with_properties(self.properties(Some(key)))
            .with_param("action", action)
            .with_param_opt("response-cache-control", input.response_cache_control)
            .with_param_opt(
                "response-content-disposition",
                input.response_content_disposition,
            )
            .with_param_opt("response-content-encoding", input.response_content_encoding)
            .with_param_opt("response-content-language", input.response_content_language)
            .with_param_opt("response-content-type", input.response_content_type)
            .with_param_opt("response-expires", input.response_expires))
    }

    /// Process an image object on the fly.
    pub async fn image_process(&self, key: &str, input: ImageProcessInput) -> Result<Output> {
        self.send(self.image_process_operation(key, input)?).await
    }
}
