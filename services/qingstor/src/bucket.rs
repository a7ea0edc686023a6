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

use std::time::Duration;

use http::Method;
use qingstor_core::Result;
use serde_json::json;

use crate::constants::CONTENT_MD5;
use crate::operation::{Operation, Properties};
use crate::output::Output;
use crate::types::*;
use crate::QingStor;

const BUCKET: &str = "/<bucket-name>";

/// Options of List Objects.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsInput {
    pub delimiter: Option<String>,
    pub limit: Option<i64>,
    pub marker: Option<String>,
    pub prefix: Option<String>,
}

/// Options of List Multipart Uploads.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsInput {
    pub delimiter: Option<String>,
    pub key_marker: Option<String>,
    pub limit: Option<i64>,
    pub prefix: Option<String>,
    pub upload_id_marker: Option<String>,
}

/// Input of Delete Multiple Objects.
#[derive(Debug, Clone, Default)]
pub struct DeleteMultipleObjectsInput {
    /// MD5 of the request body, required by the service.
    pub content_md5: Option<String>,
    pub objects: Vec<KeyToDelete>,
    pub quiet: Option<bool>,
}

/// Bucket is a handle to a bucket in a zone.
///
/// Every operation comes in two flavors: `xxx_operation` builds the
/// [`Operation`] which can be handed to [`Bucket::presign`], `xxx` sends it.
#[derive(Debug, Clone)]
pub struct Bucket {
    client: QingStor,
    name: String,
    zone: String,
}

impl Bucket {
    pub(crate) fn new(client: QingStor, name: String, zone: String) -> Self {
        Self { client, name, zone }
    }

    /// Bucket name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zone of the bucket.
    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub(crate) fn properties(&self, object_key: Option<&str>) -> Properties {
        Properties {
            zone: Some(self.zone.clone()),
            bucket_name: Some(self.name.clone()),
            object_key: object_key.map(|v| v.to_string()),
        }
    }

    pub(crate) fn operation(
        &self,
        api_name: &'static str,
        method: Method,
        template: &str,
    ) -> Operation {
        Operation::new(api_name, method, template).with_properties(self.properties(None))
    }

    /// Send an operation through the client.
    pub async fn send(&self, op: Operation) -> Result<Output> {
        self.client.send(op).await
    }

    /// Turn an operation into a presigned url valid for `expires_in`.
    pub async fn presign(&self, op: Operation, expires_in: Duration) -> Result<String> {
        self.client.presign(op, expires_in).await
    }

    pub fn put_operation(&self) -> Operation {
        self.operation("Put Bucket", Method::PUT, BUCKET)
    }

    /// Create the bucket.
    pub async fn put(&self) -> Result<Output> {
        self.send(self.put_operation()).await
    }

    pub fn delete_operation(&self) -> Operation {
        self.operation("Delete Bucket", Method::DELETE, BUCKET)
    }

    /// Delete the bucket, it must be empty.
    pub async fn delete(&self) -> Result<Output> {
        self.send(self.delete_operation()).await
    }

    pub fn head_operation(&self) -> Operation {
        self.operation("Head Bucket", Method::HEAD, BUCKET)
    }

    /// Check whether the bucket exists and is accessible.
    pub async fn head(&self) -> Result<Output> {
        self.send(self.head_operation()).await
    }

    pub fn list_objects_operation(&self, input: ListObjectsInput) -> Operation {
        self.operation("Get Bucket (List Objects)", Method::GET, BUCKET)
            .with_param_opt("delimiter", input.delimiter)
            .with_param_opt("limit", input.limit)
            .with_param_opt("marker", input.marker)
            .with_param_opt("prefix", input.prefix)
    }

    /// List objects in the bucket.
    pub async fn list_objects(&self, input: ListObjectsInput) -> Result<Output> {
        self.send(self.list_objects_operation(input)).await
    }

    pub fn get_statistics_operation(&self) -> Operation {
        self.operation("Get Bucket Statistics", Method::GET, "/<bucket-name>?stats")
    }

    /// Get count and size of the bucket.
    pub async fn get_statistics(&self) -> Result<Output> {
        self.send(self.get_statistics_operation()).await
    }

    pub fn delete_multiple_objects_operation(
        &self,
        input: DeleteMultipleObjectsInput,
    ) -> Result<Operation> {
        let content_md5 = check_required("Content-MD5", input.content_md5)?;
        check_not_empty("objects", &input.objects)?;
        if input.objects.iter().any(|o| o.key.is_empty()) {
            return Err(qingstor_core::Error::request_invalid(
                "key of objects must not be empty",
            ));
        }

        let mut elements = json!({ "objects": input.objects });
        if let Some(quiet) = input.quiet {
            elements["quiet"] = json!(quiet);
        }

        Ok(
            self.operation("Delete Multiple Objects", Method::POST, "/<bucket-name>?delete")
                .with_header(CONTENT_MD5, content_md5)
                .with_elements(elements),
        )
    }

    /// Delete up to 1000 objects in one call.
    pub async fn delete_multiple_objects(
        &self,
        input: DeleteMultipleObjectsInput,
    ) -> Result<Output> {
        self.send(self.delete_multiple_objects_operation(input)?)
            .await
    }

    pub fn list_multipart_uploads_operation(&self, input: ListMultipartUploadsInput) -> Operation {
        self.operation("List Multipart Uploads", Method::GET, "/<bucket-name>?uploads")
            .with_param_opt("delimiter", input.delimiter)
            .with_param_opt("key_marker", input.key_marker)
            .with_param_opt("limit", input.limit)
            .with_param_opt("prefix", input.prefix)
            .with_param_opt("upload_id_marker", input.upload_id_marker)
    }

    /// List multipart uploads in progress.
    pub async fn list_multipart_uploads(&self, input: ListMultipartUploadsInput) -> Result<Output> {
        self.send(self.list_multipart_uploads_operation(input))
            .await
    }

    pub fn get_acl_operation(&self) -> Operation {
        self.operation("Get Bucket ACL", Method::GET, "/<bucket-name>?acl")
    }

    pub async fn get_acl(&self) -> Result<Output> {
        self.send(self.get_acl_operation()).await
    }

    pub fn put_acl_operation(&self, acl: Vec<Acl>) -> Result<Operation> {
        check_not_empty("acl", &acl)?;
        for v in &acl {
            v.validate()?;
        }

        Ok(self
            .operation("Put Bucket ACL", Method::PUT, "/<bucket-name>?acl")
            .with_elements(json!({ "acl": acl })))
    }

    /// Replace the ACL of the bucket.
    pub async fn put_acl(&self, acl: Vec<Acl>) -> Result<Output> {
        self.send(self.put_acl_operation(acl)?).await
    }

    pub fn get_cors_operation(&self) -> Operation {
        self.operation("Get Bucket CORS", Method::GET, "/<bucket-name>?cors")
    }

    pub async fn get_cors(&self) -> Result<Output> {
        self.send(self.get_cors_operation()).await
    }

    pub fn put_cors_operation(&self, rules: Vec<CorsRule>) -> Result<Operation> {
        check_not_empty("cors_rules", &rules)?;
        for v in &rules {
            v.validate()?;
        }

        Ok(self
            .operation("Put Bucket CORS", Method::PUT, "/<bucket-name>?cors")
            .with_elements(json!({ "cors_rules": rules })))
    }

    pub async fn put_cors(&self, rules: Vec<CorsRule>) -> Result<Output> {
        self.send(self.put_cors_operation(rules)?).await
    }

    pub fn delete_cors_operation(&self) -> Operation {
        self.operation("Delete Bucket CORS", Method::DELETE, "/<bucket-name>?cors")
    }

    pub async fn delete_cors(&self) -> Result<Output> {
        self.send(self.delete_cors_operation()).await
    }

    pub fn get_policy_operation(&self) -> Operation {
        self.operation("Get Bucket Policy", Method::GET, "/<bucket-name>?policy")
    }

    pub async fn get_policy(&self) -> Result<Output> {
        self.send(self.get_policy_operation()).await
    }

    pub fn put_policy_operation(&self, statement: Vec<Statement>) -> Result<Operation> {
        check_not_empty("statement", &statement)?;
        for v in &statement {
            v.validate()?;
        }

        Ok(self
            .operation("Put Bucket Policy", Method::PUT, "/<bucket-name>?policy")
            .with_elements(json!({ "statement": statement })))
    }

    pub async fn put_policy(&self, statement: Vec<Statement>) -> Result<Output> {
        self.send(self.put_policy_operation(statement)?).await
    }

    pub fn delete_policy_operation(&self) -> Operation {
        self.operation("Delete Bucket Policy", Method::DELETE, "/<bucket-name>?policy")
    }

    pub async fn delete_policy(&self) -> Result<Output> {
        self.send(self.delete_policy_operation()).await
    }

    pub fn get_lifecycle_operation(&self) -> Operation {
        self.operation("Get Bucket Lifecycle", Method::GET, "/<bucket-name>?lifecycle")
    }

    pub async fn get_lifecycle(&self) -> Result<Output> {
        self.send(self.get_lifecycle_operation()).await
    }

    pub fn put_lifecycle_operation(&self, rule: Vec<LifecycleRule>) -> Result<Operation> {
        check_not_empty("rule", &rule)?;
        for v in &rule {
            v.validate()?;
        }

        Ok(self
            .operation("Put Bucket Lifecycle", Method::PUT, "/<bucket-name>?lifecycle")
            .with_elements(json!({ "rule": rule })))
    }

    pub async fn put_lifecycle(&self, rule: Vec<LifecycleRule>) -> Result<Output> {
        self.send(self.put_lifecycle_operation(rule)?).await
    }

    pub fn delete_lifecycle_operation(&self) -> Operation {
        self.operation(
            "Delete Bucket Lifecycle",
            Method::DELETE,
            "/<bucket-name>?lifecycle",
        )
    }

    pub async fn delete_lifecycle(&self) -> Result<Output> {
        self.send(self.delete_lifecycle_operation()).await
    }

    pub fn get_notification_operation(&self) -> Operation {
        self.operation(
            "Get Bucket Notification",
            Method::GET,
            "/<bucket-name>?notification",
        )
    }

    pub async fn get_notification(&self) -> Result<Output> {
        self.send(self.get_notification_operation()).await
    }

    pub fn put_notification_operation(
        &self,
        notifications: Vec<NotificationRule>,
    ) -> Result<Operation> {
        check_not_empty("notifications", &notifications)?;
        for v in &notifications {
            v.validate()?;
        }

        Ok(self
            .operation(
                "Put Bucket Notification",
                Method::PUT,
                "/<bucket-name>?notification",
            )
            .with_elements(json!({ "notifications": notifications })))
    }

    pub async fn put_notification(&self, notifications: Vec<NotificationRule>) -> Result<Output> {
        self.send(self.put_notification_operation(notifications)?)
            .await
    }

    pub fn delete_notification_operation(&self) -> Operation {
        self.operation(
            "Delete Bucket Notification",
            Method::DELETE,
            "/<bucket-name>?notification",
        )
    }

    pub async fn delete_notification(&self) -> Result<Output> {
        self.send(self.delete_notification_operation()).await
    }

    pub fn get_external_mirror_operation(&self) -> Operation {
        self.operation(
            "Get Bucket External Mirror",
            Method::GET,
            "/<bucket-name>?mirror",
        )
    }

    pub async fn get_external_mirror(&self) -> Result<Output> {
        self.send(self.get_external_mirror_operation()).await
    }

    pub fn put_external_mirror_operation(&self, source_site: &str) -> Result<Operation> {
        if source_site.is_empty() {
            return Err(qingstor_core::Error::request_invalid(
                "source_site is required",
            ));
        }

        Ok(self
            .operation(
                "Put Bucket External Mirror",
                Method::PUT,
                "/<bucket-name>?mirror",
            )
            .with_elements(json!({ "source_site": source_site })))
    }

    pub async fn put_external_mirror(&self, source_site: &str) -> Result<Output> {
        self.send(self.put_external_mirror_operation(source_site)?)
            .await
    }

    pub fn delete_external_mirror_operation(&self) -> Operation {
        self.operation(
            "Delete Bucket External Mirror",
            Method::DELETE,
            "/<bucket-name>?mirror",
        )
    }

    pub async fn delete_external_mirror(&self) -> Result<Output> {
        self.send(self.delete_external_mirror_operation()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use pretty_assertions::assert_eq;
    use qingstor_core::{Context, ErrorKind};

    fn bucket() -> Bucket {
        let config = Config::new()
            .with_access_key_id("test_access_key")
            .with_secret_access_key("test_secret");
        QingStor::new(Context::new(), config)
            .unwrap()
            .bucket("test", "pek3b")
    }

    #[test]
    fn test_list_objects_operation() {
        let op = bucket().list_objects_operation(ListObjectsInput {
            limit: Some(10),
            prefix: Some("photos/".to_string()),
            ..Default::default()
        });
        assert_eq!(Method::GET, op.method);
        assert_eq!(
            vec![
                ("limit".to_string(), "10".to_string()),
                ("prefix".to_string(), "photos/".to_string()),
            ],
            op.params
        );
        assert_eq!(Some("test"), op.properties.bucket_name.as_deref());
        assert_eq!(Some("pek3b"), op.properties.zone.as_deref());
    }

    #[test]
    fn test_delete_multiple_objects_requires_md5() {
        let err = bucket()
            .delete_multiple_objects_operation(DeleteMultipleObjectsInput {
                objects: vec![KeyToDelete {
                    key: "a.txt".to_string(),
                }],
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(ErrorKind::RequestInvalid, err.kind());
    }

    #[test]
    fn test_delete_multiple_objects_operation() -> Result<()> {
        let op = bucket().delete_multiple_objects_operation(DeleteMultipleObjectsInput {
            content_md5: Some("Oc3jD/4w3EJ3zGT5nEbrXw==".to_string()),
            objects: vec![KeyToDelete {
                key: "a.txt".to_string(),
            }],
            quiet: Some(true),
        })?;
        assert_eq!(
            Some(json!({"objects": [{"key": "a.txt"}], "quiet": true})),
            op.elements
        );
        assert_eq!(
            vec![(CONTENT_MD5.to_string(), "Oc3jD/4w3EJ3zGT5nEbrXw==".to_string())],
            op.headers
        );
        Ok(())
    }

    #[test]
    fn test_put_acl_validates() {
        let err = bucket()
            .put_acl_operation(vec![Acl {
                grantee: Grantee {
                    grantee_type: "group".to_string(),
                    id: None,
                    name: Some("QS_ALL_USERS".to_string()),
                },
                permission: "DELETE".to_string(),
            }])
            .unwrap_err();
        assert_eq!(ErrorKind::RequestInvalid, err.kind());

        assert!(bucket().put_acl_operation(vec![]).is_err());
    }

    #[test]
    fn test_put_policy_operation() -> Result<()> {
        let op = bucket().put_policy_operation(vec![Statement {
            id: "allow all".to_string(),
            effect: "allow".to_string(),
            user: vec!["*".to_string()],
            action: vec!["get_object".to_string()],
            resource: Some(vec!["test/*".to_string()]),
            condition: None,
        }])?;
        assert_eq!("/<bucket-name>?policy", op.uri_template);
        assert_eq!(
            Some(json!({"statement": [{
                "id": "allow all",
                "effect": "allow",
                "user": ["*"],
                "action": ["get_object"],
                "resource": ["test/*"],
            }]})),
            op.elements
        );
        Ok(())
    }

    #[test]
    fn test_put_external_mirror_requires_source() {
        assert!(bucket().put_external_mirror_operation("").is_err());
    }
}
