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

//! Documents exchanged with the QingStor API.

use qingstor_core::{Error, Result};
use serde::{Deserialize, Serialize};

pub(crate) fn check_required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| Error::request_invalid(format!("{field} is required")))
}

pub(crate) fn check_not_empty<T>(field: &str, value: &[T]) -> Result<()> {
    if value.is_empty() {
        return Err(Error::request_invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

pub(crate) fn check_enum(field: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(Error::request_invalid(format!(
            "{field} must be one of {allowed:?}, got {value:?}"
        )));
    }
    Ok(())
}

/// Owner of a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Who an ACL entry applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grantee {
    /// `user` or `group`.
    #[serde(rename = "type")]
    pub grantee_type: String,
    /// User id, required when type is `user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Group name, required when type is `group`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Grantee {
    pub(crate) fn validate(&self) -> Result<()> {
        check_enum("grantee type", &self.grantee_type, &["user", "group"])?;
        match self.grantee_type.as_str() {
            "user" => check_required("grantee id", self.id.as_ref()).map(|_| ()),
            _ => check_required("grantee name", self.name.as_ref()).map(|_| ()),
        }
    }
}

/// A single ACL entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    pub grantee: Grantee,
    /// `READ`, `WRITE` or `FULL_CONTROL`.
    pub permission: String,
}

impl Acl {
    pub(crate) fn validate(&self) -> Result<()> {
        self.grantee.validate()?;
        check_enum(
            "permission",
            &self.permission,
            &["READ", "WRITE", "FULL_CONTROL"],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorsRule {
    pub allowed_origin: String,
    pub allowed_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_headers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_seconds: Option<i64>,
}

impl CorsRule {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.allowed_origin.is_empty() {
            return Err(Error::request_invalid("allowed_origin is required"));
        }
        check_not_empty("allowed_methods", &self.allowed_methods)
    }
}

/// A bucket policy statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub id: String,
    /// `allow` or `deny`.
    pub effect: String,
    pub user: Vec<String>,
    pub action: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
}

impl Statement {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::request_invalid("statement id is required"));
        }
        check_enum("effect", &self.effect, &["allow", "deny"])?;
        check_not_empty("user", &self.user)?;
        check_not_empty("action", &self.action)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub prefix: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expiration {
    pub days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortIncompleteMultipartUpload {
    pub days_after_initiation: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub days: i64,
    pub storage_class: i64,
}

/// A lifecycle rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleRule {
    pub id: String,
    /// `enabled` or `disabled`.
    pub status: String,
    pub filter: Filter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Expiration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort_incomplete_multipart_upload: Option<AbortIncompleteMultipartUpload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<Transition>,
}

impl LifecycleRule {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::request_invalid("lifecycle rule id is required"));
        }
        check_enum("status", &self.status, &["enabled", "disabled"])
    }
}

/// A notification rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationRule {
    pub id: String,
    pub event_types: Vec<String>,
    pub cloudfunc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_filters: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudfunc_args: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
}

impl NotificationRule {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(Error::request_invalid("notification id is required"));
        }
        if self.cloudfunc.is_empty() {
            return Err(Error::request_invalid("cloudfunc is required"));
        }
        check_not_empty("event_types", &self.event_types)
    }
}

/// Key to delete in a multiple objects deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyToDelete {
    pub key: String,
}

/// An uploaded part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPart {
    pub part_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListBucketsOutput {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub buckets: Vec<BucketInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectInfo {
    pub key: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub modified: i64,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub storage_class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListObjectsOutput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub keys: Vec<ObjectInfo>,
    #[serde(default)]
    pub common_prefixes: Vec<String>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub delimiter: String,
    #[serde(default)]
    pub marker: String,
    #[serde(default)]
    pub next_marker: String,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub owner: Option<Owner>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetBucketAclOutput {
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(default)]
    pub acl: Vec<Acl>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GetBucketStatisticsOutput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub size: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InitiateMultipartUploadOutput {
    #[serde(default)]
    pub bucket: String,
    #[serde(default)]
    pub key: String,
    pub upload_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListMultipartOutput {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub object_parts: Vec<ObjectPart>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteMultipleObjectsOutput {
    #[serde(default)]
    pub deleted: Vec<KeyToDelete>,
    #[serde(default)]
    pub errors: Vec<DeleteError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteError {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qingstor_core::ErrorKind;
    use test_case::test_case;

    fn acl(grantee_type: &str, permission: &str) -> Acl {
        Acl {
            grantee: Grantee {
                grantee_type: grantee_type.to_string(),
                id: Some("usr-id".to_string()),
                name: Some("QS_ALL_USERS".to_string()),
            },
            permission: permission.to_string(),
        }
    }

    #[test_case("user", "READ", true; "user read")]
    #[test_case("group", "FULL_CONTROL", true; "group full control")]
    #[test_case("nobody", "READ", false; "bad grantee type")]
    #[test_case("user", "read", false; "permission is case sensitive")]
    fn test_acl_validate(grantee_type: &str, permission: &str, ok: bool) {
        assert_eq!(ok, acl(grantee_type, permission).validate().is_ok());
    }

    #[test]
    fn test_grantee_user_requires_id() {
        let grantee = Grantee {
            grantee_type: "user".to_string(),
            id: None,
            name: Some("name".to_string()),
        };
        let err = grantee.validate().unwrap_err();
        assert_eq!(ErrorKind::RequestInvalid, err.kind());
    }

    #[test]
    fn test_grantee_serialize() {
        let v = serde_json::to_value(acl("user", "READ")).unwrap();
        assert_eq!(
            serde_json::json!({
                "grantee": {"type": "user", "id": "usr-id", "name": "QS_ALL_USERS"},
                "permission": "READ"
            }),
            v
        );
    }

    #[test_case("allow", true; "allow")]
    #[test_case("deny", true; "deny")]
    #[test_case("Allow", false; "case sensitive")]
    fn test_statement_effect(effect: &str, ok: bool) {
        let statement = Statement {
            id: "allow all".to_string(),
            effect: effect.to_string(),
            user: vec!["*".to_string()],
            action: vec!["get_object".to_string()],
            ..Default::default()
        };
        assert_eq!(ok, statement.validate().is_ok());
    }

    #[test]
    fn test_lifecycle_rule_status() {
        let mut rule = LifecycleRule {
            id: "expire".to_string(),
            status: "enabled".to_string(),
            ..Default::default()
        };
        assert!(rule.validate().is_ok());

        rule.status = "paused".to_string();
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_list_objects_output() {
        let out: ListObjectsOutput = serde_json::from_str(
            r#"{"name":"test","keys":[{"key":"a.txt","size":3,"etag":"\"abc\""}],"has_more":true,"limit":1}"#,
        )
        .unwrap();
        assert_eq!("test", out.name);
        assert_eq!(1, out.keys.len());
        assert_eq!("a.txt", out.keys[0].key);
        assert!(out.has_more);
    }
}
