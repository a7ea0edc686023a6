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

//! Tokio-based file reading implementation for the QingStor SDK.
//!
//! This crate provides `TokioFileRead`, an async file reader that implements
//! the `FileRead` trait from `qingstor_core` using Tokio's file system operations.
//!
//! The QingStor SDK uses it to load the YAML config file
//! (`~/.qingstor/config.yaml` by default).
//!
//! ## Example
//!
//! ```no_run
//! use qingstor_core::{Context, OsEnv};
//! use qingstor_file_read_tokio::TokioFileRead;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_env(OsEnv);
//!
//!     match ctx.file_read("/etc/qingstor/config.yaml").await {
//!         Ok(content) => println!("Read {} bytes", content.len()),
//!         Err(e) => eprintln!("Failed to read file: {}", e),
//!     }
//! }
//! ```

use async_trait::async_trait;
use qingstor_core::{Error, FileRead, Result};

/// Tokio-based implementation of the `FileRead` trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFileRead;

#[async_trait]
impl FileRead for TokioFileRead {
    async fn file_read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::unexpected(format!("failed to read file {path}")).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qingstor_core::Context;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_read() -> Result<()> {
        let mut f = tempfile::NamedTempFile::new()?;
        f.write_all(b"access_key_id: 'ACCESS_KEY_ID'\n")?;

        let ctx = Context::new().with_file_read(TokioFileRead);
        let path = f.path().to_string_lossy().to_string();
        let content = ctx.file_read_as_string(&path).await?;
        assert_eq!("access_key_id: 'ACCESS_KEY_ID'\n", content);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_read_not_found() {
        let ctx = Context::new().with_file_read(TokioFileRead);
        let err = ctx
            .file_read("/this/path/should/not/exist/config.yaml")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read file"));
    }
}
