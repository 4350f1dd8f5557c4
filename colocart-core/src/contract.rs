//! # contract: interface between the directory uploader and a storage backend
//!
//! This module defines a single trait ([`Uploader`]) and the plain data types
//! that cross it. The CLI crate implements it against S3; tests use the
//! `mockall`-generated `MockUploader`.
//!
//! ## Error handling
//! Backend errors are returned as [`BoxError`] and passed through untouched:
//! credential, network and missing-bucket failures all surface to the caller.

use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Boxed error returned across the uploader boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single object to store in the bucket.
#[derive(Debug, Clone)]
pub struct NewObject {
    /// Destination bucket name.
    pub bucket: String,
    /// Remote key, relative to the build directory, `/`-separated.
    pub key: String,
    /// MIME type sent as the object's `Content-Type`.
    pub content_type: String,
    /// Local file to stream as the object body.
    pub local_path: PathBuf,
    /// Size of `local_path` in bytes when it was queued.
    pub size: u64,
}

/// Describes an object after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UploadedObject {
    pub key: String,
    pub content_type: String,
    pub size: u64,
    pub local_path: PathBuf,
}

/// Trait for storing objects in a bucket.
///
/// The implementor owns the connection and credentials; the credential profile
/// is chosen when the implementor is constructed, never looked up here.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Uploader: Send + Sync {
    /// Create or overwrite a single object.
    async fn put_object(&self, req: NewObject) -> Result<(), BoxError>;
}
