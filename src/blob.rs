//! Blob store collaborator: the only transport this engine depends on for
//! source documents.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {bucket}/{path}")]
    NotFound { bucket: String, path: String },

    #[error("Blob read failed for {bucket}/{path}: {reason}")]
    ReadFailed {
        bucket: String,
        path: String,
        reason: String,
    },
}

pub trait BlobStore {
    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, BlobError>;
}

/// Filesystem-backed store: a bucket is a directory under the root.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BlobStore for LocalBlobStore {
    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, BlobError> {
        // Reject path traversal out of the bucket directory
        let relative = std::path::Path::new(path);
        if relative.components().any(|c| {
            matches!(
                c,
                std::path::Component::ParentDir | std::path::Component::RootDir
            )
        }) {
            return Err(BlobError::NotFound {
                bucket: bucket.into(),
                path: path.into(),
            });
        }

        let full = self.root.join(bucket).join(relative);
        match std::fs::read(&full) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound {
                bucket: bucket.into(),
                path: path.into(),
            }),
            Err(e) => Err(BlobError::ReadFailed {
                bucket: bucket.into(),
                path: path.into(),
                reason: e.to_string(),
            }),
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, bucket: &str, path: &str, bytes: Vec<u8>) {
        self.blobs
            .lock()
            .expect("blob store lock poisoned")
            .insert((bucket.to_string(), path.to_string()), bytes);
    }
}

impl BlobStore for MemoryBlobStore {
    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, BlobError> {
        self.blobs
            .lock()
            .expect("blob store lock poisoned")
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| BlobError::NotFound {
                bucket: bucket.into(),
                path: path.into(),
            })
    }
}
