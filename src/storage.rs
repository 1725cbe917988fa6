//! Object storage for generated documents.
//!
//! Uploads are upserts: writing the same path twice replaces the artifact,
//! so repeated bill generation never accumulates duplicate files. The
//! filesystem store is served publicly under `/files` by the HTTP layer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::errors::ServiceError;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` at `path`, replacing any existing artifact.
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<(), ServiceError>;

    /// Publicly resolvable URL for an artifact at `path`.
    fn public_url(&self, path: &str) -> String;
}

/// Filesystem-backed store rooted at a configured directory.
pub struct FsObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ServiceError> {
        // Artifact paths are internal, but reject traversal anyway.
        let rel = Path::new(path);
        if rel.components().any(|c| {
            matches!(
                c,
                std::path::Component::ParentDir | std::path::Component::RootDir
            )
        }) {
            return Err(ServiceError::StorageError(format!(
                "Invalid artifact path: {path}"
            )));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    #[instrument(skip(self, bytes), fields(path = %path, size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), ServiceError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::StorageError(format!("Failed to create {parent:?}: {e}")))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| ServiceError::StorageError(format!("Failed to write {target:?}: {e}")))?;
        debug!("Stored artifact at {:?}", target);
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/files/{}",
            self.public_base_url.trim_end_matches('/'),
            path
        )
    }
}
