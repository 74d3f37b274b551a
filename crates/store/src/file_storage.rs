use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

/// File storage operation error.
#[derive(Debug, Error)]
pub enum FileStorageError {
    #[error("no object at path: {0}")]
    NotFound(String),

    #[error("storage transport failure: {0}")]
    Transport(String),
}

/// Path-addressed object storage boundary.
///
/// The purchase workflow's download operation hands off to this boundary;
/// the transfer itself happens outside the core.
#[async_trait]
pub trait FileStorage: Send + Sync {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), FileStorageError>;

    /// Resolve a fetchable URL for a stored object.
    async fn get_url(&self, path: &str) -> Result<String, FileStorageError>;

    async fn delete(&self, path: &str) -> Result<(), FileStorageError>;
}

/// In-memory file storage for dev/tests.
#[derive(Debug, Default)]
pub struct InMemoryFileStorage {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> FileStorageError {
        FileStorageError::Transport("lock poisoned".to_string())
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<(), FileStorageError> {
        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        objects.insert(path.to_string(), bytes);
        Ok(())
    }

    async fn get_url(&self, path: &str) -> Result<String, FileStorageError> {
        let objects = self.objects.read().map_err(|_| Self::poisoned())?;
        if objects.contains_key(path) {
            Ok(format!("memory://project-files/{path}"))
        } else {
            Err(FileStorageError::NotFound(path.to_string()))
        }
    }

    async fn delete(&self, path: &str) -> Result<(), FileStorageError> {
        let mut objects = self.objects.write().map_err(|_| Self::poisoned())?;
        objects.remove(path);
        Ok(())
    }
}
