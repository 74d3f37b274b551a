use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use devmart_core::ProjectId;

/// Stored-file metadata for a project's downloadable assets.
///
/// The bytes live behind the file-storage boundary at `file_path`; this
/// record is the catalog-side pointer. The main file is what a completed
/// purchase downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub id: Uuid,
    pub project_id: ProjectId,
    pub file_name: String,
    pub file_path: String,
    pub file_size: Option<u64>,
    pub file_type: Option<String>,
    pub is_main_file: bool,
    pub created_at: DateTime<Utc>,
}

impl ProjectFile {
    pub fn new(
        project_id: ProjectId,
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            project_id,
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_size: None,
            file_type: None,
            is_main_file: false,
            created_at: now,
        }
    }

    pub fn main(mut self) -> Self {
        self.is_main_file = true;
        self
    }
}
