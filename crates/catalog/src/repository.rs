use chrono::Utc;
use serde_json::{Value as JsonValue, json};

use devmart_core::ProjectId;
use devmart_store::{Filter, OrderBy, RecordStore, StoreError};

use crate::file::ProjectFile;
use crate::project::{Project, ProjectDraft, ProjectUpdate};

const PROJECTS: &str = "projects";
const PROJECT_FILES: &str = "project_files";

/// Named remote procedure for the aggregate download counter.
pub const INCREMENT_DOWNLOADS_RPC: &str = "increment_downloads";

/// Typed access to the `projects` and `project_files` tables.
#[derive(Debug, Clone)]
pub struct ProjectRepository<S> {
    store: S,
}

impl<S: RecordStore> ProjectRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: ProjectDraft) -> Result<Project, StoreError> {
        let project = draft.into_project(Utc::now());
        let row = serde_json::to_value(&project)
            .map_err(|e| StoreError::decode(e.to_string()))?;

        let mut stored = self.store.insert(PROJECTS, vec![row]).await?;
        let stored = stored
            .pop()
            .ok_or_else(|| StoreError::transport("insert returned no rows"))?;
        decode_project(stored)
    }

    pub async fn get(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        let rows = self
            .store
            .select(PROJECTS, Filter::new().eq("id", id.to_string()), None)
            .await?;
        rows.into_iter().next().map(decode_project).transpose()
    }

    /// Full catalog, newest first.
    pub async fn list(&self) -> Result<Vec<Project>, StoreError> {
        let rows = self
            .store
            .select(PROJECTS, Filter::new(), Some(OrderBy::desc("created_at")))
            .await?;
        rows.into_iter().map(decode_project).collect()
    }

    pub async fn list_featured(&self) -> Result<Vec<Project>, StoreError> {
        let rows = self
            .store
            .select(
                PROJECTS,
                Filter::new().eq("featured", true),
                Some(OrderBy::desc("created_at")),
            )
            .await?;
        rows.into_iter().map(decode_project).collect()
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Project>, StoreError> {
        let rows = self
            .store
            .select(
                PROJECTS,
                Filter::new().eq("category", category),
                Some(OrderBy::desc("created_at")),
            )
            .await?;
        rows.into_iter().map(decode_project).collect()
    }

    /// Apply a partial update; returns the updated project, or `None` when
    /// the id matched nothing.
    pub async fn update(
        &self,
        id: ProjectId,
        update: ProjectUpdate,
    ) -> Result<Option<Project>, StoreError> {
        if !update.is_empty() {
            let mut patch = serde_json::to_value(&update)
                .map_err(|e| StoreError::decode(e.to_string()))?;
            patch["updated_at"] = json!(Utc::now());

            self.store
                .update(PROJECTS, patch, Filter::new().eq("id", id.to_string()))
                .await?;
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: ProjectId) -> Result<bool, StoreError> {
        let removed = self
            .store
            .delete(PROJECTS, Filter::new().eq("id", id.to_string()))
            .await?;
        Ok(removed > 0)
    }

    /// Bump the aggregate `downloads` counter by one.
    ///
    /// Prefers the store's atomic-increment procedure; falls back to a
    /// client-computed read-modify-write when the store has no such hook.
    pub async fn increment_downloads(&self, id: ProjectId) -> Result<(), StoreError> {
        let rpc_result = self
            .store
            .rpc(INCREMENT_DOWNLOADS_RPC, json!({"project_id": id.to_string()}))
            .await;

        match rpc_result {
            Ok(_) => Ok(()),
            Err(StoreError::UnsupportedRpc(_)) => {
                let Some(project) = self.get(id).await? else {
                    return Err(StoreError::validation(format!("no project with id {id}")));
                };
                self.store
                    .update(
                        PROJECTS,
                        json!({"downloads": project.downloads + 1, "updated_at": Utc::now()}),
                        Filter::new().eq("id", id.to_string()),
                    )
                    .await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn add_file(&self, file: ProjectFile) -> Result<ProjectFile, StoreError> {
        let row = serde_json::to_value(&file)
            .map_err(|e| StoreError::decode(e.to_string()))?;
        let mut stored = self.store.insert(PROJECT_FILES, vec![row]).await?;
        let stored = stored
            .pop()
            .ok_or_else(|| StoreError::transport("insert returned no rows"))?;
        serde_json::from_value(stored).map_err(|e| StoreError::decode(e.to_string()))
    }

    pub async fn list_files(&self, project_id: ProjectId) -> Result<Vec<ProjectFile>, StoreError> {
        let rows = self
            .store
            .select(
                PROJECT_FILES,
                Filter::new().eq("project_id", project_id.to_string()),
                None,
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(|e| StoreError::decode(e.to_string())))
            .collect()
    }

    /// The file a completed purchase downloads, when one is designated.
    pub async fn main_file(&self, project_id: ProjectId) -> Result<Option<ProjectFile>, StoreError> {
        let files = self.list_files(project_id).await?;
        Ok(files.into_iter().find(|f| f.is_main_file))
    }
}

fn decode_project(row: JsonValue) -> Result<Project, StoreError> {
    serde_json::from_value(row).map_err(|e| StoreError::decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Difficulty;
    use devmart_store::InMemoryRecordStore;
    use std::sync::Arc;

    fn draft(title: &str) -> ProjectDraft {
        ProjectDraft {
            title: title.to_string(),
            price: 24_999,
            description: "desc".to_string(),
            long_description: "long desc".to_string(),
            category: "web".to_string(),
            tech_stack: vec!["rust".to_string()],
            tags: vec![],
            features: vec![],
            demo_url: None,
            github_url: None,
            license: "Commercial".to_string(),
            difficulty: Difficulty::Beginner,
            images: vec![],
            version: "1.0.0".to_string(),
            featured: false,
        }
    }

    fn repo() -> ProjectRepository<Arc<InMemoryRecordStore>> {
        ProjectRepository::new(Arc::new(InMemoryRecordStore::new()))
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = repo();
        let created = repo.create(draft("Taskboard")).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.downloads, 0);
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let repo = repo();
        assert!(repo.get(ProjectId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_patches_only_set_fields() {
        let repo = repo();
        let created = repo.create(draft("Taskboard")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                ProjectUpdate {
                    price: Some(9_999),
                    featured: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.price, 9_999);
        assert!(updated.featured);
        assert_eq!(updated.title, "Taskboard");
    }

    #[tokio::test]
    async fn list_featured_filters() {
        let repo = repo();
        repo.create(draft("Plain")).await.unwrap();
        let featured = repo
            .create(ProjectDraft {
                featured: true,
                ..draft("Starred")
            })
            .await
            .unwrap();

        let listed = repo.list_featured().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, featured.id);
    }

    #[tokio::test]
    async fn delete_removes_project() {
        let repo = repo();
        let created = repo.create(draft("Taskboard")).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn increment_downloads_falls_back_without_rpc() {
        let repo = repo();
        let created = repo.create(draft("Taskboard")).await.unwrap();

        repo.increment_downloads(created.id).await.unwrap();
        repo.increment_downloads(created.id).await.unwrap();

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.downloads, 2);
    }

    #[tokio::test]
    async fn increment_downloads_uses_rpc_when_registered() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.register_rpc(
            INCREMENT_DOWNLOADS_RPC,
            Box::new(|tables, args| {
                let id = args["project_id"].as_str().unwrap_or_default().to_string();
                for row in tables.entry("projects".to_string()).or_default() {
                    if row["id"].as_str() == Some(id.as_str()) {
                        let next = row["downloads"].as_u64().unwrap_or(0) + 10;
                        row["downloads"] = serde_json::json!(next);
                    }
                }
                Ok(serde_json::Value::Null)
            }),
        );

        let repo = ProjectRepository::new(store);
        let created = repo.create(draft("Taskboard")).await.unwrap();
        repo.increment_downloads(created.id).await.unwrap();

        // The +10 handler proves the rpc path ran instead of the fallback.
        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.downloads, 10);
    }

    #[tokio::test]
    async fn main_file_is_found_among_files() {
        let repo = repo();
        let project = repo.create(draft("Taskboard")).await.unwrap();

        let now = Utc::now();
        repo.add_file(ProjectFile::new(project.id, "readme.md", "p/readme.md", now))
            .await
            .unwrap();
        repo.add_file(ProjectFile::new(project.id, "bundle.zip", "p/bundle.zip", now).main())
            .await
            .unwrap();

        let main = repo.main_file(project.id).await.unwrap().unwrap();
        assert_eq!(main.file_name, "bundle.zip");
    }
}
