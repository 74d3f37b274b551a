use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use devmart_core::SubmissionId;
use devmart_store::{Filter, OrderBy, RecordStore, StoreError};

const CONTACT_SUBMISSIONS: &str = "contact_submissions";

/// Triage status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    InProgress,
    Resolved,
}

/// Triage priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A custom-project contact request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: SubmissionId,
    pub name: String,
    pub email: String,
    pub project_type: String,
    pub tech_stack: Option<String>,
    pub project_details: String,
    pub budget: Option<String>,
    pub deadline: Option<String>,
    pub status: SubmissionStatus,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What the public form collects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    pub name: String,
    pub email: String,
    pub project_type: String,
    pub tech_stack: Option<String>,
    pub project_details: String,
    pub budget: Option<String>,
    pub deadline: Option<String>,
}

impl SubmissionDraft {
    /// New submissions start pending at medium priority.
    pub fn into_submission(self, now: DateTime<Utc>) -> ContactSubmission {
        ContactSubmission {
            id: SubmissionId::new(),
            name: self.name,
            email: self.email,
            project_type: self.project_type,
            tech_stack: self.tech_stack,
            project_details: self.project_details,
            budget: self.budget,
            deadline: self.deadline,
            status: SubmissionStatus::Pending,
            priority: Priority::Medium,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Typed access to the `contact_submissions` table.
#[derive(Debug, Clone)]
pub struct ContactRepository<S> {
    store: S,
}

impl<S: RecordStore> ContactRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn submit(&self, draft: SubmissionDraft) -> Result<ContactSubmission, StoreError> {
        let submission = draft.into_submission(Utc::now());
        let row = serde_json::to_value(&submission)
            .map_err(|e| StoreError::decode(e.to_string()))?;
        self.store.insert(CONTACT_SUBMISSIONS, vec![row]).await?;
        Ok(submission)
    }

    pub async fn get(&self, id: SubmissionId) -> Result<Option<ContactSubmission>, StoreError> {
        let rows = self
            .store
            .select(
                CONTACT_SUBMISSIONS,
                Filter::new().eq("id", id.to_string()),
                None,
            )
            .await?;
        rows.into_iter()
            .next()
            .map(|r| serde_json::from_value(r).map_err(|e| StoreError::decode(e.to_string())))
            .transpose()
    }

    /// All submissions, newest first (the admin triage queue).
    pub async fn list(&self) -> Result<Vec<ContactSubmission>, StoreError> {
        let rows = self
            .store
            .select(
                CONTACT_SUBMISSIONS,
                Filter::new(),
                Some(OrderBy::desc("created_at")),
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(|e| StoreError::decode(e.to_string())))
            .collect()
    }

    /// Admin triage: move status and/or priority.
    pub async fn triage(
        &self,
        id: SubmissionId,
        status: Option<SubmissionStatus>,
        priority: Option<Priority>,
    ) -> Result<Option<ContactSubmission>, StoreError> {
        let mut patch = json!({"updated_at": Utc::now()});
        if let Some(status) = status {
            patch["status"] = serde_json::to_value(status)
                .map_err(|e| StoreError::decode(e.to_string()))?;
        }
        if let Some(priority) = priority {
            patch["priority"] = serde_json::to_value(priority)
                .map_err(|e| StoreError::decode(e.to_string()))?;
        }

        self.store
            .update(CONTACT_SUBMISSIONS, patch, Filter::new().eq("id", id.to_string()))
            .await?;
        self.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devmart_store::InMemoryRecordStore;
    use std::sync::Arc;

    fn draft() -> SubmissionDraft {
        SubmissionDraft {
            name: "A B".to_string(),
            email: "a@b.com".to_string(),
            project_type: "web".to_string(),
            tech_stack: Some("rust".to_string()),
            project_details: "Need a storefront".to_string(),
            budget: None,
            deadline: None,
        }
    }

    fn repo() -> ContactRepository<Arc<InMemoryRecordStore>> {
        ContactRepository::new(Arc::new(InMemoryRecordStore::new()))
    }

    #[tokio::test]
    async fn new_submissions_start_pending_at_medium() {
        let repo = repo();
        let submitted = repo.submit(draft()).await.unwrap();

        assert_eq!(submitted.status, SubmissionStatus::Pending);
        assert_eq!(submitted.priority, Priority::Medium);

        let fetched = repo.get(submitted.id).await.unwrap().unwrap();
        assert_eq!(fetched, submitted);
    }

    #[tokio::test]
    async fn triage_moves_status_and_priority() {
        let repo = repo();
        let submitted = repo.submit(draft()).await.unwrap();

        let triaged = repo
            .triage(
                submitted.id,
                Some(SubmissionStatus::InProgress),
                Some(Priority::High),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(triaged.status, SubmissionStatus::InProgress);
        assert_eq!(triaged.priority, Priority::High);
    }

    #[tokio::test]
    async fn triage_with_only_status_keeps_priority() {
        let repo = repo();
        let submitted = repo.submit(draft()).await.unwrap();

        let triaged = repo
            .triage(submitted.id, Some(SubmissionStatus::Resolved), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(triaged.status, SubmissionStatus::Resolved);
        assert_eq!(triaged.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn triage_unknown_submission_is_none() {
        let repo = repo();
        let result = repo
            .triage(SubmissionId::new(), Some(SubmissionStatus::Resolved), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
