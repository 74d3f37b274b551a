use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use devmart_core::{ProjectId, UserId};
use devmart_store::{Filter, OrderBy, RecordStore, StoreError};

/// Which user collection a membership belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Wishlist,
    Cart,
}

impl CollectionKind {
    fn table(self) -> &'static str {
        match self {
            CollectionKind::Wishlist => "wishlist",
            CollectionKind::Cart => "cart",
        }
    }
}

/// One (user, project) membership row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: Uuid,
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub created_at: DateTime<Utc>,
}

/// Typed access to the `wishlist` and `cart` tables.
#[derive(Debug, Clone)]
pub struct MembershipRepository<S> {
    store: S,
}

impl<S: RecordStore> MembershipRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn pair_filter(user_id: UserId, project_id: ProjectId) -> Filter {
        Filter::new()
            .eq("user_id", user_id.to_string())
            .eq("project_id", project_id.to_string())
    }

    pub async fn add(
        &self,
        kind: CollectionKind,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<Membership, StoreError> {
        let membership = Membership {
            id: Uuid::now_v7(),
            user_id,
            project_id,
            created_at: Utc::now(),
        };
        let row = serde_json::to_value(&membership)
            .map_err(|e| StoreError::decode(e.to_string()))?;
        self.store.insert(kind.table(), vec![row]).await?;
        Ok(membership)
    }

    pub async fn remove(
        &self,
        kind: CollectionKind,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<u64, StoreError> {
        self.store
            .delete(kind.table(), Self::pair_filter(user_id, project_id))
            .await
    }

    pub async fn contains(
        &self,
        kind: CollectionKind,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<bool, StoreError> {
        let rows = self
            .store
            .select(kind.table(), Self::pair_filter(user_id, project_id), None)
            .await?;
        Ok(!rows.is_empty())
    }

    pub async fn list(
        &self,
        kind: CollectionKind,
        user_id: UserId,
    ) -> Result<Vec<Membership>, StoreError> {
        let rows = self
            .store
            .select(
                kind.table(),
                Filter::new().eq("user_id", user_id.to_string()),
                Some(OrderBy::desc("created_at")),
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(|e| StoreError::decode(e.to_string())))
            .collect()
    }

    /// Flip membership; returns whether the pair is a member afterwards.
    ///
    /// Read-before-write with no locking: two rapid toggles can race and the
    /// remote state is whatever landed last.
    pub async fn toggle(
        &self,
        kind: CollectionKind,
        user_id: UserId,
        project_id: ProjectId,
    ) -> Result<bool, StoreError> {
        if self.contains(kind, user_id, project_id).await? {
            self.remove(kind, user_id, project_id).await?;
            Ok(false)
        } else {
            self.add(kind, user_id, project_id).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devmart_store::InMemoryRecordStore;
    use std::sync::Arc;

    fn repo() -> MembershipRepository<Arc<InMemoryRecordStore>> {
        MembershipRepository::new(Arc::new(InMemoryRecordStore::new()))
    }

    #[tokio::test]
    async fn toggle_flips_membership_on_and_off() {
        let repo = repo();
        let user = UserId::new();
        let project = ProjectId::new();

        assert!(repo.toggle(CollectionKind::Wishlist, user, project).await.unwrap());
        assert!(repo.contains(CollectionKind::Wishlist, user, project).await.unwrap());

        assert!(!repo.toggle(CollectionKind::Wishlist, user, project).await.unwrap());
        assert!(!repo.contains(CollectionKind::Wishlist, user, project).await.unwrap());
    }

    #[tokio::test]
    async fn wishlist_and_cart_are_independent() {
        let repo = repo();
        let user = UserId::new();
        let project = ProjectId::new();

        repo.add(CollectionKind::Wishlist, user, project).await.unwrap();

        assert!(repo.contains(CollectionKind::Wishlist, user, project).await.unwrap());
        assert!(!repo.contains(CollectionKind::Cart, user, project).await.unwrap());
    }

    #[tokio::test]
    async fn list_returns_only_the_users_rows() {
        let repo = repo();
        let user_a = UserId::new();
        let user_b = UserId::new();
        let project = ProjectId::new();

        repo.add(CollectionKind::Cart, user_a, project).await.unwrap();
        repo.add(CollectionKind::Cart, user_b, project).await.unwrap();

        let rows = repo.list(CollectionKind::Cart, user_a).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, user_a);
    }

    #[tokio::test]
    async fn remove_is_idempotent_on_missing_pairs() {
        let repo = repo();
        let removed = repo
            .remove(CollectionKind::Wishlist, UserId::new(), ProjectId::new())
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
