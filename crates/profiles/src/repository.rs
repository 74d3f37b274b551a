use chrono::Utc;
use serde_json::json;

use devmart_core::UserId;
use devmart_store::{Filter, RecordStore, StoreError};

use crate::profile::UserProfile;

const USER_PROFILES: &str = "user_profiles";

/// Typed access to the `user_profiles` table.
#[derive(Debug, Clone)]
pub struct ProfileRepository<S> {
    store: S,
}

impl<S: RecordStore> ProfileRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get(&self, user_id: UserId) -> Result<Option<UserProfile>, StoreError> {
        let rows = self
            .store
            .select(USER_PROFILES, Filter::new().eq("id", user_id.to_string()), None)
            .await?;
        rows.into_iter()
            .next()
            .map(|r| serde_json::from_value(r).map_err(|e| StoreError::decode(e.to_string())))
            .transpose()
    }

    /// Insert or replace the profile row for `profile.id`.
    pub async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        let row = serde_json::to_value(&profile)
            .map_err(|e| StoreError::decode(e.to_string()))?;

        let existing = self
            .store
            .select(
                USER_PROFILES,
                Filter::new().eq("id", profile.id.to_string()),
                None,
            )
            .await?;

        if existing.is_empty() {
            self.store.insert(USER_PROFILES, vec![row]).await?;
        } else {
            self.store
                .update(USER_PROFILES, row, Filter::new().eq("id", profile.id.to_string()))
                .await?;
        }
        Ok(profile)
    }

    /// Sync the contact fields the purchase flow collected into the profile.
    ///
    /// Update-only, like the storefront: a user without a profile row gets
    /// nothing. Returns the number of rows touched so callers can log a
    /// no-op sync.
    pub async fn sync_contact_fields(
        &self,
        user_id: UserId,
        full_name: &str,
        phone: &str,
        country: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut patch = json!({
            "full_name": full_name,
            "phone": phone,
            "updated_at": Utc::now(),
        });
        if let Some(country) = country {
            patch["country"] = json!(country);
        }

        self.store
            .update(USER_PROFILES, patch, Filter::new().eq("id", user_id.to_string()))
            .await
    }
}
