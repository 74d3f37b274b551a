use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use devmart_core::{ProjectId, PurchaseId, UserId};
use devmart_licensing::LicenseKey;
use devmart_store::{Filter, OrderBy, RecordStore, StoreError};

use crate::details::BuyerDetails;

const PURCHASES: &str = "purchases";

/// Named remote procedure for the per-purchase download counter.
pub const INCREMENT_DOWNLOAD_COUNT_RPC: &str = "increment_download_count";

/// Downloads included with every purchase.
pub const DEFAULT_MAX_DOWNLOADS: u32 = 5;

/// Payment status of a purchase.
///
/// The storefront's payment is synthetic; rows are written as `completed`.
/// The other states exist for administrative overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// The persisted record of one buyer acquiring one catalog item.
///
/// Created only at workflow completion. `license_key` is immutable once
/// issued; `download_count` moves only through download accounting (or an
/// admin override) and never exceeds `max_downloads`. Rows are never
/// deleted by the normal flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub project_id: ProjectId,
    /// Amount in the smallest currency unit.
    pub amount: u64,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub license_key: LicenseKey,
    pub buyer_details: BuyerDetails,
    pub download_count: u32,
    pub max_downloads: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Download accounting failure.
#[derive(Debug, Error)]
pub enum DownloadAccountingError {
    /// Incrementing would exceed `max_downloads`.
    #[error("download limit reached ({used} of {max} downloads used)")]
    LimitExhausted { used: u32, max: u32 },

    #[error("purchase not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Typed access to the `purchases` table, including download accounting.
#[derive(Debug, Clone)]
pub struct PurchaseRepository<S> {
    store: S,
}

impl<S: RecordStore> PurchaseRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn insert(&self, purchase: Purchase) -> Result<Purchase, StoreError> {
        let row = serde_json::to_value(&purchase)
            .map_err(|e| StoreError::decode(e.to_string()))?;
        self.store.insert(PURCHASES, vec![row]).await?;
        Ok(purchase)
    }

    pub async fn get(&self, id: PurchaseId) -> Result<Option<Purchase>, StoreError> {
        let rows = self
            .store
            .select(PURCHASES, Filter::new().eq("id", id.to_string()), None)
            .await?;
        rows.into_iter()
            .next()
            .map(|r| serde_json::from_value(r).map_err(|e| StoreError::decode(e.to_string())))
            .transpose()
    }

    /// A user's purchase history, newest first (the dashboard view).
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Purchase>, StoreError> {
        let rows = self
            .store
            .select(
                PURCHASES,
                Filter::new().eq("user_id", user_id.to_string()),
                Some(OrderBy::desc("created_at")),
            )
            .await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(|e| StoreError::decode(e.to_string())))
            .collect()
    }

    /// Whether any purchase already carries this license key.
    pub async fn license_key_exists(&self, key: &LicenseKey) -> Result<bool, StoreError> {
        let rows = self
            .store
            .select(
                PURCHASES,
                Filter::new().eq("license_key", key.as_str()),
                None,
            )
            .await?;
        Ok(!rows.is_empty())
    }

    /// Download accounting: bump `download_count` by one, refusing to pass
    /// the cap.
    ///
    /// Prefers the store's atomic-increment procedure, falling back to a
    /// client-computed read-modify-write when the store has no such hook.
    /// The cap check runs against the freshly read row either way; the
    /// invariant `download_count <= max_downloads` is enforced here rather
    /// than by a UI gate. Returns the new count.
    pub async fn record_download(&self, id: PurchaseId) -> Result<u32, DownloadAccountingError> {
        let purchase = self
            .get(id)
            .await?
            .ok_or(DownloadAccountingError::NotFound)?;

        if purchase.download_count >= purchase.max_downloads {
            return Err(DownloadAccountingError::LimitExhausted {
                used: purchase.download_count,
                max: purchase.max_downloads,
            });
        }

        let rpc_result = self
            .store
            .rpc(
                INCREMENT_DOWNLOAD_COUNT_RPC,
                json!({"purchase_id": id.to_string()}),
            )
            .await;

        match rpc_result {
            Ok(_) => {}
            Err(StoreError::UnsupportedRpc(_)) => {
                self.store
                    .update(
                        PURCHASES,
                        json!({
                            "download_count": purchase.download_count + 1,
                            "updated_at": Utc::now(),
                        }),
                        Filter::new().eq("id", id.to_string()),
                    )
                    .await?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(purchase.download_count + 1)
    }
}
