use chrono::Utc;

use devmart_auth::Identity;
use devmart_core::{ProjectId, PurchaseId};
use devmart_licensing::LicenseKey;
use devmart_store::RecordStore;

use crate::details::BuyerDetails;
use crate::error::PurchaseError;
use crate::purchase::{
    DEFAULT_MAX_DOWNLOADS, DownloadAccountingError, PaymentStatus, Purchase, PurchaseRepository,
};
use crate::side_effects::{SideEffect, SideEffectQueue};

/// Bound on license key regeneration when a collision is seen.
const MAX_KEY_ATTEMPTS: usize = 8;

/// Purchase workflow states.
///
/// `Completed` is terminal; `back()` is the only backward transition and
/// only before payment confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    CollectingDetails,
    ConfirmingPayment,
    Completed,
}

impl WorkflowState {
    fn name(self) -> &'static str {
        match self {
            WorkflowState::CollectingDetails => "collecting details",
            WorkflowState::ConfirmingPayment => "confirming payment",
            WorkflowState::Completed => "completed",
        }
    }
}

/// The catalog item a workflow run is purchasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutItem {
    pub project_id: ProjectId,
    /// Price in the smallest currency unit.
    pub price: u64,
    pub currency: String,
}

impl CheckoutItem {
    pub fn new(project_id: ProjectId, price: u64) -> Self {
        Self {
            project_id,
            price,
            currency: "INR".to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// Trigger signal returned by `download()`.
///
/// The caller hands this to the file-storage boundary to start the actual
/// transfer; the workflow never moves bytes itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadTicket {
    pub purchase_id: PurchaseId,
    pub project_id: ProjectId,
}

/// One purchase attempt for one (buyer, item) pairing.
///
/// Each run is independent: confirming twice through two runs creates two
/// purchase rows with two license keys; there is no deduplication. The
/// caller's identity arrives as an explicit argument on the operations
/// that need it; the workflow holds no ambient session state.
#[derive(Debug)]
pub struct PurchaseWorkflow<S> {
    repo: PurchaseRepository<S>,
    side_effects: SideEffectQueue,
    item: CheckoutItem,
    state: WorkflowState,
    details: Option<BuyerDetails>,
    issued: Option<(PurchaseId, LicenseKey)>,
}

impl<S: RecordStore> PurchaseWorkflow<S> {
    pub fn new(store: S, side_effects: SideEffectQueue, item: CheckoutItem) -> Self {
        Self {
            repo: PurchaseRepository::new(store),
            side_effects,
            item,
            state: WorkflowState::CollectingDetails,
            details: None,
            issued: None,
        }
    }

    /// Rebuild a workflow at its terminal state from a stored purchase.
    ///
    /// Download requests can arrive long after the confirming session is
    /// gone; this puts a fresh workflow straight into `Completed` so they
    /// still flow through the same download path.
    pub fn resume_completed(
        store: S,
        side_effects: SideEffectQueue,
        item: CheckoutItem,
        purchase_id: PurchaseId,
        license_key: LicenseKey,
    ) -> Self {
        Self {
            repo: PurchaseRepository::new(store),
            side_effects,
            item,
            state: WorkflowState::Completed,
            details: None,
            issued: Some((purchase_id, license_key)),
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn item(&self) -> &CheckoutItem {
        &self.item
    }

    pub fn buyer_details(&self) -> Option<&BuyerDetails> {
        self.details.as_ref()
    }

    /// The issued license key, present only once `Completed`.
    pub fn license_key(&self) -> Option<&LicenseKey> {
        self.issued.as_ref().map(|(_, key)| key)
    }

    pub fn purchase_id(&self) -> Option<PurchaseId> {
        self.issued.as_ref().map(|(id, _)| *id)
    }

    /// Step 1: validate and store buyer details, then move to payment
    /// confirmation. On validation failure the state does not move and the
    /// error names every missing field.
    pub fn submit_details(&mut self, details: BuyerDetails) -> Result<(), PurchaseError> {
        if self.state != WorkflowState::CollectingDetails {
            return Err(PurchaseError::invalid_state(
                "submit_details",
                self.state.name(),
            ));
        }

        details.validate()?;
        self.details = Some(details);
        self.state = WorkflowState::ConfirmingPayment;
        Ok(())
    }

    /// The "Back" action: return to the details form before payment.
    /// Collected details are kept for re-editing.
    pub fn back(&mut self) -> Result<(), PurchaseError> {
        if self.state != WorkflowState::ConfirmingPayment {
            return Err(PurchaseError::invalid_state("back", self.state.name()));
        }
        self.state = WorkflowState::CollectingDetails;
        Ok(())
    }

    /// Step 2: charge (synthetically), persist the purchase, issue the
    /// license key.
    ///
    /// The purchase row insert is the critical path: if it fails, the
    /// state stays at `ConfirmingPayment`, no key is exposed, and the user
    /// may retry. The aggregate-counter bump and profile sync are
    /// dispatched to the detached side-effect queue after the row exists
    /// and never block or fail the purchase.
    pub async fn confirm_purchase(
        &mut self,
        identity: Option<&Identity>,
    ) -> Result<LicenseKey, PurchaseError> {
        if self.state != WorkflowState::ConfirmingPayment {
            return Err(PurchaseError::invalid_state(
                "confirm_purchase",
                self.state.name(),
            ));
        }

        let identity = identity.ok_or(PurchaseError::AuthenticationRequired)?;
        let details = self
            .details
            .clone()
            .ok_or_else(|| PurchaseError::invalid_state("confirm_purchase", "missing buyer details"))?;

        let license_key = self.issue_key().await;

        let now = Utc::now();
        let purchase = Purchase {
            id: PurchaseId::new(),
            user_id: identity.user_id,
            project_id: self.item.project_id,
            amount: self.item.price,
            currency: self.item.currency.clone(),
            payment_status: PaymentStatus::Completed,
            payment_method: Some("card".to_string()),
            transaction_id: Some(format!("txn_{}", now.timestamp_millis())),
            license_key: license_key.clone(),
            buyer_details: details.clone(),
            download_count: 0,
            max_downloads: DEFAULT_MAX_DOWNLOADS,
            created_at: now,
            updated_at: now,
        };

        let purchase = self
            .repo
            .insert(purchase)
            .await
            .map_err(|e| PurchaseError::PurchaseRecord(e.to_string()))?;

        self.side_effects.enqueue(SideEffect::IncrementProjectDownloads {
            project_id: self.item.project_id,
        });
        self.side_effects.enqueue(SideEffect::SyncProfile {
            user_id: identity.user_id,
            full_name: details.full_name,
            phone: details.phone,
            country: details.country,
        });

        self.issued = Some((purchase.id, license_key.clone()));
        self.state = WorkflowState::Completed;

        tracing::info!(
            purchase_id = %purchase.id,
            project_id = %self.item.project_id,
            "purchase completed"
        );

        Ok(license_key)
    }

    /// Request a download of the purchased files.
    ///
    /// Requires the terminal state and an identity. A spent download cap
    /// refuses the request; any other accounting failure is side-channel:
    /// logged, and the transfer still allowed.
    pub async fn download(
        &self,
        identity: Option<&Identity>,
    ) -> Result<DownloadTicket, PurchaseError> {
        if self.state != WorkflowState::Completed {
            return Err(PurchaseError::invalid_state("download", self.state.name()));
        }
        if identity.is_none() {
            return Err(PurchaseError::AuthenticationRequired);
        }
        let Some((purchase_id, _)) = &self.issued else {
            return Err(PurchaseError::invalid_state("download", "no issued purchase"));
        };

        match self.repo.record_download(*purchase_id).await {
            Ok(_) => {}
            Err(DownloadAccountingError::LimitExhausted { used, max }) => {
                return Err(PurchaseError::DownloadLimitExhausted { used, max });
            }
            Err(e) => {
                tracing::warn!(error = %e, "download accounting failed; allowing transfer");
            }
        }

        Ok(DownloadTicket {
            purchase_id: *purchase_id,
            project_id: self.item.project_id,
        })
    }

    /// Return to the initial state with cleared details; used when the
    /// hosting surface is dismissed and later reopened. Side effects
    /// already enqueued still land.
    pub fn reset(&mut self) {
        self.state = WorkflowState::CollectingDetails;
        self.details = None;
        self.issued = None;
    }

    /// Generate a license key, regenerating on collision with existing
    /// purchases (bounded). A failed uniqueness lookup is treated as no
    /// collision: the insert still decides the purchase outcome.
    async fn issue_key(&self) -> LicenseKey {
        let mut key = LicenseKey::generate();
        for attempt in 1..MAX_KEY_ATTEMPTS {
            match self.repo.license_key_exists(&key).await {
                Ok(false) => break,
                Ok(true) => {
                    tracing::debug!(attempt, "license key collision; regenerating");
                    key = LicenseKey::generate();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "license key uniqueness check failed; proceeding");
                    break;
                }
            }
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use devmart_auth::{Identity, Role};
    use devmart_core::UserId;
    use devmart_store::{Filter, InMemoryRecordStore, OrderBy, StoreError};
    use serde_json::Value as JsonValue;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn valid_details() -> BuyerDetails {
        BuyerDetails {
            full_name: "A B".to_string(),
            email: "a@b.com".to_string(),
            phone: "123".to_string(),
            address: "X".to_string(),
            country: Some("IN".to_string()),
            ..Default::default()
        }
    }

    fn buyer() -> Identity {
        Identity::new(UserId::new(), "a@b.com", Role::Customer)
    }

    async fn workflow(
        store: Arc<InMemoryRecordStore>,
    ) -> (PurchaseWorkflow<Arc<InMemoryRecordStore>>, SideEffectQueue) {
        let (queue, _handle) = SideEffectQueue::spawn(store.clone());
        let item = CheckoutItem::new(ProjectId::new(), 24_999);
        (PurchaseWorkflow::new(store, queue.clone(), item), queue)
    }

    async fn stored_purchases(store: &Arc<InMemoryRecordStore>) -> Vec<JsonValue> {
        store
            .select("purchases", Filter::new(), Some(OrderBy::asc("created_at")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn submit_details_transitions_to_confirming() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store).await;

        wf.submit_details(valid_details()).unwrap();
        assert_eq!(wf.state(), WorkflowState::ConfirmingPayment);
        assert!(wf.buyer_details().is_some());
    }

    #[tokio::test]
    async fn submit_details_with_missing_fields_stays_put() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store).await;

        let err = wf
            .submit_details(BuyerDetails {
                full_name: String::new(),
                ..valid_details()
            })
            .unwrap_err();

        match err {
            PurchaseError::Validation { missing } => assert_eq!(missing, vec!["full_name"]),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(wf.state(), WorkflowState::CollectingDetails);
    }

    #[tokio::test]
    async fn back_returns_to_details_and_keeps_them() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store).await;

        wf.submit_details(valid_details()).unwrap();
        wf.back().unwrap();

        assert_eq!(wf.state(), WorkflowState::CollectingDetails);
        assert!(wf.buyer_details().is_some());
    }

    #[tokio::test]
    async fn back_from_initial_state_is_invalid() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store).await;

        assert!(matches!(
            wf.back().unwrap_err(),
            PurchaseError::InvalidState { operation: "back", .. }
        ));
    }

    #[tokio::test]
    async fn confirm_without_identity_creates_no_record() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store.clone()).await;

        wf.submit_details(valid_details()).unwrap();
        let err = wf.confirm_purchase(None).await.unwrap_err();

        assert_eq!(err, PurchaseError::AuthenticationRequired);
        assert_eq!(wf.state(), WorkflowState::ConfirmingPayment);
        assert!(stored_purchases(&store).await.is_empty());
    }

    #[tokio::test]
    async fn confirm_before_submitting_details_is_invalid() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store).await;

        let err = wf.confirm_purchase(Some(&buyer())).await.unwrap_err();
        assert!(matches!(
            err,
            PurchaseError::InvalidState { operation: "confirm_purchase", .. }
        ));
    }

    #[tokio::test]
    async fn confirm_issues_completed_purchase() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store.clone()).await;

        wf.submit_details(valid_details()).unwrap();
        let key = wf.confirm_purchase(Some(&buyer())).await.unwrap();

        assert_eq!(key.as_str().len(), 19);
        assert_eq!(wf.state(), WorkflowState::Completed);
        assert_eq!(wf.license_key(), Some(&key));

        let repo = PurchaseRepository::new(store);
        let purchase = repo.get(wf.purchase_id().unwrap()).await.unwrap().unwrap();
        assert_eq!(purchase.download_count, 0);
        assert_eq!(purchase.max_downloads, 5);
        assert_eq!(purchase.payment_status, PaymentStatus::Completed);
        assert_eq!(purchase.amount, 24_999);
        assert_eq!(purchase.license_key, key);
        assert_eq!(purchase.buyer_details.full_name, "A B");

        // The key survives a parse: four hyphen-separated [A-Z0-9] groups.
        let reparsed: LicenseKey = key.as_str().parse().unwrap();
        assert_eq!(reparsed, key);
    }

    #[tokio::test]
    async fn sequential_confirms_create_independent_purchases() {
        let store = Arc::new(InMemoryRecordStore::new());
        let identity = buyer();
        let item = CheckoutItem::new(ProjectId::new(), 24_999);

        let (queue, _handle) = SideEffectQueue::spawn(store.clone());
        let mut first = PurchaseWorkflow::new(store.clone(), queue.clone(), item.clone());
        let mut second = PurchaseWorkflow::new(store.clone(), queue, item);

        first.submit_details(valid_details()).unwrap();
        let key_a = first.confirm_purchase(Some(&identity)).await.unwrap();

        second.submit_details(valid_details()).unwrap();
        let key_b = second.confirm_purchase(Some(&identity)).await.unwrap();

        assert_ne!(key_a, key_b);
        assert_eq!(stored_purchases(&store).await.len(), 2);
    }

    #[tokio::test]
    async fn download_requires_completion() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (wf, _queue) = workflow(store).await;

        let err = wf.download(Some(&buyer())).await.unwrap_err();
        assert!(matches!(
            err,
            PurchaseError::InvalidState { operation: "download", .. }
        ));
    }

    #[tokio::test]
    async fn download_requires_identity() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store).await;

        wf.submit_details(valid_details()).unwrap();
        wf.confirm_purchase(Some(&buyer())).await.unwrap();

        let err = wf.download(None).await.unwrap_err();
        assert_eq!(err, PurchaseError::AuthenticationRequired);
    }

    #[tokio::test]
    async fn downloads_count_up_then_stop_at_the_cap() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store.clone()).await;
        let identity = buyer();

        wf.submit_details(valid_details()).unwrap();
        wf.confirm_purchase(Some(&identity)).await.unwrap();

        for _ in 0..DEFAULT_MAX_DOWNLOADS {
            let ticket = wf.download(Some(&identity)).await.unwrap();
            assert_eq!(ticket.purchase_id, wf.purchase_id().unwrap());
        }

        let err = wf.download(Some(&identity)).await.unwrap_err();
        assert_eq!(
            err,
            PurchaseError::DownloadLimitExhausted { used: 5, max: 5 }
        );

        let repo = PurchaseRepository::new(store);
        let purchase = repo.get(wf.purchase_id().unwrap()).await.unwrap().unwrap();
        assert_eq!(purchase.download_count, 5);
    }

    #[tokio::test]
    async fn resumed_workflow_serves_downloads() {
        let store = Arc::new(InMemoryRecordStore::new());
        let identity = buyer();
        let (mut wf, queue) = workflow(store.clone()).await;

        wf.submit_details(valid_details()).unwrap();
        let key = wf.confirm_purchase(Some(&identity)).await.unwrap();
        let purchase_id = wf.purchase_id().unwrap();
        let item = wf.item().clone();
        drop(wf);

        let resumed =
            PurchaseWorkflow::resume_completed(store, queue, item, purchase_id, key);
        assert_eq!(resumed.state(), WorkflowState::Completed);

        let ticket = resumed.download(Some(&identity)).await.unwrap();
        assert_eq!(ticket.purchase_id, purchase_id);
    }

    #[tokio::test]
    async fn reset_clears_details_and_key() {
        let store = Arc::new(InMemoryRecordStore::new());
        let (mut wf, _queue) = workflow(store).await;

        wf.submit_details(valid_details()).unwrap();
        wf.confirm_purchase(Some(&buyer())).await.unwrap();
        wf.reset();

        assert_eq!(wf.state(), WorkflowState::CollectingDetails);
        assert!(wf.buyer_details().is_none());
        assert!(wf.license_key().is_none());
    }

    #[tokio::test]
    async fn side_effects_land_after_confirmation() {
        use devmart_catalog::{Difficulty, ProjectDraft, ProjectRepository};
        use devmart_profiles::{ProfileRepository, UserProfile};

        let store = Arc::new(InMemoryRecordStore::new());
        let projects = ProjectRepository::new(store.clone());
        let profiles = ProfileRepository::new(store.clone());

        let project = projects
            .create(ProjectDraft {
                title: "Taskboard".to_string(),
                price: 24_999,
                description: "desc".to_string(),
                long_description: "long".to_string(),
                category: "web".to_string(),
                tech_stack: vec![],
                tags: vec![],
                features: vec![],
                demo_url: None,
                github_url: None,
                license: "Commercial".to_string(),
                difficulty: Difficulty::Beginner,
                images: vec![],
                version: "1.0.0".to_string(),
                featured: false,
            })
            .await
            .unwrap();

        let identity = buyer();
        profiles
            .upsert(UserProfile::new(identity.user_id, "a@b.com", Utc::now()))
            .await
            .unwrap();

        let (queue, handle) = SideEffectQueue::spawn(store.clone());
        let mut wf = PurchaseWorkflow::new(
            store.clone(),
            queue.clone(),
            CheckoutItem::new(project.id, project.price),
        );

        wf.submit_details(valid_details()).unwrap();
        wf.confirm_purchase(Some(&identity)).await.unwrap();

        drop(wf);
        drop(queue);
        handle.await.unwrap();

        let fetched = projects.get(project.id).await.unwrap().unwrap();
        assert_eq!(fetched.downloads, 1);

        let profile = profiles.get(identity.user_id).await.unwrap().unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("A B"));
        assert_eq!(profile.phone.as_deref(), Some("123"));
        assert_eq!(profile.country.as_deref(), Some("IN"));
    }

    /// Store wrapper that fails inserts on demand (critical-path outage).
    struct FlakyStore {
        inner: InMemoryRecordStore,
        fail_inserts: AtomicBool,
    }

    #[async_trait]
    impl devmart_store::RecordStore for FlakyStore {
        async fn insert(
            &self,
            table: &str,
            rows: Vec<JsonValue>,
        ) -> Result<Vec<JsonValue>, StoreError> {
            if self.fail_inserts.load(Ordering::SeqCst) {
                return Err(StoreError::transport("injected outage"));
            }
            self.inner.insert(table, rows).await
        }

        async fn select(
            &self,
            table: &str,
            filter: Filter,
            order: Option<OrderBy>,
        ) -> Result<Vec<JsonValue>, StoreError> {
            self.inner.select(table, filter, order).await
        }

        async fn update(
            &self,
            table: &str,
            patch: JsonValue,
            filter: Filter,
        ) -> Result<u64, StoreError> {
            self.inner.update(table, patch, filter).await
        }

        async fn delete(&self, table: &str, filter: Filter) -> Result<u64, StoreError> {
            self.inner.delete(table, filter).await
        }

        async fn rpc(&self, name: &str, args: JsonValue) -> Result<JsonValue, StoreError> {
            self.inner.rpc(name, args).await
        }
    }

    #[tokio::test]
    async fn failed_record_insert_permits_a_retry() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryRecordStore::new(),
            fail_inserts: AtomicBool::new(true),
        });

        let (queue, _handle) = SideEffectQueue::spawn(store.clone());
        let mut wf = PurchaseWorkflow::new(
            store.clone(),
            queue,
            CheckoutItem::new(ProjectId::new(), 24_999),
        );
        let identity = buyer();

        wf.submit_details(valid_details()).unwrap();

        let err = wf.confirm_purchase(Some(&identity)).await.unwrap_err();
        assert!(matches!(err, PurchaseError::PurchaseRecord(_)));
        assert_eq!(wf.state(), WorkflowState::ConfirmingPayment);
        assert!(wf.license_key().is_none());

        // User-initiated retry after the outage clears.
        store.fail_inserts.store(false, Ordering::SeqCst);
        let key = wf.confirm_purchase(Some(&identity)).await.unwrap();
        assert_eq!(wf.state(), WorkflowState::Completed);
        assert_eq!(wf.license_key(), Some(&key));
    }
}
