use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use devmart_catalog::ProjectRepository;
use devmart_core::{ProjectId, UserId};
use devmart_profiles::ProfileRepository;
use devmart_store::{RecordStore, StoreError};

/// A best-effort persistence call dispatched after the purchase critical
/// path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// Bump the catalog item's aggregate download counter.
    IncrementProjectDownloads { project_id: ProjectId },

    /// Sync the buyer's contact fields into their profile.
    SyncProfile {
        user_id: UserId,
        full_name: String,
        phone: String,
        country: Option<String>,
    },
}

/// Detached queue for side-channel updates.
///
/// Effects are executed by a spawned worker in enqueue order; failures are
/// logged and dropped, never surfaced to the workflow. The buyer's license
/// is the primary guarantee; consistency of secondary statistics loses.
/// Effects already enqueued still land after the workflow resets:
/// fire-and-forget. There is no retry policy.
#[derive(Debug, Clone)]
pub struct SideEffectQueue {
    tx: mpsc::UnboundedSender<SideEffect>,
}

impl SideEffectQueue {
    /// Spawn the worker and return the queue plus its join handle.
    ///
    /// The worker drains until every queue clone is dropped; tests await
    /// the handle to observe all effects settled.
    pub fn spawn<S>(store: S) -> (Self, JoinHandle<()>)
    where
        S: RecordStore + Clone + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<SideEffect>();

        let handle = tokio::spawn(async move {
            let projects = ProjectRepository::new(store.clone());
            let profiles = ProfileRepository::new(store);

            while let Some(effect) = rx.recv().await {
                if let Err(e) = apply(&projects, &profiles, effect.clone()).await {
                    tracing::warn!(?effect, error = %e, "side effect failed; dropping");
                }
            }
        });

        (Self { tx }, handle)
    }

    /// Enqueue an effect. Never blocks and never fails the caller; a closed
    /// worker only means the effect is lost, which the policy permits.
    pub fn enqueue(&self, effect: SideEffect) {
        if self.tx.send(effect).is_err() {
            tracing::warn!("side effect queue closed; effect dropped");
        }
    }
}

async fn apply<S: RecordStore>(
    projects: &ProjectRepository<S>,
    profiles: &ProfileRepository<S>,
    effect: SideEffect,
) -> Result<(), StoreError> {
    match effect {
        SideEffect::IncrementProjectDownloads { project_id } => {
            projects.increment_downloads(project_id).await
        }
        SideEffect::SyncProfile {
            user_id,
            full_name,
            phone,
            country,
        } => {
            let touched = profiles
                .sync_contact_fields(user_id, &full_name, &phone, country.as_deref())
                .await?;
            if touched == 0 {
                tracing::debug!(%user_id, "profile sync touched no rows");
            }
            Ok(())
        }
    }
}
