use std::sync::Arc;

use serde_json::json;

use devmart_auth::{InMemorySessionProvider, Role, SessionProvider};
use devmart_catalog::ProjectRepository;
use devmart_collections::MembershipRepository;
use devmart_contact::ContactRepository;
use devmart_profiles::ProfileRepository;
use devmart_purchasing::{PurchaseRepository, SideEffectQueue};
use devmart_store::{InMemoryFileStorage, InMemoryRecordStore, StoreError};

type Store = Arc<InMemoryRecordStore>;

/// Shared application services: the store boundary plus one typed
/// repository per domain area and the purchase side-effect queue.
pub struct AppServices {
    store: Store,
    sessions: Arc<InMemorySessionProvider>,
    files: Arc<InMemoryFileStorage>,
    projects: ProjectRepository<Store>,
    purchases: PurchaseRepository<Store>,
    profiles: ProfileRepository<Store>,
    collections: MembershipRepository<Store>,
    contact: ContactRepository<Store>,
    side_effects: SideEffectQueue,
    admin_emails: Vec<String>,
}

/// Wire up in-memory infrastructure (dev/test deployment).
///
/// The counter-increment procedures the hosted service would define as
/// server functions are registered here, so the repositories' rpc-first
/// paths are exercised even against the in-memory store.
pub fn build_services(admin_emails: Vec<String>) -> AppServices {
    let store: Store = Arc::new(InMemoryRecordStore::new());
    register_counter_rpcs(&store);

    let (side_effects, _worker) = SideEffectQueue::spawn(store.clone());

    AppServices {
        projects: ProjectRepository::new(store.clone()),
        purchases: PurchaseRepository::new(store.clone()),
        profiles: ProfileRepository::new(store.clone()),
        collections: MembershipRepository::new(store.clone()),
        contact: ContactRepository::new(store.clone()),
        sessions: Arc::new(InMemorySessionProvider::new()),
        files: Arc::new(InMemoryFileStorage::new()),
        store,
        side_effects,
        admin_emails,
    }
}

fn register_counter_rpcs(store: &Store) {
    store.register_rpc(
        devmart_catalog::repository::INCREMENT_DOWNLOADS_RPC,
        Box::new(|tables, args| {
            bump_counter(tables, "projects", "downloads", &args, "project_id")
        }),
    );
    store.register_rpc(
        devmart_purchasing::purchase::INCREMENT_DOWNLOAD_COUNT_RPC,
        Box::new(|tables, args| {
            bump_counter(tables, "purchases", "download_count", &args, "purchase_id")
        }),
    );
}

fn bump_counter(
    tables: &mut devmart_store::Tables,
    table: &str,
    column: &str,
    args: &serde_json::Value,
    id_arg: &str,
) -> Result<serde_json::Value, StoreError> {
    let id = args
        .get(id_arg)
        .and_then(|v| v.as_str())
        .ok_or_else(|| StoreError::validation(format!("{id_arg} required")))?
        .to_string();

    let mut touched = false;
    for row in tables.entry(table.to_string()).or_default() {
        if row.get("id").and_then(|v| v.as_str()) == Some(id.as_str()) {
            let next = row.get(column).and_then(|v| v.as_u64()).unwrap_or(0) + 1;
            row[column] = json!(next);
            touched = true;
        }
    }

    if touched {
        Ok(serde_json::Value::Null)
    } else {
        Err(StoreError::validation(format!("no {table} row with id {id}")))
    }
}

impl AppServices {
    pub fn store(&self) -> Store {
        self.store.clone()
    }

    pub fn sessions(&self) -> &Arc<InMemorySessionProvider> {
        &self.sessions
    }

    pub fn sessions_dyn(&self) -> Arc<dyn SessionProvider> {
        self.sessions.clone()
    }

    pub fn file_storage(&self) -> &Arc<InMemoryFileStorage> {
        &self.files
    }

    pub fn projects(&self) -> &ProjectRepository<Store> {
        &self.projects
    }

    pub fn purchases(&self) -> &PurchaseRepository<Store> {
        &self.purchases
    }

    pub fn profiles(&self) -> &ProfileRepository<Store> {
        &self.profiles
    }

    pub fn collections(&self) -> &MembershipRepository<Store> {
        &self.collections
    }

    pub fn contact(&self) -> &ContactRepository<Store> {
        &self.contact
    }

    pub fn side_effects(&self) -> &SideEffectQueue {
        &self.side_effects
    }

    /// Role an email signs in with.
    pub fn role_for(&self, email: &str) -> Role {
        if self.admin_emails.iter().any(|a| a.eq_ignore_ascii_case(email)) {
            Role::Admin
        } else {
            Role::Customer
        }
    }
}
