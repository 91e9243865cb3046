use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::auth::password::hash_password;
use crate::config::{Config, StorageBackend};
use crate::store::{AdminAccounts, EmployeeDirectory, RecordStore, StoreError};
use crate::tracker::{Clock, DailyAttendanceTracker};
use crate::utils::document_filter::DocumentFilter;
use crate::utils::employee_cache::EmployeeCache;

/// Everything the handlers share, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub tracker: DailyAttendanceTracker,
    pub records: Arc<dyn RecordStore>,
    pub directory: Arc<dyn EmployeeDirectory>,
    pub admins: Arc<dyn AdminAccounts>,
    pub clock: Arc<dyn Clock>,
    pub document_filter: Arc<DocumentFilter>,
    pub employee_cache: EmployeeCache,
    pub backend: StorageBackend,
}

impl AppState {
    /// Wires every port to the same backend.
    pub fn new<S>(store: Arc<S>, backend: StorageBackend, config: &Config, clock: Arc<dyn Clock>) -> Self
    where
        S: RecordStore + EmployeeDirectory + AdminAccounts + 'static,
    {
        let records: Arc<dyn RecordStore> = store.clone();
        let directory: Arc<dyn EmployeeDirectory> = store.clone();
        let admins: Arc<dyn AdminAccounts> = store;

        Self {
            tracker: DailyAttendanceTracker::new(records.clone(), directory.clone(), config.timezone),
            records,
            directory,
            admins,
            clock,
            document_filter: Arc::new(DocumentFilter::new()),
            employee_cache: EmployeeCache::default(),
            backend,
        }
    }

    /// Creates the configured administrator when it does not exist yet.
    pub async fn seed_admin(&self, username: &str, password: &str) -> anyhow::Result<()> {
        if self.admins.find_admin(username).await?.is_some() {
            return Ok(());
        }

        let hashed = hash_password(password).map_err(|e| anyhow::anyhow!("hashing admin password: {}", e))?;
        match self.admins.create_admin(username, &hashed).await {
            Ok(admin) => {
                info!(admin_id = admin.id, username, "Default administrator created");
                Ok(())
            }
            // another instance seeded it first
            Err(StoreError::Conflict) => Ok(()),
            Err(e) => Err(e).context("seeding administrator"),
        }
    }
}
