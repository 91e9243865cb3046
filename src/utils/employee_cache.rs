use anyhow::Result;
use moka::future::Cache;
use std::time::Duration;

use crate::model::employee::Employee;
use crate::store::EmployeeDirectory;

/// Document number -> employee, for the login hot path.
#[derive(Clone)]
pub struct EmployeeCache {
    inner: Cache<String, Employee>,
}

impl Default for EmployeeCache {
    fn default() -> Self {
        Self::new(50_000, Duration::from_secs(3600))
    }
}

impl EmployeeCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, document_number: &str) -> Option<Employee> {
        self.inner.get(document_number).await
    }

    pub async fn insert(&self, employee: Employee) {
        self.inner
            .insert(employee.document_number.clone(), employee)
            .await;
    }

    pub async fn invalidate(&self, document_number: &str) {
        self.inner.invalidate(document_number).await;
    }

    /// Batch insert
    async fn insert_batch(&self, employees: &[Employee]) {
        let futures: Vec<_> = employees
            .iter()
            .map(|e| self.inner.insert(e.document_number.clone(), e.clone()))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;
    }

    /// Load active employees into the cache (batched)
    pub async fn warmup(&self, directory: &dyn EmployeeDirectory, batch_size: usize) -> Result<()> {
        let active: Vec<Employee> = directory
            .list()
            .await?
            .into_iter()
            .filter(|e| e.is_active)
            .collect();

        for batch in active.chunks(batch_size.max(1)) {
            self.insert_batch(batch).await;
        }

        log::info!("Employee cache warmup complete: {} active employees", active.len());
        Ok(())
    }
}
