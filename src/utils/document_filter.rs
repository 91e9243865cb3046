use anyhow::Result;
use autoscale_cuckoo_filter::CuckooFilter;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::store::EmployeeDirectory;

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 10_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

/// Fast negative for login by document number.
///
/// Until the warm-up has loaded every known document the filter cannot
/// say "absent" with confidence, so `might_exist` answers `true`.
pub struct DocumentFilter {
    inner: RwLock<CuckooFilter<String>>,
    ready: AtomicBool,
}

impl Default for DocumentFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)),
            ready: AtomicBool::new(false),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Check if a document might exist (false positives possible)
    pub fn might_exist(&self, document_number: &str) -> bool {
        if !self.is_ready() {
            return true;
        }
        match self.inner.read() {
            Ok(filter) => filter.contains(&document_number.to_string()),
            // poisoned: let the caller go to the directory
            Err(_) => true,
        }
    }

    pub fn insert(&self, document_number: &str) {
        if let Ok(mut filter) = self.inner.write() {
            filter.add(&document_number.to_string());
        }
    }

    pub fn remove(&self, document_number: &str) {
        if let Ok(mut filter) = self.inner.write() {
            filter.remove(&document_number.to_string());
        }
    }

    /// Load every document in the directory, `batch_size` per lock.
    pub async fn warmup(&self, directory: &dyn EmployeeDirectory, batch_size: usize) -> Result<()> {
        let employees = directory.list().await?;
        let total = employees.len();

        for batch in employees.chunks(batch_size.max(1)) {
            let mut filter = self
                .inner
                .write()
                .map_err(|_| anyhow::anyhow!("document filter poisoned"))?;
            for employee in batch {
                filter.add(&employee.document_number);
            }
        }

        self.ready.store(true, Ordering::Release);
        log::info!("Document filter warmup complete: {} employees", total);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::{NewEmployee, Sector};
    use crate::store::MemoryStore;

    #[actix_web::test]
    async fn answers_maybe_until_warmed() {
        let store = MemoryStore::new();
        store
            .create(NewEmployee {
                full_name: "Ana Torres Vidal".into(),
                document_number: "11111111H".into(),
                social_security_number: "280000000001".into(),
                sector: Sector::DiningRoom,
            })
            .await
            .unwrap();

        let filter = DocumentFilter::new();
        assert!(filter.might_exist("99999999Z"));

        filter.warmup(&store, 100).await.unwrap();
        assert!(filter.is_ready());
        assert!(filter.might_exist("11111111H"));
        assert!(!filter.might_exist("99999999Z"));

        filter.insert("99999999Z");
        assert!(filter.might_exist("99999999Z"));
        filter.remove("99999999Z");
        assert!(!filter.might_exist("99999999Z"));
    }
}
