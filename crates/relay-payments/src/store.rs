//! Entitlement Record Store
//!
//! The record store is the single source of truth for Pro status. Writes are
//! append-only inserts; lookups expect at most one row per email and treat
//! more than one as a store error.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::entitlement::EntitlementRecord;
use crate::error::{PaymentError, Result};

/// Keyed record store queried and written by email
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Look up the `isPro` flag for an email.
    ///
    /// Returns `Ok(None)` when no row exists. A missing or null flag on an
    /// existing row reads as `false`.
    async fn find_pro_flag(&self, email: &str) -> Result<Option<bool>>;

    /// Append a record. No uniqueness is enforced on `email`.
    async fn insert(&self, record: &EntitlementRecord) -> Result<()>;
}

/// In-memory store (for development and tests)
#[derive(Default)]
pub struct MemoryEntitlementStore {
    records: RwLock<Vec<EntitlementRecord>>,
    lookups: AtomicUsize,
}

impl MemoryEntitlementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows
    pub fn with_records(records: impl IntoIterator<Item = EntitlementRecord>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
            lookups: AtomicUsize::new(0),
        }
    }

    /// All rows stored for an email, in insertion order
    pub async fn records_for(&self, email: &str) -> Vec<EntitlementRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect()
    }

    /// Total number of rows
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Number of lookups served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntitlementStore for MemoryEntitlementStore {
    async fn find_pro_flag(&self, email: &str) -> Result<Option<bool>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let records = self.records.read().await;
        let mut matches = records.iter().filter(|r| r.email == email);

        match (matches.next(), matches.next()) {
            (None, _) => Ok(None),
            (Some(record), None) => Ok(Some(record.is_pro)),
            (Some(_), Some(_)) => Err(PaymentError::Storage(format!(
                "multiple rows returned for single-row lookup of {email}"
            ))),
        }
    }

    async fn insert(&self, record: &EntitlementRecord) -> Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_row_is_none() {
        let store = MemoryEntitlementStore::new();
        assert_eq!(store.find_pro_flag("nobody@example.com").await.unwrap(), None);
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let store =
            MemoryEntitlementStore::with_records([EntitlementRecord::pro("User@Example.com")]);

        assert_eq!(store.find_pro_flag("User@Example.com").await.unwrap(), Some(true));
        assert_eq!(store.find_pro_flag("user@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_appends_duplicates() {
        let store = MemoryEntitlementStore::new();
        let record = EntitlementRecord::pro("a@b.com");

        store.insert(&record).await.unwrap();
        store.insert(&record).await.unwrap();

        assert_eq!(store.records_for("a@b.com").await.len(), 2);
        assert!(matches!(
            store.find_pro_flag("a@b.com").await,
            Err(PaymentError::Storage(_))
        ));
    }
}
