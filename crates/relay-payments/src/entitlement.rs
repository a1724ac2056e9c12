//! Entitlement Records and Resolution
//!
//! A user is "Pro" once a completed checkout has been recorded for their
//! email. Resolution reads the record store and fails closed: a store error
//! never grants entitlement.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;
use crate::store::EntitlementStore;

/// A row in the `pro_users` table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementRecord {
    /// Customer email exactly as the payment gateway reported it
    pub email: String,

    /// Pro flag
    pub is_pro: bool,

    /// Time the triggering event was ingested
    pub upgraded_at: DateTime<Utc>,
}

impl EntitlementRecord {
    /// A Pro record stamped with the current time
    pub fn pro(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_pro: true,
            upgraded_at: Utc::now(),
        }
    }
}

/// Outcome of an entitlement lookup
#[derive(Debug)]
pub enum Entitlement {
    /// A record exists with `isPro == true`
    Entitled,

    /// No record, or the record's flag is false
    NotEntitled,

    /// The store could not answer
    Unknown(PaymentError),
}

impl Entitlement {
    /// Collapse to the externally visible flag. `Unknown` is never entitled.
    pub const fn is_entitled(&self) -> bool {
        matches!(self, Self::Entitled)
    }
}

/// Answers whether an email currently has Pro access
#[derive(Clone)]
pub struct EntitlementResolver {
    store: Arc<dyn EntitlementStore>,
}

impl EntitlementResolver {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    /// Resolve entitlement, keeping store failures distinguishable
    pub async fn resolve(&self, email: &str) -> Entitlement {
        let result = self.store.find_pro_flag(email).await;

        tracing::info!(email = %email, result = ?result, "Pro check result");

        match result {
            Ok(Some(true)) => Entitlement::Entitled,
            Ok(Some(false) | None) => Entitlement::NotEntitled,
            Err(e) => {
                tracing::warn!(email = %email, error = %e, "Entitlement lookup failed; denying");
                Entitlement::Unknown(e)
            }
        }
    }

    /// Resolve entitlement as a plain flag
    pub async fn is_entitled(&self, email: &str) -> bool {
        self.resolve(email).await.is_entitled()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::Result;
    use crate::store::MemoryEntitlementStore;

    struct UnreachableStore;

    #[async_trait]
    impl EntitlementStore for UnreachableStore {
        async fn find_pro_flag(&self, _email: &str) -> Result<Option<bool>> {
            Err(PaymentError::Storage("connection refused".into()))
        }

        async fn insert(&self, _record: &EntitlementRecord) -> Result<()> {
            Err(PaymentError::Storage("connection refused".into()))
        }
    }

    fn record(email: &str, is_pro: bool) -> EntitlementRecord {
        EntitlementRecord {
            email: email.into(),
            is_pro,
            upgraded_at: Utc::now(),
        }
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let json = serde_json::to_value(EntitlementRecord::pro("a@b.com")).unwrap();
        assert_eq!(json["email"], "a@b.com");
        assert_eq!(json["isPro"], true);
        assert!(json["upgradedAt"].is_string());
    }

    #[tokio::test]
    async fn test_no_record_is_not_entitled() {
        let resolver = EntitlementResolver::new(Arc::new(MemoryEntitlementStore::new()));

        assert!(matches!(
            resolver.resolve("x@y.com").await,
            Entitlement::NotEntitled
        ));
        assert!(!resolver.is_entitled("x@y.com").await);
    }

    #[tokio::test]
    async fn test_pro_record_is_entitled() {
        let store = MemoryEntitlementStore::with_records([record("pro@example.com", true)]);
        let resolver = EntitlementResolver::new(Arc::new(store));

        assert!(matches!(
            resolver.resolve("pro@example.com").await,
            Entitlement::Entitled
        ));
        assert!(resolver.is_entitled("pro@example.com").await);
    }

    #[tokio::test]
    async fn test_false_flag_is_not_entitled() {
        let store = MemoryEntitlementStore::with_records([record("lapsed@example.com", false)]);
        let resolver = EntitlementResolver::new(Arc::new(store));

        assert!(!resolver.is_entitled("lapsed@example.com").await);
    }

    #[tokio::test]
    async fn test_store_error_fails_closed() {
        let resolver = EntitlementResolver::new(Arc::new(UnreachableStore));

        let entitlement = resolver.resolve("pro@example.com").await;
        assert!(matches!(
            entitlement,
            Entitlement::Unknown(PaymentError::Storage(_))
        ));
        assert!(!entitlement.is_entitled());
        assert!(!resolver.is_entitled("pro@example.com").await);
    }
}
