//! Indexed-query-with-fallback helpers.
//!
//! A listing first tries the indexed query. If the store rejects it (usually
//! because a composite index is missing) the broader unindexed fetch runs and
//! the caller filters and sorts client-side. When both paths fail, listings
//! degrade to an empty result instead of an error.

use std::future::Future;

use tracing::{error, warn};

use crate::error::{StoreError, StoreResult};

/// Run `primary`; on any error, log and run `fallback` instead.
pub async fn with_fallback<T, P, F, Fut>(
    operation: &'static str,
    primary: P,
    fallback: F,
) -> StoreResult<Vec<T>>
where
    P: Future<Output = StoreResult<Vec<T>>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<Vec<T>>>,
{
    match primary.await {
        Ok(items) => Ok(items),
        Err(StoreError::MissingIndex(detail)) => {
            warn!(operation, %detail, "Composite index missing, using unindexed fallback");
            fallback().await
        }
        Err(e) => {
            warn!(operation, error = %e, "Indexed query failed, using unindexed fallback");
            fallback().await
        }
    }
}

/// Collapse a failed listing into an empty result.
pub fn or_empty<T>(operation: &'static str, result: StoreResult<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            error!(operation, error = %e, "Listing failed on both indexed and fallback paths");
            Vec::new()
        }
    }
}
