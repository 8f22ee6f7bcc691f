//! In-memory seen-set store used as a test fake.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::SeenSet;
use crate::storage::SeenStore;

/// Seen-set held in memory; counts saves so callers can assert on them.
#[derive(Debug, Default)]
pub struct MemorySeenStore {
    seen: Mutex<SeenSet>,
    saves: Mutex<usize>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given identifiers.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            seen: Mutex::new(ids.into_iter().map(Into::into).collect()),
            saves: Mutex::new(0),
        }
    }

    /// Current contents.
    pub fn snapshot(&self) -> SeenSet {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of completed `save` calls.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SeenStore for MemorySeenStore {
    async fn load(&self) -> Result<SeenSet> {
        Ok(self.snapshot())
    }

    async fn save(&self, seen: &SeenSet) -> Result<()> {
        *self.seen.lock().unwrap_or_else(PoisonError::into_inner) = seen.clone();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
