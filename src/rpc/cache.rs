//! Lazily created, explicitly invalidated read-only provider.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::info;

use super::provider::{create_provider, ChainDataProvider};
use crate::error::SessionResult;

/// Holds at most one read-only provider.
///
/// The provider is built on the first [`ProviderCache::get_or_create`] and
/// reused until [`ProviderCache::invalidate`] drops it.
#[derive(Debug, Default)]
pub struct ProviderCache {
    slot: Mutex<Option<Arc<ChainDataProvider>>>,
}

impl ProviderCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached provider, creating it for `endpoint` if none exists.
    ///
    /// # Errors
    ///
    /// Propagates [`create_provider`] errors; the cache stays empty.
    pub fn get_or_create(
        &self,
        endpoint: &str,
        timeout: Duration,
    ) -> SessionResult<Arc<ChainDataProvider>> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(provider) = slot.as_ref() {
            return Ok(Arc::clone(provider));
        }

        let provider = Arc::new(create_provider(endpoint, timeout)?);
        info!(transport = ?provider.transport(), "Read-only provider created");
        *slot = Some(Arc::clone(&provider));
        Ok(provider)
    }

    /// Drop the cached provider.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            info!("Read-only provider invalidated");
        }
    }

    /// Whether a provider is cached.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
