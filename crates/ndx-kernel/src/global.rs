//! Process-wide kernel registry
//!
//! Backends are loaded into a [`RegistryBuilder`](crate::RegistryBuilder)
//! during initialization and the frozen registry is installed here once.
//! Readers take a snapshot `Arc` and never observe a half-built registry.
//! Replacing or clearing the installed registry is explicit (`install`,
//! `reset`) and is meant for initialization and test isolation only.

use crate::registry::KernelRegistry;
use lazy_static::lazy_static;
use ndx_core::{Error, Result};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

lazy_static! {
    static ref GLOBAL_REGISTRY: RwLock<Option<Arc<KernelRegistry>>> = RwLock::new(None);
}

/// Install `registry` as the process-wide registry, returning the previous one
pub fn install(registry: KernelRegistry) -> Option<Arc<KernelRegistry>> {
    let registry = Arc::new(registry);
    info!(kernels = registry.len(), "installing kernel registry");
    GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .replace(registry)
}

/// Install the registry produced by `init` unless one is already installed.
///
/// Once installed, this only takes the read lock. `init` runs at most once
/// per installation, under the write lock.
pub fn get_or_install<F>(init: F) -> Result<Arc<KernelRegistry>>
where
    F: FnOnce() -> Result<KernelRegistry>,
{
    if let Some(registry) = GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
    {
        return Ok(Arc::clone(registry));
    }

    let mut slot = GLOBAL_REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
    // Another thread may have installed one between the two locks
    if let Some(registry) = slot.as_ref() {
        return Ok(Arc::clone(registry));
    }
    let registry = Arc::new(init()?);
    info!(kernels = registry.len(), "installing kernel registry");
    *slot = Some(Arc::clone(&registry));
    Ok(registry)
}

/// Snapshot of the installed registry
pub fn registry() -> Result<Arc<KernelRegistry>> {
    GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .ok_or(Error::NotInitialized)
}

pub fn is_initialized() -> bool {
    GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .is_some()
}

/// Remove the installed registry. Snapshots already handed out stay valid.
pub fn reset() -> Option<Arc<KernelRegistry>> {
    GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take()
}
