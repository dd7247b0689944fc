//! Bounded-parallel compatibility probing
//!
//! Every candidate version gets its own task; a semaphore caps how many `.mod`
//! fetches are in flight at once. Results are only read after every task has
//! joined, so completion order never influences the caller.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::version::error::ResolveError;
use crate::version::semver::is_toolchain_compatible;
use crate::version::source::VersionSource;

/// Version -> compatible with the local toolchain
pub type ProbeResults = HashMap<String, bool>;

pub struct ConcurrentProber {
    source: Arc<dyn VersionSource>,
    capacity: usize,
}

impl ConcurrentProber {
    pub fn new(source: Arc<dyn VersionSource>, capacity: usize) -> Self {
        Self {
            source,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check every version of `module` against the `local` Go version.
    ///
    /// A version whose descriptor cannot be fetched is recorded as incompatible.
    /// Fails only when `cancel` fires, in which case all outstanding fetches
    /// are aborted.
    pub async fn probe(
        &self,
        module: &str,
        versions: &[String],
        local: &str,
        cancel: &CancellationToken,
    ) -> Result<ProbeResults, ResolveError> {
        debug!(
            "Probing {} versions of {} with {} workers",
            versions.len(),
            module,
            self.capacity
        );

        let semaphore = Arc::new(Semaphore::new(self.capacity));
        let mut tasks = JoinSet::new();

        for version in versions {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let module = module.to_string();
            let version = version.clone();
            let local = local.to_string();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire().await else {
                    return (version, false);
                };
                let compatible = check_version(source.as_ref(), &module, &version, &local).await;
                (version, compatible)
            });
        }

        // Anything that never reports back (e.g. a panicked task) stays incompatible
        let mut results: ProbeResults = versions.iter().map(|v| (v.clone(), false)).collect();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(ResolveError::Cancelled);
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok((version, compatible))) => {
                        results.insert(version, compatible);
                    }
                    Some(Err(e)) => warn!("Probe task for {} failed: {}", module, e),
                    None => break,
                },
            }
        }

        Ok(results)
    }
}

async fn check_version(
    source: &dyn VersionSource,
    module: &str,
    version: &str,
    local: &str,
) -> bool {
    match source.fetch_requirement(module, version).await {
        Ok(Some(required)) => {
            let compatible = is_toolchain_compatible(local, &required);
            debug!(
                "{}@{} requires Go {} (compatible: {})",
                module, version, required, compatible
            );
            compatible
        }
        Ok(None) => {
            debug!("{}@{} declares no Go version, assuming compatible", module, version);
            true
        }
        Err(e) => {
            warn!("Failed to probe {}@{}: {}", module, version, e);
            false
        }
    }
}
