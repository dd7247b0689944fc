//! Newest compatible version resolution
//!
//! Ties together toolchain detection, the registry listing, the compatibility
//! cache and the prober:
//!
//! ```text
//! detect Go version -> list versions -> load cache
//!     -> cache hit (no refresh)          -> done
//!     -> miss / refresh -> probe -> select -> store + persist -> done
//! ```

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_PROBE_CONCURRENCY, Settings};
use crate::toolchain::ToolchainDetector;
use crate::version::cache::CompatibilityCache;
use crate::version::error::{RegistryError, ResolveError};
use crate::version::prober::{ConcurrentProber, ProbeResults};
use crate::version::registries::GoProxyRegistry;
use crate::version::source::VersionSource;

pub struct Resolver {
    source: Arc<dyn VersionSource>,
    toolchain: Arc<dyn ToolchainDetector>,
    prober: ConcurrentProber,
    cache_path: PathBuf,
    cache: OnceCell<CompatibilityCache>,
    timeout: Option<Duration>,
}

impl Resolver {
    pub fn new(
        source: Arc<dyn VersionSource>,
        toolchain: Arc<dyn ToolchainDetector>,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            prober: ConcurrentProber::new(Arc::clone(&source), DEFAULT_PROBE_CONCURRENCY),
            source,
            toolchain,
            cache_path: cache_path.into(),
            cache: OnceCell::new(),
            timeout: None,
        }
    }

    /// Build a resolver backed by the Go proxy named in `settings`
    pub fn from_settings(
        settings: &Settings,
        toolchain: Arc<dyn ToolchainDetector>,
        cache_path: impl Into<PathBuf>,
    ) -> Result<Self, RegistryError> {
        let registry = GoProxyRegistry::new(&settings.proxy_url)?;
        Ok(Self::new(Arc::new(registry), toolchain, cache_path)
            .with_concurrency(settings.probe_concurrency())
            .with_timeout(settings.timeout()))
    }

    pub fn with_concurrency(mut self, capacity: usize) -> Self {
        self.prober = ConcurrentProber::new(Arc::clone(&self.source), capacity);
        self
    }

    /// Overall deadline for a single resolution, `None` for no deadline
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Cache shared by every resolution on this resolver, loaded on first use
    async fn cache(&self) -> &CompatibilityCache {
        self.cache
            .get_or_init(|| async { CompatibilityCache::load(&self.cache_path) })
            .await
    }

    /// Resolve the newest version of `module` that builds with the local Go toolchain.
    ///
    /// With `force_refresh` the cached selection is ignored and every listed
    /// version is probed again.
    pub async fn resolve(&self, module: &str, force_refresh: bool) -> Result<String, ResolveError> {
        self.resolve_with_cancel(module, force_refresh, &CancellationToken::new())
            .await
    }

    /// Like [`resolve`](Self::resolve), aborting outstanding fetches when `cancel` fires.
    pub async fn resolve_with_cancel(
        &self,
        module: &str,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<String, ResolveError> {
        let Some(limit) = self.timeout else {
            return self.run(module, force_refresh, cancel).await;
        };

        match tokio::time::timeout(limit, self.run(module, force_refresh, cancel)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Resolving {} timed out after {:?}", module, limit);
                Err(ResolveError::Timeout(limit))
            }
        }
    }

    async fn run(
        &self,
        module: &str,
        force_refresh: bool,
        cancel: &CancellationToken,
    ) -> Result<String, ResolveError> {
        let toolchain = until_cancelled(cancel, self.toolchain.detect())
            .await?
            .map_err(ResolveError::ToolchainVersionUnresolvable)?;
        info!("Resolving {} for Go {}", module, toolchain);

        let versions = until_cancelled(cancel, self.source.list_versions(module)).await??;
        if versions.is_empty() {
            return Err(ResolveError::NoVersionsAvailable(module.to_string()));
        }
        debug!("{} candidate versions for {}", versions.len(), module);

        let cache = self.cache().await;

        if force_refresh {
            info!("Refresh forced, ignoring cached selection for {}", module);
        } else {
            match cache.lookup(&toolchain, module, &versions) {
                Ok(Some(version)) => {
                    info!("Using cached version {} of {}", version, module);
                    return Ok(version);
                }
                Ok(None) => debug!("No usable cache entry for {}", module),
                Err(e) => warn!("Failed to read cache entry for {}: {}", module, e),
            }
        }

        let results = self
            .prober
            .probe(module, &versions, &toolchain, cancel)
            .await?;

        let selected = select_most_recent_compatible(&versions, &results)
            .cloned()
            .ok_or_else(|| ResolveError::NoCompatibleVersion {
                module: module.to_string(),
                toolchain: toolchain.clone(),
            })?;
        info!(
            "Selected {}@{} compatible with Go {}",
            module, selected, toolchain
        );

        let _ = cache
            .store(&toolchain, module, &selected)
            .and_then(|()| cache.persist())
            .inspect_err(|e| warn!("Failed to update cache {:?}: {}", cache.path(), e));

        Ok(selected)
    }
}

/// Pick the newest version marked compatible.
///
/// `versions` is ordered oldest to newest, so the scan runs from the end.
pub fn select_most_recent_compatible<'a>(
    versions: &'a [String],
    results: &ProbeResults,
) -> Option<&'a String> {
    versions
        .iter()
        .rev()
        .find(|version| results.get(*version).copied().unwrap_or(false))
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = T>,
) -> Result<T, ResolveError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(ResolveError::Cancelled),
        value = future => Ok(value),
    }
}
