//! Registry test utilities
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use go_get::toolchain::StaticToolchain;
use go_get::version::cache::{CacheDocument, CompatibilityCache};
use go_get::version::error::RegistryError;
use go_get::version::resolver::Resolver;
use go_get::version::source::VersionSource;

/// In-memory registry for testing
#[derive(Default)]
pub struct MockRegistry {
    versions: HashMap<String, Vec<String>>,
    requirements: HashMap<(String, String), Option<String>>,
    failing: HashSet<(String, String)>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a version (oldest first) with its `go` directive, `None` for no directive
    pub fn with_version(mut self, module: &str, version: &str, requires: Option<&str>) -> Self {
        self.versions
            .entry(module.to_string())
            .or_default()
            .push(version.to_string());
        self.requirements.insert(
            (module.to_string(), version.to_string()),
            requires.map(|r| r.to_string()),
        );
        self
    }

    /// Add a version whose descriptor fetch fails
    pub fn with_failing_version(mut self, module: &str, version: &str) -> Self {
        self.versions
            .entry(module.to_string())
            .or_default()
            .push(version.to_string());
        self.failing
            .insert((module.to_string(), version.to_string()));
        self
    }
}

#[async_trait]
impl VersionSource for MockRegistry {
    async fn list_versions(&self, module: &str) -> Result<Vec<String>, RegistryError> {
        match self.versions.get(module) {
            Some(versions) => Ok(versions.clone()),
            None => Err(RegistryError::NotFound(module.to_string())),
        }
    }

    async fn fetch_requirement(
        &self,
        module: &str,
        version: &str,
    ) -> Result<Option<String>, RegistryError> {
        let key = (module.to_string(), version.to_string());
        if self.failing.contains(&key) {
            return Err(RegistryError::InvalidResponse(
                "Unexpected status: 503 Service Unavailable".to_string(),
            ));
        }
        self.requirements
            .get(&key)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(module.to_string()))
    }
}

/// Create a resolver over `source` with a fixed Go version and a temporary cache
pub fn create_test_resolver(
    source: Arc<dyn VersionSource>,
    go_version: &str,
) -> (TempDir, Resolver) {
    let temp_dir = TempDir::new().unwrap();
    let resolver = Resolver::new(
        source,
        Arc::new(StaticToolchain::new(go_version)),
        cache_file(temp_dir.path()),
    )
    .with_concurrency(4);
    (temp_dir, resolver)
}

pub fn cache_file(dir: &Path) -> PathBuf {
    dir.join("compat-cache.json")
}

/// Pre-populate the cache document at `path`
pub fn seed_cache(path: &Path, entries: &[(&str, &str, &str)]) {
    let cache = CompatibilityCache::load(path);
    for (toolchain, module, version) in entries {
        cache.store(toolchain, module, version).unwrap();
    }
    cache.persist().unwrap();
}

pub fn read_cache(path: &Path) -> CacheDocument {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
