//! VersionSource trait for reading module listings and descriptors from a registry

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;

/// Trait for fetching module versions and their Go requirements from a registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait VersionSource: Send + Sync {
    /// Lists the versions worth probing for a module
    ///
    /// # Arguments
    /// * `module` - The module path (e.g., "github.com/gin-gonic/gin")
    ///
    /// # Returns
    /// * `Ok(Vec<String>)` - Filtered versions, ordered from oldest to newest
    /// * `Err(RegistryError)` - If the listing cannot be fetched
    async fn list_versions(&self, module: &str) -> Result<Vec<String>, RegistryError>;

    /// Fetches the minimum Go version declared by one module version
    ///
    /// # Returns
    /// * `Ok(Some(version))` - The `go` directive of the version's descriptor
    /// * `Ok(None)` - The descriptor declares no minimum
    /// * `Err(RegistryError)` - If the descriptor cannot be fetched
    async fn fetch_requirement(
        &self,
        module: &str,
        version: &str,
    ) -> Result<Option<String>, RegistryError>;
}
