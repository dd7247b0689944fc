//! Go proxy registry API implementation

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::version::descriptor::find_go_version;
use crate::version::error::RegistryError;
use crate::version::filter::filter_stable_versions;
use crate::version::semver::sort_ascending;
use crate::version::source::VersionSource;

/// VersionSource implementation for the Go proxy protocol
pub struct GoProxyRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl GoProxyRegistry {
    /// Creates a new GoProxyRegistry with a custom base URL
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("go-get/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
            .build()?;

        Ok(Self::with_client(client, base_url))
    }

    /// Creates a GoProxyRegistry sharing an existing HTTP client
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_text(&self, url: &str, module: &str) -> Result<String, RegistryError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();

        // Go proxy returns 404 or 410 for modules and versions that don't exist
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            return Err(RegistryError::NotFound(module.to_string()));
        }

        if !status.is_success() {
            warn!("Go proxy returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        response.text().await.map_err(|e| {
            warn!("Failed to read Go proxy response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })
    }
}

#[async_trait::async_trait]
impl VersionSource for GoProxyRegistry {
    async fn list_versions(&self, module: &str) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/{}/@v/list", self.base_url, escape_path(module));
        debug!("Listing versions: {}", url);

        let body = self.get_text(&url, module).await?;

        // Go proxy returns versions one per line, in no guaranteed order
        let all_versions: Vec<String> = body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
            .collect();

        let mut versions = filter_stable_versions(module, all_versions);
        sort_ascending(&mut versions);
        Ok(versions)
    }

    async fn fetch_requirement(
        &self,
        module: &str,
        version: &str,
    ) -> Result<Option<String>, RegistryError> {
        let url = format!(
            "{}/{}/@v/{}.mod",
            self.base_url,
            escape_path(module),
            escape_path(version)
        );

        let body = self.get_text(&url, module).await?;
        Ok(find_go_version(&body))
    }
}

/// Escapes a module path or version for use in proxy URLs.
/// Uppercase letters are escaped as !{lowercase}.
fn escape_path(path: &str) -> String {
    let mut result = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            result.push('!');
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
