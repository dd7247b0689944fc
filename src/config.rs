use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

// =============================================================================
// Registry and probe constants
// =============================================================================

/// Default base URL for the Go module proxy
pub const DEFAULT_PROXY_URL: &str = "https://proxy.golang.org";

/// Maximum number of `.mod` fetches in flight for a single resolution
pub const DEFAULT_PROBE_CONCURRENCY: usize = 16;

/// Overall resolution deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Timeout for a single registry request in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

/// User settings read from `config.json` in the data directory
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub proxy_url: String,
    pub concurrency: usize,
    /// Overall resolution deadline, 0 disables it
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            concurrency: DEFAULT_PROBE_CONCURRENCY,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing file yields defaults. A malformed file is logged and also yields defaults.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {:?}, using defaults", path);
                return Self::default();
            }
            Err(e) => {
                warn!("Failed to read settings {:?}: {}", path, e);
                return Self::default();
            }
        };

        serde_json::from_str(&content)
            .inspect_err(|e| warn!("Ignoring malformed settings {:?}: {}", path, e))
            .unwrap_or_default()
    }

    /// Apply the `GOPROXY` environment variable on top of the file settings.
    pub fn with_env(self) -> Self {
        self.with_goproxy(std::env::var("GOPROXY").ok())
    }

    fn with_goproxy(mut self, goproxy: Option<String>) -> Self {
        if let Some(url) = goproxy.as_deref().and_then(proxy_from_goproxy) {
            debug!("Using proxy {} from GOPROXY", url);
            self.proxy_url = url;
        }
        self
    }

    /// Concurrency clamped to at least one worker
    pub fn probe_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// Pick the first HTTP(S) proxy out of a `GOPROXY` list.
///
/// Entries are separated by `,` or `|`; `direct` and `off` are skipped.
pub fn proxy_from_goproxy(goproxy: &str) -> Option<String> {
    goproxy
        .split([',', '|'])
        .map(str::trim)
        .find(|entry| entry.starts_with("https://") || entry.starts_with("http://"))
        .map(|entry| entry.trim_end_matches('/').to_string())
}

/// Returns the path to the data directory for go-get.
/// Uses $XDG_DATA_HOME/go-get if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/go-get,
/// or ./go-get if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the compatibility cache document.
pub fn cache_path() -> PathBuf {
    data_dir().join("compat-cache.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("go-get.log")
}

/// Returns the path to the optional settings file.
pub fn settings_path() -> PathBuf {
    data_dir().join("config.json")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("go-get")
}
