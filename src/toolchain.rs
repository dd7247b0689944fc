//! Local Go toolchain version detection
//!
//! The project's `go.mod` is consulted first; when it is missing or declares no
//! `go` directive, the installed toolchain is asked via `go env GOVERSION`.

use std::path::PathBuf;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::version::descriptor::find_go_version;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("no go.mod with a go directive and no go binary at '{0}'")]
    NotFound(String),

    #[error("'{0}' did not report a Go version")]
    Command(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of the local Go version used for compatibility checks
#[async_trait::async_trait]
pub trait ToolchainDetector: Send + Sync {
    async fn detect(&self) -> Result<String, ToolchainError>;
}

/// Detects the Go version from a project directory and the installed `go` binary
pub struct GoToolchain {
    project_dir: PathBuf,
    go_binary: String,
}

impl GoToolchain {
    pub fn new(project_dir: impl Into<PathBuf>, go_binary: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            go_binary: go_binary.into(),
        }
    }

    /// Version from the project's `go.mod`, if any
    async fn from_go_mod(&self) -> Option<String> {
        let go_mod = self.project_dir.join("go.mod");
        match tokio::fs::read_to_string(&go_mod).await {
            Ok(content) => find_go_version(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read {:?}, asking the go binary: {}", go_mod, e);
                None
            }
        }
    }

    /// Version reported by `go env GOVERSION`
    async fn from_binary(&self) -> Result<String, ToolchainError> {
        let output = Command::new(&self.go_binary)
            .args(["env", "GOVERSION"])
            .current_dir(&self.project_dir)
            .output()
            .await
            .map_err(|e| {
                debug!("Failed to run {}: {}", self.go_binary, e);
                ToolchainError::NotFound(self.go_binary.clone())
            })?;

        if !output.status.success() {
            return Err(ToolchainError::Command(self.go_binary.clone()));
        }

        parse_goversion_output(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| ToolchainError::Command(self.go_binary.clone()))
    }
}

#[async_trait::async_trait]
impl ToolchainDetector for GoToolchain {
    async fn detect(&self) -> Result<String, ToolchainError> {
        if let Some(version) = self.from_go_mod().await {
            info!("Go version from go.mod: {}", version);
            return Ok(version);
        }

        let version = self.from_binary().await?;
        info!("Go version from {}: {}", self.go_binary, version);
        Ok(version)
    }
}

/// A fixed Go version supplied by the caller
pub struct StaticToolchain(String);

impl StaticToolchain {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }
}

#[async_trait::async_trait]
impl ToolchainDetector for StaticToolchain {
    async fn detect(&self) -> Result<String, ToolchainError> {
        Ok(self.0.clone())
    }
}

/// Parse `go env GOVERSION` output such as `go1.22.3` or `go1.23rc1 X:nodwarf5`.
fn parse_goversion_output(output: &str) -> Option<String> {
    let token = output.split_whitespace().next()?;
    let version = token.strip_prefix("go").unwrap_or(token);
    (!version.is_empty()).then(|| version.to_string())
}

/// Convenience for the project directory the CLI runs in
pub fn current_project(go_binary: &str) -> Result<GoToolchain, ToolchainError> {
    let dir = std::env::current_dir()?;
    Ok(GoToolchain::new(dir, go_binary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    const MISSING_BINARY: &str = "go-get-test-missing-go-binary";

    #[tokio::test]
    async fn detect_reads_go_directive_from_go_mod() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("go.mod"),
            "module example.com/app\n\ngo 1.21.4\n",
        )
        .unwrap();

        let toolchain = GoToolchain::new(temp_dir.path(), MISSING_BINARY);

        assert_eq!(toolchain.detect().await.unwrap(), "1.21.4");
    }

    #[tokio::test]
    async fn detect_fails_without_go_mod_or_binary() {
        let temp_dir = TempDir::new().unwrap();

        let toolchain = GoToolchain::new(temp_dir.path(), MISSING_BINARY);
        let result = toolchain.detect().await;

        assert!(matches!(result, Err(ToolchainError::NotFound(_))));
    }

    #[tokio::test]
    async fn detect_falls_back_to_binary_when_go_mod_has_no_directive() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("go.mod"), "module example.com/app\n").unwrap();

        let toolchain = GoToolchain::new(temp_dir.path(), MISSING_BINARY);
        let result = toolchain.detect().await;

        assert!(matches!(result, Err(ToolchainError::NotFound(_))));
    }

    #[tokio::test]
    async fn detect_falls_back_to_binary_when_go_mod_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        // A directory named go.mod cannot be read as a file
        std::fs::create_dir(temp_dir.path().join("go.mod")).unwrap();

        let toolchain = GoToolchain::new(temp_dir.path(), MISSING_BINARY);
        let result = toolchain.detect().await;

        assert!(matches!(result, Err(ToolchainError::NotFound(_))));
    }

    /// Write an executable shell script standing in for the go binary
    #[cfg(unix)]
    fn fake_go(dir: &std::path::Path, script: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-go");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn detect_reads_version_from_go_env_output() {
        let temp_dir = TempDir::new().unwrap();
        let go = fake_go(temp_dir.path(), "echo go1.22.3");

        let toolchain = GoToolchain::new(temp_dir.path(), go);

        assert_eq!(toolchain.detect().await.unwrap(), "1.22.3");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn detect_uses_binary_when_go_mod_is_unreadable() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("go.mod")).unwrap();
        let go = fake_go(temp_dir.path(), "echo go1.21.6");

        let toolchain = GoToolchain::new(temp_dir.path(), go);

        assert_eq!(toolchain.detect().await.unwrap(), "1.21.6");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn detect_reports_failing_go_env() {
        let temp_dir = TempDir::new().unwrap();
        let go = fake_go(temp_dir.path(), "exit 2");

        let toolchain = GoToolchain::new(temp_dir.path(), go);
        let result = toolchain.detect().await;

        assert!(matches!(result, Err(ToolchainError::Command(_))));
    }

    #[tokio::test]
    async fn static_toolchain_returns_given_version() {
        let toolchain = StaticToolchain::new("1.20");

        assert_eq!(toolchain.detect().await.unwrap(), "1.20");
    }

    #[rstest]
    #[case("go1.22.3\n", Some("1.22.3"))]
    #[case("go1.23rc1 X:nodwarf5\n", Some("1.23rc1"))]
    #[case("1.21.0", Some("1.21.0"))]
    #[case("\n", None)]
    #[case("go", None)]
    fn parse_goversion_output_returns_expected(
        #[case] output: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(parse_goversion_output(output), expected.map(String::from));
    }
}
