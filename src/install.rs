//! Hand-off of the selected version to `go get`

use std::process::ExitStatus;

use thiserror::Error;
use tokio::process::Command;
use tracing::info;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("failed to run go get: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("go get exited with {0}")]
    Failed(ExitStatus),
}

/// The `module@version` argument passed to `go get`
pub fn target(module: &str, version: &str) -> String {
    format!("{}@{}", module, version)
}

/// Run `<go_binary> get module@version` with inherited stdio.
pub async fn go_get(go_binary: &str, module: &str, version: &str) -> Result<(), InstallError> {
    let target = target(module, version);
    info!("Running {} get {}", go_binary, target);

    let status = Command::new(go_binary)
        .arg("get")
        .arg(&target)
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(InstallError::Failed(status))
    }
}
