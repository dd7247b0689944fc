use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use go_get::config::{self, Settings};
use go_get::install;
use go_get::logging;
use go_get::toolchain::{self, StaticToolchain, ToolchainDetector};
use go_get::version::resolver::Resolver;

/// Automatically get the latest compatible version of a Go module
///
/// Detects the local Go version, lists the module's published versions,
/// skips pre-releases, and runs `go get` with the newest version whose
/// go.mod is satisfied by your toolchain.
#[derive(Parser)]
#[command(name = "go-get", version)]
struct Cli {
    /// Module path, e.g. github.com/gin-gonic/gin
    module: String,

    /// Enable verbose logging to show detailed progress
    #[arg(short, long)]
    verbose: bool,

    /// Global timeout in seconds (0 means no timeout)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Force refresh cache and fetch the latest module information
    #[arg(short, long)]
    refresh: bool,

    /// Maximum number of concurrent registry requests
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Use this Go version instead of detecting it
    #[arg(long, value_name = "VERSION")]
    go_version: Option<String>,

    /// Go binary used for detection and `go get`
    #[arg(long, value_name = "PATH", default_value = "go")]
    go: String,

    /// Print the selected module@version without running `go get`
    #[arg(short = 'n', long)]
    dry_run: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file and environment settings
    fn settings(&self) -> Settings {
        let mut settings = Settings::load(&config::settings_path()).with_env();
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        settings
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.verbose, &config::log_path());

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings();
    debug!("Settings: {:?}", settings);

    let detector: Arc<dyn ToolchainDetector> = match &cli.go_version {
        Some(version) => Arc::new(StaticToolchain::new(version.clone())),
        None => Arc::new(toolchain::current_project(&cli.go)?),
    };

    let resolver = Resolver::from_settings(&settings, detector, config::cache_path())?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling outstanding requests");
            interrupt.cancel();
        }
    });

    let version = resolver
        .resolve_with_cancel(&cli.module, cli.refresh, &cancel)
        .await?;
    let target = install::target(&cli.module, &version);

    if cli.dry_run {
        println!("{}", target);
        return Ok(());
    }

    println!("Latest compatible version of {}: {}", cli.module, version);
    install::go_get(&cli.go, &cli.module, &version).await?;
    println!("Successfully installed {}", target);
    Ok(())
}
