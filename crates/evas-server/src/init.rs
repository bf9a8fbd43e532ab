//! Server initialization
//!
//! Loads configuration, installs logging, bootstraps the application server
//! and keeps it up until ctrl-c or SIGTERM, then shuts it down.
//!
//! ```text
//! run ─ config ─ logging ─ serve ─┬─ bootstrap (factory loads the server)
//!                                 ├─ wait for the shutdown token
//!                                 └─ shutdown (factory destroys the server)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use evas_domain::error::Result;
use evas_infrastructure::config::{AppConfig, ConfigLoader};
use evas_infrastructure::error_ext::ErrorTree;
use evas_infrastructure::loader::ModuleManifest;
use evas_infrastructure::logging::init_logging;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::constants::EXIT_FAILURE;
use crate::factory::ApplicationServerFactory;

/// Command line overrides for [`run`]
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Artifact root, overriding `server.root`
    pub root: Option<PathBuf>,
}

/// Load configuration honoring `options`
pub fn load_config(options: &RunOptions) -> Result<AppConfig> {
    let loader = match &options.config_path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if let Some(root) = &options.root {
        config.server.root.clone_from(root);
    }
    Ok(config)
}

/// Run the server until a shutdown signal arrives
///
/// Modules come from every linked crate's compile-time registrations.
pub async fn run(options: RunOptions) -> ExitCode {
    let config = match load_config(&options) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{}", ErrorTree(&error));
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    if let Err(error) = init_logging(&config.logging) {
        eprintln!("{}", ErrorTree(&error));
        return ExitCode::from(EXIT_FAILURE);
    }

    let manifest = ModuleManifest::from_registered(&config.server.root);
    info!(
        server = %config.server.name,
        root = %config.server.root.display(),
        modules = manifest.len(),
        "Starting EVAS"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    match serve(config, manifest, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(EXIT_FAILURE),
    }
}

/// Bootstrap the server, wait for `shutdown`, then tear it down
///
/// Failures are logged as an error tree before being returned.
pub async fn serve(
    config: AppConfig,
    manifest: ModuleManifest,
    shutdown: CancellationToken,
) -> Result<()> {
    let root = config.server.root.clone();
    let name = config.server.name.clone();
    let factory = ApplicationServerFactory::new(manifest);

    let started = Instant::now();
    if let Err(error) = factory.create_instance(config).await {
        error!(server = %name, "Bootstrap failed:\n{}", ErrorTree(&error));
        return Err(error);
    }
    info!(server = %name, elapsed = ?started.elapsed(), "Bootstrap complete");

    shutdown.cancelled().await;

    let stopping = Instant::now();
    match factory.destroy_instances(Some(&root)).await {
        Ok(()) => {
            info!(server = %name, elapsed = ?stopping.elapsed(), "Shutdown complete");
            Ok(())
        }
        Err(error) => {
            error!(server = %name, "Shutdown failed:\n{}", ErrorTree(&error));
            Err(error)
        }
    }
}

/// Cancel `token` on ctrl-c or SIGTERM
///
/// Returns without cancelling when the token is cancelled elsewhere first.
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
        () = token.cancelled() => return,
    }
    token.cancel();
}
