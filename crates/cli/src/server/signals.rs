use crate::bootstrap;
use scriptdns_application::use_cases::ReloadZonesUseCase;
use scriptdns_domain::{CliOverrides, Config};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Resolves on Ctrl+C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "Cannot listen for SIGTERM, only Ctrl+C stops the server"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

/// Re-reads the configuration and reloads every zone's script on SIGHUP.
pub fn spawn_reload_on_hangup(
    config_path: Option<String>,
    reload: Arc<ReloadZonesUseCase>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut hangup = match signal(SignalKind::hangup()) {
                Ok(hangup) => hangup,
                Err(e) => {
                    warn!(error = %e, "Cannot listen for SIGHUP, hot reload disabled");
                    return;
                }
            };

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    received = hangup.recv() => {
                        if received.is_none() {
                            break;
                        }
                        info!("SIGHUP received, reloading scripts");
                        reload_once(config_path.as_deref(), &reload).await;
                    }
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = (config_path, reload);
            shutdown.cancelled().await;
        }
    })
}

async fn reload_once(config_path: Option<&str>, reload: &ReloadZonesUseCase) {
    let path = bootstrap::config::reload_path(config_path);
    let config = match Config::load(path.as_deref(), CliOverrides::default())
        .and_then(|config| config.validate().map(|()| config))
    {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Reload aborted, configuration is invalid");
            return;
        }
    };

    if let Err(e) = reload.execute(&config.zones).await {
        error!(error = %e, "Reload failed");
    }
}
