use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::domain::model::ServiceRegistration;
use crate::domain::ports::Discovery;
use crate::utils::error::Result;

/// Owns this process's registry entry: advertises once the listener is
/// bound, withdraws the entry on shutdown.
pub struct Registrar {
    discovery: Arc<dyn Discovery>,
    registration: ServiceRegistration,
}

impl Registrar {
    pub fn new(discovery: Arc<dyn Discovery>, registration: ServiceRegistration) -> Self {
        Registrar {
            discovery,
            registration,
        }
    }

    pub fn id(&self) -> &str {
        &self.registration.id
    }

    pub async fn register(&self) -> Result<()> {
        self.discovery.register(&self.registration).await?;
        tracing::info!(
            "📡 registered {} as {} ({}:{}, checked every {}s)",
            self.registration.name,
            self.registration.id,
            self.registration.address,
            self.registration.port,
            self.registration.check_interval_secs
        );
        Ok(())
    }

    /// Best effort: the registry reaps entries whose check goes
    /// critical anyway, the explicit call just clears resolution
    /// immediately.
    pub async fn deregister(&self) {
        match self.discovery.deregister(&self.registration.id).await {
            Ok(()) => tracing::info!("📡 deregistered {}", self.registration.id),
            Err(e) => tracing::warn!(
                "🔶 could not deregister {}: {}",
                self.registration.id,
                e
            ),
        }
    }
}

/// Serves `app` with the registration lifecycle wrapped around it.
///
/// The entry is advertised only after the listener is already bound,
/// so the health check never probes a dead port. When `shutdown`
/// resolves the entry is withdrawn first, then in-flight requests
/// drain.
pub async fn serve_with_registration(
    listener: TcpListener,
    app: Router,
    registrar: Registrar,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    registrar.register().await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            registrar.deregister().await;
        })
        .await?;

    Ok(())
}

/// Resolves on SIGINT or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("❌ could not install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("❌ could not install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("🛑 shutdown signal received");
}
