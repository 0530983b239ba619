//! Serve an in-memory key/value collection over HTTP
//!
//! ```bash
//! COLLECTION_SERVICE__PORT=3000 collection-server
//! ```

use std::net::SocketAddr;

use collection_service::prelude::*;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    init_tracing(&config)?;

    let service = with_item_hrefs(CollectionService::new(MemoryStore::new()), &config.collection);
    let app = router(service, config.collection.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.service.port));
    tracing::info!("Starting {} on {}", config.service.name, addr);
    tracing::info!("  - Collection href: {}", config.collection.href);
    tracing::info!("  - Profile: {}", config.collection.profile_href);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
