mod handlers;
mod models;
mod routes;
mod services;
mod store;
mod utils;

use std::error::Error;

use axum::serve;
use routes::{init_tracing, make_app};
use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    init_tracing();

    let app = match make_app().await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start: {}", e);
            return Err(e);
        }
    };

    let addr = format!("{}:{}", app.config.host, app.config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server is running on http://{}", addr);

    let served = serve(listener, app.router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    app.sweeper.abort();
    app.store.close().await;
    served?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutting down");
}
