use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::api;
use crate::db::Database;
use crate::error::SomanaError;

pub struct WebServer {
    host: String,
    port: u16,
}

impl WebServer {
    pub fn new(host: String, port: u16) -> Self {
        Self { host, port }
    }

    pub async fn start(&self) -> Result<(), SomanaError> {
        let app = Self::create_router();

        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| SomanaError::Error(format!("Invalid address: {}", e)))?;

        println!("Somana server starting on http://{}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| SomanaError::Error(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("Server ready to handle requests");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                log::info!("Shutdown signal received, stopping server");
                println!("\nShutdown signal received - stopping server gracefully...");
            })
            .await
            .map_err(|e| SomanaError::Error(format!("Server error: {}", e)))?;

        log::info!("Server shutdown complete");
        println!("   Server stopped");

        Ok(())
    }

    pub fn create_router() -> Router {
        Router::new()
            // Health check
            .route("/health", get(health_check))

            // Article endpoints
            .route(
                "/api/v1/blogs",
                get(api::blogs::list_blogs).post(api::blogs::create_blog),
            )

            // Music endpoints
            .route(
                "/api/v1/music",
                get(api::music::list_music).post(api::music::create_music),
            )

            // Podcast endpoints
            .route(
                "/api/v1/podcasts",
                get(api::podcasts::list_podcasts).post(api::podcasts::create_podcast),
            )

            // Author endpoints
            .route(
                "/api/v1/authors/{author}/stats",
                get(api::authors::get_author_stats),
            )
    }
}

async fn health_check() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "statusText": "success",
            "message": "Server is running",
            "data": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
                "database": Database::is_open(),
            }
        })),
    )
}

/// Waits for a shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received SIGINT (Ctrl+C)");
        },
        _ = terminate => {
            log::info!("Received SIGTERM");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_builds() {
        let _router = WebServer::create_router();
    }

    #[tokio::test]
    async fn test_health_check() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "somana");
    }
}
