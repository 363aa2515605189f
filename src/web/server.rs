use actix_web::{web, App, HttpServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

use crate::config::CONFIG;
use crate::web::handlers;
use crate::web::models::AppState;

/// Register the manifest and proxy routes. The rewriter emits `/proxy/?url=`,
/// so both spellings of the proxy path are served.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::playlist).service(
        web::resource(["/proxy", "/proxy/"]).route(web::get().to(handlers::proxy)),
    );
}

pub async fn run_server(state: AppState, shutdown_signal: Arc<Notify>) -> std::io::Result<()> {
    let addr = format!("{}:{}", CONFIG.host, CONFIG.port)
        .parse::<SocketAddr>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let state = web::Data::new(state);
    let server = HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(addr)?;

    info!("Starting stream proxy on: {addr}, public url {}", CONFIG.base_url);

    let server_handle = server.run();

    tokio::select! {
        result = server_handle => result,
        _ = shutdown_signal.notified() => {
            info!("Shutdown signal received, stopping web server");
            Ok(())
        }
    }
}
