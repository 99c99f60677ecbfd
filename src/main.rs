use std::process::ExitCode;
use std::sync::Arc;

use courier::config::{self, Config};
use courier::handlers::{self, AppState};
use courier::server::{Shutdown, listener, signals};

const USAGE: &str = "usage: courier [PORT]\n  PORT  TCP port to listen on, 1-65535 (default 8080)";

#[tokio::main]
async fn main() -> ExitCode {
    let mut cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(arg) = std::env::args().nth(1) {
        match config::parse_port(&arg) {
            Ok(port) => cfg.server.port = port,
            Err(e) => {
                eprintln!("error: {e}\n{USAGE}");
                return ExitCode::FAILURE;
            }
        }
    }

    let level = cfg.log_level().unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(level)
        .init();

    let shutdown = Shutdown::new();
    let _signals = signals::spawn_signal_listener(shutdown.clone());

    let router = Arc::new(handlers::router(Arc::new(AppState::new(&cfg))));
    tracing::info!(port = cfg.server.port, routes = router.len(), "Starting server");

    match listener::run(&cfg.server, router, shutdown).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Server failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
