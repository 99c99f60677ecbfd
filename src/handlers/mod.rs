//! Handler set: the business endpoints behind the router.
//!
//! Handlers are plain functions from `&Request` to `Response`. The few that
//! need shared state capture an `Arc<AppState>`, which is read-only after
//! startup.

pub mod api;
pub mod assets;
pub mod pages;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::http::request::Request;
use crate::server::router::Router;

/// Read-only state shared by handlers.
///
/// Handlers run on the connection's async task, so anything that needs file
/// I/O is loaded here once at startup rather than per request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub started: Instant,
    pub image_path: PathBuf,
    /// Contents of `image_path`, or `None` if it could not be read at startup
    pub image: Option<Vec<u8>>,
}

impl AppState {
    pub fn new(cfg: &Config) -> Self {
        Self::with_image_path(&cfg.static_files.image_path)
    }

    pub fn with_image_path(path: impl Into<PathBuf>) -> Self {
        let image_path = path.into();
        let image = assets::read_static_file(&image_path);
        Self {
            started: Instant::now(),
            image_path,
            image,
        }
    }
}

/// Builds the full route table.
pub fn router(state: Arc<AppState>) -> Router {
    let image_state = Arc::clone(&state);
    let health_state = state;

    Router::new()
        .get("/", pages::root)
        .get("/info", pages::info)
        .get("/glossary", pages::glossary)
        .get("/how-it-works", pages::how_it_works)
        .get("/image", move |req: &Request| assets::image(&image_state, req))
        .get("/api/health", move |req: &Request| api::health(&health_state, req))
        .get("/api/users", api::list_users)
        .get("/api/stats", api::stats)
        .get("/api/time", api::time)
        .post("/echo", pages::echo)
        .post("/data", pages::data)
        .post("/api/users", api::create_user)
        .post("/api/login", api::login)
        .post("/api/calculate", api::calculate)
        .not_found(pages::not_found)
}
