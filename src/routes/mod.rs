// HTTP routes

mod http;

pub use http::ApiError;

use axum::{Router, routing::get};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};

use crate::config::AppConfig;
use crate::report_repo::ReportRepo;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) report_repo: Arc<ReportRepo>,
}

pub fn app(report_repo: Arc<ReportRepo>, config: &AppConfig) -> Router {
    let state = AppState { report_repo };
    let router: Router = Router::new()
        .route("/api/nmt", get(http::nmt_handler)) // GET /api/nmt?begin=&end=
        .route("/version", get(http::version_handler)) // GET /version
        .with_state(state);

    let router = match config.server.static_dir {
        // SPA: serve built assets, unknown paths fall back to index.html
        Some(ref dir) => {
            let index = Path::new(dir).join("index.html");
            router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)))
        }
        None => router.route("/", get(|| async { "nmtscope: NMT reports at /api/nmt" })),
    };

    router.layer(CorsLayer::new().allow_origin(Any))
}
