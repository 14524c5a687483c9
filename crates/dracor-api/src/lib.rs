//! JSON endpoints over one loaded metrics table.

mod error;
mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use dracor_core::network::NetworkSource;
use dracor_core::CorpusMetricsPipeline;

pub use error::ApiError;

pub struct AppState {
    pub pipeline: CorpusMetricsPipeline,
    pub source: Arc<dyn NetworkSource>,
}

pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/corpora", get(routes::corpora))
        .route("/corpora/{corpus}/plays", get(routes::corpus_plays))
        .route("/bounds", get(routes::bounds))
        .route("/summary", get(routes::summary))
        .route("/centuries", get(routes::centuries))
        .route("/plays/classified", get(routes::classified))
        .route("/plays/scatter", get(routes::scatter))
        .route("/networks", get(routes::networks))
        .with_state(app_state)
}
