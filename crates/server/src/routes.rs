use axum::{
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use common::types::Health;

use crate::handlers::listings;
use crate::state::ServerState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn home() -> Redirect {
    Redirect::to("/listings")
}

/// Build the full application router
pub fn build_router(state: ServerState) -> Router {
    let listing_routes = Router::new()
        .route("/listings", get(listings::index).post(listings::store))
        .route("/listings/create", get(listings::create_form))
        .route("/listings/search", get(listings::search))
        .route(
            "/listings/:id",
            get(listings::show).put(listings::update).post(listings::update).delete(listings::destroy),
        )
        .route("/listings/:id/edit", get(listings::edit_form).post(listings::update))
        .route("/listings/:id/delete", post(listings::destroy));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .merge(listing_routes)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                // one span per request
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
