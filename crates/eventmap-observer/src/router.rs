//! Axum router construction for the map API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for the browser map client.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use eventmap_core::Geocoder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the map server.
///
/// See [`handlers`] for the endpoint table. CORS allows any origin so the
/// map client can be served from elsewhere during development.
pub fn build_router<G: Geocoder>(state: Arc<AppState<G>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index::<G>))
        // WebSocket
        .route("/ws/view", get(ws::ws_view::<G>))
        // Reads
        .route("/api/view", get(handlers::get_view::<G>))
        .route("/api/counts", get(handlers::get_counts::<G>))
        .route("/api/geocode", get(handlers::geocode::<G>))
        // View commands
        .route("/api/filter", put(handlers::set_filter::<G>))
        .route("/api/camera", put(handlers::set_camera::<G>))
        .route("/api/clusters/{id}/open", post(handlers::open_cluster::<G>))
        .route("/api/events/{id}/open", post(handlers::open_event::<G>))
        .route("/api/events/{id}/focus", post(handlers::focus_event::<G>))
        .route("/api/sheet/list", post(handlers::open_list::<G>))
        .route("/api/sheet/close", post(handlers::close_sheet::<G>))
        .route("/api/sheet/toggle", post(handlers::toggle_sheet::<G>))
        .route("/api/selection", delete(handlers::clear_selection::<G>))
        // Submissions
        .route("/api/events", post(handlers::create_event::<G>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
