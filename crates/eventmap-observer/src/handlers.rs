//! REST API endpoint handlers for the map server.
//!
//! Reads are served from the cached latest frame. Every write is forwarded
//! to the map session as a [`ViewCommand`] and answered with `202 Accepted`;
//! the resulting frame arrives on `/ws/view` and at `GET /api/view`.
//! Event creation is the exception: it waits for the session's answer.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/view` | Latest render frame |
//! | `GET` | `/api/counts` | Filter badge counts |
//! | `PUT` | `/api/filter` | Switch filter mode |
//! | `PUT` | `/api/camera` | Report zoom and bounds |
//! | `POST` | `/api/clusters/{id}/open` | Cluster click |
//! | `POST` | `/api/events/{id}/open` | Point click |
//! | `POST` | `/api/events/{id}/focus` | List row click |
//! | `POST` | `/api/sheet/list` | Open the default list |
//! | `POST` | `/api/sheet/close` | Close the list |
//! | `POST` | `/api/sheet/toggle` | Peek / full |
//! | `DELETE` | `/api/selection` | Drop the highlight |
//! | `POST` | `/api/events` | Create an event |
//! | `GET` | `/api/geocode` | Reverse geocode a point |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use eventmap_core::{Geocoder, ViewCommand};
use eventmap_types::{
    BoundingBox, ClusterId, EventId, FilterCounts, FilterMode, GeoPoint, NewEvent,
};
use tokio::sync::oneshot;
use tracing::debug;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

/// Body of `PUT /api/filter`.
#[derive(Debug, serde::Deserialize)]
pub struct FilterRequest {
    /// The new mode.
    pub mode: FilterMode,
}

/// Body of `PUT /api/camera`.
#[derive(Debug, serde::Deserialize)]
pub struct CameraRequest {
    /// Current zoom.
    pub zoom: f64,
    /// Visible bounds, if the client knows them.
    pub bounds: Option<BoundingBox>,
}

/// Query parameters for `GET /api/geocode`.
#[derive(Debug, serde::Deserialize)]
pub struct GeocodeQuery {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

/// Acknowledgement for a forwarded command.
#[derive(Debug, serde::Serialize)]
struct CommandResponse {
    ok: bool,
    command: &'static str,
}

/// Forward a command to the session.
async fn dispatch<G>(
    state: &AppState<G>,
    name: &'static str,
    command: ViewCommand,
) -> Result<(StatusCode, Json<CommandResponse>), ObserverError> {
    state.commands.send(command).await?;
    debug!(command = name, "Forwarded view command");
    Ok((
        StatusCode::ACCEPTED,
        Json(CommandResponse {
            ok: true,
            command: name,
        }),
    ))
}

fn parse_event_id(raw: &str) -> Result<EventId, ObserverError> {
    raw.parse()
        .map_err(|e: uuid::Error| ObserverError::InvalidUuid(format!("{raw}: {e}")))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the current view and API links.
pub async fn index<G: Geocoder>(State(state): State<Arc<AppState<G>>>) -> impl IntoResponse {
    let uptime = state.started_at.elapsed().as_secs();
    let (status, filter, counts, units) = state.feed.latest().map_or_else(
        || ("STARTING", FilterMode::All, FilterCounts::default(), 0),
        |frame| {
            let status = if frame.loading { "LOADING" } else { "READY" };
            (status, frame.filter, frame.counts, frame.units.event_count())
        },
    );

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Event Map</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
    </style>
</head>
<body>
    <h1>Event Map</h1>
    <p>Status: <span class="status">{status}</span> (up {uptime}s)</p>
    <div>
        <div class="metric"><div class="label">Filter</div><div class="value">{filter}</div></div>
        <div class="metric"><div class="label">All</div><div class="value">{all}</div></div>
        <div class="metric"><div class="label">Today</div><div class="value">{today}</div></div>
        <div class="metric"><div class="label">Weekend</div><div class="value">{weekend}</div></div>
        <div class="metric"><div class="label">On map</div><div class="value">{units}</div></div>
    </div>
    <ul>
        <li><a href="/api/view">GET /api/view</a></li>
        <li><a href="/api/counts">GET /api/counts</a></li>
        <li>WS /ws/view</li>
    </ul>
</body>
</html>"#,
        all = counts.all,
        today = counts.today,
        weekend = counts.weekend,
    ))
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// `GET /api/view` -- the latest render frame.
pub async fn get_view<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<impl IntoResponse, ObserverError> {
    let frame = state.feed.latest().ok_or(ObserverError::NotReady)?;
    Ok(Json(frame))
}

/// `GET /api/counts` -- badge counts of the latest frame.
pub async fn get_counts<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<impl IntoResponse, ObserverError> {
    let frame = state.feed.latest().ok_or(ObserverError::NotReady)?;
    Ok(Json(frame.counts))
}

/// `GET /api/geocode?lat=..&lng=..` -- best-effort address lookup.
pub async fn geocode<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Query(query): Query<GeocodeQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let point = GeoPoint {
        lat: query.lat,
        lng: query.lng,
    };
    if !point.is_valid() {
        return Err(ObserverError::InvalidInput(format!(
            "coordinates out of range: {}, {}",
            query.lat, query.lng
        )));
    }
    let address = state.geocoder.lookup_address(point).await;
    Ok(Json(serde_json::json!({ "address": address })))
}

// ---------------------------------------------------------------------------
// View commands
// ---------------------------------------------------------------------------

/// `PUT /api/filter`
pub async fn set_filter<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Json(body): Json<FilterRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, "set_filter", ViewCommand::SetFilter(body.mode)).await
}

/// `PUT /api/camera`
pub async fn set_camera<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Json(body): Json<CameraRequest>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(
        &state,
        "set_camera",
        ViewCommand::SetCamera {
            zoom: body.zoom,
            viewport: body.bounds,
        },
    )
    .await
}

/// `POST /api/clusters/{id}/open`
pub async fn open_cluster<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, "open_cluster", ViewCommand::OpenCluster(ClusterId(id))).await
}

/// `POST /api/events/{id}/open`
pub async fn open_event<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = parse_event_id(&id)?;
    dispatch(&state, "open_event", ViewCommand::OpenPoint(id)).await
}

/// `POST /api/events/{id}/focus`
pub async fn focus_event<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = parse_event_id(&id)?;
    dispatch(&state, "focus_event", ViewCommand::OpenRow(id)).await
}

/// `POST /api/sheet/list`
pub async fn open_list<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, "open_list", ViewCommand::OpenList).await
}

/// `POST /api/sheet/close`
pub async fn close_sheet<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, "close_sheet", ViewCommand::CloseSheet).await
}

/// `POST /api/sheet/toggle`
pub async fn toggle_sheet<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, "toggle_sheet", ViewCommand::ToggleSheet).await
}

/// `DELETE /api/selection`
pub async fn clear_selection<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<impl IntoResponse, ObserverError> {
    dispatch(&state, "clear_selection", ViewCommand::ClearSelection).await
}

// ---------------------------------------------------------------------------
// POST /api/events
// ---------------------------------------------------------------------------

/// Create an event and wait for the session's answer.
///
/// A missing or blank address is filled in by reverse geocoding the
/// picked point; if that fails the event is stored without one.
pub async fn create_event<G: Geocoder>(
    State(state): State<Arc<AppState<G>>>,
    Json(mut event): Json<NewEvent>,
) -> Result<impl IntoResponse, ObserverError> {
    if event.address.as_deref().is_none_or(|a| a.trim().is_empty()) {
        event.address = state.geocoder.lookup_address(event.position()).await;
    }

    let (reply, answer) = oneshot::channel();
    state
        .commands
        .send(ViewCommand::CreateEvent { event, reply })
        .await?;
    let id = answer.await??;

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}
