//! Track listing and detail route handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tf_core::track::stream_path;
use tf_core::TrackSummary;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::parse_track_id;

/// Query parameters for `GET /tracks`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTracksQuery {
    /// Page size; non-positive means the default, large values are capped.
    pub count: Option<i64>,
    /// Number of tracks to skip; negative is treated as zero.
    pub offset: Option<i64>,
}

/// One track as returned by the listing and detail routes.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TrackResponse {
    pub id: i64,
    pub title: String,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Whether the segment set has been recorded.
    pub ready: bool,
    /// Playback URL, present once the track is ready.
    pub stream: Option<String>,
}

impl From<TrackSummary> for TrackResponse {
    fn from(s: TrackSummary) -> Self {
        Self {
            id: s.id.get(),
            stream: s.ready.then(|| stream_path(s.id)),
            title: s.title,
            created_at: s.created_at.to_rfc3339(),
            ready: s.ready,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TrackListResponse {
    pub items: Vec<TrackResponse>,
}

/// GET /tracks
#[utoipa::path(
    get,
    path = "/tracks",
    params(ListTracksQuery),
    responses(
        (status = 200, description = "Tracks, newest first", body = TrackListResponse)
    )
)]
pub async fn list_tracks(
    State(ctx): State<AppContext>,
    Query(query): Query<ListTracksQuery>,
) -> Result<Json<TrackListResponse>, AppError> {
    let items = ctx
        .catalog
        .list(query.count, query.offset)
        .await?
        .into_iter()
        .map(TrackResponse::from)
        .collect();
    Ok(Json(TrackListResponse { items }))
}

/// GET /tracks/{id}
#[utoipa::path(
    get,
    path = "/tracks/{id}",
    params(("id" = i64, Path, description = "Track id")),
    responses(
        (status = 200, description = "Track found", body = TrackResponse),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "No such track")
    )
)]
pub async fn get_track(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<TrackResponse>, AppError> {
    let id = parse_track_id(&id)?;
    let track = ctx.catalog.get(id).await?;
    Ok(Json(TrackResponse::from(track.summary())))
}
