//! Axum router construction.
//!
//! Builds the application router with all route groups, the OpenAPI
//! document, and middleware layers.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::context::AppContext;
use crate::middleware::request_id::request_id_middleware;
use crate::routes;

/// Room for multipart boundaries and the title part on top of the file cap.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

#[derive(OpenApi)]
#[openapi(
    info(title = "trackforged", description = "Audio upload and HLS streaming API"),
    paths(
        routes::upload::upload_track,
        routes::tracks::list_tracks,
        routes::tracks::get_track,
        routes::stream::stream_file,
        routes::health::health_check,
    ),
    components(schemas(
        routes::upload::UploadResponse,
        routes::upload::UploadForm,
        routes::tracks::TrackResponse,
        routes::tracks::TrackListResponse,
        routes::health::HealthResponse,
    ))
)]
struct ApiDoc;

/// Build the complete Axum router.
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = usize::try_from(
        ctx.config
            .server
            .max_upload_bytes
            .saturating_add(MULTIPART_OVERHEAD),
    )
    .unwrap_or(usize::MAX);

    let mut app = Router::new()
        .route(
            "/tracks",
            get(routes::tracks::list_tracks)
                .post(routes::upload::upload_track)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/tracks/{id}", get(routes::tracks::get_track))
        .route("/stream/{id}/{file}", get(routes::stream::stream_file))
        .route("/health", get(routes::health::health_check));

    if ctx.config.server.player {
        app = app.route("/player", get(routes::player::player));
    }

    app.merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}
