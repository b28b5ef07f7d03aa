//! Embedded HLS test player.

use axum::response::Html;

const PLAYER_HTML: &str = include_str!("../../assets/player.html");

/// GET /player
///
/// Static page that loads `/stream/{id}/index.m3u8` for the id in its
/// `?id=` query parameter.
pub async fn player() -> Html<&'static str> {
    Html(PLAYER_HTML)
}
