//! HLS playlist and segment delivery.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use tf_core::range::parse_range_header;
use tf_core::Error;
use tf_pipeline::ResolvedStream;

use crate::context::AppContext;
use crate::error::AppError;
use crate::routes::parse_track_id;

/// GET /stream/{id}/{file}
///
/// A single-range `Range` header is honoured with `206 Partial Content`;
/// any other form is ignored and the whole file is served.
#[utoipa::path(
    get,
    path = "/stream/{id}/{file}",
    params(
        ("id" = i64, Path, description = "Track id"),
        ("file" = String, Path, description = "Playlist or segment file name"),
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. bytes=0-1023")
    ),
    responses(
        (status = 200, description = "Whole file", content_type = "application/octet-stream"),
        (status = 206, description = "Requested byte range"),
        (status = 400, description = "Malformed id or file name"),
        (status = 404, description = "Unknown track, track not ready, or missing file"),
        (status = 416, description = "Range starts past the end of the file")
    )
)]
pub async fn stream_file(
    State(ctx): State<AppContext>,
    Path((id, file)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let id = parse_track_id(&id)?;
    let range = headers
        .get(header::RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_range_header);

    let resolved = ctx.resolver.resolve(id, &file, range).await?;
    Ok(build_response(resolved)?)
}

fn build_response(resolved: ResolvedStream) -> Result<Response, Error> {
    let ResolvedStream {
        object,
        content_type,
        no_store,
    } = resolved;

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, object.size);

    builder = match object.range {
        Some(range) => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_RANGE, range.content_range())
            .header(header::ACCEPT_RANGES, "bytes"),
        None => builder.status(StatusCode::OK),
    };

    if no_store {
        builder = builder.header(header::CACHE_CONTROL, "no-store");
    }

    builder
        .body(Body::from_stream(object.stream))
        .map_err(|e| Error::Internal(format!("Failed to build stream response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::BodyExt;
    use tf_core::ByteRange;
    use tf_storage::StoredObject;

    fn resolved(data: &'static [u8], range: Option<ByteRange>, file: &str) -> ResolvedStream {
        let total = data.len() as u64;
        let resolved = range.map(|r| r.resolve(total).unwrap());
        let slice = match resolved {
            Some(r) => &data[r.start as usize..=r.end as usize],
            None => data,
        };
        let stream = futures::stream::iter(vec![Ok::<_, std::io::Error>(Bytes::from_static(slice))]);
        ResolvedStream {
            object: StoredObject {
                stream: Box::pin(stream),
                content_type: "ignored/by-boundary".into(),
                size: slice.len() as u64,
                total_size: total,
                range: resolved,
            },
            content_type: tf_core::media::content_type_for(file),
            no_store: tf_core::media::is_playlist(file),
        }
    }

    #[tokio::test]
    async fn whole_file_is_200_without_range_headers() {
        let response = build_response(resolved(b"0123456789", None, "seg_00000.aac")).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/aac");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "10");
        assert!(response.headers().get(header::ACCEPT_RANGES).is_none());
        assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    }

    #[tokio::test]
    async fn honoured_range_is_206() {
        let range = ByteRange::new(2, Some(5));
        let response = build_response(resolved(b"0123456789", range, "seg_00000.aac")).unwrap();
        assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 2-5/10");
        assert_eq!(response.headers()[header::ACCEPT_RANGES], "bytes");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"2345");
    }

    #[tokio::test]
    async fn playlist_is_not_cached() {
        let response = build_response(resolved(b"#EXTM3U\n", None, "index.m3u8")).unwrap();
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/vnd.apple.mpegurl"
        );
    }
}
