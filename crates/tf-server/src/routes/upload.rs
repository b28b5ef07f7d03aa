//! Track upload route handler.
//!
//! The multipart body is spooled to an anonymous temp file first so the
//! size cap is enforced, and a missing `file` part is rejected, before the
//! pipeline creates any track record.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tf_core::track::stream_path;
use tf_core::{media, Error};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

use crate::context::AppContext;
use crate::error::AppError;

/// Longest accepted title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Response body for a successful upload.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    pub id: i64,
    /// Effective title after normalization.
    pub title: String,
    /// Playback URL of the new track.
    pub stream: String,
}

/// Multipart form accepted by `POST /tracks` (documentation only).
#[derive(utoipa::ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Optional display title; defaults to the file name.
    title: Option<String>,
    /// The audio file.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// An upload spooled to local disk.
struct SpooledFile {
    file: tokio::fs::File,
    filename: String,
    size: u64,
}

/// POST /tracks
#[utoipa::path(
    post,
    path = "/tracks",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Track ingested and streamable", body = UploadResponse),
        (status = 400, description = "Missing or empty file, or title too long"),
        (status = 413, description = "Upload exceeds the size cap"),
        (status = 502, description = "Transcode failed"),
        (status = 503, description = "Encoder unavailable")
    )
)]
pub async fn upload_track(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let limit = ctx.config.server.max_upload_bytes;
    let mut title = String::new();
    let mut upload: Option<SpooledFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("title") => {
                title = field.text().await.map_err(|e| multipart_error(e, limit))?;
            }
            Some("file") if upload.is_none() => {
                upload = Some(spool(&ctx, field, limit).await?);
            }
            _ => {}
        }
    }

    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(Error::Validation(format!(
            "title must be at most {MAX_TITLE_CHARS} characters"
        ))
        .into());
    }

    let Some(upload) = upload else {
        return Err(Error::Validation("missing file".into()).into());
    };

    tracing::info!(
        op = "tracks.upload",
        filename = %upload.filename,
        size = upload.size,
        "Upload received"
    );

    let ingested = ctx
        .ingest
        .ingest(&title, &upload.filename, upload.file, upload.size)
        .await?;

    Ok(Json(UploadResponse {
        id: ingested.id.get(),
        stream: stream_path(ingested.id),
        title: ingested.title,
    }))
}

/// Copy the `file` part to an anonymous temp file, enforcing `limit`.
async fn spool(ctx: &AppContext, mut field: Field<'_>, limit: u64) -> Result<SpooledFile, Error> {
    let filename = upload_file_name(field.file_name());

    let staging_dir = ctx.ingest.settings().staging_dir.clone();
    let std_file = tokio::task::spawn_blocking(move || -> std::io::Result<std::fs::File> {
        match staging_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir)?;
                tempfile::tempfile_in(dir)
            }
            None => tempfile::tempfile(),
        }
    })
    .await
    .map_err(|e| Error::Internal(format!("spool task failed: {e}")))??;
    let mut file = tokio::fs::File::from_std(std_file);

    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(e, limit))? {
        size += chunk.len() as u64;
        if size > limit {
            return Err(Error::PayloadTooLarge { limit });
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    file.rewind().await?;

    Ok(SpooledFile {
        file,
        filename,
        size,
    })
}

/// Client-supplied file name, or `track.bin` when blank.
fn upload_file_name(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("track{}", media::FALLBACK_EXTENSION),
    }
}

fn multipart_error(err: MultipartError, limit: u64) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge { limit }
    } else {
        Error::Validation(format!("invalid multipart body: {}", err.body_text()))
    }
}
