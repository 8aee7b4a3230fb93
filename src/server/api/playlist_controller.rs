use axum::{
    Json, Router,
    extract::{Extension, Multipart},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::{debug, error, info};

use crate::playlist::{GroupSummary, M3uGenerator, M3uStreamParser, PlaylistEntry};
use crate::server::dtos::playlist_dto::{GeneratePlaylistRequest, ParsePlaylistResponse};
use crate::server::error::{AppResult, Error};
use crate::server::services::app_services::AppServices;
use crate::server::utils::filename_utils;

const PLAYLIST_MIME: &str = "audio/x-mpegurl";
const PLAYLIST_EXTENSION: &str = "m3u";

pub struct PlaylistController;

impl PlaylistController {
    pub fn app() -> Router {
        Router::new()
            .route("/parse", post(Self::parse_upload))
            .route("/download", post(Self::download_playlist))
    }

    /// one-shot parse of an uploaded playlist file. the upload is consumed
    /// chunk by chunk and fed to the incremental parser, so memory stays flat
    /// no matter how big the file is - nothing is persisted afterwards
    async fn parse_upload(
        Extension(services): Extension<AppServices>,
        mut multipart: Multipart,
    ) -> AppResult<Json<ParsePlaylistResponse>> {
        let max_bytes = services.config.max_upload_mb * 1024 * 1024;

        let mut field = loop {
            let next = multipart.next_field().await.map_err(|e| {
                error!("failed to read multipart field: {}", e);
                Error::BadRequest("Invalid multipart upload".to_string())
            })?;
            match next {
                Some(field) if field.file_name().is_some() => break field,
                Some(_) => continue,
                None => {
                    return Err(Error::BadRequest("No playlist file uploaded".to_string()));
                }
            }
        };

        let filename = field.file_name().unwrap_or_default().to_lowercase();
        if !filename.ends_with(".m3u") && !filename.ends_with(".m3u8") {
            return Err(Error::BadRequest(
                "Unsupported file type, expected .m3u or .m3u8".to_string(),
            ));
        }

        debug!("parsing uploaded playlist: {}", filename);

        let mut parser = M3uStreamParser::new();
        let mut entries: Vec<PlaylistEntry> = Vec::new();
        let mut total_bytes = 0usize;

        while let Some(chunk) = field.chunk().await.map_err(|e| {
            error!("failed to read upload chunk: {}", e);
            Error::BadRequest("Failed to read uploaded file".to_string())
        })? {
            total_bytes += chunk.len();
            if total_bytes > max_bytes {
                return Err(Error::BadRequest(format!(
                    "Playlist file too large, limit is {}MB",
                    services.config.max_upload_mb
                )));
            }
            entries.extend(parser.feed(&chunk));
        }
        entries.extend(parser.finish());

        if total_bytes == 0 {
            return Err(Error::BadRequest("Uploaded file is empty".to_string()));
        }

        let groups = GroupSummary::from_entries(&entries);
        info!(
            "parsed playlist: {} bytes, {} entries, {} groups",
            total_bytes,
            entries.len(),
            groups.len()
        );

        Ok(Json(ParsePlaylistResponse {
            total_count: entries.len(),
            groups,
            entries,
        }))
    }

    /// regenerate playlist text from structured entries and hand it back as a
    /// file download. fully buffered, so range requests against it are
    /// well-defined and Content-Length is exact
    async fn download_playlist(
        Json(request): Json<GeneratePlaylistRequest>,
    ) -> AppResult<Response> {
        if request.entries.is_empty() {
            return Err(Error::BadRequest("No entries to generate".to_string()));
        }

        let body = M3uGenerator::generate(&request.entries);

        let stem = request
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| M3uGenerator::default_filename(&request.entries));
        let filename = format!(
            "{}.{}",
            filename_utils::sanitize_filename(&stem),
            PLAYLIST_EXTENSION
        );

        debug!(
            "generated playlist: {} entries, {} bytes, filename {}",
            request.entries.len(),
            body.len(),
            filename
        );

        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            header::CONTENT_TYPE,
            PLAYLIST_MIME.parse().expect("Static header value should parse"),
        );
        response_headers.insert(
            header::CONTENT_DISPOSITION,
            filename_utils::content_disposition(&filename)
                .parse()
                .map_err(|_| {
                    Error::InternalServerErrorWithContext(
                        "Generated Content-Disposition header is invalid".to_string(),
                    )
                })?,
        );
        response_headers.insert(
            header::CONTENT_LENGTH,
            body.len()
                .to_string()
                .parse()
                .expect("Content length should parse"),
        );
        // the artifact is generated fresh but fully buffered, so resuming a
        // partial download of it is fine
        response_headers.insert(
            header::ACCEPT_RANGES,
            "bytes".parse().expect("Static header value should parse"),
        );
        response_headers.insert(
            header::CACHE_CONTROL,
            "no-cache".parse().expect("Static header value should parse"),
        );

        Ok((StatusCode::OK, response_headers, body).into_response())
    }
}
