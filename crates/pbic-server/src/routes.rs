//! HTTP routes for the pbic compile service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use pbic_core::{ToolConfig, compile_archive};

use crate::bundle;
use crate::error::{ServerError, ServerResult};

/// Upper bound on uploaded archive size.
const MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Application state shared across handlers.
pub struct AppState {
    /// Compiler configuration, read from the environment at startup.
    pub tool: ToolConfig,
    /// Client for download-by-URL requests.
    pub http: reqwest::Client,
    /// Directory holding the demo project.
    pub demo_dir: PathBuf,
}

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/compile", post(compile_handler))
        .route("/compile/demo", get(demo_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Decoded `/compile` form fields.
#[derive(Default)]
struct CompileRequest {
    file: Option<(Option<String>, Vec<u8>)>,
    url: Option<String>,
    name: Option<String>,
    return_extracted: bool,
}

impl CompileRequest {
    async fn from_multipart(mut multipart: Multipart) -> ServerResult<Self> {
        let mut request = Self {
            return_extracted: true,
            ..Self::default()
        };

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ServerError::BadRequest(format!("Invalid multipart payload: {err}")))?
        {
            let field_name = field.name().map(str::to_string);
            match field_name.as_deref() {
                Some("file") => {
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.map_err(|err| {
                        ServerError::BadRequest(format!("Failed to read ZIP: {err}"))
                    })?;
                    request.file = Some((file_name, bytes.to_vec()));
                }
                Some("url") => {
                    request.url = Some(field.text().await.map_err(|err| {
                        ServerError::BadRequest(format!("Failed to read url field: {err}"))
                    })?);
                }
                Some("name") => {
                    request.name = Some(field.text().await.map_err(|err| {
                        ServerError::BadRequest(format!("Failed to read name field: {err}"))
                    })?);
                }
                Some("return_extracted") => {
                    let raw = field.text().await.map_err(|err| {
                        ServerError::BadRequest(format!(
                            "Failed to read return_extracted field: {err}"
                        ))
                    })?;
                    request.return_extracted = parse_flag(&raw);
                }
                _ => {}
            }
        }

        Ok(request)
    }
}

/// Compile an uploaded or downloaded project ZIP and stream back the
/// result bundle.
async fn compile_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ServerResult<Response> {
    let request = CompileRequest::from_multipart(multipart).await?;

    let (archive_bytes, src_name) = match (request.file, request.url) {
        (Some((file_name, bytes)), _) => {
            let stem = file_name
                .as_deref()
                .and_then(file_stem)
                .unwrap_or_else(|| "result".to_string());
            (bytes, stem)
        }
        (None, Some(url)) => {
            let bytes = download_archive(&state.http, &url).await?;
            let stem = file_stem(&url).unwrap_or_else(|| "result".to_string());
            (bytes, stem)
        }
        (None, None) => {
            return Err(ServerError::BadRequest(
                "Provide either a file upload or a url.".to_string(),
            ));
        }
    };

    let result = compile_archive(&archive_bytes, &state.tool).await?;

    if result.artifact.is_none() && result.bundle.is_none() {
        return Err(ServerError::CompilationFailed(
            result.logs.unwrap_or_default(),
        ));
    }

    let res_name = request
        .name
        .filter(|name| !name.is_empty())
        .unwrap_or(src_name);
    let extracted = if request.return_extracted {
        result.bundle.as_deref()
    } else {
        None
    };
    let body = bundle::build_result_zip(
        result.artifact.as_ref(),
        extracted,
        result.logs.as_deref(),
        &res_name,
    )?;

    Ok(zip_response(body, &format!("{res_name}.zip")))
}

#[derive(Deserialize)]
struct DemoParams {
    name: Option<String>,
}

/// Compile the bundled demo project through the same pipeline.
async fn demo_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DemoParams>,
) -> ServerResult<Response> {
    if !state.demo_dir.is_dir() {
        return Err(ServerError::Internal(format!(
            "Demo directory not found at {}. Is it included in the image?",
            state.demo_dir.display()
        )));
    }

    let demo_zip = pbic_core::archive::pack_dir(&state.demo_dir)
        .map_err(|err| ServerError::Internal(format!("Failed to prepare demo ZIP: {err}")))?;

    let result = compile_archive(&demo_zip, &state.tool).await?;

    let name = params.name.unwrap_or_else(|| "demo".to_string());
    let body = bundle::build_result_zip(
        result.artifact.as_ref(),
        result.bundle.as_deref(),
        result.logs.as_deref(),
        &name,
    )?;

    Ok(zip_response(body, &format!("{name}.zip")))
}

/// Download an archive from a caller-supplied URL.
async fn download_archive(client: &reqwest::Client, url: &str) -> ServerResult<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| ServerError::BadRequest(format!("Failed to read ZIP: {err}")))?;

    if !response.status().is_success() {
        return Err(ServerError::BadRequest(format!(
            "Failed to download ZIP from URL: HTTP {}",
            response.status()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|err| ServerError::BadRequest(format!("Failed to read ZIP: {err}")))?;
    Ok(bytes.to_vec())
}

/// Stream ZIP bytes as an attachment download.
fn zip_response(bytes: Vec<u8>, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// File stem of an uploaded file name or URL, for default output naming.
fn file_stem(value: &str) -> Option<String> {
    Path::new(value)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
}

/// Form-style boolean: everything except the usual negatives counts as true.
fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}
