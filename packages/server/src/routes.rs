//! HTTP routes.
//!
//! Every route accepts any method. Paths that match nothing fall through to
//! the identity handler. File-system work runs on the blocking pool and the
//! mount is resolved afresh for each request.
//!
//! `/read/`, `/chmod/` and `/delete/` take their arguments from the trailing
//! segments of the request path, decoded lossily. An empty name is passed
//! through to the volume operation, which rejects it.

use axum::extract::State;
use axum::http::{header, Request, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use percent_encoding::percent_decode_str;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{info_span, Level};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the router with every probe route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(instance))
        .route("/env", any(env))
        .route("/write", any(write))
        .route("/create", any(create))
        .route("/loadtest", any(load_test))
        .route("/loadtestcleanup", any(load_test_cleanup))
        .route("/read/", any(read))
        .route("/read/{*name}", any(read))
        .route("/chmod/", any(chmod))
        .route("/chmod/{*target}", any(chmod))
        .route("/delete/", any(delete))
        .route("/delete/{*name}", any(delete))
        .fallback(instance)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

fn text(body: impl Into<Vec<u8>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body.into(),
    )
        .into_response()
}

/// Run a probe on the blocking pool.
async fn blocking<T, F>(probe: F) -> Result<T, ApiError>
where
    F: FnOnce() -> pora_volume::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(probe).await??)
}

/// The last `N` slash-separated segments of a request path, percent-decoded.
///
/// Leading segments are ignored, so `/read/a/b` reads `b`. Bytes that are
/// not valid UTF-8 decode to U+FFFD.
fn trailing_segments<const N: usize>(path: &str) -> Option<[String; N]> {
    let segments: Vec<&str> = path.split('/').collect();
    let tail = segments.get(segments.len().checked_sub(N)?..)?;
    tail.iter()
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect::<Vec<_>>()
        .try_into()
        .ok()
}

async fn instance(State(state): State<AppState>) -> Response {
    text(state.identity())
}

async fn env() -> Response {
    let mut body = String::new();
    for (key, value) in std::env::vars_os() {
        body.push_str(&key.to_string_lossy());
        body.push('=');
        body.push_str(&value.to_string_lossy());
        body.push('\n');
    }
    text(body)
}

async fn write(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mount = state.mount()?;
    let body = blocking(move || pora_volume::write_probe(&mount)).await?;
    Ok(text(body))
}

async fn create(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mount = state.mount()?;
    let name = blocking(move || pora_volume::create(&mount)).await?;
    Ok(text(name))
}

async fn load_test(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mount = state.mount()?;
    let written = blocking(move || pora_volume::run_load(&mount)).await?;
    Ok(text(format!("{} MiB written\n", written)))
}

async fn load_test_cleanup(State(state): State<AppState>) -> Result<Response, ApiError> {
    let mount = state.mount()?;
    let removed = blocking(move || pora_volume::cleanup_orphaned_load_files(&mount)).await?;
    Ok(text(format!("{} Files Removed\n", removed)))
}

async fn read(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    let [name] = trailing_segments::<1>(uri.path())
        .ok_or_else(|| ApiError::BadRequest("missing file name".to_string()))?;
    let mount = state.mount()?;

    let mut body = blocking(move || pora_volume::read(&mount, &name)).await?;
    body.extend_from_slice(state.identity().as_bytes());
    Ok(text(body))
}

async fn chmod(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    let [name, mode] = trailing_segments::<2>(uri.path())
        .ok_or_else(|| ApiError::BadRequest("expected /chmod/<name>/<mode>".to_string()))?;
    let mount = state.mount()?;

    let (name, mode) = blocking(move || {
        pora_volume::chmod(&mount, &name, &mode)?;
        Ok((name, mode))
    })
    .await?;
    Ok(text(format!("{}->{}{}", name, mode, state.identity())))
}

async fn delete(State(state): State<AppState>, uri: Uri) -> Result<Response, ApiError> {
    let [name] = trailing_segments::<1>(uri.path())
        .ok_or_else(|| ApiError::BadRequest("missing file name".to_string()))?;
    let mount = state.mount()?;

    let name = blocking(move || {
        pora_volume::delete(&mount, &name)?;
        Ok(name)
    })
    .await?;
    Ok(text(format!("deleted {}", name)))
}
