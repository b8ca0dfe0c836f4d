use super::error::ServeError;
use super::listing::{read_listing, render_listing};
use axum::{
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Clone)]
pub struct ServerState {
    /// Canonical serving root.
    pub root: Arc<PathBuf>,
}

/// Maps a decoded request path onto the serving root.
///
/// `.` and empty segments are dropped and `..` pops the previous segment, so
/// the result never climbs above `root`.
pub fn resolve_request_path(root: &Path, decoded: &str) -> Result<PathBuf, ServeError> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            s if s.contains('\0') || s.contains('\\') => {
                warn!("Rejecting suspicious path segment: {:?}", s);
                return Err(ServeError::NotFound);
            }
            s => segments.push(s),
        }
    }

    let mut result = root.to_path_buf();
    result.extend(segments);
    Ok(result)
}

/// Canonicalizes an existing path and checks it did not escape the root
/// through a symlink.
fn verify_within_root(root: &Path, path: &Path) -> Result<PathBuf, ServeError> {
    let canonical = path.canonicalize().map_err(|_| ServeError::NotFound)?;
    if !canonical.starts_with(root) {
        warn!(
            "Symlink escape attempt: {} resolved outside {}",
            path.display(),
            root.display()
        );
        return Err(ServeError::NotFound);
    }
    Ok(canonical)
}

pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

fn not_modified_since(headers: &HeaderMap, modified: SystemTime) -> bool {
    if headers.contains_key(header::IF_NONE_MATCH) {
        return false;
    }
    let Some(since) = headers
        .get(header::IF_MODIFIED_SINCE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
    else {
        return false;
    };
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

fn redirect_to_directory(uri: &Uri) -> Response {
    let location = match uri.query() {
        Some(query) => format!("{}/?{}", uri.path(), query),
        None => format!("{}/", uri.path()),
    };
    debug!("Redirecting to {}", location);
    (
        StatusCode::MOVED_PERMANENTLY,
        [
            (header::LOCATION, location),
            (header::CONTENT_LENGTH, "0".to_string()),
        ],
    )
        .into_response()
}

async fn serve_file(path: &Path, headers: &HeaderMap) -> Result<Response, ServeError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|_| ServeError::NotFound)?;
    let modified = metadata.modified().ok();

    if let Some(modified) = modified {
        if not_modified_since(headers, modified) {
            return Ok(StatusCode::NOT_MODIFIED.into_response());
        }
    }

    let body = tokio::fs::read(path).await.map_err(|e| {
        warn!("Cannot read {}: {}", path.display(), e);
        ServeError::NotFound
    })?;

    let mime = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime),
            (header::CONTENT_LENGTH, body.len().to_string()),
        ],
        body,
    )
        .into_response();

    if let Some(modified) = modified {
        if let Ok(value) = http_date(modified).parse() {
            response.headers_mut().insert(header::LAST_MODIFIED, value);
        }
    }

    Ok(response)
}

/// First index file in `dir` that is a regular file resolving inside `root`.
fn find_index(root: &Path, dir: &Path) -> Option<PathBuf> {
    INDEX_FILES
        .iter()
        .map(|index| dir.join(index))
        .filter(|candidate| candidate.is_file())
        .find_map(|candidate| verify_within_root(root, &candidate).ok())
}

async fn serve_directory(
    root: &Path,
    dir: &Path,
    uri: &Uri,
    display_path: &str,
    headers: &HeaderMap,
) -> Result<Response, ServeError> {
    if !uri.path().ends_with('/') {
        return Ok(redirect_to_directory(uri));
    }

    if let Some(index) = find_index(root, dir) {
        return serve_file(&index, headers).await;
    }

    let entries = read_listing(dir).await?;
    let page = render_listing(display_path, &entries);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_LENGTH, page.len().to_string()),
        ],
        page,
    )
        .into_response())
}

async fn respond(
    state: &ServerState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<Response, ServeError> {
    if *method != Method::GET && *method != Method::HEAD {
        return Err(ServeError::UnsupportedMethod(method.to_string()));
    }

    let decoded = String::from_utf8_lossy(&urlencoding::decode_binary(uri.path().as_bytes()))
        .into_owned();
    let path = resolve_request_path(&state.root, &decoded)?;
    let path = verify_within_root(&state.root, &path)?;

    if path.is_dir() {
        return serve_directory(&state.root, &path, uri, &decoded, headers).await;
    }

    if uri.path().ends_with('/') {
        return Err(ServeError::NotFound);
    }

    serve_file(&path, headers).await
}

/// Fallback handler serving every request from the serving root.
pub async fn serve_static(
    State(state): State<ServerState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let response = match respond(&state, &method, &uri, &headers).await {
        Ok(response) => response,
        Err(e) => {
            debug!("{} {} failed: {}", method, uri, e);
            e.into_response()
        }
    };

    info!("\"{} {}\" {}", method, uri, response.status().as_u16());
    response
}
