use std::fs;
use std::io::ErrorKind::*;
use std::path::{Component, Path, PathBuf};

use crate::handler::responses;
use crate::http::response::HttpResponse;

/// Serves the file at request `path` below `root`.
pub fn serve(root: &Path, path: &str) -> HttpResponse {
    let Some(full_path) = resolve(root, path) else {
        tracing::warn!(%path, "rejected path escaping the static root");
        return responses::forbidden();
    };
    tracing::debug!(path = %full_path.display(), "serving static file");

    let body = match fs::read(&full_path) {
        Ok(body) => body,
        Err(err) => match err.kind() {
            NotFound => return responses::not_found(),
            PermissionDenied => return responses::forbidden(),
            // directories and other unreadable entries
            _ if full_path.is_dir() => return responses::not_found(),
            _ => {
                tracing::error!(path = %full_path.display(), error = %err, "failed to read static file");
                return responses::internal_server_error();
            }
        },
    };

    let mut response = HttpResponse::new();
    response.set_body(guess_mime(&full_path), body);
    response.path = Some(path.to_string());
    response
}

/// Joins `path` onto `root`, refusing anything that is not a plain
/// descending path (`..`, absolute prefixes).
fn resolve(root: &Path, path: &str) -> Option<PathBuf> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let mut full = root.to_path_buf();
    for component in Path::new(path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => full.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(full)
}

fn guess_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("htm") | Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
