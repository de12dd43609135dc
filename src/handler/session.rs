//! Cookie-flag session gate.
//!
//! Owns two literal paths and answers them before generic dispatch:
//!
//! - `GET <protected_path>`: 200 with the protected page when the request
//!   carries `auth=true`, otherwise 401 and the unauthorized resource.
//! - `POST <login_path>`: checks the `username`/`password` form fields
//!   against the configured pair and answers with `Set-Cookie: auth=true`
//!   (200) or `Set-Cookie: auth=false` (401).
//!
//! There is no server-side session store; the cookie is the whole state.

use std::collections::HashMap;
use std::path::Path;

use crate::config::SessionConfig;
use crate::handler::{responses, static_files};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

pub const AUTH_COOKIE: &str = "auth";

/// Returns the gate's response when `req` targets one of its paths.
pub fn intercept(req: &HttpRequest, session: &SessionConfig, root: &Path) -> Option<HttpResponse> {
    match req.method.as_str() {
        "GET" if req.path == session.protected_path => Some(protected_page(req, session, root)),
        "POST" if req.path == session.login_path => Some(login(req, session, root)),
        _ => None,
    }
}

pub fn is_authenticated(req: &HttpRequest) -> bool {
    req.cookie(AUTH_COOKIE) == Some("true")
}

fn protected_page(req: &HttpRequest, session: &SessionConfig, root: &Path) -> HttpResponse {
    if !is_authenticated(req) {
        tracing::info!(path = %req.path, "protected page requested without auth cookie");
        return unauthorized_page(session, root);
    }

    let mut res = static_files::serve(root, &session.protected_path);
    if res.status != HttpStatus::Ok {
        res = responses::html(HttpStatus::Ok, "<h1>Auth=true</h1>");
    }
    res.path = Some(session.protected_path.clone());
    res
}

fn login(req: &HttpRequest, session: &SessionConfig, root: &Path) -> HttpResponse {
    let body = req.body_str();
    let form = parse_form(&body);
    let username = form.get("username").copied();
    let password = form.get("password").copied();

    let accepted = username == Some(session.username.as_str())
        && password == Some(session.password.as_str());

    if accepted {
        tracing::info!(user = %session.username, "login accepted");
        let mut res = responses::html(HttpStatus::Ok, "<h1>Login success</h1>");
        res.set_cookie(AUTH_COOKIE, "true");
        res.path = Some(session.protected_path.clone());
        res
    } else {
        tracing::info!(user = ?username, "login rejected");
        let mut res = unauthorized_page(session, root);
        res.set_cookie(AUTH_COOKIE, "false");
        res
    }
}

/// Splits a form body into `key=value` pairs on `&`, then on the first `=`.
/// Values are compared as sent, without percent-decoding. A repeated key
/// keeps its last value; pairs without `=` are skipped.
fn parse_form(body: &str) -> HashMap<&str, &str> {
    body.split('&')
        .filter_map(|pair| pair.split_once('='))
        .collect()
}

fn unauthorized_page(session: &SessionConfig, root: &Path) -> HttpResponse {
    let mut res = static_files::serve(root, &session.unauthorized_path);
    if res.status == HttpStatus::Ok {
        res.status = HttpStatus::Unauthorized;
    } else {
        res = responses::unauthorized();
    }
    res.path = Some(session.unauthorized_path.clone());
    res
}
