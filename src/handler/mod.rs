//! Application-side request handling.
//!
//! A parsed request goes through, in order:
//!
//! 1. the session gate ([`session`]), which owns the login and protected paths;
//! 2. the hook resolved by the parser from the route table ([`router`]);
//! 3. the static file fallback for `GET` ([`static_files`]), else 404.
//!
//! Every response then passes through [`middleware`].

pub mod middleware;
pub mod responses;
pub mod router;
pub mod session;
pub mod static_files;

use crate::config::ServerConfig;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

pub fn handle_request(req: &HttpRequest, config: &ServerConfig) -> HttpResponse {
    let mut res = dispatch(req, config);
    middleware::apply(req, &mut res, &config.server_name);
    res
}

pub fn handle_error(err: HttpStatus, config: &ServerConfig) -> HttpResponse {
    let mut res = responses::any_error(err);
    middleware::apply(&HttpRequest::new(), &mut res, &config.server_name);
    res
}

fn dispatch(req: &HttpRequest, config: &ServerConfig) -> HttpResponse {
    if let Some(res) = session::intercept(req, &config.session, &config.static_files_root) {
        return res;
    }

    if let Some(hook) = &req.hook {
        tracing::debug!(method = %req.method, path = %req.path, "invoking hook");
        if let Some(value) = hook(&req.headers, &req.body_str()) {
            let mut res = responses::json(&value);
            res.path = Some(req.path.clone());
            return res;
        }
    }

    match req.method.as_str() {
        "GET" => static_files::serve(&config.static_files_root, &req.path),
        _ => responses::not_found(),
    }
}
