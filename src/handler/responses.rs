use serde_json::Value;

use crate::http::response::HttpResponse;
use crate::http::status::HttpStatus;

pub fn html(status: HttpStatus, body: &str) -> HttpResponse {
    let mut res = HttpResponse::with_status(status);
    res.set_body("text/html", body);
    res
}

pub fn json(value: &Value) -> HttpResponse {
    let mut res = HttpResponse::new();
    res.set_body("application/json", value.to_string());
    res
}

pub fn unauthorized() -> HttpResponse {
    html(HttpStatus::Unauthorized, "<h1>401 Unauthorized</h1>")
}

pub fn forbidden() -> HttpResponse {
    html(HttpStatus::Forbidden, "<h1>403 Forbidden</h1>")
}

pub fn not_found() -> HttpResponse {
    html(HttpStatus::NotFound, "<h1>404 Not Found</h1>")
}

pub fn internal_server_error() -> HttpResponse {
    html(HttpStatus::InternalServerError, "<h1>500 Internal Server Error</h1>")
}

pub fn bad_gateway() -> HttpResponse {
    html(HttpStatus::BadGateway, "<h1>502 Bad Gateway</h1>")
}

pub fn any_error(err: HttpStatus) -> HttpResponse {
    match err {
        HttpStatus::Unauthorized => unauthorized(),
        HttpStatus::Forbidden => forbidden(),
        HttpStatus::NotFound => not_found(),
        HttpStatus::InternalServerError => internal_server_error(),
        HttpStatus::BadGateway => bad_gateway(),
        other => html(other, &format!("<h1>{} {}</h1>", other.code(), other.reason())),
    }
}
