#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok = 200,

    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    PayloadTooLarge = 413,
    RequestHeaderFieldsTooLarge = 431,

    InternalServerError = 500,
    BadGateway = 502,
}

impl HttpStatus {
    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn reason(self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",                                                     // 200
            HttpStatus::BadRequest => "Bad Request",                                    // 400
            HttpStatus::Unauthorized => "Unauthorized",                                 // 401
            HttpStatus::Forbidden => "Forbidden",                                       // 403
            HttpStatus::NotFound => "Not Found",                                        // 404
            HttpStatus::PayloadTooLarge => "Payload Too Large",                         // 413
            HttpStatus::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large", // 431
            HttpStatus::InternalServerError => "Internal Server Error",                 // 500
            HttpStatus::BadGateway => "Bad Gateway",                                    // 502
        }
    }
}
