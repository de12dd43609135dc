pub mod cookies;
pub mod headers;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
