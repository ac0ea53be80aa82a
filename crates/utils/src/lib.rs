pub mod headers;
pub mod log;
pub mod response;
