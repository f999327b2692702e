//! # Server Module
//!
//! The transport boundary: parse incoming `may_minihttp` requests into the
//! inbound record, hand them to the dispatcher, and realize the classified
//! reply on the wire. Verbs with no registered handler are answered 501
//! here, before any dispatcher logic runs.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use response::{write_error_page, write_reply};
pub use service::AppService;
