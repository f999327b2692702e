//! # drover
//!
//! A small coroutine-powered HTTP server where handlers return loosely-typed
//! response shapes instead of response objects, built on the `may` runtime
//! and `may_minihttp`.
//!
//! A handler receives a parsed request and returns a [`value::Value`] in one
//! of six accepted shapes:
//!
//! - `Absent` — 200 with no body
//! - an integer — that status code, with a canned explanation if it denotes
//!   an error
//! - bytes — 200 with the bytes as `text/html`
//! - `(integer, bytes)` — that status with the bytes as `text/html`
//! - `{text: bytes}` — 200 with the given content type
//! - `(integer, {text: bytes})` — that status with the given content type
//!
//! Classification is done by a generic structural pattern matcher
//! ([`matcher`]): each shape is a declarative [`matcher::Pattern`] with
//! capture slots, tried in fixed priority order, first match wins.
//!
//! ## Modules
//!
//! - [`value`] - the tagged runtime datum handlers produce
//! - [`matcher`] - structural pattern matching with capture slots
//! - [`dispatcher`] - handler coroutines and response-shape classification
//! - [`server`] - the `may_minihttp` transport boundary
//! - [`runtime_config`] - coroutine stack-size configuration
//!
//! ## Quick start
//!
//! ```no_run
//! use drover::dispatcher::Dispatcher;
//! use drover::server::{AppService, HttpServer};
//! use drover::value::Value;
//! use http::Method;
//! use std::sync::Arc;
//!
//! let mut dispatcher = Dispatcher::new();
//! unsafe {
//!     dispatcher.register_handler(Method::GET, |req| {
//!         if req.path != "/example" {
//!             return Value::from(404u16);
//!         }
//!         Value::from(b"<html><body>Here you go!</body></html>")
//!     });
//! }
//! let service = AppService::new(Arc::new(dispatcher));
//! let handle = HttpServer(service).start("127.0.0.1:1337").unwrap();
//! handle.join().unwrap();
//! ```
//!
//! ## Runtime considerations
//!
//! Handlers run in `may` coroutines, one per registered verb. Stack size is
//! configurable via `DROVER_STACK_SIZE`. Handler panics are caught and
//! converted to 500 responses; the serving loop survives them.

pub mod dispatcher;
pub mod matcher;
pub mod runtime_config;
pub mod server;
pub mod value;

pub use dispatcher::{classify, DispatchError, Dispatcher, HandlerRequest, Reply};
pub use matcher::{matches, CaptureSlots, Pattern, SlotId};
pub use value::{Tag, Value};
