//! # Dispatcher Module
//!
//! Coroutine-based handler dispatch and response-shape classification.
//!
//! The dispatcher keeps a verb-keyed registry of handler coroutines plus an
//! optional generic fallback. A request flows: server parses the HTTP
//! request → dispatcher resolves the verb → request crosses an MPSC channel
//! into the handler coroutine → the handler returns a loosely-typed
//! [`crate::value::Value`] → [`classify`] decides which declared response
//! shape it is and extracts the `(status, content type, body)` triple the
//! server writes out.
//!
//! ## Error handling
//!
//! - Handler panics are caught inside the handler coroutine and converted to
//!   a 500 reply; the serving loop survives.
//! - A result matching none of the declared shapes is a contract violation:
//!   [`DispatchError::UnmatchedShape`], logged loudly, never silently
//!   coerced into some other shape.
//! - Verbs with no registered handler never reach the dispatcher; the server
//!   answers 501 first.

mod core;
mod shape;

pub use self::core::{Dispatcher, HandlerOutcome, HandlerRequest, HandlerSender};
pub use self::shape::{
    classify, classify_with, error_page, status_reason, DispatchError, Extract, Reply,
    SLOT_BODY, SLOT_CONTENT_TYPE, SLOT_STATUS,
};
