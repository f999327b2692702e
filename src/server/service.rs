use super::request::parse_request;
use super::response::{write_error_page, write_reply};
use crate::dispatcher::{DispatchError, Dispatcher};
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use tracing::error;

/// The HTTP service: verb lookup, 501 for unsupported verbs, dispatch, and
/// wire realization of the classified reply.
///
/// The dispatcher is built once at startup and shared read-only across the
/// transport's worker coroutines; the service itself holds no per-request
/// state.
#[derive(Clone)]
pub struct AppService {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);

        let method: Method = match parsed.method.parse() {
            Ok(m) => m,
            Err(_) => {
                write_error_page(res, 400, "unrecognized request verb");
                return Ok(());
            }
        };

        // Unsupported verbs are answered before any dispatch logic runs.
        let sender = match self.dispatcher.resolve(&method) {
            Some(sender) => sender,
            None => {
                write_error_page(
                    res,
                    501,
                    &format!("{method} is not implemented for this service"),
                );
                return Ok(());
            }
        };

        match self.dispatcher.dispatch(
            sender,
            None,
            method,
            parsed.path,
            parsed.headers,
            parsed.body,
        ) {
            Ok(reply) => write_reply(res, reply),
            Err(e @ DispatchError::UnmatchedShape(_)) => {
                // Contract violation by the handler, not a client error.
                error!(error = %e, "Handler broke the response-shape contract");
                write_error_page(res, 500, "handler returned an unrecognized response shape");
            }
            Err(e @ DispatchError::ChannelClosed) => {
                error!(error = %e, "Handler coroutine unavailable");
                write_error_page(res, 500, "handler is not responding");
            }
        }
        Ok(())
    }
}
