//! Dispatcher core - verb table, handler coroutines, channel dispatch.

use crate::dispatcher::shape::{classify, DispatchError, Reply};
use crate::runtime_config::RuntimeConfig;
use crate::value::Value;
use http::Method;
use may::coroutine;
use may::sync::mpsc;
use std::any::Any;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Request data passed to a handler coroutine: the inbound record supplied by
/// the transport collaborator, plus the reply channel.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Client socket address, when the transport surfaces it.
    pub client: Option<SocketAddr>,
    /// HTTP verb.
    pub method: Method,
    /// Request path, query string included verbatim.
    pub path: String,
    /// HTTP headers, keys lowercased.
    pub headers: HashMap<String, String>,
    /// Raw body bytes, present iff the request carried a Content-Length.
    pub body: Option<Vec<u8>>,
    /// Channel for sending the handler outcome back to the dispatcher.
    pub reply_tx: mpsc::Sender<HandlerOutcome>,
}

impl HandlerRequest {
    /// Get a header by name (case-insensitive per RFC 7230).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What came back from a handler coroutine.
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    /// The handler ran to completion and returned a response shape.
    Completed(Value),
    /// The handler panicked; the payload is the panic message.
    Panicked(String),
}

/// Channel sender that feeds requests to one handler coroutine.
pub type HandlerSender = mpsc::Sender<HandlerRequest>;

/// Verb-keyed handler registry with an optional generic fallback.
///
/// Constructed once at server start and shared read-only with the request
/// path. Each registered handler runs in its own `may` coroutine; requests
/// travel over an MPSC channel and replies come back on a per-request
/// channel. A panicking handler is caught inside its coroutine, so one bad
/// invocation never takes the serving loop down.
#[derive(Clone, Default)]
pub struct Dispatcher {
    /// Verb-specific handlers.
    pub handlers: HashMap<Method, HandlerSender>,
    /// Fallback used for any verb without a specific handler.
    pub generic: Option<HandlerSender>,
}

impl Dispatcher {
    /// Create an empty dispatcher. Register handlers before starting the
    /// server; the request path only reads.
    #[must_use]
    pub fn new() -> Self {
        Dispatcher {
            handlers: HashMap::new(),
            generic: None,
        }
    }

    /// Register a handler for one verb.
    ///
    /// Spawns a coroutine that serves requests from a channel, wrapping each
    /// handler call in panic recovery. Replacing an existing handler drops
    /// the old sender, which closes its channel and lets the old coroutine
    /// exit.
    ///
    /// # Safety
    ///
    /// Calls `may::coroutine::Builder::spawn()`, which is unsafe in the `may`
    /// runtime. The caller must ensure the May runtime is initialized before
    /// registering handlers.
    pub unsafe fn register_handler<F>(&mut self, method: Method, handler_fn: F)
    where
        F: Fn(&HandlerRequest) -> Value + Send + 'static,
    {
        let label = method.to_string();
        if self.handlers.remove(&method).is_some() {
            warn!(verb = %label, "Replaced existing handler - old coroutine will exit");
        }
        if let Some(tx) = spawn_handler(label.clone(), handler_fn) {
            info!(
                verb = %label,
                total_handlers = self.handlers.len() + 1,
                "Handler registered"
            );
            self.handlers.insert(method, tx);
        }
    }

    /// Register the fallback handler used for verbs without a specific one.
    ///
    /// # Safety
    ///
    /// Same requirement as [`Dispatcher::register_handler`]: the May runtime
    /// must be initialized before spawning handler coroutines.
    pub unsafe fn register_generic<F>(&mut self, handler_fn: F)
    where
        F: Fn(&HandlerRequest) -> Value + Send + 'static,
    {
        if self.generic.take().is_some() {
            warn!("Replaced generic handler - old coroutine will exit");
        }
        if let Some(tx) = spawn_handler("generic".to_string(), handler_fn) {
            info!("Generic handler registered");
            self.generic = Some(tx);
        }
    }

    /// Look up the handler for a verb: the verb-specific one, else the
    /// generic fallback. `None` means the verb is unsupported; the server
    /// reports 501 without invoking dispatch.
    #[must_use]
    pub fn resolve(&self, method: &Method) -> Option<&HandlerSender> {
        self.handlers.get(method).or(self.generic.as_ref())
    }

    /// Send one request to a resolved handler, wait for its outcome, and
    /// classify the returned shape into a [`Reply`].
    ///
    /// A handler panic is caught at this boundary and converted into a 500
    /// reply; the server keeps serving subsequent requests.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnmatchedShape`] when the handler result matches
    ///   none of the declared response shapes (contract violation).
    /// - [`DispatchError::ChannelClosed`] when the handler coroutine died.
    pub fn dispatch(
        &self,
        sender: &HandlerSender,
        client: Option<SocketAddr>,
        method: Method,
        path: String,
        headers: HashMap<String, String>,
        body: Option<Vec<u8>>,
    ) -> Result<Reply, DispatchError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        let request = HandlerRequest {
            client,
            method,
            path,
            headers,
            body,
            reply_tx,
        };

        info!(
            method = %request.method,
            path = %request.path,
            "Request dispatched to handler"
        );
        let start = Instant::now();

        if sender.send(request).is_err() {
            error!("Failed to send request to handler - coroutine gone");
            return Err(DispatchError::ChannelClosed);
        }

        let outcome = reply_rx.recv().map_err(|_| {
            error!("Handler channel closed - handler may have crashed");
            DispatchError::ChannelClosed
        })?;

        match outcome {
            HandlerOutcome::Completed(value) => {
                let reply = classify(&value)?;
                info!(
                    status = reply.status,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Handler reply classified"
                );
                Ok(reply)
            }
            HandlerOutcome::Panicked(message) => {
                error!(panic_message = %message, "Handler panicked - returning 500");
                Ok(Reply::error(500))
            }
        }
    }
}

/// Spawn the coroutine loop for one handler. Returns `None` when the spawn
/// itself fails (resource exhaustion); the handler is then not registered.
fn spawn_handler<F>(label: String, handler_fn: F) -> Option<HandlerSender>
where
    F: Fn(&HandlerRequest) -> Value + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<HandlerRequest>();
    let stack_size = RuntimeConfig::from_env().stack_size;
    let spawn_label = label.clone();

    // SAFETY: may::coroutine::Builder::spawn() is marked unsafe by the may
    // runtime. The handler function is Send + 'static and all communication
    // happens over channels, so no references outlive the coroutine.
    let spawn_result = unsafe {
        coroutine::Builder::new()
            .stack_size(stack_size)
            .spawn(move || {
                debug!(handler = %spawn_label, stack_size, "Handler coroutine start");
                for req in rx.iter() {
                    let reply_tx = req.reply_tx.clone();
                    let outcome = match std::panic::catch_unwind(
                        std::panic::AssertUnwindSafe(|| handler_fn(&req)),
                    ) {
                        Ok(value) => HandlerOutcome::Completed(value),
                        Err(panic) => {
                            let message = panic_message(panic.as_ref());
                            error!(
                                handler = %spawn_label,
                                panic_message = %message,
                                "Handler panicked"
                            );
                            HandlerOutcome::Panicked(message)
                        }
                    };
                    let _ = reply_tx.send(outcome);
                }
            })
    };

    match spawn_result {
        Ok(_) => Some(tx),
        Err(e) => {
            error!(handler = %label, error = %e, "Failed to spawn handler coroutine");
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
