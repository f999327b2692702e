use anyhow::Result;
use clap::Parser;
use drover::dispatcher::{Dispatcher, HandlerRequest};
use drover::runtime_config::RuntimeConfig;
use drover::server::{AppService, HttpServer};
use drover::value::Value;
use http::Method;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Stand up a simple shape-dispatched HTTP server.
#[derive(Parser, Debug)]
#[command(name = "drover", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, env = "PORT", default_value_t = 1337)]
    port: u16,
}

fn handle_get(req: &HandlerRequest) -> Value {
    match req.path.split('?').next().unwrap_or("/") {
        "/example" => Value::from(b"<html><body>Here you go!</body></html>"),
        "/status" => Value::content(
            "application/json",
            serde_json::json!({ "status": "ok" }).to_string().into_bytes(),
        ),
        _ => Value::from(404u16),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    may::config().set_stack_size(RuntimeConfig::from_env().stack_size);

    let mut dispatcher = Dispatcher::new();
    // SAFETY: the May runtime is configured above, before any coroutine is
    // spawned.
    unsafe {
        dispatcher.register_handler(Method::GET, handle_get);
    }

    let service = AppService::new(Arc::new(dispatcher));
    let addr = format!("{}:{}", cli.host, cli.port);
    let handle = HttpServer(service).start(addr.as_str())?;
    info!(%addr, "Serving HTTP requests; send SIGTERM to quit");

    wait_for_shutdown()?;
    handle.stop();
    info!("Listener released, bye");
    Ok(())
}

#[cfg(unix)]
fn wait_for_shutdown() -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Termination signal received, shutting down");
    }
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown() -> Result<()> {
    std::thread::park();
    Ok(())
}
