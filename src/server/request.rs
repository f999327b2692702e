use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info};

/// Parsed HTTP request data used by `AppService`.
///
/// The path keeps its query string verbatim; handlers that care split it
/// themselves. The body is raw bytes, present iff the request carried a
/// `Content-Length` header.
#[derive(Debug, PartialEq)]
pub struct ParsedRequest {
    /// HTTP verb (GET, POST, etc.)
    pub method: String,
    /// Request path including any query string
    pub path: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Raw request body bytes
    pub body: Option<Vec<u8>>,
}

/// Extract method, path, headers, and body from a `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let path = req.path().to_string();

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    debug!(
        header_count = headers.len(),
        header_names = ?headers.keys().collect::<Vec<_>>(),
        "Headers extracted"
    );

    // Body framing belongs to the transport: a body exists exactly when
    // Content-Length was supplied, with that many bytes read.
    let body = if headers.contains_key("content-length") {
        let mut buf = Vec::new();
        match req.body().read_to_end(&mut buf) {
            Ok(read) => {
                info!(body_size_bytes = read, "Request body read");
                Some(buf)
            }
            Err(e) => {
                debug!(error = %e, "Request body read failed");
                None
            }
        }
    } else {
        None
    };

    info!(
        method = %method,
        path = %path,
        has_body = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        headers,
        body,
    }
}
