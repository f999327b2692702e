//! Response-shape classification.
//!
//! A handler returns an opaque [`Value`]; this module decides which of the
//! six accepted response shapes it is and extracts the
//! `(status, optional content type, optional body)` triple the transport
//! layer emits. The candidate shapes live in an explicit ordered table of
//! `(Pattern, extractor)` pairs evaluated by one loop: priority order and
//! fallthrough are data, not control flow. First structural match wins;
//! later candidates are never attempted once one succeeds.

use crate::matcher::{matches, CaptureSlots, Pattern, SlotId};
use crate::value::{Tag, Value};
use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;

/// Capture slot for the status-code integer.
pub const SLOT_STATUS: SlotId = 0;
/// Capture slot for the content-type text.
pub const SLOT_CONTENT_TYPE: SlotId = 1;
/// Capture slot for the body bytes.
pub const SLOT_BODY: SlotId = 2;
const SLOT_COUNT: usize = 3;

/// The classified response: what the transport must put on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header value, emitted only when a body is present.
    pub content_type: Option<String>,
    /// Raw body bytes; `None` means headers terminate with no body.
    pub body: Option<Vec<u8>>,
}

impl Reply {
    /// A bare status with no content type and no body.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Reply {
            status,
            content_type: None,
            body: None,
        }
    }

    /// A status with the canned explanatory error page as body.
    #[must_use]
    pub fn error(status: u16) -> Self {
        Reply {
            status,
            content_type: None,
            body: Some(error_page(status, status_reason(status))),
        }
    }
}

/// Faults surfaced by dispatch. Distinct from the handler-panic path, which
/// is caught in the handler coroutine and converted to a 500 [`Reply`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The handler result matched none of the declared response shapes.
    /// A contract violation by the handler, never silently coerced.
    #[error("handler result matched no declared response shape: {0:?}")]
    UnmatchedShape(Value),
    /// The handler coroutine is gone; its channel closed without a reply.
    #[error("handler channel closed before a reply was received")]
    ChannelClosed,
}

/// Extractor run against the capture slots of the winning candidate.
pub type Extract = fn(&CaptureSlots) -> Reply;

/// The six accepted response shapes, in fixed priority order.
static CANDIDATES: Lazy<Vec<(Pattern, Extract)>> = Lazy::new(|| {
    vec![
        // None: 200 with no body.
        (Pattern::Literal(Value::Absent), |_| Reply::status(200)),
        // <int>: status code, canned explanation in body if error.
        (Pattern::capture_tag(SLOT_STATUS, Tag::Integer), |slots| {
            let status = captured_status(slots);
            if is_error(status) {
                Reply::error(status)
            } else {
                Reply::status(status)
            }
        }),
        // <bytes>: 200 with the body as text/html.
        (Pattern::capture_tag(SLOT_BODY, Tag::Bytes), |slots| Reply {
            status: 200,
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            body: Some(captured_bytes(slots)),
        }),
        // (<int>, <bytes>): status with the body as text/html.
        (
            Pattern::FixedSequence(vec![
                Pattern::capture_tag(SLOT_STATUS, Tag::Integer),
                Pattern::capture_tag(SLOT_BODY, Tag::Bytes),
            ]),
            |slots| Reply {
                status: captured_status(slots),
                content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
                body: Some(captured_bytes(slots)),
            },
        ),
        // {<str>: <bytes>}: 200 with the given content type.
        (content_mapping_pattern(), |slots| Reply {
            status: 200,
            content_type: Some(captured_content_type(slots)),
            body: Some(captured_bytes(slots)),
        }),
        // (<int>, {<str>: <bytes>}): status with the given content type.
        (
            Pattern::FixedSequence(vec![
                Pattern::capture_tag(SLOT_STATUS, Tag::Integer),
                content_mapping_pattern(),
            ]),
            |slots| Reply {
                status: captured_status(slots),
                content_type: Some(captured_content_type(slots)),
                body: Some(captured_bytes(slots)),
            },
        ),
    ]
});

const DEFAULT_CONTENT_TYPE: &str = "text/html";

fn content_mapping_pattern() -> Pattern {
    Pattern::MappingShape(vec![(
        Pattern::capture_tag(SLOT_CONTENT_TYPE, Tag::Text),
        Pattern::capture_tag(SLOT_BODY, Tag::Bytes),
    )])
}

fn is_error(status: u16) -> bool {
    (400..=599).contains(&status)
}

fn captured_status(slots: &CaptureSlots) -> u16 {
    match slots.get(SLOT_STATUS) {
        Some(Value::Integer(i)) => u16::try_from(*i).unwrap_or(500),
        _ => 500,
    }
}

fn captured_bytes(slots: &CaptureSlots) -> Vec<u8> {
    match slots.get(SLOT_BODY) {
        Some(Value::Bytes(b)) => b.clone(),
        _ => Vec::new(),
    }
}

fn captured_content_type(slots: &CaptureSlots) -> String {
    match slots.get(SLOT_CONTENT_TYPE) {
        Some(Value::Text(t)) => t.clone(),
        _ => DEFAULT_CONTENT_TYPE.to_string(),
    }
}

/// Classify a handler result against the declared response shapes.
///
/// # Errors
///
/// [`DispatchError::UnmatchedShape`] when the result matches none of the six
/// shapes — the handler broke its contract.
pub fn classify(result: &Value) -> Result<Reply, DispatchError> {
    classify_with(&CANDIDATES, result).ok_or_else(|| DispatchError::UnmatchedShape(result.clone()))
}

/// Run an ordered candidate list against a subject, first match wins.
///
/// The production table is [`classify`]; this entry point exists so the
/// ordering mechanism itself can be exercised with arbitrary candidates.
#[must_use]
pub fn classify_with(candidates: &[(Pattern, Extract)], subject: &Value) -> Option<Reply> {
    let mut slots = CaptureSlots::new(SLOT_COUNT);
    for (pattern, extract) in candidates {
        slots.reset();
        if matches(pattern, subject, &mut slots) {
            return Some(extract(&slots));
        }
    }
    None
}

/// Reason phrase for a status line.
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Canned explanatory HTML page for error responses.
#[must_use]
pub fn error_page(status: u16, message: &str) -> Vec<u8> {
    format!(
        "<!DOCTYPE HTML>\n<html>\n<head><title>Error response</title></head>\n\
         <body>\n<h1>Error response</h1>\n<p>Error code: {status}</p>\n\
         <p>Message: {message}.</p>\n</body>\n</html>\n"
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(501), "Not Implemented");
    }

    #[test]
    fn test_classify_absent() {
        let reply = classify(&Value::Absent).unwrap();
        assert_eq!(reply, Reply::status(200));
    }

    #[test]
    fn test_classify_success_status_has_no_body() {
        for status in [200u16, 204, 302, 399] {
            let reply = classify(&Value::from(status)).unwrap();
            assert_eq!(reply.status, status);
            assert_eq!(reply.content_type, None);
            assert_eq!(reply.body, None);
        }
    }

    #[test]
    fn test_classify_error_status_has_canned_body() {
        for status in [400u16, 404, 500, 599] {
            let reply = classify(&Value::from(status)).unwrap();
            assert_eq!(reply.status, status);
            assert_eq!(reply.content_type, None);
            let body = reply.body.expect("canned body");
            assert!(!body.is_empty());
            assert!(String::from_utf8_lossy(&body).contains(&status.to_string()));
        }
    }

    #[test]
    fn test_classify_bytes_defaults_to_html() {
        let reply = classify(&Value::from(b"<p>hi</p>")).unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type.as_deref(), Some("text/html"));
        assert_eq!(reply.body, Some(b"<p>hi</p>".to_vec()));
    }

    #[test]
    fn test_classify_status_body_pair() {
        let reply = classify(&Value::pair(201, b"made".to_vec())).unwrap();
        assert_eq!(reply.status, 201);
        assert_eq!(reply.content_type.as_deref(), Some("text/html"));
        assert_eq!(reply.body, Some(b"made".to_vec()));
    }

    #[test]
    fn test_classify_content_mapping() {
        let reply = classify(&Value::content("application/json", b"{}".to_vec())).unwrap();
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type.as_deref(), Some("application/json"));
        assert_eq!(reply.body, Some(b"{}".to_vec()));
    }

    #[test]
    fn test_classify_status_content_pair() {
        let result = Value::Sequence(vec![
            Value::from(404u16),
            Value::content("text/plain", b"gone".to_vec()),
        ]);
        let reply = classify(&result).unwrap();
        assert_eq!(reply.status, 404);
        assert_eq!(reply.content_type.as_deref(), Some("text/plain"));
        assert_eq!(reply.body, Some(b"gone".to_vec()));
    }

    #[test]
    fn test_classify_rejects_undeclared_shape() {
        let err = classify(&Value::Set(vec![Value::Integer(1)])).unwrap_err();
        assert!(matches!(err, DispatchError::UnmatchedShape(_)));

        // A sequence of the wrong arity is not shape 4 or 6.
        let err = classify(&Value::Sequence(vec![Value::Integer(200)])).unwrap_err();
        assert!(matches!(err, DispatchError::UnmatchedShape(_)));
    }

    #[test]
    fn test_classify_with_resolves_first_declared_match() {
        // Two contrived candidates that both match any integer; the first
        // declared one must win.
        let candidates: Vec<(Pattern, Extract)> = vec![
            (Pattern::TypeTag(Tag::Integer), |_| Reply::status(201)),
            (Pattern::TypeTag(Tag::Integer), |_| Reply::status(202)),
        ];
        let reply = classify_with(&candidates, &Value::Integer(0)).unwrap();
        assert_eq!(reply.status, 201);
    }

    #[test]
    fn test_classify_with_falls_through_failed_candidates() {
        let candidates: Vec<(Pattern, Extract)> = vec![
            (Pattern::TypeTag(Tag::Bytes), |_| Reply::status(201)),
            (Pattern::TypeTag(Tag::Integer), |_| Reply::status(202)),
        ];
        let reply = classify_with(&candidates, &Value::Integer(0)).unwrap();
        assert_eq!(reply.status, 202);

        assert!(classify_with(&candidates, &Value::Absent).is_none());
    }

    #[test]
    fn test_stale_captures_do_not_leak_between_candidates() {
        // First candidate captures a status but ultimately fails on arity;
        // the winning bytes candidate must not see its binding.
        let candidates: Vec<(Pattern, Extract)> = vec![
            (
                Pattern::FixedSequence(vec![
                    Pattern::capture_tag(SLOT_STATUS, Tag::Integer),
                    Pattern::TypeTag(Tag::Bytes),
                    Pattern::TypeTag(Tag::Bytes),
                ]),
                |_| Reply::status(599),
            ),
            (
                Pattern::FixedSequence(vec![
                    Pattern::capture_tag(SLOT_STATUS, Tag::Integer),
                    Pattern::capture_tag(SLOT_BODY, Tag::Bytes),
                ]),
                |slots| Reply {
                    status: captured_status(slots),
                    content_type: None,
                    body: Some(captured_bytes(slots)),
                },
            ),
        ];
        let subject = Value::pair(207, b"multi".to_vec());
        let reply = classify_with(&candidates, &subject).unwrap();
        assert_eq!(reply.status, 207);
        assert_eq!(reply.body, Some(b"multi".to_vec()));
    }

    #[test]
    fn test_multi_entry_mapping_takes_first_text_bytes_entry() {
        let result = Value::Mapping(vec![
            (Value::Integer(0), Value::Integer(0)),
            (Value::from("text/csv"), Value::from(b"a,b")),
            (Value::from("text/tsv"), Value::from(b"a\tb")),
        ]);
        let reply = classify(&result).unwrap();
        assert_eq!(reply.content_type.as_deref(), Some("text/csv"));
        assert_eq!(reply.body, Some(b"a,b".to_vec()));
    }
}
