use crate::dispatcher::{error_page, status_reason, Reply};
use may_minihttp::Response;

/// Realize a dispatch [`Reply`] on the wire: status line; when a body is
/// present, `Content-Type` (only if one was given) and a `Content-Length`
/// equal to the body's byte length, then the raw bytes; when no body,
/// headers terminate with nothing after them.
pub fn write_reply(res: &mut Response, reply: Reply) {
    res.status_code(usize::from(reply.status), status_reason(reply.status));
    match reply.body {
        Some(body) => {
            if let Some(ct) = reply.content_type {
                // may_minihttp header lines must be 'static
                let header = format!("Content-Type: {ct}").into_boxed_str();
                res.header(Box::leak(header));
            }
            res.body_vec(body);
        }
        None => {}
    }
}

/// Write the canned explanatory error page for a status, with a custom
/// message. Used for the 501 unsupported-verb path and internal faults.
pub fn write_error_page(res: &mut Response, status: u16, message: &str) {
    res.status_code(usize::from(status), status_reason(status));
    res.header("Content-Type: text/html");
    res.body_vec(error_page(status, message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_page_names_the_message() {
        let page = error_page(501, "POST is not implemented for this service");
        let text = String::from_utf8(page).unwrap();
        assert!(text.contains("501"));
        assert!(text.contains("POST is not implemented"));
    }
}
