use crate::http::request::{MAX_CONTENT_TYPE_LEN, MAX_PATH_LEN, Method, Request, truncate_to};

const HEADERS_END: &[u8] = b"\r\n\r\n";
const CONTENT_TYPE: &str = "content-type:";
const CONTENT_LENGTH: &str = "content-length:";

/// How much of a request a buffer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Header terminator not seen yet, or the declared body is still arriving
    Incomplete,
    /// Headers and `Content-Length` body bytes are all present; the value is
    /// the total frame length
    Complete(usize),
}

/// Reports whether `buf` holds a whole request: the header block plus as many
/// body bytes as `Content-Length` declares.
pub fn frame_status(buf: &[u8]) -> FrameStatus {
    let Some(headers_end) = find_headers_end(buf) else {
        return FrameStatus::Incomplete;
    };

    let head = String::from_utf8_lossy(&buf[..headers_end]);
    let content_length = declared_content_length(&head);

    // A length too large to add up can never be satisfied by a buffer
    match (headers_end + HEADERS_END.len()).checked_add(content_length) {
        Some(total) if buf.len() >= total => FrameStatus::Complete(total),
        _ => FrameStatus::Incomplete,
    }
}

/// Parses raw request bytes into a [`Request`].
///
/// Parsing never fails. Malformed input degrades instead: an unrecognised or
/// missing method becomes `UNKNOWN`, a missing path becomes empty, and a body
/// shorter than its `Content-Length` keeps only the bytes that arrived.
/// Paths longer than [`MAX_PATH_LEN`] are truncated.
pub fn parse_http_request(buf: &[u8]) -> Request {
    let headers_end = find_headers_end(buf);
    let head_bytes = match headers_end {
        Some(end) => &buf[..end],
        None => buf,
    };
    let head = String::from_utf8_lossy(head_bytes);
    let mut lines = head.split("\r\n");

    // Request line
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split(' ').filter(|p| !p.is_empty());
    let method = parts.next().map_or(Method::UNKNOWN, Method::from_token);
    let path = parts
        .next()
        .map(|p| truncate_to(p, MAX_PATH_LEN))
        .unwrap_or_default();

    // Headers
    let mut content_type = None;
    for line in lines.take_while(|line| !line.is_empty()) {
        if let Some(value) = header_value(line, CONTENT_TYPE) {
            content_type = Some(truncate_to(value, MAX_CONTENT_TYPE_LEN));
        }
    }
    let content_length = declared_content_length(&head);

    // Body
    let body = match headers_end {
        Some(end) if method == Method::POST && content_length > 0 => {
            let available = &buf[end + HEADERS_END.len()..];
            let take = available.len().min(content_length);
            Some(available[..take].to_vec())
        }
        _ => None,
    };

    tracing::debug!(
        method = %method,
        path = %path,
        content_length,
        body_len = body.as_ref().map_or(0, Vec::len),
        "Parsed request"
    );

    Request {
        method,
        path,
        content_type,
        content_length,
        body,
        client_ip: None,
    }
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEADERS_END.len())
        .position(|w| w == HEADERS_END)
}

/// Returns the trimmed value when `line` starts with `name` (ASCII
/// case-insensitive, colon included).
fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let prefix = line.get(..name.len())?;
    if prefix.eq_ignore_ascii_case(name) {
        Some(line[name.len()..].trim())
    } else {
        None
    }
}

/// `Content-Length` declared in a header block (request line included). When
/// the header repeats, the last occurrence wins; unparsable values count as 0.
fn declared_content_length(head: &str) -> usize {
    head.split("\r\n")
        .skip(1)
        .take_while(|line| !line.is_empty())
        .filter_map(|line| header_value(line, CONTENT_LENGTH))
        .last()
        .map_or(0, parse_content_length)
}

fn parse_content_length(value: &str) -> usize {
    value.parse().unwrap_or(0)
}
