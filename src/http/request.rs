/// Longest path kept from the request line, in bytes. Longer paths are truncated.
pub const MAX_PATH_LEN: usize = 255;

/// Longest `Content-Type` value kept, in bytes. Longer values are truncated.
pub const MAX_CONTENT_TYPE_LEN: usize = 127;

/// HTTP request methods.
///
/// Only GET and POST are routable. Every other token, including a missing
/// one, parses to `UNKNOWN` and is answered by the not-found handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// Anything else
    UNKNOWN,
}

impl Method {
    /// Parses an HTTP method token.
    ///
    /// Matching is case-sensitive, as HTTP method tokens are.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::UNKNOWN);
    /// assert_eq!(Method::from_token("DELETE"), Method::UNKNOWN);
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            "POST" => Method::POST,
            _ => Method::UNKNOWN,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::UNKNOWN => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Only the headers the server acts on are kept. `content_length` is the value
/// the client declared; `body` holds the bytes that actually arrived, which is
/// fewer than declared when the peer stopped sending early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST or UNKNOWN)
    pub method: Method,
    /// The request path exactly as sent, query string included
    pub path: String,
    /// Value of the `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Declared `Content-Length`, 0 when absent or invalid
    pub content_length: usize,
    /// Request body. Only POST requests carry one.
    pub body: Option<Vec<u8>>,
    /// Textual peer IP, informational only
    pub client_ip: Option<String>,
}

/// Builder for constructing Request objects.
#[derive(Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    content_type: Option<String>,
    body: Option<Vec<u8>>,
    client_ip: Option<String>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = Some(ip.into());
        self
    }

    /// Builds the request. The declared length follows the body.
    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        if method != Method::POST && self.body.is_some() {
            return Err("only POST requests carry a body");
        }

        let content_length = self.body.as_ref().map_or(0, Vec::len);
        Ok(Request {
            method,
            path: self.path.ok_or("path missing")?,
            content_type: self.content_type,
            content_length,
            body: self.body,
            client_ip: self.client_ip,
        })
    }
}

impl Request {
    /// Returns the body bytes, or an empty slice when there is no body.
    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or(&[])
    }

    /// Returns true when the body holds fewer bytes than the client declared.
    pub fn is_truncated(&self) -> bool {
        self.method == Method::POST && self.body_bytes().len() < self.content_length
    }

    /// Case-insensitive check of the media type, ignoring parameters such as
    /// `charset`.
    pub fn has_content_type(&self, media_type: &str) -> bool {
        self.content_type
            .as_deref()
            .and_then(|v| v.split(';').next())
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(media_type))
    }
}

/// Cuts `s` to at most `max` bytes without splitting a UTF-8 character.
pub(crate) fn truncate_to(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
