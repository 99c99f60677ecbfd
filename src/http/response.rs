/// Content type used when a handler does not set one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// An HTTP status code.
///
/// Any integer can be carried; the common ones have named constants.
/// Codes outside the standard table serialize with the reason `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    /// 200 OK
    pub const OK: StatusCode = StatusCode(200);
    /// 201 Created
    pub const CREATED: StatusCode = StatusCode(201);
    /// 204 No Content
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    /// 400 Bad Request
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    /// 401 Unauthorized
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    /// 404 Not Found
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    /// 500 Internal Server Error
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    /// 501 Not Implemented
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    /// 502 Bad Gateway
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);

    pub const fn from_u16(code: u16) -> Self {
        StatusCode(code)
    }

    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.as_u16(), 200);
    /// assert_eq!(StatusCode::NOT_FOUND.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the standard HTTP reason phrase for this status code, or
    /// `Unknown` for codes outside the standard table.
    ///
    /// # Example
    ///
    /// ```
    /// # use courier::http::response::StatusCode;
    /// assert_eq!(StatusCode::OK.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::from_u16(418).reason_phrase(), "I'm a teapot");
    /// assert_eq!(StatusCode::from_u16(299).reason_phrase(), "Unknown");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            100 => "Continue",
            101 => "Switching Protocols",
            102 => "Processing",
            103 => "Early Hints",
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            203 => "Non-Authoritative Information",
            204 => "No Content",
            205 => "Reset Content",
            206 => "Partial Content",
            207 => "Multi-Status",
            208 => "Already Reported",
            226 => "IM Used",
            300 => "Multiple Choices",
            301 => "Moved Permanently",
            302 => "Found",
            303 => "See Other",
            304 => "Not Modified",
            305 => "Use Proxy",
            307 => "Temporary Redirect",
            308 => "Permanent Redirect",
            400 => "Bad Request",
            401 => "Unauthorized",
            402 => "Payment Required",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            406 => "Not Acceptable",
            407 => "Proxy Authentication Required",
            408 => "Request Timeout",
            409 => "Conflict",
            410 => "Gone",
            411 => "Length Required",
            412 => "Precondition Failed",
            413 => "Content Too Large",
            414 => "URI Too Long",
            415 => "Unsupported Media Type",
            416 => "Range Not Satisfiable",
            417 => "Expectation Failed",
            418 => "I'm a teapot",
            421 => "Misdirected Request",
            422 => "Unprocessable Content",
            423 => "Locked",
            424 => "Failed Dependency",
            425 => "Too Early",
            426 => "Upgrade Required",
            428 => "Precondition Required",
            429 => "Too Many Requests",
            431 => "Request Header Fields Too Large",
            451 => "Unavailable For Legal Reasons",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            505 => "HTTP Version Not Supported",
            506 => "Variant Also Negotiates",
            507 => "Insufficient Storage",
            508 => "Loop Detected",
            510 => "Not Extended",
            511 => "Network Authentication Required",
            _ => "Unknown",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// The wire `Content-Length` is always computed from `body` at serialization
/// time, so it cannot disagree with the bytes sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Value of the `Content-Type` header
    pub content_type: String,
    /// Response body as bytes, text or binary
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use courier::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::OK)
///     .content_type("application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.content_length(), 2);
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response. An unset or empty content type falls back to
    /// [`DEFAULT_CONTENT_TYPE`].
    pub fn build(self) -> Response {
        let content_type = self
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        Response {
            status: self.status,
            content_type,
            body: self.body,
        }
    }
}

impl Response {
    /// Number of body bytes; this is what `Content-Length` carries.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Creates a simple 200 OK plain text response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::OK).body(body).build()
    }

    /// Creates an HTML response with the given status.
    pub fn html(status: StatusCode, body: impl Into<String>) -> Self {
        ResponseBuilder::new(status)
            .content_type("text/html; charset=utf-8")
            .body(body.into().into_bytes())
            .build()
    }

    /// Serializes `value` as a JSON response with the given status.
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        match serde_json::to_vec_pretty(value) {
            Ok(body) => ResponseBuilder::new(status)
                .content_type("application/json")
                .body(body)
                .build(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize JSON response");
                Self::internal_error()
            }
        }
    }

    /// Creates a plain 404 Not Found response.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NOT_FOUND)
            .body(b"404 Not Found".to_vec())
            .build()
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::INTERNAL_SERVER_ERROR)
            .body(b"500 Internal Server Error".to_vec())
            .build()
    }
}
