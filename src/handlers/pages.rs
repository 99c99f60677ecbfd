//! HTML pages.

use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

const STYLE: &str = "body{font-family:monospace;max-width:900px;margin:50px auto;padding:20px;background:#0a0a0a;color:#00ff00;}\
h1{border-bottom:2px solid #00ff00;padding-bottom:10px;}\
.box{background:#1a1a1a;padding:20px;margin:15px 0;border-left:4px solid #00ff00;}\
.label{color:#00aaff;font-weight:bold;}\
code{background:#2a2a2a;padding:2px 6px;color:#ffaa00;}\
a{color:#00ff00;}";

const BACK_LINK: &str = "<p><a href='/'>&larr; Back to home</a></p>";

/// Escapes text for safe inclusion in HTML element content and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset='utf-8'>\n<title>{title}</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n{content}\n</body>\n</html>"
    )
}

/// GET /
pub fn root(_request: &Request) -> Response {
    let content = "<h1>courier</h1>\n\
<div class='box'>\n\
<p>A one-request-per-connection HTTP/1.1 server speaking directly over TCP sockets.</p>\n\
</div>\n\
<div class='box'>\n\
<h2>Pages</h2>\n\
<ul>\n\
<li><code>GET /</code> this page</li>\n\
<li><code>GET /info</code> details of your request</li>\n\
<li><code>GET /glossary</code> protocol terms</li>\n\
<li><code>GET /how-it-works</code> the request/response cycle</li>\n\
<li><code>GET /image</code> binary content</li>\n\
<li><code>POST /echo</code> echo the request body</li>\n\
<li><code>POST /data</code> process form or raw data</li>\n\
</ul>\n\
<h2>JSON API</h2>\n\
<ul>\n\
<li><code>GET /api/health</code></li>\n\
<li><code>GET /api/users</code> / <code>POST /api/users</code></li>\n\
<li><code>GET /api/stats</code></li>\n\
<li><code>GET /api/time</code></li>\n\
<li><code>POST /api/login</code></li>\n\
<li><code>POST /api/calculate</code></li>\n\
</ul>\n\
</div>";

    Response::html(StatusCode::OK, page("courier", content))
}

/// GET /info
pub fn info(request: &Request) -> Response {
    let content = format!(
        "<h1>Server Information</h1>\n\
<div class='box'>\n\
<h2>How your request got here</h2>\n\
<p><span class='label'>1. DNS resolution:</span> the host name became an IP address.</p>\n\
<p><span class='label'>2. TCP connection:</span> <code>SYN</code>, <code>SYN-ACK</code>, <code>ACK</code>.</p>\n\
<p><span class='label'>3. HTTP request:</span> plain text such as <code>GET /info HTTP/1.1\\r\\nHost: ...\\r\\n\\r\\n</code>.</p>\n\
<p><span class='label'>4. Socket reception:</span> the kernel reassembled the TCP segments and handed the bytes to this process.</p>\n\
</div>\n\
<div class='box'>\n\
<h2>Request details</h2>\n\
<p><span class='label'>Method:</span> {method}</p>\n\
<p><span class='label'>Path:</span> {path}</p>\n\
<p><span class='label'>Your IP:</span> {ip}</p>\n\
</div>\n\
{BACK_LINK}",
        method = request.method,
        path = escape_html(&request.path),
        ip = escape_html(request.client_ip.as_deref().unwrap_or("unknown")),
    );

    Response::html(StatusCode::OK, page("Server Info", &content))
}

/// GET /glossary
pub fn glossary(_request: &Request) -> Response {
    const TERMS: &[(&str, &str)] = &[
        ("Socket", "An endpoint for network communication, exposed to the process as a file descriptor."),
        ("Backlog", "How many completed connections the kernel queues before the server accepts them."),
        ("Request line", "The first line of a request: method, path and protocol version."),
        ("CRLF", "The two-byte line terminator <code>\\r\\n</code> used by HTTP/1.1."),
        ("Header", "A <code>Name: value</code> line describing the message."),
        ("Content-Length", "The exact byte count of the body that follows the blank line."),
        ("Content-Type", "The media type the body bytes should be interpreted as."),
        ("Status code", "Three-digit result of a request, such as 200 or 404."),
        ("Connection: close", "Tells the client the server closes the socket after this response."),
        ("Not-found handler", "The fallback that answers any unmatched method and path with 404."),
    ];

    let rows: String = TERMS
        .iter()
        .map(|(term, meaning)| format!("<p><span class='label'>{term}:</span> {meaning}</p>\n"))
        .collect();
    let content = format!("<h1>Glossary</h1>\n<div class='box'>\n{rows}</div>\n{BACK_LINK}");

    Response::html(StatusCode::OK, page("Glossary", &content))
}

/// GET /how-it-works
pub fn how_it_works(_request: &Request) -> Response {
    const STEPS: &[(&str, &str)] = &[
        ("Listen", "The server binds a TCP socket on all interfaces with address reuse and a small backlog."),
        ("Accept", "Every second the accept loop wakes up to check for shutdown, otherwise it takes the next connection."),
        ("Read", "Bytes are read until the blank line after the headers and the declared body have arrived."),
        ("Parse", "The request line gives method and path; Content-Type and Content-Length are picked out of the headers."),
        ("Route", "Method and exact path select a handler; anything else falls through to 404."),
        ("Respond", "Status line, Content-Type, Content-Length and Connection: close are written, then the body bytes verbatim."),
        ("Close", "The socket is shut down and every buffer for the connection is released."),
    ];

    let rows: String = STEPS
        .iter()
        .enumerate()
        .map(|(i, (step, detail))| format!("<p><span class='label'>{}. {step}:</span> {detail}</p>\n", i + 1))
        .collect();
    let content = format!("<h1>How It Works</h1>\n<div class='box'>\n{rows}</div>\n{BACK_LINK}");

    Response::html(StatusCode::OK, page("How It Works", &content))
}

/// POST /echo
pub fn echo(request: &Request) -> Response {
    let body = request.body_bytes();
    if body.is_empty() {
        return Response::ok("No body received in POST request");
    }

    let content = format!(
        "<h1>Echo Response</h1>\n\
<div class='box'>\n\
<h3>You sent:</h3>\n\
<p><strong>Content-Type:</strong> {content_type}</p>\n\
<p><strong>Content-Length:</strong> {len} bytes</p>\n\
<pre>{body}</pre>\n\
</div>\n\
{BACK_LINK}",
        content_type = escape_html(request.content_type.as_deref().unwrap_or("not specified")),
        len = body.len(),
        body = escape_html(&String::from_utf8_lossy(body)),
    );

    Response::html(StatusCode::OK, page("Echo Response", &content))
}

/// POST /data
///
/// Form-encoded bodies are decoded into a table; anything else is shown raw.
pub fn data(request: &Request) -> Response {
    let body = request.body_bytes();
    if body.is_empty() {
        return not_found(request);
    }

    let received = if request.has_content_type("application/x-www-form-urlencoded") {
        let rows: String = url::form_urlencoded::parse(body)
            .map(|(key, value)| {
                format!(
                    "<tr><td class='label'>{}</td><td>{}</td></tr>\n",
                    escape_html(&key),
                    escape_html(&value)
                )
            })
            .collect();
        format!("<table>\n{rows}</table>")
    } else {
        format!("<pre>{}</pre>", escape_html(&String::from_utf8_lossy(body)))
    };

    let content = format!(
        "<h1>Data Processed</h1>\n<div class='box'>\n<h3>Received Data:</h3>\n{received}\n</div>\n{BACK_LINK}"
    );
    Response::html(StatusCode::OK, page("Data Received", &content))
}

/// Fallback for every unmatched route.
pub fn not_found(request: &Request) -> Response {
    let content = format!(
        "<h1>404</h1>\n<h2>Not Found</h2>\n\
<p>The path <code>{}</code> does not exist on this server.</p>\n{BACK_LINK}",
        escape_html(&request.path)
    );
    Response::html(StatusCode::NOT_FOUND, page("404 Not Found", &content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }
}
