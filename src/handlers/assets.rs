use std::path::Path;

use crate::handlers::AppState;
use crate::http::mime::mime_for_path;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

const FALLBACK_SVG: &str = "<svg width='400' height='300' xmlns='http://www.w3.org/2000/svg'>\n\
  <rect width='100%' height='100%' fill='#0a0a0a'/>\n\
  <text x='50%' y='50%' text-anchor='middle' fill='#00ff00' font-size='24' font-family='monospace'>\n\
    Sample Image from courier\n\
  </text>\n\
  <text x='50%' y='60%' text-anchor='middle' fill='#00aaff' font-size='16' font-family='monospace'>\n\
    Binary data transmitted over TCP/IP\n\
  </text>\n\
</svg>";

/// Reads a whole file. `None` means not found or unreadable; the size is the
/// length of the returned bytes.
pub fn read_static_file(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Static file unavailable");
            None
        }
    }
}

/// GET /image
///
/// Serves the image loaded at startup byte-for-byte, or an inline SVG when the
/// file was missing.
pub fn image(state: &AppState, _request: &Request) -> Response {
    match state.image.clone() {
        Some(bytes) => {
            tracing::info!(path = %state.image_path.display(), bytes = bytes.len(), "Serving image");
            ResponseBuilder::new(StatusCode::OK)
                .content_type(mime_for_path(&state.image_path))
                .body(bytes)
                .build()
        }
        None => ResponseBuilder::new(StatusCode::OK)
            .content_type("image/svg+xml")
            .body(FALLBACK_SVG)
            .build(),
    }
}
