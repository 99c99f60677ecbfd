use std::path::Path;

/// Fallback for unknown or missing extensions.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Returns the MIME type for a file name based on its extension.
///
/// # Example
///
/// ```
/// # use courier::http::mime::mime_for_path;
/// assert_eq!(mime_for_path("logo.png"), "image/png");
/// assert_eq!(mime_for_path("README"), "application/octet-stream");
/// ```
pub fn mime_for_path(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "txt" => "text/plain",
        "pdf" => "application/pdf",
        _ => OCTET_STREAM,
    }
}
