//! MIME type and extension detection for fetched and stored artifacts.

use std::path::Path;

/// Extensions the pipeline is willing to decode.
const DEGRADABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> &'static str {
    match extension_of(path).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "json" => "application/json",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// File extension to use for a download served with `mime`.
///
/// Parameters such as `; charset=utf-8` are ignored.
pub fn extension_for_mime(mime: &str) -> Option<&'static str> {
    let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
    match essence.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        "text/html" => Some("html"),
        "text/plain" => Some("txt"),
        "application/json" => Some("json"),
        "video/mp4" => Some("mp4"),
        _ => None,
    }
}

/// Whether an artifact has an extension the pipeline can degrade.
pub fn is_degradable(path: &Path) -> bool {
    DEGRADABLE_EXTENSIONS.contains(&extension_of(path).as_str())
}
