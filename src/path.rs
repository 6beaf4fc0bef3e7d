//! Path tokenization and static-asset classification.
//!
//! A request path becomes an ordered list of non-empty segments, each of which
//! is later fed to a control point as one message. Paths whose last segment
//! carries a known file extension are classified as not routable so the
//! hosting pipeline can serve them as static content.

use percent_encoding::percent_decode_str;
use serde::Serialize;

/// Content type returned for unknown extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Split a path on `/`, dropping empty segments, then percent-decode each
/// segment.
///
/// `/` and the empty string both yield no segments; `//a///b/` yields
/// `["a", "b"]`. Decoding happens after the split, so `%2F` stays inside its
/// segment. Invalid UTF-8 is replaced lossily.
#[must_use]
pub fn tokenize(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}

/// Map a file extension (without the dot) to a content type.
#[must_use]
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "map" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "yaml" | "yml" => "application/yaml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "wasm" => "application/wasm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// True unless `last_segment` looks like a static asset: it contains a `.`
/// and the text after the final `.` maps to a non-default content type.
#[must_use]
pub fn is_routable(last_segment: Option<&str>) -> bool {
    let Some(segment) = last_segment else {
        return true;
    };
    match segment.rsplit_once('.') {
        Some((_, ext)) => content_type_for_extension(ext) == DEFAULT_CONTENT_TYPE,
        None => true,
    }
}

/// Tokenized path plus its routing classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteVerdict {
    pub segments: Vec<String>,
    pub routable: bool,
}

impl RouteVerdict {
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        let segments = tokenize(path);
        let routable = is_routable(segments.last().map(String::as_str));
        Self { segments, routable }
    }
}
