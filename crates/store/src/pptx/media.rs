//! Media lookup for picture elements

use crate::pptx::container::Container;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Source of media bytes by container path
pub trait MediaResolver {
    /// Bytes of the part at `path`, if present
    fn media(&self, path: &str) -> Option<&[u8]>;

    fn has_media(&self, path: &str) -> bool {
        self.media(path).is_some()
    }
}

impl MediaResolver for Container {
    fn media(&self, path: &str) -> Option<&[u8]> {
        self.part(path)
    }
}

/// Mime type from a media path's extension, defaulting to PNG
pub fn mime_type_for(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "image/png",
    }
}

/// Inline `data:` URI for media bytes
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}
