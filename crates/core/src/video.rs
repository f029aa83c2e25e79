//! Video embed recognition and URL derivation.

/// Host fragment that marks an embedded frame as a video.
pub const VIDEO_HOST: &str = "youtube.com";

const EMBED_MARKER: &str = "/embed/";

/// Whether a frame `src` points at the known video host.
pub fn is_video_embed(src: &str) -> bool {
    src.contains(VIDEO_HOST)
}

/// Extract the video id from an embed source.
///
/// Takes the path segment after the first `/embed/` up to the first `?`.
/// Returns `None` when the marker is absent or the segment is empty.
pub fn parse_video_id(src: &str) -> Option<String> {
    let (_, rest) = src.split_once(EMBED_MARKER)?;
    let id = rest.split('?').next().unwrap_or_default().trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Thumbnail image URL for a video id.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/hqdefault.jpg", video_id)
}

/// Canonical watch URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
