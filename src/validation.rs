//! Structural checks for M3U playlist text.

use tracing::warn;

pub const HEADER_MARKER: &str = "#EXTM3U";
pub const CHANNEL_MARKER: &str = "#EXTINF:";
pub const STREAM_PREFIX: &str = "http";

/// Whether `text` looks like a usable playlist.
///
/// Requires at least one channel entry line and one stream URL line. A
/// missing `#EXTM3U` header is tolerated with a warning.
///
/// # Examples
///
/// ```
/// use iptv_manager::validation::is_valid_playlist;
///
/// assert!(is_valid_playlist("#EXTM3U\n#EXTINF:-1,News\nhttp://example.com/news.m3u8\n"));
/// assert!(!is_valid_playlist("   \n"));
/// ```
pub fn is_valid_playlist(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return false;
    }

    let mut lines = text.lines().map(str::trim).peekable();
    if !lines
        .peek()
        .map_or(false, |first| first.starts_with(HEADER_MARKER))
    {
        warn!("Playlist has no {} header, continuing", HEADER_MARKER);
    }

    let mut has_channel = false;
    let mut has_stream = false;
    for line in lines {
        has_channel |= line.starts_with(CHANNEL_MARKER);
        has_stream |= line.starts_with(STREAM_PREFIX);
        if has_channel && has_stream {
            return true;
        }
    }
    false
}

/// Number of channel entry lines.
pub fn channel_count(text: &str) -> usize {
    text.lines()
        .filter(|line| line.trim_start().starts_with(CHANNEL_MARKER))
        .count()
}
