//! Message text for the chat service.

use crate::playback::PlayingItem;

/// Rendered in place of any missing track field.
pub const UNKNOWN: &str = "(unknown)";

/// Escape the three characters the chat markup treats as control characters.
///
/// A single pass over the input: `&` becomes `&amp;`, `<` becomes `&lt;`,
/// `>` becomes `&gt;`. Entities already present are escaped again, so
/// `escape("&amp;")` is `"&amp;amp;"`.
///
/// # Examples
///
/// ```rust
/// use nowplaying_notify::notifier::escape;
///
/// assert_eq!(escape("Simon & Garfunkel"), "Simon &amp; Garfunkel");
/// assert_eq!(escape("<3"), "&lt;3");
/// ```
pub fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn field_or_unknown(field: Option<&str>) -> String {
    field.map_or_else(|| UNKNOWN.to_string(), escape)
}

/// Build the "now playing" line for `item`.
///
/// Name, artist and album are escaped; the url is inserted verbatim as the
/// link target.
///
/// # Examples
///
/// ```rust
/// use nowplaying_notify::notifier::format_message;
/// use nowplaying_notify::playback::PlayingItem;
///
/// let item = PlayingItem::new()
///     .with_name("Song")
///     .with_artist("Artist")
///     .with_album("Album");
///
/// assert_eq!(
///     format_message(&item),
///     "Now Playing: *Song* by *Artist* from :cd: *Album*"
/// );
/// ```
pub fn format_message(item: &PlayingItem) -> String {
    let name = field_or_unknown(item.name.as_deref());
    let artist = field_or_unknown(item.artist.as_deref());
    let album = field_or_unknown(item.album.as_deref());

    match &item.url {
        Some(url) => format!("Now Playing: *{name}* by *{artist}* from :cd: <{url}|{album}>"),
        None => format!("Now Playing: *{name}* by *{artist}* from :cd: *{album}*"),
    }
}
