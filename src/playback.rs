//! Data published by the media-playback source.

use serde::{Deserialize, Serialize};

/// The item that just started playing.
///
/// Every field is optional; missing fields render as `(unknown)` in the
/// outgoing message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingItem {
    /// Track title
    pub name: Option<String>,
    /// Performing artist
    pub artist: Option<String>,
    /// Album title
    pub album: Option<String>,
    /// Link to the album or track, e.g. on a music store
    pub url: Option<String>,
}

impl PlayingItem {
    /// An item with no known fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the track title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the artist.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the album title.
    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    /// Set the link to the album or track.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
