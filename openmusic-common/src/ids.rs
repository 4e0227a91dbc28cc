//! Entity id generation
//!
//! Ids are opaque strings of the form `<prefix>-<uuid v4 in simple form>`.

use uuid::Uuid;

pub const ALBUM: &str = "album";
pub const SONG: &str = "song";
pub const PLAYLIST: &str = "playlist";
pub const USER: &str = "user";
pub const COLLABORATION: &str = "collab";

/// Generate a fresh id with the given entity prefix
pub fn generate(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
