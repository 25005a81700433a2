//! Physical key encoding for world collections.
//!
//! Documents live under keys of the form `!<collection>!<id>`.  This layout is shared with
//! the host application's own stores and must not change.

/// Document types whose collection name is not simply the lowercase plural.
const COLLECTION_NAMES: &[(&str, &str)] = &[
    ("Actor", "actors"),
    ("Adventure", "adventures"),
    ("Cards", "cards"),
    ("ChatMessage", "messages"),
    ("Combat", "combats"),
    ("FogExploration", "fog"),
    ("Folder", "folders"),
    ("Item", "items"),
    ("JournalEntry", "journal"),
    ("Macro", "macros"),
    ("Playlist", "playlists"),
    ("RollTable", "tables"),
    ("Scene", "scenes"),
    ("Setting", "settings"),
    ("User", "users"),
];

/// Maps a document type name to its canonical collection name.
///
/// ```rust
/// use worldkeeper::collection_name_for;
///
/// assert_eq!(collection_name_for("Actor"), "actors");
/// assert_eq!(collection_name_for("JournalEntry"), "journal");
/// assert_eq!(collection_name_for("Token"), "tokens");
/// ```
pub fn collection_name_for(document_type: &str) -> String {
    COLLECTION_NAMES
        .iter()
        .find(|(name, _)| *name == document_type)
        .map(|(_, collection)| collection.to_string())
        .unwrap_or_else(|| format!("{}s", document_type.to_lowercase()))
}

/// Encodes a collection name and document id into a store key.
pub fn encode_key(collection: &str, id: &str) -> String {
    format!("!{}!{}", collection, id)
}

/// The prefix shared by every key of one collection.
pub fn collection_prefix(collection: &str) -> String {
    format!("!{}!", collection)
}

/// Splits a store key back into `(collection, id)`.
///
/// Returns `None` for keys that do not follow the `!collection!id` layout.
pub fn decode_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix('!')?;
    let (collection, id) = rest.split_once('!')?;
    if collection.is_empty() {
        return None;
    }
    Some((collection, id))
}
