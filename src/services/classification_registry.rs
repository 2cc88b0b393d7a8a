//! Classification registry
//!
//! In-memory lookup table mapping a (protocol, format, metadata-dialect)
//! key to a stable classification id and display name. Entries are seeded
//! once at startup and never mutated by the analysis path, so the registry
//! is shared across concurrent callers without locking.

use std::collections::HashMap;

use tracing::warn;

use crate::models::{ClassificationEntry, ClassificationKey, MetadataDialect, StreamProtocol};

/// The predefined combinations seeded at startup
///
/// New combinations are added administratively; the analysis engine never
/// infers one.
const PREDEFINED_TYPES: [(StreamProtocol, &str, MetadataDialect, &str); 14] = [
    (StreamProtocol::Http, "MP3", MetadataDialect::Icecast, "HTTP MP3 with Icecast metadata"),
    (StreamProtocol::Http, "MP3", MetadataDialect::Shoutcast, "HTTP MP3 with Shoutcast metadata"),
    (StreamProtocol::Http, "MP3", MetadataDialect::None, "HTTP MP3 direct stream"),
    (StreamProtocol::Http, "AAC", MetadataDialect::Icecast, "HTTP AAC with Icecast metadata"),
    (StreamProtocol::Http, "AAC", MetadataDialect::Shoutcast, "HTTP AAC with Shoutcast metadata"),
    (StreamProtocol::Http, "AAC", MetadataDialect::None, "HTTP AAC direct stream"),
    (StreamProtocol::Https, "MP3", MetadataDialect::Icecast, "HTTPS MP3 with Icecast metadata"),
    (StreamProtocol::Https, "MP3", MetadataDialect::Shoutcast, "HTTPS MP3 with Shoutcast metadata"),
    (StreamProtocol::Https, "MP3", MetadataDialect::None, "HTTPS MP3 direct stream"),
    (StreamProtocol::Https, "AAC", MetadataDialect::Icecast, "HTTPS AAC with Icecast metadata"),
    (StreamProtocol::Https, "AAC", MetadataDialect::Shoutcast, "HTTPS AAC with Shoutcast metadata"),
    (StreamProtocol::Https, "AAC", MetadataDialect::None, "HTTPS AAC direct stream"),
    (StreamProtocol::Hls, "AAC", MetadataDialect::None, "HTTP Live Streaming (HLS) with AAC"),
    (
        StreamProtocol::Playlist,
        "PLAYLIST",
        MetadataDialect::None,
        "Playlist file (.m3u, .pls, .m3u8) - parsing not implemented",
    ),
];

/// Read-only lookup table of known stream classifications
#[derive(Debug)]
pub struct ClassificationRegistry {
    entries: Vec<ClassificationEntry>,
    by_key: HashMap<ClassificationKey, usize>,
    by_id: HashMap<i32, usize>,
}

impl ClassificationRegistry {
    /// Build a registry from externally provided entries
    ///
    /// On duplicate keys or ids the first entry wins; duplicates are logged
    /// and dropped from the indexes.
    pub fn new(entries: Vec<ClassificationEntry>) -> Self {
        let mut by_key = HashMap::with_capacity(entries.len());
        let mut by_id = HashMap::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            if by_key.contains_key(&entry.key) {
                warn!(
                    "duplicate classification key {:?} (id {}), keeping first entry",
                    entry.key, entry.id
                );
            } else {
                by_key.insert(entry.key.clone(), index);
            }
            by_id.entry(entry.id).or_insert(index);
        }

        Self {
            entries,
            by_key,
            by_id,
        }
    }

    /// Build the registry with the predefined combinations, ids 1..=14
    pub fn with_predefined_types() -> Self {
        let entries = PREDEFINED_TYPES
            .iter()
            .enumerate()
            .map(|(index, (protocol, format, dialect, display_name))| ClassificationEntry {
                id: index as i32 + 1,
                key: ClassificationKey::new(*protocol, *format, *dialect),
                display_name: (*display_name).to_string(),
            })
            .collect();
        Self::new(entries)
    }

    /// Find the classification id for a (protocol, format, dialect) combination
    pub fn find_id(
        &self,
        protocol: StreamProtocol,
        format: &str,
        dialect: MetadataDialect,
    ) -> Option<i32> {
        let key = ClassificationKey::new(protocol, format, dialect);
        self.by_key.get(&key).map(|&index| self.entries[index].id)
    }

    /// Get an entry by its stable id
    pub fn get(&self, id: i32) -> Option<&ClassificationEntry> {
        self.by_id.get(&id).map(|&index| &self.entries[index])
    }

    /// Get the display name for a classification id
    pub fn display_name(&self, id: i32) -> Option<&str> {
        self.get(id).map(|entry| entry.display_name.as_str())
    }

    /// All registered entries, in seed order
    pub fn all(&self) -> &[ClassificationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
