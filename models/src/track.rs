use crate::payload::TypedPayload;

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Separator between the fields of an encoded track entry (ASCII unit separator).
pub const TRACK_FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
}

impl Display for TrackKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let label = match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Subtitle => "subtitle",
        };
        write!(formatter, "{label}")
    }
}

/// One selectable stream of the loaded media.
///
/// External subtitle files are listed with `id == 0` and the file path as title.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub id: u32,
    pub language: String,
    pub title: String,
}

impl TrackInfo {
    pub fn new(id: u32, language: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            language: language.into(),
            title: title.into(),
        }
    }

    pub fn external_file(path: impl Into<String>) -> Self {
        Self {
            id: 0,
            language: String::new(),
            title: path.into(),
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.id,
            self.language,
            self.title,
            sep = TRACK_FIELD_SEPARATOR
        )
    }

    /// Parses an encoded entry. Returns `None` when the id is not a number or a field is missing.
    pub fn decode(entry: &str) -> Option<Self> {
        let mut fields = entry.splitn(3, TRACK_FIELD_SEPARATOR);
        let id = fields.next()?.parse().ok()?;
        let language = fields.next()?.to_string();
        let title = fields.next()?.to_string();
        Some(Self { id, language, title })
    }

    pub fn list_to_payload(tracks: &[TrackInfo]) -> TypedPayload {
        TypedPayload::StringList(tracks.iter().map(TrackInfo::encode).collect())
    }

    /// Decodes every well-formed entry of a list payload; other payloads yield an empty list.
    pub fn list_from_payload(payload: &TypedPayload) -> Vec<TrackInfo> {
        payload
            .as_list()
            .map(|entries| entries.iter().filter_map(|e| TrackInfo::decode(e)).collect())
            .unwrap_or_default()
    }
}
