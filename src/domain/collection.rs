use std::collections::HashMap;

use serde::Serialize;

use super::track::Track;

/// Name used in [`TrackCollection::track_types`] for tracks without a `type`
pub const UNKNOWN_KIND: &str = "unknown";

/// All tracks of one analyzed input, in document order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct TrackCollection {
    tracks: Vec<Track>,
}

impl TrackCollection {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Track> {
        self.tracks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn of_kind<'a, 'k>(&'a self, kind: &'k str) -> impl Iterator<Item = &'a Track> {
        self.tracks
            .iter()
            .filter(move |t| t.kind().eq_ignore_ascii_case(kind))
    }

    pub fn first_of_kind(&self, kind: &str) -> Option<&Track> {
        self.of_kind(kind).next()
    }

    pub fn general(&self) -> Option<&Track> {
        self.first_of_kind("general")
    }

    pub fn video(&self) -> Option<&Track> {
        self.first_of_kind("video")
    }

    pub fn audio(&self) -> Option<&Track> {
        self.first_of_kind("audio")
    }

    pub fn text(&self) -> Option<&Track> {
        self.first_of_kind("text")
    }

    pub fn menu(&self) -> Option<&Track> {
        self.first_of_kind("menu")
    }

    pub fn image(&self) -> Option<&Track> {
        self.first_of_kind("image")
    }

    pub fn other(&self) -> Option<&Track> {
        self.first_of_kind("other")
    }

    /// One name per track: the kind, numbered from the second occurrence on
    /// (`video`, `audio`, `audio2`, `audio3`).
    pub fn track_types(&self) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        self.tracks
            .iter()
            .map(|track| {
                let kind = if track.kind().is_empty() {
                    UNKNOWN_KIND
                } else {
                    track.kind()
                };
                let count = seen.entry(kind).or_insert(0);
                *count += 1;
                if *count == 1 {
                    kind.to_string()
                } else {
                    format!("{kind}{count}")
                }
            })
            .collect()
    }

    /// Inverse of [`Self::track_types`]: `"audio2"` is the second audio track
    pub fn by_type_name(&self, name: &str) -> Option<&Track> {
        let name = name.to_lowercase();
        self.track_types()
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.tracks.get(i))
    }
}

impl IntoIterator for TrackCollection {
    type Item = Track;
    type IntoIter = std::vec::IntoIter<Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.into_iter()
    }
}

impl<'a> IntoIterator for &'a TrackCollection {
    type Item = &'a Track;
    type IntoIter = std::slice::Iter<'a, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.iter()
    }
}
