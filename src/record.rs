//! Schema-validated Pod record types.
//!
//! The platform's REST payloads decode into explicit types with optional
//! fields instead of being probed dynamically. Fields the crate does not
//! consume are ignored by the deserializer; a record that does not match
//! this shape is skipped by the listing layer rather than failing a page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Media classification reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Audio,
    Video,
    /// Anything else the platform reports; such records never reach a
    /// listing.
    #[serde(other)]
    Other,
}

impl MediaType {
    /// Returns true for the media types that appear in file-picker
    /// listings.
    #[must_use]
    pub fn is_listable(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }
}

/// One video/audio record from a paginated listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PodRecord {
    /// Remote identifier; becomes the picker entry's source.
    pub id: i64,
    /// Upload timestamp, as formatted by the platform.
    #[serde(default)]
    pub date_added: Option<String>,
    /// Event date, when the recording is tied to one.
    #[serde(default)]
    pub date_evt: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<i64>,
    pub video_data: VideoData,
}

/// Nested media description of one record.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoData {
    #[serde(default)]
    pub mediatype: Option<MediaType>,
    pub title: String,
    /// Scheme-relative canonical URL (`//pod.example.org/...`).
    pub full_url: String,
    #[serde(default)]
    pub owner: Option<String>,
    /// Scheme-relative thumbnail URL, when the platform rendered one.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Encoded renditions keyed by extension group, ordered so listing
    /// output stays deterministic.
    #[serde(default)]
    pub video_files: Option<BTreeMap<String, Vec<VideoFile>>>,
}

/// One encoded file variant inside an extension group.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoFile {
    pub extension: String,
}
