//! File-picker listing construction.
//!
//! [`all_encoded_files`] reshapes one page of raw records into the flat
//! structure a file-picker renders: one row per distinct extension group of
//! each audio/video record, with scheme-normalized URLs and a thumbnail
//! that degrades to the host's extension icon whenever the remote one
//! cannot be used.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::client::PageResult;
use crate::config::PodConfig;
use crate::record::{MediaType, PodRecord, VideoData};

/// Pixel size requested from the host's icon renderer.
const ICON_SIZE: u32 = 80;

/// Fixed license text; the platform's payloads never carry one.
pub const LICENSE_UNAVAILABLE: &str = "License information unavailable";

/// Host collaborator rendering generic file-type icons.
///
/// Stands in for the host application's output renderer; listings fall
/// back to it whenever a remote thumbnail is not usable.
pub trait IconResolver {
    /// Returns the URL of the icon for `extension` at `size` pixels.
    fn extension_icon_url(&self, extension: &str, size: u32) -> String;
}

/// One displayable file-picker row.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub title: String,
    pub url: String,
    pub source: i64,
    pub extension: String,
    pub datecreated: Option<i64>,
    pub datemodified: Option<i64>,
    /// Always unset; the platform does not report file sizes.
    pub size: Option<u64>,
    pub author: Option<String>,
    pub license: String,
    pub thumbnail: String,
}

/// Listing structure consumed by the file-picker UI.
#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub total: u64,
    pub pages: u64,
    pub perpage: u32,
    pub page: u64,
    /// Tells the picker the listing needs no refresh polling.
    pub norefresh: bool,
    pub list: Vec<FileEntry>,
}

/// One audio/video record with its display fields resolved.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub source: i64,
    pub media_type: MediaType,
    pub title: String,
    /// Canonical URL with the configured scheme prefixed.
    pub url: String,
    pub author: Option<String>,
    pub datecreated: Option<i64>,
    pub datemodified: Option<i64>,
    /// Duration in seconds, as reported by the platform.
    pub duration: Option<i64>,
    pub license: String,
    /// Remote thumbnail with the configured scheme prefixed, when the
    /// record provides one.
    pub thumbnail: Option<String>,
}

impl MediaItem {
    /// Resolves one raw record into its display fields.
    ///
    /// Returns `None` for records whose media type does not belong in a
    /// listing. A missing or unparseable event date falls back to the
    /// modification timestamp.
    #[must_use]
    pub fn from_record(config: &PodConfig, record: &PodRecord) -> Option<Self> {
        let data = &record.video_data;
        let media_type = data.mediatype.filter(|media| media.is_listable())?;

        let datemodified = record.date_added.as_deref().and_then(parse_timestamp);
        let datecreated = record
            .date_evt
            .as_deref()
            .and_then(parse_timestamp)
            .or(datemodified);

        Some(Self {
            source: record.id,
            media_type,
            title: data.title.clone(),
            url: format!("{}{}", config.scheme_prefix(), data.full_url),
            // TODO resolve additional owners once the API exposes them.
            author: data.owner.clone(),
            datecreated,
            datemodified,
            duration: record.duration,
            license: LICENSE_UNAVAILABLE.to_string(),
            thumbnail: data
                .thumbnail
                .as_deref()
                .map(|thumbnail| format!("{}{}", config.scheme_prefix(), thumbnail)),
        })
    }
}

/// Builds the file-picker listing for one page of results.
///
/// Records that fail to decode, and records whose media type is neither
/// audio nor video, are skipped silently; the listing's header fields come
/// from the page envelope either way.
#[must_use]
pub fn all_encoded_files(
    config: &PodConfig,
    icons: &dyn IconResolver,
    page: &PageResult,
) -> FileListing {
    let mut list = Vec::new();
    for raw in &page.results {
        let record = match serde_json::from_value::<PodRecord>(raw.clone()) {
            Ok(record) => record,
            Err(error) => {
                debug!(error = %error, "skipping record with an unexpected shape");
                continue;
            }
        };
        let Some(item) = MediaItem::from_record(config, &record) else {
            continue;
        };
        list.extend(file_entries(config, icons, &item, &record.video_data));
    }

    FileListing {
        total: page.total,
        pages: page.pages,
        perpage: config.page_size(),
        page: page.page,
        norefresh: true,
        list,
    }
}

/// Emits one entry per extension group, from the group's first variant
/// only; later variants in the same group are ignored.
fn file_entries(
    config: &PodConfig,
    icons: &dyn IconResolver,
    item: &MediaItem,
    data: &VideoData,
) -> Vec<FileEntry> {
    let Some(groups) = &data.video_files else {
        return Vec::new();
    };

    groups
        .values()
        .filter_map(|variants| variants.first())
        .map(|file| {
            let thumbnail = remote_thumbnail(config, item)
                .unwrap_or_else(|_| icons.extension_icon_url(&file.extension, ICON_SIZE));
            FileEntry {
                title: format!("{}{}", item.title, file.extension),
                url: item.url.clone(),
                source: item.source,
                extension: file.extension.clone(),
                datecreated: item.datecreated,
                datemodified: item.datemodified,
                size: None,
                author: item.author.clone(),
                license: item.license.clone(),
                thumbnail,
            }
        })
        .collect()
}

/// Why a remote thumbnail could not be used for an entry.
#[derive(Debug, Error)]
enum ThumbnailUnavailable {
    #[error("configuration forces extension icons")]
    IconsForced,

    #[error("record carries no thumbnail")]
    NotProvided,
}

/// Primary thumbnail resolution; any failure variant sends the entry to
/// the extension-icon fallback.
fn remote_thumbnail(config: &PodConfig, item: &MediaItem) -> Result<String, ThumbnailUnavailable> {
    if config.use_extension_icons() {
        return Err(ThumbnailUnavailable::IconsForced);
    }
    item.thumbnail
        .clone()
        .ok_or(ThumbnailUnavailable::NotProvided)
}

/// Parses the platform's date strings into unix seconds.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, and bare `YYYY-MM-DD` values.
fn parse_timestamp(raw: &str) -> Option<i64> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.timestamp());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc().timestamp())
}
