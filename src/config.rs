//! Connection options for one Pod instance.
//!
//! A [`PodConfig`] is hydrated from the host's stored plugin settings and
//! handed to the API client at construction. Nothing mutates it afterwards;
//! concurrent callers each own their client and configuration.

use serde::{Deserialize, Serialize};

/// Envelope page size used when the host configures none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_https() -> bool {
    true
}

/// Immutable option set for one Pod instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodConfig {
    api_url: String,
    api_key: String,
    #[serde(default = "default_page_size")]
    page_size: u32,
    #[serde(default = "default_https")]
    https: bool,
    #[serde(default)]
    use_extension_icons: bool,
}

impl PodConfig {
    /// Creates a configuration for the Pod instance at `api_url`,
    /// authenticated with `api_key`.
    ///
    /// Defaults: page size [`DEFAULT_PAGE_SIZE`], https scheme, remote
    /// thumbnails allowed.
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
            https: true,
            use_extension_icons: false,
        }
    }

    /// Sets the page size used for pagination math and the listing's
    /// `perpage` field.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the scheme used when prefixing the platform's scheme-relative
    /// URLs.
    #[must_use]
    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    /// Forces the host's extension icons over remote thumbnails in
    /// listings.
    #[must_use]
    pub fn with_extension_icons(mut self, use_extension_icons: bool) -> Self {
        self.use_extension_icons = use_extension_icons;
        self
    }

    /// Base URL of the Pod instance, without a trailing slash.
    #[must_use]
    pub fn api_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Configured envelope page size.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Whether scheme-relative URLs are prefixed with `https:`.
    #[must_use]
    pub fn https(&self) -> bool {
        self.https
    }

    /// Whether listings always use extension icons instead of remote
    /// thumbnails.
    #[must_use]
    pub fn use_extension_icons(&self) -> bool {
        self.use_extension_icons
    }

    /// Scheme prefix applied to the platform's scheme-relative URLs.
    pub(crate) fn scheme_prefix(&self) -> &'static str {
        if self.https { "https:" } else { "http:" }
    }
}
