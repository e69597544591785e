//! Domain types shared by the lookup pipeline and the rate limiter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Separator joining the words of a title or author name, as used in catalog queries.
pub const QUERY_SEPARATOR: &str = "+";

/// Required length of an ISBN once hyphens are removed.
pub const ISBN_LENGTH: usize = 13;

pub const MANDATORY_PARAMS_MISSING: &str = "There are mandatory parameters missing.";
pub const INVALID_ISBN: &str = "Invalid ISBN (please use ISBN-13)";

/// Normalized identity of a cover lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Title and author with whitespace runs collapsed into [`QUERY_SEPARATOR`].
    TitleAuthor { title: String, author: String },
    /// A hyphen-free ISBN-13.
    Isbn { digits: String },
}

impl LookupKey {
    /// Build a title/author key.
    ///
    /// Leading, trailing and repeated whitespace is dropped, so `"Dune  Messiah "`
    /// and `"dune messiah"` share a cache key. Either part being blank is a
    /// validation error.
    pub fn title_author(title: &str, author: &str) -> Result<Self, Error> {
        let title = join_words(title);
        let author = join_words(author);

        if title.is_empty() || author.is_empty() {
            return Err(Error::InvalidInput(MANDATORY_PARAMS_MISSING.into()));
        }

        Ok(Self::TitleAuthor { title, author })
    }

    /// Build an ISBN key, stripping hyphens and enforcing ISBN-13 length.
    pub fn isbn(raw: &str) -> Result<Self, Error> {
        let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();

        if digits.chars().count() != ISBN_LENGTH {
            return Err(Error::InvalidInput(INVALID_ISBN.into()));
        }

        Ok(Self::Isbn { digits })
    }

    /// Key under which the scraped cover URL is cached.
    pub fn cache_key(&self) -> String {
        match self {
            Self::TitleAuthor { title, author } => format!("{title}{QUERY_SEPARATOR}{author}").to_lowercase(),
            Self::Isbn { digits } => digits.to_lowercase(),
        }
    }
}

fn join_words(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(QUERY_SEPARATOR)
}

/// Requested cover resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSize {
    #[default]
    Default,
    Small,
    Medium,
}

impl ImageSize {
    /// Parse the `image_size` query parameter. Unknown or absent values mean [`ImageSize::Default`].
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("small") => Self::Small,
            Some("medium") => Self::Medium,
            _ => Self::Default,
        }
    }

    fn token(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Small => Some("__SY75__"),
            Self::Medium => Some("__SY375__"),
        }
    }

    /// Rewrite a stored cover URL for this size.
    ///
    /// The size token is inserted before the last `.`. Must only be applied to
    /// an untransformed URL; applying it twice stacks two tokens.
    pub fn apply(self, url: &str) -> String {
        let Some(token) = self.token() else {
            return url.to_string();
        };

        match url.rfind('.') {
            Some(dot) => format!("{}.{}{}", &url[..dot], token, &url[dot..]),
            None => url.to_string(),
        }
    }
}

/// Request quota for a client identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per daily cycle.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u64,

    /// Requests allowed per monthly cycle.
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit: u64,

    /// Skip counting entirely.
    #[serde(default)]
    pub unlimited: bool,
}

pub const DAILY_CYCLE: Duration = Duration::from_secs(86_400);
pub const MONTHLY_CYCLE: Duration = Duration::from_secs(2_592_000);

fn default_daily_limit() -> u64 {
    100
}

fn default_monthly_limit() -> u64 {
    1000
}

impl RateLimitConfig {
    /// Bounded tier: 100 requests a day, 1000 a month.
    pub fn free_tier() -> Self {
        Self { daily_limit: default_daily_limit(), monthly_limit: default_monthly_limit(), unlimited: false }
    }

    /// Unrestricted tier, no counters are touched.
    pub fn unlimited() -> Self {
        Self { unlimited: true, ..Self::free_tier() }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::free_tier()
    }
}
