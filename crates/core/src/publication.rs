//! Publication-state filter for form listings.

use serde::Serialize;

pub const FILTER_PUBLISHED: &str = "published";
pub const FILTER_UNPUBLISHED: &str = "unpublished";
pub const FILTER_TRASHED: &str = "trashed";

/// Which forms a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationFilter {
    /// Active forms whose publication timestamp is set and not in the future.
    Published,
    /// Active forms with no publication timestamp or one in the future.
    Unpublished,
    /// Soft-deleted forms only.
    Trashed,
    /// Every active form.
    All,
}

impl PublicationFilter {
    /// Parse a query value. Unknown or missing values fall back to
    /// [`PublicationFilter::All`] rather than being rejected.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(FILTER_PUBLISHED) => Self::Published,
            Some(FILTER_UNPUBLISHED) => Self::Unpublished,
            Some(FILTER_TRASHED) => Self::Trashed,
            _ => Self::All,
        }
    }

    /// Whether the listing should consider soft-deleted rows.
    pub fn includes_trashed(self) -> bool {
        matches!(self, Self::Trashed)
    }
}
