//! Derived presentation values for forms.
//!
//! These are computed on demand from stored fields and never persisted.

use crate::types::{DbId, Timestamp};

/// Brand colour assigned to newly created forms.
pub const DEFAULT_BRAND_COLOR: &str = "#1f2937";

/// Brand colour used when a form has none set.
pub const FALLBACK_BRAND_COLOR: &str = "#000000";

/// YIQ brightness at or above which dark text is used.
const YIQ_THRESHOLD: u32 = 128;

/// The form's brand colour, or [`FALLBACK_BRAND_COLOR`].
pub fn brand_color(color: Option<&str>) -> &str {
    match color {
        Some(c) if !c.trim().is_empty() => c,
        _ => FALLBACK_BRAND_COLOR,
    }
}

/// Text colour (`"black"` or `"white"`) readable on top of `hex`.
///
/// Accepts `#rrggbb` and `#rgb`, with or without the leading `#`.
/// Unparseable input is treated as black, giving `"white"`.
pub fn contrast_color(hex: &str) -> &'static str {
    let (r, g, b) = parse_hex(hex).unwrap_or((0, 0, 0));
    let yiq = (r * 299 + g * 587 + b * 114) / 1000;
    if yiq >= YIQ_THRESHOLD {
        "black"
    } else {
        "white"
    }
}

fn parse_hex(hex: &str) -> Option<(u32, u32, u32)> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u32::from_str_radix(expanded.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Up to two space-separated words, each cut to its first two characters.
pub fn initials(name: &str) -> String {
    name.split(' ')
        .take(2)
        .map(|word| word.chars().take(2).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A form is published when its publication timestamp is set and not in
/// the future.
pub fn is_published(published_at: Option<Timestamp>, now: Timestamp) -> bool {
    published_at.is_some_and(|at| at <= now)
}

/// A form is trashed when its deletion timestamp is set and not in the
/// future.
pub fn is_trashed(deleted_at: Option<Timestamp>, now: Timestamp) -> bool {
    deleted_at.is_some_and(|at| at <= now)
}

/// The form-level link if set, otherwise the owner's default.
pub fn active_link(form_link: Option<String>, owner_link: Option<String>) -> Option<String> {
    form_link.filter(|l| !l.is_empty()).or(owner_link)
}

/// Whether `acting_user` owns a form owned by `owner_id`. No user, no
/// ownership.
pub fn is_owner(owner_id: DbId, acting_user: Option<DbId>) -> bool {
    acting_user == Some(owner_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
