//! Session and completion aggregation.
//!
//! The database crate answers the same questions with SQL; the functions
//! here define the semantics over in-memory response events and compute
//! the derived completion rate. All values are recomputed on demand.

use std::collections::{HashMap, HashSet};

use chrono::Datelike;
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Number of decimal places kept in a completion rate.
pub const COMPLETION_RATE_DECIMALS: i32 = 2;

/// One recorded answer to a block within a visitor session.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEvent {
    /// Visitor session token grouping events into one interaction.
    pub session: String,
    /// Block the event answers.
    pub block_id: DbId,
    /// Completion flag of the owning session.
    pub session_completed: bool,
    pub created_at: Timestamp,
}

/// Session metrics for a single form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionMetrics {
    pub total_sessions: i64,
    pub completed_sessions: i64,
    pub completion_rate: f64,
}

impl SessionMetrics {
    /// Build metrics from raw counts, deriving the completion rate.
    pub fn from_counts(total_sessions: i64, completed_sessions: i64) -> Self {
        Self {
            total_sessions,
            completed_sessions,
            completion_rate: completion_rate(total_sessions, completed_sessions),
        }
    }
}

// ---------------------------------------------------------------------------
// Rate
// ---------------------------------------------------------------------------

/// Percentage of completed sessions, rounded half away from zero to two
/// decimals.
///
/// The rounding is done on an exact integer ratio, so a rate that lands on
/// a half hundredth (23 of 160 is 14.375) always rounds up. A zero or
/// negative total yields `0.0`.
pub fn completion_rate(total: i64, completed: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let scale = 100 * 10i128.pow(COMPLETION_RATE_DECIMALS as u32);
    let total = i128::from(total);
    let magnitude = (i128::from(completed).abs() * scale * 2 + total) / (total * 2);
    let scaled = if completed < 0 { -magnitude } else { magnitude };
    scaled as f64 / 10f64.powi(COMPLETION_RATE_DECIMALS)
}

// ---------------------------------------------------------------------------
// Counting
// ---------------------------------------------------------------------------

fn in_form<'a>(
    events: &'a [ResponseEvent],
    block_ids: &'a [DbId],
) -> impl Iterator<Item = &'a ResponseEvent> + 'a {
    events.iter().filter(move |e| block_ids.contains(&e.block_id))
}

/// Distinct sessions with at least one event on one of `block_ids`.
pub fn count_distinct_sessions(events: &[ResponseEvent], block_ids: &[DbId]) -> i64 {
    in_form(events, block_ids)
        .map(|e| e.session.as_str())
        .collect::<HashSet<_>>()
        .len() as i64
}

/// Among sessions with at least one event on `block_ids`, the number flagged
/// completed.
pub fn count_completed_sessions(events: &[ResponseEvent], block_ids: &[DbId]) -> i64 {
    let mut sessions: HashMap<&str, bool> = HashMap::new();
    for event in in_form(events, block_ids) {
        let completed = sessions.entry(event.session.as_str()).or_insert(false);
        *completed |= event.session_completed;
    }
    sessions.values().filter(|completed| **completed).count() as i64
}

/// Distinct sessions whose events on `block_ids` fall in the calendar year
/// and month of `now`.
pub fn count_sessions_in_month(
    events: &[ResponseEvent],
    block_ids: &[DbId],
    now: Timestamp,
) -> i64 {
    in_form(events, block_ids)
        .filter(|e| e.created_at.year() == now.year() && e.created_at.month() == now.month())
        .map(|e| e.session.as_str())
        .collect::<HashSet<_>>()
        .len() as i64
}

/// Metrics for a form computed from in-memory events.
pub fn aggregate(events: &[ResponseEvent], block_ids: &[DbId]) -> SessionMetrics {
    SessionMetrics::from_counts(
        count_distinct_sessions(events, block_ids),
        count_completed_sessions(events, block_ids),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
