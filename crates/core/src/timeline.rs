//! Timeline reconstruction over a ticket's action log.
//!
//! Status durations and pause intervals are never stored; they are
//! recomputed on every read from the ordered, append-only sequence of
//! recorded actions. Both functions here are pure: ordered slice in,
//! fresh derived list out. Caching of the results belongs to the API
//! layer's cache coordinator, not here.

use serde::{Deserialize, Serialize};

use crate::status::{ActionType, TicketStatus};
use crate::types::Timestamp;

/// Minimal projection of a `ticket_actions` row needed for reconstruction.
///
/// The repository layer maps database rows into this shape, skipping rows
/// whose status strings no longer parse (the log is append-only, so a
/// retired status value must not fail every future read).
#[derive(Debug, Clone)]
pub struct TimelineEvent {
    pub action_type: ActionType,
    pub from_status: Option<TicketStatus>,
    pub to_status: Option<TicketStatus>,
    pub performed_at: Timestamp,
}

/// One contiguous occupancy of a status. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSegment {
    pub status: TicketStatus,
    /// Whole seconds spent in `status`. Always positive; non-positive
    /// candidates are dropped during reconstruction.
    pub duration_secs: i64,
}

/// A window during which the ticket sat in `paused`. Derived, never
/// persisted. `ended_at = None` means the ticket is still paused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseInterval {
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Status segments
// ---------------------------------------------------------------------------

/// Reconstruct the status-duration segments for one ticket.
///
/// `events` is the full action sequence for the ticket; ordering is
/// re-established here (stable sort by `performed_at`, ties keep log
/// insertion order) so callers can pass rows exactly as fetched.
/// `effective_end` closes the trailing segment; the caller resolves it
/// from the explicit override or the ticket's resolution timestamps.
///
/// A ticket with no recorded status change has no measurable timeline and
/// yields an empty list. Segments with non-positive duration -- clock
/// skew or two writers racing on the same log -- are dropped rather than
/// reported as errors.
pub fn status_segments(events: &[TimelineEvent], effective_end: Timestamp) -> Vec<StatusSegment> {
    // Project down to (action, entered status, instant); events without a
    // destination status carry no timeline information.
    let mut relevant: Vec<(ActionType, TicketStatus, Timestamp)> = events
        .iter()
        .filter(|e| matches!(e.action_type, ActionType::Create | ActionType::StatusChange))
        .filter_map(|e| e.to_status.map(|status| (e.action_type, status, e.performed_at)))
        .collect();
    relevant.sort_by_key(|&(_, _, at)| at);

    let has_status_change = relevant
        .iter()
        .any(|&(action, _, _)| action == ActionType::StatusChange);
    if !has_status_change {
        return Vec::new();
    }

    let mut segments = Vec::with_capacity(relevant.len());

    for pair in relevant.windows(2) {
        let (_, status, entered_at) = pair[0];
        let (_, _, left_at) = pair[1];
        let duration_secs = (left_at - entered_at).num_seconds();
        if duration_secs <= 0 {
            continue;
        }
        segments.push(StatusSegment {
            status,
            duration_secs,
        });
    }

    // Trailing segment: from the last recorded event to the effective end.
    if let Some(&(_, status, entered_at)) = relevant.last() {
        let duration_secs = (effective_end - entered_at).num_seconds();
        if duration_secs > 0 {
            segments.push(StatusSegment {
                status,
                duration_secs,
            });
        }
    }

    segments
}

// ---------------------------------------------------------------------------
// Pause intervals
// ---------------------------------------------------------------------------

/// Extract the pause windows from one ticket's action sequence.
///
/// Only `status_change` actions participate. Each transition *into*
/// `paused` opens an interval; the next event transitioning *out of*
/// `paused` closes it and is consumed, so overlapping reuse is
/// impossible. An entry with no matching exit yields a single open
/// interval and ends the scan -- by construction at most one interval
/// can be open per ticket.
pub fn pause_intervals(events: &[TimelineEvent]) -> Vec<PauseInterval> {
    let mut changes: Vec<&TimelineEvent> = events
        .iter()
        .filter(|e| e.action_type == ActionType::StatusChange)
        .collect();
    changes.sort_by_key(|e| e.performed_at);

    let mut intervals = Vec::new();
    let mut i = 0;

    while i < changes.len() {
        if changes[i].to_status != Some(TicketStatus::Paused) {
            i += 1;
            continue;
        }

        let started_at = changes[i].performed_at;
        let exit = changes[i + 1..]
            .iter()
            .position(|e| e.from_status == Some(TicketStatus::Paused))
            .map(|offset| i + 1 + offset);

        match exit {
            Some(j) => {
                intervals.push(PauseInterval {
                    started_at,
                    ended_at: Some(changes[j].performed_at),
                });
                i = j + 1;
            }
            None => {
                intervals.push(PauseInterval {
                    started_at,
                    ended_at: None,
                });
                break;
            }
        }
    }

    intervals
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render segments as a narrative string, e.g. `"OPEN 1h -> PAUSED 30m"`.
pub fn render_segments(segments: &[StatusSegment]) -> String {
    segments
        .iter()
        .map(|s| {
            format!(
                "{} {}",
                s.status.as_str().to_uppercase(),
                render_duration(s.duration_secs)
            )
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Coarse human duration: days if >= 1 day, else hours if >= 1 hour,
/// else minutes with a floor of one minute.
pub fn render_duration(duration_secs: i64) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    if duration_secs >= DAY {
        format!("{}d", duration_secs / DAY)
    } else if duration_secs >= HOUR {
        format!("{}h", duration_secs / HOUR)
    } else {
        format!("{}m", (duration_secs / MINUTE).max(1))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
