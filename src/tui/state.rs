//! Pure state transformations for the TUI (Functional Core)
//!
//! This module contains ONLY pure functions with no I/O.
//! The imperative shell (app.rs, mod.rs) owns the selection, the
//! submission controller and the terminal, and calls into these.

use std::ops::Range;

use chrono::{DateTime, Local};

use crate::submission::SubmissionState;

// =============================================================================
// Navigation - Pure index calculations
// =============================================================================

/// Calculate new selected index after moving up
pub fn move_selection_up(current: usize) -> usize {
    current.saturating_sub(1)
}

/// Calculate new selected index after moving down
pub fn move_selection_down(current: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        (current + 1).min(max - 1)
    }
}

/// Calculate scroll offset to keep selection visible
pub fn calculate_scroll_offset(
    selected: usize,
    current_offset: usize,
    visible_items: usize,
) -> usize {
    if visible_items == 0 {
        return 0;
    }
    if selected < current_offset {
        selected
    } else if selected >= current_offset + visible_items {
        selected.saturating_sub(visible_items - 1)
    } else {
        current_offset
    }
}

/// Clamp selection index to valid range
pub fn clamp_selection(selected: usize, max: usize) -> usize {
    if max == 0 {
        0
    } else {
        selected.min(max - 1)
    }
}

// =============================================================================
// Chart helpers
// =============================================================================

/// Bar height for a 0-1 score on a 0-100 axis
pub fn bar_value(score: f64) -> u64 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u64
}

/// Frame groups that fit across `width` columns
pub fn chart_capacity(width: u16, bar_width: u16, group_gap: u16) -> usize {
    let group = bar_width * 2 + group_gap;
    if group == 0 {
        return 0;
    }
    (width / group) as usize
}

/// Window of `capacity` chart groups that keeps `focus` in view
pub fn chart_window(len: usize, focus: usize, capacity: usize) -> Range<usize> {
    if capacity == 0 || len == 0 {
        return 0..0;
    }
    if len <= capacity {
        return 0..len;
    }
    let focus = focus.min(len - 1);
    let start = focus.saturating_sub(capacity / 2).min(len - capacity);
    start..start + capacity
}

// =============================================================================
// Labels
// =============================================================================

/// Short phase label for the header
pub fn phase_label(state: &SubmissionState) -> &'static str {
    match state {
        SubmissionState::Idle => "Idle",
        SubmissionState::Uploading => "Uploading…",
        SubmissionState::Succeeded(_) => "Done",
        SubmissionState::Failed(_) => "Failed",
    }
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Seconds between two instants, for "took 12.3s"
pub fn elapsed_label(start: Option<DateTime<Local>>, end: Option<DateTime<Local>>) -> Option<String> {
    let (start, end) = (start?, end?);
    let millis = (end - start).num_milliseconds().max(0);
    Some(format!("{:.1}s", millis as f64 / 1000.0))
}

// =============================================================================
// Tests
// =============================================================================
