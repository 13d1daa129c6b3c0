//! Visible-list projection for review modes.
//!
//! The session has two index spaces: the original question order (what
//! answers and bookmarks key off) and the filtered display order the learner
//! navigates. This module is the only place that maps between them, as a pure
//! function of immutable inputs — no UI state, no mutation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Which filtered sub-session is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewMode {
    Bookmarked,
    Unanswered,
}

/// The visible question list for the current mode, as original indices in
/// display order, plus the bidirectional index mapping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Projection {
    visible: Vec<usize>,
}

impl Projection {
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Original indices in display order.
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// Map a display position to its original index. An out-of-range pointer
    /// (a stale render mid-transition) maps to 0 rather than panicking.
    pub fn to_original(&self, visible_index: usize) -> usize {
        self.visible.get(visible_index).copied().unwrap_or(0)
    }

    /// Map an original index back to its display position, if visible.
    pub fn to_visible(&self, original_index: usize) -> Option<usize> {
        self.visible.iter().position(|&i| i == original_index)
    }
}

/// Derive the visible list. Mode `None` shows everything in stored order;
/// `Bookmarked` filters by the live bookmark set; `Unanswered` filters by the
/// snapshot frozen at mode entry, never the live answer map.
pub fn project(
    question_count: usize,
    bookmarks: &HashSet<usize>,
    unanswered_snapshot: &HashSet<usize>,
    mode: Option<ReviewMode>,
) -> Projection {
    let visible = match mode {
        None => (0..question_count).collect(),
        Some(ReviewMode::Bookmarked) => ascending_members(question_count, bookmarks),
        Some(ReviewMode::Unanswered) => ascending_members(question_count, unanswered_snapshot),
    };
    Projection { visible }
}

fn ascending_members(question_count: usize, set: &HashSet<usize>) -> Vec<usize> {
    let mut members: Vec<usize> = set.iter().copied().filter(|&i| i < question_count).collect();
    members.sort_unstable();
    members
}
