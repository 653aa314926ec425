//! core::check
//!
//! Content check (approval workflow) levels.
//!
//! # Levels
//!
//! An unchecked item carries a signed `checked_level`:
//!
//! | value   | meaning                             |
//! |---------|-------------------------------------|
//! | `-99`   | draft                               |
//! | `0`     | awaiting first check                |
//! | `1..=4` | passed the n-th check               |
//! | `-1..=-5` | rejected at the n-th check        |
//!
//! Passing the site's final level flips `checked` to `true`.
//!
//! # Example
//!
//! ```
//! use cascadework::core::check::{CheckState, DRAFT_LEVEL};
//!
//! assert_eq!(CheckState::from_level(false, DRAFT_LEVEL, 3).label(), "草稿");
//! assert_eq!(CheckState::from_level(false, 1, 3).label(), "初审通过");
//! assert_eq!(CheckState::from_level(false, -2, 3).label(), "二审退稿");
//! assert_eq!(CheckState::from_level(true, 0, 3).label(), "已审核");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{Content, Site};

/// Level value of a draft.
pub const DRAFT_LEVEL: i32 = -99;

/// Level value of an item awaiting its first check.
pub const PENDING_LEVEL: i32 = 0;

const PASS_LABELS: [&str; 5] = ["初审通过", "二审通过", "三审通过", "四审通过", "终审通过"];
const FAIL_LABELS: [&str; 5] = ["初审退稿", "二审退稿", "三审退稿", "四审退稿", "终审退稿"];

/// Computed workflow stage of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    /// Passed every check level.
    Checked,
    /// Saved as draft, never submitted.
    Draft,
    /// Submitted, awaiting the first check.
    Pending,
    /// Passed the given level (1-based) but not the final one.
    Passed(u8),
    /// Rejected at the given level (1-based).
    Rejected(u8),
}

impl CheckState {
    /// Compute the state of a content item within its site.
    pub fn of(site: &Site, content: &Content) -> Self {
        Self::from_level(
            content.checked,
            content.checked_level,
            site.effective_check_level(),
        )
    }

    /// Compute the state from raw fields.
    ///
    /// `site_level` is the number of check levels in force (1..=5).
    pub fn from_level(checked: bool, level: i32, site_level: u8) -> Self {
        if checked {
            return CheckState::Checked;
        }
        match level {
            DRAFT_LEVEL => CheckState::Draft,
            PENDING_LEVEL => CheckState::Pending,
            n if n > 0 => {
                if n >= i32::from(site_level) {
                    CheckState::Checked
                } else {
                    CheckState::Passed(n.min(5) as u8)
                }
            }
            n if n >= -5 => CheckState::Rejected((-n) as u8),
            _ => CheckState::Pending,
        }
    }

    /// Human-readable label, as shown in content lists.
    pub fn label(&self) -> &'static str {
        match self {
            CheckState::Checked => "已审核",
            CheckState::Draft => "草稿",
            CheckState::Pending => "待审核",
            CheckState::Passed(n) => PASS_LABELS[usize::from((*n).clamp(1, 5) - 1)],
            CheckState::Rejected(n) => FAIL_LABELS[usize::from((*n).clamp(1, 5) - 1)],
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A labelled option for check-box style filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckBox<T> {
    pub label: String,
    pub value: T,
}

impl<T> CheckBox<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Check levels selectable when filtering the site's contents.
///
/// Always includes draft and pending, the intermediate pass levels, and
/// the final "checked" level (valued at the site's level count). Rejected
/// levels are included when `include_fail` is set.
pub fn checked_levels(site: &Site, include_fail: bool) -> Vec<CheckBox<i32>> {
    let levels = site.effective_check_level();
    let mut boxes = vec![
        CheckBox::new(CheckState::Draft.label(), DRAFT_LEVEL),
        CheckBox::new(CheckState::Pending.label(), PENDING_LEVEL),
    ];

    for n in 1..levels {
        boxes.push(CheckBox::new(CheckState::Passed(n).label(), i32::from(n)));
    }

    if include_fail {
        for n in 1..=levels {
            boxes.push(CheckBox::new(
                CheckState::Rejected(n).label(),
                -i32::from(n),
            ));
        }
    }

    boxes.push(CheckBox::new(
        CheckState::Checked.label(),
        i32::from(levels),
    ));
    boxes
}
