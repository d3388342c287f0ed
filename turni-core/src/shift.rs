//! The eight-day shift rotation.
//!
//! Every calendar day falls on one slot of a fixed rotation anchored at a base
//! date: two afternoons, a rest day, two mornings, two nights and an unwind
//! day. Only afternoon, morning and night days take role assignments in the
//! month view.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Length of the rotation in days.
pub const ROTATION_DAYS: i64 = 8;

/// Day the rotation starts from (offset 0).
pub const BASE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 4, 1) {
    Some(date) => date,
    None => panic!("invalid rotation base date"),
};

/// Kind of shift worked on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftKind {
    Afternoon,
    Rest,
    Morning,
    Night,
    Unwind,
}

const ROTATION: [ShiftKind; ROTATION_DAYS as usize] = [
    ShiftKind::Afternoon,
    ShiftKind::Afternoon,
    ShiftKind::Rest,
    ShiftKind::Morning,
    ShiftKind::Morning,
    ShiftKind::Night,
    ShiftKind::Night,
    ShiftKind::Unwind,
];

impl ShiftKind {
    /// Whether roles are shown (and assigned) on days of this kind.
    pub fn is_active(self) -> bool {
        !matches!(self, ShiftKind::Rest | ShiftKind::Unwind)
    }

    pub fn label(self) -> &'static str {
        match self {
            ShiftKind::Afternoon => "Afternoon",
            ShiftKind::Rest => "Rest",
            ShiftKind::Morning => "Morning",
            ShiftKind::Night => "Night",
            ShiftKind::Unwind => "Unwind",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Where a day sits in the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftInfo {
    /// Position in the rotation, 0..=7
    pub offset: u8,
    pub kind: ShiftKind,
    pub active: bool,
}

/// Signed calendar-day distance from `base`, normalized into `0..ROTATION_DAYS`.
pub fn day_offset(date: NaiveDate, base: NaiveDate) -> u8 {
    let diff = date.signed_duration_since(base).num_days();
    diff.rem_euclid(ROTATION_DAYS) as u8
}

pub fn shift_for_with_base(date: NaiveDate, base: NaiveDate) -> ShiftInfo {
    let offset = day_offset(date, base);
    let kind = ROTATION[offset as usize];
    ShiftInfo {
        offset,
        kind,
        active: kind.is_active(),
    }
}

/// Shift for `date` using the default [`BASE_DATE`].
pub fn shift_for(date: NaiveDate) -> ShiftInfo {
    shift_for_with_base(date, BASE_DATE)
}
