//! Monday-first month grid for the calendar view.

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;

use crate::assignment::Assignments;
use crate::error::{TurniError, TurniResult};
use crate::shift::{ShiftInfo, shift_for_with_base};

/// A calendar month, identified by year and month number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// A month that chrono can represent along with both of its
    /// neighbours, so `next`/`prev` always move.
    pub fn new(year: i32, month: u32) -> TurniResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .filter(|first| {
                first.checked_add_months(Months::new(1)).is_some()
                    && first.checked_sub_months(Months::new(1)).is_some()
            })
            .map(Self::of)
            .ok_or_else(|| TurniError::InvalidDate(format!("{year}-{month:02}")))
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM`.
    pub fn parse(s: &str) -> TurniResult<Self> {
        let invalid = || TurniError::InvalidDate(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn first_day(self) -> NaiveDate {
        // Constructed through `new`/`of`, so day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn days_in_month(self) -> u32 {
        (28..=31)
            .rev()
            .find(|day| NaiveDate::from_ymd_opt(self.year, self.month, *day).is_some())
            .unwrap_or(28)
    }

    /// The following month, or `self` at the end of chrono's range.
    pub fn next(self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map_or(self, Self::of)
    }

    /// The preceding month, or `self` at the start of chrono's range.
    pub fn prev(self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map_or(self, Self::of)
    }

    pub fn key(self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

/// One day in the grid.
#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub shift: ShiftInfo,
    pub is_today: bool,
    /// Roles in roster order with whether someone covers them. Empty on
    /// inactive days.
    pub roles: Vec<(String, bool)>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid {
    pub month: YearMonth,
    /// Row-major cells, seven per week; `None` pads before the 1st and after
    /// the last day.
    pub cells: Vec<Option<DayCell>>,
}

impl MonthGrid {
    pub fn build(
        month: YearMonth,
        base: NaiveDate,
        today: NaiveDate,
        roles: &[String],
        assignments: &Assignments,
    ) -> Self {
        let first = month.first_day();
        let lead = first.weekday().num_days_from_monday() as usize;

        let mut cells: Vec<Option<DayCell>> = vec![None; lead];

        for day in 1..=month.days_in_month() {
            let date = first.with_day(day).unwrap_or(first);
            let shift = shift_for_with_base(date, base);
            let assigned = assignments.day(date);
            let roles = if shift.active {
                roles
                    .iter()
                    .map(|role| {
                        let covered = assigned.is_some_and(|d| d.get(role).is_some_and(|op| !op.is_empty()));
                        (role.clone(), covered)
                    })
                    .collect()
            } else {
                Vec::new()
            };

            cells.push(Some(DayCell {
                date,
                shift,
                is_today: date == today,
                roles,
            }));
        }

        while cells.len() % 7 != 0 {
            cells.push(None);
        }

        MonthGrid { month, cells }
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[Option<DayCell>]> {
        self.cells.chunks(7)
    }
}
