//! Role assignments per calendar day.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{TurniError, TurniResult};

/// Role name → operator name for a single day.
pub type DayAssignments = BTreeMap<String, String>;

/// Shape accepted on input: operators may be `null` or empty for an unassigned role.
type RawDays = BTreeMap<NaiveDate, BTreeMap<String, Option<String>>>;

/// All assignments, keyed by date (`YYYY-MM-DD` when serialized).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawDays")]
pub struct Assignments {
    days: BTreeMap<NaiveDate, DayAssignments>,
}

impl From<RawDays> for Assignments {
    fn from(raw: RawDays) -> Self {
        let days = raw
            .into_iter()
            .map(|(date, roles)| {
                let day: DayAssignments = roles
                    .into_iter()
                    .filter_map(|(role, op)| op.filter(|op| !op.is_empty()).map(|op| (role, op)))
                    .collect();
                (date, day)
            })
            .collect();
        Assignments { days }
    }
}

impl Serialize for Assignments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.days.serialize(serializer)
    }
}

/// Parse a `YYYY-MM-DD` date key.
pub fn parse_date_key(s: &str) -> TurniResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TurniError::InvalidDate(s.to_string()))
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayAssignments> {
        self.days.get(&date)
    }

    pub fn operator(&self, date: NaiveDate, role: &str) -> Option<&str> {
        self.days.get(&date)?.get(role).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayAssignments)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Replace everything assigned on `date`, returning what was there before.
    /// An empty `day` clears the date.
    pub fn replace_day(&mut self, date: NaiveDate, day: DayAssignments) -> DayAssignments {
        let day: DayAssignments = day.into_iter().filter(|(_, op)| !op.is_empty()).collect();
        let previous = if day.is_empty() {
            self.days.remove(&date)
        } else {
            self.days.insert(date, day)
        };
        previous.unwrap_or_default()
    }

    /// Put `operator` on `role` for `date`, returning the operator it replaced.
    pub fn assign(&mut self, date: NaiveDate, role: &str, operator: &str) -> Option<String> {
        self.days
            .entry(date)
            .or_default()
            .insert(role.to_string(), operator.to_string())
    }

    /// Clear `role` on `date`, returning the operator that held it.
    pub fn unassign(&mut self, date: NaiveDate, role: &str) -> Option<String> {
        let day = self.days.get_mut(&date)?;
        let removed = day.remove(role);
        if day.is_empty() {
            self.days.remove(&date);
        }
        removed
    }

    /// Days of the given month that have at least one assignment.
    pub fn in_month(&self, year: i32, month: u32) -> impl Iterator<Item = (&NaiveDate, &DayAssignments)> {
        self.days
            .iter()
            .filter(move |(date, _)| date.year() == year && date.month() == month)
    }

    /// Apply every day of `other` on top of this set. Days present in `other`
    /// replace the stored day wholesale; other dates are untouched.
    pub fn merge(&mut self, other: Assignments) {
        for (date, day) in other.days {
            self.replace_day(date, day);
        }
    }
}

/// A role whose operator is new or different after a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentChange {
    New { role: String, operator: String },
    Changed { role: String, previous: String, operator: String },
}

impl AssignmentChange {
    pub fn role(&self) -> &str {
        match self {
            AssignmentChange::New { role, .. } | AssignmentChange::Changed { role, .. } => role,
        }
    }

    pub fn operator(&self) -> &str {
        match self {
            AssignmentChange::New { operator, .. } | AssignmentChange::Changed { operator, .. } => {
                operator
            }
        }
    }
}

/// Compare a day before and after an edit. Roles that were cleared are not
/// reported, only roles that now have a new or different operator.
pub fn diff_day(old: &DayAssignments, new: &DayAssignments) -> Vec<AssignmentChange> {
    new.iter()
        .filter_map(|(role, operator)| match old.get(role) {
            None => Some(AssignmentChange::New {
                role: role.clone(),
                operator: operator.clone(),
            }),
            Some(previous) if previous != operator => Some(AssignmentChange::Changed {
                role: role.clone(),
                previous: previous.clone(),
                operator: operator.clone(),
            }),
            Some(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(pairs: &[(&str, &str)]) -> DayAssignments {
        pairs
            .iter()
            .map(|(r, o)| (r.to_string(), o.to_string()))
            .collect()
    }

    #[test]
    fn assign_and_unassign() {
        let mut all = Assignments::new();
        let d = date(2025, 4, 1);

        assert_eq!(all.assign(d, "Sala 1", "Imelio"), None);
        assert_eq!(all.assign(d, "Sala 1", "Gemme"), Some("Imelio".to_string()));
        assert_eq!(all.operator(d, "Sala 1"), Some("Gemme"));

        assert_eq!(all.unassign(d, "Sala 1"), Some("Gemme".to_string()));
        assert!(all.day(d).is_none(), "empty day should be dropped");
        assert_eq!(all.unassign(d, "Sala 1"), None);
    }

    #[test]
    fn replace_day_returns_previous() {
        let mut all = Assignments::new();
        let d = date(2025, 4, 1);
        all.replace_day(d, day(&[("Sala 1", "Imelio")]));

        let previous = all.replace_day(d, day(&[("Sala 2", "Gemme")]));
        assert_eq!(previous, day(&[("Sala 1", "Imelio")]));
        assert_eq!(all.day(d), Some(&day(&[("Sala 2", "Gemme")])));

        all.replace_day(d, DayAssignments::new());
        assert!(all.is_empty());
    }

    #[test]
    fn deserialize_drops_null_and_empty_operators() {
        let json = r#"{
            "2025-04-01": { "Sala 1": "Imelio", "Sala 2": null, "Olieria": "" },
            "2025-04-02": { "Sala 1": null }
        }"#;
        let all: Assignments = serde_json::from_str(json).unwrap();

        assert_eq!(all.day(date(2025, 4, 1)), Some(&day(&[("Sala 1", "Imelio")])));
        // The date record survives even with nothing assigned
        assert_eq!(all.day(date(2025, 4, 2)), Some(&DayAssignments::new()));
    }

    #[test]
    fn serializes_with_date_keys() {
        let mut all = Assignments::new();
        all.assign(date(2025, 4, 3), "Reparto1", "Maccioni");
        let json = serde_json::to_value(&all).unwrap();
        assert_eq!(json["2025-04-03"]["Reparto1"], "Maccioni");
    }

    #[test]
    fn in_month_filters_by_year_and_month() {
        let mut all = Assignments::new();
        all.assign(date(2025, 4, 30), "Sala 1", "A");
        all.assign(date(2025, 5, 1), "Sala 1", "B");
        all.assign(date(2024, 4, 1), "Sala 1", "C");

        let april: Vec<_> = all.in_month(2025, 4).map(|(d, _)| *d).collect();
        assert_eq!(april, vec![date(2025, 4, 30)]);
    }

    #[test]
    fn merge_replaces_only_imported_days() {
        let mut all = Assignments::new();
        all.assign(date(2025, 4, 1), "Sala 1", "A");
        all.assign(date(2025, 4, 2), "Sala 1", "B");

        let mut imported = Assignments::new();
        imported.assign(date(2025, 4, 2), "Sala 2", "C");
        all.merge(imported);

        assert_eq!(all.operator(date(2025, 4, 1), "Sala 1"), Some("A"));
        assert_eq!(all.day(date(2025, 4, 2)), Some(&day(&[("Sala 2", "C")])));
    }

    #[test]
    fn diff_reports_new_and_changed_roles() {
        let old = day(&[("Sala 1", "Imelio"), ("Sala 2", "Gemme"), ("Olieria", "Pasquero")]);
        let new = day(&[("Sala 1", "Imelio"), ("Sala 2", "Maccioni"), ("Reparto1", "Gemme")]);

        let changes = diff_day(&old, &new);
        assert_eq!(
            changes,
            vec![
                AssignmentChange::New {
                    role: "Reparto1".into(),
                    operator: "Gemme".into()
                },
                AssignmentChange::Changed {
                    role: "Sala 2".into(),
                    previous: "Gemme".into(),
                    operator: "Maccioni".into()
                },
            ]
        );
    }

    #[test]
    fn parse_date_key_rejects_garbage() {
        assert_eq!(parse_date_key("2025-04-01").unwrap(), date(2025, 4, 1));
        assert!(matches!(parse_date_key("01/04/2025"), Err(TurniError::InvalidDate(_))));
    }
}
