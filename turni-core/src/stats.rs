//! Assignment tallies and rankings.
//!
//! Counts are built per month (`YYYY-MM`), per year and per operator/role
//! category. Rankings pick gold/silver/bronze from the highest counts and
//! "last" from the lowest; ties keep the order of the input list.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use serde::Serialize;

use crate::assignment::Assignments;

/// Operator name → number of role-slots filled.
pub type Counts = BTreeMap<String, u32>;

/// Top three and bottom one of a ranked list. Positions the list is too short
/// to fill are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranking<T> {
    pub gold: Option<T>,
    pub silver: Option<T>,
    pub bronze: Option<T>,
    pub last: Option<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    Last,
}

impl<T: PartialEq> Ranking<T> {
    /// Medal shown next to `item`. The podium wins over "last" when a short
    /// list puts the same item in both.
    pub fn medal_for(&self, item: &T) -> Option<Medal> {
        let is = |slot: &Option<T>| slot.as_ref() == Some(item);
        if is(&self.gold) {
            Some(Medal::Gold)
        } else if is(&self.silver) {
            Some(Medal::Silver)
        } else if is(&self.bronze) {
            Some(Medal::Bronze)
        } else if is(&self.last) {
            Some(Medal::Last)
        } else {
            None
        }
    }
}

/// Rank `(item, count)` pairs. Both sorts are stable, so equal counts keep
/// their input order.
pub fn rank_by_count<T: Clone>(pairs: &[(T, u32)]) -> Ranking<T> {
    let mut desc = pairs.to_vec();
    desc.sort_by(|a, b| b.1.cmp(&a.1));

    let mut asc = pairs.to_vec();
    asc.sort_by(|a, b| a.1.cmp(&b.1));

    let at = |list: &[(T, u32)], i: usize| list.get(i).map(|(item, _)| item.clone());

    Ranking {
        gold: at(&desc, 0),
        silver: at(&desc, 1),
        bronze: at(&desc, 2),
        last: at(&asc, 0),
    }
}

/// Rank the listed operators by their count in `counts` (missing = 0).
pub fn rank_operators(counts: &Counts, operators: &[String]) -> Ranking<String> {
    let pairs: Vec<(String, u32)> = operators
        .iter()
        .map(|op| (op.clone(), counts.get(op).copied().unwrap_or(0)))
        .collect();
    rank_by_count(&pairs)
}

/// Filled role-slots per operator, grouped by `YYYY-MM`, months ascending.
///
/// Any month with a date record starts every listed operator at zero.
/// Operators outside the list are still counted but never ranked.
pub fn monthly_counts(assignments: &Assignments, operators: &[String]) -> BTreeMap<String, Counts> {
    let mut months: BTreeMap<String, Counts> = BTreeMap::new();

    for (date, day) in assignments.iter() {
        let key = format!("{}-{:02}", date.year(), date.month());
        let counts = months
            .entry(key)
            .or_insert_with(|| operators.iter().map(|op| (op.clone(), 0)).collect());

        for operator in day.values().filter(|op| !op.is_empty()) {
            *counts.entry(operator.clone()).or_insert(0) += 1;
        }
    }

    months
}

/// Monthly counts summed per year, newest year first.
pub fn annual_counts(monthly: &BTreeMap<String, Counts>) -> Vec<(String, Counts)> {
    let mut years: BTreeMap<String, Counts> = BTreeMap::new();

    for (month, counts) in monthly {
        let year = month.split('-').next().unwrap_or(month).to_string();
        let totals = years.entry(year).or_default();
        for (operator, count) in counts {
            *totals.entry(operator.clone()).or_insert(0) += count;
        }
    }

    years.into_iter().rev().collect()
}

/// Counts and ranking for one month or year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodStats {
    pub period: String,
    pub counts: Counts,
    pub ranking: Ranking<String>,
}

pub fn monthly_stats(assignments: &Assignments, operators: &[String]) -> Vec<PeriodStats> {
    monthly_counts(assignments, operators)
        .into_iter()
        .map(|(period, counts)| PeriodStats {
            ranking: rank_operators(&counts, operators),
            period,
            counts,
        })
        .collect()
}

pub fn annual_stats(assignments: &Assignments, operators: &[String]) -> Vec<PeriodStats> {
    annual_counts(&monthly_counts(assignments, operators))
        .into_iter()
        .map(|(period, counts)| PeriodStats {
            ranking: rank_operators(&counts, operators),
            period,
            counts,
        })
        .collect()
}

/// Department group a role belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoleCategory {
    Sala,
    Reparto,
    Olieria,
}

impl RoleCategory {
    /// Order used to break ties between categories.
    pub const ALL: [RoleCategory; 3] = [RoleCategory::Sala, RoleCategory::Reparto, RoleCategory::Olieria];

    /// Roles containing "sala" are halls, "reparto" are wards, anything else
    /// counts as olieria. Matching ignores case.
    pub fn of(role: &str) -> RoleCategory {
        let lower = role.to_lowercase();
        if lower.contains("sala") {
            RoleCategory::Sala
        } else if lower.contains("reparto") {
            RoleCategory::Reparto
        } else {
            RoleCategory::Olieria
        }
    }
}

impl fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RoleCategory::Sala => "Sala",
            RoleCategory::Reparto => "Reparto",
            RoleCategory::Olieria => "Olieria",
        };
        f.pad(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub sala: u32,
    pub reparto: u32,
    pub olieria: u32,
}

impl CategoryCounts {
    pub fn get(&self, category: RoleCategory) -> u32 {
        match category {
            RoleCategory::Sala => self.sala,
            RoleCategory::Reparto => self.reparto,
            RoleCategory::Olieria => self.olieria,
        }
    }

    fn bump(&mut self, category: RoleCategory) {
        match category {
            RoleCategory::Sala => self.sala += 1,
            RoleCategory::Reparto => self.reparto += 1,
            RoleCategory::Olieria => self.olieria += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.sala + self.reparto + self.olieria
    }

    pub fn ranking(&self) -> Ranking<RoleCategory> {
        let pairs: Vec<(RoleCategory, u32)> = RoleCategory::ALL.iter().map(|c| (*c, self.get(*c))).collect();
        rank_by_count(&pairs)
    }
}

/// All-time category breakdown for one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorStats {
    pub operator: String,
    pub categories: CategoryCounts,
    pub total: u32,
    pub ranking: Ranking<RoleCategory>,
}

/// Per-operator category tallies over every date, in list order. Operators
/// outside the list are ignored.
pub fn operator_stats(assignments: &Assignments, operators: &[String]) -> Vec<OperatorStats> {
    let mut tallies: BTreeMap<&str, CategoryCounts> =
        operators.iter().map(|op| (op.as_str(), CategoryCounts::default())).collect();

    for (_, day) in assignments.iter() {
        for (role, operator) in day {
            if let Some(counts) = tallies.get_mut(operator.as_str()) {
                counts.bump(RoleCategory::of(role));
            }
        }
    }

    operators
        .iter()
        .map(|op| {
            let categories = tallies.get(op.as_str()).copied().unwrap_or_default();
            OperatorStats {
                operator: op.clone(),
                total: categories.total(),
                ranking: categories.ranking(),
                categories,
            }
        })
        .collect()
}

/// Ranking of operators by their all-time totals.
pub fn global_ranking(stats: &[OperatorStats]) -> Ranking<String> {
    let pairs: Vec<(String, u32)> = stats.iter().map(|s| (s.operator.clone(), s.total)).collect();
    rank_by_count(&pairs)
}

/// Everything the statistics view shows, computed in one pass per view.
#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub monthly: Vec<PeriodStats>,
    pub annual: Vec<PeriodStats>,
    pub operators: Vec<OperatorStats>,
    pub global: Ranking<String>,
}

impl StatsReport {
    pub fn build(assignments: &Assignments, operators: &[String]) -> Self {
        let monthly = monthly_stats(assignments, operators);
        let annual = annual_stats(assignments, operators);
        let operator_rows = operator_stats(assignments, operators);
        let global = global_ranking(&operator_rows);

        StatsReport {
            monthly,
            annual,
            operators: operator_rows,
            global,
        }
    }
}
