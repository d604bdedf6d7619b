//! Goal tracking
//!
//! Percent-of-goal and remaining budget against the active goal. Targets are
//! user supplied, so every division is guarded.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{DailyTotal, GoalRecord, Nutrition};

/// Integer percentages in `0..=100`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Percentages {
    pub calories: u8,
    pub protein: u8,
    pub carbs: u8,
    pub fat: u8,
}

/// One day measured against a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub date: NaiveDate,
    pub totals: DailyTotal,
    pub percentages: Percentages,
}

/// A day in a trend; `progress` is absent when there is no active goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(flatten)]
    pub total: DailyTotal,
    pub progress: Option<Percentages>,
}

/// What is left of the goal for the day. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RemainingBudget {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl RemainingBudget {
    /// True when every value of `n` fits in the budget
    pub fn admits(&self, n: &Nutrition) -> bool {
        n.calories <= self.calories
            && n.protein <= self.protein
            && n.carbs <= self.carbs
            && n.fat <= self.fat
    }
}

/// Zero, negative and non-finite values all mean "not set".
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// `round(min(100, 100 * actual / target))`, or 0 when the target is not set
pub fn percent_of(actual: f64, target: f64) -> u8 {
    let target = sanitize(target);
    if target == 0.0 {
        return 0;
    }
    let pct = (100.0 * sanitize(actual) / target).min(100.0).round();
    pct as u8
}

pub fn percentages(actual: &Nutrition, targets: &Nutrition) -> Percentages {
    Percentages {
        calories: percent_of(actual.calories, targets.calories),
        protein: percent_of(actual.protein, targets.protein),
        carbs: percent_of(actual.carbs, targets.carbs),
        fat: percent_of(actual.fat, targets.fat),
    }
}

/// Single-day progress. `None` means there is no active goal.
pub fn progress(totals: &DailyTotal, goal: Option<&GoalRecord>) -> Option<ProgressSnapshot> {
    let goal = goal?;
    Some(ProgressSnapshot {
        date: totals.date,
        totals: totals.clone(),
        percentages: percentages(&totals.nutrition, &goal.targets),
    })
}

/// Progress for each day of a trend
pub fn track(days: &[DailyTotal], goal: Option<&GoalRecord>) -> Vec<TrendPoint> {
    days.iter()
        .map(|day| TrendPoint {
            total: day.clone(),
            progress: goal.map(|g| percentages(&day.nutrition, &g.targets)),
        })
        .collect()
}

/// `max(0, target - actual)` per field
pub fn remaining(so_far: &Nutrition, goal: &GoalRecord) -> RemainingBudget {
    let left = |target: f64, actual: f64| (sanitize(target) - sanitize(actual)).max(0.0);
    let t = &goal.targets;
    RemainingBudget {
        calories: left(t.calories, so_far.calories),
        protein: left(t.protein, so_far.protein),
        carbs: left(t.carbs, so_far.carbs),
        fat: left(t.fat, so_far.fat),
    }
}
