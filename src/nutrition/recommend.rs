//! Meal recommendations
//!
//! Ranks previously logged meals that fit inside today's remaining budget.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::progress::{percent_of, RemainingBudget};
use super::types::{MealRecord, Nutrition};

pub const MAX_RECOMMENDATIONS: usize = 5;

/// Progress percentage below which a macro needs attention
pub const PRIORITY_THRESHOLD: u8 = 60;

/// A macronutrient that can be flagged as a priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacroNutrient {
    Protein,
    Carbs,
    Fat,
}

/// A ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub meal: MealRecord,
    /// candidate protein / remaining protein
    pub protein_utilization: f64,
    /// candidate calories / remaining calories
    pub calorie_utilization: f64,
}

/// Upper bounds for [`find_meals_by_nutrition`]. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionCriteria {
    pub max_calories: Option<f64>,
    pub max_protein: Option<f64>,
    pub max_carbs: Option<f64>,
    pub max_fat: Option<f64>,
}

fn utilization(value: f64, budget: f64) -> f64 {
    if budget > 0.0 {
        value / budget
    } else {
        0.0
    }
}

/// First occurrence of each meal name, in input order
pub fn unique_by_name(pool: &[MealRecord]) -> Vec<&MealRecord> {
    let mut seen = HashSet::new();
    pool.iter().filter(|m| seen.insert(m.name.as_str())).collect()
}

/// Descending by protein utilization, then by calorie utilization.
pub fn compare_candidates(remaining: &RemainingBudget, a: &MealRecord, b: &MealRecord) -> Ordering {
    let protein = |m: &MealRecord| utilization(m.nutrition.protein, remaining.protein);
    let calories = |m: &MealRecord| utilization(m.nutrition.calories, remaining.calories);
    protein(b)
        .total_cmp(&protein(a))
        .then_with(|| calories(b).total_cmp(&calories(a)))
}

/// Top candidates whose every value fits in `remaining`.
///
/// The pool is de-duplicated by name and left untouched.
pub fn recommend(remaining: &RemainingBudget, pool: &[MealRecord]) -> Vec<Recommendation> {
    let mut eligible: Vec<&MealRecord> = unique_by_name(pool)
        .into_iter()
        .filter(|m| remaining.admits(&m.nutrition))
        .collect();

    eligible.sort_by(|a, b| compare_candidates(remaining, a, b));

    tracing::debug!(
        pool = pool.len(),
        eligible = eligible.len(),
        "ranked recommendation candidates"
    );

    eligible
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|m| Recommendation {
            meal: m.clone(),
            protein_utilization: utilization(m.nutrition.protein, remaining.protein),
            calorie_utilization: utilization(m.nutrition.calories, remaining.calories),
        })
        .collect()
}

/// Macros to focus on for the rest of the day.
///
/// Every macro under [`PRIORITY_THRESHOLD`] percent of its target, in
/// protein, carbs, fat order. When none is that low, the single furthest
/// behind, with ties going to the earlier macro. Macros without a usable
/// target are ignored.
pub fn nutrient_priorities(actual: &Nutrition, targets: &Nutrition) -> Vec<MacroNutrient> {
    let progress: Vec<(MacroNutrient, u8)> = [
        (MacroNutrient::Protein, actual.protein, targets.protein),
        (MacroNutrient::Carbs, actual.carbs, targets.carbs),
        (MacroNutrient::Fat, actual.fat, targets.fat),
    ]
    .into_iter()
    .filter(|(_, _, target)| target.is_finite() && *target > 0.0)
    .map(|(nutrient, value, target)| (nutrient, percent_of(value, target)))
    .collect();

    let lagging: Vec<MacroNutrient> = progress
        .iter()
        .filter(|(_, pct)| *pct < PRIORITY_THRESHOLD)
        .map(|(nutrient, _)| *nutrient)
        .collect();
    if !lagging.is_empty() {
        return lagging;
    }

    // min_by_key keeps the first of equal minima
    progress
        .iter()
        .min_by_key(|(_, pct)| *pct)
        .map(|(nutrient, _)| vec![*nutrient])
        .unwrap_or_default()
}

/// Meals satisfying every given upper bound
pub fn find_meals_by_nutrition<'a>(
    meals: &'a [MealRecord],
    criteria: &NutritionCriteria,
) -> Vec<&'a MealRecord> {
    let within = |value: f64, limit: Option<f64>| limit.map_or(true, |l| value <= l);
    meals
        .iter()
        .filter(|m| {
            within(m.nutrition.calories, criteria.max_calories)
                && within(m.nutrition.protein, criteria.max_protein)
                && within(m.nutrition.carbs, criteria.max_carbs)
                && within(m.nutrition.fat, criteria.max_fat)
        })
        .collect()
}
