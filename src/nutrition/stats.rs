//! Meal statistics
//!
//! Balance scoring, per-collection summaries and period summaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::demo::is_weekend;
use super::types::{DailyTotal, MealRecord, MealType, Nutrition};

pub const TOP_MEALS: usize = 3;

const EVEN_SHARE: f64 = 1.0 / 3.0;

/// Sum of `|share - 1/3|` over protein, carbs and fat grams.
///
/// Lower is more balanced. Shares are by mass, not by calories. `None` when
/// the meal has no macro mass at all.
pub fn balance_score(n: &Nutrition) -> Option<f64> {
    let total = n.macro_mass();
    if !(total > 0.0) {
        return None;
    }
    Some(
        [n.protein, n.carbs, n.fat]
            .iter()
            .map(|grams| (grams / total - EVEN_SHARE).abs())
            .sum(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMeal {
    #[serde(flatten)]
    pub meal: MealRecord,
    pub balance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealStats {
    pub total_meals: usize,
    pub average_calories: i64,
    pub top_protein_meals: Vec<MealRecord>,
    pub most_balanced_meals: Vec<ScoredMeal>,
}

/// Count, rounded average calories, top protein and most balanced meals
pub fn meal_stats(meals: &[MealRecord]) -> MealStats {
    let average_calories = if meals.is_empty() {
        0
    } else {
        let sum: f64 = meals.iter().map(|m| m.nutrition.calories).sum();
        (sum / meals.len() as f64).round() as i64
    };

    // sort_by is stable, so ties keep input order
    let mut by_protein: Vec<&MealRecord> = meals.iter().collect();
    by_protein.sort_by(|a, b| b.nutrition.protein.total_cmp(&a.nutrition.protein));

    let mut scored: Vec<ScoredMeal> = meals
        .iter()
        .filter_map(|m| {
            balance_score(&m.nutrition).map(|balance_score| ScoredMeal {
                meal: m.clone(),
                balance_score,
            })
        })
        .collect();
    scored.sort_by(|a, b| a.balance_score.total_cmp(&b.balance_score));
    scored.truncate(TOP_MEALS);

    MealStats {
        total_meals: meals.len(),
        average_calories,
        top_protein_meals: by_protein.into_iter().take(TOP_MEALS).cloned().collect(),
        most_balanced_meals: scored,
    }
}

/// Averages over a run of days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub days: usize,
    pub average_daily: Nutrition,
    pub weekday_average_calories: f64,
    pub weekend_average_calories: f64,
    /// Integer percent of total calories per meal type
    pub meal_type_share: BTreeMap<MealType, u8>,
}

fn average_calories(days: &[&DailyTotal]) -> f64 {
    if days.is_empty() {
        return 0.0;
    }
    let sum: f64 = days.iter().map(|d| d.nutrition.calories).sum();
    (sum / days.len() as f64).round()
}

pub fn period_summary(days: &[DailyTotal]) -> PeriodSummary {
    let average_daily = if days.is_empty() {
        Nutrition::zero()
    } else {
        let total: Nutrition = days.iter().map(|d| &d.nutrition).sum();
        total.scale(1.0 / days.len() as f64).rounded()
    };

    let (weekend, weekday): (Vec<&DailyTotal>, Vec<&DailyTotal>) =
        days.iter().partition(|d| is_weekend(d.date));

    let mut per_type: BTreeMap<MealType, f64> = BTreeMap::new();
    for day in days {
        for (meal_type, kcal) in &day.meal_types {
            *per_type.entry(*meal_type).or_insert(0.0) += kcal;
        }
    }
    let all_calories: f64 = per_type.values().sum();
    let meal_type_share = per_type
        .into_iter()
        .map(|(t, kcal)| {
            let share = if all_calories > 0.0 {
                (100.0 * kcal / all_calories).round() as u8
            } else {
                0
            };
            (t, share)
        })
        .collect();

    PeriodSummary {
        days: days.len(),
        average_daily,
        weekday_average_calories: average_calories(&weekday),
        weekend_average_calories: average_calories(&weekend),
        meal_type_share,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn meal(id: i64, n: Nutrition) -> MealRecord {
        MealRecord {
            id,
            user_id: 1,
            name: format!("meal {}", id),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            meal_type: MealType::Dinner,
            nutrition: n,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_balance_score() {
        let even = balance_score(&Nutrition::new(0.0, 20.0, 20.0, 20.0)).unwrap();
        assert!(even.abs() < 1e-12);

        // all protein: |1 - 1/3| + 1/3 + 1/3
        let skewed = balance_score(&Nutrition::new(0.0, 30.0, 0.0, 0.0)).unwrap();
        assert!((skewed - 4.0 / 3.0).abs() < 1e-12);

        assert_eq!(balance_score(&Nutrition::new(100.0, 0.0, 0.0, 0.0)), None);
    }

    #[test]
    fn test_empty_collection() {
        let stats = meal_stats(&[]);
        assert_eq!(stats.total_meals, 0);
        assert_eq!(stats.average_calories, 0);
        assert!(stats.top_protein_meals.is_empty());
        assert!(stats.most_balanced_meals.is_empty());
    }

    #[test]
    fn test_meal_stats() {
        let meals = vec![
            meal(1, Nutrition::new(500.0, 40.0, 40.0, 40.0)),
            meal(2, Nutrition::new(301.0, 50.0, 10.0, 5.0)),
            meal(3, Nutrition::new(200.0, 10.0, 60.0, 2.0)),
            meal(4, Nutrition::new(100.0, 50.0, 0.0, 0.0)),
            meal(5, Nutrition::new(50.0, 0.0, 0.0, 0.0)),
        ];
        let stats = meal_stats(&meals);

        assert_eq!(stats.total_meals, 5);
        assert_eq!(stats.average_calories, 230);

        let top: Vec<i64> = stats.top_protein_meals.iter().map(|m| m.id).collect();
        assert_eq!(top, vec![2, 4, 1]);

        // meal 5 has no macro mass and is not scored
        let balanced: Vec<i64> = stats.most_balanced_meals.iter().map(|s| s.meal.id).collect();
        assert_eq!(balanced[0], 1);
        assert_eq!(balanced.len(), 3);
        assert!(!balanced.contains(&5));
    }

    #[test]
    fn test_period_summary() {
        let mut saturday = DailyTotal::empty(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        saturday.nutrition = Nutrition::new(3000.0, 100.0, 300.0, 100.0);
        saturday.meal_types.insert(MealType::Dinner, 3000.0);

        let mut monday = DailyTotal::empty(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        monday.nutrition = Nutrition::new(1000.0, 80.0, 100.0, 30.0);
        monday.meal_types.insert(MealType::Lunch, 1000.0);

        let summary = period_summary(&[saturday, monday]);
        assert_eq!(summary.days, 2);
        assert_eq!(summary.average_daily.calories, 2000.0);
        assert_eq!(summary.weekend_average_calories, 3000.0);
        assert_eq!(summary.weekday_average_calories, 1000.0);
        assert_eq!(summary.meal_type_share[&MealType::Dinner], 75);
        assert_eq!(summary.meal_type_share[&MealType::Lunch], 25);
    }

    #[test]
    fn test_period_summary_empty() {
        let summary = period_summary(&[]);
        assert_eq!(summary.days, 0);
        assert_eq!(summary.average_daily, Nutrition::zero());
        assert_eq!(summary.weekday_average_calories, 0.0);
        assert!(summary.meal_type_share.is_empty());
    }
}
