//! Daily aggregation
//!
//! Groups meals by calendar date and sums their nutrition.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::types::{DailyTotal, MealRecord, Nutrition};

/// Sum nutrition over a set of meals
pub fn sum_nutrition(meals: &[MealRecord]) -> Nutrition {
    meals.iter().map(|m| &m.nutrition).sum()
}

/// One [`DailyTotal`] per distinct date in `meals`, ordered by date.
///
/// Date filtering is the caller's job; every meal given here is counted.
pub fn daily_totals(meals: &[MealRecord]) -> Vec<DailyTotal> {
    let mut by_date: BTreeMap<NaiveDate, DailyTotal> = BTreeMap::new();

    for meal in meals {
        let day = by_date
            .entry(meal.date)
            .or_insert_with(|| DailyTotal::empty(meal.date));
        day.nutrition = day.nutrition + meal.nutrition;
        *day.meal_types.entry(meal.meal_type).or_insert(0.0) += meal.nutrition.calories;
    }

    tracing::debug!(meals = meals.len(), days = by_date.len(), "aggregated daily totals");

    by_date.into_values().collect()
}

/// Totals for a single date. Dates with no meals yield an empty total.
pub fn totals_for_date(meals: &[MealRecord], date: NaiveDate) -> DailyTotal {
    let todays: Vec<MealRecord> = meals.iter().filter(|m| m.date == date).cloned().collect();
    daily_totals(&todays)
        .into_iter()
        .next()
        .unwrap_or_else(|| DailyTotal::empty(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::types::MealType;

    fn meal(id: i64, date: &str, meal_type: MealType, n: Nutrition) -> MealRecord {
        MealRecord {
            id,
            user_id: 1,
            name: format!("meal {}", id),
            description: None,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            meal_type,
            nutrition: n,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(daily_totals(&[]).is_empty());
        assert_eq!(sum_nutrition(&[]), Nutrition::zero());
    }

    #[test]
    fn test_groups_by_date_and_sums() {
        let meals = vec![
            meal(1, "2025-01-02", MealType::Breakfast, Nutrition::new(300.0, 20.0, 30.0, 10.0)),
            meal(2, "2025-01-01", MealType::Lunch, Nutrition::new(600.0, 40.0, 70.0, 20.0)),
            meal(3, "2025-01-02", MealType::Dinner, Nutrition::new(700.0, 45.0, 60.0, 25.0)),
            meal(4, "2025-01-02", MealType::Dinner, Nutrition::new(150.0, 5.0, 20.0, 5.0)),
        ];

        let days = daily_totals(&meals);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());

        let second = &days[1];
        assert_eq!(second.nutrition, Nutrition::new(1150.0, 70.0, 110.0, 40.0));
        assert_eq!(second.meal_types[&MealType::Breakfast], 300.0);
        assert_eq!(second.meal_types[&MealType::Dinner], 850.0);
        assert!(!second.meal_types.contains_key(&MealType::Lunch));
        assert_eq!(second.breakdown_total(), second.nutrition.calories);
    }

    #[test]
    fn test_zero_macros_contribute_zero() {
        let meals = vec![
            meal(1, "2025-01-01", MealType::Snack, Nutrition::new(90.0, 0.0, 0.0, 0.0)),
            meal(2, "2025-01-01", MealType::Snack, Nutrition::zero()),
        ];
        let days = daily_totals(&meals);
        assert_eq!(days[0].nutrition, Nutrition::new(90.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_totals_for_missing_date() {
        let date = NaiveDate::from_ymd_opt(2025, 5, 5).unwrap();
        let day = totals_for_date(&[], date);
        assert_eq!(day.date, date);
        assert_eq!(day.nutrition, Nutrition::zero());
    }
}
