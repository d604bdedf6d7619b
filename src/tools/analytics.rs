//! Analytics MCP Tools
//!
//! Progress, recommendations, trends and statistics over a user's meals.

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Goal, Meal};
use crate::nutrition::{
    build_trend, daily_totals, find_meals_by_nutrition, meal_stats, nutrient_priorities,
    percentages, period_summary, recommend, remaining, totals_for_date, DailyTotal, DateRange,
    MacroNutrient, MealStats, NutritionCriteria, Percentages, PeriodSummary, Recommendation,
    RemainingBudget, Trend,
};

use super::parse_optional_date;

const NO_ACTIVE_GOAL: &str = "No active goal found";

/// Longest range get_trends will cover
pub const MAX_TREND_DAYS: usize = 366;

/// Response for get_progress
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub date: NaiveDate,
    pub totals: DailyTotal,
    pub goal: Option<Goal>,
    pub percentages: Option<Percentages>,
    pub remaining: Option<RemainingBudget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for get_recommendations
#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub date: NaiveDate,
    pub remaining: Option<RemainingBudget>,
    /// Macros furthest behind target, most urgent first
    pub priorities: Vec<MacroNutrient>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for get_period_summary
#[derive(Debug, Serialize)]
pub struct PeriodSummaryResponse {
    pub range: DateRange,
    #[serde(flatten)]
    pub summary: PeriodSummary,
}

/// Response for find_meals
#[derive(Debug, Serialize)]
pub struct FindMealsResponse {
    pub meals: Vec<Meal>,
    pub total: usize,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Meals and active goal for a user in one connection checkout
fn load(
    db: &Database,
    user_id: i64,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(Vec<Meal>, Option<Goal>), String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = Meal::list_for_user(&conn, user_id, start, end)
        .map_err(|e| format!("Failed to load meals: {}", e))?;
    let goal = Goal::get_active(&conn, user_id)
        .map_err(|e| format!("Failed to load active goal: {}", e))?;
    Ok((meals, goal))
}

/// A single day's totals against the active goal. Defaults to today.
pub fn get_progress(db: &Database, user_id: i64, date: Option<&str>) -> Result<ProgressResponse, String> {
    let date = parse_optional_date(date)?.unwrap_or_else(today);
    let (meals, goal) = load(db, user_id, Some(date), Some(date))?;
    let totals = totals_for_date(&meals, date);

    let Some(goal) = goal else {
        return Ok(ProgressResponse {
            date,
            totals,
            goal: None,
            percentages: None,
            remaining: None,
            message: Some(NO_ACTIVE_GOAL.to_string()),
        });
    };

    Ok(ProgressResponse {
        date,
        percentages: Some(percentages(&totals.nutrition, &goal.targets)),
        remaining: Some(remaining(&totals.nutrition, &goal)),
        totals,
        goal: Some(goal),
        message: None,
    })
}

/// Up to five previously logged meals that fit what is left of the day's goal
pub fn get_recommendations(
    db: &Database,
    user_id: i64,
    date: Option<&str>,
) -> Result<RecommendationsResponse, String> {
    let date = parse_optional_date(date)?.unwrap_or_else(today);
    let (history, goal) = load(db, user_id, None, None)?;

    let Some(goal) = goal else {
        return Ok(RecommendationsResponse {
            date,
            remaining: None,
            priorities: Vec::new(),
            recommendations: Vec::new(),
            message: Some(NO_ACTIVE_GOAL.to_string()),
        });
    };

    let so_far = totals_for_date(&history, date);
    let budget = remaining(&so_far.nutrition, &goal);
    let recommendations = recommend(&budget, &history);

    Ok(RecommendationsResponse {
        date,
        message: recommendations
            .is_empty()
            .then(|| "No logged meals fit the remaining budget".to_string()),
        remaining: Some(budget),
        priorities: nutrient_priorities(&so_far.nutrition, &goal.targets),
        recommendations,
    })
}

/// Per-day progress over a range, synthesized when nothing was logged.
/// A missing bound means the 30 days ending today. Ranges longer than
/// [`MAX_TREND_DAYS`] are refused.
pub fn get_trends<R: Rng>(
    db: &Database,
    user_id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
    rng: &mut R,
) -> Result<Trend, String> {
    let range = DateRange::resolve(parse_optional_date(start_date)?, parse_optional_date(end_date)?, today());
    if range.len() > MAX_TREND_DAYS {
        return Err(format!(
            "Date range too long: {} days (max {})",
            range.len(),
            MAX_TREND_DAYS
        ));
    }
    let (meals, goal) = load(db, user_id, Some(range.start), Some(range.end))?;
    Ok(build_trend(&meals, goal.as_ref(), &range, rng))
}

/// Count, average calories, top protein and most balanced meals
pub fn get_meal_stats(
    db: &Database,
    user_id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<MealStats, String> {
    let start = parse_optional_date(start_date)?;
    let end = parse_optional_date(end_date)?;
    let (meals, _) = load(db, user_id, start, end)?;
    Ok(meal_stats(&meals))
}

/// Averages over the logged days in a range
pub fn get_period_summary(
    db: &Database,
    user_id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<PeriodSummaryResponse, String> {
    let range = DateRange::resolve(parse_optional_date(start_date)?, parse_optional_date(end_date)?, today());
    let (meals, _) = load(db, user_id, Some(range.start), Some(range.end))?;

    Ok(PeriodSummaryResponse {
        range,
        summary: period_summary(&daily_totals(&meals)),
    })
}

/// Logged meals within the given upper bounds
pub fn find_meals(db: &Database, user_id: i64, criteria: NutritionCriteria) -> Result<FindMealsResponse, String> {
    let (meals, _) = load(db, user_id, None, None)?;
    let found: Vec<Meal> = find_meals_by_nutrition(&meals, &criteria).into_iter().cloned().collect();

    Ok(FindMealsResponse {
        total: found.len(),
        meals: found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::models::{GoalCreate, MealCreate};
    use crate::nutrition::{DataSource, MealType, Nutrition};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn log(db: &Database, name: &str, date: &str, n: Nutrition) {
        db.with_conn(|conn| {
            Meal::create(
                conn,
                &MealCreate {
                    user_id: 1,
                    name: name.to_string(),
                    description: None,
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                    meal_type: MealType::Lunch,
                    nutrition: n,
                },
            )
        })
        .unwrap();
    }

    fn set_goal(db: &Database, targets: Nutrition) {
        db.with_conn(|conn| {
            Goal::create(
                conn,
                &GoalCreate {
                    user_id: 1,
                    name: None,
                    targets,
                    start_date: None,
                    end_date: None,
                    is_active: true,
                },
            )
        })
        .unwrap();
    }

    #[test]
    fn test_progress_without_goal() {
        let db = setup();
        log(&db, "toast", "2025-05-01", Nutrition::new(200.0, 6.0, 30.0, 4.0));

        let resp = get_progress(&db, 1, Some("2025-05-01")).unwrap();
        assert_eq!(resp.totals.nutrition.calories, 200.0);
        assert!(resp.percentages.is_none());
        assert_eq!(resp.message.as_deref(), Some(NO_ACTIVE_GOAL));
    }

    #[test]
    fn test_progress_with_goal() {
        let db = setup();
        set_goal(&db, Nutrition::new(2000.0, 100.0, 200.0, 50.0));
        log(&db, "bowl", "2025-05-01", Nutrition::new(500.0, 50.0, 50.0, 10.0));
        log(&db, "other day", "2025-05-02", Nutrition::new(900.0, 10.0, 10.0, 10.0));

        let resp = get_progress(&db, 1, Some("2025-05-01")).unwrap();
        let pct = resp.percentages.unwrap();
        assert_eq!(pct.calories, 25);
        assert_eq!(pct.protein, 50);
        assert_eq!(resp.remaining.unwrap().calories, 1500.0);
    }

    #[test]
    fn test_recommendations_use_history() {
        let db = setup();
        set_goal(&db, Nutrition::new(2000.0, 120.0, 250.0, 70.0));
        log(&db, "big lunch", "2025-05-01", Nutrition::new(1500.0, 60.0, 150.0, 50.0));
        log(&db, "chicken salad", "2025-04-20", Nutrition::new(400.0, 40.0, 20.0, 12.0));
        log(&db, "pasta", "2025-04-21", Nutrition::new(800.0, 25.0, 120.0, 20.0));

        let resp = get_recommendations(&db, 1, Some("2025-05-01")).unwrap();
        let names: Vec<&str> = resp.recommendations.iter().map(|r| r.meal.name.as_str()).collect();
        assert_eq!(names, vec!["chicken salad"]);
        assert_eq!(resp.remaining.unwrap().protein, 60.0);
        assert_eq!(resp.priorities, vec![MacroNutrient::Protein]);
    }

    #[test]
    fn test_recommendations_without_goal() {
        let db = setup();
        let resp = get_recommendations(&db, 1, None).unwrap();
        assert!(resp.recommendations.is_empty());
        assert!(resp.remaining.is_none());
        assert!(resp.priorities.is_empty());
    }

    #[test]
    fn test_empty_day_prioritizes_every_macro() {
        let db = setup();
        set_goal(&db, Nutrition::new(2000.0, 120.0, 250.0, 70.0));
        log(&db, "oats", "2025-04-30", Nutrition::new(300.0, 10.0, 50.0, 6.0));

        let resp = get_recommendations(&db, 1, Some("2025-05-01")).unwrap();
        assert_eq!(
            resp.priorities,
            vec![MacroNutrient::Protein, MacroNutrient::Carbs, MacroNutrient::Fat]
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["priorities"], serde_json::json!(["protein", "carbs", "fat"]));
    }

    #[test]
    fn test_trends_fall_back_to_synthetic() {
        let db = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let trend = get_trends(&db, 1, Some("2025-05-01"), Some("2025-05-07"), &mut rng).unwrap();
        assert_eq!(trend.source, DataSource::Synthetic);
        assert_eq!(trend.points.len(), 7);

        log(&db, "soup", "2025-05-03", Nutrition::new(300.0, 10.0, 40.0, 8.0));
        let trend = get_trends(&db, 1, Some("2025-05-01"), Some("2025-05-07"), &mut rng).unwrap();
        assert_eq!(trend.source, DataSource::Recorded);
        assert_eq!(trend.points.len(), 1);
    }

    #[test]
    fn test_trends_refuse_huge_ranges() {
        let db = setup();
        let mut rng = StdRng::seed_from_u64(3);
        let err = get_trends(&db, 1, Some("0001-01-01"), Some("9999-12-31"), &mut rng).unwrap_err();
        assert!(err.contains("too long"), "{}", err);

        let year = get_trends(&db, 1, Some("2024-01-01"), Some("2024-12-31"), &mut rng).unwrap();
        assert_eq!(year.points.len(), MAX_TREND_DAYS);
        assert!(get_trends(&db, 1, Some("2024-01-01"), Some("2025-01-01"), &mut rng).is_err());
    }

    #[test]
    fn test_bad_date_is_reported() {
        let db = setup();
        assert!(get_progress(&db, 1, Some("May 1st")).is_err());
    }

    #[test]
    fn test_find_and_stats() {
        let db = setup();
        log(&db, "a", "2025-05-01", Nutrition::new(200.0, 10.0, 20.0, 5.0));
        log(&db, "b", "2025-05-02", Nutrition::new(700.0, 40.0, 60.0, 25.0));

        let found = find_meals(
            &db,
            1,
            NutritionCriteria { max_calories: Some(500.0), ..Default::default() },
        )
        .unwrap();
        assert_eq!(found.total, 1);

        let stats = get_meal_stats(&db, 1, None, None).unwrap();
        assert_eq!(stats.total_meals, 2);
        assert_eq!(stats.average_calories, 450);

        let summary = get_period_summary(&db, 1, Some("2025-05-01"), Some("2025-05-02")).unwrap();
        assert_eq!(summary.summary.days, 2);
    }
}
