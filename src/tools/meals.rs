//! Meal MCP Tools
//!
//! Tools for logging and managing meals.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Meal, MealCreate, MealFilter, MealUpdate};
use crate::nutrition::MealType;

use super::parse_optional_date;

/// Response for log_meal
#[derive(Debug, Serialize)]
pub struct LogMealResponse {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub meal_type: String,
    pub calories: f64,
    pub created_at: String,
}

/// Response for list_meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub meals: Vec<Meal>,
    pub total: usize,
}

/// Response for delete_meal
#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Log a meal
pub fn log_meal(db: &Database, data: MealCreate) -> Result<LogMealResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let meal = Meal::create(&conn, &data).map_err(|e| format!("Failed to log meal: {}", e))?;

    Ok(LogMealResponse {
        id: meal.id,
        name: meal.name,
        date: meal.date.to_string(),
        meal_type: meal.meal_type.as_str().to_string(),
        calories: meal.nutrition.calories,
        created_at: meal.created_at,
    })
}

/// Get a single meal
pub fn get_meal(db: &Database, id: i64) -> Result<Option<Meal>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::get_by_id(&conn, id).map_err(|e| format!("Failed to get meal: {}", e))
}

/// List a user's meals, optionally within an inclusive date range and of
/// one meal type
pub fn list_meals(
    db: &Database,
    user_id: i64,
    start_date: Option<&str>,
    end_date: Option<&str>,
    meal_type: Option<MealType>,
) -> Result<ListMealsResponse, String> {
    let filter = MealFilter {
        start_date: parse_optional_date(start_date)?,
        end_date: parse_optional_date(end_date)?,
        meal_type,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = Meal::list_filtered(&conn, user_id, &filter)
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    Ok(ListMealsResponse {
        total: meals.len(),
        meals,
    })
}

/// Update a meal
pub fn update_meal(db: &Database, id: i64, data: MealUpdate) -> Result<Option<Meal>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::update(&conn, id, &data).map_err(|e| format!("Failed to update meal: {}", e))
}

/// Delete a meal
pub fn delete_meal(db: &Database, id: i64) -> Result<DeleteMealResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Meal::delete(&conn, id).map_err(|e| format!("Failed to delete meal: {}", e))?;
    if !deleted {
        return Err(format!("Meal not found: {}", id));
    }

    Ok(DeleteMealResponse {
        success: true,
        deleted_id: id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::nutrition::Nutrition;
    use chrono::NaiveDate;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn meal(name: &str, date: &str, meal_type: MealType) -> MealCreate {
        MealCreate {
            user_id: 1,
            name: name.to_string(),
            description: None,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            meal_type,
            nutrition: Nutrition::new(300.0, 15.0, 40.0, 8.0),
        }
    }

    #[test]
    fn test_list_meals_by_type_and_range() {
        let db = setup();
        log_meal(&db, meal("porridge", "2025-06-01", MealType::Breakfast)).unwrap();
        log_meal(&db, meal("apple", "2025-06-01", MealType::Snack)).unwrap();
        log_meal(&db, meal("bagel", "2025-06-03", MealType::Breakfast)).unwrap();

        let all = list_meals(&db, 1, None, None, None).unwrap();
        assert_eq!(all.total, 3);

        let breakfasts = list_meals(&db, 1, None, None, Some(MealType::Breakfast)).unwrap();
        let names: Vec<&str> = breakfasts.meals.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["porridge", "bagel"]);

        let later = list_meals(&db, 1, Some("2025-06-02"), None, Some(MealType::Breakfast)).unwrap();
        assert_eq!(later.total, 1);
        assert_eq!(later.meals[0].name, "bagel");

        let dinners = list_meals(&db, 1, None, None, Some(MealType::Dinner)).unwrap();
        assert_eq!(dinners.total, 0);
    }

    #[test]
    fn test_delete_missing_meal_is_an_error() {
        let db = setup();
        let logged = log_meal(&db, meal("toast", "2025-06-01", MealType::Breakfast)).unwrap();
        assert!(delete_meal(&db, logged.id).unwrap().success);
        assert!(delete_meal(&db, logged.id).is_err());
    }
}
