//! Meal model
//!
//! Storage for logged meals. Rows are read loosely as [`RawMeal`] and pass
//! through the engine's boundary validation before anyone else sees them.

use chrono::NaiveDate;
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::validate::DATE_FORMAT;
use crate::nutrition::{
    normalize_meals, validate_nutrition, MealRecord, MealType, Nutrition, NutritionError, RawMeal,
    RawNumber,
};

/// Meals as stored; the same shape the engine works on
pub type Meal = MealRecord;

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub nutrition: Nutrition,
}

/// Data for updating a meal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn validate_name(name: &str) -> DbResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(NutritionError::MissingField("name").into());
    }
    Ok(name.to_string())
}

/// Filters for listing a user's meals. Date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MealFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub meal_type: Option<MealType>,
}

/// Macro columns keep whatever storage class they were written with.
fn number_at(row: &Row, col: &str) -> rusqlite::Result<Option<RawNumber>> {
    Ok(match row.get_ref(col)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(RawNumber::Number(i as f64)),
        ValueRef::Real(f) => Some(RawNumber::Number(f)),
        ValueRef::Text(bytes) => Some(RawNumber::Text(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Blob(_) => Some(RawNumber::Text("<blob>".to_string())),
    })
}

fn raw_from_row(row: &Row) -> rusqlite::Result<RawMeal> {
    Ok(RawMeal {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        date: row.get("date")?,
        meal_type: row.get("meal_type")?,
        calories: number_at(row, "calories")?,
        protein: number_at(row, "protein")?,
        carbs: number_at(row, "carbs")?,
        fat: number_at(row, "fat")?,
        created_at: row.get("created_at")?,
    })
}

impl MealRecord {
    /// Log a new meal
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        let name = validate_name(&data.name)?;
        let n = validate_nutrition(&data.nutrition)?;

        conn.execute(
            r#"
            INSERT INTO meals (user_id, name, description, date, meal_type, calories, protein, carbs, fat)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.user_id,
                name,
                data.description,
                format_date(data.date),
                data.meal_type.as_str(),
                n.calories,
                n.protein,
                n.carbs,
                n.fat,
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, user_id = data.user_id, "logged meal");
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "meal", id })
    }

    /// Get a meal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        let raw = match stmt.query_row([id], raw_from_row) {
            Ok(raw) => raw,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(MealRecord::try_from(raw)?))
    }

    /// Meals for a user, optionally bounded by an inclusive date range,
    /// oldest first. Rows that fail validation are skipped.
    pub fn list_for_user(
        conn: &Connection,
        user_id: i64,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> DbResult<Vec<Self>> {
        let filter = MealFilter { start_date, end_date, meal_type: None };
        Self::list_filtered(conn, user_id, &filter)
    }

    /// Meals for a user matching `filter`, oldest first. Rows that cannot be
    /// read or fail validation are skipped.
    pub fn list_filtered(
        conn: &Connection,
        user_id: i64,
        filter: &MealFilter,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM meals WHERE user_id = ?1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(user_id)];

        if let Some(start) = filter.start_date {
            params_vec.push(Box::new(format_date(start)));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = filter.end_date {
            params_vec.push(Box::new(format_date(end)));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        if let Some(meal_type) = filter.meal_type {
            params_vec.push(Box::new(meal_type.as_str()));
            sql.push_str(&format!(" AND meal_type = ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date ASC, id ASC");

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let mut raw = Vec::new();
        let mut unreadable = 0usize;
        for row in stmt.query_map(params_refs.as_slice(), raw_from_row)? {
            match row {
                Ok(r) => raw.push(r),
                Err(e) => {
                    unreadable += 1;
                    tracing::warn!(user_id, error = %e, "skipping unreadable meal row");
                }
            }
        }

        let (meals, rejected) = normalize_meals(raw);
        if !rejected.is_empty() || unreadable > 0 {
            tracing::warn!(
                user_id,
                skipped = rejected.len() + unreadable,
                "meal rows failed validation"
            );
        }
        Ok(meals)
    }

    /// Update a meal
    pub fn update(conn: &Connection, id: i64, data: &MealUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($col:expr, $val:expr) => {
                updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                params_vec.push(Box::new($val));
            };
        }

        if let Some(ref name) = data.name {
            add_update!("name", validate_name(name)?);
        }
        if let Some(ref description) = data.description {
            add_update!("description", description.clone());
        }
        if let Some(date) = data.date {
            add_update!("date", format_date(date));
        }
        if let Some(meal_type) = data.meal_type {
            add_update!("meal_type", meal_type.as_str());
        }

        let macros = [
            ("calories", data.calories),
            ("protein", data.protein),
            ("carbs", data.carbs),
            ("fat", data.fat),
        ];
        for (col, value) in macros {
            if let Some(v) = value {
                if !(v.is_finite() && v >= 0.0) {
                    return Err(NutritionError::InvalidValue { field: col, value: v }.into());
                }
                add_update!(col, v);
            }
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE meals SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a meal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
