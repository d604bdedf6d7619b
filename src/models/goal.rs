//! Goal model
//!
//! Daily calorie and macro targets. A user has at most one active goal;
//! activating one deactivates the rest in the same transaction.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use crate::nutrition::validate::DATE_FORMAT;
use crate::nutrition::{parse_date, validate_nutrition, GoalRecord, Nutrition, NutritionError};

pub type Goal = GoalRecord;

/// Data for creating a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalCreate {
    pub user_id: i64,
    pub name: Option<String>,
    pub targets: Nutrition,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// New goals are active unless told otherwise
    pub is_active: bool,
}

/// Data for updating a goal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub is_active: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn date_column(row: &Row, idx: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|s| {
        parse_date(&s).map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

impl GoalRecord {
    /// Create from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            targets: Nutrition {
                calories: row.get("calories")?,
                protein: row.get("protein")?,
                carbs: row.get("carbs")?,
                fat: row.get("fat")?,
            },
            is_active: row.get("is_active")?,
            start_date: date_column(row, "start_date")?,
            end_date: date_column(row, "end_date")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Create a goal. An active goal deactivates the user's other goals.
    pub fn create(conn: &Connection, data: &GoalCreate) -> DbResult<Self> {
        let targets = validate_nutrition(&data.targets)?;

        let tx = conn.unchecked_transaction()?;
        if data.is_active {
            tx.execute(
                "UPDATE goals SET is_active = 0, updated_at = datetime('now') WHERE user_id = ?1 AND is_active = 1",
                [data.user_id],
            )?;
        }
        tx.execute(
            r#"
            INSERT INTO goals (user_id, name, calories, protein, carbs, fat, is_active, start_date, end_date)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.user_id,
                data.name,
                targets.calories,
                targets.protein,
                targets.carbs,
                targets.fat,
                data.is_active,
                format_date(data.start_date),
                format_date(data.end_date),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(id, user_id = data.user_id, active = data.is_active, "created goal");
        Self::get_by_id(conn, id)?.ok_or(DbError::NotFound { entity: "goal", id })
    }

    /// Get a goal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row("SELECT * FROM goals WHERE id = ?1", [id], Self::from_row)
            .optional()?;
        Ok(goal)
    }

    /// All goals for a user, newest first
    pub fn list_for_user(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM goals WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let goals = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    /// The user's active goal; the most recently created one if several are
    /// somehow flagged.
    pub fn get_active(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let goal = conn
            .query_row(
                "SELECT * FROM goals WHERE user_id = ?1 AND is_active = 1
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                [user_id],
                Self::from_row,
            )
            .optional()?;
        Ok(goal)
    }

    /// Make a goal the user's only active goal
    pub fn activate(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let Some(goal) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE goals SET is_active = 0, updated_at = datetime('now') WHERE user_id = ?1 AND id != ?2 AND is_active = 1",
            params![goal.user_id, id],
        )?;
        tx.execute(
            "UPDATE goals SET is_active = 1, updated_at = datetime('now') WHERE id = ?1",
            [id],
        )?;
        tx.commit()?;

        tracing::info!(id, user_id = goal.user_id, "activated goal");
        Self::get_by_id(conn, id)
    }

    /// Update a goal. Setting `is_active` to true goes through [`Self::activate`].
    pub fn update(conn: &Connection, id: i64, data: &GoalUpdate) -> DbResult<Option<Self>> {
        if Self::get_by_id(conn, id)?.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        macro_rules! add_update {
            ($col:expr, $val:expr) => {
                updates.push(format!("{} = ?{}", $col, params_vec.len() + 1));
                params_vec.push(Box::new($val));
            };
        }

        if let Some(ref name) = data.name {
            add_update!("name", name.clone());
        }

        let targets = [
            ("calories", data.calories),
            ("protein", data.protein),
            ("carbs", data.carbs),
            ("fat", data.fat),
        ];
        for (col, value) in targets {
            if let Some(v) = value {
                if !(v.is_finite() && v >= 0.0) {
                    return Err(NutritionError::InvalidValue { field: col, value: v }.into());
                }
                add_update!(col, v);
            }
        }

        if data.start_date.is_some() {
            add_update!("start_date", format_date(data.start_date));
        }
        if data.end_date.is_some() {
            add_update!("end_date", format_date(data.end_date));
        }
        if data.is_active == Some(false) {
            add_update!("is_active", false);
        }

        let tx = conn.unchecked_transaction()?;
        if !updates.is_empty() {
            updates.push("updated_at = datetime('now')".to_string());
            let sql = format!(
                "UPDATE goals SET {} WHERE id = ?{}",
                updates.join(", "),
                params_vec.len() + 1
            );
            params_vec.push(Box::new(id));
            let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
            tx.execute(&sql, params_refs.as_slice())?;
        }
        if data.is_active == Some(true) {
            tx.execute(
                "UPDATE goals SET is_active = 0 WHERE id != ?1 AND is_active = 1
                 AND user_id = (SELECT user_id FROM goals WHERE id = ?1)",
                [id],
            )?;
            tx.execute("UPDATE goals SET is_active = 1 WHERE id = ?1", [id])?;
        }
        tx.commit()?;

        Self::get_by_id(conn, id)
    }

    /// Delete a goal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM goals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn new_goal(user_id: i64, calories: f64) -> GoalCreate {
        GoalCreate {
            user_id,
            name: Some(format!("{} kcal", calories)),
            targets: Nutrition::new(calories, 120.0, 250.0, 70.0),
            start_date: None,
            end_date: None,
            is_active: true,
        }
    }

    fn active_count(conn: &Connection, user_id: i64) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM goals WHERE user_id = ?1 AND is_active = 1",
            [user_id],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_new_goal_replaces_active() {
        let conn = setup();
        let first = Goal::create(&conn, &new_goal(1, 2000.0)).unwrap();
        let second = Goal::create(&conn, &new_goal(1, 1800.0)).unwrap();

        assert_eq!(active_count(&conn, 1), 1);
        let active = Goal::get_active(&conn, 1).unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert!(!Goal::get_by_id(&conn, first.id).unwrap().unwrap().is_active);
        assert_eq!(Goal::list_for_user(&conn, 1).unwrap().len(), 2);
    }

    #[test]
    fn test_inactive_goal_leaves_active_alone() {
        let conn = setup();
        let active = Goal::create(&conn, &new_goal(1, 2000.0)).unwrap();
        let mut draft = new_goal(1, 2500.0);
        draft.is_active = false;
        Goal::create(&conn, &draft).unwrap();

        assert_eq!(Goal::get_active(&conn, 1).unwrap().unwrap().id, active.id);
    }

    #[test]
    fn test_activate_switches_goal() {
        let conn = setup();
        let first = Goal::create(&conn, &new_goal(1, 2000.0)).unwrap();
        Goal::create(&conn, &new_goal(1, 1800.0)).unwrap();
        Goal::create(&conn, &new_goal(2, 2200.0)).unwrap();

        let activated = Goal::activate(&conn, first.id).unwrap().unwrap();
        assert!(activated.is_active);
        assert_eq!(active_count(&conn, 1), 1);
        assert_eq!(active_count(&conn, 2), 1);
        assert!(Goal::activate(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_update_targets_and_activation() {
        let conn = setup();
        let first = Goal::create(&conn, &new_goal(1, 2000.0)).unwrap();
        Goal::create(&conn, &new_goal(1, 1800.0)).unwrap();

        let updated = Goal::update(
            &conn,
            first.id,
            &GoalUpdate {
                protein: Some(150.0),
                is_active: Some(true),
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
        assert_eq!(updated.targets.protein, 150.0);
        assert!(updated.is_active);
        assert_eq!(updated.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(active_count(&conn, 1), 1);

        let bad = GoalUpdate { fat: Some(f64::INFINITY), ..Default::default() };
        assert!(Goal::update(&conn, first.id, &bad).is_err());
        assert!(Goal::update(&conn, 999, &GoalUpdate::default()).unwrap().is_none());
    }

    #[test]
    fn test_create_rejects_non_finite_targets() {
        let conn = setup();
        let mut goal = new_goal(1, 2000.0);
        goal.targets.carbs = f64::NAN;
        assert!(matches!(Goal::create(&conn, &goal), Err(DbError::Invalid(_))));
    }

    #[test]
    fn test_delete() {
        let conn = setup();
        let goal = Goal::create(&conn, &new_goal(1, 2000.0)).unwrap();
        assert!(Goal::delete(&conn, goal.id).unwrap());
        assert!(Goal::get_active(&conn, 1).unwrap().is_none());
        assert!(!Goal::delete(&conn, goal.id).unwrap());
    }
}
