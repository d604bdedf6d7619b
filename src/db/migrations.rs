//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: meals and goals
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- MEALS
        -- One logged eating occasion
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            meal_type TEXT NOT NULL DEFAULT 'other'
                CHECK(meal_type IN ('breakfast', 'lunch', 'dinner', 'snack', 'other')),

            -- Nullable so rows written without a value read back as zero
            calories REAL,
            protein REAL,                        -- grams
            carbs REAL,                          -- grams
            fat REAL,                            -- grams

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meals_user_date ON meals(user_id, date);
        CREATE INDEX idx_meals_name ON meals(name);

        -- ============================================
        -- GOALS
        -- Daily calorie and macro targets
        -- ============================================
        CREATE TABLE goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT,
            calories REAL NOT NULL,
            protein REAL NOT NULL,
            carbs REAL NOT NULL,
            fat REAL NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,  -- boolean
            start_date TEXT,
            end_date TEXT,
            created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_goals_user ON goals(user_id);

        -- At most one active goal per user
        CREATE UNIQUE INDEX idx_goals_one_active ON goals(user_id) WHERE is_active = 1;
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_one_active_goal_per_user() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let insert = "INSERT INTO goals (user_id, calories, protein, carbs, fat, is_active)
                      VALUES (?1, 2000, 100, 200, 60, 1)";
        conn.execute(insert, [1]).unwrap();
        assert!(conn.execute(insert, [1]).is_err());
        conn.execute(insert, [2]).unwrap();
    }

    #[test]
    fn test_meal_type_is_checked() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO meals (user_id, name, date, meal_type) VALUES (1, 'x', '2025-01-01', 'brunch')",
            [],
        );
        assert!(result.is_err());
    }
}
