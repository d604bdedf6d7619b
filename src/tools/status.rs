//! Nutrilog Status Tool
//!
//! Provides runtime status information about the Nutrilog service.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;

/// Usage instructions for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# Nutrilog Usage Instructions

Nutrilog tracks meals against a daily calorie and macro goal.

## Dates

All dates are ISO format: `YYYY-MM-DD`. Tools that take a single date default
to today. Tools that take a range default to the 30 days ending today when
either bound is missing; reversed bounds are swapped.

## Users

Every tool accepts an optional `user_id`. When omitted, the server's default
user is used (`NUTRILOG_USER_ID`, default 1).

---

## Logging Meals

**Tool:** `log_meal`
- `name` (required) - non-empty
- `date` (required) - the day the meal was eaten
- `meal_type` - breakfast, lunch, dinner, snack or other (default other)
- `calories` (required) - non-negative kcal
- `protein`, `carbs`, `fat` - non-negative grams (default 0)

**Tool:** `list_meals`
- `start_date`, `end_date` - optional inclusive bounds
- `meal_type` - only meals of this type

Other meal tools: `get_meal`, `update_meal`, `delete_meal`.

---

## Goals

A user has at most one active goal. Creating a goal makes it active and
deactivates the previous one unless `is_active: false` is passed.

**Tools:** `create_goal`, `list_goals`, `get_active_goal`, `update_goal`,
`activate_goal`, `delete_goal`

### Suggesting a Goal

**Tool:** `suggest_goal`
- `sex` (male/female), `age`, `weight_kg`, `height_cm`
- `activity`: sedentary, light, moderate, active, extreme
- `goal`: lose, maintain, gain
- `save: true` stores the suggestion as the new active goal

Uses the Mifflin-St Jeor equation with an activity factor, then a 20% deficit
for `lose` or a 10% surplus for `gain`.

---

## Analytics

| Tool | What it returns |
|------|-----------------|
| `get_progress` | One day's totals, percent of goal (capped at 100) and remaining budget |
| `get_recommendations` | Up to 5 logged meals whose calories and macros all fit the remaining budget, highest protein share first, plus `priorities`: macros under 60% of target (or the furthest behind) |
| `get_trends` | Per-day totals and progress over a range of at most 366 days |
| `get_meal_stats` | Meal count, average calories, top 3 protein meals, 3 most balanced meals |
| `get_period_summary` | Average day, weekday vs weekend calories, calorie share per meal type |
| `find_meals` | Logged meals under given `max_calories` / `max_protein` / `max_carbs` / `max_fat` |

### Demo Data

When `get_trends` finds no meals in the range it returns a generated series
instead, tagged `"source": "synthetic"`. Recorded data is tagged
`"source": "recorded"`. Never present synthetic data as the user's history.

---

## Notes

- A goal target of 0 counts as unset: its percentage and remaining budget are 0
- Recommendations never include a meal that would exceed any remaining value
- Meals with the same name are recommended once
"#;

/// Runtime status of the Nutrilog service
#[derive(Debug, Clone, Serialize)]
pub struct NutrilogStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,

    pub default_user_id: i64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    default_user_id: i64,
}

impl StatusTracker {
    /// Create a new status tracker
    pub fn new(database_path: PathBuf, default_user_id: i64) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            default_user_id,
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> NutrilogStatus {
        let build_info = BuildInfo::current();

        // Get database size if it exists
        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        // Get process info
        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        NutrilogStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
            default_user_id: self.default_user_id,
        }
    }
}
