//! Goal MCP Tools
//!
//! Tools for managing calorie and macro goals.

use serde::Serialize;

use crate::db::Database;
use crate::models::{Goal, GoalCreate, GoalUpdate};
use crate::nutrition::{suggest_targets, BodyProfile, SuggestedTargets};

/// Response for list_goals
#[derive(Debug, Serialize)]
pub struct ListGoalsResponse {
    pub goals: Vec<Goal>,
    pub active_goal_id: Option<i64>,
}

/// Response for get_active_goal
#[derive(Debug, Serialize)]
pub struct ActiveGoalResponse {
    pub goal: Option<Goal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response for delete_goal
#[derive(Debug, Serialize)]
pub struct DeleteGoalResponse {
    pub success: bool,
    pub deleted_id: i64,
}

/// Response for suggest_goal
#[derive(Debug, Serialize)]
pub struct SuggestGoalResponse {
    pub profile: BodyProfile,
    pub suggestion: SuggestedTargets,
    /// Present when the suggestion was saved as the active goal
    pub saved_goal: Option<Goal>,
}

/// Create a goal
pub fn create_goal(db: &Database, data: GoalCreate) -> Result<Goal, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Goal::create(&conn, &data).map_err(|e| format!("Failed to create goal: {}", e))
}

/// List a user's goals, newest first
pub fn list_goals(db: &Database, user_id: i64) -> Result<ListGoalsResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let goals = Goal::list_for_user(&conn, user_id).map_err(|e| format!("Failed to list goals: {}", e))?;

    Ok(ListGoalsResponse {
        active_goal_id: goals.iter().find(|g| g.is_active).map(|g| g.id),
        goals,
    })
}

/// Get the user's active goal
pub fn get_active_goal(db: &Database, user_id: i64) -> Result<ActiveGoalResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let goal = Goal::get_active(&conn, user_id).map_err(|e| format!("Failed to get active goal: {}", e))?;

    Ok(ActiveGoalResponse {
        message: goal.is_none().then(|| "No active goal found".to_string()),
        goal,
    })
}

/// Update a goal
pub fn update_goal(db: &Database, id: i64, data: GoalUpdate) -> Result<Option<Goal>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Goal::update(&conn, id, &data).map_err(|e| format!("Failed to update goal: {}", e))
}

/// Make a goal the user's active goal
pub fn activate_goal(db: &Database, id: i64) -> Result<Option<Goal>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Goal::activate(&conn, id).map_err(|e| format!("Failed to activate goal: {}", e))
}

/// Delete a goal
pub fn delete_goal(db: &Database, id: i64) -> Result<DeleteGoalResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let deleted = Goal::delete(&conn, id).map_err(|e| format!("Failed to delete goal: {}", e))?;
    if !deleted {
        return Err(format!("Goal not found: {}", id));
    }

    Ok(DeleteGoalResponse {
        success: true,
        deleted_id: id,
    })
}

/// Suggest targets from body measurements, optionally saving them as the
/// user's new active goal
pub fn suggest_goal(
    db: &Database,
    user_id: i64,
    profile: BodyProfile,
    save: bool,
) -> Result<SuggestGoalResponse, String> {
    let suggestion = suggest_targets(&profile).map_err(|e| e.to_string())?;

    let saved_goal = if save {
        let data = GoalCreate {
            user_id,
            name: Some(format!("Suggested ({:?})", profile.goal).to_lowercase()),
            targets: suggestion.targets,
            start_date: None,
            end_date: None,
            is_active: true,
        };
        Some(create_goal(db, data)?)
    } else {
        None
    };

    Ok(SuggestGoalResponse {
        profile,
        suggestion,
        saved_goal,
    })
}
