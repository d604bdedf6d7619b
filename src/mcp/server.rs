//! Nutrilog MCP Server Implementation
//!
//! Implements the MCP server with all Nutrilog tools.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::db::Database;
use crate::models::{GoalCreate, GoalUpdate, MealCreate, MealUpdate};
use crate::nutrition::{
    parse_date, ActivityLevel, BodyProfile, GoalType, MealType, Nutrition, NutritionCriteria, Sex,
};
use crate::tools::status::StatusTracker;
use crate::tools::{analytics, goals, meals, parse_optional_date};

/// Nutrilog MCP Service
#[derive(Clone)]
pub struct NutrilogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    config: Config,
    tool_router: ToolRouter<NutrilogService>,
}

impl NutrilogService {
    pub fn new(config: Config, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(
                config.database_path.clone(),
                config.default_user_id,
            ))),
            database,
            config,
            tool_router: Self::tool_router(),
        }
    }

    fn user(&self, user_id: Option<i64>) -> i64 {
        user_id.unwrap_or(self.config.default_user_id)
    }

    /// Seeded when a demo seed is configured, otherwise from entropy
    fn demo_rng(&self) -> StdRng {
        match self.config.demo_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn not_found(entity: &str, id: i64) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(format!(
        r#"{{"error": "{} not found", "id": {}}}"#,
        entity, id
    ))]))
}

fn parse_meal_type(value: Option<&str>) -> Result<Option<MealType>, McpError> {
    value
        .map(|s| {
            MealType::parse(s).ok_or_else(|| {
                McpError::invalid_params(
                    format!("Invalid meal_type '{}': expected breakfast, lunch, dinner, snack or other", s),
                    None,
                )
            })
        })
        .transpose()
}

fn parse_sex(value: &str) -> Result<Sex, McpError> {
    match value.trim().to_lowercase().as_str() {
        "male" | "m" => Ok(Sex::Male),
        "female" | "f" => Ok(Sex::Female),
        other => Err(McpError::invalid_params(
            format!("Invalid sex '{}': expected male or female", other),
            None,
        )),
    }
}

fn date_arg(value: Option<&str>) -> Result<Option<chrono::NaiveDate>, McpError> {
    parse_optional_date(value).map_err(|e| McpError::invalid_params(e, None))
}

// ============================================================================
// Meal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    pub user_id: Option<i64>,
    pub name: String,
    pub description: Option<String>,
    /// ISO date (YYYY-MM-DD)
    pub date: String,
    /// breakfast, lunch, dinner, snack or other
    pub meal_type: Option<String>,
    /// Required, in kcal
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateMealParams {
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
}

// ============================================================================
// Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateGoalParams {
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool { true }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateGoalParams {
    pub id: i64,
    pub name: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub is_active: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SuggestGoalParams {
    pub user_id: Option<i64>,
    /// male or female
    pub sex: String,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    /// sedentary, light, moderate, active or extreme (default moderate)
    pub activity: Option<String>,
    /// lose, maintain or gain (default maintain)
    pub goal: Option<String>,
    /// Save the suggestion as the new active goal
    #[serde(default)]
    pub save: bool,
}

// ============================================================================
// Analytics Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UserParams {
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    pub user_id: Option<i64>,
    /// ISO date, defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RangeParams {
    pub user_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListMealsParams {
    pub user_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// breakfast, lunch, dinner, snack or other
    pub meal_type: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindMealsParams {
    pub user_id: Option<i64>,
    pub max_calories: Option<f64>,
    pub max_protein: Option<f64>,
    pub max_carbs: Option<f64>,
    pub max_fat: Option<f64>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl NutrilogService {
    // --- Status ---

    #[tool(description = "Get the current status of the Nutrilog service including build info, database status, and process information")]
    async fn nutrilog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        to_json(&tracker.get_status())
    }

    #[tool(description = "Get instructions for logging meals, managing goals and reading analytics. Call this when starting a session or when unsure how to use the tools.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::USAGE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Meals ---

    #[tool(description = "Log a meal with its calories and macros (grams)")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let date = parse_date(&p.date).map_err(|e| McpError::invalid_params(e.to_string(), None))?;
        let data = MealCreate {
            user_id: self.user(p.user_id),
            name: p.name,
            description: p.description,
            date,
            meal_type: parse_meal_type(p.meal_type.as_deref())?.unwrap_or_default(),
            nutrition: Nutrition::new(p.calories, p.protein, p.carbs, p.fat),
        };
        let result = meals::log_meal(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a logged meal by ID")]
    fn get_meal(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        match meals::get_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))? {
            Some(meal) => to_json(&meal),
            None => not_found("Meal", p.id),
        }
    }

    #[tool(description = "List a user's meals, optionally within an inclusive date range and of one meal type")]
    fn list_meals(&self, Parameters(p): Parameters<ListMealsParams>) -> Result<CallToolResult, McpError> {
        let meal_type = parse_meal_type(p.meal_type.as_deref())?;
        let result = meals::list_meals(
            &self.database,
            self.user(p.user_id),
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            meal_type,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update a logged meal. Only the given fields change.")]
    fn update_meal(&self, Parameters(p): Parameters<UpdateMealParams>) -> Result<CallToolResult, McpError> {
        let data = MealUpdate {
            name: p.name,
            description: p.description,
            date: date_arg(p.date.as_deref())?,
            meal_type: parse_meal_type(p.meal_type.as_deref())?,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
        };
        match meals::update_meal(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))? {
            Some(meal) => to_json(&meal),
            None => not_found("Meal", p.id),
        }
    }

    #[tool(description = "Delete a logged meal")]
    fn delete_meal(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Goals ---

    #[tool(description = "Create a calorie and macro goal. New goals are active by default and replace the current active goal.")]
    fn create_goal(&self, Parameters(p): Parameters<CreateGoalParams>) -> Result<CallToolResult, McpError> {
        let data = GoalCreate {
            user_id: self.user(p.user_id),
            name: p.name,
            targets: Nutrition::new(p.calories, p.protein, p.carbs, p.fat),
            start_date: date_arg(p.start_date.as_deref())?,
            end_date: date_arg(p.end_date.as_deref())?,
            is_active: p.is_active,
        };
        let result = goals::create_goal(&self.database, data).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List a user's goals, newest first")]
    fn list_goals(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = goals::list_goals(&self.database, self.user(p.user_id)).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the user's active goal")]
    fn get_active_goal(&self, Parameters(p): Parameters<UserParams>) -> Result<CallToolResult, McpError> {
        let result = goals::get_active_goal(&self.database, self.user(p.user_id)).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update a goal. Setting is_active=true deactivates the user's other goals.")]
    fn update_goal(&self, Parameters(p): Parameters<UpdateGoalParams>) -> Result<CallToolResult, McpError> {
        let data = GoalUpdate {
            name: p.name,
            calories: p.calories,
            protein: p.protein,
            carbs: p.carbs,
            fat: p.fat,
            is_active: p.is_active,
            start_date: date_arg(p.start_date.as_deref())?,
            end_date: date_arg(p.end_date.as_deref())?,
        };
        match goals::update_goal(&self.database, p.id, data).map_err(|e| McpError::internal_error(e, None))? {
            Some(goal) => to_json(&goal),
            None => not_found("Goal", p.id),
        }
    }

    #[tool(description = "Make a goal the user's only active goal")]
    fn activate_goal(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        match goals::activate_goal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))? {
            Some(goal) => to_json(&goal),
            None => not_found("Goal", p.id),
        }
    }

    #[tool(description = "Delete a goal")]
    fn delete_goal(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = goals::delete_goal(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Suggest daily calorie and macro targets from sex, age, weight, height, activity level and goal. Pass save=true to store it as the active goal.")]
    fn suggest_goal(&self, Parameters(p): Parameters<SuggestGoalParams>) -> Result<CallToolResult, McpError> {
        let profile = BodyProfile {
            sex: parse_sex(&p.sex)?,
            age: p.age,
            weight_kg: p.weight_kg,
            height_cm: p.height_cm,
            activity: p.activity.as_deref().map(ActivityLevel::parse).unwrap_or_default(),
            goal: p.goal.as_deref().map(GoalType::parse).unwrap_or_default(),
        };
        let result = goals::suggest_goal(&self.database, self.user(p.user_id), profile, p.save)
            .map_err(|e| McpError::invalid_params(e, None))?;
        to_json(&result)
    }

    // --- Analytics ---

    #[tool(description = "Get one day's totals against the active goal: percent of each target (capped at 100) and remaining budget")]
    fn get_progress(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::get_progress(&self.database, self.user(p.user_id), p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Recommend up to 5 previously logged meals that fit the rest of the day's goal, favoring protein")]
    fn get_recommendations(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::get_recommendations(&self.database, self.user(p.user_id), p.date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get per-day totals and goal progress over a date range (default: last 30 days). Returns demo data tagged source=synthetic when nothing was logged.")]
    fn get_trends(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        let mut rng = self.demo_rng();
        let result = analytics::get_trends(
            &self.database,
            self.user(p.user_id),
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            &mut rng,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get meal statistics: count, average calories, top protein meals and most balanced meals")]
    fn get_meal_stats(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::get_meal_stats(&self.database, self.user(p.user_id), p.start_date.as_deref(), p.end_date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Summarize a date range: average day, weekday vs weekend calories, calorie share by meal type")]
    fn get_period_summary(&self, Parameters(p): Parameters<RangeParams>) -> Result<CallToolResult, McpError> {
        let result = analytics::get_period_summary(&self.database, self.user(p.user_id), p.start_date.as_deref(), p.end_date.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Find logged meals at or below the given calorie and macro limits")]
    fn find_meals(&self, Parameters(p): Parameters<FindMealsParams>) -> Result<CallToolResult, McpError> {
        let criteria = NutritionCriteria {
            max_calories: p.max_calories,
            max_protein: p.max_protein,
            max_carbs: p.max_carbs,
            max_fat: p.max_fat,
        };
        let result = analytics::find_meals(&self.database, self.user(p.user_id), criteria)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for NutrilogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "nutrilog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Nutrilog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Nutrilog - meal logging and nutrition goal tracking. \
                 Call usage_instructions first. \
                 Meals: log_meal/get_meal/list_meals/update_meal/delete_meal. \
                 Goals: create_goal/list_goals/get_active_goal/update_goal/activate_goal/delete_goal, suggest_goal. \
                 Analytics: get_progress, get_recommendations, get_trends, get_meal_stats, get_period_summary, find_meals. \
                 get_trends returns synthetic demo data when a range has no meals; check the source field."
                    .into(),
            ),
        }
    }
}
