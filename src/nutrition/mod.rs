//! Nutrition analytics engine
//!
//! Pure computations over validated meal and goal records: daily
//! aggregation, goal progress, recommendations, statistics and demo data.
//! Nothing in here touches storage.

pub mod aggregate;
pub mod demo;
pub mod error;
pub mod needs;
pub mod progress;
pub mod recommend;
pub mod stats;
pub mod trend;
pub mod types;
pub mod validate;

pub use aggregate::{daily_totals, sum_nutrition, totals_for_date};
pub use demo::{baseline_targets, synthesize, DateRange, DEFAULT_TARGETS};
pub use error::{NutritionError, NutritionResult};
pub use needs::{suggest_targets, ActivityLevel, BodyProfile, GoalType, Sex, SuggestedTargets};
pub use progress::{
    percent_of, percentages, progress, remaining, track, Percentages, ProgressSnapshot,
    RemainingBudget, TrendPoint,
};
pub use recommend::{
    find_meals_by_nutrition, nutrient_priorities, recommend, MacroNutrient, NutritionCriteria,
    Recommendation,
};
pub use stats::{balance_score, meal_stats, period_summary, MealStats, PeriodSummary};
pub use trend::{build_trend, Trend};
pub use types::{DailyTotal, DataSource, GoalRecord, MealRecord, MealType, Nutrition};
pub use validate::{normalize_meals, parse_date, validate_nutrition, RawMeal, RawNumber};
