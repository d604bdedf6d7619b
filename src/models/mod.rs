//! Data models
//!
//! Storage operations for the database entities.

mod goal;
mod meal;

pub use goal::{Goal, GoalCreate, GoalUpdate};
pub use meal::{Meal, MealCreate, MealFilter, MealUpdate};
