//! Nutrilog Library
//!
//! Meal logging, goal tracking and nutrition analytics.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
