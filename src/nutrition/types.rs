//! Shared nutrition data structures
//!
//! Value types flowing through the analytics engine: macro totals, meal and
//! goal snapshots, and per-day aggregates.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Calories plus the three macros
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fat: f64,     // grams
}

impl Nutrition {
    pub const fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self { calories, protein, carbs, fat }
    }

    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Scale nutrition values by a multiplier
    pub fn scale(&self, multiplier: f64) -> Self {
        Self {
            calories: self.calories * multiplier,
            protein: self.protein * multiplier,
            carbs: self.carbs * multiplier,
            fat: self.fat * multiplier,
        }
    }

    /// Add another nutrition to this one
    pub fn add(&self, other: &Nutrition) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fat: self.fat + other.fat,
        }
    }

    /// Round every field to the nearest whole number
    pub fn rounded(&self) -> Self {
        Self {
            calories: self.calories.round(),
            protein: self.protein.round(),
            carbs: self.carbs.round(),
            fat: self.fat.round(),
        }
    }

    /// Grams of protein + carbs + fat
    pub fn macro_mass(&self) -> f64 {
        self.protein + self.carbs + self.fat
    }
}

impl std::ops::Add for Nutrition {
    type Output = Nutrition;

    fn add(self, other: Nutrition) -> Nutrition {
        Nutrition::add(&self, &other)
    }
}

impl std::ops::Mul<f64> for Nutrition {
    type Output = Nutrition;

    fn mul(self, multiplier: f64) -> Nutrition {
        self.scale(multiplier)
    }
}

impl std::iter::Sum for Nutrition {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + n)
    }
}

impl<'a> std::iter::Sum<&'a Nutrition> for Nutrition {
    fn sum<I: Iterator<Item = &'a Nutrition>>(iter: I) -> Self {
        iter.fold(Nutrition::zero(), |acc, n| acc + *n)
    }
}

/// Meal type tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Other,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Other => "other",
        }
    }

    /// Parse a tag, case-insensitively. Unknown tags yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            "snack" => Some(MealType::Snack),
            "other" => Some(MealType::Other),
            _ => None,
        }
    }
}

/// A validated meal as seen by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub meal_type: MealType,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    pub created_at: String,
}

/// A macro/calorie goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: Option<String>,
    #[serde(flatten)]
    pub targets: Nutrition,
    pub is_active: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: String,
}

/// Summed nutrition for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    /// Calories per meal type; sums to `nutrition.calories`
    pub meal_types: BTreeMap<MealType, f64>,
}

impl DailyTotal {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            nutrition: Nutrition::zero(),
            meal_types: BTreeMap::new(),
        }
    }

    /// Sum of the meal-type breakdown
    pub fn breakdown_total(&self) -> f64 {
        self.meal_types.values().sum()
    }
}

/// Whether a series was built from logged meals or generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Recorded,
    Synthetic,
}
