//! Boundary validation
//!
//! Meals arrive from storage as loosely typed rows. They are normalized into
//! [`MealRecord`]s here so that the rest of the engine never coerces values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{NutritionError, NutritionResult};
use super::types::{MealRecord, MealType, Nutrition};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A numeric cell as stored. Legacy rows may hold numbers as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl From<f64> for RawNumber {
    fn from(value: f64) -> Self {
        RawNumber::Number(value)
    }
}

/// A meal row before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMeal {
    pub id: Option<i64>,
    pub user_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    pub calories: Option<RawNumber>,
    pub protein: Option<RawNumber>,
    pub carbs: Option<RawNumber>,
    pub fat: Option<RawNumber>,
    pub created_at: Option<String>,
}

/// Parse an ISO calendar date
pub fn parse_date(s: &str) -> NutritionResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| NutritionError::InvalidDate(s.to_string()))
}

fn checked(field: &'static str, value: f64) -> NutritionResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(NutritionError::InvalidValue { field, value })
    }
}

/// Absent values count as zero. Numeric text is parsed; anything else,
/// negative or non-finite is rejected.
fn macro_value(field: &'static str, value: Option<RawNumber>) -> NutritionResult<f64> {
    match value {
        None => Ok(0.0),
        Some(RawNumber::Number(v)) => checked(field, v),
        Some(RawNumber::Text(text)) => match text.trim() {
            "" => Ok(0.0),
            trimmed => trimmed
                .parse::<f64>()
                .map_err(|_| NutritionError::NotANumber { field, value: text.clone() })
                .and_then(|v| checked(field, v)),
        },
    }
}

/// Validate a full set of macro values
pub fn validate_nutrition(n: &Nutrition) -> NutritionResult<Nutrition> {
    Ok(Nutrition {
        calories: checked("calories", n.calories)?,
        protein: checked("protein", n.protein)?,
        carbs: checked("carbs", n.carbs)?,
        fat: checked("fat", n.fat)?,
    })
}

impl TryFrom<RawMeal> for MealRecord {
    type Error = NutritionError;

    fn try_from(raw: RawMeal) -> NutritionResult<Self> {
        let id = raw.id.ok_or(NutritionError::MissingField("id"))?;
        let user_id = raw.user_id.ok_or(NutritionError::MissingField("user_id"))?;
        let date = raw
            .date
            .as_deref()
            .ok_or(NutritionError::MissingField("date"))
            .and_then(parse_date)?;

        let nutrition = Nutrition {
            calories: macro_value("calories", raw.calories)?,
            protein: macro_value("protein", raw.protein)?,
            carbs: macro_value("carbs", raw.carbs)?,
            fat: macro_value("fat", raw.fat)?,
        };

        Ok(Self {
            id,
            user_id,
            name: raw
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Untitled meal".to_string()),
            description: raw.description,
            date,
            meal_type: raw
                .meal_type
                .as_deref()
                .and_then(MealType::parse)
                .unwrap_or_default(),
            nutrition,
            created_at: raw.created_at.unwrap_or_default(),
        })
    }
}

/// Validate a batch of rows, keeping the good ones.
///
/// A single corrupt row never prevents the rest from being summarized; the
/// rejected rows are returned alongside so callers can report them.
pub fn normalize_meals(raw: Vec<RawMeal>) -> (Vec<MealRecord>, Vec<NutritionError>) {
    let mut meals = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for row in raw {
        let row_id = row.id;
        match MealRecord::try_from(row) {
            Ok(meal) => meals.push(meal),
            Err(e) => {
                tracing::warn!(id = ?row_id, error = %e, "skipping malformed meal record");
                rejected.push(e);
            }
        }
    }

    (meals, rejected)
}
