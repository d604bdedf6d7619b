//! Goal suggestion
//!
//! Daily targets from body measurements: Mifflin-St Jeor BMR, an activity
//! factor, a goal adjustment and a fixed macro split.

use serde::{Deserialize, Serialize};

use super::error::{NutritionError, NutritionResult};
use super::types::Nutrition;

const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    Extreme,
}

impl ActivityLevel {
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::Extreme => 1.9,
        }
    }

    /// Unknown levels fall back to moderate
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "sedentary" => ActivityLevel::Sedentary,
            "light" => ActivityLevel::Light,
            "active" => ActivityLevel::Active,
            "extreme" => ActivityLevel::Extreme,
            _ => ActivityLevel::Moderate,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl GoalType {
    fn calorie_adjustment(&self) -> f64 {
        match self {
            GoalType::Lose => 0.8,
            GoalType::Maintain => 1.0,
            GoalType::Gain => 1.1,
        }
    }

    /// (protein, carbs, fat) shares of calories
    fn macro_split(&self) -> (f64, f64, f64) {
        match self {
            GoalType::Lose => (0.35, 0.35, 0.30),
            GoalType::Maintain => (0.30, 0.40, 0.30),
            GoalType::Gain => (0.25, 0.50, 0.25),
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "lose" => GoalType::Lose,
            "gain" => GoalType::Gain,
            _ => GoalType::Maintain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyProfile {
    pub sex: Sex,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity: ActivityLevel,
    pub goal: GoalType,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuggestedTargets {
    pub bmr: f64,
    pub tdee: f64,
    pub targets: Nutrition,
}

pub fn mifflin_st_jeor(sex: Sex, age: u32, weight_kg: f64, height_cm: f64) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

fn validate(profile: &BodyProfile) -> NutritionResult<()> {
    if !(profile.weight_kg > 0.0 && profile.weight_kg <= 300.0) {
        return Err(NutritionError::InvalidProfile(
            "weight must be between 0 and 300 kg".to_string(),
        ));
    }
    if !(profile.height_cm > 0.0 && profile.height_cm <= 300.0) {
        return Err(NutritionError::InvalidProfile(
            "height must be between 0 and 300 cm".to_string(),
        ));
    }
    if !(10..=120).contains(&profile.age) {
        return Err(NutritionError::InvalidProfile(
            "age must be between 10 and 120 years".to_string(),
        ));
    }
    Ok(())
}

/// Suggest daily calorie and macro targets for a profile
pub fn suggest_targets(profile: &BodyProfile) -> NutritionResult<SuggestedTargets> {
    validate(profile)?;

    let bmr = mifflin_st_jeor(profile.sex, profile.age, profile.weight_kg, profile.height_cm);
    let tdee = bmr * profile.activity.factor();
    let calories = (tdee * profile.goal.calorie_adjustment()).round();
    let (protein, carbs, fat) = profile.goal.macro_split();

    Ok(SuggestedTargets {
        bmr,
        tdee,
        targets: Nutrition {
            calories,
            protein: (calories * protein / KCAL_PER_G_PROTEIN).round(),
            carbs: (calories * carbs / KCAL_PER_G_CARBS).round(),
            fat: (calories * fat / KCAL_PER_G_FAT).round(),
        },
    })
}
