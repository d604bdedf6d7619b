//! Trend assembly
//!
//! Aggregates a range of logged meals into per-day progress, substituting a
//! synthetic series when the range holds no data.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aggregate::daily_totals;
use super::demo::{baseline_targets, synthesize, DateRange};
use super::progress::{track, TrendPoint};
use super::types::{DataSource, GoalRecord, MealRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub source: DataSource,
    pub range: DateRange,
    pub points: Vec<TrendPoint>,
}

impl Trend {
    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Build a trend from meals already filtered to `range`
pub fn build_trend<R: Rng>(
    meals: &[MealRecord],
    goal: Option<&GoalRecord>,
    range: &DateRange,
    rng: &mut R,
) -> Trend {
    let recorded = daily_totals(meals);

    let (source, days) = if recorded.is_empty() {
        (DataSource::Synthetic, synthesize(range, &baseline_targets(goal), rng))
    } else {
        (DataSource::Recorded, recorded)
    };

    Trend {
        source,
        range: *range,
        points: track(&days, goal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::types::{MealType, Nutrition};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn range() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
        }
    }

    #[test]
    fn test_falls_back_to_synthetic() {
        let mut rng = StdRng::seed_from_u64(1);
        let trend = build_trend(&[], None, &range(), &mut rng);
        assert!(trend.is_synthetic());
        assert_eq!(trend.points.len(), 7);
        assert!(trend.points.iter().all(|p| p.progress.is_none()));
    }

    #[test]
    fn test_recorded_data_is_tagged() {
        let meal = MealRecord {
            id: 1,
            user_id: 1,
            name: "Soup".to_string(),
            description: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
            meal_type: MealType::Lunch,
            nutrition: Nutrition::new(400.0, 20.0, 40.0, 10.0),
            created_at: String::new(),
        };
        let goal = GoalRecord {
            id: 1,
            user_id: 1,
            name: None,
            targets: Nutrition::new(2000.0, 100.0, 200.0, 50.0),
            is_active: true,
            start_date: None,
            end_date: None,
            created_at: String::new(),
        };

        let mut rng = StdRng::seed_from_u64(1);
        let trend = build_trend(&[meal], Some(&goal), &range(), &mut rng);
        assert_eq!(trend.source, DataSource::Recorded);
        assert_eq!(trend.points.len(), 1);
        assert_eq!(trend.points[0].progress.unwrap().calories, 20);

        let json = serde_json::to_value(&trend).unwrap();
        assert_eq!(json["source"], "recorded");
    }
}
