//! Demo data synthesis
//!
//! Generates a plausible day-by-day series when a range has no logged meals.
//! Weekends skew toward more calories, carbs and fat, and use a different
//! meal-type split than weekdays.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::types::{DailyTotal, GoalRecord, MealType, Nutrition};

/// Trailing window used when a range bound is missing
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Baseline when there is no goal to vary around
pub const DEFAULT_TARGETS: Nutrition = Nutrition::new(2000.0, 120.0, 250.0, 70.0);

/// Per-day-kind generation parameters
struct DayProfile {
    /// Symmetric variation applied to every macro
    variation: f64,
    calorie_factor: f64,
    carbs_factor: f64,
    fat_factor: f64,
    /// Calorie share per meal type before jitter
    shares: [(MealType, f64); 4],
    /// Jitter factor is drawn from `jitter_low..jitter_low + jitter_width`
    jitter_low: f64,
    jitter_width: f64,
}

const WEEKDAY: DayProfile = DayProfile {
    variation: 0.15,
    calorie_factor: 1.0,
    carbs_factor: 1.0,
    fat_factor: 1.0,
    shares: [
        (MealType::Breakfast, 0.20),
        (MealType::Lunch, 0.35),
        (MealType::Dinner, 0.30),
        (MealType::Snack, 0.15),
    ],
    jitter_low: 0.95,
    jitter_width: 0.10,
};

const WEEKEND: DayProfile = DayProfile {
    variation: 0.20,
    calorie_factor: 1.10,
    carbs_factor: 1.15,
    fat_factor: 1.20,
    shares: [
        (MealType::Breakfast, 0.30),
        (MealType::Lunch, 0.40),
        (MealType::Dinner, 0.25),
        (MealType::Snack, 0.05),
    ],
    jitter_low: 0.95,
    jitter_width: 0.15,
};

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Inclusive calendar range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Fill in a missing bound with the trailing window ending `today`, and
    /// swap reversed bounds.
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, today: NaiveDate) -> Self {
        match (start, end) {
            (Some(start), Some(end)) if start > end => Self { start: end, end: start },
            (Some(start), Some(end)) => Self { start, end },
            _ => Self {
                start: today - Duration::days(DEFAULT_WINDOW_DAYS - 1),
                end: today,
            },
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// The active goal's targets, falling back per field to [`DEFAULT_TARGETS`]
/// where a target is not set.
pub fn baseline_targets(goal: Option<&GoalRecord>) -> Nutrition {
    let Some(goal) = goal else {
        return DEFAULT_TARGETS;
    };
    let pick = |value: f64, fallback: f64| {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            fallback
        }
    };
    let t = &goal.targets;
    Nutrition {
        calories: pick(t.calories, DEFAULT_TARGETS.calories),
        protein: pick(t.protein, DEFAULT_TARGETS.protein),
        carbs: pick(t.carbs, DEFAULT_TARGETS.carbs),
        fat: pick(t.fat, DEFAULT_TARGETS.fat),
    }
}

/// Generate one day around `baseline`
pub fn synthesize_day<R: Rng>(date: NaiveDate, baseline: &Nutrition, rng: &mut R) -> DailyTotal {
    let profile = if is_weekend(date) { &WEEKEND } else { &WEEKDAY };
    let v = profile.variation;
    let mut vary = |factor: f64| rng.gen_range(-v..v) * factor;

    let nutrition = Nutrition {
        calories: (baseline.calories * (1.0 + vary(profile.calorie_factor))).round(),
        protein: (baseline.protein * (1.0 + vary(1.0))).round(),
        carbs: (baseline.carbs * (1.0 + vary(profile.carbs_factor))).round(),
        fat: (baseline.fat * (1.0 + vary(profile.fat_factor))).round(),
    };

    let jittered: Vec<(MealType, f64)> = profile
        .shares
        .iter()
        .map(|(meal_type, share)| {
            let jitter = profile.jitter_low + rng.gen::<f64>() * profile.jitter_width;
            (*meal_type, baseline.calories * share * jitter)
        })
        .collect();

    DailyTotal {
        date,
        nutrition,
        meal_types: reconcile(jittered, nutrition.calories).into_iter().collect(),
    }
}

/// Scale the breakdown to `total`, round each entry, and put the rounding
/// residual on the largest entry so the entries sum to exactly `total`.
fn reconcile(breakdown: Vec<(MealType, f64)>, total: f64) -> Vec<(MealType, f64)> {
    let raw_sum: f64 = breakdown.iter().map(|(_, kcal)| kcal).sum();
    let ratio = if raw_sum > 0.0 { total / raw_sum } else { 0.0 };

    let mut scaled: Vec<(MealType, f64)> = breakdown
        .into_iter()
        .map(|(t, kcal)| (t, (kcal * ratio).round()))
        .collect();

    let residual = total - scaled.iter().map(|(_, kcal)| kcal).sum::<f64>();
    if let Some(largest) = scaled.iter_mut().max_by(|a, b| a.1.total_cmp(&b.1)) {
        largest.1 += residual;
    }
    scaled
}

/// One synthetic day per calendar day in `range`, inclusive
pub fn synthesize<R: Rng>(range: &DateRange, baseline: &Nutrition, rng: &mut R) -> Vec<DailyTotal> {
    let days: Vec<DailyTotal> = range.days().map(|d| synthesize_day(d, baseline, rng)).collect();
    tracing::info!(
        start = %range.start,
        end = %range.end,
        days = days.len(),
        "synthesized demo nutrition data"
    );
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_resolve_range() {
        let today = date("2025-03-31");

        let swapped = DateRange::resolve(Some(date("2025-03-10")), Some(date("2025-03-01")), today);
        assert_eq!(swapped.start, date("2025-03-01"));
        assert_eq!(swapped.end, date("2025-03-10"));
        assert_eq!(swapped.len(), 10);

        let trailing = DateRange::resolve(Some(date("2025-03-10")), None, today);
        assert_eq!(trailing.end, today);
        assert_eq!(trailing.start, date("2025-03-02"));
        assert_eq!(trailing.days().count(), 30);
    }

    #[test]
    fn test_baseline_targets() {
        assert_eq!(baseline_targets(None), DEFAULT_TARGETS);

        let goal = GoalRecord {
            id: 1,
            user_id: 1,
            name: None,
            targets: Nutrition::new(1800.0, 0.0, 200.0, 60.0),
            is_active: true,
            start_date: None,
            end_date: None,
            created_at: String::new(),
        };
        assert_eq!(baseline_targets(Some(&goal)), Nutrition::new(1800.0, 120.0, 200.0, 60.0));
    }

    #[test]
    fn test_single_saturday_breakdown_is_exact() {
        let saturday = date("2025-03-01");
        let range = DateRange::resolve(Some(saturday), Some(saturday), saturday);
        let mut rng = StdRng::seed_from_u64(7);

        let days = synthesize(&range, &Nutrition::new(2000.0, 120.0, 250.0, 70.0), &mut rng);
        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.date, saturday);
        assert_eq!(day.meal_types.len(), 4);
        assert_eq!(day.breakdown_total(), day.nutrition.calories);
    }

    #[test]
    fn test_series_stays_within_variation() {
        let range = DateRange::resolve(Some(date("2025-01-01")), Some(date("2025-03-31")), date("2025-03-31"));
        let mut rng = StdRng::seed_from_u64(42);
        let baseline = DEFAULT_TARGETS;

        let days = synthesize(&range, &baseline, &mut rng);
        assert_eq!(days.len(), range.len());

        for day in &days {
            assert!(range.contains(day.date));
            assert_eq!(day.breakdown_total(), day.nutrition.calories);
            assert!(day.meal_types.values().all(|kcal| *kcal >= 0.0));

            // weekend calories: ±20% × 1.1 = ±22%
            let (cal_bound, fat_bound) = if is_weekend(day.date) { (0.22, 0.24) } else { (0.15, 0.15) };
            let cal_dev = (day.nutrition.calories / baseline.calories - 1.0).abs();
            let fat_dev = (day.nutrition.fat / baseline.fat - 1.0).abs();
            assert!(cal_dev <= cal_bound + 0.001, "{} calories out of range", day.date);
            assert!(fat_dev <= fat_bound + 0.01, "{} fat out of range", day.date);
        }
    }

    #[test]
    fn test_weekend_skews_each_macro_by_its_factor() {
        let baseline = Nutrition::new(1e9, 1e9, 1e9, 1e9);
        let deviation = |value: f64, raw: f64, factor: f64| {
            assert_eq!(value, (1e9 * (1.0 + raw * factor)).round());
        };

        for seed in [1, 7, 99, 2024] {
            let mut expected = StdRng::seed_from_u64(seed);
            let raw: Vec<f64> = (0..4).map(|_| expected.gen_range(-0.20..0.20)).collect();
            let day = synthesize_day(date("2025-03-01"), &baseline, &mut StdRng::seed_from_u64(seed));
            deviation(day.nutrition.calories, raw[0], 1.10);
            deviation(day.nutrition.protein, raw[1], 1.0);
            deviation(day.nutrition.carbs, raw[2], 1.15);
            deviation(day.nutrition.fat, raw[3], 1.20);

            let mut expected = StdRng::seed_from_u64(seed);
            let raw: Vec<f64> = (0..4).map(|_| expected.gen_range(-0.15..0.15)).collect();
            let day = synthesize_day(date("2025-03-03"), &baseline, &mut StdRng::seed_from_u64(seed));
            deviation(day.nutrition.calories, raw[0], 1.0);
            deviation(day.nutrition.protein, raw[1], 1.0);
            deviation(day.nutrition.carbs, raw[2], 1.0);
            deviation(day.nutrition.fat, raw[3], 1.0);
        }
    }

    #[test]
    fn test_reconcile_handles_zero_total() {
        let out = reconcile(vec![(MealType::Lunch, 500.0), (MealType::Dinner, 300.0)], 0.0);
        assert!(out.iter().all(|(_, kcal)| *kcal == 0.0));
    }
}
