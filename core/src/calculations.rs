use chrono::{Duration, Local, NaiveDate};

use crate::models::{Gender, Goal, UnitSystem};

pub const KG_PER_LB: f64 = 0.453_592;
pub const LBS_PER_KG: f64 = 2.20462;

/// Moderate activity level applied to the resting estimate.
pub const ACTIVITY_MULTIPLIER: f64 = 1.55;

const MALE_HEIGHT_CM: f64 = 175.0;
const FEMALE_HEIGHT_CM: f64 = 163.0;

/// Daily maintenance calories using the Mifflin-St Jeor equation.
///
/// Height is never collected, so an average height per gender stands in for it.
#[must_use]
pub fn calculate_daily_calories(
    age: u32,
    weight: f64,
    gender: Gender,
    unit_system: UnitSystem,
) -> i64 {
    let weight_kg = match unit_system {
        UnitSystem::Metric => weight,
        UnitSystem::Imperial => weight * KG_PER_LB,
    };
    let age = f64::from(age);
    let bmr = match gender {
        Gender::Male => 10.0 * weight_kg + 6.25 * MALE_HEIGHT_CM - 5.0 * age + 5.0,
        Gender::Female => 10.0 * weight_kg + 6.25 * FEMALE_HEIGHT_CM - 5.0 * age - 161.0,
    };
    (bmr * ACTIVITY_MULTIPLIER).round() as i64
}

#[must_use]
pub fn goal_adjusted_calories(base: i64, goal: Goal) -> i64 {
    base + goal.calorie_offset()
}

/// Default protein target: 0.8 g per kg, or 0.36 g per lb.
#[must_use]
pub fn protein_target(weight: f64, unit_system: UnitSystem) -> i64 {
    let grams = match unit_system {
        UnitSystem::Metric => weight * 0.8,
        UnitSystem::Imperial => weight * 0.36,
    };
    grams.round() as i64
}

/// Percentage of `target` reached, capped at 100. A zero target counts as no progress.
#[must_use]
pub fn calculate_progress(current: f64, target: f64) -> f64 {
    if target == 0.0 {
        return 0.0;
    }
    (current / target * 100.0).min(100.0)
}

/// Convert a weight between unit systems, rounded to one decimal place.
#[must_use]
pub fn convert_weight(weight: f64, from: UnitSystem, to: UnitSystem) -> f64 {
    let converted = match (from, to) {
        (UnitSystem::Metric, UnitSystem::Imperial) => weight * LBS_PER_KG,
        (UnitSystem::Imperial, UnitSystem::Metric) => weight * KG_PER_LB,
        _ => return weight,
    };
    (converted * 10.0).round() / 10.0
}

#[must_use]
pub fn weight_unit(unit_system: UnitSystem) -> &'static str {
    match unit_system {
        UnitSystem::Metric => "kg",
        UnitSystem::Imperial => "lb",
    }
}

#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Short human form, e.g. "Sat, Jun 15".
#[must_use]
pub fn format_date_for_display(date: NaiveDate) -> String {
    date.format("%a, %b %-d").to_string()
}

/// Number of days in `month` (1-12) of `year`. Returns 0 for an invalid month.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map_or(31, |n| (n - first).num_days() as u32)
}

/// The `n` calendar days ending on `today`, oldest first.
///
/// Stops early at the earliest representable date.
#[must_use]
pub fn last_n_days(n: u32, today: NaiveDate) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = (0..n)
        .map_while(|i| today.checked_sub_signed(Duration::days(i64::from(i))))
        .collect();
    days.reverse();
    days
}

#[must_use]
pub fn get_last_n_days(n: u32) -> Vec<NaiveDate> {
    last_n_days(n, today())
}

/// Whether `date` falls within the `n` days ending on `today`.
#[must_use]
pub fn within_last_n_days(date: NaiveDate, n: u32, today: NaiveDate) -> bool {
    if n == 0 || date > today {
        return false;
    }
    (today - date).num_days() < i64::from(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_daily_calories_male_metric() {
        // 10*80 + 6.25*175 - 5*30 + 5 = 1748.75; * 1.55 = 2710.56
        assert_eq!(
            calculate_daily_calories(30, 80.0, Gender::Male, UnitSystem::Metric),
            2711
        );
    }

    #[test]
    fn test_daily_calories_female_metric() {
        // 10*60 + 6.25*163 - 5*25 - 161 = 1332.75; * 1.55 = 2065.76
        assert_eq!(
            calculate_daily_calories(25, 60.0, Gender::Female, UnitSystem::Metric),
            2066
        );
    }

    #[test]
    fn test_daily_calories_imperial_converts_to_kg() {
        let imperial = calculate_daily_calories(30, 176.0, Gender::Male, UnitSystem::Imperial);
        let metric =
            calculate_daily_calories(30, 176.0 * KG_PER_LB, Gender::Male, UnitSystem::Metric);
        assert_eq!(imperial, metric);
    }

    #[test]
    fn test_goal_adjusted_calories() {
        assert_eq!(goal_adjusted_calories(2711, Goal::Cutting), 2211);
        assert_eq!(goal_adjusted_calories(2711, Goal::Bulking), 3211);
        assert_eq!(goal_adjusted_calories(2711, Goal::Maintaining), 2711);
    }

    #[test]
    fn test_protein_target() {
        assert_eq!(protein_target(80.0, UnitSystem::Metric), 64);
        assert_eq!(protein_target(180.0, UnitSystem::Imperial), 65);
    }

    #[test]
    fn test_calculate_progress() {
        assert!((calculate_progress(50.0, 200.0) - 25.0).abs() < f64::EPSILON);
        assert!((calculate_progress(300.0, 200.0) - 100.0).abs() < f64::EPSILON);
        assert!(calculate_progress(10.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_convert_weight() {
        assert!((convert_weight(80.0, UnitSystem::Metric, UnitSystem::Imperial) - 176.4).abs() < 1e-9);
        assert!((convert_weight(176.0, UnitSystem::Imperial, UnitSystem::Metric) - 79.8).abs() < 1e-9);
        assert!((convert_weight(72.35, UnitSystem::Metric, UnitSystem::Metric) - 72.35).abs() < 1e-9);
    }

    #[test]
    fn test_weight_unit() {
        assert_eq!(weight_unit(UnitSystem::Metric), "kg");
        assert_eq!(weight_unit(UnitSystem::Imperial), "lb");
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_date(d("2024-06-05")), "2024-06-05");
        assert_eq!(format_date_for_display(d("2024-06-15")), "Sat, Jun 15");
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 13), 0);
    }

    #[test]
    fn test_last_n_days_consecutive_and_ending_today() {
        let today = d("2024-03-02");
        let days = last_n_days(7, today);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], d("2024-02-25"));
        assert_eq!(*days.last().unwrap(), today);
        for pair in days.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
        let iso: Vec<String> = days.iter().map(|d| format_date(*d)).collect();
        assert_eq!(iso[4], "2024-02-29");
    }

    #[test]
    fn test_get_last_n_days_ends_on_current_date() {
        let days = get_last_n_days(7);
        assert_eq!(days.len(), 7);
        assert!(days.windows(2).all(|w| w[0] < w[1]));
        // Guard against the clock ticking past midnight between the two calls.
        let now = today();
        let last = *days.last().unwrap();
        assert!(last == now || last == now - Duration::days(1));
    }

    #[test]
    fn test_last_n_days_zero() {
        assert!(last_n_days(0, d("2024-06-15")).is_empty());
    }

    #[test]
    fn test_last_n_days_stops_at_earliest_date() {
        let near_min = NaiveDate::MIN + Duration::days(2);
        let days = last_n_days(u32::MAX, near_min);
        assert_eq!(days, vec![NaiveDate::MIN, NaiveDate::MIN + Duration::days(1), near_min]);
    }

    #[test]
    fn test_within_last_n_days() {
        let today = d("2024-06-15");
        assert!(within_last_n_days(today, 7, today));
        assert!(within_last_n_days(d("2024-06-09"), 7, today));
        assert!(!within_last_n_days(d("2024-06-08"), 7, today));
        assert!(!within_last_n_days(d("2024-06-16"), 7, today));
        assert!(!within_last_n_days(today, 0, today));
    }
}
