use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use crate::calculations::{last_n_days, within_last_n_days};
use crate::models::{DailyLog, Goal, WeightLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightRange {
    Week,
    Month,
    Quarter,
    All,
}

impl WeightRange {
    #[must_use]
    pub fn days(self) -> Option<u32> {
        match self {
            WeightRange::Week => Some(7),
            WeightRange::Month => Some(30),
            WeightRange::Quarter => Some(90),
            WeightRange::All => None,
        }
    }
}

impl FromStr for WeightRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "7" | "7d" | "week" => Ok(WeightRange::Week),
            "30" | "30d" | "month" => Ok(WeightRange::Month),
            "90" | "90d" | "quarter" => Ok(WeightRange::Quarter),
            "all" => Ok(WeightRange::All),
            _ => bail!("Invalid range '{s}'. Use 7d, 30d, 90d, or all"),
        }
    }
}

impl fmt::Display for WeightRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.days() {
            Some(n) => write!(f, "last {n} days"),
            None => f.write_str("all time"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionRange {
    Week,
    Fortnight,
    Month,
}

impl NutritionRange {
    #[must_use]
    pub fn days(self) -> u32 {
        match self {
            NutritionRange::Week => 7,
            NutritionRange::Fortnight => 14,
            NutritionRange::Month => 30,
        }
    }
}

impl FromStr for NutritionRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "7" | "7d" | "week" => Ok(NutritionRange::Week),
            "14" | "14d" | "fortnight" => Ok(NutritionRange::Fortnight),
            "30" | "30d" | "month" => Ok(NutritionRange::Month),
            _ => bail!("Invalid range '{s}'. Use 7d, 14d, or 30d"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayNutrition {
    pub date: NaiveDate,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NutritionAverages {
    pub calories: i64,
    pub protein: i64,
}

/// Weight logs inside `range`, oldest first.
#[must_use]
pub fn filter_weight_logs(logs: &[WeightLog], range: WeightRange, today: NaiveDate) -> Vec<WeightLog> {
    let mut filtered: Vec<WeightLog> = logs
        .iter()
        .filter(|l| range.days().is_none_or(|n| within_last_n_days(l.date, n, today)))
        .cloned()
        .collect();
    filtered.sort_by_key(|l| l.date);
    filtered
}

/// How far the first-to-last weight change in `logs` has moved toward `target_weight`, in percent.
///
/// Needs at least two logs (sorted oldest first). Results are not capped: overshooting
/// the target reads above 100 and moving the wrong way reads negative.
#[must_use]
pub fn weight_progress(logs: &[WeightLog], goal: Goal, target_weight: f64) -> f64 {
    let (Some(first), Some(last)) = (logs.first(), logs.last()) else {
        return 0.0;
    };
    if logs.len() < 2 {
        return 0.0;
    }
    let (first, last) = (first.weight, last.weight);

    let (num, den) = match goal {
        Goal::Cutting => (first - last, first - target_weight),
        Goal::Bulking => (last - first, target_weight - first),
        Goal::Maintaining => {
            let deviation = (last - target_weight).abs();
            let max_deviation = (first - target_weight).abs();
            (max_deviation - deviation, max_deviation)
        }
    };
    if den == 0.0 {
        return 0.0;
    }
    num / den * 100.0
}

/// Per-day totals for every day in `range`, oldest first, zero-filled where nothing was logged.
#[must_use]
pub fn nutrition_series(
    daily_logs: &BTreeMap<NaiveDate, DailyLog>,
    range: NutritionRange,
    today: NaiveDate,
) -> Vec<DayNutrition> {
    last_n_days(range.days(), today)
        .into_iter()
        .map(|date| {
            let stats = daily_logs.get(&date).map(DailyLog::stats).unwrap_or_default();
            DayNutrition {
                date,
                calories: stats.calories,
                protein: stats.protein,
                carbs: stats.carbs,
                fats: stats.fats,
            }
        })
        .collect()
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn nutrition_averages(series: &[DayNutrition]) -> NutritionAverages {
    if series.is_empty() {
        return NutritionAverages::default();
    }
    let n = series.len() as f64;
    let calories: f64 = series.iter().map(|d| d.calories).sum();
    let protein: f64 = series.iter().map(|d| d.protein).sum();
    NutritionAverages {
        calories: (calories / n).round() as i64,
        protein: (protein / n).round() as i64,
    }
}
