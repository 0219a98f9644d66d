use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Goal {
    Bulking,
    Cutting,
    Maintaining,
}

impl Goal {
    /// Daily calorie surplus (positive) or deficit (negative) applied on top of maintenance.
    #[must_use]
    pub fn calorie_offset(self) -> i64 {
        match self {
            Goal::Bulking => 500,
            Goal::Cutting => -500,
            Goal::Maintaining => 0,
        }
    }

    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Goal::Bulking => "Bulking (Calorie Surplus)",
            Goal::Cutting => "Cutting (Calorie Deficit)",
            Goal::Maintaining => "Maintaining Weight",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Goal::Bulking => "bulking",
            Goal::Cutting => "cutting",
            Goal::Maintaining => "maintaining",
        };
        f.write_str(s)
    }
}

impl FromStr for Goal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "bulking" | "bulk" => Ok(Goal::Bulking),
            "cutting" | "cut" => Ok(Goal::Cutting),
            "maintaining" | "maintain" => Ok(Goal::Maintaining),
            _ => bail!("Invalid goal '{s}'. Must be one of: bulking, cutting, maintaining"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        })
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "metric" | "kg" => Ok(UnitSystem::Metric),
            "imperial" | "lb" | "lbs" => Ok(UnitSystem::Imperial),
            _ => bail!("Invalid unit system '{s}'. Use 'metric' or 'imperial'"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Male => "male",
            Gender::Female => "female",
        })
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => bail!("Invalid gender '{s}'. Use 'male' or 'female'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightLog {
    pub date: NaiveDate,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    // Stored as entered; there is no account backend to verify against.
    pub password: String,
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub target_weight: f64,
    pub goal: Goal,
    pub target_calories: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_protein: Option<i64>,
    pub unit_system: UnitSystem,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub weight_logs: Vec<WeightLog>,
}

/// Onboarding input; targets and the weight history are derived from it.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub name: String,
    pub age: u32,
    pub weight: f64,
    pub target_weight: f64,
    pub goal: Goal,
    pub unit_system: UnitSystem,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    pub calories: f64,
    pub protein: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fats: Option<f64>,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    /// Unix timestamp in milliseconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFoodEntry {
    pub name: String,
    pub ingredients: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    pub image_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein: f64,
    #[serde(default)]
    pub total_carbs: f64,
    #[serde(default)]
    pub total_fats: f64,
    #[serde(default)]
    pub entries: Vec<FoodEntry>,
}

impl DailyLog {
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fats: 0.0,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn stats(&self) -> DailyStats {
        DailyStats {
            calories: self.total_calories,
            protein: self.total_protein,
            carbs: self.total_carbs,
            fats: self.total_fats,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DailyStats {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// Nutrition estimate returned by the food image analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodAnalysis {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
}

impl FoodAnalysis {
    #[must_use]
    pub fn into_new_entry(self, image_uri: Option<String>) -> NewFoodEntry {
        NewFoodEntry {
            name: self.name,
            ingredients: None,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            image_uri,
        }
    }
}

pub const MIN_USERNAME_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_AGE: u32 = 120;
pub const MAX_WEIGHT: f64 = 500.0;

/// Validate sign-up credentials before a profile is created.
pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        bail!("Username is required");
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        bail!("Username must be at least {MIN_USERNAME_LEN} characters");
    }
    if password.trim().is_empty() {
        bail!("Password is required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {MIN_PASSWORD_LEN} characters");
    }
    Ok(())
}

pub fn validate_weight(weight: f64, label: &str) -> Result<()> {
    if !weight.is_finite() || weight <= 0.0 || weight > MAX_WEIGHT {
        bail!("Please enter a valid {label} (0-{MAX_WEIGHT:.0})");
    }
    Ok(())
}

/// Validate onboarding data: credentials, name, age and both weights.
pub fn validate_new_user(user: &NewUser) -> Result<()> {
    validate_credentials(&user.username, &user.password)?;
    if user.name.trim().is_empty() {
        bail!("Name is required");
    }
    if user.age == 0 || user.age > MAX_AGE {
        bail!("Please enter a valid age (1-{MAX_AGE})");
    }
    validate_weight(user.weight, "weight")?;
    validate_weight(user.target_weight, "target weight")?;
    Ok(())
}

/// Validate a food entry draft: name required, nutrition values non-negative.
pub fn validate_new_food(entry: &NewFoodEntry) -> Result<()> {
    if entry.name.trim().is_empty() {
        bail!("Food name is required");
    }
    let fields = [
        ("calories", Some(entry.calories)),
        ("protein", Some(entry.protein)),
        ("carbs", entry.carbs),
        ("fats", entry.fats),
    ];
    for (label, value) in fields {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            bail!("{label} must be a valid non-negative number");
        }
    }
    Ok(())
}
