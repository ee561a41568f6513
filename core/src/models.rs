use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: &str = "1.0.0";
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;

pub const MAX_WEIGHT_KG: f64 = 300.0;
pub const MAX_MUSCLE_MASS_KG: f64 = 100.0;
pub const MIN_HEIGHT_CM: f64 = 100.0;
pub const MAX_HEIGHT_CM: f64 = 250.0;

// --- Persisted document ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRecord {
    pub id: String,
    pub date: NaiveDate,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub muscle_mass: Option<f64>,
    pub bmi: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightGoal {
    pub id: String,
    pub target_weight: f64,
    /// Weight snapshot taken when the goal was created.
    #[serde(rename = "currentWeight")]
    pub starting_weight: f64,
    pub start_date: NaiveDate,
    pub created_at: String,
    pub updated_at: String,
    pub is_achieved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Light => f.write_str("light"),
            Theme::Dark => f.write_str("dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => bail!("Invalid theme '{s}'. Use 'light' or 'dark'"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub notifications: bool,
    /// Body height in cm, only used for BMI.
    pub height: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            notifications: false,
            height: DEFAULT_HEIGHT_CM,
        }
    }
}

/// The single aggregate persisted under the storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredData {
    pub weight_records: Vec<WeightRecord>,
    pub weight_goal: Option<WeightGoal>,
    pub settings: Settings,
    pub version: String,
}

impl Default for StoredData {
    fn default() -> Self {
        Self {
            weight_records: Vec::new(),
            weight_goal: None,
            settings: Settings::default(),
            version: CURRENT_VERSION.to_string(),
        }
    }
}

// --- Typed inputs ---

#[derive(Debug, Clone)]
pub struct RecordInput {
    pub date: NaiveDate,
    pub weight: f64,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
}

impl RecordInput {
    pub fn validate(&self) -> Result<()> {
        validate_weight(self.weight)?;
        if let Some(pct) = self.body_fat_percentage {
            if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
                bail!("Body fat percentage must be between 0 and 100");
            }
        }
        if let Some(mass) = self.muscle_mass {
            if !mass.is_finite() || mass <= 0.0 {
                bail!("Muscle mass must be greater than 0");
            }
            if mass > MAX_MUSCLE_MASS_KG {
                bail!("Muscle mass must be at most {MAX_MUSCLE_MASS_KG} kg");
            }
        }
        Ok(())
    }
}

impl From<&WeightRecord> for RecordInput {
    fn from(r: &WeightRecord) -> Self {
        Self {
            date: r.date,
            weight: r.weight,
            body_fat_percentage: r.body_fat_percentage,
            muscle_mass: r.muscle_mass,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoalInput {
    pub target_weight: f64,
    /// Falls back to the latest recorded weight when absent.
    pub starting_weight: Option<f64>,
}

impl GoalInput {
    pub fn validate(&self) -> Result<()> {
        validate_weight(self.target_weight)?;
        if let Some(start) = self.starting_weight {
            validate_weight(start)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub height: Option<f64>,
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
}

impl SettingsUpdate {
    pub fn validate(&self) -> Result<()> {
        if let Some(h) = self.height {
            validate_height(h)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.height.is_none() && self.theme.is_none() && self.notifications.is_none()
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(h) = self.height {
            settings.height = h;
        }
        if let Some(t) = self.theme {
            settings.theme = t;
        }
        if let Some(n) = self.notifications {
            settings.notifications = n;
        }
    }
}

pub fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || weight <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    if weight > MAX_WEIGHT_KG {
        bail!("Weight must be at most {MAX_WEIGHT_KG} kg");
    }
    Ok(())
}

pub fn validate_height(height: f64) -> Result<()> {
    if !height.is_finite() || !(MIN_HEIGHT_CM..=MAX_HEIGHT_CM).contains(&height) {
        bail!("Height must be between {MIN_HEIGHT_CM} and {MAX_HEIGHT_CM} cm");
    }
    Ok(())
}

// --- Derived views ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimePeriod {
    Week,
    Month,
    HalfYear,
    Year,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 4] = [
        TimePeriod::Week,
        TimePeriod::Month,
        TimePeriod::HalfYear,
        TimePeriod::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimePeriod::Week => "last 7 days",
            TimePeriod::Month => "last month",
            TimePeriod::HalfYear => "last 6 months",
            TimePeriod::Year => "last year",
        }
    }
}

impl FromStr for TimePeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "week" | "w" | "7d" => Ok(TimePeriod::Week),
            "month" | "m" | "1m" => Ok(TimePeriod::Month),
            "half-year" | "halfyear" | "6m" => Ok(TimePeriod::HalfYear),
            "year" | "y" | "1y" => Ok(TimePeriod::Year),
            _ => bail!("Invalid period '{s}'. Use week, month, half-year, or year"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightStats {
    pub period: TimePeriod,
    pub average_weight: f64,
    pub weight_change: f64,
    pub weight_change_percentage: f64,
    pub max_weight: f64,
    pub min_weight: f64,
    pub total_records: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for WeightTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeightTrend::Increasing => f.write_str("increasing"),
            WeightTrend::Decreasing => f.write_str("decreasing"),
            WeightTrend::Stable => f.write_str("stable"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    ObeseClass1,
    ObeseClass2,
    ObeseClass3,
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::Normal => "normal",
            BmiCategory::ObeseClass1 => "obese (class I)",
            BmiCategory::ObeseClass2 => "obese (class II)",
            BmiCategory::ObeseClass3 => "obese (class III)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_mass: Option<f64>,
    pub bmi: f64,
}

impl From<&WeightRecord> for ChartPoint {
    fn from(r: &WeightRecord) -> Self {
        Self {
            date: r.date,
            weight: r.weight,
            body_fat_percentage: r.body_fat_percentage,
            muscle_mass: r.muscle_mass,
            bmi: r.bmi,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStatus {
    pub goal: WeightGoal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weight: Option<f64>,
    pub progress_pct: f64,
    pub remaining_kg: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<WeightRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi_category: Option<BmiCategory>,
    pub trend: WeightTrend,
    pub week: WeightStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalStatus>,
    pub total_records: usize,
}
