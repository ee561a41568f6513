use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use tracing::info;

use crate::calc::{
    bmi_category, calculate_bmi, calculate_goal_progress, calculate_remaining_weight,
    calculate_stats_at, calculate_weight_trend, chart_series, generate_id,
};
use crate::db::{Database, KeyValueStore};
use crate::models::{
    ChartPoint, GoalInput, GoalStatus, RecordInput, Settings, SettingsUpdate, StoredData, Summary,
    TimePeriod, WeightGoal, WeightRecord, WeightStats, WeightTrend, validate_weight,
};
use crate::store::DocumentStore;

/// Entry point for front ends. Owns the store; every operation reloads the
/// document rather than caching it.
pub struct WeightService<S = Database> {
    store: DocumentStore<S>,
}

impl WeightService<Database> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::with_store(Database::open(path)?))
    }

    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::with_store(Database::open_in_memory()?))
    }
}

impl<S: KeyValueStore> WeightService<S> {
    pub fn with_store(kv: S) -> Self {
        Self {
            store: DocumentStore::new(kv),
        }
    }

    // --- Records ---

    /// All records, newest first.
    pub fn records(&self) -> Vec<WeightRecord> {
        self.store.load().weight_records
    }

    pub fn records_in_period(&self, period: TimePeriod, today: NaiveDate) -> Vec<WeightRecord> {
        crate::calc::filter_records_by_period(&self.records(), period, today)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn record(&self, id: &str) -> Result<WeightRecord> {
        self.records()
            .into_iter()
            .find(|r| r.id == id)
            .with_context(|| format!("Weight record '{id}' not found"))
    }

    pub fn latest_record(&self) -> Option<WeightRecord> {
        self.records().into_iter().next()
    }

    pub fn add_record(&self, input: &RecordInput) -> Result<WeightRecord> {
        input.validate()?;
        let data = self.store.try_load()?;
        let now = Local::now().to_rfc3339();
        let record = WeightRecord {
            id: generate_id(),
            date: input.date,
            weight: input.weight,
            body_fat_percentage: input.body_fat_percentage,
            muscle_mass: input.muscle_mass,
            bmi: calculate_bmi(input.weight, data.settings.height),
            created_at: now.clone(),
            updated_at: now,
        };
        self.store.save_record(record.clone())?;
        info!(id = %record.id, date = %record.date, weight = record.weight, "added record");
        self.check_goal_achieved()?;
        Ok(record)
    }

    /// Replace a record's measurements. The id and creation time are kept and
    /// BMI is recomputed from the current height.
    pub fn update_record(&self, id: &str, input: &RecordInput) -> Result<WeightRecord> {
        input.validate()?;
        let data = self.store.try_load()?;
        let Some(existing) = data.weight_records.iter().find(|r| r.id == id) else {
            bail!("Weight record '{id}' not found");
        };
        let record = WeightRecord {
            id: existing.id.clone(),
            date: input.date,
            weight: input.weight,
            body_fat_percentage: input.body_fat_percentage,
            muscle_mass: input.muscle_mass,
            bmi: calculate_bmi(input.weight, data.settings.height),
            created_at: existing.created_at.clone(),
            updated_at: Local::now().to_rfc3339(),
        };
        self.store.save_record(record.clone())?;
        info!(id = %record.id, "updated record");
        self.check_goal_achieved()?;
        Ok(record)
    }

    pub fn delete_record(&self, id: &str) -> Result<()> {
        if !self.store.delete_record(id)? {
            bail!("Weight record '{id}' not found");
        }
        info!(id, "deleted record");
        Ok(())
    }

    // --- Goal ---

    pub fn goal(&self) -> Option<WeightGoal> {
        self.store.load().weight_goal
    }

    /// Create a new goal, replacing any existing one.
    pub fn set_goal(&self, input: &GoalInput) -> Result<WeightGoal> {
        input.validate()?;
        let starting_weight = match input.starting_weight {
            Some(w) => w,
            None => self
                .latest_record()
                .map(|r| r.weight)
                .context("No starting weight given and no records logged yet")?,
        };
        let now = Local::now();
        let stamp = now.to_rfc3339();
        let goal = WeightGoal {
            id: generate_id(),
            target_weight: input.target_weight,
            starting_weight,
            start_date: now.date_naive(),
            created_at: stamp.clone(),
            updated_at: stamp,
            is_achieved: false,
            achieved_at: None,
        };
        self.store.save_goal(goal.clone())?;
        info!(target_kg = goal.target_weight, start_kg = goal.starting_weight, "set goal");
        Ok(goal)
    }

    /// Change the target of the current goal, keeping its starting snapshot.
    pub fn update_goal_target(&self, target_weight: f64) -> Result<WeightGoal> {
        validate_weight(target_weight)?;
        let mut goal = self.goal().context("No goal set")?;
        goal.target_weight = target_weight;
        goal.updated_at = Local::now().to_rfc3339();
        self.store.save_goal(goal.clone())?;
        Ok(goal)
    }

    pub fn mark_goal_achieved(&self) -> Result<WeightGoal> {
        let mut goal = self.goal().context("No goal set")?;
        if !goal.is_achieved {
            let now = Local::now().to_rfc3339();
            goal.is_achieved = true;
            goal.achieved_at = Some(now.clone());
            goal.updated_at = now;
            self.store.save_goal(goal.clone())?;
            info!("goal achieved");
        }
        Ok(goal)
    }

    pub fn clear_goal(&self) -> Result<bool> {
        self.store.delete_goal()
    }

    pub fn goal_status(&self) -> Option<GoalStatus> {
        let data = self.store.load();
        goal_status(&data)
    }

    /// Flags the goal once the latest record reaches it. Never un-flags.
    fn check_goal_achieved(&self) -> Result<()> {
        let data = self.store.try_load()?;
        let Some(goal) = &data.weight_goal else {
            return Ok(());
        };
        if goal.is_achieved {
            return Ok(());
        }
        if let Some(latest) = data.weight_records.first() {
            if goal_reached(goal, latest.weight) {
                self.mark_goal_achieved()?;
            }
        }
        Ok(())
    }

    // --- Settings ---

    pub fn settings(&self) -> Settings {
        self.store.load().settings
    }

    /// Height changes only affect records written afterwards.
    pub fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        update.validate()?;
        self.store.update_settings(update)
    }

    // --- Derived views ---

    pub fn stats(&self, period: TimePeriod, today: NaiveDate) -> WeightStats {
        calculate_stats_at(&self.records(), period, today)
    }

    pub fn trend(&self) -> WeightTrend {
        calculate_weight_trend(&self.records())
    }

    pub fn chart(&self, period: TimePeriod, today: NaiveDate) -> Vec<ChartPoint> {
        chart_series(&self.records(), period, today)
    }

    pub fn summary(&self, today: NaiveDate) -> Summary {
        let data = self.store.load();
        let latest = data.weight_records.first().cloned();
        Summary {
            bmi_category: latest.as_ref().map(|r| bmi_category(r.bmi)),
            trend: calculate_weight_trend(&data.weight_records),
            week: calculate_stats_at(&data.weight_records, TimePeriod::Week, today),
            goal: goal_status(&data),
            total_records: data.weight_records.len(),
            latest,
        }
    }

    // --- Import / Export ---

    pub fn export_json(&self) -> Result<String> {
        self.store.export_json()
    }

    pub fn export_csv(&self) -> Result<String> {
        self.store.export_records_csv()
    }

    pub fn import_json(&self, json: &str) -> Result<StoredData> {
        let data = self.store.import_json(json)?;
        info!(records = data.weight_records.len(), "imported data");
        Ok(data)
    }

    pub fn clear_all(&self) -> Result<bool> {
        self.store.clear_all()
    }
}

/// A goal that starts at its target reports full progress from the outset,
/// so it only counts as reached once the weight is actually back on target.
fn goal_reached(goal: &WeightGoal, current: f64) -> bool {
    if (goal.starting_weight - goal.target_weight).abs() < f64::EPSILON {
        return calculate_remaining_weight(current, goal.target_weight) < f64::EPSILON;
    }
    calculate_goal_progress(current, goal.target_weight, goal.starting_weight) >= 100.0
}

fn goal_status(data: &StoredData) -> Option<GoalStatus> {
    let goal = data.weight_goal.clone()?;
    let current_weight = data.weight_records.first().map(|r| r.weight);
    let current = current_weight.unwrap_or(goal.starting_weight);
    Some(GoalStatus {
        progress_pct: calculate_goal_progress(current, goal.target_weight, goal.starting_weight),
        remaining_kg: calculate_remaining_weight(current, goal.target_weight),
        current_weight,
        goal,
    })
}
