//! Versioned JSON document persisted under a single key.
//!
//! Every mutation is a full read-modify-write of the document. There is no
//! locking; two processes writing at once means the last write wins.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::calc::calculate_bmi;
use crate::db::KeyValueStore;
use crate::models::{
    CURRENT_VERSION, RecordInput, Settings, SettingsUpdate, StoredData, WeightGoal, WeightRecord,
    validate_height, validate_weight,
};

pub const STORAGE_KEY: &str = "weight-management-app";

pub struct DocumentStore<S> {
    kv: S,
}

impl<S: KeyValueStore> DocumentStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Load the document, falling back to defaults on any failure.
    pub fn load(&self) -> StoredData {
        match self.try_load() {
            Ok(data) => data,
            Err(err) => {
                error!("failed to read stored data: {err:#}");
                StoredData::default()
            }
        }
    }

    /// Like [`load`](Self::load), but read failures from the backing store are
    /// returned instead of replaced with defaults. Missing, unparsable, or
    /// mismatched-version documents still yield the default document.
    pub fn try_load(&self) -> Result<StoredData> {
        let Some(raw) = self
            .kv
            .get(STORAGE_KEY)
            .context("Failed to read stored data")?
        else {
            debug!("no stored data, using defaults");
            return Ok(StoredData::default());
        };
        Ok(parse_document(&raw))
    }

    pub fn save(&self, data: &StoredData) -> Result<()> {
        let mut stamped = data.clone();
        stamped.version = CURRENT_VERSION.to_string();
        let payload = serde_json::to_string(&stamped)?;
        self.kv
            .set(STORAGE_KEY, &payload)
            .context("Failed to save data")?;
        debug!(
            records = stamped.weight_records.len(),
            has_goal = stamped.weight_goal.is_some(),
            "saved data"
        );
        Ok(())
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut StoredData) -> T) -> Result<T> {
        let mut data = self.try_load()?;
        let out = f(&mut data);
        self.save(&data)?;
        Ok(out)
    }

    /// Insert or replace (by id) a record, keeping records sorted newest first.
    pub fn save_record(&self, record: WeightRecord) -> Result<()> {
        self.mutate(|data| upsert_record(&mut data.weight_records, record))
    }

    pub fn delete_record(&self, id: &str) -> Result<bool> {
        self.mutate(|data| {
            let before = data.weight_records.len();
            data.weight_records.retain(|r| r.id != id);
            data.weight_records.len() != before
        })
    }

    pub fn save_goal(&self, goal: WeightGoal) -> Result<()> {
        self.mutate(|data| data.weight_goal = Some(goal))
    }

    pub fn delete_goal(&self) -> Result<bool> {
        self.mutate(|data| data.weight_goal.take().is_some())
    }

    pub fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings> {
        self.mutate(|data| {
            update.apply(&mut data.settings);
            data.settings.clone()
        })
    }

    pub fn clear_all(&self) -> Result<bool> {
        self.kv
            .remove(STORAGE_KEY)
            .context("Failed to clear stored data")
    }

    pub fn export_json(&self) -> Result<String> {
        let data = self.try_load()?;
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Replace the stored document with `json`. Records are validated, their
    /// BMI recomputed from the imported height, and re-sorted before anything
    /// is written.
    pub fn import_json(&self, json: &str) -> Result<StoredData> {
        let mut data: StoredData =
            serde_json::from_str(json).map_err(|e| anyhow!("Invalid data format: {e}"))?;
        validate_height(data.settings.height).context("Invalid settings")?;
        for record in &data.weight_records {
            RecordInput::from(record)
                .validate()
                .with_context(|| format!("Invalid record {} ({})", record.id, record.date))?;
        }
        if let Some(goal) = &data.weight_goal {
            validate_weight(goal.target_weight).context("Invalid goal target weight")?;
            validate_weight(goal.starting_weight).context("Invalid goal starting weight")?;
        }
        let height = data.settings.height;
        for record in &mut data.weight_records {
            record.bmi = calculate_bmi(record.weight, height);
        }
        sort_records(&mut data.weight_records);
        self.save(&data)?;
        data.version = CURRENT_VERSION.to_string();
        Ok(data)
    }

    pub fn export_records_csv(&self) -> Result<String> {
        let data = self.try_load()?;
        records_to_csv(&data.weight_records)
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    version: Option<String>,
}

fn parse_document(raw: &str) -> StoredData {
    let probe: VersionProbe = match serde_json::from_str(raw) {
        Ok(p) => p,
        Err(err) => {
            warn!("stored data is not valid JSON, using defaults: {err}");
            return StoredData::default();
        }
    };
    if probe.version.as_deref() != Some(CURRENT_VERSION) {
        warn!(
            found = probe.version.as_deref().unwrap_or("<none>"),
            expected = CURRENT_VERSION,
            "data version mismatch, using defaults"
        );
        return StoredData::default();
    }
    match serde_json::from_str(raw) {
        Ok(data) => data,
        Err(err) => {
            warn!("failed to parse stored data, using defaults: {err}");
            StoredData::default()
        }
    }
}

pub fn upsert_record(records: &mut Vec<WeightRecord>, record: WeightRecord) {
    if let Some(existing) = records.iter_mut().find(|r| r.id == record.id) {
        *existing = record;
    } else {
        records.push(record);
    }
    sort_records(records);
}

/// Newest first; records sharing a date keep their relative order.
pub fn sort_records(records: &mut [WeightRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    weight_kg: f64,
    body_fat_pct: Option<f64>,
    muscle_mass_kg: Option<f64>,
    bmi: f64,
    id: &'a str,
}

pub fn records_to_csv(records: &[WeightRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in records {
        wtr.serialize(CsvRow {
            date: r.date.format("%Y-%m-%d").to_string(),
            weight_kg: r.weight,
            body_fat_pct: r.body_fat_percentage,
            muscle_mass_kg: r.muscle_mass,
            bmi: r.bmi,
            id: &r.id,
        })?;
    }
    let bytes = wtr.into_inner().context("Failed to flush CSV")?;
    Ok(String::from_utf8(bytes)?)
}
