use anyhow::{Result, bail};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use heft_core::calc::{bmi_category, format_date};
use heft_core::models::{RecordInput, TimePeriod, WeightRecord};
use heft_core::service::WeightService;

use super::helpers::{fmt_opt, no_neg_zero, parse_date, resolve_record, short_id};

const LBS_PER_KG: f64 = 2.20462;
const KG_PER_LB: f64 = 0.453_592;

/// Measurements as typed on the command line, before unit conversion.
pub(crate) struct Measurements {
    pub weight: Option<f64>,
    pub unit: String,
    pub date: Option<String>,
    pub body_fat: Option<f64>,
    pub muscle: Option<f64>,
}

fn to_kg(value: f64, unit: &str) -> Result<f64> {
    match unit.to_lowercase().as_str() {
        "kg" => Ok(value),
        "lbs" | "lb" => {
            let kg = no_neg_zero(value * KG_PER_LB);
            eprintln!("Converting {value:.1} lbs → {kg:.2} kg");
            Ok(kg)
        }
        _ => bail!("Invalid unit '{unit}'. Use 'kg' or 'lbs'"),
    }
}

fn print_record(verb: &str, r: &WeightRecord) {
    let lbs = r.weight * LBS_PER_KG;
    println!(
        "{verb} {:.1} kg ({lbs:.1} lbs) for {}  [{}]",
        r.weight,
        format_date(r.date),
        short_id(&r.id)
    );
    println!("  BMI: {:.1} ({})", r.bmi, bmi_category(r.bmi));
    if let Some(pct) = r.body_fat_percentage {
        println!("  Body fat: {pct:.1}%");
    }
    if let Some(mass) = r.muscle_mass {
        println!("  Muscle mass: {mass:.1} kg");
    }
}

pub(crate) fn cmd_log(svc: &WeightService, m: Measurements, json: bool) -> Result<()> {
    let Some(value) = m.weight else {
        bail!("Weight is required");
    };
    let input = RecordInput {
        date: parse_date(m.date)?,
        weight: to_kg(value, &m.unit)?,
        body_fat_percentage: m.body_fat,
        muscle_mass: m.muscle,
    };

    let record = svc.add_record(&input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record("Logged", &record);
    }
    Ok(())
}

/// Change any subset of a record's fields; the rest keep their values.
pub(crate) fn cmd_edit(
    svc: &WeightService,
    id: &str,
    m: Measurements,
    clear_body_fat: bool,
    clear_muscle: bool,
    json: bool,
) -> Result<()> {
    let existing = resolve_record(svc, id)?;

    let weight = match m.weight {
        Some(v) => to_kg(v, &m.unit)?,
        None => existing.weight,
    };
    let date = match m.date {
        Some(d) => parse_date(Some(d))?,
        None => existing.date,
    };
    let body_fat_percentage = if clear_body_fat {
        None
    } else {
        m.body_fat.or(existing.body_fat_percentage)
    };
    let muscle_mass = if clear_muscle {
        None
    } else {
        m.muscle.or(existing.muscle_mass)
    };

    let record = svc.update_record(
        &existing.id,
        &RecordInput {
            date,
            weight,
            body_fat_percentage,
            muscle_mass,
        },
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print_record("Updated", &record);
    }
    Ok(())
}

pub(crate) fn cmd_show(svc: &WeightService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let entries: Vec<WeightRecord> = svc
        .records()
        .into_iter()
        .filter(|r| r.date == date)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No weight entry for {}", date.format("%Y-%m-%d"));
    } else {
        for r in &entries {
            print_record("Weighed", r);
        }
    }
    Ok(())
}

pub(crate) fn cmd_history(
    svc: &WeightService,
    period: Option<TimePeriod>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let mut entries = match period {
        Some(p) => svc.records_in_period(p, today),
        None => svc.records(),
    };
    if let Some(n) = limit {
        entries.truncate(n);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No weight entries found. Use `heft log` to record your weight.");
    } else {
        #[derive(Tabled)]
        struct WeightRow {
            #[tabled(rename = "ID")]
            id: String,
            #[tabled(rename = "Date")]
            date: String,
            #[tabled(rename = "Weight (kg)")]
            kg: String,
            #[tabled(rename = "Weight (lbs)")]
            lbs: String,
            #[tabled(rename = "Body fat")]
            body_fat: String,
            #[tabled(rename = "Muscle (kg)")]
            muscle: String,
            #[tabled(rename = "BMI")]
            bmi: String,
        }

        let rows: Vec<WeightRow> = entries
            .iter()
            .map(|e| WeightRow {
                id: short_id(&e.id).to_string(),
                date: format_date(e.date),
                kg: format!("{:.1}", e.weight),
                lbs: format!("{:.1}", e.weight * LBS_PER_KG),
                body_fat: fmt_opt(e.body_fat_percentage, "%"),
                muscle: fmt_opt(e.muscle_mass, ""),
                bmi: format!("{:.1}", e.bmi),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..7)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }
    Ok(())
}

pub(crate) fn cmd_delete(svc: &WeightService, id: &str, json: bool) -> Result<()> {
    let record = resolve_record(svc, id)?;
    svc.delete_record(&record.id)?;

    if json {
        println!("{}", serde_json::json!({ "deleted": record.id }));
    } else {
        println!(
            "Deleted weight entry {} ({})",
            short_id(&record.id),
            format_date(record.date)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_kg() {
        assert_eq!(to_kg(70.0, "kg").unwrap(), 70.0);
        assert_eq!(to_kg(70.0, "KG").unwrap(), 70.0);
        assert!((to_kg(100.0, "lbs").unwrap() - 45.3592).abs() < 1e-9);
        assert!(to_kg(70.0, "stone").is_err());
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let svc = WeightService::new_in_memory().unwrap();
        let rec = svc
            .add_record(&RecordInput {
                date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                weight: 70.0,
                body_fat_percentage: Some(20.0),
                muscle_mass: Some(50.0),
            })
            .unwrap();

        cmd_edit(
            &svc,
            &rec.id,
            Measurements {
                weight: Some(69.0),
                unit: "kg".to_string(),
                date: None,
                body_fat: None,
                muscle: None,
            },
            false,
            true,
            true,
        )
        .unwrap();

        let updated = svc.record(&rec.id).unwrap();
        assert_eq!(updated.weight, 69.0);
        assert_eq!(updated.date, rec.date);
        assert_eq!(updated.body_fat_percentage, Some(20.0));
        assert_eq!(updated.muscle_mass, None);
    }
}
