use std::path::Path;

use anyhow::{Context, Result, bail};

use heft_core::service::WeightService;

pub(crate) fn cmd_export(
    svc: &WeightService,
    csv: bool,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let payload = if csv {
        svc.export_csv()?
    } else {
        svc.export_json()?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &payload)
                .with_context(|| format!("Failed to write export file: {}", path.display()))?;
            if json {
                println!("{}", serde_json::json!({ "exported": path.display().to_string() }));
            } else {
                println!("Exported to {}", path.display());
            }
        }
        None => print!("{payload}"),
    }
    Ok(())
}

pub(crate) fn cmd_import(svc: &WeightService, file: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let data = svc.import_json(&content)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "records_imported": data.weight_records.len(),
                "goal_imported": data.weight_goal.is_some(),
            })
        );
    } else {
        println!("Imported {} weight records", data.weight_records.len());
        if data.weight_goal.is_some() {
            println!("Imported goal");
        }
    }
    Ok(())
}

pub(crate) fn cmd_reset(svc: &WeightService, yes: bool, json: bool) -> Result<()> {
    if !yes {
        bail!("This deletes all records, the goal, and settings. Re-run with --yes to confirm");
    }

    let cleared = svc.clear_all()?;

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else if cleared {
        println!("All data deleted");
    } else {
        eprintln!("Nothing to delete");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use heft_core::models::RecordInput;

    #[test]
    fn test_export_then_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let src = WeightService::new_in_memory().unwrap();
        src.add_record(&RecordInput {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            weight: 70.5,
            body_fat_percentage: Some(15.8),
            muscle_mass: Some(58.2),
        })
        .unwrap();
        cmd_export(&src, false, Some(&path), true).unwrap();

        let dst = WeightService::new_in_memory().unwrap();
        cmd_import(&dst, &path, true).unwrap();
        assert_eq!(dst.records(), src.records());
    }

    #[test]
    fn test_import_missing_file() {
        let svc = WeightService::new_in_memory().unwrap();
        assert!(cmd_import(&svc, Path::new("/nonexistent/heft.json"), false).is_err());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let svc = WeightService::new_in_memory().unwrap();
        svc.add_record(&RecordInput {
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            weight: 70.0,
            body_fat_percentage: None,
            muscle_mass: None,
        })
        .unwrap();
        assert!(cmd_reset(&svc, false, true).is_err());
        assert_eq!(svc.records().len(), 1);
        cmd_reset(&svc, true, true).unwrap();
        assert!(svc.records().is_empty());
    }
}
