use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use heft_core::models::{TimePeriod, WeightRecord};
use heft_core::service::WeightService;

/// Characters of a record id shown in tables and accepted as a prefix.
pub(crate) const SHORT_ID_LEN: usize = 8;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

pub(crate) fn parse_period(s: &str) -> Result<TimePeriod> {
    s.parse()
}

/// Find a record by full id or unique id prefix.
pub(crate) fn resolve_record(svc: &WeightService, id: &str) -> Result<WeightRecord> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Record id must not be empty");
    }
    let mut matches: Vec<WeightRecord> = svc
        .records()
        .into_iter()
        .filter(|r| r.id.starts_with(id))
        .collect();
    if let Some(exact) = matches.iter().find(|r| r.id == id) {
        return Ok(exact.clone());
    }
    match matches.len() {
        0 => bail!("No weight record matches '{id}'"),
        1 => Ok(matches.swap_remove(0)),
        n => bail!("'{id}' matches {n} records; use more characters"),
    }
}

pub(crate) fn short_id(id: &str) -> &str {
    id.char_indices()
        .nth(SHORT_ID_LEN)
        .map_or(id, |(i, _)| &id[..i])
}

pub(crate) fn fmt_opt(v: Option<f64>, unit: &str) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}{unit}"))
}

pub(crate) fn signed(v: f64) -> String {
    let v = no_neg_zero(v);
    if v > 0.0 {
        format!("+{v:.1}")
    } else {
        format!("{v:.1}")
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heft_core::models::RecordInput;

    fn svc_with(dates: &[u32]) -> (WeightService, Vec<WeightRecord>) {
        let svc = WeightService::new_in_memory().unwrap();
        let recs = dates
            .iter()
            .map(|d| {
                svc.add_record(&RecordInput {
                    date: NaiveDate::from_ymd_opt(2025, 1, *d).unwrap(),
                    weight: 70.0,
                    body_fat_percentage: None,
                    muscle_mass: None,
                })
                .unwrap()
            })
            .collect();
        (svc, recs)
    }

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_resolve_record_by_prefix() {
        let (svc, recs) = svc_with(&[1, 2]);
        let target = &recs[0];
        let found = resolve_record(&svc, short_id(&target.id)).unwrap();
        assert_eq!(found.id, target.id);
        let found = resolve_record(&svc, &target.id).unwrap();
        assert_eq!(found.id, target.id);
    }

    #[test]
    fn test_resolve_record_missing() {
        let (svc, _) = svc_with(&[1]);
        assert!(resolve_record(&svc, "zzzz").is_err());
        assert!(resolve_record(&svc, "  ").is_err());
    }

    #[test]
    fn test_resolve_record_ambiguous() {
        let svc = WeightService::new_in_memory().unwrap();
        let doc = r#"{
            "weightRecords": [
                {"id": "abc1", "date": "2025-01-02", "weight": 70.0, "bmi": 24.2,
                 "createdAt": "", "updatedAt": ""},
                {"id": "abc2", "date": "2025-01-01", "weight": 70.5, "bmi": 24.4,
                 "createdAt": "", "updatedAt": ""}
            ],
            "weightGoal": null,
            "settings": {"theme": "light", "notifications": false, "height": 170},
            "version": "1.0.0"
        }"#;
        svc.import_json(doc).unwrap();
        assert!(resolve_record(&svc, "abc").is_err());
        assert_eq!(resolve_record(&svc, "abc2").unwrap().weight, 70.5);
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
    }

    #[test]
    fn test_signed() {
        assert_eq!(signed(1.26), "+1.3");
        assert_eq!(signed(-0.5), "-0.5");
        assert_eq!(signed(-0.0), "0.0");
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("boom"), r#"{"error":"boom"}"#);
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }
}
