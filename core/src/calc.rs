//! Pure derived-metric helpers: BMI, period statistics, goal progress, trend.

use chrono::{Duration, Months, NaiveDate};
use uuid::Uuid;

use crate::models::{BmiCategory, ChartPoint, TimePeriod, WeightRecord, WeightStats, WeightTrend};

/// Trend looks at this many of the most recent records.
const TREND_WINDOW: usize = 5;
/// Weight deltas below this (kg) count as stable.
const TREND_THRESHOLD_KG: f64 = 0.5;

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// BMI from weight (kg) and height (cm), rounded to one decimal. Returns 0
/// when either input is non-positive.
pub fn calculate_bmi(weight: f64, height: f64) -> f64 {
    if height <= 0.0 || weight <= 0.0 {
        return 0.0;
    }
    let meters = height / 100.0;
    round1(weight / (meters * meters))
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::ObeseClass1
    } else if bmi < 35.0 {
        BmiCategory::ObeseClass2
    } else {
        BmiCategory::ObeseClass3
    }
}

/// Inclusive `(start, end)` bounds of `period` ending on `today`.
pub fn date_range(period: TimePeriod, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = match period {
        TimePeriod::Week => today.checked_sub_signed(Duration::days(7)),
        TimePeriod::Month => today.checked_sub_months(Months::new(1)),
        TimePeriod::HalfYear => today.checked_sub_months(Months::new(6)),
        TimePeriod::Year => today.checked_sub_months(Months::new(12)),
    };
    (start.unwrap_or(NaiveDate::MIN), today)
}

pub fn filter_records_by_period(
    records: &[WeightRecord],
    period: TimePeriod,
    today: NaiveDate,
) -> Vec<&WeightRecord> {
    let (start, end) = date_range(period, today);
    records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .collect()
}

pub fn calculate_stats_at(
    records: &[WeightRecord],
    period: TimePeriod,
    today: NaiveDate,
) -> WeightStats {
    let (start_date, end_date) = date_range(period, today);
    let mut filtered = filter_records_by_period(records, period, today);

    if filtered.is_empty() {
        return WeightStats {
            period,
            average_weight: 0.0,
            weight_change: 0.0,
            weight_change_percentage: 0.0,
            max_weight: 0.0,
            min_weight: 0.0,
            total_records: 0,
            start_date,
            end_date,
        };
    }

    let count = filtered.len();
    let sum: f64 = filtered.iter().map(|r| r.weight).sum();
    #[allow(clippy::cast_precision_loss)]
    let average_weight = round1(sum / count as f64);
    let max_weight = filtered
        .iter()
        .map(|r| r.weight)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_weight = filtered
        .iter()
        .map(|r| r.weight)
        .fold(f64::INFINITY, f64::min);

    filtered.sort_by_key(|r| r.date);
    let oldest = filtered.first().map_or(0.0, |r| r.weight);
    let newest = filtered.last().map_or(0.0, |r| r.weight);
    let weight_change = round1(newest - oldest);
    let weight_change_percentage = if oldest > 0.0 {
        (weight_change / oldest * 1000.0).round() / 10.0
    } else {
        0.0
    };

    WeightStats {
        period,
        average_weight,
        weight_change,
        weight_change_percentage,
        max_weight,
        min_weight,
        total_records: count,
        start_date,
        end_date,
    }
}

/// Share of the start→target distance already covered, clamped to `[0, 100]`.
pub fn calculate_goal_progress(current: f64, target: f64, start: f64) -> f64 {
    if (start - target).abs() < f64::EPSILON {
        return 100.0;
    }
    let progress = (current - start) / (target - start) * 100.0;
    progress.clamp(0.0, 100.0)
}

pub fn calculate_remaining_weight(current: f64, target: f64) -> f64 {
    round1((target - current).abs())
}

pub fn calculate_weight_trend(records: &[WeightRecord]) -> WeightTrend {
    if records.len() < 2 {
        return WeightTrend::Stable;
    }

    let mut sorted: Vec<&WeightRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.date);
    let recent = &sorted[sorted.len().saturating_sub(TREND_WINDOW)..];

    let (Some(first), Some(last)) = (recent.first(), recent.last()) else {
        return WeightTrend::Stable;
    };
    let difference = last.weight - first.weight;

    if difference.abs() < TREND_THRESHOLD_KG {
        WeightTrend::Stable
    } else if difference > 0.0 {
        WeightTrend::Increasing
    } else {
        WeightTrend::Decreasing
    }
}

/// Records of `period` in ascending date order, ready for plotting.
pub fn chart_series(
    records: &[WeightRecord],
    period: TimePeriod,
    today: NaiveDate,
) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = filter_records_by_period(records, period, today)
        .into_iter()
        .map(ChartPoint::from)
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%m/%d").to_string()
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(date: NaiveDate, weight: f64) -> WeightRecord {
        WeightRecord {
            id: generate_id(),
            date,
            weight,
            body_fat_percentage: None,
            muscle_mass: None,
            bmi: calculate_bmi(weight, 170.0),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_bmi_zero_inputs() {
        assert_eq!(calculate_bmi(0.0, 170.0), 0.0);
        assert_eq!(calculate_bmi(70.0, 0.0), 0.0);
        assert_eq!(calculate_bmi(-5.0, 170.0), 0.0);
        assert_eq!(calculate_bmi(70.0, -170.0), 0.0);
    }

    #[test]
    fn test_bmi_value() {
        assert!((calculate_bmi(70.0, 170.0) - 24.2).abs() < 1e-9);
        assert!((calculate_bmi(70.5, 170.0) - 24.4).abs() < 1e-9);
    }

    #[test]
    fn test_bmi_category_boundaries() {
        assert_eq!(bmi_category(18.4), BmiCategory::Underweight);
        assert_eq!(bmi_category(18.5), BmiCategory::Normal);
        assert_eq!(bmi_category(24.9), BmiCategory::Normal);
        assert_eq!(bmi_category(25.0), BmiCategory::ObeseClass1);
        assert_eq!(bmi_category(30.0), BmiCategory::ObeseClass2);
        assert_eq!(bmi_category(35.0), BmiCategory::ObeseClass3);
    }

    #[test]
    fn test_date_range_periods() {
        let today = d(2025, 3, 31);
        assert_eq!(date_range(TimePeriod::Week, today), (d(2025, 3, 24), today));
        // Month arithmetic clamps to the end of shorter months
        assert_eq!(date_range(TimePeriod::Month, today).0, d(2025, 2, 28));
        assert_eq!(date_range(TimePeriod::HalfYear, today).0, d(2024, 9, 30));
        assert_eq!(date_range(TimePeriod::Year, today).0, d(2024, 3, 31));
    }

    #[test]
    fn test_filter_is_inclusive() {
        let today = d(2025, 1, 15);
        let records = vec![
            rec(d(2025, 1, 16), 70.0),
            rec(today, 70.0),
            rec(d(2025, 1, 8), 71.0),
            rec(d(2025, 1, 7), 72.0),
        ];
        let filtered = filter_records_by_period(&records, TimePeriod::Week, today);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_stats_empty_period() {
        let today = d(2025, 1, 15);
        let records = vec![rec(d(2024, 1, 1), 80.0)];
        let stats = calculate_stats_at(&records, TimePeriod::Week, today);
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.average_weight, 0.0);
        assert_eq!(stats.weight_change, 0.0);
        assert_eq!(stats.max_weight, 0.0);
        assert_eq!(stats.start_date, d(2025, 1, 8));
        assert_eq!(stats.end_date, today);
    }

    #[test]
    fn test_stats_values() {
        let today = d(2025, 1, 15);
        // Stored newest-first, as the document keeps them
        let records = vec![
            rec(d(2025, 1, 14), 69.0),
            rec(d(2025, 1, 12), 70.4),
            rec(d(2025, 1, 10), 70.0),
        ];
        let stats = calculate_stats_at(&records, TimePeriod::Week, today);
        assert_eq!(stats.total_records, 3);
        assert!((stats.average_weight - 69.8).abs() < 1e-9);
        assert_eq!(stats.max_weight, 70.4);
        assert_eq!(stats.min_weight, 69.0);
        assert!((stats.weight_change - -1.0).abs() < 1e-9);
        assert!((stats.weight_change_percentage - -1.4).abs() < 1e-9);
    }

    #[test]
    fn test_goal_progress_clamps() {
        let p = calculate_goal_progress(70.0, 60.0, 80.0);
        assert!((0.0..=100.0).contains(&p));
        assert!((p - 50.0).abs() < 1e-9);
        // Moving away from the target
        assert_eq!(calculate_goal_progress(85.0, 60.0, 80.0), 0.0);
        // Overshooting the target
        assert_eq!(calculate_goal_progress(55.0, 60.0, 80.0), 100.0);
    }

    #[test]
    fn test_goal_progress_start_equals_target() {
        assert_eq!(calculate_goal_progress(50.0, 70.0, 70.0), 100.0);
        assert_eq!(calculate_goal_progress(90.0, 70.0, 70.0), 100.0);
    }

    #[test]
    fn test_goal_progress_gaining() {
        let p = calculate_goal_progress(62.0, 65.0, 60.0);
        assert!((p - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_remaining_weight_direction_independent() {
        assert!((calculate_remaining_weight(70.5, 68.0) - 2.5).abs() < 1e-9);
        assert!((calculate_remaining_weight(68.0, 70.5) - 2.5).abs() < 1e-9);
        assert_eq!(calculate_remaining_weight(68.0, 68.0), 0.0);
    }

    #[test]
    fn test_trend_decreasing() {
        let weights = [70.0, 69.8, 69.5, 69.2, 69.0];
        let records: Vec<WeightRecord> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| rec(d(2025, 1, 1) + Duration::days(i as i64), *w))
            .collect();
        assert_eq!(calculate_weight_trend(&records), WeightTrend::Decreasing);
    }

    #[test]
    fn test_trend_stable_small_delta() {
        let records = vec![rec(d(2025, 1, 1), 70.0), rec(d(2025, 1, 2), 70.1)];
        assert_eq!(calculate_weight_trend(&records), WeightTrend::Stable);
    }

    #[test]
    fn test_trend_single_record() {
        assert_eq!(
            calculate_weight_trend(&[rec(d(2025, 1, 1), 70.0)]),
            WeightTrend::Stable
        );
        assert_eq!(calculate_weight_trend(&[]), WeightTrend::Stable);
    }

    #[test]
    fn test_trend_uses_last_five_only() {
        // Big drop early on, then a steady climb over the last five
        let weights = [90.0, 70.0, 70.2, 70.4, 70.6, 71.0];
        let records: Vec<WeightRecord> = weights
            .iter()
            .enumerate()
            .map(|(i, w)| rec(d(2025, 1, 1) + Duration::days(i as i64), *w))
            .collect();
        assert_eq!(calculate_weight_trend(&records), WeightTrend::Increasing);
    }

    #[test]
    fn test_trend_ignores_storage_order() {
        // Newest first; the ascending sort must still see 70 -> 71
        let records = vec![rec(d(2025, 1, 2), 71.0), rec(d(2025, 1, 1), 70.0)];
        assert_eq!(calculate_weight_trend(&records), WeightTrend::Increasing);
    }

    #[test]
    fn test_chart_series_ascending() {
        let today = d(2025, 1, 15);
        let records = vec![
            rec(d(2025, 1, 14), 69.0),
            rec(d(2025, 1, 10), 70.0),
            rec(d(2024, 6, 1), 75.0),
        ];
        let points = chart_series(&records, TimePeriod::Month, today);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, d(2025, 1, 10));
        assert_eq!(points[1].date, d(2025, 1, 14));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(d(2025, 1, 5)), "2025/01/05");
        assert_eq!(format_short_date(d(2025, 1, 5)), "01/05");
    }

    #[test]
    fn test_generate_id_unique() {
        assert_ne!(generate_id(), generate_id());
    }
}
