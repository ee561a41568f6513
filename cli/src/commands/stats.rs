use anyhow::Result;
use chrono::Local;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use heft_core::calc::{format_date, format_short_date};
use heft_core::models::{ChartPoint, TimePeriod, WeightStats, WeightTrend};
use heft_core::service::WeightService;

use super::goal::print_goal_status;
use super::helpers::signed;

const CHART_WIDTH: usize = 40;

fn print_stats(stats: &WeightStats) {
    println!(
        "=== {} ({} – {}) ===",
        stats.period.label(),
        format_date(stats.start_date),
        format_date(stats.end_date)
    );
    if stats.total_records == 0 {
        println!("  No records in this period");
        return;
    }
    println!("  Records: {}", stats.total_records);
    println!("  Average: {:.1} kg", stats.average_weight);
    println!(
        "  Range:   {:.1} – {:.1} kg",
        stats.min_weight, stats.max_weight
    );
    println!(
        "  Change:  {} kg ({}%)",
        signed(stats.weight_change),
        signed(stats.weight_change_percentage)
    );
}

fn trend_arrow(trend: WeightTrend) -> &'static str {
    match trend {
        WeightTrend::Increasing => "↑",
        WeightTrend::Decreasing => "↓",
        WeightTrend::Stable => "→",
    }
}

pub(crate) fn cmd_stats(svc: &WeightService, period: Option<TimePeriod>, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let periods: Vec<TimePeriod> = match period {
        Some(p) => vec![p],
        None => TimePeriod::ALL.to_vec(),
    };
    let stats: Vec<WeightStats> = periods.iter().map(|p| svc.stats(*p, today)).collect();

    if json {
        if let [single] = stats.as_slice() {
            println!("{}", serde_json::to_string_pretty(single)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        return Ok(());
    }

    for (i, s) in stats.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_stats(s);
    }
    Ok(())
}

pub(crate) fn cmd_trend(svc: &WeightService, json: bool) -> Result<()> {
    let trend = svc.trend();

    if json {
        println!("{}", serde_json::json!({ "trend": trend }));
    } else {
        println!("Trend: {} {trend}", trend_arrow(trend));
    }
    Ok(())
}

/// Horizontal bar length for `weight` scaled between `min` and `max`.
fn bar_len(weight: f64, min: f64, max: f64) -> usize {
    let span = max - min;
    if span <= f64::EPSILON {
        return CHART_WIDTH / 2;
    }
    #[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let len = (((weight - min) / span) * (CHART_WIDTH - 1) as f64).round() as usize + 1;
    len.min(CHART_WIDTH)
}

pub(crate) fn cmd_chart(svc: &WeightService, period: TimePeriod, json: bool) -> Result<()> {
    let points = svc.chart(period, Local::now().date_naive());

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }
    if points.is_empty() {
        eprintln!("No records for the {}", period.label());
        return Ok(());
    }

    #[derive(Tabled)]
    struct ChartRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "kg")]
        kg: String,
        #[tabled(rename = "")]
        bar: String,
    }

    let min = points.iter().map(|p| p.weight).fold(f64::INFINITY, f64::min);
    let max = points
        .iter()
        .map(|p| p.weight)
        .fold(f64::NEG_INFINITY, f64::max);
    let rows: Vec<ChartRow> = points
        .iter()
        .map(|p: &ChartPoint| ChartRow {
            date: format_short_date(p.date),
            kg: format!("{:.1}", p.weight),
            bar: "█".repeat(bar_len(p.weight, min, max)),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::blank())
        .with(Modify::new(Columns::single(1)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_summary(svc: &WeightService, json: bool) -> Result<()> {
    let summary = svc.summary(Local::now().date_naive());

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let Some(latest) = &summary.latest else {
        eprintln!("No weight entries yet. Use `heft log <weight>` to get started.");
        return Ok(());
    };

    println!("=== {} ===\n", format_date(latest.date));
    println!("  Weight: {:.1} kg", latest.weight);
    if let Some(category) = summary.bmi_category {
        println!("  BMI:    {:.1} ({category})", latest.bmi);
    }
    if let Some(pct) = latest.body_fat_percentage {
        println!("  Body fat: {pct:.1}%");
    }
    if let Some(mass) = latest.muscle_mass {
        println!("  Muscle mass: {mass:.1} kg");
    }
    println!(
        "  Trend:  {} {}",
        trend_arrow(summary.trend),
        summary.trend
    );
    println!("  Total records: {}", summary.total_records);
    println!();
    print_stats(&summary.week);
    if let Some(goal) = &summary.goal {
        println!();
        print_goal_status(goal);
    }
    Ok(())
}
