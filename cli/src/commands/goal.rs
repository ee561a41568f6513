use anyhow::Result;

use heft_core::calc::format_date;
use heft_core::models::{GoalInput, GoalStatus};
use heft_core::service::WeightService;

const PROGRESS_BAR_WIDTH: usize = 30;

fn progress_bar(pct: f64) -> String {
    #[allow(clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

pub(crate) fn print_goal_status(status: &GoalStatus) {
    let goal = &status.goal;
    println!(
        "Goal: {:.1} kg → {:.1} kg (since {})",
        goal.starting_weight,
        goal.target_weight,
        format_date(goal.start_date)
    );
    if let Some(current) = status.current_weight {
        println!("  Current: {current:.1} kg");
    }
    println!(
        "  Progress: {} {:.0}%",
        progress_bar(status.progress_pct),
        status.progress_pct
    );
    println!("  Remaining: {:.1} kg", status.remaining_kg);
    if goal.is_achieved {
        let when = goal.achieved_at.as_deref().unwrap_or("");
        println!("  Achieved! {when}");
    }
}

pub(crate) fn cmd_goal_set(
    svc: &WeightService,
    target: f64,
    start: Option<f64>,
    json: bool,
) -> Result<()> {
    svc.set_goal(&GoalInput {
        target_weight: target,
        starting_weight: start,
    })?;
    cmd_goal_show(svc, json)
}

pub(crate) fn cmd_goal_update(svc: &WeightService, target: f64, json: bool) -> Result<()> {
    svc.update_goal_target(target)?;
    cmd_goal_show(svc, json)
}

pub(crate) fn cmd_goal_show(svc: &WeightService, json: bool) -> Result<()> {
    let status = svc.goal_status();

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else if let Some(status) = status {
        print_goal_status(&status);
    } else {
        eprintln!("No goal set. Use `heft goal set <target-kg>` to set one.");
    }
    Ok(())
}

pub(crate) fn cmd_goal_achieve(svc: &WeightService, json: bool) -> Result<()> {
    let goal = svc.mark_goal_achieved()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
    } else {
        println!("Goal of {:.1} kg marked as achieved", goal.target_weight);
    }
    Ok(())
}

pub(crate) fn cmd_goal_clear(svc: &WeightService, json: bool) -> Result<()> {
    let cleared = svc.clear_goal()?;

    if json {
        println!("{}", serde_json::json!({ "cleared": cleared }));
    } else if cleared {
        println!("Goal cleared");
    } else {
        eprintln!("No goal was set");
    }
    Ok(())
}
