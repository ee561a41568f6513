use anyhow::{Result, bail};

use heft_core::models::{Settings, SettingsUpdate, Theme};
use heft_core::service::WeightService;

fn print_settings(s: &Settings) {
    println!("Height: {:.1} cm", s.height);
    println!("Theme: {}", s.theme);
    println!(
        "Notifications: {}",
        if s.notifications { "on" } else { "off" }
    );
}

pub(crate) fn cmd_settings_show(svc: &WeightService, json: bool) -> Result<()> {
    let settings = svc.settings();

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        print_settings(&settings);
    }
    Ok(())
}

pub(crate) fn cmd_settings_set(
    svc: &WeightService,
    height: Option<f64>,
    theme: Option<&str>,
    notifications: Option<bool>,
    json: bool,
) -> Result<()> {
    let update = SettingsUpdate {
        height,
        theme: theme.map(str::parse::<Theme>).transpose()?,
        notifications,
    };
    if update.is_empty() {
        bail!("Nothing to change. Pass --height, --theme, or --notifications");
    }

    let settings = svc.update_settings(&update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        print_settings(&settings);
        if height.is_some() {
            eprintln!("Note: BMI of existing records is not recalculated");
        }
    }
    Ok(())
}
