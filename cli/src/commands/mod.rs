mod data;
mod goal;
mod helpers;
mod settings;
mod stats;
mod weight;

pub(crate) use data::{cmd_export, cmd_import, cmd_reset};
pub(crate) use goal::{cmd_goal_achieve, cmd_goal_clear, cmd_goal_set, cmd_goal_show, cmd_goal_update};
pub(crate) use helpers::{json_error, parse_period};
pub(crate) use settings::{cmd_settings_set, cmd_settings_show};
pub(crate) use stats::{cmd_chart, cmd_stats, cmd_summary, cmd_trend};
pub(crate) use weight::{Measurements, cmd_delete, cmd_edit, cmd_history, cmd_log, cmd_show};
