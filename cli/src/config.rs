use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Overrides the store location when set.
pub const DATA_PATH_ENV: &str = "HEFT_DATA_PATH";
/// Tracing filter directives, e.g. `heft_core=debug`.
pub const LOG_ENV: &str = "HEFT_LOG";

pub struct Config {
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the store path: explicit flag, then `HEFT_DATA_PATH`, then the
    /// platform data directory.
    pub fn load(data_override: Option<PathBuf>) -> Result<Self> {
        let env_override = std::env::var_os(DATA_PATH_ENV).map(PathBuf::from);
        let db_path = match data_override.or(env_override) {
            Some(path) => path,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "heft")
                    .context("Could not determine home directory")?;
                proj_dirs.data_dir().join("heft.db")
            }
        };

        if let Some(parent) = db_path.parent() {
            ensure_dir(parent)?;
        }

        Ok(Config { db_path })
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create data directory: {}", dir.display()))
}
