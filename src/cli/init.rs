//! tick init command implementation
//!
//! Writes a default `.tick.toml` into the vault root.

use std::path::PathBuf;

use crate::config::{Config, CONFIG_FILE};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(serde::Serialize)]
struct InitReport {
    vault: PathBuf,
    created: bool,
}

pub fn run(dir: Option<PathBuf>, json: bool, quiet: bool) -> Result<()> {
    let root = match dir {
        Some(path) => path,
        None => std::env::current_dir()?,
    };

    if !root.is_dir() {
        return Err(Error::VaultNotFound(root));
    }

    let config_path = root.join(CONFIG_FILE);
    let created = if config_path.exists() {
        if !config_path.is_file() {
            return Err(Error::OperationFailed(format!(
                "{} exists but is not a file: {}",
                CONFIG_FILE,
                config_path.display()
            )));
        }
        false
    } else {
        Config::default().save(&config_path)?;
        true
    };

    let report = InitReport {
        vault: root.clone(),
        created,
    };

    let header = if created {
        "tick init: initialized vault".to_string()
    } else {
        "tick init: nothing to do".to_string()
    };

    let mut human = HumanOutput::new(header);
    human.push_summary("vault", root.display().to_string());
    human.push_summary("created", if created { CONFIG_FILE } else { "none" });
    human.push_next_step("tick list");
    human.push_next_step("tick browse");

    emit_success(OutputOptions { json, quiet }, "init", &report, Some(&human))?;

    Ok(())
}
