//! `batchdl config` – show where the config lives and what is in effect.

use anyhow::{Context, Result};
use batchdl_core::config::{self, BatchConfig, OUTPUT_DIR_ENV};
use std::path::Path;

pub fn run_show_config(explicit: Option<&Path>, cfg: &BatchConfig) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# config file: {}", path.display());
    if std::env::var_os(OUTPUT_DIR_ENV).is_some() {
        println!("# output_dir overridden by ${}", OUTPUT_DIR_ENV);
    }
    print!("{}", cfg.to_toml().context("serialize config")?);
    Ok(())
}
