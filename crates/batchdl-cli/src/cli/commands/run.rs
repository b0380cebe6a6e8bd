//! `batchdl run` – build one job per target and run the batch.

use anyhow::{Context, Result};
use batchdl_core::config::BatchConfig;
use batchdl_core::job::JobSpec;
use batchdl_core::report::BatchReport;
use batchdl_core::runner::ProcessRunner;
use batchdl_core::scheduler;
use std::process::ExitCode;
use std::sync::Arc;

/// One download job per target, all into `cfg.output_dir`.
pub fn build_specs(cfg: &BatchConfig, targets: &[String]) -> Result<Vec<JobSpec>> {
    targets
        .iter()
        .map(|t| {
            JobSpec::download(&cfg.tool, t, &cfg.tool_flags, cfg.output_dir.clone())
                .with_context(|| format!("build job for target {}", t))
        })
        .collect()
}

/// Runs all targets and prints the report. Exit code is success iff every job succeeded.
pub async fn run_batch(cfg: &BatchConfig, targets: Vec<String>, json: bool) -> Result<ExitCode> {
    if targets.is_empty() {
        println!("No targets.");
        return Ok(ExitCode::SUCCESS);
    }

    let specs = build_specs(cfg, &targets)?;
    let runner = Arc::new(ProcessRunner::new());
    let results = scheduler::run_all(specs, cfg.concurrency, runner).await?;

    let report = BatchReport::from_results(&results);
    if json {
        println!("{}", report.to_json().context("serialize report")?);
    } else {
        print!("{}", report.render());
    }

    if report.all_succeeded() {
        tracing::info!("all {} job(s) succeeded", report.total);
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::warn!("{} of {} job(s) failed", report.failed, report.total);
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn specs_follow_config_tool_and_flags() {
        let cfg = BatchConfig {
            tool: "yt-dlp".into(),
            tool_flags: vec!["-x".into(), "-P".into()],
            output_dir: PathBuf::from("/music"),
            ..Default::default()
        };
        let specs = build_specs(&cfg, &["u1".to_string(), "u2 --flat".to_string()]).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].command.args(), &["u1", "-x", "-P", "/music"]);
        assert_eq!(specs[1].command.args(), &["u2", "--flat", "-x", "-P", "/music"]);
        assert!(specs.iter().all(|s| s.output_dir == PathBuf::from("/music")));
    }

    #[test]
    fn empty_tool_cannot_build_specs() {
        let cfg = BatchConfig {
            tool: String::new(),
            ..Default::default()
        };
        assert!(build_specs(&cfg, &["u".to_string()]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_code_reflects_job_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let ok_cfg = BatchConfig {
            concurrency: 2,
            tool: "true".into(),
            tool_flags: vec![],
            output_dir: dir.path().to_path_buf(),
            log_file: None,
        };
        let code = run_batch(&ok_cfg, vec!["a".into(), "b".into()], false).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let bad_cfg = BatchConfig {
            tool: "/nonexistent/batchdl-tool".into(),
            ..ok_cfg
        };
        let code = run_batch(&bad_cfg, vec!["a".into()], true).await.unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn no_targets_is_success() {
        let code = run_batch(&BatchConfig::default(), Vec::new(), false).await.unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
    }
}
