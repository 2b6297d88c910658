use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::prompt::Collector;
use crate::config::Answers;
use crate::deploy;
use crate::error::DeployError;

use super::Cli;

/// Ctrl-C aborts like any other failure. Dropping the pipeline kills local
/// child processes; commands already sent over SSH finish remotely.
pub async fn run(cli: &Cli, project_root: PathBuf) -> Result<()> {
    let answers = match cli.answers.as_deref() {
        Some(path) => Answers::load(path)?,
        None => Answers::default(),
    };
    let collector = Collector::new(answers, !cli.non_interactive);

    tokio::select! {
        result = deploy::run(collector, project_root) => result?,
        _ = tokio::signal::ctrl_c() => return Err(DeployError::Interrupted.into()),
    }

    Ok(())
}

pub fn log_path(log_dir: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    log_dir.join(format!("deploy_{}.log", stamp))
}
