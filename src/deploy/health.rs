use serde::Deserialize;

use crate::cmd::CommandLine;
use crate::compose::RemoteApp;
use crate::error::{DeployError, DeployResult};
use crate::output;
use crate::ssh::SshSession;

const LOG_TAIL: &str = "5";

/// The parts of `docker inspect` output the report uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    pub state: ContainerState,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerState {
    pub status: String,
    pub health: Option<HealthState>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthState {
    pub status: String,
}

impl ContainerInfo {
    pub fn short_id(&self) -> &str {
        &self.id[..12.min(self.id.len())]
    }

    pub fn display_name(&self) -> &str {
        self.name.trim_start_matches('/')
    }

    pub fn is_running(&self) -> bool {
        self.state.status == "running"
    }

    pub fn summary(&self) -> String {
        match &self.state.health {
            Some(health) => format!("{} ({})", self.state.status, health.status),
            None => self.state.status.clone(),
        }
    }
}

pub fn parse_inspect(json: &str) -> DeployResult<Vec<ContainerInfo>> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_ids(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Print status and the last log lines of every container of the app.
/// No container at all is an error; stopped containers only warn.
pub async fn report(session: &SshSession, app: &RemoteApp<'_>) -> DeployResult<()> {
    let ids = parse_ids(&session.capture(&app.containers_query()).await?);
    if ids.is_empty() {
        return Err(DeployError::NoContainers(app.project_dir.to_string()));
    }

    let inspect = CommandLine::new("docker")
        .arg("inspect")
        .args(ids.iter().cloned())
        .sudo();
    let containers = parse_inspect(&session.capture(&inspect).await?)?;

    for container in &containers {
        let line = format!(
            "{} [{}]: {}",
            container.display_name(),
            container.short_id(),
            container.summary()
        );
        if container.is_running() {
            output::success(&line);
        } else {
            output::warning(&line);
        }

        let logs = CommandLine::new("docker")
            .args(["logs", "--tail", LOG_TAIL, &container.id])
            .sudo();
        output::command_output(&session.run(&logs).await?);
    }

    Ok(())
}
