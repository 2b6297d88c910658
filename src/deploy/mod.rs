pub mod context;
pub mod health;
pub mod steps;

use std::fmt;
use std::path::PathBuf;

use crate::config::prompt::Collector;
use crate::error::{DeployResult, StageError};
use crate::output;

use context::DeployContext;

/// The pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParameterCollection,
    RepositorySync,
    ManifestVerification,
    ConnectivityCheck,
    EnvironmentPreparation,
    ArtifactTransfer,
    RemoteDeployment,
    ProxyConfiguration,
    ExternalValidation,
}

impl Stage {
    pub const COUNT: usize = 9;

    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn announce(&self) {
        output::step(self.number(), Self::COUNT, self.title());
    }

    fn title(&self) -> &'static str {
        match self {
            Stage::ParameterCollection => "Collecting parameters",
            Stage::RepositorySync => "Syncing repository",
            Stage::ManifestVerification => "Verifying Docker manifest",
            Stage::ConnectivityCheck => "Checking SSH connectivity",
            Stage::EnvironmentPreparation => "Preparing remote environment",
            Stage::ArtifactTransfer => "Transferring project files",
            Stage::RemoteDeployment => "Deploying containers",
            Stage::ProxyConfiguration => "Configuring Nginx reverse proxy",
            Stage::ExternalValidation => "Validating public endpoint",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ParameterCollection => "parameter collection",
            Stage::RepositorySync => "repository sync",
            Stage::ManifestVerification => "manifest verification",
            Stage::ConnectivityCheck => "connectivity check",
            Stage::EnvironmentPreparation => "environment preparation",
            Stage::ArtifactTransfer => "artifact transfer",
            Stage::RemoteDeployment => "remote deployment",
            Stage::ProxyConfiguration => "reverse proxy configuration",
            Stage::ExternalValidation => "external validation",
        };
        f.write_str(name)
    }
}

fn attempt<T>(stage: Stage, result: DeployResult<T>) -> Result<T, StageError> {
    result.map_err(|source| StageError::new(stage, source))
}

/// Run all stages in order. The first failure stops the run.
pub async fn run(collector: Collector, project_root: PathBuf) -> Result<(), StageError> {
    let params = attempt(Stage::ParameterCollection, steps::collect_parameters(collector))?;
    let ctx = DeployContext::new(params, project_root);

    output::header(&format!(
        "Deploying {} ({}) to {}",
        ctx.params.repo_url,
        ctx.params.branch,
        ctx.params.destination()
    ));

    attempt(Stage::RepositorySync, steps::sync_repository(&ctx).await)?;

    let manifest = attempt(Stage::ManifestVerification, steps::verify_manifest(&ctx))?;

    let session = attempt(Stage::ConnectivityCheck, steps::check_connectivity(&ctx).await)?;

    let compose = attempt(
        Stage::EnvironmentPreparation,
        steps::prepare_environment(&session, &ctx).await,
    )?;

    attempt(Stage::ArtifactTransfer, steps::transfer(&session, &ctx).await)?;

    attempt(
        Stage::RemoteDeployment,
        steps::deploy_app(&session, &ctx, &manifest, compose).await,
    )?;

    attempt(
        Stage::ProxyConfiguration,
        steps::configure_proxy(&session, &ctx).await,
    )?;

    if let Err(e) = session.close().await {
        output::warning(&format!("SSH session did not close cleanly: {}", e));
    }

    let url = attempt(Stage::ExternalValidation, steps::validate(&ctx).await)?;

    println!();
    output::success(&format!("Deployment complete! {} is live.", url));
    Ok(())
}
