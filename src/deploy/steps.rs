use crate::cmd::{self, CommandLine};
use crate::compose::{ComposeCli, Manifest, RemoteApp};
use crate::config::prompt::Collector;
use crate::config::DeployParams;
use crate::error::DeployResult;
use crate::git;
use crate::nginx;
use crate::os::{self, PackageManager};
use crate::output;
use crate::probe;
use crate::ssh::{self, SshSession};

use super::context::DeployContext;
use super::health;
use super::Stage;

/// Programs this machine has to provide.
const LOCAL_PREREQUISITES: [&str; 3] = ["git", "ssh", "scp"];

/// Installs the compose v2 binary as a Docker CLI plugin. Fixed text, no
/// user input.
const INSTALL_COMPOSE_PLUGIN: &str = r#"set -e
mkdir -p /usr/local/lib/docker/cli-plugins
curl -fsSL "https://github.com/docker/compose/releases/latest/download/docker-compose-linux-$(uname -m)" \
  -o /usr/local/lib/docker/cli-plugins/docker-compose
chmod +x /usr/local/lib/docker/cli-plugins/docker-compose"#;

pub fn collect_parameters(collector: Collector) -> DeployResult<DeployParams> {
    Stage::ParameterCollection.announce();

    let params = collector.collect()?;
    cmd::require_programs(&LOCAL_PREREQUISITES)?;

    output::success(&format!(
        "Deploying branch {} to {} (app port {})",
        params.branch,
        params.destination(),
        params.app_port
    ));
    Ok(params)
}

pub async fn sync_repository(ctx: &DeployContext) -> DeployResult<()> {
    Stage::RepositorySync.announce();

    let dir = ctx.local_dir();
    git::sync(&ctx.params, &dir).await?;

    output::success(&format!(
        "{} is at branch {}",
        dir.display(),
        ctx.params.branch
    ));
    Ok(())
}

pub fn verify_manifest(ctx: &DeployContext) -> DeployResult<Manifest> {
    Stage::ManifestVerification.announce();

    let manifest = Manifest::detect(&ctx.local_dir())?;

    output::success(&format!("Found {}", manifest.describe()));
    Ok(manifest)
}

pub async fn check_connectivity(ctx: &DeployContext) -> DeployResult<SshSession> {
    Stage::ConnectivityCheck.announce();

    let session = SshSession::connect(ctx.user(), ctx.host(), &ctx.params.ssh_key).await?;
    session.run(&CommandLine::new("true")).await?;

    output::success(&format!("Connected to {}", ctx.params.destination()));
    Ok(session)
}

pub async fn prepare_environment(
    session: &SshSession,
    ctx: &DeployContext,
) -> DeployResult<ComposeCli> {
    Stage::EnvironmentPreparation.announce();

    let pm = PackageManager::detect(session).await?;
    output::info(&format!("Package manager: {:?}", pm));

    let spinner = output::create_spinner("Installing Docker and Nginx...");
    for command in os::provision_plan(pm, ctx.user()) {
        spinner.set_message(command.to_string());
        if let Err(e) = session.run(&command).await {
            spinner.finish_and_clear();
            return Err(e);
        }
    }
    spinner.finish_and_clear();

    let compose = ensure_compose(session).await?;

    let banners = [
        CommandLine::new("docker").arg("--version").sudo(),
        match compose {
            ComposeCli::Plugin => CommandLine::new("docker").args(["compose", "version"]).sudo(),
            ComposeCli::Standalone => CommandLine::new("docker-compose").arg("version").sudo(),
        },
        CommandLine::new("nginx").arg("-v").sudo(),
    ];
    for banner in &banners {
        output::command_output(&session.run(banner).await?);
    }

    output::success("Docker and Nginx are installed and running");
    Ok(compose)
}

async fn ensure_compose(session: &SshSession) -> DeployResult<ComposeCli> {
    let plugin = CommandLine::new("docker").args(["compose", "version"]).sudo();
    if session.run_ok(&plugin).await? {
        return Ok(ComposeCli::Plugin);
    }

    let standalone = CommandLine::new("docker-compose").arg("version").sudo();
    if session.run_ok(&standalone).await? {
        return Ok(ComposeCli::Standalone);
    }

    output::info("Docker Compose not found, installing the CLI plugin...");
    session.exec_script(INSTALL_COMPOSE_PLUGIN).await?;
    session.run(&plugin).await?;
    Ok(ComposeCli::Plugin)
}

pub async fn transfer(session: &SshSession, ctx: &DeployContext) -> DeployResult<()> {
    Stage::ArtifactTransfer.announce();

    session
        .run(
            &CommandLine::new("rm")
                .args(["-rf", "--", ctx.remote_dir()])
                .sudo(),
        )
        .await?;

    let spinner = output::create_spinner(&format!(
        "Copying {} to {}...",
        ctx.local_dir().display(),
        ctx.params.destination()
    ));
    let copied = ssh::copy_dir(
        &ctx.local_dir(),
        ctx.user(),
        ctx.host(),
        &ctx.params.ssh_key,
    )
    .await;
    spinner.finish_and_clear();
    copied?;

    output::success(&format!("Project copied to ~/{}", ctx.remote_dir()));
    Ok(())
}

pub async fn deploy_app(
    session: &SshSession,
    ctx: &DeployContext,
    manifest: &Manifest,
    compose: ComposeCli,
) -> DeployResult<()> {
    Stage::RemoteDeployment.announce();

    let app = RemoteApp {
        manifest,
        compose,
        project_dir: ctx.remote_dir(),
        app_port: &ctx.params.app_port,
    };

    for command in app.deploy_plan() {
        let spinner = output::create_spinner(&command.to_string());
        let result = session.run(&command).await;
        spinner.finish_and_clear();
        output::command_output(&result?);
    }

    health::report(session, &app).await?;

    output::success("Containers are up");
    Ok(())
}

pub async fn configure_proxy(session: &SshSession, ctx: &DeployContext) -> DeployResult<()> {
    Stage::ProxyConfiguration.announce();

    nginx::configure(
        session,
        ctx.remote_dir(),
        ctx.host(),
        &ctx.params.app_port,
    )
    .await
}

/// Returns the URL that answered.
pub async fn validate(ctx: &DeployContext) -> DeployResult<String> {
    Stage::ExternalValidation.announce();

    let url = probe::public_url(ctx.host());
    let status = probe::check(&url).await?;

    output::success(&format!("{} answered {}", url, status));
    Ok(url)
}
