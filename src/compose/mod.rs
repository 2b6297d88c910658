use std::path::Path;

use crate::cmd::CommandLine;
use crate::error::{DeployError, DeployResult};

/// Compose manifest names, in lookup order.
pub const COMPOSE_FILES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

pub const DOCKERFILE: &str = "Dockerfile";

/// How the application is described in the repository root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    Compose { file: String },
    Dockerfile,
}

impl Manifest {
    /// A compose file wins over a bare Dockerfile.
    pub fn detect(dir: &Path) -> DeployResult<Self> {
        if let Some(file) = COMPOSE_FILES.iter().find(|f| dir.join(f).is_file()) {
            return Ok(Manifest::Compose {
                file: (*file).to_string(),
            });
        }
        if dir.join(DOCKERFILE).is_file() {
            return Ok(Manifest::Dockerfile);
        }
        Err(DeployError::ManifestMissing(dir.to_path_buf()))
    }

    pub fn describe(&self) -> &str {
        match self {
            Manifest::Compose { file } => file,
            Manifest::Dockerfile => DOCKERFILE,
        }
    }
}

/// Which compose front-end the remote host has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeCli {
    /// `docker compose`
    Plugin,
    /// `docker-compose`
    Standalone,
}

impl ComposeCli {
    /// `compose -f <file>` run as root, ready for a subcommand.
    pub fn base(&self, compose_file: &str) -> CommandLine {
        let cmd = match self {
            ComposeCli::Plugin => CommandLine::new("docker").arg("compose"),
            ComposeCli::Standalone => CommandLine::new("docker-compose"),
        };
        cmd.args(["-f", compose_file]).sudo()
    }
}

/// Everything stage 7 runs on the remote host for one project.
#[derive(Debug, Clone)]
pub struct RemoteApp<'a> {
    pub manifest: &'a Manifest,
    pub compose: ComposeCli,
    pub project_dir: &'a str,
    pub app_port: &'a str,
}

impl RemoteApp<'_> {
    /// Teardown always precedes startup, so reruns converge on one instance.
    pub fn deploy_plan(&self) -> Vec<CommandLine> {
        match self.manifest {
            Manifest::Compose { file } => {
                let path = format!("{}/{}", self.project_dir, file);
                vec![
                    self.compose
                        .base(&path)
                        .args(["down", "--remove-orphans"])
                        .allow_failure(),
                    self.compose.base(&path).args(["up", "-d", "--build"]),
                ]
            }
            Manifest::Dockerfile => {
                let name = container_name(self.project_dir);
                let image = format!("{}:latest", name);
                vec![
                    CommandLine::new("docker")
                        .args(["rm", "-f", &name])
                        .sudo()
                        .allow_failure(),
                    CommandLine::new("docker")
                        .args(["build", "-t", &image, self.project_dir])
                        .sudo(),
                    CommandLine::new("docker")
                        .args(["run", "-d", "--name", &name, "--restart", "unless-stopped"])
                        .args([
                            "-p".to_string(),
                            format!("127.0.0.1:{}:{}", self.app_port, self.app_port),
                            image,
                        ])
                        .sudo(),
                ]
            }
        }
    }

    /// Lists the IDs of every container belonging to the app.
    pub fn containers_query(&self) -> CommandLine {
        match self.manifest {
            Manifest::Compose { file } => self
                .compose
                .base(&format!("{}/{}", self.project_dir, file))
                .args(["ps", "-a", "-q"]),
            Manifest::Dockerfile => CommandLine::new("docker")
                .args(["ps", "-aq", "--filter"])
                .arg(format!("name=^{}$", container_name(self.project_dir)))
                .sudo(),
        }
    }
}

/// Docker names allow `[a-zA-Z0-9][a-zA-Z0-9_.-]*`; images must be lowercase.
pub fn container_name(project_dir: &str) -> String {
    let name: String = project_dir
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' | '.' | '-' => c,
            'A'..='Z' => c.to_ascii_lowercase(),
            _ => '-',
        })
        .collect();
    let name = name.trim_start_matches(['_', '.', '-']);
    if name.is_empty() {
        "app".to_string()
    } else {
        name.to_string()
    }
}
