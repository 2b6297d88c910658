use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub mod prompt;
mod validate;

/// Remote and local directory the project lives in unless overridden.
pub const DEFAULT_PROJECT_DIR: &str = "deploy-app";

pub const DEFAULT_BRANCH: &str = "main";

/// Checked before the token prompt.
pub const TOKEN_ENV: &str = "DROPSHIP_GIT_TOKEN";

/// Everything one run needs. Built by [`prompt::Collector`], dropped at exit.
#[derive(Debug, Clone)]
pub struct DeployParams {
    pub repo_url: String,
    pub token: GitToken,
    pub branch: String,
    pub ssh_user: String,
    pub ssh_host: String,
    pub ssh_key: PathBuf,
    pub app_port: String,
    pub project_dir: String,
}

/// Git access token. `Debug` never shows the value.
#[derive(Clone, PartialEq, Eq)]
pub struct GitToken(String);

impl GitToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for GitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GitToken(***)")
    }
}

/// Pre-filled answers read from a TOML file. Missing keys are prompted for.
/// The token is deliberately not accepted here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Answers {
    pub repo_url: Option<String>,
    pub branch: Option<String>,
    pub ssh_user: Option<String>,
    pub ssh_host: Option<String>,
    pub ssh_key: Option<String>,
    pub app_port: Option<PortAnswer>,
    pub project_dir: Option<String>,
}

/// `app_port = 3000` and `app_port = "3000"` are both accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortAnswer {
    Number(u64),
    Text(String),
}

impl fmt::Display for PortAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortAnswer::Number(n) => write!(f, "{}", n),
            PortAnswer::Text(s) => f.write_str(s),
        }
    }
}

impl Answers {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse answers file: {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl DeployParams {
    /// Local checkout location under the working directory.
    pub fn local_dir(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.project_dir)
    }

    pub fn destination(&self) -> String {
        format!("{}@{}", self.ssh_user, self.ssh_host)
    }
}
