use std::path::PathBuf;
use std::process::ExitStatus;

use crate::deploy::Stage;

pub type DeployResult<T> = Result<T, DeployError>;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("SSH key not found: {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("invalid repository URL '{url}': {reason}")]
    InvalidRepoUrl { url: String, reason: String },

    #[error("invalid project directory '{0}': must be a single path component")]
    InvalidProjectDir(String),

    #[error("prerequisite missing: {0} is not on PATH")]
    PrerequisiteMissing(String),

    #[error("no Dockerfile or compose file found in {}", .0.display())]
    ManifestMissing(PathBuf),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("command failed ({status}): {command}\n{stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("SSH connection to {destination} failed")]
    Ssh {
        destination: String,
        #[source]
        source: openssh::Error,
    },

    #[error("command failed on {host} ({status}): {command}\n{output}")]
    RemoteCommandFailed {
        host: String,
        command: String,
        status: ExitStatus,
        output: String,
    },

    #[error("unsupported remote OS: {0}")]
    UnsupportedOs(String),

    #[error("no containers found for {0}")]
    NoContainers(String),

    #[error("{url} answered {status}, expected 200 OK")]
    ValidationFailed {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("HTTP probe of {url} failed")]
    Probe {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to render template")]
    Template(#[from] minijinja::Error),

    #[error("prompt failed")]
    Prompt(#[from] dialoguer::Error),

    #[error("interrupted")]
    Interrupted,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A pipeline failure, tagged with the stage it happened in.
#[derive(Debug, thiserror::Error)]
#[error("stage {}/{} ({}) failed", .stage.number(), Stage::COUNT, .stage)]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: DeployError,
}

impl StageError {
    pub fn new(stage: Stage, source: DeployError) -> Self {
        Self { stage, source }
    }
}
