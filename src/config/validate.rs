use std::path::PathBuf;

use crate::error::{DeployError, DeployResult};

use super::DEFAULT_BRANCH;

pub fn require(field: &'static str, value: &str) -> DeployResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DeployError::EmptyField(field));
    }
    Ok(value.to_string())
}

pub fn branch_or_default(value: &str) -> String {
    match value.trim() {
        "" => DEFAULT_BRANCH.to_string(),
        branch => branch.to_string(),
    }
}

/// The key must be an existing file. `~/` is expanded first.
pub fn ssh_key(value: &str) -> DeployResult<PathBuf> {
    let value = require("SSH key path", value)?;
    let path = expand_home(&value);
    if !path.is_file() {
        return Err(DeployError::KeyNotFound(path));
    }
    Ok(path)
}

/// The directory is removed remotely with `rm -rf`, so it has to stay a
/// plain name inside the home directory.
pub fn project_dir(value: &str) -> DeployResult<String> {
    let value = require("project directory", value)?;
    if value == "." || value == ".." || value.contains('/') || value.starts_with('-') {
        return Err(DeployError::InvalidProjectDir(value));
    }
    Ok(value)
}

pub fn expand_home(value: &str) -> PathBuf {
    if value == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = value.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(value)
}
