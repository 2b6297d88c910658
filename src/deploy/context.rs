use std::path::PathBuf;

use crate::config::DeployParams;

pub struct DeployContext {
    pub params: DeployParams,
    pub project_root: PathBuf,
}

impl DeployContext {
    pub fn new(params: DeployParams, project_root: PathBuf) -> Self {
        Self {
            params,
            project_root,
        }
    }

    pub fn local_dir(&self) -> PathBuf {
        self.params.local_dir(&self.project_root)
    }

    /// Relative to the remote user's home, where SSH commands start.
    pub fn remote_dir(&self) -> &str {
        &self.params.project_dir
    }

    pub fn user(&self) -> &str {
        &self.params.ssh_user
    }

    pub fn host(&self) -> &str {
        &self.params.ssh_host
    }
}
