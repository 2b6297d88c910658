pub mod exec;

use std::path::Path;
use std::time::Duration;

use openssh::{KnownHosts, Session, SessionBuilder};
use tracing::debug;

use crate::cmd::{self, CommandLine};
use crate::error::{DeployError, DeployResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SshSession {
    session: Session,
    host: String,
}

impl SshSession {
    /// Key-based login. Host keys are not checked.
    pub async fn connect(user: &str, host: &str, key: &Path) -> DeployResult<Self> {
        debug!("Connecting to {}@{} with key {}", user, host, key.display());

        let mut builder = SessionBuilder::default();
        builder
            .known_hosts_check(KnownHosts::Accept)
            .user(user.to_string())
            .keyfile(key)
            .connect_timeout(CONNECT_TIMEOUT);

        let session = builder
            .connect(host)
            .await
            .map_err(|source| DeployError::Ssh {
                destination: format!("{}@{}", user, host),
                source,
            })?;

        Ok(Self {
            session,
            host: host.to_string(),
        })
    }

    pub async fn close(self) -> DeployResult<()> {
        let destination = self.host.clone();
        self.session
            .close()
            .await
            .map_err(|source| DeployError::Ssh {
                destination,
                source,
            })
    }
}

/// `scp -r <local_dir> <user>@<host>:` into the remote home directory.
pub fn copy_dir_command(local_dir: &Path, user: &str, host: &str, key: &Path) -> CommandLine {
    CommandLine::new("scp")
        .args(["-r", "-q", "-i"])
        .arg(key.to_string_lossy())
        .args([
            "-o",
            "StrictHostKeyChecking=no",
            "-o",
            "BatchMode=yes",
            "-o",
            "ConnectTimeout=10",
        ])
        .arg(local_dir.to_string_lossy())
        .arg(format!("{}@{}:", user, host))
}

pub async fn copy_dir(local_dir: &Path, user: &str, host: &str, key: &Path) -> DeployResult<()> {
    cmd::run(&copy_dir_command(local_dir, user, host, key)).await?;
    Ok(())
}
