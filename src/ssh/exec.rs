use std::process::Output;

use openssh::Stdio;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::cmd::CommandLine;
use crate::error::{DeployError, DeployResult};
use crate::output;

use super::SshSession;

impl SshSession {
    /// Run a command remotely. Each argument is escaped by `openssh`, so
    /// values reach the remote program verbatim. Returns stdout and stderr
    /// combined; a tolerated failure returns its output as well.
    pub async fn run(&self, cmd: &CommandLine) -> DeployResult<String> {
        let (stdout, stderr) = self.run_split(cmd).await?;
        Ok(stdout + &stderr)
    }

    /// Like [`run`](Self::run) but returns stdout only, for output that
    /// gets parsed. Stderr is still logged.
    pub async fn capture(&self, cmd: &CommandLine) -> DeployResult<String> {
        let (stdout, stderr) = self.run_split(cmd).await?;
        if !stderr.trim().is_empty() {
            debug!("[{}] stderr: {}", self.host, stderr.trim());
        }
        Ok(stdout)
    }

    async fn run_split(&self, cmd: &CommandLine) -> DeployResult<(String, String)> {
        debug!("[{}] run: {}", self.host, cmd);

        let argv = cmd.argv();
        let out = self
            .session
            .command(argv[0])
            .args(&argv[1..])
            .output()
            .await
            .map_err(|source| self.ssh_error(source))?;

        self.finish(cmd, out)
    }

    /// Run a command, returning Ok(true) if exit 0, Ok(false) otherwise
    pub async fn run_ok(&self, cmd: &CommandLine) -> DeployResult<bool> {
        debug!("[{}] run_ok: {}", self.host, cmd);

        let argv = cmd.argv();
        let status = self
            .session
            .command(argv[0])
            .args(&argv[1..])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|source| self.ssh_error(source))?;

        Ok(status.success())
    }

    /// Run a fixed script with `bash -c`. Only for text with no user input.
    pub async fn exec_script(&self, script: &str) -> DeployResult<String> {
        let cmd = CommandLine::new("bash").args(["-c", script]).sudo();
        self.run(&cmd).await
    }

    /// Write `content` to `path` as root, passing it on stdin to `tee`.
    pub async fn sudo_write_file(&self, path: &str, content: &str) -> DeployResult<()> {
        let cmd = CommandLine::new("tee").arg(path).sudo();
        debug!("[{}] write {} bytes: {}", self.host, content.len(), cmd);

        let argv = cmd.argv();
        let mut child = self
            .session
            .command(argv[0])
            .args(&argv[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .await
            .map_err(|source| self.ssh_error(source))?;

        if let Some(mut stdin) = child.stdin().take() {
            stdin.write_all(content.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let out = child
            .wait_with_output()
            .await
            .map_err(|source| self.ssh_error(source))?;

        self.finish(&cmd, out)?;
        Ok(())
    }

    fn finish(&self, cmd: &CommandLine, out: Output) -> DeployResult<(String, String)> {
        let stdout = cmd.redact(&String::from_utf8_lossy(&out.stdout));
        let stderr = cmd.redact(&String::from_utf8_lossy(&out.stderr));

        if out.status.success() {
            return Ok((stdout, stderr));
        }

        let combined = format!("{}{}", stdout, stderr);
        if cmd.tolerates_failure() {
            output::warning(&format!(
                "Ignoring failure on {} ({}): {}",
                self.host, out.status, cmd
            ));
            output::command_output(&combined);
            return Ok((stdout, stderr));
        }

        Err(DeployError::RemoteCommandFailed {
            host: self.host.clone(),
            command: cmd.to_string(),
            status: out.status,
            output: combined.trim().to_string(),
        })
    }

    fn ssh_error(&self, source: openssh::Error) -> DeployError {
        DeployError::Ssh {
            destination: self.host.clone(),
            source,
        }
    }
}
