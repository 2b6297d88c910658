use dialoguer::{Input, Password};
use tracing::debug;

use crate::error::{DeployError, DeployResult};

use super::validate;
use super::{Answers, DeployParams, GitToken, DEFAULT_BRANCH, DEFAULT_PROJECT_DIR, TOKEN_ENV};

/// Where answers come from: the answers file first, then the terminal.
pub struct Collector {
    answers: Answers,
    interactive: bool,
}

impl Collector {
    pub fn new(answers: Answers, interactive: bool) -> Self {
        Self {
            answers,
            interactive,
        }
    }

    /// Gather and validate every parameter in prompt order. The first
    /// invalid value ends collection; nothing is asked twice.
    pub fn collect(mut self) -> DeployResult<DeployParams> {
        let Answers {
            repo_url,
            branch,
            ssh_user,
            ssh_host,
            ssh_key,
            app_port,
            project_dir,
        } = std::mem::take(&mut self.answers);

        let repo_url = self.text("Git repository URL", repo_url, None)?;
        let repo_url = validate::require("Git repository URL", &repo_url)?;

        let token = self.token()?;
        if token.is_empty() {
            return Err(DeployError::EmptyField("access token"));
        }

        let branch = self.text("Branch", branch, Some(DEFAULT_BRANCH))?;
        let branch = validate::branch_or_default(&branch);

        let ssh_user = self.text("SSH username", ssh_user, None)?;
        let ssh_user = validate::require("SSH username", &ssh_user)?;

        let ssh_host = self.text("Server IP address", ssh_host, None)?;
        let ssh_host = validate::require("server IP address", &ssh_host)?;

        let ssh_key = self.text("SSH key path", ssh_key, None)?;
        let ssh_key = validate::ssh_key(&ssh_key)?;

        let app_port = self.text(
            "Application port (inside the container)",
            app_port.map(|p| p.to_string()),
            None,
        )?;
        let app_port = validate::require("application port", &app_port)?;

        let project_dir =
            validate::project_dir(project_dir.as_deref().unwrap_or(DEFAULT_PROJECT_DIR))?;

        Ok(DeployParams {
            repo_url,
            token,
            branch,
            ssh_user,
            ssh_host,
            ssh_key,
            app_port,
            project_dir,
        })
    }

    fn text(&self, prompt: &str, answer: Option<String>, default: Option<&str>) -> DeployResult<String> {
        if let Some(value) = answer {
            debug!("{}: taken from answers file", prompt);
            return Ok(value);
        }
        if !self.interactive {
            debug!("{}: no answer and prompting disabled", prompt);
            return Ok(String::new());
        }

        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn token(&self) -> DeployResult<GitToken> {
        if let Ok(value) = std::env::var(TOKEN_ENV) {
            debug!("access token: taken from {}", TOKEN_ENV);
            return Ok(GitToken::new(value.trim()));
        }
        if !self.interactive {
            return Ok(GitToken::new(""));
        }

        let value = Password::new()
            .with_prompt("Personal access token")
            .allow_empty_password(true)
            .interact()?;
        Ok(GitToken::new(value.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortAnswer;

    fn answers_with_key(key: &str) -> Answers {
        Answers {
            repo_url: Some("https://github.com/acme/shop.git".into()),
            branch: None,
            ssh_user: Some("ec2-user".into()),
            ssh_host: Some("203.0.113.10".into()),
            ssh_key: Some(key.into()),
            app_port: Some(PortAnswer::Number(3000)),
            project_dir: None,
        }
    }

    // The token env var is process-wide, so every scenario lives in one test.
    #[test]
    fn non_interactive_collection() {
        let dir = tempfile::tempdir().unwrap();
        let key = dir.path().join("id_ed25519");
        std::fs::write(&key, "key").unwrap();

        std::env::set_var(TOKEN_ENV, "ghp_token");

        let params = Collector::new(answers_with_key(key.to_str().unwrap()), false)
            .collect()
            .expect("all answers present");
        assert_eq!(params.branch, "main");
        assert_eq!(params.app_port, "3000");
        assert_eq!(params.project_dir, DEFAULT_PROJECT_DIR);
        assert_eq!(params.token.expose(), "ghp_token");
        assert_eq!(params.destination(), "ec2-user@203.0.113.10");

        let mut answers = answers_with_key(key.to_str().unwrap());
        answers.repo_url = Some(String::new());
        let err = Collector::new(answers, false).collect().unwrap_err();
        assert!(matches!(err, DeployError::EmptyField("Git repository URL")));

        let missing = dir.path().join("missing");
        let err = Collector::new(answers_with_key(missing.to_str().unwrap()), false)
            .collect()
            .unwrap_err();
        assert!(matches!(err, DeployError::KeyNotFound(_)));

        let mut answers = answers_with_key(key.to_str().unwrap());
        answers.app_port = None;
        let err = Collector::new(answers, false).collect().unwrap_err();
        assert!(matches!(err, DeployError::EmptyField("application port")));

        std::env::remove_var(TOKEN_ENV);
        let err = Collector::new(answers_with_key(key.to_str().unwrap()), false)
            .collect()
            .unwrap_err();
        assert!(matches!(err, DeployError::EmptyField("access token")));
    }
}
