use crate::cmd::CommandLine;
use crate::error::{DeployError, DeployResult};
use crate::ssh::SshSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Dnf,
    Yum,
    Apt,
}

impl PackageManager {
    /// Auto-detect by reading /etc/os-release via SSH.
    pub async fn detect(session: &SshSession) -> DeployResult<Self> {
        let output = session
            .run(&CommandLine::new("cat").arg("/etc/os-release"))
            .await?;
        Self::from_os_release(&output)
    }

    /// `ID` decides first, then each `ID_LIKE` entry.
    pub fn from_os_release(content: &str) -> DeployResult<Self> {
        let mut id = None;
        let mut version = String::new();
        let mut like = Vec::new();

        for line in content.lines() {
            if let Some(value) = line.strip_prefix("ID=") {
                id = Some(unquote(value).to_string());
            } else if let Some(value) = line.strip_prefix("VERSION_ID=") {
                version = unquote(value).to_string();
            } else if let Some(value) = line.strip_prefix("ID_LIKE=") {
                like = unquote(value).split_whitespace().map(str::to_string).collect();
            }
        }

        let id = id.ok_or_else(|| DeployError::UnsupportedOs("no ID in /etc/os-release".into()))?;
        let major = version.split('.').next().unwrap_or_default();

        std::iter::once(id.as_str())
            .chain(like.iter().map(String::as_str))
            .find_map(|candidate| Self::from_id(candidate, major))
            .ok_or(DeployError::UnsupportedOs(id.clone()))
    }

    fn from_id(id: &str, major: &str) -> Option<Self> {
        match id {
            "fedora" | "rocky" | "almalinux" | "ol" => Some(PackageManager::Dnf),
            "amzn" if major == "2" => Some(PackageManager::Yum),
            "amzn" => Some(PackageManager::Dnf),
            "rhel" | "centos" if major == "7" => Some(PackageManager::Yum),
            "rhel" | "centos" => Some(PackageManager::Dnf),
            "debian" | "ubuntu" => Some(PackageManager::Apt),
            _ => None,
        }
    }

    fn binary(&self) -> &'static str {
        match self {
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Apt => "apt-get",
        }
    }

    fn packages(&self) -> [&'static str; 2] {
        match self {
            PackageManager::Dnf | PackageManager::Yum => ["docker", "nginx"],
            PackageManager::Apt => ["docker.io", "nginx"],
        }
    }

    pub fn update_cmd(&self) -> CommandLine {
        match self {
            PackageManager::Apt => CommandLine::new("apt-get").arg("update").sudo(),
            pm => CommandLine::new(pm.binary()).args(["-y", "update"]).sudo(),
        }
    }

    pub fn install_cmd(&self) -> CommandLine {
        CommandLine::new(self.binary())
            .args(["-y", "install"])
            .args(self.packages())
            .sudo()
    }
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim_matches('\'')
}

/// Install Docker and Nginx, let `user` talk to Docker, start both services.
pub fn provision_plan(pm: PackageManager, user: &str) -> Vec<CommandLine> {
    vec![
        pm.update_cmd(),
        pm.install_cmd(),
        CommandLine::new("usermod").args(["-aG", "docker", user]).sudo(),
        CommandLine::new("systemctl")
            .args(["enable", "--now", "docker"])
            .sudo(),
        CommandLine::new("systemctl")
            .args(["enable", "--now", "nginx"])
            .sudo(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const AL2023: &str = r#"NAME="Amazon Linux"
VERSION="2023"
ID="amzn"
ID_LIKE="fedora"
VERSION_ID="2023"
"#;

    const AL2: &str = r#"NAME="Amazon Linux"
VERSION="2"
ID="amzn"
ID_LIKE="centos rhel fedora"
VERSION_ID="2"
"#;

    const ROCKY9: &str = r#"NAME="Rocky Linux"
ID="rocky"
ID_LIKE="rhel centos fedora"
VERSION_ID="9.3"
"#;

    const CENTOS7: &str = r#"NAME="CentOS Linux"
ID="centos"
ID_LIKE="rhel fedora"
VERSION_ID="7"
"#;

    #[test]
    fn detects_dnf_family() {
        assert_eq!(PackageManager::from_os_release(AL2023).unwrap(), PackageManager::Dnf);
        assert_eq!(PackageManager::from_os_release(ROCKY9).unwrap(), PackageManager::Dnf);
    }

    #[test]
    fn detects_yum_on_older_releases() {
        assert_eq!(PackageManager::from_os_release(AL2).unwrap(), PackageManager::Yum);
        assert_eq!(PackageManager::from_os_release(CENTOS7).unwrap(), PackageManager::Yum);
    }

    #[test]
    fn falls_back_to_id_like() {
        let content = "ID=pop\nID_LIKE=\"ubuntu debian\"\nVERSION_ID=\"22.04\"\n";
        assert_eq!(PackageManager::from_os_release(content).unwrap(), PackageManager::Apt);
    }

    #[test]
    fn unknown_distribution_is_rejected() {
        let err = PackageManager::from_os_release("ID=alpine\nVERSION_ID=3.19\n").unwrap_err();
        assert!(matches!(err, DeployError::UnsupportedOs(id) if id == "alpine"));
    }

    #[test]
    fn plan_for_dnf_host() {
        let plan: Vec<String> = provision_plan(PackageManager::Dnf, "ec2-user")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            plan,
            vec![
                "sudo -n dnf -y update",
                "sudo -n dnf -y install docker nginx",
                "sudo -n usermod -aG docker ec2-user",
                "sudo -n systemctl enable --now docker",
                "sudo -n systemctl enable --now nginx",
            ]
        );
    }

    #[test]
    fn apt_installs_docker_io() {
        assert_eq!(
            PackageManager::Apt.install_cmd().to_string(),
            "sudo -n apt-get -y install docker.io nginx"
        );
        assert_eq!(PackageManager::Apt.update_cmd().to_string(), "sudo -n apt-get update");
    }
}
