use minijinja::Environment;

use crate::cmd::CommandLine;
use crate::error::DeployResult;
use crate::output;
use crate::ssh::SshSession;

const SITE_TEMPLATE: &str = include_str!("../../templates/nginx.conf.j2");

const CONF_DIR: &str = "/etc/nginx/conf.d";

/// Stock sites that would otherwise answer on port 80 first.
const DEFAULT_SITES: [&str; 2] = [
    "/etc/nginx/conf.d/default.conf",
    "/etc/nginx/sites-enabled/default",
];

pub fn site_path(project_dir: &str) -> String {
    format!("{}/{}.conf", CONF_DIR, project_dir)
}

pub fn render_site(server_name: &str, app_port: &str) -> DeployResult<String> {
    let mut env = Environment::new();
    env.add_template("nginx.conf", SITE_TEMPLATE)?;
    let tmpl = env.get_template("nginx.conf")?;
    let mut rendered = tmpl.render(minijinja::context! {
        server_name => server_name,
        app_port => app_port,
    })?;
    rendered.push('\n');
    Ok(rendered)
}

/// Commands after the site file is written. `nginx -t` runs before the
/// reload, so a broken config never reaches the running server.
pub fn activate_plan() -> Vec<CommandLine> {
    vec![
        CommandLine::new("rm").arg("-f").args(DEFAULT_SITES).sudo(),
        // SELinux blocks nginx from dialing local ports by default
        CommandLine::new("setsebool")
            .args(["-P", "httpd_can_network_connect", "1"])
            .sudo()
            .allow_failure(),
        CommandLine::new("nginx").arg("-t").sudo(),
        CommandLine::new("systemctl")
            .args(["reload", "nginx"])
            .sudo(),
    ]
}

pub async fn configure(
    session: &SshSession,
    project_dir: &str,
    server_name: &str,
    app_port: &str,
) -> DeployResult<()> {
    let site = render_site(server_name, app_port)?;
    let path = site_path(project_dir);

    session.sudo_write_file(&path, &site).await?;
    output::info(&format!("Wrote {}", path));

    for cmd in activate_plan() {
        let out = session.run(&cmd).await?;
        if cmd.program() == "nginx" {
            output::command_output(&out);
        }
    }

    output::success(&format!(
        "Nginx proxies {} → 127.0.0.1:{}",
        server_name, app_port
    ));
    Ok(())
}
