use clap::Parser;
use std::path::PathBuf;

pub mod deploy;

#[derive(Parser)]
#[command(
    name = "dropship",
    version,
    about = "Deploy a Dockerized Git repository to a VM behind Nginx"
)]
pub struct Cli {
    /// TOML file with pre-filled answers; anything missing is prompted for
    #[arg(short, long)]
    pub answers: Option<PathBuf>,

    /// Never prompt; a missing answer counts as empty
    #[arg(long)]
    pub non_interactive: bool,

    /// Directory for the run log
    #[arg(long, default_value = ".")]
    pub log_dir: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
