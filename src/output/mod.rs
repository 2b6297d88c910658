use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Target for user-facing messages. The console log layer skips it (the
/// message is already printed); the log file keeps it.
pub const CONSOLE_TARGET: &str = "dropship::console";

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn step(num: usize, total: usize, msg: &str) {
    tracing::info!(target: CONSOLE_TARGET, "[{}/{}] {}", num, total, msg);
    println!(
        "{} {}",
        style(format!("[{}/{}]", num, total)).bold().cyan(),
        msg
    );
}

pub fn success(msg: &str) {
    tracing::info!(target: CONSOLE_TARGET, "OK {}", msg);
    println!("{} {}", style("✓").bold().green(), msg);
}

pub fn error(msg: &str) {
    tracing::error!(target: CONSOLE_TARGET, "{}", msg);
    eprintln!("{} {}", style("✗").bold().red(), style(msg).red());
}

pub fn warning(msg: &str) {
    tracing::warn!(target: CONSOLE_TARGET, "{}", msg);
    eprintln!("{} {}", style("!").bold().yellow(), msg);
}

pub fn info(msg: &str) {
    tracing::info!(target: CONSOLE_TARGET, "{}", msg);
    println!("{} {}", style("→").bold().blue(), msg);
}

pub fn header(msg: &str) {
    tracing::info!(target: CONSOLE_TARGET, "== {} ==", msg);
    println!("\n{}", style(msg).bold().underlined());
}

/// Echo captured process output, indented and dimmed.
pub fn command_output(text: &str) {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        tracing::info!(target: CONSOLE_TARGET, "  | {}", line);
        println!("  {}", style(line).dim());
    }
}
