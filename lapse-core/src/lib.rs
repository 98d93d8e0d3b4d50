pub mod config;
pub mod hunt;
pub mod report;

pub use config::{ConfigError, HuntSettings, load_pattern_file, load_seed_file};
pub use hunt::{HuntOptions, HuntProgressCallback, HuntSummary, execute_hunt};
pub use report::{append_markdown_report, findings_to_json};

pub fn print_banner() {
    use colored::Colorize;
    println!(
        "{} {}",
        "lapse".bright_cyan().bold(),
        format!("v{} - expired link hunter", env!("CARGO_PKG_VERSION")).bright_black()
    );
}
