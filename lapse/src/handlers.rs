use anyhow::{Context, Result};
use chrono::Local;
use clap::ArgMatches;
use colored::Colorize;
use lapse_core::hunt::{HuntOptions, HuntProgressCallback, execute_hunt, install_interrupt_handler};
use lapse_core::report::{append_markdown_report, findings_to_json};
use lapse_core::{HuntSettings, load_seed_file};
use lapse_scanner::{NetworkProber, ScanState, WhoisFailurePolicy};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

/// Expand `~` in a user-supplied path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

fn path_arg(args: &ArgMatches, name: &str, default: &str) -> PathBuf {
    expand_path(
        args.get_one::<String>(name)
            .map(String::as_str)
            .unwrap_or(default),
    )
}

/// Translate `hunt` arguments into run settings.
pub fn settings_from_args(args: &ArgMatches) -> HuntSettings {
    let defaults = HuntSettings::default();

    HuntSettings {
        targets_file: path_arg(args, "targets", lapse_core::config::DEFAULT_TARGETS_FILE),
        hubs_file: path_arg(args, "hubs", lapse_core::config::DEFAULT_HUBS_FILE),
        blacklist_file: path_arg(args, "blacklist", lapse_core::config::DEFAULT_BLACKLIST_FILE),
        platforms_file: path_arg(args, "platforms", lapse_core::config::DEFAULT_PLATFORMS_FILE),
        report_file: path_arg(args, "output", lapse_core::config::DEFAULT_REPORT_FILE),
        max_depth: args
            .get_one::<usize>("max-depth")
            .copied()
            .unwrap_or(defaults.max_depth),
        tld_allow_list: args
            .get_one::<String>("tld")
            .map(|raw| lapse_core::config::parse_tld_list(raw))
            .unwrap_or_default(),
        workers: args
            .get_one::<usize>("workers")
            .copied()
            .unwrap_or(defaults.workers),
        debug: args.get_flag("debug"),
        whois_failure: args
            .get_one::<String>("whois-failure")
            .and_then(|p| p.parse::<WhoisFailurePolicy>().ok())
            .unwrap_or_default(),
        page_budget: args.get_one::<usize>("page-budget").copied(),
    }
}

pub fn init_tracing(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    // A second init in the same process (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// Plain progress lines for runs without a spinner. Quiet runs print nothing,
/// and debug runs already get every page and finding through tracing.
pub fn progress_printer(quiet: bool, debug: bool) -> Option<HuntProgressCallback> {
    if quiet || debug {
        return None;
    }
    let printer: HuntProgressCallback = Arc::new(|msg: String| {
        println!("{}", msg);
    });
    Some(printer)
}

/// Returns the process exit code.
pub async fn handle_hunt(args: &ArgMatches, quiet: bool) -> i32 {
    let settings = settings_from_args(args);
    init_tracing(settings.debug);

    match run_hunt(&settings, args.get_flag("json"), quiet).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            1
        }
    }
}

async fn run_hunt(settings: &HuntSettings, json: bool, quiet: bool) -> Result<()> {
    let seeds = load_seed_file(&settings.targets_file)?;
    let config = settings
        .build_scan_config()
        .context("Failed to load pattern files")?;
    let prober = NetworkProber::new(config.timeouts).context("Failed to set up probes")?;

    let state = Arc::new(ScanState::new());
    let interrupt = install_interrupt_handler(state.clone());

    if !quiet {
        println!("\n🔎 Hunting expired links from {} seed(s)", seeds.len());
        println!("Workers: {}", config.effective_workers());
        println!("Max depth: {}", config.max_depth);
        if let Some(tlds) = &config.tld_allow_list {
            let mut tlds: Vec<&str> = tlds.iter().map(String::as_str).collect();
            tlds.sort();
            println!("TLDs: {}", tlds.join(", "));
        }
        println!();
    }

    let options = HuntOptions {
        seeds,
        config,
        show_progress_bars: !quiet,
    };
    let progress_callback = progress_printer(quiet, settings.debug);

    let summary = execute_hunt(options, Arc::new(prober), state, progress_callback)
        .await
        .context("Hunt failed")?;
    interrupt.abort();

    if summary.cancelled {
        println!("{} Hunt interrupted, reporting partial results", "!".yellow().bold());
    }

    if json {
        println!("{}", findings_to_json(&summary.findings)?);
    }

    let written = append_markdown_report(&settings.report_file, &summary.findings, Local::now())
        .with_context(|| format!("Failed to write {}", settings.report_file.display()))?;

    if written > 0 {
        println!(
            "\n{} {} opportunities appended to {}",
            "✓".green().bold(),
            written,
            settings.report_file.display().to_string().bright_white()
        );
    } else if !quiet {
        println!("\n{} No expired domains found this time.", "ℹ".blue());
    }

    if !quiet {
        println!(
            "Pages scanned: {}, links seen: {}",
            summary.pages_fetched, summary.links_seen
        );
    }
    Ok(())
}
