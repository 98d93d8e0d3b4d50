use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lapse_scanner::{
    Finding, FindingCallback, Hunter, PageCallback, Prober, ScanConfig, ScanError, ScanState,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// Options for configuring a hunt
pub struct HuntOptions {
    pub seeds: Vec<String>,
    pub config: ScanConfig,
    pub show_progress_bars: bool,
}

/// Callback for reporting hunt progress as plain lines
pub type HuntProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Debug, Clone, Serialize)]
pub struct HuntSummary {
    pub seeds: usize,
    pub pages_fetched: usize,
    pub links_seen: usize,
    pub findings: Vec<Finding>,
    pub cancelled: bool,
}

pub fn format_finding(finding: &Finding) -> String {
    format!(
        ">>> FOUND: {} ({})",
        finding.domain.bright_white().bold(),
        finding.reason.description().yellow()
    )
}

/// Runs every seed at depth 0, one after another, against a shared run state.
pub async fn execute_hunt(
    options: HuntOptions,
    prober: Arc<dyn Prober>,
    state: Arc<ScanState>,
    progress_callback: Option<HuntProgressCallback>,
) -> Result<HuntSummary, ScanError> {
    let HuntOptions {
        seeds,
        config,
        show_progress_bars,
    } = options;

    // Spinner output would interleave with the per-link trace in debug mode
    let progress_bar = if show_progress_bars && !config.debug {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting hunt...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let page_callback: PageCallback = {
        let pb = progress_bar.clone();
        let progress = progress_callback.clone();
        Arc::new(move |depth: usize, url: String| {
            if let Some(ref pb) = pb {
                pb.set_message(format!("Level {}: {}", depth, url));
            } else if let Some(ref progress) = progress {
                progress(format!("{}[*] Level {} target: {}", "  ".repeat(depth), depth, url));
            }
        })
    };

    let finding_callback: FindingCallback = {
        let pb = progress_bar.clone();
        let progress = progress_callback.clone();
        Arc::new(move |finding: &Finding| {
            if let Some(ref pb) = pb {
                pb.println(format_finding(finding));
            } else if let Some(ref progress) = progress {
                progress(format_finding(finding));
            }
        })
    };

    let hunter = Hunter::new(config, prober)?
        .with_state(state.clone())
        .with_page_callback(page_callback)
        .with_finding_callback(finding_callback);

    let seed_count = seeds.len();
    for seed in seeds {
        if state.is_cancelled() {
            warn!("Hunt cancelled, {} not scanned", seed);
            continue;
        }
        hunter.scan(&seed, 0).await;
    }

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    Ok(HuntSummary {
        seeds: seed_count,
        pages_fetched: state.pages_fetched(),
        links_seen: state.visited_count().await,
        findings: state.findings().await,
        cancelled: state.is_cancelled(),
    })
}

/// Ctrl-C cancels the run: no new pages or probes start, and findings made
/// so far still reach the report.
pub fn install_interrupt_handler(state: Arc<ScanState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing in-flight checks");
            state.cancel();
        }
    })
}
