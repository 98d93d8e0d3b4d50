// Tests for hunt orchestration across seeds

use async_trait::async_trait;
use chrono::Local;
use lapse_core::hunt::{HuntOptions, execute_hunt};
use lapse_core::report::append_markdown_report;
use lapse_scanner::error::{Result, ScanError};
use lapse_scanner::{Prober, Reachability, ScanConfig, ScanState, Verdict, WhoisRecord};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Every `*.dead` host is gone; everything else answers 200.
#[derive(Default)]
struct DeadTldProber {
    probed: Mutex<Vec<String>>,
}

#[async_trait]
impl Prober for DeadTldProber {
    async fn check_reachability(&self, url: &str) -> Reachability {
        self.probed.lock().unwrap().push(url.to_string());
        if url.contains(".dead") {
            Reachability::TransportError("connection refused".to_string())
        } else {
            Reachability::Status(200)
        }
    }

    async fn check_dns(&self, domain: &str) -> bool {
        !domain.ends_with(".dead")
    }

    async fn lookup_whois(&self, _domain: &str) -> Result<WhoisRecord> {
        Err(ScanError::Whois("unused".to_string()))
    }
}

async fn mount_page(server: &MockServer, page_path: &str, links: &[&str]) {
    let body: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">x</a>"#, l))
        .collect();
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(format!("<html><body>{}</body></html>", body)),
        )
        .mount(server)
        .await;
}

fn options(seeds: Vec<String>) -> HuntOptions {
    HuntOptions {
        seeds,
        config: ScanConfig::new().with_hub_patterns(vec![]),
        show_progress_bars: false,
    }
}

#[tokio::test]
async fn test_hunt_collects_findings_across_seeds() {
    let server = MockServer::start().await;
    mount_page(&server, "/one", &["http://alpha.dead/", "http://alive.example/"]).await;
    mount_page(&server, "/two", &["http://beta.dead/page", "http://alpha.dead/"]).await;

    let prober = Arc::new(DeadTldProber::default());
    let summary = execute_hunt(
        options(vec![
            format!("{}/one", server.uri()),
            format!("{}/two", server.uri()),
        ]),
        prober.clone(),
        Arc::new(ScanState::new()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(summary.seeds, 2);
    assert_eq!(summary.pages_fetched, 2);
    // two seeds plus three distinct outbound links
    assert_eq!(summary.links_seen, 5);
    assert!(!summary.cancelled);

    let mut domains: Vec<&str> = summary.findings.iter().map(|f| f.domain.as_str()).collect();
    domains.sort();
    assert_eq!(domains, vec!["alpha.dead", "beta.dead"]);
    assert!(summary.findings.iter().all(|f| f.reason == Verdict::TimeoutNoDns));

    // alpha.dead appears on both pages but is probed once
    let probed = prober.probed.lock().unwrap();
    assert_eq!(probed.iter().filter(|u| u.contains("alpha.dead")).count(), 1);
}

#[tokio::test]
async fn test_unreachable_seed_does_not_stop_the_hunt() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["http://gamma.dead/"]).await;

    let summary = execute_hunt(
        options(vec!["http://127.0.0.1:1/".to_string(), format!("{}/", server.uri())]),
        Arc::new(DeadTldProber::default()),
        Arc::new(ScanState::new()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(summary.findings.len(), 1);
    assert_eq!(summary.findings[0].domain, "gamma.dead");
}

#[tokio::test]
async fn test_progress_callback_receives_pages_and_findings() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["http://delta.dead/"]).await;

    let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let lines_clone = lines.clone();

    execute_hunt(
        options(vec![format!("{}/", server.uri())]),
        Arc::new(DeadTldProber::default()),
        Arc::new(ScanState::new()),
        Some(Arc::new(move |line: String| {
            lines_clone.lock().unwrap().push(line);
        })),
    )
    .await
    .unwrap();

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|l| l.contains("Level 0 target")));
    assert!(lines.iter().any(|l| l.contains("FOUND") && l.contains("delta.dead")));
}

#[tokio::test]
async fn test_cancelled_hunt_skips_seeds() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["http://epsilon.dead/"]).await;

    let state = Arc::new(ScanState::new());
    state.cancel();

    let summary = execute_hunt(
        options(vec![format!("{}/", server.uri())]),
        Arc::new(DeadTldProber::default()),
        state,
        None,
    )
    .await
    .unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.pages_fetched, 0);
    assert!(summary.findings.is_empty());
}

#[tokio::test]
async fn test_two_runs_accumulate_in_one_report()
-> std::result::Result<(), Box<dyn std::error::Error>> {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["http://zeta.dead/"]).await;
    let dir = TempDir::new()?;
    let report = dir.path().join("results.md");

    for _ in 0..2 {
        // Fresh state per run: the second run finds the same domain again
        let summary = execute_hunt(
            options(vec![format!("{}/", server.uri())]),
            Arc::new(DeadTldProber::default()),
            Arc::new(ScanState::new()),
            None,
        )
        .await?;
        append_markdown_report(&report, &summary.findings, Local::now())?;
    }

    let content = std::fs::read_to_string(&report)?;
    assert_eq!(content.matches("## Scan Run:").count(), 2);
    assert_eq!(content.matches("| **zeta.dead** | TIMEOUT_NO_DNS |").count(), 2);
    Ok(())
}
