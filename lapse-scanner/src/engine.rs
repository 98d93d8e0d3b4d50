use crate::classify::classify;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::filter::{FilterChain, FilterDecision, domain_of};
use crate::probe::Prober;
use crate::result::Finding;
use crate::state::ScanState;
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

/// Called with `(depth, url)` whenever a page is about to be fetched.
pub type PageCallback = Arc<dyn Fn(usize, String) + Send + Sync>;
/// Called for every finding as soon as it is classified.
pub type FindingCallback = Arc<dyn Fn(&Finding) + Send + Sync>;

/// Crawls seed pages and hub pages, sending every outbound link through the
/// filter chain and the probes. Clones share the same run state.
#[derive(Clone)]
pub struct Hunter {
    client: Client,
    config: Arc<ScanConfig>,
    filter: FilterChain,
    prober: Arc<dyn Prober>,
    state: Arc<ScanState>,
    page_callback: Option<PageCallback>,
    finding_callback: Option<FindingCallback>,
}

impl Hunter {
    pub fn new(config: ScanConfig, prober: Arc<dyn Prober>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(
                "Mozilla/5.0 (compatible; lapse/",
                env!("CARGO_PKG_VERSION"),
                ")"
            ))
            .timeout(config.timeouts.page)
            .connect_timeout(config.timeouts.connect)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        let config = Arc::new(config);
        Ok(Self {
            client,
            filter: FilterChain::new(config.clone()),
            config,
            prober,
            state: Arc::new(ScanState::new()),
            page_callback: None,
            finding_callback: None,
        })
    }

    pub fn with_state(mut self, state: Arc<ScanState>) -> Self {
        self.state = state;
        self
    }

    pub fn with_page_callback(mut self, callback: PageCallback) -> Self {
        self.page_callback = Some(callback);
        self
    }

    pub fn with_finding_callback(mut self, callback: FindingCallback) -> Self {
        self.finding_callback = Some(callback);
        self
    }

    pub fn state(&self) -> Arc<ScanState> {
        self.state.clone()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scans one page and everything it dispatches, hub dives included.
    /// Resolves once all of that work has finished.
    pub fn scan(&self, url: &str, depth: usize) -> BoxFuture<'static, ()> {
        let this = self.clone();
        let url = url.to_string();
        async move {
            if !this.state.claim(&url).await && depth > 0 {
                debug!("Already scanned {}, skipping", url);
                return;
            }
            this.scan_page(url, depth).await;
        }
        .boxed()
    }

    /// Entered for hub links the filter chain has already claimed, so the
    /// visited check in `scan` would always turn them away.
    fn dive(&self, url: String, depth: usize) -> BoxFuture<'static, ()> {
        self.scan_page(url, depth)
    }

    fn scan_page(&self, url: String, depth: usize) -> BoxFuture<'static, ()> {
        let this = self.clone();
        async move {
            if this.state.is_cancelled() {
                debug!("Run cancelled, not fetching {}", url);
                return;
            }
            if !this.state.try_reserve_page(this.config.page_budget) {
                warn!("Page budget exhausted, skipping {}", url);
                return;
            }

            let indent = "  ".repeat(depth);
            info!("{}[*] Level {} target: {}", indent, depth, url);
            if let Some(callback) = &this.page_callback {
                callback(depth, url.clone());
            }

            let Some(source_domain) = domain_of(&url) else {
                warn!("Invalid URL {}", url);
                return;
            };

            let links = match this.fetch_links(&url).await {
                Ok(links) => links,
                Err(e) => {
                    warn!("Error scanning {}: {}", url, e);
                    return;
                }
            };
            info!("{}[*] Found {} unique links on {}", indent, links.len(), url);

            // Permits are taken before spawning, so at most `workers` link
            // tasks from this page exist at any moment.
            let semaphore = Arc::new(Semaphore::new(this.config.effective_workers()));
            let mut handles = Vec::with_capacity(links.len());

            for link in links {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let worker = this.clone();
                let source_domain = source_domain.clone();
                handles.push(tokio::spawn(async move {
                    let _permit = permit;
                    worker.check_link(link, source_domain, depth).await;
                }));
            }

            for handle in handles {
                if let Err(e) = handle.await {
                    warn!("Link task on {} failed: {}", url, e);
                }
            }
        }
        .boxed()
    }

    async fn check_link(self, link: String, source_domain: String, depth: usize) {
        if self.state.is_cancelled() {
            return;
        }

        match self
            .filter
            .evaluate(&link, &source_domain, depth, &self.state)
            .await
        {
            FilterDecision::Reject(reason) => {
                debug!("[SKIP] {} ({:?})", link, reason);
            }
            FilterDecision::Dive => {
                debug!("[DEEP] Diving into hub: {}", link);
                self.dive(link, depth + 1).await;
            }
            FilterDecision::Classify(domain) => {
                let verdict = classify(
                    self.prober.as_ref(),
                    &link,
                    &domain,
                    self.config.whois_failure,
                )
                .await;

                if verdict.is_finding() {
                    info!("FOUND: {} ({}) via {}", domain, verdict.description(), link);
                    let finding = Finding::new(domain, link, verdict);
                    if let Some(callback) = &self.finding_callback {
                        callback(&finding);
                    }
                    self.state.record(finding).await;
                }
            }
        }
    }

    async fn fetch_links(&self, url: &str) -> Result<Vec<String>> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let body = response.text().await?;
        Ok(extract_links(&body))
    }
}

/// Absolute http(s) anchor targets in document order, each once. Links
/// carrying a fragment are dropped entirely.
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        if href.contains('#') {
            continue;
        }
        let is_absolute_http = Url::parse(href)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false);
        if is_absolute_http && seen.insert(href.to_string()) {
            links.push(href.to_string());
        }
    }

    links
}
