use crate::result::Finding;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Mutable state for exactly one run: the dedup set and the result sink.
/// Shared between workers behind an `Arc`; a new run gets a new instance.
#[derive(Debug, Default)]
pub struct ScanState {
    visited: Mutex<HashSet<String>>,
    findings: Mutex<Vec<Finding>>,
    pages_fetched: AtomicUsize,
    cancelled: AtomicBool,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `url` as processed. Returns `false` if someone got there first.
    pub async fn claim(&self, url: &str) -> bool {
        let mut visited = self.visited.lock().await;
        if visited.contains(url) {
            false
        } else {
            visited.insert(url.to_string());
            true
        }
    }

    pub async fn visited_count(&self) -> usize {
        self.visited.lock().await.len()
    }

    pub async fn record(&self, finding: Finding) {
        self.findings.lock().await.push(finding);
    }

    /// Everything recorded so far, identical tuples collapsed.
    pub async fn findings(&self) -> Vec<Finding> {
        let findings = self.findings.lock().await;
        let mut seen = HashSet::new();
        findings
            .iter()
            .filter(|f| seen.insert(*f))
            .cloned()
            .collect()
    }

    /// Takes a slot from the page budget. `None` means unbounded.
    pub fn try_reserve_page(&self, budget: Option<usize>) -> bool {
        match budget {
            None => {
                self.pages_fetched.fetch_add(1, Ordering::SeqCst);
                true
            }
            Some(limit) => self
                .pages_fetched
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    (n < limit).then_some(n + 1)
                })
                .is_ok(),
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::SeqCst)
    }

    /// Stops new page fetches and probes from starting. Work already in
    /// flight runs to completion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
