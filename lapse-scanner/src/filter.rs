use crate::config::ScanConfig;
use crate::state::ScanState;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Malformed,
    AlreadyProcessed,
    CloudPlatform,
    TldNotAllowed,
    SameDomain,
    Blacklisted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Reject(RejectReason),
    /// Hub link: crawl it one level deeper instead of probing it.
    Dive,
    /// Admitted for probing; carries the target domain.
    Classify(String),
}

/// Host component of `url`, lowercased, without port or trailing dot.
pub fn domain_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_lowercase();
    if host.is_empty() { None } else { Some(host) }
}

/// Suffix match on label boundaries: `a.netlify.app` matches `netlify.app`,
/// `evilnetlify.app` does not.
fn matches_suffix(domain: &str, suffix: &str) -> bool {
    domain == suffix
        || domain
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('.'))
}

fn top_level_label(domain: &str) -> &str {
    domain.rsplit('.').next().unwrap_or(domain)
}

/// Domain-level admission control, applied to every discovered link.
#[derive(Debug, Clone)]
pub struct FilterChain {
    config: Arc<ScanConfig>,
}

impl FilterChain {
    pub fn new(config: Arc<ScanConfig>) -> Self {
        Self { config }
    }

    /// Runs the checks in their fixed order. Passing the dedup step claims
    /// `link` in `state`, so a link gets past it at most once per run.
    pub async fn evaluate(
        &self,
        link: &str,
        source_domain: &str,
        depth: usize,
        state: &ScanState,
    ) -> FilterDecision {
        let Some(domain) = domain_of(link) else {
            return FilterDecision::Reject(RejectReason::Malformed);
        };

        if !state.claim(link).await {
            return FilterDecision::Reject(RejectReason::AlreadyProcessed);
        }

        if self.is_cloud_platform(&domain) {
            return FilterDecision::Reject(RejectReason::CloudPlatform);
        }

        if let Some(allowed) = &self.config.tld_allow_list
            && !allowed.contains(top_level_label(&domain))
        {
            return FilterDecision::Reject(RejectReason::TldNotAllowed);
        }

        if self.is_hub(&domain) && depth < self.config.max_depth {
            return FilterDecision::Dive;
        }

        if domain == source_domain {
            return FilterDecision::Reject(RejectReason::SameDomain);
        }

        if self.is_blacklisted(&domain) {
            return FilterDecision::Reject(RejectReason::Blacklisted);
        }

        FilterDecision::Classify(domain)
    }

    pub fn is_hub(&self, domain: &str) -> bool {
        self.config
            .hub_patterns
            .iter()
            .any(|p| domain.contains(p.as_str()))
    }

    pub fn is_blacklisted(&self, domain: &str) -> bool {
        self.config
            .blacklist
            .iter()
            .any(|p| domain.contains(p.as_str()))
    }

    pub fn is_cloud_platform(&self, domain: &str) -> bool {
        self.config
            .cloud_suffixes
            .iter()
            .any(|s| matches_suffix(domain, s))
    }
}
