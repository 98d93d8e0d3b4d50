use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HUB_PATTERNS: &[&str] = &["github.com", "awesome-", "github.io"];

pub const DEFAULT_BLACKLIST: &[&str] = &[
    "google.",
    "microsoft.com",
    "twitter.com",
    "facebook.com",
    "apple.com",
    "wikipedia.org",
    "medium.com",
    "linkedin.com",
    "instagram.com",
    "youtube.com",
    "amazon.",
    "cloudflare.com",
    "tiktok.com",
];

/// Hosting platforms that hand out subdomains. A lapsed `foo.netlify.app`
/// cannot be registered on its own, so these never produce findings.
pub const DEFAULT_CLOUD_SUFFIXES: &[&str] = &[
    "herokuapp.com",
    "netlify.app",
    "vercel.app",
    "pages.dev",
    "blogspot.com",
    "wordpress.com",
    "azurewebsites.net",
    "appspot.com",
    "firebaseapp.com",
    "web.app",
    "gitlab.io",
    "readthedocs.io",
    "wixsite.com",
    "cloudfront.net",
    "s3.amazonaws.com",
];

pub const DEFAULT_WORKERS: usize = 20;
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// What a failed WHOIS query means for the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhoisFailurePolicy {
    /// Treat the domain as unregistered. Noisy, but obscure registries
    /// tend to fail more often than busy ones.
    #[default]
    AssumeFree,
    AssumeRegistered,
}

impl FromStr for WhoisFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" | "assume-free" => Ok(WhoisFailurePolicy::AssumeFree),
            "registered" | "assume-registered" => Ok(WhoisFailurePolicy::AssumeRegistered),
            other => Err(format!("unknown WHOIS failure policy '{}'", other)),
        }
    }
}

impl WhoisFailurePolicy {
    pub fn treat_as_free(self) -> bool {
        matches!(self, WhoisFailurePolicy::AssumeFree)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProbeTimeouts {
    pub connect: Duration,
    pub read: Duration,
    pub page: Duration,
    pub dns: Duration,
    pub whois: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(3),
            read: Duration::from_secs(5),
            page: Duration::from_secs(10),
            dns: Duration::from_secs(3),
            whois: Duration::from_secs(5),
        }
    }
}

/// Read-only settings for a single run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub hub_patterns: Vec<String>,
    pub blacklist: Vec<String>,
    pub cloud_suffixes: Vec<String>,
    pub tld_allow_list: Option<HashSet<String>>,
    pub max_depth: usize,
    pub workers: usize,
    pub debug: bool,
    pub whois_failure: WhoisFailurePolicy,
    /// Upper bound on pages fetched across the whole run, hub dives included.
    pub page_budget: Option<usize>,
    pub timeouts: ProbeTimeouts,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            hub_patterns: to_owned_list(DEFAULT_HUB_PATTERNS),
            blacklist: to_owned_list(DEFAULT_BLACKLIST),
            cloud_suffixes: to_owned_list(DEFAULT_CLOUD_SUFFIXES),
            tld_allow_list: None,
            max_depth: DEFAULT_MAX_DEPTH,
            workers: DEFAULT_WORKERS,
            debug: false,
            whois_failure: WhoisFailurePolicy::default(),
            page_budget: None,
            timeouts: ProbeTimeouts::default(),
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hub_patterns(mut self, patterns: Vec<String>) -> Self {
        self.hub_patterns = patterns;
        self
    }

    pub fn with_blacklist(mut self, patterns: Vec<String>) -> Self {
        self.blacklist = patterns;
        self
    }

    pub fn with_cloud_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.cloud_suffixes = suffixes
            .into_iter()
            .map(|s| s.trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    pub fn with_tld_allow_list<I, S>(mut self, tlds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: HashSet<String> = tlds
            .into_iter()
            .map(|t| t.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        self.tld_allow_list = if set.is_empty() { None } else { Some(set) };
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_whois_failure(mut self, policy: WhoisFailurePolicy) -> Self {
        self.whois_failure = policy;
        self
    }

    pub fn with_page_budget(mut self, budget: Option<usize>) -> Self {
        self.page_budget = budget;
        self
    }

    pub fn with_timeouts(mut self, timeouts: ProbeTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Debug mode runs links one at a time so the trace reads top to bottom.
    pub fn effective_workers(&self) -> usize {
        if self.debug { 1 } else { self.workers.max(1) }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
