use crate::config::{ProbeTimeouts, WhoisFailurePolicy};
use crate::error::Result;
use crate::whois::{WhoisClient, WhoisRecord};
use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
];

/// Outcome of an HTTP existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reachability {
    Status(u16),
    /// Timeout, refused connection, TLS failure or any other error below HTTP.
    TransportError(String),
}

/// The three liveness checks. Every call returns within its own deadline.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn check_reachability(&self, url: &str) -> Reachability;

    /// `false` covers NXDOMAIN, empty answers and resolver timeouts alike.
    async fn check_dns(&self, domain: &str) -> bool;

    async fn lookup_whois(&self, domain: &str) -> Result<WhoisRecord>;
}

/// Asks WHOIS whether `domain` looks unregistered, applying `policy` when the
/// query itself fails.
pub async fn check_whois_free(
    prober: &dyn Prober,
    domain: &str,
    policy: WhoisFailurePolicy,
) -> bool {
    match prober.lookup_whois(domain).await {
        Ok(record) => {
            debug!("WHOIS {} via {}: free={}", domain, record.server, record.is_free());
            record.is_free()
        }
        Err(e) => {
            debug!(
                "WHOIS failed for {}: {} (treating as free: {})",
                domain,
                e,
                policy.treat_as_free()
            );
            policy.treat_as_free()
        }
    }
}

/// Probes real hosts over the network.
pub struct NetworkProber {
    client: Client,
    resolver: TokioAsyncResolver,
    whois: WhoisClient,
    dns_timeout: Duration,
    agent_cursor: AtomicUsize,
}

impl NetworkProber {
    pub fn new(timeouts: ProbeTimeouts) -> Result<Self> {
        // No idle pool: a reused keep-alive socket to a dying host gives
        // misleading answers, and thousands of one-off hosts would only
        // pile up idle connections.
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.connect + timeouts.read)
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            resolver: build_resolver(timeouts.dns),
            whois: WhoisClient::new(timeouts.whois),
            dns_timeout: timeouts.dns,
            agent_cursor: AtomicUsize::new(0),
        })
    }

    fn next_user_agent(&self) -> &'static str {
        let idx = self.agent_cursor.fetch_add(1, Ordering::Relaxed);
        USER_AGENTS[idx % USER_AGENTS.len()]
    }
}

fn build_resolver(timeout: Duration) -> TokioAsyncResolver {
    let (config, mut opts) = read_system_conf().unwrap_or_else(|e| {
        warn!("Could not read system DNS config ({}), using defaults", e);
        (ResolverConfig::default(), ResolverOpts::default())
    });
    opts.timeout = timeout;
    opts.attempts = 1;
    TokioAsyncResolver::tokio(config, opts)
}

#[async_trait]
impl Prober for NetworkProber {
    async fn check_reachability(&self, url: &str) -> Reachability {
        match self
            .client
            .head(url)
            .header(USER_AGENT, self.next_user_agent())
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status();
                drop(response);
                if status != StatusCode::METHOD_NOT_ALLOWED
                    && status != StatusCode::NOT_IMPLEMENTED
                {
                    return Reachability::Status(status.as_u16());
                }
                debug!("HEAD {} -> {}, retrying with GET", url, status);
            }
            Err(e) => debug!("HEAD {} failed: {}, retrying with GET", url, e),
        }

        // Only the status line and headers are read; dropping the response
        // closes the connection before the body arrives.
        match self
            .client
            .get(url)
            .header(USER_AGENT, self.next_user_agent())
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                drop(response);
                Reachability::Status(status)
            }
            Err(e) => Reachability::TransportError(e.to_string()),
        }
    }

    async fn check_dns(&self, domain: &str) -> bool {
        // Trailing dot keeps the system search domains out of the answer.
        let fqdn = format!("{}.", domain.trim_end_matches('.'));
        let lookup = self.resolver.lookup_ip(fqdn.as_str());
        match tokio::time::timeout(self.dns_timeout, lookup).await {
            Ok(Ok(lookup)) => lookup.iter().next().is_some(),
            Ok(Err(e)) => {
                debug!("DNS lookup for {} failed: {}", domain, e);
                false
            }
            Err(_) => {
                debug!("DNS lookup for {} timed out", domain);
                false
            }
        }
    }

    async fn lookup_whois(&self, domain: &str) -> Result<WhoisRecord> {
        self.whois.lookup(domain).await
    }
}
