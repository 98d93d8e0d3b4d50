use crate::config::WhoisFailurePolicy;
use crate::probe::{Prober, Reachability, check_whois_free};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Liveness verdict for one admitted link. Everything but `Alive` is a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Alive,
    /// HTTP error status and no address record.
    DnsMissing,
    /// HTTP error status, resolves, but WHOIS shows no registration.
    WhoisFree,
    /// Unreachable and no address record.
    TimeoutNoDns,
    /// Unreachable, resolves, but WHOIS shows no registration.
    TimeoutWhoisFree,
}

impl Verdict {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Verdict::Alive => "ALIVE",
            Verdict::DnsMissing => "DNS_MISSING",
            Verdict::WhoisFree => "WHOIS_FREE",
            Verdict::TimeoutNoDns => "TIMEOUT_NO_DNS",
            Verdict::TimeoutWhoisFree => "TIMEOUT_WHOIS_FREE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ALIVE" => Some(Verdict::Alive),
            "DNS_MISSING" => Some(Verdict::DnsMissing),
            "WHOIS_FREE" => Some(Verdict::WhoisFree),
            "TIMEOUT_NO_DNS" => Some(Verdict::TimeoutNoDns),
            "TIMEOUT_WHOIS_FREE" => Some(Verdict::TimeoutWhoisFree),
            _ => None,
        }
    }

    pub fn is_finding(&self) -> bool {
        !matches!(self, Verdict::Alive)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Verdict::Alive => "alive",
            Verdict::DnsMissing => "HTTP error + no DNS",
            Verdict::WhoisFree => "HTTP error + WHOIS free",
            Verdict::TimeoutNoDns => "unreachable + no DNS",
            Verdict::TimeoutWhoisFree => "unreachable + WHOIS free",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason_code())
    }
}

/// Runs the probes for one link, cheapest first. DNS is only asked once HTTP
/// has failed, and WHOIS only once DNS still resolves.
pub async fn classify(
    prober: &dyn Prober,
    url: &str,
    domain: &str,
    whois_failure: WhoisFailurePolicy,
) -> Verdict {
    let reachability = prober.check_reachability(url).await;
    debug!("[CHECK] {} -> {:?}", url, reachability);

    let (no_dns, whois_free) = match reachability {
        Reachability::TransportError(_) => (Verdict::TimeoutNoDns, Verdict::TimeoutWhoisFree),
        Reachability::Status(code) if code >= 400 => (Verdict::DnsMissing, Verdict::WhoisFree),
        Reachability::Status(_) => return Verdict::Alive,
    };

    if !prober.check_dns(domain).await {
        return no_dns;
    }

    if check_whois_free(prober, domain, whois_failure).await {
        whois_free
    } else {
        debug!("{} resolves and is registered, server likely down", domain);
        Verdict::Alive
    }
}
