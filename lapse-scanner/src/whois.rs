//! Minimal WHOIS client speaking the port 43 protocol directly.
//!
//! The authoritative server for a TLD is discovered through IANA's referral
//! answer and remembered for the rest of the run.

use crate::error::{Result, ScanError};
use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::debug;

pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";
const WHOIS_PORT: u16 = 43;
const MAX_RESPONSE_BYTES: u64 = 256 * 1024;

const NAME_FIELDS: &[&str] = &["domain name", "domain", "domain_name", "domainname"];

const NO_MATCH_MARKERS: &[&str] = &[
    "no match for",
    "not found",
    "no data found",
    "no entries found",
    "no object found",
    "status: free",
    "status: available",
    "is available for registration",
    "domain not registered",
];

#[derive(Debug, Clone)]
pub struct WhoisRecord {
    pub server: String,
    /// Value of the first domain-name field, if the registry returned one.
    pub registered_name: Option<String>,
    pub raw: String,
    /// The registry explicitly answered that nothing is registered.
    pub no_match: bool,
}

impl WhoisRecord {
    pub fn parse(server: &str, raw: &str) -> Self {
        let lines: Vec<&str> = raw.lines().collect();

        // Markers only count at the start of a line, so registry disclaimers
        // quoting them do not flip a registered record.
        let no_match = lines.iter().any(|line| {
            let line = line.trim().to_lowercase();
            NO_MATCH_MARKERS.iter().any(|m| line.starts_with(m))
        });

        let registered_name = lines.iter().enumerate().find_map(|(idx, line)| {
            let (key, value) = line.split_once(':')?;
            if !NAME_FIELDS.contains(&key.trim().to_lowercase().as_str()) {
                return None;
            }
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_lowercase());
            }
            // Nominet style: the value sits on the next indented line
            lines[idx + 1..]
                .iter()
                .find(|next| !next.trim().is_empty())
                .filter(|next| next.starts_with(char::is_whitespace) && !next.contains(':'))
                .map(|next| next.trim().to_lowercase())
        });

        Self {
            server: server.to_string(),
            registered_name,
            raw: raw.to_string(),
            no_match,
        }
    }

    pub fn is_free(&self) -> bool {
        self.no_match || self.registered_name.is_none()
    }
}

pub struct WhoisClient {
    timeout: Duration,
    referrals: Mutex<HashMap<String, String>>,
}

impl WhoisClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            referrals: Mutex::new(HashMap::new()),
        }
    }

    pub async fn lookup(&self, domain: &str) -> Result<WhoisRecord> {
        let domain = domain.trim_end_matches('.').to_lowercase();
        let tld = domain
            .rsplit('.')
            .next()
            .filter(|t| !t.is_empty() && *t != domain)
            .ok_or_else(|| ScanError::Whois(format!("no TLD in '{}'", domain)))?
            .to_string();

        let server = self.server_for_tld(&tld).await?;
        let raw = self.query(&server, &domain).await?;
        if raw.trim().is_empty() {
            return Err(ScanError::Whois(format!("empty answer from {}", server)));
        }
        Ok(WhoisRecord::parse(&server, &raw))
    }

    async fn server_for_tld(&self, tld: &str) -> Result<String> {
        if let Some(server) = self.referrals.lock().await.get(tld) {
            return Ok(server.clone());
        }

        let answer = self.query(IANA_WHOIS_SERVER, tld).await?;
        let server = parse_referral(&answer)
            .ok_or_else(|| ScanError::Whois(format!("no WHOIS server known for .{}", tld)))?;
        debug!("WHOIS server for .{} is {}", tld, server);

        self.referrals
            .lock()
            .await
            .insert(tld.to_string(), server.clone());
        Ok(server)
    }

    async fn query(&self, server: &str, query: &str) -> Result<String> {
        let exchange = async {
            let mut stream = TcpStream::connect((server, WHOIS_PORT)).await?;
            stream.write_all(format!("{}\r\n", query).as_bytes()).await?;
            let mut buf = Vec::new();
            stream.take(MAX_RESPONSE_BYTES).read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };

        let buf = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ScanError::Timeout {
                operation: "WHOIS query",
                seconds: self.timeout.as_secs(),
            })??;

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Pulls the delegated server out of an IANA answer.
pub fn parse_referral(answer: &str) -> Option<String> {
    let mut whois_line = None;
    for line in answer.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_lowercase().as_str() {
            "refer" => return Some(value.to_lowercase()),
            "whois" if whois_line.is_none() => whois_line = Some(value.to_lowercase()),
            _ => {}
        }
    }
    whois_line
}
