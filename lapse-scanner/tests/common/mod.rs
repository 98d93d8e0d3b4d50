// Shared fixtures for scanner tests

#![allow(dead_code)]

use async_trait::async_trait;
use lapse_scanner::error::{Result, ScanError};
use lapse_scanner::{Prober, Reachability, WhoisRecord};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum WhoisAnswer {
    Registered,
    Unregistered,
    Fails,
}

#[derive(Debug, Clone)]
pub struct Behaviour {
    pub reachability: Reachability,
    pub dns: bool,
    pub whois: WhoisAnswer,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            reachability: Reachability::Status(200),
            dns: true,
            whois: WhoisAnswer::Registered,
        }
    }
}

/// Scripted prober that never touches the network and counts every call.
#[derive(Default)]
pub struct FakeProber {
    behaviours: HashMap<String, Behaviour>,
    http_calls: Mutex<HashMap<String, usize>>,
    dns_calls: Mutex<HashMap<String, usize>>,
    whois_calls: Mutex<HashMap<String, usize>>,
}

impl FakeProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_domain(mut self, domain: &str, behaviour: Behaviour) -> Self {
        self.behaviours.insert(domain.to_string(), behaviour);
        self
    }

    fn behaviour_for(&self, domain: &str) -> Behaviour {
        self.behaviours.get(domain).cloned().unwrap_or_default()
    }

    pub fn http_calls(&self, url: &str) -> usize {
        self.http_calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_http_calls(&self) -> usize {
        self.http_calls.lock().unwrap().values().sum()
    }

    pub fn dns_calls(&self, domain: &str) -> usize {
        self.dns_calls.lock().unwrap().get(domain).copied().unwrap_or(0)
    }

    pub fn whois_calls(&self, domain: &str) -> usize {
        self.whois_calls.lock().unwrap().get(domain).copied().unwrap_or(0)
    }
}

fn host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default()
}

#[async_trait]
impl Prober for FakeProber {
    async fn check_reachability(&self, url: &str) -> Reachability {
        *self.http_calls.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        self.behaviour_for(&host(url)).reachability
    }

    async fn check_dns(&self, domain: &str) -> bool {
        *self.dns_calls.lock().unwrap().entry(domain.to_string()).or_insert(0) += 1;
        self.behaviour_for(domain).dns
    }

    async fn lookup_whois(&self, domain: &str) -> Result<WhoisRecord> {
        *self.whois_calls.lock().unwrap().entry(domain.to_string()).or_insert(0) += 1;
        match self.behaviour_for(domain).whois {
            WhoisAnswer::Registered => Ok(WhoisRecord::parse(
                "whois.test",
                &format!("Domain Name: {}\n", domain.to_uppercase()),
            )),
            WhoisAnswer::Unregistered => Ok(WhoisRecord::parse(
                "whois.test",
                &format!("No match for \"{}\".\n", domain.to_uppercase()),
            )),
            WhoisAnswer::Fails => Err(ScanError::Whois("connection reset".to_string())),
        }
    }
}

pub fn unreachable() -> Reachability {
    Reachability::TransportError("operation timed out".to_string())
}
