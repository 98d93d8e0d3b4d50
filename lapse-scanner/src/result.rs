use crate::classify::Verdict;
use serde::{Deserialize, Serialize};

/// One expiry opportunity: a suspect domain, the link that led to it, and why.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Finding {
    pub domain: String,
    pub source_url: String,
    pub reason: Verdict,
}

impl Finding {
    pub fn new(domain: impl Into<String>, source_url: impl Into<String>, reason: Verdict) -> Self {
        Self {
            domain: domain.into(),
            source_url: source_url.into(),
            reason,
        }
    }

    pub fn reason_code(&self) -> &'static str {
        self.reason.reason_code()
    }
}
