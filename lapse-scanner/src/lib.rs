pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod probe;
pub mod result;
pub mod state;
pub mod whois;

pub use classify::{Verdict, classify};
pub use config::{ProbeTimeouts, ScanConfig, WhoisFailurePolicy};
pub use engine::{FindingCallback, Hunter, PageCallback};
pub use error::ScanError;
pub use filter::{FilterChain, FilterDecision, RejectReason, domain_of};
pub use probe::{NetworkProber, Prober, Reachability};
pub use result::Finding;
pub use state::ScanState;
pub use whois::{WhoisClient, WhoisRecord};
