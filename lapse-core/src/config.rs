// Pattern and seed files

use lapse_scanner::config::{DEFAULT_BLACKLIST, DEFAULT_CLOUD_SUFFIXES, DEFAULT_HUB_PATTERNS};
use lapse_scanner::{ScanConfig, WhoisFailurePolicy};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_TARGETS_FILE: &str = "targets.txt";
pub const DEFAULT_HUBS_FILE: &str = "hubs.txt";
pub const DEFAULT_BLACKLIST_FILE: &str = "blacklist.txt";
pub const DEFAULT_PLATFORMS_FILE: &str = "platforms.txt";
pub const DEFAULT_REPORT_FILE: &str = "results.md";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Seed targets file {} not found", .0.display())]
    SeedsMissing(PathBuf),

    #[error("No valid URLs found in {}", .0.display())]
    NoSeeds(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Non-empty lines that are not `#` comments, trimmed.
pub fn parse_pattern_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Reads a pattern list. A missing file is `Ok(None)` so the caller can fall
/// back to its built-in list.
pub fn load_pattern_file(path: &Path) -> Result<Option<Vec<String>>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => {
            let patterns = parse_pattern_lines(&content);
            info!("Loaded {} entries from '{}'", patterns.len(), path.display());
            Ok(Some(patterns))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Config '{}' not found, using defaults", path.display());
            Ok(None)
        }
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn load_or_default(path: &Path, defaults: &[&str]) -> Result<Vec<String>, ConfigError> {
    Ok(load_pattern_file(path)?
        .unwrap_or_else(|| defaults.iter().map(|s| s.to_string()).collect()))
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    let is_web = |u: &Url| matches!(u.scheme(), "http" | "https") && u.host_str().is_some();

    if let Ok(url) = Url::parse(line)
        && is_web(&url)
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if let Ok(url) = Url::parse(&with_scheme)
        && is_web(&url)
        && !line.contains(char::is_whitespace)
    {
        return Some(with_scheme);
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

/// Reads the seed targets. This is the one file whose absence ends the run.
pub fn load_seed_file(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::SeedsMissing(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let seeds: Vec<String> = parse_pattern_lines(&content)
        .iter()
        .filter_map(|line| parse_url_line(line))
        .collect();

    if seeds.is_empty() {
        return Err(ConfigError::NoSeeds(path.to_path_buf()));
    }
    Ok(seeds)
}

/// `"de, .COM"` -> `["de", "com"]`
pub fn parse_tld_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().trim_start_matches('.').to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Everything a hunt needs before it starts: file locations and run flags.
#[derive(Debug, Clone)]
pub struct HuntSettings {
    pub targets_file: PathBuf,
    pub hubs_file: PathBuf,
    pub blacklist_file: PathBuf,
    pub platforms_file: PathBuf,
    pub report_file: PathBuf,
    pub max_depth: usize,
    pub tld_allow_list: Vec<String>,
    pub workers: usize,
    pub debug: bool,
    pub whois_failure: WhoisFailurePolicy,
    pub page_budget: Option<usize>,
}

impl Default for HuntSettings {
    fn default() -> Self {
        Self {
            targets_file: PathBuf::from(DEFAULT_TARGETS_FILE),
            hubs_file: PathBuf::from(DEFAULT_HUBS_FILE),
            blacklist_file: PathBuf::from(DEFAULT_BLACKLIST_FILE),
            platforms_file: PathBuf::from(DEFAULT_PLATFORMS_FILE),
            report_file: PathBuf::from(DEFAULT_REPORT_FILE),
            max_depth: lapse_scanner::config::DEFAULT_MAX_DEPTH,
            tld_allow_list: Vec::new(),
            workers: lapse_scanner::config::DEFAULT_WORKERS,
            debug: false,
            whois_failure: WhoisFailurePolicy::default(),
            page_budget: None,
        }
    }
}

impl HuntSettings {
    /// Loads the pattern files (falling back to defaults) into a scan config.
    pub fn build_scan_config(&self) -> Result<ScanConfig, ConfigError> {
        Ok(ScanConfig::new()
            .with_hub_patterns(load_or_default(&self.hubs_file, DEFAULT_HUB_PATTERNS)?)
            .with_blacklist(load_or_default(&self.blacklist_file, DEFAULT_BLACKLIST)?)
            .with_cloud_suffixes(load_or_default(
                &self.platforms_file,
                DEFAULT_CLOUD_SUFFIXES,
            )?)
            .with_tld_allow_list(&self.tld_allow_list)
            .with_max_depth(self.max_depth)
            .with_workers(self.workers)
            .with_debug(self.debug)
            .with_whois_failure(self.whois_failure)
            .with_page_budget(self.page_budget))
    }
}
