//! Error types for cloud-ip-lists

use crate::models::Family;
use std::path::PathBuf;
use thiserror::Error;

/// Why a single CIDR, address or range could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("missing '/' between address and prefix length")]
    MissingPrefix,

    #[error("invalid {family} address '{addr}'")]
    InvalidAddress { family: Family, addr: String },

    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),

    #[error("prefix length /{prefix} exceeds /{max}")]
    PrefixOutOfRange { prefix: u32, max: u8 },

    #[error("range start {start} is after range end {end}")]
    InvertedRange { start: String, end: String },
}

/// A rejected input entry: where it was, what it was, and why.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("entry #{index} '{input}': {error}")]
pub struct EntryError {
    pub index: usize,
    pub input: String,
    pub error: CidrError,
}

/// Aggregation refused its batch. Carries every malformed entry, not just the first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} malformed {family} {}: {}", .entries.len(), entry_noun(.entries), summarize(.entries))]
pub struct AggregateError {
    pub family: Family,
    pub entries: Vec<EntryError>,
}

fn entry_noun(entries: &[EntryError]) -> &'static str {
    if entries.len() == 1 {
        "entry"
    } else {
        "entries"
    }
}

fn summarize(entries: &[EntryError]) -> String {
    const SHOWN: usize = 3;
    let mut shown: Vec<String> = entries.iter().take(SHOWN).map(|e| e.to_string()).collect();
    if entries.len() > SHOWN {
        shown.push(format!("... and {} more", entries.len() - SHOWN));
    }
    shown.join("; ")
}

/// Errors turning a provider document into CIDR lists.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("invalid {provider} JSON at '{path}': {message}")]
    Json {
        provider: String,
        path: String,
        message: String,
    },

    #[error("unexpected {provider} format: {message}")]
    Format { provider: String, message: String },

    #[error("unknown provider '{0}'")]
    Unknown(String),

    #[error("ip2asn line {line}: {message}")]
    Ip2Asn { line: usize, message: String },
}

/// One failed download inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Errors from the concurrent downloader. A batch either fully succeeds or fails as a whole.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("{} of the batch downloads failed: {}", .failures.len(), describe_failures(.failures))]
    Batch { failures: Vec<FetchFailure> },
}

fn describe_failures(failures: &[FetchFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({}): {}", f.name, f.url, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {} at '{json_path}': {message}", .path.display())]
    Json {
        path: PathBuf,
        json_path: String,
        message: String,
    },
}
