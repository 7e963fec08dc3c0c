use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures that stop a scan before any candidate is dispatched, plus
/// wordlist problems that are reported and then degraded to an empty scan.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("wordlist {path} could not be read: {source}")]
    Wordlist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("output {path} could not be opened: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid target domain: {0}")]
    InvalidDomain(String),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Why a single discovery method did not confirm a target.
///
/// Every variant collapses to "not found" for the caller; the detail only
/// reaches debug logs.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("resolution failed: {0}")]
    Resolve(String),

    #[error("no addresses returned")]
    NoAddresses,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("status {0}")]
    Status(u16),

    #[error("{0} lookups are not implemented")]
    Unsupported(&'static str),
}
