use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::constants::COMMON_SUBDOMAINS;
use crate::error::ScanError;

/// Candidate labels for a scan.
///
/// Without a path this is the built-in list. A wordlist that cannot be read
/// is reported and yields no candidates, so the scan still runs (and ends
/// immediately) instead of failing.
pub fn load_candidates(path: Option<&Path>) -> Vec<String> {
    match path {
        None => builtin_candidates(),
        Some(path) => match read_wordlist(path) {
            Ok(labels) => {
                info!(path = %path.display(), count = labels.len(), "wordlist loaded");
                labels
            }
            Err(e) => {
                warn!("{}", e);
                println!("[-] {}", e);
                Vec::new()
            }
        },
    }
}

pub fn builtin_candidates() -> Vec<String> {
    dedup(COMMON_SUBDOMAINS.iter().map(|s| s.to_string()))
}

pub fn read_wordlist(path: &Path) -> Result<Vec<String>, ScanError> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Wordlist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_wordlist(&String::from_utf8_lossy(&bytes)))
}

/// One label per line; blank lines and `#` comments are skipped.
pub fn parse_wordlist(content: &str) -> Vec<String> {
    dedup(
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string),
    )
}

fn dedup(labels: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    labels.filter(|l| seen.insert(l.clone())).collect()
}
