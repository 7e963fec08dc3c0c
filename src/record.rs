use std::fmt;

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// A discovery technique. The CLI spells these `dns`, `http`, `cert`;
/// output files spell them `DNS`, `HTTP`, `CERT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Dns,
    Http,
    Cert,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Dns => "DNS",
            Method::Http => "HTTP",
            Method::Cert => "CERT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A confirmed subdomain. Built once, when the first method succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub domain: String,
    #[serde(rename = "ips")]
    pub addresses: Vec<String>,
    pub method: Method,
    #[serde(rename = "discovery_time")]
    pub discovered_at: DateTime<Local>,
}

impl DiscoveryRecord {
    pub fn new(domain: String, addresses: Vec<String>, method: Method) -> Self {
        Self {
            domain,
            addresses,
            method,
            discovered_at: Local::now(),
        }
    }
}

/// `label.base`, the fully qualified name under test.
pub fn target_name(label: &str, base: &str) -> String {
    format!("{}.{}", label, base)
}
