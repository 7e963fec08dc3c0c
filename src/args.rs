use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::constants::{DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS};
use crate::record::Method;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Target domain to enumerate (e.g. example.com)
    pub domain: String,

    /// Wordlist with one label per line; the built-in list is used when omitted
    #[arg(short, long)]
    pub wordlist: Option<PathBuf>,

    /// Maximum number of candidates probed at once
    #[arg(short = 't', long = "threads", default_value_t = DEFAULT_THREADS,
          value_parser = clap::value_parser!(u16).range(1..))]
    pub threads: u16,

    /// Per-probe timeout in seconds
    #[arg(long, default_value = DEFAULT_TIMEOUT_SECS, value_parser = parse_timeout)]
    pub timeout: Duration,

    /// Output file; .json and .csv select those formats, anything else is text.
    /// May be repeated.
    #[arg(short, long, action = ArgAction::Append)]
    pub output: Vec<PathBuf>,

    /// Discovery methods, tried in the order given
    #[arg(long, value_enum, num_args = 1.., default_values_t = [Method::Dns, Method::Http])]
    pub methods: Vec<Method>,

    /// DNS server to query (ip or ip:port) instead of the system configuration
    #[arg(long, value_parser = parse_nameserver)]
    pub nameserver: Option<SocketAddr>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_timeout(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("`{}` is not a number", s))?;
    if !(secs.is_finite() && secs > 0.0) {
        return Err("timeout must be a positive number of seconds".to_string());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| format!("timeout `{}` is out of range", s))
}

fn parse_nameserver(s: &str) -> Result<SocketAddr, String> {
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    s.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, 53))
        .map_err(|_| format!("`{}` is not an IP address", s))
}
