pub mod args;
pub mod constants;
pub mod dns;
pub mod error;
pub mod http;
pub mod methods;
pub mod pipeline;
pub mod record;
pub mod reporting;
pub mod scanner;
pub mod summary;
pub mod wordlist;

pub use args::Args;
pub use error::ScanError;
pub use record::{DiscoveryRecord, Method};
pub use scanner::{ScanConfig, ScanState, Scanner};

use std::sync::Arc;

use itertools::Itertools;
use tokio_util::sync::CancellationToken;
use tracing::info;

use constants::DOMAIN_REGEX;
use dns::create_resolver;
use http::create_client;
use methods::Prober;
use reporting::{open_sink, OutputSink};
use summary::print_summary;
use wordlist::load_candidates;

/// Lower-cases, strips a trailing dot and converts to IDNA ASCII form.
pub fn normalize_domain(raw: &str) -> Result<String, ScanError> {
    let trimmed = raw.trim().trim_end_matches('.').to_lowercase();
    let ascii = idna::domain_to_ascii(&trimmed)
        .map_err(|_| ScanError::InvalidDomain(raw.to_string()))?;

    if DOMAIN_REGEX.is_match(&ascii) {
        Ok(ascii)
    } else {
        Err(ScanError::InvalidDomain(raw.to_string()))
    }
}

/// Runs a full scan from parsed arguments and prints the summary.
///
/// Errors are only returned for setup failures, before any candidate is
/// probed. An interrupt through `cancel` still yields the partial state.
pub async fn run(args: Args, cancel: CancellationToken) -> Result<ScanState, ScanError> {
    let domain = normalize_domain(&args.domain)?;
    let timeout = args.timeout;

    let client = create_client(timeout)?;
    let resolver = create_resolver(args.nameserver, timeout);
    let prober = Arc::new(Prober::new(Arc::new(resolver), Arc::new(client), timeout));

    let config = ScanConfig {
        domain: domain.clone(),
        methods: args.methods.clone(),
        concurrency: usize::from(args.threads),
    };
    let scanner = Scanner::new(config, prober);
    let sinks = args
        .output
        .iter()
        .map(|path| open_sink(path, &domain, scanner.started_at()))
        .collect::<Result<Vec<Box<dyn OutputSink>>, _>>()?;

    let candidates = load_candidates(args.wordlist.as_deref());

    println!("[*] Starting subdomain scan for *.{}", domain);
    println!("[*] Configuration:");
    println!("    - Candidates: {}", candidates.len());
    println!("    - Threads: {}", args.threads);
    println!("    - Timeout: {}s", args.timeout.as_secs_f64());
    println!("    - Methods: {}", args.methods.iter().join(", "));
    if !args.output.is_empty() {
        println!(
            "    - Output: {}",
            args.output.iter().map(|p| p.display()).join(", ")
        );
    }
    info!(%domain, candidates = candidates.len(), "scan starting");

    let state = scanner
        .with_sinks(sinks)
        .run(candidates, &cancel)
        .await;

    print_summary(&state);
    Ok(state)
}
