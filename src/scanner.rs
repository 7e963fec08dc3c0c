use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::constants::PROGRESS_INTERVAL;
use crate::methods::Prober;
use crate::pipeline::probe;
use crate::record::{DiscoveryRecord, Method};
use crate::reporting::OutputSink;

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub domain: String,
    pub methods: Vec<Method>,
    pub concurrency: usize,
}

/// What a single completed check should announce.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Found {
        domain: String,
        method: Method,
    },
    Progress {
        checked: usize,
        found: usize,
        elapsed: Duration,
    },
}

/// Counters and findings for one scan. Owned by the coordinator and only
/// changed through [`ScanState::record`].
#[derive(Debug, Clone)]
pub struct ScanState {
    checked: usize,
    found: HashSet<String>,
    started: Instant,
    started_at: DateTime<Local>,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            checked: 0,
            found: HashSet::new(),
            started: Instant::now(),
            started_at: Local::now(),
        }
    }

    /// Accounts for one finished candidate.
    ///
    /// Returns `Found` only for a domain not seen before; a repeat is counted
    /// like a miss. Misses announce progress on every `PROGRESS_INTERVAL`th check.
    pub fn record(&mut self, result: Option<&DiscoveryRecord>) -> Option<Notification> {
        self.checked += 1;

        if let Some(record) = result {
            if self.found.insert(record.domain.clone()) {
                return Some(Notification::Found {
                    domain: record.domain.clone(),
                    method: record.method,
                });
            }
        }

        if self.checked % PROGRESS_INTERVAL == 0 {
            return Some(Notification::Progress {
                checked: self.checked,
                found: self.found.len(),
                elapsed: self.elapsed(),
            });
        }

        None
    }

    pub fn checked_count(&self) -> usize {
        self.checked
    }

    pub fn found(&self) -> &HashSet<String> {
        &self.found
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }
}

/// Bounded-parallel driver of the probe pipeline over a candidate list.
pub struct Scanner {
    config: ScanConfig,
    prober: Arc<Prober>,
    sinks: Vec<Box<dyn OutputSink>>,
    state: ScanState,
}

impl Scanner {
    pub fn new(config: ScanConfig, prober: Arc<Prober>) -> Self {
        Self {
            config,
            prober,
            sinks: Vec::new(),
            state: ScanState::new(),
        }
    }

    /// When this scan started; output headers stamp this time.
    pub fn started_at(&self) -> DateTime<Local> {
        self.state.started_at()
    }

    pub fn with_sinks(mut self, sinks: Vec<Box<dyn OutputSink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Probes every candidate, at most `concurrency` at a time.
    ///
    /// Completions are folded into the state one at a time by this loop, which
    /// is also the only writer to the sinks. Once `cancel` fires no further
    /// candidate is dispatched; tasks already running are awaited. Sinks are
    /// closed before returning.
    pub async fn run(mut self, candidates: Vec<String>, cancel: &CancellationToken) -> ScanState {
        let mut state = std::mem::take(&mut self.state);
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let domain: Arc<str> = Arc::from(self.config.domain.as_str());
        let methods: Arc<[Method]> = Arc::from(self.config.methods.as_slice());

        let mut pending = candidates.into_iter().peekable();
        let mut tasks = FuturesUnordered::new();
        let mut dispatched = 0usize;
        let mut stopping = false;

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled(), if !stopping && pending.peek().is_some() => {
                    stopping = true;
                    warn!(
                        dispatched,
                        in_flight = tasks.len(),
                        "scan cancelled, draining in-flight checks"
                    );
                    println!("\n[!] Scan interrupted, waiting for {} in-flight checks", tasks.len());
                }

                Some(joined) = tasks.next(), if !tasks.is_empty() => {
                    self.complete(&mut state, joined);
                }

                permit = semaphore.clone().acquire_owned(), if !stopping && pending.peek().is_some() => {
                    let (Ok(permit), Some(label)) = (permit, pending.next()) else {
                        break;
                    };
                    let prober = self.prober.clone();
                    let domain = domain.clone();
                    let methods = methods.clone();
                    dispatched += 1;

                    tasks.push(tokio::spawn(async move {
                        let result = probe(&prober, &label, &domain, &methods).await;
                        drop(permit);
                        result
                    }));
                }

                else => break,
            }
        }

        info!(
            dispatched,
            checked = state.checked_count(),
            found = state.found().len(),
            "scan finished"
        );
        self.close_sinks();
        state
    }

    fn complete(&mut self, state: &mut ScanState, joined: Result<Option<DiscoveryRecord>, JoinError>) {
        let result = joined.unwrap_or_else(|e| {
            warn!("probe task failed, counting as not found: {}", e);
            None
        });

        match state.record(result.as_ref()) {
            Some(Notification::Found { domain, method }) => {
                if let Some(record) = &result {
                    self.fan_out(record);
                }
                println!("[+] Found: {} (method: {})", domain, method);
            }
            Some(Notification::Progress {
                checked,
                found,
                elapsed,
            }) => {
                println!(
                    "[*] Checked {} candidates, found {}, elapsed {:.2}s",
                    checked,
                    found,
                    elapsed.as_secs_f64()
                );
            }
            None => {}
        }
    }

    fn fan_out(&mut self, record: &DiscoveryRecord) {
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.write(record) {
                warn!(domain = %record.domain, "output write failed: {}", e);
            }
        }
    }

    fn close_sinks(&mut self) {
        for sink in self.sinks.iter_mut() {
            if let Err(e) = sink.close() {
                warn!("output close failed: {}", e);
            }
        }
        debug!(sinks = self.sinks.len(), "outputs closed");
    }
}
