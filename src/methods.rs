use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::dns::Resolve;
use crate::error::ProbeError;
use crate::http::Fetch;
use crate::record::Method;

/// Result of one discovery method against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found { addresses: Vec<String>, method: Method },
    NotFound,
}

/// Runs discovery methods against fully qualified names.
///
/// Holds no per-target state, so a single instance is shared by every
/// worker. Each network call is capped at `timeout`.
pub struct Prober {
    resolver: Arc<dyn Resolve>,
    fetcher: Arc<dyn Fetch>,
    timeout: Duration,
}

impl Prober {
    pub fn new(resolver: Arc<dyn Resolve>, fetcher: Arc<dyn Fetch>, timeout: Duration) -> Self {
        Self {
            resolver,
            fetcher,
            timeout,
        }
    }

    pub async fn run(&self, method: Method, target: &str) -> Outcome {
        let result = match method {
            Method::Dns => self.dns(target).await,
            Method::Http => self.http(target).await,
            Method::Cert => self.cert(target).await,
        };

        match result {
            Ok(addresses) => Outcome::Found { addresses, method },
            Err(e) => {
                debug!(target_name = target, %method, error = %e, "probe miss");
                Outcome::NotFound
            }
        }
    }

    async fn dns(&self, target: &str) -> Result<Vec<String>, ProbeError> {
        let ips = self.bounded(self.resolver.resolve(target)).await?;
        if ips.is_empty() {
            return Err(ProbeError::NoAddresses);
        }
        Ok(ips.iter().map(|ip| ip.to_string()).collect())
    }

    /// HTTPS first, then plain HTTP; the first scheme answering below 400 wins.
    async fn http(&self, target: &str) -> Result<Vec<String>, ProbeError> {
        let mut last_error = ProbeError::Transport("no scheme attempted".to_string());

        for scheme in ["https", "http"] {
            let url = format!("{}://{}", scheme, target);
            match self.bounded(self.fetcher.status(&url)).await {
                Ok(status) if status < 400 => return Ok(vec![url]),
                Ok(status) => last_error = ProbeError::Status(status),
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }

    /// Reserved for certificate-transparency lookups; never confirms anything.
    async fn cert(&self, _target: &str) -> Result<Vec<String>, ProbeError> {
        Err(ProbeError::Unsupported("certificate transparency"))
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ProbeError>>,
    ) -> Result<T, ProbeError> {
        timeout(self.timeout, call)
            .await
            .unwrap_or(Err(ProbeError::Timeout(self.timeout)))
    }
}
