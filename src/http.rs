use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::{header, redirect::Policy, Client};

use crate::constants::{MAX_REDIRECTS, USER_AGENTS};
use crate::error::{ProbeError, ScanError};

/// HTTP capability used by the HTTP discovery method.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Final status code of a GET to `url`, after redirects.
    async fn status(&self, url: &str) -> Result<u16, ProbeError>;
}

/// Client for reachability checks. Certificate validation is off: a host
/// with a self-signed or mismatched certificate still counts as live.
pub fn create_client(timeout: Duration) -> Result<Client, ScanError> {
    Ok(Client::builder()
        .timeout(timeout)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(true)
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .build()?)
}

#[async_trait]
impl Fetch for Client {
    async fn status(&self, url: &str) -> Result<u16, ProbeError> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default();
        let resp = self
            .get(url)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        Ok(resp.status().as_u16())
    }
}
