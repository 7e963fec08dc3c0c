use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;
use trust_dns_resolver::{config::*, system_conf, TokioAsyncResolver};

use crate::error::ProbeError;

/// Name-resolution capability used by the DNS discovery method.
#[async_trait]
pub trait Resolve: Send + Sync {
    /// IPv4 addresses for `name`, in the order the server returned them.
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, ProbeError>;
}

/// Builds an IPv4-only resolver.
///
/// With `nameserver` set, queries go to that server over UDP; otherwise the
/// system name servers are used, falling back to Google's public resolvers
/// when they cannot be read.
pub fn create_resolver(nameserver: Option<SocketAddr>, timeout: Duration) -> TokioAsyncResolver {
    let config = match nameserver {
        Some(socket_addr) => {
            let mut config = ResolverConfig::new();
            config.add_name_server(udp_name_server(socket_addr));
            config
        }
        None => match system_conf::read_system_conf() {
            Ok((config, _)) => config,
            Err(e) => {
                warn!("system resolver configuration unavailable ({}), using 8.8.8.8", e);
                ResolverConfig::google()
            }
        },
    };

    build_resolver(&config, timeout)
}

fn udp_name_server(socket_addr: SocketAddr) -> NameServerConfig {
    NameServerConfig {
        socket_addr,
        protocol: Protocol::Udp,
        tls_dns_name: None,
        trust_negative_responses: false,
        bind_addr: None,
    }
}

/// Keeps only the name servers of `config`. A local domain or search list
/// would turn a miss on `label.base` into a hit on `label.base.<search>`.
fn build_resolver(config: &ResolverConfig, timeout: Duration) -> TokioAsyncResolver {
    let config = ResolverConfig::from_parts(None, vec![], config.name_servers().to_vec());

    let mut opts = ResolverOpts::default();
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.ip_strategy = LookupIpStrategy::Ipv4Only;

    TokioAsyncResolver::tokio(config, opts)
}

#[async_trait]
impl Resolve for TokioAsyncResolver {
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, ProbeError> {
        // fully qualified, so no suffix is ever appended
        let fqdn = format!("{}.", name.trim_end_matches('.'));
        let lookup = self
            .lookup_ip(fqdn.as_str())
            .await
            .map_err(|e| ProbeError::Resolve(e.to_string()))?;
        Ok(lookup.iter().filter(IpAddr::is_ipv4).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};
    use tokio::net::UdpSocket;
    use trust_dns_resolver::Name;

    /// Question name and the offset just past the question section.
    fn question(query: &[u8]) -> (String, usize) {
        let mut labels = Vec::new();
        let mut pos = 12;
        while query[pos] != 0 {
            let len = query[pos] as usize;
            labels.push(String::from_utf8_lossy(&query[pos + 1..pos + 1 + len]).to_lowercase());
            pos += 1 + len;
        }
        (labels.join("."), pos + 1 + 4)
    }

    /// Answers A 10.6.6.6 for `www.example.com` and anything under
    /// `corp.test`, NXDOMAIN for the rest. Every queried name is recorded.
    async fn serve(socket: UdpSocket, seen: Arc<Mutex<Vec<String>>>) {
        let mut buf = [0u8; 512];
        while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
            let query = &buf[..len];
            let (name, q_end) = question(query);
            seen.lock().unwrap().push(name.clone());

            let hit = name == "www.example.com" || name.ends_with("corp.test");
            let mut reply = Vec::with_capacity(q_end + 16);
            reply.extend_from_slice(&query[..2]);
            let flags: [u8; 2] = if hit { [0x81, 0x80] } else { [0x81, 0x83] };
            reply.extend_from_slice(&flags);
            reply.extend_from_slice(&[0, 1, 0, hit as u8, 0, 0, 0, 0]);
            reply.extend_from_slice(&query[12..q_end]);
            if hit {
                reply.extend_from_slice(&[
                    0xc0, 0x0c, 0, 1, 0, 1, 0, 0, 0, 0x3c, 0, 4, 10, 6, 6, 6,
                ]);
            }
            let _ = socket.send_to(&reply, peer).await;
        }
    }

    #[tokio::test]
    async fn search_domains_never_complete_a_name() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        tokio::spawn(serve(socket, seen.clone()));

        let system = ResolverConfig::from_parts(
            Some(Name::from_str("corp.test").unwrap()),
            vec![Name::from_str("corp.test").unwrap()],
            vec![udp_name_server(addr)],
        );
        let resolver = build_resolver(&system, Duration::from_secs(2));

        assert!(resolver.resolve("doesnotexist123.example.com").await.is_err());
        assert_eq!(
            resolver.resolve("www.example.com").await.unwrap(),
            vec!["10.6.6.6".parse::<IpAddr>().unwrap()]
        );

        let seen = seen.lock().unwrap();
        assert!(seen.contains(&"doesnotexist123.example.com".to_string()));
        assert!(
            seen.iter().all(|name| !name.ends_with("corp.test")),
            "search suffix was queried: {:?}",
            seen
        );
    }

    #[tokio::test]
    async fn nameserver_override_receives_the_queries() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        tokio::spawn(serve(socket, seen.clone()));

        let resolver = create_resolver(Some(addr), Duration::from_secs(2));
        assert_eq!(resolver.resolve("www.example.com.").await.unwrap().len(), 1);
        assert_eq!(seen.lock().unwrap().as_slice(), ["www.example.com"]);
    }
}
