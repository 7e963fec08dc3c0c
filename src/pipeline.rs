use crate::methods::{Outcome, Prober};
use crate::record::{target_name, DiscoveryRecord, Method};

/// Tries `methods` in order against `label.base` and stops at the first hit.
pub async fn probe(
    prober: &Prober,
    label: &str,
    base: &str,
    methods: &[Method],
) -> Option<DiscoveryRecord> {
    let target = target_name(label, base);

    for &method in methods {
        if let Outcome::Found { addresses, method } = prober.run(method, &target).await {
            return Some(DiscoveryRecord::new(target, addresses, method));
        }
    }

    None
}
