use parking_lot::Mutex;
use std::collections::HashMap;

/// Reverse mapping from destination address text (no brackets) to the
/// domains observed answering to it. Append-only between resets; entries
/// carry no TTL and reflect everything observed since the last clear.
#[derive(Debug, Default)]
pub struct DomainIndex {
    inner: Mutex<HashMap<String, Vec<String>>>,
}

impl DomainIndex {
    /// Associate one address with a set of domains, skipping empties and
    /// keeping each per-address list deduplicated in insertion order.
    pub fn insert(&self, ip: &str, domains: &[String]) {
        if ip.is_empty() {
            return;
        }
        let mut guard = self.inner.lock();
        let known = guard.entry(ip.to_string()).or_default();
        for domain in domains {
            if domain.is_empty() || known.iter().any(|existing| existing == domain) {
                continue;
            }
            known.push(domain.clone());
        }
    }

    /// Associate many addresses with the same set of domains.
    pub fn insert_many(&self, ips: &[String], domains: &[String]) {
        for ip in ips {
            self.insert(ip, domains);
        }
    }

    /// Snapshot of the domains observed for an address, empty when the
    /// address was never indexed.
    pub fn domains_for(&self, ip: &str) -> Vec<String> {
        self.inner.lock().get(ip).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}
