use flowscope_proto::packet::record::Record;
use flowscope_proto::packet::{DnsMessage, QueryType};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::ops::Add;
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_capacity")]
    capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: Self::default_capacity(),
        }
    }
}

impl Config {
    pub fn default_capacity() -> usize {
        2048
    }
}

impl Config {
    pub fn build(self) -> ResponseCache {
        ResponseCache::new(self.capacity)
    }
}

/// Normalized question identity: `(lowercased qname, qtype, qclass)`.
type QuestionKey = (String, QueryType, u16);

#[derive(Debug)]
struct CacheEntry {
    response: Vec<u8>,
    expires_at: SystemTime,
}

/// Bounded store of encoded responses, least-recently-used out first. The
/// stored bytes are replayed verbatim for a matching query, only the
/// transaction id is rewritten.
pub struct ResponseCache {
    inner: Mutex<LruCache<QuestionKey, CacheEntry>>,
}

impl ResponseCache {
    fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Keep a raw response for replay. Queries, truncated responses and
    /// responses without an address answer are not worth keeping; a zero
    /// minimum TTL forbids keeping one.
    #[tracing::instrument(skip_all)]
    pub fn store(&self, packet: &[u8]) {
        let Ok(message) = DnsMessage::decode(packet) else {
            return;
        };
        if !message.is_response() || message.header.truncated {
            return;
        }
        if !message
            .answers
            .iter()
            .any(|record| matches!(record, Record::A { .. } | Record::AAAA { .. }))
        {
            return;
        }
        let Some(question) = message.questions.first() else {
            return;
        };
        let Some(min_ttl) = message.answers.iter().map(Record::ttl).min() else {
            return;
        };
        if min_ttl == 0 {
            tracing::debug!("zero ttl, not caching");
            return;
        }

        let key = question.key();
        tracing::debug!(
            "caching response for {:?} with a ttl of {min_ttl} seconds",
            key.0
        );
        let entry = CacheEntry {
            response: packet.to_vec(),
            expires_at: SystemTime::now().add(Duration::from_secs(min_ttl as u64)),
        };
        self.inner.lock().put(key, entry);
    }

    /// Answer a raw query from the cache. On a hit the response image is
    /// copied into `out` with the query's transaction id patched in, so the
    /// lock is released before the caller transmits anything.
    #[tracing::instrument(skip_all)]
    pub fn lookup(&self, query: &[u8], out: &mut Vec<u8>) -> bool {
        let Ok(message) = DnsMessage::decode(query) else {
            return false;
        };
        let Some(question) = message.questions.first() else {
            return false;
        };
        let key = question.key();

        {
            let mut guard = self.inner.lock();
            let Some(entry) = guard.get(&key) else {
                tracing::debug!("not found in cache");
                return false;
            };
            if entry.expires_at <= SystemTime::now() {
                tracing::debug!("found in cache but expired");
                guard.pop(&key);
                return false;
            }
            out.clear();
            out.extend_from_slice(&entry.response);
        }

        out[0..2].copy_from_slice(&message.header.id.to_be_bytes());
        true
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
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
