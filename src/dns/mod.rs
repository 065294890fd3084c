use crate::model::context::FlowContext;
use crate::repository::cache::ResponseCache;
use crate::repository::index::DomainIndex;
use flowscope_proto::packet::record::Record;
use flowscope_proto::packet::DnsMessage;

/// Smallest well-formed message: the fixed header alone.
const HEADER_SIZE: usize = 12;

fn push_unique(list: &mut Vec<String>, name: &str) {
    if name.is_empty() || list.iter().any(|known| known == name) {
        return;
    }
    list.push(name.to_string());
}

/// Glue between the wire parser, the response cache and the reverse index.
/// Never surfaces an error: a packet that fails to decode simply teaches us
/// nothing, the worst outcome is a missed cache opportunity.
pub struct DnsInspector {
    cache: ResponseCache,
    index: DomainIndex,
}

impl DnsInspector {
    pub fn new(cache: ResponseCache) -> Self {
        Self {
            cache,
            index: DomainIndex::default(),
        }
    }

    /// Probe the cache with an outbound query. The question name lands in
    /// the context either way; on a hit `out` holds the replayable response
    /// and the caller must send it back instead of forwarding the query.
    #[tracing::instrument(skip_all, fields(session = ctx.session_id))]
    pub fn handle_query(&self, ctx: &mut FlowContext, packet: &[u8], out: &mut Vec<u8>) -> bool {
        let Ok(message) = DnsMessage::decode(packet) else {
            tracing::debug!("unable to decode query");
            return false;
        };
        if let Some(question) = message.questions.first() {
            ctx.add_domain(&question.name);
        }
        self.cache.lookup(packet, out)
    }

    /// Ingest an inbound response: every name it mentions is appended to
    /// the context, every answered address is indexed against all of those
    /// names, and the raw bytes are kept for replay when an address record
    /// was present.
    #[tracing::instrument(skip_all, fields(session = ctx.session_id))]
    pub fn handle_response(&self, ctx: &mut FlowContext, packet: &[u8]) {
        if packet.len() < HEADER_SIZE {
            return;
        }
        let Ok(message) = DnsMessage::decode(packet) else {
            tracing::debug!("unable to decode response");
            return;
        };
        if !message.is_response() {
            return;
        }

        let mut names = Vec::new();
        let mut ips = Vec::new();
        let mut has_address = false;

        for question in &message.questions {
            push_unique(&mut names, &question.name);
        }
        for record in &message.answers {
            push_unique(&mut names, record.domain());
            match record {
                Record::A { addr, .. } => {
                    ips.push(addr.to_string());
                    has_address = true;
                }
                Record::AAAA { addr, .. } => {
                    ips.push(addr.to_string());
                    has_address = true;
                }
                Record::CNAME { host, .. } => push_unique(&mut names, host),
                Record::PTR { host, .. } => push_unique(&mut names, host),
                Record::MX { host, .. } => push_unique(&mut names, host),
                Record::SRV { host, .. } => push_unique(&mut names, host),
                Record::Unknown { .. } => {}
            }
        }

        tracing::debug!(
            "learned {} names over {} addresses",
            names.len(),
            ips.len()
        );
        ctx.add_domains(&names);
        self.index.insert_many(&ips, &names);
        if has_address {
            self.cache.store(packet);
        }
    }

    /// Snapshot of the domains observed answering for an address.
    pub fn domains_for_ip(&self, ip: &str) -> Vec<String> {
        self.index.domains_for(ip)
    }

    /// Reset the response cache and the reverse index together.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.index.clear();
    }
}
