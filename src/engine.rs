use crate::config::Config;
use crate::dns::DnsInspector;
use crate::model::context::{FlowContext, FlowDecision, FlowType, PathDecision};
use flowscope_detect::{Detector, Transport};
use once_cell::sync::Lazy;

static GLOBAL: Lazy<FlowInspector> = Lazy::new(|| FlowInspector::new(Config::default()));

/// The per-packet pipeline: resolve the flow's server names from whatever
/// evidence is available, then recompute the decision from that evidence.
/// Owns the DNS engine and the detector; callers thread a `FlowContext`
/// through and read the decision back.
pub struct FlowInspector {
    dns: DnsInspector,
    detector: Detector,
}

impl FlowInspector {
    pub fn new(config: Config) -> Self {
        Self {
            dns: DnsInspector::new(config.cache.build()),
            detector: Detector::new(),
        }
    }

    /// The process-wide instance, lazily initialized on first use so every
    /// flow shares one response cache and one reverse index. Tests build
    /// isolated instances with [`FlowInspector::new`] instead.
    pub fn global() -> &'static FlowInspector {
        &GLOBAL
    }

    /// A flow identity became known, no payload yet. The reverse index may
    /// already name the destination.
    #[tracing::instrument(skip_all, fields(session = ctx.session_id))]
    pub fn flow_arrive(&self, ctx: &mut FlowContext) {
        self.resolve_domain_from_cache(ctx);
        self.reevaluate_decision(ctx);
    }

    /// Reserved extension point. A no-op, and stays one for blocked flows.
    pub fn flow_open(&self, _ctx: &mut FlowContext) {}

    /// Outbound payload. DNS queries go to the DNS engine (any cached
    /// response is dropped here, see [`Self::flow_send_with_response`]);
    /// everything else runs the resolve + reevaluate pipeline.
    #[tracing::instrument(skip_all, fields(session = ctx.session_id))]
    pub fn flow_send(&self, ctx: &mut FlowContext, packet: &[u8]) {
        if packet.is_empty() {
            return;
        }
        if ctx.is_dns() {
            let mut unused = Vec::new();
            self.dns.handle_query(ctx, packet, &mut unused);
            return;
        }
        if self.resolve_domain(ctx, packet) {
            self.reevaluate_decision(ctx);
        }
    }

    /// Outbound payload, cache-probing form. Returns true when `out` holds
    /// a response that must be sent back to the client instead of
    /// forwarding the packet upstream; always false for non-DNS traffic.
    #[tracing::instrument(skip_all, fields(session = ctx.session_id))]
    pub fn flow_send_with_response(
        &self,
        ctx: &mut FlowContext,
        packet: &[u8],
        out: &mut Vec<u8>,
    ) -> bool {
        if packet.is_empty() {
            return false;
        }
        if ctx.is_dns() {
            return self.dns.handle_query(ctx, packet, out);
        }
        if self.resolve_domain(ctx, packet) {
            self.reevaluate_decision(ctx);
        }
        false
    }

    /// Inbound payload. DNS responses feed the cache and the reverse
    /// index; everything else runs the resolve + reevaluate pipeline.
    #[tracing::instrument(skip_all, fields(session = ctx.session_id))]
    pub fn flow_recv(&self, ctx: &mut FlowContext, packet: &[u8]) {
        if packet.is_empty() {
            return;
        }
        if ctx.is_dns() {
            self.dns.handle_response(ctx, packet);
            return;
        }
        if self.resolve_domain(ctx, packet) {
            self.reevaluate_decision(ctx);
        }
    }

    /// Reserved.
    pub fn flow_close(&self, _ctx: &mut FlowContext) {}

    pub fn domains_for_ip(&self, ip: &str) -> Vec<String> {
        self.dns.domains_for_ip(ip)
    }

    pub fn clear_cache(&self) {
        self.dns.clear_cache();
    }

    /// Populate the context from the reverse index alone. Does nothing once
    /// the flow already has evidence.
    fn resolve_domain_from_cache(&self, ctx: &mut FlowContext) -> bool {
        if !ctx.domains().is_empty() {
            return false;
        }
        let found = self.dns.domains_for_ip(ctx.raw_ip_string());
        if found.is_empty() {
            return false;
        }
        tracing::debug!("resolved {} domains from reverse index", found.len());
        ctx.add_domains(&found)
    }

    /// Populate the context from the reverse index or, failing that, from
    /// the packet itself. Returns whether any new domain was learned.
    fn resolve_domain(&self, ctx: &mut FlowContext, packet: &[u8]) -> bool {
        if !ctx.domains().is_empty() {
            return false;
        }
        if self.resolve_domain_from_cache(ctx) {
            return true;
        }
        let transport = match ctx.flow_type {
            FlowType::Udp => Transport::Udp,
            FlowType::Tcp | FlowType::Dns => Transport::Tcp,
        };
        let detection = self.detector.detect(transport, ctx.dst_port, packet);
        match detection.domain {
            Some(name) => {
                tracing::debug!(
                    "detected {} with server name {name:?}",
                    detection.protocol.as_str()
                );
                ctx.add_domain(&name)
            }
            None => false,
        }
    }

    /// Recompute the decision from the context. Sole writer of
    /// `flow_decision` and `path_decision`, and deliberately a pure
    /// function of the context so every future policy source (blocklists,
    /// port rules) has one home. The current policy allows everything on
    /// the local path.
    fn reevaluate_decision(&self, ctx: &mut FlowContext) {
        ctx.flow_decision = FlowDecision::Allow;
        ctx.path_decision = PathDecision::Local;
    }
}
