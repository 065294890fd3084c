use super::ip::FlowIp;
use std::cell::OnceCell;

pub const DNS_PORT: u16 = 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    Tcp,
    Udp,
    Dns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

/// Admission decision the surrounding proxy applies to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowDecision {
    Block,
    #[default]
    Allow,
}

/// Routing decision the surrounding proxy applies to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathDecision {
    None,
    Direct,
    #[default]
    Local,
    Gateway,
}

/// Per-flow state the host threads through the engine. Owned by exactly one
/// caller at a time; the engine mutates it during a call and keeps no
/// reference afterwards.
#[derive(Debug, Clone)]
pub struct FlowContext {
    /// Opaque host-assigned session identifier.
    pub session_id: u64,
    /// Flow creation time, nanoseconds. Informational.
    pub timestamp_ns: u64,
    pub process_id: u32,
    pub process_name: String,
    pub process_path: String,

    pub flow_type: FlowType,
    pub direction: Direction,
    pub dst_ip: FlowIp,
    pub dst_port: u16,

    /// Server names observed for this flow, insertion-ordered, no
    /// duplicates, no empty strings.
    domains: Vec<String>,

    pub flow_decision: FlowDecision,
    pub path_decision: PathDecision,

    ip_text: OnceCell<String>,
    ip_text_raw: OnceCell<String>,
}

impl FlowContext {
    pub fn new(flow_type: FlowType, direction: Direction, dst_ip: FlowIp, dst_port: u16) -> Self {
        Self {
            session_id: 0,
            timestamp_ns: 0,
            process_id: 0,
            process_name: String::new(),
            process_path: String::new(),
            flow_type,
            direction,
            dst_ip,
            dst_port,
            domains: Vec::new(),
            flow_decision: FlowDecision::default(),
            path_decision: PathDecision::default(),
            ip_text: OnceCell::new(),
            ip_text_raw: OnceCell::new(),
        }
    }

    pub fn with_session(mut self, session_id: u64, timestamp_ns: u64) -> Self {
        self.session_id = session_id;
        self.timestamp_ns = timestamp_ns;
        self
    }

    pub fn with_process<N: Into<String>, P: Into<String>>(
        mut self,
        process_id: u32,
        name: N,
        path: P,
    ) -> Self {
        self.process_id = process_id;
        self.process_name = name.into();
        self.process_path = path.into();
        self
    }

    pub fn is_dns(&self) -> bool {
        self.dst_port == DNS_PORT
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Record an observed server name. Empty names and names already
    /// present are dropped; returns whether the list grew.
    pub fn add_domain(&mut self, name: &str) -> bool {
        if name.is_empty() || self.domains.iter().any(|known| known == name) {
            return false;
        }
        self.domains.push(name.to_string());
        true
    }

    pub fn add_domains<I, S>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut grew = false;
        for name in names {
            grew |= self.add_domain(name.as_ref());
        }
        grew
    }

    /// Memoized display form of the destination address, IPv6 bracketed.
    pub fn ip_string(&self) -> &str {
        self.ip_text.get_or_init(|| self.dst_ip.display_string())
    }

    /// Memoized bracket-free form, the reverse index key.
    pub fn raw_ip_string(&self) -> &str {
        self.ip_text_raw.get_or_init(|| self.dst_ip.raw_string())
    }
}
