use std::fmt::Display;
use std::net::{AddrParseError, IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Destination address of a flow. `Unknown` covers flows whose address the
/// host could not attribute; it never reaches the reverse index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlowIp {
    #[default]
    Unknown,
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl FlowIp {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Canonical textual form without brackets, the reverse index key.
    /// `Unknown` renders empty.
    pub fn raw_string(&self) -> String {
        match self {
            Self::Unknown => String::new(),
            Self::V4(addr) => addr.to_string(),
            Self::V6(addr) => addr.to_string(),
        }
    }

    /// Human-facing form, IPv6 enclosed in brackets.
    pub fn display_string(&self) -> String {
        match self {
            Self::V6(addr) => format!("[{addr}]"),
            other => other.raw_string(),
        }
    }
}

impl From<IpAddr> for FlowIp {
    /// Narrows to the smallest form: an IPv4-mapped IPv6 address collapses
    /// to the V4 branch.
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(v4) => Self::V4(v4),
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => Self::V4(v4),
                None => Self::V6(v6),
            },
        }
    }
}

impl From<Ipv4Addr> for FlowIp {
    fn from(addr: Ipv4Addr) -> Self {
        Self::V4(addr)
    }
}

impl FromStr for FlowIp {
    type Err = AddrParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        IpAddr::from_str(value).map(Self::from)
    }
}

impl Display for FlowIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_string())
    }
}
