//! Application-protocol detection over the first payload bytes of a flow.
//! Pure classification: the caller supplies the transport and destination
//! port, the detector answers with a protocol tag and, where the protocol
//! carries one, the server name the flow is addressed to.

pub mod http;
pub mod tls;

/// Transport of the flow being classified, as known by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Dns,
    Tls,
    Http,
    Quic,
    Ssh,
    Ftp,
    Smtp,
    Imap,
    Pop3,
    Tcp,
    Udp,
    Unknown,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::Tls => "tls",
            Self::Http => "http",
            Self::Quic => "quic",
            Self::Ssh => "ssh",
            Self::Ftp => "ftp",
            Self::Smtp => "smtp",
            Self::Imap => "imap",
            Self::Pop3 => "pop3",
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Unknown => "unknown",
        }
    }
}

/// Outcome of a classification: a tag, plus the extracted server name when
/// the packet exposed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub protocol: Protocol,
    pub domain: Option<String>,
}

impl Detection {
    fn tag(protocol: Protocol) -> Self {
        Self {
            protocol,
            domain: None,
        }
    }
}

/// QUIC long-header versions the detector recognizes: v1, v2 and the IETF
/// draft space.
fn is_quic_version(version: u32) -> bool {
    version == 0x0000_0001 || version == 0x6b33_43cf || (version >> 8) == 0x00ff_0000
}

fn is_quic_long_header(payload: &[u8]) -> bool {
    if payload.len() < 5 || payload[0] & 0x80 == 0 {
        return false;
    }
    let version = u32::from_be_bytes([payload[1], payload[2], payload[3], payload[4]]);
    is_quic_version(version)
}

#[derive(Debug, Default)]
pub struct Detector;

impl Detector {
    pub fn new() -> Self {
        Self
    }

    /// Classify a packet. Never fails: anything unrecognized degrades to
    /// the transport tag, an empty payload to `Unknown`.
    pub fn detect(&self, transport: Transport, dst_port: u16, payload: &[u8]) -> Detection {
        if dst_port == 53 {
            // domains for DNS flows come from the DNS engine, not from here
            return Detection::tag(Protocol::Dns);
        }
        if payload.is_empty() {
            return Detection::tag(Protocol::Unknown);
        }

        if tls::is_handshake(payload) {
            let domain = tls::server_name(payload);
            if let Some(ref name) = domain {
                tracing::debug!("extracted server name {name:?} from client hello");
            }
            return Detection {
                protocol: Protocol::Tls,
                domain,
            };
        }

        if http::is_request(payload) {
            let domain = http::host(payload);
            if let Some(ref name) = domain {
                tracing::debug!("extracted host {name:?} from http request");
            }
            return Detection {
                protocol: Protocol::Http,
                domain,
            };
        }

        if transport == Transport::Udp && is_quic_long_header(payload) {
            return Detection::tag(Protocol::Quic);
        }

        if let Some(protocol) = Self::banner_protocol(dst_port, payload) {
            return Detection::tag(protocol);
        }

        Detection::tag(match transport {
            Transport::Tcp => Protocol::Tcp,
            Transport::Udp => Protocol::Udp,
        })
    }

    /// Banner and command shapes. Several command words are shared between
    /// protocols (`USER` is both FTP and POP3), the well-known destination
    /// port settles those.
    fn banner_protocol(dst_port: u16, payload: &[u8]) -> Option<Protocol> {
        if payload.starts_with(b"SSH-") {
            return Some(Protocol::Ssh);
        }
        if payload.starts_with(b"EHLO ") || payload.starts_with(b"HELO ") {
            return Some(Protocol::Smtp);
        }
        if payload.starts_with(b"+OK") {
            return Some(Protocol::Pop3);
        }
        if payload.starts_with(b"* OK") {
            return Some(Protocol::Imap);
        }
        if payload.starts_with(b"USER ") || payload.starts_with(b"PASS ") {
            return match dst_port {
                21 => Some(Protocol::Ftp),
                110 => Some(Protocol::Pop3),
                _ => None,
            };
        }
        if payload.starts_with(b"220 ") || payload.starts_with(b"220-") {
            return match dst_port {
                21 => Some(Protocol::Ftp),
                25 | 465 | 587 => Some(Protocol::Smtp),
                _ => None,
            };
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{Detection, Detector, Protocol, Transport};
    use similar_asserts::assert_eq;

    fn detect(transport: Transport, dst_port: u16, payload: &[u8]) -> Detection {
        Detector::new().detect(transport, dst_port, payload)
    }

    #[test]
    fn should_tag_dns_by_port_alone() {
        let result = detect(Transport::Udp, 53, b"\x12\x34\x01\x00");
        assert_eq!(result.protocol, Protocol::Dns);
        assert_eq!(result.domain, None);
    }

    #[test]
    fn should_tag_tls_and_extract_sni() {
        let record = super::tls::build_client_hello("www.baidu.com");
        let result = detect(Transport::Tcp, 443, &record);
        assert_eq!(result.protocol, Protocol::Tls);
        assert_eq!(result.domain, Some("www.baidu.com".to_string()));
    }

    #[test]
    fn should_keep_tls_tag_when_hello_is_truncated() {
        let record = super::tls::build_client_hello("www.example.com");
        let result = detect(Transport::Tcp, 443, &record[..record.len() - 4]);
        assert_eq!(result.protocol, Protocol::Tls);
        assert_eq!(result.domain, None);
    }

    #[test]
    fn should_tag_http_and_extract_host() {
        let payload = b"GET /index.html HTTP/1.1\r\nHost: api.example.com\r\n\r\n";
        let result = detect(Transport::Tcp, 80, payload);
        assert_eq!(result.protocol, Protocol::Http);
        assert_eq!(result.domain, Some("api.example.com".to_string()));
    }

    #[test]
    fn should_tag_quic_long_header_on_udp_only() {
        let mut payload = vec![0xC0, 0x00, 0x00, 0x00, 0x01];
        payload.extend_from_slice(&[0u8; 20]);
        assert_eq!(detect(Transport::Udp, 443, &payload).protocol, Protocol::Quic);
        assert_eq!(detect(Transport::Tcp, 443, &payload).protocol, Protocol::Tcp);
    }

    #[test]
    fn should_tag_banner_protocols() {
        assert_eq!(
            detect(Transport::Tcp, 22, b"SSH-2.0-OpenSSH_9.6\r\n").protocol,
            Protocol::Ssh
        );
        assert_eq!(
            detect(Transport::Tcp, 21, b"USER anonymous\r\n").protocol,
            Protocol::Ftp
        );
        assert_eq!(
            detect(Transport::Tcp, 110, b"USER joe\r\n").protocol,
            Protocol::Pop3
        );
        assert_eq!(
            detect(Transport::Tcp, 587, b"EHLO client.example\r\n").protocol,
            Protocol::Smtp
        );
        assert_eq!(
            detect(Transport::Tcp, 143, b"* OK IMAP4rev1 ready\r\n").protocol,
            Protocol::Imap
        );
    }

    #[test]
    fn should_fall_back_to_transport_tag() {
        assert_eq!(
            detect(Transport::Tcp, 9000, b"\x00\x01\x02\x03").protocol,
            Protocol::Tcp
        );
        assert_eq!(
            detect(Transport::Udp, 9000, b"\x00\x01\x02\x03").protocol,
            Protocol::Udp
        );
    }

    #[test]
    fn should_tag_empty_payload_unknown() {
        assert_eq!(detect(Transport::Tcp, 80, b"").protocol, Protocol::Unknown);
    }
}
