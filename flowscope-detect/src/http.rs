//! HTTP/1.x request recognition and Host extraction. Headers are assumed
//! ASCII; only the first 2 KiB of a packet are scanned, a `Host:` line
//! straddling that boundary is silently missed.

/// Method tokens with their mandatory trailing space (or slash for the
/// status-line form), which keeps random binary payloads from matching.
const TOKENS: [&[u8]; 9] = [
    b"GET ",
    b"POST ",
    b"PUT ",
    b"HEAD ",
    b"DELETE ",
    b"OPTIONS ",
    b"PATCH ",
    b"CONNECT ",
    b"HTTP/",
];

const SCAN_LIMIT: usize = 2048;

pub fn is_request(payload: &[u8]) -> bool {
    TOKENS.iter().any(|token| payload.starts_with(token))
}

fn is_connect(payload: &[u8]) -> bool {
    payload.starts_with(b"CONNECT ")
}

/// The `host[:port]` target of a CONNECT request line.
fn connect_target(payload: &[u8]) -> Option<String> {
    let line_end = payload
        .iter()
        .position(|b| *b == b'\r' || *b == b'\n')
        .unwrap_or(payload.len());
    let line = std::str::from_utf8(&payload[..line_end]).ok()?;
    let target = line.strip_prefix("CONNECT ")?.split(' ').next()?;
    let host = match target.rsplit_once(':') {
        Some((left, right)) if right.parse::<u16>().is_ok() => left,
        _ => target,
    };
    let host = host.trim_matches(|c| c == '[' || c == ']');
    if host.is_empty() {
        return None;
    }
    Some(host.to_string())
}

/// Scan the header block for a `Host:` line, case-insensitively. Only lines
/// fully terminated inside the scan window count.
fn host_header(payload: &[u8]) -> Option<String> {
    let window = &payload[..payload.len().min(SCAN_LIMIT)];
    let mut start = 0;
    while let Some(offset) = window[start..].iter().position(|b| *b == b'\n') {
        let line = &window[start..start + offset];
        start += offset + 1;

        if line.len() >= 5 && line[..5].eq_ignore_ascii_case(b"host:") {
            let value = std::str::from_utf8(&line[5..]).ok()?;
            let value = value.trim();
            if value.is_empty() || !value.is_ascii() {
                return None;
            }
            return Some(value.to_string());
        }
    }
    None
}

/// The server name a request is addressed to: the CONNECT target for
/// tunnel requests, the `Host:` header otherwise.
pub fn host(payload: &[u8]) -> Option<String> {
    if is_connect(payload) {
        connect_target(payload)
    } else {
        host_header(payload)
    }
}
