//! Capture files: recorded response packets, one per line as hex bytes.
//!
//! ```text
//! # screenshot, 320x240x16
//! fc 01 00 00 00 00 3a 91 08 ff ff ff ff 89 50 4e 47
//! f9
//! ```
//!
//! Bytes may be separated by whitespace or written back to back. `#` starts a
//! comment and blank lines are skipped.

use std::fs;
use std::path::Path;

use hpcalcs_core::MockTransport;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to read capture: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid hex {token:?}: {source}")]
    InvalidHex {
        line: usize,
        token: String,
        #[source]
        source: hex::FromHexError,
    },
}

/// Parse the packets of a capture
pub fn parse(text: &str) -> Result<Vec<Vec<u8>>, CaptureError> {
    let mut packets = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut packet = Vec::new();
        for token in line.split_whitespace() {
            let bytes = hex::decode(token).map_err(|source| CaptureError::InvalidHex {
                line: i + 1,
                token: token.to_string(),
                source,
            })?;
            packet.extend(bytes);
        }
        packets.push(packet);
    }
    Ok(packets)
}

/// Load a capture file into a transport that replays it
pub fn replay(path: &Path) -> Result<MockTransport, CaptureError> {
    let text = fs::read_to_string(path)?;
    let packets = parse(&text)?;
    log::info!("loaded {} packets from {}", packets.len(), path.display());
    Ok(MockTransport::with_responses(packets))
}

/// Format a payload as space separated hex
pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(" ")
}
