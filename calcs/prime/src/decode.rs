//! Response parsers for the Prime link protocol.
//!
//! Screenshot response layout (payload offsets):
//! - Bytes 0-5: header
//! - Bytes 6-7: CRC16 (little-endian) over the payload minus its last 6 bytes
//! - Bytes 8-12: marker, the requested format byte followed by four 0xFF
//! - Bytes 13..: image data
//!
//! File responses use the record layout documented in [`crate::abi`].

use hpcalcs_core::{CalcError, Result, VarEntry, VtlPacket};
use log::{error, info, warn};

use crate::crc::crc16;
use crate::types::{
    CalcInfos, ChecksumPolicy, ProtocolOptions, ScreenshotFormat, CRC_EXCLUDED_TAIL,
    FILE_CRC_OFFSET, FILE_HEADER_LEN, FILLER_MARKER, MIN_FILE_RECORD_LEN, SCREEN_CRC_OFFSET,
    SCREEN_HEADER_LEN, SCREEN_MARKER_OFFSET,
};

/// Payload of a readiness response, unchanged
pub fn check_ready(pkt: VtlPacket) -> Vec<u8> {
    pkt.into_data()
}

/// Device information blob, unchanged
pub fn infos(pkt: VtlPacket) -> CalcInfos {
    CalcInfos {
        data: pkt.into_data(),
    }
}

/// Extract the image data of a screenshot response
pub fn screen(
    pkt: VtlPacket,
    format: ScreenshotFormat,
    options: &ProtocolOptions,
) -> Result<Vec<u8>> {
    let mut data = pkt.into_data();
    if data.len() <= SCREEN_HEADER_LEN {
        info!("screen: packet is too short: {} bytes", data.len());
        return Err(CalcError::BadPacketFormat("packet too short"));
    }

    verify_embedded_crc(&mut data, SCREEN_CRC_OFFSET, options)?;

    if data[SCREEN_MARKER_OFFSET..SCREEN_HEADER_LEN] != format.marker() {
        warn!("screen: unknown marker at beginning of image");
        return Err(CalcError::BadPacketFormat(
            "unknown marker at beginning of image",
        ));
    }

    data.drain(..SCREEN_HEADER_LEN);
    Ok(data)
}

/// Parse a file record.
///
/// Returns `Ok(None)` for the short filler packet the calculator sends when it
/// has nothing more to transfer.
pub fn file(pkt: VtlPacket, options: &ProtocolOptions) -> Result<Option<VarEntry>> {
    let mut data = pkt.into_data();
    if data.len() < MIN_FILE_RECORD_LEN {
        return match data.first() {
            Some(&FILLER_MARKER) => {
                info!("file: skipping {FILLER_MARKER:02X} packet");
                Ok(None)
            },
            _ => {
                info!("file: packet is too short: {} bytes", data.len());
                Err(CalcError::BadPacketFormat("packet too short"))
            },
        };
    }

    verify_embedded_crc(&mut data, FILE_CRC_OFFSET, options)?;

    let namelen = data[7] as usize;
    let Some(size) = data.len().checked_sub(FILE_HEADER_LEN + namelen) else {
        error!("file: weird size (packet too short ?)");
        return Err(CalcError::BadPacketFormat("negative data size"));
    };

    let mut entry = VarEntry::with_data(&data[FILE_HEADER_LEN + namelen..])?;
    entry.kind = data[6];
    entry.set_name_le_bytes(&data[FILE_HEADER_LEN..FILE_HEADER_LEN + namelen])?;
    info!(
        "file: created entry for {} with size {size} and type {:02X}",
        entry.name_lossy(),
        entry.kind
    );
    Ok(Some(entry))
}

/// Read the little-endian checksum at `offset`, zero it, and compare it with
/// the checksum of everything but the last 6 bytes.
fn verify_embedded_crc(data: &mut [u8], offset: usize, options: &ProtocolOptions) -> Result<()> {
    let embedded = u16::from_le_bytes([data[offset], data[offset + 1]]);
    data[offset..offset + 2].fill(0);
    let computed = crc16(&data[..data.len() - CRC_EXCLUDED_TAIL]);
    info!("embedded={embedded:04X} computed={computed:04X}");

    if computed != embedded {
        error!("CRC mismatch");
        if options.checksum == ChecksumPolicy::Strict {
            return Err(CalcError::ChecksumMismatch { embedded, computed });
        }
    }
    Ok(())
}
