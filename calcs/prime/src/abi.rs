//! Request packet builders for the Prime link protocol.
//!
//! File record layout (payload offsets):
//! - Byte 0: tag (RECV_FILE when pushing a file, REQ_FILE when requesting one)
//! - Byte 1: sub-opcode 0x01
//! - Bytes 2-5: size of everything after this field (u32 BE)
//! - Byte 6: file type
//! - Byte 7: name length in bytes
//! - Bytes 8-9: CRC16 (little-endian) over the payload minus its last 6 bytes
//! - Bytes 10..: name (UTF-16LE), then file data

use hpcalcs_core::{CalcError, Result, VarEntry, VtlPacket};
use log::debug;

use crate::crc::crc16;
use crate::types::{
    cmd, ScreenshotFormat, CRC_EXCLUDED_TAIL, FILE_CRC_OFFSET, FILE_HEADER_LEN, FILE_SUBOPCODE,
    SIZE_FIELD_SPAN,
};

pub trait Arg {
    const SIZE: usize;
    fn to_bytes(&self) -> Vec<u8>;
}

impl Arg for ScreenshotFormat {
    const SIZE: usize = 1;
    #[inline(always)]
    fn to_bytes(&self) -> Vec<u8> {
        vec![self.as_byte()]
    }
}

macro_rules! impl_command_abi {
    [$(
        $( #[doc = $( $doc:tt )* ] )*
        fn $name:ident ( $route:expr => [ $( $hardcode:expr ),* ] $(, $arg:ident: $type:ty )* );
    )+] => {
        $(
            $(#[doc = concat!("Construct a packet for ", $($doc)*)])*
            #[allow(unused_mut)]
            pub fn $name( $( $arg: $type ),* ) -> Result<VtlPacket> {
                let header: &[u8] = &[$( $hardcode ),*];
                let mut pkt = VtlPacket::with_capacity(
                    $route,
                    header.len() $( + <$type as Arg>::SIZE )*,
                )?;
                pkt.extend(header)?;
                $(
                    pkt.extend(&$arg.to_bytes())?;
                )*
                Ok(pkt)
            }
        )*
    };
}

impl_command_abi![
    /// probing whether the calculator is ready
    fn check_ready(cmd::CHECK_READY => [cmd::CHECK_READY]);

    /// fetching the device information blob
    fn get_infos(cmd::GET_INFOS => [cmd::GET_INFOS]);

    /// capturing the screen in the requested encoding
    fn recv_screen(cmd::RECV_SCREEN => [cmd::RECV_SCREEN], format: ScreenshotFormat);

    /// starting a full backup, routed as a file record so replies match
    fn recv_backup(cmd::RECV_FILE => [cmd::RECV_BACKUP]);
];

/// Construct a file record pushing `entry` to the calculator
pub fn send_file(entry: &VarEntry) -> Result<VtlPacket> {
    file_record(cmd::RECV_FILE, entry, &entry.data)
}

/// Construct a file record requesting `entry` (by name and type) from the calculator
pub fn req_file(entry: &VarEntry) -> Result<VtlPacket> {
    file_record(cmd::REQ_FILE, entry, &[])
}

fn file_record(tag: u8, entry: &VarEntry, data: &[u8]) -> Result<VtlPacket> {
    let namelen = u8::try_from(entry.name_byte_len())
        .map_err(|_| CalcError::InvalidParameter("entry name exceeds 255 bytes"))?;
    let size = FILE_HEADER_LEN - SIZE_FIELD_SPAN + namelen as usize + data.len();
    let size_field =
        u32::try_from(size).map_err(|_| CalcError::InvalidParameter("file data too large"))?;
    debug!("file record has size {size} ({size:#x})");

    let mut pkt = VtlPacket::with_capacity(cmd::RECV_FILE, size + SIZE_FIELD_SPAN)?;
    pkt.extend(&[tag, FILE_SUBOPCODE])?;
    pkt.extend(&size_field.to_be_bytes())?;
    // crc placeholder stays zero while the checksum is computed
    pkt.extend(&[entry.kind, namelen, 0x00, 0x00])?;
    pkt.extend_iter(entry.name_le_bytes())?;
    pkt.extend(data)?;

    // the last 6 bytes are excluded from the checksum
    let end = pkt.len() - CRC_EXCLUDED_TAIL;
    let crc = crc16(&pkt.data()[..end]);
    pkt.data_mut()[FILE_CRC_OFFSET..FILE_CRC_OFFSET + 2].copy_from_slice(&crc.to_le_bytes());
    Ok(pkt)
}
