use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Command tags
pub mod cmd {
    /// Readiness check
    pub const CHECK_READY: u8 = 0xFF;
    /// Device information
    pub const GET_INFOS: u8 = 0xFA;
    /// Screenshot capture
    pub const RECV_SCREEN: u8 = 0xFC;
    /// Full backup
    pub const RECV_BACKUP: u8 = 0xF9;
    /// Request an individual file from the calculator
    pub const REQ_FILE: u8 = 0xF8;
    /// File record, in either direction
    pub const RECV_FILE: u8 = 0xF7;
}

/// Sub-opcode following the tag of every file record
pub const FILE_SUBOPCODE: u8 = 0x01;

/// First byte of the short packets that end a backup
pub const FILLER_MARKER: u8 = cmd::RECV_BACKUP;

/// Bytes before the name in a file record
pub const FILE_HEADER_LEN: usize = 10;

/// Tag, sub-opcode and the 4-byte size field, which the size field does not count
pub const SIZE_FIELD_SPAN: usize = 6;

/// Trailing payload bytes left out of every record checksum
pub const CRC_EXCLUDED_TAIL: usize = 6;

/// Smallest payload treated as a file record rather than a filler
pub const MIN_FILE_RECORD_LEN: usize = 11;

/// Bytes before the image data in a screenshot response
pub const SCREEN_HEADER_LEN: usize = 13;

/// Offset of the embedded checksum in a file record
pub const FILE_CRC_OFFSET: usize = 8;

/// Offset of the embedded checksum in a screenshot response
pub const SCREEN_CRC_OFFSET: usize = 6;

/// Offset of the format marker in a screenshot response
pub const SCREEN_MARKER_OFFSET: usize = 8;

/// Screenshot encodings the calculator understands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScreenshotFormat {
    #[default]
    #[serde(rename = "png-320x240x16")]
    Png320x240x16 = 8,
    #[serde(rename = "png-320x240x4")]
    Png320x240x4 = 9,
    #[serde(rename = "png-160x120x16")]
    Png160x120x16 = 10,
    #[serde(rename = "png-160x120x4")]
    Png160x120x4 = 11,
}

impl ScreenshotFormat {
    pub const OPTIONS: &'static str =
        "[ png-320x240x16, png-320x240x4, png-160x120x16, png-160x120x4 ]";

    /// Parse the wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            8 => Some(Self::Png320x240x16),
            9 => Some(Self::Png320x240x4),
            10 => Some(Self::Png160x120x16),
            11 => Some(Self::Png160x120x4),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Image dimensions as `(width, height)`
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Png320x240x16 | Self::Png320x240x4 => (320, 240),
            Self::Png160x120x16 | Self::Png160x120x4 => (160, 120),
        }
    }

    /// The screenshot marker the calculator echoes back: format byte then four 0xFF
    pub fn marker(&self) -> [u8; 5] {
        [self.as_byte(), 0xFF, 0xFF, 0xFF, 0xFF]
    }
}

impl FromStr for ScreenshotFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "png-320x240x16" => Ok(Self::Png320x240x16),
            "png-320x240x4" => Ok(Self::Png320x240x4),
            "png-160x120x16" => Ok(Self::Png160x120x16),
            "png-160x120x4" => Ok(Self::Png160x120x4),
            _ => Err(format!(
                "invalid screenshot format, must be one of: {}",
                Self::OPTIONS
            )),
        }
    }
}

impl Display for ScreenshotFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Png320x240x16 => "png-320x240x16",
            Self::Png320x240x4 => "png-320x240x4",
            Self::Png160x120x16 => "png-160x120x16",
            Self::Png160x120x4 => "png-160x120x4",
        })
    }
}

/// Opaque device information blob
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalcInfos {
    pub data: Vec<u8>,
}

impl CalcInfos {
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What to do when an embedded checksum does not match
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Log the mismatch and carry on
    #[default]
    Lenient,
    /// Fail with `CalcError::ChecksumMismatch`
    Strict,
}

/// Tunables for the command layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolOptions {
    pub checksum: ChecksumPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_roundtrip() {
        for byte in 0..=u8::MAX {
            if let Some(format) = ScreenshotFormat::from_byte(byte) {
                assert_eq!(format.as_byte(), byte);
            }
        }
        assert_eq!(ScreenshotFormat::from_byte(7), None);
        assert_eq!(ScreenshotFormat::from_byte(12), None);
    }

    #[test]
    fn format_from_str() {
        assert_eq!(
            "PNG-160x120x4".parse::<ScreenshotFormat>(),
            Ok(ScreenshotFormat::Png160x120x4)
        );
        assert!("bmp".parse::<ScreenshotFormat>().is_err());
        let format = ScreenshotFormat::Png320x240x4;
        assert_eq!(format.to_string().parse::<ScreenshotFormat>(), Ok(format));
    }

    #[test]
    fn marker_layout() {
        assert_eq!(
            ScreenshotFormat::Png320x240x16.marker(),
            [8, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn filler_is_backup_tag() {
        assert_eq!(FILLER_MARKER, 0xF9);
    }
}
