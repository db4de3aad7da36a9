use crate::{CalcError, Result};

/// A named file or variable, as stored on or transferred to a calculator.
///
/// Names are sequences of UTF-16 code units with an explicit length; they are
/// never terminator-scanned.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VarEntry {
    pub name: Vec<u16>,
    /// Calculator-specific type tag
    pub kind: u8,
    pub data: Vec<u8>,
}

impl VarEntry {
    /// Create an entry with a name and type and no data
    pub fn new(name: &str, kind: u8) -> Self {
        Self {
            name: name.encode_utf16().collect(),
            kind,
            data: Vec::new(),
        }
    }

    /// Create an unnamed entry holding a copy of `data`
    pub fn with_data(data: &[u8]) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(data.len())?;
        buf.extend_from_slice(data);
        Ok(Self {
            data: buf,
            ..Default::default()
        })
    }

    /// Name length in bytes, as carried by the wire name-length field
    #[inline(always)]
    pub fn name_byte_len(&self) -> usize {
        self.name.len() * 2
    }

    /// Lossy conversion of the name for display
    pub fn name_lossy(&self) -> String {
        String::from_utf16_lossy(&self.name)
    }

    /// Replace the name from little-endian UTF-16 bytes. A trailing odd byte is dropped.
    pub fn set_name_le_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let chunks = bytes.chunks_exact(2);
        if !chunks.remainder().is_empty() {
            log::warn!("odd name length {}, dropping last byte", bytes.len());
        }
        let mut name = Vec::new();
        name.try_reserve_exact(bytes.len() / 2)?;
        name.extend(chunks.map(|pair| u16::from_le_bytes([pair[0], pair[1]])));
        self.name = name;
        Ok(())
    }

    /// Name as little-endian UTF-16 bytes
    pub fn name_le_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.name.iter().flat_map(|unit| unit.to_le_bytes())
    }
}

/// Append an entry to a list, growing the backing storage by one.
///
/// On allocation failure the entry is dropped and `OutOfMemory` is returned;
/// the list is left untouched so the caller decides whether to release it.
pub fn push_entry(list: &mut Vec<VarEntry>, entry: VarEntry) -> Result<()> {
    list.try_reserve(1).map_err(|_| CalcError::OutOfMemory)?;
    list.push(entry);
    Ok(())
}
