use crate::Result;

/// Logical packet: the command tag a transport matches on, plus the payload.
///
/// The stored length is always the number of payload bytes actually written or
/// received. Any wire framing (report numbers, chunking) is the transport's job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VtlPacket {
    /// Command tag used by the transport to route this packet
    pub cmd: u8,
    data: Vec<u8>,
}

impl VtlPacket {
    /// Create an empty packet for a response to be read into
    pub fn new(cmd: u8) -> Self {
        Self {
            cmd,
            data: Vec::new(),
        }
    }

    /// Create an empty packet with room for `capacity` payload bytes
    pub fn with_capacity(cmd: u8, capacity: usize) -> Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)?;
        Ok(Self { cmd, data })
    }

    /// Create a packet from an existing payload
    pub fn from_data(cmd: u8, data: Vec<u8>) -> Self {
        Self { cmd, data }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline(always)]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Append bytes to the payload
    pub fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.try_reserve(bytes.len())?;
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Append bytes from an iterator, reserving its lower size bound first
    pub fn extend_iter(&mut self, bytes: impl IntoIterator<Item = u8>) -> Result<()> {
        let bytes = bytes.into_iter();
        self.data.try_reserve(bytes.size_hint().0)?;
        self.data.extend(bytes);
        Ok(())
    }

    /// Replace the payload, used by transports when a packet arrives
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Take ownership of the payload
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
