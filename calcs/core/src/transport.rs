use crate::{Result, VtlPacket};

/// Moves logical packets between the host and a connected calculator.
///
/// Implementations own the connection and all wire framing (report numbers,
/// chunking, timeouts). Payload bytes and lengths must be preserved exactly.
/// A single transport is used by one caller at a time.
pub trait PacketTransport {
    /// Whether the connection handle is usable
    fn is_open(&self) -> bool;

    /// Send one logical packet
    fn send_packet(&mut self, packet: &VtlPacket) -> Result<()>;

    /// Fill `packet` with the next logical packet from the calculator.
    ///
    /// `packet.cmd` holds the command tag the caller expects a response to.
    fn recv_packet(&mut self, packet: &mut VtlPacket) -> Result<()>;
}

impl<T: PacketTransport + ?Sized> PacketTransport for &mut T {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn send_packet(&mut self, packet: &VtlPacket) -> Result<()> {
        (**self).send_packet(packet)
    }

    fn recv_packet(&mut self, packet: &mut VtlPacket) -> Result<()> {
        (**self).recv_packet(packet)
    }
}

impl<T: PacketTransport + ?Sized> PacketTransport for Box<T> {
    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn send_packet(&mut self, packet: &VtlPacket) -> Result<()> {
        (**self).send_packet(packet)
    }

    fn recv_packet(&mut self, packet: &mut VtlPacket) -> Result<()> {
        (**self).recv_packet(packet)
    }
}
