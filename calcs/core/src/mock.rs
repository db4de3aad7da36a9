//! Scripted in-memory transport.
//!
//! [`MockTransport`] replays a queue of response payloads and records every
//! packet sent through it, so command encoders and response decoders can be
//! exercised without a calculator attached. It also backs capture replay.

use std::collections::VecDeque;

use crate::{CalcError, PacketTransport, Result, VtlPacket};

/// A [`PacketTransport`] that answers from a queue of canned responses.
///
/// Each `recv_packet` call pops the next queued item: a payload fills the
/// packet, a queued failure is returned as a communication error, and an
/// empty queue is itself a communication error.
#[derive(Debug)]
pub struct MockTransport {
    responses: VecDeque<std::result::Result<Vec<u8>, String>>,
    sent: Vec<VtlPacket>,
    open: bool,
    io_calls: usize,
}

impl MockTransport {
    /// Create an open transport with no queued responses
    pub fn new() -> Self {
        Self {
            responses: VecDeque::new(),
            sent: Vec::new(),
            open: true,
            io_calls: 0,
        }
    }

    /// Create an open transport answering with `responses` in order
    pub fn with_responses(responses: impl IntoIterator<Item = Vec<u8>>) -> Self {
        let mut this = Self::new();
        for response in responses {
            this.push_response(response);
        }
        this
    }

    /// Queue a response payload
    pub fn push_response(&mut self, payload: Vec<u8>) {
        self.responses.push_back(Ok(payload));
    }

    /// Queue a transport failure
    pub fn push_failure(&mut self, reason: impl Into<String>) {
        self.responses.push_back(Err(reason.into()));
    }

    /// Open or close the handle
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Every packet sent so far, oldest first
    pub fn sent(&self) -> &[VtlPacket] {
        &self.sent
    }

    /// Number of responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }

    /// Number of send and receive calls that reached the transport
    pub fn io_calls(&self) -> usize {
        self.io_calls
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketTransport for MockTransport {
    fn is_open(&self) -> bool {
        self.open
    }

    fn send_packet(&mut self, packet: &VtlPacket) -> Result<()> {
        self.io_calls += 1;
        if !self.open {
            return Err(CalcError::CommunicationFailure("transport closed".into()));
        }
        log::debug!("mock: sent {:02X} with {} bytes", packet.cmd, packet.len());
        self.sent.push(packet.clone());
        Ok(())
    }

    fn recv_packet(&mut self, packet: &mut VtlPacket) -> Result<()> {
        self.io_calls += 1;
        if !self.open {
            return Err(CalcError::CommunicationFailure("transport closed".into()));
        }
        match self.responses.pop_front() {
            Some(Ok(payload)) => {
                log::debug!("mock: answering {:02X} with {} bytes", packet.cmd, payload.len());
                packet.set_data(payload);
                Ok(())
            },
            Some(Err(reason)) => Err(CalcError::CommunicationFailure(reason)),
            None => Err(CalcError::CommunicationFailure("no response queued".into())),
        }
    }
}
