//! High level abstraction for the HP Prime link protocol.
//!
//! [`Prime`] wraps a [`PacketTransport`] and exposes one send and one receive
//! operation per calculator command, plus combined round trips. Request
//! packets are built by [`abi`] and responses are parsed by [`decode`].
//!
//! Every call blocks until the transport finishes. A closed transport fails
//! with `CalcError::InvalidHandle` before anything is allocated or sent.

use hpcalcs_core::{CalcError, PacketTransport, Result, VarEntry, VtlPacket};
use log::{debug, error, info};

pub mod abi;
pub mod backup;
pub mod crc;
pub mod decode;
pub mod types;

pub use backup::BackupEntries;
pub use types::{CalcInfos, ChecksumPolicy, ProtocolOptions, ScreenshotFormat};

use types::cmd;

/// A connection to an HP Prime over some packet transport
pub struct Prime<T> {
    transport: T,
    options: ProtocolOptions,
}

impl<T: PacketTransport> Prime<T> {
    /// Wrap a transport with default options
    pub fn new(transport: T) -> Self {
        Self::with_options(transport, ProtocolOptions::default())
    }

    pub fn with_options(transport: T, options: ProtocolOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> &ProtocolOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }

    fn ensure_open(&self) -> Result<()> {
        if self.transport.is_open() {
            Ok(())
        } else {
            error!("handle is not open");
            Err(CalcError::InvalidHandle)
        }
    }

    /// Internal method to check the handle, build a request and send it
    fn send(&mut self, build: impl FnOnce() -> Result<VtlPacket>) -> Result<()> {
        self.ensure_open()?;
        let pkt = build().inspect_err(|err| error!("couldn't create packet: {err}"))?;
        self.transport.send_packet(&pkt)
    }

    /// Internal method to read the response to `cmd`
    fn read_response(&mut self, cmd: u8) -> Result<VtlPacket> {
        self.ensure_open()?;
        let mut pkt = VtlPacket::new(cmd);
        self.transport.recv_packet(&mut pkt).map_err(|err| {
            error!("failed to read packet: {err}");
            match err {
                CalcError::CommunicationFailure(_) => err,
                other => CalcError::CommunicationFailure(other.to_string()),
            }
        })?;

        // A mismatching first byte is common and not a failure
        match pkt.data().first() {
            Some(&first) if first == cmd => debug!("command matches returned data"),
            Some(_) => debug!("command does not match returned data"),
            None => info!("empty packet"),
        }
        Ok(pkt)
    }

    /* SEND SIDE */

    /// Ask whether the calculator is ready
    pub fn send_check_ready(&mut self) -> Result<()> {
        self.send(abi::check_ready)
    }

    /// Ask for the device information blob
    pub fn send_get_infos(&mut self) -> Result<()> {
        self.send(abi::get_infos)
    }

    /// Ask for a screenshot in `format`
    pub fn send_recv_screen(&mut self, format: ScreenshotFormat) -> Result<()> {
        self.send(|| abi::recv_screen(format))
    }

    /// Push `file` to the calculator
    pub fn send_file(&mut self, file: &VarEntry) -> Result<()> {
        self.send(|| abi::send_file(file))
    }

    /// Ask the calculator for the file matching `file`'s name and type
    pub fn send_recv_file(&mut self, file: &VarEntry) -> Result<()> {
        self.send(|| abi::req_file(file))
    }

    /// Ask the calculator to start a full backup
    pub fn send_recv_backup(&mut self) -> Result<()> {
        self.send(abi::recv_backup)
    }

    /* RECEIVE SIDE */

    /// Read the readiness response payload
    pub fn recv_check_ready(&mut self) -> Result<Vec<u8>> {
        let pkt = self.read_response(cmd::CHECK_READY)?;
        Ok(decode::check_ready(pkt))
    }

    /// Read the device information blob
    pub fn recv_get_infos(&mut self) -> Result<CalcInfos> {
        let pkt = self.read_response(cmd::GET_INFOS)?;
        Ok(decode::infos(pkt))
    }

    /// Read a screenshot, returning the image data after the marker
    pub fn recv_screen(&mut self, format: ScreenshotFormat) -> Result<Vec<u8>> {
        let pkt = self.read_response(cmd::RECV_SCREEN)?;
        decode::screen(pkt, format, &self.options)
    }

    /// Read the acknowledgement of a pushed file
    pub fn recv_send_file(&mut self) -> Result<()> {
        self.recv_check_ready().map(|_| ())
    }

    /// Read one file record. `None` means the calculator sent a filler instead.
    pub fn recv_file(&mut self) -> Result<Option<VarEntry>> {
        let pkt = self.read_response(cmd::RECV_FILE)?;
        decode::file(pkt, &self.options)
    }

    /// Stream the entries of a backup as they arrive
    pub fn backup_entries(&mut self) -> BackupEntries<'_, T> {
        BackupEntries::new(self)
    }

    /// Collect every entry of a backup, in the order received
    pub fn recv_backup(&mut self) -> Result<Vec<VarEntry>> {
        self.ensure_open()?;
        backup::collect(self.backup_entries())
    }

    /* ROUND TRIPS */

    /// Check readiness, returning the raw response
    pub fn check_ready(&mut self) -> Result<Vec<u8>> {
        self.send_check_ready()?;
        self.recv_check_ready()
    }

    /// Fetch the device information blob
    pub fn get_infos(&mut self) -> Result<CalcInfos> {
        self.send_get_infos()?;
        self.recv_get_infos()
    }

    /// Capture the screen
    pub fn screenshot(&mut self, format: ScreenshotFormat) -> Result<Vec<u8>> {
        self.send_recv_screen(format)?;
        self.recv_screen(format)
    }

    /// Push a file and wait for the acknowledgement
    pub fn put_file(&mut self, file: &VarEntry) -> Result<()> {
        self.send_file(file)?;
        self.recv_send_file()
    }

    /// Request a single file by name and type
    pub fn get_file(&mut self, file: &VarEntry) -> Result<Option<VarEntry>> {
        self.send_recv_file(file)?;
        self.recv_file()
    }

    /// Request and collect a full backup
    pub fn backup(&mut self) -> Result<Vec<VarEntry>> {
        self.send_recv_backup()?;
        self.recv_backup()
    }
}
