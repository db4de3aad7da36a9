//! Full round trips against a simulated calculator.

use std::collections::VecDeque;

use hpcalcs_core::{CalcError, PacketTransport, Result, VarEntry, VtlPacket};
use prime_calc::crc::crc16;
use prime_calc::types::{cmd, CRC_EXCLUDED_TAIL, FILE_HEADER_LEN};
use prime_calc::{ChecksumPolicy, Prime, ProtocolOptions, ScreenshotFormat};

/// A calculator that stores files and answers requests the way the device does
struct SimulatedCalc {
    files: Vec<VarEntry>,
    outbox: VecDeque<Vec<u8>>,
    screen: Vec<u8>,
    corrupt_next_record: bool,
}

impl SimulatedCalc {
    fn new(files: Vec<VarEntry>) -> Self {
        Self {
            files,
            outbox: VecDeque::new(),
            screen: b"\x89PNG\r\n\x1a\nfake-image".to_vec(),
            corrupt_next_record: false,
        }
    }

    fn record(&mut self, entry: &VarEntry) -> Vec<u8> {
        let mut data = prime_calc::abi::send_file(entry).unwrap().into_data();
        if std::mem::take(&mut self.corrupt_next_record) {
            data[6] ^= 0x80;
        }
        data
    }

    fn parse_record(payload: &[u8]) -> VarEntry {
        let namelen = payload[7] as usize;
        let mut entry = VarEntry::with_data(&payload[FILE_HEADER_LEN + namelen..]).unwrap();
        entry.kind = payload[6];
        entry
            .set_name_le_bytes(&payload[FILE_HEADER_LEN..FILE_HEADER_LEN + namelen])
            .unwrap();
        entry
    }
}

impl PacketTransport for SimulatedCalc {
    fn is_open(&self) -> bool {
        true
    }

    fn send_packet(&mut self, packet: &VtlPacket) -> Result<()> {
        let payload = packet.data();
        match payload.first().copied() {
            Some(cmd::CHECK_READY) => self.outbox.push_back(vec![cmd::CHECK_READY]),
            Some(cmd::GET_INFOS) => self.outbox.push_back(b"\xFAPrime G1 14181".to_vec()),
            Some(cmd::RECV_SCREEN) => {
                let mut data = vec![cmd::RECV_SCREEN, 0, 0, 0, 0, 0, 0, 0];
                data.extend_from_slice(&[payload[1], 0xFF, 0xFF, 0xFF, 0xFF]);
                data.extend_from_slice(&self.screen);
                let crc = crc16(&data[..data.len() - CRC_EXCLUDED_TAIL]);
                data[6..8].copy_from_slice(&crc.to_le_bytes());
                self.outbox.push_back(data);
            },
            Some(cmd::RECV_FILE) => {
                let entry = Self::parse_record(payload);
                self.files.retain(|f| f.name != entry.name);
                self.files.push(entry);
                self.outbox.push_back(vec![cmd::CHECK_READY]);
            },
            Some(cmd::REQ_FILE) => {
                let wanted = Self::parse_record(payload);
                let found = self
                    .files
                    .iter()
                    .find(|f| f.name == wanted.name && f.kind == wanted.kind)
                    .cloned();
                let reply = match found {
                    Some(entry) => self.record(&entry),
                    None => vec![cmd::RECV_BACKUP],
                };
                self.outbox.push_back(reply);
            },
            Some(cmd::RECV_BACKUP) => {
                for entry in self.files.clone() {
                    let record = self.record(&entry);
                    self.outbox.push_back(record);
                }
                self.outbox.push_back(vec![cmd::RECV_BACKUP, 0x00]);
            },
            _ => return Err(CalcError::CommunicationFailure("unknown request".into())),
        }
        Ok(())
    }

    fn recv_packet(&mut self, packet: &mut VtlPacket) -> Result<()> {
        let data = self
            .outbox
            .pop_front()
            .ok_or_else(|| CalcError::CommunicationFailure("nothing to read".into()))?;
        packet.set_data(data);
        Ok(())
    }
}

fn entry(name: &str, kind: u8, data: &[u8]) -> VarEntry {
    VarEntry {
        data: data.to_vec(),
        ..VarEntry::new(name, kind)
    }
}

#[test]
fn ready_and_infos() {
    let mut prime = Prime::new(SimulatedCalc::new(vec![]));
    assert_eq!(prime.check_ready().unwrap(), [cmd::CHECK_READY]);
    assert_eq!(prime.get_infos().unwrap().data, b"\xFAPrime G1 14181");
}

#[test]
fn screenshot_in_every_format() {
    let mut prime = Prime::new(SimulatedCalc::new(vec![]));
    for format in [
        ScreenshotFormat::Png320x240x16,
        ScreenshotFormat::Png320x240x4,
        ScreenshotFormat::Png160x120x16,
        ScreenshotFormat::Png160x120x4,
    ] {
        let image = prime.screenshot(format).unwrap();
        assert!(image.starts_with(b"\x89PNG"));
    }
}

#[test]
fn upload_then_download() {
    let mut prime = Prime::new(SimulatedCalc::new(vec![]));
    let program = entry("Hello", 0x06, b"EXPORT Hello() BEGIN PRINT(1); END;");
    prime.put_file(&program).unwrap();

    let got = prime
        .get_file(&VarEntry::new("Hello", 0x06))
        .unwrap()
        .unwrap();
    assert_eq!(got, program);

    // unknown files come back as a filler
    let missing = prime.get_file(&VarEntry::new("Nope", 0x06)).unwrap();
    assert!(missing.is_none());
}

#[test]
fn backup_returns_every_entry_in_order() {
    let files: Vec<_> = (0..12u8)
        .map(|i| entry(&format!("Var{i}"), i % 4, &vec![i; i as usize * 3]))
        .collect();
    let mut prime = Prime::new(SimulatedCalc::new(files.clone()));
    let backup = prime.backup().unwrap();
    assert_eq!(backup, files);
    assert!(prime.transport().outbox.is_empty());
}

#[test]
fn backup_of_empty_calculator() {
    let mut prime = Prime::new(SimulatedCalc::new(vec![]));
    assert!(prime.backup().unwrap().is_empty());
}

#[test]
fn corrupted_record_is_tolerated_unless_strict() {
    let files = vec![entry("A", 1, b"abc"), entry("B", 2, b"def")];

    let mut calc = SimulatedCalc::new(files.clone());
    calc.corrupt_next_record = true;
    let mut prime = Prime::new(calc);
    let backup = prime.backup().unwrap();
    assert_eq!(backup.len(), 2);
    assert_eq!(backup[0].kind, 1 ^ 0x80);

    let mut calc = SimulatedCalc::new(files);
    calc.corrupt_next_record = true;
    let options = ProtocolOptions {
        checksum: ChecksumPolicy::Strict,
    };
    let mut prime = Prime::with_options(calc, options);
    assert!(matches!(
        prime.backup(),
        Err(CalcError::ChecksumMismatch { .. })
    ));
}
