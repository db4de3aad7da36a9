use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use bpaf::Bpaf;
use hpcalcs_core::{MockTransport, VarEntry};
use prime_calc::{Prime, ScreenshotFormat};

use crate::capture::to_hex;
use crate::config::Config;

/// Entry type byte, parsed from decimal or `0x` hex
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeByte(pub u8);

impl FromStr for TypeByte {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => s.parse(),
        };
        parsed
            .map(Self)
            .map_err(|e| format!("invalid type byte {s}: {e}"))
    }
}

/// Entry selection:
#[derive(Clone, Debug, Bpaf)]
pub struct EntryArgs {
    /// Entry name on the calculator
    #[bpaf(short, long, argument("NAME"))]
    pub name: String,
    /// Entry type byte, decimal or 0x-prefixed hex
    #[bpaf(short('t'), long("type"), argument("TYPE"))]
    pub kind: TypeByte,
}

impl EntryArgs {
    fn to_entry(&self) -> VarEntry {
        VarEntry::new(&self.name, self.kind.0)
    }
}

#[derive(Clone, Debug, Bpaf)]
pub enum Request {
    /// Readiness check
    #[bpaf(command("check-ready"))]
    CheckReady,
    /// Device information request
    #[bpaf(command)]
    Infos,
    /// Screenshot request
    #[bpaf(command)]
    Screen {
        /// Screenshot encoding, defaults to the configured one.
        /// [png-320x240x16|png-320x240x4|png-160x120x16|png-160x120x4]
        #[bpaf(short, long, argument("FORMAT"))]
        format: Option<ScreenshotFormat>,
    },
    /// Push a file to the calculator
    #[bpaf(command("send-file"))]
    SendFile {
        #[bpaf(external(entry_args))]
        entry: EntryArgs,
        /// Path to the file contents
        #[bpaf(positional("PATH"), guard(|p| p.exists(), "file not found"))]
        path: PathBuf,
    },
    /// Request a single file from the calculator
    #[bpaf(command("request-file"))]
    RequestFile(#[bpaf(external(entry_args))] EntryArgs),
    /// Start a full backup
    #[bpaf(command)]
    Backup,
}

/// Build the request through the command layer and return the packets it sent
pub fn encode(request: &Request, config: &Config) -> Result<Vec<(u8, Vec<u8>)>, Box<dyn Error>> {
    let mut prime = Prime::with_options(MockTransport::new(), config.protocol);
    match request {
        Request::CheckReady => prime.send_check_ready()?,
        Request::Infos => prime.send_get_infos()?,
        Request::Screen { format } => {
            prime.send_recv_screen(format.unwrap_or(config.screenshot.format))?
        },
        Request::SendFile { entry, path } => {
            let mut file = entry.to_entry();
            file.data = fs::read(path)?;
            prime.send_file(&file)?
        },
        Request::RequestFile(entry) => prime.send_recv_file(&entry.to_entry())?,
        Request::Backup => prime.send_recv_backup()?,
    }
    Ok(prime
        .into_inner()
        .sent()
        .iter()
        .map(|pkt| (pkt.cmd, pkt.data().to_vec()))
        .collect())
}

pub fn run(request: Request, config: &Config) -> Result<(), Box<dyn Error>> {
    for (cmd, payload) in encode(&request, config)? {
        println!("{cmd:02x}: {}", to_hex(&payload));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn type_byte_parsing() {
        assert_eq!("6".parse(), Ok(TypeByte(6)));
        assert_eq!("0x1F".parse(), Ok(TypeByte(0x1F)));
        assert_eq!("0Xff".parse(), Ok(TypeByte(0xFF)));
        assert!("256".parse::<TypeByte>().is_err());
        assert!("0xg".parse::<TypeByte>().is_err());
    }

    #[test]
    fn screen_uses_configured_format() {
        let mut config = Config::default();
        config.screenshot.format = ScreenshotFormat::Png160x120x16;
        let sent = encode(&Request::Screen { format: None }, &config).unwrap();
        assert_eq!(sent, [(0xFC, vec![0xFC, 10])]);
    }

    #[test]
    fn backup_request() {
        let sent = encode(&Request::Backup, &Config::default()).unwrap();
        assert_eq!(sent, [(0xF7, vec![0xF9])]);
    }

    #[test]
    fn send_file_reads_contents() {
        let dir = TempDir::new("prime_sync_encode").unwrap();
        let path = dir.path().join("prog.txt");
        fs::write(&path, b"abc").unwrap();
        let request = Request::SendFile {
            entry: EntryArgs {
                name: "AB".into(),
                kind: TypeByte(3),
            },
            path,
        };
        let sent = encode(&request, &Config::default()).unwrap();
        let (cmd, payload) = &sent[0];
        assert_eq!(*cmd, 0xF7);
        assert_eq!(&payload[2..6], &11u32.to_be_bytes());
        assert_eq!(&payload[14..], b"abc");
    }
}
