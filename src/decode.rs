use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use bpaf::Bpaf;
use chrono::Local;
use hpcalcs_core::{MockTransport, VarEntry};
use image::{DynamicImage, ImageFormat};
use log::warn;
use prime_calc::{Prime, ScreenshotFormat};

use crate::capture::{self, to_hex};
use crate::config::Config;

#[derive(Clone, Debug, Bpaf)]
pub enum Response {
    /// Readiness response
    #[bpaf(command)]
    Ready {
        /// Capture file of response packets
        #[bpaf(positional("CAPTURE"), guard(|p| p.exists(), "file not found"))]
        capture: PathBuf,
    },
    /// Device information response
    #[bpaf(command)]
    Infos {
        /// Capture file of response packets
        #[bpaf(positional("CAPTURE"), guard(|p| p.exists(), "file not found"))]
        capture: PathBuf,
    },
    /// Screenshot response
    #[bpaf(command)]
    Screen {
        /// Screenshot encoding that was requested, defaults to the configured one
        #[bpaf(short, long, argument("FORMAT"))]
        format: Option<ScreenshotFormat>,
        /// Output image. Written as-is for .png, re-encoded otherwise
        #[bpaf(short, long, argument("OUT"))]
        output: PathBuf,
        /// Capture file of response packets
        #[bpaf(positional("CAPTURE"), guard(|p| p.exists(), "file not found"))]
        capture: PathBuf,
    },
    /// Single file response
    #[bpaf(command)]
    File {
        /// Directory to write the file into
        #[bpaf(short, long, argument("DIR"))]
        output: Option<PathBuf>,
        /// Capture file of response packets
        #[bpaf(positional("CAPTURE"), guard(|p| p.exists(), "file not found"))]
        capture: PathBuf,
    },
    /// Full backup response
    #[bpaf(command)]
    Backup {
        /// Backup root directory, overriding the configured one
        #[bpaf(short, long, argument("DIR"))]
        output: Option<PathBuf>,
        /// Capture file of response packets
        #[bpaf(positional("CAPTURE"), guard(|p| p.exists(), "file not found"))]
        capture: PathBuf,
    },
}

fn open(capture: &Path, config: &Config) -> Result<Prime<MockTransport>, Box<dyn Error>> {
    Ok(Prime::with_options(capture::replay(capture)?, config.protocol))
}

pub fn run(response: Response, config: &Config) -> Result<(), Box<dyn Error>> {
    match response {
        Response::Ready { capture } => {
            let data = open(&capture, config)?.recv_check_ready()?;
            println!("ready: {}", to_hex(&data));
        },
        Response::Infos { capture } => {
            let infos = open(&capture, config)?.recv_get_infos()?;
            println!("{} bytes of device info", infos.len());
            println!("{}", to_hex(&infos.data));
        },
        Response::Screen {
            format,
            output,
            capture,
        } => {
            let format = format.unwrap_or(config.screenshot.format);
            let png = open(&capture, config)?.recv_screen(format)?;
            save_screenshot(&png, format, &output)?;
            println!("saved {format} screenshot to {}", output.display());
        },
        Response::File { output, capture } => match open(&capture, config)?.recv_file()? {
            Some(entry) => {
                let dir = output.unwrap_or_else(|| PathBuf::from("."));
                fs::create_dir_all(&dir)?;
                let path = write_entry(&dir, &entry)?;
                println!("wrote {} bytes to {}", entry.data.len(), path.display());
            },
            None => println!("no file in capture"),
        },
        Response::Backup { output, capture } => {
            let entries = open(&capture, config)?.recv_backup()?;
            let dir = backup_dir(output, config);
            fs::create_dir_all(&dir)?;
            for entry in &entries {
                let path = write_entry(&dir, entry)?;
                println!(
                    "{:>8} bytes  type {:02x}  {}",
                    entry.data.len(),
                    entry.kind,
                    path.display()
                );
            }
            println!("wrote {} entries to {}", entries.len(), dir.display());
        },
    }
    Ok(())
}

/// Write PNG data as-is, or convert it to the format implied by the extension
fn save_screenshot(
    png: &[u8],
    format: ScreenshotFormat,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let is_png = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        fs::write(output, png)?;
        match ::image::load_from_memory_with_format(png, ImageFormat::Png) {
            Ok(image) => {
                has_dimensions_of(&image, format);
            },
            Err(err) => warn!("screenshot is not a readable png: {err}"),
        }
    } else {
        let image = ::image::load_from_memory_with_format(png, ImageFormat::Png)?;
        has_dimensions_of(&image, format);
        image.save(output)?;
    }
    Ok(())
}

/// Check the decoded image against the size of the requested format
fn has_dimensions_of(image: &DynamicImage, format: ScreenshotFormat) -> bool {
    let actual = (image.width(), image.height());
    let (width, height) = format.dimensions();
    if actual != (width, height) {
        warn!(
            "{format} screenshot should be {width}x{height}, got {}x{}",
            actual.0, actual.1
        );
        return false;
    }
    true
}

fn backup_dir(output: Option<PathBuf>, config: &Config) -> PathBuf {
    let root = output
        .or_else(|| config.backup.directory.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    if config.backup.timestamped {
        root.join(Local::now().format("backup-%Y%m%d-%H%M%S").to_string())
    } else {
        root
    }
}

/// File name for an entry: its name with unsafe characters replaced, then the type in hex
fn entry_file_name(entry: &VarEntry) -> String {
    let name: String = entry
        .name_lossy()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let name = match name.as_str() {
        "" | "." | ".." => "unnamed".to_string(),
        _ => name,
    };
    format!("{name}.{:02x}", entry.kind)
}

fn write_entry(dir: &Path, entry: &VarEntry) -> std::io::Result<PathBuf> {
    let path = dir.join(entry_file_name(entry));
    fs::write(&path, &entry.data)?;
    Ok(path)
}
