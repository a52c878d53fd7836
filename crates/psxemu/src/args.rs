use crate::EmulatorConfig;
use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
pub struct Args {
    /// Path to the PS-X EXE to run. If --exe-in-disk-image is set,
    /// this is a path inside the disk image (e.g., "GAMES/DEMO.EXE").
    /// Otherwise, it's a path on the local filesystem.
    pub exe: PathBuf,

    /// Boot ROM image, mapped at 0xBFC00000 (truncated or zero-padded to 512KB)
    #[arg(long)]
    pub bios: Option<PathBuf>,

    /// Path to a FAT-formatted disk image
    #[arg(long)]
    pub disk_image: Option<PathBuf>,

    /// Interpret the EXE path as a path inside the disk image instead of the local filesystem.
    /// Requires --disk-image to be specified.
    #[arg(long)]
    pub exe_in_disk_image: bool,

    /// Stop when the CPU reaches this PC (hex: 0x1234 or decimal: 1234)
    #[arg(long, value_parser = parse_hex_or_dec)]
    pub stop_pc: Option<u32>,

    /// Stop after this many instructions
    #[arg(long, short = 'i')]
    pub max_instructions: Option<u64>,

    /// CPU steps to run between host updates
    #[arg(long)]
    pub steps_per_quantum: Option<usize>,
}

impl Args {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.exe_in_disk_image && self.disk_image.is_none() {
            return Err("--exe-in-disk-image requires --disk-image to be specified".to_string());
        }
        if self.steps_per_quantum == Some(0) {
            return Err("--steps-per-quantum must be at least 1".to_string());
        }
        Ok(())
    }

    /// Convert Args to EmulatorConfig
    pub fn to_emulator_config(&self) -> Result<EmulatorConfig, Box<dyn std::error::Error>> {
        let bios = self.bios.as_deref().map(load_bios_data).transpose()?;
        Ok(EmulatorConfig {
            bios,
            stop_pc: self.stop_pc,
            max_instructions: self.max_instructions.map(|v| v as usize),
            timeout_ms: None,
            steps_per_quantum: self.steps_per_quantum,
        })
    }
}

pub fn parse_hex_or_dec(s: &str) -> Result<u32, std::num::ParseIntError> {
    if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    }
}

/// Read a boot ROM image from the local filesystem
pub fn load_bios_data(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    tracing::info!("Loading boot ROM from file: {:?}", path);
    Ok(std::fs::read(path)?)
}

/// Load EXE data from either a direct file path or from inside a disk image
pub fn load_exe_data(args: &Args) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    use std::io::Read;
    use tracing::info;

    if args.exe_in_disk_image {
        let image_path = args
            .disk_image
            .as_ref()
            .ok_or("--exe-in-disk-image requires --disk-image")?;

        info!(
            "Loading EXE from disk image: {:?} at path: {:?}",
            image_path, args.exe
        );

        use fscommon::BufStream;

        let img_file = std::fs::File::open(image_path)?;
        let buf_stream = BufStream::new(img_file);
        let fs = fatfs::FileSystem::new(buf_stream, fatfs::FsOptions::new())?;
        let root_dir = fs.root_dir();

        let exe_path_str = args.exe.to_str().ok_or("EXE path contains invalid UTF-8")?;
        let mut exe_file = root_dir.open_file(exe_path_str)?;
        let mut contents = Vec::new();
        exe_file.read_to_end(&mut contents)?;

        info!("Successfully loaded {} bytes from disk image", contents.len());
        Ok(contents)
    } else {
        info!("Loading EXE from file: {:?}", args.exe);
        let data = std::fs::read(&args.exe)?;
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_hex_or_dec("0x80010000").unwrap(), 0x8001_0000);
        assert_eq!(parse_hex_or_dec("1234").unwrap(), 1234);
        assert!(parse_hex_or_dec("0xZZ").is_err());
    }

    #[test]
    fn disk_image_flag_requires_image() {
        let args = Args::parse_from(["psxemu", "GAMES/DEMO.EXE", "--exe-in-disk-image"]);
        assert!(args.validate().is_err());

        let args = Args::parse_from([
            "psxemu",
            "GAMES/DEMO.EXE",
            "--exe-in-disk-image",
            "--disk-image",
            "disk.img",
        ]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn converts_to_config() {
        let args = Args::parse_from([
            "psxemu",
            "demo.exe",
            "--stop-pc",
            "0x80010010",
            "-i",
            "500",
            "--steps-per-quantum",
            "64",
        ]);
        let config = args.to_emulator_config().unwrap();

        assert_eq!(config.stop_pc, Some(0x8001_0010));
        assert_eq!(config.max_instructions, Some(500));
        assert_eq!(config.steps_per_quantum, Some(64));
        assert!(config.bios.is_none());
    }

    #[test]
    fn zero_quantum_is_rejected() {
        let args = Args::parse_from(["psxemu", "demo.exe", "--steps-per-quantum", "0"]);
        assert!(args.validate().is_err());
    }
}
