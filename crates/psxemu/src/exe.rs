use psx_hw::exe::{HEADER_SIZE, MAGIC, header};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while parsing or loading a PSX-EXE image
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExeError {
    /// Image is too small to contain the fixed-size header
    #[error("image is {len} bytes, smaller than the {HEADER_SIZE}-byte header")]
    FileTooSmall { len: usize },
    /// Header declares more payload than the image holds
    #[error("header declares {declared:#x} payload bytes but only {available:#x} follow it")]
    Truncated { declared: u32, available: usize },
    /// Payload would run past the end of RAM
    #[error("payload of {size:#x} bytes at RAM offset {offset:#x} does not fit in RAM")]
    DoesNotFit { offset: u32, size: u32 },
}

/// Parsed PSX-EXE header fields used to bootstrap the CPU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExeHeader {
    /// Initial program counter
    pub pc: u32,
    /// Initial global pointer (r28)
    pub gp: u32,
    /// Guest address the payload is copied to
    pub load_address: u32,
    /// Payload size in bytes
    pub size: u32,
    /// Initial stack pointer (r29)
    pub sp: u32,
}

fn word_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

impl ExeHeader {
    /// Parse the header from raw image data
    pub fn parse(data: &[u8]) -> Result<Self, ExeError> {
        if data.len() < HEADER_SIZE {
            return Err(ExeError::FileTooSmall { len: data.len() });
        }

        if &data[..MAGIC.len()] != MAGIC {
            warn!(
                "Executable header does not start with {:?}, loading anyway",
                String::from_utf8_lossy(MAGIC)
            );
        }

        Ok(ExeHeader {
            pc: word_at(data, header::PC),
            gp: word_at(data, header::GP),
            load_address: word_at(data, header::LOAD_ADDRESS),
            size: word_at(data, header::SIZE),
            sp: word_at(data, header::SP),
        })
    }

    /// The payload bytes that follow the header
    pub fn payload<'a>(&self, data: &'a [u8]) -> Result<&'a [u8], ExeError> {
        let available = data.len().saturating_sub(HEADER_SIZE);
        let declared = self.size as usize;
        if declared > available {
            return Err(ExeError::Truncated {
                declared: self.size,
                available,
            });
        }
        Ok(&data[HEADER_SIZE..HEADER_SIZE + declared])
    }
}

/// Build a PSX-EXE image around a payload
pub fn build_image(pc: u32, gp: u32, load_address: u32, sp: u32, payload: &[u8]) -> Vec<u8> {
    let mut image = vec![0u8; HEADER_SIZE + payload.len()];
    image[..MAGIC.len()].copy_from_slice(MAGIC);
    let mut put = |offset: usize, value: u32| {
        image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    };
    put(header::PC, pc);
    put(header::GP, gp);
    put(header::LOAD_ADDRESS, load_address);
    put(header::SIZE, payload.len() as u32);
    put(header::SP, sp);
    image[HEADER_SIZE..].copy_from_slice(payload);
    image
}
