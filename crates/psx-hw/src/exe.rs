//! PSX-EXE executable layout.
//!
//! # References
//! - <https://psx-spx.consoledev.net/cdromfileformats/#cdrom-file-playstation-executables>

/// Size of the header that precedes the payload
pub const HEADER_SIZE: usize = 0x800;

/// Magic identifier at the start of the header
pub const MAGIC: &[u8; 8] = b"PS-X EXE";

/// Byte offsets of the header fields (all 32-bit little-endian words)
pub mod header {
    /// Initial program counter
    pub const PC: usize = 0x10;
    /// Initial global pointer (r28)
    pub const GP: usize = 0x14;
    /// Destination address of the payload in RAM
    pub const LOAD_ADDRESS: usize = 0x18;
    /// Payload size in bytes
    pub const SIZE: usize = 0x1C;
    /// Initial stack pointer (r29)
    pub const SP: usize = 0x30;
}
