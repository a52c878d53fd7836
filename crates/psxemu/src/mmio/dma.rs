//! DMA controller registers and the GPU linked-list transfer.
//!
//! Each channel owns a 16-byte register block starting at `0x1F80_1080`:
//! MADR (`+0`), BCR (`+4`) and CHCR (`+8`). A write to CHCR on channel 2
//! with the linked-list start pattern walks a chain of packets in RAM and
//! streams their payloads into GP0. Every transfer completes synchronously,
//! so the busy bit is cleared again before the write returns.
//!
//! # References
//! - [DMA Channels](https://psx-spx.consoledev.net/dmachannels/)

use super::gpu::{GpuState, WordSource};
use crate::error::Result;
use crate::memory::Memory;
use crate::render::Renderer;
use psx_hw::mmio::dma::{channel, chain, control, registers};
use tracing::{debug, instrument, trace};

/// Channel number addressed by a register offset in the DMA block
pub fn channel_of(addr: u32) -> u32 {
    ((addr >> 4) & 0xF).wrapping_sub(channel::FIRST_BLOCK)
}

fn register(addr: u32, reg: u32) -> u32 {
    (addr & registers::CHANNEL_MASK) | reg
}

/// Store a register write and run whatever transfer it starts
#[instrument(level = "trace", skip(memory, gpu, renderer))]
pub fn write(
    memory: &mut Memory,
    gpu: &mut GpuState,
    renderer: &mut impl Renderer,
    addr: u32,
    data: u32,
) -> Result<()> {
    memory.hwr.store_word(addr, data);

    if addr & registers::CONTROL_BIT != 0 {
        if channel_of(addr) == channel::GPU {
            execute(memory, gpu, renderer, addr)?;
        }
        memory
            .hwr
            .store_word(register(addr, registers::CHCR), data & !control::BUSY);
    }
    Ok(())
}

/// Walk the linked list whose head is in the channel's MADR.
///
/// Each node is a header word `count << 24 | next` followed by `count`
/// payload words. The walk ends when MADR holds the end marker. MADR is left
/// pointing at the end marker.
pub fn execute(
    memory: &mut Memory,
    gpu: &mut GpuState,
    renderer: &mut impl Renderer,
    addr: u32,
) -> Result<()> {
    let chcr = register(addr, registers::CHCR);
    let madr = register(addr, registers::MADR);

    if memory.hwr.load_word(chcr) != control::START_CHAIN {
        debug!(
            "DMA channel {} started with CHCR={:#010X}, ignoring",
            channel_of(addr),
            memory.hwr.load_word(chcr)
        );
        return Ok(());
    }

    let mut packets = 0usize;
    loop {
        let node = memory.hwr.load_word(madr);
        if node == chain::END_MARKER {
            break;
        }

        let header = memory.ram.load_word(node);
        let count = header >> chain::COUNT_SHIFT;
        trace!(
            "DMA node {:#08X}: {} words, next {:#08X}",
            node,
            count,
            header & chain::NEXT_MASK
        );

        gpu.write(
            WordSource::Ram {
                ram: &memory.ram,
                addr: node.wrapping_add(4),
                count,
            },
            renderer,
        )?;
        memory.hwr.store_word(madr, header & chain::NEXT_MASK);
        packets += 1;
    }

    debug!("DMA linked list complete: {} packets", packets);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmio::gpu::tests::Recorder;

    const MADR2: u32 = 0x10A0;
    const CHCR2: u32 = 0x10A8;

    fn setup() -> (Memory, GpuState, Recorder) {
        (Memory::new(), GpuState::new(), Recorder::default())
    }

    #[test]
    fn channel_numbers() {
        assert_eq!(channel_of(0x1088), 0);
        assert_eq!(channel_of(0x10A8), 2);
        assert_eq!(channel_of(0x10E8), 6);
    }

    #[test]
    fn walks_chain_into_gpu() {
        let (mut memory, mut gpu, mut recorder) = setup();
        // Node at 0x100: one word, next is 0x200
        memory.ram.store_word(0x100, 0x0100_0200);
        memory.ram.store_word(0x104, 0xE100_0000);
        // Node at 0x200: empty, next is 0x300
        memory.ram.store_word(0x200, 0x0000_0300);
        // Node at 0x300: three words, end of list
        memory.ram.store_word(0x300, 0x03FF_FFFF);
        memory.ram.store_word(0x304, 0x0200_0000);
        memory.ram.store_word(0x308, 0x0000_0000);
        memory.ram.store_word(0x30C, 0x00F0_0140);

        write(&mut memory, &mut gpu, &mut recorder, MADR2, 0x100).unwrap();
        write(&mut memory, &mut gpu, &mut recorder, CHCR2, control::START_CHAIN).unwrap();

        assert_eq!(
            recorder.draws,
            vec![
                (0xE1, vec![0xE100_0000]),
                (0x02, vec![0x0200_0000, 0, 0x00F0_0140]),
            ]
        );
        assert_eq!(memory.hwr.load_word(MADR2), chain::END_MARKER);
        assert_eq!(memory.hwr.load_word(CHCR2), 0x0000_0401);
    }

    #[test]
    fn end_marker_in_madr_transfers_nothing() {
        let (mut memory, mut gpu, mut recorder) = setup();

        write(&mut memory, &mut gpu, &mut recorder, MADR2, chain::END_MARKER).unwrap();
        write(&mut memory, &mut gpu, &mut recorder, CHCR2, control::START_CHAIN).unwrap();

        assert!(recorder.draws.is_empty());
    }

    #[test]
    fn other_control_values_do_not_transfer() {
        let (mut memory, mut gpu, mut recorder) = setup();
        memory.ram.store_word(0x100, 0x01FF_FFFF);
        memory.ram.store_word(0x104, 0xE100_0000);

        write(&mut memory, &mut gpu, &mut recorder, MADR2, 0x100).unwrap();
        write(&mut memory, &mut gpu, &mut recorder, CHCR2, 0x0100_0201).unwrap();

        assert!(recorder.draws.is_empty());
        assert_eq!(memory.hwr.load_word(MADR2), 0x100);
        assert_eq!(memory.hwr.load_word(CHCR2), 0x0000_0201);
    }

    #[test]
    fn other_channels_only_clear_busy() {
        let (mut memory, mut gpu, mut recorder) = setup();
        memory.ram.store_word(0x100, 0x01FF_FFFF);
        memory.ram.store_word(0x104, 0xE100_0000);

        write(&mut memory, &mut gpu, &mut recorder, 0x10E0, 0x100).unwrap();
        write(&mut memory, &mut gpu, &mut recorder, 0x10E8, control::START_CHAIN).unwrap();

        assert!(recorder.draws.is_empty());
        assert_eq!(memory.hwr.load_word(0x10E8), 0x0000_0401);
    }

    #[test]
    fn plain_register_writes_are_stored() {
        let (mut memory, mut gpu, mut recorder) = setup();

        write(&mut memory, &mut gpu, &mut recorder, 0x10A4, 0x0001_0010).unwrap();

        assert_eq!(memory.hwr.load_word(0x10A4), 0x0001_0010);
        assert!(recorder.draws.is_empty());
    }
}
