//! Mapper 4 (MMC3).
//!
//! Eight bank registers behind a select/data register pair, 8KB PRG
//! banking with a mode bit that swaps which half is fixed, 1KB/2KB CHR
//! banking with an A12-inversion bit, mirroring control, and the scanline
//! IRQ counter clocked by the PPU's A12 rising edge.

use crate::mapper::{Mirroring, WriteEffect};
use crate::state;

/// MMC3 board state.
#[derive(Debug, Clone)]
pub struct Mmc3 {
    prg_len: usize,
    chr_len: usize,
    chr_is_ram: bool,

    /// Which bank register the next $8001 write updates (0-7).
    bank_select: u8,
    /// PRG mode: swaps the switchable/fixed halves of $8000/$C000.
    prg_mode: bool,
    /// CHR A12 inversion: swaps the 2KB and 1KB pattern-table halves.
    chr_inversion: bool,
    /// R0-R5: CHR banks (two 2KB, four 1KB). R6-R7: 8KB PRG banks.
    registers: [u8; 8],

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_pending: bool,
}

impl Mmc3 {
    /// Create an MMC3 mapper.
    #[must_use]
    pub fn new(prg_len: usize, chr_len: usize, chr_is_ram: bool) -> Self {
        Self {
            prg_len,
            chr_len,
            chr_is_ram,
            bank_select: 0,
            prg_mode: false,
            chr_inversion: false,
            registers: [0, 2, 4, 5, 6, 7, 0, 1],
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_pending: false,
        }
    }

    /// 8KB PRG bank count.
    fn prg_banks(&self) -> usize {
        (self.prg_len / 0x2000).max(1)
    }

    pub(crate) fn cpu_map_read(&self, addr: u16) -> Option<usize> {
        if addr < 0x8000 {
            return None;
        }
        let banks = self.prg_banks();
        let bank = match addr {
            0x8000..=0x9FFF => {
                if self.prg_mode {
                    banks.saturating_sub(2)
                } else {
                    usize::from(self.registers[6])
                }
            }
            0xA000..=0xBFFF => usize::from(self.registers[7]),
            0xC000..=0xDFFF => {
                if self.prg_mode {
                    usize::from(self.registers[6])
                } else {
                    banks.saturating_sub(2)
                }
            }
            _ => banks.saturating_sub(1),
        };
        Some(bank % banks * 0x2000 + usize::from(addr & 0x1FFF))
    }

    pub(crate) fn cpu_map_write(&mut self, addr: u16, value: u8) -> Option<WriteEffect> {
        if addr < 0x8000 {
            return None;
        }
        match (addr & 0xE000, addr & 1) {
            (0x8000, 0) => {
                self.bank_select = value & 0x07;
                self.prg_mode = value & 0x40 != 0;
                self.chr_inversion = value & 0x80 != 0;
            }
            (0x8000, _) => {
                let masked = match self.bank_select {
                    6 | 7 => value & 0x3F,
                    0 | 1 => value & 0xFE,
                    _ => value,
                };
                self.registers[usize::from(self.bank_select)] = masked;
            }
            (0xA000, 0) => {
                let mode = if value & 1 != 0 {
                    Mirroring::Horizontal
                } else {
                    Mirroring::Vertical
                };
                return Some(WriteEffect::mirror(mode));
            }
            (0xA000, _) => {
                // PRG RAM protect; the 8KB window stays enabled here.
            }
            (0xC000, 0) => self.irq_latch = value,
            (0xC000, _) => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            (0xE000, 0) => {
                self.irq_enabled = false;
                self.irq_pending = false;
            }
            _ => self.irq_enabled = true,
        }
        Some(WriteEffect::none())
    }

    pub(crate) fn ppu_map_read(&self, addr: u16) -> Option<usize> {
        if addr >= 0x2000 {
            return None;
        }
        let banks = (self.chr_len / 0x0400).max(1);
        // Regions are 1KB; the R0/R1 registers cover two of them.
        let region = usize::from(addr >> 10) ^ if self.chr_inversion { 0x04 } else { 0 };
        let bank = match region {
            0 => usize::from(self.registers[0]),
            1 => usize::from(self.registers[0]) + 1,
            2 => usize::from(self.registers[1]),
            3 => usize::from(self.registers[1]) + 1,
            r => usize::from(self.registers[r - 2]),
        };
        Some(bank % banks * 0x0400 + usize::from(addr & 0x03FF))
    }

    pub(crate) fn ppu_map_write(&self, addr: u16) -> Option<usize> {
        if self.chr_is_ram {
            self.ppu_map_read(addr)
        } else {
            None
        }
    }

    /// Clock the IRQ counter on the A12 rising edge.
    pub(crate) fn scanline_tick(&mut self) {
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_pending = true;
        }
    }

    /// Drain the IRQ line.
    pub(crate) fn take_irq(&mut self) -> bool {
        core::mem::take(&mut self.irq_pending)
    }

    /// Current value of a bank register (used by the Waixing variant).
    pub(crate) fn bank_register(&self, index: usize) -> u8 {
        self.registers[index & 7]
    }

    pub(crate) fn reset(&mut self) {
        self.bank_select = 0;
        self.prg_mode = false;
        self.chr_inversion = false;
        self.registers = [0, 2, 4, 5, 6, 7, 0, 1];
        self.irq_latch = 0;
        self.irq_counter = 0;
        self.irq_reload = false;
        self.irq_enabled = false;
        self.irq_pending = false;
    }
}

impl Mmc3 {
    pub(crate) fn write_state(&self, out: &mut Vec<u8>) {
        state::put_u8(out, self.bank_select);
        state::put_bool(out, self.prg_mode);
        state::put_bool(out, self.chr_inversion);
        for &register in &self.registers {
            state::put_u8(out, register);
        }
        state::put_u8(out, self.irq_latch);
        state::put_u8(out, self.irq_counter);
        state::put_bool(out, self.irq_reload);
        state::put_bool(out, self.irq_enabled);
        state::put_bool(out, self.irq_pending);
    }

    pub(crate) fn read_state(&mut self, data: &mut &[u8]) -> Option<()> {
        self.bank_select = state::take_u8(data)?;
        self.prg_mode = state::take_bool(data)?;
        self.chr_inversion = state::take_bool(data)?;
        for register in &mut self.registers {
            *register = state::take_u8(data)?;
        }
        self.irq_latch = state::take_u8(data)?;
        self.irq_counter = state::take_u8(data)?;
        self.irq_reload = state::take_bool(data)?;
        self.irq_enabled = state::take_bool(data)?;
        self.irq_pending = state::take_bool(data)?;
        Some(())
    }
}
