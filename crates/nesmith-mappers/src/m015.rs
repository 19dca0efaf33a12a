//! Mapper 15 (100-in-1 Contra Function 16).
//!
//! Multicart with four PRG modes selected by the low two address bits of
//! the write. The data byte carries the 16KB bank (bits 0-5), the
//! mirroring select (bit 6) and an 8KB sub-bank flip (bit 7). CHR is 8KB
//! RAM.
//!
//! Modes:
//! - 0: 32KB — `bank & !1` at $8000, `bank | 1` at $C000
//! - 1: UNROM — `bank` at $8000, last bank at $C000
//! - 2: 8KB — the half of `bank` picked by data bit 7, mirrored four times
//! - 3: 16KB — `bank` at both $8000 and $C000

use crate::mapper::{Mirroring, WriteEffect};
use crate::state;

/// 100-in-1 board state.
#[derive(Debug, Clone)]
pub struct Contra100In1 {
    prg_banks: usize,
    mode: u8,
    bank: u8,
    sub_bank: u8,
}

impl Contra100In1 {
    /// Create a mapper 15 instance.
    #[must_use]
    pub fn new(prg_banks: usize) -> Self {
        Self {
            prg_banks,
            mode: 0,
            bank: 0,
            sub_bank: 0,
        }
    }

    /// 16KB bank index for a CPU region, by current mode.
    fn bank_for(&self, addr: u16) -> usize {
        let high_half = addr >= 0xC000;
        let bank = usize::from(self.bank);
        let banks = self.prg_banks.max(1);
        let selected = match self.mode {
            0 => {
                if high_half {
                    bank | 1
                } else {
                    bank & !1
                }
            }
            1 => {
                if high_half {
                    banks - 1
                } else {
                    bank
                }
            }
            // Mode 2 is handled at 8KB granularity in cpu_map_read.
            _ => bank,
        };
        selected % banks
    }

    pub(crate) fn cpu_map_read(&self, addr: u16) -> Option<usize> {
        if addr < 0x8000 {
            return None;
        }
        if self.mode == 2 {
            // 8KB bank mirrored across the whole region.
            let bank = usize::from(self.bank) % self.prg_banks.max(1);
            let half = usize::from(self.sub_bank) * 0x2000;
            return Some(bank * 0x4000 + half + usize::from(addr & 0x1FFF));
        }
        let bank = self.bank_for(addr);
        Some(bank * 0x4000 + usize::from(addr & 0x3FFF))
    }

    pub(crate) fn cpu_map_write(&mut self, addr: u16, value: u8) -> Option<WriteEffect> {
        if addr >= 0x8000 {
            self.mode = (addr & 0x03) as u8;
            self.bank = value & 0x3F;
            self.sub_bank = value >> 7;
            let mode = if value & 0x40 != 0 {
                Mirroring::Horizontal
            } else {
                Mirroring::Vertical
            };
            Some(WriteEffect::mirror(mode))
        } else {
            None
        }
    }

    pub(crate) fn ppu_map_read(&self, addr: u16) -> Option<usize> {
        (addr < 0x2000).then_some(usize::from(addr))
    }

    pub(crate) fn ppu_map_write(&self, addr: u16) -> Option<usize> {
        (addr < 0x2000).then_some(usize::from(addr))
    }

    pub(crate) fn reset(&mut self) {
        self.mode = 0;
        self.bank = 0;
        self.sub_bank = 0;
    }
}

impl Contra100In1 {
    pub(crate) fn write_state(&self, out: &mut Vec<u8>) {
        state::put_u8(out, self.mode);
        state::put_u8(out, self.bank);
        state::put_u8(out, self.sub_bank);
    }

    pub(crate) fn read_state(&mut self, data: &mut &[u8]) -> Option<()> {
        self.mode = state::take_u8(data)?;
        self.bank = state::take_u8(data)?;
        self.sub_bank = state::take_u8(data)?;
        Some(())
    }
}
