//! Mapper 227 (1200-in-1 multicart).
//!
//! Address-latched banking, FCEUX's decode:
//!
//! ```text
//! A~[.... ..LB PPPP POS M]  (relative to $8000)
//!   S (A0): 32KB mode      M (A1): mirroring, 1 = horizontal
//!   P (A2-A6): 16KB bank   O (A7): real-PRG mode
//!   B (A8): bank high bit  L (A9): "last bank" select
//! ```
//!
//! With O set the board behaves like a plain NROM-128/256 selection; with
//! O clear it emulates a UNROM-style fixed-high-bank arrangement whose
//! upper half depends on L. Reference emulators disagree on this board;
//! this follows FCEUX.

use crate::mapper::{Mirroring, WriteEffect};
use crate::state;

/// 1200-in-1 board state.
#[derive(Debug, Clone)]
pub struct M227 {
    prg_banks: usize,
    chr_is_ram: bool,
    bank: usize,
    wide: bool,
    real_mode: bool,
    last_bank: bool,
}

impl M227 {
    /// Create a mapper 227 instance.
    #[must_use]
    pub fn new(prg_banks: usize, chr_is_ram: bool) -> Self {
        Self {
            prg_banks,
            chr_is_ram,
            bank: 0,
            wide: false,
            real_mode: true,
            last_bank: false,
        }
    }

    /// 16KB bank for each half of the CPU window.
    fn banks(&self) -> (usize, usize) {
        let p = self.bank;
        if self.real_mode {
            if self.wide {
                (p & !1, p | 1)
            } else {
                (p, p)
            }
        } else if self.wide {
            if self.last_bank {
                (p & !1, p | 7)
            } else {
                (p & !1, p & 0x38)
            }
        } else if self.last_bank {
            (p, p | 7)
        } else {
            (p, p & 0x38)
        }
    }

    pub(crate) fn cpu_map_read(&self, addr: u16) -> Option<usize> {
        if addr < 0x8000 {
            return None;
        }
        let banks = self.prg_banks.max(1);
        let (low, high) = self.banks();
        let bank = if addr >= 0xC000 { high } else { low } % banks;
        Some(bank * 0x4000 + usize::from(addr & 0x3FFF))
    }

    pub(crate) fn cpu_map_write(&mut self, addr: u16, _value: u8) -> Option<WriteEffect> {
        if addr < 0x8000 {
            return None;
        }
        self.wide = addr & 0x0001 != 0;
        self.bank = usize::from((addr >> 2) & 0x1F) | usize::from((addr >> 3) & 0x20);
        self.real_mode = addr & 0x0080 != 0;
        self.last_bank = addr & 0x0200 != 0;
        let mode = if addr & 0x0002 != 0 {
            Mirroring::Horizontal
        } else {
            Mirroring::Vertical
        };
        Some(WriteEffect::mirror(mode))
    }

    pub(crate) fn ppu_map_read(&self, addr: u16) -> Option<usize> {
        (addr < 0x2000).then_some(usize::from(addr))
    }

    pub(crate) fn ppu_map_write(&self, addr: u16) -> Option<usize> {
        (self.chr_is_ram && addr < 0x2000).then_some(usize::from(addr))
    }

    pub(crate) fn reset(&mut self) {
        self.bank = 0;
        self.wide = false;
        self.real_mode = true;
        self.last_bank = false;
    }
}

impl M227 {
    pub(crate) fn write_state(&self, out: &mut Vec<u8>) {
        state::put_u32(out, self.bank as u32);
        state::put_bool(out, self.wide);
        state::put_bool(out, self.real_mode);
        state::put_bool(out, self.last_bank);
    }

    pub(crate) fn read_state(&mut self, data: &mut &[u8]) -> Option<()> {
        self.bank = state::take_u32(data)? as usize;
        self.wide = state::take_bool(data)?;
        self.real_mode = state::take_bool(data)?;
        self.last_bank = state::take_bool(data)?;
        Some(())
    }
}
