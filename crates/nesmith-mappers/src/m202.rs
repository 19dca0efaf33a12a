//! Mapper 202 (150-in-1 multicart).
//!
//! Everything lives in the written address: bits 1-3 select a 16KB PRG
//! bank and the matching 8KB CHR bank, bit 0 selects mirroring, and the
//! combination A0=1, A3=1 enables a 32KB-style mode where $C000 maps the
//! next bank up.

use crate::mapper::{Mirroring, WriteEffect};
use crate::state;

/// 150-in-1 board state.
#[derive(Debug, Clone)]
pub struct M202 {
    prg_banks: usize,
    chr_len: usize,
    chr_is_ram: bool,
    bank: u8,
    wide: bool,
}

impl M202 {
    /// Create a mapper 202 instance.
    #[must_use]
    pub fn new(prg_banks: usize, chr_len: usize, chr_is_ram: bool) -> Self {
        Self {
            prg_banks,
            chr_len,
            chr_is_ram,
            bank: 0,
            wide: false,
        }
    }

    pub(crate) fn cpu_map_read(&self, addr: u16) -> Option<usize> {
        if addr < 0x8000 {
            return None;
        }
        let banks = self.prg_banks.max(1);
        let bank = if addr >= 0xC000 && self.wide {
            (usize::from(self.bank) + 1) % banks
        } else {
            usize::from(self.bank) % banks
        };
        Some(bank * 0x4000 + usize::from(addr & 0x3FFF))
    }

    pub(crate) fn cpu_map_write(&mut self, addr: u16, _value: u8) -> Option<WriteEffect> {
        if addr >= 0x8000 {
            self.bank = ((addr >> 1) & 0x07) as u8;
            self.wide = addr & 0x09 == 0x09;
            let mode = if addr & 0x01 != 0 {
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
        if addr < 0x2000 {
            let banks = (self.chr_len / 0x2000).max(1);
            let bank = usize::from(self.bank) % banks;
            Some(bank * 0x2000 + usize::from(addr))
        } else {
            None
        }
    }

    pub(crate) fn ppu_map_write(&self, addr: u16) -> Option<usize> {
        (self.chr_is_ram && addr < 0x2000).then_some(usize::from(addr))
    }

    pub(crate) fn reset(&mut self) {
        self.bank = 0;
        self.wide = false;
    }
}

impl M202 {
    pub(crate) fn write_state(&self, out: &mut Vec<u8>) {
        state::put_u8(out, self.bank);
        state::put_bool(out, self.wide);
    }

    pub(crate) fn read_state(&mut self, data: &mut &[u8]) -> Option<()> {
        self.bank = state::take_u8(data)?;
        self.wide = state::take_bool(data)?;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_from_address_bits() {
        let mut m = M202::new(8, 8 * 0x2000, false);
        m.cpu_map_write(0x8000 | (5 << 1), 0);
        assert_eq!(m.cpu_map_read(0x8000), Some(5 * 0x4000));
        assert_eq!(m.cpu_map_read(0xC000), Some(5 * 0x4000));
        assert_eq!(m.ppu_map_read(0x0000), Some(5 * 0x2000));
    }

    #[test]
    fn test_wide_mode_maps_next_bank_high() {
        let mut m = M202::new(8, 8 * 0x2000, false);
        // A0=1 and A3=1 -> wide mode, bank = (addr>>1)&7 = 4
        m.cpu_map_write(0x8009, 0);
        assert_eq!(m.cpu_map_read(0x8000), Some(4 * 0x4000));
        assert_eq!(m.cpu_map_read(0xC000), Some(5 * 0x4000));
    }

    #[test]
    fn test_mirroring_from_a0() {
        let mut m = M202::new(8, 8 * 0x2000, false);
        let effect = m.cpu_map_write(0x8001, 0).unwrap();
        assert_eq!(effect.mirroring, Some(Mirroring::Horizontal));
        let effect = m.cpu_map_write(0x8000, 0).unwrap();
        assert_eq!(effect.mirroring, Some(Mirroring::Vertical));
    }
}
