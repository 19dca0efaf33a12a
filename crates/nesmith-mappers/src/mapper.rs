//! Mapper contract and dispatch.
//!
//! A mapper translates CPU and PPU addresses into offsets within the
//! cartridge's PRG ROM and CHR ROM/RAM, and models whatever extra logic the
//! cartridge board carries (bank registers, mirroring control, IRQ
//! counters). The variant is fixed once the ROM is loaded, so mappers are a
//! tagged enum and every call site dispatches with a `match` instead of a
//! vtable.

use crate::axrom::Axrom;
use crate::bandai::BandaiFcg;
use crate::camerica::Camerica;
use crate::cnrom::Cnrom;
use crate::colordreams::ColorDreams;
use crate::gxrom::Gxrom;
use crate::m015::Contra100In1;
use crate::m113::Nina;
use crate::m202::M202;
use crate::m225::M225;
use crate::m227::M227;
use crate::m245::WaixingMmc3;
use crate::m253::WaixingVrc4;
use crate::mmc1::Mmc1;
use crate::mmc3::Mmc3;
use crate::nrom::Nrom;
use crate::uxrom::Uxrom;
use crate::vrc::Vrc24;

/// Nametable mirroring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mirroring {
    /// Horizontal mirroring (vertical arrangement).
    #[default]
    Horizontal,
    /// Vertical mirroring (horizontal arrangement).
    Vertical,
    /// Single-screen, lower bank.
    SingleScreenLow,
    /// Single-screen, upper bank.
    SingleScreenHigh,
    /// Four-screen (cartridge VRAM).
    FourScreen,
}

/// Side effects of a mapper register write.
///
/// A `Some(WriteEffect)` return from `cpu_map_write` means the mapper
/// consumed the write (it was a register access, not a RAM/ROM access).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteEffect {
    /// New nametable mirroring, if the write changed it.
    pub mirroring: Option<Mirroring>,
    /// True if the write itself pends an IRQ (rare; most IRQs come from
    /// the tick hooks).
    pub irq: bool,
}

impl WriteEffect {
    /// A consumed write with no observable side effect.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            mirroring: None,
            irq: false,
        }
    }

    /// A consumed write that switches the nametable mirroring.
    #[must_use]
    pub const fn mirror(mode: Mirroring) -> Self {
        Self {
            mirroring: Some(mode),
            irq: false,
        }
    }
}

/// Cartridge mapper, one variant per supported iNES mapper number.
#[derive(Debug, Clone)]
pub enum Mapper {
    /// Mapper 0: no banking.
    Nrom(Nrom),
    /// Mapper 1: MMC1 serial shift register.
    Mmc1(Mmc1),
    /// Mapper 2: UxROM PRG banking.
    Uxrom(Uxrom),
    /// Mapper 3: CNROM CHR banking.
    Cnrom(Cnrom),
    /// Mapper 4: MMC3 with scanline IRQ.
    Mmc3(Mmc3),
    /// Mapper 7: AxROM 32KB PRG + single-screen select.
    Axrom(Axrom),
    /// Mapper 11: Color Dreams.
    ColorDreams(ColorDreams),
    /// Mapper 15: 100-in-1 multicart.
    Contra100In1(Contra100In1),
    /// Mapper 16: Bandai FCG with cycle-counted IRQ.
    BandaiFcg(BandaiFcg),
    /// Mapper 23: Konami VRC2/VRC4.
    Vrc24(Vrc24),
    /// Mapper 66: GxROM.
    Gxrom(Gxrom),
    /// Mapper 71: Camerica/Codemasters.
    Camerica(Camerica),
    /// Mapper 113: NINA-03/06 multicart.
    Nina(Nina),
    /// Mapper 202: 150-in-1 multicart.
    M202(M202),
    /// Mapper 225: 52-in-1 large multicart.
    M225(M225),
    /// Mapper 227: 1200-in-1 multicart.
    M227(M227),
    /// Mapper 245: Waixing MMC3 variant.
    WaixingMmc3(WaixingMmc3),
    /// Mapper 253: Waixing VRC4 variant with switchable CHR RAM window.
    WaixingVrc4(WaixingVrc4),
}

impl Mapper {
    /// Map a CPU read to a PRG ROM offset.
    ///
    /// Returns `None` for addresses the mapper does not decode (the bus
    /// falls back to PRG RAM or open bus).
    #[must_use]
    pub fn cpu_map_read(&self, addr: u16) -> Option<usize> {
        match self {
            Self::Nrom(m) => m.cpu_map_read(addr),
            Self::Mmc1(m) => m.cpu_map_read(addr),
            Self::Uxrom(m) => m.cpu_map_read(addr),
            Self::Cnrom(m) => m.cpu_map_read(addr),
            Self::Mmc3(m) => m.cpu_map_read(addr),
            Self::Axrom(m) => m.cpu_map_read(addr),
            Self::ColorDreams(m) => m.cpu_map_read(addr),
            Self::Contra100In1(m) => m.cpu_map_read(addr),
            Self::BandaiFcg(m) => m.cpu_map_read(addr),
            Self::Vrc24(m) => m.cpu_map_read(addr),
            Self::Gxrom(m) => m.cpu_map_read(addr),
            Self::Camerica(m) => m.cpu_map_read(addr),
            Self::Nina(m) => m.cpu_map_read(addr),
            Self::M202(m) => m.cpu_map_read(addr),
            Self::M225(m) => m.cpu_map_read(addr),
            Self::M227(m) => m.cpu_map_read(addr),
            Self::WaixingMmc3(m) => m.cpu_map_read(addr),
            Self::WaixingVrc4(m) => m.cpu_map_read(addr),
        }
    }

    /// Feed a CPU write to the mapper's registers.
    ///
    /// Returns `Some` when the mapper consumed the write, carrying any
    /// mirroring change or IRQ pulse it caused. `None` means the address
    /// is not a mapper register and the bus should handle it.
    pub fn cpu_map_write(&mut self, addr: u16, value: u8) -> Option<WriteEffect> {
        match self {
            Self::Nrom(m) => m.cpu_map_write(addr, value),
            Self::Mmc1(m) => m.cpu_map_write(addr, value),
            Self::Uxrom(m) => m.cpu_map_write(addr, value),
            Self::Cnrom(m) => m.cpu_map_write(addr, value),
            Self::Mmc3(m) => m.cpu_map_write(addr, value),
            Self::Axrom(m) => m.cpu_map_write(addr, value),
            Self::ColorDreams(m) => m.cpu_map_write(addr, value),
            Self::Contra100In1(m) => m.cpu_map_write(addr, value),
            Self::BandaiFcg(m) => m.cpu_map_write(addr, value),
            Self::Vrc24(m) => m.cpu_map_write(addr, value),
            Self::Gxrom(m) => m.cpu_map_write(addr, value),
            Self::Camerica(m) => m.cpu_map_write(addr, value),
            Self::Nina(m) => m.cpu_map_write(addr, value),
            Self::M202(m) => m.cpu_map_write(addr, value),
            Self::M225(m) => m.cpu_map_write(addr, value),
            Self::M227(m) => m.cpu_map_write(addr, value),
            Self::WaixingMmc3(m) => m.cpu_map_write(addr, value),
            Self::WaixingVrc4(m) => m.cpu_map_write(addr, value),
        }
    }

    /// Map a PPU read ($0000-$1FFF) to a CHR offset.
    #[must_use]
    pub fn ppu_map_read(&self, addr: u16) -> Option<usize> {
        match self {
            Self::Nrom(m) => m.ppu_map_read(addr),
            Self::Mmc1(m) => m.ppu_map_read(addr),
            Self::Uxrom(m) => m.ppu_map_read(addr),
            Self::Cnrom(m) => m.ppu_map_read(addr),
            Self::Mmc3(m) => m.ppu_map_read(addr),
            Self::Axrom(m) => m.ppu_map_read(addr),
            Self::ColorDreams(m) => m.ppu_map_read(addr),
            Self::Contra100In1(m) => m.ppu_map_read(addr),
            Self::BandaiFcg(m) => m.ppu_map_read(addr),
            Self::Vrc24(m) => m.ppu_map_read(addr),
            Self::Gxrom(m) => m.ppu_map_read(addr),
            Self::Camerica(m) => m.ppu_map_read(addr),
            Self::Nina(m) => m.ppu_map_read(addr),
            Self::M202(m) => m.ppu_map_read(addr),
            Self::M225(m) => m.ppu_map_read(addr),
            Self::M227(m) => m.ppu_map_read(addr),
            Self::WaixingMmc3(m) => m.ppu_map_read(addr),
            Self::WaixingVrc4(m) => m.ppu_map_read(addr),
        }
    }

    /// Map a PPU write ($0000-$1FFF) to a CHR RAM offset.
    ///
    /// Returns `None` when CHR is ROM at that address; the write is dropped.
    #[must_use]
    pub fn ppu_map_write(&self, addr: u16) -> Option<usize> {
        match self {
            Self::Nrom(m) => m.ppu_map_write(addr),
            Self::Mmc1(m) => m.ppu_map_write(addr),
            Self::Uxrom(m) => m.ppu_map_write(addr),
            Self::Cnrom(m) => m.ppu_map_write(addr),
            Self::Mmc3(m) => m.ppu_map_write(addr),
            Self::Axrom(m) => m.ppu_map_write(addr),
            Self::ColorDreams(m) => m.ppu_map_write(addr),
            Self::Contra100In1(m) => m.ppu_map_write(addr),
            Self::BandaiFcg(m) => m.ppu_map_write(addr),
            Self::Vrc24(m) => m.ppu_map_write(addr),
            Self::Gxrom(m) => m.ppu_map_write(addr),
            Self::Camerica(m) => m.ppu_map_write(addr),
            Self::Nina(m) => m.ppu_map_write(addr),
            Self::M202(m) => m.ppu_map_write(addr),
            Self::M225(m) => m.ppu_map_write(addr),
            Self::M227(m) => m.ppu_map_write(addr),
            Self::WaixingMmc3(m) => m.ppu_map_write(addr),
            Self::WaixingVrc4(m) => m.ppu_map_write(addr),
        }
    }

    /// Notify the mapper of the PPU's A12 rising edge (once per rendered
    /// scanline). Only scanline-counting boards react.
    pub fn scanline_tick(&mut self) {
        match self {
            Self::Mmc3(m) => m.scanline_tick(),
            Self::WaixingMmc3(m) => m.scanline_tick(),
            _ => {}
        }
    }

    /// Clock the mapper once per CPU cycle. Only cycle-counting boards react.
    pub fn cpu_tick(&mut self) {
        match self {
            Self::BandaiFcg(m) => m.cpu_tick(),
            Self::Vrc24(m) => m.cpu_tick(),
            Self::WaixingVrc4(m) => m.cpu_tick(),
            _ => {}
        }
    }

    /// Drain the mapper's IRQ line.
    ///
    /// Returns true at most once per pended IRQ; the flag self-clears.
    pub fn irq_pending(&mut self) -> bool {
        match self {
            Self::Mmc3(m) => m.take_irq(),
            Self::BandaiFcg(m) => m.take_irq(),
            Self::Vrc24(m) => m.take_irq(),
            Self::WaixingMmc3(m) => m.take_irq(),
            Self::WaixingVrc4(m) => m.take_irq(),
            _ => false,
        }
    }

    /// Reset the mapper to its power-on register state.
    pub fn reset(&mut self) {
        match self {
            Self::Nrom(_) => {}
            Self::Mmc1(m) => m.reset(),
            Self::Uxrom(m) => m.reset(),
            Self::Cnrom(m) => m.reset(),
            Self::Mmc3(m) => m.reset(),
            Self::Axrom(m) => m.reset(),
            Self::ColorDreams(m) => m.reset(),
            Self::Contra100In1(m) => m.reset(),
            Self::BandaiFcg(m) => m.reset(),
            Self::Vrc24(m) => m.reset(),
            Self::Gxrom(m) => m.reset(),
            Self::Camerica(m) => m.reset(),
            Self::Nina(m) => m.reset(),
            Self::M202(m) => m.reset(),
            Self::M225(m) => m.reset(),
            Self::M227(m) => m.reset(),
            Self::WaixingMmc3(m) => m.reset(),
            Self::WaixingVrc4(m) => m.reset(),
        }
    }

    /// Append the mapper's register state to a save-state buffer.
    pub fn write_state(&self, out: &mut Vec<u8>) {
        match self {
            Self::Nrom(_) => {}
            Self::Mmc1(m) => m.write_state(out),
            Self::Uxrom(m) => m.write_state(out),
            Self::Cnrom(m) => m.write_state(out),
            Self::Mmc3(m) => m.write_state(out),
            Self::Axrom(m) => m.write_state(out),
            Self::ColorDreams(m) => m.write_state(out),
            Self::Contra100In1(m) => m.write_state(out),
            Self::BandaiFcg(m) => m.write_state(out),
            Self::Vrc24(m) => m.write_state(out),
            Self::Gxrom(m) => m.write_state(out),
            Self::Camerica(m) => m.write_state(out),
            Self::Nina(m) => m.write_state(out),
            Self::M202(m) => m.write_state(out),
            Self::M225(m) => m.write_state(out),
            Self::M227(m) => m.write_state(out),
            Self::WaixingMmc3(m) => m.write_state(out),
            Self::WaixingVrc4(m) => m.write_state(out),
        }
    }

    /// Restore register state written by [`Mapper::write_state`].
    ///
    /// Returns `None` when the data is truncated.
    pub fn read_state(&mut self, data: &mut &[u8]) -> Option<()> {
        match self {
            Self::Nrom(_) => Some(()),
            Self::Mmc1(m) => m.read_state(data),
            Self::Uxrom(m) => m.read_state(data),
            Self::Cnrom(m) => m.read_state(data),
            Self::Mmc3(m) => m.read_state(data),
            Self::Axrom(m) => m.read_state(data),
            Self::ColorDreams(m) => m.read_state(data),
            Self::Contra100In1(m) => m.read_state(data),
            Self::BandaiFcg(m) => m.read_state(data),
            Self::Vrc24(m) => m.read_state(data),
            Self::Gxrom(m) => m.read_state(data),
            Self::Camerica(m) => m.read_state(data),
            Self::Nina(m) => m.read_state(data),
            Self::M202(m) => m.read_state(data),
            Self::M225(m) => m.read_state(data),
            Self::M227(m) => m.read_state(data),
            Self::WaixingMmc3(m) => m.read_state(data),
            Self::WaixingVrc4(m) => m.read_state(data),
        }
    }

    /// The iNES mapper number of this variant.
    #[must_use]
    pub fn number(&self) -> u8 {
        match self {
            Self::Nrom(_) => 0,
            Self::Mmc1(_) => 1,
            Self::Uxrom(_) => 2,
            Self::Cnrom(_) => 3,
            Self::Mmc3(_) => 4,
            Self::Axrom(_) => 7,
            Self::ColorDreams(_) => 11,
            Self::Contra100In1(_) => 15,
            Self::BandaiFcg(_) => 16,
            Self::Vrc24(_) => 23,
            Self::Gxrom(_) => 66,
            Self::Camerica(_) => 71,
            Self::Nina(_) => 113,
            Self::M202(_) => 202,
            Self::M225(_) => 225,
            Self::M227(_) => 227,
            Self::WaixingMmc3(_) => 245,
            Self::WaixingVrc4(_) => 253,
        }
    }

    /// A short board name for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nrom(_) => "NROM",
            Self::Mmc1(_) => "MMC1",
            Self::Uxrom(_) => "UxROM",
            Self::Cnrom(_) => "CNROM",
            Self::Mmc3(_) => "MMC3",
            Self::Axrom(_) => "AxROM",
            Self::ColorDreams(_) => "Color Dreams",
            Self::Contra100In1(_) => "100-in-1",
            Self::BandaiFcg(_) => "Bandai FCG",
            Self::Vrc24(_) => "VRC2/VRC4",
            Self::Gxrom(_) => "GxROM",
            Self::Camerica(_) => "Camerica",
            Self::Nina(_) => "NINA-03/06",
            Self::M202(_) => "150-in-1",
            Self::M225(_) => "52-in-1",
            Self::M227(_) => "1200-in-1",
            Self::WaixingMmc3(_) => "Waixing MMC3",
            Self::WaixingVrc4(_) => "Waixing VRC4",
        }
    }
}

/// Mapper numbers this crate implements.
pub const SUPPORTED_MAPPERS: &[u8] = &[
    0, 1, 2, 3, 4, 7, 11, 15, 16, 23, 66, 71, 113, 202, 225, 227, 245, 253,
];

/// Check if a mapper number is supported.
#[must_use]
pub fn is_mapper_supported(mapper: u8) -> bool {
    SUPPORTED_MAPPERS.contains(&mapper)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirroring_default() {
        assert_eq!(Mirroring::default(), Mirroring::Horizontal);
    }

    #[test]
    fn test_supported_mappers() {
        assert!(is_mapper_supported(0));
        assert!(is_mapper_supported(4));
        assert!(is_mapper_supported(253));
        assert!(!is_mapper_supported(5));
        assert!(!is_mapper_supported(9));
    }

    #[test]
    fn test_write_effect_constructors() {
        assert_eq!(WriteEffect::none().mirroring, None);
        assert!(!WriteEffect::none().irq);
        assert_eq!(
            WriteEffect::mirror(Mirroring::Vertical).mirroring,
            Some(Mirroring::Vertical)
        );
    }
}
