//! Cartridge: iNES parsing plus the runtime PRG/CHR/RAM storage.
//!
//! The cartridge owns every byte the mapper banks over. Mappers only ever
//! produce offsets; all indexing here is masked by the backing length, so a
//! bank register pointing past the end of ROM wraps instead of panicking,
//! which is what the address lines on a real board do.

use log::{debug, warn};

use crate::mapper::{Mapper, Mirroring};
use crate::{
    axrom::Axrom, bandai::BandaiFcg, camerica::Camerica, cnrom::Cnrom, colordreams::ColorDreams,
    gxrom::Gxrom, m015::Contra100In1, m113::Nina, m202::M202, m225::M225, m227::M227,
    m245::WaixingMmc3, m253::WaixingVrc4, mmc1::Mmc1, mmc3::Mmc3, nrom::Nrom, uxrom::Uxrom,
    vrc::Vrc24,
};

/// PRG RAM size at $6000-$7FFF.
pub const PRG_RAM_SIZE: usize = 8 * 1024;

/// CHR RAM size allocated when the header declares zero CHR banks.
pub const CHR_RAM_SIZE: usize = 8 * 1024;

/// Errors from ROM loading.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RomError {
    /// Not an iNES image (bad magic or truncated data).
    #[error("not a valid iNES image")]
    UnsupportedRom,

    /// The image parsed but names a mapper this crate does not implement.
    #[error("unsupported mapper {0}")]
    UnsupportedMapper(u8),
}

/// Parsed 16-byte iNES header.
///
/// ```text
/// Byte 0-3: magic "NES" + MS-DOS EOF (4E 45 53 1A)
/// Byte 4:   PRG ROM size in 16KB units
/// Byte 5:   CHR ROM size in 8KB units (0 = board carries CHR RAM)
/// Byte 6:   flags: mirroring, battery, trainer, four-screen, mapper low nibble
/// Byte 7:   flags: NES 2.0 marker, mapper high nibble
/// Byte 8-15: ignored (tolerated for NES 2.0 images)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomHeader {
    /// PRG ROM size in 16KB banks.
    pub prg_banks: u8,
    /// CHR ROM size in 8KB banks (0 means CHR RAM).
    pub chr_banks: u8,
    /// iNES mapper number.
    pub mapper: u8,
    /// Mirroring from the header (four-screen wins over the H/V bit).
    pub mirroring: Mirroring,
    /// Battery-backed PRG RAM present.
    pub has_battery: bool,
    /// 512-byte trainer precedes PRG ROM.
    pub has_trainer: bool,
    /// Header carries the NES 2.0 marker (extended fields are ignored).
    pub nes2: bool,
}

impl RomHeader {
    const MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

    /// Parse the 16-byte header.
    ///
    /// # Errors
    ///
    /// Returns [`RomError::UnsupportedRom`] if the data is shorter than a
    /// header or the magic does not match.
    pub fn parse(data: &[u8]) -> Result<Self, RomError> {
        if data.len() < 16 || data[0..4] != Self::MAGIC {
            return Err(RomError::UnsupportedRom);
        }

        let flags6 = data[6];
        let flags7 = data[7];
        let mapper = (flags6 >> 4) | (flags7 & 0xF0);

        let mirroring = if flags6 & 0x08 != 0 {
            Mirroring::FourScreen
        } else if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };

        Ok(Self {
            prg_banks: data[4],
            chr_banks: data[5],
            mapper,
            mirroring,
            has_battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
            nes2: (flags7 & 0x0C) == 0x08,
        })
    }
}

/// A loaded cartridge: header, ROM/RAM storage and the mapper instance.
#[derive(Debug, Clone)]
pub struct Cartridge {
    /// Parsed header.
    pub header: RomHeader,
    prg_rom: Vec<u8>,
    /// CHR storage. Either CHR ROM, an 8KB CHR RAM buffer (when the header
    /// declares zero CHR banks), or CHR ROM with an 8KB CHR RAM region
    /// appended (mapper 253).
    chr: Vec<u8>,
    /// Offset of the first writable CHR byte; `chr.len()` when CHR is all ROM.
    chr_ram_start: usize,
    prg_ram: Vec<u8>,
    mirroring: Mirroring,
    mapper: Mapper,
}

impl Cartridge {
    /// Parse an iNES image and build the matching mapper.
    ///
    /// # Errors
    ///
    /// Returns [`RomError::UnsupportedRom`] for a malformed or truncated
    /// image, and [`RomError::UnsupportedMapper`] when the mapper number is
    /// not implemented.
    pub fn load(data: &[u8]) -> Result<Self, RomError> {
        let header = RomHeader::parse(data)?;

        let mut offset = 16;
        if header.has_trainer {
            // 512 bytes of trainer data nothing in the supported set uses.
            offset += 512;
        }

        let prg_len = usize::from(header.prg_banks) * 16 * 1024;
        let chr_len = usize::from(header.chr_banks) * 8 * 1024;
        if prg_len == 0 || data.len() < offset + prg_len + chr_len {
            return Err(RomError::UnsupportedRom);
        }

        let prg_rom = data[offset..offset + prg_len].to_vec();
        offset += prg_len;

        // CHR banks = 0 means the board supplies 8KB of CHR RAM instead of
        // ROM. Mapper 253 additionally appends a CHR RAM window after its
        // CHR ROM; reads can resolve into either region.
        let chr_is_ram = chr_len == 0;
        let mut chr = if chr_is_ram {
            vec![0u8; CHR_RAM_SIZE]
        } else {
            data[offset..offset + chr_len].to_vec()
        };
        let mut chr_ram_start = if chr_is_ram { 0 } else { chr.len() };
        if header.mapper == 253 && !chr_is_ram {
            chr_ram_start = chr.len();
            chr.resize(chr.len() + CHR_RAM_SIZE, 0);
        }

        let mapper = build_mapper(&header, prg_rom.len(), &chr, chr_is_ram, chr_ram_start)?;

        debug!(
            "loaded ROM: mapper {} ({}), {}x16KB PRG, {}x8KB CHR{}{}",
            header.mapper,
            mapper.name(),
            header.prg_banks,
            header.chr_banks,
            if chr_is_ram { " (CHR RAM)" } else { "" },
            if header.has_battery { ", battery" } else { "" },
        );

        Ok(Self {
            header,
            prg_rom,
            chr,
            chr_ram_start,
            prg_ram: vec![0u8; PRG_RAM_SIZE],
            mirroring: header.mirroring,
            mapper,
        })
    }

    /// CPU read in cartridge space ($4020-$FFFF).
    #[must_use]
    pub fn cpu_read(&self, addr: u16) -> u8 {
        if let Some(offset) = self.mapper.cpu_map_read(addr) {
            self.prg_rom[offset % self.prg_rom.len()]
        } else if (0x6000..=0x7FFF).contains(&addr) {
            self.prg_ram[usize::from(addr - 0x6000) % self.prg_ram.len()]
        } else {
            0
        }
    }

    /// CPU write in cartridge space ($4020-$FFFF).
    ///
    /// Mapper registers take priority; anything the mapper doesn't decode
    /// falls through to PRG RAM, and writes into ROM are dropped.
    pub fn cpu_write(&mut self, addr: u16, value: u8) {
        if let Some(effect) = self.mapper.cpu_map_write(addr, value) {
            if let Some(mode) = effect.mirroring {
                self.mirroring = mode;
            }
        } else if (0x6000..=0x7FFF).contains(&addr) {
            let len = self.prg_ram.len();
            self.prg_ram[usize::from(addr - 0x6000) % len] = value;
        }
    }

    /// PPU read in pattern-table space ($0000-$1FFF).
    #[must_use]
    pub fn ppu_read(&self, addr: u16) -> u8 {
        match self.mapper.ppu_map_read(addr) {
            Some(offset) if !self.chr.is_empty() => self.chr[offset % self.chr.len()],
            _ => 0,
        }
    }

    /// PPU write in pattern-table space ($0000-$1FFF).
    pub fn ppu_write(&mut self, addr: u16, value: u8) {
        if let Some(offset) = self.mapper.ppu_map_write(addr) {
            let offset = offset % self.chr.len().max(1);
            if offset >= self.chr_ram_start {
                self.chr[offset] = value;
            } else {
                warn!("CHR ROM write dropped at ${addr:04X}");
            }
        }
    }

    /// Current nametable mirroring (header value until a mapper changes it).
    #[must_use]
    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    /// Notify the mapper of the PPU's per-scanline A12 rising edge.
    pub fn scanline_tick(&mut self) {
        self.mapper.scanline_tick();
    }

    /// Clock the mapper once per CPU cycle.
    pub fn cpu_tick(&mut self) {
        self.mapper.cpu_tick();
    }

    /// Drain the mapper IRQ line (self-clearing).
    pub fn irq_pending(&mut self) -> bool {
        self.mapper.irq_pending()
    }

    /// Reset the mapper and restore header mirroring.
    pub fn reset(&mut self) {
        self.mapper.reset();
        self.mirroring = self.header.mirroring;
    }

    /// Battery-backed PRG RAM contents, if the header declares a battery.
    #[must_use]
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.header.has_battery.then_some(self.prg_ram.as_slice())
    }

    /// Restore battery-backed PRG RAM.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        let len = data.len().min(self.prg_ram.len());
        self.prg_ram[..len].copy_from_slice(&data[..len]);
    }

    /// The mapper instance (for diagnostics).
    #[must_use]
    pub fn mapper(&self) -> &Mapper {
        &self.mapper
    }

    /// Snapshot accessors used by the save-state codec.
    #[must_use]
    pub fn prg_ram(&self) -> &[u8] {
        &self.prg_ram
    }

    /// Mutable PRG RAM for state restore.
    pub fn prg_ram_mut(&mut self) -> &mut [u8] {
        &mut self.prg_ram
    }

    /// Writable CHR region (empty when CHR is all ROM).
    #[must_use]
    pub fn chr_ram(&self) -> &[u8] {
        &self.chr[self.chr_ram_start..]
    }

    /// Mutable CHR RAM for state restore.
    pub fn chr_ram_mut(&mut self) -> &mut [u8] {
        let start = self.chr_ram_start;
        &mut self.chr[start..]
    }

    /// Append the mapper's register state to a save-state buffer.
    pub fn write_mapper_state(&self, out: &mut Vec<u8>) {
        self.mapper.write_state(out);
    }

    /// Restore the mapper's register state; `None` on truncation.
    pub fn read_mapper_state(&mut self, data: &mut &[u8]) -> Option<()> {
        self.mapper.read_state(data)
    }

    /// Set the mirroring mode directly (save-state restore).
    pub fn set_mirroring(&mut self, mode: Mirroring) {
        self.mirroring = mode;
    }
}

/// Build the mapper variant for a parsed header.
fn build_mapper(
    header: &RomHeader,
    prg_len: usize,
    chr: &[u8],
    chr_is_ram: bool,
    chr_ram_start: usize,
) -> Result<Mapper, RomError> {
    let prg_banks = prg_len / (16 * 1024);
    let chr_len = chr.len();
    Ok(match header.mapper {
        0 => Mapper::Nrom(Nrom::new(prg_banks, chr_is_ram)),
        1 => Mapper::Mmc1(Mmc1::new(prg_banks, chr_len, chr_is_ram)),
        2 => Mapper::Uxrom(Uxrom::new(prg_banks, chr_is_ram)),
        3 => Mapper::Cnrom(Cnrom::new(chr_len)),
        4 => Mapper::Mmc3(Mmc3::new(prg_len, chr_len, chr_is_ram)),
        7 => Mapper::Axrom(Axrom::new(prg_banks, chr_is_ram)),
        11 => Mapper::ColorDreams(ColorDreams::new(prg_len, chr_len)),
        15 => Mapper::Contra100In1(Contra100In1::new(prg_banks)),
        16 => Mapper::BandaiFcg(BandaiFcg::new(prg_banks, chr_len)),
        23 => Mapper::Vrc24(Vrc24::new(prg_len, chr_len, chr_is_ram)),
        66 => Mapper::Gxrom(Gxrom::new(prg_len, chr_len)),
        71 => Mapper::Camerica(Camerica::new(prg_banks, chr_is_ram)),
        113 => Mapper::Nina(Nina::new(prg_len, chr_len)),
        202 => Mapper::M202(M202::new(prg_banks, chr_len, chr_is_ram)),
        225 => Mapper::M225(M225::new(prg_banks, chr_len)),
        227 => Mapper::M227(M227::new(prg_banks, chr_is_ram)),
        245 => Mapper::WaixingMmc3(WaixingMmc3::new(prg_len, chr_len, chr_is_ram)),
        253 => Mapper::WaixingVrc4(WaixingVrc4::new(prg_len, chr_len, chr_ram_start)),
        n => return Err(RomError::UnsupportedMapper(n)),
    })
}
