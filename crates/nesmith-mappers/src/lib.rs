//! NES cartridge and mapper implementations.
//!
//! This crate parses iNES images into a [`Cartridge`] and models the
//! bank-switching hardware of 18 cartridge boards. Mappers translate CPU
//! and PPU addresses into offsets; the cartridge owns the actual PRG/CHR
//! bytes and masks every offset by the backing size.
//!
//! # Supported Mappers
//!
//! | Mapper | Name | Description |
//! |--------|------|-------------|
//! | 0 | NROM | No banking |
//! | 1 | MMC1 | Serial shift-register banking |
//! | 2 | UxROM | 16KB PRG banking, fixed last bank |
//! | 3 | CNROM | 8KB CHR banking |
//! | 4 | MMC3 | Fine-grained banking + scanline IRQ |
//! | 7 | AxROM | 32KB PRG + single-screen mirroring |
//! | 11 | Color Dreams | PRG/CHR nibble latch |
//! | 15 | 100-in-1 | Four-mode multicart |
//! | 16 | Bandai FCG | Cycle-counted IRQ |
//! | 23 | VRC2/VRC4 | Konami banking + prescaled IRQ |
//! | 66 | GxROM | PRG/CHR latch |
//! | 71 | Camerica | UxROM-like, $9000 mirroring |
//! | 113 | NINA-03/06 | Expansion-port register |
//! | 202 | 150-in-1 | Address-latched multicart |
//! | 225 | 52-in-1 | Large multicart |
//! | 227 | 1200-in-1 | Address-latched multicart |
//! | 245 | Waixing MMC3 | MMC3 + PRG high bit in CHR R0 |
//! | 253 | Waixing VRC4 | VRC4 + switchable CHR RAM window |
//!
//! # Example
//!
//! ```no_run
//! use nesmith_mappers::Cartridge;
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let cart = Cartridge::load(&rom_data).expect("failed to parse ROM");
//!
//! let opcode = cart.cpu_read(0x8000);
//! let tile = cart.ppu_read(0x0000);
//! ```

pub mod cartridge;
pub mod mapper;

mod axrom;
mod bandai;
mod camerica;
mod cnrom;
mod colordreams;
mod gxrom;
mod m015;
mod m113;
mod m202;
mod m225;
mod m227;
mod m245;
mod m253;
mod mmc1;
mod mmc3;
mod nrom;
mod state;
mod uxrom;
mod vrc;

pub use cartridge::{Cartridge, RomError, RomHeader, CHR_RAM_SIZE, PRG_RAM_SIZE};
pub use mapper::{is_mapper_supported, Mapper, Mirroring, WriteEffect, SUPPORTED_MAPPERS};

pub use axrom::Axrom;
pub use bandai::BandaiFcg;
pub use camerica::Camerica;
pub use cnrom::Cnrom;
pub use colordreams::ColorDreams;
pub use gxrom::Gxrom;
pub use m015::Contra100In1;
pub use m113::Nina;
pub use m202::M202;
pub use m225::M225;
pub use m227::M227;
pub use m245::WaixingMmc3;
pub use m253::WaixingVrc4;
pub use mmc1::Mmc1;
pub use mmc3::Mmc3;
pub use nrom::Nrom;
pub use uxrom::Uxrom;
pub use vrc::Vrc24;
