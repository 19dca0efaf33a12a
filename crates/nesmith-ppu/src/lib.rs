//! Cycle-accurate Ricoh 2C02 PPU emulation for the NES.
//!
//! Renders 256x240 ARGB frames one dot at a time: loopy scroll registers,
//! the 8-dot background fetch cadence, per-scanline sprite evaluation
//! with sprite-zero hit and overflow, VBlank/NMI timing, the odd-frame
//! short line, and an A12 notification for scanline-counting mappers.
//!
//! The PPU owns its nametable and palette RAM; pattern-table accesses
//! borrow the [`nesmith_mappers::Cartridge`] passed into each call, so no
//! reference cycles exist between the chips.

mod background;
mod oam;
pub mod palette;
mod ppu;
mod registers;
mod scroll;
mod sprites;

pub use background::Background;
pub use oam::{Oam, SecondaryOam, SpriteEntry};
pub use ppu::{Ppu, PpuState, FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use scroll::Scroll;
pub use sprites::{SpritePixel, Sprites};
