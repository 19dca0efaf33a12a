//! CPU-visible PPU register bit definitions (PPUCTRL, PPUMASK, PPUSTATUS).

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL ($2000).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuCtrl: u8 {
        /// Base nametable select, bit 0.
        const NAMETABLE_X = 1 << 0;
        /// Base nametable select, bit 1.
        const NAMETABLE_Y = 1 << 1;
        /// VRAM address increment: 0 = +1, 1 = +32.
        const VRAM_INCREMENT = 1 << 2;
        /// Sprite pattern table select (8x8 sprites only).
        const SPRITE_TABLE = 1 << 3;
        /// Background pattern table select.
        const BACKGROUND_TABLE = 1 << 4;
        /// Sprite size: 0 = 8x8, 1 = 8x16.
        const SPRITE_SIZE = 1 << 5;
        /// Master/slave select (unused by the composite output).
        const MASTER_SLAVE = 1 << 6;
        /// Generate NMI at the start of vertical blank.
        const NMI_ENABLE = 1 << 7;
    }
}

impl PpuCtrl {
    /// VRAM address step for $2007 accesses.
    #[must_use]
    pub fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    /// Background pattern table base address.
    #[must_use]
    pub fn background_table(self) -> u16 {
        if self.contains(Self::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite pattern table base address (8x8 mode).
    #[must_use]
    pub fn sprite_table(self) -> u16 {
        if self.contains(Self::SPRITE_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite height in pixels.
    #[must_use]
    pub fn sprite_height(self) -> u16 {
        if self.contains(Self::SPRITE_SIZE) {
            16
        } else {
            8
        }
    }
}

bitflags! {
    /// PPUMASK ($2001).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuMask: u8 {
        /// Grayscale output.
        const GRAYSCALE = 1 << 0;
        /// Show background in the leftmost 8 pixels.
        const SHOW_BACKGROUND_LEFT = 1 << 1;
        /// Show sprites in the leftmost 8 pixels.
        const SHOW_SPRITES_LEFT = 1 << 2;
        /// Enable background rendering.
        const SHOW_BACKGROUND = 1 << 3;
        /// Enable sprite rendering.
        const SHOW_SPRITES = 1 << 4;
        /// Emphasize red.
        const EMPHASIZE_RED = 1 << 5;
        /// Emphasize green.
        const EMPHASIZE_GREEN = 1 << 6;
        /// Emphasize blue.
        const EMPHASIZE_BLUE = 1 << 7;
    }
}

impl PpuMask {
    /// Rendering is on when either layer is enabled.
    #[must_use]
    pub fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BACKGROUND | Self::SHOW_SPRITES)
    }
}

bitflags! {
    /// PPUSTATUS ($2002). Only the top three bits are driven.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PpuStatus: u8 {
        /// More than eight sprites were found on a scanline.
        const SPRITE_OVERFLOW = 1 << 5;
        /// Sprite 0 overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 1 << 6;
        /// Currently in vertical blank.
        const VBLANK = 1 << 7;
    }
}
