//! NES emulation core: CPU, PPU, APU and mapper integration.
//!
//! # Architecture
//!
//! A [`System`] owns the whole machine and drives it one frame at a time:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        System                               │
//! │  ┌─────────────────────────────────────────────────────┐    │
//! │  │                     SystemBus                       │    │
//! │  │  ┌─────┐  ┌─────┐  ┌─────┐  ┌───────────┐  ┌─────┐  │    │
//! │  │  │ RAM │  │ PPU │  │ APU │  │ Cartridge │  │ Pads│  │    │
//! │  │  │ 2KB │  │     │  │     │  │ + Mapper  │  │     │  │    │
//! │  │  └─────┘  └─────┘  └─────┘  └───────────┘  └─────┘  │    │
//! │  └─────────────────────────────────────────────────────┘    │
//! │                          ▲                                  │
//! │                     ┌────┴────┐                             │
//! │                     │   CPU   │                             │
//! │                     │  6502   │                             │
//! │                     └─────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything advances in lockstep inside [`System::run_frame`]: three
//! PPU dots per CPU cycle, the APU and mapper tick hooks every CPU
//! cycle, and interrupt polling at instruction boundaries. The function
//! returns when the PPU completes a frame; it never fails and has no
//! wall-clock or I/O dependency, so the same inputs always produce the
//! same frame.
//!
//! # Usage
//!
//! ```no_run
//! use nesmith_core::{Button, System};
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut system = System::new();
//! system.load_rom(&rom_data).expect("failed to load ROM");
//!
//! loop {
//!     system.controller(1).set_button(Button::Start, true);
//!     system.run_frame();
//!
//!     // 256x240 ARGB pixels for the display.
//!     let _frame = system.frame_buffer();
//!
//!     // Mono float samples for the audio device.
//!     let mut samples = [0.0f32; 1024];
//!     let _count = system.read_audio(&mut samples);
//! }
//! ```

mod bus;
mod controller;
pub mod save_state;
mod system;

pub use bus::{SystemBus, RAM_SIZE};
pub use controller::{Button, Controller};
pub use save_state::{SaveStateError, SAVE_STATE_MAGIC, SAVE_STATE_VERSION};
pub use system::{System, SystemError};

// Re-export commonly used types from the component crates.
pub use nesmith_apu::Apu;
pub use nesmith_cpu::Cpu;
pub use nesmith_mappers::{Cartridge, Mapper, Mirroring, RomError, RomHeader};
pub use nesmith_ppu::{Ppu, FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NES screen dimensions.
pub mod screen {
    /// Screen width in pixels.
    pub const WIDTH: u32 = 256;
    /// Screen height in pixels.
    pub const HEIGHT: u32 = 240;
    /// Total pixels per frame.
    pub const PIXELS: u32 = WIDTH * HEIGHT;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_constants() {
        assert_eq!(screen::WIDTH, 256);
        assert_eq!(screen::HEIGHT, 240);
        assert_eq!(screen::PIXELS, 61_440);
    }

    #[test]
    fn test_save_state_constants() {
        assert_eq!(SAVE_STATE_MAGIC, b"NSMS");
        assert_eq!(SAVE_STATE_VERSION, 1);
    }
}
