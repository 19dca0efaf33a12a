//! The complete console: master clock, interrupt routing, host API.

use log::debug;

use nesmith_cpu::Cpu;
use nesmith_mappers::{Cartridge, RomError};

use crate::bus::SystemBus;
use crate::controller::Controller;
use crate::save_state;
use crate::save_state::SaveStateError;

/// Top-level error for [`System`] entry points.
///
/// Wraps the component-level failures so hosts can match one type; the
/// underlying [`RomError`] and [`SaveStateError`] stay reachable through
/// the variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SystemError {
    /// ROM parsing or mapper selection failed.
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),

    /// Save-state restore failed.
    #[error("save state error: {0}")]
    SaveState(#[from] SaveStateError),
}

/// An NES console.
///
/// Owns every component and advances them in lockstep: three PPU dots
/// per CPU cycle, the APU and mapper hooks on every CPU cycle, interrupt
/// polling at instruction boundaries.
///
/// # Example
///
/// ```no_run
/// use nesmith_core::System;
///
/// let rom = std::fs::read("game.nes").expect("failed to read ROM");
/// let mut system = System::new();
/// system.load_rom(&rom).expect("failed to load ROM");
///
/// loop {
///     system.run_frame();
///     let _pixels = system.frame_buffer();
///     let mut samples = [0.0f32; 735];
///     let _count = system.read_audio(&mut samples);
/// }
/// ```
pub struct System {
    cpu: Cpu,
    bus: SystemBus,
}

impl System {
    /// Create a console with no cartridge inserted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            bus: SystemBus::new(),
        }
    }

    /// Parse an iNES image, insert the cartridge and reset.
    ///
    /// # Errors
    ///
    /// Returns [`RomError::UnsupportedRom`] for malformed images and
    /// [`RomError::UnsupportedMapper`] for unimplemented boards, wrapped
    /// in [`SystemError::Rom`].
    pub fn load_rom(&mut self, data: &[u8]) -> Result<(), SystemError> {
        let cart = Cartridge::load(data)?;
        debug!("inserted cartridge: {}", cart.mapper().name());
        self.bus.cart = Some(cart);
        self.reset();
        Ok(())
    }

    /// Reset the whole machine: RAM cleared, every chip re-seeded from
    /// its reset state, CPU vectored through $FFFC.
    pub fn reset(&mut self) {
        self.bus.reset();
        if self.bus.cart.is_some() {
            self.cpu.reset(&mut self.bus);
        }
    }

    /// Run the machine until the PPU completes one frame.
    ///
    /// Total: never fails, regardless of what the ROM does. Without a
    /// cartridge this returns immediately.
    pub fn run_frame(&mut self) {
        if self.bus.cart.is_none() {
            return;
        }
        loop {
            self.master_cycle();
            if self.bus.ppu.frame_complete() {
                self.bus.ppu.clear_frame_complete();
                break;
            }
        }
    }

    /// Run exactly one CPU instruction with its full PPU/APU interleave.
    ///
    /// Returns the cycles consumed. This is the frame loop at a finer
    /// grain, for trace harnesses; a frame driven by `run_frame` and one
    /// driven by repeated `step_instruction` calls are identical.
    pub fn step_instruction(&mut self) -> u64 {
        if self.bus.cart.is_none() {
            return 0;
        }
        let start = self.cpu.total_cycles();
        loop {
            self.master_cycle();
            if self.cpu.complete() {
                break;
            }
        }
        self.cpu.total_cycles() - start
    }

    /// One master step: 3 PPU dots, then one CPU/APU/mapper cycle, then
    /// interrupt polling at the instruction boundary.
    fn master_cycle(&mut self) {
        self.bus.tick_ppu();

        // OAM DMA takes over the bus between instructions.
        if self.cpu.complete() && self.bus.oam_dma_page.is_some() {
            let stall = self.bus.run_oam_dma(self.cpu.total_cycles());
            self.cpu.stall(stall);
        }

        self.cpu.clock(&mut self.bus);
        self.bus.apu.clock();
        self.service_dmc();
        if let Some(cart) = &mut self.bus.cart {
            cart.cpu_tick();
        }

        // Interrupts are taken between instructions. NMI wins; the IRQ
        // line is the OR of mapper, frame-counter and DMC.
        if self.cpu.complete() {
            if self.bus.ppu.take_nmi() {
                self.cpu.nmi(&mut self.bus);
            } else if self.irq_line() {
                self.cpu.irq(&mut self.bus);
            }
        }
    }

    /// Feed the DMC when it wants a sample byte; the fetch steals up to
    /// four CPU cycles.
    fn service_dmc(&mut self) {
        if !self.bus.apu.dmc.needs_sample() {
            return;
        }
        let addr = self.bus.apu.dmc.sample_addr();
        let value = match &self.bus.cart {
            Some(cart) => cart.cpu_read(addr),
            None => 0,
        };
        self.bus.apu.dmc.fill_sample_buffer(value);
        self.cpu.stall(4);
    }

    /// Aggregate level-triggered IRQ sources. The mapper's latch drains
    /// on read; the APU lines clear through their own registers.
    fn irq_line(&mut self) -> bool {
        let mapper_irq = self
            .bus
            .cart
            .as_mut()
            .is_some_and(Cartridge::irq_pending);
        mapper_irq || self.bus.apu.irq_pending()
    }

    // ---- host-facing surface ----

    /// The last completed frame: 256x240 ARGB pixels, row-major.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u32] {
        self.bus.ppu.frame_buffer()
    }

    /// Drain up to `out.len()` audio samples; returns the count written.
    pub fn read_audio(&mut self, out: &mut [f32]) -> usize {
        self.bus.apu.read_samples(out)
    }

    /// Reconfigure the audio output rate (Hz).
    pub fn set_audio_sample_rate(&mut self, rate: u32) {
        self.bus.apu.set_sample_rate(rate);
    }

    /// Controller on port 1 or 2 (anything else maps to port 2).
    pub fn controller(&mut self, port: usize) -> &mut Controller {
        let index = usize::from(port != 1);
        &mut self.bus.controllers[index]
    }

    /// Serialize the complete machine state into a versioned blob.
    #[must_use]
    pub fn save_state(&self) -> Vec<u8> {
        save_state::serialize(&self.cpu, &self.bus)
    }

    /// Restore a state produced by [`System::save_state`].
    ///
    /// # Errors
    ///
    /// Rejects blobs with a different version
    /// ([`SaveStateError::VersionMismatch`]) and malformed data
    /// ([`SaveStateError::Corrupt`]), wrapped in
    /// [`SystemError::SaveState`].
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), SystemError> {
        save_state::deserialize(data, &mut self.cpu, &mut self.bus)?;
        Ok(())
    }

    /// Total CPU cycles executed since power-on.
    #[must_use]
    pub fn total_cycles(&self) -> u64 {
        self.cpu.total_cycles()
    }

    /// The CPU, for inspection.
    #[must_use]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable CPU access (tracing harnesses set PC directly).
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// The bus, for inspection.
    #[must_use]
    pub fn bus(&self) -> &SystemBus {
        &self.bus
    }

    /// Mutable bus access.
    pub fn bus_mut(&mut self) -> &mut SystemBus {
        &mut self.bus
    }

    /// Battery-backed save RAM, when the cartridge has one.
    #[must_use]
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.bus.cart.as_ref().and_then(Cartridge::battery_ram)
    }

    /// Restore battery-backed save RAM.
    pub fn load_battery_ram(&mut self, data: &[u8]) {
        if let Some(cart) = &mut self.bus.cart {
            cart.load_battery_ram(data);
        }
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
