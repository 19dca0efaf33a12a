//! The CPU-visible system bus.
//!
//! Routes every CPU access to internal RAM ($0000-$1FFF, mirrored every
//! 2KB), the PPU registers ($2000-$3FFF, mirrored every 8 bytes), the
//! APU and I/O block ($4000-$4017), OAM DMA ($4014), the controllers
//! ($4016/$4017) or the cartridge ($4020-$FFFF). Unmapped reads return
//! the last value seen on the bus.

use nesmith_apu::Apu;
use nesmith_cpu::Bus as CpuBus;
use nesmith_mappers::Cartridge;
use nesmith_ppu::Ppu;

use crate::controller::Controller;

/// Internal RAM size.
pub const RAM_SIZE: usize = 2048;

/// System bus: RAM, PPU, APU, cartridge and controllers.
pub struct SystemBus {
    /// 2KB internal RAM.
    pub ram: [u8; RAM_SIZE],
    /// Picture processing unit.
    pub ppu: Ppu,
    /// Audio processing unit.
    pub apu: Apu,
    /// Cartridge, once a ROM is loaded.
    pub cart: Option<Cartridge>,
    /// Controller ports 1 and 2.
    pub controllers: [Controller; 2],
    /// Page pending for OAM DMA, set by a $4014 write.
    pub oam_dma_page: Option<u8>,
    /// Last value driven on the bus (open-bus reads).
    pub open_bus: u8,
}

impl SystemBus {
    /// Create an empty bus (no cartridge).
    #[must_use]
    pub fn new() -> Self {
        Self {
            ram: [0; RAM_SIZE],
            ppu: Ppu::new(),
            apu: Apu::new(),
            cart: None,
            controllers: [Controller::new(); 2],
            oam_dma_page: None,
            open_bus: 0,
        }
    }

    /// Reset RAM and every attached component.
    pub fn reset(&mut self) {
        self.ram = [0; RAM_SIZE];
        self.ppu.reset();
        self.apu.reset();
        if let Some(cart) = &mut self.cart {
            cart.reset();
        }
        self.oam_dma_page = None;
        self.open_bus = 0;
    }

    /// Advance the PPU three dots (one CPU cycle's worth) and route its
    /// per-scanline A12 notification into the mapper.
    pub fn tick_ppu(&mut self) {
        let Some(cart) = &mut self.cart else { return };
        for _ in 0..3 {
            self.ppu.tick(cart);
        }
        if self.ppu.take_scanline_irq() {
            cart.scanline_tick();
        }
    }

    /// Run the 256-byte OAM DMA transfer for a pending page.
    ///
    /// Returns the CPU stall this costs: 513 cycles, plus one more when
    /// started on an odd CPU cycle.
    pub fn run_oam_dma(&mut self, cpu_cycle: u64) -> u16 {
        let Some(page) = self.oam_dma_page.take() else {
            return 0;
        };
        let base = u16::from(page) << 8;
        for index in 0..=255u8 {
            let value = self.read(base | u16::from(index));
            self.ppu.oam_dma_write(index, value);
        }
        513 + u16::from(cpu_cycle % 2 == 1)
    }
}

impl Default for SystemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBus for SystemBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr) & (RAM_SIZE - 1)],
            0x2000..=0x3FFF => match &mut self.cart {
                Some(cart) => self.ppu.read_register(addr, cart),
                None => self.open_bus,
            },
            0x4015 => self.apu.read_status(),
            0x4016 => self.controllers[0].read() | (self.open_bus & 0xE0),
            0x4017 => self.controllers[1].read() | (self.open_bus & 0xE0),
            // The rest of the APU block is write-only.
            0x4000..=0x401F => self.open_bus,
            0x4020..=0xFFFF => match &self.cart {
                Some(cart) => cart.cpu_read(addr),
                None => self.open_bus,
            },
        };
        self.open_bus = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;
        match addr {
            0x0000..=0x1FFF => self.ram[usize::from(addr) & (RAM_SIZE - 1)] = value,
            0x2000..=0x3FFF => {
                if let Some(cart) = &mut self.cart {
                    self.ppu.write_register(addr, value, cart);
                }
            }
            0x4014 => self.oam_dma_page = Some(value),
            0x4016 => {
                self.controllers[0].write_strobe(value);
                self.controllers[1].write_strobe(value);
            }
            0x4000..=0x4013 | 0x4015 | 0x4017 => self.apu.write(addr, value),
            0x4018..=0x401F => {}
            0x4020..=0xFFFF => {
                if let Some(cart) = &mut self.cart {
                    cart.cpu_write(addr, value);
                }
            }
        }
    }
}
