//! Mapper behavior exercised through the full system bus.

mod common;

use common::build_ines;
use nesmith_core::{Mirroring, System};

/// Write through the CPU bus into cartridge space.
fn poke(system: &mut System, addr: u16, value: u8) {
    use nesmith_cpu::Bus;
    system.bus_mut().write(addr, value);
}

#[test]
fn test_uxrom_bank_switch_via_bus() {
    // Stamp each 16KB bank with its index at offset 0.
    let mut image = build_ines(8, 0, 2, 0, &[]);
    for bank in 0..8usize {
        image[16 + bank * 0x4000] = bank as u8;
    }
    let mut system = System::new();
    system.load_rom(&image).unwrap();

    use nesmith_cpu::Bus;
    poke(&mut system, 0x8000, 3);
    assert_eq!(system.bus_mut().read(0x8000), 3);
    assert_eq!(system.bus_mut().read(0xC000), 7); // fixed last bank
}

#[test]
fn test_mapper_225_mirroring_decode() {
    let mut system = System::new();
    system.load_rom(&build_ines(4, 1, 225, 0, &[])).unwrap();

    // Address bit 13 set selects vertical arrangement.
    poke(&mut system, 0x8000 | 0x2000, 0);
    assert_eq!(
        system.bus().cart.as_ref().unwrap().mirroring(),
        Mirroring::Vertical
    );
    poke(&mut system, 0x8000, 0);
    assert_eq!(
        system.bus().cart.as_ref().unwrap().mirroring(),
        Mirroring::Horizontal
    );
}

#[test]
fn test_mapper_225_boot_renders() {
    // Regression guard for the historical mirroring inversion: the
    // multicart menu must put something other than backdrop on screen.
    let program = [
        // Palette: backdrop $0F, color 3 -> $30.
        0xA9, 0x3F, 0x8D, 0x06, 0x20, //
        0xA9, 0x00, 0x8D, 0x06, 0x20, //
        0xA9, 0x0F, 0x8D, 0x07, 0x20, //
        0xA9, 0x00, 0x8D, 0x07, 0x20, //
        0xA9, 0x10, 0x8D, 0x07, 0x20, //
        0xA9, 0x30, 0x8D, 0x07, 0x20, //
        0xA9, 0x20, 0x8D, 0x06, 0x20, //
        0xA9, 0x00, 0x8D, 0x06, 0x20, //
        0xA9, 0x0A, 0x8D, 0x01, 0x20, // enable background
        0x4C, 0x2D, 0x80, // spin
    ];
    let mut system = System::new();
    system.load_rom(&build_ines(4, 1, 225, 0, &program)).unwrap();
    for _ in 0..3 {
        system.run_frame();
    }
    let backdrop = nesmith_ppu::palette::argb(0x0F);
    assert!(system.frame_buffer().iter().any(|&pixel| pixel != backdrop));
}

#[test]
fn test_mmc1_serial_interface_via_bus() {
    let mut image = build_ines(8, 0, 1, 0, &[]);
    for bank in 0..8usize {
        image[16 + bank * 0x4000] = 0x40 + bank as u8;
    }
    // Keep the reset vector in the last bank pointing at $8000.
    let mut system = System::new();
    system.load_rom(&image).unwrap();

    use nesmith_cpu::Bus;
    // Select PRG bank 5 through five serial writes to $E000.
    for bit in 0..5 {
        poke(&mut system, 0xE000, (5 >> bit) & 1);
    }
    assert_eq!(system.bus_mut().read(0x8000), 0x45);
}

#[test]
fn test_mmc3_irq_reaches_cpu() {
    // MMC3 cartridge whose program enables rendering and the scanline
    // IRQ, then spins. The IRQ handler increments $00 and re-arms.
    let program = [
        0xA9, 0x0A, 0x8D, 0x01, 0x20, // LDA #$0A; STA $2001 (render on)
        0xA9, 0x10, 0x8D, 0x00, 0xC0, // LDA #$10; STA $C000 (latch 16)
        0x8D, 0x01, 0xC0, // STA $C001 (reload)
        0x8D, 0x01, 0xE0, // STA $E001 (IRQ enable)
        0x58, // CLI
        0x4C, 0x10, 0x80, // spin
    ];
    let mut image = build_ines(2, 1, 4, 0, &program);
    // IRQ handler at $9100: INC $00; re-arm via $C001/$E001; RTI.
    let handler = [
        0xE6, 0x00, // INC $00
        0x8D, 0x01, 0xC0, // STA $C001
        0x8D, 0x01, 0xE0, // STA $E001
        0x40, // RTI
    ];
    let handler_offset = 16 + 0x1100;
    image[handler_offset..handler_offset + handler.len()].copy_from_slice(&handler);
    // IRQ/BRK vector -> $9100 (last two bytes of PRG).
    let prg_end = 16 + 2 * 0x4000;
    image[prg_end - 2] = 0x00;
    image[prg_end - 1] = 0x91;

    let mut system = System::new();
    system.load_rom(&image).unwrap();
    for _ in 0..10 {
        system.run_frame();
    }

    use nesmith_cpu::Bus;
    let count = system.bus_mut().read(0x0000);
    assert!(count > 0, "MMC3 IRQ never fired");
}

#[test]
fn test_mapper_253_chr_ram_window_via_bus() {
    let mut system = System::new();
    system.load_rom(&build_ines(8, 8, 253, 0, &[])).unwrap();

    // Unlock the window, then point region 0 at RAM bank 4.
    poke(&mut system, 0xC000, 0x08);
    poke(&mut system, 0xC004, 0x0C); // chr_low[2] = $C8 -> unlock
    poke(&mut system, 0xB000, 0x04);
    poke(&mut system, 0xB004, 0x00);

    // Writes through PPUDATA land in the appended CHR RAM and read back.
    use nesmith_cpu::Bus;
    let bus = system.bus_mut();
    bus.write(0x2006, 0x00);
    bus.write(0x2006, 0x10);
    bus.write(0x2007, 0x5A);
    bus.write(0x2006, 0x00);
    bus.write(0x2006, 0x10);
    let _ = bus.read(0x2007); // buffered
    assert_eq!(bus.read(0x2007), 0x5A);
}

#[test]
fn test_bandai_irq_counts_cpu_cycles() {
    // Program: set a short IRQ countdown, CLI, spin. Handler: INC $00,
    // disable the counter, RTI.
    let program = [
        0xA9, 0x00, 0x8D, 0x0B, 0x80, // latch low = 0
        0xA9, 0x01, 0x8D, 0x0C, 0x80, // latch high = 1 (256 cycles)
        0xA9, 0x01, 0x8D, 0x0A, 0x80, // enable + reload
        0x58, // CLI
        0x4C, 0x10, 0x80, // spin
    ];
    let mut image = build_ines(2, 1, 16, 0, &program);
    let handler = [
        0xE6, 0x00, // INC $00
        0xA9, 0x00, 0x8D, 0x0A, 0x80, // disable
        0x40, // RTI
    ];
    let handler_offset = 16 + 0x1100;
    image[handler_offset..handler_offset + handler.len()].copy_from_slice(&handler);
    let prg_end = 16 + 2 * 0x4000;
    image[prg_end - 2] = 0x00;
    image[prg_end - 1] = 0x91;

    let mut system = System::new();
    system.load_rom(&image).unwrap();
    system.run_frame();

    use nesmith_cpu::Bus;
    assert_eq!(system.bus_mut().read(0x0000), 1);
}
