//! Test-ROM and commercial-ROM scenarios.
//!
//! These need ROM images that cannot ship with the repository. Point
//! `NESMITH_ROM_DIR` at a directory containing them and run with
//! `cargo test -- --ignored`. Without the directory the tests are
//! skipped, so the default suite stays green.

use std::path::PathBuf;

use nesmith_core::System;

fn rom_path(name: &str) -> Option<PathBuf> {
    let dir = std::env::var_os("NESMITH_ROM_DIR")?;
    let path = PathBuf::from(dir).join(name);
    path.exists().then_some(path)
}

/// CPU conformance against the published nestest golden log.
///
/// nestest's automated mode starts at $C000 and walks every documented
/// opcode; the golden log records registers and cycle counts for 8991
/// instructions.
#[test]
#[ignore = "requires nestest.nes and nestest.log in NESMITH_ROM_DIR"]
fn test_nestest_cpu_conformance() {
    let Some(rom) = rom_path("nestest.nes") else {
        eprintln!("skipping: nestest.nes not found");
        return;
    };
    let Some(log) = rom_path("nestest.log") else {
        eprintln!("skipping: nestest.log not found");
        return;
    };

    let data = std::fs::read(rom).expect("failed to read nestest.nes");
    let expected = std::fs::read_to_string(log).expect("failed to read nestest.log");

    let mut system = System::new();
    system.load_rom(&data).expect("nestest failed to load");
    // Automated mode entry point.
    system.cpu_mut().pc = 0xC000;

    let mut cycle_offset = None;
    for (index, line) in expected.lines().take(8991).enumerate() {
        let cpu = system.cpu().clone();
        let ours = nesmith_cpu::trace_line(&cpu, system.bus_mut());
        let pc: u16 = u16::from_str_radix(&line[0..4], 16).unwrap();
        assert_eq!(
            cpu.pc, pc,
            "PC diverged at instruction {index}:\n golden: {line}\n   ours: {ours}"
        );

        let field = |tag: &str| -> u8 {
            let at = line.find(tag).unwrap() + tag.len();
            u8::from_str_radix(&line[at..at + 2], 16).unwrap()
        };
        assert_eq!(cpu.a, field("A:"), "A diverged at {index}: {line}");
        assert_eq!(cpu.x, field("X:"), "X diverged at {index}: {line}");
        assert_eq!(cpu.y, field("Y:"), "Y diverged at {index}: {line}");
        assert_eq!(
            cpu.status.bits() | 0x20,
            field("P:") | 0x20,
            "P diverged at {index}: {line}"
        );
        assert_eq!(cpu.sp, field("SP:"), "SP diverged at {index}: {line}");

        // The golden log counts cycles from its own baseline; anchor to
        // the first line and compare deltas from there.
        let cyc_at = line.find("CYC:").unwrap() + 4;
        let expected_cycles: u64 = line[cyc_at..].trim().parse().unwrap();
        let offset = *cycle_offset.get_or_insert(expected_cycles - cpu.total_cycles());
        assert_eq!(
            cpu.total_cycles() + offset,
            expected_cycles,
            "cycle count diverged at {index}: {line}"
        );

        system.step_instruction();
    }
}

/// MMC3 scanline IRQ cadence over many frames of attract mode.
#[test]
#[ignore = "requires SuperMarioBros3.nes in NESMITH_ROM_DIR"]
fn test_mmc3_irq_cadence_smb3() {
    let Some(rom) = rom_path("SuperMarioBros3.nes") else {
        eprintln!("skipping: SuperMarioBros3.nes not found");
        return;
    };
    let data = std::fs::read(rom).unwrap();
    let mut system = System::new();
    system.load_rom(&data).unwrap();
    for _ in 0..180 {
        system.run_frame();
    }
    // The status bar split fires the IRQ every frame; if the counter
    // logic is broken the game hangs in its init loop instead.
    assert!(system.total_cycles() > 29_000 * 180);
}

/// Mapper 225 multicart menu must render.
#[test]
#[ignore = "requires 64-in-1.nes in NESMITH_ROM_DIR"]
fn test_mapper_225_multicart_boot() {
    let Some(rom) = rom_path("64-in-1.nes") else {
        eprintln!("skipping: 64-in-1.nes not found");
        return;
    };
    let data = std::fs::read(rom).unwrap();
    let mut system = System::new();
    system.load_rom(&data).unwrap();
    for _ in 0..10 {
        system.run_frame();
    }
    let first = system.frame_buffer()[0];
    assert!(
        system.frame_buffer().iter().any(|&pixel| pixel != first),
        "menu screen is uniform; mirroring decode is suspect"
    );
}

/// Mapper 253 CHR ROM/RAM switching during attract mode.
#[test]
#[ignore = "requires DragonBallZ_KyoushuSaiyajin.nes in NESMITH_ROM_DIR"]
fn test_mapper_253_attract_mode() {
    let Some(rom) = rom_path("DragonBallZ_KyoushuSaiyajin.nes") else {
        eprintln!("skipping: DragonBallZ_KyoushuSaiyajin.nes not found");
        return;
    };
    let data = std::fs::read(rom).unwrap();
    let mut system = System::new();
    system.load_rom(&data).unwrap();
    for _ in 0..300 {
        system.run_frame();
    }
    // A hard lock or black screen here points at the vlock/CHR RAM path.
    let first = system.frame_buffer()[0];
    assert!(system.frame_buffer().iter().any(|&pixel| pixel != first));
}
