//! Shared helpers for building small test cartridges in memory.

/// Build an iNES image from parts.
#[must_use]
pub fn build_ines(prg_banks: u8, chr_banks: u8, mapper: u8, flags6_low: u8, prg: &[u8]) -> Vec<u8> {
    let prg_len = usize::from(prg_banks) * 16 * 1024;
    assert!(prg.len() <= prg_len);

    let mut image = vec![0x4E, 0x45, 0x53, 0x1A];
    image.push(prg_banks);
    image.push(chr_banks);
    image.push(((mapper & 0x0F) << 4) | flags6_low);
    image.push(mapper & 0xF0);
    image.extend_from_slice(&[0; 8]);

    let mut prg_rom = vec![0xEA; prg_len];
    prg_rom[..prg.len()].copy_from_slice(prg);
    // Reset vector -> $8000, NMI vector -> $9000 (an RTI by default).
    prg_rom[prg_len - 4] = 0x00;
    prg_rom[prg_len - 3] = 0x80;
    prg_rom[prg_len - 6] = 0x00;
    prg_rom[prg_len - 5] = 0x90;
    if prg.len() <= 0x1000 {
        prg_rom[0x1000] = 0x40; // RTI
    }
    image.extend_from_slice(&prg_rom);

    // A visible tile pattern in CHR bank 0 so rendering produces pixels.
    let mut chr = vec![0u8; usize::from(chr_banks) * 8 * 1024];
    for byte in chr.iter_mut().take(16) {
        *byte = 0xFF;
    }
    image.extend_from_slice(&chr);
    image
}

/// A NOP-slide NROM cartridge.
#[must_use]
pub fn nop_rom() -> Vec<u8> {
    build_ines(2, 1, 0, 0, &[])
}

/// An NROM cartridge that programs a palette (black backdrop, white for
/// background pixel value 3), enables NMI and background rendering, and
/// spins forever. Tile 0's pattern is solid value 3, so the visible area
/// renders white against the black backdrop.
#[must_use]
pub fn rendering_rom() -> Vec<u8> {
    let program = [
        // $3F00-$3F03 = $0F, $00, $10, $30
        0xA9, 0x3F, 0x8D, 0x06, 0x20, // LDA #$3F; STA $2006
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00; STA $2006
        0xA9, 0x0F, 0x8D, 0x07, 0x20, // LDA #$0F; STA $2007
        0xA9, 0x00, 0x8D, 0x07, 0x20, // LDA #$00; STA $2007
        0xA9, 0x10, 0x8D, 0x07, 0x20, // LDA #$10; STA $2007
        0xA9, 0x30, 0x8D, 0x07, 0x20, // LDA #$30; STA $2007
        // Point the address back at the first nametable.
        0xA9, 0x20, 0x8D, 0x06, 0x20, // LDA #$20; STA $2006
        0xA9, 0x00, 0x8D, 0x06, 0x20, // LDA #$00; STA $2006
        // NMI on, background + left column on.
        0xA9, 0x80, 0x8D, 0x00, 0x20, // LDA #$80; STA $2000
        0xA9, 0x0A, 0x8D, 0x01, 0x20, // LDA #$0A; STA $2001
        0x4C, 0x32, 0x80, // JMP $8032
    ];
    build_ines(2, 1, 0, 0, &program)
}
