//! Versioned whole-machine save states.
//!
//! # Format
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │ Header                              │
//! │  - Magic: "NSMS" (4 bytes)          │
//! │  - Version: u32 (currently 1)       │
//! ├─────────────────────────────────────┤
//! │ CPU, RAM, controllers, DMA latch    │
//! │ PPU (registers, VRAM, OAM, timing)  │
//! │ APU (all five channels + sequencer) │
//! │ Cartridge (RAM contents + mapper)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! Everything after the header is fixed-order little-endian fields; the
//! version number is the only format guard. Loading a blob whose version
//! differs fails with [`SaveStateError::VersionMismatch`], any other
//! shape problem with [`SaveStateError::Corrupt`]. The audio ring and
//! output filters are deliberately not captured: they are host-facing
//! transients with no effect on emulation.

mod codec;
mod error;

pub use codec::{StateReader, StateWriter};
pub use error::SaveStateError;

use nesmith_apu::{Dmc, Envelope, LengthCounter, Noise, Pulse, Sweep, Triangle};
use nesmith_cpu::{Cpu, Status};
use nesmith_mappers::Mirroring;
use nesmith_ppu::PpuState;

use crate::bus::SystemBus;

/// Save state format version.
pub const SAVE_STATE_VERSION: u32 = 1;

/// Magic bytes at the start of every save state.
pub const SAVE_STATE_MAGIC: &[u8; 4] = b"NSMS";

/// Serialize the complete machine into a blob.
#[must_use]
pub fn serialize(cpu: &Cpu, bus: &SystemBus) -> Vec<u8> {
    let mut w = StateWriter::new();
    w.bytes(SAVE_STATE_MAGIC);
    w.u32(SAVE_STATE_VERSION);

    // CPU.
    w.u8(cpu.a);
    w.u8(cpu.x);
    w.u8(cpu.y);
    w.u8(cpu.sp);
    w.u16(cpu.pc);
    w.u8(cpu.status.bits());
    w.u16(cpu.cycles_remaining());
    w.u64(cpu.total_cycles());

    // Bus-level state.
    w.bytes(&bus.ram);
    w.u8(bus.open_bus);
    w.bool(bus.oam_dma_page.is_some());
    w.u8(bus.oam_dma_page.unwrap_or(0));
    for controller in &bus.controllers {
        let (buttons, shift, strobe) = controller.raw_state();
        w.u8(buttons);
        w.u8(shift);
        w.bool(strobe);
    }

    write_ppu(&mut w, &bus.ppu.snapshot());
    write_apu(&mut w, bus);
    write_cart(&mut w, bus);

    w.into_bytes()
}

/// Restore a blob produced by [`serialize`] into the machine.
pub fn deserialize(data: &[u8], cpu: &mut Cpu, bus: &mut SystemBus) -> Result<(), SaveStateError> {
    let mut r = StateReader::new(data);

    let mut magic = [0u8; 4];
    r.bytes_into(&mut magic)?;
    if &magic != SAVE_STATE_MAGIC {
        return Err(SaveStateError::Corrupt);
    }
    let version = r.u32()?;
    if version != SAVE_STATE_VERSION {
        return Err(SaveStateError::VersionMismatch {
            found: version,
            expected: SAVE_STATE_VERSION,
        });
    }

    // CPU.
    cpu.a = r.u8()?;
    cpu.x = r.u8()?;
    cpu.y = r.u8()?;
    cpu.sp = r.u8()?;
    cpu.pc = r.u16()?;
    cpu.status = Status::from_bits_truncate(r.u8()?);
    let cycles_remaining = r.u16()?;
    let total_cycles = r.u64()?;
    cpu.restore_timing(cycles_remaining, total_cycles);

    // Bus-level state.
    r.bytes_into(&mut bus.ram)?;
    bus.open_bus = r.u8()?;
    let dma_pending = r.bool()?;
    let dma_page = r.u8()?;
    bus.oam_dma_page = dma_pending.then_some(dma_page);
    for controller in &mut bus.controllers {
        let buttons = r.u8()?;
        let shift = r.u8()?;
        let strobe = r.bool()?;
        controller.restore(buttons, shift, strobe);
    }

    read_ppu(&mut r, bus)?;
    read_apu(&mut r, bus)?;
    read_cart(&mut r, bus)?;

    r.finish()
}

// ---- PPU ----

fn write_ppu(w: &mut StateWriter, state: &PpuState) {
    w.u8(state.ctrl);
    w.u8(state.mask);
    w.u8(state.status);
    w.u16(state.v);
    w.u16(state.t);
    w.u8(state.fine_x);
    w.bool(state.write_latch);
    w.bytes(&state.nametable_ram);
    w.bytes(&state.palette_ram);
    w.bytes(&state.oam);
    w.u8(state.oam_addr);

    w.u8(state.background.nt_byte);
    w.u8(state.background.at_bits);
    w.u8(state.background.pattern_lo);
    w.u8(state.background.pattern_hi);
    let (pattern_lo, pattern_hi, attr_lo, attr_hi, latch_lo, latch_hi) =
        state.background.raw_shifters();
    w.u16(pattern_lo);
    w.u16(pattern_hi);
    w.u8(attr_lo);
    w.u8(attr_hi);
    w.bool(latch_lo);
    w.bool(latch_hi);

    w.i16(state.scanline);
    w.u16(state.dot);
    w.bool(state.odd_frame);
    w.bool(state.nmi_pending);
    w.u8(state.data_buffer);
    w.u8(state.io_latch);
}

fn read_ppu(r: &mut StateReader<'_>, bus: &mut SystemBus) -> Result<(), SaveStateError> {
    let mut state = bus.ppu.snapshot();
    state.ctrl = r.u8()?;
    state.mask = r.u8()?;
    state.status = r.u8()?;
    state.v = r.u16()?;
    state.t = r.u16()?;
    state.fine_x = r.u8()?;
    state.write_latch = r.bool()?;
    r.bytes_into(&mut state.nametable_ram)?;
    r.bytes_into(&mut state.palette_ram)?;
    r.bytes_into(&mut state.oam)?;
    state.oam_addr = r.u8()?;

    state.background.nt_byte = r.u8()?;
    state.background.at_bits = r.u8()?;
    state.background.pattern_lo = r.u8()?;
    state.background.pattern_hi = r.u8()?;
    let pattern_lo = r.u16()?;
    let pattern_hi = r.u16()?;
    let attr_lo = r.u8()?;
    let attr_hi = r.u8()?;
    let latch_lo = r.bool()?;
    let latch_hi = r.bool()?;
    state
        .background
        .restore_shifters(pattern_lo, pattern_hi, attr_lo, attr_hi, latch_lo, latch_hi);

    state.scanline = r.i16()?;
    state.dot = r.u16()?;
    state.odd_frame = r.bool()?;
    state.nmi_pending = r.bool()?;
    state.data_buffer = r.u8()?;
    state.io_latch = r.u8()?;

    bus.ppu.restore(&state);
    Ok(())
}

// ---- APU ----

fn write_envelope(w: &mut StateWriter, env: &Envelope) {
    w.bool(env.start);
    w.u8(env.volume);
    w.bool(env.constant);
    w.bool(env.looping);
    w.u8(env.divider);
    w.u8(env.decay);
}

fn read_envelope(r: &mut StateReader<'_>, env: &mut Envelope) -> Result<(), SaveStateError> {
    env.start = r.bool()?;
    env.volume = r.u8()?;
    env.constant = r.bool()?;
    env.looping = r.bool()?;
    env.divider = r.u8()?;
    env.decay = r.u8()?;
    Ok(())
}

fn write_length(w: &mut StateWriter, length: &LengthCounter) {
    w.u8(length.counter);
    w.bool(length.halt);
    w.bool(length.enabled);
}

fn read_length(r: &mut StateReader<'_>, length: &mut LengthCounter) -> Result<(), SaveStateError> {
    length.counter = r.u8()?;
    length.halt = r.bool()?;
    length.enabled = r.bool()?;
    Ok(())
}

fn write_sweep(w: &mut StateWriter, sweep: &Sweep) {
    w.bool(sweep.enabled);
    w.u8(sweep.period);
    w.bool(sweep.negate);
    w.u8(sweep.shift);
    w.u8(sweep.divider);
    w.bool(sweep.reload);
}

fn read_sweep(r: &mut StateReader<'_>, sweep: &mut Sweep) -> Result<(), SaveStateError> {
    sweep.enabled = r.bool()?;
    sweep.period = r.u8()?;
    sweep.negate = r.bool()?;
    sweep.shift = r.u8()?;
    sweep.divider = r.u8()?;
    sweep.reload = r.bool()?;
    Ok(())
}

fn write_pulse(w: &mut StateWriter, pulse: &Pulse) {
    w.u8(pulse.duty);
    w.u8(pulse.sequence_step);
    w.u16(pulse.timer_period);
    w.u16(pulse.timer);
    write_envelope(w, &pulse.envelope);
    write_sweep(w, &pulse.sweep);
    write_length(w, &pulse.length);
}

fn read_pulse(r: &mut StateReader<'_>, pulse: &mut Pulse) -> Result<(), SaveStateError> {
    pulse.duty = r.u8()?;
    pulse.sequence_step = r.u8()?;
    pulse.timer_period = r.u16()?;
    pulse.timer = r.u16()?;
    read_envelope(r, &mut pulse.envelope)?;
    read_sweep(r, &mut pulse.sweep)?;
    read_length(r, &mut pulse.length)
}

fn write_triangle(w: &mut StateWriter, tri: &Triangle) {
    w.u16(tri.timer_period);
    w.u16(tri.timer);
    w.u8(tri.sequence_step);
    w.u8(tri.linear_counter);
    w.u8(tri.linear_reload_value);
    w.bool(tri.linear_reload);
    w.bool(tri.control);
    write_length(w, &tri.length);
}

fn read_triangle(r: &mut StateReader<'_>, tri: &mut Triangle) -> Result<(), SaveStateError> {
    tri.timer_period = r.u16()?;
    tri.timer = r.u16()?;
    tri.sequence_step = r.u8()?;
    tri.linear_counter = r.u8()?;
    tri.linear_reload_value = r.u8()?;
    tri.linear_reload = r.bool()?;
    tri.control = r.bool()?;
    read_length(r, &mut tri.length)
}

fn write_noise(w: &mut StateWriter, noise: &Noise) {
    w.u16(noise.lfsr);
    w.bool(noise.short_mode);
    w.u16(noise.timer_period);
    w.u16(noise.timer);
    write_envelope(w, &noise.envelope);
    write_length(w, &noise.length);
}

fn read_noise(r: &mut StateReader<'_>, noise: &mut Noise) -> Result<(), SaveStateError> {
    noise.lfsr = r.u16()?;
    noise.short_mode = r.bool()?;
    noise.timer_period = r.u16()?;
    noise.timer = r.u16()?;
    read_envelope(r, &mut noise.envelope)?;
    read_length(r, &mut noise.length)
}

fn write_dmc(w: &mut StateWriter, dmc: &Dmc) {
    w.bool(dmc.irq_enabled);
    w.bool(dmc.looping);
    w.u16(dmc.timer_period);
    w.u16(dmc.timer);
    w.u8(dmc.output_level);
    w.u16(dmc.sample_address);
    w.u16(dmc.sample_length);
    w.u16(dmc.current_address);
    w.u16(dmc.bytes_remaining);
    w.u8(dmc.shift_register);
    w.u8(dmc.bits_remaining);
    w.bool(dmc.silence);
    w.bool(dmc.sample_buffer.is_some());
    w.u8(dmc.sample_buffer.unwrap_or(0));
    w.bool(dmc.irq_flag);
}

fn read_dmc(r: &mut StateReader<'_>, dmc: &mut Dmc) -> Result<(), SaveStateError> {
    dmc.irq_enabled = r.bool()?;
    dmc.looping = r.bool()?;
    dmc.timer_period = r.u16()?;
    dmc.timer = r.u16()?;
    dmc.output_level = r.u8()?;
    dmc.sample_address = r.u16()?;
    dmc.sample_length = r.u16()?;
    dmc.current_address = r.u16()?;
    dmc.bytes_remaining = r.u16()?;
    dmc.shift_register = r.u8()?;
    dmc.bits_remaining = r.u8()?;
    dmc.silence = r.bool()?;
    let buffered = r.bool()?;
    let buffer = r.u8()?;
    dmc.sample_buffer = buffered.then_some(buffer);
    dmc.irq_flag = r.bool()?;
    Ok(())
}

fn write_apu(w: &mut StateWriter, bus: &SystemBus) {
    write_pulse(w, &bus.apu.pulse1);
    write_pulse(w, &bus.apu.pulse2);
    write_triangle(w, &bus.apu.triangle);
    write_noise(w, &bus.apu.noise);
    write_dmc(w, &bus.apu.dmc);
    w.u32(bus.apu.frame_counter.cycle);
    w.bool(bus.apu.frame_counter.five_step);
    w.bool(bus.apu.frame_counter.irq_inhibit);
    w.bool(bus.apu.frame_counter.irq_flag);
    w.u64(bus.apu.cycle());
}

fn read_apu(r: &mut StateReader<'_>, bus: &mut SystemBus) -> Result<(), SaveStateError> {
    read_pulse(r, &mut bus.apu.pulse1)?;
    read_pulse(r, &mut bus.apu.pulse2)?;
    read_triangle(r, &mut bus.apu.triangle)?;
    read_noise(r, &mut bus.apu.noise)?;
    read_dmc(r, &mut bus.apu.dmc)?;
    bus.apu.frame_counter.cycle = r.u32()?;
    bus.apu.frame_counter.five_step = r.bool()?;
    bus.apu.frame_counter.irq_inhibit = r.bool()?;
    bus.apu.frame_counter.irq_flag = r.bool()?;
    let cycle = r.u64()?;
    bus.apu.set_cycle(cycle);
    Ok(())
}

// ---- Cartridge ----

fn mirroring_to_u8(mode: Mirroring) -> u8 {
    match mode {
        Mirroring::Horizontal => 0,
        Mirroring::Vertical => 1,
        Mirroring::SingleScreenLow => 2,
        Mirroring::SingleScreenHigh => 3,
        Mirroring::FourScreen => 4,
    }
}

fn mirroring_from_u8(value: u8) -> Result<Mirroring, SaveStateError> {
    match value {
        0 => Ok(Mirroring::Horizontal),
        1 => Ok(Mirroring::Vertical),
        2 => Ok(Mirroring::SingleScreenLow),
        3 => Ok(Mirroring::SingleScreenHigh),
        4 => Ok(Mirroring::FourScreen),
        _ => Err(SaveStateError::Corrupt),
    }
}

fn write_cart(w: &mut StateWriter, bus: &SystemBus) {
    let Some(cart) = &bus.cart else {
        w.bool(false);
        return;
    };
    w.bool(true);
    w.u8(mirroring_to_u8(cart.mirroring()));
    w.chunk(cart.prg_ram());
    w.chunk(cart.chr_ram());
    let mut mapper_state = Vec::new();
    cart.write_mapper_state(&mut mapper_state);
    w.chunk(&mapper_state);
}

fn read_cart(r: &mut StateReader<'_>, bus: &mut SystemBus) -> Result<(), SaveStateError> {
    let present = r.bool()?;
    let Some(cart) = &mut bus.cart else {
        // States don't carry ROM contents; restoring cartridge state
        // into an empty system cannot work.
        return if present {
            Err(SaveStateError::Corrupt)
        } else {
            Ok(())
        };
    };
    if !present {
        return Err(SaveStateError::Corrupt);
    }

    cart.set_mirroring(mirroring_from_u8(r.u8()?)?);

    let prg_ram = r.chunk()?;
    if prg_ram.len() != cart.prg_ram().len() {
        return Err(SaveStateError::Corrupt);
    }
    cart.prg_ram_mut().copy_from_slice(prg_ram);

    let chr_ram = r.chunk()?;
    if chr_ram.len() != cart.chr_ram().len() {
        return Err(SaveStateError::Corrupt);
    }
    cart.chr_ram_mut().copy_from_slice(chr_ram);

    let mut mapper_state = r.chunk()?;
    match cart.read_mapper_state(&mut mapper_state) {
        Some(()) if mapper_state.is_empty() => Ok(()),
        _ => Err(SaveStateError::Corrupt),
    }
}
