//! APU top level: five channels, the frame counter, mixing and
//! resampling into the host-rate sample ring.

use crate::dmc::Dmc;
use crate::frame_counter::{FrameClocks, FrameCounter};
use crate::mixer::{self, HighPassFilter, LowPassFilter};
use crate::noise::Noise;
use crate::pulse::Pulse;
use crate::ring::SampleRing;
use crate::sweep::PulseChannel;
use crate::triangle::Triangle;

/// NTSC CPU clock rate the APU runs at.
pub const CPU_CLOCK_NTSC: f64 = 1_789_773.0;

/// Default host sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Audio processing unit.
#[derive(Debug, Clone)]
pub struct Apu {
    /// Pulse channel 1.
    pub pulse1: Pulse,
    /// Pulse channel 2.
    pub pulse2: Pulse,
    /// Triangle channel.
    pub triangle: Triangle,
    /// Noise channel.
    pub noise: Noise,
    /// DMC channel.
    pub dmc: Dmc,
    /// Frame counter.
    pub frame_counter: FrameCounter,

    /// CPU cycle parity: pulse/noise/DMC timers tick on odd cycles.
    cycle: u64,

    sample_rate: u32,
    cycles_per_sample: f64,
    sample_accumulator: f64,
    low_pass: LowPassFilter,
    high_pass: HighPassFilter,
    ring: SampleRing,
}

impl Apu {
    /// Create an APU producing samples at the default host rate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pulse1: Pulse::new(PulseChannel::One),
            pulse2: Pulse::new(PulseChannel::Two),
            triangle: Triangle::default(),
            noise: Noise::new(),
            dmc: Dmc::new(),
            frame_counter: FrameCounter::default(),
            cycle: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            cycles_per_sample: CPU_CLOCK_NTSC / f64::from(DEFAULT_SAMPLE_RATE),
            sample_accumulator: 0.0,
            low_pass: LowPassFilter::new(0.9),
            high_pass: HighPassFilter::new(0.996),
            ring: SampleRing::new(),
        }
    }

    /// Reset to power-on state (the host sample rate is kept).
    pub fn reset(&mut self) {
        let rate = self.sample_rate;
        *self = Self::new();
        self.set_sample_rate(rate);
    }

    /// Reconfigure the host sample rate.
    pub fn set_sample_rate(&mut self, rate: u32) {
        self.sample_rate = rate.max(1);
        self.cycles_per_sample = CPU_CLOCK_NTSC / f64::from(self.sample_rate);
        self.sample_accumulator = 0.0;
    }

    /// Current host sample rate.
    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Advance one CPU cycle.
    pub fn clock(&mut self) {
        // The triangle timer runs at CPU rate; the rest at half rate.
        self.triangle.clock_timer();
        if self.cycle % 2 == 1 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
            self.dmc.clock_timer();
        }
        self.cycle = self.cycle.wrapping_add(1);

        let clocks = self.frame_counter.clock();
        self.apply_frame_clocks(clocks);

        // Resample: one output sample per cycles_per_sample CPU cycles.
        self.sample_accumulator += 1.0;
        if self.sample_accumulator >= self.cycles_per_sample {
            self.sample_accumulator -= self.cycles_per_sample;
            let sample = self.mixed_output();
            self.ring.push(sample);
        }
    }

    fn apply_frame_clocks(&mut self, clocks: FrameClocks) {
        if clocks.quarter {
            self.pulse1.clock_envelope();
            self.pulse2.clock_envelope();
            self.triangle.clock_linear();
            self.noise.clock_envelope();
        }
        if clocks.half {
            self.pulse1.clock_length_and_sweep();
            self.pulse2.clock_length_and_sweep();
            self.triangle.clock_length();
            self.noise.clock_length();
        }
    }

    /// The filtered, clipped output sample.
    fn mixed_output(&mut self) -> f32 {
        let raw = mixer::mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );
        let smoothed = self.low_pass.process(raw);
        let centered = self.high_pass.process(smoothed);
        mixer::soft_clip(centered).clamp(-1.0, 1.0)
    }

    /// Drain up to `out.len()` samples; returns the count written.
    pub fn read_samples(&mut self, out: &mut [f32]) -> usize {
        self.ring.drain(out)
    }

    /// Buffered sample count.
    #[must_use]
    pub fn samples_available(&self) -> usize {
        self.ring.len()
    }

    /// $4000-$4017 register write.
    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x4000 => self.pulse1.write_control(value),
            0x4001 => self.pulse1.write_sweep(value),
            0x4002 => self.pulse1.write_timer_lo(value),
            0x4003 => self.pulse1.write_timer_hi(value),

            0x4004 => self.pulse2.write_control(value),
            0x4005 => self.pulse2.write_sweep(value),
            0x4006 => self.pulse2.write_timer_lo(value),
            0x4007 => self.pulse2.write_timer_hi(value),

            0x4008 => self.triangle.write_linear(value),
            0x400A => self.triangle.write_timer_lo(value),
            0x400B => self.triangle.write_timer_hi(value),

            0x400C => self.noise.write_control(value),
            0x400E => self.noise.write_period(value),
            0x400F => self.noise.write_length(value),

            0x4010 => self.dmc.write_control(value),
            0x4011 => self.dmc.write_direct_load(value),
            0x4012 => self.dmc.write_sample_address(value),
            0x4013 => self.dmc.write_sample_length(value),

            0x4015 => {
                self.pulse1.length.set_enabled(value & 0x01 != 0);
                self.pulse2.length.set_enabled(value & 0x02 != 0);
                self.triangle.length.set_enabled(value & 0x04 != 0);
                self.noise.length.set_enabled(value & 0x08 != 0);
                self.dmc.set_enabled(value & 0x10 != 0);
            }

            0x4017 => {
                let clocks = self.frame_counter.write(value);
                self.apply_frame_clocks(clocks);
            }

            _ => {}
        }
    }

    /// $4015 read: channel length status + IRQ lines. Clears the frame
    /// IRQ (the DMC IRQ only clears on write).
    pub fn read_status(&mut self) -> u8 {
        let status = self.peek_status();
        self.frame_counter.clear_irq();
        status
    }

    /// $4015 without side effects.
    #[must_use]
    pub fn peek_status(&self) -> u8 {
        let mut status = 0u8;
        if self.pulse1.active() {
            status |= 0x01;
        }
        if self.pulse2.active() {
            status |= 0x02;
        }
        if self.triangle.active() {
            status |= 0x04;
        }
        if self.noise.active() {
            status |= 0x08;
        }
        if self.dmc.active() {
            status |= 0x10;
        }
        if self.frame_counter.irq_pending() {
            status |= 0x40;
        }
        if self.dmc.irq_pending() {
            status |= 0x80;
        }
        status
    }

    /// Any APU-side IRQ line asserted.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.frame_counter.irq_pending() || self.dmc.irq_pending()
    }

    /// Cycle parity counter (save-state).
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Restore the cycle parity counter (save-state).
    pub fn set_cycle(&mut self, cycle: u64) {
        self.cycle = cycle;
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new()
    }
}
