//! Non-linear channel mixing and the analog output stage.
//!
//! The 2A03 mixes its channels through two resistor ladders whose
//! transfer curves are famously non-linear; the formulas below are the
//! standard continuous approximations. The analog stage is modeled as a
//! one-pole low-pass, a one-pole DC-blocking high-pass and a soft
//! clipper.

/// Combine the five channel outputs into one sample in roughly [0, 1].
#[must_use]
pub fn mix(pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
    let pulse_sum = f32::from(pulse1) + f32::from(pulse2);
    let pulse_out = if pulse_sum == 0.0 {
        0.0
    } else {
        95.88 / (8128.0 / pulse_sum + 100.0)
    };

    let tnd_sum =
        f32::from(triangle) / 8227.0 + f32::from(noise) / 12241.0 + f32::from(dmc) / 22638.0;
    let tnd_out = if tnd_sum == 0.0 {
        0.0
    } else {
        159.79 / (1.0 / tnd_sum + 100.0)
    };

    pulse_out + tnd_out
}

/// One-pole low-pass filter.
#[derive(Debug, Clone, Copy)]
pub struct LowPassFilter {
    coefficient: f32,
    state: f32,
}

impl LowPassFilter {
    /// Create with the pole coefficient (0.9 for the NES output stage).
    #[must_use]
    pub fn new(coefficient: f32) -> Self {
        Self {
            coefficient,
            state: 0.0,
        }
    }

    /// Filter one sample.
    pub fn process(&mut self, input: f32) -> f32 {
        self.state += (input - self.state) * (1.0 - self.coefficient);
        self.state
    }

    /// Reset filter memory.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    /// Filter memory (save-state).
    #[must_use]
    pub fn state(&self) -> f32 {
        self.state
    }

    /// Restore filter memory.
    pub fn set_state(&mut self, state: f32) {
        self.state = state;
    }
}

/// One-pole high-pass filter (DC blocker).
#[derive(Debug, Clone, Copy)]
pub struct HighPassFilter {
    coefficient: f32,
    prev_input: f32,
    prev_output: f32,
}

impl HighPassFilter {
    /// Create with the pole coefficient (0.996 removes DC drift).
    #[must_use]
    pub fn new(coefficient: f32) -> Self {
        Self {
            coefficient,
            prev_input: 0.0,
            prev_output: 0.0,
        }
    }

    /// Filter one sample.
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.coefficient * (self.prev_output + input - self.prev_input);
        self.prev_input = input;
        self.prev_output = output;
        output
    }

    /// Reset filter memory.
    pub fn reset(&mut self) {
        self.prev_input = 0.0;
        self.prev_output = 0.0;
    }

    /// Filter memory (save-state).
    #[must_use]
    pub fn state(&self) -> (f32, f32) {
        (self.prev_input, self.prev_output)
    }

    /// Restore filter memory.
    pub fn set_state(&mut self, prev_input: f32, prev_output: f32) {
        self.prev_input = prev_input;
        self.prev_output = prev_output;
    }
}

/// Soft clip: linear below the knee, 5x compression above, then a hard
/// ceiling at full scale.
#[must_use]
pub fn soft_clip(sample: f32) -> f32 {
    const KNEE: f32 = 0.95;
    let magnitude = sample.abs();
    let shaped = if magnitude <= KNEE {
        magnitude
    } else {
        KNEE + (magnitude - KNEE) / 5.0
    };
    (shaped.min(1.0)).copysign(sample)
}
