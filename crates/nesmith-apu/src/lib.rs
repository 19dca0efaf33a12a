//! NES 2A03 APU emulation.
//!
//! Two pulse channels, triangle, noise and DMC, paced by the $4017 frame
//! counter, mixed through the hardware's non-linear ladder curves,
//! filtered, soft-clipped and resampled into a fixed-capacity ring at
//! the host's sample rate.
//!
//! The DMC never touches memory itself: the system polls
//! [`Dmc::needs_sample`] through [`Apu`] and feeds bytes back in,
//! applying the CPU fetch stall where it owns the CPU.

mod apu;
mod dmc;
mod envelope;
mod frame_counter;
mod length_counter;
mod mixer;
mod noise;
mod pulse;
mod ring;
mod sweep;
mod triangle;

pub use apu::{Apu, CPU_CLOCK_NTSC, DEFAULT_SAMPLE_RATE};
pub use dmc::Dmc;
pub use envelope::Envelope;
pub use frame_counter::{FrameClocks, FrameCounter};
pub use length_counter::LengthCounter;
pub use mixer::{mix, soft_clip, HighPassFilter, LowPassFilter};
pub use noise::Noise;
pub use pulse::Pulse;
pub use ring::{SampleRing, DEFAULT_CAPACITY};
pub use sweep::{PulseChannel, Sweep};
pub use triangle::Triangle;
