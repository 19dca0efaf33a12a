//! Fixed-capacity sample ring between the APU and the host audio clock.
//!
//! Single writer (the frame loop), single reader (the host). On overrun
//! the oldest samples are dropped; on underrun the available samples are
//! linearly stretched to cover the request so the host never starves.

use log::debug;

/// Default ring capacity in samples.
pub const DEFAULT_CAPACITY: usize = 16 * 1024;

/// SPSC sample ring.
#[derive(Debug, Clone)]
pub struct SampleRing {
    buffer: Vec<f32>,
    read: usize,
    write: usize,
    len: usize,
}

impl SampleRing {
    /// Create a ring with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a ring with a specific capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            read: 0,
            write: 0,
            len: 0,
        }
    }

    /// Number of buffered samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no samples are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one sample, overwriting the oldest on overflow.
    pub fn push(&mut self, sample: f32) {
        if self.len == self.buffer.len() {
            // Producer lapped the consumer; advance past the oldest.
            self.read = (self.read + 1) % self.buffer.len();
            self.len -= 1;
        }
        self.buffer[self.write] = sample;
        self.write = (self.write + 1) % self.buffer.len();
        self.len += 1;
    }

    /// Fill `out` from the ring; returns the number of samples written.
    ///
    /// With enough data this is a plain copy. On underrun, whatever is
    /// buffered is linearly resampled across the whole request.
    pub fn drain(&mut self, out: &mut [f32]) -> usize {
        if out.is_empty() {
            return 0;
        }
        if self.len >= out.len() {
            for slot in out.iter_mut() {
                *slot = self.pop();
            }
            return out.len();
        }

        let available = self.len;
        if available == 0 {
            return 0;
        }
        debug!("audio underrun: stretching {available} samples over {}", out.len());

        let mut pending: Vec<f32> = Vec::with_capacity(available);
        for _ in 0..available {
            pending.push(self.pop());
        }

        let last = available - 1;
        let out_len = out.len();
        for (i, slot) in out.iter_mut().enumerate() {
            let pos = if out_len == 1 {
                0.0
            } else {
                i as f32 * last as f32 / (out_len - 1) as f32
            };
            let base = pos.floor() as usize;
            let frac = pos - pos.floor();
            let a = pending[base.min(last)];
            let b = pending[(base + 1).min(last)];
            *slot = a + (b - a) * frac;
        }
        out.len()
    }

    /// Drop all buffered samples.
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
        self.len = 0;
    }

    fn pop(&mut self) -> f32 {
        let sample = self.buffer[self.read];
        self.read = (self.read + 1) % self.buffer.len();
        self.len -= 1;
        sample
    }
}

impl Default for SampleRing {
    fn default() -> Self {
        Self::new()
    }
}
