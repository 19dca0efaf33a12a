//! APU frame counter ($4017).
//!
//! A CPU-cycle divider that paces the envelope, sweep and length-counter
//! clocks. The 4-step sequence fires quarter/half/quarter/half events and
//! raises the frame IRQ on the last step unless inhibited; the 5-step
//! sequence adds a silent fifth step, never raises the IRQ, and fires an
//! immediate quarter+half pair when selected.

/// Step boundaries in CPU cycles.
const STEP_1: u32 = 7_457;
const STEP_2: u32 = 14_913;
const STEP_3: u32 = 22_371;
const STEP_4: u32 = 29_829;
const STEP_5: u32 = 37_281;

/// Clocks produced by one frame-counter tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameClocks {
    /// Envelope and triangle linear counter clock.
    pub quarter: bool,
    /// Length counter and sweep clock.
    pub half: bool,
}

/// Frame counter state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCounter {
    /// CPU cycles into the current sequence.
    pub cycle: u32,
    /// 5-step mode ($4017 bit 7).
    pub five_step: bool,
    /// IRQ inhibit ($4017 bit 6).
    pub irq_inhibit: bool,
    /// Frame IRQ line.
    pub irq_flag: bool,
}

impl FrameCounter {
    /// $4017 write.
    ///
    /// Returns the immediate clocks the write generates (5-step mode
    /// clocks both units right away).
    pub fn write(&mut self, value: u8) -> FrameClocks {
        self.five_step = value & 0x80 != 0;
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_flag = false;
        }
        self.cycle = 0;
        if self.five_step {
            FrameClocks {
                quarter: true,
                half: true,
            }
        } else {
            FrameClocks::default()
        }
    }

    /// Advance one CPU cycle.
    pub fn clock(&mut self) -> FrameClocks {
        self.cycle += 1;
        let mut clocks = FrameClocks::default();
        match self.cycle {
            STEP_1 | STEP_3 => clocks.quarter = true,
            STEP_2 => {
                clocks.quarter = true;
                clocks.half = true;
            }
            STEP_4 => {
                if self.five_step {
                    // Step 4 is silent in 5-step mode.
                } else {
                    clocks.quarter = true;
                    clocks.half = true;
                    if !self.irq_inhibit {
                        self.irq_flag = true;
                    }
                    self.cycle = 0;
                }
            }
            STEP_5 => {
                clocks.quarter = true;
                clocks.half = true;
                self.cycle = 0;
            }
            _ => {}
        }
        clocks
    }

    /// Frame IRQ line state.
    #[must_use]
    pub fn irq_pending(&self) -> bool {
        self.irq_flag
    }

    /// $4015 read side effect.
    pub fn clear_irq(&mut self) {
        self.irq_flag = false;
    }
}
