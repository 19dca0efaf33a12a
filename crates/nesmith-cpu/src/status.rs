//! CPU status register (P) flags.
//!
//! ```text
//! 7  6  5  4  3  2  1  0
//! N  V  U  B  D  I  Z  C
//! │  │  │  │  │  │  │  └─ Carry
//! │  │  │  │  │  │  └──── Zero
//! │  │  │  │  │  └─────── Interrupt Disable
//! │  │  │  │  └────────── Decimal Mode (ignored by the NES ALU)
//! │  │  │  └───────────── Break (1 from PHP/BRK, 0 from IRQ/NMI)
//! │  │  └──────────────── Unused (reads as 1)
//! │  └─────────────────── Overflow
//! └────────────────────── Negative
//! ```

use bitflags::bitflags;

bitflags! {
    /// CPU status register flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        /// Carry.
        const C = 1 << 0;
        /// Zero.
        const Z = 1 << 1;
        /// Interrupt disable (IRQ only; NMI is unaffected).
        const I = 1 << 2;
        /// Decimal mode. The 2A03 has no BCD unit, so the ALU ignores it,
        /// but the bit itself is still settable and visible.
        const D = 1 << 3;
        /// Break. Only meaningful in pushed copies of the register.
        const B = 1 << 4;
        /// Unused; hard-wired to 1.
        const U = 1 << 5;
        /// Overflow.
        const V = 1 << 6;
        /// Negative.
        const N = 1 << 7;
    }
}

impl Status {
    /// Register value after reset: I and U set ($24).
    pub const RESET: Self = Self::I.union(Self::U);

    /// Set Z and N from a result byte.
    #[inline]
    pub fn set_zn(&mut self, value: u8) {
        self.set(Self::Z, value == 0);
        self.set(Self::N, value & 0x80 != 0);
    }

    /// The byte pushed to the stack. U is always 1; B depends on whether
    /// the push came from an instruction (PHP/BRK) or an interrupt.
    #[inline]
    #[must_use]
    pub const fn to_stack_byte(self, from_instruction: bool) -> u8 {
        let mut value = self.bits() | Self::U.bits();
        if from_instruction {
            value |= Self::B.bits();
        }
        value
    }

    /// Rebuild the register from a stack byte: B cleared, U forced on.
    #[inline]
    #[must_use]
    pub fn from_stack_byte(value: u8) -> Self {
        Self::from_bits_truncate((value & !Self::B.bits()) | Self::U.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_value() {
        assert_eq!(Status::RESET.bits(), 0x24);
    }

    #[test]
    fn test_set_zn() {
        let mut status = Status::empty();
        status.set_zn(0);
        assert!(status.contains(Status::Z));
        assert!(!status.contains(Status::N));

        status.set_zn(0x80);
        assert!(!status.contains(Status::Z));
        assert!(status.contains(Status::N));

        status.set_zn(0x42);
        assert!(!status.contains(Status::Z));
        assert!(!status.contains(Status::N));
    }

    #[test]
    fn test_stack_byte_b_flag() {
        let status = Status::C | Status::Z;
        assert_eq!(status.to_stack_byte(true) & 0x30, 0x30);
        assert_eq!(status.to_stack_byte(false) & 0x30, 0x20);
    }

    #[test]
    fn test_from_stack_byte_clears_b_sets_u() {
        let status = Status::from_stack_byte(0xFF);
        assert!(!status.contains(Status::B));
        assert!(status.contains(Status::U));
        assert!(status.contains(Status::N));
        assert!(status.contains(Status::C));
    }
}
