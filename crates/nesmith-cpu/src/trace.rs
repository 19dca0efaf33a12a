//! Execution tracing in the nestest log format.
//!
//! Produces lines like:
//!
//! ```text
//! C000  4C F5 C5  JMP $C5F5     A:00 X:00 Y:00 P:24 SP:FD CYC:7
//! ```
//!
//! Tracing reads instruction bytes through the bus, so it should only be
//! pointed at addresses without read side effects (PRG ROM and RAM); a
//! trace of code executing out of the PPU register window would perturb
//! the machine it is observing.

use crate::addressing::AddressingMode;
use crate::bus::Bus;
use crate::cpu::Cpu;
use crate::opcodes::{Mnemonic, OPCODE_TABLE};

impl Mnemonic {
    /// The assembler name of this mnemonic.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Adc => "ADC",
            Self::And => "AND",
            Self::Asl => "ASL",
            Self::Bcc => "BCC",
            Self::Bcs => "BCS",
            Self::Beq => "BEQ",
            Self::Bit => "BIT",
            Self::Bmi => "BMI",
            Self::Bne => "BNE",
            Self::Bpl => "BPL",
            Self::Brk => "BRK",
            Self::Bvc => "BVC",
            Self::Bvs => "BVS",
            Self::Clc => "CLC",
            Self::Cld => "CLD",
            Self::Cli => "CLI",
            Self::Clv => "CLV",
            Self::Cmp => "CMP",
            Self::Cpx => "CPX",
            Self::Cpy => "CPY",
            Self::Dec => "DEC",
            Self::Dex => "DEX",
            Self::Dey => "DEY",
            Self::Eor => "EOR",
            Self::Inc => "INC",
            Self::Inx => "INX",
            Self::Iny => "INY",
            Self::Jmp => "JMP",
            Self::Jsr => "JSR",
            Self::Lda => "LDA",
            Self::Ldx => "LDX",
            Self::Ldy => "LDY",
            Self::Lsr => "LSR",
            Self::Nop => "NOP",
            Self::Ora => "ORA",
            Self::Pha => "PHA",
            Self::Php => "PHP",
            Self::Pla => "PLA",
            Self::Plp => "PLP",
            Self::Rol => "ROL",
            Self::Ror => "ROR",
            Self::Rti => "RTI",
            Self::Rts => "RTS",
            Self::Sbc => "SBC",
            Self::Sec => "SEC",
            Self::Sed => "SED",
            Self::Sei => "SEI",
            Self::Sta => "STA",
            Self::Stx => "STX",
            Self::Sty => "STY",
            Self::Tax => "TAX",
            Self::Tay => "TAY",
            Self::Tsx => "TSX",
            Self::Txa => "TXA",
            Self::Txs => "TXS",
            Self::Tya => "TYA",
        }
    }
}

/// Disassemble the instruction at `pc` without executing anything.
///
/// Returns the formatted operand text and the instruction length.
#[must_use]
pub fn disassemble(bus: &mut impl Bus, pc: u16) -> (String, u16) {
    let opcode = bus.read(pc);
    let info = OPCODE_TABLE[usize::from(opcode)];
    let lo = bus.read(pc.wrapping_add(1));
    let hi = bus.read(pc.wrapping_add(2));
    let word = u16::from_le_bytes([lo, hi]);

    let operand = match info.mode {
        AddressingMode::Implied => String::new(),
        AddressingMode::Accumulator => "A".to_string(),
        AddressingMode::Immediate => format!("#${lo:02X}"),
        AddressingMode::ZeroPage => format!("${lo:02X}"),
        AddressingMode::ZeroPageX => format!("${lo:02X},X"),
        AddressingMode::ZeroPageY => format!("${lo:02X},Y"),
        AddressingMode::Relative => {
            let target = pc.wrapping_add(2).wrapping_add((lo as i8) as u16);
            format!("${target:04X}")
        }
        AddressingMode::Absolute => format!("${word:04X}"),
        AddressingMode::AbsoluteX => format!("${word:04X},X"),
        AddressingMode::AbsoluteY => format!("${word:04X},Y"),
        AddressingMode::Indirect => format!("(${word:04X})"),
        AddressingMode::IndexedIndirect => format!("(${lo:02X},X)"),
        AddressingMode::IndirectIndexed => format!("(${lo:02X}),Y"),
    };

    let text = if operand.is_empty() {
        info.mnemonic.name().to_string()
    } else {
        format!("{} {}", info.mnemonic.name(), operand)
    };
    (text, 1 + info.mode.operand_len())
}

/// Format a nestest-style trace line for the instruction at the CPU's
/// current PC.
#[must_use]
pub fn trace_line(cpu: &Cpu, bus: &mut impl Bus) -> String {
    let opcode = bus.read(cpu.pc);
    let info = OPCODE_TABLE[usize::from(opcode)];
    let length = 1 + info.mode.operand_len();

    let mut raw = String::new();
    for offset in 0..3 {
        if offset < length {
            let byte = bus.read(cpu.pc.wrapping_add(offset));
            raw.push_str(&format!("{byte:02X} "));
        } else {
            raw.push_str("   ");
        }
    }

    let (text, _) = disassemble(bus, cpu.pc);
    format!(
        "{:04X}  {} {:<12} A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
        cpu.pc,
        raw,
        text,
        cpu.a,
        cpu.x,
        cpu.y,
        cpu.status.bits(),
        cpu.sp,
        cpu.total_cycles(),
    )
}
