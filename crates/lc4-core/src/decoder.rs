//! Instruction decoder for the LC4 ISA.
//!
//! Every 16-bit word decodes to exactly one [`Instruction`]; the three unassigned
//! opcodes decode to [`Instruction::Reserved`]. Sub-operations are nested enums so
//! the execute stage matches exhaustively.

use crate::encoding::{field, primary_opcode, sign_extend, OpcodeClass};
use crate::GeneralRegister;

/// Second ALU operand: a register or a sign-extended immediate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Value of a register.
    Register(GeneralRegister),
    /// Immediate already extended to 16 bits.
    Immediate(i16),
}

/// Arithmetic sub-operations (opcode `0001`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ArithOp {
    Add,
    Mul,
    Sub,
    Div,
}

/// Logical sub-operations (opcode `0101`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum LogicOp {
    And,
    Not,
    Or,
    Xor,
}

/// Comparison signedness (opcode `0010`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareKind {
    /// `CMP` and `CMPI`.
    Signed,
    /// `CMPU` and `CMPIU`.
    Unsigned,
}

/// Shift sub-operations (opcode `1010`, sub-opcodes `00..10`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftOp {
    /// Logical left shift.
    Sll,
    /// Arithmetic right shift.
    Sra,
    /// Logical right shift.
    Srl,
}

/// Branch condition mask from bits 11..9 (`n`, `z`, `p`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchCondition(u8);

impl BranchCondition {
    /// Builds a mask from the low three bits of `bits`.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x7)
    }

    /// Raw `nzp` mask.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns `true` when the current `PSR[2:0]` satisfies the mask.
    #[must_use]
    pub const fn is_satisfied_by(self, nzp: u8) -> bool {
        self.0 & nzp != 0
    }
}

/// A fully decoded LC4 instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// `BR<nzp> IMM9`.
    Branch {
        /// Condition mask.
        condition: BranchCondition,
        /// PC-relative offset.
        offset: i16,
    },
    /// `ADD`, `MUL`, `SUB`, `DIV` and `ADD IMM5`.
    Arith {
        /// Operation.
        op: ArithOp,
        /// Destination.
        rd: GeneralRegister,
        /// First source.
        rs: GeneralRegister,
        /// Second source.
        rhs: Operand,
    },
    /// `CMP`, `CMPU`, `CMPI` and `CMPIU`.
    Compare {
        /// Signed or unsigned comparison.
        kind: CompareKind,
        /// Left-hand register (bits 11..9).
        rs: GeneralRegister,
        /// Right-hand side.
        rhs: Operand,
    },
    /// `JSRR Rs`.
    JsrRegister {
        /// Target register.
        rs: GeneralRegister,
    },
    /// `JSR IMM11`.
    JsrLabel {
        /// Signed 11-bit target field, scaled by 16.
        imm11: i16,
    },
    /// `AND`, `NOT`, `OR`, `XOR` and `AND IMM5`.
    Logic {
        /// Operation.
        op: LogicOp,
        /// Destination.
        rd: GeneralRegister,
        /// First source.
        rs: GeneralRegister,
        /// Second source (unused by `NOT`).
        rhs: Operand,
    },
    /// `LDR Rd, Rs, IMM6`.
    Load {
        /// Destination.
        rd: GeneralRegister,
        /// Base register.
        rs: GeneralRegister,
        /// Signed displacement.
        offset: i16,
    },
    /// `STR Rt, Rs, IMM6`.
    Store {
        /// Value register (bits 11..9).
        rt: GeneralRegister,
        /// Base register.
        rs: GeneralRegister,
        /// Signed displacement.
        offset: i16,
    },
    /// `RTI`.
    Rti,
    /// `CONST Rd, IMM9`.
    Const {
        /// Destination.
        rd: GeneralRegister,
        /// Sign-extended constant.
        value: i16,
    },
    /// `SLL`, `SRA`, `SRL`.
    Shift {
        /// Operation.
        op: ShiftOp,
        /// Destination.
        rd: GeneralRegister,
        /// Source.
        rs: GeneralRegister,
        /// Shift distance (`0..=15`).
        amount: u8,
    },
    /// `MOD Rd, Rs, Rt`.
    Mod {
        /// Destination.
        rd: GeneralRegister,
        /// Dividend.
        rs: GeneralRegister,
        /// Divisor.
        rt: GeneralRegister,
    },
    /// `JMPR Rs`.
    JmpRegister {
        /// Target register.
        rs: GeneralRegister,
    },
    /// `JMP IMM11`.
    JmpLabel {
        /// PC-relative offset.
        offset: i16,
    },
    /// `HICONST Rd, UIMM8`.
    HiConst {
        /// Destination.
        rd: GeneralRegister,
        /// Byte placed into bits 15..8.
        uimm8: u8,
    },
    /// `TRAP UIMM8`.
    Trap {
        /// Vector offset into the OS code page at `0x8000`.
        vector: u8,
    },
    /// Opcodes `0011`, `1011` and `1110`.
    Reserved {
        /// Primary opcode.
        opcode: u8,
    },
}

impl Instruction {
    /// Returns `true` for instructions that compute a data-memory effective address.
    #[must_use]
    pub const fn accesses_data_memory(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Store { .. })
    }

    /// Base register and displacement for `LDR`/`STR`.
    #[must_use]
    pub const fn memory_operand(&self) -> Option<(GeneralRegister, i16)> {
        match *self {
            Self::Load { rs, offset, .. } | Self::Store { rs, offset, .. } => Some((rs, offset)),
            _ => None,
        }
    }
}

/// Instruction decoder for the LC4 ISA.
#[derive(Debug, Clone, Copy)]
pub struct Decoder;

impl Decoder {
    /// Decodes a 16-bit instruction word.
    ///
    /// Decoding is total: bits outside the fields an encoding uses are ignored.
    #[must_use]
    pub fn decode(word: u16) -> Instruction {
        let rd = GeneralRegister::from_u3(field(word, 9, 3));
        let rs = GeneralRegister::from_u3(field(word, 6, 3));
        let rt = GeneralRegister::from_u3(field(word, 0, 3));
        let immediate_form = field(word, 5, 1) == 1;

        match OpcodeClass::of_word(word) {
            OpcodeClass::Branch => Instruction::Branch {
                condition: BranchCondition::from_bits(field(word, 9, 3) as u8),
                offset: sign_extend(field(word, 0, 9), 9),
            },
            OpcodeClass::Arithmetic => {
                let (op, rhs) = if immediate_form {
                    (
                        ArithOp::Add,
                        Operand::Immediate(sign_extend(field(word, 0, 5), 5)),
                    )
                } else {
                    let op = match field(word, 3, 2) {
                        0 => ArithOp::Add,
                        1 => ArithOp::Mul,
                        2 => ArithOp::Sub,
                        _ => ArithOp::Div,
                    };
                    (op, Operand::Register(rt))
                };
                Instruction::Arith { op, rd, rs, rhs }
            }
            OpcodeClass::Compare => {
                let (kind, rhs) = match field(word, 7, 2) {
                    0 => (CompareKind::Signed, Operand::Register(rt)),
                    1 => (CompareKind::Unsigned, Operand::Register(rt)),
                    2 => (
                        CompareKind::Signed,
                        Operand::Immediate(sign_extend(field(word, 0, 7), 7)),
                    ),
                    _ => (
                        CompareKind::Unsigned,
                        Operand::Immediate(field(word, 0, 7) as i16),
                    ),
                };
                Instruction::Compare { kind, rs: rd, rhs }
            }
            OpcodeClass::JumpSubroutine => {
                if field(word, 11, 1) == 0 {
                    Instruction::JsrRegister { rs }
                } else {
                    Instruction::JsrLabel {
                        imm11: sign_extend(field(word, 0, 11), 11),
                    }
                }
            }
            OpcodeClass::Logical => {
                let (op, rhs) = if immediate_form {
                    (
                        LogicOp::And,
                        Operand::Immediate(sign_extend(field(word, 0, 5), 5)),
                    )
                } else {
                    let op = match field(word, 3, 2) {
                        0 => LogicOp::And,
                        1 => LogicOp::Not,
                        2 => LogicOp::Or,
                        _ => LogicOp::Xor,
                    };
                    (op, Operand::Register(rt))
                };
                Instruction::Logic { op, rd, rs, rhs }
            }
            OpcodeClass::Load => Instruction::Load {
                rd,
                rs,
                offset: sign_extend(field(word, 0, 6), 6),
            },
            OpcodeClass::Store => Instruction::Store {
                rt: rd,
                rs,
                offset: sign_extend(field(word, 0, 6), 6),
            },
            OpcodeClass::ReturnFromInterrupt => Instruction::Rti,
            OpcodeClass::Constant => Instruction::Const {
                rd,
                value: sign_extend(field(word, 0, 9), 9),
            },
            OpcodeClass::ShiftModulo => {
                let amount = field(word, 0, 4) as u8;
                match field(word, 4, 2) {
                    0 => Instruction::Shift {
                        op: ShiftOp::Sll,
                        rd,
                        rs,
                        amount,
                    },
                    1 => Instruction::Shift {
                        op: ShiftOp::Sra,
                        rd,
                        rs,
                        amount,
                    },
                    2 => Instruction::Shift {
                        op: ShiftOp::Srl,
                        rd,
                        rs,
                        amount,
                    },
                    _ => Instruction::Mod { rd, rs, rt },
                }
            }
            OpcodeClass::Jump => {
                if field(word, 11, 1) == 0 {
                    Instruction::JmpRegister { rs }
                } else {
                    Instruction::JmpLabel {
                        offset: sign_extend(field(word, 0, 11), 11),
                    }
                }
            }
            OpcodeClass::HighConstant => Instruction::HiConst {
                rd,
                uimm8: field(word, 0, 8) as u8,
            },
            OpcodeClass::Trap => Instruction::Trap {
                vector: field(word, 0, 8) as u8,
            },
            OpcodeClass::Reserved3 | OpcodeClass::ReservedB | OpcodeClass::ReservedE => {
                Instruction::Reserved {
                    opcode: primary_opcode(word),
                }
            }
        }
    }
}
