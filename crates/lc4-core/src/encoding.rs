//! Opcode classes, instruction field extraction and sign extension.

/// Instruction classes selected by the primary opcode (bits 15..12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum OpcodeClass {
    Branch = 0x0,
    Arithmetic = 0x1,
    Compare = 0x2,
    Reserved3 = 0x3,
    JumpSubroutine = 0x4,
    Logical = 0x5,
    Load = 0x6,
    Store = 0x7,
    ReturnFromInterrupt = 0x8,
    Constant = 0x9,
    ShiftModulo = 0xA,
    ReservedB = 0xB,
    Jump = 0xC,
    HighConstant = 0xD,
    ReservedE = 0xE,
    Trap = 0xF,
}

impl OpcodeClass {
    /// Converts the low nibble of `op` into its class.
    #[must_use]
    pub const fn from_u4(op: u8) -> Self {
        match op & 0xF {
            0x0 => Self::Branch,
            0x1 => Self::Arithmetic,
            0x2 => Self::Compare,
            0x3 => Self::Reserved3,
            0x4 => Self::JumpSubroutine,
            0x5 => Self::Logical,
            0x6 => Self::Load,
            0x7 => Self::Store,
            0x8 => Self::ReturnFromInterrupt,
            0x9 => Self::Constant,
            0xA => Self::ShiftModulo,
            0xB => Self::ReservedB,
            0xC => Self::Jump,
            0xD => Self::HighConstant,
            0xE => Self::ReservedE,
            _ => Self::Trap,
        }
    }

    /// Classifies a full instruction word.
    #[must_use]
    pub const fn of_word(word: u16) -> Self {
        Self::from_u4(primary_opcode(word))
    }
}

/// Extracts the primary opcode (bits 15..12).
#[must_use]
pub const fn primary_opcode(word: u16) -> u8 {
    (word >> 12) as u8
}

/// Extracts `len` bits starting at bit `lo`.
#[must_use]
pub const fn field(word: u16, lo: u32, len: u32) -> u16 {
    (word >> lo) & ((1 << len) - 1)
}

/// Sign-extends the low `bits` bits of `value` to a signed 16-bit integer.
///
/// Bit `bits - 1` is the sign. `bits` of 16 or more returns `value` reinterpreted.
#[must_use]
pub const fn sign_extend(value: u16, bits: u32) -> i16 {
    if bits == 0 {
        return 0;
    }
    if bits >= 16 {
        return value as i16;
    }
    let shift = 16 - bits;
    ((value << shift) as i16) >> shift
}

#[cfg(test)]
mod tests {
    use super::{field, primary_opcode, sign_extend, OpcodeClass};

    #[test]
    fn sign_extension_reference_values() {
        assert_eq!(sign_extend(0x1F, 5), -1);
        assert_eq!(sign_extend(0x0F, 5), 15);
        assert_eq!(sign_extend(0, 16), 0);
        assert_eq!(sign_extend(0x100, 9), -256);
        assert_eq!(sign_extend(0x0FF, 9), 255);
        assert_eq!(sign_extend(0x20, 6), -32);
        assert_eq!(sign_extend(0x8000, 16), i16::MIN);
    }

    #[test]
    fn sign_extension_ignores_bits_above_width() {
        assert_eq!(sign_extend(0xFFE1, 5), 1);
        assert_eq!(sign_extend(0x1234 | 0x3F, 6), -1);
    }

    #[test]
    fn every_nibble_maps_to_a_class() {
        for op in 0u8..=0xF {
            assert_eq!(OpcodeClass::from_u4(op) as u8, op);
        }
    }

    #[test]
    fn field_extraction() {
        let word = 0b0110_101_011_111110;
        assert_eq!(primary_opcode(word), 0x6);
        assert_eq!(field(word, 9, 3), 0b101);
        assert_eq!(field(word, 6, 3), 0b011);
        assert_eq!(field(word, 0, 6), 0b11_1110);
        assert_eq!(OpcodeClass::of_word(word), OpcodeClass::Load);
    }
}
