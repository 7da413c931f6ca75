use crate::ConditionCode;

/// Number of general-purpose registers (`R0..R7`).
pub const GENERAL_REGISTER_COUNT: usize = 8;
/// `PC` after reset.
pub const RESET_PC: u16 = 0x8200;
/// `PSR` after reset: privileged, condition code `Z`.
pub const RESET_PSR: u16 = 0x8002;
/// `PSR` privilege bit (`PSR[15]`).
pub const PSR_PRIVILEGE: u16 = 1 << 15;
/// `PSR` condition-code field (`PSR[2:0]`).
pub const PSR_NZP_MASK: u16 = 0x0007;

/// General-purpose register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum GeneralRegister {
    #[default]
    R0 = 0,
    R1 = 1,
    R2 = 2,
    R3 = 3,
    R4 = 4,
    R5 = 5,
    R6 = 6,
    R7 = 7,
}

impl GeneralRegister {
    /// Ordered list of all general-purpose registers.
    pub const ALL: [Self; GENERAL_REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Returns the array index for this register (`0..=7`).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Decodes the low three bits of `bits` into a register.
    #[must_use]
    pub const fn from_u3(bits: u16) -> Self {
        match bits & 0x7 {
            0 => Self::R0,
            1 => Self::R1,
            2 => Self::R2,
            3 => Self::R3,
            4 => Self::R4,
            5 => Self::R5,
            6 => Self::R6,
            _ => Self::R7,
        }
    }
}

/// Register file, `PC` and `PSR`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchitecturalState {
    gpr: [u16; GENERAL_REGISTER_COUNT],
    pc: u16,
    psr: u16,
}

impl Default for ArchitecturalState {
    fn default() -> Self {
        Self {
            gpr: [0; GENERAL_REGISTER_COUNT],
            pc: RESET_PC,
            psr: RESET_PSR,
        }
    }
}

impl ArchitecturalState {
    /// Reads a general-purpose register.
    #[must_use]
    pub const fn gpr(&self, reg: GeneralRegister) -> u16 {
        self.gpr[reg.index()]
    }

    /// Writes a general-purpose register.
    pub fn set_gpr(&mut self, reg: GeneralRegister, value: u16) {
        self.gpr[reg.index()] = value;
    }

    /// Reads the `PC` register.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Writes the `PC` register.
    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Reads the `PSR` register.
    #[must_use]
    pub const fn psr(&self) -> u16 {
        self.psr
    }

    /// Writes the `PSR` register.
    pub fn set_psr(&mut self, value: u16) {
        self.psr = value;
    }

    /// Returns `true` when `PSR[15]` is set.
    #[must_use]
    pub const fn privileged(&self) -> bool {
        self.psr & PSR_PRIVILEGE != 0
    }

    /// Sets or clears `PSR[15]`.
    pub fn set_privileged(&mut self, enabled: bool) {
        if enabled {
            self.psr |= PSR_PRIVILEGE;
        } else {
            self.psr &= !PSR_PRIVILEGE;
        }
    }

    /// Raw `PSR[2:0]` bits.
    #[must_use]
    pub const fn nzp_bits(&self) -> u8 {
        (self.psr & PSR_NZP_MASK) as u8
    }

    /// Replaces `PSR[2:0]` with `code`.
    pub fn set_condition_code(&mut self, code: ConditionCode) {
        self.psr = (self.psr & !PSR_NZP_MASK) | u16::from(code.bits());
    }
}
