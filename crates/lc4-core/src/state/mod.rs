//! Machine state: register file, status register and memory image.

/// Register file types and storage model.
pub mod registers;

pub use registers::{
    ArchitecturalState, GeneralRegister, GENERAL_REGISTER_COUNT, PSR_NZP_MASK, PSR_PRIVILEGE,
    RESET_PC, RESET_PSR,
};

use crate::Memory;

/// Complete simulator state owned by the run loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineState {
    /// Registers, `PC` and `PSR`.
    pub arch: ArchitecturalState,
    /// 64K-word memory image.
    pub memory: Memory,
}

impl MachineState {
    /// Creates a state in the reset configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores reset values: `PC = 0x8200`, `PSR = 0x8002`, registers and memory zeroed.
    pub fn reset(&mut self) {
        self.arch = ArchitecturalState::default();
        self.memory.clear();
    }

    /// Returns the word at the current `PC`.
    #[must_use]
    pub fn fetch(&self) -> u16 {
        self.memory.read(self.arch.pc())
    }
}
