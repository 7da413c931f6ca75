//! Helper functions for instruction execution.

use crate::{ArchitecturalState, GeneralRegister};

/// Computes `R[base] + offset` with 16-bit wraparound.
#[must_use]
pub const fn effective_address(
    arch: &ArchitecturalState,
    base: GeneralRegister,
    offset: i16,
) -> u16 {
    arch.gpr(base).wrapping_add_signed(offset)
}

/// Computes `PC + 1 + offset` with 16-bit wraparound.
#[must_use]
pub const fn pc_relative(pc: u16, offset: i16) -> u16 {
    pc.wrapping_add(1).wrapping_add_signed(offset)
}
