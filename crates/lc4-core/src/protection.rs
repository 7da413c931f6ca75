//! Per-cycle privilege and memory-protection gate.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. the `PC` must be in a code region;
//! 2. an `LDR`/`STR` effective address must be in a data region;
//! 3. an `LDR`/`STR` into OS data requires privilege;
//! 4. fetching from OS space requires privilege.

use crate::execute::effective_address;
use crate::{
    validate_data_access, validate_fetch_privilege, validate_fetch_region, ArchitecturalState,
    FaultCode, Instruction,
};

/// Validates the cycle about to execute `instruction` at the current `PC`.
///
/// # Errors
///
/// Returns the first [`FaultCode`] raised by the ordered checks above.
pub fn check_protection(
    arch: &ArchitecturalState,
    instruction: &Instruction,
) -> Result<(), FaultCode> {
    let pc = arch.pc();
    let privileged = arch.privileged();

    validate_fetch_region(pc)?;
    if let Some((base, offset)) = instruction.memory_operand() {
        validate_data_access(effective_address(arch, base, offset), privileged)?;
    }
    validate_fetch_privilege(pc, privileged)
}

#[cfg(test)]
mod tests {
    use super::check_protection;
    use crate::{ArchitecturalState, Decoder, FaultCode, GeneralRegister};
    use proptest::prelude::*;

    fn arch_at(pc: u16, privileged: bool) -> ArchitecturalState {
        let mut arch = ArchitecturalState::default();
        arch.set_pc(pc);
        arch.set_privileged(privileged);
        arch
    }

    #[test]
    fn executing_user_data_faults_first() {
        let arch = arch_at(0x3000, true);
        assert_eq!(
            check_protection(&arch, &Decoder::decode(0x0000)),
            Err(FaultCode::ExecutingDataAsCode)
        );
    }

    #[test]
    fn fetch_region_takes_precedence_over_a_bad_load() {
        // R0 = 0 makes the load target user code, but the PC check fires first.
        let arch = arch_at(0xA000, false);
        assert_eq!(
            check_protection(&arch, &Decoder::decode(0x6200)),
            Err(FaultCode::ExecutingDataAsCode)
        );
    }

    #[test]
    fn load_from_code_region_faults_even_when_privileged() {
        let mut arch = arch_at(0x8200, true);
        arch.set_gpr(GeneralRegister::R1, 0x8100);
        // LDR R2, R1, #0
        assert_eq!(
            check_protection(&arch, &Decoder::decode(0x6440)),
            Err(FaultCode::ReadingCodeAsData)
        );
    }

    #[test]
    fn data_check_precedes_fetch_privilege_check() {
        let mut arch = arch_at(0x8200, false);
        arch.set_gpr(GeneralRegister::R1, 0xA000);
        // STR R2, R1, #0 into OS data from user mode at an OS PC.
        assert_eq!(
            check_protection(&arch, &Decoder::decode(0x7440)),
            Err(FaultCode::PrivilegeViolation)
        );

        arch.set_gpr(GeneralRegister::R1, 0x1000);
        assert_eq!(
            check_protection(&arch, &Decoder::decode(0x7440)),
            Err(FaultCode::ReadingCodeAsData)
        );
    }

    #[test]
    fn os_code_requires_privilege() {
        assert_eq!(
            check_protection(&arch_at(0x8000, false), &Decoder::decode(0x0000)),
            Err(FaultCode::PrivilegeViolation)
        );
        assert_eq!(
            check_protection(&arch_at(0x8000, true), &Decoder::decode(0x0000)),
            Ok(())
        );
        assert_eq!(
            check_protection(&arch_at(0x1FFF, false), &Decoder::decode(0x0000)),
            Ok(())
        );
    }

    #[test]
    fn effective_address_includes_the_signed_offset() {
        let mut arch = arch_at(0x0000, false);
        arch.set_gpr(GeneralRegister::R1, 0x2000);
        // LDR R2, R1, #-1 reaches 0x1FFF.
        assert_eq!(
            check_protection(&arch, &Decoder::decode(0x647F)),
            Err(FaultCode::ReadingCodeAsData)
        );
        // LDR R2, R1, #1 stays in user data.
        assert_eq!(check_protection(&arch, &Decoder::decode(0x6441)), Ok(()));
    }

    proptest! {
        #[test]
        fn non_memory_instructions_only_see_pc_rules(
            pc in any::<u16>(),
            word in any::<u16>(),
            privileged in any::<bool>(),
        ) {
            let instruction = Decoder::decode(word);
            prop_assume!(!instruction.accesses_data_memory());
            let arch = arch_at(pc, privileged);
            let expected = if (0x2000..0x8000).contains(&pc) || pc >= 0xA000 {
                Err(FaultCode::ExecutingDataAsCode)
            } else if pc >= 0x8000 && !privileged {
                Err(FaultCode::PrivilegeViolation)
            } else {
                Ok(())
            };
            prop_assert_eq!(check_protection(&arch, &instruction), expected);
        }
    }
}
