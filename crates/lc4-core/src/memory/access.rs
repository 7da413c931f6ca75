//! Access policy helpers by fixed LC4 region.

use crate::{decode_memory_region, FaultCode, MemoryRegion};

/// Validates that `pc` lies in a code region.
///
/// # Errors
///
/// Returns [`FaultCode::ExecutingDataAsCode`] when `pc` is in a data region.
pub const fn validate_fetch_region(pc: u16) -> Result<(), FaultCode> {
    if decode_memory_region(pc).is_code() {
        Ok(())
    } else {
        Err(FaultCode::ExecutingDataAsCode)
    }
}

/// Validates a load/store effective address.
///
/// Code regions are never legal data targets. OS data additionally requires the
/// privilege bit.
///
/// # Errors
///
/// Returns [`FaultCode::ReadingCodeAsData`] for code addresses and
/// [`FaultCode::PrivilegeViolation`] for OS data touched without privilege.
pub const fn validate_data_access(addr: u16, privileged: bool) -> Result<(), FaultCode> {
    match decode_memory_region(addr) {
        MemoryRegion::UserCode | MemoryRegion::OsCode => Err(FaultCode::ReadingCodeAsData),
        MemoryRegion::OsData if !privileged => Err(FaultCode::PrivilegeViolation),
        MemoryRegion::UserData | MemoryRegion::OsData => Ok(()),
    }
}

/// Validates that OS code only executes with the privilege bit set.
///
/// # Errors
///
/// Returns [`FaultCode::PrivilegeViolation`] when `pc` is in OS space and
/// `privileged` is false.
pub const fn validate_fetch_privilege(pc: u16, privileged: bool) -> Result<(), FaultCode> {
    if !privileged && decode_memory_region(pc).is_privileged() {
        Err(FaultCode::PrivilegeViolation)
    } else {
        Ok(())
    }
}
