use thiserror::Error;

/// Protection faults raised by the pre-execution access check.
///
/// The discriminants are the stable status codes reported by a cycle; code `0`
/// (normal completion) and code `4` (normal termination) are not faults and live on
/// [`crate::StepOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(u8)]
pub enum FaultCode {
    /// `PC` points into a data region.
    #[error("attempted to execute data as code")]
    ExecutingDataAsCode = 0x01,
    /// A load or store effective address falls into a code region.
    #[error("attempted to access code as data")]
    ReadingCodeAsData = 0x02,
    /// An OS region was touched while the privilege bit was clear.
    #[error("attempted to access an OS region without privilege")]
    PrivilegeViolation = 0x03,
}

impl FaultCode {
    /// Converts a fault to its stable status code.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}
