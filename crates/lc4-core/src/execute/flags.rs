//! Condition-code (`NZP`) derivation.

/// Sign of the most recent result-producing instruction, as stored in `PSR[2:0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConditionCode {
    /// Result greater than zero.
    Positive = 1,
    /// Result equal to zero.
    Zero = 2,
    /// Result less than zero.
    Negative = 4,
}

impl ConditionCode {
    /// Classifies a 16-bit result interpreted as two's complement.
    #[must_use]
    pub const fn from_result(value: u16) -> Self {
        Self::from_wide(value as i16 as i32)
    }

    /// Classifies a widened comparison difference.
    #[must_use]
    pub const fn from_wide(value: i32) -> Self {
        if value > 0 {
            Self::Positive
        } else if value == 0 {
            Self::Zero
        } else {
            Self::Negative
        }
    }

    /// Encoded value written to `PSR[2:0]` and reported in the trace.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}
