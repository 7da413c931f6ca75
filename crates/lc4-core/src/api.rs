//! Host-facing configuration, step/run outcomes and the trace sink contract.

use std::io;

use crate::{CycleRecord, FaultCode};

/// Address whose fetch ends the simulation with [`StepOutcome::Halted`].
pub const HALT_PC: u16 = 0x80FF;

/// Run-loop configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SimConfig {
    /// Stops the run after this many retired instructions. `None` runs to a terminal state.
    pub max_cycles: Option<u64>,
}

impl SimConfig {
    /// Returns a config that stops after `limit` retired instructions.
    #[must_use]
    pub const fn with_max_cycles(limit: u64) -> Self {
        Self {
            max_cycles: Some(limit),
        }
    }
}

/// Output status from one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// An instruction retired and one trace line was emitted.
    Retired,
    /// A reserved opcode was fetched: no state change and no trace line.
    Idle,
    /// `PC` reached [`HALT_PC`].
    Halted,
    /// The protection check rejected the cycle before any state change.
    Fault {
        /// Protection fault raised for this cycle.
        cause: FaultCode,
    },
}

impl StepOutcome {
    /// Per-cycle status code: `0` normal, `1..=3` fault, `4` normal termination.
    #[must_use]
    pub const fn status_code(self) -> u8 {
        match self {
            Self::Retired | Self::Idle => 0,
            Self::Fault { cause } => cause.as_u8(),
            Self::Halted => 4,
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStop {
    /// `PC` reached [`HALT_PC`].
    Halted,
    /// A protection fault was raised.
    Fault(FaultCode),
    /// A reserved opcode was fetched; every later cycle would repeat it.
    Stalled,
    /// [`SimConfig::max_cycles`] was reached.
    CycleLimit,
}

/// Aggregated outcome from running until a stop condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of retired instructions (equal to the number of trace lines).
    pub cycles: u64,
    /// Last step-level status observed before returning.
    pub final_step: StepOutcome,
}

impl RunOutcome {
    /// Classifies the stop condition from the final step.
    #[must_use]
    pub const fn stop(&self) -> RunStop {
        match self.final_step {
            StepOutcome::Retired => RunStop::CycleLimit,
            StepOutcome::Idle => RunStop::Stalled,
            StepOutcome::Halted => RunStop::Halted,
            StepOutcome::Fault { cause } => RunStop::Fault(cause),
        }
    }
}

/// Receives one record per retired instruction, in execution order.
pub trait TraceSink {
    /// Records a retired cycle.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while persisting the record.
    fn on_cycle(&mut self, record: &CycleRecord) -> io::Result<()>;
}

impl TraceSink for Vec<CycleRecord> {
    fn on_cycle(&mut self, record: &CycleRecord) -> io::Result<()> {
        self.push(*record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RunOutcome, RunStop, SimConfig, StepOutcome};
    use crate::FaultCode;

    #[test]
    fn status_codes_match_cycle_contract() {
        assert_eq!(StepOutcome::Retired.status_code(), 0);
        assert_eq!(StepOutcome::Idle.status_code(), 0);
        assert_eq!(
            StepOutcome::Fault {
                cause: FaultCode::ExecutingDataAsCode
            }
            .status_code(),
            1
        );
        assert_eq!(
            StepOutcome::Fault {
                cause: FaultCode::ReadingCodeAsData
            }
            .status_code(),
            2
        );
        assert_eq!(
            StepOutcome::Fault {
                cause: FaultCode::PrivilegeViolation
            }
            .status_code(),
            3
        );
        assert_eq!(StepOutcome::Halted.status_code(), 4);
    }

    #[test]
    fn run_stop_follows_final_step() {
        let outcome = |final_step| RunOutcome {
            cycles: 0,
            final_step,
        };
        assert_eq!(outcome(StepOutcome::Halted).stop(), RunStop::Halted);
        assert_eq!(outcome(StepOutcome::Idle).stop(), RunStop::Stalled);
        assert_eq!(outcome(StepOutcome::Retired).stop(), RunStop::CycleLimit);
        assert_eq!(
            outcome(StepOutcome::Fault {
                cause: FaultCode::PrivilegeViolation
            })
            .stop(),
            RunStop::Fault(FaultCode::PrivilegeViolation)
        );
    }

    #[test]
    fn default_config_is_unbounded() {
        assert_eq!(SimConfig::default().max_cycles, None);
        assert_eq!(SimConfig::with_max_cycles(3).max_cycles, Some(3));
    }
}
