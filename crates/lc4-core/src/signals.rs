//! Per-cycle datapath control signals.

use crate::{ConditionCode, GeneralRegister};

/// Snapshot of the datapath control signals for one executed instruction.
///
/// Every handler builds a complete value; nothing carries over between cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ControlSignals {
    /// Register presented on the first read port.
    pub rs_mux: GeneralRegister,
    /// Register presented on the second read port.
    pub rt_mux: GeneralRegister,
    /// Register selected on the write port.
    pub rd_mux: GeneralRegister,
    /// Register-file write enable.
    pub reg_file_we: bool,
    /// Value driven into the register file.
    pub reg_input_val: u16,
    /// Condition code written to `PSR[2:0]`, if any.
    pub nzp: Option<ConditionCode>,
    /// Data-memory write enable.
    pub data_we: bool,
    /// Data-memory address touched by `LDR`/`STR`.
    pub dmem_addr: u16,
    /// Value read or written by `LDR`/`STR`.
    pub dmem_value: u16,
}

impl ControlSignals {
    /// `NZP_WE` as reported in the trace.
    #[must_use]
    pub const fn nzp_we(&self) -> bool {
        self.nzp.is_some()
    }

    /// `NZPVal` as reported in the trace (`0` when not written).
    #[must_use]
    pub const fn nzp_val(&self) -> u8 {
        match self.nzp {
            Some(code) => code.bits(),
            None => 0,
        }
    }

    /// Register index reported in the trace (`0` when no register is written).
    #[must_use]
    pub const fn reported_rd(&self) -> usize {
        if self.reg_file_we {
            self.rd_mux.index()
        } else {
            0
        }
    }

    /// Register value reported in the trace (`0` when no register is written).
    #[must_use]
    pub const fn reported_reg_value(&self) -> u16 {
        if self.reg_file_we {
            self.reg_input_val
        } else {
            0
        }
    }
}
