//! Cycle-accurate LC4 simulator core with a bit-exact per-cycle trace.

/// Memory model primitives and fixed region map.
pub mod memory;
pub use memory::{
    decode_memory_region, validate_data_access, validate_fetch_privilege, validate_fetch_region,
    Memory, MemoryRegion, RegionDescriptor, ADDRESS_SPACE_WORDS, FIXED_MEMORY_REGIONS,
    OS_CODE_END, OS_CODE_START, OS_DATA_END, OS_DATA_START, USER_CODE_END, USER_CODE_START,
    USER_DATA_END, USER_DATA_START,
};

/// Register file, status register and the owning machine state.
pub mod state;
pub use state::{
    ArchitecturalState, GeneralRegister, MachineState, GENERAL_REGISTER_COUNT, PSR_NZP_MASK,
    PSR_PRIVILEGE, RESET_PC, RESET_PSR,
};

/// Host-facing configuration, outcomes and trace sink contract.
pub mod api;
pub use api::{RunOutcome, RunStop, SimConfig, StepOutcome, TraceSink, HALT_PC};

/// Opcode classes, field extraction and sign extension.
pub mod encoding;
pub use encoding::{field, primary_opcode, sign_extend, OpcodeClass};

/// Instruction decoder.
pub mod decoder;
pub use decoder::{
    ArithOp, BranchCondition, CompareKind, Decoder, Instruction, LogicOp, Operand, ShiftOp,
};

/// Protection fault taxonomy.
pub mod fault;
pub use fault::FaultCode;

/// Per-cycle privilege and memory-protection gate.
pub mod protection;
pub use protection::check_protection;

/// Per-cycle datapath control signals.
pub mod signals;
pub use signals::ControlSignals;

/// Instruction execution pipeline and run loop.
pub mod execute;
pub use execute::{
    commit_execution, effective_address, execute_instruction, pc_relative, run, step_one,
    ConditionCode, ExecuteState, PrivilegeUpdate,
};

/// Trace records and writer.
pub mod trace;
pub use trace::{CycleRecord, TraceWriter};

/// Object-file parsing and loading.
pub mod loader;
pub use loader::{
    apply_segments, load_object_bytes, load_object_file, parse_object, LoadError, LoadSummary,
    ObjectSegment,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;
