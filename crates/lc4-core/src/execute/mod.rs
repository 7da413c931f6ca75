//! Instruction execution pipeline for the LC4 ISA.
//!
//! One cycle follows a fixed sequence:
//! 1. Halt check on the `PC`
//! 2. Fetch and decode
//! 3. Protection check
//! 4. Compute the control signals and next `PC` from the current state
//! 5. Emit the trace record
//! 6. Commit register, memory, `NZP`, privilege and `PC` updates
//!
//! Faulting cycles stop before step 4 and leave the state untouched.

#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]

mod flags;
mod helpers;

pub use flags::ConditionCode;
pub use helpers::{effective_address, pc_relative};

use std::io;

use tracing::{debug, info, trace, warn};

use crate::decoder::{ArithOp, CompareKind, LogicOp, Operand, ShiftOp};
use crate::{
    check_protection, ControlSignals, CycleRecord, Decoder, GeneralRegister, Instruction,
    MachineState, RunOutcome, SimConfig, StepOutcome, TraceSink, HALT_PC,
};

/// Privilege bit change requested by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrivilegeUpdate {
    /// Leave `PSR[15]` as is.
    #[default]
    Keep,
    /// Set `PSR[15]` (`TRAP`).
    Enter,
    /// Clear `PSR[15]` (`RTI`).
    Leave,
}

/// Side effects computed for one instruction, applied by [`commit_execution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteState {
    /// Datapath signals for the trace and the register/memory commit.
    pub signals: ControlSignals,
    /// `PC` after the instruction.
    pub next_pc: u16,
    /// Privilege change.
    pub privilege: PrivilegeUpdate,
}

impl ExecuteState {
    const fn sequential(pc: u16, signals: ControlSignals) -> Self {
        Self {
            signals,
            next_pc: pc.wrapping_add(1),
            privilege: PrivilegeUpdate::Keep,
        }
    }
}

/// Computes the effects of `instruction` against `state` without mutating it.
///
/// Returns `None` for reserved opcodes, which have no datapath behavior.
#[must_use]
pub fn execute_instruction(
    instruction: &Instruction,
    state: &MachineState,
) -> Option<ExecuteState> {
    let arch = &state.arch;
    let pc = arch.pc();

    let exec = match *instruction {
        Instruction::Branch { condition, offset } => {
            let next_pc = if condition.is_satisfied_by(arch.nzp_bits()) {
                pc_relative(pc, offset)
            } else {
                pc.wrapping_add(1)
            };
            ExecuteState {
                next_pc,
                ..ExecuteState::sequential(pc, ControlSignals::default())
            }
        }
        Instruction::Arith { op, rd, rs, rhs } => {
            let lhs = arch.gpr(rs);
            let (rt_mux, rhs_value) = operand(state, rhs);
            let value = match op {
                ArithOp::Add => lhs.wrapping_add(rhs_value),
                ArithOp::Mul => lhs.wrapping_mul(rhs_value),
                ArithOp::Sub => lhs.wrapping_sub(rhs_value),
                ArithOp::Div => lhs.checked_div(rhs_value).unwrap_or(0),
            };
            ExecuteState::sequential(pc, register_write(rs, rt_mux, rd, value))
        }
        Instruction::Compare { kind, rs, rhs } => {
            let (rt_mux, rhs_value) = operand(state, rhs);
            let lhs = arch.gpr(rs);
            let difference = match kind {
                CompareKind::Signed => i32::from(lhs as i16) - i32::from(rhs_value as i16),
                CompareKind::Unsigned => i32::from(lhs) - i32::from(rhs_value),
            };
            ExecuteState::sequential(
                pc,
                ControlSignals {
                    rs_mux: rs,
                    rt_mux,
                    nzp: Some(ConditionCode::from_wide(difference)),
                    ..ControlSignals::default()
                },
            )
        }
        Instruction::JsrRegister { rs } => ExecuteState {
            next_pc: arch.gpr(rs),
            ..ExecuteState::sequential(pc, link_signals(rs, pc))
        },
        Instruction::JsrLabel { imm11 } => ExecuteState {
            next_pc: (pc & 0x8000) | ((imm11 as u16) << 4),
            ..ExecuteState::sequential(pc, link_signals(GeneralRegister::R0, pc))
        },
        Instruction::Logic { op, rd, rs, rhs } => {
            let lhs = arch.gpr(rs);
            let (rt_mux, rhs_value) = match op {
                LogicOp::Not => (GeneralRegister::R0, 0),
                _ => operand(state, rhs),
            };
            let value = match op {
                LogicOp::And => lhs & rhs_value,
                LogicOp::Not => !lhs,
                LogicOp::Or => lhs | rhs_value,
                LogicOp::Xor => lhs ^ rhs_value,
            };
            ExecuteState::sequential(pc, register_write(rs, rt_mux, rd, value))
        }
        Instruction::Load { rd, rs, offset } => {
            let addr = effective_address(arch, rs, offset);
            let value = state.memory.read(addr);
            ExecuteState::sequential(
                pc,
                ControlSignals {
                    dmem_addr: addr,
                    dmem_value: value,
                    ..register_write(rs, GeneralRegister::R0, rd, value)
                },
            )
        }
        Instruction::Store { rt, rs, offset } => ExecuteState::sequential(
            pc,
            ControlSignals {
                rs_mux: rs,
                rt_mux: rt,
                data_we: true,
                dmem_addr: effective_address(arch, rs, offset),
                dmem_value: arch.gpr(rt),
                ..ControlSignals::default()
            },
        ),
        Instruction::Rti => ExecuteState {
            signals: ControlSignals {
                rs_mux: GeneralRegister::R7,
                ..ControlSignals::default()
            },
            next_pc: arch.gpr(GeneralRegister::R7),
            privilege: PrivilegeUpdate::Leave,
        },
        Instruction::Const { rd, value } => ExecuteState::sequential(
            pc,
            register_write(GeneralRegister::R0, GeneralRegister::R0, rd, value as u16),
        ),
        Instruction::Shift { op, rd, rs, amount } => {
            let source = arch.gpr(rs);
            let value = match op {
                ShiftOp::Sll => source << amount,
                ShiftOp::Sra => ((source as i16) >> amount) as u16,
                ShiftOp::Srl => source >> amount,
            };
            ExecuteState::sequential(pc, register_write(rs, GeneralRegister::R0, rd, value))
        }
        Instruction::Mod { rd, rs, rt } => {
            let value = arch.gpr(rs).checked_rem(arch.gpr(rt)).unwrap_or(0);
            ExecuteState::sequential(pc, register_write(rs, rt, rd, value))
        }
        Instruction::JmpRegister { rs } => ExecuteState {
            next_pc: arch.gpr(rs),
            ..ExecuteState::sequential(
                pc,
                ControlSignals {
                    rs_mux: rs,
                    ..ControlSignals::default()
                },
            )
        },
        Instruction::JmpLabel { offset } => ExecuteState {
            next_pc: pc_relative(pc, offset),
            ..ExecuteState::sequential(pc, ControlSignals::default())
        },
        Instruction::HiConst { rd, uimm8 } => {
            let value = (arch.gpr(rd) & 0x00FF) | (u16::from(uimm8) << 8);
            ExecuteState::sequential(pc, register_write(rd, GeneralRegister::R0, rd, value))
        }
        Instruction::Trap { vector } => ExecuteState {
            signals: link_signals(GeneralRegister::R0, pc),
            next_pc: 0x8000 | u16::from(vector),
            privilege: PrivilegeUpdate::Enter,
        },
        Instruction::Reserved { .. } => return None,
    };

    Some(exec)
}

/// Applies the side effects of an executed instruction to `state`.
pub fn commit_execution(state: &mut MachineState, exec: &ExecuteState) {
    let signals = &exec.signals;

    if signals.reg_file_we {
        state.arch.set_gpr(signals.rd_mux, signals.reg_input_val);
    }
    if signals.data_we {
        state.memory.write(signals.dmem_addr, signals.dmem_value);
    }
    if let Some(code) = signals.nzp {
        state.arch.set_condition_code(code);
    }
    match exec.privilege {
        PrivilegeUpdate::Keep => {}
        PrivilegeUpdate::Enter => state.arch.set_privileged(true),
        PrivilegeUpdate::Leave => state.arch.set_privileged(false),
    }
    state.arch.set_pc(exec.next_pc);
}

/// Runs one cycle: halt check, protection check, execute, trace, commit.
///
/// # Errors
///
/// Returns the sink's I/O error. The state is left unchanged in that case.
pub fn step_one(state: &mut MachineState, sink: &mut dyn TraceSink) -> io::Result<StepOutcome> {
    let pc = state.arch.pc();
    if pc == HALT_PC {
        return Ok(StepOutcome::Halted);
    }

    let word = state.fetch();
    let instruction = Decoder::decode(word);

    if let Err(cause) = check_protection(&state.arch, &instruction) {
        return Ok(StepOutcome::Fault { cause });
    }

    let Some(exec) = execute_instruction(&instruction, state) else {
        return Ok(StepOutcome::Idle);
    };

    let record = CycleRecord {
        pc,
        word,
        signals: exec.signals,
    };
    trace!(%record, "retired");
    sink.on_cycle(&record)?;
    commit_execution(state, &exec);

    Ok(StepOutcome::Retired)
}

/// Steps until a terminal status, a reserved opcode, or the configured cycle limit.
///
/// # Errors
///
/// Returns the sink's I/O error.
pub fn run(
    state: &mut MachineState,
    sink: &mut dyn TraceSink,
    config: &SimConfig,
) -> io::Result<RunOutcome> {
    let mut cycles = 0_u64;

    loop {
        if config.max_cycles.is_some_and(|limit| cycles >= limit) {
            info!(cycles, "cycle limit reached");
            return Ok(RunOutcome {
                cycles,
                final_step: StepOutcome::Retired,
            });
        }

        let step = step_one(state, sink)?;
        match step {
            StepOutcome::Retired => cycles += 1,
            StepOutcome::Idle => {
                debug!(
                    pc = format_args!("{:04X}", state.arch.pc()),
                    "reserved opcode, stalled"
                );
                return Ok(RunOutcome {
                    cycles,
                    final_step: step,
                });
            }
            StepOutcome::Halted => {
                info!(cycles, "reached halt address");
                return Ok(RunOutcome {
                    cycles,
                    final_step: step,
                });
            }
            StepOutcome::Fault { cause } => {
                warn!(
                    pc = format_args!("{:04X}", state.arch.pc()),
                    code = cause.as_u8(),
                    %cause,
                    "protection fault"
                );
                return Ok(RunOutcome {
                    cycles,
                    final_step: step,
                });
            }
        }
    }
}

fn operand(state: &MachineState, rhs: Operand) -> (GeneralRegister, u16) {
    match rhs {
        Operand::Register(rt) => (rt, state.arch.gpr(rt)),
        Operand::Immediate(value) => (GeneralRegister::R0, value as u16),
    }
}

fn register_write(
    rs_mux: GeneralRegister,
    rt_mux: GeneralRegister,
    rd: GeneralRegister,
    value: u16,
) -> ControlSignals {
    ControlSignals {
        rs_mux,
        rt_mux,
        rd_mux: rd,
        reg_file_we: true,
        reg_input_val: value,
        nzp: Some(ConditionCode::from_result(value)),
        ..ControlSignals::default()
    }
}

/// `R7 = PC + 1` with the condition code taken from the link value.
fn link_signals(rs_mux: GeneralRegister, pc: u16) -> ControlSignals {
    register_write(rs_mux, GeneralRegister::R0, GeneralRegister::R7, pc.wrapping_add(1))
}
