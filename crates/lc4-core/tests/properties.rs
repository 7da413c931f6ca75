//! Property coverage for decode, execute and protection invariants.

use lc4_core::{
    check_protection, execute_instruction, sign_extend, step_one, CycleRecord, Decoder,
    GeneralRegister, Instruction, MachineState, StepOutcome, TraceWriter, HALT_PC,
};
use proptest::prelude::*;
use rstest as _;
use tempfile as _;
use thiserror as _;
use tracing as _;

fn state_with_registers(pc: u16, psr: u16, regs: [u16; 8]) -> MachineState {
    let mut state = MachineState::new();
    state.arch.set_pc(pc);
    state.arch.set_psr(psr);
    for (reg, value) in GeneralRegister::ALL.into_iter().zip(regs) {
        state.arch.set_gpr(reg, value);
    }
    state
}

proptest! {
    #[test]
    fn sign_extension_preserves_the_low_bits(value in any::<u16>(), bits in 1_u32..=16) {
        let extended = sign_extend(value, bits) as u16;
        let mask = if bits == 16 { u16::MAX } else { (1 << bits) - 1 };
        prop_assert_eq!(extended & mask, value & mask);

        let sign = (value >> (bits - 1)) & 1;
        let upper = if sign == 1 { !mask } else { 0 };
        prop_assert_eq!(extended & !mask, upper);
    }

    #[test]
    fn decode_is_total_and_deterministic(word in any::<u16>()) {
        let first = Decoder::decode(word);
        prop_assert_eq!(first, Decoder::decode(word));
        let reserved = matches!(first, Instruction::Reserved { .. });
        prop_assert_eq!(reserved, matches!(word >> 12, 0x3 | 0xB | 0xE));
    }

    #[test]
    fn store_then_load_round_trips(addr in 0x2000_u16..=0x7FFF, value in any::<u16>()) {
        // STR R0, R2, #0 ; LDR R1, R2, #0
        let mut state = MachineState::new();
        state.memory.write(0x8200, 0x7080);
        state.memory.write(0x8201, 0x6280);
        state.arch.set_gpr(GeneralRegister::R0, value);
        state.arch.set_gpr(GeneralRegister::R2, addr);

        let mut records: Vec<CycleRecord> = Vec::new();
        for _ in 0..2 {
            let outcome = step_one(&mut state, &mut records).expect("vec sink");
            prop_assert_eq!(outcome, StepOutcome::Retired);
        }

        prop_assert_eq!(state.arch.gpr(GeneralRegister::R1), value);
        prop_assert_eq!(state.memory.read(addr), value);
    }

    #[test]
    fn execution_is_idempotent_for_identical_state(
        word in any::<u16>(),
        regs in any::<[u16; 8]>(),
        psr in any::<u16>(),
        pc in 0x8000_u16..=0x9FFF,
    ) {
        let state = state_with_registers(pc, psr, regs);
        let instruction = Decoder::decode(word);
        let first = execute_instruction(&instruction, &state);
        let second = execute_instruction(&Decoder::decode(word), &state);
        prop_assert_eq!(first, second);

        let mut a = state.clone();
        let mut b = state;
        a.memory.write(pc, word);
        b.memory.write(pc, word);
        let mut trace_a = TraceWriter::new(Vec::new());
        let mut trace_b = TraceWriter::new(Vec::new());
        let outcome_a = step_one(&mut a, &mut trace_a).expect("vec sink");
        let outcome_b = step_one(&mut b, &mut trace_b).expect("vec sink");
        prop_assert_eq!(outcome_a, outcome_b);
        prop_assert_eq!(trace_a.into_inner(), trace_b.into_inner());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn faults_and_halts_never_mutate_state(
        word in any::<u16>(),
        regs in any::<[u16; 8]>(),
        psr in any::<u16>(),
        pc in any::<u16>(),
    ) {
        let mut state = state_with_registers(pc, psr, regs);
        state.memory.write(pc, word);
        let before = state.clone();
        let mut records: Vec<CycleRecord> = Vec::new();

        let outcome = step_one(&mut state, &mut records).expect("vec sink");

        match outcome {
            StepOutcome::Fault { cause } => {
                prop_assert_eq!(check_protection(&before.arch, &Decoder::decode(word)), Err(cause));
                prop_assert!(records.is_empty());
                prop_assert_eq!(&state, &before);
            }
            StepOutcome::Halted | StepOutcome::Idle => {
                prop_assert!(records.is_empty());
                prop_assert_eq!(&state, &before);
            }
            StepOutcome::Retired => {
                prop_assert_ne!(pc, HALT_PC);
                prop_assert_eq!(records.len(), 1);
                prop_assert_eq!(records[0].pc, pc);
                prop_assert_eq!(records[0].word, word);
            }
        }
    }

    #[test]
    fn trace_lines_have_a_fixed_shape(word in any::<u16>(), regs in any::<[u16; 8]>()) {
        let mut state = state_with_registers(0x8200, 0x8002, regs);
        state.memory.write(0x8200, word);
        let mut writer = TraceWriter::new(Vec::new());

        if step_one(&mut state, &mut writer).expect("vec sink") == StepOutcome::Retired {
            let text = String::from_utf8(writer.into_inner()).expect("ascii");
            let line = text.strip_suffix('\n').expect("newline terminated");
            let fields: Vec<&str> = line.split(' ').collect();
            prop_assert_eq!(fields.len(), 10);
            prop_assert_eq!(fields[1].len(), 16);
            prop_assert_eq!(u16::from_str_radix(fields[1], 2).expect("binary"), word);
            prop_assert!(matches!(fields[5], "0" | "1"));
            prop_assert!(matches!(fields[6], "0" | "1" | "2" | "4"));
            prop_assert_eq!(fields[5] == "0", fields[6] == "0");
            prop_assert!(fields[2] == "1" || (fields[3] == "0" && fields[4] == "0000"));
        }
    }
}

#[test]
fn halt_address_is_never_traced() {
    let mut state = MachineState::new();
    state.arch.set_pc(HALT_PC);
    state.memory.write(HALT_PC, 0x9005);
    let mut records: Vec<CycleRecord> = Vec::new();

    for _ in 0..3 {
        assert_eq!(
            step_one(&mut state, &mut records).expect("vec sink"),
            StepOutcome::Halted
        );
    }
    assert!(records.is_empty());
}
