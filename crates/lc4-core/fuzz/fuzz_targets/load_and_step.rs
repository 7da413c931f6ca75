#![no_main]

use lc4_core::{
    check_protection, load_object_bytes, parse_object, run, CycleRecord, Decoder, MachineState,
    SimConfig,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(segments) = parse_object(data) else {
        return;
    };

    let mut state = MachineState::new();
    let summary = load_object_bytes(&mut state.memory, data).expect("parsed once already");
    assert_eq!(summary.segments, segments.len());

    let _ = check_protection(&state.arch, &Decoder::decode(state.fetch()));

    let mut records: Vec<CycleRecord> = Vec::new();
    let outcome = run(&mut state, &mut records, &SimConfig::with_max_cycles(4096))
        .expect("vec sink never fails");
    assert_eq!(usize::try_from(outcome.cycles).ok(), Some(records.len()));
});
