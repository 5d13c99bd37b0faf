use boot_cache::{whole_cache_op, SetWayOp};
use boot_registers::{Barrier, CacheType, CcsidrEl1, CsselrEl1, Event, RecordingCpu, SysReg};

fn two_level_cpu() -> RecordingCpu {
    RecordingCpu::new()
        .with_cache_level(1, CacheType::Separate, CcsidrEl1::from_geometry(64, 4, 4))
        .with_cache_level(2, CacheType::Unified, CcsidrEl1::from_geometry(64, 8, 16))
}

#[test]
fn every_set_and_way_of_every_level_is_visited() {
    let mut cpu = two_level_cpu();
    whole_cache_op(&mut cpu, SetWayOp::CleanInvalidate);

    let ops: Vec<u64> = cpu
        .events()
        .iter()
        .filter_map(|e| match e {
            Event::SetWay(SetWayOp::CleanInvalidate, operand) => Some(*operand),
            _ => None,
        })
        .collect();

    assert_eq!(ops.len(), 4 * 4 + 8 * 16);
    assert_eq!(ops.iter().filter(|op| *op & 0b1110 == 0).count(), 16);
    assert_eq!(ops.iter().filter(|op| *op & 0b1110 == 0b10).count(), 128);

    // Highest way of L2 (8 ways -> shift 29), highest set (line shift 6).
    assert!(ops.contains(&((7 << 29) | (15 << 6) | 0b10)));
}

#[test]
fn each_level_is_selected_synchronized_and_fenced() {
    let mut cpu = two_level_cpu();
    whole_cache_op(&mut cpu, SetWayOp::Clean);

    let skeleton: Vec<Event> = cpu
        .take_events()
        .into_iter()
        .filter(|e| !matches!(e, Event::SetWay(..)))
        .collect();

    assert_eq!(
        skeleton,
        [
            Event::Read(SysReg::ClidrEl1),
            Event::Write(SysReg::CsselrEl1, CsselrEl1::data_or_unified(1).into_bits()),
            Event::Barrier(Barrier::Isb),
            Event::Read(SysReg::CcsidrEl1),
            Event::Barrier(Barrier::DsbSy),
            Event::Write(SysReg::CsselrEl1, CsselrEl1::data_or_unified(2).into_bits()),
            Event::Barrier(Barrier::Isb),
            Event::Read(SysReg::CcsidrEl1),
            Event::Barrier(Barrier::DsbSy),
            Event::Barrier(Barrier::DsbSy),
            Event::Barrier(Barrier::Isb),
        ]
    );
}

#[test]
fn levels_beyond_the_level_of_coherence_are_ignored() {
    let mut cpu = two_level_cpu().with_register(
        SysReg::ClidrEl1,
        // L1 separate, L2 unified, but LoC = 1.
        0b100_011 | (1 << 24),
    );
    whole_cache_op(&mut cpu, SetWayOp::Invalidate);
    let count = cpu
        .events()
        .iter()
        .filter(|e| matches!(e, Event::SetWay(..)))
        .count();
    assert_eq!(count, 16);
}
