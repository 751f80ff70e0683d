mod common;

use common::HardwareBuilder;
use genexpr_data::{HeadKind, Register};

// CX = 3, then count BX up to it with a backward jump, then jump forward
// over the `dec` and record the exit in AX.
const COUNTER: &str = "inc nop-C inc nop-C inc nop-C \
                       nop-A inc if-n-equ jump-b nop-C \
                       jump-f nop-B dec nop-C inc nop-A";

#[test]
fn test_backward_jump_loops_until_count() {
    let mut h = HardwareBuilder::new(COUNTER).build();

    h.run(3);
    assert_eq!(h.hw.programids()[0].register(Register::Cx), 3);

    // nop-A, inc, if-n-equ, jump-b lands back on nop-A
    h.run(4);
    assert_eq!(h.hw.programids()[0].register(Register::Bx), 1);
    assert_head_on!(h.hw, 0, HeadKind::Ip, 0);
    assert_eq!(h.hw.programids()[0].head(HeadKind::Ip).position(), 7);

    // two more passes, the last one skipping the jump
    h.run(6);
    assert_eq!(h.hw.programids()[0].register(Register::Bx), 3);
    assert_eq!(h.hw.programids()[0].head(HeadKind::Ip).position(), 11);
    assert_eq!(h.hw.stats().failures, 0);
}

#[test]
fn test_forward_jump_leaves_loop() {
    let mut h = HardwareBuilder::new(COUNTER).build();
    h.run(14);
    // jump-f found nop-C and stepped past it, skipping dec
    assert_eq!(h.hw.programids()[0].head(HeadKind::Ip).position(), 15);

    h.run(1);
    let origin = &h.hw.programids()[0];
    assert_eq!(origin.register(Register::Ax), 1);
    assert_eq!(origin.register(Register::Bx), 3);
    assert_eq!(origin.register(Register::Cx), 3);
    assert_eq!(origin.head(HeadKind::Ip).position(), 0);
    assert_eq!(h.hw.stats().failures, 0);
    assert_consistent!(h.hw);
}

#[test]
fn test_jump_only_searches_own_memory() {
    // the complement only exists in another programid, so the jump fails
    let mut h = HardwareBuilder::new("jump-f nop-A inc inc")
        .with_gene("nop-B nop-B")
        .build();
    h.run(1);
    assert_eq!(h.hw.stats().failures, 1);
    assert_eq!(h.hw.programids()[0].head(HeadKind::Ip).position(), 2);
}
