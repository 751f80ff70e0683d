/// Asserts that the machine's structural invariants hold.
#[macro_export]
macro_rules! assert_consistent {
    ($hw:expr) => {
        if let Err(e) = $hw.check_consistency() {
            panic!("Hardware inconsistent: {e}");
        }
    };
}

/// Asserts the number of live programids.
#[macro_export]
macro_rules! assert_programids {
    ($hw:expr, $count:expr) => {
        assert_eq!(
            $hw.num_programids(),
            $count,
            "Programid count mismatch"
        );
    };
}

/// Asserts how many foreign heads rest on a programid.
#[macro_export]
macro_rules! assert_contacts {
    ($hw:expr, $index:expr, $count:expr) => {
        let prog = $hw
            .programid($index)
            .unwrap_or_else(|| panic!("Programid {} not found", $index));
        assert_eq!(
            prog.contacts(),
            $count,
            "Programid {} contact count mismatch",
            $index
        );
    };
}

/// Asserts that a head of a programid rests on another programid's memory.
#[macro_export]
macro_rules! assert_head_on {
    ($hw:expr, $owner:expr, $kind:expr, $space:expr) => {
        let prog = $hw
            .programid($owner)
            .unwrap_or_else(|| panic!("Programid {} not found", $owner));
        assert_eq!(
            prog.head($kind).space(),
            $space,
            "Head {:?} of programid {} rests elsewhere",
            $kind,
            $owner
        );
    };
}
