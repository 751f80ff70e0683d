use genexpr_core::{
    AllocMethod, ExecContext, GxHardware, HardwareConfig, InstSet, RecordingOrganism,
    ReplacementPolicy,
};
use genexpr_data::{CodeLabel, Genome, Instruction, NUM_NOPS};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

prop_compose! {
    fn arb_genome()(ops in prop::collection::vec(any::<u8>(), 8..64)) -> Genome {
        let len = InstSet::default_gx().len();
        Genome::new(ops.into_iter().map(|op| Instruction(op % len as u8)).collect())
    }
}

prop_compose! {
    fn arb_config()(
        max_programids in 1usize..8,
        evict in any::<bool>(),
        max_age in 5u32..200,
        method in 0u8..3,
        require_allocate in any::<bool>()
    ) -> HardwareConfig {
        let mut config = HardwareConfig::default();
        config.programids.max_programids = max_programids;
        config.programids.replacement = if evict {
            ReplacementPolicy::EvictHighestUsage
        } else {
            ReplacementPolicy::Reject
        };
        config.programids.max_age = max_age;
        config.alloc.method = match method {
            0 => AllocMethod::Default,
            1 => AllocMethod::Necrotic,
            _ => AllocMethod::Random,
        };
        config.alloc.require_allocate = require_allocate;
        config
    }
}

prop_compose! {
    fn arb_label()(nops in prop::collection::vec(0u8..NUM_NOPS as u8, 0..6)) -> CodeLabel {
        CodeLabel::from_nops(&nops)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_random_genomes_stay_consistent(
        genome in arb_genome(),
        config in arb_config(),
        seed in any::<u64>()
    ) {
        let max = config.programids.max_programids;
        let max_size = config.genome.max_size;
        let mut hw = GxHardware::new(config, InstSet::default_gx(), genome);
        let mut org = RecordingOrganism::new();
        org.neighbors = 1;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for cycle in 0..200 {
            let mut ctx = ExecContext::new(&mut rng, &mut org);
            hw.single_process(&mut ctx);
            if let Err(e) = hw.check_consistency() {
                prop_assert!(false, "cycle {}: {}", cycle, e);
            }
            prop_assert!(hw.num_programids() <= max);
            for prog in hw.programids() {
                prop_assert!(prog.memory.len() >= 1);
                prop_assert!(prog.memory.len() <= max_size);
            }
            if hw.num_programids() == 0 {
                prop_assert!(org.dead);
                break;
            }
        }
    }

    #[test]
    fn test_offspring_respect_size_bounds(
        genome in arb_genome(),
        seed in any::<u64>()
    ) {
        let config = HardwareConfig::default();
        let size = genome.len();
        let min = config.genome.min_size.max(size / 2);
        let max = config.genome.max_size.min(size * 2);
        let mut hw = GxHardware::new(config, InstSet::default_gx(), genome);
        let mut org = RecordingOrganism::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        for _ in 0..300 {
            let mut ctx = ExecContext::new(&mut rng, &mut org);
            hw.single_process(&mut ctx);
        }
        for child in &org.offspring {
            prop_assert!((min..=max).contains(&child.len()),
                "child of {} cells outside {}..={}", child.len(), min, max);
        }
    }

    #[test]
    fn test_label_complement_cycles(label in arb_label()) {
        let mut back = label.complement();
        for _ in 1..NUM_NOPS {
            back = back.complement();
        }
        prop_assert_eq!(&back, &label);
        prop_assert_eq!(label.complement().len(), label.len());
        if !label.is_empty() {
            prop_assert_ne!(label.complement(), label);
        }
    }

    #[test]
    fn test_label_value_in_range(label in arb_label()) {
        let value = label.as_int(NUM_NOPS);
        prop_assert!(value >= 0);
        prop_assert!((value as i64) < (NUM_NOPS as i64).pow(label.len() as u32));
    }
}
