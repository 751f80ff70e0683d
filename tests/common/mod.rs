pub mod macros;

use genexpr_core::{ExecContext, GxHardware, HardwareConfig, InstSet, RecordingOrganism};
use genexpr_data::{Capabilities, Genome, Instruction};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

/// A machine, the organism it reports to, and its random source.
#[allow(dead_code)]
pub struct Harness {
    pub hw: GxHardware,
    pub org: RecordingOrganism,
    pub rng: ChaCha8Rng,
}

#[allow(dead_code)]
impl Harness {
    pub fn inst_set(&self) -> Arc<InstSet> {
        self.hw.inst_set().clone()
    }

    pub fn inst(&self, name: &str) -> Instruction {
        self.hw
            .inst_set()
            .inst(name)
            .unwrap_or_else(|| panic!("unknown instruction {name}"))
    }

    pub fn genome(&self, names: &str) -> Genome {
        self.hw.inst_set().parse_genome(names).expect("valid genome")
    }

    pub fn cycle(&mut self) {
        let mut ctx = ExecContext::new(&mut self.rng, &mut self.org);
        self.hw.single_process(&mut ctx);
    }

    pub fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.cycle();
        }
    }

    /// Runs until `done` holds or `limit` cycles pass; returns cycles run.
    pub fn run_until<F>(&mut self, limit: usize, mut done: F) -> usize
    where
        F: FnMut(&Harness) -> bool,
    {
        for ran in 0..limit {
            if done(self) {
                return ran;
            }
            self.cycle();
        }
        limit
    }

    pub fn bonus(&mut self, name: &str) -> bool {
        let inst = self.inst(name);
        let mut ctx = ExecContext::new(&mut self.rng, &mut self.org);
        self.hw.process_bonus_inst(&mut ctx, inst)
    }
}

#[allow(dead_code)]
pub struct HardwareBuilder {
    config: HardwareConfig,
    origin: String,
    programids: Vec<(Capabilities, String)>,
    organism: RecordingOrganism,
    seed: u64,
}

#[allow(dead_code)]
impl HardwareBuilder {
    pub fn new(origin: &str) -> Self {
        Self {
            config: HardwareConfig::default(),
            origin: origin.to_string(),
            programids: Vec::new(),
            organism: RecordingOrganism::new(),
            seed: 42,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut HardwareConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Adds a bindable, readable programid holding `names`.
    pub fn with_gene(self, names: &str) -> Self {
        self.with_programid(Capabilities::GENOMIC, names)
    }

    pub fn with_programid(mut self, capabilities: Capabilities, names: &str) -> Self {
        self.programids.push((capabilities, names.to_string()));
        self
    }

    pub fn with_organism<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut RecordingOrganism),
    {
        modifier(&mut self.organism);
        self
    }

    pub fn build(self) -> Harness {
        let inst_set = InstSet::default_gx();
        let origin = inst_set.parse_genome(&self.origin).expect("valid origin");
        let mut hw = GxHardware::new(self.config, inst_set.clone(), origin);
        for (capabilities, names) in &self.programids {
            let genome = inst_set.parse_genome(names).expect("valid programid");
            hw.spawn_programid(*capabilities, &genome)
                .expect("capacity for seeded programid");
        }
        Harness {
            hw,
            org: self.organism,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
        }
    }
}
