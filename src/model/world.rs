//! A batch of independent organisms, each running its own machine.
//!
//! Cells never interact, so each cycle steps every live cell in parallel.
//! Every cell owns an RNG seeded from the run seed and its index; identical
//! configuration and seed give an identical run and state hash.

use crate::model::config::AppConfig;
use crate::model::organism::SoloOrganism;
use anyhow::{ensure, Result};
use genexpr_core::{ExecContext, GxHardware, InstSet, Metrics};
use genexpr_data::{Genome, HardwareStats};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub struct Cell {
    pub id: Uuid,
    pub hardware: GxHardware,
    pub organism: SoloOrganism,
    rng: ChaCha8Rng,
    pub cycles_run: u64,
}

impl Cell {
    fn new(index: usize, config: &AppConfig, inst_set: Arc<InstSet>, genome: Genome) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(config.run.seed.wrapping_add(index as u64));
        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        let organism = SoloOrganism::new(
            &mut rng,
            config.run.input_count,
            config.run.resources.clone(),
            config.run.max_offspring,
        );
        Self {
            id,
            hardware: GxHardware::new(config.hardware.clone(), inst_set, genome),
            organism,
            rng,
            cycles_run: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.organism.alive && !self.organism.is_saturated()
    }

    /// Runs one CPU cycle and returns the offspring it produced.
    fn step(&mut self) -> usize {
        let before = self.organism.offspring.len();
        let mut ctx = ExecContext::new(&mut self.rng, &mut self.organism);
        self.hardware.single_process(&mut ctx);
        self.cycles_run += 1;
        if !self.organism.alive {
            tracing::debug!(id = %self.id, cycle = self.cycles_run, "Organism died");
        }
        self.organism.offspring.len() - before
    }

    pub fn report(&self) -> OrganismReport {
        OrganismReport {
            id: self.id,
            alive: self.organism.alive,
            cycles_run: self.cycles_run,
            programids: self.hardware.num_programids(),
            offspring: self.organism.offspring.len(),
            offspring_sizes: self.organism.offspring.iter().map(Genome::len).collect(),
            outputs: self.organism.output_count,
            stats: self.hardware.stats().clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganismReport {
    pub id: Uuid,
    pub alive: bool,
    pub cycles_run: u64,
    pub programids: usize,
    pub offspring: usize,
    pub offspring_sizes: Vec<usize>,
    pub outputs: usize,
    pub stats: HardwareStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldReport {
    pub cycles: u64,
    pub config_fingerprint: String,
    pub state_hash: String,
    pub organisms: Vec<OrganismReport>,
}

pub struct World {
    pub cells: Vec<Cell>,
    pub cycle: u64,
    pub config: AppConfig,
    metrics: Metrics,
}

impl World {
    pub fn new(config: AppConfig, inst_set: Arc<InstSet>, genome: Genome) -> Result<Self> {
        config.validate()?;
        let limits = &config.hardware.genome;
        ensure!(
            (limits.min_size..=limits.max_size).contains(&genome.len()),
            "genome size {} outside {}..={}",
            genome.len(),
            limits.min_size,
            limits.max_size
        );
        let cells = (0..config.run.organisms)
            .map(|i| Cell::new(i, &config, inst_set.clone(), genome.clone()))
            .collect();
        tracing::info!(
            organisms = config.run.organisms,
            genome_size = genome.len(),
            fingerprint = %config.hardware.fingerprint(),
            "World created"
        );
        Ok(Self {
            cells,
            cycle: 0,
            metrics: Metrics::with_interval(config.run.log_interval),
            config,
        })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_active()).count()
    }

    /// Steps every active cell once.
    pub fn step(&mut self) {
        let start = Instant::now();
        let offspring: usize = self
            .cells
            .par_iter_mut()
            .filter(|cell| cell.is_active())
            .map(Cell::step)
            .sum();
        self.cycle += 1;

        let programids = self
            .cells
            .iter()
            .map(|c| c.hardware.num_programids())
            .sum();
        self.metrics
            .record_cycle(start.elapsed(), programids, offspring);
        if offspring > 0 {
            self.metrics.increment_counter("divide_cycles");
        }
    }

    /// Runs up to `cycles` cycles, stopping early once nothing is active.
    pub fn run(&mut self, cycles: u64) -> u64 {
        let mut ran = 0;
        while ran < cycles && self.active_count() > 0 {
            self.step();
            ran += 1;
        }
        self.metrics.log_event(
            "run_finished",
            &format!(
                "{ran} cycles, {} active, {} offspring",
                self.active_count(),
                self.metrics.offspring_count()
            ),
        );
        ran
    }

    /// SHA-256 over every machine snapshot and organism output, in cell order.
    pub fn state_hash(&self) -> Result<String> {
        let mut hasher = Sha256::new();
        for cell in &self.cells {
            hasher.update(serde_json::to_vec(&cell.hardware.snapshot())?);
            hasher.update(serde_json::to_vec(&(
                cell.organism.output_count,
                cell.organism.last_output,
            ))?);
            hasher.update(serde_json::to_vec(&cell.organism.offspring)?);
        }
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn report(&self) -> Result<WorldReport> {
        Ok(WorldReport {
            cycles: self.cycle,
            config_fingerprint: self.config.hardware.fingerprint(),
            state_hash: self.state_hash()?,
            organisms: self.cells.iter().map(Cell::report).collect(),
        })
    }

    /// Writes every machine's status block.
    pub fn dump<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for cell in &self.cells {
            writeln!(out, "organism {} ({} cycles)", cell.id, cell.cycles_run)?;
            cell.hardware.print_status(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world(organisms: usize, names: &str) -> World {
        let mut config = AppConfig::default();
        config.run.organisms = organisms;
        config.hardware.genome.min_size = 1;
        let inst_set = InstSet::default_gx();
        let genome = inst_set.parse_genome(names).unwrap();
        World::new(config, inst_set, genome).unwrap()
    }

    #[test]
    fn test_cells_get_distinct_ids() {
        let world = world(4, "inc");
        let mut ids: Vec<Uuid> = world.cells.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_step_runs_every_cell() {
        let mut world = world(3, "inc put");
        world.run(4);
        assert_eq!(world.cycle, 4);
        assert!(world
            .cells
            .iter()
            .all(|c| c.organism.output_count == 2 && c.organism.last_output == Some(1)));
        assert_eq!(world.metrics().cycle_count(), 4);
    }

    #[test]
    fn test_dead_cells_stop() {
        let mut world = world(2, "die");
        let ran = world.run(10);
        assert_eq!(ran, 1);
        assert_eq!(world.active_count(), 0);
    }

    #[test]
    fn test_oversized_genome_rejected() {
        let mut config = AppConfig::default();
        config.hardware.genome.max_size = 8;
        let inst_set = InstSet::default_gx();
        let genome = Genome::from_ops(&[0; 9]);
        assert!(World::new(config, inst_set, genome).is_err());
    }

    #[test]
    fn test_report_serializes() {
        let mut world = world(2, "inc");
        world.run(2);
        let report = world.report().unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("state_hash"));
        assert_eq!(report.organisms.len(), 2);
    }
}
