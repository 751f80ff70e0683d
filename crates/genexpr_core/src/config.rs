//! Configuration for the gene-expression hardware.
//!
//! These structures map to the `[hardware]` table of the driver's
//! `config.toml`. Defaults reproduce the classic constants: 32 programids,
//! failing allocation at capacity, 2000-instruction programid lifetime.
//!
//! ## Example
//!
//! ```toml
//! [programids]
//! max_programids = 32
//! replacement = "reject"
//! max_age = 2000
//!
//! [genome]
//! min_size = 8
//! max_size = 2048
//! offspring_size_range = 2.0
//!
//! [alloc]
//! method = "default"
//! require_allocate = true
//! ```

use serde::{Deserialize, Serialize};

/// What happens when a new programid is requested at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// The allocating instruction fails.
    #[default]
    Reject,
    /// Remove the programid that has used the most cycles, then allocate.
    EvictHighestUsage,
}

/// How freshly allocated memory is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocMethod {
    /// Default instruction.
    #[default]
    Default,
    /// Whatever remained in the buffer from earlier, larger contents.
    Necrotic,
    /// Redundancy-weighted random instructions.
    Random,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ProgramidConfig {
    pub max_programids: usize,
    pub replacement: ReplacementPolicy,
    /// Instructions a programid executes before it is removed.
    pub max_age: u32,
}

impl Default for ProgramidConfig {
    fn default() -> Self {
        Self {
            max_programids: 32,
            replacement: ReplacementPolicy::Reject,
            max_age: 2000,
        }
    }
}

/// Size and viability limits for memories and offspring.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenomeConfig {
    pub min_size: usize,
    pub max_size: usize,
    /// Offspring may be at most this factor larger or smaller than the genome.
    pub offspring_size_range: f64,
    /// Allocation may grow memory by at most this factor.
    pub child_size_range: f64,
    /// Fraction of the offspring that must carry the copied flag.
    pub min_copied_lines: f64,
    /// Fraction of the parent that must carry the executed flag (h-divide).
    pub min_exe_lines: f64,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            min_size: 8,
            max_size: 2048,
            offspring_size_range: 2.0,
            child_size_range: 2.0,
            min_copied_lines: 0.5,
            min_exe_lines: 0.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AllocConfig {
    pub method: AllocMethod,
    /// Forbid a second allocation before a divide.
    pub require_allocate: bool,
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self {
            method: AllocMethod::Default,
            require_allocate: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct HardwareConfig {
    pub programids: ProgramidConfig,
    pub genome: GenomeConfig,
    pub alloc: AllocConfig,
    /// Leading label symbols marked executed when a label is read.
    pub max_label_exe_size: usize,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            programids: ProgramidConfig::default(),
            genome: GenomeConfig::default(),
            alloc: AllocConfig::default(),
            max_label_exe_size: 1,
        }
    }
}

impl HardwareConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.programids.max_programids > 0,
            "Programid capacity must be positive"
        );
        anyhow::ensure!(
            self.programids.max_programids <= 1024,
            "Programid capacity too large (max 1024)"
        );
        anyhow::ensure!(self.programids.max_age > 0, "Programid age bound must be positive");

        anyhow::ensure!(self.genome.min_size > 0, "Minimum genome size must be positive");
        anyhow::ensure!(
            self.genome.max_size >= self.genome.min_size,
            "Maximum genome size must not be below the minimum"
        );
        anyhow::ensure!(
            self.genome.max_size <= 1 << 16,
            "Maximum genome size too large (max 65536)"
        );
        anyhow::ensure!(
            self.genome.offspring_size_range >= 1.0,
            "Offspring size range must be at least 1.0"
        );
        anyhow::ensure!(
            self.genome.child_size_range >= 1.0,
            "Child size range must be at least 1.0"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.genome.min_copied_lines),
            "Min copied lines must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.genome.min_exe_lines),
            "Min executed lines must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.max_label_exe_size <= genexpr_data::MAX_LABEL_SIZE,
            "Label execution size exceeds the maximum label size"
        );
        Ok(())
    }

    /// Parses and validates a hardware configuration.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.programids).as_bytes());
        hasher.update(format!("{:?}", self.genome).as_bytes());
        hasher.update(format!("{:?}", self.alloc).as_bytes());
        hasher.update(self.max_label_exe_size.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = HardwareConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.programids.max_programids, 32);
        assert_eq!(config.programids.replacement, ReplacementPolicy::Reject);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = HardwareConfig {
            programids: ProgramidConfig {
                max_programids: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_size_bounds_rejected() {
        let config = HardwareConfig {
            genome: GenomeConfig {
                min_size: 100,
                max_size: 10,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_copied_fraction_out_of_range() {
        let config = HardwareConfig {
            genome: GenomeConfig {
                min_copied_lines: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_partial_override() {
        let config = HardwareConfig::from_toml(
            r#"
            [programids]
            max_programids = 4
            replacement = "evict_highest_usage"
            max_age = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.programids.max_programids, 4);
        assert_eq!(
            config.programids.replacement,
            ReplacementPolicy::EvictHighestUsage
        );
        assert_eq!(config.genome.max_size, 2048);
    }

    #[test]
    fn test_fingerprint_consistency() {
        let a = HardwareConfig::default();
        let mut b = HardwareConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.programids.max_age = 10;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
