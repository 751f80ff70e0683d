//! # Genexpr Core
//!
//! A gene-expression virtual CPU for digital organisms.
//!
//! An organism's genome starts as a single origin programid. Programids
//! allocate new programids, bind their read heads to complementary label
//! sites in genomic programids, and copy code across into protein
//! programids that then execute alongside their parent. Offspring are
//! produced either by the classic allocate/copy/divide cycle in the origin's
//! own memory or by dividing off a fully copied genomic programid.
//!
//! This crate contains:
//! - The instruction library and weighted instruction sets
//! - Memory spaces with per-cell copied/executed/injected flags
//! - Heads, labels and complementary label search
//! - Programid lifecycle with capacity, eviction and aging
//! - The [`GxHardware`] cycle loop and its instruction handlers
//! - Hardware configuration, errors, metrics and structured logging
//!
//! ## Example
//!
//! ```
//! use genexpr_core::{ExecContext, GxHardware, HardwareConfig, InstSet, RecordingOrganism};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let inst_set = InstSet::default_gx();
//! let genome = inst_set.parse_genome("inc inc put").unwrap();
//! let mut hardware = GxHardware::new(HardwareConfig::default(), inst_set, genome);
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut organism = RecordingOrganism::new();
//! for _ in 0..3 {
//!     let mut ctx = ExecContext::new(&mut rng, &mut organism);
//!     hardware.single_process(&mut ctx);
//! }
//! assert_eq!(organism.outputs, vec![2]);
//! ```

/// Hardware limits, allocation and replacement policies
pub mod config;
/// Error type for instruction sets, memory and consistency checks
pub mod error;
/// The gene-expression machine and its instruction handlers
pub mod hardware;
/// Heads and label search
pub mod head;
/// Instruction library and weighted instruction sets
pub mod inst_set;
/// Callbacks from the hardware to its organism
pub mod interface;
/// Flagged memory spaces
pub mod memory;
/// Performance metrics collection and logging
pub mod metrics;
/// Programids and label sites
pub mod programid;
/// Bounded per-programid stack
pub mod stack;

pub use config::{AllocMethod, HardwareConfig, ReplacementPolicy};
pub use error::HardwareError;
pub use hardware::{GxHardware, Step};
pub use head::{Direction, Head};
pub use inst_set::{InstSet, Op};
pub use interface::{ExecContext, OrganismInterface, RecordingOrganism};
pub use memory::MemorySpace;
pub use metrics::{init_logging, Metrics};
pub use programid::{MatchSite, Programid};
pub use genexpr_data;
