//! Reading and writing genome and instruction-set files.
//!
//! A genome file lists instruction names separated by whitespace, with `#`
//! starting a comment. A file whose only content is a hex string is read as
//! raw opcodes instead.

use anyhow::{Context, Result};
use genexpr_core::InstSet;
use genexpr_data::Genome;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// The library-wide set, or the one described by `path`.
pub fn load_inst_set(path: Option<&Path>) -> Result<Arc<InstSet>> {
    match path {
        None => Ok(InstSet::default_gx()),
        Some(path) => {
            let set = InstSet::load(path)
                .with_context(|| format!("loading instruction set {}", path.display()))?;
            Ok(Arc::new(set))
        }
    }
}

pub fn parse_genome(text: &str, inst_set: &InstSet) -> Result<Genome> {
    let trimmed = text.trim();
    let genome = if is_hex(trimmed) {
        let genome = Genome::from_hex(trimmed)?;
        anyhow::ensure!(
            genome.iter().all(|inst| inst.op() < inst_set.len()),
            "hex genome uses opcodes outside the instruction set"
        );
        genome
    } else {
        inst_set.parse_genome(text)?
    };
    anyhow::ensure!(!genome.is_empty(), "genome is empty");
    Ok(genome)
}

pub fn load_genome<P: AsRef<Path>>(path: P, inst_set: &InstSet) -> Result<Genome> {
    let path = path.as_ref();
    let text =
        fs::read_to_string(path).with_context(|| format!("reading genome {}", path.display()))?;
    parse_genome(&text, inst_set).with_context(|| format!("in genome {}", path.display()))
}

/// Writes `genome` one instruction name per line.
pub fn save_genome<P: AsRef<Path>>(path: P, genome: &Genome, inst_set: &InstSet) -> Result<()> {
    let path = path.as_ref();
    let mut text = inst_set.genome_to_text(genome);
    text.push('\n');
    fs::write(path, text).with_context(|| format!("writing genome {}", path.display()))
}

fn is_hex(text: &str) -> bool {
    !text.is_empty() && text.len() % 2 == 0 && text.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_with_comments() {
        let set = InstSet::default_gx();
        let genome = parse_genome("# gene\ninc  dec # tail\nput\n", &set).unwrap();
        assert_eq!(genome.len(), 3);
        assert_eq!(genome[0], set.inst("inc").unwrap());
    }

    #[test]
    fn test_hex_genome() {
        let set = InstSet::default_gx();
        let genome = parse_genome("00010203\n", &set).unwrap();
        assert_eq!(genome, Genome::from_ops(&[0, 1, 2, 3]));
    }

    #[test]
    fn test_empty_genome_rejected() {
        let set = InstSet::default_gx();
        assert!(parse_genome("# nothing\n", &set).is_err());
    }

    #[test]
    fn test_unknown_name_rejected() {
        let set = InstSet::default_gx();
        let err = parse_genome("inc frobnicate", &set).unwrap_err();
        assert!(format!("{err:#}").contains("frobnicate"));
    }

    #[test]
    fn test_save_then_load() {
        let set = InstSet::default_gx();
        let genome = set.parse_genome("bind nop-A p-copy").unwrap();
        let path = std::env::temp_dir().join(format!("genexpr-{}.org", uuid::Uuid::new_v4()));
        save_genome(&path, &genome, &set).unwrap();
        assert_eq!(load_genome(&path, &set).unwrap(), genome);
        let _ = fs::remove_file(path);
    }
}
