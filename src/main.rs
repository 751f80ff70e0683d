use anyhow::Result;
use clap::Parser;
use genexpr_lib::model::config::AppConfig;
use genexpr_lib::model::genome_io;
use genexpr_lib::model::world::World;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genome file: instruction names or a hex string
    #[arg(short, long, default_value = "genomes/default-gx.org")]
    genome: PathBuf,

    /// Instruction set file; the built-in library when omitted
    #[arg(short, long)]
    inst_set: Option<PathBuf>,

    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Cycles to run, overriding the config
    #[arg(long)]
    cycles: Option<u64>,

    /// Organisms to run, overriding the config
    #[arg(short, long)]
    organisms: Option<usize>,

    /// Base random seed, overriding the config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Print every machine's status after the run
    #[arg(long)]
    dump: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    genexpr_core::init_logging();
    let args = Args::parse();

    let mut config = AppConfig::load(&args.config)?;
    if let Some(cycles) = args.cycles {
        config.run.cycles = cycles;
    }
    if let Some(organisms) = args.organisms {
        config.run.organisms = organisms;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }

    let inst_set = genome_io::load_inst_set(args.inst_set.as_deref())?;
    let genome = genome_io::load_genome(&args.genome, &inst_set)?;
    let cycles = config.run.cycles;
    let mut world = World::new(config, inst_set, genome)?;
    let ran = world.run(cycles);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if args.dump {
        world.dump(&mut out)?;
    }
    let report = world.report()?;
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        let offspring: usize = report.organisms.iter().map(|o| o.offspring).sum();
        let alive = report.organisms.iter().filter(|o| o.alive).count();
        writeln!(out, "Ran {ran} cycles over {} organisms.", report.organisms.len())?;
        writeln!(out, "Alive: {alive}  Offspring: {offspring}")?;
        writeln!(out, "Config: {}", report.config_fingerprint)?;
        writeln!(out, "State:  {}", report.state_hash)?;
    }
    Ok(())
}
