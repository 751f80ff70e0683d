use criterion::{black_box, criterion_group, criterion_main, Criterion};
use genexpr_core::{
    ExecContext, GxHardware, HardwareConfig, InstSet, Programid, RecordingOrganism,
};
use genexpr_data::{Capabilities, CodeLabel};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const LOOP: &str = "label nop-A nop-B inc inc add nop-C push pop nop-B \
                    if-less shift-l dec goto nop-A nop-B";

/// Benchmark single cycles on a lone origin programid.
fn bench_single_process(c: &mut Criterion) {
    let inst_set = InstSet::default_gx();
    let genome = inst_set.parse_genome(LOOP).unwrap();
    let mut hardware = GxHardware::new(HardwareConfig::default(), inst_set, genome);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut organism = RecordingOrganism::new();

    c.bench_function("single_process", |b| {
        b.iter(|| {
            let mut ctx = ExecContext::new(&mut rng, &mut organism);
            hardware.single_process(black_box(&mut ctx));
        })
    });
}

/// Benchmark single cycles with a full set of executing programids.
fn bench_single_process_crowded(c: &mut Criterion) {
    let inst_set = InstSet::default_gx();
    let genome = inst_set.parse_genome(LOOP).unwrap();
    let mut hardware = GxHardware::new(HardwareConfig::default(), inst_set, genome);
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut organism = RecordingOrganism::new();
    {
        let mut ctx = ExecContext::new(&mut rng, &mut organism);
        for _ in 0..16 {
            hardware.process_bonus_inst(
                &mut ctx,
                hardware.inst_set().inst("new-exe-programid").unwrap(),
            );
        }
    }

    c.bench_function("single_process_crowded", |b| {
        b.iter(|| {
            let mut ctx = ExecContext::new(&mut rng, &mut organism);
            hardware.single_process(black_box(&mut ctx));
        })
    });
}

/// Benchmark instruction-set parsing of the full library.
fn bench_inst_set_parse(c: &mut Criterion) {
    let text = InstSet::default_gx().to_config();

    c.bench_function("inst_set_parse", |b| {
        b.iter(|| {
            let set = InstSet::parse(black_box(&text)).unwrap();
            black_box(set)
        })
    });
}

/// Benchmark label-site scanning across a genomic programid.
fn bench_sites(c: &mut Criterion) {
    let inst_set = InstSet::default_gx();
    let gene = inst_set
        .parse_genome(&"site nop-A nop-B inc dec nop-C ".repeat(32))
        .unwrap();
    let programid = Programid::new(0, 0, Capabilities::GENOMIC, &gene, gene.len() * 2);
    let label = CodeLabel::from_nops(&[1, 2]);

    c.bench_function("programid_sites", |b| {
        b.iter(|| {
            let sites = programid.sites(black_box(&label), &inst_set);
            black_box(sites)
        })
    });
}

criterion_group!(
    benches,
    bench_single_process,
    bench_single_process_crowded,
    bench_inst_set_parse,
    bench_sites
);
criterion_main!(benches);
