//! Benchmark: relaxation generation
//!
//! Problems:
//! - All-pairs quadratic: objective sum_{i,j} X_i X_j over projectors, with
//!   inequalities X_i X_{i-1} >= 0.5, order 1
//! - Fermionic lattice: ground state of a hopping Hamiltonian on an L x L
//!   lattice with anticommutation substitutions, order 2
//!
//! Each problem runs with row-major and concurrent dictionary registration.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ncpol_sdpa::*;
use std::time::Duration;

/// All-pairs quadratic benchmark on `n` projectors
fn create_pairs_problem(n: usize) -> (Problem, Substitutions) {
    let x = Term::symbols(n);

    let mut objective = Term::zero();
    for xi in &x {
        for xj in &x {
            objective = objective + xi.mul_ref(xj);
        }
    }

    let inequalities: Vec<Term> = (1..n).map(|i| x[i].mul_ref(&x[i - 1]) - 0.5).collect();

    let mut substitutions = Substitutions::new();
    for xi in &x {
        substitutions
            .insert(xi.pow(2), xi.clone())
            .expect("projector rule");
    }

    let problem = Problem::new(x, objective, 1).with_inequalities(inequalities);
    (problem, substitutions)
}

/// Lattice neighbors of site `r`: up, down, left, right
fn lattice_neighbors(r: usize, side: usize) -> Vec<usize> {
    let (row, column) = (r / side, r % side);
    let mut neighbors = Vec::with_capacity(4);
    if row > 0 {
        neighbors.push(r - side);
    }
    if row + 1 < side {
        neighbors.push(r + side);
    }
    if column > 0 {
        neighbors.push(r - 1);
    }
    if column + 1 < side {
        neighbors.push(r + 1);
    }
    neighbors
}

/// Fermionic hopping Hamiltonian on a `side x side` lattice
fn create_lattice_problem(side: usize) -> (Problem, Substitutions) {
    let (gamma, lambda) = (1.0, 2.0);
    let c = Term::symbols(side * side);

    let mut hamiltonian = Term::zero();
    for (r, cr) in c.iter().enumerate() {
        hamiltonian = hamiltonian - cr.mul_ref(cr).scale(2.0 * lambda);
        for s in lattice_neighbors(r, side) {
            let hop = cr.mul_ref(&c[s]) + c[s].mul_ref(cr);
            hamiltonian = hamiltonian + hop.clone() - hop.scale(gamma);
        }
    }

    let mut substitutions = Substitutions::new();
    let mut equalities = Vec::with_capacity(c.len());
    for r in 0..c.len() {
        for s in r + 1..c.len() {
            substitutions
                .insert(c[r].mul_ref(&c[s]), -c[s].mul_ref(&c[r]))
                .expect("anticommutation rule");
        }
        equalities.push(c[r].mul_ref(&c[r]).scale(2.0) - 1.0);
    }

    let problem = Problem::new(c, hamiltonian, 2).with_equalities(equalities);
    (problem, substitutions)
}

fn bench_problem(
    c: &mut Criterion,
    group_name: &str,
    sizes: &[usize],
    create: fn(usize) -> (Problem, Substitutions),
) {
    let mut group = c.benchmark_group(group_name);
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    for &size in sizes {
        let (problem, substitutions) = create(size);
        for discovery in [DiscoveryOrder::RowMajor, DiscoveryOrder::Concurrent] {
            let id = BenchmarkId::new(format!("{:?}", discovery), size);
            group.bench_with_input(id, &problem, |b, problem| {
                b.iter(|| {
                    let config = RelaxationConfig::new().with_discovery(discovery);
                    let mut relaxation =
                        SdpRelaxation::with_config(substitutions.clone(), config);
                    relaxation.get_relaxation(problem).expect("relaxation");
                    black_box(relaxation.n_elements())
                });
            });
        }
    }

    group.finish();
}

/// Benchmark the all-pairs quadratic problem
fn bench_pairs(c: &mut Criterion) {
    bench_problem(c, "pairs_order1", &[10, 20], create_pairs_problem);
}

/// Benchmark the lattice Hamiltonian
fn bench_lattice(c: &mut Criterion) {
    bench_problem(c, "lattice_order2", &[2, 3], create_lattice_problem);
}

/// Benchmark writing the SDPA text of an already built relaxation
fn bench_write(c: &mut Criterion) {
    let (problem, substitutions) = create_lattice_problem(3);
    let mut relaxation = SdpRelaxation::new(substitutions);
    relaxation.get_relaxation(&problem).expect("relaxation");

    c.bench_function("write_sdpa_lattice3", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(1 << 20);
            relaxation.write_sdpa(&mut out, "bench").expect("write");
            black_box(out.len())
        });
    });
}

criterion_group!(benches, bench_pairs, bench_lattice, bench_write);
criterion_main!(benches);
