//! Ground-state relaxation of interacting fermions on a square lattice
//!
//! The Hamiltonian follows Corboz, Evenbly, Verstraete and Vidal,
//! "Simulation of interacting fermions with entanglement renormalization"
//! (arXiv:0904.4151). Fermionic operators C_r anticommute, which is encoded as
//! the substitutions C_r C_s -> -C_s C_r for r < s, and satisfy
//! C_r C_r + C_r C_r = 1, which is kept as an equality.
//!
//! Usage: cargo run --release --example hamiltonian [lattice-side] [threads]

use ncpol_sdpa::*;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Lattice neighbors of site `r`: up, down, left, right
fn neighbors(r: usize, side: usize) -> Vec<usize> {
    let (row, column) = (r / side, r % side);
    let mut result = Vec::with_capacity(4);
    if row > 0 {
        result.push(r - side);
    }
    if row + 1 < side {
        result.push(r + side);
    }
    if column > 0 {
        result.push(r - 1);
    }
    if column + 1 < side {
        result.push(r + 1);
    }
    result
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let side: usize = match args.next() {
        Some(arg) => arg
            .parse()
            .map_err(|_| RelaxationError::parse(arg.as_str(), "expected a lattice side"))?,
        None => 2,
    };
    let threads: Option<usize> = match args.next() {
        Some(arg) => Some(
            arg.parse()
                .map_err(|_| RelaxationError::parse(arg.as_str(), "expected a thread count"))?,
        ),
        None => None,
    };

    let n_vars = side * side;
    let (gamma, lambda) = (1.0, 2.0);
    let c = Term::symbols(n_vars);

    let mut hamiltonian = Term::zero();
    for (r, cr) in c.iter().enumerate() {
        hamiltonian = hamiltonian - cr.mul_ref(cr).scale(2.0 * lambda);
        for s in neighbors(r, side) {
            let hop = cr.mul_ref(&c[s]) + c[s].mul_ref(cr);
            hamiltonian = hamiltonian + hop.clone() - hop.scale(gamma);
        }
    }

    let mut substitutions = Substitutions::new();
    let mut equalities = Vec::with_capacity(n_vars);
    for r in 0..n_vars {
        for s in r + 1..n_vars {
            substitutions.insert(c[r].mul_ref(&c[s]), -c[s].mul_ref(&c[r]))?;
        }
        equalities.push(c[r].mul_ref(&c[r]) + c[r].mul_ref(&c[r]) - 1.0);
    }

    let problem = Problem::new(c, hamiltonian, 2).with_equalities(equalities);

    let mut config = RelaxationConfig::new();
    if let Some(threads) = threads {
        config = config.with_num_threads(threads);
    }

    let start = Instant::now();
    let mut relaxation = SdpRelaxation::with_config(substitutions, config);
    relaxation.get_relaxation(&problem)?;
    relaxation.write_to_sdpa("hamiltonian.dat-s")?;

    info!(
        "Lattice {}x{}: {} SDP variables, {} blocks, {:.2?}",
        side,
        side,
        relaxation.n_elements(),
        relaxation.block_struct().len(),
        start.elapsed()
    );
    Ok(())
}
