//! Relaxation of a small noncommutative problem
//!
//! Minimizes X0*X1 + X1*X0 subject to -X1^2 + X1 + 0.5 >= 0, with X0 a
//! projector (X0^2 = X0), at order 2, and writes the SDP to `examplenc.dat-s`.
//!
//! Usage: cargo run --example example_nc_pol [output-file]

use ncpol_sdpa::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "examplenc.dat-s".to_string());

    // Noncommuting Hermitian variables X0, X1
    let x = Term::symbols(2);

    let objective = x[0].mul_ref(&x[1]) + x[1].mul_ref(&x[0]);
    let inequalities = vec![-x[1].pow(2) + x[1].clone() + 0.5];
    let substitutions = Substitutions::new().with_rule(x[0].pow(2), x[0].clone())?;

    let problem = Problem::new(x, objective, 2).with_inequalities(inequalities);

    let mut relaxation = SdpRelaxation::new(substitutions);
    relaxation.get_relaxation(&problem)?;
    relaxation.write_to_sdpa(&output)?;

    info!(
        "Wrote {} variables in blocks {:?} to {}",
        relaxation.n_elements(),
        relaxation.block_struct(),
        output
    );
    Ok(())
}
