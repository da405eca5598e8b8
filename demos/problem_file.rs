//! Relaxation driven by a JSON problem file
//!
//! Usage: cargo run --example problem_file <problem.json> [output.dat-s]
//!
//! Without arguments a built-in problem is printed as JSON and relaxed, so the
//! output doubles as a template for new problem files.

use ncpol_sdpa::*;
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TEMPLATE: &str = r#"{
    "variables": ["A", "B"],
    "objective": "A*B + B*A",
    "inequalities": ["-B^2 + B + 0.5"],
    "equalities": [],
    "substitutions": [{"pattern": "A^2", "replacement": "A"}],
    "order": 2,
    "config": {"discovery": "row_major"}
}"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let file = match args.next() {
        Some(path) => ProblemFile::load(path)?,
        None => {
            let file = ProblemFile::from_json(TEMPLATE)?;
            println!("{}", file.to_json()?);
            file
        }
    };

    info!(
        "{} variables, {} inequalities, {} equalities, {} substitutions, order {}",
        file.variables.len(),
        file.inequalities.len(),
        file.equalities.len(),
        file.substitutions.len(),
        file.order
    );

    let relaxation = file.relax()?;
    match args.next() {
        Some(output) => relaxation.write_to_sdpa(output)?,
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            relaxation.write_sdpa(&mut out, "stdout")?;
            out.flush()?;
        }
    }
    Ok(())
}
