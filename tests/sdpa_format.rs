// SDPA output written to disk and read back
use ncpol_sdpa::*;
use std::fs;

fn x(i: u32) -> Term {
    Term::var(i)
}

fn sample_relaxation() -> SdpRelaxation {
    let subs = Substitutions::new().with_rule(x(0) * x(0), x(0)).unwrap();
    let problem = Problem::new(Term::symbols(2), x(0) * x(1) + x(1) * x(0), 2)
        .with_inequality(-(x(1) * x(1)) + x(1) + 0.5)
        .with_equality(x(0) * x(1) - x(1) * x(0));
    let mut relaxation = SdpRelaxation::new(subs);
    relaxation.get_relaxation(&problem).unwrap();
    relaxation
}

#[test]
fn test_write_to_file_and_parse() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("examplenc.dat-s");

    let relaxation = sample_relaxation();
    relaxation.write_to_sdpa(&path).unwrap();

    let parsed = SdpaProblem::load(&path).unwrap();
    assert_eq!(parsed.n_vars(), relaxation.n_elements());
    assert_eq!(parsed.block_struct, relaxation.block_struct());
    assert_eq!(&parsed.entries, relaxation.entries());

    let written: Vec<u64> = relaxation.objective().iter().map(|v| v.to_bits()).collect();
    let read: Vec<u64> = parsed.objective.iter().map(|v| v.to_bits()).collect();
    assert_eq!(written, read);
}

#[test]
fn test_rewrite_is_text_identical() {
    let relaxation = sample_relaxation();
    let mut first = Vec::new();
    relaxation.write_sdpa(&mut first, "sample").unwrap();
    let text = String::from_utf8(first).unwrap();

    let mut second = Vec::new();
    SdpaProblem::parse(&text)
        .unwrap()
        .write(&mut second, "sample")
        .unwrap();
    assert_eq!(text, String::from_utf8(second).unwrap());
}

#[test]
fn test_header_lines() {
    let relaxation = sample_relaxation();
    let mut out = Vec::new();
    relaxation.write_sdpa(&mut out, "sample").unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert!(lines[0].starts_with("\"file sample generated by"));
    assert!(lines[0].ends_with('"'));
    assert_eq!(lines[1], "36 = number of vars");
    assert_eq!(lines[2], "5 = number of blocs");
    assert_eq!(lines[3], "(-2, 6, 3, 3, 3) = BlocStructure");
    assert!(lines[4].starts_with('{') && lines[4].ends_with('}'));
    assert_eq!(lines[5], "0\t1\t1\t1\t1");
    assert_eq!(lines[6], "0\t1\t2\t2\t-1");
    assert_eq!(lines.len(), 5 + relaxation.entries().num_entries());
}

#[test]
fn test_write_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.dat-s");
    let err = sample_relaxation().write_to_sdpa(&path).unwrap_err();
    assert!(matches!(err, RelaxationError::Io(_)));
    assert!(fs::metadata(&path).is_err());
}
