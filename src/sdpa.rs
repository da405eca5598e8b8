//! SDPA sparse format
//!
//! Layout written by [`write_sdpa`]:
//!
//! ```text
//! "file <name> generated by ncpol-sdpa"
//! 36 = number of vars
//! 3 = number of blocs
//! (-2, 6, 3) = BlocStructure
//! {0, 0, 1, 1, 0, ...}
//! 0	1	1	1	1
//! 1	1	1	1	1
//! ...
//! ```
//!
//! Each entry line is `k block row column value`, tab separated; `k = 0` is
//! the constant matrix. [`SdpaProblem::parse`] reads the same layout back.

use crate::error::{RelaxationError, Result};
use crate::relaxation::{Entry, SdpRelaxation, SparseEntries};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Format a coefficient; negative zero is written as `0`
fn format_value(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Write an SDP in SDPA sparse format.
pub fn write_sdpa<W: Write>(
    out: &mut W,
    name: &str,
    block_struct: &[i64],
    objective: &[f64],
    entries: &SparseEntries,
) -> Result<()> {
    writeln!(out, "\"file {} generated by {}\"", name, crate::NAME)?;
    writeln!(out, "{} = number of vars", objective.len())?;
    writeln!(out, "{} = number of blocs", block_struct.len())?;

    let blocks: Vec<String> = block_struct.iter().map(i64::to_string).collect();
    writeln!(out, "({}) = BlocStructure", blocks.join(", "))?;

    let mut line = String::with_capacity(objective.len() * 4 + 2);
    line.push('{');
    for (i, value) in objective.iter().enumerate() {
        if i > 0 {
            line.push_str(", ");
        }
        line.push_str(&format_value(*value));
    }
    line.push('}');
    writeln!(out, "{line}")?;

    for (k, entry) in entries.iter() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            k,
            entry.block_index,
            entry.row,
            entry.column,
            format_value(entry.value)
        )?;
    }
    Ok(())
}

impl SdpRelaxation {
    /// Write the relaxation in SDPA sparse format to `out`
    pub fn write_sdpa<W: Write>(&self, out: &mut W, name: &str) -> Result<()> {
        write_sdpa(out, name, self.block_struct(), self.objective(), self.entries())
    }

    /// Write the relaxation to the file at `path`
    pub fn write_to_sdpa<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Writing SDPA file {}", path.display());
        let mut out = BufWriter::new(File::create(path)?);
        self.write_sdpa(&mut out, &path.display().to_string())?;
        out.flush()?;
        Ok(())
    }
}

/// An SDP read back from SDPA sparse format
#[derive(Clone, Debug, PartialEq)]
pub struct SdpaProblem {
    /// Block sizes; negative entries denote diagonal blocks
    pub block_struct: Vec<i64>,
    /// Objective coefficient of each decision variable
    pub objective: Vec<f64>,
    /// Constraint matrix entries per decision variable
    pub entries: SparseEntries,
}

impl SdpaProblem {
    /// Number of decision variables
    pub fn n_vars(&self) -> usize {
        self.objective.len()
    }

    /// Write back in SDPA sparse format
    pub fn write<W: Write>(&self, out: &mut W, name: &str) -> Result<()> {
        write_sdpa(out, name, &self.block_struct, &self.objective, &self.entries)
    }

    /// Read a file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Parse SDPA sparse text.
    ///
    /// Leading lines starting with `"` or `*` are comments. Header values may
    /// be followed by `=` and free text; list separators may be commas or
    /// whitespace, with optional brackets.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .skip_while(|line| line.starts_with('"') || line.starts_with('*'));

        let mut next_line = |what: &str| {
            lines
                .next()
                .ok_or_else(|| RelaxationError::parse("", format!("missing {what}")))
        };

        let n_vars_line = next_line("number of variables")?;
        let n_vars: usize = parse_header(n_vars_line)?;
        let n_blocks_line = next_line("number of blocks")?;
        let n_blocks: usize = parse_header(n_blocks_line)?;

        let block_line = next_line("block structure")?;
        let block_struct: Vec<i64> = parse_list(header_value(block_line), block_line)?;
        if block_struct.len() != n_blocks {
            return Err(RelaxationError::parse(
                block_line,
                format!("expected {} blocks, found {}", n_blocks, block_struct.len()),
            ));
        }

        let objective_line = next_line("objective")?;
        let objective: Vec<f64> = parse_list(objective_line, objective_line)?;
        if objective.len() != n_vars {
            return Err(RelaxationError::parse(
                objective_line,
                format!("expected {} coefficients, found {}", n_vars, objective.len()),
            ));
        }

        let mut entries = SparseEntries::new(n_vars);
        for line in lines {
            let (k, entry) = parse_entry(line, &block_struct)?;
            if k > n_vars {
                return Err(RelaxationError::parse(line, "variable index out of range"));
            }
            entries.push(k, entry);
        }

        Ok(SdpaProblem {
            block_struct,
            objective,
            entries,
        })
    }
}

/// The part of a header line before `=`
fn header_value(line: &str) -> &str {
    line.split('=').next().unwrap_or(line).trim()
}

fn parse_header(line: &str) -> Result<usize> {
    let value = header_value(line);
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()
        .unwrap_or(value)
        .parse()
        .map_err(|_| RelaxationError::parse(line, "expected a count"))
}

fn parse_list<T: std::str::FromStr>(list: &str, line: &str) -> Result<Vec<T>> {
    list.split(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')' | '{' | '}'))
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .map_err(|_| RelaxationError::parse(line, format!("invalid value {item:?}")))
        })
        .collect()
}

fn parse_entry(line: &str, block_struct: &[i64]) -> Result<(usize, Entry)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(RelaxationError::parse(line, "expected 5 fields"));
    }
    let index = |i: usize| {
        fields[i]
            .parse::<usize>()
            .map_err(|_| RelaxationError::parse(line, format!("invalid index {:?}", fields[i])))
    };
    let k = index(0)?;
    let entry = Entry {
        block_index: index(1)?,
        row: index(2)?,
        column: index(3)?,
        value: fields[4]
            .parse()
            .map_err(|_| RelaxationError::parse(line, "invalid value"))?,
    };

    let size = match entry.block_index.checked_sub(1).and_then(|b| block_struct.get(b)) {
        Some(size) => size.unsigned_abs() as usize,
        None => return Err(RelaxationError::parse(line, "block index out of range")),
    };
    if entry.row == 0 || entry.column == 0 || entry.row > size || entry.column > size {
        return Err(RelaxationError::parse(line, "cell outside its block"));
    }
    Ok((k, entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SdpaProblem {
        let mut entries = SparseEntries::new(3);
        entries.push(0, Entry::at_cell(1, 0, 0, 1.0));
        entries.push(1, Entry::at_cell(1, 0, 0, 1.0));
        entries.push(1, Entry::at_cell(2, 0, 1, 0.5));
        entries.push(3, Entry::at_cell(2, 1, 1, -0.25));
        SdpaProblem {
            block_struct: vec![-1, 2],
            objective: vec![0.0, 1.5, -0.0],
            entries,
        }
    }

    #[test]
    fn test_write_layout() {
        let mut out = Vec::new();
        sample().write(&mut out, "demo.dat-s").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "\"file demo.dat-s generated by ncpol-sdpa\"");
        assert_eq!(lines[1], "3 = number of vars");
        assert_eq!(lines[2], "2 = number of blocs");
        assert_eq!(lines[3], "(-1, 2) = BlocStructure");
        assert_eq!(lines[4], "{0, 1.5, 0}");
        assert_eq!(lines[5], "0\t1\t1\t1\t1");
        assert_eq!(lines[7], "1\t2\t1\t2\t0.5");
        assert_eq!(lines[8], "3\t2\t2\t2\t-0.25");
        assert_eq!(lines.len(), 9);
    }

    #[test]
    fn test_parse_written() {
        let mut out = Vec::new();
        let original = sample();
        original.write(&mut out, "demo").unwrap();
        let parsed = SdpaProblem::parse(&String::from_utf8(out).unwrap()).unwrap();

        assert_eq!(parsed.n_vars(), 3);
        assert_eq!(parsed.block_struct, original.block_struct);
        assert_eq!(parsed.objective, vec![0.0, 1.5, 0.0]);
        assert_eq!(parsed.entries, original.entries);
    }

    #[test]
    fn test_parse_loose_layout() {
        let text = "* comment\n2 =mDIM\n1\n{3}\n1.0 -2.0\n0 1 1 1 1.0\n2 1 3 3 2.0\n";
        let parsed = SdpaProblem::parse(text).unwrap();
        assert_eq!(parsed.block_struct, vec![3]);
        assert_eq!(parsed.objective, vec![1.0, -2.0]);
        assert_eq!(parsed.entries.sequence(2)[0].value, 2.0);
    }

    #[test]
    fn test_parse_errors() {
        assert!(SdpaProblem::parse("").is_err());
        // Block count mismatch
        assert!(SdpaProblem::parse("1\n2\n(1)\n{0}\n").is_err());
        // Objective length mismatch
        assert!(SdpaProblem::parse("2\n1\n(1)\n{0}\n").is_err());
        // Cell outside the block
        assert!(SdpaProblem::parse("1\n1\n(1)\n{0}\n1 1 2 2 1.0\n").is_err());
        // Variable out of range
        assert!(SdpaProblem::parse("1\n1\n(1)\n{0}\n2 1 1 1 1.0\n").is_err());
    }
}
