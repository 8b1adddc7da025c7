#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A reader and writer for the DIMACS CNF file format.
//!
//! The format typically includes:
//! - Comment lines starting with 'c'. By convention `c <id> <name>` attaches a
//!   symbolic name to variable `<id>`; these entries are collected into a
//!   `VariableMap`.
//! - A problem line 'p cnf <`num_variables`> <`num_clauses`>' that precedes
//!   every clause.
//! - Clause data: whitespace-separated nonzero integers, each clause terminated
//!   by '0'. A clause may span several lines.
//! - An optional '%' line to indicate end-of-data (used by the SATLIB
//!   benchmark families).
//!
//! Structural violations are reported as `DimacsError`; the reader never tries
//! to repair a file.

use crate::error::DimacsError;
use crate::sat::clause::Clause;
use crate::sat::cnf::{Cnf, VariableMap};
use crate::sat::literal::{Literal, Variable};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, warn};

/// A parsed DIMACS file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dimacs {
    pub cnf: Cnf,
    pub names: VariableMap,
}

/// Parses DIMACS data from a `BufRead` source.
///
/// # Errors
///
/// Any `DimacsError`: I/O failure, a missing, repeated or invalid header,
/// clause data before the header, a non-integer token, a literal whose
/// variable exceeds the declared count, or an unterminated final clause.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Dimacs, DimacsError> {
    let mut names = VariableMap::new();
    let mut header: Option<(usize, usize)> = None;
    let mut clauses = Vec::new();
    let mut current = Clause::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();

        match trimmed.chars().next() {
            None => {}
            Some('%') => break,
            Some('c') => read_name(trimmed, &mut names),
            Some('p') => {
                if header.is_some() {
                    return Err(DimacsError::DuplicateHeader { line: line_no });
                }
                header = Some(read_header(trimmed, line_no)?);
            }
            Some(_) => {
                let Some((num_vars, _)) = header else {
                    return Err(DimacsError::ClauseBeforeHeader { line: line_no });
                };

                for token in trimmed.split_whitespace() {
                    let value: i32 = token.parse().map_err(|_| DimacsError::InvalidLiteral {
                        line: line_no,
                        token: token.to_string(),
                    })?;

                    if value == 0 {
                        if current.is_empty() {
                            warn!(line = line_no, "empty clause in input");
                        }
                        clauses.push(std::mem::take(&mut current));
                        continue;
                    }

                    let literal = Literal::from_i32(value)
                        .filter(|l| l.variable() as usize <= num_vars)
                        .ok_or(DimacsError::VariableOutOfRange {
                            line: line_no,
                            literal: value,
                            declared: num_vars,
                        })?;
                    current.push(literal);
                }
            }
        }
    }

    let (num_vars, num_clauses) = header.ok_or(DimacsError::MissingHeader)?;

    if !current.is_empty() {
        return Err(DimacsError::MissingTerminator);
    }

    if clauses.len() != num_clauses {
        warn!(
            declared = num_clauses,
            found = clauses.len(),
            "clause count differs from header"
        );
    }

    debug!(
        variables = num_vars,
        clauses = clauses.len(),
        names = names.len(),
        "parsed DIMACS formula"
    );

    Ok(Dimacs {
        cnf: Cnf {
            clauses,
            num_vars,
            num_clauses,
        },
        names,
    })
}

fn read_name(line: &str, names: &mut VariableMap) {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("c") {
        return;
    }
    let (Some(id), Some(name)) = (parts.next(), parts.next()) else {
        return;
    };
    if let Ok(var) = id.parse::<Variable>() {
        if var > 0 {
            names.insert(var, name);
        }
    }
}

fn read_header(line: &str, line_no: usize) -> Result<(usize, usize), DimacsError> {
    let invalid = || DimacsError::InvalidHeader {
        line: line_no,
        text: line.to_string(),
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 4 || parts[0] != "p" || parts[1] != "cnf" {
        return Err(invalid());
    }

    let num_vars = parts[2].parse::<usize>().map_err(|_| invalid())?;
    let num_clauses = parts[3].parse::<usize>().map_err(|_| invalid())?;
    if i32::try_from(num_vars).is_err() {
        return Err(invalid());
    }
    Ok((num_vars, num_clauses))
}

/// Parses a DIMACS string.
///
/// # Errors
///
/// See `parse_dimacs`.
pub fn parse_str(input: &str) -> Result<Dimacs, DimacsError> {
    parse_dimacs(input.as_bytes())
}

/// Parses a DIMACS CNF file specified by its path.
///
/// # Errors
///
/// `DimacsError::Io` if the file cannot be opened or read, otherwise see
/// `parse_dimacs`.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Dimacs, DimacsError> {
    let file = File::open(path)?;
    parse_dimacs(BufReader::new(file))
}

/// Writes `cnf` in DIMACS format, preceded by the variable names as
/// `c <id> <name>` comments when a map is given.
///
/// The header keeps the declared variable count and reports the actual
/// number of clauses.
///
/// # Errors
///
/// Propagates write failures of `writer`.
pub fn write_dimacs<W: Write>(
    writer: &mut W,
    cnf: &Cnf,
    names: Option<&VariableMap>,
) -> io::Result<()> {
    if let Some(names) = names {
        for (var, name) in names.iter() {
            writeln!(writer, "c {var} {name}")?;
        }
    }
    write!(writer, "{cnf}")
}

/// Renders `cnf` as a DIMACS string. See `write_dimacs`.
#[must_use]
pub fn to_dimacs_string(cnf: &Cnf, names: Option<&VariableMap>) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_dimacs(&mut buf, cnf, names);
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::Itertools;

    #[test]
    fn test_parse_simple_dimacs() {
        let dimacs = parse_str(
            "c This is a comment\n\
             p cnf 3 2\n\
             1 -2 0\n\
             2 3 0\n",
        )
        .unwrap();

        assert_eq!(dimacs.cnf.clauses.len(), 2);
        assert_eq!(dimacs.cnf.num_vars, 3);
        assert_eq!(dimacs.cnf.clauses[0].to_i32s(), vec![1, -2]);
        assert_eq!(dimacs.cnf.clauses[1].to_i32s(), vec![2, 3]);
        assert!(dimacs.names.is_empty());
    }

    #[test]
    fn test_parse_variable_names() {
        let dimacs = parse_str(
            "c 1 NET\n\
             c 2 USB_SUPPORT\n\
             c generated by a feature-model exporter\n\
             p cnf 2 1\n\
             1 2 0\n",
        )
        .unwrap();

        assert_eq!(dimacs.names.len(), 2);
        assert_eq!(dimacs.names.name(2), Some("USB_SUPPORT"));
        assert_eq!(dimacs.names.variable("NET"), Some(1));
    }

    #[test]
    fn test_parse_dimacs_with_empty_lines_and_end_marker() {
        let dimacs = parse_str(
            "p cnf 2 2\n\
             \n\
             1 0\n\
             \n\
             -2 0\n\
             %\n\
             0\n",
        )
        .unwrap();

        assert_eq!(dimacs.cnf.clauses.len(), 2);
        assert_eq!(dimacs.cnf.clauses[1].to_i32s(), vec![-2]);
    }

    #[test]
    fn test_clause_spanning_lines() {
        let dimacs = parse_str("p cnf 4 2\n1 2\n3 0 -4\n0\n").unwrap();
        let clauses = dimacs.cnf.iter().map(Clause::to_i32s).collect_vec();
        assert_eq!(clauses, vec![vec![1, 2, 3], vec![-4]]);
    }

    #[test]
    fn test_empty_clause_is_kept() {
        let dimacs = parse_str("p cnf 1 2\n1 0\n0\n").unwrap();
        assert_eq!(dimacs.cnf.len(), 2);
        assert!(dimacs.cnf.clauses[1].is_empty());
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(parse_str("c only comments\n"), Err(DimacsError::MissingHeader)));
        assert!(matches!(
            parse_str("1 2 0\n"),
            Err(DimacsError::ClauseBeforeHeader { line: 1 })
        ));
    }

    #[test]
    fn test_invalid_header() {
        assert!(matches!(
            parse_str("p cnf x 1\n1 0\n"),
            Err(DimacsError::InvalidHeader { line: 1, .. })
        ));
        assert!(matches!(
            parse_str("p dnf 1 1\n1 0\n"),
            Err(DimacsError::InvalidHeader { .. })
        ));
        assert!(matches!(
            parse_str("p cnf 1 1\np cnf 1 1\n1 0\n"),
            Err(DimacsError::DuplicateHeader { line: 2 })
        ));
    }

    #[test]
    fn test_malformed_literal() {
        let err = parse_str("p cnf 2 1\n1 abc 0\n").unwrap_err();
        assert!(matches!(err, DimacsError::InvalidLiteral { line: 2, ref token } if token == "abc"));
    }

    #[test]
    fn test_missing_terminator() {
        assert!(matches!(
            parse_str("p cnf 2 2\n1 0\n-2\n"),
            Err(DimacsError::MissingTerminator)
        ));
    }

    #[test]
    fn test_variable_out_of_range() {
        assert!(matches!(
            parse_str("p cnf 2 1\n1 -3 0\n"),
            Err(DimacsError::VariableOutOfRange { line: 2, literal: -3, declared: 2 })
        ));
    }

    #[test]
    fn test_most_negative_integer_does_not_end_clause() {
        assert!(matches!(
            parse_str("p cnf 3 1\n1 -2147483648 2 0\n"),
            Err(DimacsError::VariableOutOfRange {
                line: 2,
                literal: i32::MIN,
                declared: 3
            })
        ));
        assert!(matches!(
            parse_str(&format!("p cnf {} 1\n1 -2147483648 0\n", i32::MAX)),
            Err(DimacsError::VariableOutOfRange { literal: i32::MIN, .. })
        ));
    }

    #[test]
    fn test_clause_count_mismatch_is_tolerated() {
        let dimacs = parse_str("p cnf 2 5\n1 0\n").unwrap();
        assert_eq!(dimacs.cnf.len(), 1);
        assert_eq!(dimacs.cnf.num_clauses, 5);
    }

    #[test]
    fn test_write_with_names() {
        let dimacs = parse_str("c 2 B\nc 1 A\np cnf 3 2\n1 -2 0\n3 0\n").unwrap();
        let text = to_dimacs_string(&dimacs.cnf, Some(&dimacs.names));
        assert_eq!(text, "c 1 A\nc 2 B\np cnf 3 2\n1 -2 0\n3 0\n");

        let reparsed = parse_str(&text).unwrap();
        assert_eq!(reparsed.cnf.clauses, dimacs.cnf.clauses);
        assert_eq!(reparsed.names, dimacs.names);
    }
}
