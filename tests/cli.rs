use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const NAMED: &str = "c 1 USB\nc 2 NET\np cnf 3 3\n1 0\n-1 2 0\n2 3 0\n";

fn backbone(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_backbone"))
        .args(args)
        .env_remove("BACKBONE_SOLVER")
        .output()
        .unwrap()
}

fn write_formula(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_report_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "named.cnf", NAMED);

    let out = backbone(&[&input]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout), "+NET\n+USB\n");
}

#[test]
fn test_file_writes_report_and_simplified_formula() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "named.cnf", NAMED);
    let report = dir.path().join("named.backbone");
    let simplified = dir.path().join("named.simplified.cnf");

    let out = backbone(&[
        "file",
        "--input",
        &input,
        "--backbone",
        path_str(&report),
        "--output",
        path_str(&simplified),
        "--stats",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(out.stdout.is_empty());
    assert_eq!(fs::read_to_string(&report).unwrap(), "+NET\n+USB\n");
    assert_eq!(
        fs::read_to_string(&simplified).unwrap(),
        "c 1 USB\nc 2 NET\np cnf 3 2\n2 0\n1 0\n"
    );
    assert!(String::from_utf8_lossy(&out.stderr).contains("Backbone size"));
}

#[test]
fn test_unsatisfiable_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "unsat.cnf", "p cnf 1 2\n1 0\n-1 0\n");
    let report = dir.path().join("unsat.backbone");
    let simplified = dir.path().join("unsat.simplified.cnf");

    let out = backbone(&[
        "file",
        "--input",
        &input,
        "--backbone",
        path_str(&report),
        "--output",
        path_str(&simplified),
    ]);
    assert_eq!(out.status.code(), Some(20));
    assert!(String::from_utf8_lossy(&out.stderr).contains("formula unsatisfiable"));
    assert!(!report.exists());
    assert!(!simplified.exists());
}

#[test]
fn test_malformed_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "bad.cnf", "p cnf 2 1\n1 x 0\n");
    let simplified = dir.path().join("bad.simplified.cnf");

    let out = backbone(&["file", "--input", &input, "--output", path_str(&simplified)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error [MalformedInput]"));
    assert!(!simplified.exists());
}

#[test]
fn test_exhausted_budget_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "named.cnf", NAMED);
    let report = dir.path().join("named.backbone");

    let out = backbone(&[
        "file",
        "--input",
        &input,
        "--backbone",
        path_str(&report),
        "--max-queries",
        "2",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error [OracleFailure]"));
    assert!(!report.exists());
}

#[test]
fn test_solve_uses_competition_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let sat = write_formula(dir.path(), "sat.cnf", "p cnf 2 2\n1 2 0\n-1 0\n");
    let unsat = write_formula(dir.path(), "unsat.cnf", "p cnf 1 2\n1 0\n-1 0\n");

    let out = backbone(&["solve", &sat]);
    assert_eq!(out.status.code(), Some(10));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "s SATISFIABLE\nv -1 2 0\n");

    let out = backbone(&["solve", &unsat]);
    assert_eq!(out.status.code(), Some(20));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "s UNSATISFIABLE\n");
}

#[test]
fn test_external_oracle_matches_incremental() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "named.cnf", NAMED);

    let out = backbone(&[
        "file",
        "--input",
        &input,
        "--oracle",
        "external",
        "--solver-path",
        env!("CARGO_BIN_EXE_backbone"),
        "--solver-arg",
        "solve",
        "--query-timeout",
        "30",
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "+NET\n+USB\n");
}

#[test]
fn test_missing_external_solver() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "named.cnf", NAMED);

    let out = backbone(&[
        &input,
        "--oracle",
        "external",
        "--solver-path",
        "/nonexistent/sat-solver",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("solver unavailable"));
}

#[test]
fn test_dir_summarises_every_formula() {
    let dir = tempfile::tempdir().unwrap();
    write_formula(dir.path(), "a.cnf", NAMED);
    write_formula(dir.path(), "b.cnf", "p cnf 1 2\n1 0\n-1 0\n");
    write_formula(dir.path(), "notes.txt", "not a formula");

    let out = backbone(&["dir", "--path", path_str(dir.path())]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("a.cnf: 2 backbone literals, 2 of 3 clauses after simplification"));
    assert!(lines[1].ends_with("b.cnf: unsatisfiable"));
}

#[test]
fn test_external_solver_without_model_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "named.cnf", NAMED);
    let script = write_formula(dir.path(), "nomodel.sh", "echo 's SATISFIABLE'\nexit 10\n");
    let report = dir.path().join("named.backbone");

    let out = backbone(&[
        "file",
        "--input",
        &input,
        "--backbone",
        path_str(&report),
        "--oracle",
        "external",
        "--solver-path",
        "/bin/sh",
        "--solver-arg",
        &script,
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("error [OracleFailure]"));
    assert!(!report.exists());
}

#[test]
fn test_empty_input_clause_is_named() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_formula(dir.path(), "empty.cnf", "p cnf 2 2\n1 2 0\n0\n");

    let out = backbone(&[&input]);
    assert_eq!(out.status.code(), Some(20));
    assert!(String::from_utf8_lossy(&out.stderr).contains("input clause 2 is empty"));
}
