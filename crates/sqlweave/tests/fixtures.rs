//! Fixture-driven transpilation tests
//!
//! Cases live in `tests/fixtures/dialects.json` so new ones can be added
//! without touching Rust code.

use once_cell::sync::Lazy;
use serde::Deserialize;
use sqlweave::{transpile_one, Error, GenerateOptions};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Fixtures {
    identity: Vec<IdentityCase>,
    transpilation: Vec<TranspileCase>,
    #[serde(default)]
    unsupported: Vec<UnsupportedCase>,
}

#[derive(Debug, Deserialize)]
struct IdentityCase {
    dialect: String,
    sql: String,
}

#[derive(Debug, Deserialize)]
struct TranspileCase {
    read: String,
    write: String,
    sql: String,
    expected: String,
}

#[derive(Debug, Deserialize)]
struct UnsupportedCase {
    read: String,
    write: String,
    sql: String,
}

static FIXTURES: Lazy<Fixtures> = Lazy::new(|| {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/dialects.json");
    let content = fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    serde_json::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
});

/// Run every case, collecting failures so one bad fixture does not hide the rest
fn check_all<T>(cases: &[T], run: impl Fn(&T) -> Result<(), String>) {
    let failures: Vec<String> = cases.iter().filter_map(|case| run(case).err()).collect();
    if !failures.is_empty() {
        panic!("{} of {} fixtures failed:\n{}", failures.len(), cases.len(), failures.join("\n"));
    }
}

#[test]
fn test_identity_fixtures() {
    check_all(&FIXTURES.identity, |case| {
        match transpile_one(&case.sql, &case.dialect, &case.dialect, &GenerateOptions::default()) {
            Ok(out) if out == case.sql => Ok(()),
            Ok(out) => Err(format!("[{}] {}\n  got: {out}", case.dialect, case.sql)),
            Err(e) => Err(format!("[{}] {}\n  error: {e}", case.dialect, case.sql)),
        }
    });
}

#[test]
fn test_transpilation_fixtures() {
    check_all(&FIXTURES.transpilation, |case| {
        match transpile_one(&case.sql, &case.read, &case.write, &GenerateOptions::default()) {
            Ok(out) if out == case.expected => Ok(()),
            Ok(out) => Err(format!(
                "[{} -> {}] {}\n  expected: {}\n  got: {out}",
                case.read, case.write, case.sql, case.expected
            )),
            Err(e) => Err(format!("[{} -> {}] {}\n  error: {e}", case.read, case.write, case.sql)),
        }
    });
}

#[test]
fn test_unsupported_fixtures() {
    check_all(&FIXTURES.unsupported, |case| {
        match transpile_one(&case.sql, &case.read, &case.write, &GenerateOptions::default()) {
            Err(Error::Unsupported { .. }) => Ok(()),
            other => Err(format!(
                "[{} -> {}] {}\n  expected Unsupported, got {other:?}",
                case.read, case.write, case.sql
            )),
        }
    });
}

#[test]
fn test_fixture_dialects_exist() {
    for case in &FIXTURES.identity {
        assert!(
            sqlweave::dialects::Dialect::get_by_name(&case.dialect).is_ok(),
            "unknown dialect {}",
            case.dialect
        );
    }
}
