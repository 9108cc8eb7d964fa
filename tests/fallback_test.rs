use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "type, expense, group, member, amount, category, timestamp, counterparty").unwrap();
    writeln!(csv, "expense, e1, trip, a, 100, , ,").unwrap();
    writeln!(csv, "split, e1, , b, 100, , ,").unwrap();

    let mut cmd = Command::new(cargo_bin!("splitsettle"));
    cmd.arg(csv.path()).arg("--db-path").arg("some_db");

    cmd.assert()
        .success()
        .stderr(predicate::str::contains(
            "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage",
        ))
        .stdout(predicate::str::contains("trip,b,a,100,b,a"));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "type, expense, group, member, amount, category, timestamp, counterparty").unwrap();
    writeln!(csv, "expense, e1, trip, a, 100, , ,").unwrap();
    writeln!(csv, "split, e1, , b, 100, , ,").unwrap();

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    let mut cmd = Command::new(cargo_bin!("splitsettle"));
    cmd.arg(csv.path()).arg("--db-path").arg(&db_path);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("falling back").not());
}
