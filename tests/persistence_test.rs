#![cfg(feature = "storage-rocksdb")]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::process::Command;
use tempfile::tempdir;

const HEADER: &str = "type, expense, group, member, amount, category, timestamp, counterparty";

#[test]
fn test_rocksdb_persistence_recovery() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: record an expense
    let mut csv1 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv1, "{HEADER}").unwrap();
    writeln!(csv1, "expense, e1, trip, a, 100, , ,").unwrap();
    writeln!(csv1, "split, e1, , b, 100, , ,").unwrap();

    let mut cmd1 = Command::new(cargo_bin!("splitsettle"));
    cmd1.arg(csv1.path()).arg("--db-path").arg(&db_path);

    let output1 = cmd1.output().expect("Failed to execute command");
    assert!(output1.status.success());
    let stdout1 = String::from_utf8_lossy(&output1.stdout);
    assert!(stdout1.contains("trip,b,a,100,b,a"));

    // 2. Second run: b pays part back, and e1 is replayed
    let mut csv2 = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv2, "{HEADER}").unwrap();
    writeln!(csv2, "expense, e1, trip, a, 100, , ,").unwrap();
    writeln!(csv2, "split, e1, , b, 100, , ,").unwrap();
    writeln!(csv2, "payment, p1, trip, b, 30, , , a").unwrap();

    let mut cmd2 = Command::new(cargo_bin!("splitsettle"));
    cmd2.arg(csv2.path()).arg("--db-path").arg(&db_path);

    let output2 = cmd2.output().expect("Failed to execute command");
    assert!(output2.status.success());
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    // The replayed expense is not counted twice: 100 - 30 = 70
    assert!(stdout2.contains("trip,b,a,70,b,a"));
}
