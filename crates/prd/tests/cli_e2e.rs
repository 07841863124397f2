#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn prd_cmd(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("prd"));
    cmd.env("PRD_DATA_DIR", data.as_os_str())
        .env_remove("PRD_QUOTA_BYTES")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_create_list_show_workflow() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    prd_cmd(&data)
        .args(["new", "Checkout", "Revamp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Document created: Checkout Revamp"));

    prd_cmd(&data)
        .args([
            "section",
            "set",
            "executive-summary",
            "--markdown",
            "Ship a **faster** checkout.",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/6 complete"));

    // Naked execution lists documents
    prd_cmd(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Checkout Revamp"))
        .stdout(predicate::str::contains("1/6"));

    prd_cmd(&data)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Executive Summary"))
        .stdout(predicate::str::contains("Ship a **faster** checkout."))
        .stdout(predicate::str::contains("(empty)"));

    // Data lands in the configured directory
    assert!(data.join("prd-documents").exists());
    assert!(data.join("prd-current-document").exists());
}

#[test]
fn test_section_set_reads_stdin() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    prd_cmd(&data).args(["new", "Piped"]).assert().success();
    prd_cmd(&data)
        .args(["section", "set", "Goals & Objectives"])
        .write_stdin("- Grow revenue\n- Cut churn\n")
        .assert()
        .success();

    prd_cmd(&data)
        .args(["section", "get", "goals-objectives"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Grow revenue"))
        .stdout(predicate::str::contains("- Cut churn"));
}

#[test]
fn test_select_by_index_and_name() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    prd_cmd(&data).args(["new", "First"]).assert().success();
    prd_cmd(&data).args(["new", "Second"]).assert().success();

    prd_cmd(&data)
        .args(["select", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Now editing: First"));

    prd_cmd(&data)
        .args(["rename", "Renamed", "First"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Renamed: First -> Renamed First"));

    prd_cmd(&data)
        .args(["select", "second"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Now editing: Second"));

    prd_cmd(&data)
        .args(["show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Document not found: missing"));
}

#[test]
fn test_export_writes_files() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("out");

    prd_cmd(&data).args(["new", "Launch Plan"]).assert().success();
    prd_cmd(&data)
        .args(["section", "set", "risks-mitigations", "--text", "Vendor delay"])
        .assert()
        .success();

    for (format, file) in [
        ("md", "Launch Plan.md"),
        ("docx", "Launch Plan.docx"),
        ("pdf", "Launch Plan.pdf"),
    ] {
        prd_cmd(&data)
            .args(["export", "--format", format, "--out"])
            .arg(&out)
            .assert()
            .success()
            .stdout(predicate::str::contains("Saved:"));
        assert!(out.join(file).exists(), "missing {}", file);
    }

    let markdown = fs::read_to_string(out.join("Launch Plan.md")).unwrap();
    assert!(markdown.starts_with("# Launch Plan"));
    assert!(markdown.contains("## Risks & Mitigations"));
    assert!(markdown.contains("Vendor delay"));

    prd_cmd(&data)
        .args(["export", "--format", "rtf"])
        .assert()
        .failure();
}

#[test]
fn test_attachments_roundtrip() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let notes = temp.path().join("notes.txt");
    fs::write(&notes, "remember the milk").unwrap();

    prd_cmd(&data).args(["new", "With Files"]).assert().success();
    prd_cmd(&data)
        .arg("attach")
        .arg(&notes)
        .assert()
        .success()
        .stdout(predicate::str::contains("Attached: notes.txt (17 Bytes)"));

    // Same name again is rejected but the command still succeeds
    prd_cmd(&data)
        .arg("attach")
        .arg(&notes)
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt already uploaded"));

    prd_cmd(&data)
        .args(["attachments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes.txt"))
        .stdout(predicate::str::contains("text/plain"));

    prd_cmd(&data)
        .args(["detach", "notes.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed: notes.txt"));

    prd_cmd(&data)
        .args(["attachments"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No attachments."));
}

#[test]
fn test_backup_and_restore() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("backups");

    prd_cmd(&data).args(["new", "Keeper"]).assert().success();
    prd_cmd(&data)
        .args(["backup", "--out"])
        .arg(&out)
        .assert()
        .success();
    let backup = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.file_name().unwrap().to_str().unwrap().starts_with("prd-backup-"))
        .expect("backup file");

    prd_cmd(&data).args(["new", "Temporary"]).assert().success();

    // Without --yes and without a terminal nothing is replaced
    prd_cmd(&data)
        .arg("restore")
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled"));

    prd_cmd(&data)
        .args(["restore", "--yes"])
        .arg(&backup)
        .assert()
        .success();

    prd_cmd(&data)
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Keeper"))
        .stdout(predicate::str::contains("Temporary").not());
}

#[test]
fn test_dump_and_import_copies() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let out = temp.path().join("dumps");

    prd_cmd(&data).args(["new", "Original"]).assert().success();
    prd_cmd(&data)
        .args(["dump", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 document(s)"));
    let dump = fs::read_dir(&out).unwrap().next().unwrap().unwrap().path();

    prd_cmd(&data)
        .arg("import")
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 document(s)"));

    prd_cmd(&data)
        .args(["list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"documents\""))
        .stdout(predicate::function(|out: &str| {
            out.matches("\"name\": \"Original\"").count() == 2
        }));
}

#[test]
fn test_prefs_and_collapse() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    prd_cmd(&data)
        .args(["prefs", "theme", "dark"])
        .assert()
        .success();
    prd_cmd(&data)
        .args(["prefs", "theme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("theme = dark"));
    prd_cmd(&data)
        .args(["prefs", "autoSaveEnabled", "maybe"])
        .assert()
        .failure();

    prd_cmd(&data).args(["new", "Folding"]).assert().success();
    prd_cmd(&data)
        .args(["collapse", "risks-mitigations"])
        .assert()
        .success();
    prd_cmd(&data)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Risks & Mitigations (collapsed)"));
    prd_cmd(&data)
        .args(["collapse", "--all", "--expand"])
        .assert()
        .success();
    prd_cmd(&data)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(collapsed)").not());
}

#[test]
fn test_usage_and_clear() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    prd_cmd(&data).args(["new", "Counted"]).assert().success();
    prd_cmd(&data)
        .args(["usage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Storage:"))
        .stdout(predicate::str::contains("of 10 MB used"));

    prd_cmd(&data).args(["prefs", "theme", "dark"]).assert().success();
    prd_cmd(&data)
        .args(["clear", "--documents", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 document(s)"));

    assert!(!data.join("prd-documents").exists());
    assert!(data.join("prd-preferences").exists());
}

#[test]
fn test_storage_full_writes_overflow_backup() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let work = temp.path().join("work");
    fs::create_dir_all(&work).unwrap();

    prd_cmd(&data)
        .env("PRD_QUOTA_BYTES", "300")
        .current_dir(&work)
        .args(["--yes", "new", "Too", "big"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Storage quota exceeded"))
        .stdout(predicate::str::contains("prd-documents-backup.json"));

    // The refused document is in the backup even though it was never stored
    let backup = fs::read_to_string(work.join("prd-documents-backup.json")).unwrap();
    assert!(backup.contains("Too big"));
}
