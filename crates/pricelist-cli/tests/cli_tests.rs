//! CLI surface tests: argument handling and ingestion limits.
//!
//! These exercise the paths that fail before the extraction pipeline is
//! wired, so they run without a pdfium library or OCR models installed.

use assert_cmd::Command;
use predicates::prelude::*;

fn pricelist() -> Command {
    Command::cargo_bin("pricelist").expect("binary builds")
}

#[test]
fn no_arguments_prints_usage() {
    pricelist()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_file_is_reported() {
    pricelist()
        .arg("/nonexistent/Acme_2025.pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Acme_2025.pdf"));
}

#[test]
fn non_pdf_batches_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "not a pdf").unwrap();

    pricelist()
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no PDF files to process"));
}

#[test]
fn file_count_limit_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = pricelist();
    for i in 0..31 {
        let path = dir.path().join(format!("Vendor{i}_2025.pdf"));
        std::fs::write(&path, "%PDF-1.4").unwrap();
        cmd.arg(&path);
    }

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("too many files"));
}
