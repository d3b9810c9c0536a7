//! End-to-end tests for the `mediflex` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECEIPT: &str = "\
Distributor: Acme Pharma
Contact: +1 555-1234
Receipt: INV-001
Date: 02/03/2024
Item Qty Price
Paracetamol 500mg 100 4.50
Ibuprofen 200mg 50 3.20
";

/// A command isolated from the user's config and data directories.
fn mediflex(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mediflex").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(home.path().join("records"));
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn scan_prints_receipt_json() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "receipt.txt", RECEIPT);

    mediflex(&home)
        .args(["scan", "--mode", "order"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""mode":"order""#))
        .stdout(predicate::str::contains(r#""distributorName":"Acme Pharma""#))
        .stdout(predicate::str::contains(r#""date":"2024-03-02""#))
        .stdout(predicate::str::contains(r#""name":"Ibuprofen 200mg""#));
}

#[test]
fn scan_reads_stdin_as_csv() {
    let home = TempDir::new().unwrap();

    mediflex(&home)
        .args(["scan", "-", "--mode", "patient", "--format", "csv"])
        .write_stdin("Patient Name: Ravi\nMedicine Qty Price\nCough Syrup 1 85.00\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("name,quantity,price,batch,expiry"))
        .stdout(predicate::str::contains("Cough Syrup,1,85.00,,"));
}

#[test]
fn scan_warns_when_nothing_found() {
    let home = TempDir::new().unwrap();

    mediflex(&home)
        .args(["scan", "-", "--mode", "patient"])
        .write_stdin("smudged\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("No medicines found"));
}

#[test]
fn scan_missing_file_fails() {
    let home = TempDir::new().unwrap();

    mediflex(&home)
        .args(["scan", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn saved_receipt_shows_up_everywhere() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "receipt.txt", RECEIPT);

    mediflex(&home)
        .args(["scan", "--save", "--date", "2024-03-20"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Recorded 2 products from new distributor"));

    mediflex(&home)
        .args(["inventory", "list", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paracetamol 500mg,UNKNOWN,2024-03-02,100,4.50,1"));

    mediflex(&home)
        .args(["inventory", "search", "ibu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ibuprofen 200mg"));

    mediflex(&home)
        .args(["distributors", "list", "--products"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Acme Pharma"))
        .stdout(predicate::str::contains("(INV-001)"));

    mediflex(&home)
        .args(["dashboard", "--json", "--date", "2024-03-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""ocrScans": 1"#))
        .stdout(predicate::str::contains(r#""monthlyDistributions": 2"#))
        .stdout(predicate::str::contains("Paracetamol 500mg distributed by Acme Pharma"));
}

#[test]
fn saving_receipt_without_products_writes_nothing() {
    let home = TempDir::new().unwrap();

    mediflex(&home)
        .args(["scan", "-", "--save"])
        .write_stdin("Distributor: Acme Pharma\nItem Qty Price\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed for products"));

    mediflex(&home)
        .args(["distributors", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No distributors"));
}

#[test]
fn inventory_add_and_barcode_lookup() {
    let home = TempDir::new().unwrap();

    mediflex(&home)
        .args([
            "inventory", "add", "--name", "Crocin Advance", "--batch", "CR45120", "--expiry",
            "2026-09-15", "--price", "30.50", "--stock", "12",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Crocin Advance (id 1)"));

    mediflex(&home)
        .args(["inventory", "barcode", "CR45120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Crocin Advance"));

    mediflex(&home)
        .args(["inventory", "barcode", "NOPE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No item with barcode NOPE"));

    mediflex(&home)
        .args(["inventory", "delete", "1"])
        .assert()
        .success();

    mediflex(&home)
        .args(["inventory", "delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn buyers_and_sales_report() {
    let home = TempDir::new().unwrap();

    mediflex(&home)
        .args(["buyers", "add", "--name", "Asha"])
        .assert()
        .failure();

    mediflex(&home)
        .args(["buyers", "add", "--name", "Asha", "--contact", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation failed for contact"));

    mediflex(&home)
        .args(["buyers", "add", "--name", "Asha", "--contact", "555-0101"])
        .assert()
        .success();

    mediflex(&home)
        .args([
            "buyers", "purchase", "1", "--medicine", "Metformin", "--quantity", "2", "--price",
            "12.50", "--date", "2024-03-02",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Metformin x2 for ₹25"));

    mediflex(&home)
        .args(["report", "sales", "--period", "month", "--date", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-02,Asha,555-0101,Metformin,2,12.50,25.00"));

    mediflex(&home)
        .args(["dashboard", "--json", "--date", "2024-03-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""reportsGenerated": 1"#))
        .stdout(predicate::str::contains(r#""regularBuyers": 1"#))
        .stdout(predicate::str::contains("Added new buyer: Asha"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("inputs");
    fs::create_dir_all(&inputs).unwrap();
    write(&inputs, "a.txt", RECEIPT);
    write(&inputs, "b.txt", "   \n");
    let out = home.path().join("out");

    mediflex(&home)
        .args(["batch", "--continue-on-error", "--summary", "--format", "csv"])
        .arg(format!("{}/*.txt", inputs.display()))
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("a.csv").exists());
    assert!(!out.join("b.csv").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,order,2,false,"));
    assert!(summary.contains("b.txt,error,,,,,,No text in file"));
}

#[test]
fn config_set_and_get() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("mediflex.json");

    mediflex(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();

    mediflex(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.fallback_min_line_length", "20"])
        .assert()
        .success();

    mediflex(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.fallback_min_line_length"])
        .assert()
        .success()
        .stdout(predicate::str::diff("20\n"));

    mediflex(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
