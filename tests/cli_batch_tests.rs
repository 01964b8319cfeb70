// Batch mode runs of the binary against CSV uploads written to a temp dir.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn write_csv(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path.to_str().unwrap().to_string()
}

const UPLOAD: &str = "Student,Subject,Study Hours,Mode\n\
                      Asha,Math,6,Normal\n\
                      Asha,Physics,9.5,Fast\n\
                      Ben,Math,3,Intermediate\n";

#[test]
fn test_batch_default_exports_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "upload.csv", UPLOAD);

    let mut cmd = Command::cargo_bin("marx_predict").unwrap();
    cmd.arg("--input")
        .arg(&input)
        .arg("--out-dir")
        .arg(dir.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("3 rows loaded"))
        .stdout(predicate::str::contains("Prediction Complete!"))
        .stdout(predicate::str::contains("prediction.json"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("prediction.json")).unwrap())
            .unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Predicted Marks"], 60.0);
    assert_eq!(rows[1]["Predicted Marks"], 47.5);
    assert_eq!(rows[1]["Recommendation"], "Take adequate sleep");
    assert_eq!(rows[2]["Predicted Marks"], 24.0);
    assert_eq!(rows[2]["Recommendation"], "Practice meditation / yoga");
}

#[test]
fn test_batch_csv_and_xlsx_with_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "upload.csv", UPLOAD);

    let mut cmd = Command::cargo_bin("marx_predict").unwrap();
    cmd.args(["-i", &input, "-f", "csv", "-f", "xlsx", "--stem", "term1", "-o"])
        .arg(dir.path());
    cmd.assert().success();

    let csv = fs::read_to_string(dir.path().join("term1.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Student,Subject,Study Hours,Mode,Predicted Marks,Recommendation")
    );
    assert_eq!(
        lines.next(),
        Some("Asha,Math,6.0,Normal,60.0,Maintain regular study schedule")
    );

    let xlsx = fs::read(dir.path().join("term1.xlsx")).unwrap();
    assert!(xlsx.starts_with(b"PK"));
}

#[test]
fn test_batch_missing_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "bad.csv", "Student,Subject,Study Hours\nAsha,Math,6\n");

    let mut cmd = Command::cargo_bin("marx_predict").unwrap();
    cmd.arg("-i").arg(&input).arg("-o").arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("CSV must contain columns"))
        .stderr(predicate::str::contains("Mode"));
    assert!(!dir.path().join("prediction.json").exists());
}

#[test]
fn test_batch_strict_modes_rejects_unknown_mode() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(
        dir.path(),
        "upload.csv",
        "Student,Subject,Study Hours,Mode\nAsha,Math,6,Turbo\n",
    );

    let mut lenient = Command::cargo_bin("marx_predict").unwrap();
    lenient.arg("-i").arg(&input).arg("-o").arg(dir.path());
    lenient
        .assert()
        .success()
        .stdout(predicate::str::contains("unrecognized mode"));

    let mut strict = Command::cargo_bin("marx_predict").unwrap();
    strict
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path())
        .arg("--strict-modes");
    strict
        .assert()
        .failure()
        .stderr(predicate::str::contains("Turbo"));
}

#[test]
fn test_settings_file_sets_formats() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_csv(dir.path(), "upload.csv", UPLOAD);
    let out_dir = dir.path().join("reports");
    let config = dir.path().join("marx.toml");
    fs::write(
        &config,
        format!(
            "output_dir = {:?}\nfile_stem = \"weekly\"\nformats = [\"html\"]\n",
            out_dir.to_str().unwrap()
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("marx_predict").unwrap();
    cmd.arg("-i").arg(&input).arg("-c").arg(&config);
    cmd.assert().success();

    let html = fs::read_to_string(out_dir.join("weekly.html")).unwrap();
    assert!(html.contains("<svg"));
    assert!(html.contains("Asha"));
}

#[test]
fn test_interactive_exit_from_auth() {
    let mut cmd = Command::cargo_bin("marx_predict").unwrap();
    cmd.write_stdin("3\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Please Register or Sign In"))
        .stdout(predicate::str::contains("Exiting the program."));
}
