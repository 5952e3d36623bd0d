use assert_cmd::Command;
use predicates::prelude::*;

fn pdftext() -> Command {
    Command::cargo_bin("pdftext").unwrap()
}

#[test]
fn config_show_reads_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"primary_library": "libcustom-pdfium.so"}"#).unwrap();

    pdftext()
        .args(["--config", path.to_str().unwrap(), "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("libcustom-pdfium.so"))
        .stdout(predicate::str::contains("libjniPdfium.so"));
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let output = path.to_str().unwrap();

    pdftext().args(["config", "init", "--output", output]).assert().success();
    assert!(path.exists());

    pdftext()
        .args(["config", "init", "--output", output])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    pdftext()
        .args(["config", "init", "--output", output, "--force"])
        .assert()
        .success();
}

#[test]
fn probe_reports_missing_library() {
    pdftext()
        .env_remove("PDFTEXT_PDFIUM_LIBRARY")
        .env_remove("PDFTEXT_PDFIUM_FALLBACK")
        .args([
            "probe",
            "--library",
            "libpdftext-missing-primary.so",
            "--fallback",
            "libpdftext-missing-fallback.so",
            "--json",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""loaded": false"#))
        .stdout(predicate::str::contains("libpdftext-missing-fallback.so"));
}

#[test]
fn config_init_records_library_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    pdftext()
        .args(["--config", path.to_str().unwrap(), "config", "init", "--library", "libvendor-pdfium.so"])
        .assert()
        .success()
        .stdout(predicate::str::contains("primary libvendor-pdfium.so"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("libvendor-pdfium.so"));
    assert!(written.contains("libjniPdfium.so"));
}

#[test]
fn config_path_reports_source_and_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"primary_library": "libfile-pdfium.so"}"#).unwrap();

    pdftext()
        .env("PDFTEXT_PDFIUM_LIBRARY", "libenv-pdfium.so")
        .env_remove("PDFTEXT_PDFIUM_FALLBACK")
        .args(["--config", path.to_str().unwrap(), "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(--config)"))
        .stdout(predicate::str::contains("overrides libfile-pdfium.so"))
        .stdout(predicate::str::contains("Resolved: libenv-pdfium.so then libjniPdfium.so"));
}
