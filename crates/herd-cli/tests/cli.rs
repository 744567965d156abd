//! End-to-end runs of the `herd` binary against a temporary farm directory.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const EXPORT: &str = "\
Номер;Отел;Дата 1;Бык 1;Дата 2;Бык 2;Статус
1;10.01.2024;05.03.2024;B1;26.03.2024;B2;стельная
2;20.01.2024;20.03.2024;B1;;;
Итого:;;;;;;
";

const MAPPING: &str = r#"{
  "cattleIdColumnIndex": 0,
  "columns": {
    "1": "calvingDate",
    "2": "inseminationDate",
    "3": "bull",
    "4": "inseminationDate",
    "5": "bull",
    "6": "status"
  }
}"#;

fn herd(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_herd"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run herd")
}

fn farm() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("export.csv"), EXPORT).unwrap();
    std::fs::write(dir.path().join("mapping.json"), MAPPING).unwrap();
    dir
}

fn json_stdout(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("json output")
}

#[test]
fn import_then_report() {
    let dir = farm();
    let import = herd(
        dir.path(),
        &["import", "export.csv", "--mapping", "mapping.json", "--user", "zootech"],
    );
    assert!(
        import.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&import.stderr)
    );
    assert!(dir.path().join("herd.json").exists());

    let kpi = json_stdout(&herd(
        dir.path(),
        &["kpi", "--start", "2024-03-01", "--end", "2024-03-31", "--json"],
    ));
    insta::assert_json_snapshot!(kpi["report"], @r#"
    {
      "cr": 33.3,
      "hdr": 73.8,
      "inseminatedCount": 2,
      "pr": 24.6,
      "pregnantCount": 1,
      "servicePeriodDays": 57.5,
      "totalInseminations": 3
    }
    "#);
    assert_eq!(kpi["animals"], 2);

    let animal = json_stdout(&herd(dir.path(), &["show", "1", "--json"]));
    assert_eq!(animal["status"], "Pregnant");
    assert_eq!(animal["bull"], "B2");
    assert_eq!(animal["userId"], "zootech");
    assert_eq!(animal["inseminationHistory"][1]["daysFromPrevious"], 21);
}

#[test]
fn show_prints_last_insemination() {
    let dir = farm();
    let args = ["import", "export.csv", "--mapping", "mapping.json"];
    assert!(herd(dir.path(), &args).status.success());

    let output = herd(dir.path(), &["show", "1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Last insemination: 2024-03-26 B2 (attempt 2)"));
    assert!(!stdout.contains("Protocol:"));
}

#[test]
fn reimport_updates_without_duplicating() {
    let dir = farm();
    let args = ["import", "export.csv", "--mapping", "mapping.json"];
    assert!(herd(dir.path(), &args).status.success());
    assert!(herd(dir.path(), &args).status.success());

    let animal = json_stdout(&herd(dir.path(), &["show", "1", "--json"]));
    assert_eq!(animal["inseminationHistory"].as_array().unwrap().len(), 2);
}

#[test]
fn dry_run_leaves_store_untouched() {
    let dir = farm();
    let output = herd(
        dir.path(),
        &["import", "export.csv", "--mapping", "mapping.json", "--dry-run"],
    );
    assert!(output.status.success());
    assert!(!dir.path().join("herd.json").exists());
}

#[test]
fn saved_template_is_reused() {
    let dir = farm();
    let save = herd(
        dir.path(),
        &[
            "import",
            "export.csv",
            "--mapping",
            "mapping.json",
            "--save-template",
            "north barn",
            "--dry-run",
        ],
    );
    assert!(save.status.success());
    assert!(dir.path().join("mappings/NORTH_BARN.json").exists());

    let listed = herd(dir.path(), &["templates"]);
    assert!(String::from_utf8_lossy(&listed.stdout).contains("north barn"));

    let reuse = herd(
        dir.path(),
        &["import", "export.csv", "--template", "north barn", "--store", "other.json"],
    );
    assert!(reuse.status.success());
    assert!(dir.path().join("other.json").exists());
}

#[test]
fn out_of_range_mapping_is_rejected() {
    let dir = farm();
    std::fs::write(
        dir.path().join("wide.json"),
        r#"{"cattleIdColumnIndex": 0, "columns": {"12": "bull"}}"#,
    )
    .unwrap();
    let output = herd(dir.path(), &["import", "export.csv", "--mapping", "wide.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid column mapping"));
    assert!(!dir.path().join("herd.json").exists());
}

#[test]
fn import_with_only_garbage_rows_fails() {
    let dir = farm();
    std::fs::write(dir.path().join("empty.csv"), "Номер;Отел\nИтого:;\n;\n").unwrap();
    std::fs::write(
        dir.path().join("short.json"),
        r#"{"cattleIdColumnIndex": 0, "columns": {"1": "calvingDate"}}"#,
    )
    .unwrap();
    let output = herd(dir.path(), &["import", "empty.csv", "--mapping", "short.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no records were created or updated"));
}

#[test]
fn unknown_animal_is_an_error() {
    let dir = farm();
    let output = herd(dir.path(), &["show", "404"]);
    assert_eq!(output.status.code(), Some(1));
}
