use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::tempdir;
use twin_data::{get_analyses, get_profiles};

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn twins_scenario_skips_corrupt_file() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    fs::write(
        dir.path().join("A_twin_B_analysis.json"),
        r#"{"query_patient_id":"A","twin_id":"B","rank":1,"similarity_score":0.92}"#,
    )
    .expect("Không ghi được file");
    fs::write(dir.path().join("corrupt.json"), "{not valid}").expect("Không ghi được file");

    let report = get_analyses(dir.path()).expect("Không nạp được thư mục");

    assert_eq!(report.records.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.filename, "A_twin_B_analysis.json");
    assert_eq!(record.rank, Some(1));
    assert_eq!(record.raw["filename"], json!("A_twin_B_analysis.json"));
    assert_eq!(record.raw["similarity_score"], json!(0.92));

    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped[0].filename, "corrupt.json");
}

#[test]
fn fixture_directory_loads_well_formed_subset() {
    let report = get_analyses(fixture_dir("twins")).expect("Không nạp được fixture");

    let filenames: Vec<&str> = report.records.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(
        filenames,
        vec![
            "A_twin_B_analysis.json",
            "P-0004863_twin_P-0021419_analysis.json",
            "P-0021419_twin_P-0004863_analysis.json",
        ]
    );
    for record in &report.records {
        assert_eq!(record.raw["filename"], json!(record.filename));
    }

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(skipped, vec!["corrupt.json"]);
}

#[test]
fn skipped_count_matches_malformed_files() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    for index in 0..4 {
        fs::write(
            dir.path().join(format!("ok_{index}.json")),
            format!(r#"{{"query_patient_id":"Q{index}","twin_id":"T{index}","rank":{}}}"#, index + 1),
        )
        .expect("Không ghi được file");
    }
    for index in 0..3 {
        fs::write(dir.path().join(format!("bad_{index}.json")), "[1, 2,")
            .expect("Không ghi được file");
    }

    let report = get_analyses(dir.path()).expect("Không nạp được thư mục");
    assert_eq!(report.records.len(), 4);
    assert_eq!(report.skipped_count(), 3);
    assert!(report.skipped.iter().all(|s| s.filename.starts_with("bad_")));
}

#[test]
fn records_without_identity_are_reported_as_malformed() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    fs::write(dir.path().join("no_twin.json"), r#"{"query_patient_id":"A"}"#)
        .expect("Không ghi được file");
    fs::write(dir.path().join("list.json"), "[]").expect("Không ghi được file");

    let report = get_analyses(dir.path()).expect("Không nạp được thư mục");
    assert!(report.records.is_empty());
    assert_eq!(report.skipped_count(), 2);
    assert!(report.skipped[0].reason.contains("not a JSON object"));
    assert!(report.skipped[1].reason.contains("twin_id"));
}

#[test]
fn missing_directory_is_reported_by_both_loaders() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    let missing = dir.path().join("does-not-exist");

    let err = get_analyses(&missing).expect_err("Thư mục không tồn tại phải lỗi");
    assert!(err.is_directory_not_found());

    let err = get_profiles(&missing).expect_err("Thư mục không tồn tại phải lỗi");
    assert!(err.is_directory_not_found());
}

#[test]
fn reload_after_directory_appears_succeeds() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    let twins = dir.path().join("twins");

    assert!(get_analyses(&twins).is_err());

    fs::create_dir(&twins).expect("Không tạo được thư mục");
    fs::write(
        twins.join("x.json"),
        r#"{"query_patient_id":"X","twin_id":"Y","rank":3}"#,
    )
    .expect("Không ghi được file");

    let report = get_analyses(&twins).expect("Nạp lại phải thành công");
    assert_eq!(report.records.len(), 1);
}

#[test]
fn loading_twice_yields_identical_records() {
    let first = get_analyses(fixture_dir("twins")).expect("Không nạp được fixture");
    let second = get_analyses(fixture_dir("twins")).expect("Không nạp được fixture");
    assert_eq!(first.records, second.records);
    assert_eq!(first.skipped, second.skipped);

    let first = get_profiles(fixture_dir("profiles")).expect("Không nạp được fixture");
    let second = get_profiles(fixture_dir("profiles")).expect("Không nạp được fixture");
    assert_eq!(first.records, second.records);
}

#[cfg(unix)]
#[test]
fn non_utf8_file_names_are_still_loaded() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().expect("Không tạo được thư mục tạm");
    let name = OsStr::from_bytes(b"caf\xe9_analysis.json");
    fs::write(
        dir.path().join(name),
        r#"{"query_patient_id":"A","twin_id":"B","rank":1}"#,
    )
    .expect("Không ghi được file");

    let report = get_analyses(dir.path()).expect("Không nạp được thư mục");
    assert_eq!(report.records.len(), 1);
    assert!(report.skipped.is_empty());
    assert_eq!(report.records[0].filename, "caf\u{fffd}_analysis.json");
    assert_eq!(report.records[0].twin_id, "B");

    fs::write(dir.path().join(OsStr::from_bytes(b"P-\xff.json")), "{}")
        .expect("Không ghi được file");
    let profiles = get_profiles(dir.path()).expect("Không nạp được hồ sơ");
    assert!(profiles.records.contains_key("P-\u{fffd}"));
}
