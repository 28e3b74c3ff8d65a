use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::tempdir;
use twin_data::get_profiles;
use twin_data::loader::{filename_stem, profile_key};

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn profile_without_patient_id_is_keyed_by_filename_stem() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    fs::write(dir.path().join("P-001.json"), r#"{"clinical":{}}"#).expect("Không ghi được file");

    let report = get_profiles(dir.path()).expect("Không nạp được hồ sơ");
    let keys: Vec<&str> = report.records.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["P-001"]);

    let profile = &report.records["P-001"];
    assert!(profile.id_from_filename);
    assert_eq!(profile.source_file, "P-001.json");
    assert_eq!(profile.data, json!({"clinical": {}}));
}

#[test]
fn fixture_profiles_are_indexed_by_content_or_filename() {
    let report = get_profiles(fixture_dir("profiles")).expect("Không nạp được fixture");

    let keys: Vec<&str> = report.records.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["P-0004863", "P-001", "P-0021419"]);

    let legacy = &report.records["P-0004863"];
    assert_eq!(legacy.source_file, "legacy_export.json");
    assert!(!legacy.id_from_filename);

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.filename.as_str()).collect();
    assert_eq!(skipped, vec!["not_an_object.json", "truncated.json"]);
    assert!(report.collisions.is_empty());
}

#[test]
fn derived_key_is_stable_across_loads() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    fs::write(dir.path().join("patient.v2.json"), r#"{"treatment": []}"#)
        .expect("Không ghi được file");

    for _ in 0..3 {
        let report = get_profiles(dir.path()).expect("Không nạp được hồ sơ");
        assert!(report.records.contains_key("patient.v2"));
        assert_eq!(report.records.len(), 1);
    }
}

#[test]
fn later_file_wins_on_duplicate_patient_id() {
    let dir = tempdir().expect("Không tạo được thư mục tạm");
    fs::write(
        dir.path().join("a_first.json"),
        r#"{"patient_id": "P-9", "marker": "first"}"#,
    )
    .expect("Không ghi được file");
    fs::write(
        dir.path().join("b_second.json"),
        r#"{"patient_id": "P-9", "marker": "second"}"#,
    )
    .expect("Không ghi được file");

    let report = get_profiles(dir.path()).expect("Không nạp được hồ sơ");
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records["P-9"].data["marker"], json!("second"));

    assert_eq!(report.collisions.len(), 1);
    let collision = &report.collisions[0];
    assert_eq!(collision.key, "P-9");
    assert_eq!(collision.replaced_file, "a_first.json");
    assert_eq!(collision.winning_file, "b_second.json");
}

#[test]
fn profile_key_prefers_top_level_then_clinical() {
    assert_eq!(
        profile_key(&json!({"patient_id": "P-1", "clinical": {"patient_id": "P-2"}})),
        Some("P-1".to_string())
    );
    assert_eq!(
        profile_key(&json!({"clinical": {"patient_id": "P-2"}})),
        Some("P-2".to_string())
    );
    assert_eq!(profile_key(&json!({"patient_id": 1234})), Some("1234".to_string()));
    assert_eq!(profile_key(&json!({"patient_id": ""})), None);
    assert_eq!(profile_key(&json!({"patient_id": null})), None);
}

#[test]
fn filename_stem_strips_only_the_last_extension() {
    assert_eq!(filename_stem("P-001.json"), "P-001");
    assert_eq!(filename_stem("patient.v2.json"), "patient.v2");
}
