use std::path::PathBuf;

use serde_json::{json, Value};
use twin_core::TimelineEventKind;
use twin_data::{
    get_genomic_samples, get_profiles, get_timeline_events, get_treatment_lines,
    resolve_nested_or_flat,
};

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn nested_timeline_wins_over_flat() {
    let profile = json!({
        "timeline": {"surgery": [{"procedure": "nested"}]},
        "surgery": [{"procedure": "flat"}]
    });

    assert_eq!(
        get_timeline_events(&profile, "surgery"),
        &[json!({"procedure": "nested"})]
    );
}

#[test]
fn flat_timeline_is_returned_unchanged() {
    let flat = json!([{"start_date_days": 45, "procedure": "Wedge resection", "extra": [1, 2]}]);
    let profile = json!({ "surgery": flat.clone() });

    let events = get_timeline_events(&profile, "surgery");
    assert_eq!(Value::Array(events.to_vec()), flat);
}

#[test]
fn empty_nested_timeline_falls_back_to_flat() {
    let profile = json!({
        "timeline": {"radiation": []},
        "radiation": [{"site": "Brain"}]
    });

    assert_eq!(get_timeline_events(&profile, "radiation"), &[json!({"site": "Brain"})]);
}

#[test]
fn absent_or_malformed_timeline_is_empty() {
    assert!(get_timeline_events(&json!({}), "progression").is_empty());
    assert!(get_timeline_events(&json!({"timeline": []}), "progression").is_empty());
    assert!(get_timeline_events(&json!({"progression": "none"}), "progression").is_empty());
    assert!(get_timeline_events(&Value::Null, "progression").is_empty());
}

#[test]
fn empty_nested_treatment_lines_fall_back_to_flat_treatment() {
    let profile = json!({
        "treatments": {"drug_therapy": {"lines": []}},
        "treatment": [{"agent": "X"}]
    });

    assert_eq!(get_treatment_lines(&profile), &[json!({"agent": "X"})]);
}

#[test]
fn nested_treatment_lines_win() {
    let profile = json!({
        "treatments": {"drug_therapy": {"lines": [{"agent": "NESTED"}]}},
        "treatment": [{"agent": "FLAT"}]
    });

    assert_eq!(get_treatment_lines(&profile), &[json!({"agent": "NESTED"})]);
    assert!(get_treatment_lines(&json!({"treatments": []})).is_empty());
}

#[test]
fn genomic_samples_resolve_and_sort() {
    let profile = json!({
        "genomics": {"samples": {"S2": {"mutations": []}, "S1": {"mutations": [{}]}}},
        "samples": {"LEGACY": {}}
    });
    let ids: Vec<&str> = get_genomic_samples(&profile)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, vec!["S1", "S2"]);

    let legacy = json!({"genomics": {"samples": {}}, "samples": {"LEGACY": {}}});
    let ids: Vec<&str> = get_genomic_samples(&legacy)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(ids, vec!["LEGACY"]);

    assert!(get_genomic_samples(&json!({"genomics": {}})).is_empty());
}

#[test]
fn resolver_accepts_custom_shapes() {
    let profile = json!({"outer": {"inner": "nested"}, "inner": "flat"});
    let text = resolve_nested_or_flat(&profile, &["outer", "inner"], "inner", Value::as_str);
    assert_eq!(text, Some("nested"));

    let profile = json!({"inner": "flat"});
    let text = resolve_nested_or_flat(&profile, &["outer", "inner"], "inner", Value::as_str);
    assert_eq!(text, Some("flat"));
}

#[test]
fn fixture_profiles_render_identically_across_schemas() {
    let report = get_profiles(fixture_dir("profiles")).expect("Không nạp được fixture");

    let current = &report.records["P-0021419"].data;
    let legacy = &report.records["P-0004863"].data;

    let surgery = TimelineEventKind::Surgery.key();
    assert_eq!(get_timeline_events(current, surgery)[0]["procedure"], json!("Lobectomy"));
    assert_eq!(
        get_timeline_events(legacy, surgery)[0]["procedure"],
        json!("Wedge resection")
    );

    let radiation = TimelineEventKind::Radiation.key();
    assert_eq!(get_timeline_events(current, radiation)[0]["site"], json!("Brain"));

    let tumor_sites = TimelineEventKind::TumorSites.key();
    assert!(get_timeline_events(current, tumor_sites).is_empty());
    assert_eq!(get_timeline_events(legacy, tumor_sites).len(), 1);

    assert_eq!(get_treatment_lines(current).len(), 2);
    assert_eq!(get_treatment_lines(legacy)[0]["agent"], json!("ERLOTINIB"));
}
