use std::fs;
use tempfile::TempDir;

use aisle_core::catalog::Catalog;
use aisle_core::config::Config;

#[test]
fn load_dir_aggregates_all_sources() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(
        dir.join("asda.json"),
        r#"[{"name": "Plain Bagel", "vendor": "ASDA", "category": "bagel", "brand": "ASDA", "price": 0.8, "tags": ["vegan"]}]"#,
    )
    .unwrap();
    fs::create_dir(dir.join("nested")).unwrap();
    fs::write(
        dir.join("nested/subway.json"),
        r#"[{"id": 7, "name": "Coke", "vendor": "Subway", "category": "drink", "brand": "Coca-Cola", "price": 1.5}]"#,
    )
    .unwrap();

    let (catalog, report) = Catalog::load_dir(dir);

    assert_eq!(catalog.len(), 2);
    assert_eq!(report.sources_loaded, 2);
    assert_eq!(report.products_loaded, 2);
    assert!(report.skipped.is_empty());
    assert_eq!(catalog.vendors(), vec!["ASDA".to_string(), "Subway".to_string()]);
    assert_eq!(catalog.categories(), vec!["bagel".to_string(), "drink".to_string()]);
    assert_eq!(catalog.tags(), vec!["vegan".to_string()]);
    assert_eq!(catalog.products()[1].id.as_deref(), Some("7"));
}

#[test]
fn bad_sources_are_reported_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("good.json"), r#"[{"name": "Pepsi", "vendor": "Tesco", "category": "drink", "brand": "PepsiCo", "price": 1.1}]"#).unwrap();
    fs::write(dir.join("broken.json"), "[{ not json").unwrap();
    fs::write(dir.join("object.json"), r#"{"name": "not an array"}"#).unwrap();
    fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let (catalog, report) = Catalog::load_dir(dir);

    assert_eq!(catalog.len(), 1, "only the good source contributes");
    assert_eq!(report.sources_loaded, 1);
    assert_eq!(report.skipped.len(), 2);
    let skipped: Vec<_> = report.skipped.iter().map(|s| s.path.file_name().unwrap().to_string_lossy().to_string()).collect();
    assert_eq!(skipped, vec!["broken.json".to_string(), "object.json".to_string()]);
}

#[test]
fn non_object_records_are_counted_and_dropped() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("mixed.json"),
        r#"[1, "two", {"name": "Crisps", "vendor": "ASDA", "category": "snack", "brand": "Walkers", "price": 0.9}, {"name": "Odd", "price": "free"}]"#,
    )
    .unwrap();

    let (catalog, report) = Catalog::load_dir(tmp.path());

    assert_eq!(catalog.len(), 1);
    assert_eq!(report.records_skipped, 3);
    assert_eq!(report.record_errors.len(), 1, "one entry per source");
    assert_eq!(report.record_errors[0].index, 0);
    assert_eq!(report.record_errors[0].reason, "record is not a JSON object");
    assert!(report.skipped.is_empty());
}

#[test]
fn record_errors_carry_the_parse_reason() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("tesco.json"),
        r#"[{"name": "Pepsi", "vendor": "Tesco", "category": "drink", "brand": "PepsiCo", "price": 1.1}, {"name": "Odd", "price": "free"}]"#,
    )
    .unwrap();

    let (catalog, report) = Catalog::load_dir(tmp.path());

    assert_eq!(catalog.len(), 1);
    let error = &report.record_errors[0];
    assert_eq!(error.path.file_name().unwrap(), "tesco.json");
    assert_eq!(error.index, 1);
    assert!(error.reason.contains("invalid type"), "{}", error.reason);
    assert_eq!(catalog.brands(), vec!["PepsiCo".to_string()]);
}

#[test]
fn missing_directory_is_an_empty_catalog() {
    let tmp = TempDir::new().unwrap();
    let (catalog, report) = Catalog::load_dir(&tmp.path().join("nope"));
    assert!(catalog.is_empty());
    assert_eq!(report.sources_loaded, 0);
    assert!(report.skipped.is_empty());
}

#[test]
fn env_overlay_file_wins_over_base_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("config.toml"), "[search]\ndefault_limit = 4\n[catalog]\ndata_dir = \"products\"\n").unwrap();
    fs::write(dir.join("config.test.toml"), "[search]\ndefault_limit = 9\n").unwrap();

    let config = Config::load_from(dir, "test").expect("config");
    let settings = config.settings().expect("settings");

    assert_eq!(settings.search.default_limit, 9);
    assert_eq!(config.data_dir().unwrap(), dir.join("products"));
}
