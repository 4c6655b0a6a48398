use sargraph::core::config::Config;
use sargraph::core::datetime::{DateFormatChoice, DatePattern, TimeFormat, AUTOMATIC_DETECTION};
use sargraph::core::parser::FamilyRegistry;
use sargraph::core::session::Session;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.linux_date_format, AUTOMATIC_DETECTION);
    assert!(config.schema_overlay.is_none());
}

#[test]
fn test_config_roundtrip_through_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.set_linux_date_format("DD/MM/YYYY 23:59:59").unwrap();
    config.save_to(&path).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"linux_date_format\": \"DD/MM/YYYY 23:59:59\""));

    let loaded = Config::load_from(&path).unwrap();
    let options = loaded.parser_options().unwrap();
    assert_eq!(
        options.linux_date_format.date,
        DateFormatChoice::Fixed(DatePattern::SlashDmy)
    );
    assert_eq!(options.linux_date_format.time, Some(TimeFormat::TwentyFourHour));
}

#[test]
fn test_partial_document_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"schema_overlay": "/tmp/extra.json"}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.linux_date_format, AUTOMATIC_DETECTION);
    assert!(config.schema_overlay.is_some());
}

#[test]
fn test_fixed_date_format_reaches_the_parser() {
    let mut config = Config::default();
    config.set_linux_date_format("DD/MM/YYYY 23:59:59").unwrap();

    let mut session = Session::new(
        Arc::new(config.schema_registry().unwrap()),
        FamilyRegistry::with_defaults(),
        config.parser_options().unwrap(),
    );
    session
        .ingest_lines([
            "Linux 3.10.0 (db01)  05/03/2016  _x86_64_  (2 CPU)",
            "00:00:01        proc/s   cswch/s",
            "00:10:01          1.50    900.00",
        ])
        .unwrap();

    let start = session.window().start().unwrap();
    assert_eq!(start.date(), chrono::NaiveDate::from_ymd_opt(2016, 3, 5).unwrap());
}

#[test]
fn test_overlay_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let overlay = temp_dir.path().join("overlay.json");
    fs::write(
        &overlay,
        r#"{"systems": [{"name": "HPUX", "stats": [
            {"name": "cpu", "header": "%usr %sys %wio %idle", "graph": "IGNORE"}
        ]}]}"#,
    )
    .unwrap();

    let mut config = Config::default();
    config.set_schema_overlay(overlay);
    let registry = config.schema_registry().unwrap();
    assert_eq!(
        registry.stat_definition("HPUX", "cpu").unwrap().graph,
        "IGNORE"
    );

    config.set_schema_overlay(temp_dir.path().join("missing.json"));
    assert!(config.schema_registry().is_err());
}
