use scholar_kernel::config::{ConfigError, load_config, load_config_or_default};
use scholar_kernel::domain::config::AppConfig;

#[test]
fn required_file_must_exist() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_config::<AppConfig>(Some(dir.path().join("nowhere.toml"))).expect_err("missing file");

    assert!(matches!(err, ConfigError::Config { .. }));
    assert!(err.to_string().contains("Failed to build config"), "unexpected message: {err}");
}

#[test]
fn file_values_are_loaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("registrar.toml");
    std::fs::write(&path, "[storage]\nfile_name = \"records.json\"\n\n[logging]\nconsole = false\n")
        .expect("write config");

    let cfg: AppConfig = load_config(Some(&path)).expect("config loads");
    assert_eq!(cfg.storage.file_name, "records.json");
    assert!(!cfg.logging.console);
}

#[test]
fn malformed_file_is_an_error_even_when_optional() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("registrar.toml");
    std::fs::write(&path, "[grading]\npassing_average = \"high\"\n").expect("write config");

    assert!(load_config_or_default::<AppConfig>(Some(&path)).is_err());
}
