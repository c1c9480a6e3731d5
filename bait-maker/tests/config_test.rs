// cargo test -p bait-maker --test config_test

use bait_maker::{ExportMode, config::Config};
use std::fs;

#[test]
fn test_missing_file_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf").join("bait-maker.toml");

    let config = Config::init(Some(path.as_path())).unwrap();
    assert!(config.is_first_run);
    assert_eq!(config.config_path, path);
    assert_eq!(config.sketch.tip_size, 20);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("[sketch]"));
    assert!(text.contains("debounce_ms = 150"));
}

#[test]
fn test_existing_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bait-maker.toml");
    fs::write(
        &path,
        r#"
[sketch]
tip_size = 9
range = 0.5

[overlay]
font_path = "/fonts/Sans.ttf"

[export]
mode = "white"
color_clearer = true
"#,
    )
    .unwrap();

    let config = Config::init(Some(path.as_path())).unwrap();
    assert!(!config.is_first_run);
    assert_eq!(config.sketch_params().tip_size, 9);
    assert_eq!(config.sketch.range, 0.5);
    assert_eq!(config.export.mode, ExportMode::White);
    assert!(config.session_config().color_clearer);
    assert_eq!(config.overlay.font_size, 20);
}

#[test]
fn test_broken_file_is_backed_up() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bait-maker.toml");
    fs::write(&path, "[sketch\ntip_size = ").unwrap();

    let config = Config::init(Some(path.as_path())).unwrap();
    assert!(config.is_first_run);
    assert_eq!(config.sketch.tip_size, 20);

    let backup = dir.path().join("bait-maker.toml.bak");
    assert_eq!(fs::read_to_string(backup).unwrap(), "[sketch\ntip_size = ");
    assert!(toml::from_str::<Config>(&fs::read_to_string(&path).unwrap()).is_ok());
}
