//! Options persistence against real files

use dragsort::config::GroupSpec;
use dragsort::SortOptions;

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dragsort").join("options.yaml");

    let mut options = SortOptions::default();
    options.draggable = ".card".parse().unwrap();
    options.handle = Some(".grip".parse().unwrap());
    options.delay_ms = 200;
    options.swap_threshold = 0.65;
    options.group = Some(GroupSpec::Name("board".into()));
    options.force_fallback = true;

    // save_to creates the missing parent directory
    options.save_to(&path).unwrap();
    let loaded = SortOptions::load_from(&path).unwrap();
    assert_eq!(loaded, options);
}

#[test]
fn test_load_from_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(SortOptions::load_from(&dir.path().join("absent.yaml")).is_err());
}

#[test]
fn test_load_from_unparseable_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.yaml");
    std::fs::write(&path, "swap_threshold: [not, a, number").unwrap();
    assert!(SortOptions::load_from(&path).is_err());
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.yaml");
    std::fs::write(&path, "delay_ms: 300\nswap_threshold: 0.5\n").unwrap();

    let loaded = SortOptions::load_from(&path).unwrap();
    assert_eq!(loaded.delay_ms, 300);
    assert_eq!(loaded.swap_threshold, 0.5);
    // Everything unspecified keeps its default
    assert_eq!(loaded.animation_ms, 150);
    assert_eq!(loaded.chosen_class, "sortable-chosen");
}
