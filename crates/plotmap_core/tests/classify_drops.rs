use std::sync::Once;

use plotmap_core::{update, AppState, InputFile, Msg};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(plotmap_logging::initialize_for_tests);
}

fn file(name: &str) -> InputFile {
    InputFile::new(name.to_string(), format!("content of {name}"))
}

fn drop_files(state: AppState, names: &[&str]) -> AppState {
    let files = names.iter().map(|name| file(name)).collect();
    let (state, effects) = update(state, Msg::FilesDropped(files));
    assert!(effects.is_empty());
    state
}

fn geometry_names(state: &AppState) -> Vec<String> {
    let mut names = state.view().plot_files;
    names.sort();
    names
}

#[test]
fn companion_drop_replaces_earlier_geojson() {
    init_logging();
    let state = drop_files(AppState::new(), &["plot.geojson"]);
    assert_eq!(geometry_names(&state), vec!["plot.geojson"]);

    let state = drop_files(state, &["a.shp", "a.dbf"]);
    assert_eq!(geometry_names(&state), vec!["a.dbf", "a.shp"]);
}

#[test]
fn companion_drops_do_not_merge_across_events() {
    init_logging();
    let state = drop_files(AppState::new(), &["a.shp", "a.dbf"]);
    let state = drop_files(state, &["b.SHP", "b.shx", "b.prj", "b.cpg"]);
    assert_eq!(geometry_names(&state), vec!["b.SHP", "b.cpg", "b.prj", "b.shx"]);
}

#[test]
fn geojson_replaces_companion_group() {
    init_logging();
    let state = drop_files(AppState::new(), &["a.shp", "a.dbf"]);
    let state = drop_files(state, &["Fields.GEOJSON"]);
    assert_eq!(geometry_names(&state), vec!["Fields.GEOJSON"]);
}

#[test]
fn mixed_drop_keeps_the_companion_group() {
    init_logging();
    let state = drop_files(AppState::new(), &["a.shp", "plot.geojson", "a.dbf"]);
    assert_eq!(geometry_names(&state), vec!["a.dbf", "a.shp"]);
}

#[test]
fn sample_slot_holds_latest_table() {
    init_logging();
    let state = drop_files(AppState::new(), &["first.csv"]);
    assert_eq!(state.view().sample_file.as_deref(), Some("first.csv"));

    let state = drop_files(state, &["a.shp", "second.XLSX"]);
    assert_eq!(state.view().sample_file.as_deref(), Some("second.XLSX"));

    let state = drop_files(state, &["third.csv", "fourth.csv"]);
    assert_eq!(state.view().sample_file.as_deref(), Some("fourth.csv"));
}

#[test]
fn unrecognized_files_are_ignored() {
    init_logging();
    let mut state = drop_files(AppState::new(), &["notes.txt", "photo.png"]);
    assert!(state.view().plot_files.is_empty());
    assert_eq!(state.view().sample_file, None);
    assert!(!state.consume_dirty());
}

#[test]
fn accepted_drop_marks_dirty() {
    init_logging();
    let mut state = drop_files(AppState::new(), &["plot.geojson"]);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}
