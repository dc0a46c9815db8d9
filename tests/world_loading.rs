mod common;

use std::io::Write;

use rpgchat::config::Config;
use rpgchat::game::{load_world_from_json, Direction, WorldError, WorldSummary};

fn world_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write world");
    file
}

#[test]
fn loads_the_fixture_world_from_disk() {
    let file = world_file(common::WORLD_JSON);
    let graph = load_world_from_json(file.path(), None).expect("world loads");

    assert_eq!(graph.start(), Some(1));
    assert_eq!(graph.neighbor(2, Direction::South), Some(4));
    assert_eq!(graph.neighbor(4, Direction::North), Some(2));
    assert_eq!(graph.neighbor(1, Direction::West), None);

    let summary = WorldSummary::of(&graph);
    assert_eq!(summary.cells, 5);
    assert_eq!(summary.enemies, 2);
    assert_eq!(summary.items, 1);
    assert_eq!(summary.triggers, 1);
}

#[test]
fn config_start_cell_overrides_document() {
    let file = world_file(common::WORLD_JSON);
    let graph = load_world_from_json(file.path(), Some(4)).expect("world loads");
    assert_eq!(graph.start(), Some(4));

    let err = load_world_from_json(file.path(), Some(99)).unwrap_err();
    assert!(matches!(err, WorldError::UnknownStartCell(99)));
}

#[test]
fn missing_and_malformed_files_are_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_world_from_json(dir.path().join("nope.json"), None).unwrap_err();
    assert!(matches!(err, WorldError::Io(_)));

    let file = world_file("{ not json");
    let err = load_world_from_json(file.path(), None).unwrap_err();
    assert!(matches!(err, WorldError::Parse(_)));
}

#[test]
fn shipped_world_document_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/world.json");
    let graph = load_world_from_json(path, None).expect("data/world.json loads");
    assert!(graph.len() >= 5);
    assert!(graph.start().is_some());
}

#[tokio::test]
async fn config_round_trips_through_a_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    Config::create_default(&path).await.expect("write default");

    let config = Config::load(&path).await.expect("load default");
    assert_eq!(config.server.port, 8888);
    assert_eq!(config.world.path, "data/world.json");

    let missing = Config::load_or_default(dir.path().join("absent.toml"))
        .await
        .expect("defaults");
    assert_eq!(missing.game.escape_chance, 0.3);
}

#[tokio::test]
async fn invalid_config_values_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    tokio::fs::write(&path, "[game]\nescape_chance = 1.5\n")
        .await
        .expect("write");
    assert!(Config::load(&path).await.is_err());
}
