//! Configuration loading feeding a live engine

use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

use visualizer_core::{
    load_config_with_env, Algorithm, ColorKey, ConfigError, ConfigField, ConfigOverrides,
    ConfigSource, Engine, GraphAlgorithm, Phase, RecursionAlgorithm, Scene, SortAlgorithm,
};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[tokio::test(start_paused = true)]
async fn test_file_config_drives_engine() {
    let file = write_config(
        r#"
[playback]
speed = 90
algorithm = "dijkstra"

[graph]
start = "G"
end = "C"
"#,
    );
    let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
    assert_eq!(config.source(), ConfigSource::File);

    let (tx, _rx) = mpsc::channel(64);
    let mut engine = Engine::new(&config, tx);
    assert_eq!(engine.algorithm(), Algorithm::Graph(GraphAlgorithm::Dijkstra));
    assert_eq!(engine.speed().get(), 90);

    engine.play().unwrap();
    engine.wait_idle().await;
    assert_eq!(engine.phase(), Phase::Idle);

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.order.first().map(String::as_str), Some("G"));
    assert_eq!(snapshot.order.last().map(String::as_str), Some("C"));
    let Scene::Graph { edges, .. } = snapshot.scene else {
        panic!("expected a graph scene");
    };
    let weight: u32 = edges
        .iter()
        .filter(|e| e.color == ColorKey::Path)
        .map(|e| e.weight)
        .sum();
    assert_eq!(weight, 8);
}

#[tokio::test(start_paused = true)]
async fn test_env_and_cli_layer_over_file() {
    let file = write_config(
        r#"
[sorting]
array_size = 12
algorithm = "insertion"
"#,
    );
    let env = |key: &str| match key {
        "VISUALIZER_ARRAY_SIZE" => Some("6".to_string()),
        "VISUALIZER_SEED" => Some("not-a-number".to_string()),
        _ => None,
    };
    let mut config = load_config_with_env(Some(file.path().to_path_buf()), env).unwrap();
    assert_eq!(config.source(), ConfigSource::Env);
    assert_eq!(config.seed, None);

    ConfigOverrides::new()
        .with_seed(4)
        .with_algorithm(Algorithm::Sort(SortAlgorithm::Quick))
        .apply(&mut config);
    assert_eq!(config.source(), ConfigSource::Cli);

    let (tx, _rx) = mpsc::channel(64);
    let mut engine = Engine::new(&config, tx);
    assert_eq!(engine.snapshot().bars().map(<[_]>::len), Some(6));
    assert_eq!(engine.algorithm(), Algorithm::Sort(SortAlgorithm::Quick));

    engine.play().unwrap();
    engine.wait_idle().await;
    let values: Vec<u32> = engine.snapshot().bars().unwrap().iter().map(|b| b.value).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(start_paused = true)]
async fn test_hanoi_section_without_input_plays() {
    let file = write_config(
        r#"
[playback]
algorithm = "hanoi"

[recursion]
algorithm = "hanoi"
"#,
    );
    let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
    assert_eq!(config.source_of(ConfigField::RecursionInput), ConfigSource::Default);

    let (tx, _rx) = mpsc::channel(64);
    let mut engine = Engine::new(&config, tx);
    assert_eq!(engine.algorithm(), Algorithm::Recursion(RecursionAlgorithm::Hanoi));

    engine.play().unwrap();
    engine.wait_idle().await;
    let Scene::Calls { nodes } = engine.snapshot().scene else {
        panic!("expected a call scene");
    };
    assert_eq!(nodes[0].label, "H(4, A→C)");
    assert_eq!(nodes[0].result, Some(15));
    assert_eq!(nodes.len(), 15);
}

#[test]
fn test_invalid_file_is_rejected_before_engine_exists() {
    let file = write_config("[graph]\nstart = \"Q\"\n");
    let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));

    let file = write_config("[tree]\nalgorithm = \"bfs\"\n");
    let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
    assert!(result.is_err());
}
