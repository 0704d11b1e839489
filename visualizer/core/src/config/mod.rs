//! TOML Configuration File Support
//!
//! Centralized configuration loading for the engine, from a TOML file at
//! `~/.config/algo-visualizer/engine.toml`.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/algo-visualizer/engine.toml` (typically
//!   `~/.config/algo-visualizer/engine.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [playback]
//! speed = 70
//! algorithm = "dijkstra"
//!
//! [sorting]
//! array_size = 24
//! min_value = 5
//! max_value = 104
//! seed = 7
//! algorithm = "quick"
//!
//! [graph]
//! start = "A"
//! end = "H"
//! algorithm = "bfs"
//!
//! [tree]
//! algorithm = "search"
//! search_key = 65
//!
//! [recursion]
//! algorithm = "hanoi"
//! input = 3
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{ArraySpec, Graph};
use crate::generators::{
    Algorithm, GraphAlgorithm, Mode, RecursionAlgorithm, SortAlgorithm, TreeAlgorithm,
};
use crate::playback::{ModeInputs, Speed};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

/// A resolved value whose origin is tracked
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigField {
    /// `[playback] speed`
    Speed,
    /// `[playback] algorithm`
    Algorithm,
    /// `[sorting] array_size`
    ArraySize,
    /// `[sorting] min_value`
    MinValue,
    /// `[sorting] max_value`
    MaxValue,
    /// `[sorting] seed`
    Seed,
    /// `[sorting] algorithm`
    SortAlgorithm,
    /// `[graph] start`
    GraphStart,
    /// `[graph] end`
    GraphEnd,
    /// `[graph] algorithm`
    GraphAlgorithm,
    /// `[tree] algorithm`
    TreeAlgorithm,
    /// `[tree] search_key`
    SearchKey,
    /// `[recursion] algorithm`
    RecursionAlgorithm,
    /// `[recursion] input`
    RecursionInput,
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Playback section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackToml {
    /// Playback speed, clamped to 1..=100
    pub speed: Option<i64>,

    /// Algorithm selected at startup, any family
    pub algorithm: Option<String>,
}

/// Sorting section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SortingToml {
    /// Number of bars
    pub array_size: Option<usize>,

    /// Smallest bar value
    pub min_value: Option<u32>,

    /// Largest bar value
    pub max_value: Option<u32>,

    /// Seed for the demo array
    pub seed: Option<u64>,

    /// Default sort
    pub algorithm: Option<String>,
}

/// Graph section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphToml {
    /// Source node id
    pub start: Option<String>,

    /// Destination node id
    pub end: Option<String>,

    /// Default graph search
    pub algorithm: Option<String>,
}

/// Tree section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeToml {
    /// Default traversal
    pub algorithm: Option<String>,

    /// Key looked up by the search traversal
    pub search_key: Option<i64>,
}

/// Recursion section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecursionToml {
    /// Default recursion
    pub algorithm: Option<String>,

    /// Argument of the root call
    pub input: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Playback section
    pub playback: PlaybackToml,

    /// Sorting section
    pub sorting: SortingToml,

    /// Graph section
    pub graph: GraphToml,

    /// Tree section
    pub tree: TreeToml,

    /// Recursion section
    pub recursion: RecursionToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved engine configuration
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Playback speed
    pub speed: Speed,

    /// Shape of the demo array
    pub array: ArraySpec,

    /// Seed for the demo array; entropy when absent
    pub seed: Option<u64>,

    /// Algorithm selected at startup; the sort default when absent
    pub algorithm: Option<Algorithm>,

    /// Default sort
    pub sort_algorithm: SortAlgorithm,

    /// Default graph search
    pub graph_algorithm: GraphAlgorithm,

    /// Default traversal
    pub tree_algorithm: TreeAlgorithm,

    /// Default recursion
    pub recursion_algorithm: RecursionAlgorithm,

    /// Graph source node
    pub graph_start: String,

    /// Graph destination node
    pub graph_end: String,

    /// Tree search key and recursion input
    pub inputs: ModeInputs,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Last layer that set any value
    source: ConfigSource,

    /// Layer that set each value; absent means default
    origins: HashMap<ConfigField, ConfigSource>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed: Speed::default(),
            array: ArraySpec::default(),
            seed: None,
            algorithm: None,
            sort_algorithm: SortAlgorithm::Bubble,
            graph_algorithm: GraphAlgorithm::Bfs,
            tree_algorithm: TreeAlgorithm::Inorder,
            recursion_algorithm: RecursionAlgorithm::Fibonacci,
            graph_start: "A".to_string(),
            graph_end: "H".to_string(),
            inputs: ModeInputs::default(),
            config_file_path: None,
            source: ConfigSource::Default,
            origins: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Layer that resolved `field`
    #[must_use]
    pub fn source_of(&self, field: ConfigField) -> ConfigSource {
        self.origins
            .get(&field)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }

    fn record(&mut self, field: ConfigField, source: ConfigSource) {
        self.origins.insert(field, source);
        self.source = source;
    }

    /// Recursion the configured input applies to
    ///
    /// The startup algorithm when it is a recursion, otherwise the
    /// recursion default.
    #[must_use]
    pub fn recursion_target(&self) -> RecursionAlgorithm {
        match self.initial_algorithm() {
            Algorithm::Recursion(recursion) => recursion,
            _ => self.recursion_algorithm,
        }
    }

    /// Fit a defaulted recursion input to the recursion it will drive
    ///
    /// An input set by any layer is left alone for [`EngineConfig::validate`].
    fn settle_recursion_input(&mut self) {
        if self.source_of(ConfigField::RecursionInput) != ConfigSource::Default {
            return;
        }
        let max = self.recursion_target().max_input();
        self.inputs.recursion = self
            .inputs
            .recursion
            .clamp(RecursionAlgorithm::MIN_INPUT, max);
    }

    /// Algorithm selected when the engine starts
    #[must_use]
    pub fn initial_algorithm(&self) -> Algorithm {
        self.algorithm.unwrap_or(Algorithm::Sort(self.sort_algorithm))
    }

    /// Configured default algorithm of `mode`
    #[must_use]
    pub fn algorithm_for(&self, mode: Mode) -> Algorithm {
        match mode {
            Mode::Sorting => self.sort_algorithm.into(),
            Mode::Graph => self.graph_algorithm.into(),
            Mode::Tree => self.tree_algorithm.into(),
            Mode::Recursion => self.recursion_algorithm.into(),
        }
    }

    /// Random source for the demo array
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Check that every value is usable by the engine
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.array.size;
        if !(ArraySpec::MIN_SIZE..=ArraySpec::MAX_SIZE).contains(&size) {
            return Err(ConfigError::ValidationError(format!(
                "array_size {size} must be within {}..={}",
                ArraySpec::MIN_SIZE,
                ArraySpec::MAX_SIZE
            )));
        }
        if self.array.min_value == 0 {
            return Err(ConfigError::ValidationError(
                "min_value must be positive".to_string(),
            ));
        }
        if self.array.min_value > self.array.max_value {
            return Err(ConfigError::ValidationError(format!(
                "min_value {} exceeds max_value {}",
                self.array.min_value, self.array.max_value
            )));
        }

        let graph = Graph::demo();
        for id in [&self.graph_start, &self.graph_end] {
            if !graph.contains(id) {
                return Err(ConfigError::ValidationError(format!(
                    "graph node {id:?} does not exist"
                )));
            }
        }

        let key = self.inputs.search_key;
        if !(ModeInputs::SEARCH_KEY_MIN..=ModeInputs::SEARCH_KEY_MAX).contains(&key) {
            return Err(ConfigError::ValidationError(format!(
                "search_key {key} must be within {}..={}",
                ModeInputs::SEARCH_KEY_MIN,
                ModeInputs::SEARCH_KEY_MAX
            )));
        }

        let recursion = self.recursion_target();
        let max = recursion.max_input();
        let input = self.inputs.recursion;
        if !(RecursionAlgorithm::MIN_INPUT..=max).contains(&input) {
            return Err(ConfigError::ValidationError(format!(
                "recursion input {input} must be within {}..={max} for {recursion}",
                RecursionAlgorithm::MIN_INPUT,
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/algo-visualizer/engine.toml` or
/// `~/.config/algo-visualizer/engine.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("algo-visualizer").join("engine.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resolved values fail validation. A missing config file is not an
/// error (defaults are used).
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read, parsed or
/// validated.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, reading environment variables through `env`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<EngineConfig, ConfigError> {
    let mut config = EngineConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: EngineToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config)?;
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.settle_recursion_input();
    config.validate()?;
    Ok(config)
}

/// Parse an algorithm id that must belong to one family
fn parse_family<T>(
    section: &str,
    id: &str,
    pick: impl FnOnce(Algorithm) -> Option<T>,
) -> Result<T, ConfigError> {
    let algorithm: Algorithm = id
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("[{section}] {e}")))?;
    pick(algorithm).ok_or_else(|| {
        ConfigError::ValidationError(format!(
            "[{section}] algorithm {id:?} belongs to {} mode",
            algorithm.mode()
        ))
    })
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut EngineConfig, toml: &EngineToml) -> Result<(), ConfigError> {
    // Playback
    if let Some(speed) = toml.playback.speed {
        config.speed = Speed::clamped(speed);
        config.record(ConfigField::Speed, ConfigSource::File);
    }
    if let Some(ref id) = toml.playback.algorithm {
        let algorithm = id
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("[playback] {e}")))?;
        config.algorithm = Some(algorithm);
        config.record(ConfigField::Algorithm, ConfigSource::File);
    }

    // Sorting
    if let Some(size) = toml.sorting.array_size {
        config.array.size = size;
        config.record(ConfigField::ArraySize, ConfigSource::File);
    }
    if let Some(min) = toml.sorting.min_value {
        config.array.min_value = min;
        config.record(ConfigField::MinValue, ConfigSource::File);
    }
    if let Some(max) = toml.sorting.max_value {
        config.array.max_value = max;
        config.record(ConfigField::MaxValue, ConfigSource::File);
    }
    if toml.sorting.seed.is_some() {
        config.seed = toml.sorting.seed;
        config.record(ConfigField::Seed, ConfigSource::File);
    }
    if let Some(ref id) = toml.sorting.algorithm {
        config.sort_algorithm = parse_family("sorting", id, |a| match a {
            Algorithm::Sort(s) => Some(s),
            _ => None,
        })?;
        config.record(ConfigField::SortAlgorithm, ConfigSource::File);
    }

    // Graph
    if let Some(ref start) = toml.graph.start {
        config.graph_start = start.clone();
        config.record(ConfigField::GraphStart, ConfigSource::File);
    }
    if let Some(ref end) = toml.graph.end {
        config.graph_end = end.clone();
        config.record(ConfigField::GraphEnd, ConfigSource::File);
    }
    if let Some(ref id) = toml.graph.algorithm {
        config.graph_algorithm = parse_family("graph", id, |a| match a {
            Algorithm::Graph(g) => Some(g),
            _ => None,
        })?;
        config.record(ConfigField::GraphAlgorithm, ConfigSource::File);
    }

    // Tree
    if let Some(ref id) = toml.tree.algorithm {
        config.tree_algorithm = parse_family("tree", id, |a| match a {
            Algorithm::Tree(t) => Some(t),
            _ => None,
        })?;
        config.record(ConfigField::TreeAlgorithm, ConfigSource::File);
    }
    if let Some(key) = toml.tree.search_key {
        config.inputs.search_key = key;
        config.record(ConfigField::SearchKey, ConfigSource::File);
    }

    // Recursion
    if let Some(ref id) = toml.recursion.algorithm {
        config.recursion_algorithm = parse_family("recursion", id, |a| match a {
            Algorithm::Recursion(r) => Some(r),
            _ => None,
        })?;
        config.record(ConfigField::RecursionAlgorithm, ConfigSource::File);
    }
    if let Some(input) = toml.recursion.input {
        config.inputs.recursion = input;
        config.record(ConfigField::RecursionInput, ConfigSource::File);
    }
    Ok(())
}

/// Apply environment variable overrides to the config
///
/// Unparseable values are skipped with a warning.
fn apply_env_config(config: &mut EngineConfig, env: impl Fn(&str) -> Option<String>) {
    fn parsed<T: std::str::FromStr>(
        env: &impl Fn(&str) -> Option<String>,
        key: &str,
    ) -> Option<T> {
        let raw = env(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring unparseable environment override");
                None
            }
        }
    }

    if let Some(speed) = parsed::<i64>(&env, "VISUALIZER_SPEED") {
        config.speed = Speed::clamped(speed);
        config.record(ConfigField::Speed, ConfigSource::Env);
    }
    if let Some(size) = parsed::<usize>(&env, "VISUALIZER_ARRAY_SIZE") {
        config.array.size = size;
        config.record(ConfigField::ArraySize, ConfigSource::Env);
    }
    if let Some(seed) = parsed::<u64>(&env, "VISUALIZER_SEED") {
        config.seed = Some(seed);
        config.record(ConfigField::Seed, ConfigSource::Env);
    }
    if let Some(start) = env("VISUALIZER_GRAPH_START") {
        config.graph_start = start.trim().to_string();
        config.record(ConfigField::GraphStart, ConfigSource::Env);
    }
    if let Some(end) = env("VISUALIZER_GRAPH_END") {
        config.graph_end = end.trim().to_string();
        config.record(ConfigField::GraphEnd, ConfigSource::Env);
    }
    if let Some(input) = parsed::<u32>(&env, "VISUALIZER_RECURSION_INPUT") {
        config.inputs.recursion = input;
        config.record(ConfigField::RecursionInput, ConfigSource::Env);
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Speed override
    pub speed: Option<i64>,

    /// Startup algorithm override
    pub algorithm: Option<Algorithm>,

    /// Demo array seed override
    pub seed: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set speed override
    #[must_use]
    pub fn with_speed(mut self, speed: i64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Set startup algorithm override
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set seed override
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(speed) = self.speed {
            config.speed = Speed::clamped(speed);
            config.record(ConfigField::Speed, ConfigSource::Cli);
        }
        if let Some(algorithm) = self.algorithm {
            config.algorithm = Some(algorithm);
            config.record(ConfigField::Algorithm, ConfigSource::Cli);
            config.settle_recursion_input();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
            config.record(ConfigField::Seed, ConfigSource::Cli);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.speed, Speed::default());
        assert_eq!(config.array, ArraySpec::default());
        assert_eq!(config.seed, None);
        assert_eq!(config.initial_algorithm(), Algorithm::Sort(SortAlgorithm::Bubble));
        assert_eq!(config.graph_start, "A");
        assert_eq!(config.graph_end, "H");
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("algo-visualizer"));
            assert!(p.to_string_lossy().ends_with("engine.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = toml_file(
            r#"
[playback]
speed = 70

[sorting]
array_size = 24
min_value = 10
max_value = 60
seed = 7
algorithm = "quick"

[graph]
start = "B"
end = "G"
algorithm = "dijkstra"

[tree]
algorithm = "search"
search_key = 65

[recursion]
algorithm = "hanoi"
input = 3
"#,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.speed.get(), 70);
        assert_eq!(config.array.size, 24);
        assert_eq!(config.array.min_value, 10);
        assert_eq!(config.array.max_value, 60);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.sort_algorithm, SortAlgorithm::Quick);
        assert_eq!(config.graph_start, "B");
        assert_eq!(config.graph_end, "G");
        assert_eq!(config.algorithm_for(Mode::Graph), GraphAlgorithm::Dijkstra.into());
        assert_eq!(config.tree_algorithm, TreeAlgorithm::Search);
        assert_eq!(config.inputs.search_key, 65);
        assert_eq!(config.recursion_algorithm, RecursionAlgorithm::Hanoi);
        assert_eq!(config.inputs.recursion, 3);
        assert_eq!(config.initial_algorithm(), SortAlgorithm::Quick.into());
        assert_eq!(config.source(), ConfigSource::File);
    }

    #[test]
    fn test_playback_algorithm_selects_any_family() {
        let file = toml_file("[playback]\nalgorithm = \"levelorder\"\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.initial_algorithm(), TreeAlgorithm::Levelorder.into());
    }

    #[test]
    fn test_speed_is_clamped() {
        let file = toml_file("[playback]\nspeed = 400\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.speed, Speed::MAX);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/engine.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    // =========================================================================
    // Rejected Configuration Tests
    // =========================================================================

    #[test]
    fn test_malformed_toml_error() {
        let file = toml_file("[sorting\narray_size = \"many\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_algorithm_in_wrong_section() {
        let file = toml_file("[sorting]\nalgorithm = \"bfs\"\n");
        let err = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap_err();
        assert!(err.to_string().contains("graph mode"), "{err}");
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let file = toml_file("[recursion]\nalgorithm = \"ackermann\"\n");
        let err = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            "[sorting]\narray_size = 1\n",
            "[sorting]\narray_size = 101\n",
            "[sorting]\nmin_value = 0\n",
            "[sorting]\nmin_value = 90\nmax_value = 20\n",
            "[graph]\nstart = \"Q\"\n",
            "[tree]\nsearch_key = 1000\n",
            "[recursion]\nalgorithm = \"hanoi\"\ninput = 5\n",
        ];
        for content in cases {
            let file = toml_file(content);
            let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
            assert!(
                matches!(result, Err(ConfigError::ValidationError(_))),
                "{content}"
            );
        }
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file("[playback]\nspeed = 20\n\n[graph]\nend = \"F\"\n");
        let env: HashMap<&str, &str> = HashMap::from([
            ("VISUALIZER_SPEED", "90"),
            ("VISUALIZER_GRAPH_END", "G"),
            ("VISUALIZER_SEED", "11"),
        ]);

        let config = load_config_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.speed.get(), 90);
        assert_eq!(config.graph_end, "G");
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_unparseable_env_is_skipped() {
        let config = load_config_with_env(None, |k| {
            (k == "VISUALIZER_ARRAY_SIZE").then(|| "lots".to_string())
        })
        .unwrap();
        assert_eq!(config.array.size, ArraySpec::default().size);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_env_values_are_validated() {
        let result = load_config_with_env(None, |k| {
            (k == "VISUALIZER_RECURSION_INPUT").then(|| "99".to_string())
        });
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = EngineConfig::default();
        config.speed = Speed::clamped(10);
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new()
            .with_speed(95)
            .with_algorithm(GraphAlgorithm::Dfs.into())
            .apply(&mut config);

        assert_eq!(config.speed.get(), 95);
        assert_eq!(config.initial_algorithm(), GraphAlgorithm::Dfs.into());
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_field_sources_follow_their_layer() {
        let file = toml_file("[sorting]\narray_size = 12\n\n[graph]\nend = \"F\"\n");
        let mut config = load_config_with_env(Some(file.path().to_path_buf()), |k| {
            (k == "VISUALIZER_SEED").then(|| "9".to_string())
        })
        .unwrap();
        ConfigOverrides::new().with_speed(60).apply(&mut config);

        assert_eq!(config.source_of(ConfigField::ArraySize), ConfigSource::File);
        assert_eq!(config.source_of(ConfigField::GraphEnd), ConfigSource::File);
        assert_eq!(config.source_of(ConfigField::Seed), ConfigSource::Env);
        assert_eq!(config.source_of(ConfigField::Speed), ConfigSource::Cli);
        assert_eq!(config.source_of(ConfigField::GraphStart), ConfigSource::Default);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    // =========================================================================
    // Recursion Input Tests
    // =========================================================================

    #[test]
    fn test_defaulted_input_fits_selected_recursion() {
        let file = toml_file("[recursion]\nalgorithm = \"hanoi\"\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.recursion_algorithm, RecursionAlgorithm::Hanoi);
        assert_eq!(config.inputs.recursion, RecursionAlgorithm::Hanoi.max_input());
        assert_eq!(config.source_of(ConfigField::RecursionInput), ConfigSource::Default);

        let file = toml_file("[recursion]\nalgorithm = \"factorial\"\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.inputs.recursion, ModeInputs::default().recursion);
    }

    #[test]
    fn test_input_checked_against_startup_recursion() {
        let file = toml_file("[playback]\nalgorithm = \"hanoi\"\n\n[recursion]\ninput = 7\n");
        let err = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap_err();
        assert!(err.to_string().contains("hanoi"), "{err}");

        let file = toml_file("[playback]\nalgorithm = \"hanoi\"\n");
        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.recursion_target(), RecursionAlgorithm::Hanoi);
        assert_eq!(config.inputs.recursion, 4);
    }

    #[test]
    fn test_cli_algorithm_refits_defaulted_input() {
        let mut config = load_config_with_env(None, no_env).unwrap();
        ConfigOverrides::new()
            .with_algorithm(RecursionAlgorithm::Hanoi.into())
            .apply(&mut config);
        assert_eq!(config.inputs.recursion, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = EngineConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut config = EngineConfig::default();
        config.seed = Some(42);
        let a = crate::entities::Bars::random(&mut config.rng(), &config.array);
        let b = crate::entities::Bars::random(&mut config.rng(), &config.array);
        assert_eq!(a, b);
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Cli), "CLI");
        assert_eq!(format!("{}", ConfigSource::Env), "environment");
        assert_eq!(format!("{}", ConfigSource::File), "config file");
        assert_eq!(format!("{}", ConfigSource::Default), "default");
    }

    #[test]
    fn test_config_error_display() {
        let read_err = ConfigError::ReadError {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = format!("{}", read_err);
        assert!(msg.contains("/test/path"));
        assert!(msg.contains("Failed to read"));
    }
}
