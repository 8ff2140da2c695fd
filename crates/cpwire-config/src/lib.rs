//! Configuration system for cpwire.
//!
//! Load client configuration from TOML or YAML files to choose the solver,
//! control console output and set solve parameters without code changes.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use cpwire_config::ClientConfig;
//!
//! let config = ClientConfig::from_toml_str(r#"
//!     solver = "ws://localhost:8080/solve"
//!     print_log = false
//!
//!     [parameters]
//!     time_limit = 30
//!     nb_workers = 4
//!     search_type = "lns"
//! "#).unwrap();
//!
//! assert_eq!(config.parameters.time_limit, Some(30.0));
//! assert!(!config.print_log);
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use cpwire_config::ClientConfig;
//!
//! let config = ClientConfig::load("cpwire.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Environment variable consulted when no solver is configured.
pub const SOLVER_ENV: &str = "CPWIRE_SOLVER";

/// Executable name used when nothing else locates a solver.
pub const DEFAULT_SOLVER: &str = "cpsolver";

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ClientConfig {
    /// Solver executable path or WebSocket URL.
    pub solver: Option<String>,

    /// Extra command-line arguments for a spawned solver.
    pub solver_args: Vec<String>,

    /// Print solver log, warning and error lines to the console.
    pub print_log: bool,

    /// Whether the solver should color its log output.
    pub colors: ColorMode,

    /// Whether to ask the solver for batched results.
    pub batch_results: BatchMode,

    /// Solve parameters sent with every command.
    pub parameters: Parameters,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            solver: None,
            solver_args: Vec::new(),
            print_log: true,
            colors: ColorMode::default(),
            batch_results: BatchMode::default(),
            parameters: Parameters::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Sets the solver executable path or URL.
    pub fn with_solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = Some(solver.into());
        self
    }

    /// Appends a command-line argument for a spawned solver.
    pub fn with_solver_arg(mut self, arg: impl Into<String>) -> Self {
        self.solver_args.push(arg.into());
        self
    }

    /// Enables or disables console printing of solver messages.
    pub fn with_print_log(mut self, print_log: bool) -> Self {
        self.print_log = print_log;
        self
    }

    pub fn with_colors(mut self, colors: ColorMode) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_batch_results(mut self, batch_results: BatchMode) -> Self {
        self.batch_results = batch_results;
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Checks values the solver would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(solver) = &self.solver {
            if solver.trim().is_empty() {
                return Err(ConfigError::Invalid("solver must not be empty".to_string()));
            }
        }
        self.parameters.validate()
    }

    /// Locates the solver.
    ///
    /// Resolution order: the `solver` field, the `CPWIRE_SOLVER` environment
    /// variable, a `cpsolver` executable next to the running program, and
    /// finally a bare `cpsolver` looked up on `PATH`.
    pub fn resolve_solver(&self) -> SolverLocation {
        self.resolve_with(|name| std::env::var(name).ok(), companion_solver())
    }

    /// Same as [`resolve_solver`](Self::resolve_solver) with injected lookups.
    pub fn resolve_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
        companion: Option<PathBuf>,
    ) -> SolverLocation {
        if let Some(solver) = self.solver.as_deref().filter(|s| !s.is_empty()) {
            return SolverLocation::parse(solver);
        }
        if let Some(solver) = env(SOLVER_ENV).filter(|s| !s.is_empty()) {
            return SolverLocation::parse(&solver);
        }
        if let Some(path) = companion {
            return SolverLocation::Executable(path);
        }
        SolverLocation::Executable(PathBuf::from(DEFAULT_SOLVER))
    }
}

/// Returns the companion solver next to the running executable, if installed.
fn companion_solver() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidate = exe
        .parent()?
        .join(format!("{DEFAULT_SOLVER}{}", std::env::consts::EXE_SUFFIX));
    candidate.is_file().then_some(candidate)
}

/// Where the solver runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverLocation {
    /// Local executable spawned as a child process.
    Executable(PathBuf),
    /// Remote solver reached over a WebSocket.
    Url(String),
}

impl SolverLocation {
    /// Classifies a configured solver string.
    ///
    /// `ws://`, `wss://`, `http://` and `https://` prefixes select a WebSocket;
    /// anything else is a filesystem path.
    pub fn parse(value: &str) -> Self {
        const SCHEMES: [&str; 4] = ["ws://", "wss://", "http://", "https://"];
        let lower = value.to_ascii_lowercase();
        if SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            SolverLocation::Url(value.to_string())
        } else {
            SolverLocation::Executable(PathBuf::from(value))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, SolverLocation::Url(_))
    }
}

impl std::fmt::Display for SolverLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverLocation::Executable(path) => write!(f, "{}", path.display()),
            SolverLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Color support announced to the solver in the handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Colors when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Auto => is_terminal,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Batched results policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Batch when no incremental solution or bound callback is registered.
    #[default]
    Auto,
    Always,
    Never,
}

impl BatchMode {
    pub fn resolve(self, has_incremental_callbacks: bool) -> bool {
        match self {
            BatchMode::Auto => !has_incremental_callbacks,
            BatchMode::Always => true,
            BatchMode::Never => false,
        }
    }
}

/// Search preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "PascalCase", deserialize = "snake_case"))]
pub enum Preset {
    Default,
    Large,
}

/// Search strategy run by the workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[serde(rename(serialize = "LNS"))]
    Lns,
    #[serde(rename(serialize = "FDS"))]
    Fds,
    #[serde(rename(serialize = "FDSDual"))]
    FdsDual,
    #[serde(rename(serialize = "SetTimes"))]
    SetTimes,
    #[serde(rename(serialize = "FDSLB"))]
    FdsLb,
}

/// Solve parameters copied into the wire document.
///
/// Files use `snake_case` keys; the wire uses `camelCase`. Unset fields are
/// omitted so the solver applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all(serialize = "camelCase", deserialize = "snake_case"))]
pub struct Parameters {
    /// Wall-clock limit in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nb_workers: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_seed: Option<u32>,

    /// Solver log verbosity, 0 to 3.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<u8>,

    /// Seconds between periodic log lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_period: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning_level: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_solutions: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_limit: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_limit: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_gap_tolerance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_gap_tolerance: Option<f64>,

    /// Set by the session from [`BatchMode`]; a value here takes precedence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_results: Option<bool>,
}

impl Parameters {
    /// Creates empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Sets the number of workers.
    pub fn with_workers(mut self, workers: u32) -> Self {
        self.nb_workers = Some(workers);
        self
    }

    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.preset = Some(preset);
        self
    }

    pub fn with_search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = Some(search_type);
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u32) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_log_level(mut self, level: u8) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn with_log_period(mut self, seconds: f64) -> Self {
        self.log_period = Some(seconds);
        self
    }

    pub fn with_warning_level(mut self, level: u8) -> Self {
        self.warning_level = Some(level);
        self
    }

    pub fn with_verify_solutions(mut self, verify: bool) -> Self {
        self.verify_solutions = Some(verify);
        self
    }

    pub fn with_solution_limit(mut self, limit: u64) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    pub fn with_fail_limit(mut self, limit: u64) -> Self {
        self.fail_limit = Some(limit);
        self
    }

    pub fn with_absolute_gap_tolerance(mut self, tolerance: f64) -> Self {
        self.absolute_gap_tolerance = Some(tolerance);
        self
    }

    pub fn with_relative_gap_tolerance(mut self, tolerance: f64) -> Self {
        self.relative_gap_tolerance = Some(tolerance);
        self
    }

    pub fn with_batch_results(mut self, batch: bool) -> Self {
        self.batch_results = Some(batch);
        self
    }

    /// Checks values the solver would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("time_limit", self.time_limit),
            ("log_period", self.log_period),
            ("absolute_gap_tolerance", self.absolute_gap_tolerance),
            ("relative_gap_tolerance", self.relative_gap_tolerance),
        ];
        for (name, value) in non_negative {
            if let Some(value) = value {
                if !value.is_finite() || value < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "{name} must be a non-negative number, got {value}"
                    )));
                }
            }
        }
        if self.nb_workers == Some(0) {
            return Err(ConfigError::Invalid(
                "nb_workers must be at least 1".to_string(),
            ));
        }
        if let Some(level) = self.log_level {
            if level > 3 {
                return Err(ConfigError::Invalid(format!(
                    "log_level must be between 0 and 3, got {level}"
                )));
            }
        }
        Ok(())
    }
}
