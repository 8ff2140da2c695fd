//! Solver entry points that hide session wiring.

use std::path::Path;

use cpwire_config::ClientConfig;
use cpwire_core::{Model, Solution};
use cpwire_session::{PropagationResult, Result, SolveResult, Solver};
use tracing::debug;

/// Configuration file picked up from the working directory.
pub const CONFIG_FILE: &str = "cpwire.toml";

/// Loads `cpwire.toml` when present, otherwise the defaults.
///
/// A file that exists but does not parse is an error.
pub fn load_config() -> Result<ClientConfig> {
    if !Path::new(CONFIG_FILE).exists() {
        return Ok(ClientConfig::default());
    }
    let config = ClientConfig::load(CONFIG_FILE)?;
    debug!(event = "config_loaded", path = CONFIG_FILE);
    Ok(config)
}

fn session() -> Result<Solver> {
    #[cfg(feature = "console")]
    cpwire_console::init();

    Ok(Solver::with_config(load_config()?))
}

/// Solves `model` with a fresh session configured from `cpwire.toml`.
pub async fn solve(model: &Model) -> Result<SolveResult> {
    session()?.solve(model, None).await
}

/// Like [`solve`], starting the search from `warm_start`.
pub async fn solve_from(model: &Model, warm_start: &Solution) -> Result<SolveResult> {
    session()?.solve(model, Some(warm_start)).await
}

/// Runs constraint propagation only and returns the reduced domains.
pub async fn propagate(model: &Model) -> Result<PropagationResult> {
    session()?.propagate(model).await
}

/// Returns the solver's text rendering of `model`.
pub async fn to_text(model: &Model) -> Result<String> {
    session()?.to_text(model).await
}
