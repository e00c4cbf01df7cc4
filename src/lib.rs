//! kwfilters - synchronize module and view filters to analysis server projects
//!
//! Definitions are read from INI files or per-item text files, projects are
//! selected from the server by name, and every definition is created or
//! updated in every selected project.

pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod sources;
pub mod utils;

// Re-export core types and traits for easier use
pub use crate::api::{ApiRequest, ApiResponse, ServerApi, kw::KwApiClient};
pub use crate::config::{Config, RunOptions};
pub use crate::core::{
    data::{Definitions, ItemKind, ModuleDefinition, ViewDefinition},
    operations::{FilterSync, PhaseOutcome, ProjectFilter},
    traits::DefinitionSource,
};
pub use crate::utils::error::{AppError, AppResult};
pub use crate::utils::interactive::ConfirmationGate;

use anyhow::{Context, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load definitions, connect to the server and run both phases
pub async fn run(options: &RunOptions) -> Result<()> {
    let definitions = load_definitions(options)?;
    let filter = ProjectFilter::new(&options.project_filter)?;
    let client = KwApiClient::new(&options.url, &options.user, options.ltoken_file.as_deref())?;
    tracing::debug!("Using server API at {}", client.endpoint());

    let mut gate = ConfirmationGate::console(options.silent);
    run_with(client, definitions, &filter, &mut gate).await?;
    Ok(())
}

/// Read every requested source; fails before any network traffic
pub fn load_definitions(options: &RunOptions) -> Result<Definitions> {
    let sources = options
        .sources
        .open()
        .context("Failed to load definitions")?;
    let definitions =
        Definitions::from_sources(&sources).context("Failed to load definitions")?;

    tracing::info!(
        "Loaded {} module(s) and {} view(s)",
        definitions.module_count(),
        definitions.view_count()
    );
    Ok(definitions)
}

/// Select projects, then sync modules and views behind the gate
pub async fn run_with<A: ServerApi>(
    api: A,
    definitions: Definitions,
    filter: &ProjectFilter,
    gate: &mut ConfirmationGate,
) -> AppResult<(PhaseOutcome, PhaseOutcome)> {
    let mut sync = FilterSync::new(api, definitions);
    sync.select_projects(filter).await?;
    if sync.projects().is_empty() {
        tracing::warn!("No projects match the project expression");
    }

    let modules = sync.sync_modules(gate).await?;
    let views = sync.sync_views(gate).await?;
    Ok((modules, views))
}
