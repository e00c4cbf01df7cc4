//! Core trait definitions
//!
//! These traits sit at the seams between the sync engine and the things it
//! reads from: local definition files and the analysis server.

use crate::core::data::{ModuleDefinition, ViewDefinition};
use crate::utils::error::AppResult;

/// A place module and view definitions are read from
///
/// Implementations report definitions in their own order; uniqueness across
/// sources is enforced when they are merged.
pub trait DefinitionSource {
    /// Human readable origin, used in log lines
    fn describe(&self) -> String;

    /// Module definitions provided by this source
    fn modules(&self) -> AppResult<Vec<ModuleDefinition>>;

    /// View definitions provided by this source
    fn views(&self) -> AppResult<Vec<ViewDefinition>>;
}
