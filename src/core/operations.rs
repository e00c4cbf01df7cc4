//! Project selection and filter synchronization
//!
//! The engine fetches the project list once, then for every project and
//! every local definition issues a create or an update depending on what
//! the server already has for that project.

use crate::api::{Action, ApiRequest, ServerApi, record_names};
use crate::core::data::{Definitions, ItemKind, ModuleDefinition, ViewDefinition};
use crate::utils::error::{AppError, AppResult};
use crate::utils::interactive::ConfirmationGate;
use regex::Regex;
use std::collections::HashSet;

/// Tag attached to every view this tool writes
pub const AUTO_CREATED_TAG: &str = "auto-created";

/// Regular expression matched against the start of project names
#[derive(Debug, Clone)]
pub struct ProjectFilter {
    regex: Regex,
}

impl ProjectFilter {
    pub fn new(pattern: &str) -> AppResult<Self> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|e| {
            AppError::config(format!("Invalid project expression \"{}\": {}", pattern, e))
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Result of one gated phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// The operator declined
    Aborted,
    /// No local definitions of this kind
    Empty,
    Completed { created: usize, updated: usize },
}

/// Anything that can be upserted into a project
trait SyncItem {
    const KIND: ItemKind;

    fn name(&self) -> &str;

    fn fill_payload(&self, request: &mut ApiRequest);
}

impl SyncItem for ModuleDefinition {
    const KIND: ItemKind = ItemKind::Module;

    fn name(&self) -> &str {
        &self.name
    }

    fn fill_payload(&self, request: &mut ApiRequest) {
        request.paths = Some(self.joined_paths());
        request.allow_all = Some(true);
    }
}

impl SyncItem for ViewDefinition {
    const KIND: ItemKind = ItemKind::View;

    fn name(&self) -> &str {
        &self.name
    }

    fn fill_payload(&self, request: &mut ApiRequest) {
        request.query = Some(self.query.clone());
        request.tags = Some(AUTO_CREATED_TAG.to_string());
    }
}

fn list_action(kind: ItemKind) -> Action {
    match kind {
        ItemKind::Module => Action::Modules,
        ItemKind::View => Action::Views,
    }
}

fn upsert_action(kind: ItemKind, exists: bool) -> Action {
    match (kind, exists) {
        (ItemKind::Module, false) => Action::CreateModule,
        (ItemKind::Module, true) => Action::UpdateModule,
        (ItemKind::View, false) => Action::CreateView,
        (ItemKind::View, true) => Action::UpdateView,
    }
}

/// Build the create/update request for one item in one project
fn upsert_request<T: SyncItem>(project: &str, item: &T, exists: bool) -> ApiRequest {
    let mut request = ApiRequest {
        name: Some(item.name().to_string()),
        ..ApiRequest::for_project(upsert_action(T::KIND, exists), project)
    };
    item.fill_payload(&mut request);
    request
}

/// Synchronizes local definitions into the selected projects
pub struct FilterSync<A: ServerApi> {
    api: A,
    definitions: Definitions,
    projects: Vec<String>,
}

impl<A: ServerApi> FilterSync<A> {
    pub fn new(api: A, definitions: Definitions) -> Self {
        Self {
            api,
            definitions,
            projects: Vec::new(),
        }
    }

    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// Fetch the project list and keep the names matching `filter`, in server order
    pub async fn select_projects(&mut self, filter: &ProjectFilter) -> AppResult<&[String]> {
        tracing::info!("Getting list of projects...");

        let records = self.api.execute(&ApiRequest::projects()).await?.into_records()?;

        let mut selected = Vec::new();
        for name in record_names(&records)? {
            if filter.matches(&name) {
                tracing::debug!("Adding project \"{}\" to list of projects to process", name);
                selected.push(name);
            } else {
                tracing::debug!(
                    "Skipping project \"{}\" because it does not match regular expression",
                    name
                );
            }
        }

        tracing::debug!("Projects that will be processed: \"{}\"", selected.join(", "));
        self.projects = selected;
        Ok(&self.projects)
    }

    pub async fn sync_modules(&self, gate: &mut ConfirmationGate) -> AppResult<PhaseOutcome> {
        let modules: Vec<&ModuleDefinition> = self.definitions.modules().collect();
        self.sync_items(&modules, gate).await
    }

    pub async fn sync_views(&self, gate: &mut ConfirmationGate) -> AppResult<PhaseOutcome> {
        let views: Vec<&ViewDefinition> = self.definitions.views().collect();
        self.sync_items(&views, gate).await
    }

    /// Names of the items of `kind` the server already has for `project`
    pub async fn existing_items(&self, project: &str, kind: ItemKind) -> AppResult<HashSet<String>> {
        tracing::debug!("Retrieving existing {} for project \"{}\"", kind.plural(), project);

        let request = ApiRequest::for_project(list_action(kind), project);
        let records = self.api.execute(&request).await?.into_records()?;
        let names = record_names(&records)?;

        tracing::debug!("Retrieved {}: {:?}", kind.plural(), names);
        Ok(names.into_iter().collect())
    }

    async fn sync_items<T: SyncItem + Sync>(
        &self,
        items: &[&T],
        gate: &mut ConfirmationGate,
    ) -> AppResult<PhaseOutcome> {
        let kind = T::KIND;
        if items.is_empty() {
            tracing::info!("No {} defined, skipping", kind.plural());
            return Ok(PhaseOutcome::Empty);
        }

        tracing::info!("Creating/updating {} for projects...", kind.plural());
        if !gate.approve(kind, &self.projects)? {
            tracing::info!("Operation aborted");
            return Ok(PhaseOutcome::Aborted);
        }

        let mut created = 0;
        let mut updated = 0;
        for project in &self.projects {
            tracing::info!("Updating project \"{}\"", project);
            let existing = self.existing_items(project, kind).await?;

            for item in items {
                let exists = existing.contains(item.name());
                let request = upsert_request(project, *item, exists);
                tracing::debug!(
                    "{} {} \"{}\" in project \"{}\"",
                    if exists { "Updating" } else { "Creating" },
                    kind,
                    item.name(),
                    project
                );

                self.api.execute(&request).await?.into_records()?;
                if exists {
                    updated += 1;
                } else {
                    created += 1;
                }
            }
        }

        tracing::info!(
            "{} created/updated successfully! ({} created, {} updated)",
            capitalize(kind.plural()),
            created,
            updated
        );
        Ok(PhaseOutcome::Completed { created, updated })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
